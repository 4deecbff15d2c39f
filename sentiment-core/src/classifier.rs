//! Binary classifier over feature vectors
//!
//! Supports the two model families reviews are usually scored with:
//! - `linear`: logistic regression / linear SVM weights plus intercept
//! - `multinomial_nb`: multinomial naive Bayes log-probabilities
//!
//! The model emits one of its two raw `classes` values. Only 0 and 1 are
//! valid sentiment labels; any other raw value is surfaced as
//! `InvariantViolation` and never mapped to a default.

use crate::artifact::{check_finite, check_version, read_json};
use crate::vectorizer::FeatureVector;
use crate::{Error, Result, SentimentLabel};
use ndarray::{Array1, Array2};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// On-disk layout of the model artifact, tagged by `kind`
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ModelFile {
    Linear {
        format_version: u32,
        coef: Vec<f64>,
        intercept: f64,
        classes: Vec<i64>,
    },
    MultinomialNb {
        format_version: u32,
        class_log_prior: Vec<f64>,
        feature_log_prob: Vec<Vec<f64>>,
        classes: Vec<i64>,
    },
}

/// Immutable classifier parameters loaded once at startup
#[derive(Debug)]
pub enum ModelArtifact {
    Linear {
        coef: Array1<f64>,
        intercept: f64,
        classes: [i64; 2],
    },
    MultinomialNb {
        class_log_prior: Array1<f64>,
        feature_log_prob: Array2<f64>,
        classes: [i64; 2],
    },
}

impl ModelArtifact {
    /// Load and validate a model artifact from `path`
    pub fn load(path: &Path) -> Result<Self> {
        let file: ModelFile = read_json(path)?;
        Self::from_file(path, file)
    }

    /// Parse an artifact from an in-memory JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let path = Path::new("<inline>");
        let file: ModelFile =
            serde_json::from_str(json).map_err(|e| Error::corrupt(path, e.to_string()))?;
        Self::from_file(path, file)
    }

    fn from_file(path: &Path, file: ModelFile) -> Result<Self> {
        match file {
            ModelFile::Linear {
                format_version,
                coef,
                intercept,
                classes,
            } => {
                check_version(path, format_version)?;
                if coef.is_empty() {
                    return Err(Error::corrupt(path, "coef is empty"));
                }
                check_finite(path, "coef", &coef)?;
                check_finite(path, "intercept", [&intercept])?;
                Ok(ModelArtifact::Linear {
                    coef: Array1::from_vec(coef),
                    intercept,
                    classes: binary_classes(path, &classes)?,
                })
            }
            ModelFile::MultinomialNb {
                format_version,
                class_log_prior,
                feature_log_prob,
                classes,
            } => {
                check_version(path, format_version)?;
                let classes = binary_classes(path, &classes)?;
                if class_log_prior.len() != 2 || feature_log_prob.len() != 2 {
                    return Err(Error::corrupt(
                        path,
                        "class_log_prior and feature_log_prob need one entry per class",
                    ));
                }
                let width = feature_log_prob[0].len();
                if width == 0 {
                    return Err(Error::corrupt(path, "feature_log_prob rows are empty"));
                }
                let flat: Vec<f64> = feature_log_prob.into_iter().flatten().collect();
                let feature_log_prob = Array2::from_shape_vec((2, width), flat)
                    .map_err(|_| Error::corrupt(path, "feature_log_prob rows differ in length"))?;
                check_finite(path, "class_log_prior", &class_log_prior)?;
                check_finite(path, "feature_log_prob", feature_log_prob.iter())?;
                Ok(ModelArtifact::MultinomialNb {
                    class_log_prior: Array1::from_vec(class_log_prior),
                    feature_log_prob,
                    classes,
                })
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::Linear { .. } => "linear",
            ModelArtifact::MultinomialNb { .. } => "multinomial_nb",
        }
    }

    /// Feature width the model was trained on
    pub fn input_dimension(&self) -> usize {
        match self {
            ModelArtifact::Linear { coef, .. } => coef.len(),
            ModelArtifact::MultinomialNb {
                feature_log_prob, ..
            } => feature_log_prob.ncols(),
        }
    }

    /// Raw class value the model assigns to `vector`
    pub fn raw_predict(&self, vector: &FeatureVector) -> Result<i64> {
        let expected = self.input_dimension();
        if vector.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }
        let x = vector.values();

        let raw = match self {
            ModelArtifact::Linear {
                coef,
                intercept,
                classes,
            } => {
                let decision = coef.dot(x) + intercept;
                if decision > 0.0 {
                    classes[1]
                } else {
                    classes[0]
                }
            }
            ModelArtifact::MultinomialNb {
                class_log_prior,
                feature_log_prob,
                classes,
            } => {
                let joint = feature_log_prob.dot(x) + class_log_prior;
                // Ties go to the first class
                if joint[1] > joint[0] {
                    classes[1]
                } else {
                    classes[0]
                }
            }
        };
        Ok(raw)
    }

    /// Predict a validated binary label
    pub fn predict(&self, vector: &FeatureVector) -> Result<SentimentLabel> {
        SentimentLabel::try_from(self.raw_predict(vector)?)
    }
}

fn binary_classes(path: &Path, classes: &[i64]) -> Result<[i64; 2]> {
    match classes {
        [first, second] if first != second => Ok([*first, *second]),
        _ => Err(Error::corrupt(
            path,
            format!("expected two distinct classes, got {:?}", classes),
        )),
    }
}

/// Classifier handle; predict fails until an artifact is bound
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    artifact: Option<Arc<ModelArtifact>>,
}

impl Classifier {
    /// Classifier with no artifact bound
    pub fn unbound() -> Self {
        Self::default()
    }

    pub fn new(artifact: Arc<ModelArtifact>) -> Self {
        Self {
            artifact: Some(artifact),
        }
    }

    /// Load the artifact at `path` and bind it
    pub fn load(path: &Path) -> Result<Self> {
        let artifact = ModelArtifact::load(path)?;
        info!(
            "Model loaded from {} ({}, {} input features)",
            path.display(),
            artifact.kind(),
            artifact.input_dimension()
        );
        Ok(Self::new(Arc::new(artifact)))
    }

    pub fn is_loaded(&self) -> bool {
        self.artifact.is_some()
    }

    pub fn artifact(&self) -> Result<&ModelArtifact> {
        self.artifact.as_deref().ok_or(Error::NotLoaded("Model"))
    }

    pub fn predict(&self, vector: &FeatureVector) -> Result<SentimentLabel> {
        self.artifact()?.predict(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(classes: &str) -> ModelArtifact {
        ModelArtifact::from_json_str(&format!(
            r#"{{"format_version": 1, "kind": "linear", "coef": [2.0, -3.0],
                 "intercept": -0.5, "classes": {}}}"#,
            classes
        ))
        .unwrap()
    }

    #[test]
    fn test_linear_decision() {
        let model = linear("[0, 1]");
        assert_eq!(model.kind(), "linear");
        assert_eq!(model.input_dimension(), 2);
        let positive = FeatureVector::from_vec(vec![1.0, 0.0]);
        let negative = FeatureVector::from_vec(vec![0.0, 1.0]);
        assert_eq!(model.predict(&positive).unwrap(), SentimentLabel::Positive);
        assert_eq!(model.predict(&negative).unwrap(), SentimentLabel::Negative);
    }

    #[test]
    fn test_zero_vector_follows_intercept() {
        let model = linear("[0, 1]");
        assert_eq!(
            model.predict(&FeatureVector::zeros(2)).unwrap(),
            SentimentLabel::Negative
        );
    }

    #[test]
    fn test_multinomial_nb() {
        let model = ModelArtifact::from_json_str(
            r#"{"format_version": 1, "kind": "multinomial_nb",
                "class_log_prior": [-0.693, -0.693],
                "feature_log_prob": [[-2.3, -0.2], [-0.2, -2.3]],
                "classes": [0, 1]}"#,
        )
        .unwrap();
        assert_eq!(model.kind(), "multinomial_nb");
        assert_eq!(model.input_dimension(), 2);
        assert_eq!(
            model.predict(&FeatureVector::from_vec(vec![3.0, 0.0])).unwrap(),
            SentimentLabel::Positive
        );
        assert_eq!(
            model.predict(&FeatureVector::from_vec(vec![0.0, 3.0])).unwrap(),
            SentimentLabel::Negative
        );
        // Equal priors, empty document: tie goes to the first class
        assert_eq!(
            model.predict(&FeatureVector::zeros(2)).unwrap(),
            SentimentLabel::Negative
        );
    }

    #[test]
    fn test_dimension_mismatch() {
        let model = linear("[0, 1]");
        match model.predict(&FeatureVector::zeros(3)) {
            Err(Error::DimensionMismatch { expected, actual }) => {
                assert_eq!(expected, 2);
                assert_eq!(actual, 3);
            }
            other => panic!("expected DimensionMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_domain_class_is_invariant_violation() {
        let model = linear("[1, 5]");
        let positive = FeatureVector::from_vec(vec![1.0, 0.0]);
        assert_eq!(model.raw_predict(&positive).unwrap(), 5);
        assert!(matches!(
            model.predict(&positive),
            Err(Error::InvariantViolation(5))
        ));
        // raw 1 is still a valid label
        let negative = FeatureVector::from_vec(vec![0.0, 1.0]);
        assert_eq!(model.predict(&negative).unwrap(), SentimentLabel::Positive);
    }

    #[test]
    fn test_invalid_models_rejected() {
        let cases = [
            r#"{"format_version": 1, "kind": "linear", "coef": [], "intercept": 0.0, "classes": [0, 1]}"#,
            r#"{"format_version": 1, "kind": "linear", "coef": [1.0], "intercept": 0.0, "classes": [0, 1, 2]}"#,
            r#"{"format_version": 1, "kind": "linear", "coef": [1.0], "intercept": 0.0, "classes": [1, 1]}"#,
            r#"{"format_version": 3, "kind": "linear", "coef": [1.0], "intercept": 0.0, "classes": [0, 1]}"#,
            r#"{"format_version": 1, "kind": "forest", "trees": []}"#,
            r#"{"format_version": 1, "kind": "multinomial_nb", "class_log_prior": [-0.7, -0.7],
                "feature_log_prob": [[-1.0, -2.0], [-1.0]], "classes": [0, 1]}"#,
            r#"{"format_version": 1, "kind": "multinomial_nb", "class_log_prior": [-0.7],
                "feature_log_prob": [[-1.0], [-1.0]], "classes": [0, 1]}"#,
        ];
        for json in cases {
            assert!(
                matches!(
                    ModelArtifact::from_json_str(json),
                    Err(Error::ArtifactCorrupt { .. })
                ),
                "expected corrupt: {}",
                json
            );
        }
    }

    #[test]
    fn test_unbound_classifier_fails() {
        let classifier = Classifier::unbound();
        assert!(!classifier.is_loaded());
        assert!(matches!(
            classifier.predict(&FeatureVector::zeros(2)),
            Err(Error::NotLoaded(_))
        ));
    }
}
