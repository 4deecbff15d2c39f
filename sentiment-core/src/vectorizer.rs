//! Bag-of-features vectorization against a frozen vocabulary
//!
//! The vectorizer artifact fixes the vocabulary (token → column), the
//! tokenization pattern, the n-gram range and the weighting scheme (raw
//! counts, binary presence, optional sublinear TF, optional IDF, optional
//! L1/L2 normalization). Tokens outside the vocabulary are ignored.

use crate::artifact::{check_finite, check_version, read_json};
use crate::{Error, Result};
use ndarray::Array1;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Default token pattern: words of two or more word characters
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// Largest n-gram length an artifact may request
pub const MAX_NGRAM: usize = 10;

/// Vector normalization applied after weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// On-disk layout of the vectorizer artifact
#[derive(Debug, Deserialize)]
struct VectorizerFile {
    format_version: u32,
    vocabulary: HashMap<String, usize>,
    #[serde(default)]
    idf: Option<Vec<f64>>,
    #[serde(default)]
    binary: bool,
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default)]
    norm: Option<Norm>,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default = "default_token_pattern")]
    token_pattern: String,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

/// Fixed-width numeric representation of one normalized text
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Array1<f64>);

impl FeatureVector {
    pub fn zeros(width: usize) -> Self {
        Self(Array1::zeros(width))
    }

    pub fn from_vec(values: Vec<f64>) -> Self {
        Self(Array1::from_vec(values))
    }

    /// Vector width (vocabulary size of the producing artifact)
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &Array1<f64> {
        &self.0
    }

    /// Number of non-zero features
    pub fn nnz(&self) -> usize {
        self.0.iter().filter(|v| **v != 0.0).count()
    }
}

/// Immutable vectorizer parameters loaded once at startup
#[derive(Debug)]
pub struct VectorizerArtifact {
    vocabulary: HashMap<String, usize>,
    idf: Option<Array1<f64>>,
    binary: bool,
    sublinear_tf: bool,
    norm: Option<Norm>,
    ngram_range: (usize, usize),
    token_pattern: Regex,
}

impl VectorizerArtifact {
    /// Load and validate a vectorizer artifact from `path`
    pub fn load(path: &Path) -> Result<Self> {
        let file: VectorizerFile = read_json(path)?;
        Self::from_file(path, file)
    }

    /// Parse an artifact from an in-memory JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let path = Path::new("<inline>");
        let file: VectorizerFile =
            serde_json::from_str(json).map_err(|e| Error::corrupt(path, e.to_string()))?;
        Self::from_file(path, file)
    }

    fn from_file(path: &Path, file: VectorizerFile) -> Result<Self> {
        check_version(path, file.format_version)?;

        let width = file.vocabulary.len();
        if width == 0 {
            return Err(Error::corrupt(path, "vocabulary is empty"));
        }

        // Column indices must cover 0..width exactly once
        let mut seen = vec![false; width];
        for (term, &index) in &file.vocabulary {
            if index >= width {
                return Err(Error::corrupt(
                    path,
                    format!("vocabulary index {} for '{}' out of range 0..{}", index, term, width),
                ));
            }
            if std::mem::replace(&mut seen[index], true) {
                return Err(Error::corrupt(
                    path,
                    format!("vocabulary index {} assigned twice", index),
                ));
            }
        }

        let idf = match file.idf {
            Some(idf) => {
                if idf.len() != width {
                    return Err(Error::corrupt(
                        path,
                        format!("idf has {} entries, vocabulary has {}", idf.len(), width),
                    ));
                }
                check_finite(path, "idf", &idf)?;
                Some(Array1::from_vec(idf))
            }
            None => None,
        };

        let (min_n, max_n) = file.ngram_range;
        if min_n == 0 || min_n > max_n || max_n > MAX_NGRAM {
            return Err(Error::corrupt(
                path,
                format!("invalid ngram_range ({}, {})", min_n, max_n),
            ));
        }

        let token_pattern = Regex::new(&file.token_pattern)
            .map_err(|e| Error::corrupt(path, format!("invalid token_pattern: {}", e)))?;

        Ok(Self {
            vocabulary: file.vocabulary,
            idf,
            binary: file.binary,
            sublinear_tf: file.sublinear_tf,
            norm: file.norm,
            ngram_range: file.ngram_range,
            token_pattern,
        })
    }

    /// Feature vector width
    pub fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_tfidf(&self) -> bool {
        self.idf.is_some()
    }

    /// Unigram vocabulary entries, usable as a lemma lexicon
    pub fn unigrams(&self) -> impl Iterator<Item = &str> {
        self.vocabulary
            .keys()
            .map(String::as_str)
            .filter(|term| !term.contains(' '))
    }

    /// Vectorize one normalized text
    pub fn transform_one(&self, text: &str) -> FeatureVector {
        let mut counts = Array1::<f64>::zeros(self.dimension());

        let tokens: Vec<&str> = self
            .token_pattern
            .find_iter(text)
            .map(|m| m.as_str())
            .collect();

        let (min_n, max_n) = self.ngram_range;
        for n in min_n..=max_n {
            for window in tokens.windows(n) {
                let gram = window.join(" ");
                if let Some(&index) = self.vocabulary.get(&gram) {
                    if self.binary {
                        counts[index] = 1.0;
                    } else {
                        counts[index] += 1.0;
                    }
                }
            }
        }

        if self.sublinear_tf {
            counts.mapv_inplace(|tf| if tf > 0.0 { 1.0 + tf.ln() } else { tf });
        }

        if let Some(idf) = &self.idf {
            counts *= idf;
        }

        match self.norm {
            Some(Norm::L2) => {
                let length = counts.dot(&counts).sqrt();
                if length > 0.0 {
                    counts /= length;
                }
            }
            Some(Norm::L1) => {
                let length: f64 = counts.iter().map(|v| v.abs()).sum();
                if length > 0.0 {
                    counts /= length;
                }
            }
            None => {}
        }

        FeatureVector(counts)
    }
}

/// Vectorizer handle; transform fails until an artifact is bound
#[derive(Debug, Clone, Default)]
pub struct FeatureVectorizer {
    artifact: Option<Arc<VectorizerArtifact>>,
}

impl FeatureVectorizer {
    /// Vectorizer with no artifact bound
    pub fn unbound() -> Self {
        Self::default()
    }

    pub fn new(artifact: Arc<VectorizerArtifact>) -> Self {
        Self {
            artifact: Some(artifact),
        }
    }

    /// Load the artifact at `path` and bind it
    pub fn load(path: &Path) -> Result<Self> {
        let artifact = VectorizerArtifact::load(path)?;
        info!(
            "Vectorizer loaded from {} ({} features, {})",
            path.display(),
            artifact.dimension(),
            if artifact.is_tfidf() { "tf-idf" } else { "counts" }
        );
        Ok(Self::new(Arc::new(artifact)))
    }

    pub fn is_loaded(&self) -> bool {
        self.artifact.is_some()
    }

    pub fn artifact(&self) -> Result<&VectorizerArtifact> {
        self.artifact.as_deref().ok_or(Error::NotLoaded("Vectorizer"))
    }

    /// Width of produced vectors (0 when unbound)
    pub fn dimension(&self) -> usize {
        self.artifact.as_ref().map_or(0, |a| a.dimension())
    }

    /// Vectorize one or many normalized texts, preserving order
    pub fn transform<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<FeatureVector>> {
        let artifact = self.artifact()?;
        Ok(texts
            .iter()
            .map(|text| artifact.transform_one(text.as_ref()))
            .collect())
    }
}
