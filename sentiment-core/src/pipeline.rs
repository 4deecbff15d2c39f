//! Sentiment pipeline: normalize → vectorize → classify
//!
//! One pipeline instance is built at startup and shared read-only (behind an
//! `Arc`) by every request. It holds no per-call state, so concurrent calls
//! need no coordination.

use crate::classifier::Classifier;
use crate::config::{ArtifactsConfig, ServiceConfig};
use crate::text::{Language, Lemmatizer, Normalizer};
use crate::vectorizer::FeatureVectorizer;
use crate::{Error, Result, SentimentLabel};
use rayon::prelude::*;
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, warn};

/// Outcome of one batch item; failures stay attached to their item
#[derive(Debug)]
pub struct BatchOutcome {
    pub text: String,
    pub result: Result<SentimentLabel>,
}

/// Read-only description of the loaded pipeline
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PipelineSummary {
    pub language: String,
    pub vocabulary_size: usize,
    pub weighting: &'static str,
    pub model_kind: &'static str,
    pub model_input_dimension: usize,
}

/// Text-to-label pipeline over shared immutable artifacts
#[derive(Debug, Clone)]
pub struct SentimentPipeline {
    normalizer: Normalizer,
    vectorizer: FeatureVectorizer,
    classifier: Classifier,
    /// Text that makes `analyze` panic, for exercising batch isolation
    #[cfg(test)]
    fault_on: Option<&'static str>,
}

impl SentimentPipeline {
    /// Assemble a pipeline from already-built components
    pub fn new(normalizer: Normalizer, vectorizer: FeatureVectorizer, classifier: Classifier) -> Self {
        Self {
            normalizer,
            vectorizer,
            classifier,
            #[cfg(test)]
            fault_on: None,
        }
    }

    /// Load both artifacts and build the pipeline.
    ///
    /// Any load failure is returned immediately; callers must not start
    /// serving without a pipeline.
    pub fn load(artifacts: &ArtifactsConfig, language: Language) -> Result<Self> {
        let vectorizer = FeatureVectorizer::load(&artifacts.vectorizer_path)?;
        let classifier = Classifier::load(&artifacts.model_path)?;

        let vocabulary = vectorizer.artifact()?;
        let model = classifier.artifact()?;
        if vocabulary.dimension() != model.input_dimension() {
            // Not fatal: every prediction will report DimensionMismatch
            warn!(
                "Vectorizer produces {} features but model expects {}",
                vocabulary.dimension(),
                model.input_dimension()
            );
        }

        let lemmatizer = Lemmatizer::with_lexicon(vocabulary.unigrams());
        let normalizer = Normalizer::new(language).with_lemmatizer(lemmatizer);
        info!("Sentiment pipeline ready (language: {})", language);

        Ok(Self::new(normalizer, vectorizer, classifier))
    }

    /// Validate the configuration and load the pipeline it describes
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        config.validate()?;
        Self::load(&config.artifacts, config.analysis.language()?)
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn is_loaded(&self) -> bool {
        self.vectorizer.is_loaded() && self.classifier.is_loaded()
    }

    /// Classify one review.
    ///
    /// Empty normalized text is not special-cased: it vectorizes to a zero
    /// vector and the model decides.
    pub fn analyze(&self, text: &str) -> Result<SentimentLabel> {
        let normalized = self.normalizer.normalize(text);
        #[cfg(test)]
        self.inject_fault(text);
        debug!("Normalized {} chars to {:?}", text.len(), normalized);

        let vector = self
            .vectorizer
            .transform(&[normalized])?
            .into_iter()
            .next()
            .ok_or_else(|| Error::AnalysisFailure("vectorizer returned no vector".to_string()))?;

        self.classifier.predict(&vector)
    }

    /// Classify each text independently, in input order
    pub fn analyze_batch<S: AsRef<str>>(&self, texts: &[S]) -> Vec<BatchOutcome> {
        texts
            .iter()
            .map(|text| self.outcome(text.as_ref()))
            .collect()
    }

    /// Same contract as [`analyze_batch`](Self::analyze_batch), items run on
    /// the rayon thread pool. Output order still matches input order.
    pub fn analyze_batch_parallel<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Vec<BatchOutcome> {
        texts
            .par_iter()
            .map(|text| self.outcome(text.as_ref()))
            .collect()
    }

    /// Describe the loaded artifacts
    pub fn summary(&self) -> PipelineSummary {
        let (weighting, vocabulary_size) = match self.vectorizer.artifact() {
            Ok(artifact) if artifact.is_tfidf() => ("tf-idf", artifact.dimension()),
            Ok(artifact) => ("counts", artifact.dimension()),
            Err(_) => ("none", 0),
        };
        let (model_kind, model_input_dimension) = match self.classifier.artifact() {
            Ok(model) => (model.kind(), model.input_dimension()),
            Err(_) => ("none", 0),
        };

        PipelineSummary {
            language: self.normalizer.language().to_string(),
            vocabulary_size,
            weighting,
            model_kind,
            model_input_dimension,
        }
    }

    #[cfg(test)]
    fn inject_fault(&self, text: &str) {
        if self.fault_on == Some(text) {
            panic!("injected fault while vectorizing {:?}", text);
        }
    }

    /// Analyze one item, turning a panic in any stage into `AnalysisFailure`
    fn outcome(&self, text: &str) -> BatchOutcome {
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.analyze(text)))
            .unwrap_or_else(|payload| Err(Error::AnalysisFailure(panic_message(payload))));

        BatchOutcome {
            text: text.to_string(),
            result,
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "analysis panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ModelArtifact;
    use crate::vectorizer::VectorizerArtifact;
    use std::sync::Arc;

    fn pipeline(classes: &str) -> SentimentPipeline {
        let vectorizer = VectorizerArtifact::from_json_str(
            r#"{"format_version": 1, "vocabulary": {"love": 0, "great": 1, "awful": 2}}"#,
        )
        .unwrap();
        let model = ModelArtifact::from_json_str(&format!(
            r#"{{"format_version": 1, "kind": "linear", "coef": [1.5, 1.0, -2.0],
                 "intercept": -0.25, "classes": {}}}"#,
            classes
        ))
        .unwrap();
        SentimentPipeline::new(
            Normalizer::new(Language::English),
            FeatureVectorizer::new(Arc::new(vectorizer)),
            Classifier::new(Arc::new(model)),
        )
    }

    #[test]
    fn test_analyze() {
        let p = pipeline("[0, 1]");
        assert!(p.is_loaded());
        assert_eq!(p.analyze("I LOVE it").unwrap(), SentimentLabel::Positive);
        assert_eq!(p.analyze("Awful. Just awful.").unwrap(), SentimentLabel::Negative);
    }

    #[test]
    fn test_all_stopword_input_still_classified() {
        let p = pipeline("[0, 1]");
        // Zero vector: decision = intercept < 0
        assert_eq!(p.analyze("it is what it is").unwrap(), SentimentLabel::Negative);
        assert_eq!(p.analyze("").unwrap(), SentimentLabel::Negative);
    }

    #[test]
    fn test_batch_isolates_failures() {
        // Class 7 is outside the label domain: positive items fail, others pass
        let p = pipeline("[0, 7]");
        let texts = ["love it", "awful", "great great", "meh"];
        let outcomes = p.analyze_batch(&texts);

        assert_eq!(outcomes.len(), 4);
        for (outcome, text) in outcomes.iter().zip(texts) {
            assert_eq!(outcome.text, text);
        }
        assert!(matches!(outcomes[0].result, Err(Error::InvariantViolation(7))));
        assert_eq!(outcomes[1].result.as_ref().unwrap(), &SentimentLabel::Negative);
        assert!(matches!(outcomes[2].result, Err(Error::InvariantViolation(7))));
        assert_eq!(outcomes[3].result.as_ref().unwrap(), &SentimentLabel::Negative);
    }

    #[test]
    fn test_parallel_batch_matches_sequential() {
        let p = pipeline("[0, 1]");
        let texts: Vec<String> = (0..64)
            .map(|i| if i % 3 == 0 { format!("awful {}", i) } else { format!("love {}", i) })
            .collect();

        let sequential = p.analyze_batch(&texts);
        let parallel = p.analyze_batch_parallel(&texts);

        assert_eq!(sequential.len(), parallel.len());
        for (a, b) in sequential.iter().zip(parallel.iter()) {
            assert_eq!(a.text, b.text);
            assert_eq!(a.result.as_ref().unwrap(), b.result.as_ref().unwrap());
        }
    }

    #[test]
    fn test_duplicates_not_collapsed() {
        let p = pipeline("[0, 1]");
        let outcomes = p.analyze_batch(&["love", "love", "love"]);
        assert_eq!(outcomes.len(), 3);
    }

    #[test]
    fn test_unbound_components_report_not_loaded() {
        let p = SentimentPipeline::new(
            Normalizer::default(),
            FeatureVectorizer::unbound(),
            Classifier::unbound(),
        );
        assert!(!p.is_loaded());
        assert!(matches!(p.analyze("love"), Err(Error::NotLoaded("Vectorizer"))));
        assert_eq!(p.summary().model_kind, "none");
    }

    #[test]
    fn test_dimension_mismatch_is_per_request() {
        let vectorizer = VectorizerArtifact::from_json_str(
            r#"{"format_version": 1, "vocabulary": {"love": 0, "great": 1}}"#,
        )
        .unwrap();
        let model = ModelArtifact::from_json_str(
            r#"{"format_version": 1, "kind": "linear", "coef": [1.0, 1.0, 1.0],
                "intercept": 0.0, "classes": [0, 1]}"#,
        )
        .unwrap();
        let p = SentimentPipeline::new(
            Normalizer::default(),
            FeatureVectorizer::new(Arc::new(vectorizer)),
            Classifier::new(Arc::new(model)),
        );
        assert!(matches!(
            p.analyze("love"),
            Err(Error::DimensionMismatch { expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_summary() {
        let summary = pipeline("[0, 1]").summary();
        assert_eq!(summary.language, "english");
        assert_eq!(summary.vocabulary_size, 3);
        assert_eq!(summary.weighting, "counts");
        assert_eq!(summary.model_kind, "linear");
        assert_eq!(summary.model_input_dimension, 3);
    }

    #[test]
    fn test_panic_message_extraction() {
        assert_eq!(panic_message(Box::new("boom")), "boom");
        assert_eq!(panic_message(Box::new("bang".to_string())), "bang");
        assert_eq!(panic_message(Box::new(42u8)), "analysis panicked");
    }

    #[test]
    fn test_batch_captures_panicking_item() {
        let mut p = pipeline("[0, 1]");
        p.fault_on = Some("great great");
        let texts = ["love it", "great great", "awful"];

        for outcomes in [p.analyze_batch(&texts), p.analyze_batch_parallel(&texts)] {
            assert_eq!(outcomes.len(), 3);
            assert_eq!(outcomes[0].result.as_ref().unwrap(), &SentimentLabel::Positive);
            match &outcomes[1].result {
                Err(Error::AnalysisFailure(msg)) => assert!(msg.contains("injected fault")),
                other => panic!("expected AnalysisFailure, got {:?}", other),
            }
            assert_eq!(outcomes[1].text, "great great");
            assert_eq!(outcomes[2].result.as_ref().unwrap(), &SentimentLabel::Negative);
        }
    }
}
