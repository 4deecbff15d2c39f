//! # Sentiment Core Library
//!
//! Text-to-prediction pipeline for binary review sentiment:
//! - Text normalization (stopwords, lemmatization)
//! - Feature vectorization against a frozen vocabulary
//! - Binary classification with a pre-trained model
//! - Artifact loading and bootstrap configuration

pub mod artifact;
pub mod classifier;
pub mod config;
pub mod error;
pub mod label;
pub mod pipeline;
pub mod text;
pub mod vectorizer;

pub use classifier::{Classifier, ModelArtifact};
pub use error::{Error, Result};
pub use label::SentimentLabel;
pub use pipeline::{BatchOutcome, PipelineSummary, SentimentPipeline};
pub use text::{Language, Normalizer};
pub use vectorizer::{FeatureVector, FeatureVectorizer, VectorizerArtifact};
