//! Text preprocessing: normalization, stopwords, lemmatization

mod lemmatizer;
mod normalizer;
mod stopwords;

pub use lemmatizer::Lemmatizer;
pub use normalizer::Normalizer;

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Language whose stopword set the normalizer applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::English => "english",
        }
    }

    pub(crate) fn stopwords(self) -> &'static HashSet<&'static str> {
        match self {
            Language::English => &stopwords::ENGLISH_STOPWORDS,
        }
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            other => Err(Error::Config(format!("Unsupported language: {}", other))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse() {
        assert_eq!("english".parse::<Language>().unwrap(), Language::English);
        assert_eq!(" EN ".parse::<Language>().unwrap(), Language::English);
        assert!(matches!("klingon".parse::<Language>(), Err(Error::Config(_))));
    }
}
