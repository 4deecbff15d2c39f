//! Binary sentiment label

use crate::{Error, Result};
use serde::Serialize;
use std::fmt;

/// Output of the classifier: 0 = negative, 1 = positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Negative,
    Positive,
}

impl SentimentLabel {
    /// Labels the service can return, in display order
    pub const SUPPORTED: [SentimentLabel; 2] = [SentimentLabel::Positive, SentimentLabel::Negative];

    /// Raw numeric value (0 or 1)
    pub fn as_raw(self) -> i64 {
        match self {
            SentimentLabel::Negative => 0,
            SentimentLabel::Positive => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Negative => "negative",
            SentimentLabel::Positive => "positive",
        }
    }
}

impl TryFrom<i64> for SentimentLabel {
    type Error = Error;

    /// Anything other than exactly 0 or 1 is an invariant violation, never coerced
    fn try_from(raw: i64) -> Result<Self> {
        match raw {
            0 => Ok(SentimentLabel::Negative),
            1 => Ok(SentimentLabel::Positive),
            other => Err(Error::InvariantViolation(other)),
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
