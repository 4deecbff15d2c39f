//! Noun-form lemmatizer
//!
//! Reduces tokens to a dictionary base form without part-of-speech tagging.
//! With a lexicon attached, candidates produced by the noun detachment rules
//! are accepted only if the lexicon knows them, and the shortest known form
//! wins. Without a lexicon a conservative suffix heuristic is used instead.

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;

/// Noun detachment rules, tried in this order
const NOUN_RULES: &[(&str, &str)] = &[
    ("s", ""),
    ("ses", "s"),
    ("ves", "f"),
    ("xes", "x"),
    ("zes", "z"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("men", "man"),
    ("ies", "y"),
];

/// Irregular plurals no suffix rule can recover
const IRREGULAR: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("mice", "mouse"),
    ("lice", "louse"),
    ("oxen", "ox"),
    ("knives", "knife"),
    ("wives", "wife"),
    ("lives", "life"),
    ("leaves", "leaf"),
    ("halves", "half"),
    ("shelves", "shelf"),
    ("wolves", "wolf"),
    ("thieves", "thief"),
    ("selves", "self"),
    ("criteria", "criterion"),
    ("phenomena", "phenomenon"),
    ("analyses", "analysis"),
    ("crises", "crisis"),
    ("theses", "thesis"),
    ("indices", "index"),
    ("data", "datum"),
];

/// Token lemmatizer, optionally backed by a lexicon of known base forms
#[derive(Debug, Clone, Default)]
pub struct Lemmatizer {
    lexicon: Option<Arc<HashSet<String>>>,
}

impl Lemmatizer {
    /// Heuristic lemmatizer with no lexicon
    pub fn new() -> Self {
        Self::default()
    }

    /// Lemmatizer that only emits forms present in `lexicon`
    pub fn with_lexicon<I, S>(lexicon: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lexicon: Some(Arc::new(lexicon.into_iter().map(Into::into).collect())),
        }
    }

    pub fn has_lexicon(&self) -> bool {
        self.lexicon.is_some()
    }

    /// Lemmatize a single lowercase token
    pub fn lemmatize<'a>(&self, word: &'a str) -> Cow<'a, str> {
        if let Some(base) = irregular(word) {
            return Cow::Borrowed(base);
        }

        match &self.lexicon {
            Some(lexicon) => lookup(lexicon, word),
            None => heuristic(word),
        }
    }
}

fn irregular(word: &str) -> Option<&'static str> {
    IRREGULAR
        .iter()
        .find(|(plural, _)| *plural == word)
        .map(|(_, base)| *base)
}

/// Shortest known form among the word itself and its rule candidates
fn lookup<'a>(lexicon: &HashSet<String>, word: &'a str) -> Cow<'a, str> {
    let mut best: Option<String> = None;

    let mut consider = |candidate: String| {
        if lexicon.contains(&candidate)
            && best.as_ref().map_or(true, |b| candidate.len() < b.len())
        {
            best = Some(candidate);
        }
    };

    consider(word.to_string());
    for (suffix, replacement) in NOUN_RULES {
        if let Some(stem) = word.strip_suffix(suffix) {
            if !stem.is_empty() {
                consider(format!("{}{}", stem, replacement));
            }
        }
    }

    match best {
        Some(found) if found != word => Cow::Owned(found),
        _ => Cow::Borrowed(word),
    }
}

fn heuristic(word: &str) -> Cow<'_, str> {
    if word.len() <= 3
        || word.ends_with("ss")
        || word.ends_with("us")
        || word.ends_with("is")
        || !word.ends_with('s')
    {
        return Cow::Borrowed(word);
    }

    if let Some(stem) = word.strip_suffix("sses") {
        return Cow::Owned(format!("{}ss", stem));
    }
    if word.len() > 4 {
        if let Some(stem) = word.strip_suffix("ies") {
            return Cow::Owned(format!("{}y", stem));
        }
    }
    for (suffix, strip) in [("zzes", 3), ("xes", 2), ("ches", 2), ("shes", 2)] {
        if word.ends_with(suffix) {
            return Cow::Borrowed(&word[..word.len() - strip]);
        }
    }

    Cow::Borrowed(&word[..word.len() - 1])
}
