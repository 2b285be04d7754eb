use crate::profile::ProfileField;

/// Keyword rule assigning one sentence of free text to a profile field.
#[derive(Debug, Clone, Copy)]
pub struct SentenceRule {
    pub target: ProfileField,
    /// At least one must appear in the whole text for the rule to run.
    pub triggers: &'static [&'static str],
    /// At least one must appear in a sentence for it to be selected.
    pub matches: &'static [&'static str],
    /// If non-empty, the sentence must also contain one of these.
    pub requires: &'static [&'static str],
}

pub const RULES: &[SentenceRule] = &[
    SentenceRule {
        target: ProfileField::ProblemSolving,
        triggers: &["solve", "problem", "challenge"],
        matches: &["solve", "problem", "challenge"],
        requires: &[],
    },
    SentenceRule {
        target: ProfileField::UniqueValue,
        triggers: &["unique", "different", "unlike"],
        matches: &["unique", "different", "unlike"],
        requires: &[],
    },
    SentenceRule {
        target: ProfileField::TargetAudience,
        triggers: &["for", "help", "serve"],
        matches: &["for", "help", "serve"],
        requires: &["business", "people", "customers"],
    },
];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Split on runs of '.', '!' or '?'; pieces are trimmed, empty ones dropped.
pub fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

impl SentenceRule {
    /// Whole-text gate, case-insensitive.
    pub fn triggered(&self, text: &str) -> bool {
        contains_any(&text.to_lowercase(), self.triggers)
    }

    fn selects(&self, sentence: &str) -> bool {
        let lower = sentence.to_lowercase();
        contains_any(&lower, self.matches)
            && (self.requires.is_empty() || contains_any(&lower, self.requires))
    }

    /// First qualifying sentence, original case, or `None`.
    pub fn classify(&self, text: &str) -> Option<String> {
        if !self.triggered(text) {
            return None;
        }
        split_sentences(text)
            .find(|s| self.selects(s))
            .map(str::to_string)
    }
}
