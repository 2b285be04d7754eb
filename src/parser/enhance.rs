use crate::profile::BusinessProfile;

use super::classify::RULES;

/// One cross-field inference, applied at most once per extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// mission ← description, when mission is missing.
    MissionFromDescription,
    /// problemSolving / uniqueValue / targetAudience ← sentences of aboutText.
    ClassifySentences,
    /// mission ← uvp, when mission is still missing.
    MissionFromUvp,
}

pub const STEPS: &[Step] = &[
    Step::MissionFromDescription,
    Step::ClassifySentences,
    Step::MissionFromUvp,
];

impl Step {
    fn apply(self, p: &mut BusinessProfile) {
        match self {
            Step::MissionFromDescription => {
                if p.mission.is_none() {
                    p.mission = p.description.clone();
                }
            }
            Step::ClassifySentences => {
                let Some(about) = p.about_text.clone() else {
                    return;
                };
                for rule in RULES {
                    if rule.target.get(p).is_some() {
                        continue;
                    }
                    if let Some(sentence) = rule.classify(&about) {
                        rule.target.set(p, Some(sentence));
                    }
                }
            }
            Step::MissionFromUvp => {
                if p.mission.is_none() {
                    p.mission = p.uvp.clone();
                }
            }
        }
    }
}

/// Second pass over a normalized profile. Returns a new record.
pub fn enhance(normalized: &BusinessProfile) -> BusinessProfile {
    let mut out = normalized.clone();
    for step in STEPS {
        step.apply(&mut out);
    }
    out
}
