use crate::profile::{BusinessProfile, ProfileField, RawFieldBundle};

use super::brand;

/// Acceptance policy for a raw value. Lengths are in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    NonEmpty,
    LongerThan(usize),
    /// Exclusive on both ends.
    Between(usize, usize),
}

impl Gate {
    pub fn accepts(self, value: &str) -> bool {
        let len = value.chars().count();
        match self {
            Gate::NonEmpty => len > 0,
            Gate::LongerThan(min) => len > min,
            Gate::Between(lo, hi) => len > lo && len < hi,
        }
    }
}

/// Raw bundle fields that feed a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawField {
    Description,
    Tagline,
    Mission,
    Vision,
    Values,
    About,
    HeroParagraph,
}

impl RawField {
    fn get(self, raw: &RawFieldBundle) -> Option<&String> {
        match self {
            RawField::Description => raw.description.as_ref(),
            RawField::Tagline => raw.tagline.as_ref(),
            RawField::Mission => raw.mission.as_ref(),
            RawField::Vision => raw.vision.as_ref(),
            RawField::Values => raw.values.as_ref(),
            RawField::About => raw.about.as_ref(),
            RawField::HeroParagraph => raw.hero_paragraph.as_ref(),
        }
    }
}

/// Raw field → profile field, under a gate. Brand name is derived separately.
pub const GATES: &[(RawField, ProfileField, Gate)] = &[
    (RawField::Description, ProfileField::Description, Gate::NonEmpty),
    (RawField::Tagline, ProfileField::Tagline, Gate::NonEmpty),
    (RawField::Mission, ProfileField::Mission, Gate::LongerThan(20)),
    (RawField::Vision, ProfileField::Vision, Gate::LongerThan(20)),
    (RawField::Values, ProfileField::CoreValues, Gate::LongerThan(10)),
    (RawField::About, ProfileField::AboutText, Gate::LongerThan(50)),
    (RawField::HeroParagraph, ProfileField::Uvp, Gate::Between(30, 300)),
];

/// First pass: per-field cleanup and length-gated acceptance.
pub fn normalize(raw: &RawFieldBundle) -> BusinessProfile {
    let mut profile = BusinessProfile {
        brand_name: brand::derive(raw),
        ..Default::default()
    };

    for (source, target, gate) in GATES {
        let accepted = source.get(raw).filter(|v| gate.accepts(v)).cloned();
        target.set(&mut profile, accepted);
    }

    profile
}
