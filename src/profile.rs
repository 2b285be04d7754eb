use serde::{Deserialize, Serialize};

/// Raw per-field text harvested from one page.
///
/// Every field is either a trimmed, non-empty string or `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawFieldBundle {
    pub title: Option<String>,
    pub h1_text: Option<String>,
    pub logo_text: Option<String>,
    pub description: Option<String>,
    pub tagline: Option<String>,
    pub mission: Option<String>,
    pub vision: Option<String>,
    pub values: Option<String>,
    pub about: Option<String>,
    #[serde(alias = "heroP")]
    pub hero_paragraph: Option<String>,
}

impl RawFieldBundle {
    /// Re-apply the trimmed/non-empty invariant, e.g. after deserializing.
    pub fn sanitized(self) -> Self {
        Self {
            title: clean(self.title),
            h1_text: clean(self.h1_text),
            logo_text: clean(self.logo_text),
            description: clean(self.description),
            tagline: clean(self.tagline),
            mission: clean(self.mission),
            vision: clean(self.vision),
            values: clean(self.values),
            about: clean(self.about),
            hero_paragraph: clean(self.hero_paragraph),
        }
    }
}

/// Trim `s`; whitespace-only collapses to `None`.
pub fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

fn clean(s: Option<String>) -> Option<String> {
    s.as_deref().and_then(non_empty)
}

/// Structured business profile derived from a [`RawFieldBundle`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_values: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uvp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_solving: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
}

impl BusinessProfile {
    pub fn is_empty(&self) -> bool {
        ProfileField::ALL.iter().all(|f| f.get(self).is_none())
    }
}

/// Named profile fields. `BrandColors` and `TargetEmotion` belong to the
/// wizard's brand stage; extraction never produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    BrandName,
    Description,
    Tagline,
    Mission,
    Vision,
    CoreValues,
    AboutText,
    Uvp,
    ProblemSolving,
    UniqueValue,
    TargetAudience,
    BrandColors,
    TargetEmotion,
}

impl ProfileField {
    /// Fields backed by a `BusinessProfile` slot.
    pub const ALL: &'static [ProfileField] = &[
        ProfileField::BrandName,
        ProfileField::Description,
        ProfileField::Tagline,
        ProfileField::Mission,
        ProfileField::Vision,
        ProfileField::CoreValues,
        ProfileField::AboutText,
        ProfileField::Uvp,
        ProfileField::ProblemSolving,
        ProfileField::UniqueValue,
        ProfileField::TargetAudience,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProfileField::BrandName => "brandName",
            ProfileField::Description => "description",
            ProfileField::Tagline => "tagline",
            ProfileField::Mission => "mission",
            ProfileField::Vision => "vision",
            ProfileField::CoreValues => "coreValues",
            ProfileField::AboutText => "aboutText",
            ProfileField::Uvp => "uvp",
            ProfileField::ProblemSolving => "problemSolving",
            ProfileField::UniqueValue => "uniqueValue",
            ProfileField::TargetAudience => "targetAudience",
            ProfileField::BrandColors => "brandColors",
            ProfileField::TargetEmotion => "targetEmotion",
        }
    }

    fn slot(self, p: &BusinessProfile) -> Option<&Option<String>> {
        match self {
            ProfileField::BrandName => Some(&p.brand_name),
            ProfileField::Description => Some(&p.description),
            ProfileField::Tagline => Some(&p.tagline),
            ProfileField::Mission => Some(&p.mission),
            ProfileField::Vision => Some(&p.vision),
            ProfileField::CoreValues => Some(&p.core_values),
            ProfileField::AboutText => Some(&p.about_text),
            ProfileField::Uvp => Some(&p.uvp),
            ProfileField::ProblemSolving => Some(&p.problem_solving),
            ProfileField::UniqueValue => Some(&p.unique_value),
            ProfileField::TargetAudience => Some(&p.target_audience),
            ProfileField::BrandColors | ProfileField::TargetEmotion => None,
        }
    }

    fn slot_mut(self, p: &mut BusinessProfile) -> Option<&mut Option<String>> {
        match self {
            ProfileField::BrandName => Some(&mut p.brand_name),
            ProfileField::Description => Some(&mut p.description),
            ProfileField::Tagline => Some(&mut p.tagline),
            ProfileField::Mission => Some(&mut p.mission),
            ProfileField::Vision => Some(&mut p.vision),
            ProfileField::CoreValues => Some(&mut p.core_values),
            ProfileField::AboutText => Some(&mut p.about_text),
            ProfileField::Uvp => Some(&mut p.uvp),
            ProfileField::ProblemSolving => Some(&mut p.problem_solving),
            ProfileField::UniqueValue => Some(&mut p.unique_value),
            ProfileField::TargetAudience => Some(&mut p.target_audience),
            ProfileField::BrandColors | ProfileField::TargetEmotion => None,
        }
    }

    pub fn get(self, p: &BusinessProfile) -> Option<&str> {
        self.slot(p).and_then(|v| v.as_deref())
    }

    /// Set the field; a no-op for fields the profile has no slot for.
    pub fn set(self, p: &mut BusinessProfile, value: Option<String>) {
        if let Some(slot) = self.slot_mut(p) {
            *slot = value;
        }
    }
}
