use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::profile::{BusinessProfile, ProfileField};

/// Wizard stages a caller can ask to populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Concept,
    Brand,
    Marketing,
    Operations,
    Growth,
}

impl Section {
    pub const ALL: &'static [Section] = &[
        Section::Concept,
        Section::Brand,
        Section::Marketing,
        Section::Operations,
        Section::Growth,
    ];

    /// Profile fields a section pulls in.
    pub fn fields(self) -> &'static [ProfileField] {
        match self {
            Section::Concept => &[
                ProfileField::Mission,
                ProfileField::Vision,
                ProfileField::CoreValues,
                ProfileField::TargetAudience,
                ProfileField::ProblemSolving,
                ProfileField::UniqueValue,
            ],
            Section::Brand => &[
                ProfileField::BrandName,
                ProfileField::Tagline,
                ProfileField::BrandColors,
                ProfileField::TargetEmotion,
                ProfileField::Uvp,
            ],
            Section::Marketing | Section::Operations | Section::Growth => &[],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Concept => "concept",
            Section::Brand => "brand",
            Section::Marketing => "marketing",
            Section::Operations => "operations",
            Section::Growth => "growth",
        }
    }
}

impl FromStr for Section {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match Section::ALL.iter().find(|sec| sec.as_str() == s.trim()) {
            Some(sec) => Ok(*sec),
            None => bail!(
                "unknown section '{}' (expected one of: concept, brand, marketing, operations, growth)",
                s.trim()
            ),
        }
    }
}

/// `{"concept": true, "brand": false, ...}`; missing keys are unselected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionSelection {
    pub concept: bool,
    pub brand: bool,
    pub marketing: bool,
    pub operations: bool,
    pub growth: bool,
}

impl SectionSelection {
    pub fn contains(&self, section: Section) -> bool {
        match section {
            Section::Concept => self.concept,
            Section::Brand => self.brand,
            Section::Marketing => self.marketing,
            Section::Operations => self.operations,
            Section::Growth => self.growth,
        }
    }

    pub fn insert(&mut self, section: Section) {
        match section {
            Section::Concept => self.concept = true,
            Section::Brand => self.brand = true,
            Section::Marketing => self.marketing = true,
            Section::Operations => self.operations = true,
            Section::Growth => self.growth = true,
        }
    }
}

impl FromStr for SectionSelection {
    type Err = anyhow::Error;

    /// Comma-separated list, e.g. `concept,brand`.
    fn from_str(s: &str) -> anyhow::Result<Self> {
        let mut selection = SectionSelection::default();
        for part in s.split(',').filter(|p| !p.trim().is_empty()) {
            selection.insert(part.parse()?);
        }
        Ok(selection)
    }
}

/// Keep only fields of the selected sections; `None` keeps everything.
pub fn filter_by_sections(
    profile: &BusinessProfile,
    sections: Option<&SectionSelection>,
) -> BusinessProfile {
    let Some(selection) = sections else {
        return profile.clone();
    };

    let mut out = BusinessProfile::default();
    for section in Section::ALL.iter().filter(|s| selection.contains(**s)) {
        for field in section.fields() {
            field.set(&mut out, field.get(profile).map(str::to_string));
        }
    }
    out
}

/// Concept & research stage of the wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StageZero {
    pub business_name: Option<String>,
    pub mission: Option<String>,
    pub vision: Option<String>,
    pub core_values: Option<String>,
    pub target_audience: Option<String>,
    pub problem_solving: Option<String>,
    pub unique_value: Option<String>,
}

/// Brand identity stage of the wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StageOne {
    pub brand_name: Option<String>,
    pub tagline: Option<String>,
    pub brand_colors: Option<String>,
    pub target_emotion: Option<String>,
    pub uvp: Option<String>,
}

pub const STAGE_ZERO_KEY: &str = "stage-zero";
pub const STAGE_ONE_KEY: &str = "stage-one";

fn overwrite(dst: &mut Option<String>, src: &Option<String>) -> bool {
    match src {
        Some(v) => {
            *dst = Some(v.clone());
            true
        }
        None => false,
    }
}

/// Copy present profile fields into the stage; returns how many were written.
pub fn merge_into_stage_zero(stage: &mut StageZero, p: &BusinessProfile) -> usize {
    [
        overwrite(&mut stage.business_name, &p.brand_name),
        overwrite(&mut stage.mission, &p.mission),
        overwrite(&mut stage.vision, &p.vision),
        overwrite(&mut stage.core_values, &p.core_values),
        overwrite(&mut stage.target_audience, &p.target_audience),
        overwrite(&mut stage.problem_solving, &p.problem_solving),
        overwrite(&mut stage.unique_value, &p.unique_value),
    ]
    .iter()
    .filter(|w| **w)
    .count()
}

pub fn merge_into_stage_one(stage: &mut StageOne, p: &BusinessProfile) -> usize {
    [
        overwrite(&mut stage.brand_name, &p.brand_name),
        overwrite(&mut stage.tagline, &p.tagline),
        overwrite(&mut stage.uvp, &p.uvp),
    ]
    .iter()
    .filter(|w| **w)
    .count()
}

/// Which stages an import should touch. No selection means both.
pub fn stages_for(sections: Option<&SectionSelection>) -> (bool, bool) {
    match sections {
        Some(s) => (s.concept, s.brand),
        None => (true, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> BusinessProfile {
        BusinessProfile {
            brand_name: Some("Acme".into()),
            description: Some("Anvils".into()),
            tagline: Some("Drop it".into()),
            mission: Some("Anvils for everyone, everywhere".into()),
            vision: Some("A world with more anvils in it".into()),
            about_text: Some("About us".into()),
            uvp: Some("The heaviest anvil money can buy".into()),
            problem_solving: Some("We solve falling problems".into()),
            ..Default::default()
        }
    }

    #[test]
    fn no_selection_passes_through() {
        let p = profile();
        assert_eq!(filter_by_sections(&p, None), p);
    }

    #[test]
    fn concept_only() {
        let sel: SectionSelection = "concept".parse().unwrap();
        let out = filter_by_sections(&profile(), Some(&sel));
        assert!(out.mission.is_some());
        assert!(out.vision.is_some());
        assert!(out.problem_solving.is_some());
        assert!(out.brand_name.is_none());
        assert!(out.tagline.is_none());
        assert!(out.description.is_none());
        assert!(out.about_text.is_none());
    }

    #[test]
    fn brand_only() {
        let sel = SectionSelection {
            brand: true,
            ..Default::default()
        };
        let out = filter_by_sections(&profile(), Some(&sel));
        assert_eq!(out.brand_name.as_deref(), Some("Acme"));
        assert!(out.uvp.is_some());
        assert!(out.mission.is_none());
    }

    #[test]
    fn unpopulated_sections_select_nothing() {
        let sel: SectionSelection = "marketing,growth".parse().unwrap();
        assert!(filter_by_sections(&profile(), Some(&sel)).is_empty());
    }

    #[test]
    fn selection_from_json_defaults_missing_keys() {
        let sel: SectionSelection = serde_json::from_str(r#"{"brand":true}"#).unwrap();
        assert!(sel.brand);
        assert!(!sel.concept);
    }

    #[test]
    fn unknown_section_rejected() {
        assert!("concept,finance".parse::<SectionSelection>().is_err());
        let sel: SectionSelection = " concept , brand ".parse().unwrap();
        assert!(sel.concept && sel.brand);
    }

    #[test]
    fn merge_only_overwrites_present_fields() {
        let mut stage = StageZero {
            business_name: Some("Old".into()),
            core_values: Some("Keep me".into()),
            ..Default::default()
        };
        let written = merge_into_stage_zero(&mut stage, &profile());
        assert_eq!(written, 4);
        assert_eq!(stage.business_name.as_deref(), Some("Acme"));
        assert_eq!(stage.core_values.as_deref(), Some("Keep me"));
        assert_eq!(stage.problem_solving.as_deref(), Some("We solve falling problems"));
    }

    #[test]
    fn merge_stage_one_keeps_colors() {
        let mut stage = StageOne {
            brand_colors: Some("#ff0000".into()),
            ..Default::default()
        };
        merge_into_stage_one(&mut stage, &profile());
        assert_eq!(stage.brand_colors.as_deref(), Some("#ff0000"));
        assert_eq!(stage.tagline.as_deref(), Some("Drop it"));
    }

    #[test]
    fn stage_json_is_camel_case() {
        let stage = StageZero {
            business_name: Some("Acme".into()),
            ..Default::default()
        };
        let v = serde_json::to_value(&stage).unwrap();
        assert_eq!(v["businessName"], "Acme");
    }

    #[test]
    fn stage_targets() {
        assert_eq!(stages_for(None), (true, true));
        let sel: SectionSelection = "brand".parse().unwrap();
        assert_eq!(stages_for(Some(&sel)), (false, true));
    }
}
