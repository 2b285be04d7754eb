pub mod brand;
pub mod classify;
pub mod enhance;
pub mod normalize;

use crate::profile::{BusinessProfile, RawFieldBundle};

/// Two-pass pipeline: raw bundle → normalized profile → enhanced profile.
///
/// Pure and total: no I/O, no shared state, an empty bundle yields an
/// empty profile.
pub fn extract(raw: &RawFieldBundle) -> BusinessProfile {
    let normalized = normalize::normalize(raw);
    enhance::enhance(&normalized)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn idempotent() {
        let raw = RawFieldBundle {
            title: s("Acme | Home"),
            description: s("Acme makes anvils."),
            about: s("Acme was founded to solve the anvil problem for people who hunt roadrunners."),
            ..Default::default()
        };
        assert_eq!(extract(&raw), extract(&raw));
    }

    #[test]
    fn empty_bundle() {
        assert!(extract(&RawFieldBundle::default()).is_empty());
    }

    #[test]
    fn short_mission_falls_back_to_description() {
        let raw = RawFieldBundle {
            mission: s("Our mission"),
            description: s("We build tools for teams."),
            ..Default::default()
        };
        let p = extract(&raw);
        assert_eq!(p.mission.as_deref(), Some("We build tools for teams."));
    }

    #[test]
    fn mission_falls_back_to_uvp() {
        let hero = "Payroll that runs itself, every single month.";
        assert_eq!(hero.chars().count(), 45);
        let raw = RawFieldBundle {
            hero_paragraph: s(hero),
            ..Default::default()
        };
        let p = extract(&raw);
        assert_eq!(p.uvp.as_deref(), Some(hero));
        assert_eq!(p.mission.as_deref(), Some(hero));
    }

    #[test]
    fn short_hero_never_reaches_mission() {
        let raw = RawFieldBundle {
            hero_paragraph: s("Too short"),
            ..Default::default()
        };
        let p = extract(&raw);
        assert!(p.uvp.is_none());
        assert!(p.mission.is_none());
    }

    #[test]
    fn classification_runs_on_accepted_about_only() {
        // 50 characters: rejected by the gate, so nothing is inferred.
        let about = "We solve problems for customers in a unique way!!!";
        assert_eq!(about.chars().count(), 50);
        let raw = RawFieldBundle {
            about: s(about),
            ..Default::default()
        };
        let p = extract(&raw);
        assert!(p.about_text.is_none());
        assert!(p.problem_solving.is_none());
        assert!(p.unique_value.is_none());
        assert!(p.target_audience.is_none());
    }

    #[test]
    fn unique_value_gate_independent_of_problem_gate() {
        let raw = RawFieldBundle {
            about: s("Every business has a problem with invoices. We fix that problem quickly and reliably."),
            ..Default::default()
        };
        let p = extract(&raw);
        assert_eq!(
            p.problem_solving.as_deref(),
            Some("Every business has a problem with invoices")
        );
        assert!(p.unique_value.is_none());
    }

    #[test]
    fn full_page() {
        let raw = RawFieldBundle {
            title: s("Northwind Traders Ltd. | Fine foods"),
            h1_text: s("Fine foods, delivered"),
            logo_text: None,
            description: s("Northwind delivers specialty foods to restaurants."),
            tagline: s("Taste the difference"),
            mission: s("To bring the world's best ingredients to every kitchen."),
            vision: s("A world where every chef can source anything"),
            values: s("Quality, honesty, speed"),
            about: s("Founded in 1998, Northwind began as a small importer. Unlike big distributors, we know every farm we buy from. We serve restaurants and people who love to cook."),
            hero_paragraph: s("Specialty ingredients, delivered overnight to your door."),
        };
        let p = extract(&raw);
        assert_eq!(p.brand_name.as_deref(), Some("Fine foods, delivered"));
        assert_eq!(p.mission.as_deref(), Some("To bring the world's best ingredients to every kitchen."));
        assert_eq!(p.core_values.as_deref(), Some("Quality, honesty, speed"));
        assert_eq!(
            p.unique_value.as_deref(),
            Some("Unlike big distributors, we know every farm we buy from")
        );
        assert_eq!(
            p.target_audience.as_deref(),
            Some("We serve restaurants and people who love to cook")
        );
        assert!(p.problem_solving.is_none());
        assert_eq!(
            p.uvp.as_deref(),
            Some("Specialty ingredients, delivered overnight to your door.")
        );
    }
}
