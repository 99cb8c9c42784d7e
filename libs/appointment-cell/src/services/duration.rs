//! Service duration resolution.
//!
//! The catalog's duration column is legacy free text, so resolution walks
//! a fixed ladder: explicit minutes, then the textual grammar, then an
//! ordered keyword table over the procedure name, then the clinic default.
//! Resolution never fails; a descriptor nobody can interpret books the
//! default 30 minutes.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::{DurationSpec, ServiceRecord};

pub const DEFAULT_APPOINTMENT_MINUTES: u32 = 30;

/// Keyword rules over the service name, most specific first: compound
/// rules (every keyword must match) before single-keyword classes, and
/// longer phrases before their substrings. First hit wins.
const NAME_RULES: &[(&[&str], u32)] = &[
    (&["adjustment", "filling"], 45),
    (&["wisdom", "extraction"], 120),
    (&["implant"], 120),
    (&["surgery"], 120),
    (&["root canal"], 90),
    (&["extraction"], 60),
    (&["crown"], 60),
    (&["bridge"], 60),
    (&["denture"], 60),
    (&["whitening"], 60),
    (&["filling"], 45),
    (&["cleaning"], 30),
    (&["consultation"], 30),
    (&["adjustment"], 15),
    (&["check"], 15),
];

fn clock_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(\d{1,2}):(\d{2})\s*$").expect("valid clock pattern"))
}

fn unit_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+(?:\.\d+)?)\s*([a-zA-Z]+)").expect("valid unit pattern"))
}

/// Resolve one service descriptor to a positive number of minutes.
pub fn resolve(service: &ServiceRecord) -> u32 {
    match &service.duration {
        Some(DurationSpec::Minutes(minutes)) => {
            let rounded = minutes.round();
            if rounded > 0.0 {
                return rounded as u32;
            }
        }
        Some(DurationSpec::Text(text)) => {
            if let Some(minutes) = parse_duration_text(text) {
                return minutes;
            }
        }
        None => {}
    }

    duration_from_name(&service.name).unwrap_or(DEFAULT_APPOINTMENT_MINUTES)
}

/// Total duration of a multi-service booking. An empty selection books the
/// same default as a single unrecognized service.
pub fn combined_duration(services: &[ServiceRecord]) -> u32 {
    if services.is_empty() {
        return DEFAULT_APPOINTMENT_MINUTES;
    }
    services.iter().map(resolve).sum()
}

fn parse_duration_text(text: &str) -> Option<u32> {
    // "H:MM" clock shorthand
    if let Some(caps) = clock_pattern().captures(text) {
        let hours: u32 = caps[1].parse().ok()?;
        let minutes: u32 = caps[2].parse().ok()?;
        let total = hours * 60 + minutes;
        return (total > 0).then_some(total);
    }

    // Repeated "(number)(unit)" tokens: units starting with "h" count as
    // hours, anything else as minutes.
    let mut total = 0.0;
    let mut matched = false;
    for caps in unit_pattern().captures_iter(text) {
        let value: f64 = caps[1].parse().ok()?;
        let unit = caps[2].to_ascii_lowercase();
        total += if unit.starts_with('h') { value * 60.0 } else { value };
        matched = true;
    }
    if matched {
        let rounded = total.round();
        return (rounded > 0.0).then(|| rounded as u32);
    }

    // A bare number means minutes.
    let numeric: f64 = text.trim().parse().ok()?;
    let rounded = numeric.round();
    (rounded > 0.0).then(|| rounded as u32)
}

fn duration_from_name(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    NAME_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().all(|keyword| name.contains(keyword)))
        .map(|(_, minutes)| *minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn named(name: &str) -> ServiceRecord {
        ServiceRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            duration: None,
        }
    }

    fn with_text(duration: &str) -> ServiceRecord {
        ServiceRecord {
            id: Uuid::new_v4(),
            name: "Anything".to_string(),
            duration: Some(DurationSpec::Text(duration.to_string())),
        }
    }

    fn with_minutes(minutes: f64) -> ServiceRecord {
        ServiceRecord {
            id: Uuid::new_v4(),
            name: "Anything".to_string(),
            duration: Some(DurationSpec::Minutes(minutes)),
        }
    }

    #[test]
    fn explicit_minutes_win() {
        assert_eq!(resolve(&with_minutes(45.0)), 45);
        assert_eq!(resolve(&with_minutes(44.6)), 45);
    }

    #[test]
    fn non_positive_minutes_fall_through_to_name() {
        let mut service = with_minutes(0.0);
        service.name = "Teeth Cleaning".to_string();
        assert_eq!(resolve(&service), 30);
    }

    #[test]
    fn hours_and_minutes_text() {
        assert_eq!(resolve(&with_text("1 hour 30 minutes")), 90);
        assert_eq!(resolve(&with_text("2 hours")), 120);
        assert_eq!(resolve(&with_text("45 min")), 45);
        assert_eq!(resolve(&with_text("1 hr 15 mins")), 75);
    }

    #[test]
    fn clock_shorthand_text() {
        assert_eq!(resolve(&with_text("1:30")), 90);
        assert_eq!(resolve(&with_text("0:45")), 45);
    }

    #[test]
    fn bare_number_text_means_minutes() {
        assert_eq!(resolve(&with_text("60")), 60);
        assert_eq!(resolve(&with_text(" 20 ")), 20);
    }

    #[test]
    fn unparseable_text_falls_back_to_name_then_default() {
        let mut service = with_text("ask the front desk");
        service.name = "Dental Implant Placement".to_string();
        assert_eq!(resolve(&service), 120);

        assert_eq!(resolve(&with_text("soon")), DEFAULT_APPOINTMENT_MINUTES);
    }

    #[test]
    fn name_rules_prefer_specific_over_general() {
        // The compound rule outranks the bare adjustment class.
        assert_eq!(resolve(&named("Braces Adjustment")), 15);
        assert_eq!(resolve(&named("Adjustment with Filling")), 45);
        // Phrase before substring: a root canal is not billed as a checkup.
        assert_eq!(resolve(&named("Root Canal Treatment")), 90);
        assert_eq!(resolve(&named("Wisdom Tooth Extraction")), 120);
        assert_eq!(resolve(&named("Tooth Extraction")), 60);
    }

    #[test]
    fn unrecognized_name_books_the_default() {
        assert_eq!(resolve(&named("Mystery Procedure")), DEFAULT_APPOINTMENT_MINUTES);
    }

    #[test]
    fn combined_duration_sums_services() {
        let services = vec![named("Teeth Cleaning"), with_minutes(45.0)];
        assert_eq!(combined_duration(&services), 75);
    }

    #[test]
    fn combined_duration_of_nothing_is_the_default() {
        assert_eq!(combined_duration(&[]), DEFAULT_APPOINTMENT_MINUTES);
    }
}
