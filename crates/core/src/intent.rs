use crate::models::ScenarioFamily;

pub struct ScenarioRule {
    pub family: ScenarioFamily,
    pub keywords: &'static [&'static str],
}

/// Evaluated top to bottom; the first family with a keyword hit wins.
pub const SCENARIO_RULES: &[ScenarioRule] = &[
    ScenarioRule {
        family: ScenarioFamily::Theft,
        keywords: &["theft", "robbery", "stolen"],
    },
    ScenarioRule {
        family: ScenarioFamily::Assault,
        keywords: &["hurt", "injury", "assault", "hit"],
    },
    ScenarioRule {
        family: ScenarioFamily::Homicide,
        keywords: &["murder", "kill", "death"],
    },
    ScenarioRule {
        family: ScenarioFamily::SexualOffense,
        keywords: &["rape", "sexual assault", "molest"],
    },
    ScenarioRule {
        family: ScenarioFamily::Fraud,
        keywords: &["fraud", "cheat", "dupe"],
    },
];

const REPORT_FILING_KEYWORDS: &[&str] = &["file fir", "how to report", "complaint"];

pub fn normalize_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Expects an already lower-cased query.
pub fn detect_scenario(lower: &str) -> Option<ScenarioFamily> {
    SCENARIO_RULES
        .iter()
        .find(|rule| contains_any(lower, rule.keywords))
        .map(|rule| rule.family)
}

pub fn mentions_report_filing(lower: &str) -> bool {
    contains_any(lower, REPORT_FILING_KEYWORDS)
}

pub(crate) fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theft_outranks_assault() {
        assert_eq!(
            detect_scenario("theft and assault"),
            Some(ScenarioFamily::Theft)
        );
    }

    #[test]
    fn sexual_assault_is_caught_by_assault_first() {
        // "assault" belongs to the earlier family, so it fires before the sexual-offense rule.
        assert_eq!(
            detect_scenario("sexual assault case"),
            Some(ScenarioFamily::Assault)
        );
        assert_eq!(
            detect_scenario("he tried to molest her"),
            Some(ScenarioFamily::SexualOffense)
        );
    }

    #[test]
    fn keywords_match_inside_words() {
        assert_eq!(detect_scenario("white car"), Some(ScenarioFamily::Assault));
        assert_eq!(detect_scenario("my neighbour"), None);
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize_text("  file \n  fir\t"), "file fir");
    }
}
