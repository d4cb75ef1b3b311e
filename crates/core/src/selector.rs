use crate::intent::{contains_any, detect_scenario, mentions_report_filing};
use crate::models::{
    KnowledgeBase, LegalSection, MatchedRule, ProcedureBook, SectionTables, Selection,
};
use crate::templates;

/// Picks the canned response for `query`. Total: unmatched input falls through to
/// the generic fallback, so the result is never empty.
pub fn select_response(query: &str, sections: &SectionTables, procedures: &ProcedureBook) -> String {
    select(query, sections, procedures).text
}

pub fn select(query: &str, sections: &SectionTables, procedures: &ProcedureBook) -> Selection {
    let lower = query.to_lowercase();

    // Section numbers are matched as stored against the lower-cased query, as plain
    // substrings: "section 3020" still hits 302, and lettered numbers such as 304B
    // never match.
    if let Some(section) = first_section(&sections.ipc, &lower, |number| {
        [format!("ipc {number}"), format!("section {number}")]
    }) {
        return Selection {
            rule: MatchedRule::IpcSection {
                number: section.number.clone(),
            },
            text: templates::ipc_section(section),
        };
    }

    if let Some(section) = first_section(&sections.crpc, &lower, |number| {
        [format!("crpc {number}"), format!("section {number} crpc")]
    }) {
        return Selection {
            rule: MatchedRule::CrpcSection {
                number: section.number.clone(),
            },
            text: templates::crpc_section(section),
        };
    }

    if let Some(entry) = procedures
        .iter()
        .find(|entry| lower.contains(&entry.trigger_phrase()))
    {
        return Selection {
            rule: MatchedRule::Procedure {
                slug: entry.slug.clone(),
            },
            text: templates::procedure(&entry.procedure),
        };
    }

    if let Some(family) = detect_scenario(&lower) {
        return Selection {
            rule: MatchedRule::Scenario { family },
            text: templates::scenario_analysis(family),
        };
    }

    if mentions_report_filing(&lower) {
        return Selection {
            rule: MatchedRule::FirFiling,
            text: templates::fir_filing(),
        };
    }

    Selection {
        rule: MatchedRule::Fallback,
        text: templates::fallback(),
    }
}

fn first_section<'a, F>(table: &'a [LegalSection], lower: &str, patterns: F) -> Option<&'a LegalSection>
where
    F: Fn(&str) -> [String; 2],
{
    table.iter().find(|section| {
        let needles = patterns(section.number.as_str());
        contains_any(lower, &[needles[0].as_str(), needles[1].as_str()])
    })
}

impl KnowledgeBase {
    pub fn select(&self, query: &str) -> Selection {
        select(query, &self.sections, &self.procedures)
    }

    pub fn respond(&self, query: &str) -> String {
        self.select(query).text
    }
}
