use std::collections::HashSet;

use regex::Regex;
use vidhi_core::{KnowledgeBase, LegalSection, CRPC_CODE, IPC_CODE};

use crate::KnowledgeError;

pub fn validate(kb: &KnowledgeBase) -> Result<(), KnowledgeError> {
    let number_pattern = Regex::new(r"^[0-9]+[A-Za-z]*$").expect("valid section number regex");
    let slug_pattern = Regex::new(r"^[a-z0-9]+(_[a-z0-9]+)*$").expect("valid slug regex");

    let mut seen_sections = HashSet::new();
    for (expected, table) in [(IPC_CODE, &kb.sections.ipc), (CRPC_CODE, &kb.sections.crpc)] {
        for section in table {
            check_section(expected, section, &number_pattern)?;
            if !seen_sections.insert(section.key()) {
                return Err(KnowledgeError::DuplicateSection {
                    code: section.code.clone(),
                    number: section.number.clone(),
                });
            }
        }
    }

    let mut seen_slugs = HashSet::new();
    for entry in kb.procedures.iter() {
        if !slug_pattern.is_match(&entry.slug) {
            return Err(KnowledgeError::InvalidSlug(entry.slug.clone()));
        }
        if !seen_slugs.insert(entry.slug.as_str()) {
            return Err(KnowledgeError::DuplicateSlug(entry.slug.clone()));
        }
        if entry.procedure.title.trim().is_empty() {
            return Err(KnowledgeError::EmptyTitle(format!("procedure {}", entry.slug)));
        }
        if entry.procedure.steps.iter().all(|step| step.trim().is_empty()) {
            return Err(KnowledgeError::EmptyProcedure(entry.slug.clone()));
        }
    }

    Ok(())
}

fn check_section(
    expected: &str,
    section: &LegalSection,
    number_pattern: &Regex,
) -> Result<(), KnowledgeError> {
    if !section.code.eq_ignore_ascii_case(expected) {
        return Err(KnowledgeError::WrongCode {
            expected: expected.to_string(),
            found: section.code.clone(),
            number: section.number.clone(),
        });
    }
    if !number_pattern.is_match(&section.number) {
        return Err(KnowledgeError::InvalidSectionNumber {
            code: section.code.clone(),
            number: section.number.clone(),
        });
    }
    if section.title.trim().is_empty() {
        return Err(KnowledgeError::EmptyTitle(format!(
            "section {} {}",
            section.code, section.number
        )));
    }
    Ok(())
}
