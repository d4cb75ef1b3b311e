//! Loads the legal knowledge base from JSON files, falling back to the built-in tables.
//!
//! A knowledge directory may contain any of:
//!
//! - `ipc.json`: array of sections with `code` = `"IPC"`
//! - `crpc.json`: array of sections with `code` = `"CrPC"`
//! - `procedures.json`: array of `{ "slug", "title", "steps" }`, in match order
//!
//! Missing files keep the built-in table for that part.

mod validate;

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};
use vidhi_core::knowledge::{builtin_crpc_sections, builtin_ipc_sections, builtin_procedures};
use vidhi_core::{KnowledgeBase, LegalSection, ProcedureBook, ProcedureEntry, SectionTables};

pub use validate::validate;

pub const IPC_FILE: &str = "ipc.json";
pub const CRPC_FILE: &str = "crpc.json";
pub const PROCEDURES_FILE: &str = "procedures.json";

#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("knowledge directory not found: {0}")]
    MissingRoot(PathBuf),
    #[error("failed reading {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed parsing {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate section {code} {number}")]
    DuplicateSection { code: String, number: String },
    #[error("section {code} {number}: number must be digits with an optional letter suffix")]
    InvalidSectionNumber { code: String, number: String },
    #[error("section {number} is tagged {found} but was loaded into the {expected} table")]
    WrongCode {
        expected: String,
        found: String,
        number: String,
    },
    #[error("{0} has an empty title")]
    EmptyTitle(String),
    #[error("invalid procedure slug {0:?}: expected lower-case words joined by underscores")]
    InvalidSlug(String),
    #[error("duplicate procedure slug {0}")]
    DuplicateSlug(String),
    #[error("procedure {0} has no steps")]
    EmptyProcedure(String),
}

pub fn load_dir(root: impl AsRef<Path>) -> Result<KnowledgeBase, KnowledgeError> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(KnowledgeError::MissingRoot(root.to_path_buf()));
    }

    let ipc: Vec<LegalSection> =
        read_optional(&root.join(IPC_FILE))?.unwrap_or_else(builtin_ipc_sections);
    let crpc: Vec<LegalSection> =
        read_optional(&root.join(CRPC_FILE))?.unwrap_or_else(builtin_crpc_sections);
    let procedures = read_optional::<Vec<ProcedureEntry>>(&root.join(PROCEDURES_FILE))?
        .map(ProcedureBook::new)
        .unwrap_or_else(builtin_procedures);

    let kb = KnowledgeBase::new(SectionTables { ipc, crpc }, procedures);
    validate(&kb)?;

    let stats = kb.stats();
    info!(
        root = %root.display(),
        ipc_sections = stats.ipc_sections,
        crpc_sections = stats.crpc_sections,
        procedures = stats.procedures,
        "knowledge base loaded"
    );

    Ok(kb)
}

/// Built-in tables unless a directory is given.
pub fn load_or_builtin(root: Option<&Path>) -> Result<KnowledgeBase, KnowledgeError> {
    match root {
        Some(root) => load_dir(root),
        None => {
            let kb = KnowledgeBase::builtin();
            validate(&kb)?;
            Ok(kb)
        }
    }
}

fn read_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, KnowledgeError> {
    if !path.exists() {
        debug!(path = %path.display(), "knowledge file absent, using built-in table");
        return Ok(None);
    }

    let raw = std::fs::read_to_string(path).map_err(|source| KnowledgeError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| KnowledgeError::Parse {
            path: path.to_path_buf(),
            source,
        })
}
