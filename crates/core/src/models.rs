use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const IPC_CODE: &str = "IPC";
pub const CRPC_CODE: &str = "CrPC";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalSection {
    pub code: String,
    pub number: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub punishment: Option<String>,
}

impl LegalSection {
    pub fn key(&self) -> (String, String) {
        (self.code.to_lowercase(), self.number.to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalProcedure {
    pub title: String,
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcedureEntry {
    pub slug: String,
    #[serde(flatten)]
    pub procedure: LegalProcedure,
}

impl ProcedureEntry {
    /// The phrase a query has to contain for this procedure to match.
    pub fn trigger_phrase(&self) -> String {
        self.slug.replace('_', " ")
    }
}

/// IPC and CrPC tables, each kept in definition order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionTables {
    pub ipc: Vec<LegalSection>,
    pub crpc: Vec<LegalSection>,
}

/// Slug-keyed procedures. Iteration follows definition order, not slug order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcedureBook {
    entries: Vec<ProcedureEntry>,
}

impl ProcedureBook {
    pub fn new(entries: Vec<ProcedureEntry>) -> Self {
        Self { entries }
    }

    pub fn get(&self, slug: &str) -> Option<&LegalProcedure> {
        self.entries
            .iter()
            .find(|entry| entry.slug == slug)
            .map(|entry| &entry.procedure)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProcedureEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub sections: SectionTables,
    pub procedures: ProcedureBook,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KnowledgeStats {
    pub ipc_sections: usize,
    pub crpc_sections: usize,
    pub procedures: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioFamily {
    Theft,
    Assault,
    Homicide,
    SexualOffense,
    Fraud,
}

/// Which rule of the selection chain produced a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum MatchedRule {
    IpcSection { number: String },
    CrpcSection { number: String },
    Procedure { slug: String },
    Scenario { family: ScenarioFamily },
    FirFiling,
    Fallback,
}

impl MatchedRule {
    pub fn label(&self) -> &'static str {
        match self {
            Self::IpcSection { .. } => "ipc_section",
            Self::CrpcSection { .. } => "crpc_section",
            Self::Procedure { .. } => "procedure",
            Self::Scenario { .. } => "scenario",
            Self::FirFiling => "fir_filing",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub rule: MatchedRule,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub text: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTranscript {
    pub session_id: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatInput {
    pub session_id: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantReply {
    pub session_id: String,
    pub reply_text: String,
    pub matched: MatchedRule,
    pub disclaimer: String,
}
