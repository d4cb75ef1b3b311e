use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;
use vidhi_core::templates::{GREETING, STANDING_DISCLAIMER};
use vidhi_core::{
    normalize_text, AssistantReply, ChatInput, ChatMessage, ChatRole, ConversationTranscript,
    KnowledgeBase, KnowledgeStats, LegalProcedure, LegalSection, ProcedureEntry,
};
use vidhi_observability::AppMetrics;
use vidhi_storage::TranscriptRepository;

pub const MAX_QUERY_CHARS: usize = 2_000;

/// Input turned away before it reaches the selector. Callers map this to a client error.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatRejection {
    #[error("message is required")]
    Empty,
    #[error("message exceeds {max} characters")]
    TooLong { max: usize },
}

/// Validates on whitespace-normalized text. The selector still receives the text as typed.
pub fn check_query(text: &str) -> Result<(), ChatRejection> {
    let normalized = normalize_text(text);
    if normalized.is_empty() {
        return Err(ChatRejection::Empty);
    }
    if normalized.chars().count() > MAX_QUERY_CHARS {
        return Err(ChatRejection::TooLong {
            max: MAX_QUERY_CHARS,
        });
    }
    Ok(())
}

#[derive(Clone)]
pub struct LegalAssistant<S>
where
    S: TranscriptRepository,
{
    knowledge: Arc<KnowledgeBase>,
    store: Arc<S>,
    metrics: Arc<AppMetrics>,
}

impl<S> LegalAssistant<S>
where
    S: TranscriptRepository,
{
    pub fn new(knowledge: Arc<KnowledgeBase>, store: Arc<S>, metrics: Arc<AppMetrics>) -> Self {
        Self {
            knowledge,
            store,
            metrics,
        }
    }

    #[instrument(skip(self, input))]
    pub async fn handle_chat(&self, input: ChatInput) -> Result<AssistantReply> {
        check_query(&input.text).inspect_err(|_| self.metrics.inc_rejected())?;

        let started = Instant::now();
        let selection = self.knowledge.select(&input.text);
        self.metrics.observe_latency(started.elapsed());
        self.metrics.record_match(&selection.rule);

        let session_id = input
            .session_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        if self.store.load_transcript(&session_id).await?.is_none() {
            self.store
                .reset_transcript(&session_id, message(ChatRole::Assistant, GREETING))
                .await?;
        }
        self.store
            .append_messages(
                &session_id,
                vec![
                    message(ChatRole::User, &input.text),
                    message(ChatRole::Assistant, &selection.text),
                ],
            )
            .await?;

        info!(
            session_id = %session_id,
            rule = selection.rule.label(),
            query_chars = input.text.chars().count(),
            "chat handled"
        );

        Ok(AssistantReply {
            session_id,
            reply_text: selection.text,
            matched: selection.rule,
            disclaimer: STANDING_DISCLAIMER.to_string(),
        })
    }

    /// Stateless single answer; nothing is recorded in a transcript.
    pub fn ask(&self, query: &str) -> String {
        let started = Instant::now();
        let selection = self.knowledge.select(query);
        self.metrics.observe_latency(started.elapsed());
        self.metrics.record_match(&selection.rule);
        info!(rule = selection.rule.label(), "question answered");
        selection.text
    }

    /// Unknown sessions start from the greeting, as a fresh chat window would.
    pub async fn history(&self, session_id: &str) -> Result<ConversationTranscript> {
        Ok(self
            .store
            .load_transcript(session_id)
            .await?
            .unwrap_or_else(|| ConversationTranscript {
                session_id: session_id.to_string(),
                messages: vec![message(ChatRole::Assistant, GREETING)],
            }))
    }

    /// Unknown sessions are not created; they already read back as the greeting.
    pub async fn clear(&self, session_id: &str) -> Result<ConversationTranscript> {
        if self.store.load_transcript(session_id).await?.is_some() {
            self.store
                .reset_transcript(session_id, message(ChatRole::Assistant, GREETING))
                .await?;
            info!(session_id = %session_id, "chat cleared");
        }
        self.history(session_id).await
    }

    pub fn section(&self, code: &str, number: &str) -> Option<&LegalSection> {
        self.knowledge.find_section(code, number)
    }

    pub fn procedure(&self, slug: &str) -> Option<&LegalProcedure> {
        self.knowledge.procedure(slug)
    }

    pub fn procedures(&self) -> Vec<ProcedureEntry> {
        self.knowledge.procedures.iter().cloned().collect()
    }

    pub fn knowledge_stats(&self) -> KnowledgeStats {
        self.knowledge.stats()
    }

    pub async fn active_sessions(&self) -> Result<usize> {
        self.store.session_count().await
    }

    pub async fn purge_expired_sessions(&self) -> Result<u64> {
        let removed = self.store.purge_expired(Utc::now()).await?;
        if removed > 0 {
            info!(removed, "expired chat sessions purged");
        }
        Ok(removed)
    }
}

fn message(role: ChatRole, text: &str) -> ChatMessage {
    ChatMessage {
        id: Uuid::new_v4().to_string(),
        role,
        text: text.to_string(),
        at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use vidhi_core::{MatchedRule, ScenarioFamily};
    use vidhi_storage::MemoryStore;

    use super::*;

    fn assistant() -> LegalAssistant<MemoryStore> {
        LegalAssistant::new(
            Arc::new(KnowledgeBase::builtin()),
            Arc::new(MemoryStore::new()),
            AppMetrics::shared(),
        )
    }

    fn input(session_id: Option<&str>, text: &str) -> ChatInput {
        ChatInput {
            session_id: session_id.map(ToString::to_string),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn new_session_starts_with_greeting() {
        let assistant = assistant();
        let reply = assistant
            .handle_chat(input(None, "My phone was stolen"))
            .await
            .unwrap();
        assert_eq!(
            reply.matched,
            MatchedRule::Scenario {
                family: ScenarioFamily::Theft
            }
        );

        let history = assistant.history(&reply.session_id).await.unwrap();
        let roles = history
            .messages
            .iter()
            .map(|m| m.role)
            .collect::<Vec<_>>();
        assert_eq!(
            roles,
            [ChatRole::Assistant, ChatRole::User, ChatRole::Assistant]
        );
        assert_eq!(history.messages[0].text, GREETING);
        assert_eq!(history.messages[2].text, reply.reply_text);
    }

    #[tokio::test]
    async fn history_does_not_change_matching() {
        let assistant = assistant();
        let first = assistant
            .handle_chat(input(Some("s1"), "section 302"))
            .await
            .unwrap();
        assistant
            .handle_chat(input(Some("s1"), "what about fraud?"))
            .await
            .unwrap();
        let again = assistant
            .handle_chat(input(Some("s1"), "section 302"))
            .await
            .unwrap();
        assert_eq!(first.reply_text, again.reply_text);
        assert_eq!(assistant.history("s1").await.unwrap().messages.len(), 7);
    }

    #[tokio::test]
    async fn clear_resets_to_greeting() {
        let assistant = assistant();
        assistant
            .handle_chat(input(Some("s2"), "bail process"))
            .await
            .unwrap();
        let cleared = assistant.clear("s2").await.unwrap();
        assert_eq!(cleared.messages.len(), 1);
        assert_eq!(cleared.messages[0].text, GREETING);
    }

    #[tokio::test]
    async fn blank_input_is_rejected_before_selection() {
        let assistant = assistant();
        let err = assistant
            .handle_chat(input(None, "  \n "))
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ChatRejection>(),
            Some(&ChatRejection::Empty)
        );
        let snapshot = assistant.metrics.snapshot();
        assert_eq!(snapshot.rejected_total, 1);
        assert_eq!(snapshot.queries_total, 0);
    }

    #[test]
    fn ask_is_total() {
        let assistant = assistant();
        assert!(!assistant.ask("").is_empty());
        assert!(assistant
            .ask("CRPC 156")
            .starts_with("CrPC Section 156: Police officer's power"));
    }

    #[tokio::test]
    async fn selector_sees_text_as_typed() {
        let assistant = assistant();
        for text in ["file\nfir", "ipc  302"] {
            let reply = assistant.handle_chat(input(None, text)).await.unwrap();
            assert_eq!(reply.matched, MatchedRule::Fallback, "{text:?}");
            assert_eq!(
                reply.reply_text,
                assistant.knowledge.respond(text),
                "{text:?}"
            );

            let history = assistant.history(&reply.session_id).await.unwrap();
            assert_eq!(history.messages[1].text, text);
        }
    }

    #[tokio::test]
    async fn clearing_unknown_session_stores_nothing() {
        let assistant = assistant();
        for n in 0..50 {
            let cleared = assistant.clear(&format!("ghost-{n}")).await.unwrap();
            assert_eq!(cleared.messages.len(), 1);
        }
        assert_eq!(assistant.active_sessions().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn expired_sessions_are_purged() {
        let assistant = LegalAssistant::new(
            Arc::new(KnowledgeBase::builtin()),
            Arc::new(MemoryStore::new().with_session_ttl(std::time::Duration::ZERO)),
            AppMetrics::shared(),
        );
        for _ in 0..20 {
            assistant.handle_chat(input(None, "bail process")).await.unwrap();
        }
        assert_eq!(assistant.purge_expired_sessions().await.unwrap(), 20);
        assert_eq!(assistant.active_sessions().await.unwrap(), 0);
    }
}
