use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use vidhi_core::{ChatMessage, ConversationTranscript};

pub const DEFAULT_MAX_MESSAGES: usize = 100;
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub trait TranscriptRepository: Send + Sync {
    async fn load_transcript(&self, session_id: &str) -> Result<Option<ConversationTranscript>>;
    async fn append_messages(&self, session_id: &str, messages: Vec<ChatMessage>) -> Result<()>;
    async fn reset_transcript(&self, session_id: &str, seed: ChatMessage) -> Result<()>;
    async fn session_count(&self) -> Result<usize>;
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}

#[derive(Debug, Clone)]
struct StoredTranscript {
    messages: Vec<ChatMessage>,
    expires_at: DateTime<Utc>,
}

/// Process-lifetime transcripts. Nothing is written to disk.
///
/// Every write pushes a session's expiry out by the TTL. Expired sessions read back as
/// absent and are dropped by `purge_expired`; when the session cap is reached the one
/// closest to expiry makes room for the new session.
#[derive(Clone)]
pub struct MemoryStore {
    transcripts: Arc<RwLock<HashMap<String, StoredTranscript>>>,
    max_messages: usize,
    max_sessions: usize,
    session_ttl: chrono::Duration,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_MESSAGES)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_messages: usize) -> Self {
        Self {
            transcripts: Arc::new(RwLock::new(HashMap::new())),
            max_messages: max_messages.max(1),
            max_sessions: DEFAULT_MAX_SESSIONS,
            session_ttl: ttl_from_std(DEFAULT_SESSION_TTL),
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl_from_std(ttl);
        self
    }

    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    fn entry_for<'a>(
        &self,
        guard: &'a mut HashMap<String, StoredTranscript>,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> &'a mut StoredTranscript {
        if !guard.contains_key(session_id) && guard.len() >= self.max_sessions {
            guard.retain(|_, stored| stored.expires_at > now);
            if guard.len() >= self.max_sessions {
                let oldest = guard
                    .iter()
                    .min_by_key(|(_, stored)| stored.expires_at)
                    .map(|(key, _)| key.clone());
                if let Some(oldest) = oldest {
                    guard.remove(&oldest);
                }
            }
        }

        let stored = guard
            .entry(session_id.to_string())
            .or_insert_with(|| StoredTranscript {
                messages: Vec::new(),
                expires_at: now,
            });
        stored.expires_at = now
            .checked_add_signed(self.session_ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        stored
    }

    fn append_at(&self, session_id: &str, messages: Vec<ChatMessage>, now: DateTime<Utc>) {
        let mut guard = self.transcripts.write();
        let transcript = &mut self.entry_for(&mut guard, session_id, now).messages;
        transcript.extend(messages);

        if transcript.len() > self.max_messages {
            let keep_from = transcript.len() - self.max_messages;
            transcript.drain(..keep_from);
        }
    }

    fn reset_at(&self, session_id: &str, seed: ChatMessage, now: DateTime<Utc>) {
        let mut guard = self.transcripts.write();
        self.entry_for(&mut guard, session_id, now).messages = vec![seed];
    }
}

fn ttl_from_std(ttl: Duration) -> chrono::Duration {
    chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(365 * 100))
}

impl TranscriptRepository for MemoryStore {
    async fn load_transcript(&self, session_id: &str) -> Result<Option<ConversationTranscript>> {
        let now = Utc::now();
        Ok(self
            .transcripts
            .read()
            .get(session_id)
            .filter(|stored| stored.expires_at > now)
            .map(|stored| ConversationTranscript {
                session_id: session_id.to_string(),
                messages: stored.messages.clone(),
            }))
    }

    async fn append_messages(&self, session_id: &str, messages: Vec<ChatMessage>) -> Result<()> {
        self.append_at(session_id, messages, Utc::now());
        Ok(())
    }

    async fn reset_transcript(&self, session_id: &str, seed: ChatMessage) -> Result<()> {
        self.reset_at(session_id, seed, Utc::now());
        Ok(())
    }

    async fn session_count(&self) -> Result<usize> {
        Ok(self.transcripts.read().len())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let mut removed = 0_u64;
        self.transcripts.write().retain(|_, stored| {
            let keep = stored.expires_at > now;
            if !keep {
                removed += 1;
            }
            keep
        });

        Ok(removed)
    }
}
