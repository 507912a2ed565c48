use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use gestor_core::context::ConversationContext;
use gestor_core::dispatch::Assistant;
use gestor_core::domain::user::ConversationUser;
use gestor_core::session::Session;

use crate::conversation::{Input, SessionId, TurnReport};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("session `{0}` does not exist")]
    UnknownSession(SessionId),
    #[error("session `{0}` is still processing the previous input")]
    Busy(SessionId),
    #[error("suggestion rendered in generation {rendered} is stale (current generation {current})")]
    StaleSuggestion { rendered: u64, current: u64 },
}

/// Hosts many conversations over one `Assistant`. Each session processes
/// at most one input at a time.
pub struct AssistantRuntime {
    assistant: Assistant,
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<Session>>>>,
}

impl AssistantRuntime {
    pub fn new(assistant: Assistant) -> Self {
        Self { assistant, sessions: RwLock::new(HashMap::new()) }
    }

    pub async fn open_session(&self, user: ConversationUser) -> SessionId {
        let id = SessionId::new();
        self.sessions.write().await.insert(id, Arc::new(Mutex::new(Session::new(user))));
        info!(event_name = "assistant.session.opened", session_id = %id, role = user.role.as_str());
        id
    }

    /// Drops the session together with any open flow.
    pub async fn close_session(&self, id: SessionId) -> Result<(), RuntimeError> {
        let removed = self.sessions.write().await.remove(&id);
        match removed {
            Some(_) => {
                info!(event_name = "assistant.session.closed", session_id = %id);
                Ok(())
            }
            None => Err(RuntimeError::UnknownSession(id)),
        }
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn submit(&self, id: SessionId, input: Input) -> Result<TurnReport, RuntimeError> {
        let session = self
            .sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(RuntimeError::UnknownSession(id))?;

        // A second input while a turn is in flight is rejected, never queued.
        let mut session = session.try_lock().map_err(|_| {
            warn!(event_name = "assistant.turn.rejected", session_id = %id, "session busy");
            RuntimeError::Busy(id)
        })?;

        let text = match input {
            Input::Typed(text) => text,
            Input::Suggestion { text, generation } => {
                let current = session.suggestions().generation;
                if generation != current {
                    warn!(
                        event_name = "assistant.suggestion.stale",
                        session_id = %id,
                        rendered = generation,
                        current,
                        "stale suggestion rejected"
                    );
                    return Err(RuntimeError::StaleSuggestion { rendered: generation, current });
                }
                text
            }
        };

        let turn_id = Uuid::new_v4();
        let span = info_span!("assistant.turn", session_id = %id, turn_id = %turn_id);
        let outcome = async {
            info!(event_name = "assistant.turn.started", "processing input");
            let mut outcome = self.assistant.process(&mut session, &text).await;
            while let Some(follow_up) = session.next_resubmission() {
                outcome = self.assistant.process(&mut session, &follow_up).await;
            }
            outcome
        }
        .instrument(span)
        .await;

        Ok(TurnReport {
            turn_id,
            outcome,
            messages: session.drain_messages(),
            files: session.drain_files(),
            flow: session.flow().cloned(),
            suggestions: session.suggestions().clone(),
        })
    }
}
