//! Single-session entry point: routes one utterance to the active flow or
//! to the first matching intent.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::context::{ConversationContext, Turn};
use crate::domain::product::ProductCatalog;
use crate::errors::TurnError;
use crate::flows::{self, FlowType};
use crate::gateway::BackendGateway;
use crate::intents::{IntentRegistry, IntentRegistryError};
use crate::messages::BotMessage;
use crate::session::Session;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// An intent handler ran, possibly opening a flow.
    Handled { intent: &'static str },
    /// The active flow consumed the utterance.
    FlowStep { flow: FlowType },
    Cancelled,
    /// No flow was active and no intent matched.
    Unrecognized,
    /// A handler or step failed; one error message was emitted.
    Failed { reason: String },
}

pub struct Assistant {
    registry: IntentRegistry,
    gateway: Arc<dyn BackendGateway>,
    catalog: ProductCatalog,
    clock: Arc<dyn Clock>,
}

impl Assistant {
    pub fn new(
        registry: IntentRegistry,
        gateway: Arc<dyn BackendGateway>,
        catalog: ProductCatalog,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { registry, gateway, catalog, clock }
    }

    /// Standard registry and the system clock.
    pub fn standard(
        gateway: Arc<dyn BackendGateway>,
        catalog: ProductCatalog,
    ) -> Result<Self, IntentRegistryError> {
        Ok(Self::new(IntentRegistry::standard()?, gateway, catalog, Arc::new(SystemClock)))
    }

    /// Processes one utterance. Never fails: handler errors become exactly
    /// one message and tear down the active flow.
    pub async fn process(&self, session: &mut Session, utterance: &str) -> TurnOutcome {
        session.begin_turn();

        let active = session.flow().cloned();
        if let Some(flow) = active.as_ref() {
            if flows::is_cancellation(utterance) {
                session.set_flow(None);
                session.emit(BotMessage::text("Operación cancelada."));
                info!(
                    event_name = "assistant.flow.cancelled",
                    flow = ?flow.flow_type(),
                    step = flow.step_name(),
                    "flow cancelled by user"
                );
                return TurnOutcome::Cancelled;
            }
        }

        if let Some((command, matched)) = self.registry.find(utterance) {
            if let Some(flow) = active.as_ref() {
                debug!(
                    event_name = "assistant.flow.interrupted",
                    flow = ?flow.flow_type(),
                    step = flow.step_name(),
                    intent = command.name,
                    "new intent replaces active flow"
                );
            }
            session.set_flow(None);
            info!(event_name = "assistant.intent.matched", intent = command.name, "intent matched");

            let result = {
                let mut turn = self.turn(session);
                command.handler().handle(&matched, &mut turn).await
            };
            return match result {
                Ok(()) => TurnOutcome::Handled { intent: command.name },
                Err(error) => self.fail(session, error),
            };
        }

        let Some(flow) = active else {
            return TurnOutcome::Unrecognized;
        };

        let flow_type = flow.flow_type();
        let step = flow.step_name();
        let result = {
            let mut turn = self.turn(session);
            flows::handle_flow(flow, utterance, &mut turn).await
        };

        match result {
            Ok(()) => {
                info!(
                    event_name = "assistant.flow.step",
                    flow = ?flow_type,
                    from = step,
                    to = session.flow().map(|flow| flow.step_name()).unwrap_or("done"),
                    "flow advanced"
                );
                TurnOutcome::FlowStep { flow: flow_type }
            }
            Err(error) => self.fail(session, error),
        }
    }

    fn turn<'a>(&'a self, session: &'a mut Session) -> Turn<'a> {
        Turn {
            ctx: session,
            gateway: self.gateway.as_ref(),
            catalog: &self.catalog,
            clock: self.clock.as_ref(),
            registry: &self.registry,
        }
    }

    fn fail(&self, session: &mut Session, error: TurnError) -> TurnOutcome {
        warn!(event_name = "assistant.turn.failed", error = %error, "turn failed");
        session.set_flow(None);
        session.emit(BotMessage::text(error.user_message()));
        TurnOutcome::Failed { reason: error.to_string() }
    }
}
