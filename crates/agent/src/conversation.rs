use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gestor_core::context::SuggestionSet;
use gestor_core::dispatch::TurnOutcome;
use gestor_core::flows::Flow;
use gestor_core::messages::BotMessage;
use gestor_core::reports::ReportFile;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

/// One utterance from the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Typed(String),
    /// A clicked suggestion, carrying the generation it was rendered with.
    Suggestion { text: String, generation: u64 },
}

impl Input {
    pub fn typed(text: impl Into<String>) -> Self {
        Self::Typed(text.into())
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Typed(text) | Self::Suggestion { text, .. } => text,
        }
    }
}

/// What one submitted input produced, including queued follow-up turns.
#[derive(Clone, Debug, Serialize)]
pub struct TurnReport {
    pub turn_id: Uuid,
    pub outcome: TurnOutcome,
    pub messages: Vec<BotMessage>,
    #[serde(skip)]
    pub files: Vec<ReportFile>,
    pub flow: Option<Flow>,
    pub suggestions: SuggestionSet,
}

impl TurnReport {
    pub fn is_unrecognized(&self) -> bool {
        self.outcome == TurnOutcome::Unrecognized
    }
}

#[cfg(test)]
mod tests {
    use super::{Input, SessionId};

    #[test]
    fn session_id_round_trips_through_display() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().expect("valid uuid");
        assert_eq!(parsed, id);
        assert!("not-a-session".parse::<SessionId>().is_err());
    }

    #[test]
    fn input_exposes_its_text() {
        assert_eq!(Input::typed("ventas de hoy").text(), "ventas de hoy");
        assert_eq!(Input::Suggestion { text: "Sí".to_string(), generation: 3 }.text(), "Sí");
    }
}
