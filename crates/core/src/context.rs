//! The interface every intent handler and flow step talks to.

use serde::Serialize;

use crate::clock::Clock;
use crate::domain::product::ProductCatalog;
use crate::domain::user::ConversationUser;
use crate::flows::Flow;
use crate::gateway::BackendGateway;
use crate::intents::IntentRegistry;
use crate::messages::{BotMessage, MessageBuilder};
use crate::reports::ReportFile;

/// Valid next-turn answers, tagged with the generation they were rendered in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SuggestionSet {
    pub generation: u64,
    pub options: Vec<String>,
}

impl SuggestionSet {
    pub fn contains(&self, answer: &str) -> bool {
        self.options.iter().any(|option| option.to_lowercase() == answer.trim().to_lowercase())
    }
}

pub trait ConversationContext: Send {
    fn emit(&mut self, message: BotMessage);

    fn flow(&self) -> Option<&Flow>;

    /// Replaces the active flow. `None` destroys it.
    fn set_flow(&mut self, flow: Option<Flow>);

    /// Replaces the suggestion set and returns its new generation.
    fn set_suggestions(&mut self, options: Vec<String>) -> u64;

    fn suggestions(&self) -> &SuggestionSet;

    /// Queues `text` to be processed as if the user had typed it next.
    fn resubmit(&mut self, text: String);

    fn deliver_file(&mut self, file: ReportFile);

    fn user(&self) -> &ConversationUser;
}

/// Everything a handler needs while processing one utterance.
pub struct Turn<'a> {
    pub ctx: &'a mut dyn ConversationContext,
    pub gateway: &'a dyn BackendGateway,
    pub catalog: &'a ProductCatalog,
    pub clock: &'a dyn Clock,
    pub registry: &'a IntentRegistry,
}

impl Turn<'_> {
    pub fn say(&mut self, text: impl Into<String>) {
        self.ctx.emit(BotMessage::text(text));
    }

    /// Asks a question whose valid answers become the new suggestion set.
    pub fn prompt(&mut self, text: impl Into<String>, options: Vec<String>) {
        let generation = self.ctx.set_suggestions(options.clone());
        self.ctx.emit(MessageBuilder::new(text).suggestions(generation, options).build());
    }

    /// Ends the active flow with a final message.
    pub fn finish(&mut self, text: impl Into<String>) {
        self.ctx.set_flow(None);
        self.say(text);
    }
}
