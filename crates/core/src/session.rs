use std::collections::VecDeque;

use crate::context::{ConversationContext, SuggestionSet};
use crate::domain::user::ConversationUser;
use crate::flows::Flow;
use crate::messages::BotMessage;
use crate::reports::ReportFile;

/// Per-conversation state: the only owner of the active flow slot.
#[derive(Debug)]
pub struct Session {
    user: ConversationUser,
    flow: Option<Flow>,
    suggestions: SuggestionSet,
    outbox: Vec<BotMessage>,
    files: Vec<ReportFile>,
    resubmissions: VecDeque<String>,
}

impl Session {
    pub fn new(user: ConversationUser) -> Self {
        Self {
            user,
            flow: None,
            suggestions: SuggestionSet::default(),
            outbox: Vec::new(),
            files: Vec::new(),
            resubmissions: VecDeque::new(),
        }
    }

    /// Invalidates every rendered suggestion as soon as input starts processing.
    pub fn begin_turn(&mut self) {
        self.suggestions.generation += 1;
        self.suggestions.options.clear();
    }

    pub fn drain_messages(&mut self) -> Vec<BotMessage> {
        std::mem::take(&mut self.outbox)
    }

    pub fn drain_files(&mut self) -> Vec<ReportFile> {
        std::mem::take(&mut self.files)
    }

    pub fn next_resubmission(&mut self) -> Option<String> {
        self.resubmissions.pop_front()
    }

    pub fn pending_resubmissions(&self) -> usize {
        self.resubmissions.len()
    }
}

impl ConversationContext for Session {
    fn emit(&mut self, message: BotMessage) {
        self.outbox.push(message);
    }

    fn flow(&self) -> Option<&Flow> {
        self.flow.as_ref()
    }

    fn set_flow(&mut self, flow: Option<Flow>) {
        self.flow = flow;
    }

    fn set_suggestions(&mut self, options: Vec<String>) -> u64 {
        self.suggestions.generation += 1;
        self.suggestions.options = options;
        self.suggestions.generation
    }

    fn suggestions(&self) -> &SuggestionSet {
        &self.suggestions
    }

    fn resubmit(&mut self, text: String) {
        self.resubmissions.push_back(text);
    }

    fn deliver_file(&mut self, file: ReportFile) {
        self.files.push(file);
    }

    fn user(&self) -> &ConversationUser {
        &self.user
    }
}
