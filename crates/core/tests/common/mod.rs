#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use gestor_core::{
    Assistant, BotMessage, Clock, ConversationContext, ConversationUser, FixedClock, Flow,
    InMemoryGateway, IntentRegistry, ProductCatalog, Role, Session, TurnOutcome,
};

pub const USER_ID: i64 = 7;

pub fn start() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 10, 16, 10, 0, 0).single().expect("valid time")
}

pub fn start_day() -> NaiveDate {
    start().date_naive()
}

pub struct Harness {
    pub assistant: Assistant,
    pub gateway: Arc<InMemoryGateway>,
    pub clock: Arc<FixedClock>,
    pub session: Session,
}

impl Harness {
    pub fn new(gateway: InMemoryGateway) -> Self {
        Self::with_role(gateway, Role::Administrador)
    }

    pub fn with_role(gateway: InMemoryGateway, role: Role) -> Self {
        let gateway = Arc::new(gateway);
        let clock = Arc::new(FixedClock::new(start()));
        let assistant = Assistant::new(
            IntentRegistry::standard().expect("registry"),
            gateway.clone(),
            ProductCatalog::default(),
            clock.clone(),
        );
        let session = Session::new(ConversationUser::new(USER_ID, role));

        Self { assistant, gateway, clock, session }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Sends one utterance plus any follow-ups it queued.
    pub async fn say(&mut self, utterance: &str) -> (TurnOutcome, Vec<BotMessage>) {
        let mut outcome = self.assistant.process(&mut self.session, utterance).await;
        while let Some(next) = self.session.next_resubmission() {
            outcome = self.assistant.process(&mut self.session, &next).await;
        }
        (outcome, self.session.drain_messages())
    }

    pub async fn say_all(&mut self, utterances: &[&str]) -> Vec<BotMessage> {
        let mut messages = Vec::new();
        for utterance in utterances {
            messages.extend(self.say(utterance).await.1);
        }
        messages
    }

    pub fn flow(&self) -> Option<&Flow> {
        self.session.flow()
    }

    pub fn step(&self) -> Option<&'static str> {
        self.session.flow().map(Flow::step_name)
    }

    pub fn suggestions(&self) -> Vec<String> {
        self.session.suggestions().options.clone()
    }
}

pub fn texts(messages: &[BotMessage]) -> Vec<String> {
    messages.iter().map(|message| message.text.clone()).collect()
}

pub fn last_text(messages: &[BotMessage]) -> String {
    messages.last().map(|message| message.text.clone()).unwrap_or_default()
}
