pub mod clock;
pub mod commands;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod gateway;
pub mod intents;
pub mod messages;
pub mod normalize;
pub mod reports;
pub mod session;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use context::{ConversationContext, SuggestionSet, Turn};
pub use dispatch::{Assistant, TurnOutcome};
pub use domain::product::{
    Category, InventoryItem, InventoryLookup, NewProduct, Product, ProductCatalog, UnitOption,
};
pub use domain::user::{ConversationUser, Role};
pub use errors::{GatewayError, TurnError};
pub use flows::{Flow, FlowType, ProductFlow, ProductStep, ReportFlow, ReportStep};
pub use gateway::{BackendGateway, GatewayCall, GatewayOperation, InMemoryGateway};
pub use intents::{
    CommandDescriptor, IntentHandler, IntentMatch, IntentRegistry, IntentRegistryError,
};
pub use messages::{Block, BotMessage, MessageBuilder};
pub use normalize::{normalize, word_to_number};
pub use reports::{ReportFile, ReportFormat, ReportModule, ReportRequest};
pub use session::Session;
