mod core;
pub mod gateway;
pub mod models;
pub mod registry;

pub use self::core::{ChatBot, ChatOutcome, ChatStats, normalize_message};
pub use gateway::{AzureGateway, Completion, CompletionGateway, GenerationParams};
pub use models::{Message, Role, Session, SessionSummary};
pub use registry::{SessionHandle, SessionRegistry};
