//! File-backed infrastructure for the Engage conversation core.
//!
//! Provides the versioned on-disk format, configuration loading and the
//! host-derived [`Environment`](engage_core::environment::Environment).

pub mod config;
mod dto;
pub mod environment;
pub mod file_conversation_repository;
pub mod paths;
pub mod storage;

pub use config::{AppConfig, DeviceConfig, EngageConfig};
pub use dto::ConversationIndex;
pub use environment::ConfiguredEnvironment;
pub use file_conversation_repository::FileConversationRepository;
pub use paths::EngagePaths;
