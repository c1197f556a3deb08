//! # Calmroom Core Library
//!
//! Core logic for the Calmroom wellness companion. Every operation is
//! available to the standalone CLI; any GUI would be a thin layer over the
//! same library.
//!
//! ## Architecture
//!
//! - **Breathing Timer**: a tick-driven phase state machine plus a
//!   real-time driver that ticks it on a fixed interval
//! - **Chat**: an append-only transcript fed by a streamed reply from the
//!   hosted chat function
//! - **Store**: per-user mood and journal rows in the hosted row store
//! - **Auth**: explicit user context resolved from the hosted auth provider
//! - **Config**: TOML configuration with dot-path get/set
//!
//! ## Key Components
//!
//! - [`BreathingTimer`]: breathing phase state machine
//! - [`ChatSession`]: chat transcript with a one-slot send lock
//! - [`RestRecordStore`]: mood and journal persistence
//! - [`Config`]: application configuration management

pub mod auth;
pub mod chat;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod store;
pub mod timer;

pub use auth::{AuthClient, UserContext, UserIdentity};
pub use chat::{ChatMessage, ChatService, ChatSession, ChatTranscript, HttpChatService, Role, SendOutcome};
pub use config::{BackendConfig, Config};
pub use dashboard::DashboardSummary;
pub use error::{AuthError, ChatError, ConfigError, CoreError, StoreError, ValidationError};
pub use events::Event;
pub use store::{JournalEntry, MoodEntry, NewJournalEntry, NewMood, RecordKind, RestRecordStore};
pub use timer::{BreathingProfile, BreathingTimer, Phase, PhaseDurations, TickDriver, TimerSession};
