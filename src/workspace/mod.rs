// Workspace module - durable session state per configured root directory

pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use config::WorkspaceConfig;
pub use error::{Result, WorkspaceError};
pub use store::{SessionStore, Workspace};
pub use types::{HistoryEntry, SessionState};
