// Scripts module - managed R source files inside a workspace

pub mod error;
pub mod registry;
pub mod scaffold;
pub mod types;

pub use error::{Result, ScriptError};
pub use types::ScriptFile;
