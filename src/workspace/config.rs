// Workspace configuration

/// Workspace store configuration
#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    /// Reserved state subdirectory inside each workspace root (default: ".rworkd")
    pub state_dir_name: String,
    /// State record file name inside the state directory (default: "state.json")
    pub state_file_name: String,
    /// Script scaffolded and designated primary on first open (default: "agent.r")
    pub default_primary: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            state_dir_name: String::from(".rworkd"),
            state_file_name: String::from("state.json"),
            default_primary: String::from("agent.r"),
        }
    }
}
