use std::env;

pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_API_GROUP: &str = "extension.shepherd";

/// Where the client's requests land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub namespace: String,
    /// API group serving backups, restores, schedules and syncs.
    pub api_group: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { namespace: DEFAULT_NAMESPACE.to_string(), api_group: DEFAULT_API_GROUP.to_string() }
    }
}

impl ClientConfig {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self { namespace: namespace.into(), ..Self::default() }
    }

    /// `SHEPHERD_NAMESPACE` and `SHEPHERD_API_GROUP`, falling back to the defaults
    /// when unset or empty.
    pub fn from_env() -> Self {
        let var = |key: &str, default: &str| {
            env::var(key).ok().filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string())
        };
        Self { namespace: var("SHEPHERD_NAMESPACE", DEFAULT_NAMESPACE), api_group: var("SHEPHERD_API_GROUP", DEFAULT_API_GROUP) }
    }
}
