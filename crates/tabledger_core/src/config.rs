//! Contract engine configuration.

/// Default namespace of the table contracts.
pub const DEFAULT_NAMESPACE: &str = "table.v1_0_0";

/// Configuration for a [`crate::ContractRegistry`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Prefix of every registered contract id (`<namespace>.<Name>`).
    pub namespace: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the contract namespace.
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Returns the full id of the contract called `name`.
    #[must_use]
    pub fn contract_id(&self, name: &str) -> String {
        format!("{}.{name}", self.namespace)
    }
}
