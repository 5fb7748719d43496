//! Ledger configuration.

/// Configuration for an [`crate::InMemoryLedger`].
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Re-verify the hash chain of every asset that is read.
    pub verify_on_read: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            verify_on_read: false,
        }
    }
}

impl LedgerConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether reads verify the hash chain.
    #[must_use]
    pub const fn verify_on_read(mut self, value: bool) -> Self {
        self.verify_on_read = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        assert!(!LedgerConfig::default().verify_on_read);
    }

    #[test]
    fn builder_pattern() {
        assert!(LedgerConfig::new().verify_on_read(true).verify_on_read);
    }
}
