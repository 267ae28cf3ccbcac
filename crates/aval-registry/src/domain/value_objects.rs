//! # Value Objects
//!
//! Configuration and key layout for the aval registry.

use super::correlativo::{CorrelativoFormat, DEFAULT_PREFIX, MIN_DIGITS};
use super::entities::AvalId;

/// Counter namespace used for aval codes.
pub const DEFAULT_SEQUENCE: &str = "AVAL";

/// Configuration for the registry service.
///
/// All values have defaults matching the office deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Fixed prefix of every correlativo (default: `DTI|DSST|AVAL`).
    pub correlativo_prefix: String,
    /// Minimum zero-padded width of the sequence digits (default: 4).
    pub min_digits: usize,
    /// Counter namespace consulted on creation (default: `AVAL`).
    pub sequence_name: String,
    /// Upper bound for a page of results (default: 500).
    pub max_page_size: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            correlativo_prefix: DEFAULT_PREFIX.to_string(),
            min_digits: MIN_DIGITS,
            sequence_name: DEFAULT_SEQUENCE.to_string(),
            max_page_size: 500,
        }
    }
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the correlativo prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.correlativo_prefix = prefix.into();
        self
    }

    /// Set the counter namespace.
    pub fn with_sequence_name(mut self, name: impl Into<String>) -> Self {
        self.sequence_name = name.into();
        self
    }

    /// Set the maximum page size.
    pub fn with_max_page_size(mut self, max: usize) -> Self {
        self.max_page_size = max;
        self
    }

    pub fn correlativo_format(&self) -> CorrelativoFormat {
        CorrelativoFormat::new(self.correlativo_prefix.clone(), self.min_digits)
    }
}

/// Key prefixes for the key-value layout.
pub struct KeyPrefix;

impl KeyPrefix {
    /// `s:{name}` -> counter last value (u64 BE)
    pub const SEQUENCE: &'static [u8] = b"s:";
    /// `a:{id}` -> record envelope
    pub const AVAL: &'static [u8] = b"a:";
    /// `c:{correlativo}` -> id (u64 BE)
    pub const CORRELATIVO: &'static [u8] = b"c:";
    /// Last surrogate id handed out (u64 BE)
    pub const LAST_ID: &'static [u8] = b"m:last_id";

    pub fn sequence_key(name: &str) -> Vec<u8> {
        let mut key = Self::SEQUENCE.to_vec();
        key.extend_from_slice(name.as_bytes());
        key
    }

    pub fn aval_key(id: AvalId) -> Vec<u8> {
        let mut key = Self::AVAL.to_vec();
        key.extend_from_slice(&id.to_be_bytes());
        key
    }

    pub fn correlativo_key(correlativo: &str) -> Vec<u8> {
        let mut key = Self::CORRELATIVO.to_vec();
        key.extend_from_slice(correlativo.as_bytes());
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_do_not_collide() {
        assert!(KeyPrefix::aval_key(7).starts_with(KeyPrefix::AVAL));
        assert!(KeyPrefix::sequence_key("AVAL").starts_with(KeyPrefix::SEQUENCE));
        assert!(!KeyPrefix::LAST_ID.starts_with(KeyPrefix::AVAL));
        assert_ne!(KeyPrefix::aval_key(1), KeyPrefix::aval_key(256));
    }

    #[test]
    fn test_default_config_format() {
        let config = RegistryConfig::default();
        assert_eq!(
            config.correlativo_format().format(3).unwrap(),
            "DTI|DSST|AVAL|0003"
        );
    }
}
