//! # Correlativo Formatter
//!
//! Deterministic mapping from a sequence number to the display code
//! `<PREFIX>|<number>`, zero-padded to a minimum width. Padding never
//! truncates: 12345 renders as `PREFIX|12345`.

use super::errors::AvalError;

/// Prefix used by the office for aval codes.
pub const DEFAULT_PREFIX: &str = "DTI|DSST|AVAL";

/// Minimum number of digits in the trailing group.
pub const MIN_DIGITS: usize = 4;

/// Separator between the prefix segments and the sequence digits.
pub const SEPARATOR: char = '|';

/// Formats and parses correlativo codes for one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelativoFormat {
    prefix: String,
    min_digits: usize,
}

impl Default for CorrelativoFormat {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX, MIN_DIGITS)
    }
}

impl CorrelativoFormat {
    pub fn new(prefix: impl Into<String>, min_digits: usize) -> Self {
        Self {
            prefix: prefix.into(),
            min_digits: min_digits.max(1),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Render the code for `sequence`.
    ///
    /// ## Errors
    ///
    /// - `InvalidSequenceNumber`: `sequence` is zero
    pub fn format(&self, sequence: u64) -> Result<String, AvalError> {
        if sequence == 0 {
            return Err(AvalError::InvalidSequenceNumber { value: sequence });
        }
        Ok(format!(
            "{}{}{:0width$}",
            self.prefix,
            SEPARATOR,
            sequence,
            width = self.min_digits
        ))
    }
}

/// Extract the sequence number embedded in a correlativo.
///
/// Looks at the trailing pipe-delimited group and accepts it when it is made
/// of at least [`MIN_DIGITS`] ASCII digits. Works for any prefix, so codes
/// imported from older spreadsheets resolve the same way.
pub fn parse_sequence(code: &str) -> Option<u64> {
    let (_, digits) = code.trim().rsplit_once(SEPARATOR)?;
    if digits.len() < MIN_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_format_pads_to_four_digits() {
        let fmt = CorrelativoFormat::default();
        assert_eq!(fmt.format(1).unwrap(), "DTI|DSST|AVAL|0001");
        assert_eq!(fmt.format(7).unwrap(), "DTI|DSST|AVAL|0007");
    }

    #[test]
    fn test_format_never_truncates() {
        let fmt = CorrelativoFormat::default();
        assert_eq!(fmt.format(12345).unwrap(), "DTI|DSST|AVAL|12345");
    }

    #[test]
    fn test_format_rejects_zero() {
        let fmt = CorrelativoFormat::default();
        assert_eq!(
            fmt.format(0),
            Err(AvalError::InvalidSequenceNumber { value: 0 })
        );
    }

    #[test]
    fn test_custom_prefix() {
        let fmt = CorrelativoFormat::new("OFI", 6);
        assert_eq!(fmt.format(42).unwrap(), "OFI|000042");
    }

    #[test]
    fn test_parse_trailing_group() {
        assert_eq!(parse_sequence("DTI|DSST|AVAL|0042"), Some(42));
        assert_eq!(parse_sequence("OLD|2023|0150"), Some(150));
        assert_eq!(parse_sequence(" DTI|DSST|AVAL|0009 "), Some(9));
    }

    #[test]
    fn test_parse_rejects_short_or_non_numeric_groups() {
        assert_eq!(parse_sequence("DTI|DSST|AVAL|042"), None);
        assert_eq!(parse_sequence("DTI|DSST|AVAL|00A2"), None);
        assert_eq!(parse_sequence("0042"), None);
        assert_eq!(parse_sequence(""), None);
    }

    proptest! {
        #[test]
        fn prop_format_parse_round_trip(n in 1u64..=250_000) {
            let fmt = CorrelativoFormat::default();
            let code = fmt.format(n).unwrap();
            prop_assert_eq!(parse_sequence(&code), Some(n));
            prop_assert!(code.starts_with("DTI|DSST|AVAL|"));
        }
    }
}
