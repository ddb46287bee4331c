//! Inbound command payloads.
//!
//! The same free-text field carries both a dose duration and the "off"
//! switch, so parsing yields an explicit [`Command`] instead of a bool.

use crate::error::NpkError;

/// A parsed `on/set` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// No digit anywhere in the payload.
    Invalid,
    /// Numeric value 0 (or below): de-energize now.
    ForceOff,
    /// Run the pump for this many seconds.
    Dose { seconds: u32 },
}

impl Command {
    /// Classify a raw payload.
    ///
    /// A payload is only rejected when it holds no ASCII digit at all; any
    /// digit makes it acceptable, and the value is then taken from the numeric
    /// prefix. So `"12abc"` doses for 12 seconds while `"abc12"` has no numeric
    /// prefix, reads as 0 and forces the pump off.
    pub fn parse(raw: &str) -> Self {
        if !raw.bytes().any(|b| b.is_ascii_digit()) {
            return Command::Invalid;
        }
        match numeric_prefix(raw) {
            v if v <= 0 => Command::ForceOff,
            v => Command::Dose {
                seconds: u32::try_from(v).unwrap_or(u32::MAX),
            },
        }
    }

    /// Like [`Command::parse`], but surfaces rejection as an error.
    pub fn try_parse(raw: &str) -> Result<Self, NpkError> {
        match Self::parse(raw) {
            Command::Invalid => Err(NpkError::InvalidCommand(raw.to_string())),
            cmd => Ok(cmd),
        }
    }
}

/// `atol`-style conversion: skip leading whitespace, take an optional sign and
/// as many decimal digits as follow. Anything else yields 0. Saturates instead
/// of overflowing.
pub fn numeric_prefix(raw: &str) -> i64 {
    let s = raw.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == '\u{0B}');
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        let d = i64::from(b - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(d)
        } else {
            value.saturating_mul(10).saturating_add(d)
        };
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_numbers() {
        assert_eq!(Command::parse("5"), Command::Dose { seconds: 5 });
        assert_eq!(Command::parse("0"), Command::ForceOff);
        assert_eq!(Command::parse("000"), Command::ForceOff);
        assert_eq!(Command::parse("  42"), Command::Dose { seconds: 42 });
        assert_eq!(Command::parse("+7"), Command::Dose { seconds: 7 });
    }

    #[test]
    fn digit_presence_is_enough() {
        assert_eq!(Command::parse("12abc"), Command::Dose { seconds: 12 });
        assert_eq!(Command::parse("5x"), Command::Dose { seconds: 5 });
        // Digits without a numeric prefix read as zero.
        assert_eq!(Command::parse("abc12"), Command::ForceOff);
        assert_eq!(Command::parse("on 1"), Command::ForceOff);
    }

    #[test]
    fn no_digits_is_invalid() {
        assert_eq!(Command::parse(""), Command::Invalid);
        assert_eq!(Command::parse("abc"), Command::Invalid);
        assert_eq!(Command::parse("true"), Command::Invalid);
        assert_eq!(Command::parse("-"), Command::Invalid);
    }

    #[test]
    fn negative_values_switch_off() {
        assert_eq!(Command::parse("-5"), Command::ForceOff);
        assert_eq!(Command::parse("-0"), Command::ForceOff);
    }

    #[test]
    fn huge_values_saturate() {
        assert_eq!(
            Command::parse("99999999999999999999999"),
            Command::Dose { seconds: u32::MAX }
        );
        assert_eq!(numeric_prefix("99999999999999999999999"), i64::MAX);
        assert_eq!(numeric_prefix("-99999999999999999999999"), i64::MIN);
    }

    #[test]
    fn try_parse_reports_payload() {
        let err = Command::try_parse("abc").unwrap_err();
        assert!(matches!(err, NpkError::InvalidCommand(ref p) if p == "abc"));
        assert_eq!(Command::try_parse("3").unwrap(), Command::Dose { seconds: 3 });
    }
}
