//! Identity payload carried by the invisible watermark.

use crate::error::{WatermarkError, WatermarkResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Characters of the session token kept in a payload.
pub const TOKEN_PREFIX_LEN: usize = 8;

const SEPARATOR: char = '|';

/// Who was reading, in which session, and when.
///
/// Serialized as `userId|email|tokenPrefix|unixSeconds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForensicPayload {
    pub user_id: String,
    pub email: String,
    pub token_prefix: String,
    pub issued_at: DateTime<Utc>,
}

impl ForensicPayload {
    /// Builds a payload stamped now. `token` is truncated to
    /// [`TOKEN_PREFIX_LEN`] characters.
    pub fn new(user_id: &str, email: &str, token: &str) -> WatermarkResult<Self> {
        for (name, value) in [("user id", user_id), ("email", email), ("token", token)] {
            if value.contains(SEPARATOR) {
                return Err(WatermarkError::InvalidPayload(format!(
                    "{name} must not contain '{SEPARATOR}'"
                )));
            }
        }
        Ok(Self {
            user_id: user_id.to_string(),
            email: email.to_string(),
            token_prefix: token.chars().take(TOKEN_PREFIX_LEN).collect(),
            issued_at: Utc::now(),
        })
    }
}

impl fmt::Display for ForensicPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}{SEPARATOR}{}",
            self.user_id,
            self.email,
            self.token_prefix,
            self.issued_at.timestamp()
        )
    }
}

impl FromStr for ForensicPayload {
    type Err = WatermarkError;

    fn from_str(s: &str) -> WatermarkResult<Self> {
        let parts: Vec<&str> = s.split(SEPARATOR).collect();
        let [user_id, email, token_prefix, seconds] = parts[..] else {
            return Err(WatermarkError::InvalidPayload(format!(
                "expected 4 fields, found {}",
                parts.len()
            )));
        };
        let seconds: i64 = seconds
            .parse()
            .map_err(|_| WatermarkError::InvalidPayload(format!("bad timestamp {seconds:?}")))?;
        let issued_at = DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
            WatermarkError::InvalidPayload(format!("timestamp {seconds} out of range"))
        })?;

        Ok(Self {
            user_id: user_id.to_string(),
            email: email.to_string(),
            token_prefix: token_prefix.to_string(),
            issued_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let payload = ForensicPayload {
            user_id: "u-9".into(),
            email: "r@example.com".into(),
            token_prefix: "abcd1234".into(),
            issued_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        };
        assert_eq!(payload.to_string(), "u-9|r@example.com|abcd1234|1700000000");
        assert_eq!(payload.to_string().parse::<ForensicPayload>().unwrap(), payload);
    }

    #[test]
    fn token_is_truncated() {
        let payload = ForensicPayload::new("u", "e", "0123456789abcdef").unwrap();
        assert_eq!(payload.token_prefix, "01234567");
    }

    #[test]
    fn separator_in_fields_rejected() {
        assert!(ForensicPayload::new("u|x", "e", "t").is_err());
    }

    #[test]
    fn parse_errors() {
        assert!("a|b|c".parse::<ForensicPayload>().is_err());
        assert!("a|b|c|d|e".parse::<ForensicPayload>().is_err());
        assert!("a|b|c|soon".parse::<ForensicPayload>().is_err());
    }
}
