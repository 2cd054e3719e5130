//! Timestamp resolution for signing.
//!
//! BCE v1 embeds the request time in the signing key info as `YYYY-MM-DDTHH:MM:SSZ`. Callers may
//! provide the time preformatted, as epoch seconds, or leave it to the signer, in which case the
//! signer's [`Clock`] supplies it.

use {
    crate::{constants::CANONICAL_TIME_FORMAT, SignatureError},
    chrono::{DateTime, NaiveDateTime, Utc},
    lazy_static::lazy_static,
    regex::Regex,
    std::fmt::Debug,
};

lazy_static! {
    /// Canonical timestamp format, second precision, UTC only.
    static ref CANONICAL_TIME_REGEX: Regex = Regex::new(
        r"(?x)^
        \d{4}-(?:0[1-9]|1[0-2])-(?:0[1-9]|[12][0-9]|3[01])
        T
        (?:[01][0-9]|2[0-3]):[0-5][0-9]:[0-5][0-9]
        Z$").unwrap();
}

/// A source of the current time.
///
/// [`SignatureEngine`][crate::SignatureEngine] reads the time through this trait so it can be
/// pinned in tests.
pub trait Clock: Debug + Send + Sync {
    /// The current time in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that always returns the same instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// The time at which a request is signed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Timestamp {
    /// Use the signer's clock.
    #[default]
    Now,

    /// Seconds since 1970-01-01T00:00:00Z.
    Epoch(i64),

    /// An already formatted `YYYY-MM-DDTHH:MM:SSZ` string, used verbatim.
    Formatted(String),
}

impl Timestamp {
    /// Resolve this timestamp to its canonical `YYYY-MM-DDTHH:MM:SSZ` form.
    pub fn to_canonical_time(&self, clock: &dyn Clock) -> Result<String, SignatureError> {
        match self {
            Self::Now => Ok(format_canonical_time(&clock.now())),
            Self::Epoch(seconds) => match DateTime::from_timestamp(*seconds, 0) {
                Some(dt) => Ok(format_canonical_time(&dt)),
                None => Err(SignatureError::InvalidArgument(format!("Timestamp out of range: {}", seconds))),
            },
            Self::Formatted(s) => {
                if is_canonical_time(s) {
                    Ok(s.clone())
                } else {
                    Err(SignatureError::InvalidArgument(format!(
                        "Timestamp must be in 'YYYY-MM-DDTHH:MM:SSZ' format. Got '{}'",
                        s
                    )))
                }
            }
        }
    }
}

/// Zero means "now"; anything else is epoch seconds.
impl From<i64> for Timestamp {
    fn from(seconds: i64) -> Self {
        if seconds == 0 {
            Self::Now
        } else {
            Self::Epoch(seconds)
        }
    }
}

impl From<&str> for Timestamp {
    fn from(s: &str) -> Self {
        Self::Formatted(s.to_string())
    }
}

impl From<String> for Timestamp {
    fn from(s: String) -> Self {
        Self::Formatted(s)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Epoch(dt.timestamp())
    }
}

/// Format a UTC time as `YYYY-MM-DDTHH:MM:SSZ`, truncating any sub-second part.
pub fn format_canonical_time(dt: &DateTime<Utc>) -> String {
    dt.format(CANONICAL_TIME_FORMAT).to_string()
}

/// Indicates whether the string is a canonical `YYYY-MM-DDTHH:MM:SSZ` timestamp.
pub fn is_canonical_time(s: &str) -> bool {
    CANONICAL_TIME_REGEX.is_match(s) && NaiveDateTime::parse_from_str(s, CANONICAL_TIME_FORMAT).is_ok()
}

/// Parse a canonical `YYYY-MM-DDTHH:MM:SSZ` timestamp.
pub fn parse_canonical_time(s: &str) -> Option<DateTime<Utc>> {
    if !CANONICAL_TIME_REGEX.is_match(s) {
        return None;
    }

    NaiveDateTime::parse_from_str(s, CANONICAL_TIME_FORMAT).ok().map(|naive| naive.and_utc())
}
