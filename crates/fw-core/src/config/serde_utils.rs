//! Shared serialization/deserialization utilities for configuration
//!
//! Delays in this project are often sub-second (a 0.3 s settle delay, a
//! 0.5 s initial backoff), so durations are written as fractional seconds.

/// Serialize a `Duration` as fractional seconds (f64)
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Config {
///     #[serde(with = "fw_core::config::serde_utils::duration_secs_f64")]
///     settle_delay: Duration,
/// }
/// ```
pub mod duration_secs_f64 {
    use serde::{self, de::Error, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    /// Serialize a Duration as seconds (f64)
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    /// Deserialize a Duration from seconds (f64); negative values are rejected
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs)
            .map_err(|_| D::Error::custom(format!("invalid duration: {} seconds", secs)))
    }
}

/// Same as [`duration_secs_f64`] for optional durations
pub mod option_duration_secs_f64 {
    use serde::{self, de::Error, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs_f64()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<f64>::deserialize(deserializer)?
            .map(|secs| {
                Duration::try_from_secs_f64(secs)
                    .map_err(|_| D::Error::custom(format!("invalid duration: {} seconds", secs)))
            })
            .transpose()
    }
}
