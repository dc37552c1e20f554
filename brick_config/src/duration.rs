use humantime::parse_duration;
use serde::de::Error;
use serde::{Deserialize, Deserializer};
use std::time::Duration;

/// Deserializes a [`Duration`] from its [`humantime`] representation.
///
/// Intended for `#[serde(deserialize_with = "brick_config::duration::deserialize")]`.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let duration_string = String::deserialize(deserializer)?;

    parse_duration(&duration_string).map_err(Error::custom)
}
