use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct DateTime(pub chrono::DateTime<chrono::Utc>);

impl DateTime {
    pub fn now() -> Self {
        Self(chrono::Utc::now())
    }
}

impl Serialize for DateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let micros = self.0.timestamp_micros();
        serializer.serialize_i64(micros)
    }
}

impl<'de> Deserialize<'de> for DateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let micros = i64::deserialize(deserializer)?;
        let datetime = chrono::DateTime::from_timestamp_micros(micros)
            .ok_or_else(|| serde::de::Error::custom("timestamp out of range"))?;
        Ok(Self(datetime))
    }
}

/// Identifier of a direct or community channel.
///
/// Opaque to the core: the transport assigns it on channel discovery.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datetime_serializes_as_micros() {
        let datetime = DateTime(chrono::DateTime::from_timestamp_micros(1_700_000_000_123).unwrap());
        let json = serde_json::to_string(&datetime).unwrap();
        assert_eq!(json, "1700000000123");
        let back: DateTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, datetime);
    }
}
