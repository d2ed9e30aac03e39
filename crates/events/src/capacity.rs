use serde::{Deserialize, Serialize};

use eventhub_core::{DomainError, DomainResult};

/// Number of tickets still available for an event.
///
/// Always non-negative: the only constructor rejects negative values with
/// `DomainError::InvalidCapacity`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TicketCount(i64);

impl TicketCount {
    pub const ZERO: TicketCount = TicketCount(0);

    pub fn new(value: i64) -> DomainResult<Self> {
        if value < 0 {
            return Err(DomainError::invalid_capacity(format!(
                "ticket count cannot be negative (got {value})"
            )));
        }
        Ok(Self(value))
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for TicketCount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

// Deserialization goes through the validating constructor.
impl<'de> Deserialize<'de> for TicketCount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = i64::deserialize(deserializer)?;
        TicketCount::new(raw).map_err(serde::de::Error::custom)
    }
}
