use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventhub_core::{DomainError, DomainResult, EventId, UserId};

/// An active registration of a user for an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub event_id: EventId,
    pub user_id: UserId,
    pub registered_at: DateTime<Utc>,
}

/// Ledger state of a single (event, user) pair.
///
/// `Absent --register--> Present --cancel--> Absent`. Attempting a
/// transition from the wrong state is rejected rather than ignored.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationState {
    Absent,
    Present,
}

impl RegistrationState {
    /// Derive the state from the number of matching ledger rows.
    pub fn from_count(count: u64) -> Self {
        if count == 0 {
            RegistrationState::Absent
        } else {
            RegistrationState::Present
        }
    }

    pub fn is_registered(self) -> bool {
        self == RegistrationState::Present
    }

    /// State after a `register` transition.
    pub fn register(self) -> DomainResult<Self> {
        match self {
            RegistrationState::Absent => Ok(RegistrationState::Present),
            RegistrationState::Present => Err(DomainError::AlreadyRegistered),
        }
    }

    /// State after a `cancel` transition.
    pub fn cancel(self) -> DomainResult<Self> {
        match self {
            RegistrationState::Present => Ok(RegistrationState::Absent),
            RegistrationState::Absent => Err(DomainError::NotRegistered),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_maps_to_state() {
        assert_eq!(RegistrationState::from_count(0), RegistrationState::Absent);
        assert_eq!(RegistrationState::from_count(1), RegistrationState::Present);
    }

    #[test]
    fn register_twice_is_rejected() {
        let state = RegistrationState::Absent.register().unwrap();
        assert_eq!(state.register(), Err(DomainError::AlreadyRegistered));
    }

    #[test]
    fn cancel_without_registration_is_rejected() {
        assert_eq!(RegistrationState::Absent.cancel(), Err(DomainError::NotRegistered));
    }

    #[test]
    fn round_trip_returns_to_absent() {
        let state = RegistrationState::Absent
            .register()
            .and_then(RegistrationState::cancel)
            .and_then(RegistrationState::register)
            .unwrap();
        assert!(state.is_registered());
    }
}
