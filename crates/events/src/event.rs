use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventhub_core::{DomainError, DomainResult, Entity, EventId, UserId};

use crate::capacity::TicketCount;

/// Unvalidated event attributes as supplied by a caller.
///
/// `tickets_available` is kept as a raw signed integer so that a negative
/// value reaches the domain and is rejected as `InvalidCapacity` rather than
/// being lost as a decoding error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventAttributes {
    pub name: String,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub image_data: Option<String>,
    pub color: Option<String>,
    pub price: Option<f64>,
    pub priority: Option<String>,
    pub tickets_available: i64,
}

/// Validated, mutable attributes of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDetails {
    pub name: String,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub image_data: Option<String>,
    pub color: Option<String>,
    pub price: Option<f64>,
    pub priority: Option<String>,
    pub tickets_available: TicketCount,
}

impl EventAttributes {
    /// Validate and normalize into `EventDetails`.
    ///
    /// Capacity is checked first so a negative ticket count is always reported
    /// as `InvalidCapacity`, even when other fields are also malformed.
    pub fn validate(self) -> DomainResult<EventDetails> {
        let tickets_available = TicketCount::new(self.tickets_available)?;

        let name = required("name", self.name)?;
        let description = required("description", self.description)?;
        let location = required("location", self.location)?;

        if let Some(price) = self.price {
            if !price.is_finite() || price < 0.0 {
                return Err(DomainError::validation("price must be a non-negative number"));
            }
        }

        Ok(EventDetails {
            name,
            description,
            location,
            starts_at: self.starts_at,
            image_data: optional(self.image_data),
            color: optional(self.color),
            price: self.price,
            priority: optional(self.priority),
            tickets_available,
        })
    }
}

fn required(field: &str, value: String) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// A persisted campus event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub owner_id: UserId,
    pub details: EventDetails,
}

impl Event {
    pub fn tickets_available(&self) -> TicketCount {
        self.details.tickets_available
    }
}

impl Entity for Event {
    type Id = EventId;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Owner-only mutations on an event.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OwnerAction {
    Update,
    Delete,
    ChangeTickets,
}

impl OwnerAction {
    fn describe(self) -> &'static str {
        match self {
            OwnerAction::Update => "update",
            OwnerAction::Delete => "delete",
            OwnerAction::ChangeTickets => "change tickets for",
        }
    }
}

/// Whether `user_id` owns `event`.
pub fn is_owner(event: &Event, user_id: UserId) -> bool {
    event.owner_id == user_id
}

/// Reject `action` unless `user_id` owns `event`.
pub fn ensure_owner(event: &Event, user_id: UserId, action: OwnerAction) -> DomainResult<()> {
    if is_owner(event, user_id) {
        return Ok(());
    }
    Err(DomainError::unauthorized(format!(
        "You are not authorized to {} this event",
        action.describe()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn attrs(tickets: i64) -> EventAttributes {
        EventAttributes {
            name: "Spring Concert".to_string(),
            description: "Open air concert on the quad".to_string(),
            location: "Main Quad".to_string(),
            starts_at: Utc::now(),
            image_data: None,
            color: Some("#ff8800".to_string()),
            price: Some(12.5),
            priority: Some("high".to_string()),
            tickets_available: tickets,
        }
    }

    fn event_owned_by(owner: i64) -> Event {
        Event {
            id: EventId::new(1),
            owner_id: UserId::new(owner),
            details: attrs(10).validate().unwrap(),
        }
    }

    #[test]
    fn validate_accepts_well_formed_attributes() {
        let details = attrs(40).validate().unwrap();
        assert_eq!(details.tickets_available.get(), 40);
        assert_eq!(details.name, "Spring Concert");
    }

    #[test]
    fn validate_rejects_negative_tickets_as_capacity_error() {
        let err = attrs(-5).validate().unwrap_err();
        assert!(matches!(err, DomainError::InvalidCapacity(_)));
    }

    #[test]
    fn negative_tickets_win_over_other_validation_failures() {
        let mut a = attrs(-1);
        a.name = "   ".to_string();
        assert!(matches!(a.validate(), Err(DomainError::InvalidCapacity(_))));
    }

    #[test]
    fn validate_rejects_blank_required_fields() {
        let mut a = attrs(1);
        a.location = "  ".to_string();
        let err = a.validate().unwrap_err();
        assert_eq!(err, DomainError::validation("location cannot be empty"));
    }

    #[test]
    fn validate_rejects_negative_price() {
        let mut a = attrs(1);
        a.price = Some(-0.5);
        assert!(matches!(a.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn blank_optional_metadata_is_dropped() {
        let mut a = attrs(1);
        a.image_data = Some(String::new());
        assert_eq!(a.validate().unwrap().image_data, None);
    }

    #[test]
    fn owner_passes_the_guard() {
        let event = event_owned_by(1);
        assert!(is_owner(&event, UserId::new(1)));
        assert!(ensure_owner(&event, UserId::new(1), OwnerAction::Delete).is_ok());
    }

    #[test]
    fn guard_message_names_the_action() {
        let event = event_owned_by(1);
        let err = ensure_owner(&event, UserId::new(2), OwnerAction::Delete).unwrap_err();
        assert_eq!(
            err,
            DomainError::unauthorized("You are not authorized to delete this event")
        );
    }

    proptest! {
        /// Property: every non-owner is rejected for every owner-only action.
        #[test]
        fn non_owners_are_always_rejected(owner in any::<i64>(), other in any::<i64>()) {
            prop_assume!(owner != other);
            let event = event_owned_by(owner);
            for action in [OwnerAction::Update, OwnerAction::Delete, OwnerAction::ChangeTickets] {
                let result = ensure_owner(&event, UserId::new(other), action);
                let rejected = matches!(result, Err(DomainError::Unauthorized(_)));
                prop_assert!(rejected);
            }
        }
    }
}
