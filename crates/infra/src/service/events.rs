//! Capacity and registration service.
//!
//! Every operation reads live state from the stores; nothing is cached.
//! Ownership is checked through [`ensure_owner`] before any attribute
//! validation, so a non-owner is always told `Unauthorized` whatever the
//! payload looks like.
//!
//! The ticket counter and the registration ledger are independent:
//! registering does not decrement `tickets_available` and changing the
//! counter does not look at existing registrations.

use tracing::{debug, info, instrument};

use eventhub_core::{DomainError, DomainResult, EventId, UserId};
use eventhub_events::{
    ensure_owner, Event, EventAttributes, OwnerAction, Registration, RegistrationState,
    TicketCount,
};

use crate::store::{EventStore, RegistrationLedger, StoreError};

use super::accounts::user_not_found;
use super::ServiceError;

fn event_not_found(id: EventId) -> ServiceError {
    DomainError::not_found(format!("Event {id} does not exist")).into()
}

/// The ledger refused a transition for a pair it found in the source state
/// of `outcome`; the state machine names the rejection.
fn refused(outcome: DomainResult<RegistrationState>) -> ServiceError {
    match outcome {
        Err(err) => err.into(),
        Ok(state) => ServiceError::Internal(format!("ledger refused a transition to {state:?}")),
    }
}

/// Maps a store failure on an event lookup, naming the event on `NotFound`.
fn event_error(id: EventId) -> impl FnOnce(StoreError) -> ServiceError {
    move |err| match err {
        StoreError::NotFound => event_not_found(id),
        other => ServiceError::Store(other),
    }
}

/// Orchestrates event lifecycle, ticket capacity and registrations.
///
/// Generic over the event store `S` and the registration ledger `L` so the
/// same rules run against the in-memory and Postgres backends.
#[derive(Debug, Clone)]
pub struct EventService<S, L> {
    events: S,
    ledger: L,
}

impl<S, L> EventService<S, L>
where
    S: EventStore,
    L: RegistrationLedger,
{
    pub fn new(events: S, ledger: L) -> Self {
        Self { events, ledger }
    }

    async fn load(&self, id: EventId) -> Result<Event, ServiceError> {
        self.events.get(id).await.map_err(event_error(id))
    }

    pub async fn list_events(&self) -> Result<Vec<Event>, ServiceError> {
        Ok(self.events.list().await?)
    }

    pub async fn get_event(&self, id: EventId) -> Result<Event, ServiceError> {
        self.load(id).await
    }

    /// Create an event owned by `owner`. Nothing is persisted when the
    /// attributes are invalid.
    #[instrument(skip(self, attrs), fields(owner_id = %owner))]
    pub async fn create_event(
        &self,
        owner: UserId,
        attrs: EventAttributes,
    ) -> Result<Event, ServiceError> {
        let details = attrs.validate()?;
        let event = self.events.insert(owner, details).await?;
        info!(event_id = %event.id, "event created");
        Ok(event)
    }

    /// Replace the mutable attributes of an event. Owner only.
    #[instrument(skip(self, attrs), fields(event_id = %id, requester = %requester))]
    pub async fn update_event(
        &self,
        id: EventId,
        requester: UserId,
        attrs: EventAttributes,
    ) -> Result<Event, ServiceError> {
        let event = self.load(id).await?;
        ensure_owner(&event, requester, OwnerAction::Update)?;

        let details = attrs.validate()?;
        let updated = self.events.update(id, details).await.map_err(event_error(id))?;
        info!("event updated");
        Ok(updated)
    }

    /// Delete an event and its registrations. Owner only.
    #[instrument(skip(self), fields(event_id = %id, requester = %requester))]
    pub async fn delete_event(&self, id: EventId, requester: UserId) -> Result<(), ServiceError> {
        let event = self.load(id).await?;
        ensure_owner(&event, requester, OwnerAction::Delete)?;

        self.events.delete(id).await.map_err(event_error(id))?;
        info!("event deleted");
        Ok(())
    }

    /// Overwrite the ticket counter. Owner only; the ownership check runs
    /// before the value is looked at. Concurrent updates are
    /// last-writer-wins.
    #[instrument(skip(self), fields(event_id = %id, requester = %requester))]
    pub async fn update_ticket_count(
        &self,
        id: EventId,
        requester: UserId,
        new_count: i64,
    ) -> Result<TicketCount, ServiceError> {
        let event = self.load(id).await?;
        ensure_owner(&event, requester, OwnerAction::ChangeTickets)?;

        let count = TicketCount::new(new_count)?;
        self.events
            .update_tickets(id, count)
            .await
            .map_err(event_error(id))?;
        info!(tickets_available = %count, "ticket count updated");
        Ok(count)
    }

    /// Register `user` for an event. A second registration for the same
    /// pair is rejected by the ledger.
    #[instrument(skip(self), fields(event_id = %id, user_id = %user))]
    pub async fn register(&self, id: EventId, user: UserId) -> Result<Registration, ServiceError> {
        self.load(id).await?;

        match self.ledger.insert(id, user).await {
            Ok(registration) => {
                info!("user registered");
                Ok(registration)
            }
            Err(StoreError::Duplicate(detail)) => {
                debug!(%detail, "duplicate registration rejected");
                Err(refused(RegistrationState::Present.register()))
            }
            // Either side of the pair may be gone; the event is looked up
            // again to tell which.
            Err(StoreError::MissingReference(detail)) => {
                debug!(%detail, "registration references a missing row");
                match self.events.get(id).await {
                    Ok(_) => Err(user_not_found(user)),
                    Err(err) => Err(event_error(id)(err)),
                }
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Cancel an active registration.
    #[instrument(skip(self), fields(event_id = %id, user_id = %user))]
    pub async fn cancel_registration(&self, id: EventId, user: UserId) -> Result<(), ServiceError> {
        self.load(id).await?;

        match self.ledger.delete(id, user).await {
            Ok(()) => {
                info!("registration cancelled");
                Ok(())
            }
            Err(StoreError::NotFound) => Err(refused(RegistrationState::Absent.cancel())),
            Err(other) => Err(other.into()),
        }
    }

    pub async fn registration_status(
        &self,
        id: EventId,
        user: UserId,
    ) -> Result<RegistrationState, ServiceError> {
        self.load(id).await?;
        let count = self.ledger.count(id, user).await?;
        Ok(RegistrationState::from_count(count))
    }
}
