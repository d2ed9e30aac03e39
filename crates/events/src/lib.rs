//! Campus event domain module.
//!
//! Business rules for events, ticket capacity and registrations, implemented
//! as deterministic domain logic (no IO, no HTTP, no storage).

pub mod capacity;
pub mod event;
pub mod registration;

pub use capacity::TicketCount;
pub use event::{ensure_owner, is_owner, Event, EventAttributes, EventDetails, OwnerAction};
pub use registration::{Registration, RegistrationState};
