use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eventhub_auth::{Role, User};
use eventhub_core::{EventId, UserId};
use eventhub_events::{Event, EventAttributes};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    pub name: String,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub image_data: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub priority: Option<String>,
    pub tickets_available: i64,
}

impl From<EventRequest> for EventAttributes {
    fn from(req: EventRequest) -> Self {
        EventAttributes {
            name: req.name,
            description: req.description,
            location: req.location,
            starts_at: req.starts_at,
            image_data: req.image_data,
            color: req.color,
            price: req.price,
            priority: req.priority,
            tickets_available: req.tickets_available,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketCountRequest {
    pub tickets_available: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub new_password: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: EventId,
    pub name: String,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    pub tickets_available: i64,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        let tickets_available = event.tickets_available().get();
        let d = event.details;
        Self {
            id: event.id,
            name: d.name,
            description: d.description,
            location: d.location,
            starts_at: d.starts_at,
            user_id: event.owner_id,
            image_data: d.image_data,
            color: d.color,
            price: d.price,
            priority: d.priority,
            tickets_available,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}
