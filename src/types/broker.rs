use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::User;

/// Inbound broker message. `tag` is the opaque delivery handle consumed by
/// a single acknowledgment.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub pattern: String,
    pub tag: u64,
    #[serde(default = "empty_payload")]
    pub payload: Value,
}

fn empty_payload() -> Value {
    Value::Object(Default::default())
}

#[derive(Debug, Serialize)]
pub struct AckFrame {
    pub ack: u64,
}

#[derive(Debug, Serialize)]
pub struct ReplyFrame<'a> {
    pub reply_to: u64,
    pub user: &'a User,
}

/// User snapshot as it travels on the wire, camelCase like the upstream
/// services emit it.
#[derive(Debug, Clone, Deserialize)]
pub struct WireUser {
    pub id: i32,
    #[serde(alias = "firstName")]
    pub first_name: String,
    #[serde(alias = "lastName")]
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserRef {
    pub id: i32,
}

#[derive(Debug, Deserialize)]
pub struct CreatedUserEvent {
    #[serde(alias = "createdUser")]
    pub created_user: WireUser,
    #[serde(alias = "currentUser")]
    pub current_user: UserRef,
}

#[derive(Debug, Deserialize)]
pub struct UpdatedUserEvent {
    #[serde(alias = "updatedUser")]
    pub updated_user: WireUser,
}

#[derive(Debug, Deserialize)]
pub struct DeletedUserEvent {
    #[serde(alias = "deletedUser")]
    pub deleted_user: UserRef,
}

#[derive(Debug, Deserialize)]
pub struct RestoredUserEvent {
    #[serde(alias = "restoredUser")]
    pub restored_user: UserRef,
    #[serde(alias = "currentUser")]
    pub current_user: UserRef,
}

/// Broadcast to owner subscriptions when an upstream user is created.
#[derive(Debug, Deserialize)]
pub struct CreatedUserNotification {
    #[serde(alias = "firstName")]
    pub first_name: String,
    #[serde(alias = "lastName")]
    pub last_name: String,
}

/// Targeted notification for a newly created chat message.
#[derive(Debug, Deserialize)]
pub struct CreatedMessageNotification {
    #[serde(alias = "targetUserId")]
    pub target_user_id: i32,
    #[serde(alias = "firstName")]
    pub first_name: String,
    #[serde(alias = "lastName")]
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct NotificationToOwners {
    #[serde(default)]
    pub payload: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NotificationToUser {
    #[serde(alias = "userId")]
    pub user_id: i32,
    #[serde(default)]
    pub payload: Option<String>,
}
