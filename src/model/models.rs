use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// One web-push registration. A visitor (browser profile on one device) owns
/// at most one live row; `visitor_id` carries a unique index.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: i32,
    pub endpoint: String,
    #[serde(rename = "expirationTime")]
    pub expiration_time: Option<i64>,
    #[serde(rename = "visitorId")]
    pub visitor_id: String,
    pub p256dh: String,
    pub auth: String,
    #[serde(rename = "deviceDescription")]
    pub device_description: Option<String>,
    #[serde(rename = "userAgent")]
    pub user_agent: Option<String>,
    pub user_id: i32,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Insert/update image of a subscription row. The store assigns id and
/// timestamps.
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub endpoint: String,
    pub expiration_time: Option<i64>,
    pub visitor_id: String,
    pub p256dh: String,
    pub auth: String,
    pub device_description: Option<String>,
    pub user_agent: Option<String>,
    pub user_id: i32,
}

/// Admin listing row: the subscription joined with its owner's display
/// fields.
#[derive(Debug, FromRow, Serialize)]
pub struct SubscriptionListItem {
    pub id: i32,
    pub endpoint: String,
    #[serde(rename = "visitorId")]
    pub visitor_id: String,
    #[serde(rename = "deviceDescription")]
    pub device_description: Option<String>,
    #[serde(rename = "userAgent")]
    pub user_agent: Option<String>,
    pub user_id: i32,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub role: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Mirror of the upstream user service row. Mutated only through broker RPC
/// events; `deleted_at` implements soft delete.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: i32,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub phone: String,
    pub role: String,
    pub created_by: Option<i32>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "deletedAt")]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub role: String,
    pub created_by: Option<i32>,
}
