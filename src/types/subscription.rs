use std::{fmt, io, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct SubscribeRequest {
    pub endpoint: String,
    #[serde(alias = "expirationTime")]
    pub expiration_time: Option<i64>,
    #[serde(alias = "userId")]
    pub user_id: i32,
    #[serde(alias = "visitorId")]
    pub visitor_id: String,
    pub keys: SubscriptionKeys,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnsubscribeRequest {
    #[serde(alias = "userId")]
    pub user_id: i32,
    #[serde(alias = "visitorId")]
    pub visitor_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Owner,
    Admin,
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Owner => "owner",
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }

    pub fn all() -> Vec<UserRole> {
        vec![UserRole::Owner, UserRole::Admin, UserRole::User]
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = io::Error;

    fn from_str(value: &str) -> Result<UserRole, Self::Err> {
        match value {
            "owner" => Ok(UserRole::Owner),
            "admin" => Ok(UserRole::Admin),
            "user" => Ok(UserRole::User),
            _ => Err(io::Error::other("Role not supported")),
        }
    }
}

/// Admin listing filters. `from_date`/`to_date` are epoch milliseconds and
/// the sentinel `0` means unbounded on that side, never the epoch itself.
#[derive(Debug, Clone, Deserialize)]
pub struct ListFilters {
    #[serde(default)]
    pub q: String,
    #[serde(default = "UserRole::all")]
    pub roles: Vec<UserRole>,
    #[serde(default, alias = "fromDate")]
    pub from_date: i64,
    #[serde(default, alias = "toDate")]
    pub to_date: i64,
}

impl Default for ListFilters {
    fn default() -> Self {
        ListFilters {
            q: String::new(),
            roles: UserRole::all(),
            from_date: 0,
            to_date: 0,
        }
    }
}
