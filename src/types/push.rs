use serde::{Deserialize, Serialize};
use std::{fmt, io, str::FromStr};

#[derive(Debug, Clone)]
pub struct PushHeader {
    pub ttl: i64,
    pub urgency: Urgency,
}

impl Default for PushHeader {
    fn default() -> Self {
        PushHeader {
            ttl: 24 * 60 * 60,
            urgency: Urgency::Normal,
        }
    }
}

/// Payload sent to the push service. `body` is already-serialized JSON.
#[derive(Debug, Clone)]
pub struct PushData {
    pub r#type: String,
    pub body: String,
}

impl PushData {
    /// Substituted when a caller supplies no payload.
    pub fn default_message() -> PushData {
        PushData {
            r#type: String::from("message"),
            body: String::from(r#""New notification""#),
        }
    }

    pub fn message(text: &str) -> PushData {
        PushData {
            r#type: String::from("message"),
            body: serde_json::json!(text).to_string(),
        }
    }
}

impl fmt::Display for PushData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, r#"{{"type": "{}", "data": {}}}"#, self.r#type, self.body)
    }
}

#[derive(Debug, Clone)]
pub enum Urgency {
    VeryLow,
    Low,
    Normal,
    High,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Urgency::VeryLow => write!(f, "very-low"),
            Urgency::Low => write!(f, "low"),
            Urgency::Normal => write!(f, "normal"),
            Urgency::High => write!(f, "high"),
        }
    }
}

impl From<Urgency> for String {
    fn from(value: Urgency) -> Self {
        value.to_string()
    }
}

impl FromStr for Urgency {
    type Err = io::Error;

    fn from_str(value: &str) -> Result<Urgency, Self::Err> {
        match value {
            "very-low" => Ok(Urgency::VeryLow),
            "low" => Ok(Urgency::Low),
            "normal" => Ok(Urgency::Normal),
            "high" => Ok(Urgency::High),
            _ => Err(io::Error::other("Urgency not supported")),
        }
    }
}

/// VAPID JWT claims signed with the application key pair.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub aud: String,
    pub sub: String,
    pub exp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_data_renders_wire_json() {
        let data = PushData::message("You received a message.");
        assert_eq!(
            data.to_string(),
            r#"{"type": "message", "data": "You received a message."}"#
        );
    }

    #[test]
    fn test_default_message_body() {
        let data = PushData::default_message();
        assert_eq!(
            data.to_string(),
            r#"{"type": "message", "data": "New notification"}"#
        );
    }

    #[test]
    fn test_urgency_round_trip() {
        for urgency in ["very-low", "low", "normal", "high"] {
            assert_eq!(urgency.parse::<Urgency>().unwrap().to_string(), urgency);
        }
        assert!("critical".parse::<Urgency>().is_err());
    }
}
