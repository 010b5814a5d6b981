use std::{fmt, io, str::FromStr};

use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::{send_push, users},
    provider::Acknowledge,
    types::{
        CreatedMessageNotification, CreatedUserEvent, CreatedUserNotification,
        DeletedUserEvent, Envelope, NotificationToOwners, NotificationToUser,
        PushData, RestoredUserEvent, UpdatedUserEvent,
    },
};

/// Typed broker message kinds. The four user patterns are request/response
/// (the resulting user is sent back); the four notification patterns are
/// fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    CreatedUser,
    UpdatedUser,
    DeletedUser,
    RestoredUser,
    CreatedUserNotification,
    CreatedMessageNotification,
    NotificationToOwners,
    NotificationToUser,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            EventKind::CreatedUser => "created_user",
            EventKind::UpdatedUser => "updated_user",
            EventKind::DeletedUser => "deleted_user",
            EventKind::RestoredUser => "restored_user",
            EventKind::CreatedUserNotification => "created_user_notification",
            EventKind::CreatedMessageNotification => {
                "created_message_notification"
            },
            EventKind::NotificationToOwners => "notification_to_owners",
            EventKind::NotificationToUser => "notification_to_user",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for EventKind {
    type Err = io::Error;

    fn from_str(value: &str) -> Result<EventKind, Self::Err> {
        match value {
            "created_user" => Ok(EventKind::CreatedUser),
            "updated_user" => Ok(EventKind::UpdatedUser),
            "deleted_user" => Ok(EventKind::DeletedUser),
            "restored_user" => Ok(EventKind::RestoredUser),
            "created_user_notification" => {
                Ok(EventKind::CreatedUserNotification)
            },
            "created_message_notification" => {
                Ok(EventKind::CreatedMessageNotification)
            },
            "notification_to_owners" => Ok(EventKind::NotificationToOwners),
            "notification_to_user" => Ok(EventKind::NotificationToUser),
            _ => Err(io::Error::other("Message Type not supported")),
        }
    }
}

/// One inbound broker message, received to acknowledged (or left un-acked
/// for broker redelivery).
///
/// Ack placement is the contract here. User lifecycle patterns ack only
/// after the store mutation is durable, then reply. Notification patterns
/// ack before the fan-out is even attempted: push delivery is best-effort
/// and must never cause the triggering event to be redelivered. Any error
/// raised before the ack call (malformed payload, store failure) leaves the
/// tag un-consumed.
pub async fn handle_message<A: Acknowledge>(
    state: &AppState<State>,
    gateway: &A,
    raw: &str,
) -> Result<(), Error> {
    let envelope: Envelope = serde_json::from_str(raw)?;
    let kind = envelope.pattern.parse::<EventKind>()?;
    let tag = envelope.tag;

    tracing::info!(pattern = %kind, tag, "broker message received");

    match kind {
        EventKind::CreatedUser => {
            let event: CreatedUserEvent =
                serde_json::from_value(envelope.payload)?;
            let user = users::create(state, event).await?;
            gateway.ack(tag).await?;
            gateway.reply(tag, &user).await?;
        },
        EventKind::UpdatedUser => {
            let event: UpdatedUserEvent =
                serde_json::from_value(envelope.payload)?;
            let user = users::update(state, event).await?;
            gateway.ack(tag).await?;
            gateway.reply(tag, &user).await?;
        },
        EventKind::DeletedUser => {
            let event: DeletedUserEvent =
                serde_json::from_value(envelope.payload)?;
            let user = users::delete(state, event).await?;
            gateway.ack(tag).await?;
            gateway.reply(tag, &user).await?;
        },
        EventKind::RestoredUser => {
            let event: RestoredUserEvent =
                serde_json::from_value(envelope.payload)?;
            let user = users::restore(state, event).await?;
            gateway.ack(tag).await?;
            gateway.reply(tag, &user).await?;
        },
        EventKind::CreatedUserNotification => {
            let event: CreatedUserNotification =
                serde_json::from_value(envelope.payload)?;
            gateway.ack(tag).await?;
            let data = PushData {
                r#type: String::from("created_user"),
                body: serde_json::json!(format!(
                    "New user {} {} was created.",
                    event.first_name, event.last_name
                ))
                .to_string(),
            };
            send_push::send_to_owners(state, Some(data)).await?;
        },
        EventKind::CreatedMessageNotification => {
            let event: CreatedMessageNotification =
                serde_json::from_value(envelope.payload)?;
            gateway.ack(tag).await?;
            let data = PushData {
                r#type: String::from("created_message"),
                body: serde_json::json!(format!(
                    "You received a message from {} {}.",
                    event.first_name, event.last_name
                ))
                .to_string(),
            };
            send_push::send_to_user(state, event.target_user_id, Some(data))
                .await?;
        },
        EventKind::NotificationToOwners => {
            let event: NotificationToOwners =
                serde_json::from_value(envelope.payload)?;
            gateway.ack(tag).await?;
            let data = event.payload.as_deref().map(PushData::message);
            send_push::send_to_owners(state, data).await?;
        },
        EventKind::NotificationToUser => {
            let event: NotificationToUser =
                serde_json::from_value(envelope.payload)?;
            gateway.ack(tag).await?;
            let data = event.payload.as_deref().map(PushData::message);
            send_push::send_to_user(state, event.user_id, data).await?;
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        configuration::Config,
        model::User,
        provider::{DatabasePool, PushClient},
        dao::PoolOption,
    };
    use std::sync::Mutex;
    use tokio::sync::Semaphore;

    /// Records consumed tags instead of talking to a socket.
    struct MockGateway {
        acks: Mutex<Vec<u64>>,
        replies: Mutex<Vec<u64>>,
    }

    impl MockGateway {
        fn new() -> MockGateway {
            MockGateway {
                acks: Mutex::new(vec![]),
                replies: Mutex::new(vec![]),
            }
        }
    }

    impl Acknowledge for MockGateway {
        async fn ack(&self, tag: u64) -> Result<(), Error> {
            self.acks.lock().unwrap().push(tag);
            Ok(())
        }

        async fn reply(&self, tag: u64, _user: &User) -> Result<(), Error> {
            self.replies.lock().unwrap().push(tag);
            Ok(())
        }
    }

    fn config() -> Config {
        Config {
            database_url: String::from("postgres://test@127.0.0.1:1/test"),
            broker_url: String::from("ws://127.0.0.1:1"),
            server_host: String::from("127.0.0.1"),
            port: 0,
            allowed_origins: vec![String::from("*")],
            max_tasks: 4,
            delivery_timeout: 1,
            socket_reconnect_interval: 1,
            gone_status_codes: vec![404, 410],
            mail_to: String::from("ops@example.com"),
            vapid_private_key: vec![],
            vapid_public_key: vec![],
            auth: String::from("secret"),
        }
    }

    /// State over a lazy pool pointed at a closed port: any query fails
    /// fast, which is exactly what the ack-ordering tests need.
    fn unreachable_state() -> AppState<State> {
        let config = config();
        let pool = PoolOption::new()
            .connect_lazy(config.database_url.as_str())
            .unwrap();
        AppState::new(State {
            push: PushClient::new(config.clone()),
            push_permits: Semaphore::new(config.max_tasks),
            database: DatabasePool::with_pool(pool),
            config,
        })
    }

    #[test]
    fn test_event_kind_parses_every_pattern() {
        let patterns = [
            ("created_user", EventKind::CreatedUser),
            ("updated_user", EventKind::UpdatedUser),
            ("deleted_user", EventKind::DeletedUser),
            ("restored_user", EventKind::RestoredUser),
            (
                "created_user_notification",
                EventKind::CreatedUserNotification,
            ),
            (
                "created_message_notification",
                EventKind::CreatedMessageNotification,
            ),
            ("notification_to_owners", EventKind::NotificationToOwners),
            ("notification_to_user", EventKind::NotificationToUser),
        ];

        for (pattern, kind) in patterns {
            assert_eq!(pattern.parse::<EventKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), pattern);
        }

        assert!("unknown_pattern".parse::<EventKind>().is_err());
    }

    #[tokio::test]
    async fn test_malformed_message_is_left_unacknowledged() {
        let state = unreachable_state();
        let gateway = MockGateway::new();

        let result =
            handle_message(&state, &gateway, "this is not json").await;

        assert!(result.is_err());
        assert!(gateway.acks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_pattern_is_left_unacknowledged() {
        let state = unreachable_state();
        let gateway = MockGateway::new();

        let result = handle_message(
            &state,
            &gateway,
            r#"{"pattern": "exploded_user", "tag": 9}"#,
        )
        .await;

        assert!(result.is_err());
        assert!(gateway.acks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_created_user_acks_only_after_durable_mutation() {
        let state = unreachable_state();
        let gateway = MockGateway::new();

        let raw = r#"{
            "pattern": "created_user",
            "tag": 5,
            "payload": {
                "createdUser": {
                    "id": 3,
                    "firstName": "Ada",
                    "lastName": "Lovelace",
                    "email": "ada@example.com",
                    "password": "x",
                    "phone": "123",
                    "role": "user"
                },
                "currentUser": {"id": 1}
            }
        }"#;

        // the store is unreachable, so the mutation fails before the ack
        let result = handle_message(&state, &gateway, raw).await;

        assert!(result.is_err());
        assert!(gateway.acks.lock().unwrap().is_empty());
        assert!(gateway.replies.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notification_event_acks_before_the_fan_out() {
        let state = unreachable_state();
        let gateway = MockGateway::new();

        let raw = r#"{
            "pattern": "notification_to_owners",
            "tag": 8,
            "payload": {"payload": "maintenance window at noon"}
        }"#;

        // audience resolution fails on the unreachable store, but the ack
        // has already been consumed, so the broker will not redeliver
        let result = handle_message(&state, &gateway, raw).await;

        assert!(result.is_err());
        assert_eq!(*gateway.acks.lock().unwrap(), vec![8]);
    }

    #[tokio::test]
    async fn test_notification_payload_decode_failure_keeps_tag_unconsumed() {
        let state = unreachable_state();
        let gateway = MockGateway::new();

        let raw = r#"{
            "pattern": "notification_to_user",
            "tag": 11,
            "payload": {"userId": "not a number"}
        }"#;

        let result = handle_message(&state, &gateway, raw).await;

        assert!(result.is_err());
        assert!(gateway.acks.lock().unwrap().is_empty());
    }
}
