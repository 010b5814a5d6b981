use crate::{
    configuration::{AppState, State},
    error::Error,
    helpers::{describe_device, Status},
    model::NewSubscription,
    types::SubscribeRequest,
};

/// Reconciles a visitor's registration: insert for a new visitor, in-place
/// overwrite for a known one (browser key rotation lands here). The caller
/// is never told which of the two happened.
pub async fn subscribe(
    state: &AppState<State>,
    request: SubscribeRequest,
    user_agent: Option<String>,
) -> Result<Status, Error> {
    validate(&request)?;

    let data = build_row(request, user_agent);
    state.database.subscription.upsert_by_visitor(data).await?;

    Ok(Status::Subscribed)
}

/// Deletes the row matching both the owner and the visitor. Zero matches is
/// the NotSubscribed outcome, not an error.
pub async fn unsubscribe(
    state: &AppState<State>,
    user_id: i32,
    visitor_id: String,
) -> Result<Status, Error> {
    if visitor_id.is_empty() {
        return Err(Error::Validation(String::from("visitorId is required")));
    }

    let affected = state
        .database
        .subscription
        .delete_by_owner_and_visitor(user_id, visitor_id)
        .await?;

    Ok(if affected > 0 {
        Status::Unsubscribed
    } else {
        Status::NotSubscribed
    })
}

fn validate(request: &SubscribeRequest) -> Result<(), Error> {
    for (value, field) in [
        (&request.endpoint, "endpoint"),
        (&request.visitor_id, "visitorId"),
        (&request.keys.p256dh, "keys.p256dh"),
        (&request.keys.auth, "keys.auth"),
    ] {
        if value.is_empty() {
            return Err(Error::Validation(format!("{} is required", field)));
        }
    }

    Ok(())
}

fn build_row(
    request: SubscribeRequest,
    user_agent: Option<String>,
) -> NewSubscription {
    let device_description =
        user_agent.as_deref().map(describe_device);

    NewSubscription {
        endpoint: request.endpoint,
        expiration_time: request.expiration_time,
        visitor_id: request.visitor_id,
        p256dh: request.keys.p256dh,
        auth: request.keys.auth,
        device_description,
        user_agent,
        user_id: request.user_id,
    }
}
