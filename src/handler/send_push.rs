use std::time::Duration;

use futures::future::join_all;
use tokio::{sync::Semaphore, time};

use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::audience,
    model::Subscription,
    provider::{Deliver, DeliveryError},
    types::{PushData, PushHeader, Urgency},
};

/// Aggregated outcome of one fan-out. Individual failures never surface to
/// the caller; this is the record of what happened.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DispatchReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
    pub gone: usize,
}

enum Outcome {
    Delivered,
    Failed,
    Gone,
}

/// Fans one payload out to every recipient concurrently and waits for all
/// attempts to settle. Each attempt holds a semaphore permit and runs under
/// its own timeout, so one hanging endpoint neither stalls the barrier
/// beyond the bound nor starves its siblings.
pub async fn dispatch<D: Deliver>(
    permits: &Semaphore,
    client: &D,
    recipients: Vec<Subscription>,
    data: Option<PushData>,
    header: PushHeader,
    per_attempt: Duration,
) -> DispatchReport {
    let data = data.unwrap_or_else(PushData::default_message);
    let body = data.to_string().into_bytes();

    let attempts = recipients.iter().map(|subscription| {
        let body = body.as_slice();
        let header = &header;
        async move {
            let _permit = match permits.acquire().await {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::error!("push permit semaphore closed");
                    return Outcome::Failed;
                },
            };

            match time::timeout(
                per_attempt,
                client.send(subscription, body, header),
            )
            .await
            {
                Ok(Ok(())) => Outcome::Delivered,
                Ok(Err(DeliveryError::Gone { status })) => {
                    tracing::warn!(
                        endpoint = %subscription.endpoint,
                        status,
                        "push endpoint reported gone"
                    );
                    Outcome::Gone
                },
                Ok(Err(e)) => {
                    tracing::warn!(
                        endpoint = %subscription.endpoint,
                        error = %e,
                        "push delivery failed"
                    );
                    Outcome::Failed
                },
                Err(_) => {
                    tracing::warn!(
                        endpoint = %subscription.endpoint,
                        "push delivery timed out"
                    );
                    Outcome::Failed
                },
            }
        }
    });

    let outcomes = join_all(attempts).await;

    let mut report = DispatchReport {
        attempted: recipients.len(),
        ..Default::default()
    };

    for outcome in outcomes {
        match outcome {
            Outcome::Delivered => report.delivered += 1,
            Outcome::Failed => report.failed += 1,
            Outcome::Gone => report.gone += 1,
        }
    }

    tracing::info!(
        attempted = report.attempted,
        delivered = report.delivered,
        failed = report.failed,
        gone = report.gone,
        "push fan-out settled"
    );

    report
}

/// Broadcast to every subscription owned by an owner-role user.
pub async fn send_to_owners(
    state: &AppState<State>,
    data: Option<PushData>,
) -> Result<DispatchReport, Error> {
    let recipients = audience::resolve_owners(state).await?;
    Ok(run(state, recipients, data).await)
}

/// Targeted send to every device of a single user.
pub async fn send_to_user(
    state: &AppState<State>,
    user_id: i32,
    data: Option<PushData>,
) -> Result<DispatchReport, Error> {
    let recipients = audience::resolve_by_user_id(state, user_id).await?;
    Ok(run(state, recipients, data).await)
}

async fn run(
    state: &AppState<State>,
    recipients: Vec<Subscription>,
    data: Option<PushData>,
) -> DispatchReport {
    let header = PushHeader {
        ttl: 24 * 60 * 60,
        urgency: Urgency::High,
    };

    dispatch(
        &state.push_permits,
        &state.push,
        recipients,
        data,
        header,
        Duration::from_secs(state.config.delivery_timeout),
    )
    .await
}
