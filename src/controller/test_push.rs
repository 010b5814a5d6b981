use actix_web::{get, web, HttpResponse, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::send_push::{self, DispatchReport},
    types::PushData,
};

#[derive(Debug, Deserialize)]
pub struct Query {
    auth: Option<String>,
    target: String,
    #[serde(alias = "userId")]
    user_id: Option<i32>,
    body: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Response {
    pub data: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<DispatchReport>,
}

/// Manual fan-out trigger guarded by the shared token. Useful for checking
/// VAPID credentials and endpoint health against a real browser.
#[get("/test-push")]
pub async fn index(
    state: web::Data<AppState<State>>,
    data: web::Query<Query>,
) -> Result<HttpResponse, Error> {
    let auth = data.auth.to_owned().context("Auth is required")?;

    if auth != state.config.auth {
        return Ok(HttpResponse::Ok().json(Response {
            data: false,
            report: None,
        }));
    };

    let payload = data.body.as_deref().map(PushData::message);

    let report = match data.target.as_str() {
        "owners" => send_push::send_to_owners(state.get_ref(), payload).await?,
        "user" => {
            let user_id = data.user_id.ok_or_else(|| {
                Error::Validation(String::from(
                    "userId is required for target=user",
                ))
            })?;
            send_push::send_to_user(state.get_ref(), user_id, payload).await?
        },
        other => {
            return Err(Error::Validation(format!(
                "unknown target: {}",
                other
            )))
        },
    };

    Ok(HttpResponse::Ok().json(Response {
        data: true,
        report: Some(report),
    }))
}
