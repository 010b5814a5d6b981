use actix_web::{delete, post, web, HttpRequest, HttpResponse, Result};
use serde::Serialize;

use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::subscription,
    types::{SubscribeRequest, UnsubscribeRequest},
};

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[post("/subscribe")]
pub async fn post_index(
    state: web::Data<AppState<State>>,
    body: web::Json<SubscribeRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, Error> {
    let user_agent = if let Some(item) = req.headers().get("user-agent") {
        Some(item.to_str()?.to_string())
    } else {
        None
    };

    let status =
        subscription::subscribe(state.get_ref(), body.into_inner(), user_agent)
            .await?;

    Ok(HttpResponse::Created().json(MessageResponse {
        message: status.to_string(),
    }))
}

#[delete("/unsubscribe")]
pub async fn delete_index(
    state: web::Data<AppState<State>>,
    body: web::Json<UnsubscribeRequest>,
) -> Result<HttpResponse, Error> {
    let request = body.into_inner();
    let status = subscription::unsubscribe(
        state.get_ref(),
        request.user_id,
        request.visitor_id,
    )
    .await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: status.to_string(),
    }))
}
