use actix_web::{get, web, HttpResponse, Result};
use serde::{Deserialize, Serialize};

use crate::{
    configuration::{AppState, State},
    error::Error,
    handler::audience,
    model::SubscriptionListItem,
    types::{ListFilters, UserRole},
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    page: i64,
    take: i64,
    q: Option<String>,
    /// Comma-separated role names, e.g. `owner,admin`.
    roles: Option<String>,
    #[serde(alias = "fromDate")]
    from_date: Option<i64>,
    #[serde(alias = "toDate")]
    to_date: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub data: Vec<SubscriptionListItem>,
    pub total: i64,
}

fn build_filters(query: &ListQuery) -> Result<ListFilters, Error> {
    let roles = match query.roles.as_deref() {
        None | Some("") => UserRole::all(),
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| {
                item.parse::<UserRole>().map_err(|_| {
                    Error::Validation(format!("unknown role: {}", item))
                })
            })
            .collect::<Result<Vec<UserRole>, Error>>()?,
    };

    Ok(ListFilters {
        q: query.q.to_owned().unwrap_or_default(),
        roles,
        from_date: query.from_date.unwrap_or(0),
        to_date: query.to_date.unwrap_or(0),
    })
}

#[get("/all")]
pub async fn list_index(
    state: web::Data<AppState<State>>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, Error> {
    let filters = build_filters(&query)?;
    let (data, total) =
        audience::list(state.get_ref(), query.page, query.take, filters)
            .await?;

    Ok(HttpResponse::Ok().json(ListResponse { data, total }))
}

#[get("/{id}")]
pub async fn get_index(
    state: web::Data<AppState<State>>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    let item = audience::find_by_id(state.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}
