use crate::{
    configuration::{AppState, State},
    error::Error,
    model::{Subscription, SubscriptionListItem},
    types::{ListFilters, UserRole},
};

/// Broadcast audience: every subscription whose owner has the owner role
/// and is not soft-deleted.
pub async fn resolve_owners(
    state: &AppState<State>,
) -> Result<Vec<Subscription>, Error> {
    let items = state
        .database
        .subscription
        .find_by_role(UserRole::Owner.to_string())
        .await?;
    Ok(items)
}

/// Targeted audience: every device registration of one user.
pub async fn resolve_by_user_id(
    state: &AppState<State>,
    user_id: i32,
) -> Result<Vec<Subscription>, Error> {
    let items = state
        .database
        .subscription
        .find_by_owner(user_id)
        .await?;
    Ok(items)
}

/// Paginated admin listing. `page` is 1-indexed.
pub async fn list(
    state: &AppState<State>,
    page: i64,
    page_size: i64,
    filters: ListFilters,
) -> Result<(Vec<SubscriptionListItem>, i64), Error> {
    if page < 1 {
        return Err(Error::Validation(String::from("page must be >= 1")));
    }
    if page_size < 1 {
        return Err(Error::Validation(String::from("take must be >= 1")));
    }

    // both values arrive from the query string unchecked
    let offset = (page - 1).checked_mul(page_size).ok_or_else(|| {
        Error::Validation(String::from("page is out of range"))
    })?;

    let result = state
        .database
        .subscription
        .query_page(page_size, offset, &filters)
        .await?;
    Ok(result)
}

/// Lookup by id; absence is surfaced to the caller as NotFound.
pub async fn find_by_id(
    state: &AppState<State>,
    id: i32,
) -> Result<Subscription, Error> {
    state
        .database
        .subscription
        .find_by_id(id)
        .await?
        .ok_or_else(|| Error::FieldNotExist(String::from("subscription")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        configuration::Config,
        dao::PoolOption,
        provider::{DatabasePool, PushClient},
    };
    use tokio::sync::Semaphore;

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

    fn state() -> AppState<State> {
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

    #[tokio::test]
    async fn test_list_rejects_page_and_take_below_one() {
        let state = state();

        let result = list(&state, 0, 10, ListFilters::default()).await;
        assert!(matches!(result, Err(Error::Validation(_))));

        let result = list(&state, 1, 0, ListFilters::default()).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    // the offset arithmetic must reject out-of-range pages instead of
    // overflowing; the store is never reached
    #[tokio::test]
    async fn test_list_rejects_page_beyond_the_offset_range() {
        let state = state();

        let result = list(&state, i64::MAX, 2, ListFilters::default()).await;
        assert!(matches!(result, Err(Error::Validation(_))));

        let result = list(&state, 3, i64::MAX, ListFilters::default()).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }
}
