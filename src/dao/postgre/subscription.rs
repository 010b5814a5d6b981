use chrono::{DateTime, Utc};
use sqlx::error::Error;

use crate::{
    model::{NewSubscription, Subscription, SubscriptionListItem, Table},
    types::ListFilters,
};

/// A value bound into the dynamically built listing query.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    Roles(Vec<String>),
    Timestamp(DateTime<Utc>),
}

/// Builds the WHERE clause of the admin listing from the filter set.
///
/// `q` matches device description or owner first/last name, by
/// case-insensitive substring OR full-text search (an item matches if either
/// strategy matches). Date bounds are inclusive and the `0` sentinel leaves
/// that side unbounded. Placeholders start at `$1`; the caller appends
/// LIMIT/OFFSET after the returned binds.
pub fn build_list_predicate(filters: &ListFilters) -> (String, Vec<BindValue>) {
    let mut clauses = vec![String::from("u.deleted_at IS NULL")];
    let mut binds: Vec<BindValue> = vec![];

    if !filters.q.is_empty() {
        let like = binds.len() + 1;
        binds.push(BindValue::Text(format!("%{}%", filters.q)));
        let plain = binds.len() + 1;
        binds.push(BindValue::Text(filters.q.to_owned()));

        clauses.push(format!(
            "(s.device_description ILIKE ${like} \
             OR u.first_name ILIKE ${like} \
             OR u.last_name ILIKE ${like} \
             OR to_tsvector('simple', coalesce(s.device_description, '') || ' ' || u.first_name || ' ' || u.last_name) \
                @@ plainto_tsquery('simple', ${plain}))",
        ));
    }

    if !filters.roles.is_empty() {
        binds.push(BindValue::Roles(
            filters.roles.iter().map(|role| role.to_string()).collect(),
        ));
        clauses.push(format!("u.role = ANY(${})", binds.len()));
    }

    if filters.from_date != 0 {
        if let Some(at) = DateTime::from_timestamp_millis(filters.from_date) {
            binds.push(BindValue::Timestamp(at));
            clauses.push(format!("s.created_at >= ${}", binds.len()));
        }
    }

    if filters.to_date != 0 {
        if let Some(at) = DateTime::from_timestamp_millis(filters.to_date) {
            binds.push(BindValue::Timestamp(at));
            clauses.push(format!("s.created_at <= ${}", binds.len()));
        }
    }

    (format!("WHERE {}", clauses.join(" AND ")), binds)
}

impl Table<Subscription> {
    /// Atomic reconciliation keyed on `visitor_id`: a known visitor has its
    /// endpoint/keys/device fields overwritten in place, an unknown one gets
    /// a fresh row. Concurrent calls for one visitor cannot race into
    /// duplicates; the unique index arbitrates.
    pub async fn upsert_by_visitor(
        &self,
        subscription: NewSubscription,
    ) -> Result<Subscription, Error> {
        sqlx::query_as(
            r#"
            INSERT INTO subscription
                (endpoint, expiration_time, visitor_id, p256dh, auth, device_description, user_agent, user_id)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (visitor_id) DO UPDATE SET
                endpoint = EXCLUDED.endpoint,
                expiration_time = EXCLUDED.expiration_time,
                p256dh = EXCLUDED.p256dh,
                auth = EXCLUDED.auth,
                device_description = EXCLUDED.device_description,
                user_agent = EXCLUDED.user_agent,
                user_id = EXCLUDED.user_id,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(&subscription.endpoint)
        .bind(subscription.expiration_time)
        .bind(&subscription.visitor_id)
        .bind(&subscription.p256dh)
        .bind(&subscription.auth)
        .bind(&subscription.device_description)
        .bind(&subscription.user_agent)
        .bind(subscription.user_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Deletes only when both the owner and the visitor match, so one user
    /// cannot drop another user's registration. Returns affected rows; zero
    /// is a normal outcome.
    pub async fn delete_by_owner_and_visitor(
        &self,
        user_id: i32,
        visitor_id: String,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM subscription WHERE user_id=$1 AND visitor_id=$2
            "#,
        )
        .bind(user_id)
        .bind(visitor_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn find_by_id(
        &self,
        id: i32,
    ) -> Result<Option<Subscription>, Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM subscription WHERE id=$1
            "#,
        )
        .bind(id)
        .persistent(true)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn find_by_role(
        &self,
        role: String,
    ) -> Result<Vec<Subscription>, Error> {
        sqlx::query_as(
            r#"
            SELECT s.* FROM subscription s
            JOIN users u ON u.id = s.user_id
            WHERE u.role=$1 AND u.deleted_at IS NULL
            "#,
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find_by_owner(
        &self,
        user_id: i32,
    ) -> Result<Vec<Subscription>, Error> {
        sqlx::query_as(
            r#"
            SELECT s.* FROM subscription s
            JOIN users u ON u.id = s.user_id
            WHERE s.user_id=$1 AND u.deleted_at IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Paginated admin listing, newest first, with the total match count for
    /// the pager. The caller supplies the page window as limit/offset.
    pub async fn query_page(
        &self,
        limit: i64,
        offset: i64,
        filters: &ListFilters,
    ) -> Result<(Vec<SubscriptionListItem>, i64), Error> {
        let (predicate, binds) = build_list_predicate(filters);

        let items_sql = format!(
            r#"
            SELECT s.id, s.endpoint, s.visitor_id, s.device_description, s.user_agent,
                   s.user_id, u.first_name, u.last_name, u.role, s.created_at
            FROM subscription s
            JOIN users u ON u.id = s.user_id
            {predicate}
            ORDER BY s.created_at DESC
            LIMIT ${} OFFSET ${}
            "#,
            binds.len() + 1,
            binds.len() + 2,
        );

        let count_sql = format!(
            r#"
            SELECT COUNT(*)
            FROM subscription s
            JOIN users u ON u.id = s.user_id
            {predicate}
            "#,
        );

        let mut items_query =
            sqlx::query_as::<_, SubscriptionListItem>(&items_sql);
        let mut count_query = sqlx::query_as::<_, (i64,)>(&count_sql);

        for bind in &binds {
            match bind {
                BindValue::Text(value) => {
                    items_query = items_query.bind(value);
                    count_query = count_query.bind(value);
                },
                BindValue::Roles(roles) => {
                    items_query = items_query.bind(roles);
                    count_query = count_query.bind(roles);
                },
                BindValue::Timestamp(at) => {
                    items_query = items_query.bind(at);
                    count_query = count_query.bind(at);
                },
            }
        }

        let items = items_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        let (total,) = count_query.fetch_one(&self.pool).await?;

        Ok((items, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserRole;

    fn filters() -> ListFilters {
        ListFilters::default()
    }

    #[test]
    fn test_zero_sentinel_leaves_dates_unbounded() {
        let (predicate, binds) = build_list_predicate(&filters());

        assert!(!predicate.contains("created_at"));
        assert!(binds
            .iter()
            .all(|bind| !matches!(bind, BindValue::Timestamp(_))));
    }

    #[test]
    fn test_from_date_only_bounds_the_lower_side() {
        let mut filters = filters();
        filters.from_date = 1_700_000_000_000;

        let (predicate, binds) = build_list_predicate(&filters);

        assert!(predicate.contains("s.created_at >="));
        assert!(!predicate.contains("s.created_at <="));
        assert_eq!(
            binds
                .iter()
                .filter(|bind| matches!(bind, BindValue::Timestamp(_)))
                .count(),
            1
        );
    }

    #[test]
    fn test_both_dates_are_inclusive_bounds() {
        let mut filters = filters();
        filters.from_date = 1_600_000_000_000;
        filters.to_date = 1_700_000_000_000;

        let (predicate, _) = build_list_predicate(&filters);

        assert!(predicate.contains(">="));
        assert!(predicate.contains("<="));
    }

    #[test]
    fn test_text_filter_combines_substring_and_full_text() {
        let mut filters = filters();
        filters.q = String::from("Firefox");

        let (predicate, binds) = build_list_predicate(&filters);

        assert!(predicate.contains("ILIKE"));
        assert!(predicate.contains("plainto_tsquery"));
        assert_eq!(binds[0], BindValue::Text(String::from("%Firefox%")));
        assert_eq!(binds[1], BindValue::Text(String::from("Firefox")));
    }

    #[test]
    fn test_role_filter_binds_the_requested_set() {
        let mut filters = filters();
        filters.roles = vec![UserRole::Owner, UserRole::Admin];

        let (predicate, binds) = build_list_predicate(&filters);

        assert!(predicate.contains("u.role = ANY($1)"));
        assert_eq!(
            binds[0],
            BindValue::Roles(vec![String::from("owner"), String::from("admin")])
        );
    }

    #[test]
    fn test_soft_deleted_owners_are_always_excluded() {
        let (predicate, _) = build_list_predicate(&filters());
        assert!(predicate.starts_with("WHERE u.deleted_at IS NULL"));
    }

    fn row(visitor: &str, endpoint: &str, user_id: i32) -> NewSubscription {
        NewSubscription {
            endpoint: endpoint.to_owned(),
            expiration_time: None,
            visitor_id: visitor.to_owned(),
            p256dh: String::from("k"),
            auth: String::from("a"),
            device_description: Some(String::from("Chrome on Linux")),
            user_agent: None,
            user_id,
        }
    }

    // runs against a real database; re-runnable
    #[tokio::test]
    #[ignore = "needs a reachable DATABASE_URL"]
    async fn test_upsert_is_idempotent_and_delete_checks_the_owner() {
        let url = std::env::var("DATABASE_URL").unwrap();
        let pool = crate::dao::PoolOption::new()
            .connect(url.as_str())
            .await
            .unwrap();

        for file in ["users.sql", "subscription.sql"] {
            let path =
                crate::dao::get_path(env!("CARGO_MANIFEST_DIR"), file);
            let sql = std::fs::read_to_string(path).unwrap();
            sqlx::raw_sql(sql.as_str()).execute(&pool).await.unwrap();
        }

        sqlx::query("DELETE FROM subscription WHERE visitor_id = $1")
            .bind("itest-visitor")
            .execute(&pool)
            .await
            .unwrap();
        for (id, email) in [
            (9001, "itest-a@example.com"),
            (9002, "itest-b@example.com"),
        ] {
            sqlx::query(
                r#"
                INSERT INTO users (id, first_name, last_name, email, password, phone, role)
                VALUES ($1, 'Itest', 'Owner', $2, 'x', '123', 'owner')
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(id)
            .bind(email)
            .execute(&pool)
            .await
            .unwrap();
        }

        let table = Table::<Subscription>::new(pool.clone());

        let first = table
            .upsert_by_visitor(row(
                "itest-visitor",
                "https://push.example/a",
                9001,
            ))
            .await
            .unwrap();
        let second = table
            .upsert_by_visitor(row(
                "itest-visitor",
                "https://push.example/b",
                9001,
            ))
            .await
            .unwrap();

        // the second subscribe for the visitor overwrote in place
        assert_eq!(first.id, second.id);
        assert_eq!(second.endpoint, "https://push.example/b");

        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM subscription WHERE visitor_id = $1",
        )
        .bind("itest-visitor")
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 1);

        // another owner cannot drop the registration
        let affected = table
            .delete_by_owner_and_visitor(9002, String::from("itest-visitor"))
            .await
            .unwrap();
        assert_eq!(affected, 0);

        let affected = table
            .delete_by_owner_and_visitor(9001, String::from("itest-visitor"))
            .await
            .unwrap();
        assert_eq!(affected, 1);
    }

    #[test]
    fn test_placeholders_are_numbered_in_bind_order() {
        let mut filters = filters();
        filters.q = String::from("mac");
        filters.from_date = 1;
        filters.to_date = 2;

        let (predicate, binds) = build_list_predicate(&filters);

        // q takes $1/$2, roles $3, dates $4/$5
        assert!(predicate.contains("$1"));
        assert!(predicate.contains("plainto_tsquery('simple', $2)"));
        assert!(predicate.contains("u.role = ANY($3)"));
        assert!(predicate.contains("s.created_at >= $4"));
        assert!(predicate.contains("s.created_at <= $5"));
        assert_eq!(binds.len(), 5);
    }
}
