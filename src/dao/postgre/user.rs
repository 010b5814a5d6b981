use sqlx::error::Error;

use crate::model::{NewUser, Table, User};

impl Table<User> {
    /// Lookup including soft-deleted rows, used by the duplicate-email
    /// check before insert.
    pub async fn find_by_email_with_deleted(
        &self,
        email: String,
    ) -> Result<Option<User>, Error> {
        sqlx::query_as(
            r#"
            SELECT * FROM users WHERE email=$1
            "#,
        )
        .bind(email)
        .persistent(true)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn insert(&self, user: NewUser) -> Result<User, Error> {
        sqlx::query_as(
            r#"
            INSERT INTO users (id, first_name, last_name, email, password, phone, role, created_by)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.phone)
        .bind(&user.role)
        .bind(user.created_by)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update(&self, user: NewUser) -> Result<Option<User>, Error> {
        sqlx::query_as(
            r#"
            UPDATE users SET
                first_name=$2, last_name=$3, email=$4, password=$5,
                phone=$6, role=$7, updated_at=now()
            WHERE id=$1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.phone)
        .bind(&user.role)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn soft_delete(&self, id: i32) -> Result<Option<User>, Error> {
        sqlx::query_as(
            r#"
            UPDATE users SET deleted_at=now(), updated_at=now()
            WHERE id=$1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Restore is limited to the user who created the row.
    pub async fn restore(
        &self,
        id: i32,
        created_by: i32,
    ) -> Result<Option<User>, Error> {
        sqlx::query_as(
            r#"
            UPDATE users SET deleted_at=NULL, updated_at=now()
            WHERE id=$1 AND deleted_at IS NOT NULL AND created_by=$2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(created_by)
        .fetch_optional(&self.pool)
        .await
    }
}
