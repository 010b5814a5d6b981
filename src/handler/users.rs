use crate::{
    configuration::{AppState, State},
    error::Error,
    model::{NewUser, User},
    types::{
        CreatedUserEvent, DeletedUserEvent, RestoredUserEvent,
        UpdatedUserEvent, WireUser,
    },
};

fn from_wire(user: WireUser, created_by: Option<i32>) -> NewUser {
    NewUser {
        id: user.id,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        password: user.password,
        phone: user.phone,
        role: user.role,
        created_by,
    }
}

/// Mirrors an upstream user creation. The duplicate check includes
/// soft-deleted rows, so a deleted user's email stays reserved.
pub async fn create(
    state: &AppState<State>,
    event: CreatedUserEvent,
) -> Result<User, Error> {
    let existing = state
        .database
        .users
        .find_by_email_with_deleted(event.created_user.email.to_owned())
        .await?;

    if existing.is_some() {
        return Err(Error::DuplicateField(String::from("email")));
    }

    let user = state
        .database
        .users
        .insert(from_wire(event.created_user, Some(event.current_user.id)))
        .await?;

    Ok(user)
}

pub async fn update(
    state: &AppState<State>,
    event: UpdatedUserEvent,
) -> Result<User, Error> {
    state
        .database
        .users
        .update(from_wire(event.updated_user, None))
        .await?
        .ok_or_else(|| Error::FieldNotExist(String::from("user")))
}

pub async fn delete(
    state: &AppState<State>,
    event: DeletedUserEvent,
) -> Result<User, Error> {
    state
        .database
        .users
        .soft_delete(event.deleted_user.id)
        .await?
        .ok_or_else(|| Error::FieldNotExist(String::from("user")))
}

/// Only the user who created the row may restore it.
pub async fn restore(
    state: &AppState<State>,
    event: RestoredUserEvent,
) -> Result<User, Error> {
    state
        .database
        .users
        .restore(event.restored_user.id, event.current_user.id)
        .await?
        .ok_or_else(|| Error::FieldNotExist(String::from("user")))
}
