//! User and role administration.

use super::client::ApiClient;
use super::endpoints;
use super::transport::Transport;
use super::types::{ListResponse, NewUser, Role, RoleAssignment, User, UserUpdate};
use crate::error::ApiError;

pub async fn list_users<T: Transport>(client: &ApiClient<T>) -> Result<Vec<User>, ApiError> {
    let list: ListResponse<User> = client.get(endpoints::USERS).await?;
    Ok(list.into_vec())
}

pub async fn get_user<T: Transport>(client: &ApiClient<T>, id: &str) -> Result<User, ApiError> {
    client.get(&endpoints::item(endpoints::USERS, id)).await
}

pub async fn create_user<T: Transport>(
    client: &ApiClient<T>,
    user: &NewUser,
) -> Result<User, ApiError> {
    log::info!("Creating user {} with role {}", user.email, user.role);
    client.post(endpoints::USERS, user).await
}

pub async fn update_user<T: Transport>(
    client: &ApiClient<T>,
    id: &str,
    update: &UserUpdate,
) -> Result<User, ApiError> {
    client.patch(&endpoints::item(endpoints::USERS, id), update).await
}

pub async fn delete_user<T: Transport>(client: &ApiClient<T>, id: &str) -> Result<(), ApiError> {
    log::info!("Deleting user {}", id);
    client.delete(&endpoints::item(endpoints::USERS, id)).await?;
    Ok(())
}

pub async fn list_roles<T: Transport>(client: &ApiClient<T>) -> Result<Vec<Role>, ApiError> {
    let list: ListResponse<Role> = client.get(endpoints::ROLES).await?;
    Ok(list.into_vec())
}

/// Replace the role of user `id`.
pub async fn assign_role<T: Transport>(
    client: &ApiClient<T>,
    id: &str,
    role: &str,
) -> Result<User, ApiError> {
    let path = format!("{}/role", endpoints::item(endpoints::USERS, id));
    client.put(&path, &RoleAssignment { role }).await
}
