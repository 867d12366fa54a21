//! Notification broadcasting.

use super::client::ApiClient;
use super::endpoints;
use super::transport::Transport;
use super::types::{Broadcast, ListResponse, Notification};
use crate::error::ApiError;

pub async fn broadcast<T: Transport>(
    client: &ApiClient<T>,
    broadcast: &Broadcast,
) -> Result<Notification, ApiError> {
    log::info!("Broadcasting '{}' to {}", broadcast.title, broadcast.audience);
    client.post(endpoints::NOTIFICATIONS_BROADCAST, broadcast).await
}

pub async fn list<T: Transport>(client: &ApiClient<T>) -> Result<Vec<Notification>, ApiError> {
    let list: ListResponse<Notification> = client.get(endpoints::NOTIFICATIONS).await?;
    Ok(list.into_vec())
}
