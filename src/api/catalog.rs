//! Appointment-type and specialty catalogs.
//!
//! Both catalogs share the same CRUD shape, so the operations are generic
//! over [`CatalogEntry`].

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::client::ApiClient;
use super::endpoints;
use super::transport::Transport;
use super::types::{AppointmentType, ListResponse, Specialty};
use crate::error::ApiError;

pub trait CatalogEntry: Serialize + DeserializeOwned {
    /// Collection path of this catalog.
    const PATH: &'static str;
}

impl CatalogEntry for AppointmentType {
    const PATH: &'static str = endpoints::APPOINTMENT_TYPES;
}

impl CatalogEntry for Specialty {
    const PATH: &'static str = endpoints::SPECIALTIES;
}

pub async fn list<E: CatalogEntry, T: Transport>(client: &ApiClient<T>) -> Result<Vec<E>, ApiError> {
    let list: ListResponse<E> = client.get(E::PATH).await?;
    Ok(list.into_vec())
}

pub async fn create<E: CatalogEntry, T: Transport>(
    client: &ApiClient<T>,
    entry: &E,
) -> Result<E, ApiError> {
    client.post(E::PATH, entry).await
}

pub async fn update<E: CatalogEntry, T: Transport>(
    client: &ApiClient<T>,
    id: &str,
    entry: &E,
) -> Result<E, ApiError> {
    client.put(&endpoints::item(E::PATH, id), entry).await
}

pub async fn delete<E: CatalogEntry, T: Transport>(
    client: &ApiClient<T>,
    id: &str,
) -> Result<(), ApiError> {
    client.delete(&endpoints::item(E::PATH, id)).await?;
    Ok(())
}
