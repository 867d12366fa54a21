//! Appointment booking.

use super::client::ApiClient;
use super::endpoints;
use super::transport::Transport;
use super::types::{Appointment, ListResponse, NewAppointment};
use crate::error::ApiError;

pub async fn book<T: Transport>(
    client: &ApiClient<T>,
    appointment: &NewAppointment,
) -> Result<Appointment, ApiError> {
    let booked: Appointment = client.post(endpoints::APPOINTMENTS, appointment).await?;
    log::info!("Appointment {} booked", booked.id);
    Ok(booked)
}

pub async fn list<T: Transport>(client: &ApiClient<T>) -> Result<Vec<Appointment>, ApiError> {
    let list: ListResponse<Appointment> = client.get(endpoints::APPOINTMENTS).await?;
    Ok(list.into_vec())
}

pub async fn cancel<T: Transport>(client: &ApiClient<T>, id: &str) -> Result<(), ApiError> {
    client.delete(&endpoints::item(endpoints::APPOINTMENTS, id)).await?;
    Ok(())
}
