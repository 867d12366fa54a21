//! Patient profile of the logged-in patient.

use super::client::ApiClient;
use super::endpoints;
use super::transport::Transport;
use super::types::PatientProfile;
use crate::error::ApiError;

pub async fn get_profile<T: Transport>(client: &ApiClient<T>) -> Result<PatientProfile, ApiError> {
    client.get(endpoints::PATIENT_PROFILE).await
}

pub async fn update_profile<T: Transport>(
    client: &ApiClient<T>,
    profile: &PatientProfile,
) -> Result<PatientProfile, ApiError> {
    client.put(endpoints::PATIENT_PROFILE, profile).await
}
