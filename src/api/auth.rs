//! Login, patient registration, current-user lookup and logout.

use serde_json::Value;

use super::client::ApiClient;
use super::endpoints;
use super::transport::Transport;
use super::types::{
    LoginRequest, LogoutRequest, PatientRegistration, RegistrationPending, TokenGrant,
    VerifyRequest,
};
use crate::error::ApiError;
use crate::events::AuthEvent;

/// Log in with email and password and install the returned credentials.
///
/// A 401 surfaces as [`ApiError::LoginRejected`] with no session side effects.
/// Returns the user record, if the server sent one.
pub async fn login<T: Transport>(
    client: &ApiClient<T>,
    email: &str,
    password: &str,
) -> Result<Option<Value>, ApiError> {
    log::info!("Logging in as {}", email);
    let grant: TokenGrant = client
        .post(endpoints::AUTH_LOGIN, &LoginRequest { email, password })
        .await?;
    install_grant(client, grant).await
}

/// Start patient self-registration. The server sends a verification code.
pub async fn register_patient<T: Transport>(
    client: &ApiClient<T>,
    registration: &PatientRegistration,
) -> Result<RegistrationPending, ApiError> {
    log::info!("Registering patient {}", registration.email);
    let pending: Option<RegistrationPending> =
        client.post(endpoints::AUTH_REGISTER, registration).await?;
    Ok(pending.unwrap_or(RegistrationPending {
        message: None,
        email: Some(registration.email.clone()),
    }))
}

/// Complete registration with the emailed code. Installs the returned credentials.
pub async fn verify_registration<T: Transport>(
    client: &ApiClient<T>,
    email: &str,
    code: &str,
) -> Result<Option<Value>, ApiError> {
    let grant: TokenGrant = client
        .post(endpoints::AUTH_VERIFY, &VerifyRequest { email, code })
        .await?;
    install_grant(client, grant).await
}

/// Fetch the current user and store it as the session's user record.
pub async fn me<T: Transport>(client: &ApiClient<T>) -> Result<Value, ApiError> {
    let user: Value = client.get(endpoints::AUTH_ME).await?;
    // Some deployments wrap the record as {"user": {...}}.
    let user = match user.get("user") {
        Some(inner) if inner.is_object() => inner.clone(),
        _ => user,
    };
    if let Err(e) = client.session().set_user(user.clone()).await {
        log::warn!("Failed to persist user record: {}", e);
    }
    Ok(user)
}

/// Log out. The server call is best-effort; local teardown always happens.
pub async fn logout<T: Transport>(client: &ApiClient<T>) {
    log::info!("Logging out");
    let session = client.session();

    if session.is_authenticated().await {
        let refresh_token = session.refresh_token().await;
        let req = LogoutRequest {
            refresh_token: refresh_token.as_deref(),
        };
        let resp: Result<Value, ApiError> = client.post(endpoints::AUTH_LOGOUT, &req).await;
        if let Err(e) = resp {
            log::warn!("Logout request failed (will continue local cleanup): {}", e);
        }
    }

    session.clear().await;
    session.events().emit(AuthEvent::LoggedOut);
    log::info!("Logout complete");
}

async fn install_grant<T: Transport>(
    client: &ApiClient<T>,
    grant: TokenGrant,
) -> Result<Option<Value>, ApiError> {
    if grant.token.is_none() {
        return Err(ApiError::Decode("response carried no access token".to_string()));
    }

    let session = client.session();
    if let Err(e) = session.apply_grant(&grant).await {
        log::warn!("Credentials could not be persisted: {}", e);
    }
    session.events().emit(AuthEvent::LoggedIn);
    Ok(grant.user)
}
