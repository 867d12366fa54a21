//! Token refresh: exchange the stored refresh token for a new Credential Pair.
//!
//! Failure is reported as a [`RefreshOutcome`], never as an error, so the
//! request wrapper decides whether to proceed to session expiry.

use reqwest::Method;

use super::endpoints;
use super::transport::{HttpRequest, Transport};
use super::types::{RefreshRequest, TokenGrant};
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New credentials were applied to the session.
    Refreshed,
    /// Nothing to refresh with. No network call was made.
    NoRefreshToken,
    /// The refresh endpoint answered with a non-success status.
    Rejected(u16),
    /// Network failure or unreadable response.
    Failed(String),
}

impl RefreshOutcome {
    pub fn is_refreshed(&self) -> bool {
        matches!(self, RefreshOutcome::Refreshed)
    }
}

/// POST the stored refresh token to `{base_url}/auth/refresh` and apply the grant.
///
/// The refresh body is plain JSON and carries no bearer token.
pub async fn refresh_session<T: Transport>(
    transport: &T,
    base_url: &str,
    session: &Session,
) -> RefreshOutcome {
    let Some(refresh_token) = session.refresh_token().await else {
        log::info!("No stored refresh token, refresh skipped");
        return RefreshOutcome::NoRefreshToken;
    };

    let body = match serde_json::to_string(&RefreshRequest {
        refresh_token: &refresh_token,
    }) {
        Ok(body) => body,
        Err(e) => return RefreshOutcome::Failed(format!("Failed to encode refresh request: {}", e)),
    };

    let request = HttpRequest {
        method: Method::POST,
        url: format!("{}{}", base_url, endpoints::AUTH_REFRESH),
        headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        body: Some(body),
    };

    let resp = match transport.send(request).await {
        Ok(resp) => resp,
        Err(e) => {
            log::warn!("Refresh request failed (network error): {}", e);
            return RefreshOutcome::Failed(e.to_string());
        }
    };

    if !resp.is_success() {
        log::warn!("Refresh failed with status {}", resp.status);
        return RefreshOutcome::Rejected(resp.status);
    }

    let grant: TokenGrant = match serde_json::from_str(&resp.body) {
        Ok(grant) => grant,
        Err(e) => {
            log::warn!("Failed to parse refresh response: {}", e);
            return RefreshOutcome::Failed(format!("Failed to parse refresh response: {}", e));
        }
    };

    if grant.token.is_none() {
        log::warn!("Refresh response carried no access token");
    }
    if let Err(e) = session.apply_grant(&grant).await {
        // The in-memory session already holds the new tokens.
        log::warn!("Refreshed tokens could not be persisted: {}", e);
    }

    log::info!("Session refresh successful");
    RefreshOutcome::Refreshed
}
