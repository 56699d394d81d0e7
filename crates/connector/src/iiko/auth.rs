//! iiko authentication.
//!
//! iiko exchanges the organization's `apiLogin` for a bearer token that stays
//! valid for one hour. There is no refresh token: once the lifetime elapses a
//! new token is requested with the same login.

use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;
use url::Url;

use super::IikoError;
use super::types::{AccessTokenRequest, AccessTokenResponse, ErrorResponse};

/// Documented token lifetime in seconds.
pub const TOKEN_LIFETIME_SECS: i64 = 3600;

/// Seconds before expiry at which a token is treated as expired.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Bearer token obtained from `access_token`.
#[derive(Clone)]
pub struct AccessToken {
    /// Token value.
    pub token: SecretString,
    /// Unix timestamp when the token expires.
    pub expires_at: i64,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl AccessToken {
    /// Check if the token has expired (with a one-minute margin).
    #[must_use]
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.expires_at - EXPIRY_MARGIN_SECS
    }
}

/// Exchange the API login for an access token.
///
/// # Errors
///
/// Returns `IikoError::Unauthorized` if iiko rejects the login and
/// `IikoError::Api` for other non-success responses.
#[instrument(skip(client, api_login))]
pub async fn obtain_access_token(
    client: &reqwest::Client,
    base_url: &Url,
    api_login: &SecretString,
) -> Result<AccessToken, IikoError> {
    let now = chrono::Utc::now().timestamp();
    let url = base_url.join("access_token")?;

    let response = client
        .post(url)
        .json(&AccessTokenRequest {
            api_login: api_login.expose_secret(),
        })
        .send()
        .await?;

    let status = response.status();

    if status.is_success() {
        let body: AccessTokenResponse = response.json().await?;
        return Ok(AccessToken {
            token: SecretString::from(body.token),
            expires_at: now + TOKEN_LIFETIME_SECS,
        });
    }

    let error: ErrorResponse = response.json().await.unwrap_or_default();
    let message = error
        .error_description
        .or(error.error)
        .unwrap_or_else(|| format!("HTTP {status}"));

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        Err(IikoError::Unauthorized(message))
    } else {
        Err(IikoError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_expired() {
        let now = chrono::Utc::now().timestamp();

        let expired = AccessToken {
            token: SecretString::from("t"),
            expires_at: now - 10,
        };
        assert!(expired.is_expired());

        // Within the margin counts as expired
        let almost = AccessToken {
            token: SecretString::from("t"),
            expires_at: now + 30,
        };
        assert!(almost.is_expired());

        let fresh = AccessToken {
            token: SecretString::from("t"),
            expires_at: now + TOKEN_LIFETIME_SECS,
        };
        assert!(!fresh.is_expired());
    }

    #[test]
    fn test_token_debug_redacts_value() {
        let token = AccessToken {
            token: SecretString::from("super-secret-token"),
            expires_at: 0,
        };
        let debug = format!("{token:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("super-secret-token"));
    }
}
