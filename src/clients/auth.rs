use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{config::Config, error::DispatchError, models::fcm::TokenResponse};

pub const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

const TOKEN_TTL_SECONDS: i64 = 3600;

/// Refresh this long before `exp` so an in-flight fan-out never carries a
/// token about to lapse.
const REFRESH_WINDOW_SECONDS: i64 = 60;

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

struct CachedToken {
    access_token: String,
    expires_at: i64,
}

/// Obtains bearer tokens for the push gateway by signing a service-account
/// assertion and exchanging it at the OAuth token endpoint.
pub struct TokenIssuer {
    http_client: Client,
    token_url: String,
    client_email: String,
    encoding_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenIssuer {
    pub fn new(config: &Config, http_client: Client) -> Result<Self, DispatchError> {
        let encoding_key = EncodingKey::from_rsa_pem(config.private_key_pem().as_bytes())
            .map_err(|e| DispatchError::Token(format!("invalid service-account key: {e}")))?;

        Ok(Self {
            http_client,
            token_url: config.oauth_token_url.clone(),
            client_email: config.fcm_client_email.clone(),
            encoding_key,
            cached: Mutex::new(None),
        })
    }

    /// Current bearer token, exchanging a fresh assertion only when the
    /// cached one is absent or inside the refresh window.
    pub async fn access_token(&self) -> Result<String, DispatchError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now().timestamp();

        if let Some(token) = cached.as_ref() {
            if now < token.expires_at - REFRESH_WINDOW_SECONDS {
                return Ok(token.access_token.clone());
            }
        }

        let fresh = self.exchange(now).await?;
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);

        Ok(access_token)
    }

    async fn exchange(&self, now: i64) -> Result<CachedToken, DispatchError> {
        let claims = Claims {
            iss: &self.client_email,
            scope: FCM_SCOPE,
            aud: &self.token_url,
            iat: now,
            exp: now + TOKEN_TTL_SECONDS,
        };

        let assertion =
            jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
                .map_err(|e| DispatchError::Token(format!("failed to sign assertion: {e}")))?;

        debug!(issuer = %self.client_email, "Exchanging signed assertion for access token");

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DispatchError::Token(format!("token endpoint unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Token(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| DispatchError::Token(format!("malformed token response: {e}")))?;

        info!("Access token obtained");

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: now + token.expires_in.unwrap_or(TOKEN_TTL_SECONDS),
        })
    }
}
