//! Campus identity gateway adapter (OAuth 2.0 device-authorization flow).
//!
//! `sign_in` requests a device code, surfaces the verification URL for the
//! user, and polls the token endpoint until the gateway reports approval or
//! a terminal failure. The returned ID token is HS256-signed with a secret
//! shared with registered clients; its claims map onto the `Principal`.

use std::time::Duration;

use async_trait::async_trait;
use domains::{BoardError, IdentityProvider, Principal, Result};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::info;

#[derive(Debug, Clone)]
pub struct OidcConfig {
    /// Gateway base URL, e.g. `https://id.campus.example`.
    pub issuer: String,
    pub client_id: String,
    /// Shared HS256 secret used to validate ID tokens.
    pub token_secret: String,
}

pub struct OidcIdentityProvider {
    client: Client,
    config: OidcConfig,
    sessions: watch::Sender<Option<Principal>>,
}

#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    expires_in: u64,
    #[serde(default = "default_poll_interval")]
    interval: u64,
}

fn default_poll_interval() -> u64 {
    5
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

impl OidcIdentityProvider {
    pub fn new(config: OidcConfig) -> Self {
        let (sessions, _) = watch::channel(None);
        Self {
            client: Client::new(),
            config,
            sessions,
        }
    }

    async fn request_device_code(&self) -> Result<DeviceCodeResponse> {
        let url = format!("{}/oauth/device/code", self.config.issuer.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("scope", "openid profile email"),
            ])
            .send()
            .await
            .map_err(auth_err)?;
        if !response.status().is_success() {
            return Err(BoardError::Auth(format!(
                "device code request failed: {}",
                response.status()
            )));
        }
        response.json().await.map_err(auth_err)
    }

    async fn poll_token(&self, device: &DeviceCodeResponse) -> Result<TokenResponse> {
        let url = format!("{}/oauth/token", self.config.issuer.trim_end_matches('/'));
        let deadline = Instant::now() + Duration::from_secs(device.expires_in);
        let mut interval = Duration::from_secs(device.interval);

        loop {
            if Instant::now() >= deadline {
                return Err(BoardError::Auth(
                    "device code expired before approval".to_string(),
                ));
            }
            tokio::time::sleep(interval).await;

            let response = self
                .client
                .post(&url)
                .form(&[
                    (
                        "grant_type",
                        "urn:ietf:params:oauth:grant-type:device_code",
                    ),
                    ("device_code", device.device_code.as_str()),
                    ("client_id", self.config.client_id.as_str()),
                ])
                .send()
                .await
                .map_err(auth_err)?;

            if response.status().is_success() {
                return response.json().await.map_err(auth_err);
            }

            let err: TokenErrorResponse = response.json().await.map_err(auth_err)?;
            match err.error.as_str() {
                "authorization_pending" => {}
                "slow_down" => interval += Duration::from_secs(5),
                "access_denied" => {
                    return Err(BoardError::Auth(
                        "user declined the consent prompt".to_string(),
                    ))
                }
                "expired_token" => {
                    return Err(BoardError::Auth("device code expired".to_string()))
                }
                other => {
                    return Err(BoardError::Auth(format!("token endpoint error: {other}")))
                }
            }
        }
    }

    fn principal_from_token(&self, id_token: &str) -> Result<Principal> {
        let key = DecodingKey::from_secret(self.config.token_secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.client_id]);
        let data = jsonwebtoken::decode::<IdTokenClaims>(id_token, &key, &validation)
            .map_err(|e| BoardError::Auth(format!("invalid ID token: {e}")))?;
        Ok(Principal {
            uid: data.claims.sub,
            display_name: data.claims.name,
            email: data.claims.email,
            photo_url: data.claims.picture,
        })
    }
}

#[async_trait]
impl IdentityProvider for OidcIdentityProvider {
    async fn sign_in(&self) -> Result<Principal> {
        let device = self.request_device_code().await?;
        info!(
            url = %device.verification_uri,
            code = %device.user_code,
            "waiting for consent at the identity gateway"
        );
        let token = self.poll_token(&device).await?;
        let principal = self.principal_from_token(&token.id_token)?;
        self.sessions.send_replace(Some(principal.clone()));
        Ok(principal)
    }

    async fn sign_out(&self) -> Result<()> {
        // local clear only; the gateway session outlives this client
        self.sessions.send_replace(None);
        Ok(())
    }

    fn sessions(&self) -> watch::Receiver<Option<Principal>> {
        self.sessions.subscribe()
    }
}

fn auth_err(e: reqwest::Error) -> BoardError {
    BoardError::Auth(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn provider() -> OidcIdentityProvider {
        OidcIdentityProvider::new(OidcConfig {
            issuer: "https://id.campus.example".to_string(),
            client_id: "board-web".to_string(),
            token_secret: "shared-secret".to_string(),
        })
    }

    fn mint(secret: &[u8], claims: serde_json::Value) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap()
    }

    fn valid_claims() -> serde_json::Value {
        serde_json::json!({
            "sub": "u-42",
            "name": "Ada",
            "email": "ada@campus.edu",
            "iss": "https://id.campus.example",
            "aud": "board-web",
            "exp": chrono::Utc::now().timestamp() + 600,
        })
    }

    #[test]
    fn maps_valid_token_claims_onto_principal() {
        let token = mint(b"shared-secret", valid_claims());
        let principal = provider().principal_from_token(&token).unwrap();
        assert_eq!(principal.uid, "u-42");
        assert_eq!(principal.display_name.as_deref(), Some("Ada"));
        assert_eq!(principal.email.as_deref(), Some("ada@campus.edu"));
        assert!(principal.photo_url.is_none());
    }

    #[test]
    fn rejects_token_signed_with_wrong_secret() {
        let token = mint(b"someone-elses-secret", valid_claims());
        let err = provider().principal_from_token(&token).unwrap_err();
        assert!(matches!(err, BoardError::Auth(_)));
    }

    #[test]
    fn rejects_token_for_another_audience() {
        let mut claims = valid_claims();
        claims["aud"] = serde_json::json!("other-app");
        let token = mint(b"shared-secret", claims);
        let err = provider().principal_from_token(&token).unwrap_err();
        assert!(matches!(err, BoardError::Auth(_)));
    }
}
