use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::client::ServiceClient;
use crate::api::error::ApiError;

/// Stored authentication tokens; the identity itself is re-fetched on
/// every page load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Authenticated principal as returned by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
    #[serde(default)]
    pub identities: Option<Vec<Value>>,
}

impl Identity {
    pub fn is_verified(&self) -> bool {
        self.email_confirmed_at.is_some()
    }

    /// Sign-up against an email that already owns an account comes back
    /// with an empty identities array.
    pub fn is_duplicate_signup(&self) -> bool {
        self.identities
            .as_ref()
            .map(|ids| ids.is_empty())
            .unwrap_or(false)
    }
}

/// Result of a sign-up: either a session right away (confirmation
/// disabled) or a pending identity that must confirm by email first.
#[derive(Debug)]
pub enum SignUpOutcome {
    SignedIn(Session),
    NeedsConfirmation(Identity),
}

impl ServiceClient {
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let url = self.auth_url("token?grant_type=password");
        let body = json!({ "email": email, "password": password });
        let response = self.send(self.post(&url).json(&body)).await?;
        Ok(response.json().await?)
    }

    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<SignUpOutcome, ApiError> {
        let url = self.auth_url("signup");
        let body = json!({
            "email": email,
            "password": password,
            "data": { "full_name": full_name },
        });
        let response = self.send(self.post(&url).json(&body)).await?;
        let value: Value = response.json().await?;

        if value.get("access_token").is_some() {
            let session: Session = serde_json::from_value(value)?;
            return Ok(SignUpOutcome::SignedIn(session));
        }

        let identity: Identity = serde_json::from_value(value)?;
        Ok(SignUpOutcome::NeedsConfirmation(identity))
    }

    pub async fn sign_out(&self) -> Result<(), ApiError> {
        let url = self.auth_url("logout");
        self.send(self.post(&url)).await?;
        Ok(())
    }

    /// Current identity for the stored session, or None when the session
    /// is absent or no longer valid.
    pub async fn get_user(&self) -> Option<Identity> {
        self.session()?;
        let url = self.auth_url("user");
        match self.send(self.get(&url)).await {
            Ok(response) => response.json().await.ok(),
            Err(_) => None,
        }
    }

    pub async fn update_password(&self, password: &str) -> Result<(), ApiError> {
        let url = self.auth_url("user");
        let body = json!({ "password": password });
        self.send(self.put(&url).json(&body)).await?;
        Ok(())
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<(), ApiError> {
        let url = self.auth_url("recover");
        let body = json!({ "email": email });
        self.send(self.post(&url).json(&body)).await?;
        Ok(())
    }

    pub async fn resend_verification(&self, email: &str) -> Result<(), ApiError> {
        let url = self.auth_url("resend");
        let body = json!({ "type": "signup", "email": email });
        self.send(self.post(&url).json(&body)).await?;
        Ok(())
    }
}

/// Map well-known identity-provider errors to localized messages; fall
/// back to the raw message for anything unrecognized.
pub fn translate_auth_error(message: &str) -> String {
    if message.contains("Invalid login") {
        return "Email ou senha incorretos.".to_string();
    }
    if message.contains("already registered") {
        return "Este email já possui uma conta.".to_string();
    }
    if message.contains("valid email") {
        return "Insira um email válido.".to_string();
    }
    if message.contains("least 6") || message.contains("at least") {
        return "A senha deve ter pelo menos 6 caracteres.".to_string();
    }
    if message.contains("rate limit") || message.contains("too many") {
        return "Muitas tentativas. Aguarde alguns minutos e tente novamente.".to_string();
    }
    message.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_auth_errors_are_localized() {
        assert_eq!(
            translate_auth_error("Invalid login credentials"),
            "Email ou senha incorretos."
        );
        assert_eq!(
            translate_auth_error("User already registered"),
            "Este email já possui uma conta."
        );
        assert_eq!(
            translate_auth_error("Password should be at least 6 characters"),
            "A senha deve ter pelo menos 6 caracteres."
        );
        assert_eq!(
            translate_auth_error("email rate limit exceeded"),
            "Muitas tentativas. Aguarde alguns minutos e tente novamente."
        );
    }

    #[test]
    fn unknown_auth_errors_pass_through() {
        assert_eq!(translate_auth_error("boom"), "boom");
    }

    #[test]
    fn duplicate_signup_detected_from_empty_identities() {
        let identity: Identity = serde_json::from_value(json!({
            "id": "u1",
            "email": "a@b.c",
            "identities": [],
        }))
        .unwrap();
        assert!(identity.is_duplicate_signup());

        let fresh: Identity = serde_json::from_value(json!({
            "id": "u2",
            "email": "d@e.f",
            "identities": [{"provider": "email"}],
        }))
        .unwrap();
        assert!(!fresh.is_duplicate_signup());
    }

    #[test]
    fn verification_follows_confirmation_timestamp() {
        let unverified: Identity = serde_json::from_value(json!({
            "id": "u1",
            "email": "a@b.c",
        }))
        .unwrap();
        assert!(!unverified.is_verified());

        let verified: Identity = serde_json::from_value(json!({
            "id": "u1",
            "email": "a@b.c",
            "email_confirmed_at": "2025-03-01T12:00:00Z",
        }))
        .unwrap();
        assert!(verified.is_verified());
    }
}
