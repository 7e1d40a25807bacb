use anyhow::{bail, Result};
use log::info;

use crate::api::auth::{translate_auth_error, Session};
use crate::api::{ServiceClient, SignUpOutcome};
use crate::config::AppConfig;
use crate::profile::deep_link::{self, DeepLink};
use crate::render;
use crate::store::SessionStore;

/// Login / signup page. Each action either stores a session or surfaces
/// a translated provider error.
pub struct AuthPage<'a> {
    client: &'a mut ServiceClient,
    store: &'a SessionStore,
    config: &'a AppConfig,
}

impl<'a> AuthPage<'a> {
    pub fn new(
        client: &'a mut ServiceClient,
        store: &'a SessionStore,
        config: &'a AppConfig,
    ) -> Self {
        Self {
            client,
            store,
            config,
        }
    }

    pub async fn login(&mut self, email: &str, password: Option<String>) -> Result<()> {
        let password = self.resolve_password(password, "Senha:")?;

        match self.client.sign_in(email, &password).await {
            Ok(session) => {
                self.adopt_session(session)?;
                render::ok("Login realizado!");
                render::note("Veja seu perfil com `portal profile`.");
                Ok(())
            }
            Err(err) => bail!(translate_auth_error(&err.message())),
        }
    }

    pub async fn signup(&mut self, name: &str, email: &str, password: Option<String>) -> Result<()> {
        if name.trim().is_empty() {
            bail!("Preencha seu nome completo.");
        }
        let password = self.resolve_password(password, "Senha (mínimo 6 caracteres):")?;
        if password.chars().count() < self.config.registration.password_min_len {
            bail!("A senha deve ter pelo menos 6 caracteres.");
        }

        match self.client.sign_up(email, &password, name.trim()).await {
            Ok(SignUpOutcome::SignedIn(session)) => {
                self.adopt_session(session)?;
                render::ok("Conta criada com sucesso!");
                Ok(())
            }
            Ok(SignUpOutcome::NeedsConfirmation(identity)) => {
                if identity.is_duplicate_signup() {
                    bail!("Esse email já possui uma conta. Tente fazer login.");
                }
                render::ok(
                    "Conta criada! Enviamos um link de confirmação para seu email. \
                     Confirme e depois faça login.",
                );
                Ok(())
            }
            Err(err) => bail!(translate_auth_error(&err.message())),
        }
    }

    pub async fn logout(&mut self) -> Result<()> {
        if let Err(err) = self.client.sign_out().await {
            info!("Remote sign-out failed, clearing local session anyway: {}", err);
        }
        self.client.set_session(None);
        self.store.clear()?;
        render::ok("Sessão encerrada.");
        Ok(())
    }

    pub async fn request_recovery(&self, email: &str) -> Result<()> {
        if email.trim().is_empty() {
            bail!("Digite seu email.");
        }
        match self.client.request_password_reset(email).await {
            Ok(()) => {
                render::ok("Email enviado! Verifique sua caixa de entrada.");
                Ok(())
            }
            Err(_) => bail!("Erro ao enviar. Verifique o email e tente novamente."),
        }
    }

    /// Open an emailed link. The flow is decided from the link alone,
    /// before any network call.
    pub fn open_link(&mut self, url: &str) -> Result<Option<DeepLink>> {
        let Some(link) = deep_link::detect(url) else {
            bail!("Este link não contém um fluxo de recuperação ou confirmação.");
        };

        if link == DeepLink::Recovery {
            // The recovery link carries a short-lived token that lets the
            // new password be set without a regular login.
            if let Some(access_token) = deep_link::access_token(url) {
                let session = Session {
                    access_token,
                    refresh_token: None,
                };
                self.adopt_session(session)?;
            }
        }

        Ok(Some(link))
    }

    pub async fn set_password(&self, password: Option<String>) -> Result<()> {
        if self.client.session().is_none() {
            bail!("Abra o link de redefinição recebido por email antes de definir a senha.");
        }

        let password = self.resolve_password(password, "Nova senha (mínimo 6 caracteres):")?;
        if password.chars().count() < self.config.registration.password_min_len {
            bail!("A senha deve ter pelo menos 6 caracteres.");
        }
        let confirmation = render::prompt_line("Confirmar senha:")?;
        if password != confirmation {
            bail!("As senhas não coincidem.");
        }

        match self.client.update_password(&password).await {
            Ok(()) => {
                render::ok("Senha redefinida com sucesso!");
                Ok(())
            }
            Err(err) => bail!(translate_auth_error(&err.message())),
        }
    }

    pub async fn resend_verification(&self, email: &str) -> Result<()> {
        match self.client.resend_verification(email).await {
            Ok(()) => {
                render::ok("Email reenviado! Verifique sua caixa de entrada e spam.");
                Ok(())
            }
            Err(_) => bail!("Erro ao reenviar. Tente novamente em alguns minutos."),
        }
    }

    fn adopt_session(&mut self, session: Session) -> Result<()> {
        self.store.save(&session)?;
        self.client.set_session(Some(session));
        Ok(())
    }

    fn resolve_password(&self, given: Option<String>, prompt: &str) -> Result<String> {
        match given {
            Some(password) => Ok(password),
            None => render::prompt_line(prompt),
        }
    }
}
