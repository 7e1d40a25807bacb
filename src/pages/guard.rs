use anyhow::{bail, Result};
use log::warn;

use crate::api::{Identity, ServiceClient};
use crate::domain::Referee;
use crate::render;
use crate::store::SessionStore;

/// Resolve the current identity or route the user to the login view.
pub async fn require_identity(client: &ServiceClient) -> Result<Identity> {
    match client.get_user().await {
        Some(identity) => Ok(identity),
        None => {
            render::note("Sessão ausente ou expirada.");
            bail!("Faça login com `portal login <email>`");
        }
    }
}

/// The referee console additionally requires a role-bearing record. A
/// missing record means denial: the session is dropped before routing
/// back to login.
pub async fn require_referee(
    client: &ServiceClient,
    store: &SessionStore,
) -> Result<(Identity, Referee)> {
    let identity = require_identity(client).await?;

    let referee: Option<Referee> = match client
        .from("referees")
        .select("full_name, role")
        .eq("id", &identity.id)
        .maybe_single()
        .await
    {
        Ok(referee) => referee,
        Err(err) => {
            warn!("Referee lookup failed: {}", err);
            None
        }
    };

    match referee {
        Some(referee) => Ok((identity, referee)),
        None => {
            render::error("Acesso negado");
            if let Err(err) = client.sign_out().await {
                warn!("Sign-out after denial failed: {}", err);
            }
            store.clear()?;
            bail!("Esta conta não tem acesso de árbitro.");
        }
    }
}
