use anyhow::{bail, Result};
use chrono::Local;
use log::{info, warn};
use serde_json::json;

use crate::api::{ApiError, Identity, ServiceClient};
use crate::config::AppConfig;
use crate::domain::{CheckinEntry, Player, RatingHistoryEntry, SkillLevel, TimeControl, TournamentWeek};
use crate::profile::{
    resolve, ChartSlot, CheckinAction, CheckinPanel, DeepLink, InFlightGuard, ProfileContext,
    ProfileState,
};
use crate::render;

/// Registration form for a brand-new player profile.
pub struct RegisterForm {
    pub full_name: String,
    pub birth_year: i32,
    pub gender: String,
    pub phone: String,
    pub registration_id: Option<String>,
    pub level: String,
}

/// The profile page: resolves which of the mutually exclusive views the
/// visiting identity is in, renders it, and runs the actions that mutate
/// remote state.
pub struct ProfilePage<'a> {
    client: &'a ServiceClient,
    config: &'a AppConfig,
    chart: ChartSlot,
    resolve_guard: InFlightGuard,
    submit_guard: InFlightGuard,
}

impl<'a> ProfilePage<'a> {
    pub fn new(client: &'a ServiceClient, config: &'a AppConfig) -> Self {
        Self {
            client,
            config,
            chart: ChartSlot::new(),
            resolve_guard: InFlightGuard::new(),
            submit_guard: InFlightGuard::new(),
        }
    }

    /// Entry point: resolve and render the current state. Re-entrant
    /// calls while a resolution is in flight are dropped.
    pub async fn show(&mut self, deep_link: Option<DeepLink>) -> Result<()> {
        if !self.resolve_guard.try_begin() {
            info!("State resolution already in flight, dropping re-entrant call");
            return Ok(());
        }
        let result = self.show_inner(deep_link).await;
        self.resolve_guard.finish();
        result
    }

    async fn show_inner(&mut self, deep_link: Option<DeepLink>) -> Result<()> {
        let ctx = self.resolve_context(deep_link).await?;
        let state = resolve(ctx);
        self.render_state(state).await
    }

    /// Gather the transition function's inputs. A deep link short-cuts
    /// before any data fetch so the right form shows immediately.
    async fn resolve_context(&self, deep_link: Option<DeepLink>) -> Result<ProfileContext> {
        if deep_link.is_some() {
            return Ok(ProfileContext {
                deep_link,
                ..Default::default()
            });
        }

        let Some(identity) = self.client.get_user().await else {
            return Ok(ProfileContext::default());
        };

        if !identity.is_verified() {
            return Ok(ProfileContext {
                identity: Some(identity),
                ..Default::default()
            });
        }

        let linked_player = self.fetch_linked_player(&identity).await?;
        let email_match = if linked_player.is_none() {
            self.fetch_email_match(&identity).await?
        } else {
            None
        };

        Ok(ProfileContext {
            deep_link: None,
            identity: Some(identity),
            linked_player,
            email_match,
        })
    }

    async fn fetch_linked_player(&self, identity: &Identity) -> Result<Option<Player>> {
        Ok(self
            .client
            .from("players")
            .eq("user_id", &identity.id)
            .maybe_single()
            .await?)
    }

    /// Unclaimed pre-registration record matching the login email.
    async fn fetch_email_match(&self, identity: &Identity) -> Result<Option<Player>> {
        let email = identity.email.trim().to_lowercase();
        Ok(self
            .client
            .from("players")
            .ilike("email", &email)
            .is_null("user_id")
            .maybe_single()
            .await?)
    }

    async fn render_state(&mut self, state: ProfileState) -> Result<()> {
        match state {
            ProfileState::Unauthenticated => {
                render::header("Meu Perfil");
                render::note("Você não está conectado.");
                render::note("Entre com `portal login <email>` ou crie uma conta com `portal signup`.");
            }
            ProfileState::Unverified { email } => {
                render::header("Confirme seu email");
                println!("Enviamos um link de confirmação para {}.", email);
                render::note("Depois de confirmar, rode `portal profile` novamente.");
                render::note("Reenvie o link com `portal resend-verification`.");
            }
            ProfileState::Claim { candidate } => self.render_claim(&candidate),
            ProfileState::Register {
                email,
                prefill_name,
            } => {
                render::header("Cadastro de jogador");
                println!("Nenhum perfil de jogador encontrado para {}.", email);
                if let Some(name) = prefill_name {
                    render::note(&format!("Nome do cadastro: {}", name));
                }
                render::note(
                    "Finalize com `portal register --name ... --birth-year ... \
                     --gender ... --phone ... --level ...`.",
                );
            }
            ProfileState::Profile { player } => self.render_profile(&player).await?,
            ProfileState::NewPassword => {
                render::header("Redefinir senha");
                render::note("Defina a nova senha com `portal set-password`.");
            }
            ProfileState::AwaitingConfirmation => {
                render::header("Confirmação de email");
                render::note(
                    "Confirmação em processamento. Assim que o provedor concluir, \
                     faça login normalmente.",
                );
            }
        }
        Ok(())
    }

    fn render_claim(&self, candidate: &Player) {
        render::header("Encontramos um cadastro com seu email");
        println!(
            "  {}  ·  {} pts  ·  {} partidas",
            render::player_label(
                &candidate.full_name,
                candidate.rating(),
                candidate.games_played()
            ),
            candidate.rating(),
            candidate.games_played()
        );
        render::note("Se for você, vincule com `portal claim`.");
        render::note("Se não for, cadastre um perfil novo com `portal register`.");
    }

    /// The full profile view: header with rank, stats, check-in panel and
    /// the rating trajectory.
    async fn render_profile(&mut self, player: &Player) -> Result<()> {
        let (rank, total) = self.fetch_rank(player).await?;

        render::header(&format!(
            "{}  [{}]",
            render::player_label(&player.full_name, player.rating(), player.games_played()),
            player.initials()
        ));
        if let Some(email) = &player.email {
            render::note(email);
        }
        println!("{}º de {} jogadores no ranking", rank, total);
        println!(
            "\n  Rating Rápidas: {}    Partidas Jogadas: {}",
            player.rating(),
            player.games_played()
        );

        self.render_checkin_section(player).await?;
        self.render_rating_chart(player, TimeControl::Rapid).await?;

        render::note("\nVer pareamentos: `portal pairings` · Sair: `portal logout`");
        Ok(())
    }

    async fn fetch_rank(&self, player: &Player) -> Result<(i64, i64)> {
        let total = self.client.from("players").count().await?;
        let above = self
            .client
            .from("players")
            .gt("rating_rapid", player.rating())
            .count()
            .await?;
        Ok((above + 1, total))
    }

    async fn render_checkin_section(&self, player: &Player) -> Result<()> {
        render::header("Próximo Torneio");

        let Some(panel) = self.load_checkin_panel().await? else {
            render::note("Nenhum torneio aberto para check-in no momento.");
            return Ok(());
        };

        let now = Local::now().naive_local();
        let week = &panel.week;
        println!(
            "Semana {} — {}{}",
            week.week_number,
            week.tournament_name(),
            week.edition_label()
        );
        println!(
            "{} às {}",
            week.match_date.format("%d/%m/%Y"),
            week.start_time_label()
        );
        let confirmed = panel.roster().len();
        let spots = panel.spots_left();
        println!(
            "{} / {} confirmados · {}",
            confirmed,
            week.max_players,
            if spots > 0 {
                format!("{} vagas restantes", spots)
            } else {
                "Lotado".to_string()
            }
        );
        if !panel.deadline_passed(now) {
            render::note(&format!(
                "Check-in encerra às {}",
                panel.deadline().format("%H:%M")
            ));
        }

        match panel.action(&player.id, now) {
            CheckinAction::Confirmed => render::ok("Presença confirmada"),
            CheckinAction::Cancelable => {
                render::ok("Confirmado");
                render::note("Cancele com `portal cancel-checkin`.");
            }
            CheckinAction::Closed => render::note("Check-in encerrado"),
            CheckinAction::Full => render::error("Vagas esgotadas"),
            CheckinAction::Available => {
                render::note("Confirme presença com `portal checkin`.");
            }
        }

        println!("\nJogadores confirmados:");
        if panel.roster().is_empty() {
            render::note("Nenhum jogador confirmado ainda.");
        }
        for (position, entry) in panel.roster().iter().enumerate() {
            let (name, rating, games) = match &entry.players {
                Some(p) => (p.full_name.as_str(), p.rating(), p.games_played()),
                None => ("?", 0, 0),
            };
            println!(
                "  {:>2}. {}  {}",
                position + 1,
                render::player_label(name, rating, games),
                rating
            );
        }
        Ok(())
    }

    async fn render_rating_chart(&mut self, player: &Player, tc: TimeControl) -> Result<()> {
        render::header("Evolução do Rating");
        let history = self.fetch_history(&player.id).await?;

        match self.chart.render(&history, tc) {
            Some(chart) => print!("{}", chart.draw()),
            None => render::note("Nenhuma partida registrada nesta modalidade ainda."),
        }
        Ok(())
    }

    async fn fetch_history(&self, player_id: &str) -> Result<Vec<RatingHistoryEntry>> {
        Ok(self
            .client
            .from("rating_history")
            .select("rating_before, rating_after, delta, time_control, created_at, match_id")
            .eq("player_id", player_id)
            .order("created_at", true)
            .fetch()
            .await?)
    }

    /// Confirm presence in the next open week. At most one remote call
    /// goes out even if invoked again while the first is in flight.
    pub async fn checkin(&mut self) -> Result<()> {
        let player = self.require_linked_player().await?;
        let Some(panel) = self.load_checkin_panel().await? else {
            bail!("Nenhum torneio aberto para check-in no momento.");
        };

        match panel.action(&player.id, Local::now().naive_local()) {
            CheckinAction::Available => {}
            CheckinAction::Cancelable | CheckinAction::Confirmed => {
                render::ok("Presença já confirmada.");
                return Ok(());
            }
            CheckinAction::Closed => bail!("Check-in encerrado"),
            CheckinAction::Full => bail!("Vagas esgotadas"),
        }

        if !self.submit_guard.try_begin() {
            info!("Check-in already in flight, dropping re-entrant call");
            return Ok(());
        }
        let outcome = self.client.checkin_week(&panel.week.id).await;
        self.submit_guard.finish();

        match outcome {
            Ok(_) => {
                render::ok("Presença confirmada!");
                self.show(None).await
            }
            Err(err) => bail!(checkin_error_message(err, "Erro ao confirmar presença.")),
        }
    }

    /// Cancel a confirmed presence, behind an explicit confirmation step.
    pub async fn cancel_checkin(&mut self, assume_yes: bool) -> Result<()> {
        let player = self.require_linked_player().await?;
        let Some(panel) = self.load_checkin_panel().await? else {
            bail!("Nenhum torneio aberto para check-in no momento.");
        };

        match panel.action(&player.id, Local::now().naive_local()) {
            CheckinAction::Cancelable => {}
            CheckinAction::Confirmed => bail!("Check-in encerrado; a presença não pode mais ser cancelada."),
            _ => bail!("Você não tem check-in nesta semana."),
        }

        if !assume_yes && !render::confirm("Deseja cancelar sua presença nesta semana?")? {
            render::note("Cancelamento abortado.");
            return Ok(());
        }

        if !self.submit_guard.try_begin() {
            info!("Cancellation already in flight, dropping re-entrant call");
            return Ok(());
        }
        let outcome = self.client.cancel_checkin(&panel.week.id).await;
        self.submit_guard.finish();

        match outcome {
            Ok(_) => {
                render::ok("Presença cancelada.");
                self.show(None).await
            }
            Err(err) => bail!(checkin_error_message(err, "Erro ao cancelar.")),
        }
    }

    /// Link the unclaimed record offered by the claim prompt.
    pub async fn claim(&mut self) -> Result<()> {
        let identity = self.require_verified_identity().await?;
        let Some(candidate) = self.fetch_email_match(&identity).await? else {
            bail!("Nenhum cadastro aguardando vinculação para {}.", identity.email);
        };

        if !self.submit_guard.try_begin() {
            return Ok(());
        }
        let outcome = self.client.link_player(&candidate.id).await;
        self.submit_guard.finish();

        match outcome {
            Ok(()) => {
                render::ok("Conta vinculada!");
                self.show(None).await
            }
            Err(err) => bail!("{}", err.message()),
        }
    }

    /// Create a new player profile for the logged-in identity.
    pub async fn register(&mut self, form: RegisterForm) -> Result<()> {
        let identity = self.require_verified_identity().await?;
        let level = self.validate_registration(&form)?;

        if self.fetch_linked_player(&identity).await?.is_some() {
            bail!("Sua conta já está vinculada a um perfil de jogador.");
        }

        let row = registration_row(&identity, &form, level);

        if !self.submit_guard.try_begin() {
            return Ok(());
        }
        let outcome = self.client.from("players").insert(&row).await;
        self.submit_guard.finish();

        match outcome {
            Ok(()) => {
                render::ok("Cadastro concluído!");
                self.show(None).await
            }
            Err(err) => {
                let message = err.message();
                if message.contains("unique") || message.contains("duplicate") {
                    bail!(
                        "Esse email já está vinculado a outro jogador. \
                         Entre em contato com a organização."
                    );
                }
                bail!(message)
            }
        }
    }

    fn validate_registration(&self, form: &RegisterForm) -> Result<SkillLevel> {
        let bounds = &self.config.registration;
        if form.full_name.trim().is_empty() {
            bail!("Preencha seu nome completo.");
        }
        if form.birth_year < bounds.birth_year_min || form.birth_year > bounds.birth_year_max {
            bail!("Preencha um ano de nascimento válido.");
        }
        if form.gender.trim().is_empty() {
            bail!("Selecione seu gênero.");
        }
        if form.phone.trim().is_empty() {
            bail!("Preencha seu telefone.");
        }
        form.level
            .parse::<SkillLevel>()
            .map_err(|_| anyhow::anyhow!("Selecione seu nível de jogo."))
    }

    async fn require_verified_identity(&self) -> Result<Identity> {
        let identity = super::guard::require_identity(self.client).await?;
        if !identity.is_verified() {
            bail!("Confirme seu email antes de continuar.");
        }
        Ok(identity)
    }

    async fn require_linked_player(&self) -> Result<Player> {
        let identity = self.require_verified_identity().await?;
        match self.fetch_linked_player(&identity).await? {
            Some(player) => Ok(player),
            None => bail!("Nenhum perfil de jogador vinculado. Rode `portal profile`."),
        }
    }

    async fn load_checkin_panel(&self) -> Result<Option<CheckinPanel>> {
        let week: Option<TournamentWeek> = self
            .client
            .from("tournament_weeks")
            .select(
                "id, tournament_id, week_number, match_date, match_time, \
                 max_players, status, tournaments(name, edition)",
            )
            .in_list("status", &["open", "in_progress"])
            .order("match_date", true)
            .maybe_single()
            .await?;

        let Some(week) = week else {
            return Ok(None);
        };

        let checkins: Vec<CheckinEntry> = self
            .client
            .from("tournament_checkins")
            .select(
                "id, player_id, checked_in_at, \
                 players(full_name, rating_rapid, games_played_rapid)",
            )
            .eq("tournament_week_id", &week.id)
            .order("checked_in_at", true)
            .fetch()
            .await?;

        Ok(Some(CheckinPanel::new(
            week,
            checkins,
            self.config.checkin.default_match_time,
        )))
    }
}

/// Business failures keep their remote message verbatim; transport
/// failures get the action's generic message.
fn checkin_error_message(err: ApiError, fallback: &str) -> String {
    match err {
        ApiError::Business(message) => message,
        ApiError::Status { message, .. } => message,
        other => {
            warn!("Check-in call failed: {}", other);
            fallback.to_string()
        }
    }
}

/// New-player row: email normalized, rating seeded from the declared
/// level, zero games played.
fn registration_row(
    identity: &Identity,
    form: &RegisterForm,
    level: SkillLevel,
) -> serde_json::Value {
    json!({
        "full_name": form.full_name.trim(),
        "email": identity.email.trim().to_lowercase(),
        "user_id": identity.id,
        "birth_year": form.birth_year,
        "gender": form.gender,
        "phone": form.phone,
        "ra": form.registration_id,
        "level": level.as_str(),
        "rating_rapid": level.starting_rating(),
        "games_played_rapid": 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intermediate_registration_starts_at_1400_with_zero_games() {
        let identity: Identity = serde_json::from_value(json!({
            "id": "user-1",
            "email": "  Ana@Example.com ",
            "email_confirmed_at": "2025-02-01T10:00:00Z",
        }))
        .unwrap();
        let form = RegisterForm {
            full_name: " Ana Souza ".into(),
            birth_year: 1999,
            gender: "feminino".into(),
            phone: "11 99999-0000".into(),
            registration_id: None,
            level: "intermediario".into(),
        };

        let row = registration_row(&identity, &form, SkillLevel::Intermediario);
        assert_eq!(row["rating_rapid"], 1400);
        assert_eq!(row["games_played_rapid"], 0);
        assert_eq!(row["email"], "ana@example.com");
        assert_eq!(row["full_name"], "Ana Souza");
        assert_eq!(row["user_id"], "user-1");
    }
}
