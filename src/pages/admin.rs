use anyhow::{bail, Result};
use chrono::NaiveDate;
use log::{info, warn};
use serde_json::json;

use crate::api::rpc::RegisterMatchParams;
use crate::api::ServiceClient;
use crate::domain::{MatchResultCode, RecentMatch, Referee, Tournament, TournamentWeek};
use crate::pages::guard;
use crate::profile::InFlightGuard;
use crate::render;
use crate::store::SessionStore;

pub struct RecordMatchForm {
    pub tournament_id: String,
    pub round: i32,
    pub white: String,
    pub black: String,
    pub result_code: String,
}

pub struct CreateWeekForm {
    pub tournament_id: String,
    pub week_number: i32,
    pub match_date: NaiveDate,
    pub max_players: i32,
}

/// Referee console: record results, roll them back, manage weeks and
/// trigger pairing generation. Every entry point re-checks the referee
/// role.
pub struct AdminConsole<'a> {
    client: &'a ServiceClient,
    store: &'a SessionStore,
    submit_guard: InFlightGuard,
}

impl<'a> AdminConsole<'a> {
    pub fn new(client: &'a ServiceClient, store: &'a SessionStore) -> Self {
        Self {
            client,
            store,
            submit_guard: InFlightGuard::new(),
        }
    }

    /// Record a match result. Validation happens before any remote call;
    /// submission is serialized by the in-flight flag.
    pub async fn record(&mut self, form: RecordMatchForm) -> Result<()> {
        let (identity, referee) = guard::require_referee(self.client, self.store).await?;
        render::note(&format!("Árbitro: {}", referee.full_name));

        if form.tournament_id.trim().is_empty()
            || form.white.trim().is_empty()
            || form.black.trim().is_empty()
        {
            bail!("Preencha todos os campos");
        }
        if form.round < 1 {
            bail!("Preencha todos os campos");
        }
        if form.white == form.black {
            bail!("Jogadores não podem ser iguais");
        }
        let Some(code) = MatchResultCode::parse(&form.result_code) else {
            bail!("Resultado inválido");
        };
        let scores = code.scores();

        if !self.submit_guard.try_begin() {
            info!("Match submission already in flight, dropping re-entrant call");
            return Ok(());
        }
        let outcome = self
            .client
            .register_match(RegisterMatchParams {
                tournament_id: &form.tournament_id,
                round: form.round,
                white: &form.white,
                black: &form.black,
                result_white: scores.white,
                result_black: scores.black,
                referee_id: &identity.id,
                is_walkover: scores.walkover,
            })
            .await;
        self.submit_guard.finish();

        match outcome {
            Ok(()) => {
                render::ok("Partida registrada com sucesso");
                Ok(())
            }
            Err(err) if err.is_duplicate_match() => {
                bail!("Esse confronto já foi registrado nessa rodada")
            }
            Err(err) => bail!(err.message()),
        }
    }

    /// Last ten recorded matches. The rollback hint only shows for the
    /// admin role.
    pub async fn recent(&self) -> Result<()> {
        let (_, referee) = guard::require_referee(self.client, self.store).await?;

        let matches: Vec<RecentMatch> = self
            .client
            .from("matches")
            .select(
                "id, round_number, created_at, \
                 player_white:player_white(full_name), \
                 player_black:player_black(full_name)",
            )
            .order("created_at", false)
            .limit(10)
            .fetch()
            .await?;

        render::header("Partidas recentes");
        if matches.is_empty() {
            render::note("Nenhuma partida registrada.");
        }
        for m in &matches {
            let white = m
                .player_white
                .as_ref()
                .map(|p| p.full_name.as_str())
                .unwrap_or("?");
            let black = m
                .player_black
                .as_ref()
                .map(|p| p.full_name.as_str())
                .unwrap_or("?");
            println!("  Rodada {} - {} x {}  [{}]", m.round_number, white, black, m.id);
        }
        if referee.is_admin() {
            render::note("Desfazer: `portal admin rollback <match-id>`");
        }
        Ok(())
    }

    /// Reverse a recorded match's rating effects. Admin role only.
    pub async fn rollback(&mut self, match_id: &str, reason: Option<String>) -> Result<()> {
        let (identity, referee) = guard::require_referee(self.client, self.store).await?;
        self.require_admin(&referee)?;

        let reason = match reason {
            Some(reason) => Some(reason),
            None => {
                let typed = render::prompt_line("Motivo do rollback (opcional):")?;
                if typed.is_empty() { None } else { Some(typed) }
            }
        };

        if !self.submit_guard.try_begin() {
            return Ok(());
        }
        let outcome = self
            .client
            .rollback_match(match_id, &identity.id, reason.as_deref())
            .await;
        self.submit_guard.finish();

        match outcome {
            Ok(()) => {
                render::ok("Rollback realizado com sucesso");
                self.recent().await
            }
            Err(err) => bail!(err.message()),
        }
    }

    /// Open weeks with their check-in counts.
    pub async fn weeks(&self) -> Result<()> {
        guard::require_referee(self.client, self.store).await?;

        let weeks: Vec<TournamentWeek> = self
            .client
            .from("tournament_weeks")
            .select(
                "id, tournament_id, week_number, match_date, match_time, \
                 max_players, status, tournaments(name, edition)",
            )
            .in_list("status", &["open", "in_progress"])
            .order("match_date", false)
            .fetch()
            .await?;

        render::header("Semanas abertas");
        if weeks.is_empty() {
            render::note("Nenhuma semana aberta.");
            return Ok(());
        }

        for week in &weeks {
            let count = self
                .client
                .from("tournament_checkins")
                .eq("tournament_week_id", &week.id)
                .count()
                .await
                .unwrap_or(0);
            println!(
                "  Semana {} — {} ({}) · {}/{} jogadores · {}  [{}]",
                week.week_number,
                week.tournament_name(),
                week.match_date,
                count,
                week.max_players,
                week.status.as_str(),
                week.id
            );
        }
        render::note("Gerar pareamento: `portal admin generate-pairings <week-id>`");
        Ok(())
    }

    pub async fn create_week(&mut self, form: CreateWeekForm) -> Result<()> {
        guard::require_referee(self.client, self.store).await?;

        if form.week_number < 1 {
            bail!("Preencha todos os campos");
        }

        let outcome = self
            .client
            .create_week(
                &form.tournament_id,
                form.week_number,
                &form.match_date.to_string(),
                form.max_players,
            )
            .await;

        match outcome {
            Ok(_) => {
                render::ok("Semana criada com sucesso!");
                Ok(())
            }
            Err(err) => bail!(err.message()),
        }
    }

    /// Generate pairings for a week. The participant notification runs
    /// after generation and its failure is reported separately: the
    /// pairings stand either way.
    pub async fn generate_pairings(&mut self, week_id: &str, assume_yes: bool) -> Result<()> {
        guard::require_referee(self.client, self.store).await?;

        if !assume_yes
            && !render::confirm("Gerar pareamento para esta semana? Isso fechará o check-in.")?
        {
            render::note("Operação abortada.");
            return Ok(());
        }

        if !self.submit_guard.try_begin() {
            return Ok(());
        }
        let outcome = self.client.generate_pairings(week_id).await;
        self.submit_guard.finish();

        let status = match outcome {
            Ok(status) => status,
            Err(err) => bail!(err.message()),
        };
        render::ok(&format!(
            "Pareamento gerado! {} mesas criadas.",
            status.tables.unwrap_or(0)
        ));

        if let Err(err) = self.client.notify_pairings(week_id).await {
            warn!("Participant notification failed: {}", err);
            render::error("A notificação dos participantes falhou; envie o aviso manualmente.");
        } else {
            render::ok("Participantes notificados por email.");
        }
        Ok(())
    }

    /// Mark a week as finished.
    pub async fn close_week(&mut self, week_id: &str, assume_yes: bool) -> Result<()> {
        guard::require_referee(self.client, self.store).await?;

        if !assume_yes && !render::confirm("Encerrar esta semana?")? {
            render::note("Operação abortada.");
            return Ok(());
        }

        self.client
            .from("tournament_weeks")
            .eq("id", week_id)
            .update(&json!({ "status": "finished" }))
            .await?;
        render::ok("Semana encerrada.");
        Ok(())
    }

    /// Ongoing tournaments, to pick an id when recording results.
    pub async fn tournaments(&self) -> Result<()> {
        guard::require_referee(self.client, self.store).await?;

        let tournaments: Vec<Tournament> = self
            .client
            .from("tournaments")
            .select("id, name, edition, status")
            .eq("status", "ongoing")
            .order("created_at", false)
            .fetch()
            .await?;

        render::header("Torneios em andamento");
        if tournaments.is_empty() {
            render::note("Nenhum torneio em andamento");
        }
        for tournament in &tournaments {
            println!("  {}  [{}]", tournament.display_name(), tournament.id);
        }
        Ok(())
    }

    fn require_admin(&self, referee: &Referee) -> Result<()> {
        if !referee.is_admin() {
            bail!("Apenas administradores podem desfazer partidas.");
        }
        Ok(())
    }
}
