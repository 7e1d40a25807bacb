use anyhow::Result;
use log::warn;
use std::time::Duration;

use crate::api::ServiceClient;
use crate::config::AppConfig;
use crate::domain::{StandingRow, Tournament};
use crate::render;

/// Tournament standings: the ongoing tournament when there is one
/// (optionally polled for live updates), finished tournaments otherwise.
pub struct StandingsPage<'a> {
    client: &'a ServiceClient,
    config: &'a AppConfig,
}

impl<'a> StandingsPage<'a> {
    pub fn new(client: &'a ServiceClient, config: &'a AppConfig) -> Self {
        Self { client, config }
    }

    pub async fn show(&self, watch: bool) -> Result<()> {
        match self.fetch_ongoing().await? {
            Some(tournament) => self.show_ongoing(&tournament, watch).await,
            None => self.show_finished().await,
        }
    }

    async fn show_ongoing(&self, tournament: &Tournament, watch: bool) -> Result<()> {
        render::header(&tournament.display_name());
        render::note("Torneio em andamento");
        self.render_standings(&tournament.id).await?;

        if !watch {
            return Ok(());
        }

        // Best-effort live refresh; a failed poll only logs and the next
        // tick tries again.
        let mut ticker = tokio::time::interval(Duration::from_secs(self.config.standings.poll_secs));
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(err) = self.render_standings(&tournament.id).await {
                warn!("Standings refresh failed: {}", err);
            }
        }
    }

    async fn show_finished(&self) -> Result<()> {
        let tournaments: Vec<Tournament> = self
            .client
            .from("tournaments")
            .eq("status", "finished")
            .order("start_date", false)
            .fetch()
            .await?;

        if tournaments.is_empty() {
            render::note("Nenhum torneio encontrado.");
            return Ok(());
        }

        for tournament in &tournaments {
            render::header(&tournament.display_name());
            self.render_standings(&tournament.id).await?;
        }
        Ok(())
    }

    async fn render_standings(&self, tournament_id: &str) -> Result<()> {
        let standings: Vec<StandingRow> = self
            .client
            .from("tournament_standings")
            .select(
                "points, games_played, rating_at_end, \
                 players(full_name, rating_rapid, games_played_rapid)",
            )
            .eq("tournament_id", tournament_id)
            .order("points", false)
            .fetch()
            .await?;

        if standings.is_empty() {
            render::note("Sem dados de classificação.");
            return Ok(());
        }

        let rows: Vec<Vec<String>> = standings
            .iter()
            .enumerate()
            .map(|(position, row)| {
                let (name, rating) = match &row.players {
                    Some(p) => (
                        render::player_label(&p.full_name, p.rating(), p.games_played()),
                        format!("{}", p.rating()),
                    ),
                    None => ("-".to_string(), "-".to_string()),
                };
                vec![
                    format!("{}", position + 1),
                    name,
                    format!("{}", row.points),
                    format!("{}", row.games_played),
                    rating,
                ]
            })
            .collect();

        render::table(&["#", "Jogador", "Pontos", "Partidas", "Rating"], &rows);
        Ok(())
    }

    async fn fetch_ongoing(&self) -> Result<Option<Tournament>> {
        Ok(self
            .client
            .from("tournaments")
            .eq("status", "ongoing")
            .maybe_single()
            .await?)
    }
}
