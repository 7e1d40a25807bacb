use anyhow::{bail, Result};

use crate::api::ServiceClient;
use crate::domain::{Player, PlayerMatchRow, RatingHistoryEntry, TimeControl};
use crate::profile::ChartSlot;
use crate::render;

/// One merged row of the recent-matches list, seen from the profiled
/// player's side of the board.
struct MatchSummary {
    match_id: String,
    opponent: String,
    opponent_id: Option<String>,
    my_result: f64,
    created_at: chrono::DateTime<chrono::Utc>,
}

/// Public player profile, selected by the id URL parameter.
pub struct PlayerPage<'a> {
    client: &'a ServiceClient,
    chart: ChartSlot,
}

impl<'a> PlayerPage<'a> {
    pub fn new(client: &'a ServiceClient) -> Self {
        Self {
            client,
            chart: ChartSlot::new(),
        }
    }

    pub async fn show(&mut self, player_id: &str, time_control: TimeControl) -> Result<()> {
        if player_id.trim().is_empty() {
            bail!("ID do jogador não informado.");
        }

        let player: Option<Player> = self
            .client
            .from("players")
            .eq("id", player_id)
            .maybe_single()
            .await?;
        let Some(player) = player else {
            bail!("Jogador não encontrado.");
        };

        let (rank, total) = self.fetch_rank(&player).await?;
        let history = self.fetch_history(&player.id).await?;
        let matches = self.fetch_recent_matches(&player.id).await?;

        render::header(&render::player_label(
            &player.full_name,
            player.rating(),
            player.games_played(),
        ));
        println!("Posição #{} de {} jogadores", rank, total);
        if let Some(level) = &player.level {
            render::note(level);
        }

        let (wins, draws, losses) = win_draw_loss(&history, time_control);
        let played = wins + draws + losses;
        let win_rate = if played > 0 {
            format!("{}%", (wins as f64 / played as f64 * 100.0).round())
        } else {
            "—".to_string()
        };
        println!(
            "\n  Rating {}: {}    Partidas: {}    Aproveitamento: {}",
            time_control,
            player.rating(),
            player.games_played(),
            win_rate
        );

        render::header(&format!("Evolução do Rating ({})", time_control));
        match self.chart.render(&history, time_control) {
            Some(chart) => print!("{}", chart.draw()),
            None => render::note("Nenhuma partida registrada nesta modalidade."),
        }

        render::header("Partidas Recentes");
        if matches.is_empty() {
            render::note("Nenhuma partida registrada ainda.");
        }
        for summary in &matches {
            let result = match summary.my_result {
                r if r >= 1.0 => "Vitória",
                r if r <= 0.0 => "Derrota",
                _ => "Empate",
            };
            let delta = history
                .iter()
                .find(|h| h.match_id.as_deref() == Some(summary.match_id.as_str()))
                .map(|h| format!("{:+}", h.delta))
                .unwrap_or_else(|| "—".to_string());
            let opponent_hint = summary
                .opponent_id
                .as_deref()
                .map(|id| format!("  (portal player {})", id))
                .unwrap_or_default();
            println!("  {}  {}  {}{}", summary.opponent, result, delta, opponent_hint);
        }
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

    /// Last ten games across both colors, newest first.
    async fn fetch_recent_matches(&self, player_id: &str) -> Result<Vec<MatchSummary>> {
        let as_white: Vec<PlayerMatchRow> = self
            .client
            .from("matches")
            .select(
                "id, result_white, result_black, created_at, \
                 opponent:player_black(id, full_name)",
            )
            .eq("player_white", player_id)
            .order("created_at", false)
            .limit(10)
            .fetch()
            .await?;
        let as_black: Vec<PlayerMatchRow> = self
            .client
            .from("matches")
            .select(
                "id, result_white, result_black, created_at, \
                 opponent:player_white(id, full_name)",
            )
            .eq("player_black", player_id)
            .order("created_at", false)
            .limit(10)
            .fetch()
            .await?;

        let mut merged: Vec<MatchSummary> = as_white
            .into_iter()
            .map(|m| MatchSummary {
                match_id: m.id.clone(),
                opponent: m
                    .opponent
                    .as_ref()
                    .map(|o| o.full_name.clone())
                    .unwrap_or_else(|| "?".to_string()),
                opponent_id: m.opponent.as_ref().map(|o| o.id.clone()),
                my_result: m.result_white,
                created_at: m.created_at,
            })
            .chain(as_black.into_iter().map(|m| MatchSummary {
                match_id: m.id.clone(),
                opponent: m
                    .opponent
                    .as_ref()
                    .map(|o| o.full_name.clone())
                    .unwrap_or_else(|| "?".to_string()),
                opponent_id: m.opponent.as_ref().map(|o| o.id.clone()),
                my_result: m.result_black,
                created_at: m.created_at,
            }))
            .collect();

        merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        merged.truncate(10);
        Ok(merged)
    }
}

/// Win/draw/loss derived from rating deltas in one time control.
fn win_draw_loss(history: &[RatingHistoryEntry], tc: TimeControl) -> (usize, usize, usize) {
    let filtered: Vec<&RatingHistoryEntry> =
        history.iter().filter(|h| h.time_control == tc).collect();
    let wins = filtered.iter().filter(|h| h.delta > 0).count();
    let losses = filtered.iter().filter(|h| h.delta < 0).count();
    let draws = filtered.iter().filter(|h| h.delta == 0).count();
    (wins, draws, losses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn entry(delta: i32, tc: TimeControl) -> RatingHistoryEntry {
        RatingHistoryEntry {
            rating_before: 1400,
            rating_after: 1400 + delta,
            delta,
            time_control: tc,
            created_at: Utc.with_ymd_and_hms(2025, 4, 1, 20, 0, 0).unwrap(),
            match_id: None,
        }
    }

    #[test]
    fn win_draw_loss_counts_only_the_requested_control() {
        let history = vec![
            entry(8, TimeControl::Rapid),
            entry(-5, TimeControl::Rapid),
            entry(0, TimeControl::Rapid),
            entry(12, TimeControl::Blitz),
        ];
        assert_eq!(win_draw_loss(&history, TimeControl::Rapid), (1, 1, 1));
        assert_eq!(win_draw_loss(&history, TimeControl::Blitz), (1, 0, 0));
        assert_eq!(win_draw_loss(&history, TimeControl::Standard), (0, 0, 0));
    }
}
