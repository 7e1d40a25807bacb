use anyhow::Result;
use colored::Colorize;
use std::collections::BTreeMap;

use crate::api::ServiceClient;
use crate::domain::{Pairing, PlayerSummary, TournamentWeek};
use crate::render;

/// Round-by-round table assignments for the current week, highlighting
/// the viewer's own games.
pub struct PairingsPage<'a> {
    client: &'a ServiceClient,
}

impl<'a> PairingsPage<'a> {
    pub fn new(client: &'a ServiceClient) -> Self {
        Self { client }
    }

    pub async fn show(&self, round: Option<i32>) -> Result<()> {
        let my_player_id = self.fetch_own_player_id().await;

        let Some(week) = self.fetch_open_week().await? else {
            render::note("Nenhum torneio em andamento com pareamento disponível.");
            return Ok(());
        };

        render::header(&format!(
            "Semana {} — {}{}",
            week.week_number,
            week.tournament_name(),
            week.edition_label()
        ));
        println!(
            "{} às {}",
            week.match_date.format("%d/%m/%Y"),
            week.start_time_label()
        );

        let pairings = self.fetch_pairings(&week.id).await?;
        if pairings.is_empty() {
            render::note("Pareamento ainda não foi gerado para esta semana.");
            render::note("O pareamento é publicado antes do início do torneio.");
            return Ok(());
        }

        let rounds = group_by_round(pairings);
        let round_numbers: Vec<i32> = rounds.keys().copied().collect();
        // The lowest round is the default selection.
        let selected = round
            .filter(|r| rounds.contains_key(r))
            .or_else(|| round_numbers.first().copied());

        let tabs: Vec<String> = round_numbers
            .iter()
            .map(|r| {
                if Some(*r) == selected {
                    format!("[Rodada {}]", r)
                } else {
                    format!(" Rodada {} ", r)
                }
            })
            .collect();
        println!("\n{}", tabs.join(" "));

        let Some(selected) = selected else {
            return Ok(());
        };
        if let Some(pairs) = rounds.get(&selected) {
            self.render_round(pairs, selected, my_player_id.as_deref());
        }
        Ok(())
    }

    fn render_round(&self, pairs: &[Pairing], round: i32, my_player_id: Option<&str>) {
        if pairs.is_empty() {
            render::note(&format!("Sem pareamentos para a rodada {}.", round));
            return;
        }

        for pairing in pairs {
            println!("\n  Mesa {}", pairing.table_number);
            println!(
                "    ♔ {}",
                side_label(pairing.player_white.as_ref(), my_player_id)
            );
            println!(
                "    ♚ {}",
                side_label(pairing.player_black.as_ref(), my_player_id)
            );
        }
    }

    async fn fetch_own_player_id(&self) -> Option<String> {
        let identity = self.client.get_user().await?;
        let player: Option<crate::domain::Player> = self
            .client
            .from("players")
            .select("id, full_name")
            .eq("user_id", &identity.id)
            .maybe_single()
            .await
            .ok()?;
        player.map(|p| p.id)
    }

    async fn fetch_open_week(&self) -> Result<Option<TournamentWeek>> {
        Ok(self
            .client
            .from("tournament_weeks")
            .select(
                "id, tournament_id, week_number, match_date, match_time, \
                 max_players, status, tournaments(name, edition)",
            )
            .in_list("status", &["open", "in_progress"])
            .order("match_date", true)
            .maybe_single()
            .await?)
    }

    async fn fetch_pairings(&self, week_id: &str) -> Result<Vec<Pairing>> {
        Ok(self
            .client
            .from("pairings")
            .select(
                "id, round_number, table_number, \
                 player_white:player_white(id, full_name, rating_rapid, games_played_rapid), \
                 player_black:player_black(id, full_name, rating_rapid, games_played_rapid)",
            )
            .eq("tournament_week_id", week_id)
            .order("round_number", true)
            .order("table_number", true)
            .fetch()
            .await?)
    }
}

/// Rounds keyed ascending; each round's list sorted by table number.
fn group_by_round(pairings: Vec<Pairing>) -> BTreeMap<i32, Vec<Pairing>> {
    let mut rounds: BTreeMap<i32, Vec<Pairing>> = BTreeMap::new();
    for pairing in pairings {
        rounds.entry(pairing.round_number).or_default().push(pairing);
    }
    for pairs in rounds.values_mut() {
        pairs.sort_by_key(|p| p.table_number);
    }
    rounds
}

fn side_label(player: Option<&PlayerSummary>, my_player_id: Option<&str>) -> String {
    let Some(player) = player else {
        return "?".to_string();
    };
    let label = format!(
        "{} ({})",
        render::player_label(&player.full_name, player.rating(), player.games_played()),
        player.rating()
    );
    let is_me = match (player.id.as_deref(), my_player_id) {
        (Some(id), Some(mine)) => id == mine,
        _ => false,
    };
    if is_me {
        format!("{} {}", label, "← você".green().bold())
    } else {
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairing(round: i32, table: i32) -> Pairing {
        Pairing {
            id: format!("g-{}-{}", round, table),
            round_number: round,
            table_number: table,
            player_white: None,
            player_black: None,
        }
    }

    #[test]
    fn rounds_grouped_ascending_with_tables_sorted() {
        let rounds = group_by_round(vec![
            pairing(2, 3),
            pairing(1, 2),
            pairing(2, 1),
            pairing(1, 1),
        ]);

        let keys: Vec<i32> = rounds.keys().copied().collect();
        assert_eq!(keys, [1, 2]);

        let tables: Vec<i32> = rounds[&2].iter().map(|p| p.table_number).collect();
        assert_eq!(tables, [1, 3]);
    }

    #[test]
    fn own_side_is_highlighted() {
        let player = PlayerSummary {
            id: Some("p1".into()),
            full_name: "Ana".into(),
            rating_rapid: Some(1700),
            games_played_rapid: Some(15),
        };
        assert!(side_label(Some(&player), Some("p1")).contains("você"));
        assert!(!side_label(Some(&player), Some("p2")).contains("você"));
        assert!(!side_label(Some(&player), None).contains("você"));
        assert_eq!(side_label(None, Some("p1")), "?");
    }
}
