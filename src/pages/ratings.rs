use anyhow::Result;

use crate::api::ServiceClient;
use crate::domain::Player;
use crate::render;

/// Public ranking table, ordered by rating with title badges.
pub struct RatingsPage<'a> {
    client: &'a ServiceClient,
}

impl<'a> RatingsPage<'a> {
    pub fn new(client: &'a ServiceClient) -> Self {
        Self { client }
    }

    pub async fn show(&self, search: Option<&str>) -> Result<()> {
        let players: Vec<Player> = self
            .client
            .from("players")
            .select("id, full_name, rating_rapid, games_played_rapid")
            .order("rating_rapid", false)
            .fetch()
            .await?;

        if players.is_empty() {
            render::note("Nenhum jogador encontrado.");
            return Ok(());
        }

        // Name filter runs client-side over the fetched table.
        let term = search.map(|s| s.trim().to_lowercase()).unwrap_or_default();
        let rows: Vec<Vec<String>> = players
            .iter()
            .enumerate()
            .filter(|(_, p)| term.is_empty() || p.full_name.to_lowercase().contains(&term))
            .map(|(position, player)| {
                vec![
                    render::rank_label(position),
                    render::player_label(
                        &player.full_name,
                        player.rating(),
                        player.games_played(),
                    ),
                    format!("{}", player.games_played()),
                    format!("{}", player.rating()),
                    player.id.clone(),
                ]
            })
            .collect();

        if rows.is_empty() {
            render::note(&format!(
                "Nenhum jogador encontrado para \"{}\"",
                search.unwrap_or_default()
            ));
            return Ok(());
        }

        render::header("Ranking");
        render::table(&["#", "Jogador", "Partidas", "Rating", "Id"], &rows);
        render::note("Perfil público: `portal player <id>`");
        Ok(())
    }
}
