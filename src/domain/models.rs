use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tournament participant profile. A player with no `user_id` is unclaimed
/// and may be linked to a new account by email match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub rating_rapid: Option<i32>,
    #[serde(default)]
    pub games_played_rapid: Option<i32>,
    #[serde(default)]
    pub level: Option<String>,
}

impl Player {
    pub fn rating(&self) -> i32 {
        self.rating_rapid.unwrap_or(1400)
    }

    pub fn games_played(&self) -> i32 {
        self.games_played_rapid.unwrap_or(0)
    }

    pub fn is_unclaimed(&self) -> bool {
        self.user_id.is_none()
    }

    /// Case-insensitive match against a stored pre-registration email.
    pub fn email_matches(&self, email: &str) -> bool {
        self.email
            .as_deref()
            .map(|e| e.trim().eq_ignore_ascii_case(email.trim()))
            .unwrap_or(false)
    }

    pub fn initials(&self) -> String {
        self.full_name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .take(2)
            .collect::<String>()
            .to_uppercase()
    }
}

/// Abbreviated player data as expanded inline by roster and pairing queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSummary {
    #[serde(default)]
    pub id: Option<String>,
    pub full_name: String,
    #[serde(default)]
    pub rating_rapid: Option<i32>,
    #[serde(default)]
    pub games_played_rapid: Option<i32>,
}

impl PlayerSummary {
    pub fn rating(&self) -> i32 {
        self.rating_rapid.unwrap_or(1400)
    }

    pub fn games_played(&self) -> i32 {
        self.games_played_rapid.unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekStatus {
    Open,
    InProgress,
    Finished,
}

impl WeekStatus {
    pub fn as_str(&self) -> &str {
        match self {
            WeekStatus::Open => "open",
            WeekStatus::InProgress => "in_progress",
            WeekStatus::Finished => "finished",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentInfo {
    pub name: String,
    #[serde(default)]
    pub edition: Option<i32>,
}

/// One scheduled weekly session of a tournament.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentWeek {
    pub id: String,
    #[serde(default)]
    pub tournament_id: Option<String>,
    pub week_number: i32,
    pub match_date: NaiveDate,
    #[serde(default)]
    pub match_time: Option<String>,
    pub max_players: i32,
    pub status: WeekStatus,
    #[serde(default)]
    pub tournaments: Option<TournamentInfo>,
}

impl TournamentWeek {
    /// Session start, combining the match date with its time of day.
    pub fn start_datetime(&self, default_time: &str) -> NaiveDateTime {
        let time = self
            .match_time
            .as_deref()
            .and_then(|t| NaiveTime::parse_from_str(t, "%H:%M:%S").ok())
            .or_else(|| NaiveTime::parse_from_str(default_time, "%H:%M:%S").ok())
            .unwrap_or_default();
        self.match_date.and_time(time)
    }

    pub fn start_time_label(&self) -> String {
        self.match_time
            .as_deref()
            .map(|t| t.chars().take(5).collect())
            .unwrap_or_else(|| "18:15".to_string())
    }

    pub fn tournament_name(&self) -> &str {
        self.tournaments
            .as_ref()
            .map(|t| t.name.as_str())
            .unwrap_or("Torneio")
    }

    pub fn edition_label(&self) -> String {
        self.tournaments
            .as_ref()
            .and_then(|t| t.edition)
            .map(|e| format!(" · Edição {}", e))
            .unwrap_or_default()
    }
}

/// A player's confirmed attendance for a tournament week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckinEntry {
    pub id: String,
    pub player_id: String,
    pub checked_in_at: DateTime<Utc>,
    #[serde(default)]
    pub players: Option<PlayerSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeControl {
    Rapid,
    Blitz,
    Standard,
}

impl TimeControl {
    pub fn as_str(&self) -> &str {
        match self {
            TimeControl::Rapid => "rapid",
            TimeControl::Blitz => "blitz",
            TimeControl::Standard => "standard",
        }
    }
}

impl fmt::Display for TimeControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeControl {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rapid" => Ok(TimeControl::Rapid),
            "blitz" => Ok(TimeControl::Blitz),
            "standard" => Ok(TimeControl::Standard),
            other => Err(format!("modalidade desconhecida: {}", other)),
        }
    }
}

/// Immutable record of one rating change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingHistoryEntry {
    pub rating_before: i32,
    pub rating_after: i32,
    pub delta: i32,
    pub time_control: TimeControl,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub match_id: Option<String>,
}

/// One scheduled game within a round of a week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pairing {
    pub id: String,
    pub round_number: i32,
    pub table_number: i32,
    #[serde(default)]
    pub player_white: Option<PlayerSummary>,
    #[serde(default)]
    pub player_black: Option<PlayerSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerName {
    pub full_name: String,
}

/// Recently recorded match as listed in the referee console.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentMatch {
    pub id: String,
    pub round_number: i32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub player_white: Option<PlayerName>,
    #[serde(default)]
    pub player_black: Option<PlayerName>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRef {
    pub id: String,
    pub full_name: String,
}

/// Match row as fetched for the public player page, with the opponent
/// expanded under an alias regardless of which color the player held.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerMatchRow {
    pub id: String,
    pub result_white: f64,
    pub result_black: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub opponent: Option<PlayerRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub edition: Option<i32>,
    #[serde(default)]
    pub status: Option<String>,
}

impl Tournament {
    pub fn display_name(&self) -> String {
        match self.edition {
            Some(e) => format!("{} · Edição {}", self.name, e),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingRow {
    pub points: f64,
    pub games_played: i32,
    #[serde(default)]
    pub rating_at_end: Option<i32>,
    #[serde(default)]
    pub players: Option<PlayerSummary>,
}

/// Role-bearing record required by the referee console.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Referee {
    pub full_name: String,
    pub role: String,
}

impl Referee {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Self-declared skill level collected at registration; maps to a fixed
/// starting rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillLevel {
    Iniciante,
    Intermediario,
    Avancado,
}

impl SkillLevel {
    pub fn starting_rating(&self) -> i32 {
        match self {
            SkillLevel::Iniciante => 1200,
            SkillLevel::Intermediario => 1400,
            SkillLevel::Avancado => 1800,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SkillLevel::Iniciante => "iniciante",
            SkillLevel::Intermediario => "intermediario",
            SkillLevel::Avancado => "avancado",
        }
    }
}

impl FromStr for SkillLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "iniciante" => Ok(SkillLevel::Iniciante),
            "intermediario" | "intermediário" => Ok(SkillLevel::Intermediario),
            "avancado" | "avançado" => Ok(SkillLevel::Avancado),
            other => Err(format!("nível desconhecido: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_level_maps_to_starting_rating() {
        assert_eq!(SkillLevel::Iniciante.starting_rating(), 1200);
        assert_eq!(SkillLevel::Intermediario.starting_rating(), 1400);
        assert_eq!(SkillLevel::Avancado.starting_rating(), 1800);
    }

    #[test]
    fn skill_level_parses_accented_spelling() {
        assert_eq!(
            "intermediário".parse::<SkillLevel>(),
            Ok(SkillLevel::Intermediario)
        );
        assert!("mestre".parse::<SkillLevel>().is_err());
    }

    #[test]
    fn email_match_is_case_insensitive() {
        let player = Player {
            id: "p1".into(),
            full_name: "Ana Souza".into(),
            email: Some("Ana.Souza@Example.com".into()),
            user_id: None,
            rating_rapid: Some(1500),
            games_played_rapid: Some(12),
            level: None,
        };
        assert!(player.email_matches("ana.souza@example.com"));
        assert!(player.email_matches("  ANA.SOUZA@EXAMPLE.COM "));
        assert!(!player.email_matches("outra@example.com"));
    }

    #[test]
    fn rollback_is_restricted_to_the_admin_role() {
        let admin = Referee {
            full_name: "Marcos Lima".into(),
            role: "admin".into(),
        };
        let referee = Referee {
            full_name: "Paula Reis".into(),
            role: "referee".into(),
        };
        assert!(admin.is_admin());
        assert!(!referee.is_admin());
    }

    #[test]
    fn week_start_datetime_falls_back_to_default_time() {
        let week = TournamentWeek {
            id: "w1".into(),
            tournament_id: None,
            week_number: 3,
            match_date: NaiveDate::from_ymd_opt(2025, 6, 12).unwrap(),
            match_time: None,
            max_players: 18,
            status: WeekStatus::Open,
            tournaments: None,
        };
        let start = week.start_datetime("18:15:00");
        assert_eq!(start.format("%H:%M").to_string(), "18:15");
    }
}
