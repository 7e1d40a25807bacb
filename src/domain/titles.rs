/// Minimum games before any title is shown.
const MIN_TITLED_GAMES: i32 = 10;
const CANDIDATE_RATING: i32 = 1600;
const MASTER_RATING: i32 = 1800;
const GRANDMASTER_RATING: i32 = 2000;

/// Cosmetic rank label derived from rating and games played. The same
/// thresholds apply everywhere a player is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Title {
    Candidate,
    Master,
    Grandmaster,
}

impl Title {
    /// Badge for a player, if any. Players under the games floor carry no
    /// title regardless of rating.
    pub fn for_player(rating: i32, games_played: i32) -> Option<Title> {
        if games_played < MIN_TITLED_GAMES {
            return None;
        }
        if rating >= GRANDMASTER_RATING {
            Some(Title::Grandmaster)
        } else if rating >= MASTER_RATING {
            Some(Title::Master)
        } else if rating >= CANDIDATE_RATING {
            Some(Title::Candidate)
        } else {
            None
        }
    }

    pub fn abbreviation(&self) -> &str {
        match self {
            Title::Candidate => "CMF",
            Title::Master => "MF",
            Title::Grandmaster => "GMF",
        }
    }

    pub fn full_name(&self) -> &str {
        match self {
            Title::Candidate => "Candidato a Mestre Federal",
            Title::Master => "Mestre Federal",
            Title::Grandmaster => "Grande Mestre Federal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_title_under_games_floor() {
        assert_eq!(Title::for_player(2400, 0), None);
        assert_eq!(Title::for_player(2400, 9), None);
    }

    #[test]
    fn tiers_at_exact_thresholds() {
        assert_eq!(Title::for_player(1599, 10), None);
        assert_eq!(Title::for_player(1600, 10), Some(Title::Candidate));
        assert_eq!(Title::for_player(1799, 10), Some(Title::Candidate));
        assert_eq!(Title::for_player(1800, 10), Some(Title::Master));
        assert_eq!(Title::for_player(1999, 10), Some(Title::Master));
        assert_eq!(Title::for_player(2000, 10), Some(Title::Grandmaster));
    }

    #[test]
    fn total_over_rating_range() {
        for rating in (0..3000).step_by(50) {
            // Never panics, and the floor dominates.
            let _ = Title::for_player(rating, 5);
            let _ = Title::for_player(rating, 500);
        }
    }
}
