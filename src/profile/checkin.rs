use chrono::{Duration, NaiveDateTime};

use crate::domain::{CheckinEntry, TournamentWeek};

/// Check-in closes this long before the session starts.
const DEADLINE_OFFSET_HOURS: i64 = 3;

/// The one action (or lack of one) the panel offers. Exactly one applies
/// for every combination of inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckinAction {
    /// Checked in and the deadline passed: static confirmation.
    Confirmed,
    /// Checked in, deadline still open: cancellation offered.
    Cancelable,
    /// Not checked in and the deadline passed.
    Closed,
    /// Not checked in, open, and a spot remains.
    Available,
    /// Not checked in and every spot is taken.
    Full,
}

/// Availability as a pure function of the three inputs.
pub fn availability(is_checked_in: bool, deadline_passed: bool, spots_left: i32) -> CheckinAction {
    if is_checked_in {
        if deadline_passed {
            CheckinAction::Confirmed
        } else {
            CheckinAction::Cancelable
        }
    } else if deadline_passed {
        CheckinAction::Closed
    } else if spots_left <= 0 {
        CheckinAction::Full
    } else {
        CheckinAction::Available
    }
}

/// The next open week together with its confirmed roster.
pub struct CheckinPanel {
    pub week: TournamentWeek,
    pub checkins: Vec<CheckinEntry>,
    default_match_time: String,
}

impl CheckinPanel {
    pub fn new(
        week: TournamentWeek,
        mut checkins: Vec<CheckinEntry>,
        default_match_time: &str,
    ) -> Self {
        // First come, first served display order.
        checkins.sort_by_key(|c| c.checked_in_at);
        Self {
            week,
            checkins,
            default_match_time: default_match_time.to_string(),
        }
    }

    pub fn spots_left(&self) -> i32 {
        self.week.max_players - self.checkins.len() as i32
    }

    pub fn deadline(&self) -> NaiveDateTime {
        self.week.start_datetime(&self.default_match_time) - Duration::hours(DEADLINE_OFFSET_HOURS)
    }

    pub fn deadline_passed(&self, now: NaiveDateTime) -> bool {
        now > self.deadline()
    }

    pub fn is_checked_in(&self, player_id: &str) -> bool {
        self.checkins.iter().any(|c| c.player_id == player_id)
    }

    pub fn action(&self, player_id: &str, now: NaiveDateTime) -> CheckinAction {
        availability(
            self.is_checked_in(player_id),
            self.deadline_passed(now),
            self.spots_left(),
        )
    }

    /// Confirmed players ordered by check-in time.
    pub fn roster(&self) -> &[CheckinEntry] {
        &self.checkins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WeekStatus;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn week(max_players: i32) -> TournamentWeek {
        TournamentWeek {
            id: "w1".into(),
            tournament_id: None,
            week_number: 4,
            match_date: NaiveDate::from_ymd_opt(2025, 6, 12).unwrap(),
            match_time: Some("18:15:00".into()),
            max_players,
            status: WeekStatus::Open,
            tournaments: None,
        }
    }

    fn entry(player_id: &str, minute: u32) -> CheckinEntry {
        CheckinEntry {
            id: format!("c-{}", player_id),
            player_id: player_id.into(),
            checked_in_at: Utc.with_ymd_and_hms(2025, 6, 10, 12, minute, 0).unwrap(),
            players: None,
        }
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 12)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn exactly_one_action_per_combination() {
        assert_eq!(availability(true, true, 5), CheckinAction::Confirmed);
        assert_eq!(availability(true, true, 0), CheckinAction::Confirmed);
        assert_eq!(availability(true, false, 5), CheckinAction::Cancelable);
        assert_eq!(availability(true, false, 0), CheckinAction::Cancelable);
        assert_eq!(availability(false, true, 5), CheckinAction::Closed);
        assert_eq!(availability(false, true, 0), CheckinAction::Closed);
        assert_eq!(availability(false, false, 1), CheckinAction::Available);
        assert_eq!(availability(false, false, 0), CheckinAction::Full);
        assert_eq!(availability(false, false, -1), CheckinAction::Full);
    }

    #[test]
    fn deadline_is_three_hours_before_start() {
        let panel = CheckinPanel::new(week(18), vec![], "18:15:00");
        assert_eq!(panel.deadline(), at(15, 15));
        assert!(!panel.deadline_passed(at(15, 15)));
        assert!(panel.deadline_passed(at(15, 16)));
    }

    #[test]
    fn full_week_offers_no_confirm_even_before_deadline() {
        let checkins = (0..18).map(|i| entry(&format!("p{}", i), i)).collect();
        let panel = CheckinPanel::new(week(18), checkins, "18:15:00");
        assert_eq!(panel.spots_left(), 0);
        assert_eq!(panel.action("newcomer", at(10, 0)), CheckinAction::Full);
    }

    #[test]
    fn checked_in_player_can_cancel_until_deadline() {
        let panel = CheckinPanel::new(week(18), vec![entry("p1", 0)], "18:15:00");
        assert_eq!(panel.action("p1", at(10, 0)), CheckinAction::Cancelable);
        assert_eq!(panel.action("p1", at(16, 0)), CheckinAction::Confirmed);
        assert_eq!(panel.action("p2", at(16, 0)), CheckinAction::Closed);
        assert_eq!(panel.action("p2", at(10, 0)), CheckinAction::Available);
    }

    #[test]
    fn roster_ordered_by_checkin_time() {
        let panel = CheckinPanel::new(
            week(18),
            vec![entry("late", 30), entry("first", 1), entry("second", 5)],
            "18:15:00",
        );
        let order: Vec<_> = panel.roster().iter().map(|c| c.player_id.as_str()).collect();
        assert_eq!(order, ["first", "second", "late"]);
    }
}
