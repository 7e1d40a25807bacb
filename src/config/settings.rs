pub struct ServiceSettings {
    pub base_url: String,
    pub anon_key: String,
    pub user_agent: &'static str,
    pub timeout_secs: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            base_url: std::env::var("PORTAL_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:54321".to_string()),
            anon_key: std::env::var("PORTAL_ANON_KEY").unwrap_or_default(),
            user_agent: "ChessClubPortal/1.0",
            timeout_secs: 30,
        }
    }
}

pub struct CheckinSettings {
    pub default_match_time: &'static str,
}

impl Default for CheckinSettings {
    fn default() -> Self {
        Self {
            default_match_time: "18:15:00",
        }
    }
}

pub struct RegistrationSettings {
    pub birth_year_min: i32,
    pub birth_year_max: i32,
    pub password_min_len: usize,
}

impl Default for RegistrationSettings {
    fn default() -> Self {
        Self {
            birth_year_min: 1950,
            birth_year_max: 2015,
            password_min_len: 6,
        }
    }
}

pub struct StandingsSettings {
    pub poll_secs: u64,
}

impl Default for StandingsSettings {
    fn default() -> Self {
        Self { poll_secs: 15 }
    }
}

pub struct AppConfig {
    pub service: ServiceSettings,
    pub checkin: CheckinSettings,
    pub registration: RegistrationSettings,
    pub standings: StandingsSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            service: ServiceSettings::default(),
            checkin: CheckinSettings::default(),
            registration: RegistrationSettings::default(),
            standings: StandingsSettings::default(),
        }
    }
}
