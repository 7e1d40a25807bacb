use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser, Debug)]
#[command(author, version, about = "chess club tournament portal")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "kebab-case")]
pub enum Command {
    /// Sign in with email and password
    Login {
        email: String,
        /// Password (prompted when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account
    Signup {
        /// Full name
        #[arg(long)]
        name: String,
        email: String,
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Sign out and clear the stored session
    Logout,
    /// Request a password recovery email
    Recover { email: String },
    /// Open an emailed recovery or confirmation link
    AuthLink { url: String },
    /// Set a new password after opening a recovery link
    SetPassword {
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Resend the verification email
    ResendVerification,
    /// My profile: status, check-in and rating evolution
    Profile,
    /// Confirm presence in the next open tournament week
    Checkin,
    /// Cancel a confirmed presence
    CancelCheckin {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Link my account to the player record matching my email
    Claim,
    /// Register a new player profile
    Register {
        /// Full name
        #[arg(long)]
        name: String,
        /// Birth year (1950-2015)
        #[arg(long)]
        birth_year: i32,
        #[arg(long)]
        gender: String,
        #[arg(long)]
        phone: String,
        /// Optional institutional registration id
        #[arg(long)]
        registration_id: Option<String>,
        /// Skill level: iniciante, intermediario or avancado
        #[arg(long)]
        level: String,
    },
    /// Public player profile
    Player {
        id: String,
        /// rapid, blitz or standard
        #[arg(long, default_value = "rapid")]
        time_control: String,
    },
    /// Current ranking table
    Ratings {
        /// Filter by player name
        #[arg(long)]
        search: Option<String>,
    },
    /// Round pairings for the current week
    Pairings {
        /// Round to display (defaults to the first)
        #[arg(long)]
        round: Option<i32>,
    },
    /// Tournament standings
    Standings {
        /// Keep refreshing the ongoing standings
        #[arg(long)]
        watch: bool,
    },
    /// Referee console
    #[clap(subcommand)]
    Admin(AdminCommand),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "kebab-case")]
pub enum AdminCommand {
    /// Record a match result
    Record {
        #[arg(long)]
        tournament: String,
        #[arg(long)]
        round: i32,
        /// White player id
        #[arg(long)]
        white: String,
        /// Black player id
        #[arg(long)]
        black: String,
        /// 1-0, 0.5-0.5, 0-1, wo-white or wo-black
        #[arg(long)]
        result: String,
    },
    /// List recently recorded matches
    Recent,
    /// Roll back a recorded match (admin role)
    Rollback {
        match_id: String,
        /// Reason for the rollback
        #[arg(long)]
        reason: Option<String>,
    },
    /// List ongoing tournaments
    Tournaments,
    /// List open tournament weeks
    Weeks,
    /// Create a tournament week
    CreateWeek {
        #[arg(long)]
        tournament: String,
        #[arg(long)]
        week: i32,
        /// Match date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, default_value_t = 18)]
        max_players: i32,
    },
    /// Generate pairings for a week (closes check-in)
    GeneratePairings {
        week_id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Mark a week as finished
    CloseWeek {
        week_id: String,
        #[arg(long)]
        yes: bool,
    },
}
