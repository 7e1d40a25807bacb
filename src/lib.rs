pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod pages;
pub mod profile;
pub mod render;
pub mod store;

use anyhow::Result;
use clap::{CommandFactory, Parser};

use crate::api::ServiceClient;
use crate::cli::{AdminCommand, Cli, Command};
use crate::config::AppConfig;
use crate::domain::TimeControl;
use crate::pages::admin::{AdminConsole, CreateWeekForm, RecordMatchForm};
use crate::pages::auth::AuthPage;
use crate::pages::pairings::PairingsPage;
use crate::pages::player::PlayerPage;
use crate::pages::profile::{ProfilePage, RegisterForm};
use crate::pages::ratings::RatingsPage;
use crate::pages::standings::StandingsPage;
use crate::store::SessionStore;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn run(command: Command) -> Result<()> {
    if let Command::Completions { shell } = &command {
        clap_complete::generate(*shell, &mut Cli::command(), "portal", &mut std::io::stdout());
        return Ok(());
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(dispatch(command))
}

/// Each command is one page load: build the client from the stored
/// session, fetch, render, at most one mutation.
async fn dispatch(command: Command) -> Result<()> {
    let config = AppConfig::new();
    let store = SessionStore::open_default()?;
    let mut client = ServiceClient::new(&config.service)?.with_session(store.load()?);

    match command {
        Command::Login { email, password } => {
            AuthPage::new(&mut client, &store, &config)
                .login(&email, password)
                .await
        }
        Command::Signup {
            name,
            email,
            password,
        } => {
            AuthPage::new(&mut client, &store, &config)
                .signup(&name, &email, password)
                .await
        }
        Command::Logout => AuthPage::new(&mut client, &store, &config).logout().await,
        Command::Recover { email } => {
            AuthPage::new(&mut client, &store, &config)
                .request_recovery(&email)
                .await
        }
        Command::AuthLink { url } => {
            let link = AuthPage::new(&mut client, &store, &config).open_link(&url)?;
            ProfilePage::new(&client, &config).show(link).await
        }
        Command::SetPassword { password } => {
            AuthPage::new(&mut client, &store, &config)
                .set_password(password)
                .await
        }
        Command::ResendVerification => {
            let identity = pages::guard::require_identity(&client).await?;
            AuthPage::new(&mut client, &store, &config)
                .resend_verification(&identity.email)
                .await
        }
        Command::Profile => ProfilePage::new(&client, &config).show(None).await,
        Command::Checkin => ProfilePage::new(&client, &config).checkin().await,
        Command::CancelCheckin { yes } => {
            ProfilePage::new(&client, &config)
                .cancel_checkin(yes)
                .await
        }
        Command::Claim => ProfilePage::new(&client, &config).claim().await,
        Command::Register {
            name,
            birth_year,
            gender,
            phone,
            registration_id,
            level,
        } => {
            ProfilePage::new(&client, &config)
                .register(RegisterForm {
                    full_name: name,
                    birth_year,
                    gender,
                    phone,
                    registration_id,
                    level,
                })
                .await
        }
        Command::Player { id, time_control } => {
            let tc: TimeControl = time_control.parse().map_err(anyhow::Error::msg)?;
            PlayerPage::new(&client).show(&id, tc).await
        }
        Command::Ratings { search } => RatingsPage::new(&client).show(search.as_deref()).await,
        Command::Pairings { round } => PairingsPage::new(&client).show(round).await,
        Command::Standings { watch } => StandingsPage::new(&client, &config).show(watch).await,
        Command::Admin(admin) => dispatch_admin(admin, &client, &store).await,
        Command::Completions { .. } => Ok(()),
    }
}

async fn dispatch_admin(
    command: AdminCommand,
    client: &ServiceClient,
    store: &SessionStore,
) -> Result<()> {
    let mut console = AdminConsole::new(client, store);
    match command {
        AdminCommand::Record {
            tournament,
            round,
            white,
            black,
            result,
        } => {
            console
                .record(RecordMatchForm {
                    tournament_id: tournament,
                    round,
                    white,
                    black,
                    result_code: result,
                })
                .await
        }
        AdminCommand::Recent => console.recent().await,
        AdminCommand::Rollback { match_id, reason } => console.rollback(&match_id, reason).await,
        AdminCommand::Tournaments => console.tournaments().await,
        AdminCommand::Weeks => console.weeks().await,
        AdminCommand::CreateWeek {
            tournament,
            week,
            date,
            max_players,
        } => {
            console
                .create_week(CreateWeekForm {
                    tournament_id: tournament,
                    week_number: week,
                    match_date: date,
                    max_players,
                })
                .await
        }
        AdminCommand::GeneratePairings { week_id, yes } => {
            console.generate_pairings(&week_id, yes).await
        }
        AdminCommand::CloseWeek { week_id, yes } => console.close_week(&week_id, yes).await,
    }
}
