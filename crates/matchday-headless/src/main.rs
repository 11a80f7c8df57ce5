mod cli;
mod format;
mod logging;

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;

use matchday_api::dummyjson::DummyJsonClient;
use matchday_core::config::AppConfig;
use matchday_runtime::{LoginForm, RegisterForm, RestoreReport, Route, Runtime, ValidationErrors};

use cli::{Cli, Command};

type CommandResult = Result<(), Box<dyn Error + Send + Sync>>;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };
    let _log_guard = logging::init(&config.logging, cli.verbose);

    let rt = match Runtime::new(config) {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "failed to start");
            eprintln!("Failed to start: {e}");
            return ExitCode::FAILURE;
        }
    };

    let report = rt.restore().await;
    let route = rt.wait_for_route().await;

    if cli.command.requires_session() && route != Route::Authenticated {
        eprintln!("Not signed in. Run `matchday login` first.");
        return ExitCode::FAILURE;
    }

    let result = run(&rt, cli.command, report).await;
    rt.flush().await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(rt: &Runtime, command: Command, report: Option<RestoreReport>) -> CommandResult {
    match command {
        Command::Status { json } => status(rt, report, json),

        Command::Login { username, password } => {
            let credentials = LoginForm { username, password }
                .validate()
                .map_err(invalid_input)?;
            let session = rt.session().login(&credentials).await?;
            println!("Signed in as {}", format::profile(&session.user));
            Ok(())
        }

        Command::Register {
            username,
            email,
            password,
            confirm_password,
            first_name,
            last_name,
        } => {
            let form = RegisterForm {
                confirm_password: confirm_password.unwrap_or_else(|| password.clone()),
                username,
                email,
                password,
                first_name,
                last_name,
            };
            let data = form.validate().map_err(invalid_input)?;
            let session = rt.session().register(&data).await?;
            println!("Registered and signed in as {}", format::profile(&session.user));
            Ok(())
        }

        Command::Logout => {
            rt.session().logout().await;
            println!("Signed out");
            Ok(())
        }

        Command::Whoami { remote } => {
            let state = rt.session().snapshot();
            let session = state.session().ok_or("Not signed in")?;
            if remote {
                let client = DummyJsonClient::new(&rt.config().auth.base_url);
                let user = client.current_user(&session.token).await?;
                println!("{}", format::profile(&user));
            } else {
                println!("{}", format::profile(&session.user));
            }
            Ok(())
        }

        Command::Favorites => {
            let items = rt.favorites().items();
            if items.is_empty() {
                println!("No favorites yet");
            }
            for item in &items {
                println!("{}", format::match_line(item));
            }
            Ok(())
        }

        Command::Favorite { event_id } => {
            let known = rt
                .favorites()
                .items()
                .into_iter()
                .find(|m| m.id_event == event_id);
            let item = match known {
                Some(item) => item,
                None => rt.matches().select(&event_id).await?,
            };
            let title = item.title();
            if rt.favorites().toggle(item).await? {
                println!("Added {title} to favorites");
            } else {
                println!("Removed {title} from favorites");
            }
            Ok(())
        }

        Command::Theme { mode } => {
            rt.theme().set_override(mode.into());
            println!(
                "Theme set to {} (showing {:?})",
                rt.theme().current(),
                rt.theme().effective_scheme()
            );
            Ok(())
        }

        Command::Matches { league, past } => {
            let (upcoming, finished) = rt.refresh_matches(league.as_deref()).await?;
            tracing::debug!(upcoming, finished, "fixtures fetched");

            let state = rt.matches().snapshot();
            let list = if past { &state.past } else { &state.upcoming };
            if list.is_empty() {
                println!("No matches found");
            }
            for m in list {
                let star = if rt.favorites().contains(&m.id_event) { "*" } else { " " };
                println!("{star} {}", format::match_line(m));
            }
            Ok(())
        }

        Command::Match { event_id } => {
            let found = rt.matches().select(&event_id).await?;
            println!("{}", format::match_details(&found));
            Ok(())
        }

        Command::Config { write } => {
            let path = AppConfig::config_path();
            if write {
                rt.config().save()?;
                println!("Wrote {}", path.display());
            } else {
                let state = if path.exists() { "" } else { " (not created, using defaults)" };
                println!("{}{state}", path.display());
                println!("Database: {}", rt.config().db_path().display());
                println!("Logs:     {}", AppConfig::log_dir().display());
            }
            Ok(())
        }
    }
}

fn status(rt: &Runtime, report: Option<RestoreReport>, json: bool) -> CommandResult {
    let session = rt.session().snapshot();
    let favorites = rt.favorites().snapshot();
    let backends = rt.backends();

    if json {
        let value = serde_json::json!({
            "route": rt.route(),
            "user": session.user(),
            "favorites": favorites.items.len(),
            "theme": rt.theme().current(),
            "scheme": rt.theme().effective_scheme(),
            "backends": {
                "secrets": backends.secrets.kind().to_string(),
                "prefs": backends.prefs.kind().to_string(),
            },
            "restore": report,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Session:   {}", format::route(rt.route()));
    if let Some(user) = session.user() {
        println!("User:      {}", format::profile(user));
    }
    println!("Favorites: {}", favorites.items.len());
    if let Some(err) = favorites.error.as_deref() {
        println!("           ({err})");
    }
    println!(
        "Theme:     {} (showing {:?})",
        rt.theme().current(),
        rt.theme().effective_scheme()
    );
    println!(
        "Storage:   credentials in {}, preferences in {}",
        backends.secrets.kind(),
        backends.prefs.kind()
    );
    Ok(())
}

fn invalid_input(errors: ValidationErrors) -> Box<dyn Error + Send + Sync> {
    for (field, message) in errors.messages() {
        eprintln!("  {field}: {message}");
    }
    "Invalid input".into()
}
