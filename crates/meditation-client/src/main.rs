//! `meditation-cli`: terminal client for the meditation server.
//!
//! Without a subcommand it opens the catalog browser with the player modal.
//! The one-shot subcommands cover accounts, listing, and preferences.

mod console;
mod ui;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use meditation_client::auth;
use meditation_client::catalog::{CatalogController, FilterState};
use meditation_client::player::format_time;
use meditation_client::preferences::PreferencesController;
use meditation_client::server_api::{ApiClient, MeditationApi};
use meditation_client::token_store::FileTokenStore;
use meditation_client::view::Page;
use meditation_client::SessionContext;
use meditation_types::{
    LoginRequest, PreferencesUpdate, PreferredDuration, RegisterRequest, TimeOfDay, UiTheme,
};
use tracing_subscriber::EnvFilter;

use console::{ConsoleCatalogView, ConsoleNotifier, ConsolePreferencesView};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_SHA"),
    ", ",
    env!("BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "meditation-cli", version = VERSION)]
struct Args {
    /// Base URL of the meditation server.
    #[arg(long, env = "MEDITATION_SERVER", default_value = "http://localhost:3006")]
    server: String,

    /// Session file holding the saved token.
    #[arg(long, env = "MEDITATION_SESSION_FILE")]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Browse the catalog and play sessions (default).
    Browse,
    /// Create an account and sign in.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "MEDITATION_PASSWORD")]
        password: String,
    },
    /// Sign in and save the session token.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "MEDITATION_PASSWORD")]
        password: String,
    },
    /// Forget the saved session token.
    Logout,
    /// List catalog sessions.
    List {
        #[arg(long)]
        category: Option<String>,
        /// Length in whole minutes.
        #[arg(long)]
        duration: Option<u32>,
    },
    /// Show one session.
    Show { id: i64 },
    /// Stored preferences.
    #[command(subcommand)]
    Prefs(PrefsCommand),
}

#[derive(Subcommand, Debug)]
enum PrefsCommand {
    Show,
    /// Update only the given fields.
    Set {
        /// `light` or `dark`.
        #[arg(long)]
        theme: Option<UiTheme>,
        /// e.g. "15 minutes".
        #[arg(long)]
        preferred_duration: Option<PreferredDuration>,
        /// Morning, Afternoon, Evening, or Night.
        #[arg(long)]
        best_time: Option<TimeOfDay>,
        #[arg(long)]
        notifications: Option<bool>,
        /// Repeat to set several; replaces the stored list.
        #[arg(long = "favorite-theme")]
        favorite_themes: Vec<String>,
        /// Store an empty favorite list.
        #[arg(long, conflicts_with = "favorite_themes")]
        clear_favorites: bool,
    },
    /// Restore the defaults.
    Reset,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let browsing = matches!(args.command, None | Some(Command::Browse));
    init_tracing(if browsing { "off" } else { "warn" });

    let store_path = match args.session_file.clone() {
        Some(path) => path,
        None => FileTokenStore::default_path()?,
    };
    tracing::debug!(path = %store_path.display(), server = %args.server, "session store");
    let mut session = SessionContext::init(&args.server, Box::new(FileTokenStore::new(store_path)));
    let api = ApiClient::new(session.api_base());

    let Some(command) = args.command.filter(|_| !browsing) else {
        ui::run_tui(session, Box::new(api))?;
        return Ok(ExitCode::SUCCESS);
    };

    let mut notifier = ConsoleNotifier::default();
    let ok = run_command(command, &mut session, &api, &mut notifier);
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn run_command(
    command: Command,
    session: &mut SessionContext,
    api: &dyn MeditationApi,
    notifier: &mut ConsoleNotifier,
) -> bool {
    match command {
        Command::Browse => true,
        Command::Register {
            username,
            email,
            password,
        } => {
            let req = RegisterRequest {
                username,
                email,
                password,
            };
            auth::register(session, api, notifier, &req).is_ok()
        }
        Command::Login { email, password } => {
            let req = LoginRequest { email, password };
            auth::login(session, api, notifier, &req).is_ok()
        }
        Command::Logout => {
            auth::logout(session, notifier);
            println!("Signed out.");
            true
        }
        Command::List { category, duration } => {
            if !auth::guard(session, notifier, Page::Meditation) {
                return false;
            }
            let filter = FilterState { category, duration };
            let mut catalog = CatalogController::with_filter(ConsoleCatalogView::default(), filter);
            let ok = catalog.load(session, api, notifier).is_ok();
            for line in catalog.view().lines() {
                println!("{line}");
            }
            ok
        }
        Command::Show { id } => {
            if !auth::guard(session, notifier, Page::Meditation) {
                return false;
            }
            match api.get_meditation(id) {
                Ok(item) => {
                    println!("{}  ({})", item.title, item.category);
                    println!("{}", item.description);
                    println!("duration: {}", format_time(f64::from(item.duration) * 60.0));
                    println!("audio:    {}", item.audio_url);
                    true
                }
                Err(err) => {
                    session.report_failure(notifier, &err);
                    false
                }
            }
        }
        Command::Prefs(cmd) => run_prefs(cmd, session, api, notifier),
    }
}

fn run_prefs(
    cmd: PrefsCommand,
    session: &mut SessionContext,
    api: &dyn MeditationApi,
    notifier: &mut ConsoleNotifier,
) -> bool {
    if !auth::guard(session, notifier, Page::Preferences) {
        return false;
    }
    let mut prefs = PreferencesController::new(ConsolePreferencesView::default());
    let result = match cmd {
        PrefsCommand::Show => prefs.load(session, api, notifier),
        PrefsCommand::Set {
            theme,
            preferred_duration,
            best_time,
            notifications,
            favorite_themes,
            clear_favorites,
        } => {
            let favorite_themes = if clear_favorites {
                Some(Vec::new())
            } else if favorite_themes.is_empty() {
                None
            } else {
                Some(favorite_themes)
            };
            let update = PreferencesUpdate {
                favorite_themes,
                preferred_duration,
                best_time_of_day: best_time,
                notifications,
                theme,
            };
            if update.is_empty() {
                eprintln!("nothing to update; pass at least one field");
                return false;
            }
            prefs.save(session, api, notifier, &update)
        }
        PrefsCommand::Reset => prefs.reset(session, api, notifier),
    };
    for line in prefs.view().lines() {
        println!("{line}");
    }
    result.is_ok()
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_prefs_set() {
        let args = Args::try_parse_from([
            "meditation-cli",
            "prefs",
            "set",
            "--theme",
            "dark",
            "--preferred-duration",
            "15 minutes",
            "--favorite-theme",
            "Sleep",
            "--favorite-theme",
            "Focus",
        ])
        .unwrap();
        match args.command {
            Some(Command::Prefs(PrefsCommand::Set {
                theme,
                preferred_duration,
                favorite_themes,
                ..
            })) => {
                assert_eq!(theme, Some(UiTheme::Dark));
                assert_eq!(preferred_duration, Some(PreferredDuration::Fifteen));
                assert_eq!(favorite_themes, vec!["Sleep", "Focus"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_defaults_to_browsing() {
        let args = Args::try_parse_from(["meditation-cli", "--server", "http://example.com:3006"])
            .unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.server, "http://example.com:3006");
    }

    #[test]
    fn unknown_labels_are_rejected() {
        let parsed = Args::try_parse_from(["meditation-cli", "prefs", "set", "--theme", "sepia"]);
        assert!(parsed.is_err());
    }
}
