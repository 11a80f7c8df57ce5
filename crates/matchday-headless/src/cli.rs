use clap::{Parser, Subcommand, ValueEnum};

use matchday_core::models::ThemePreference;

#[derive(Parser)]
#[command(name = "matchday")]
#[command(about = "Browse fixtures and manage favorites from the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level regardless of config
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show session, favorites and theme after restoring state
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign in
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },

    /// Create an account and sign in with it
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Defaults to the password
        #[arg(long)]
        confirm_password: Option<String>,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in profile
    Whoami {
        /// Ask the identity service instead of the stored profile
        #[arg(long)]
        remote: bool,
    },

    /// List favorited matches
    Favorites,

    /// Add a match to favorites, or remove it if already there
    Favorite {
        /// Event id
        event_id: String,
    },

    /// Set the appearance override
    Theme {
        #[arg(value_enum)]
        mode: ThemeArg,
    },

    /// Refresh and list fixtures
    Matches {
        /// League id, the configured default when omitted
        #[arg(short, long)]
        league: Option<String>,

        /// List finished matches instead of upcoming ones
        #[arg(long)]
        past: bool,
    },

    /// Show one match
    Match {
        /// Event id
        event_id: String,
    },

    /// Show the config file location
    Config {
        /// Write the active settings to the config file
        #[arg(long)]
        write: bool,
    },
}

impl Command {
    /// Commands only reachable from the signed-in navigation graph.
    pub fn requires_session(&self) -> bool {
        matches!(
            self,
            Self::Logout | Self::Whoami { .. } | Self::Favorites | Self::Favorite { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeArg {
    /// Follow the system appearance
    System,
    Light,
    Dark,
}

impl From<ThemeArg> for ThemePreference {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::System => Self::System,
            ThemeArg::Light => Self::Light,
            ThemeArg::Dark => Self::Dark,
        }
    }
}
