//! medboard CLI: practice questions and performance dashboard in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use medboard_core::model::GroupBy;

mod commands;

#[derive(Parser)]
#[command(
    name = "medboard",
    version,
    about = "Board-exam practice questions and performance tracking"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with email and password
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "MEDBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account
    Signup {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "MEDBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Start institutional single sign-on
    Sso {
        /// Institutional email address (e.g. user@university.edu)
        #[arg(long)]
        email: String,
    },

    /// Print the Google sign-in URL
    GoogleLogin,

    /// Forget the stored session
    Logout,

    /// Show whether a session is stored
    Status,

    /// Practice questions interactively
    Quiz {
        /// Topic (a preset such as "Cardiology" or any custom string)
        #[arg(long)]
        specialty: Option<String>,

        /// Difficulty (Beginner, Intermediate, Advanced)
        #[arg(long)]
        difficulty: Option<String>,

        /// List topic and difficulty presets and exit
        #[arg(long)]
        presets: bool,
    },

    /// Show accuracy grouped by a taxonomy dimension
    Dashboard {
        /// discipline, body_system, specialty, question_type, age_group, acuity, pathophysiology
        #[arg(long)]
        group_by: Option<GroupBy>,

        /// Use the server's demo data (works without logging in)
        #[arg(long)]
        demo: bool,
    },

    /// Create a starter medboard.toml
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medboard=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(config, email, password).await
        }
        Commands::Signup {
            name,
            email,
            password,
        } => commands::auth::signup(config, name, email, password).await,
        Commands::Sso { email } => commands::auth::sso(config, email).await,
        Commands::GoogleLogin => commands::auth::google_login(config),
        Commands::Logout => commands::session::logout(config),
        Commands::Status => commands::session::status(config),
        Commands::Quiz {
            specialty,
            difficulty,
            presets,
        } => {
            if presets {
                commands::quiz::print_presets();
                Ok(())
            } else {
                commands::quiz::execute(config, specialty, difficulty).await
            }
        }
        Commands::Dashboard { group_by, demo } => {
            commands::dashboard::execute(config, group_by, demo).await
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
