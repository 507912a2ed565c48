pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use gestor_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat};
use gestor_core::domain::user::Role;

#[derive(Debug, Parser)]
#[command(
    name = "gestor",
    about = "Gestor conversational assistant CLI",
    long_about = "Talk to the Gestor assistant from a terminal, inspect configuration, and list the commands it understands.",
    after_help = "Examples:\n  gestor chat\n  gestor chat --role vendedor\n  gestor intents --json\n  gestor config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a gestor.toml config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Start an interactive conversation against the configured backend")]
    Chat {
        #[arg(long, help = "Role of the person chatting (administrador|vendedor|almacenero)")]
        role: Option<Role>,
        #[arg(long, help = "Backend user id recorded on transformations")]
        user_id: Option<i64>,
        #[arg(long, help = "Directory where generated reports are written")]
        output_dir: Option<PathBuf>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "List the commands the assistant recognizes, in matching priority")]
    Intents {
        #[arg(long, help = "Only list commands visible to this role")]
        role: Option<Role>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();
    let load = |overrides: ConfigOverrides| LoadOptions {
        config_path: cli.config.clone(),
        require_file: cli.config.is_some(),
        overrides,
    };

    let result = match cli.command {
        Command::Chat { role, user_id, output_dir } => {
            let options = load(ConfigOverrides {
                role,
                user_id,
                reports_output_dir: output_dir,
                ..ConfigOverrides::default()
            });
            match AppConfig::load(options) {
                Ok(config) => {
                    init_logging(&config);
                    commands::chat::run(&config).await
                }
                Err(error) => commands::CommandResult::failure(
                    "chat",
                    "config_validation",
                    error.to_string(),
                    2,
                ),
            }
        }
        Command::Config => commands::config::run(load(ConfigOverrides::default())),
        Command::Intents { role, json } => {
            commands::intents::run(load(ConfigOverrides { role, ..ConfigOverrides::default() }), json)
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so they never interleave with the conversation on stdout.
fn init_logging(config: &AppConfig) {
    use tracing::Level;
    use LogFormat::*;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    match config.logging.format {
        Compact => builder.compact().init(),
        Pretty => builder.pretty().init(),
        Json => builder.json().init(),
    }
}
