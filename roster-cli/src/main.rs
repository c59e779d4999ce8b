//! Roster CLI - Command line interface for Roster
//!
//! Runs the HTTP server and offers one-shot commands against the same database.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use roster_core::{Config, ConfigOverrides};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{PrArgs, ServeArgs, TeamArgs, UserArgs};

/// Roster: reviewer assignment for pull requests
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to load instead of ~/.config/roster/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides config and env)
    #[arg(long, global = true, env = "ROSTER_DB_PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),

    /// Manage teams
    Team(TeamArgs),

    /// Manage users
    User(UserArgs),

    /// Manage pull requests
    #[command(visible_alias = "pull-request")]
    Pr(PrArgs),

    /// Show current configuration
    Config,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(err) = run(cli).await {
        // Domain failures are expected outcomes; report them as `CODE: message`
        if let Some(domain) = err.downcast_ref::<roster_core::Error>() {
            if let Some(code) = domain.code() {
                eprintln!("{code}: {domain}");
                std::process::exit(1);
            }
        }
        return Err(err);
    }

    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let overrides = ConfigOverrides {
        db_path: cli.db.clone(),
        ..ConfigOverrides::default()
    };
    let config = Config::load_with_overrides(cli.config.as_deref(), overrides)?;

    tracing::debug!(
        bind = %config.server.bind_addr(),
        db = %config.database.path.display(),
        seed = ?config.assignment.seed,
        "Configuration loaded"
    );

    match cli.command {
        Some(Commands::Serve(args)) => args.execute(config).await?,
        Some(Commands::Team(args)) => args.execute(&config).await?,
        Some(Commands::User(args)) => args.execute(&config).await?,
        Some(Commands::Pr(args)) => args.execute(&config).await?,
        Some(Commands::Version) => {
            println!("roster {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Config) => print_config(&config, cli.config.as_deref()),
        None => {
            println!("Roster - reviewer assignment for pull requests");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

fn print_config(config: &Config, explicit: Option<&std::path::Path>) {
    println!("Roster Configuration");
    println!("====================");
    println!();
    println!("Server:");
    println!("  bind: {}", config.server.bind_addr());
    println!("  request_timeout: {:?}", config.server.request_timeout);
    println!();
    println!("Database:");
    println!("  path: {}", config.database.path.display());
    println!("  max_connections: {}", config.database.max_connections);
    println!();
    println!("Assignment:");
    match config.assignment.seed {
        Some(seed) => println!("  seed: {seed}"),
        None => println!("  seed: (random)"),
    }
    println!();

    let path = explicit.map(PathBuf::from).or_else(Config::default_config_path);
    if let Some(path) = path {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::try_parse_from([
            "roster", "--db", "/tmp/r.db", "serve", "--port", "9000", "--seed", "4",
        ])
        .unwrap();
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/r.db")));
        match cli.command {
            Some(Commands::Serve(args)) => {
                assert_eq!(args.port, Some(9000));
                assert_eq!(args.seed, Some(4));
                assert!(!args.in_memory);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_team_add_members() {
        let cli = Cli::try_parse_from([
            "roster", "team", "add", "backend", "--member", "u1:Alice", "--member",
            "u2:Bob:inactive",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Team(_))));
    }

    #[test]
    fn test_parse_set_active_requires_bool() {
        assert!(Cli::try_parse_from(["roster", "user", "set-active", "u1", "false"]).is_ok());
        assert!(Cli::try_parse_from(["roster", "user", "set-active", "u1", "maybe"]).is_err());
    }
}
