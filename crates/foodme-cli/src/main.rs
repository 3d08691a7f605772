mod search;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::search::SearchCommands;

const DEFAULT_PASSWORD_LEN: usize = 16;

#[derive(Debug, Parser)]
#[command(name = "foodme-cli")]
#[command(about = "FoodMe command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Query the listings provider directly
    Search {
        #[command(subcommand)]
        command: SearchCommands,
    },
    /// Password utilities
    Password {
        #[command(subcommand)]
        command: PasswordCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[derive(Debug, Subcommand)]
enum PasswordCommands {
    /// Print a random alphanumeric password
    Generate {
        #[arg(long, default_value_t = DEFAULT_PASSWORD_LEN)]
        length: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let fallback_level = std::env::var("FOODME_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(fallback_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Db { command }) => run_db(command).await?,
        Some(Commands::Search { command }) => {
            let config = foodme_core::load_app_config()?;
            search::run_search(&config, command).await?;
        }
        Some(Commands::Password {
            command: PasswordCommands::Generate { length },
        }) => {
            anyhow::ensure!(length > 0, "--length must be at least 1");
            println!("{}", foodme_core::password::generate_random_password(length));
        }
        None => println!("foodme-cli ready; run with --help to list commands"),
    }

    Ok(())
}

async fn run_db(command: DbCommands) -> anyhow::Result<()> {
    let config = foodme_core::load_app_config()?;
    let pool_config = foodme_db::PoolConfig::from_app_config(&config);
    let pool = foodme_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        DbCommands::Ping => {
            foodme_db::ping(&pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = foodme_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
    }

    pool.close().await;
    Ok(())
}

#[cfg(test)]
mod tests;
