mod contact;
mod lookup;
mod menus;
mod profile;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use contact::ContactCommands;
use lookup::VenueCommands;
use menus::MenuCommands;
use profile::ProfileCommands;

#[derive(Debug, Parser)]
#[command(name = "mtlresto-cli")]
#[command(about = "Montreal restaurant finder command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Query the live venue source
    Venues {
        #[command(subcommand)]
        command: VenueCommands,
    },
    /// Resolve an address to coordinates
    Geocode {
        /// Free-form address
        address: String,
        /// List up to five candidates instead of resolving the first
        #[arg(long)]
        suggest: bool,
    },
    /// Look up rating and reviews for a restaurant name
    Enrich {
        /// Restaurant name as it appears on the map
        name: String,
        /// Location passed to the business search (defaults to the area's)
        #[arg(long)]
        location: Option<String>,
        /// Review page to print
        #[arg(long, default_value = "1")]
        page: usize,
    },
    /// Show or edit a user profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Contact form submissions
    Contact {
        #[command(subcommand)]
        command: ContactCommands,
    },
    /// Restaurant menu documents
    Menus {
        #[command(subcommand)]
        command: MenuCommands,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = mtlresto_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("mtlresto-cli ready; run with --help for commands");
        return Ok(());
    };

    match command {
        Commands::Venues { command } => lookup::run_venues(&config, command).await,
        Commands::Geocode { address, suggest } => {
            lookup::run_geocode(&config, &address, suggest).await
        }
        Commands::Enrich {
            name,
            location,
            page,
        } => lookup::run_enrich(&config, &name, location.as_deref(), page).await,
        Commands::Profile { command } => {
            let pool = connect(&config).await?;
            profile::run_profile(&pool, &config, command).await
        }
        Commands::Contact { command } => {
            let pool = connect(&config).await?;
            contact::run_contact(&pool, command).await
        }
        Commands::Menus { command } => {
            let pool = connect(&config).await?;
            menus::run_menus(&pool, command).await
        }
        Commands::Db { command } => {
            let pool = connect(&config).await?;
            run_db(&pool, command).await
        }
    }
}

async fn connect(config: &mtlresto_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = mtlresto_db::PoolConfig::from_app_config(config);
    Ok(mtlresto_db::connect_pool(&config.database_url, pool_config).await?)
}

async fn run_db(pool: &sqlx::PgPool, command: DbCommands) -> anyhow::Result<()> {
    match command {
        DbCommands::Ping => {
            mtlresto_db::ping(pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = mtlresto_db::run_migrations(pool).await?;
            println!("migrations up to date ({applied} applied)");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
