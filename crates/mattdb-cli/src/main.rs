mod import;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "mattdb-cli")]
#[command(about = "mattdb command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Import products from a JSON rows file.
    Import {
        /// Path to a JSON array of import row objects.
        file: PathBuf,
    },
    /// Seed the default category set.
    Seed,
    /// Run pending database migrations.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let pool = mattdb_db::connect_pool_from_env().await?;

    match cli.command {
        Commands::Import { file } => import::run(&pool, &file).await?,
        Commands::Seed => {
            let count = mattdb_db::seed_categories(&pool).await?;
            println!("seeded {count} categories");
        }
        Commands::Migrate => {
            let applied = mattdb_db::run_migrations(&pool).await?;
            println!("applied {applied} migrations");
        }
    }

    Ok(())
}
