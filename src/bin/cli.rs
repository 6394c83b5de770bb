use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::SqlitePool;
use std::fs::File;
use std::path::{Path, PathBuf};
use trivia_api::db::dump::{read_records, write_records, CATEGORIES_FILE, QUESTIONS_FILE};
use trivia_api::db::queries::categories::{create_category, get_all_categories, import_categories};
use trivia_api::db::queries::questions::{get_all_questions, import_questions};
use trivia_api::db::{self, Category, Question};
use trivia_api::settings::get_settings;
use trivia_api::telemetry::init_tracing;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Database path, overrides the configured one
    #[clap(long)]
    db_path: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or update the schema
    Migrate,
    /// Add a category, printing its id
    AddCategory {
        #[clap(value_name = "TYPE")]
        kind: String,
    },
    /// Load categories.csv and questions.csv from a directory
    Import { path: PathBuf },
    /// Write categories.csv and questions.csv to a directory
    Export { path: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = get_settings().context("Failed to load settings")?;
    let db_path = cli.db_path.unwrap_or(settings.database.path);
    let pool = db::establish_connection(&db_path, settings.database.max_connections)
        .await
        .with_context(|| format!("Cannot connect to DB {db_path}"))?;
    db::run_migrations(&pool).await?;

    match cli.command {
        Commands::Migrate => tracing::info!("Database {db_path} is up to date"),
        Commands::AddCategory { kind } => {
            let id = create_category(&pool, kind.trim()).await?;
            tracing::info!("Created category {id} ({kind})");
            println!("{id}");
        }
        Commands::Export { path } => export_data(&pool, &path).await?,
        Commands::Import { path } => import_data(&pool, &path).await?,
    }
    Ok(())
}

async fn export_data(pool: &SqlitePool, path: &Path) -> anyhow::Result<()> {
    let categories = get_all_categories(pool).await?;
    let questions = get_all_questions(pool).await?;
    if !path.exists() {
        std::fs::create_dir_all(path)?
    }
    write_records(File::create(path.join(CATEGORIES_FILE))?, &categories)?;
    write_records(File::create(path.join(QUESTIONS_FILE))?, &questions)?;
    tracing::info!(
        "Exported {} categories and {} questions to {}",
        categories.len(),
        questions.len(),
        path.display()
    );
    Ok(())
}

async fn import_data(pool: &SqlitePool, path: &Path) -> anyhow::Result<()> {
    let categories: Vec<Category> = read_records(File::open(path.join(CATEGORIES_FILE))?)
        .context("Cannot read categories")?;
    let questions: Vec<Question> = read_records(File::open(path.join(QUESTIONS_FILE))?)
        .context("Cannot read questions")?;
    let (n_categories, n_questions) = (categories.len(), questions.len());
    import_categories(pool, categories).await?;
    import_questions(pool, questions).await?;
    tracing::info!("Imported {n_categories} categories and {n_questions} questions");
    Ok(())
}
