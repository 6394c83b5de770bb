pub mod dump;
pub mod queries;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub use queries::categories::Category;
pub use queries::questions::{NewQuestion, Question};

use sqlx::Error;

pub async fn establish_connection(path: &str, max_connections: u32) -> Result<SqlitePool, Error> {
    let options = SqliteConnectOptions::from_str(format!("sqlite:{}", path).as_str())?
        .create_if_missing(true);
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

    use super::{dump, queries, run_migrations, Category, Question};

    const CATEGORIES_CSV: &str = include_str!("../../data/categories.csv");
    const QUESTIONS_CSV: &str = include_str!("../../data/questions.csv");

    // every connection to `sqlite::memory:` is its own database, so stay on one
    pub async fn empty_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    /// 6 categories and the 19 classic trivia questions.
    pub async fn seeded_pool() -> SqlitePool {
        let pool = empty_pool().await;
        let categories: Vec<Category> = dump::read_records(CATEGORIES_CSV.as_bytes()).unwrap();
        let questions: Vec<Question> = dump::read_records(QUESTIONS_CSV.as_bytes()).unwrap();
        queries::categories::import_categories(&pool, categories)
            .await
            .unwrap();
        queries::questions::import_questions(&pool, questions)
            .await
            .unwrap();
        pool
    }
}
