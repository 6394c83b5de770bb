use std::collections::HashSet;

use rand::seq::IteratorRandom;
use rand::Rng;
use sqlx::SqlitePool;

use crate::db::{queries::questions::get_quiz_candidates, Question};

/// Uniformly picks one candidate that was not served yet. `None` means the
/// quiz is over.
pub fn pick_next<R: Rng + ?Sized>(
    candidates: Vec<Question>,
    previous: &HashSet<i64>,
    rng: &mut R,
) -> Option<Question> {
    candidates
        .into_iter()
        .filter(|q| !previous.contains(&q.id))
        .choose(rng)
}

#[tracing::instrument(skip(pool, previous), fields(served = previous.len()))]
pub async fn next_question(
    pool: &SqlitePool,
    category: Option<i64>,
    previous: &HashSet<i64>,
) -> sqlx::Result<Option<Question>> {
    let candidates = get_quiz_candidates(pool, category).await?;
    let picked = pick_next(candidates, previous, &mut rand::thread_rng());
    if picked.is_none() {
        tracing::debug!("No unseen questions left");
    }
    Ok(picked)
}
