use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Serialize, Deserialize, FromRow, Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

/// A question that passed request validation and has no id yet.
#[derive(Clone, Debug)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

pub async fn count_questions(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions")
        .fetch_one(pool)
        .await
}

pub async fn get_all_questions(pool: &SqlitePool) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn get_questions_page(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty
        FROM questions
        ORDER BY id
        LIMIT ?1 OFFSET ?2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

/// Case-insensitive substring match on the question text. Folding happens
/// here rather than in `LIKE`, which only folds ASCII in SQLite.
pub async fn search_questions(pool: &SqlitePool, term: &str) -> sqlx::Result<Vec<Question>> {
    let needle = term.to_lowercase();
    let questions = get_all_questions(pool).await?;
    Ok(questions
        .into_iter()
        .filter(|q| q.question.to_lowercase().contains(&needle))
        .collect())
}

pub async fn get_questions_for_category(
    pool: &SqlitePool,
    category: i64,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty
        FROM questions
        WHERE questions.category = ?1
        ORDER BY id
        "#,
    )
    .bind(category)
    .fetch_all(pool)
    .await
}

/// Quiz candidates before the previously served ids are removed; `None`
/// means every category.
pub async fn get_quiz_candidates(
    pool: &SqlitePool,
    category: Option<i64>,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty
        FROM questions
        WHERE ?1 IS NULL OR questions.category = ?1
        ORDER BY id
        "#,
    )
    .bind(category)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
pub async fn get_question_by_id(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Question>> {
    sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn create_question(pool: &SqlitePool, question: &NewQuestion) -> sqlx::Result<i64> {
    let mut conn = pool.acquire().await?;

    let id = sqlx::query(
        r#"
INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&question.question)
    .bind(&question.answer)
    .bind(question.category)
    .bind(question.difficulty)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    Ok(id)
}

/// Returns `false` when there was no question with this id.
pub async fn delete_question(pool: &SqlitePool, id: i64) -> sqlx::Result<bool> {
    let mut conn = pool.acquire().await?;

    let deleted = sqlx::query(
        r#"
        DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    Ok(deleted > 0)
}

/// Inserts questions keeping their ids, all or nothing.
pub async fn import_questions(pool: &SqlitePool, questions: Vec<Question>) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;
    for question in questions {
        sqlx::query(
            r#"
INSERT INTO questions (id, question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(question.id)
        .bind(question.question)
        .bind(question.answer)
        .bind(question.category)
        .bind(question.difficulty)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::seeded_pool;

    fn new_question(category: i64) -> NewQuestion {
        NewQuestion {
            question: "Which country won the soccer World Cup in 2006".to_owned(),
            answer: "Italy".to_owned(),
            category,
            difficulty: 3,
        }
    }

    #[tokio::test]
    async fn pages_split_nineteen_rows_into_ten_and_nine() {
        let pool = seeded_pool().await;
        let first = get_questions_page(&pool, 10, 0).await.unwrap();
        let second = get_questions_page(&pool, 10, 10).await.unwrap();
        let third = get_questions_page(&pool, 10, 20).await.unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(second.len(), 9);
        assert!(third.is_empty());
        assert!(first.last().unwrap().id < second.first().unwrap().id);
    }

    #[tokio::test]
    async fn search_ignores_case() {
        let pool = seeded_pool().await;
        let found = search_questions(&pool, "egyptians").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].answer, "Scarab");
        assert!(search_questions(&pool, "notfound").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_folds_non_ascii_case() {
        let pool = seeded_pool().await;
        let id = create_question(
            &pool,
            &NewQuestion {
                question: "Où est l'Élysée?".to_owned(),
                answer: "Paris".to_owned(),
                category: 3,
                difficulty: 1,
            },
        )
        .await
        .unwrap();
        for term in ["ÉLYSÉE", "élysée", "OÙ EST"] {
            let found = search_questions(&pool, term).await.unwrap();
            assert_eq!(found.iter().map(|q| q.id).collect::<Vec<_>>(), [id]);
        }
    }

    #[tokio::test]
    async fn search_keeps_surrounding_spaces() {
        let pool = seeded_pool().await;
        assert_eq!(search_questions(&pool, " in 1996").await.unwrap().len(), 1);
        assert!(search_questions(&pool, " in 1996 ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let pool = seeded_pool().await;
        assert!(search_questions(&pool, "%").await.unwrap().is_empty());
        assert!(search_questions(&pool, "_").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn category_filter_returns_only_that_category() {
        let pool = seeded_pool().await;
        let art = get_questions_for_category(&pool, 2).await.unwrap();
        assert_eq!(art.len(), 4);
        assert!(art.iter().all(|q| q.category == 2));
    }

    #[tokio::test]
    async fn quiz_candidates_without_category_are_everything() {
        let pool = seeded_pool().await;
        assert_eq!(get_quiz_candidates(&pool, None).await.unwrap().len(), 19);
        assert_eq!(get_quiz_candidates(&pool, Some(6)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn create_then_delete() {
        let pool = seeded_pool().await;
        let id = create_question(&pool, &new_question(6)).await.unwrap();
        assert_eq!(count_questions(&pool).await.unwrap(), 20);
        assert_eq!(
            get_question_by_id(&pool, id).await.unwrap().unwrap().answer,
            "Italy"
        );

        assert!(delete_question(&pool, id).await.unwrap());
        assert!(!delete_question(&pool, id).await.unwrap());
        assert_eq!(get_question_by_id(&pool, id).await.unwrap(), None);
        assert_eq!(count_questions(&pool).await.unwrap(), 19);
    }

    #[tokio::test]
    async fn storage_rejects_dangling_category() {
        let pool = seeded_pool().await;
        assert!(create_question(&pool, &new_question(1000)).await.is_err());
    }
}
