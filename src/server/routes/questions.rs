use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::{
    deserialize_default_from_null, deserialize_number_from_string,
};
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories, questions},
        NewQuestion, Question,
    },
    server::app::AppState,
    telemetry::{QUESTIONS_CREATED, QUESTIONS_DELETED},
};

use super::{categories_map, method_not_allowed, success, ApiError, ApiResponse, Success};

pub const QUESTIONS_PER_PAGE: i64 = 10;

#[derive(Deserialize)]
struct PageQuery {
    page: Option<i64>,
}

#[derive(Deserialize)]
struct NewQuestionBody {
    question: String,
    answer: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    category: i64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    difficulty: i64,
}

impl NewQuestionBody {
    fn validate(self) -> Result<NewQuestion, ApiError> {
        let question = self.question.trim();
        let answer = self.answer.trim();
        if question.is_empty() || answer.is_empty() {
            return Err(ApiError::Unprocessable(
                "question and answer must not be blank".to_owned(),
            ));
        }
        if !(1..=5).contains(&self.difficulty) {
            return Err(ApiError::Unprocessable(format!(
                "difficulty {} is outside 1..=5",
                self.difficulty
            )));
        }
        Ok(NewQuestion {
            question: question.to_owned(),
            answer: answer.to_owned(),
            category: self.category,
            difficulty: self.difficulty,
        })
    }
}

#[derive(Deserialize)]
struct SearchBody {
    #[serde(
        rename = "searchTerm",
        default,
        deserialize_with = "deserialize_default_from_null"
    )]
    search_term: String,
}

#[derive(Serialize)]
struct QuestionsPage {
    questions: Vec<Question>,
    total_questions: i64,
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct Created {
    created: i64,
    questions: Vec<Question>,
    total_questions: i64,
}

#[derive(Serialize)]
struct Deleted {
    deleted: i64,
    questions: Vec<Question>,
    total_questions: i64,
}

#[derive(Serialize)]
struct SearchResults {
    questions: Vec<Question>,
    total_questions: i64,
}

/// Offset of the first row of a 1-based page, `None` for pages that can not exist.
fn page_offset(page: i64) -> Option<i64> {
    if page < 1 {
        return None;
    }
    (page - 1).checked_mul(QUESTIONS_PER_PAGE)
}

async fn first_page(pool: &SqlitePool) -> sqlx::Result<(Vec<Question>, i64)> {
    let questions = questions::get_questions_page(pool, QUESTIONS_PER_PAGE, 0).await?;
    let total = questions::count_questions(pool).await?;
    Ok((questions, total))
}

async fn list_questions(
    State(pool): State<SqlitePool>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<Success<QuestionsPage>> {
    let Query(PageQuery { page }) = query?;
    let page = page.unwrap_or(1);
    let offset = page_offset(page).ok_or(ApiError::NotFound)?;

    let questions = questions::get_questions_page(&pool, QUESTIONS_PER_PAGE, offset).await?;
    if questions.is_empty() {
        tracing::info!("Page {page} has no questions");
        return Err(ApiError::NotFound);
    }
    let total_questions = questions::count_questions(&pool).await?;
    let categories = categories_map(categories::get_all_categories(&pool).await?);

    Ok(success(QuestionsPage {
        questions,
        total_questions,
        categories,
    }))
}

async fn create_question(
    State(pool): State<SqlitePool>,
    body: Result<Json<NewQuestionBody>, JsonRejection>,
) -> ApiResponse<Success<Created>> {
    let Json(body) = body?;
    let new_question = body.validate()?;
    if categories::get_category(&pool, new_question.category)
        .await?
        .is_none()
    {
        return Err(ApiError::Unprocessable(format!(
            "category {} does not exist",
            new_question.category
        )));
    }

    let created = questions::create_question(&pool, &new_question).await?;
    QUESTIONS_CREATED.inc();
    tracing::info!("Created question {created}");

    let (questions, total_questions) = first_page(&pool).await?;
    Ok(success(Created {
        created,
        questions,
        total_questions,
    }))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Success<Deleted>> {
    let Path(id) = id?;
    if !questions::delete_question(&pool, id).await? {
        return Err(ApiError::Unprocessable(format!("question {id} does not exist")));
    }
    QUESTIONS_DELETED.inc();
    tracing::info!("Deleted question {id}");

    let (questions, total_questions) = first_page(&pool).await?;
    Ok(success(Deleted {
        deleted: id,
        questions,
        total_questions,
    }))
}

async fn search_questions(
    State(pool): State<SqlitePool>,
    body: Result<Json<SearchBody>, JsonRejection>,
) -> ApiResponse<Success<SearchResults>> {
    let Json(SearchBody { search_term }) = body?;
    let questions = if search_term.trim().is_empty() {
        vec![]
    } else {
        questions::search_questions(&pool, &search_term).await?
    };
    Ok(success(SearchResults {
        total_questions: questions.len() as i64,
        questions,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/questions",
            get(list_questions)
                .post(create_question)
                .fallback(method_not_allowed),
        )
        .route(
            "/questions/search",
            post(search_questions).fallback(method_not_allowed),
        )
        .route(
            "/questions/{id}",
            delete(delete_question).fallback(method_not_allowed),
        )
        .with_state(state)
}
