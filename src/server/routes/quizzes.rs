use std::collections::HashSet;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::{
    deserialize_default_from_null, deserialize_number_from_string,
};
use sqlx::SqlitePool;

use crate::{
    db::{queries::categories::get_category, Question},
    quiz::next_question,
    server::{app::AppState, deserializers::deserialize_some},
    telemetry::QUIZ_QUESTIONS_SERVED,
};

use super::{method_not_allowed, success, ApiError, ApiResponse, Success};

// the frontend sends `{"id": 0, "type": "click"}` for "all categories"
const ALL_CATEGORIES: i64 = 0;

#[derive(Deserialize)]
struct QuizCategory {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    id: i64,
}

#[derive(Deserialize)]
struct QuizBody {
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    previous_questions: HashSet<i64>,
    #[serde(default, deserialize_with = "deserialize_some")]
    quiz_category: Option<Option<QuizCategory>>,
}

#[derive(Serialize)]
struct QuizQuestion {
    question: Option<Question>,
}

async fn play_quiz(
    State(pool): State<SqlitePool>,
    body: Result<Json<QuizBody>, JsonRejection>,
) -> ApiResponse<Success<QuizQuestion>> {
    let Json(body) = body?;
    let quiz_category = body
        .quiz_category
        .ok_or_else(|| ApiError::Unprocessable("quiz_category is required".to_owned()))?;

    let (category, label) = match quiz_category {
        Some(QuizCategory { id }) if id != ALL_CATEGORIES => {
            let category = get_category(&pool, id).await?.ok_or(ApiError::NotFound)?;
            (Some(category.id), category.kind)
        }
        _ => (None, "all".to_owned()),
    };

    let question = next_question(&pool, category, &body.previous_questions).await?;
    if question.is_some() {
        QUIZ_QUESTIONS_SERVED.with_label_values(&[label.as_str()]).inc();
    }
    Ok(success(QuizQuestion { question }))
}

pub fn quiz_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(play_quiz).fallback(method_not_allowed))
        .with_state(state)
}
