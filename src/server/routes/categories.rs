use std::collections::BTreeMap;

use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories, questions::get_questions_for_category},
        Question,
    },
    server::app::AppState,
};

use super::{categories_map, method_not_allowed, success, ApiError, ApiResponse, Success};

#[derive(Serialize)]
struct Categories {
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct CategoryQuestions {
    questions: Vec<Question>,
    total_questions: i64,
    current_category: String,
}

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<Success<Categories>> {
    let categories = categories::get_all_categories(&pool).await?;
    Ok(success(Categories {
        categories: categories_map(categories),
    }))
}

async fn questions_by_category(
    State(pool): State<SqlitePool>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Success<CategoryQuestions>> {
    let Path(id) = id?;
    let category = categories::get_category(&pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let questions = get_questions_for_category(&pool, category.id).await?;
    Ok(success(CategoryQuestions {
        total_questions: questions.len() as i64,
        questions,
        current_category: category.kind,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/categories",
            get(get_categories).fallback(method_not_allowed),
        )
        .route(
            "/categories/{id}/questions",
            get(questions_by_category)
                .post(questions_by_category)
                .fallback(method_not_allowed),
        )
        .with_state(state)
}
