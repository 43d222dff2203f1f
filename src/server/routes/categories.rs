use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories::get_category_map, questions::get_questions_for_category},
        CategoryMap, Question,
    },
    server::{app::AppState, error::ApiError, pagination::paginate},
};

use super::{id_from_path, ApiResponse};

// Labels for the by-category listing. These are not read from the categories
// table, so ids outside 1..=6 have no label.
const CATEGORY_LABELS: [(i64, &str); 6] = [
    (1, "Science"),
    (2, "Art"),
    (3, "Geography"),
    (4, "History"),
    (5, "Entertainment"),
    (6, "Sports"),
];

pub(super) fn category_label(id: i64) -> Option<&'static str> {
    CATEGORY_LABELS
        .iter()
        .find(|(label_id, _)| *label_id == id)
        .map(|(_, label)| *label)
}

#[derive(Serialize)]
struct CategoriesBody {
    success: bool,
    categories: CategoryMap,
}

#[derive(Serialize)]
struct CategoryQuestionsBody {
    success: bool,
    current_questions: Vec<Question>,
    total_questions: usize,
    current_category: &'static str,
}

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<Json<CategoriesBody>> {
    let categories = get_category_map(&pool).await?;
    Ok(Json(CategoriesBody {
        success: true,
        categories,
    }))
}

async fn get_questions_by_category(
    State(pool): State<SqlitePool>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Json<CategoryQuestionsBody>> {
    let category_id = id_from_path(path)?;
    let selection = get_questions_for_category(&pool, category_id).await?;
    if selection.is_empty() {
        return Err(ApiError::NotFound);
    }

    let current_questions = paginate(selection, 1);
    let current_category = category_label(category_id)
        .ok_or_else(|| ApiError::internal(format!("no label for category {category_id}")))?;

    Ok(Json(CategoryQuestionsBody {
        success: true,
        total_questions: current_questions.len(),
        current_questions,
        current_category,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(get_questions_by_category))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_cover_seeded_categories_only() {
        assert_eq!(category_label(1), Some("Science"));
        assert_eq!(category_label(6), Some("Sports"));
        assert_eq!(category_label(0), None);
        assert_eq!(category_label(7), None);
    }
}
