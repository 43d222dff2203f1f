use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::get_category_map,
            questions::{self, get_all_questions, get_question_by_id},
        },
        CategoryMap, NewQuestion, Question,
    },
    server::{
        app::AppState,
        deserializers::{deserialize_lenient_i64, deserialize_non_empty_string},
        error::ApiError,
        pagination::paginate,
    },
};

use super::{id_from_path, query_or_default, ApiResponse, PageQuery};

#[derive(Default, Deserialize)]
struct QuestionsQuery {
    #[serde(default, deserialize_with = "deserialize_lenient_i64")]
    page: Option<i64>,
    #[serde(default, rename = "searchTerm")]
    #[serde(deserialize_with = "deserialize_non_empty_string")]
    search_term: Option<String>,
}

#[derive(Deserialize)]
struct NewQuestionBody {
    question: Option<String>,
    answer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    category: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    difficulty: Option<i64>,
}

impl NewQuestionBody {
    fn validate(&self) -> Result<NewQuestion<'_>, ApiError> {
        match (self.question.as_deref(), self.answer.as_deref()) {
            (Some(question), Some(answer)) => Ok(NewQuestion {
                question,
                answer,
                category: self.category,
                difficulty: self.difficulty,
            }),
            _ => {
                tracing::warn!("Question payload is missing question or answer");
                Err(ApiError::Unprocessable)
            }
        }
    }
}

#[derive(Serialize)]
struct QuestionsPageBody {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    categories: CategoryMap,
    current_category: Option<String>,
}

#[derive(Serialize)]
struct QuestionsBody {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
}

#[derive(Serialize)]
struct CreatedQuestionBody {
    success: bool,
    question: String,
    answer: String,
    difficulty: Option<i64>,
    category: Option<i64>,
}

async fn get_questions(
    State(pool): State<SqlitePool>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResponse<Json<QuestionsPageBody>> {
    let query = query_or_default(query);
    let selection = get_all_questions(&pool).await?;
    let total_questions = selection.len();
    let current_questions = paginate(selection, query.page());
    let categories = get_category_map(&pool).await?;

    if current_questions.is_empty() {
        return Err(ApiError::NotFound);
    }

    Ok(Json(QuestionsPageBody {
        success: true,
        questions: current_questions,
        total_questions,
        categories,
        current_category: None,
    }))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResponse<Json<QuestionsBody>> {
    let id = id_from_path(path)?;
    if get_question_by_id(&pool, id).await?.is_none() {
        return Err(ApiError::NotFound);
    }

    questions::delete_question(&pool, id).await?;
    tracing::debug!("Deleted question {id}");

    let selection = get_all_questions(&pool).await?;
    let total_questions = selection.len();
    Ok(Json(QuestionsBody {
        success: true,
        questions: paginate(selection, 1),
        total_questions,
    }))
}

async fn create_or_search_questions(
    State(pool): State<SqlitePool>,
    query: Result<Query<QuestionsQuery>, QueryRejection>,
    body: Result<Json<NewQuestionBody>, JsonRejection>,
) -> ApiResponse<Response> {
    let query = query_or_default(query);
    match query.search_term {
        Some(term) => Ok(search_questions(&pool, &term, query.page.unwrap_or(1))
            .await?
            .into_response()),
        None => {
            let Json(body) = body.map_err(|rejection| {
                tracing::warn!("Rejected question payload: {rejection}");
                ApiError::Unprocessable
            })?;
            Ok(create_question(&pool, body).await?.into_response())
        }
    }
}

async fn search_questions(
    pool: &SqlitePool,
    term: &str,
    page: i64,
) -> ApiResponse<Json<QuestionsBody>> {
    let selection = questions::search_questions(pool, term).await?;
    let current_questions = paginate(selection, page);
    Ok(Json(QuestionsBody {
        success: true,
        total_questions: current_questions.len(),
        questions: current_questions,
    }))
}

async fn create_question(
    pool: &SqlitePool,
    body: NewQuestionBody,
) -> ApiResponse<Json<CreatedQuestionBody>> {
    let new_question = body.validate()?;
    let id = questions::create_question(pool, new_question)
        .await
        .map_err(|e| {
            tracing::warn!("Failed to insert question: {e}");
            ApiError::Unprocessable
        })?;
    tracing::debug!("Created question {id}");

    let created = questions::get_latest_question(pool).await?;
    Ok(Json(CreatedQuestionBody {
        success: true,
        question: created.question,
        answer: created.answer,
        difficulty: created.difficulty,
        category: created.category,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/questions",
            get(get_questions).post(create_or_search_questions),
        )
        .route("/questions/{id}", delete(delete_question))
        .with_state(state)
}
