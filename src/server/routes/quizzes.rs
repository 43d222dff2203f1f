use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize, Serializer};
use sqlx::SqlitePool;

use crate::{
    db::{queries::questions::get_quiz_candidates, Question},
    server::{app::AppState, error::ApiError},
    telemetry::{QUIZ_EXHAUSTED_CNTR, QUIZ_SERVED_CNTR},
};

use super::{categories::category_label, ApiResponse};

#[derive(Deserialize)]
struct QuizBody {
    category_id: Option<i64>,
    previous_questions: Option<Vec<i64>>,
}

/// A drawn question, or `false` once the pool is used up.
#[derive(Debug, PartialEq)]
enum QuizQuestion {
    Drawn(Question),
    Exhausted,
}

impl Serialize for QuizQuestion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            QuizQuestion::Drawn(question) => question.serialize(serializer),
            QuizQuestion::Exhausted => serializer.serialize_bool(false),
        }
    }
}

#[derive(Serialize)]
struct QuizResponse {
    success: bool,
    question: QuizQuestion,
}

// Only labelled categories get their own series; any other id shares one.
fn metric_label(category: Option<i64>) -> String {
    match category {
        None => "all".to_owned(),
        Some(id) if category_label(id).is_some() => id.to_string(),
        Some(_) => "other".to_owned(),
    }
}

// A pool with a single remaining candidate counts as exhausted.
fn pick_question<R: Rng + ?Sized>(candidates: &[Question], rng: &mut R) -> QuizQuestion {
    if candidates.len() < 2 {
        return QuizQuestion::Exhausted;
    }
    candidates
        .choose(rng)
        .cloned()
        .map_or(QuizQuestion::Exhausted, QuizQuestion::Drawn)
}

async fn next_quiz_question(
    State(pool): State<SqlitePool>,
    body: Result<Json<QuizBody>, JsonRejection>,
) -> ApiResponse<Json<QuizResponse>> {
    let Json(body) = body.map_err(|rejection| {
        tracing::warn!("Rejected quiz payload: {rejection}");
        ApiError::Unprocessable
    })?;
    let previous = body.previous_questions.unwrap_or_default();
    let candidates = get_quiz_candidates(&pool, body.category_id, &previous).await?;

    let question = pick_question(&candidates, &mut rand::thread_rng());
    let label = metric_label(body.category_id);
    match &question {
        QuizQuestion::Drawn(q) => {
            tracing::debug!("Drew question {} out of {}", q.id, candidates.len());
            QUIZ_SERVED_CNTR.with_label_values(&[label.as_str()]).inc();
        }
        QuizQuestion::Exhausted => {
            tracing::debug!("Quiz pool exhausted with {} candidates", candidates.len());
            QUIZ_EXHAUSTED_CNTR.with_label_values(&[label.as_str()]).inc();
        }
    }

    Ok(Json(QuizResponse {
        success: true,
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(next_quiz_question))
        .with_state(state)
}
