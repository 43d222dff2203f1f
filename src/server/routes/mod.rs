mod categories;
mod questions;
mod quizzes;

use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use serde::Deserialize;

pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::quizzes_router;

use super::deserializers::deserialize_lenient_i64;
use super::error::ApiError;

pub type ApiResponse<T> = Result<T, ApiError>;

#[derive(Default, Deserialize)]
struct PageQuery {
    #[serde(default, deserialize_with = "deserialize_lenient_i64")]
    page: Option<i64>,
}

impl PageQuery {
    fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }
}

// a path segment that is not an integer does not name any resource
fn id_from_path(path: Result<Path<i64>, PathRejection>) -> ApiResponse<i64> {
    path.map(|Path(id)| id).map_err(|rejection| {
        tracing::debug!("Unmatched id in path: {rejection}");
        ApiError::NotFound
    })
}

// a query string that does not fit the expected shape is read as no query
fn query_or_default<T: Default>(query: Result<Query<T>, QueryRejection>) -> T {
    query.map(|Query(query)| query).unwrap_or_else(|rejection| {
        tracing::warn!("Ignoring query string: {rejection}");
        T::default()
    })
}
