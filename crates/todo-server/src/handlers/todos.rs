//! Task routes, including the filtered listing.
//!
//! The listing pipeline is: coerce the raw query string into typed filter
//! input, normalize the sort token, run the storage query, then compute the
//! pagination window from the count the storage query returned.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use todo_core::filter::{RawFilter, TodoFilter, DEFAULT_LIMIT, DEFAULT_OFFSET};
use todo_core::ids::TodoId;
use todo_core::pagination;
use todo_core::todo::{Todo, TodoCreate, TodoPage, TodoPatch};
use todo_core::validation::{validate_todo_create, validate_todo_patch};
use todo_store::StoreError;

use crate::auth_layer::AuthedUser;
use crate::error::ApiError;
use crate::server::AppState;

/// Query-string shape of `GET /api/v1/tasks`. Everything arrives as text;
/// [`coerce`] turns it into typed filter input.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub query: Option<String>,
    pub completed: Option<String>,
    pub sort: Option<String>,
    pub offset: Option<String>,
    pub limit: Option<String>,
}

/// Coerce raw query-string values, collecting every violation. The
/// defaults are the observed ones: offset 20, limit 0 (see
/// [`todo_core::filter::RawFilter`]). The sort token is left for the
/// normalizer, which reports `invalid_sort` with parse diagnostics.
fn coerce(q: ListQuery) -> Result<RawFilter, ApiError> {
    let mut errors: Vec<String> = Vec::new();

    let completed = match q.completed.as_deref() {
        None => None,
        Some("true") => Some(true),
        Some("false") => Some(false),
        Some(_) => {
            errors.push("completed_not_boolean".into());
            None
        }
    };

    let offset = match q.offset.as_deref() {
        None => DEFAULT_OFFSET,
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) if n >= 0 => n,
            _ => {
                errors.push("offset_not_valid".into());
                DEFAULT_OFFSET
            }
        },
    };

    let limit = match q.limit.as_deref() {
        None => DEFAULT_LIMIT,
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) if n >= 1 => n,
            _ => {
                errors.push("limit_not_valid".into());
                DEFAULT_LIMIT
            }
        },
    };

    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    Ok(RawFilter {
        query: q.query,
        completed,
        sort: q.sort,
        offset,
        limit,
    })
}

fn parse_todo_id(raw: &str) -> Result<TodoId, ApiError> {
    TodoId::parse_strict(raw)
        .map_err(|_| ApiError::Validation(vec!["uuid_not_valid".to_string()]))
}

fn map_todo_not_found(uuid: &str) -> impl FnOnce(StoreError) -> ApiError + '_ {
    move |e| match e {
        StoreError::NotFound(_) => ApiError::TodoNotFound(uuid.to_string()),
        other => other.into(),
    }
}

/// `POST /api/v1/tasks`
pub async fn create_todo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Json(data): Json<TodoCreate>,
) -> Result<impl IntoResponse, ApiError> {
    validate_todo_create(&data)?;
    let todo = state.todos.create(&user.0, &data.title, &data.description)?;
    Ok((StatusCode::CREATED, Json(todo)))
}

/// `GET /api/v1/tasks` — the filtered, paginated listing.
pub async fn list_todos(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<TodoPage>, ApiError> {
    let raw = coerce(query)?;
    let filter = TodoFilter::from_raw(raw)?;

    let (todos, total) = state.todos.list(&user.0, &filter)?;
    let metadata = pagination::compute(total, filter.limit, filter.offset)?;

    Ok(Json(TodoPage { todos, metadata }))
}

/// `GET /api/v1/tasks/{uuid}`
pub async fn get_todo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Path(uuid): Path<String>,
) -> Result<Json<Todo>, ApiError> {
    let id = parse_todo_id(&uuid)?;
    let todo = state
        .todos
        .get(&user.0, &id)
        .map_err(map_todo_not_found(&uuid))?;
    Ok(Json(todo))
}

/// `PATCH /api/v1/tasks/{uuid}`
pub async fn update_todo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Path(uuid): Path<String>,
    Json(patch): Json<TodoPatch>,
) -> Result<StatusCode, ApiError> {
    let id = parse_todo_id(&uuid)?;
    validate_todo_patch(&patch)?;
    state
        .todos
        .update(&user.0, &id, &patch)
        .map_err(map_todo_not_found(&uuid))?;
    Ok(StatusCode::OK)
}

/// `DELETE /api/v1/tasks/{uuid}`
pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Path(uuid): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_todo_id(&uuid)?;
    state
        .todos
        .delete(&user.0, &id)
        .map_err(map_todo_not_found(&uuid))?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_applies_observed_defaults() {
        let raw = coerce(ListQuery::default()).unwrap();
        assert_eq!(raw.offset, 20);
        assert_eq!(raw.limit, 0);
        assert_eq!(raw.completed, None);
    }

    #[test]
    fn coerce_parses_booleans_and_integers() {
        let raw = coerce(ListQuery {
            completed: Some("true".into()),
            offset: Some("0".into()),
            limit: Some("5".into()),
            ..ListQuery::default()
        })
        .unwrap();
        assert_eq!(raw.completed, Some(true));
        assert_eq!(raw.offset, 0);
        assert_eq!(raw.limit, 5);
    }

    #[test]
    fn coerce_collects_all_violations() {
        let err = coerce(ListQuery {
            completed: Some("maybe".into()),
            offset: Some("-1".into()),
            limit: Some("0".into()),
            ..ListQuery::default()
        })
        .unwrap_err();
        match err {
            ApiError::Validation(messages) => assert_eq!(
                messages,
                vec!["completed_not_boolean", "offset_not_valid", "limit_not_valid"]
            ),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn explicit_zero_limit_is_rejected() {
        // limit must be >= 1 when given; only the absent default is 0
        let err = coerce(ListQuery {
            limit: Some("0".into()),
            ..ListQuery::default()
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn bad_path_id_is_a_validation_error() {
        let err = parse_todo_id("not-a-todo-id").unwrap_err();
        match err {
            ApiError::Validation(messages) => assert_eq!(messages, vec!["uuid_not_valid"]),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
