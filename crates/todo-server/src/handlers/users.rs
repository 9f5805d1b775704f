//! Account routes for the authenticated user.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::{json, Map, Value};

use todo_auth::password::hash_password;
use todo_core::user::{User, UserPatch};
use todo_core::validation::validate_user_patch;
use todo_store::users::UserUpdate;
use todo_store::StoreError;

use crate::auth_layer::AuthedUser;
use crate::error::ApiError;
use crate::server::AppState;

fn map_user_not_found(user: &AuthedUser) -> impl FnOnce(StoreError) -> ApiError + '_ {
    move |e| match e {
        StoreError::NotFound(_) => {
            ApiError::UserNotFound(json!({ "uuid": user.0.as_str() }))
        }
        StoreError::Conflict(code) => ApiError::Validation(vec![code]),
        other => other.into(),
    }
}

/// `GET /api/v1/user`
pub async fn get_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state.users.get(&user.0).map_err(map_user_not_found(&user))?;
    let data: User = row.into();
    Ok(Json(json!({ "message": "user_found", "data": data })))
}

/// `PATCH /api/v1/user`
pub async fn update_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
    Json(patch): Json<UserPatch>,
) -> Result<impl IntoResponse, ApiError> {
    validate_user_patch(&patch)?;

    let update = UserUpdate {
        first_name: patch.first_name.clone(),
        last_name: patch.last_name.clone(),
        email: patch.email.clone(),
        password_hash: patch.password.as_deref().map(hash_password),
    };
    state
        .users
        .update(&user.0, &update)
        .map_err(map_user_not_found(&user))?;

    Ok(Json(json!({
        "message": "user_updated",
        "data": echo_patch(&patch),
    })))
}

/// `DELETE /api/v1/user` — removes the account and everything it owns.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<AuthedUser>,
) -> Result<impl IntoResponse, ApiError> {
    state.todos.delete_by_owner(&user.0)?;
    state
        .users
        .delete(&user.0)
        .map_err(map_user_not_found(&user))?;
    Ok(Json(json!({ "message": "user_deleted", "data": user.0 })))
}

/// Echo the fields the patch actually set, never the password.
fn echo_patch(patch: &UserPatch) -> Value {
    let mut data = Map::new();
    if let Some(first_name) = &patch.first_name {
        let _ = data.insert("firstName".into(), json!(first_name));
    }
    if let Some(last_name) = &patch.last_name {
        let _ = data.insert("lastName".into(), json!(last_name));
    }
    if let Some(email) = &patch.email {
        let _ = data.insert("email".into(), json!(email));
    }
    Value::Object(data)
}
