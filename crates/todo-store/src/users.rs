use chrono::Utc;
use rusqlite::types::ToSql;
use rusqlite::OptionalExtension;
use tracing::instrument;

use todo_core::ids::UserId;
use todo_core::user::User;

use crate::database::Database;
use crate::error::StoreError;

/// A user row as stored, including the password hash. Only the store and
/// the auth layer ever see this; the wire type is [`User`].
#[derive(Clone, Debug)]
pub struct UserRow {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
        }
    }
}

/// Partial update applied to a user row. The password arrives here already
/// hashed; hashing is the auth layer's job.
#[derive(Clone, Debug, Default)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

#[derive(Clone)]
pub struct UserRepo {
    db: Database,
}

impl UserRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert a new user. The email must be unique; a duplicate surfaces as
    /// [`StoreError::Conflict`] with the `email_already_exists` code.
    #[instrument(skip(self, password_hash), fields(email))]
    pub fn create(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRow, StoreError> {
        let id = UserId::new();
        let now = Utc::now().to_rfc3339();

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (uuid, first_name, last_name, email, password_hash, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![id.as_str(), first_name, last_name, email, password_hash, now, now],
            )
            .map_err(map_unique_email)?;

            Ok(UserRow {
                id,
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                created_at: now.clone(),
                updated_at: now,
            })
        })
    }

    /// Get a user by id.
    #[instrument(skip(self), fields(user_id = %id))]
    pub fn get(&self, id: &UserId) -> Result<UserRow, StoreError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT uuid, first_name, last_name, email, password_hash, created_at, updated_at
                 FROM users WHERE uuid = ?1",
                [id.as_str()],
                row_to_user,
            )
            .map_err(|_| StoreError::NotFound(format!("user {id}")))
        })
    }

    /// Look up a user by email. Absence is not an error here; the caller
    /// decides whether a missing account is `user_not_found` or
    /// `invalid_credentials`.
    #[instrument(skip(self), fields(email))]
    pub fn get_by_email(&self, email: &str) -> Result<Option<UserRow>, StoreError> {
        self.db.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT uuid, first_name, last_name, email, password_hash, created_at, updated_at
                     FROM users WHERE email = ?1",
                    [email],
                    row_to_user,
                )
                .optional()?;
            Ok(row)
        })
    }

    /// Apply a partial update to a user.
    #[instrument(skip(self, update), fields(user_id = %id))]
    pub fn update(&self, id: &UserId, update: &UserUpdate) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            let now = Utc::now().to_rfc3339();
            let mut sets = vec!["updated_at = ?1".to_string()];
            let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(now)];

            if let Some(first_name) = &update.first_name {
                sets.push(format!("first_name = ?{}", params.len() + 1));
                params.push(Box::new(first_name.clone()));
            }
            if let Some(last_name) = &update.last_name {
                sets.push(format!("last_name = ?{}", params.len() + 1));
                params.push(Box::new(last_name.clone()));
            }
            if let Some(email) = &update.email {
                sets.push(format!("email = ?{}", params.len() + 1));
                params.push(Box::new(email.clone()));
            }
            if let Some(password_hash) = &update.password_hash {
                sets.push(format!("password_hash = ?{}", params.len() + 1));
                params.push(Box::new(password_hash.clone()));
            }

            let sql = format!(
                "UPDATE users SET {} WHERE uuid = ?{}",
                sets.join(", "),
                params.len() + 1,
            );
            params.push(Box::new(id.as_str().to_string()));

            let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
            let rows = conn
                .execute(&sql, param_refs.as_slice())
                .map_err(map_unique_email)?;
            if rows == 0 {
                return Err(StoreError::NotFound(format!("user {id}")));
            }
            Ok(())
        })
    }

    /// Delete a user row. The caller clears the user's todos first.
    #[instrument(skip(self), fields(user_id = %id))]
    pub fn delete(&self, id: &UserId) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            let rows = conn.execute("DELETE FROM users WHERE uuid = ?1", [id.as_str()])?;
            if rows == 0 {
                return Err(StoreError::NotFound(format!("user {id}")));
            }
            Ok(())
        })
    }
}

fn map_unique_email(e: rusqlite::Error) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StoreError::Conflict("email_already_exists".to_string())
        }
        _ => StoreError::Database(e.to_string()),
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: UserId::from_raw(row.get::<_, String>(0)?),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        password_hash: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> UserRepo {
        UserRepo::new(Database::in_memory().unwrap())
    }

    #[test]
    fn create_and_get() {
        let repo = repo();
        let user = repo
            .create("John", "Doe", "john@example.com", "salt:hash")
            .unwrap();
        assert!(user.id.as_str().starts_with("user_"));

        let fetched = repo.get(&user.id).unwrap();
        assert_eq!(fetched.email, "john@example.com");
        assert_eq!(fetched.password_hash, "salt:hash");
    }

    #[test]
    fn duplicate_email_conflicts() {
        let repo = repo();
        repo.create("John", "Doe", "john@example.com", "a").unwrap();
        let err = repo
            .create("Jane", "Doe", "john@example.com", "b")
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(code) if code == "email_already_exists"));
    }

    #[test]
    fn get_by_email_returns_none_for_unknown() {
        let repo = repo();
        assert!(repo.get_by_email("nobody@example.com").unwrap().is_none());
    }

    #[test]
    fn get_missing_user_is_not_found() {
        let repo = repo();
        assert!(matches!(
            repo.get(&UserId::new()),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn update_patches_fields() {
        let repo = repo();
        let user = repo
            .create("John", "Doe", "john@example.com", "old-hash")
            .unwrap();

        repo.update(
            &user.id,
            &UserUpdate {
                first_name: Some("Johnny".into()),
                password_hash: Some("new-hash".into()),
                ..UserUpdate::default()
            },
        )
        .unwrap();

        let fetched = repo.get(&user.id).unwrap();
        assert_eq!(fetched.first_name, "Johnny");
        assert_eq!(fetched.last_name, "Doe");
        assert_eq!(fetched.password_hash, "new-hash");
    }

    #[test]
    fn update_to_taken_email_conflicts() {
        let repo = repo();
        repo.create("John", "Doe", "john@example.com", "a").unwrap();
        let jane = repo.create("Jane", "Doe", "jane@example.com", "b").unwrap();

        let err = repo
            .update(
                &jane.id,
                &UserUpdate {
                    email: Some("john@example.com".into()),
                    ..UserUpdate::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn delete_removes_user() {
        let repo = repo();
        let user = repo
            .create("John", "Doe", "john@example.com", "hash")
            .unwrap();
        repo.delete(&user.id).unwrap();
        assert!(matches!(
            repo.delete(&user.id),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn wire_user_drops_credentials() {
        let repo = repo();
        let row = repo
            .create("John", "Doe", "john@example.com", "hash")
            .unwrap();
        let user: User = row.into();
        let json = format!("{:?}", user);
        assert!(!json.contains("hash"));
    }
}
