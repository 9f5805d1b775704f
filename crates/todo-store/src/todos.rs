//! Todo repository, including the filtered listing query.
//!
//! The listing translates a [`TodoFilter`] into SQL: an owner-scoped
//! predicate with optional substring and completion clauses, an ORDER BY
//! from the whitelisted sort field, and skip/limit handled by the engine.
//! The page fetch and the total count are two independent statements over
//! the same predicate; there is deliberately no transaction around them, so
//! a concurrent write between the two can make `total` drift from the page.

use chrono::Utc;
use rusqlite::types::ToSql;
use tracing::instrument;

use todo_core::filter::{SortDirection, SortField, TodoFilter};
use todo_core::ids::{TodoId, UserId};
use todo_core::todo::{Todo, TodoPatch};

use crate::database::Database;
use crate::error::StoreError;

/// Column backing each sortable field.
fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::CreatedAt => "created_at",
        SortField::Title => "title",
        SortField::Completed => "completed",
    }
}

fn sort_keyword(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    }
}

/// Escape LIKE special characters for safe pattern matching.
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[derive(Clone)]
pub struct TodoRepo {
    db: Database,
}

impl TodoRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a new todo for `owner`. Completion starts false.
    #[instrument(skip(self, title, description), fields(owner = %owner))]
    pub fn create(
        &self,
        owner: &UserId,
        title: &str,
        description: &str,
    ) -> Result<Todo, StoreError> {
        let id = TodoId::new();
        let now = Utc::now().to_rfc3339();

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO todos (uuid, owner_id, title, description, completed, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6)",
                rusqlite::params![id.as_str(), owner.as_str(), title, description, now, now],
            )?;

            Ok(Todo {
                id,
                title: title.to_string(),
                description: description.to_string(),
                completed: false,
                created_at: now,
            })
        })
    }

    /// Get one of `owner`'s todos by id.
    #[instrument(skip(self), fields(owner = %owner, todo_id = %id))]
    pub fn get(&self, owner: &UserId, id: &TodoId) -> Result<Todo, StoreError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                "SELECT uuid, title, description, completed, created_at
                 FROM todos WHERE uuid = ?1 AND owner_id = ?2",
                [id.as_str(), owner.as_str()],
                row_to_todo,
            )
            .map_err(|_| StoreError::NotFound(format!("todo {id}")))
        })
    }

    /// List `owner`'s todos through `filter`, returning the requested page
    /// and the total count of items matching the predicate.
    ///
    /// A limit of 0 means unbounded (the page is everything past the
    /// offset); SQLite spells that `LIMIT -1`.
    #[instrument(skip(self, filter), fields(owner = %owner))]
    pub fn list(&self, owner: &UserId, filter: &TodoFilter) -> Result<(Vec<Todo>, i64), StoreError> {
        self.db.with_conn(|conn| {
            let (predicate, params) = predicate(owner, filter);
            let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();

            let limit = if filter.limit == 0 { -1 } else { filter.limit };
            let sql = format!(
                "SELECT uuid, title, description, completed, created_at
                 FROM todos WHERE {predicate}
                 ORDER BY {} {}
                 LIMIT {limit} OFFSET {}",
                sort_column(filter.sort_field),
                sort_keyword(filter.sort_direction),
                filter.offset,
            );
            let mut stmt = conn.prepare(&sql)?;
            let todos = stmt
                .query_map(param_refs.as_slice(), row_to_todo)?
                .collect::<Result<Vec<_>, _>>()?;

            // Second round trip: unsorted, unpaginated count over the same
            // predicate. Not transactional with the fetch above.
            let count_sql = format!("SELECT COUNT(*) FROM todos WHERE {predicate}");
            let total: i64 =
                conn.query_row(&count_sql, param_refs.as_slice(), |row| row.get(0))?;

            Ok((todos, total))
        })
    }

    /// Apply a partial update to one of `owner`'s todos.
    #[instrument(skip(self, patch), fields(owner = %owner, todo_id = %id))]
    pub fn update(&self, owner: &UserId, id: &TodoId, patch: &TodoPatch) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            let now = Utc::now().to_rfc3339();
            let mut sets = vec!["updated_at = ?1".to_string()];
            let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(now)];

            if let Some(title) = &patch.title {
                sets.push(format!("title = ?{}", params.len() + 1));
                params.push(Box::new(title.clone()));
            }
            if let Some(description) = &patch.description {
                sets.push(format!("description = ?{}", params.len() + 1));
                params.push(Box::new(description.clone()));
            }
            if let Some(completed) = patch.completed {
                sets.push(format!("completed = ?{}", params.len() + 1));
                params.push(Box::new(completed));
            }

            let sql = format!(
                "UPDATE todos SET {} WHERE uuid = ?{} AND owner_id = ?{}",
                sets.join(", "),
                params.len() + 1,
                params.len() + 2,
            );
            params.push(Box::new(id.as_str().to_string()));
            params.push(Box::new(owner.as_str().to_string()));

            let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
            let rows = conn.execute(&sql, param_refs.as_slice())?;
            if rows == 0 {
                return Err(StoreError::NotFound(format!("todo {id}")));
            }
            Ok(())
        })
    }

    /// Delete one of `owner`'s todos.
    #[instrument(skip(self), fields(owner = %owner, todo_id = %id))]
    pub fn delete(&self, owner: &UserId, id: &TodoId) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            let rows = conn.execute(
                "DELETE FROM todos WHERE uuid = ?1 AND owner_id = ?2",
                [id.as_str(), owner.as_str()],
            )?;
            if rows == 0 {
                return Err(StoreError::NotFound(format!("todo {id}")));
            }
            Ok(())
        })
    }

    /// Delete all of `owner`'s todos. Used when the owning account goes away.
    #[instrument(skip(self), fields(owner = %owner))]
    pub fn delete_by_owner(&self, owner: &UserId) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            let _ = conn.execute("DELETE FROM todos WHERE owner_id = ?1", [owner.as_str()])?;
            Ok(())
        })
    }
}

/// Owner-scoped WHERE clause plus its bound parameters. The substring
/// clause matches title OR description, case-insensitively; empty search
/// text is treated as absent, matching the upstream behavior.
fn predicate(owner: &UserId, filter: &TodoFilter) -> (String, Vec<Box<dyn ToSql>>) {
    let mut sql = String::from("owner_id = ?1");
    let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(owner.as_str().to_string())];

    if let Some(query) = filter.search_text.as_deref().filter(|q| !q.is_empty()) {
        let n = params.len() + 1;
        sql.push_str(&format!(
            " AND (title LIKE ?{n} ESCAPE '\\' OR description LIKE ?{n} ESCAPE '\\')"
        ));
        params.push(Box::new(format!("%{}%", escape_like(query))));
    }

    if let Some(completed) = filter.completed {
        sql.push_str(&format!(" AND completed = ?{}", params.len() + 1));
        params.push(Box::new(completed));
    }

    (sql, params)
}

fn row_to_todo(row: &rusqlite::Row<'_>) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: TodoId::from_raw(row.get::<_, String>(0)?),
        title: row.get(1)?,
        description: row.get(2)?,
        completed: row.get(3)?,
        created_at: row.get(4)?,
    })
}
