//! Database module for todu-server
//!
//! Owns the canonical user and todo records and every mutation rule:
//! the soft-delete lifecycle, the dense priority ranking among a user's
//! non-deleted todos, and the filtered listing views. Multi-statement
//! mutations run inside a transaction; dropping the transaction on an
//! early error return rolls everything back.

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{StatusFilter, Todo, User};
use crate::validate;

const TODO_COLUMNS: &str = "id, user_id, title, start_date, end_date, priority, is_completed, \
     is_deleted, created_at, updated_at, deleted_at";

/// Thread-safe database wrapper
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create the database
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).context("Failed to create database directory")?;
        }

        let conn = Connection::open(path).context("Failed to open database")?;

        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init()?;

        Ok(db)
    }

    /// Initialize the database schema
    fn init(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            -- Users table
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                CHECK (length(name) BETWEEN 2 AND 50)
            );

            -- Todos table
            CREATE TABLE IF NOT EXISTS todos (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                priority INTEGER NOT NULL,
                is_completed INTEGER NOT NULL DEFAULT 0,
                is_deleted INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT,
                CHECK (length(title) BETWEEN 1 AND 500),
                CHECK (start_date <= end_date),
                CHECK (priority BETWEEN 1 AND 999999),
                CHECK ((is_deleted = 0 AND deleted_at IS NULL)
                    OR (is_deleted = 1 AND deleted_at IS NOT NULL)),
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );

            -- Indexes
            CREATE INDEX IF NOT EXISTS idx_todos_user ON todos(user_id, is_deleted, is_completed);
            CREATE INDEX IF NOT EXISTS idx_todos_priority ON todos(user_id, priority);
            CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
            "#,
        )?;

        Ok(())
    }

    /// Insert a new account. A duplicate email maps to `EmailExists`,
    /// which also covers two signups racing on the unique index.
    pub fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<User, ApiError> {
        let conn = self.conn.lock().unwrap();
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: name.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now_utc(),
        };

        let inserted = conn.execute(
            "INSERT INTO users (id, email, password_hash, name, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                &user.id,
                &user.email,
                &user.password_hash,
                &user.name,
                &user.created_at
            ],
        );

        match inserted {
            Ok(_) => Ok(user),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(ApiError::EmailExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, email, name, password_hash, created_at FROM users WHERE email = ?1",
            params![email],
            user_from_row,
        )
        .optional()
        .map_err(Into::into)
    }

    /// List a user's todos in one visibility class, ordered by priority
    /// with creation time as the tie-breaker.
    pub fn list_todos(&self, user_id: &str, filter: StatusFilter) -> Result<Vec<Todo>, ApiError> {
        let state = match filter {
            StatusFilter::Active => "AND is_deleted = 0 AND is_completed = 0",
            StatusFilter::Completed => "AND is_deleted = 0 AND is_completed = 1",
            StatusFilter::Deleted => "AND is_deleted = 1",
            StatusFilter::NotDeleted => "AND is_deleted = 0",
        };
        let sql = format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE user_id = ?1 {state} \
             ORDER BY priority ASC, created_at ASC"
        );

        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], todo_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Create a todo at the back of the ranking: priority is one past
    /// the highest among the owner's non-deleted todos, computed inside
    /// the insert transaction so concurrent creates cannot collide.
    pub fn create_todo(
        &self,
        user_id: &str,
        title: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<Todo, ApiError> {
        validate::validate_title(title)?;
        validate::validate_date(start_date)?;
        validate::validate_date(end_date)?;
        validate::validate_date_range(start_date, end_date)?;

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let now = now_utc();
        let todo = Todo {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
            priority: next_priority(&tx, user_id)?,
            is_completed: false,
            is_deleted: false,
            created_at: now.clone(),
            updated_at: now,
            deleted_at: None,
        };

        tx.execute(
            r#"INSERT INTO todos (id, user_id, title, start_date, end_date, priority,
               is_completed, is_deleted, created_at, updated_at, deleted_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 0, ?7, ?8, NULL)"#,
            params![
                &todo.id,
                &todo.user_id,
                &todo.title,
                &todo.start_date,
                &todo.end_date,
                todo.priority,
                &todo.created_at,
                &todo.updated_at,
            ],
        )?;
        tx.commit()?;

        Ok(todo)
    }

    /// Overwrite the supplied fields of a not-deleted todo. The merged
    /// start/end pair must still be a valid range.
    pub fn update_todo(
        &self,
        user_id: &str,
        todo_id: &str,
        title: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Todo, ApiError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let todo = fetch_todo(&tx, todo_id)?.ok_or(ApiError::NotFound)?;
        if todo.user_id != user_id {
            return Err(ApiError::Forbidden);
        }
        if todo.is_deleted {
            return Err(ApiError::BadRequest("Cannot modify a deleted todo"));
        }

        if let Some(title) = title {
            validate::validate_title(title)?;
        }
        if let Some(date) = start_date {
            validate::validate_date(date)?;
        }
        if let Some(date) = end_date {
            validate::validate_date(date)?;
        }

        let new_title = title.unwrap_or(&todo.title).to_string();
        let new_start = start_date.unwrap_or(&todo.start_date).to_string();
        let new_end = end_date.unwrap_or(&todo.end_date).to_string();
        validate::validate_date_range(&new_start, &new_end)?;

        let now = now_utc();
        tx.execute(
            "UPDATE todos SET title = ?2, start_date = ?3, end_date = ?4, updated_at = ?5 WHERE id = ?1",
            params![todo_id, &new_title, &new_start, &new_end, &now],
        )?;
        tx.commit()?;

        Ok(Todo {
            title: new_title,
            start_date: new_start,
            end_date: new_end,
            updated_at: now,
            ..todo
        })
    }

    /// Move a todo to the trash and close the gap it leaves in the
    /// ranking. Deleting a todo that is already in the trash is a no-op.
    pub fn soft_delete_todo(&self, user_id: &str, todo_id: &str) -> Result<Todo, ApiError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let todo = fetch_todo(&tx, todo_id)?.ok_or(ApiError::NotFound)?;
        if todo.user_id != user_id {
            return Err(ApiError::Forbidden);
        }
        if todo.is_deleted {
            return Ok(todo);
        }

        let now = now_utc();
        tx.execute(
            "UPDATE todos SET is_deleted = 1, deleted_at = ?2, updated_at = ?2 WHERE id = ?1",
            params![todo_id, &now],
        )?;
        tx.execute(
            "UPDATE todos SET priority = priority - 1, updated_at = ?3 \
             WHERE user_id = ?1 AND is_deleted = 0 AND priority > ?2",
            params![user_id, todo.priority, &now],
        )?;
        tx.commit()?;

        Ok(Todo {
            is_deleted: true,
            deleted_at: Some(now.clone()),
            updated_at: now,
            ..todo
        })
    }

    /// Bring a todo back from the trash. It re-enters the ranking at
    /// the back rather than reclaiming its old position, which may have
    /// been reassigned since.
    pub fn restore_todo(&self, user_id: &str, todo_id: &str) -> Result<Todo, ApiError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let todo = fetch_todo(&tx, todo_id)?.ok_or(ApiError::NotFound)?;
        if todo.user_id != user_id {
            return Err(ApiError::Forbidden);
        }
        if !todo.is_deleted {
            return Err(ApiError::BadRequest("Cannot restore a non-deleted todo"));
        }

        let priority = next_priority(&tx, user_id)?;
        let now = now_utc();
        tx.execute(
            "UPDATE todos SET is_deleted = 0, deleted_at = NULL, priority = ?2, updated_at = ?3 \
             WHERE id = ?1",
            params![todo_id, priority, &now],
        )?;
        tx.commit()?;

        Ok(Todo {
            priority,
            is_deleted: false,
            deleted_at: None,
            updated_at: now,
            ..todo
        })
    }

    /// Flip the completion flag of a not-deleted todo.
    pub fn toggle_complete_todo(&self, user_id: &str, todo_id: &str) -> Result<Todo, ApiError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let todo = fetch_todo(&tx, todo_id)?.ok_or(ApiError::NotFound)?;
        if todo.user_id != user_id {
            return Err(ApiError::Forbidden);
        }
        if todo.is_deleted {
            return Err(ApiError::BadRequest("Cannot complete a deleted todo"));
        }

        let is_completed = !todo.is_completed;
        let now = now_utc();
        tx.execute(
            "UPDATE todos SET is_completed = ?2, updated_at = ?3 WHERE id = ?1",
            params![todo_id, is_completed as i32, &now],
        )?;
        tx.commit()?;

        Ok(Todo {
            is_completed,
            updated_at: now,
            ..todo
        })
    }

    /// Move one todo to a new rank and shift every other non-deleted
    /// todo between the old and new position by one, as a single
    /// all-or-nothing transaction. A deleted todo is treated as missing
    /// here; requests past the end of the list land at the end.
    pub fn reorder_todo(
        &self,
        user_id: &str,
        todo_id: &str,
        new_priority: i64,
    ) -> Result<Todo, ApiError> {
        validate::validate_priority(new_priority)?;

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let todo = fetch_todo(&tx, todo_id)?.ok_or(ApiError::NotFound)?;
        if todo.user_id != user_id {
            return Err(ApiError::Forbidden);
        }
        if todo.is_deleted {
            return Err(ApiError::NotFound);
        }

        let count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM todos WHERE user_id = ?1 AND is_deleted = 0",
            params![user_id],
            |row| row.get(0),
        )?;
        let target = new_priority.min(count);
        let old = todo.priority;

        let now = now_utc();
        if target < old {
            tx.execute(
                "UPDATE todos SET priority = priority + 1, updated_at = ?4 \
                 WHERE user_id = ?1 AND is_deleted = 0 AND priority >= ?2 AND priority < ?3",
                params![user_id, target, old, &now],
            )?;
        } else if target > old {
            tx.execute(
                "UPDATE todos SET priority = priority - 1, updated_at = ?4 \
                 WHERE user_id = ?1 AND is_deleted = 0 AND priority > ?2 AND priority <= ?3",
                params![user_id, old, target, &now],
            )?;
        }
        tx.execute(
            "UPDATE todos SET priority = ?2, updated_at = ?3 WHERE id = ?1",
            params![todo_id, target, &now],
        )?;
        tx.commit()?;

        Ok(Todo {
            priority: target,
            updated_at: now,
            ..todo
        })
    }

    /// Irreversibly remove a todo that is already in the trash.
    pub fn permanent_delete_todo(&self, user_id: &str, todo_id: &str) -> Result<(), ApiError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let todo = fetch_todo(&tx, todo_id)?.ok_or(ApiError::NotFound)?;
        if todo.user_id != user_id {
            return Err(ApiError::Forbidden);
        }
        if !todo.is_deleted {
            return Err(ApiError::BadRequest(
                "Cannot permanently delete a non-deleted todo",
            ));
        }

        tx.execute("DELETE FROM todos WHERE id = ?1", params![todo_id])?;
        tx.commit()?;

        Ok(())
    }
}

/// One past the highest priority among the owner's non-deleted todos,
/// or 1 for an empty list. A full ranking reports a precondition
/// failure instead of tripping the storage CHECK.
fn next_priority(conn: &Connection, user_id: &str) -> Result<i64, ApiError> {
    let max: Option<i64> = conn.query_row(
        "SELECT MAX(priority) FROM todos WHERE user_id = ?1 AND is_deleted = 0",
        params![user_id],
        |row| row.get(0),
    )?;
    let max = max.unwrap_or(0);
    if max >= validate::PRIORITY_MAX {
        return Err(ApiError::BadRequest("Cannot exceed 999999 todos"));
    }
    Ok(max + 1)
}

fn fetch_todo(conn: &Connection, todo_id: &str) -> Result<Option<Todo>, ApiError> {
    let sql = format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = ?1");
    conn.query_row(&sql, params![todo_id], todo_from_row)
        .optional()
        .map_err(Into::into)
}

fn todo_from_row(row: &rusqlite::Row) -> rusqlite::Result<Todo> {
    Ok(Todo {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        start_date: row.get(3)?,
        end_date: row.get(4)?,
        priority: row.get(5)?,
        is_completed: row.get::<_, i32>(6)? != 0,
        is_deleted: row.get::<_, i32>(7)? != 0,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
        deleted_at: row.get(10)?,
    })
}

fn user_from_row(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        password_hash: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Fixed-width UTC timestamp, so lexicographic order is time order for
/// both the created_at tie-breaker and the date range checks.
fn now_utc() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
