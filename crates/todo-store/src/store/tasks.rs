//! Task CRUD on the `scheduler` table.

use super::Store;
use async_trait::async_trait;
use todo_core::error::TodoError;
use todo_core::task::{NewTask, Task};
use todo_core::traits::TaskStore;
use tracing::debug;

/// Row shape: (id, date, title, comment, repeat).
type TaskRow = (i64, String, String, Option<String>, Option<String>);

fn task_from_row((id, date, title, comment, repeat): TaskRow) -> Task {
    Task::from_fields(
        id,
        NewTask {
            date,
            title,
            comment: comment.unwrap_or_default(),
            repeat: repeat.unwrap_or_default(),
        },
    )
}

#[async_trait]
impl TaskStore for Store {
    async fn insert_task(&self, task: &NewTask) -> Result<i64, TodoError> {
        let result = sqlx::query(
            "INSERT INTO scheduler (date, title, comment, repeat) VALUES (?, ?, ?, ?)",
        )
        .bind(&task.date)
        .bind(&task.title)
        .bind(&task.comment)
        .bind(&task.repeat)
        .execute(&self.pool)
        .await
        .map_err(|e| TodoError::Storage(format!("insert task failed: {e}")))?;

        let id = result.last_insert_rowid();
        debug!("inserted task {id} dated {}", task.date);
        Ok(id)
    }

    async fn get_task(&self, id: i64) -> Result<Task, TodoError> {
        let row: Option<TaskRow> = sqlx::query_as(
            "SELECT id, date, title, comment, repeat FROM scheduler WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| TodoError::Storage(format!("get task failed: {e}")))?;

        row.map(task_from_row).ok_or(TodoError::NotFound(id))
    }

    async fn task_exists(&self, id: i64) -> Result<bool, TodoError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM scheduler WHERE id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| TodoError::Storage(format!("task exists check failed: {e}")))?;

        Ok(count > 0)
    }

    async fn update_task(&self, id: i64, task: &NewTask) -> Result<(), TodoError> {
        let result = sqlx::query(
            "UPDATE scheduler SET date = ?, title = ?, comment = ?, repeat = ? WHERE id = ?",
        )
        .bind(&task.date)
        .bind(&task.title)
        .bind(&task.comment)
        .bind(&task.repeat)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| TodoError::Storage(format!("update task failed: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(TodoError::NotFound(id));
        }
        debug!("updated task {id}");
        Ok(())
    }

    async fn list_upcoming(&self, limit: u32) -> Result<Vec<Task>, TodoError> {
        let rows: Vec<TaskRow> = sqlx::query_as(
            "SELECT id, date, title, comment, repeat FROM scheduler \
             ORDER BY date ASC, id ASC \
             LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| TodoError::Storage(format!("list tasks failed: {e}")))?;

        Ok(rows.into_iter().map(task_from_row).collect())
    }
}
