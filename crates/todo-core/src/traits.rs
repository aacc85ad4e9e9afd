use crate::{
    error::TodoError,
    task::{NewTask, Task},
};
use async_trait::async_trait;

/// Task storage trait, the seam between request handling and persistence.
///
/// Implementations own id assignment and ordering; callers validate fields
/// before they reach the store.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert a task and return its newly assigned id.
    async fn insert_task(&self, task: &NewTask) -> Result<i64, TodoError>;

    /// Fetch one task. Fails with [`TodoError::NotFound`] if no row matches.
    async fn get_task(&self, id: i64) -> Result<Task, TodoError>;

    /// Whether a task with this id exists.
    async fn task_exists(&self, id: i64) -> Result<bool, TodoError>;

    /// Replace every field of an existing task. The id never changes.
    async fn update_task(&self, id: i64, task: &NewTask) -> Result<(), TodoError>;

    /// Up to `limit` tasks, earliest date first. Empty when there are none.
    async fn list_upcoming(&self, limit: u32) -> Result<Vec<Task>, TodoError>;
}
