//! In-memory task collection.

use crate::backend::{Task, TaskStatus};

/// Ordered task list with unique ids.
///
/// Inserting a task whose id is already present replaces the record in place,
/// so the last write wins and the list never holds duplicates.
#[derive(Debug, Default, Clone)]
pub struct TaskCache {
    tasks: Vec<Task>,
}

impl TaskCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn with_status(&self, status: TaskStatus) -> Vec<Task> {
        self.tasks.iter().filter(|task| task.status == status).cloned().collect()
    }

    pub fn count(&self, status: TaskStatus) -> usize {
        self.tasks.iter().filter(|task| task.status == status).count()
    }

    /// Insert or replace by id
    pub fn upsert(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|task| task.id == id)?;
        Some(self.tasks.remove(index))
    }

    /// Swap the record `old_id` for `task`, which may carry a different id
    pub fn replace(&mut self, old_id: &str, task: Task) {
        if old_id != task.id {
            self.tasks.retain(|existing| existing.id != task.id);
        }
        match self.tasks.iter_mut().find(|existing| existing.id == old_id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
    }

    /// Replace every task of `status` with `tasks`.
    ///
    /// A record already cached under another status is moved, not duplicated.
    pub fn replace_status(&mut self, status: TaskStatus, tasks: Vec<Task>) {
        self.tasks.retain(|task| task.status != status);
        for task in tasks {
            self.upsert(task);
        }
    }

    /// Replace the whole collection
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks.clear();
        for task in tasks {
            self.upsert(task);
        }
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, status: TaskStatus) -> Task {
        Task {
            id: id.to_string(),
            title: format!("task {}", id),
            description: String::new(),
            start_date: None,
            end_date: None,
            status,
        }
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut cache = TaskCache::new();
        cache.upsert(task("1", TaskStatus::Pending));
        cache.upsert(task("2", TaskStatus::Pending));
        cache.upsert(task("1", TaskStatus::Completed));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.all()[0].id, "1");
        assert_eq!(cache.all()[0].status, TaskStatus::Completed);
    }

    #[test]
    fn replace_status_keeps_other_lists() {
        let mut cache = TaskCache::new();
        cache.upsert(task("1", TaskStatus::Pending));
        cache.upsert(task("2", TaskStatus::Completed));

        cache.replace_status(TaskStatus::Pending, vec![task("3", TaskStatus::Pending)]);

        assert_eq!(cache.with_status(TaskStatus::Pending).len(), 1);
        assert_eq!(cache.with_status(TaskStatus::Pending)[0].id, "3");
        assert_eq!(cache.count(TaskStatus::Completed), 1);
    }

    #[test]
    fn replace_status_moves_records_between_lists() {
        let mut cache = TaskCache::new();
        cache.upsert(task("1", TaskStatus::Pending));

        cache.replace_status(TaskStatus::Completed, vec![task("1", TaskStatus::Completed)]);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.count(TaskStatus::Pending), 0);
        assert_eq!(cache.count(TaskStatus::Completed), 1);
    }

    #[test]
    fn replace_with_new_id_drops_duplicates() {
        let mut cache = TaskCache::new();
        cache.upsert(task("tmp", TaskStatus::Pending));
        cache.upsert(task("42", TaskStatus::Pending));

        cache.replace("tmp", task("42", TaskStatus::InProgress));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.all()[0].status, TaskStatus::InProgress);
    }
}
