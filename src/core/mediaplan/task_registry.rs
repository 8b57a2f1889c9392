// In-memory progress tracking for generation runs.
//
// A generation takes minutes (six model calls plus the Google round trips), so
// callers get a task id up front and can poll it. Entries live for the
// lifetime of the process only.

use chrono::Utc;
use dashmap::DashMap;

use super::mediaplan_models::{TaskInfo, TaskStatus};

pub struct TaskRegistry {
    /// Maps task id -> latest progress
    tasks: DashMap<String, TaskInfo>,
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self {
            tasks: DashMap::new(),
        }
    }

    /// Registers a running task and returns its id,
    /// `task_{YYYYmmdd_HHMMSS}_{cohort}`.
    pub fn start(&self, cohort_name: &str) -> String {
        let now = Utc::now();
        let mut task_id = format!("task_{}_{}", now.format("%Y%m%d_%H%M%S"), cohort_name);

        // Two runs for the same cohort within one second.
        let mut n = 1;
        while self.tasks.contains_key(&task_id) {
            n += 1;
            task_id = format!("task_{}_{}_{}", now.format("%Y%m%d_%H%M%S"), cohort_name, n);
        }

        self.tasks.insert(
            task_id.clone(),
            TaskInfo {
                task_id: task_id.clone(),
                cohort_name: cohort_name.to_string(),
                status: TaskStatus::Running,
                progress: 0,
                message: "Starting mediaplan generation...".to_string(),
                google_slides_url: None,
                error: None,
                created_at: now,
                finished_at: None,
            },
        );
        task_id
    }

    pub fn progress(&self, task_id: &str, progress: u8, message: &str) {
        if let Some(mut task) = self.tasks.get_mut(task_id) {
            task.progress = progress.min(100);
            task.message = message.to_string();
        }
    }

    pub fn complete(&self, task_id: &str, url: &str) {
        if let Some(mut task) = self.tasks.get_mut(task_id) {
            task.status = TaskStatus::Completed;
            task.progress = 100;
            task.message = "Mediaplan generated successfully".to_string();
            task.google_slides_url = Some(url.to_string());
            task.finished_at = Some(Utc::now());
        }
    }

    /// Marks the task failed; progress stays where the failure happened.
    pub fn fail(&self, task_id: &str, error: &str) {
        if let Some(mut task) = self.tasks.get_mut(task_id) {
            task.status = TaskStatus::Failed;
            task.message = format!("Error: {}", error);
            task.error = Some(error.to_string());
            task.finished_at = Some(Utc::now());
        }
    }

    pub fn get(&self, task_id: &str) -> Option<TaskInfo> {
        self.tasks.get(task_id).map(|entry| entry.value().clone())
    }

    /// All tasks, oldest first.
    pub fn list(&self) -> Vec<TaskInfo> {
        let mut tasks: Vec<TaskInfo> = self.tasks.iter().map(|e| e.value().clone()).collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.task_id.cmp(&b.task_id)));
        tasks
    }
}
