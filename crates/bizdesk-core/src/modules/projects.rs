//! Projects and their task board.

use chrono::NaiveDate;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::aggregate::{ProjectSummary, project_summary};
use crate::model::{
    Project, ProjectPatch, Record, RecordId, Task, TaskPatch, TaskStatus,
};
use crate::session::SessionProvider;
use crate::store::RecordStore;
use crate::view_model::{EntityViewModel, group_by_status};

/// Projects and tasks, with an optional locally selected project that
/// narrows the board.
#[derive(Debug, Clone)]
pub struct ProjectBoard {
    projects: EntityViewModel<Project>,
    tasks: EntityViewModel<Task>,
    selected: Arc<Mutex<Option<RecordId>>>,
}

impl ProjectBoard {
    pub fn new(store: Arc<dyn RecordStore>, session: Arc<dyn SessionProvider>) -> Self {
        Self {
            projects: EntityViewModel::new(Arc::clone(&store), Arc::clone(&session)),
            tasks: EntityViewModel::new(store, session),
            selected: Arc::new(Mutex::new(None)),
        }
    }

    fn selection(&self) -> MutexGuard<'_, Option<RecordId>> {
        self.selected.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub const fn projects(&self) -> &EntityViewModel<Project> {
        &self.projects
    }

    #[must_use]
    pub const fn tasks(&self) -> &EntityViewModel<Task> {
        &self.tasks
    }

    pub async fn load(&self) -> bool {
        let projects = self.projects.load().await;
        let tasks = self.tasks.load().await;
        projects && tasks
    }

    pub async fn add_project(&self, project: Project) -> Option<Record<Project>> {
        self.projects.create(project).await
    }

    pub async fn update_project(&self, id: &RecordId, patch: ProjectPatch) -> bool {
        self.projects.update(id, patch).await
    }

    pub async fn add_task(&self, task: Task) -> Option<Record<Task>> {
        self.tasks.create(task).await
    }

    pub async fn update_task_status(&self, id: &RecordId, status: TaskStatus) -> bool {
        self.tasks
            .update(
                id,
                TaskPatch {
                    status: Some(status),
                    ..TaskPatch::default()
                },
            )
            .await
    }

    /// Narrow the board to one project. No store call; tasks are already
    /// loaded. Returns `false` if the project is not in the collection.
    pub fn select_project(&self, id: &RecordId) -> bool {
        if self.projects.find(id).is_none() {
            return false;
        }
        *self.selection() = Some(id.clone());
        true
    }

    pub fn clear_selection(&self) {
        *self.selection() = None;
    }

    #[must_use]
    pub fn selected_project(&self) -> Option<Record<Project>> {
        let id = self.selection().clone()?;
        self.projects.find(&id)
    }

    /// Tasks in view: the selected project's, or all when none is selected.
    #[must_use]
    pub fn visible_tasks(&self) -> Vec<Record<Task>> {
        let selected = self.selection().clone();
        let tasks = self.tasks.snapshot();
        match selected {
            Some(project) => tasks
                .into_iter()
                .filter(|task| task.fields.project_id == project)
                .collect(),
            None => tasks,
        }
    }

    /// Visible tasks as board columns in todo, in-progress, review, done
    /// order. Empty columns are included.
    #[must_use]
    pub fn board(&self) -> Vec<(TaskStatus, Vec<Record<Task>>)> {
        let mut groups = group_by_status(&self.visible_tasks());
        TaskStatus::ALL
            .iter()
            .map(|status| (*status, groups.remove(status).unwrap_or_default()))
            .collect()
    }

    /// Projects whose name or client contains `term`.
    #[must_use]
    pub fn filtered_projects(&self, term: &str) -> Vec<Record<Project>> {
        self.projects.search(term)
    }

    #[must_use]
    pub fn summary(&self, today: NaiveDate) -> ProjectSummary {
        project_summary(&self.projects.snapshot(), &self.tasks.snapshot(), today)
    }
}
