use crate::application::bootstrap::bootstrap_workspace;
use crate::domain::models::{ScheduleSettings, Session, Task};
use crate::domain::planner::DayPlanner;
use crate::domain::schedule::{RandomSource, ThreadRandom};
use crate::infrastructure::clock::{Clock, SystemClock};
use crate::infrastructure::config::{read_schedule_settings, read_timezone, save_schedule_settings};
use crate::infrastructure::error::InfraError;
use crate::infrastructure::session_repository::{SessionRepository, SqliteSessionRepository};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_id(prefix: &str) -> String {
    let sequence = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{}-{sequence}", Utc::now().timestamp_micros())
}

pub struct AppState {
    config_dir: PathBuf,
    logs_dir: PathBuf,
    clock: Box<dyn Clock>,
    session_repository: Box<dyn SessionRepository>,
    runtime: Mutex<RuntimeState>,
    log_guard: Mutex<()>,
}

impl AppState {
    /// Bootstraps `workspace_root` and restores the last saved day plan.
    pub fn new(workspace_root: PathBuf) -> Result<Self, InfraError> {
        let bootstrap = bootstrap_workspace(&workspace_root)?;
        let timezone = read_timezone(&bootstrap.config_dir)?;
        let session_repository = SqliteSessionRepository::new(&bootstrap.database_path);
        let planner = session_repository.load()?.unwrap_or_default();

        Ok(Self {
            config_dir: bootstrap.config_dir,
            logs_dir: bootstrap.logs_dir,
            clock: Box::new(SystemClock::new(timezone.as_deref())),
            session_repository: Box::new(session_repository),
            runtime: Mutex::new(RuntimeState {
                planner,
                ..RuntimeState::default()
            }),
            log_guard: Mutex::new(()),
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn command_error(&self, command: &str, error: &InfraError) -> String {
        self.log_error(command, &error.to_string());
        error.to_string()
    }

    pub fn log_info(&self, command: &str, message: &str) {
        self.append_log("info", command, message);
    }

    pub fn log_error(&self, command: &str, message: &str) {
        self.append_log("error", command, message);
    }

    fn append_log(&self, level: &str, command: &str, message: &str) {
        let Ok(_guard) = self.log_guard.lock() else {
            return;
        };
        let path = self.logs_dir.join("commands.log");
        let payload = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "level": level,
            "command": command,
            "message": message,
        });

        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let _ = writeln!(file, "{}", payload);
        }
    }
}

#[derive(Debug, Default)]
struct RuntimeState {
    planner: DayPlanner,
    tasks: HashMap<String, Task>,
    task_order: Vec<String>,
}

impl RuntimeState {
    fn ordered_tasks(&self) -> Vec<Task> {
        self.task_order
            .iter()
            .filter_map(|task_id| self.tasks.get(task_id).cloned())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DayOverviewResponse {
    pub started: bool,
    pub now: String,
    pub current: Option<Session>,
    pub next: Option<Session>,
    pub progress: u32,
    pub total_sessions: usize,
}

pub fn get_settings_impl(state: &AppState) -> Result<ScheduleSettings, InfraError> {
    read_schedule_settings(state.config_dir())
}

pub fn update_settings_impl(
    state: &AppState,
    day_start: Option<String>,
    day_end: Option<String>,
    auto_breaks_enabled: Option<bool>,
) -> Result<ScheduleSettings, InfraError> {
    let mut settings = read_schedule_settings(state.config_dir())?;
    if let Some(day_start) = day_start {
        settings.day_start = day_start.trim().to_string();
    }
    if let Some(day_end) = day_end {
        settings.day_end = day_end.trim().to_string();
    }
    if let Some(enabled) = auto_breaks_enabled {
        settings.auto_breaks_enabled = enabled;
    }

    save_schedule_settings(state.config_dir(), &settings)?;
    state.log_info(
        "update_settings",
        &format!(
            "day={}-{} auto_breaks={}",
            settings.day_start, settings.day_end, settings.auto_breaks_enabled
        ),
    );
    Ok(settings)
}

pub fn create_task_impl(state: &AppState, title: String) -> Result<Task, InfraError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(InfraError::InvalidConfig(
            "title must not be empty".to_string(),
        ));
    }

    let task = Task {
        id: next_id("tsk"),
        title: title.to_string(),
        completed: false,
        created_at: Utc::now(),
    };

    {
        let mut runtime = lock_runtime(state)?;
        runtime.task_order.push(task.id.clone());
        runtime.tasks.insert(task.id.clone(), task.clone());
    }

    state.log_info("create_task", &format!("created task_id={}", task.id));
    Ok(task)
}

pub fn list_tasks_impl(state: &AppState) -> Result<Vec<Task>, InfraError> {
    let runtime = lock_runtime(state)?;
    Ok(runtime.ordered_tasks())
}

pub fn set_task_completed_impl(
    state: &AppState,
    task_id: String,
    completed: bool,
) -> Result<Task, InfraError> {
    let task_id = normalize_task_id(&task_id)?;
    let mut runtime = lock_runtime(state)?;
    let Some(task) = runtime.tasks.get_mut(task_id) else {
        return Err(InfraError::NotFound(format!("task {task_id}")));
    };
    task.completed = completed;
    let updated = task.clone();
    drop(runtime);

    state.log_info(
        "set_task_completed",
        &format!("task_id={task_id} completed={completed}"),
    );
    Ok(updated)
}

pub fn delete_task_impl(state: &AppState, task_id: String) -> Result<bool, InfraError> {
    let task_id = normalize_task_id(&task_id)?;
    let mut runtime = lock_runtime(state)?;
    let removed = runtime.tasks.remove(task_id).is_some();
    if !removed {
        return Ok(false);
    }
    runtime.task_order.retain(|candidate| candidate != task_id);
    drop(runtime);

    state.log_info("delete_task", &format!("deleted task_id={task_id}"));
    Ok(true)
}

pub fn start_day_impl(state: &AppState) -> Result<Vec<Session>, InfraError> {
    start_day_with_random_impl(state, &mut ThreadRandom)
}

pub fn start_day_with_random_impl(
    state: &AppState,
    random: &mut dyn RandomSource,
) -> Result<Vec<Session>, InfraError> {
    let settings = read_schedule_settings(state.config_dir())?;
    let mut runtime = lock_runtime(state)?;
    let tasks = runtime.ordered_tasks();
    let sessions = runtime.planner.start(&settings, &tasks, random)?.to_vec();
    state.session_repository.save(&runtime.planner)?;
    drop(runtime);

    state.log_info(
        "start_day",
        &format!(
            "generated {} sessions for {}-{} (auto_breaks={})",
            sessions.len(),
            settings.day_start,
            settings.day_end,
            settings.auto_breaks_enabled
        ),
    );
    Ok(sessions)
}

pub fn reset_day_impl(state: &AppState) -> Result<(), InfraError> {
    let mut runtime = lock_runtime(state)?;
    runtime.planner.reset();
    state.session_repository.save(&runtime.planner)?;
    drop(runtime);

    state.log_info("reset_day", "cleared sessions");
    Ok(())
}

pub fn list_sessions_impl(state: &AppState) -> Result<Vec<Session>, InfraError> {
    let runtime = lock_runtime(state)?;
    Ok(runtime.planner.sessions().to_vec())
}

pub fn complete_session_impl(state: &AppState, session_id: u32) -> Result<Session, InfraError> {
    update_session(state, "complete_session", session_id, |planner| {
        planner.mark_completed(session_id).cloned()
    })
}

pub fn skip_session_impl(state: &AppState, session_id: u32) -> Result<Session, InfraError> {
    update_session(state, "skip_session", session_id, |planner| {
        planner.mark_skipped(session_id).cloned()
    })
}

pub fn edit_session_impl(
    state: &AppState,
    session_id: u32,
    title: String,
    start_time: String,
    end_time: String,
) -> Result<Session, InfraError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(InfraError::InvalidConfig(
            "title must not be empty".to_string(),
        ));
    }

    let mut runtime = lock_runtime(state)?;
    let Some(edited) = runtime
        .planner
        .edit(session_id, title, start_time.trim(), end_time.trim())?
        .cloned()
    else {
        return Err(InfraError::NotFound(format!("session {session_id}")));
    };
    state.session_repository.save(&runtime.planner)?;
    drop(runtime);

    state.log_info(
        "edit_session",
        &format!(
            "session_id={session_id} {}-{}",
            edited.start_time, edited.end_time
        ),
    );
    Ok(edited)
}

pub fn add_custom_session_impl(
    state: &AppState,
    title: Option<String>,
) -> Result<Session, InfraError> {
    let settings = read_schedule_settings(state.config_dir())?;
    let mut runtime = lock_runtime(state)?;
    let appended = runtime
        .planner
        .append_custom(title.as_deref(), &settings.day_start)?
        .clone();
    state.session_repository.save(&runtime.planner)?;
    drop(runtime);

    state.log_info(
        "add_custom_session",
        &format!(
            "added session_id={} at {}",
            appended.id, appended.start_time
        ),
    );
    Ok(appended)
}

pub fn day_overview_impl(state: &AppState) -> Result<DayOverviewResponse, InfraError> {
    let now = state.clock.now();
    let runtime = lock_runtime(state)?;
    let planner = &runtime.planner;
    Ok(DayOverviewResponse {
        started: planner.is_started(),
        now: now.format(),
        current: planner.current(now).cloned(),
        next: planner.next(now).cloned(),
        progress: planner.progress(),
        total_sessions: planner.sessions().len(),
    })
}

fn update_session<F>(
    state: &AppState,
    command: &str,
    session_id: u32,
    apply: F,
) -> Result<Session, InfraError>
where
    F: FnOnce(&mut DayPlanner) -> Option<Session>,
{
    let mut runtime = lock_runtime(state)?;
    let Some(updated) = apply(&mut runtime.planner) else {
        return Err(InfraError::NotFound(format!("session {session_id}")));
    };
    state.session_repository.save(&runtime.planner)?;
    drop(runtime);

    state.log_info(command, &format!("session_id={session_id}"));
    Ok(updated)
}

fn lock_runtime(state: &AppState) -> Result<MutexGuard<'_, RuntimeState>, InfraError> {
    state
        .runtime
        .lock()
        .map_err(|error| InfraError::InvalidConfig(format!("runtime lock poisoned: {error}")))
}

fn normalize_task_id(task_id: &str) -> Result<&str, InfraError> {
    let task_id = task_id.trim();
    if task_id.is_empty() {
        return Err(InfraError::InvalidConfig(
            "task_id must not be empty".to_string(),
        ));
    }
    Ok(task_id)
}
