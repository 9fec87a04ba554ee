pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::bootstrap::{bootstrap_workspace, BootstrapResult};
pub use application::commands::{
    add_custom_session_impl, complete_session_impl, create_task_impl, day_overview_impl,
    delete_task_impl, edit_session_impl, get_settings_impl, list_sessions_impl, list_tasks_impl,
    reset_day_impl, set_task_completed_impl, skip_session_impl, start_day_impl,
    start_day_with_random_impl, update_settings_impl, AppState, DayOverviewResponse,
};
pub use domain::models::{ScheduleSettings, Session, SessionKind, Task};
pub use domain::planner::DayPlanner;
pub use domain::schedule::{
    current_session, generate, generate_with_durations, next_session, progress, RandomSource,
    SessionDurations, ThreadRandom,
};
pub use domain::time::{FormatError, TimeOfDay};
pub use infrastructure::clock::{Clock, FixedClock, SystemClock};
pub use infrastructure::error::InfraError;
