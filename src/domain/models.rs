use crate::domain::time::{FormatError, TimeOfDay};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DAY_START: &str = "09:00";
pub const DEFAULT_DAY_END: &str = "17:00";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Focus,
    Break,
    Lunch,
    Task,
}

impl SessionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::Break => "break",
            Self::Lunch => "lunch",
            Self::Task => "task",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "focus" => Some(Self::Focus),
            "break" => Some(Self::Break),
            "lunch" => Some(Self::Lunch),
            "task" => Some(Self::Task),
            _ => None,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Focus => "#4A90E2",
            Self::Break => "#50C878",
            Self::Lunch => "#FF9500",
            Self::Task => "#9B59B6",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Focus => "🎯",
            Self::Break => "☕",
            Self::Lunch => "🍽️",
            Self::Task => "📋",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub id: u32,
    pub title: String,
    pub kind: SessionKind,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub completed: bool,
    pub skipped: bool,
    pub task_id: Option<String>,
}

impl Session {
    pub fn new(
        id: u32,
        title: impl Into<String>,
        kind: SessionKind,
        start_time: TimeOfDay,
        end_time: TimeOfDay,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            kind,
            start_time,
            end_time,
            completed: false,
            skipped: false,
            task_id: None,
        }
    }

    pub fn color(&self) -> &'static str {
        self.kind.color()
    }

    pub fn duration_minutes(&self) -> u32 {
        self.end_time.minutes_since(self.start_time)
    }

    /// Completed and skipped sessions no longer count as upcoming work.
    pub fn is_settled(&self) -> bool {
        self.completed || self.skipped
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.title, "session.title")?;
        if self.end_time <= self.start_time {
            return Err("session.end_time must be after session.start_time".to_string());
        }
        match (self.kind, self.task_id.as_deref()) {
            (SessionKind::Task, None) => {
                Err("session.task_id is required for task sessions".to_string())
            }
            (SessionKind::Task, Some(task_id)) => validate_non_empty(task_id, "session.task_id"),
            (_, Some(_)) => Err("session.task_id is only allowed on task sessions".to_string()),
            (_, None) => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.id, "task.id")?;
        validate_non_empty(&self.title, "task.title")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSettings {
    pub day_start: String,
    pub day_end: String,
    pub auto_breaks_enabled: bool,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            day_start: DEFAULT_DAY_START.to_string(),
            day_end: DEFAULT_DAY_END.to_string(),
            auto_breaks_enabled: true,
        }
    }
}

impl ScheduleSettings {
    pub fn validate(&self) -> Result<(), FormatError> {
        self.window().map(|_| ())
    }

    pub fn window(&self) -> Result<(TimeOfDay, TimeOfDay), FormatError> {
        Ok((
            TimeOfDay::parse(&self.day_start)?,
            TimeOfDay::parse(&self.day_end)?,
        ))
    }
}

fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field_name} must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(value: &str) -> TimeOfDay {
        TimeOfDay::parse(value).expect("valid time")
    }

    fn fixed_time(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid datetime")
            .with_timezone(&Utc)
    }

    fn sample_session() -> Session {
        Session::new(1, "🎯 Focus Session", SessionKind::Focus, time("09:00"), time("09:50"))
    }

    fn sample_task() -> Task {
        Task {
            id: "tsk-1".to_string(),
            title: "Write tests".to_string(),
            completed: false,
            created_at: fixed_time("2026-02-16T08:00:00Z"),
        }
    }

    #[test]
    fn session_validate_accepts_valid_session() {
        let session = sample_session();
        assert!(session.validate().is_ok());
        assert_eq!(session.duration_minutes(), 50);
        assert_eq!(session.color(), "#4A90E2");
    }

    #[test]
    fn session_validate_rejects_invalid_range() {
        let mut session = sample_session();
        session.end_time = session.start_time;
        assert!(session.validate().is_err());
    }

    #[test]
    fn session_validate_checks_task_reference() {
        let mut session = sample_session();
        session.task_id = Some("tsk-1".to_string());
        assert!(session.validate().is_err());

        session.kind = SessionKind::Task;
        assert!(session.validate().is_ok());

        session.task_id = None;
        assert!(session.validate().is_err());
    }

    #[test]
    fn task_validate_rejects_empty_title() {
        let mut task = sample_task();
        task.title = "   ".to_string();
        assert!(task.validate().is_err());
    }

    #[test]
    fn kind_colors_are_distinct_and_parse_back() {
        let kinds = [
            SessionKind::Focus,
            SessionKind::Break,
            SessionKind::Lunch,
            SessionKind::Task,
        ];
        for kind in kinds {
            assert_eq!(SessionKind::parse(kind.as_str()), Some(kind));
            assert_eq!(
                kinds.iter().filter(|other| other.color() == kind.color()).count(),
                1
            );
        }
        assert_eq!(SessionKind::parse("nap"), None);
    }

    #[test]
    fn settings_validate_reports_malformed_times() {
        assert!(ScheduleSettings::default().validate().is_ok());

        let settings = ScheduleSettings {
            day_start: "nine".to_string(),
            ..ScheduleSettings::default()
        };
        let error = settings.validate().expect_err("invalid start");
        assert_eq!(error.value, "nine");
    }

    #[test]
    fn domain_models_support_serde_roundtrip() {
        let mut session = sample_session();
        session.completed = true;
        let task = sample_task();
        let settings = ScheduleSettings::default();

        let encoded = serde_json::to_value(&session).expect("serialize session");
        assert_eq!(encoded["kind"], "focus");
        assert_eq!(encoded["start_time"], "09:00");

        let session_roundtrip: Session =
            serde_json::from_value(encoded).expect("deserialize session");
        let task_roundtrip: Task =
            serde_json::from_str(&serde_json::to_string(&task).expect("serialize task"))
                .expect("deserialize task");
        let settings_roundtrip: ScheduleSettings = serde_json::from_str(
            &serde_json::to_string(&settings).expect("serialize settings"),
        )
        .expect("deserialize settings");

        assert_eq!(session_roundtrip, session);
        assert_eq!(task_roundtrip, task);
        assert_eq!(settings_roundtrip, settings);
    }
}
