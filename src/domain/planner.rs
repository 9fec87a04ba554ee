use crate::domain::models::{ScheduleSettings, Session, SessionKind, Task};
use crate::domain::schedule::{self, CUSTOM_SESSION_MINUTES, RandomSource, SessionDurations};
use crate::domain::time::{FormatError, TimeOfDay};
use serde::{Deserialize, Serialize};

pub const CUSTOM_SESSION_TITLE: &str = "Custom Session";

/// The session list for one day plus whether the day has been started.
///
/// Every operation edits this value in place; nothing is shared behind it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayPlanner {
    sessions: Vec<Session>,
    started: bool,
}

impl DayPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn restore(sessions: Vec<Session>, started: bool) -> Self {
        Self { sessions, started }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn session(&self, session_id: u32) -> Option<&Session> {
        self.sessions.iter().find(|session| session.id == session_id)
    }

    /// Replaces the whole list with a fresh generation pass.
    ///
    /// On a malformed window the planner is left as it was.
    pub fn start(
        &mut self,
        settings: &ScheduleSettings,
        tasks: &[Task],
        random: &mut dyn RandomSource,
    ) -> Result<&[Session], FormatError> {
        self.start_with_durations(&SessionDurations::default(), settings, tasks, random)
    }

    pub fn start_with_durations(
        &mut self,
        durations: &SessionDurations,
        settings: &ScheduleSettings,
        tasks: &[Task],
        random: &mut dyn RandomSource,
    ) -> Result<&[Session], FormatError> {
        let sessions = schedule::generate_with_durations(
            durations,
            &settings.day_start,
            &settings.day_end,
            settings.auto_breaks_enabled,
            tasks,
            random,
        )?;
        self.sessions = sessions;
        self.started = true;
        Ok(&self.sessions)
    }

    pub fn reset(&mut self) {
        self.sessions.clear();
        self.started = false;
    }

    pub fn mark_completed(&mut self, session_id: u32) -> Option<&Session> {
        let session = self.session_mut(session_id)?;
        session.completed = true;
        Some(&*session)
    }

    pub fn mark_skipped(&mut self, session_id: u32) -> Option<&Session> {
        let session = self.session_mut(session_id)?;
        session.skipped = true;
        Some(&*session)
    }

    /// Overwrites title and times. Neighbouring sessions are not re-checked for
    /// overlap.
    pub fn edit(
        &mut self,
        session_id: u32,
        title: &str,
        start_time: &str,
        end_time: &str,
    ) -> Result<Option<&Session>, FormatError> {
        let start_time = TimeOfDay::parse(start_time)?;
        let end_time = TimeOfDay::parse(end_time)?;
        let Some(session) = self.session_mut(session_id) else {
            return Ok(None);
        };
        session.title = title.to_string();
        session.start_time = start_time;
        session.end_time = end_time;
        Ok(Some(&*session))
    }

    /// Appends a 30 minute focus session after the last one, or at `day_start`
    /// for an empty list.
    pub fn append_custom(
        &mut self,
        title: Option<&str>,
        day_start: &str,
    ) -> Result<&Session, FormatError> {
        let start_time = match self.sessions.last() {
            Some(last) => last.end_time,
            None => TimeOfDay::parse(day_start)?,
        };
        let title = title
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| {
                format!("{} {}", SessionKind::Focus.icon(), CUSTOM_SESSION_TITLE)
            });
        let next_id = self
            .sessions
            .iter()
            .map(|session| session.id)
            .max()
            .unwrap_or(0)
            + 1;

        self.sessions.push(Session::new(
            next_id,
            title,
            SessionKind::Focus,
            start_time,
            start_time.add_minutes(CUSTOM_SESSION_MINUTES),
        ));
        self.started = true;
        let index = self.sessions.len() - 1;
        Ok(&self.sessions[index])
    }

    pub fn current(&self, now: TimeOfDay) -> Option<&Session> {
        schedule::current_session(&self.sessions, now)
    }

    pub fn next(&self, now: TimeOfDay) -> Option<&Session> {
        schedule::next_session(&self.sessions, now)
    }

    pub fn progress(&self) -> u32 {
        schedule::progress(&self.sessions)
    }

    fn session_mut(&mut self, session_id: u32) -> Option<&mut Session> {
        self.sessions
            .iter_mut()
            .find(|session| session.id == session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(value: &str) -> TimeOfDay {
        TimeOfDay::parse(value).expect("valid time")
    }

    fn settings(day_start: &str, day_end: &str) -> ScheduleSettings {
        ScheduleSettings {
            day_start: day_start.to_string(),
            day_end: day_end.to_string(),
            auto_breaks_enabled: false,
        }
    }

    fn started_planner() -> DayPlanner {
        let mut planner = DayPlanner::new();
        planner
            .start(&settings("09:00", "11:00"), &[], &mut || 0.99)
            .expect("start day");
        planner
    }

    #[test]
    fn start_replaces_sessions_wholesale() {
        let mut planner = started_planner();
        assert!(planner.is_started());
        assert_eq!(planner.sessions().len(), 4);
        planner.mark_completed(1).expect("session exists");

        let sessions = planner
            .start(&settings("09:00", "10:00"), &[], &mut || 0.99)
            .expect("restart day");
        assert_eq!(sessions.len(), 2);
        assert!(sessions.iter().all(|session| !session.completed));
    }

    #[test]
    fn start_with_bad_window_keeps_previous_state() {
        let mut planner = started_planner();
        let before = planner.clone();
        let error = planner
            .start(&settings("09:00", "late"), &[], &mut || 0.99)
            .expect_err("invalid end");
        assert_eq!(error.value, "late");
        assert_eq!(planner, before);
    }

    #[test]
    fn reset_returns_to_unstarted() {
        let mut planner = started_planner();
        planner.reset();
        assert!(!planner.is_started());
        assert!(planner.sessions().is_empty());
        assert_eq!(planner.progress(), 0);
    }

    #[test]
    fn marking_touches_only_the_target_session() {
        let mut planner = started_planner();
        let completed = planner.mark_completed(2).expect("session exists");
        assert!(completed.completed);
        assert!(!completed.skipped);
        assert!(
            planner
                .sessions()
                .iter()
                .filter(|session| session.id != 2)
                .all(|session| !session.completed && !session.skipped)
        );
        assert!(planner.mark_skipped(99).is_none());
    }

    #[test]
    fn completed_and_skipped_can_both_be_set() {
        let mut planner = started_planner();
        planner.mark_completed(1).expect("session exists");
        let session = planner.mark_skipped(1).expect("session exists");
        assert!(session.completed);
        assert!(session.skipped);
        assert_eq!(planner.progress(), 25);
    }

    #[test]
    fn edit_allows_overlapping_times() {
        let mut planner = started_planner();
        let edited = planner
            .edit(3, "Deep work", "09:30", "10:45")
            .expect("valid times")
            .expect("session exists");
        assert_eq!(edited.title, "Deep work");
        assert_eq!(edited.start_time, time("09:30"));
        assert_eq!(edited.end_time, time("10:45"));
        assert_eq!(planner.session(2).map(|session| session.end_time), Some(time("10:00")));

        assert!(planner.edit(3, "Deep work", "9h", "10:45").is_err());
        assert_eq!(planner.edit(42, "Missing", "09:00", "09:30"), Ok(None));
    }

    #[test]
    fn append_custom_follows_last_session() {
        let mut planner = started_planner();
        let appended = planner
            .append_custom(Some("  Review notes "), "09:00")
            .expect("append");
        assert_eq!(appended.id, 5);
        assert_eq!(appended.kind, SessionKind::Focus);
        assert_eq!(appended.title, "Review notes");
        assert_eq!(appended.start_time, time("11:00"));
        assert_eq!(appended.end_time, time("11:30"));
    }

    #[test]
    fn append_custom_on_empty_list_starts_at_day_start() {
        let mut planner = DayPlanner::new();
        let appended = planner.append_custom(None, "08:15").expect("append");
        assert_eq!(appended.id, 1);
        assert!(appended.title.ends_with(CUSTOM_SESSION_TITLE));
        assert_eq!(appended.start_time, time("08:15"));
        assert_eq!(appended.end_time, time("08:45"));
        assert!(planner.is_started());

        let mut empty = DayPlanner::new();
        assert!(empty.append_custom(None, "eight").is_err());
        assert!(empty.sessions().is_empty());
    }

    #[test]
    fn append_custom_past_midnight_keeps_unwrapped_hour() {
        let mut planner = DayPlanner::new();
        let appended = planner.append_custom(None, "23:45").expect("append");
        assert_eq!(appended.end_time.format(), "24:15");
    }

    #[test]
    fn queries_delegate_to_current_sessions() {
        let mut planner = started_planner();
        assert_eq!(planner.current(time("09:10")).map(|session| session.id), Some(1));
        assert_eq!(planner.next(time("09:10")).map(|session| session.id), Some(2));
        planner.mark_skipped(1).expect("session exists");
        assert!(planner.current(time("09:10")).is_none());
    }
}
