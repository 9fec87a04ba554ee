use crate::domain::models::{Session, SessionKind, Task};
use crate::domain::time::{FormatError, TimeOfDay};
use rand::Rng;
use std::collections::VecDeque;

pub const FOCUS_MINUTES: u32 = 50;
pub const TASK_MINUTES: u32 = 30;
pub const LUNCH_MINUTES: u32 = 60;
pub const AUTO_BREAK_MINUTES: u32 = 10;
pub const BUFFER_BREAK_MINUTES: u32 = 10;
pub const CUSTOM_SESSION_MINUTES: u32 = 30;

const LUNCH_HOUR: u32 = 12;
const AUTO_BREAK_CYCLE_MINUTES: u32 = 120;
const AUTO_BREAK_OFFSET_MINUTES: u32 = 110;
const TASK_PROBABILITY: f64 = 0.3;

/// Uniform random values in `[0, 1)` used to decide between task and focus slots.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&mut self) -> f64 {
        rand::thread_rng().r#gen::<f64>()
    }
}

impl<F> RandomSource for F
where
    F: FnMut() -> f64,
{
    fn next_unit(&mut self) -> f64 {
        self()
    }
}

/// Session lengths used by the generator. Every length is non-zero, so each
/// generated session moves the cursor forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionDurations {
    focus_minutes: u32,
    task_minutes: u32,
    lunch_minutes: u32,
    auto_break_minutes: u32,
    buffer_break_minutes: u32,
}

impl Default for SessionDurations {
    fn default() -> Self {
        Self {
            focus_minutes: FOCUS_MINUTES,
            task_minutes: TASK_MINUTES,
            lunch_minutes: LUNCH_MINUTES,
            auto_break_minutes: AUTO_BREAK_MINUTES,
            buffer_break_minutes: BUFFER_BREAK_MINUTES,
        }
    }
}

impl SessionDurations {
    pub fn new(
        focus_minutes: u32,
        task_minutes: u32,
        lunch_minutes: u32,
        auto_break_minutes: u32,
        buffer_break_minutes: u32,
    ) -> Result<Self, String> {
        let durations = [
            (focus_minutes, "focus_minutes"),
            (task_minutes, "task_minutes"),
            (lunch_minutes, "lunch_minutes"),
            (auto_break_minutes, "auto_break_minutes"),
            (buffer_break_minutes, "buffer_break_minutes"),
        ];
        for (minutes, field_name) in durations {
            if minutes == 0 {
                return Err(format!("durations.{field_name} must be > 0"));
            }
        }
        Ok(Self {
            focus_minutes,
            task_minutes,
            lunch_minutes,
            auto_break_minutes,
            buffer_break_minutes,
        })
    }

    pub fn focus_minutes(&self) -> u32 {
        self.focus_minutes
    }

    pub fn task_minutes(&self) -> u32 {
        self.task_minutes
    }
}

/// Packs a single day window with lunch, break, task and focus sessions
/// using the default durations.
pub fn generate(
    day_start: &str,
    day_end: &str,
    auto_breaks_enabled: bool,
    pending: &[Task],
    random: &mut dyn RandomSource,
) -> Result<Vec<Session>, FormatError> {
    generate_with_durations(
        &SessionDurations::default(),
        day_start,
        day_end,
        auto_breaks_enabled,
        pending,
        random,
    )
}

/// One forward pass with a cursor starting at `day_start`. A candidate that
/// would run past `day_end` ends the pass; it is never truncated. Every focus
/// session is followed by a "Quick Break" buffer when it fits.
///
/// Auto breaks fire when the minutes elapsed since `day_start` are 110 modulo
/// 120. With the default durations every cursor position is a multiple of 30
/// minutes past the start, so that phase is never reached.
pub fn generate_with_durations(
    durations: &SessionDurations,
    day_start: &str,
    day_end: &str,
    auto_breaks_enabled: bool,
    pending: &[Task],
    random: &mut dyn RandomSource,
) -> Result<Vec<Session>, FormatError> {
    let start = TimeOfDay::parse(day_start)?;
    let end = TimeOfDay::parse(day_end)?;

    let mut pool = pending
        .iter()
        .filter(|task| !task.completed)
        .collect::<VecDeque<_>>();
    let mut sessions = Vec::new();
    let mut cursor = start;
    let mut next_id: u32 = 1;
    let mut lunch_placed = false;

    while cursor < end {
        let elapsed = cursor.minutes_since(start);
        let (kind, duration, task) = if cursor.hour() == LUNCH_HOUR && !lunch_placed {
            (SessionKind::Lunch, durations.lunch_minutes, None)
        } else if auto_breaks_enabled
            && elapsed > 0
            && elapsed % AUTO_BREAK_CYCLE_MINUTES == AUTO_BREAK_OFFSET_MINUTES
        {
            (SessionKind::Break, durations.auto_break_minutes, None)
        } else if !pool.is_empty() && random.next_unit() < TASK_PROBABILITY {
            (SessionKind::Task, durations.task_minutes, pool.pop_front())
        } else {
            (SessionKind::Focus, durations.focus_minutes, None)
        };

        let candidate_end = cursor.add_minutes(duration);
        if candidate_end > end {
            break;
        }

        let title = session_title(kind, task);
        let mut session = Session::new(next_id, title, kind, cursor, candidate_end);
        session.task_id = task.map(|task| task.id.clone());
        sessions.push(session);
        next_id += 1;
        cursor = candidate_end;

        match kind {
            SessionKind::Lunch => lunch_placed = true,
            SessionKind::Focus => {
                let buffer_end = cursor.add_minutes(durations.buffer_break_minutes);
                if buffer_end <= end {
                    sessions.push(Session::new(
                        next_id,
                        format!("{} Quick Break", SessionKind::Break.icon()),
                        SessionKind::Break,
                        cursor,
                        buffer_end,
                    ));
                    next_id += 1;
                }
                cursor = buffer_end;
            }
            SessionKind::Break | SessionKind::Task => {}
        }
    }

    log::debug!(
        "generated {} sessions for {}-{} (auto_breaks={}, pending={})",
        sessions.len(),
        start,
        end,
        auto_breaks_enabled,
        pending.len()
    );
    Ok(sessions)
}

fn session_title(kind: SessionKind, task: Option<&Task>) -> String {
    match (kind, task) {
        (SessionKind::Task, Some(task)) => format!("{} {}", kind.icon(), task.title),
        (SessionKind::Lunch, _) => format!("{} Lunch Break", kind.icon()),
        (SessionKind::Break, _) => format!("{} Break", kind.icon()),
        _ => format!("{} Focus Session", kind.icon()),
    }
}

pub fn current_session(sessions: &[Session], now: TimeOfDay) -> Option<&Session> {
    sessions.iter().find(|session| {
        session.start_time <= now && now <= session.end_time && !session.is_settled()
    })
}

pub fn next_session(sessions: &[Session], now: TimeOfDay) -> Option<&Session> {
    sessions
        .iter()
        .find(|session| session.start_time > now && !session.is_settled())
}

/// Share of settled sessions as a whole percentage, rounded to nearest.
pub fn progress(sessions: &[Session]) -> u32 {
    if sessions.is_empty() {
        return 0;
    }
    let settled = sessions.iter().filter(|session| session.is_settled()).count();
    ((settled as f64 / sessions.len() as f64) * 100.0).round() as u32
}
