use crate::domain::models::{Session, SessionKind};
use crate::domain::planner::DayPlanner;
use crate::domain::time::TimeOfDay;
use crate::infrastructure::error::InfraError;
use crate::infrastructure::storage::open_database;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::Mutex;

pub trait SessionRepository: Send + Sync {
    fn load(&self) -> Result<Option<DayPlanner>, InfraError>;
    fn save(&self, planner: &DayPlanner) -> Result<(), InfraError>;
}

#[derive(Debug, Clone)]
pub struct SqliteSessionRepository {
    db_path: PathBuf,
}

impl SqliteSessionRepository {
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self) -> Result<Connection, InfraError> {
        open_database(&self.db_path)
    }
}

type SessionRow = (u32, String, String, String, String, bool, bool, Option<String>);

fn read_row(row: &Row<'_>) -> rusqlite::Result<SessionRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn decode_session(row: SessionRow) -> Result<Session, InfraError> {
    let (id, title, kind_raw, start_raw, end_raw, completed, skipped, task_id) = row;
    let kind = SessionKind::parse(&kind_raw).ok_or_else(|| {
        InfraError::InvalidConfig(format!("invalid sessions.kind '{kind_raw}' for id {id}"))
    })?;
    Ok(Session {
        id,
        title,
        kind,
        start_time: TimeOfDay::parse(&start_raw)?,
        end_time: TimeOfDay::parse(&end_raw)?,
        completed,
        skipped,
        task_id,
    })
}

impl SessionRepository for SqliteSessionRepository {
    fn load(&self) -> Result<Option<DayPlanner>, InfraError> {
        let connection = self.connect()?;
        let started: Option<bool> = connection
            .query_row("SELECT started FROM planner_state WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        let Some(started) = started else {
            return Ok(None);
        };

        let mut statement = connection.prepare(
            "SELECT id, title, kind, start_time, end_time, completed, skipped, task_id
             FROM sessions ORDER BY position",
        )?;
        let rows = statement
            .query_map([], read_row)?
            .collect::<Result<Vec<_>, _>>()?;
        let sessions = rows
            .into_iter()
            .map(decode_session)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(DayPlanner::restore(sessions, started)))
    }

    fn save(&self, planner: &DayPlanner) -> Result<(), InfraError> {
        let mut connection = self.connect()?;
        let transaction = connection.transaction()?;
        transaction.execute("DELETE FROM sessions", [])?;
        {
            let mut insert = transaction.prepare(
                "INSERT INTO sessions
                   (id, position, title, kind, start_time, end_time, completed, skipped, task_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for (position, session) in planner.sessions().iter().enumerate() {
                insert.execute(params![
                    session.id,
                    position as i64,
                    session.title,
                    session.kind.as_str(),
                    session.start_time.format(),
                    session.end_time.format(),
                    session.completed,
                    session.skipped,
                    session.task_id,
                ])?;
            }
        }
        transaction.execute(
            "INSERT INTO planner_state (id, started, updated_at)
             VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET
               started = excluded.started,
               updated_at = excluded.updated_at",
            params![planner.is_started(), Utc::now().to_rfc3339()],
        )?;
        transaction.commit()?;
        Ok(())
    }
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct InMemorySessionRepository {
    state: Mutex<Option<DayPlanner>>,
}

#[cfg(test)]
impl SessionRepository for InMemorySessionRepository {
    fn load(&self) -> Result<Option<DayPlanner>, InfraError> {
        let state = self
            .state
            .lock()
            .map_err(|error| {
                InfraError::InvalidConfig(format!("session store lock poisoned: {error}"))
            })?;
        Ok(state.clone())
    }

    fn save(&self, planner: &DayPlanner) -> Result<(), InfraError> {
        let mut state = self
            .state
            .lock()
            .map_err(|error| {
                InfraError::InvalidConfig(format!("session store lock poisoned: {error}"))
            })?;
        *state = Some(planner.clone());
        Ok(())
    }
}
