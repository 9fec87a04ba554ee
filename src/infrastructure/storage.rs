use crate::infrastructure::error::InfraError;
use rusqlite::Connection;
use std::path::Path;

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

pub fn initialize_database(path: &Path) -> Result<(), InfraError> {
    let connection = open_database(path)?;
    connection.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

pub fn open_database(path: &Path) -> Result<Connection, InfraError> {
    Connection::open(path).map_err(InfraError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creates_planner_tables_and_is_idempotent() {
        let path = std::env::temp_dir().join(format!(
            "dayblock-storage-tests-{}.sqlite",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        initialize_database(&path).expect("initialize");
        initialize_database(&path).expect("initialize twice");

        let connection = open_database(&path).expect("open");
        let mut statement = connection
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .expect("prepare");
        let tables = statement
            .query_map([], |row| row.get::<_, String>(0))
            .expect("query")
            .collect::<Result<Vec<_>, _>>()
            .expect("collect");
        assert_eq!(tables, vec!["planner_state".to_string(), "sessions".to_string()]);

        drop(statement);
        drop(connection);
        let _ = std::fs::remove_file(&path);
    }
}
