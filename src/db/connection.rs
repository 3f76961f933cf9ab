use rusqlite::{Connection, Result};
use std::path::Path;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS finance_users (
    username TEXT PRIMARY KEY,
    data TEXT NOT NULL
)";

pub fn establish_connection(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute(SCHEMA, [])?;
    Ok(conn)
}

#[cfg(test)]
pub fn establish_test_connection() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    conn.execute(SCHEMA, [])?;
    Ok(conn)
}
