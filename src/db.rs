use rusqlite::{Connection, Params};
use std::sync::Mutex;

const SCHEMA: &str = include_str!("schema.sql");

/// SQLite-backed store for participants, scenarios and grading results.
pub struct Db {
    conn: Mutex<Connection>,
}

impl Db {
    pub fn open(path: &str) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Db {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Db {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T, rusqlite::Error>
    where
        F: FnOnce(&Connection) -> Result<T, rusqlite::Error>,
    {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        f(&conn)
    }

    /// Runs an `INSERT OR IGNORE` and reads the stored row back within the
    /// same lock hold. Returns that row and whether this call inserted it.
    pub fn insert_or_keep<T, P, F>(
        &self,
        insert: &str,
        params: P,
        read_back: F,
    ) -> Result<(T, bool), rusqlite::Error>
    where
        P: Params,
        F: FnOnce(&Connection) -> Result<T, rusqlite::Error>,
    {
        self.with_conn(|conn| {
            let inserted = conn.execute(insert, params)? > 0;
            Ok((read_back(conn)?, inserted))
        })
    }
}
