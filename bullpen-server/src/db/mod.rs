pub mod columns;
pub mod connection;
pub mod repositories;
pub mod schema;

#[cfg(test)]
pub(crate) mod fixtures;

pub use connection::{Database, DbConnection, DbPool};

/// `?, ?, ?` for an IN-list of `n` values
pub fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// True when an insert hit a UNIQUE or PRIMARY KEY constraint
pub fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => {
            e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        }
        _ => false,
    }
}

/// Run an insert, mapping a uniqueness violation to `Ok(false)`
pub fn insert_unique(result: rusqlite::Result<usize>) -> rusqlite::Result<bool> {
    match result {
        Ok(_) => Ok(true),
        Err(err) if is_unique_violation(&err) => Ok(false),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(0), "");
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }

    #[test]
    fn test_unique_violation_detection() {
        let db = Database::in_memory().unwrap();
        let conn = db.connection().unwrap();
        let insert = "INSERT INTO tickers (id, symbol, type, created_at) VALUES (?, 'AAPL', 'stock', '2024-01-01T00:00:00.000000Z')";

        assert!(insert_unique(conn.execute(insert, ["a"])).unwrap());
        assert!(!insert_unique(conn.execute(insert, ["b"])).unwrap());

        // Other constraint failures still surface as errors
        let bad = conn.execute(
            "INSERT INTO tickers (id, symbol, type, created_at) VALUES ('c', 'lower', 'stock', 'x')",
            [],
        );
        assert!(insert_unique(bad).is_err());
    }
}
