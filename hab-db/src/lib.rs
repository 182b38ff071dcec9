//! In-memory SQLite dataset store for stream habitat data.
//!
//! Loads the habitat observation table and stream geometry from CSV into
//! an in-memory SQLite database and exposes typed, read-only query
//! methods. Nothing is written back once loading is done; every query
//! returns owned values the analysis pipeline can hold on to.
//!
//! # Usage
//!
//! ```rust
//! use hab_db::Database;
//!
//! let db = Database::new().unwrap();
//! db.load_habitat("SiteID,Year,HabType,Watershed,habvar,habval,longitude,latitude\nCC-01,2010,run,Catherine Creek,StnFines,17.5,-117.78,45.15\n").unwrap();
//!
//! let sites = db.query_sites(None).unwrap();
//! assert_eq!(sites[0].site_id, "CC-01");
//! ```
//!
//! # Tables
//!
//! See [`schema::create_schema`] for the full SQL schema.

pub mod schema;
mod loader;
mod queries;
pub mod models;

use rusqlite::Connection;
use std::cell::RefCell;
use std::rc::Rc;

/// In-memory SQLite database wrapping habitat observations and stream geometry.
///
/// This struct is cheaply cloneable (via `Rc`); clones share one connection.
#[derive(Clone)]
pub struct Database {
    conn: Rc<RefCell<Connection>>,
}

impl Database {
    /// Create a new in-memory database with the full schema applied.
    pub fn new() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::create_schema())?;
        Ok(Self {
            conn: Rc::new(RefCell::new(conn)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_creates_successfully() {
        let db = Database::new();
        assert!(db.is_ok(), "Database should create without errors");
    }

    #[test]
    fn database_is_cloneable() {
        let db = Database::new().unwrap();
        let db2 = db.clone();
        db.load_habitat(
            "SiteID,Year,HabType,Watershed,habvar,habval,longitude,latitude\nCC-01,2010,run,Catherine Creek,StnFines,17.5,-117.78,45.15\n",
        )
        .unwrap();
        let sites = db2.query_sites(None).unwrap();
        assert_eq!(sites.len(), 1, "Clone should see same data via shared Rc");
    }

    #[test]
    fn database_starts_empty() {
        let db = Database::new().unwrap();
        assert!(db.query_sites(None).unwrap().is_empty());
        assert!(db.query_year_bounds(None).unwrap().is_none());
    }
}
