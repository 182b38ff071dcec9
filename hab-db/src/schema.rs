//! SQL schema definitions for the in-memory SQLite database.
//!
//! The schema is applied as a single batch when the database is initialized.

/// Returns the full SQL schema as a single batch string.
///
/// - `habitat` - One habitat measurement per (site, year, habitat type, variable).
///   `habval` is NULL when the variable was not measured that visit.
/// - `stream_vertices` - Ordered vertices of each stream polyline for the background map.
///
/// The per-site trend-preparation relation is not stored; it is grouped
/// out of `habitat` on demand (see `query_trend_table`).
pub fn create_schema() -> &'static str {
    r#"
    CREATE TABLE IF NOT EXISTS habitat (
        site_id TEXT NOT NULL,
        year INTEGER NOT NULL,
        hab_type TEXT NOT NULL CHECK (hab_type IN ('run', 'riffle', 'pool')),
        watershed TEXT NOT NULL,
        habvar TEXT NOT NULL,
        habval REAL,
        longitude REAL NOT NULL,
        latitude REAL NOT NULL,
        PRIMARY KEY (site_id, year, hab_type, habvar)
    );
    CREATE INDEX IF NOT EXISTS idx_habitat_habvar ON habitat(habvar);
    CREATE INDEX IF NOT EXISTS idx_habitat_year ON habitat(year);

    CREATE TABLE IF NOT EXISTS stream_vertices (
        stream_id TEXT NOT NULL,
        name TEXT NOT NULL,
        seq INTEGER NOT NULL,
        longitude REAL NOT NULL,
        latitude REAL NOT NULL,
        PRIMARY KEY (stream_id, seq)
    );
    "#
}
