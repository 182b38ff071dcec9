//! CSV data loading functions for populating the in-memory SQLite database.
//!
//! # CSV Formats
//!
//! - **Habitat** (has headers): `SiteID,Year,HabType,Watershed,habvar,habval,longitude,latitude`
//! - **Streams** (has headers): `StreamID,Name,Seq,longitude,latitude`

use crate::Database;
use hab_core::observation::Observation;
use rusqlite::params;

impl Database {
    /// Load habitat observations from a CSV string.
    ///
    /// A row repeating an existing (site, year, habitat type, variable)
    /// key replaces the earlier row. Malformed rows abort the load.
    ///
    /// # Example CSV
    /// ```text
    /// SiteID,Year,HabType,Watershed,habvar,habval,longitude,latitude
    /// CC-01,2010,run,Catherine Creek,StnFines,17.49,-117.781,45.152
    /// CC-02,2011,pool,Catherine Creek,StnCanopy,NA,-117.745,45.118
    /// ```
    pub fn load_habitat(&self, csv_data: &str) -> anyhow::Result<()> {
        let observations = Observation::parse_habitat_csv(csv_data)?;
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "INSERT OR REPLACE INTO habitat
             (site_id, year, hab_type, watershed, habvar, habval, longitude, latitude)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;

        let mut missing = 0u32;
        for obs in &observations {
            if obs.habval.is_none() {
                missing += 1;
            }
            stmt.execute(params![
                obs.site_id,
                obs.year,
                obs.hab_type.as_str(),
                obs.watershed,
                obs.habvar,
                obs.habval,
                obs.location.longitude,
                obs.location.latitude,
            ])?;
        }
        log::info!(
            "[HAB Debug] loader: Loaded {} habitat rows ({} without a value)",
            observations.len(),
            missing
        );
        Ok(())
    }

    /// Load stream polyline vertices from a CSV string.
    ///
    /// # Example CSV
    /// ```text
    /// StreamID,Name,Seq,longitude,latitude
    /// S1,Catherine Creek,1,-117.80,45.17
    /// S1,Catherine Creek,2,-117.78,45.15
    /// ```
    pub fn load_streams(&self, csv_data: &str) -> anyhow::Result<()> {
        let conn = self.conn.borrow();
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_data.as_bytes());

        let mut count = 0u32;
        for result in rdr.records() {
            let r = result?;
            let stream_id = r.get(0).unwrap_or("").trim();
            let name = r.get(1).unwrap_or("").trim();
            let seq: i64 = r.get(2).unwrap_or("").trim().parse()?;
            let longitude: f64 = r.get(3).unwrap_or("").trim().parse()?;
            let latitude: f64 = r.get(4).unwrap_or("").trim().parse()?;

            if stream_id.is_empty() {
                anyhow::bail!("stream vertex {} has an empty StreamID", count + 1);
            }

            conn.execute(
                "INSERT OR REPLACE INTO stream_vertices (stream_id, name, seq, longitude, latitude)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![stream_id, name, seq, longitude, latitude],
            )?;
            count += 1;
        }
        log::info!("[HAB Debug] loader: Loaded {} stream vertices", count);
        Ok(())
    }
}
