//! Typed query methods for retrieving habitat data from the database.
//!
//! All queries return owned values ([`Observation`], [`TrendTable`] or
//! structs from [`crate::models`]).

use crate::models::{SiteInfo, StreamLine};
use crate::Database;
use hab_core::{
    filter::ObservationFilter,
    hab_type::HabType,
    location::Location,
    observation::Observation,
    trend_series::{TrendSeries, TrendTable},
    year_range::YearRange,
};
use rusqlite::{params, params_from_iter, types::Type, types::Value};

/// Append `column IN (?, ?, ...)` to `clauses`, pushing one bound value per item.
fn push_in_clause<I>(clauses: &mut Vec<String>, values: &mut Vec<Value>, column: &str, items: I)
where
    I: IntoIterator<Item = Value>,
{
    let mut placeholders = Vec::new();
    for item in items {
        values.push(item);
        placeholders.push(format!("?{}", values.len()));
    }
    clauses.push(format!("{} IN ({})", column, placeholders.join(", ")));
}

impl Database {
    /// Get the habitat rows matching `filter`, ordered by site, variable,
    /// habitat type and year.
    ///
    /// Applies the same predicates as [`ObservationFilter::matches`], pushed
    /// down into SQL. An explicitly empty site set matches nothing.
    pub fn query_observations(&self, filter: &ObservationFilter) -> anyhow::Result<Vec<Observation>> {
        if filter.sites.as_ref().is_some_and(|s| s.is_empty()) {
            return Ok(Vec::new());
        }

        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<Value> = Vec::new();
        if !filter.hab_types.is_empty() {
            push_in_clause(
                &mut clauses,
                &mut values,
                "hab_type",
                filter
                    .hab_types
                    .iter()
                    .map(|h| Value::Text(h.as_str().to_string())),
            );
        }
        if let Some(habvar) = &filter.habvar {
            values.push(Value::Text(habvar.clone()));
            clauses.push(format!("habvar = ?{}", values.len()));
        }
        if let Some(years) = filter.years {
            values.push(Value::Integer(years.start() as i64));
            values.push(Value::Integer(years.end() as i64));
            clauses.push(format!(
                "year BETWEEN ?{} AND ?{}",
                values.len() - 1,
                values.len()
            ));
        }
        if let Some(sites) = &filter.sites {
            push_in_clause(
                &mut clauses,
                &mut values,
                "site_id",
                sites.iter().map(|s| Value::Text(s.clone())),
            );
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        let sql = format!(
            "SELECT site_id, year, hab_type, watershed, habvar, habval, longitude, latitude
             FROM habitat
             {}
             ORDER BY site_id, habvar, hab_type, year",
            where_clause
        );

        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), |row| {
                let hab_type_str: String = row.get(2)?;
                let hab_type = hab_type_str.parse::<HabType>().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e))
                })?;
                Ok(Observation {
                    site_id: row.get(0)?,
                    year: row.get(1)?,
                    hab_type,
                    watershed: row.get(3)?,
                    habvar: row.get(4)?,
                    habval: row.get(5)?,
                    location: Location::new(row.get(6)?, row.get(7)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!(
            "[HAB Debug] query: query_observations returned {} records",
            rows.len()
        );
        Ok(rows)
    }

    /// Every habitat row in the store.
    pub fn query_all_observations(&self) -> anyhow::Result<Vec<Observation>> {
        self.query_observations(&ObservationFilter::default())
    }

    /// Get the trend-preparation relation: one yearly series per
    /// (site, variable, habitat type), optionally restricted to one variable.
    pub fn query_trend_table(&self, habvar: Option<&str>) -> anyhow::Result<TrendTable> {
        let mut filter = ObservationFilter::new();
        filter.habvar = habvar.map(str::to_string);
        let observations = self.query_observations(&filter)?;
        let table = TrendSeries::build_table(&observations);
        log::info!(
            "[HAB Debug] query: query_trend_table built {} series",
            table.len()
        );
        Ok(table)
    }

    /// Get all survey sites, optionally only those carrying `habvar`.
    pub fn query_sites(&self, habvar: Option<&str>) -> anyhow::Result<Vec<SiteInfo>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT site_id, MIN(watershed), MIN(longitude), MIN(latitude),
                    COUNT(DISTINCT CASE WHEN habval IS NOT NULL THEN year END)
             FROM habitat
             WHERE ?1 IS NULL OR habvar = ?1
             GROUP BY site_id
             ORDER BY site_id",
        )?;
        let rows = stmt
            .query_map(params![habvar], |row| {
                Ok(SiteInfo {
                    site_id: row.get(0)?,
                    watershed: row.get(1)?,
                    location: Location::new(row.get(2)?, row.get(3)?),
                    years_surveyed: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!("[HAB Debug] query: query_sites returned {} records", rows.len());
        Ok(rows)
    }

    /// Distinct watershed names, alphabetically.
    pub fn query_watersheds(&self) -> anyhow::Result<Vec<String>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare("SELECT DISTINCT watershed FROM habitat ORDER BY watershed")?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(rows)
    }

    /// Distinct variable keys present in the habitat table, alphabetically.
    pub fn query_habvars(&self) -> anyhow::Result<Vec<String>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare("SELECT DISTINCT habvar FROM habitat ORDER BY habvar")?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(rows)
    }

    /// The first and last survey year in the data, optionally for one variable.
    ///
    /// Returns None when there is no matching row.
    pub fn query_year_bounds(&self, habvar: Option<&str>) -> anyhow::Result<Option<YearRange>> {
        let conn = self.conn.borrow();
        let (min, max): (Option<i32>, Option<i32>) = conn.query_row(
            "SELECT MIN(year), MAX(year) FROM habitat WHERE ?1 IS NULL OR habvar = ?1",
            params![habvar],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(match (min, max) {
            (Some(start), Some(end)) => Some(YearRange(start, end)),
            _ => None,
        })
    }

    /// Get every stream polyline with its vertices in `Seq` order.
    pub fn query_streams(&self) -> anyhow::Result<Vec<StreamLine>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT stream_id, name, longitude, latitude
             FROM stream_vertices
             ORDER BY stream_id, seq",
        )?;
        let vertices = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    Location::new(row.get(2)?, row.get(3)?),
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut streams: Vec<StreamLine> = Vec::new();
        for (stream_id, name, location) in vertices {
            match streams.last_mut() {
                Some(line) if line.stream_id == stream_id => line.vertices.push(location),
                _ => streams.push(StreamLine {
                    stream_id,
                    name,
                    vertices: vec![location],
                }),
            }
        }
        log::info!("[HAB Debug] query: query_streams returned {} lines", streams.len());
        Ok(streams)
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;
    use hab_core::{
        filter::ObservationFilter, hab_type::HabType, trend_series::TrendKey,
        year_range::YearRange,
    };

    const HABITAT_CSV: &str = include_str!("../../fixtures/habitat.csv");
    const STREAMS_CSV: &str = include_str!("../../fixtures/streams.csv");

    fn loaded() -> Database {
        let db = Database::new().unwrap();
        db.load_habitat(HABITAT_CSV).unwrap();
        db.load_streams(STREAMS_CSV).unwrap();
        db
    }

    #[test]
    fn sql_filter_matches_in_memory_filter() {
        let db = loaded();
        let all = db.query_all_observations().unwrap();
        let filter = ObservationFilter::new()
            .hab_types([HabType::Run, HabType::Pool])
            .habvar("StnFines")
            .years(YearRange(2011, 2014))
            .sites(["CC-01", "LOS-02", "UGR-01"]);

        let mut from_sql = db.query_observations(&filter).unwrap();
        let mut in_memory: Vec<_> = all.into_iter().filter(|o| filter.matches(o)).collect();
        let key = |o: &hab_core::observation::Observation| (o.site_id.clone(), o.hab_type, o.year);
        from_sql.sort_by_key(key);
        in_memory.sort_by_key(key);
        assert!(!from_sql.is_empty());
        assert_eq!(from_sql, in_memory);
    }

    #[test]
    fn pool_filter_on_run_riffle_sites_is_empty() {
        let db = loaded();
        let filter = ObservationFilter::new()
            .hab_types([HabType::Pool])
            .sites(["LOS-01", "LOS-02"]);
        assert!(db.query_observations(&filter).unwrap().is_empty());
    }

    #[test]
    fn empty_site_set_matches_nothing() {
        let db = loaded();
        let filter = ObservationFilter::new().sites(Vec::<String>::new());
        assert!(db.query_observations(&filter).unwrap().is_empty());
    }

    #[test]
    fn sites_and_watersheds() {
        let db = loaded();
        let sites = db.query_sites(None).unwrap();
        assert_eq!(sites.len(), 5);
        assert_eq!(sites[0].site_id, "CC-01");
        assert_eq!(sites[0].watershed, "Catherine Creek");
        assert_eq!(sites[0].years_surveyed, 7);
        let ugr = sites.iter().find(|s| s.site_id == "UGR-01").unwrap();
        assert_eq!(ugr.years_surveyed, 6);

        assert_eq!(
            db.query_watersheds().unwrap(),
            vec!["Catherine Creek", "Lostine", "Upper Grande Ronde"]
        );
        assert_eq!(
            db.query_habvars().unwrap(),
            vec!["StnAvgDepth", "StnCanopy", "StnFines"]
        );
    }

    #[test]
    fn year_bounds_follow_the_data() {
        let db = loaded();
        assert_eq!(db.query_year_bounds(None).unwrap(), Some(YearRange(2010, 2016)));
        assert_eq!(db.query_year_bounds(Some("Temperature")).unwrap(), None);
    }

    #[test]
    fn trend_table_has_one_series_per_site_and_hab_type() {
        let db = loaded();
        let table = db.query_trend_table(Some("StnCanopy")).unwrap();
        // CC-01, CC-02, UGR-01 x 3 habitat types + LOS-01, LOS-02 x 2
        assert_eq!(table.len(), 13);
        let key = TrendKey {
            site_id: "CC-02".to_string(),
            habvar: "StnCanopy".to_string(),
            hab_type: HabType::Riffle,
        };
        let series = &table[&key];
        assert_eq!(series.observations.len(), 7);
        assert_eq!(series.observations[1], (2011, None));
    }

    #[test]
    fn streams_are_grouped_in_order() {
        let db = loaded();
        let streams = db.query_streams().unwrap();
        assert_eq!(streams.len(), 3);
        assert_eq!(streams[0].stream_id, "S1");
        assert_eq!(streams[0].vertices.len(), 4);
        assert!((streams[0].vertices[0].longitude - (-117.80)).abs() < 1e-9);
        assert_eq!(streams[2].name, "Grande Ronde River");
    }
}
