use hab_core::{
    filter::ObservationFilter,
    observation::Observation,
    trend_series::{TrendSeries, TrendTable},
};

/// Rows of the habitat table accepted by `filter`, in table order.
///
/// No match is an empty vector, never an error.
pub fn filter_observations<'a>(rows: &'a [Observation], filter: &ObservationFilter) -> Vec<&'a Observation> {
    rows.iter().filter(|obs| filter.matches(obs)).collect()
}

/// Series of the trend-preparation relation whose site, variable and
/// habitat type pass `filter`. The year window is not applied here; it
/// is applied to each series by the trend engine.
pub fn filter_trend_table<'a>(table: &'a TrendTable, filter: &ObservationFilter) -> Vec<&'a TrendSeries> {
    table
        .values()
        .filter(|series| {
            filter.accepts_hab_type(series.hab_type)
                && filter.accepts_habvar(&series.habvar)
                && filter.accepts_site(&series.site_id)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hab_core::{hab_type::HabType, location::Location, year_range::YearRange};

    fn observation(site: &str, year: i32, hab_type: HabType, habvar: &str) -> Observation {
        Observation {
            site_id: site.to_string(),
            year,
            hab_type,
            watershed: "Lostine".to_string(),
            habvar: habvar.to_string(),
            habval: Some(year as f64),
            location: Location::default(),
        }
    }

    fn rows() -> Vec<Observation> {
        vec![
            observation("A", 2010, HabType::Run, "StnFines"),
            observation("A", 2011, HabType::Riffle, "StnFines"),
            observation("A", 2012, HabType::Run, "StnCanopy"),
            observation("B", 2013, HabType::Riffle, "StnFines"),
        ]
    }

    #[test]
    fn test_filter_by_variable_and_years() {
        let rows = rows();
        let filter = ObservationFilter::new()
            .habvar("StnFines")
            .years(YearRange(2011, 2013));
        let result = filter_observations(&rows, &filter);
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|o| o.habvar == "StnFines" && o.year >= 2011));
    }

    #[test]
    fn test_pool_against_run_riffle_is_empty() {
        let rows = rows();
        let filter = ObservationFilter::new().hab_types([HabType::Pool]);
        assert!(filter_observations(&rows, &filter).is_empty());
    }

    #[test]
    fn test_filter_trend_table_ignores_years() {
        let rows = rows();
        let table = TrendSeries::build_table(&rows);
        let filter = ObservationFilter::new()
            .habvar("StnFines")
            .hab_types([HabType::Riffle])
            .years(YearRange(1990, 1991));
        let series = filter_trend_table(&table, &filter);
        assert_eq!(series.len(), 2);

        let filter = filter.sites(["B"]);
        let series = filter_trend_table(&table, &filter);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].site_id, "B");
    }
}
