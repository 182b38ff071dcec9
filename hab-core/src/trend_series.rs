use crate::{hab_type::HabType, location::Location, observation::Observation, year_range::YearRange};
use serde::Serialize;
use std::collections::BTreeMap;

/// Key of the trend-preparation relation: one series per site, variable and habitat type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TrendKey {
    pub site_id: String,
    pub habvar: String,
    pub hab_type: HabType,
}

/// The full yearly history of one variable at one site and habitat type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub site_id: String,
    pub habvar: String,
    pub hab_type: HabType,
    pub watershed: String,
    pub location: Location,
    /// Sorted ascending by year, one entry per year
    pub observations: Vec<(i32, Option<f64>)>,
}

/// Owning map from (site, variable, habitat type) to its series.
pub type TrendTable = BTreeMap<TrendKey, TrendSeries>;

impl TrendSeries {
    pub fn key(&self) -> TrendKey {
        TrendKey {
            site_id: self.site_id.clone(),
            habvar: self.habvar.clone(),
            hab_type: self.hab_type,
        }
    }

    /// Non-missing (year, value) points inside `window`, in year order.
    pub fn points_in(&self, window: YearRange) -> Vec<(i32, f64)> {
        self.observations
            .iter()
            .filter(|(year, _)| window.contains(*year))
            .filter_map(|(year, value)| value.map(|v| (*year, v)))
            .collect()
    }

    /// Group observations into one series per (site, variable, habitat type).
    ///
    /// A later row for an already-seen year replaces the earlier one, so
    /// each series holds at most one entry per year.
    pub fn build_table<'a, I>(observations: I) -> TrendTable
    where
        I: IntoIterator<Item = &'a Observation>,
    {
        let mut yearly: BTreeMap<TrendKey, (TrendSeries, BTreeMap<i32, Option<f64>>)> =
            BTreeMap::new();
        for obs in observations {
            let key = TrendKey {
                site_id: obs.site_id.clone(),
                habvar: obs.habvar.clone(),
                hab_type: obs.hab_type,
            };
            let (_, years) = yearly.entry(key).or_insert_with(|| {
                (
                    TrendSeries {
                        site_id: obs.site_id.clone(),
                        habvar: obs.habvar.clone(),
                        hab_type: obs.hab_type,
                        watershed: obs.watershed.clone(),
                        location: obs.location,
                        observations: Vec::new(),
                    },
                    BTreeMap::new(),
                )
            });
            years.insert(obs.year, obs.habval);
        }
        yearly
            .into_iter()
            .map(|(key, (mut series, years))| {
                series.observations = years.into_iter().collect();
                (key, series)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{TrendKey, TrendSeries};
    use crate::{hab_type::HabType, location::Location, observation::Observation, year_range::YearRange};

    fn observation(site: &str, year: i32, hab_type: HabType, habval: Option<f64>) -> Observation {
        Observation {
            site_id: site.to_string(),
            year,
            hab_type,
            watershed: "Lostine".to_string(),
            habvar: "StnCanopy".to_string(),
            habval,
            location: Location::new(-117.4, 45.4),
        }
    }

    #[test]
    fn test_build_table_groups_and_sorts() {
        let rows = vec![
            observation("A", 2012, HabType::Run, Some(3.0)),
            observation("A", 2010, HabType::Run, Some(1.0)),
            observation("A", 2011, HabType::Pool, None),
            observation("B", 2010, HabType::Run, Some(7.0)),
        ];
        let table = TrendSeries::build_table(&rows);
        assert_eq!(table.len(), 3);
        let key = TrendKey {
            site_id: "A".to_string(),
            habvar: "StnCanopy".to_string(),
            hab_type: HabType::Run,
        };
        let series = &table[&key];
        assert_eq!(series.observations, vec![(2010, Some(1.0)), (2012, Some(3.0))]);
        assert_eq!(series.key(), key);
    }

    #[test]
    fn test_points_in_window_drop_missing() {
        let rows = vec![
            observation("A", 2009, HabType::Run, Some(9.0)),
            observation("A", 2010, HabType::Run, None),
            observation("A", 2011, HabType::Run, Some(2.0)),
            observation("A", 2014, HabType::Run, Some(4.0)),
        ];
        let table = TrendSeries::build_table(&rows);
        let series = table.values().next().unwrap();
        assert_eq!(series.points_in(YearRange(2010, 2013)), vec![(2011, 2.0)]);
    }
}
