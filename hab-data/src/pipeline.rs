//! The memoized analysis pipeline.
//!
//! A [`Pipeline`] owns a shared, immutable [`Dataset`] snapshot. Each
//! derived view keeps one memo slot keyed by the complete parameter set it
//! depends on: asking again with the same parameters hands back the cached
//! `Rc`, any change recomputes and replaces the slot.

use crate::chart::{site_chart, watershed_chart, SiteChart, WatershedChart, YAxisMode};
use crate::filter::{filter_observations, filter_trend_table};
use crate::map::{overview_markers, trend_markers, OverviewMarker, TrendMarker};
use crate::trend::{site_detail, trend_batch, SiteDetail, TrendResult};
use hab_core::{
    filter::ObservationFilter,
    hab_type::HabType,
    observation::Observation,
    significance::SignificancePolicy,
    trend_series::{TrendSeries, TrendTable},
    year_range::YearRange,
};
use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

/// The habitat table and its trend-preparation relation, loaded once.
#[derive(Debug, Clone)]
pub struct Dataset {
    observations: Vec<Observation>,
    trend_table: TrendTable,
    year_bounds: Option<YearRange>,
}

impl Dataset {
    /// Build the dataset, deriving the trend table from `observations`.
    pub fn new(observations: Vec<Observation>) -> Self {
        let trend_table = TrendSeries::build_table(&observations);
        Dataset::with_trend_table(observations, trend_table)
    }

    /// Build the dataset around a trend table prepared elsewhere.
    pub fn with_trend_table(observations: Vec<Observation>, trend_table: TrendTable) -> Self {
        let year_bounds = YearRange::spanning(observations.iter().map(|obs| obs.year));
        Dataset {
            observations,
            trend_table,
            year_bounds,
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn trend_table(&self) -> &TrendTable {
        &self.trend_table
    }

    /// First and last survey year, or None for an empty dataset.
    pub fn year_bounds(&self) -> Option<YearRange> {
        self.year_bounds
    }

    /// The requested window clamped to the data, defaulting to all years.
    ///
    /// None when the dataset is empty or the request misses it entirely.
    pub fn resolve_window(&self, requested: Option<YearRange>) -> Option<YearRange> {
        let bounds = self.year_bounds?;
        match requested {
            Some(range) => range.clamp_to(&bounds),
            None => Some(bounds),
        }
    }
}

/// Single-slot cache: holds the value computed for the most recent key.
#[derive(Debug)]
pub struct Memo<K, V> {
    slot: RefCell<Option<(K, Rc<V>)>>,
    computed: Cell<u64>,
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Memo {
            slot: RefCell::new(None),
            computed: Cell::new(0),
        }
    }
}

impl<K: PartialEq, V> Memo<K, V> {
    pub fn get_or_compute<F>(&self, key: K, compute: F) -> Rc<V>
    where
        F: FnOnce(&K) -> V,
    {
        if let Some((cached_key, value)) = self.slot.borrow().as_ref() {
            if *cached_key == key {
                return Rc::clone(value);
            }
        }
        let value = Rc::new(compute(&key));
        self.computed.set(self.computed.get() + 1);
        *self.slot.borrow_mut() = Some((key, Rc::clone(&value)));
        value
    }

    /// How many times the slot has been (re)computed.
    pub fn computed(&self) -> u64 {
        self.computed.get()
    }
}

/// Parameters of the watershed chart view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WatershedParams {
    pub habvar: String,
    pub hab_types: BTreeSet<HabType>,
    pub years: Option<YearRange>,
    pub show_observations: bool,
}

/// Parameters of the batch trend map view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrendParams {
    pub habvar: String,
    pub hab_types: BTreeSet<HabType>,
    pub years: Option<YearRange>,
}

/// Parameters of the single-site detail view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteParams {
    pub site: Option<String>,
    pub habvar: String,
    pub hab_types: BTreeSet<HabType>,
    pub years: Option<YearRange>,
    pub y_axis_mode: YAxisMode,
}

/// Parameters of the raw overview map: one variable, habitat type and year.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OverviewParams {
    pub habvar: String,
    pub hab_type: HabType,
    pub year: i32,
}

/// Trend results and the map markers drawn from them.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendMap {
    pub window: Option<YearRange>,
    pub results: Vec<TrendResult>,
    pub markers: Vec<TrendMarker>,
}

/// Detail series plus the chart drawn from them.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteView {
    pub detail: SiteDetail,
    pub chart: SiteChart,
}

pub struct Pipeline {
    dataset: Rc<Dataset>,
    policy: SignificancePolicy,
    filtered: Memo<ObservationFilter, Vec<Observation>>,
    watershed: Memo<WatershedParams, WatershedChart>,
    trends: Memo<TrendParams, TrendMap>,
    detail: Memo<SiteParams, Option<SiteView>>,
    overview: Memo<OverviewParams, Vec<OverviewMarker>>,
}

impl Pipeline {
    pub fn new(dataset: Rc<Dataset>) -> Self {
        Pipeline::with_policy(dataset, SignificancePolicy::default())
    }

    pub fn with_policy(dataset: Rc<Dataset>, policy: SignificancePolicy) -> Self {
        Pipeline {
            dataset,
            policy,
            filtered: Memo::default(),
            watershed: Memo::default(),
            trends: Memo::default(),
            detail: Memo::default(),
            overview: Memo::default(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Habitat rows passing `filter`.
    pub fn filtered(&self, filter: &ObservationFilter) -> Rc<Vec<Observation>> {
        let dataset = Rc::clone(&self.dataset);
        self.filtered.get_or_compute(filter.clone(), |filter| {
            filter_observations(dataset.observations(), filter)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    pub fn watershed_chart(&self, params: &WatershedParams) -> Rc<WatershedChart> {
        let filter = ObservationFilter {
            hab_types: params.hab_types.clone(),
            habvar: Some(params.habvar.clone()),
            years: params.years,
            sites: None,
        };
        let rows = self.filtered(&filter);
        self.watershed.get_or_compute(params.clone(), |params| {
            let refs: Vec<&Observation> = rows.iter().collect();
            watershed_chart(&refs, &params.habvar, params.show_observations)
        })
    }

    pub fn trend_map(&self, params: &TrendParams) -> Rc<TrendMap> {
        let dataset = Rc::clone(&self.dataset);
        let policy = &self.policy;
        self.trends.get_or_compute(params.clone(), |params| {
            let Some(window) = dataset.resolve_window(params.years) else {
                return TrendMap {
                    window: None,
                    results: Vec::new(),
                    markers: Vec::new(),
                };
            };
            let filter = ObservationFilter {
                hab_types: params.hab_types.clone(),
                habvar: Some(params.habvar.clone()),
                years: None,
                sites: None,
            };
            let series = filter_trend_table(dataset.trend_table(), &filter);
            let results = trend_batch(series, window, policy);
            let markers = trend_markers(&results);
            TrendMap {
                window: Some(window),
                results,
                markers,
            }
        })
    }

    /// None until a site is selected (or when the window misses the data).
    pub fn site_view(&self, params: &SiteParams) -> Rc<Option<SiteView>> {
        let dataset = Rc::clone(&self.dataset);
        let policy = &self.policy;
        self.detail.get_or_compute(params.clone(), |params| {
            let window = dataset.resolve_window(params.years)?;
            let hab_types: Vec<HabType> = params.hab_types.iter().copied().collect();
            let detail = site_detail(
                dataset.trend_table(),
                params.site.as_deref(),
                &params.habvar,
                &hab_types,
                window,
                policy,
            )?;
            let chart = site_chart(&detail, params.y_axis_mode);
            Some(SiteView { detail, chart })
        })
    }

    pub fn overview(&self, params: &OverviewParams) -> Rc<Vec<OverviewMarker>> {
        let filter = ObservationFilter {
            hab_types: BTreeSet::from([params.hab_type]),
            habvar: Some(params.habvar.clone()),
            years: Some(YearRange(params.year, params.year)),
            sites: None,
        };
        let rows = self.filtered(&filter);
        self.overview
            .get_or_compute(params.clone(), |_| overview_markers(rows.iter()))
    }

    /// How many times each view has been computed: filtered rows, watershed,
    /// trends, site detail and overview.
    pub fn compute_counts(&self) -> [u64; 5] {
        [
            self.filtered.computed(),
            self.watershed.computed(),
            self.trends.computed(),
            self.detail.computed(),
            self.overview.computed(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trend::TrendDirection;
    use hab_core::location::Location;

    fn observation(site: &str, year: i32, hab_type: HabType, habvar: &str, habval: Option<f64>) -> Observation {
        Observation {
            site_id: site.to_string(),
            year,
            hab_type,
            watershed: if site.starts_with('C') { "Catherine Creek" } else { "Lostine" }.to_string(),
            habvar: habvar.to_string(),
            habval,
            location: Location::new(-117.5, 45.3),
        }
    }

    fn dataset() -> Rc<Dataset> {
        let mut rows = Vec::new();
        for (i, year) in (2010..=2016).enumerate() {
            let i = i as f64;
            rows.push(observation("C1", year, HabType::Run, "StnFines", Some(10.0 + i)));
            rows.push(observation("C1", year, HabType::Pool, "StnFines", Some(20.0 - i)));
            rows.push(observation("L1", year, HabType::Run, "StnFines", Some(5.0 + (i * 3.0) % 4.0)));
            rows.push(observation("L1", year, HabType::Run, "StnCanopy", if year == 2013 { None } else { Some(40.0) }));
        }
        Rc::new(Dataset::new(rows))
    }

    fn types(hab_types: &[HabType]) -> BTreeSet<HabType> {
        hab_types.iter().copied().collect()
    }

    #[test]
    fn test_memo_recomputes_only_on_change() {
        let memo: Memo<i32, i32> = Memo::default();
        assert_eq!(*memo.get_or_compute(1, |k| k * 10), 10);
        assert_eq!(*memo.get_or_compute(1, |_| unreachable!()), 10);
        assert_eq!(memo.computed(), 1);
        assert_eq!(*memo.get_or_compute(2, |k| k * 10), 20);
        assert_eq!(memo.computed(), 2);
    }

    #[test]
    fn test_resolve_window() {
        let data = dataset();
        assert_eq!(data.year_bounds(), Some(YearRange(2010, 2016)));
        assert_eq!(data.resolve_window(None), Some(YearRange(2010, 2016)));
        assert_eq!(data.resolve_window(Some(YearRange(2000, 2012))), Some(YearRange(2010, 2012)));
        assert_eq!(data.resolve_window(Some(YearRange(2020, 2022))), None);
        assert_eq!(Dataset::new(Vec::new()).resolve_window(None), None);
    }

    #[test]
    fn test_trend_map_is_cached_per_parameters() {
        let pipeline = Pipeline::new(dataset());
        let params = TrendParams {
            habvar: "StnFines".to_string(),
            hab_types: types(&[HabType::Run, HabType::Pool]),
            years: None,
        };
        let first = pipeline.trend_map(&params);
        let second = pipeline.trend_map(&params);
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(pipeline.compute_counts()[2], 1);

        assert_eq!(first.results.len(), 3);
        assert_eq!(first.markers.len(), 3);
        let c1_pool = first
            .results
            .iter()
            .find(|r| r.site_id == "C1" && r.hab_type == HabType::Pool)
            .unwrap();
        assert_eq!(c1_pool.trend, TrendDirection::Decreasing);
        assert_eq!(c1_pool.tau, -1.0);

        let narrowed = TrendParams {
            hab_types: types(&[HabType::Pool]),
            ..params
        };
        let third = pipeline.trend_map(&narrowed);
        assert_eq!(third.results.len(), 1);
        assert_eq!(pipeline.compute_counts()[2], 2);
    }

    #[test]
    fn test_watershed_chart_gap_fills() {
        let pipeline = Pipeline::new(dataset());
        let params = WatershedParams {
            habvar: "StnCanopy".to_string(),
            hab_types: BTreeSet::new(),
            years: Some(YearRange(2012, 2014)),
            show_observations: true,
        };
        let chart = pipeline.watershed_chart(&params);
        assert_eq!(chart.cells.len(), 3);
        assert_eq!(chart.cells[1].year, 2013);
        assert_eq!(chart.cells[1].n, 0);
        assert_eq!(chart.points.len(), 2);

        let again = pipeline.watershed_chart(&params);
        assert!(Rc::ptr_eq(&chart, &again));
        assert_eq!(pipeline.compute_counts()[..2], [1, 1]);
    }

    #[test]
    fn test_pool_only_watershed_chart_can_be_empty() {
        let pipeline = Pipeline::new(dataset());
        let params = WatershedParams {
            habvar: "StnCanopy".to_string(),
            hab_types: types(&[HabType::Pool]),
            years: None,
            show_observations: false,
        };
        let chart = pipeline.watershed_chart(&params);
        assert!(chart.cells.is_empty());
        assert!(chart.lines.is_empty());
    }

    #[test]
    fn test_site_view_requires_selection() {
        let pipeline = Pipeline::new(dataset());
        let mut params = SiteParams {
            site: None,
            habvar: "StnFines".to_string(),
            hab_types: BTreeSet::new(),
            years: None,
            y_axis_mode: YAxisMode::Deviation,
        };
        assert!(pipeline.site_view(&params).is_none());

        params.site = Some("C1".to_string());
        let view = pipeline.site_view(&params);
        let view = (*view).as_ref().unwrap();
        assert_eq!(view.detail.facets.len(), 2);
        let run = &view.chart.facets[0];
        assert_eq!(run.hab_type, HabType::Run);
        let total: f64 = run.bars.iter().map(|b| b.y).sum();
        assert!(total.abs() < 1e-9);
    }

    #[test]
    fn test_overview_markers_for_one_year() {
        let pipeline = Pipeline::new(dataset());
        let params = OverviewParams {
            habvar: "StnFines".to_string(),
            hab_type: HabType::Run,
            year: 2012,
        };
        let markers = pipeline.overview(&params);
        assert_eq!(markers.len(), 2);
        assert!(markers.iter().all(|m| m.label.contains("2012")));
    }

    #[test]
    fn test_identical_runs_are_identical() {
        let params = TrendParams {
            habvar: "StnFines".to_string(),
            hab_types: BTreeSet::new(),
            years: Some(YearRange(2011, 2015)),
        };
        let a = Pipeline::new(dataset()).trend_map(&params);
        let b = Pipeline::new(dataset()).trend_map(&params);
        assert_eq!(*a, *b);
    }
}
