use crate::{hab_type::HabType, observation::Observation, year_range::YearRange};
use std::collections::BTreeSet;

/// Predicates selecting a subset of the habitat table.
///
/// An empty `hab_types` set and `None` fields select everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ObservationFilter {
    pub hab_types: BTreeSet<HabType>,
    pub habvar: Option<String>,
    pub years: Option<YearRange>,
    pub sites: Option<BTreeSet<String>>,
}

impl ObservationFilter {
    pub fn new() -> Self {
        ObservationFilter::default()
    }

    pub fn hab_types<I: IntoIterator<Item = HabType>>(mut self, hab_types: I) -> Self {
        self.hab_types = hab_types.into_iter().collect();
        self
    }

    pub fn habvar(mut self, habvar: &str) -> Self {
        self.habvar = Some(habvar.to_string());
        self
    }

    pub fn years(mut self, years: YearRange) -> Self {
        self.years = Some(years);
        self
    }

    pub fn sites<I: IntoIterator<Item = S>, S: Into<String>>(mut self, sites: I) -> Self {
        self.sites = Some(sites.into_iter().map(Into::into).collect());
        self
    }

    pub fn accepts_hab_type(&self, hab_type: HabType) -> bool {
        self.hab_types.is_empty() || self.hab_types.contains(&hab_type)
    }

    pub fn accepts_habvar(&self, habvar: &str) -> bool {
        self.habvar.as_deref().map_or(true, |v| v == habvar)
    }

    pub fn accepts_year(&self, year: i32) -> bool {
        self.years.map_or(true, |range| range.contains(year))
    }

    pub fn accepts_site(&self, site_id: &str) -> bool {
        self.sites
            .as_ref()
            .map_or(true, |sites| sites.contains(site_id))
    }

    pub fn matches(&self, observation: &Observation) -> bool {
        self.accepts_hab_type(observation.hab_type)
            && self.accepts_habvar(&observation.habvar)
            && self.accepts_year(observation.year)
            && self.accepts_site(&observation.site_id)
    }
}

#[cfg(test)]
mod tests {
    use super::ObservationFilter;
    use crate::{hab_type::HabType, location::Location, observation::Observation, year_range::YearRange};

    fn observation(site: &str, year: i32, hab_type: HabType) -> Observation {
        Observation {
            site_id: site.to_string(),
            year,
            hab_type,
            watershed: "Catherine".to_string(),
            habvar: "StnFines".to_string(),
            habval: Some(1.0),
            location: Location::default(),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = ObservationFilter::new();
        assert!(filter.matches(&observation("A", 2001, HabType::Pool)));
    }

    #[test]
    fn test_combined_predicates() {
        let filter = ObservationFilter::new()
            .hab_types([HabType::Run, HabType::Riffle])
            .habvar("StnFines")
            .years(YearRange(2005, 2010))
            .sites(["A"]);
        assert!(filter.matches(&observation("A", 2005, HabType::Run)));
        assert!(!filter.matches(&observation("A", 2005, HabType::Pool)));
        assert!(!filter.matches(&observation("A", 2011, HabType::Run)));
        assert!(!filter.matches(&observation("B", 2006, HabType::Riffle)));
    }
}
