//! Ordered collection of series sources.
//!
//! Registry order is the chart series order: a series index reported by the
//! chart maps straight back to the source at that position.

use crate::domain::{ArticleRequest, Interval, Metric, Series};

use super::source::SeriesSource;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRegistry {
    sources: Vec<SeriesSource>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source. Only used while the registry is being populated.
    pub fn push(&mut self, source: SeriesSource) {
        self.sources.push(source);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SeriesSource> {
        self.sources.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesSource> {
        self.sources.iter()
    }

    /// One named series per source, in registry order.
    pub fn list_series(&self, metric: Metric) -> Vec<Series> {
        self.sources
            .iter()
            .map(|source| Series {
                name: source.label.clone(),
                points: source.make_series(metric),
            })
            .collect()
    }

    /// Interval of the first source; drives the x-axis label and tick format.
    pub fn interval(&self) -> Option<Interval> {
        self.sources.first().map(SeriesSource::interval)
    }

    /// Resolve a selected chart point back to the article request for it.
    pub fn resolve(&self, series_index: usize, timestamp_ms: i64) -> Option<ArticleRequest> {
        let source = self.get(series_index)?;
        let query_date = source.query_date(timestamp_ms)?;
        Some(ArticleRequest {
            label: source.label.clone(),
            query_date,
            api_query: source.api_query.clone(),
        })
    }
}

impl FromIterator<SeriesSource> for SourceRegistry {
    fn from_iter<I: IntoIterator<Item = SeriesSource>>(iter: I) -> Self {
        Self {
            sources: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CountEntry, QueryDate, SeriesData, utc_month_start_ms};
    use indexmap::IndexMap;

    fn yearly(label: &str, api_query: &str) -> SeriesSource {
        let mut years = IndexMap::new();
        years.insert(1900, CountEntry::new(10.0, 0.1));
        years.insert(1901, CountEntry::new(12.0, 0.2));
        SeriesSource::new(label, "", api_query, SeriesData::Yearly(years))
    }

    fn monthly(label: &str) -> SeriesSource {
        let mut months = IndexMap::new();
        months.insert(4, CountEntry::new(5.0, 0.05));
        let mut years = IndexMap::new();
        years.insert(2001, months);
        SeriesSource::new(label, "", "all=drought", SeriesData::Monthly(years))
    }

    #[test]
    fn list_series_keeps_registry_order_and_names() {
        let registry: SourceRegistry = ["flood", "drought", "bushfire"]
            .into_iter()
            .map(|name| yearly(name, ""))
            .collect();

        let series = registry.list_series(Metric::Total);
        assert_eq!(series.len(), 3);
        let names: Vec<_> = series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["flood", "drought", "bushfire"]);
        assert_eq!(series[1].points.len(), 2);
    }

    #[test]
    fn empty_registry_lists_nothing() {
        let registry = SourceRegistry::new();
        assert!(registry.list_series(Metric::Ratio).is_empty());
        assert_eq!(registry.interval(), None);
    }

    #[test]
    fn resolve_maps_index_back_to_owning_source() {
        let mut registry = SourceRegistry::new();
        registry.push(yearly("flood", "all=flood"));
        registry.push(monthly("drought"));

        let ts = utc_month_start_ms(2001, 4).unwrap();
        let req = registry.resolve(1, ts).unwrap();
        assert_eq!(req.label, "drought");
        assert_eq!(req.query_date, QueryDate::Month(2001, 4));
        assert_eq!(req.query_date.to_string(), "2001/04");
        assert_eq!(req.api_query, "all=drought");

        let req = registry.resolve(0, ts).unwrap();
        assert_eq!(req.query_date.to_string(), "2001");
        assert_eq!(req.api_query, "all=flood");

        assert!(registry.resolve(2, ts).is_none());
    }
}
