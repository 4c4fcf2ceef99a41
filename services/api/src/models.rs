//! API models for request and response payloads

use catalog::{ListQuery, filters::FilterSource};
use serde::Deserialize;

/// Query parameters of `GET /movies` and `GET /movies/filter/*segments`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMoviesQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    /// Query-string filter encoding, e.g. `durationMin=90&genres=drama`
    pub filters: Option<String>,
}

impl ListMoviesQuery {
    /// Listing request using the embedded query-string filter, if any.
    pub fn into_list_query(mut self) -> ListQuery {
        let filters = self
            .filters
            .take()
            .map(FilterSource::Query)
            .unwrap_or_default();
        self.with_source(filters)
    }

    /// Listing request using filter segments taken from the path.
    ///
    /// `segments` must still be percent-encoded: an encoded `/` inside a
    /// search term is not a separator.
    pub fn into_segment_query(self, segments: &str) -> ListQuery {
        let segments = segments
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        self.with_source(FilterSource::Segments(segments))
    }

    fn with_source(self, filters: FilterSource) -> ListQuery {
        ListQuery {
            page: self.page,
            per_page: self.per_page,
            search: self.search,
            filters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_are_split_on_slashes() {
        let query = ListMoviesQuery::default().into_segment_query("/dur-gte-90//genre-drama/");
        assert_eq!(
            query.filters,
            FilterSource::Segments(vec!["dur-gte-90".to_string(), "genre-drama".to_string()])
        );
    }

    #[test]
    fn encoded_slashes_stay_inside_their_segment() {
        let query = ListMoviesQuery::default().into_segment_query("dur-gte-90/search-AC%2FDC");
        assert_eq!(
            query.filters,
            FilterSource::Segments(vec!["dur-gte-90".to_string(), "search-AC%2FDC".to_string()])
        );
    }

    #[test]
    fn embedded_filters_become_the_query_source() {
        let query = ListMoviesQuery {
            filters: Some("durationMin=90".to_string()),
            search: Some("heat".to_string()),
            ..Default::default()
        }
        .into_list_query();

        assert_eq!(query.filters, FilterSource::Query("durationMin=90".to_string()));
        assert_eq!(query.search.as_deref(), Some("heat"));
    }

    #[test]
    fn missing_filters_mean_no_source() {
        let query = ListMoviesQuery {
            page: Some(2),
            ..Default::default()
        }
        .into_list_query();

        assert_eq!(query.filters, FilterSource::None);
        assert_eq!(query.page, Some(2));
    }
}
