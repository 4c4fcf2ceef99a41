//! Movie listing filters and their two URL encodings
//!
//! A filter reaches the catalog either as an embedded query string
//! (`durationMin=90&genres=acao,aventura`) or as a list of path segments
//! (`dur-gte-90/genre-acao,aventura`). Both decode into a [`FilterSet`].
//!
//! Decoding never fails: a key whose value cannot be read is left out, and a
//! filter that ends up with no usable key is reported as `None` so the query
//! layer can skip filtering altogether.

use chrono::{DateTime, Local, TimeZone, Utc};
use common::clock::{end_of_day, start_of_day};
use serde::Serialize;
use url::form_urlencoded;

use crate::{
    dates::{format_day_in, parse_calendar_date_in},
    genres,
    models::Movie,
};

const SEARCH: &str = "search";
const DURATION_MIN: &str = "durationMin";
const DURATION_MAX: &str = "durationMax";
const RELEASED_START: &str = "releasedStart";
const RELEASED_END: &str = "releasedEnd";
const GENRES: &str = "genres";
const VOTE_MIN: &str = "voteMin";

const SEGMENT_DURATION_MIN: &str = "dur-gte-";
const SEGMENT_DURATION_MAX: &str = "dur-lte-";
const SEGMENT_DATE: &str = "date-";
const SEGMENT_GENRE: &str = "genre-";
const SEGMENT_VOTE_MIN: &str = "vote-gte-";
const SEGMENT_SEARCH: &str = "search-";

/// Votes above this are read as a 0-100 score.
const VOTE_SCALE_MAX: f64 = 10.0;

/// Structured listing filter. Every supplied predicate is ANDed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSet {
    /// Case-insensitive substring of title or original title
    pub search: Option<String>,
    /// Minimum runtime in minutes, inclusive
    pub duration_min: Option<i32>,
    /// Maximum runtime in minutes, inclusive
    pub duration_max: Option<i32>,
    /// Earliest release instant, inclusive (start of a local day)
    pub released_start: Option<DateTime<Utc>>,
    /// Latest release instant, inclusive (end of a local day)
    pub released_end: Option<DateTime<Utc>>,
    /// Lowercase genre tokens; a movie matches when it shares at least one
    pub genres: Vec<String>,
    /// Minimum vote average on the 0-10 scale
    pub vote_min: Option<f64>,
}

/// Where a listing request carried its filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FilterSource {
    #[default]
    None,
    /// Embedded query-string form
    Query(String),
    /// Path-segment form
    Segments(Vec<String>),
}

impl FilterSource {
    /// Decode in the server's local calendar.
    pub fn parse(&self) -> Option<FilterSet> {
        match self {
            FilterSource::None => None,
            FilterSource::Query(raw) => parse_query(raw),
            FilterSource::Segments(segments) => parse_segments(segments),
        }
    }
}

/// Raw, still textual filter values keyed by query-string name.
#[derive(Debug, Default)]
struct RawParams {
    search: Option<String>,
    duration_min: Option<String>,
    duration_max: Option<String>,
    released_start: Option<String>,
    released_end: Option<String>,
    genres: Option<String>,
    vote_min: Option<String>,
}

impl RawParams {
    fn slot(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            SEARCH => Some(&mut self.search),
            DURATION_MIN => Some(&mut self.duration_min),
            DURATION_MAX => Some(&mut self.duration_max),
            RELEASED_START => Some(&mut self.released_start),
            RELEASED_END => Some(&mut self.released_end),
            GENRES => Some(&mut self.genres),
            VOTE_MIN => Some(&mut self.vote_min),
            _ => None,
        }
    }

    /// Query-string semantics: the first occurrence of a key wins.
    fn insert_first(&mut self, key: &str, value: String) {
        if let Some(slot) = self.slot(key) {
            if slot.is_none() {
                *slot = Some(value);
            }
        }
    }

    /// Segment semantics: a later segment overrides an earlier one.
    fn set(&mut self, key: &str, value: &str) {
        if let Some(slot) = self.slot(key) {
            *slot = Some(value.to_string());
        }
    }

    fn into_filters<Tz: TimeZone>(self, tz: &Tz) -> Option<FilterSet> {
        let filters = FilterSet {
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(str::to_string),
            duration_min: self
                .duration_min
                .as_deref()
                .and_then(parse_number)
                .map(|minutes| to_minutes(minutes.ceil())),
            duration_max: self
                .duration_max
                .as_deref()
                .and_then(parse_number)
                .map(|minutes| to_minutes(minutes.floor())),
            released_start: self
                .released_start
                .as_deref()
                .and_then(|value| parse_calendar_date_in(value, tz))
                .map(|day| start_of_day(tz, day)),
            released_end: self
                .released_end
                .as_deref()
                .and_then(|value| parse_calendar_date_in(value, tz))
                .map(|day| end_of_day(tz, day)),
            genres: self
                .genres
                .as_deref()
                .map(genres::split_csv)
                .unwrap_or_default(),
            vote_min: self
                .vote_min
                .as_deref()
                .and_then(parse_number)
                .map(normalize_vote),
        };

        (!filters.is_empty()).then_some(filters)
    }
}

/// Decode the query-string form in the server's local calendar.
pub fn parse_query(raw: &str) -> Option<FilterSet> {
    parse_query_in(raw, &Local)
}

/// Decode the query-string form, reading dates in `tz`.
pub fn parse_query_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<FilterSet> {
    let raw = raw.trim();
    let raw = raw.strip_prefix('?').unwrap_or(raw);
    if raw.is_empty() {
        return None;
    }

    let mut params = RawParams::default();
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        params.insert_first(&key, value.into_owned());
    }

    params.into_filters(tz)
}

/// Decode the path-segment form in the server's local calendar.
pub fn parse_segments<S: AsRef<str>>(segments: &[S]) -> Option<FilterSet> {
    parse_segments_in(segments, &Local)
}

/// Decode the path-segment form, reading dates in `tz`.
pub fn parse_segments_in<S: AsRef<str>, Tz: TimeZone>(
    segments: &[S],
    tz: &Tz,
) -> Option<FilterSet> {
    let mut params = RawParams::default();

    for segment in segments {
        let segment = segment.as_ref().trim();

        if let Some(value) = segment.strip_prefix(SEGMENT_DURATION_MIN) {
            params.set(DURATION_MIN, value);
        } else if let Some(value) = segment.strip_prefix(SEGMENT_DURATION_MAX) {
            params.set(DURATION_MAX, value);
        } else if let Some(range) = segment.strip_prefix(SEGMENT_DATE) {
            let mut sides = range.split('_');
            let start = sides.next().unwrap_or_default();
            let end = sides.next().unwrap_or_default();
            if !start.is_empty() {
                params.set(RELEASED_START, start);
            }
            if !end.is_empty() {
                params.set(RELEASED_END, end);
            }
        } else if let Some(value) = segment.strip_prefix(SEGMENT_GENRE) {
            if let Ok(decoded) = urlencoding::decode(value) {
                params.set(GENRES, &decoded);
            }
        } else if let Some(value) = segment.strip_prefix(SEGMENT_VOTE_MIN) {
            params.set(VOTE_MIN, value);
        } else if let Some(value) = segment.strip_prefix(SEGMENT_SEARCH) {
            if let Ok(decoded) = urlencoding::decode(value) {
                params.set(SEARCH, &decoded);
            }
        }
    }

    params.into_filters(tz)
}

/// Fold a free-text `search` given next to the encoded filter into it.
/// A search term already present in the encoded filter wins.
pub fn with_fallback_search(filters: Option<FilterSet>, search: Option<&str>) -> Option<FilterSet> {
    let search = search.map(str::trim).filter(|term| !term.is_empty());

    match (filters, search) {
        (Some(filters), _) if filters.search.is_some() => Some(filters),
        (filters, Some(term)) => {
            let mut filters = filters.unwrap_or_default();
            filters.search = Some(term.to_string());
            Some(filters)
        }
        (filters, None) => filters,
    }
}

impl FilterSet {
    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.duration_min.is_none()
            && self.duration_max.is_none()
            && self.released_start.is_none()
            && self.released_end.is_none()
            && self.genres.is_empty()
            && self.vote_min.is_none()
    }

    /// Evaluate the filter against one movie. Mirrors the SQL built by the
    /// PostgreSQL store: a predicate on a column that is `NULL` fails.
    pub fn matches(&self, movie: &Movie) -> bool {
        if let Some(term) = &self.search {
            let term = term.to_lowercase();
            let in_title = movie.title.to_lowercase().contains(&term);
            let in_original = movie
                .original_title
                .as_deref()
                .is_some_and(|title| title.to_lowercase().contains(&term));
            if !in_title && !in_original {
                return false;
            }
        }

        if self.duration_min.is_some() || self.duration_max.is_some() {
            let Some(runtime) = movie.runtime else {
                return false;
            };
            if self.duration_min.is_some_and(|min| runtime < min)
                || self.duration_max.is_some_and(|max| runtime > max)
            {
                return false;
            }
        }

        if self.released_start.is_some() || self.released_end.is_some() {
            let Some(released) = movie.release_date else {
                return false;
            };
            if self.released_start.is_some_and(|start| released < start)
                || self.released_end.is_some_and(|end| released > end)
            {
                return false;
            }
        }

        if !self.genres.is_empty()
            && !movie
                .genres
                .iter()
                .any(|genre| self.genres.contains(genre))
        {
            return false;
        }

        if let Some(min) = self.vote_min {
            if !movie.vote_average.is_some_and(|vote| vote >= min) {
                return false;
            }
        }

        true
    }

    /// Query-string form, dates rendered in the server's local calendar.
    pub fn to_query_string(&self) -> String {
        self.to_query_string_in(&Local)
    }

    pub fn to_query_string_in<Tz: TimeZone>(&self, tz: &Tz) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());

        if let Some(term) = &self.search {
            out.append_pair(SEARCH, term);
        }
        if let Some(min) = self.duration_min {
            out.append_pair(DURATION_MIN, &min.to_string());
        }
        if let Some(max) = self.duration_max {
            out.append_pair(DURATION_MAX, &max.to_string());
        }
        if let Some(start) = &self.released_start {
            out.append_pair(RELEASED_START, &format_day_in(start, tz));
        }
        if let Some(end) = &self.released_end {
            out.append_pair(RELEASED_END, &format_day_in(end, tz));
        }
        if !self.genres.is_empty() {
            out.append_pair(GENRES, &self.genres.join(","));
        }
        if let Some(vote) = self.vote_min {
            out.append_pair(VOTE_MIN, &vote.to_string());
        }

        out.finish()
    }

    /// Path-segment form, dates rendered in the server's local calendar.
    pub fn to_segments(&self) -> Vec<String> {
        self.to_segments_in(&Local)
    }

    pub fn to_segments_in<Tz: TimeZone>(&self, tz: &Tz) -> Vec<String> {
        let mut segments = Vec::new();

        if let Some(min) = self.duration_min {
            segments.push(format!("{SEGMENT_DURATION_MIN}{min}"));
        }
        if let Some(max) = self.duration_max {
            segments.push(format!("{SEGMENT_DURATION_MAX}{max}"));
        }
        if self.released_start.is_some() || self.released_end.is_some() {
            let start = self
                .released_start
                .map(|start| format_day_in(&start, tz))
                .unwrap_or_default();
            let end = self
                .released_end
                .map(|end| format_day_in(&end, tz))
                .unwrap_or_default();
            segments.push(format!("{SEGMENT_DATE}{start}_{end}"));
        }
        if !self.genres.is_empty() {
            let genres: Vec<_> = self
                .genres
                .iter()
                .map(|genre| urlencoding::encode(genre))
                .collect();
            segments.push(format!("{SEGMENT_GENRE}{}", genres.join(",")));
        }
        if let Some(vote) = self.vote_min {
            segments.push(format!("{SEGMENT_VOTE_MIN}{vote}"));
        }
        if let Some(term) = &self.search {
            segments.push(format!("{SEGMENT_SEARCH}{}", urlencoding::encode(term)));
        }

        segments
    }
}

/// A finite number, or nothing.
fn parse_number(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    value.parse::<f64>().ok().filter(|number| number.is_finite())
}

/// Out-of-range minutes saturate so the bound still narrows the listing.
fn to_minutes(value: f64) -> i32 {
    value as i32
}

fn normalize_vote(vote: f64) -> f64 {
    if vote > VOTE_SCALE_MAX {
        vote / 10.0
    } else {
        vote
    }
}
