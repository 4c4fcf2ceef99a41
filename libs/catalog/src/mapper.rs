//! Mapping from request payloads to store records
//!
//! Text fields are trimmed and an empty value becomes `NULL`. Release dates
//! are read in the server's local calendar.

use chrono::{DateTime, Local, Utc};
use uuid::Uuid;

use crate::{
    dates::parse_instant_in,
    genres,
    models::{Movie, MovieChanges, MovieInput, MoviePatch, NewMovie},
};

/// Trimmed text, or `None` when nothing is left.
pub fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn release_date(value: Option<String>) -> Option<DateTime<Utc>> {
    value.and_then(|raw| parse_instant_in(&raw, &Local))
}

/// Normalize a creation payload. New movies always start un-reminded.
pub fn new_movie(owner_id: Uuid, input: MovieInput) -> NewMovie {
    NewMovie {
        owner_id,
        title: input.title.trim().to_string(),
        original_title: normalize_text(input.original_title),
        tagline: normalize_text(input.tagline),
        overview: normalize_text(input.overview),
        release_date: release_date(input.release_date),
        runtime: input.runtime,
        genres: input
            .genres
            .map(genres::normalize_tokens)
            .unwrap_or_default(),
        poster_url: normalize_text(input.poster_url),
        backdrop_url: normalize_text(input.backdrop_url),
        trailer: normalize_text(input.trailer),
        vote_average: input.vote_average,
        vote_count: input.vote_count,
        budget: input.budget,
        revenue: input.revenue,
        reminder_sent: false,
    }
}

/// Normalize an update payload against the stored movie.
///
/// When `releaseDate` is supplied the reminder flag follows it: a date in the
/// future re-arms the reminder, and removing a date that existed marks the
/// reminder as spent.
pub fn movie_changes(patch: MoviePatch, previous: &Movie, now: DateTime<Utc>) -> MovieChanges {
    let mut changes = MovieChanges {
        title: patch.title.map(|title| title.trim().to_string()),
        original_title: patch.original_title.map(normalize_text),
        tagline: patch.tagline.map(normalize_text),
        overview: patch.overview.map(normalize_text),
        release_date: patch.release_date.map(release_date),
        runtime: patch.runtime,
        genres: patch.genres.map(genres::normalize_tokens),
        poster_url: patch.poster_url.map(normalize_text),
        backdrop_url: patch.backdrop_url.map(normalize_text),
        trailer: patch.trailer.map(normalize_text),
        vote_average: patch.vote_average,
        vote_count: patch.vote_count,
        budget: patch.budget,
        revenue: patch.revenue,
        reminder_sent: None,
    };

    changes.reminder_sent = match changes.release_date {
        Some(Some(released)) if released > now => Some(false),
        Some(None) if previous.release_date.is_some() => Some(true),
        _ => None,
    };

    changes
}
