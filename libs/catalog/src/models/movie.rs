//! Movie model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Movie entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub original_title: Option<String>,
    pub tagline: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<DateTime<Utc>>,
    pub runtime: Option<i32>,
    pub genres: Vec<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub trailer: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i32>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
    pub reminder_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Movie {
    /// A movie with a `deleted_at` marker is absent from every user-facing read.
    pub fn is_alive(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Movie creation payload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MovieInput {
    pub title: String,
    pub original_title: Option<String>,
    pub tagline: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<i32>,
    pub genres: Option<Vec<String>>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub trailer: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i32>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
}

/// Movie update payload
///
/// The outer `Option` tells whether the field was supplied at all; for
/// nullable columns the inner `None` (JSON `null`) clears the value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MoviePatch {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "supplied")]
    pub original_title: Option<Option<String>>,
    #[serde(default, deserialize_with = "supplied")]
    pub tagline: Option<Option<String>>,
    #[serde(default, deserialize_with = "supplied")]
    pub overview: Option<Option<String>>,
    #[serde(default, deserialize_with = "supplied")]
    pub release_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "supplied")]
    pub runtime: Option<Option<i32>>,
    pub genres: Option<Vec<String>>,
    #[serde(default, deserialize_with = "supplied")]
    pub poster_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "supplied")]
    pub backdrop_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "supplied")]
    pub trailer: Option<Option<String>>,
    #[serde(default, deserialize_with = "supplied")]
    pub vote_average: Option<Option<f64>>,
    #[serde(default, deserialize_with = "supplied")]
    pub vote_count: Option<Option<i32>>,
    #[serde(default, deserialize_with = "supplied")]
    pub budget: Option<Option<i64>>,
    #[serde(default, deserialize_with = "supplied")]
    pub revenue: Option<Option<i64>>,
}

/// Wraps any present value (including `null`) in `Some`; absent keys fall
/// back to `#[serde(default)]`.
fn supplied<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Normalized record handed to the store on create
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovie {
    pub owner_id: Uuid,
    pub title: String,
    pub original_title: Option<String>,
    pub tagline: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<DateTime<Utc>>,
    pub runtime: Option<i32>,
    pub genres: Vec<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub trailer: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i32>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
    pub reminder_sent: bool,
}

/// Normalized set of column changes handed to the store on update.
/// `None` leaves a column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieChanges {
    pub title: Option<String>,
    pub original_title: Option<Option<String>>,
    pub tagline: Option<Option<String>>,
    pub overview: Option<Option<String>>,
    pub release_date: Option<Option<DateTime<Utc>>>,
    pub runtime: Option<Option<i32>>,
    pub genres: Option<Vec<String>>,
    pub poster_url: Option<Option<String>>,
    pub backdrop_url: Option<Option<String>>,
    pub trailer: Option<Option<String>>,
    pub vote_average: Option<Option<f64>>,
    pub vote_count: Option<Option<i32>>,
    pub budget: Option<Option<i64>>,
    pub revenue: Option<Option<i64>>,
    pub reminder_sent: Option<bool>,
}

impl MovieChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Write the supplied fields onto `movie`, leaving the rest as they are.
    pub fn apply_to(&self, movie: &mut Movie) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }

        set(&mut movie.title, &self.title);
        set(&mut movie.original_title, &self.original_title);
        set(&mut movie.tagline, &self.tagline);
        set(&mut movie.overview, &self.overview);
        set(&mut movie.release_date, &self.release_date);
        set(&mut movie.runtime, &self.runtime);
        set(&mut movie.genres, &self.genres);
        set(&mut movie.poster_url, &self.poster_url);
        set(&mut movie.backdrop_url, &self.backdrop_url);
        set(&mut movie.trailer, &self.trailer);
        set(&mut movie.vote_average, &self.vote_average);
        set(&mut movie.vote_count, &self.vote_count);
        set(&mut movie.budget, &self.budget);
        set(&mut movie.revenue, &self.revenue);
        set(&mut movie.reminder_sent, &self.reminder_sent);
    }
}

/// One page of a movie listing
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePage {
    pub items: Vec<Movie>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// A movie releasing today whose owner has not been reminded yet
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DueReminder {
    pub movie_id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub release_date: DateTime<Utc>,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let patch: MoviePatch =
            serde_json::from_str(r#"{"releaseDate": null, "tagline": ""}"#).unwrap();

        assert_eq!(patch.release_date, Some(None));
        assert_eq!(patch.tagline, Some(Some(String::new())));
        assert_eq!(patch.overview, None);
        assert_eq!(patch.title, None);
    }

    #[test]
    fn input_rejects_unknown_fields() {
        let result: Result<MovieInput, _> =
            serde_json::from_str(r#"{"title": "Alien", "reminderSent": true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn changes_only_touch_supplied_fields() {
        let now = Utc::now();
        let mut movie = Movie {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Alien".to_string(),
            original_title: Some("Alien".to_string()),
            tagline: Some("In space no one can hear you scream.".to_string()),
            overview: None,
            release_date: None,
            runtime: Some(117),
            genres: vec!["horror".to_string()],
            poster_url: None,
            backdrop_url: None,
            trailer: None,
            vote_average: Some(8.5),
            vote_count: None,
            budget: None,
            revenue: None,
            reminder_sent: false,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let changes = MovieChanges {
            tagline: Some(None),
            runtime: Some(Some(116)),
            ..Default::default()
        };
        changes.apply_to(&mut movie);

        assert_eq!(movie.title, "Alien");
        assert_eq!(movie.tagline, None);
        assert_eq!(movie.runtime, Some(116));
        assert_eq!(movie.genres, vec!["horror".to_string()]);
        assert_eq!(movie.vote_average, Some(8.5));
        assert!(!changes.is_empty());
        assert!(MovieChanges::default().is_empty());
    }
}
