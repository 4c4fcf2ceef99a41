//! Input validation for movie payloads

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{MovieInput, MoviePatch};

/// Validate title
pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Title is required".to_string());
    }

    Ok(())
}

/// Validate original title; it may be omitted but never blank
pub fn validate_original_title(original_title: Option<&str>) -> Result<(), String> {
    if original_title.is_some_and(|value| value.trim().is_empty()) {
        return Err("Original title must not be empty".to_string());
    }

    Ok(())
}

/// Validate a count-like field (runtime, vote count, budget, revenue)
pub fn validate_non_negative(field: &str, value: Option<i64>) -> Result<(), String> {
    if value.is_some_and(|value| value < 0) {
        return Err(format!("{field} must not be negative"));
    }

    Ok(())
}

/// Validate vote average
pub fn validate_vote_average(vote_average: Option<f64>) -> Result<(), String> {
    match vote_average {
        Some(vote) if !vote.is_finite() || !(0.0..=10.0).contains(&vote) => {
            Err("Vote average must be between 0 and 10".to_string())
        }
        _ => Ok(()),
    }
}

/// Validate an http(s) link such as a poster, backdrop or trailer
pub fn validate_url(field: &str, url: Option<&str>) -> Result<(), String> {
    let Some(url) = url.map(str::trim).filter(|url| !url.is_empty()) else {
        return Ok(());
    };

    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = URL_REGEX
        .get_or_init(|| Regex::new(r"^https?://\S+$").expect("Failed to compile url regex"));

    if !regex.is_match(url) {
        return Err(format!("{field} must be an http or https URL"));
    }

    Ok(())
}

/// Validate a creation payload
pub fn validate_input(input: &MovieInput) -> Result<(), String> {
    validate_title(&input.title)?;
    validate_original_title(input.original_title.as_deref())?;
    validate_non_negative("Runtime", input.runtime.map(i64::from))?;
    validate_non_negative("Vote count", input.vote_count.map(i64::from))?;
    validate_non_negative("Budget", input.budget)?;
    validate_non_negative("Revenue", input.revenue)?;
    validate_vote_average(input.vote_average)?;
    validate_url("Poster URL", input.poster_url.as_deref())?;
    validate_url("Backdrop URL", input.backdrop_url.as_deref())?;
    validate_url("Trailer", input.trailer.as_deref())?;

    Ok(())
}

/// Validate an update payload; only supplied fields are checked
pub fn validate_patch(patch: &MoviePatch) -> Result<(), String> {
    if let Some(title) = &patch.title {
        validate_title(title)?;
    }
    if let Some(original_title) = &patch.original_title {
        validate_original_title(original_title.as_deref())?;
    }
    validate_non_negative("Runtime", patch.runtime.flatten().map(i64::from))?;
    validate_non_negative("Vote count", patch.vote_count.flatten().map(i64::from))?;
    validate_non_negative("Budget", patch.budget.flatten())?;
    validate_non_negative("Revenue", patch.revenue.flatten())?;
    validate_vote_average(patch.vote_average.flatten())?;
    validate_url("Poster URL", patch.poster_url.as_ref().and_then(|v| v.as_deref()))?;
    validate_url("Backdrop URL", patch.backdrop_url.as_ref().and_then(|v| v.as_deref()))?;
    validate_url("Trailer", patch.trailer.as_ref().and_then(|v| v.as_deref()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_must_have_content() {
        assert!(validate_title("Alien").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
    }

    #[test]
    fn original_title_is_optional_but_not_blank() {
        assert!(validate_original_title(None).is_ok());
        assert!(validate_original_title(Some("Il padrino")).is_ok());
        assert!(validate_original_title(Some(" ")).is_err());
    }

    #[test]
    fn vote_average_stays_on_ten_point_scale() {
        assert!(validate_vote_average(None).is_ok());
        assert!(validate_vote_average(Some(0.0)).is_ok());
        assert!(validate_vote_average(Some(10.0)).is_ok());
        assert!(validate_vote_average(Some(10.5)).is_err());
        assert!(validate_vote_average(Some(-1.0)).is_err());
        assert!(validate_vote_average(Some(f64::NAN)).is_err());
    }

    #[test]
    fn urls_need_an_http_scheme() {
        assert!(validate_url("Poster URL", None).is_ok());
        assert!(validate_url("Poster URL", Some("")).is_ok());
        assert!(validate_url("Poster URL", Some("https://image.tmdb.org/p.jpg")).is_ok());
        assert!(validate_url("Poster URL", Some("ftp://example.com/p.jpg")).is_err());
        assert!(validate_url("Poster URL", Some("not a url")).is_err());
    }

    #[test]
    fn input_reports_first_problem() {
        let input = MovieInput {
            title: "Alien".to_string(),
            runtime: Some(-5),
            vote_average: Some(11.0),
            ..Default::default()
        };

        assert_eq!(
            validate_input(&input),
            Err("Runtime must not be negative".to_string())
        );
    }

    #[test]
    fn patch_ignores_cleared_fields() {
        let patch = MoviePatch {
            runtime: Some(None),
            poster_url: Some(None),
            ..Default::default()
        };
        assert!(validate_patch(&patch).is_ok());

        let blank_title = MoviePatch {
            title: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(validate_patch(&blank_title).is_err());
    }
}
