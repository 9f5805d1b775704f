//! Listing filter normalization.
//!
//! Query-string input arrives untyped; the HTTP boundary coerces it into
//! [`RawFilter`] (strings parsed, booleans coerced), and [`TodoFilter::from_raw`]
//! then validates the combined sort token into a typed descriptor. Nothing
//! past this point sees an unvalidated sort field.

use serde::{Deserialize, Serialize};

/// Field a listing can be sorted by. The wire names are the camelCase
/// tokens accepted in the `sort` query parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    #[serde(rename = "createdAt")]
    CreatedAt,
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "completed")]
    Completed,
}

impl SortField {
    /// Wire token, as it appears in the sort parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt => "createdAt",
            Self::Title => "title",
            Self::Completed => "completed",
        }
    }
}

impl std::str::FromStr for SortField {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(Self::CreatedAt),
            "title" => Ok(Self::Title),
            "completed" => Ok(Self::Completed),
            other => Err(format!("unknown sort field: {other}")),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort direction: {other}")),
        }
    }
}

/// Filter input after boundary coercion but before sort validation.
///
/// `completed` is already a real boolean here; turning `"true"`/`"false"`
/// strings into it is the caller's job. The offset/limit defaults mirror
/// the route handler they were lifted from: offset 20, limit 0. That pair
/// is inverted from pagination convention but is the observed behavior and
/// is kept as-is (a bare listing request fails downstream with
/// `invalid_pagination_params` because limit 0 never passes the window
/// calculator).
#[derive(Clone, Debug, PartialEq)]
pub struct RawFilter {
    pub query: Option<String>,
    pub completed: Option<bool>,
    pub sort: Option<String>,
    pub offset: i64,
    pub limit: i64,
}

pub const DEFAULT_OFFSET: i64 = 20;
pub const DEFAULT_LIMIT: i64 = 0;
pub const DEFAULT_SORT: &str = "createdAt_desc";

impl Default for RawFilter {
    fn default() -> Self {
        Self {
            query: None,
            completed: None,
            sort: None,
            offset: DEFAULT_OFFSET,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// A sort token that failed two-part validation. Carries the raw token and
/// whatever parts were parsed out of it, for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid sort: {sort}")]
pub struct InvalidSort {
    pub sort: String,
    pub field: Option<String>,
    pub direction: Option<String>,
}

/// Validated, typed filter descriptor consumed by the listing query.
#[derive(Clone, Debug, PartialEq)]
pub struct TodoFilter {
    pub search_text: Option<String>,
    pub completed: Option<bool>,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    pub offset: i64,
    pub limit: i64,
}

impl TodoFilter {
    /// Normalize a coerced filter input into a typed descriptor.
    ///
    /// The sort token `<field>_<direction>` splits on its last underscore;
    /// the field part must be one of the three sortable fields and the
    /// direction must be `asc` or `desc`. Search text and the completed
    /// flag pass through unchanged.
    pub fn from_raw(raw: RawFilter) -> Result<Self, InvalidSort> {
        let sort = raw.sort.as_deref().unwrap_or(DEFAULT_SORT);

        let Some((field_part, direction_part)) = sort.rsplit_once('_') else {
            return Err(InvalidSort {
                sort: sort.to_owned(),
                field: None,
                direction: None,
            });
        };

        let invalid = || InvalidSort {
            sort: sort.to_owned(),
            field: Some(field_part.to_owned()),
            direction: Some(direction_part.to_owned()),
        };
        let sort_field: SortField = field_part.parse().map_err(|_| invalid())?;
        let sort_direction: SortDirection = direction_part.parse().map_err(|_| invalid())?;

        Ok(Self {
            search_text: raw.query,
            completed: raw.completed,
            sort_field,
            sort_direction,
            offset: raw.offset,
            limit: raw.limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(sort: &str) -> RawFilter {
        RawFilter {
            sort: Some(sort.to_owned()),
            ..RawFilter::default()
        }
    }

    #[test]
    fn title_asc_parses() {
        let filter = TodoFilter::from_raw(raw("title_asc")).unwrap();
        assert_eq!(filter.sort_field, SortField::Title);
        assert_eq!(filter.sort_direction, SortDirection::Asc);
    }

    #[test]
    fn all_six_tokens_parse() {
        for field in ["createdAt", "title", "completed"] {
            for direction in ["asc", "desc"] {
                let token = format!("{field}_{direction}");
                let filter = TodoFilter::from_raw(raw(&token)).unwrap();
                assert_eq!(filter.sort_field.as_str(), field);
                assert_eq!(filter.sort_direction.as_str(), direction);
            }
        }
    }

    #[test]
    fn unknown_direction_rejected() {
        let err = TodoFilter::from_raw(raw("title_sideways")).unwrap_err();
        assert_eq!(err.sort, "title_sideways");
        assert_eq!(err.field.as_deref(), Some("title"));
        assert_eq!(err.direction.as_deref(), Some("sideways"));
    }

    #[test]
    fn unknown_field_rejected() {
        let err = TodoFilter::from_raw(raw("bogus_desc")).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("bogus"));
        assert_eq!(err.direction.as_deref(), Some("desc"));
    }

    #[test]
    fn token_without_underscore_rejected() {
        let err = TodoFilter::from_raw(raw("createdAt")).unwrap_err();
        assert_eq!(err.field, None);
        assert_eq!(err.direction, None);
    }

    #[test]
    fn missing_sort_defaults_to_created_at_desc() {
        let filter = TodoFilter::from_raw(RawFilter::default()).unwrap();
        assert_eq!(filter.sort_field, SortField::CreatedAt);
        assert_eq!(filter.sort_direction, SortDirection::Desc);
    }

    #[test]
    fn defaults_preserve_the_observed_swap() {
        // Observed route-handler defaults: offset 20, limit 0.
        let raw = RawFilter::default();
        assert_eq!(raw.offset, 20);
        assert_eq!(raw.limit, 0);
    }

    #[test]
    fn search_and_completed_pass_through() {
        let filter = TodoFilter::from_raw(RawFilter {
            query: Some("review".to_owned()),
            completed: Some(true),
            ..RawFilter::default()
        })
        .unwrap();
        assert_eq!(filter.search_text.as_deref(), Some("review"));
        assert_eq!(filter.completed, Some(true));
    }

    #[test]
    fn split_uses_last_underscore() {
        // Only the trailing direction token is split off; everything before
        // it is the field candidate.
        let err = TodoFilter::from_raw(raw("created_at_desc")).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("created_at"));
        assert_eq!(err.direction.as_deref(), Some("desc"));
    }
}
