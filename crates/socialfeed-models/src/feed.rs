//! Personalized feed query parameters.
//!
//! [`FeedParams`] is the raw query string; [`FeedQuery::parse`] validates it
//! into the typed query the stores execute.

use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use socialfeed_core::AppError;
use utoipa::IntoParams;

use crate::posts::Post;

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 25;
pub const MAX_SEARCH_LEN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Raw feed query string, every field optional and unparsed.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeedParams {
    /// Page size, 1 to 25 (default 20)
    pub limit: Option<String>,
    /// Rows to skip (default 0)
    pub offset: Option<String>,
    /// `asc` or `desc` by creation time (default `desc`)
    pub sort: Option<String>,
    /// Comma-separated tags; a post must carry all of them
    pub tags: Option<String>,
    /// Case-insensitive substring matched against title or content
    pub search: Option<String>,
    /// Lower bound on creation time (RFC 3339 or YYYY-MM-DD)
    pub since: Option<String>,
    /// Upper bound on creation time (RFC 3339 or YYYY-MM-DD)
    pub until: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
    pub limit: i64,
    pub offset: i64,
    pub sort: SortOrder,
    pub tags: Vec<String>,
    pub search: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
            sort: SortOrder::Desc,
            tags: Vec::new(),
            search: None,
            since: None,
            until: None,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn invalid(message: String) -> AppError {
    AppError::bad_request(anyhow!(message))
}

fn parse_instant(field: &str, raw: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| invalid(format!("{field} must be an ISO-8601 date")))
}

impl FeedQuery {
    pub fn parse(params: FeedParams) -> Result<Self, AppError> {
        let mut query = FeedQuery::default();

        if let Some(raw) = non_blank(params.limit) {
            query.limit = raw
                .parse::<i64>()
                .ok()
                .filter(|limit| (1..=MAX_LIMIT).contains(limit))
                .ok_or_else(|| invalid(format!("limit must be between 1 and {MAX_LIMIT}")))?;
        }

        if let Some(raw) = non_blank(params.offset) {
            query.offset = raw
                .parse::<i64>()
                .ok()
                .filter(|offset| *offset >= 0)
                .ok_or_else(|| invalid("offset must be a non-negative integer".to_string()))?;
        }

        if let Some(raw) = non_blank(params.sort) {
            query.sort = match raw.to_ascii_lowercase().as_str() {
                "asc" => SortOrder::Asc,
                "desc" => SortOrder::Desc,
                _ => return Err(invalid("sort must be asc or desc".to_string())),
            };
        }

        if let Some(raw) = params.tags {
            query.tags = crate::posts::normalize_tags(raw.split(',').map(str::to_string).collect());
        }

        if let Some(search) = non_blank(params.search) {
            if search.chars().count() > MAX_SEARCH_LEN {
                return Err(invalid(format!(
                    "search must be at most {MAX_SEARCH_LEN} characters"
                )));
            }
            query.search = Some(search);
        }

        if let Some(raw) = non_blank(params.since) {
            query.since = Some(parse_instant("since", &raw)?);
        }
        if let Some(raw) = non_blank(params.until) {
            query.until = Some(parse_instant("until", &raw)?);
        }
        if let (Some(since), Some(until)) = (query.since, query.until) {
            if since > until {
                return Err(invalid("since must not be after until".to_string()));
            }
        }

        Ok(query)
    }

    /// Filter predicate shared by backends that evaluate the feed in memory.
    /// Does not check authorship or apply ordering and paging.
    pub fn matches(&self, post: &Post) -> bool {
        if !self.tags.iter().all(|tag| post.tags.contains(tag)) {
            return false;
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !post.title.to_lowercase().contains(&needle)
                && !post.content.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if self.since.is_some_and(|since| post.created_at < since) {
            return false;
        }
        if self.until.is_some_and(|until| post.created_at > until) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{PostId, UserId};
    use chrono::TimeZone;
    use socialfeed_core::ErrorKind;

    fn params() -> FeedParams {
        FeedParams::default()
    }

    fn post(title: &str, content: &str, tags: &[&str]) -> Post {
        let at = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        Post {
            id: PostId::new(1),
            title: title.to_string(),
            content: content.to_string(),
            user_id: UserId::new(1),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            version: 0,
            comments_count: 0,
            created_at: at,
            updated_at: at,
        }
    }

    fn assert_rejected(params: FeedParams) {
        let err = FeedQuery::parse(params).expect_err("params should be rejected");
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_defaults() {
        let query = FeedQuery::parse(params()).unwrap();
        assert_eq!(query, FeedQuery::default());
        assert_eq!(query.limit, 20);
        assert_eq!(query.offset, 0);
        assert_eq!(query.sort, SortOrder::Desc);
    }

    #[test]
    fn test_limit_bounds() {
        for bad in ["0", "26", "-1", "ten"] {
            assert_rejected(FeedParams {
                limit: Some(bad.to_string()),
                ..params()
            });
        }
        let query = FeedQuery::parse(FeedParams {
            limit: Some("25".to_string()),
            offset: Some("40".to_string()),
            ..params()
        })
        .unwrap();
        assert_eq!((query.limit, query.offset), (25, 40));
    }

    #[test]
    fn test_negative_offset_rejected() {
        assert_rejected(FeedParams {
            offset: Some("-5".to_string()),
            ..params()
        });
    }

    #[test]
    fn test_sort_parsing() {
        let query = FeedQuery::parse(FeedParams {
            sort: Some("ASC".to_string()),
            ..params()
        })
        .unwrap();
        assert_eq!(query.sort, SortOrder::Asc);
        assert_rejected(FeedParams {
            sort: Some("sideways".to_string()),
            ..params()
        });
    }

    #[test]
    fn test_tags_split_and_trimmed() {
        let query = FeedQuery::parse(FeedParams {
            tags: Some(" rust, ,async ,rust".to_string()),
            ..params()
        })
        .unwrap();
        assert_eq!(query.tags, vec!["rust".to_string(), "async".to_string()]);
    }

    #[test]
    fn test_search_length() {
        assert_rejected(FeedParams {
            search: Some("s".repeat(101)),
            ..params()
        });
        let query = FeedQuery::parse(FeedParams {
            search: Some("  ".to_string()),
            ..params()
        })
        .unwrap();
        assert_eq!(query.search, None);
    }

    #[test]
    fn test_dates() {
        let query = FeedQuery::parse(FeedParams {
            since: Some("2024-01-01".to_string()),
            until: Some("2024-02-01T10:00:00+02:00".to_string()),
            ..params()
        })
        .unwrap();
        assert_eq!(
            query.since,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            query.until,
            Some(Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap())
        );

        assert_rejected(FeedParams {
            since: Some("yesterday".to_string()),
            ..params()
        });
        assert_rejected(FeedParams {
            since: Some("2024-03-01".to_string()),
            until: Some("2024-01-01".to_string()),
            ..params()
        });
    }

    #[test]
    fn test_matches_tags_as_subset() {
        let p = post("Hello", "World", &["rust", "async"]);
        let mut query = FeedQuery::default();
        assert!(query.matches(&p));

        query.tags = vec!["rust".to_string()];
        assert!(query.matches(&p));

        query.tags = vec!["rust".to_string(), "go".to_string()];
        assert!(!query.matches(&p));
    }

    #[test]
    fn test_matches_search_case_insensitive() {
        let p = post("Tokio Tips", "select! and join!", &[]);
        let query = FeedQuery {
            search: Some("tokio".to_string()),
            ..FeedQuery::default()
        };
        assert!(query.matches(&p));

        let query = FeedQuery {
            search: Some("JOIN".to_string()),
            ..FeedQuery::default()
        };
        assert!(query.matches(&p));

        let query = FeedQuery {
            search: Some("spawn".to_string()),
            ..FeedQuery::default()
        };
        assert!(!query.matches(&p));
    }

    #[test]
    fn test_matches_date_bounds() {
        let p = post("a", "b", &[]);
        let query = FeedQuery {
            since: Some(Utc.with_ymd_and_hms(2024, 5, 11, 0, 0, 0).unwrap()),
            ..FeedQuery::default()
        };
        assert!(!query.matches(&p));

        let query = FeedQuery {
            until: Some(Utc.with_ymd_and_hms(2024, 5, 11, 0, 0, 0).unwrap()),
            ..FeedQuery::default()
        };
        assert!(query.matches(&p));
    }
}
