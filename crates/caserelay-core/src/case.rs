use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::properties::TITLE;

/// Queries shorter than this (after trimming) never reach the remote service.
pub const MIN_QUERY_LEN: usize = 2;

/// Maximum number of cases returned per search.
pub const SEARCH_PAGE_SIZE: u32 = 10;

/// Placeholder for a case whose title is missing or empty.
pub const UNTITLED: &str = "(untitled)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseMatch {
    pub id: String,
    pub title: String,
}

/// A page as returned by a database query. Only the fields used for search
/// results are decoded.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryResults {
    #[serde(default)]
    pub results: Vec<Page>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleContains {
    pub contains: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleFilter {
    pub property: String,
    pub title: TitleContains,
}

/// Body of a title-substring database query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseQuery {
    pub filter: TitleFilter,
    pub page_size: u32,
}

impl CaseQuery {
    pub fn title_contains(query: &str) -> Self {
        Self {
            filter: TitleFilter {
                property: TITLE.into(),
                title: TitleContains {
                    contains: query.into(),
                },
            },
            page_size: SEARCH_PAGE_SIZE,
        }
    }
}

/// Trim a raw search query; `None` when it is too short to search for.
pub fn normalize_query(raw: &str) -> Option<&str> {
    let q = raw.trim();
    if q.chars().count() < MIN_QUERY_LEN {
        None
    } else {
        Some(q)
    }
}

/// Concatenate the `plain_text` of every fragment of the page's title property.
pub fn page_title(page: &Page) -> String {
    let title: String = page
        .properties
        .get(TITLE)
        .and_then(|p| p.get("title"))
        .and_then(Value::as_array)
        .map(|fragments| {
            fragments
                .iter()
                .filter_map(|f| f.get("plain_text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();
    if title.is_empty() {
        UNTITLED.to_string()
    } else {
        title
    }
}

impl From<&Page> for CaseMatch {
    fn from(page: &Page) -> Self {
        Self {
            id: page.id.clone(),
            title: page_title(page),
        }
    }
}
