//! Paginated listing queries over the catalog store.
//!
//! Each listing combines an optional case-insensitive substring search with an optional
//! type filter, fetches one page and counts the full match set concurrently, and wraps
//! the result in an envelope with `currentPage`, `totalPages` and `total`.

use crate::catalog::{Career, CollegeExam, EntryKind, RiasecType};
use crate::error::{CatalogError, Result};
use crate::store::{CareerFilter, CatalogStore, EntryFilter, PageWindow, SearchText};
use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: u64 = 10;

/// Raw listing query string. Values stay strings so malformed input degrades to defaults
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ListParams {
    pub fn with_page(mut self, page: u64) -> Self {
        self.page = Some(page.to_string());
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit.to_string());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn page_request(&self, default_limit: u64) -> PageRequest {
        let page = match leading_int(self.page.as_deref()) {
            Some(p) if p >= 1 => p as u64,
            _ => 1,
        };
        let limit = match leading_int(self.limit.as_deref()) {
            Some(l) if l >= 1 => l as u64,
            _ => default_limit,
        };
        PageRequest { page, limit }
    }

    fn search_text(&self) -> Option<SearchText> {
        self.search.as_deref().and_then(SearchText::new)
    }
}

/// Parse the leading integer of a string the way browsers' `parseInt` does: `"9abc"` is 9,
/// `"abc"` is nothing.
fn leading_int(raw: Option<&str>) -> Option<i64> {
    let s = raw?.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Overlong numbers saturate rather than fail
    let value = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(sign * value)
}

/// A validated page number and size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn window(&self) -> PageWindow {
        PageWindow {
            skip: (self.page - 1).saturating_mul(self.limit),
            limit: self.limit,
        }
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerPage {
    pub careers: Vec<Career>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total: u64,
}

/// College/exam envelope. `exams` and `colleges` split only the current page, not the
/// whole match set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPage {
    pub items: Vec<CollegeExam>,
    pub exams: Vec<CollegeExam>,
    pub colleges: Vec<CollegeExam>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total: u64,
}

/// Listing query for careers. `filter` is None when the type filter names no RIASEC type,
/// in which case nothing can match.
#[derive(Debug, Clone, PartialEq)]
pub struct CareerQuery {
    pub page: PageRequest,
    pub filter: Option<CareerFilter>,
}

impl CareerQuery {
    pub fn from_params(params: &ListParams, default_limit: u64) -> Self {
        let kind = match params.kind.as_deref().filter(|k| !k.is_empty()) {
            None => Ok(None),
            Some(raw) => raw.parse::<RiasecType>().map(Some),
        };
        Self {
            page: params.page_request(default_limit),
            filter: kind.ok().map(|kind| CareerFilter {
                search: params.search_text(),
                kind,
            }),
        }
    }
}

/// Listing query for the college/exam directory
#[derive(Debug, Clone, PartialEq)]
pub struct EntryQuery {
    pub page: PageRequest,
    pub filter: Option<EntryFilter>,
}

impl EntryQuery {
    pub fn from_params(params: &ListParams, default_limit: u64) -> Self {
        let kind = match params.kind.as_deref().filter(|k| !k.is_empty()) {
            None => Ok(None),
            Some(raw) => raw.parse::<EntryKind>().map(Some),
        };
        Self {
            page: params.page_request(default_limit),
            filter: kind.ok().map(|kind| EntryFilter {
                search: params.search_text(),
                kind,
            }),
        }
    }
}

pub async fn list_careers(store: &dyn CatalogStore, query: &CareerQuery) -> Result<CareerPage> {
    let page = query.page;
    let Some(filter) = &query.filter else {
        return Ok(CareerPage {
            careers: Vec::new(),
            current_page: page.page,
            total_pages: 0,
            total: 0,
        });
    };

    let (total, careers) = tokio::try_join!(
        store.count_careers(filter),
        store.find_careers(filter, page.window())
    )?;

    Ok(CareerPage {
        careers,
        current_page: page.page,
        total_pages: page.total_pages(total),
        total,
    })
}

pub async fn list_entries(store: &dyn CatalogStore, query: &EntryQuery) -> Result<EntryPage> {
    let page = query.page;
    let Some(filter) = &query.filter else {
        return Ok(EntryPage {
            items: Vec::new(),
            exams: Vec::new(),
            colleges: Vec::new(),
            current_page: page.page,
            total_pages: 0,
            total: 0,
        });
    };

    let (total, items) = tokio::try_join!(
        store.count_entries(filter),
        store.find_entries(filter, page.window())
    )?;

    let (exams, colleges): (Vec<_>, Vec<_>) = items
        .iter()
        .cloned()
        .partition(|e| e.kind() == EntryKind::Exam);

    Ok(EntryPage {
        items,
        exams,
        colleges,
        current_page: page.page,
        total_pages: page.total_pages(total),
        total,
    })
}

/// Single career by its domain id. An id that is not a number cannot match any career.
pub async fn find_career(store: &dyn CatalogStore, raw_id: &str) -> Result<Career> {
    let career = match raw_id.trim().parse::<i64>() {
        Ok(id) => store.career_by_id(id).await?,
        Err(_) => None,
    };
    career.ok_or_else(|| CatalogError::not_found("Career not found"))
}
