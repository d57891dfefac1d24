//! API Response types
//!
//! Envelopes the backend wraps around plain messages and paginated lists.

use serde::{Deserialize, Serialize};

/// Plain acknowledgement returned by most mutations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timestamp: None,
            data: None,
        }
    }
}

/// Spring-style page of results (0-based `current_page`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_elements: u64,
    pub page_size: u32,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> PageResponse<T> {
    /// Build a page from a slice of items, computing the derived flags
    pub fn new(content: Vec<T>, current_page: u32, page_size: u32, total_elements: u64) -> Self {
        let total_pages = if page_size == 0 {
            0
        } else {
            total_elements.div_ceil(page_size as u64) as u32
        };
        let empty = content.is_empty();
        Self {
            content,
            current_page,
            total_pages,
            total_elements,
            page_size,
            first: current_page == 0,
            last: total_pages == 0 || current_page + 1 >= total_pages,
            empty,
        }
    }

    /// Index of the next page, if any
    pub fn next_page(&self) -> Option<u32> {
        (!self.last).then_some(self.current_page + 1)
    }
}

/// Sort direction for paginated queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}
