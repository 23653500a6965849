use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::apperrors::AppError;

const CURSOR_PREFIX: &str = "DpKtJ4j9jDq";
pub const MAX_PAGE_SIZE: i32 = 200;
/// Page size used when a list query does not say.
pub const DEFAULT_PAGE_SIZE: i32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub start_cursor: String,
    pub end_cursor: String,
    pub has_next_page: bool,
}

/// A page of models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page_info: PageInfo,
    pub total_count: i32,
}

impl<T> Page<T> {
    /// Converts every item, failing on the first conversion error
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        Ok(Page {
            data: self.data.into_iter().map(f).collect::<Result<Vec<_>, E>>()?,
            page_info: self.page_info,
            total_count: self.total_count,
        })
    }
}

pub fn validate_page_size(page_size: i32) -> Result<(), AppError> {
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(AppError::InvalidData(format!(
            "page size must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }
    Ok(())
}

pub fn encode_offset_cursor(offset: i32) -> String {
    STANDARD.encode(format!("{}{}", CURSOR_PREFIX, offset))
}

/// The empty cursor points at the first page.
pub fn decode_offset_cursor(cursor: &str) -> Result<i32, AppError> {
    if cursor.is_empty() {
        return Ok(0);
    }
    let invalid = || AppError::InvalidData("cursor is not correct".to_string());

    let decoded = STANDARD.decode(cursor).map_err(|_| invalid())?;
    let decoded = String::from_utf8(decoded).map_err(|_| invalid())?;
    let offset = decoded
        .strip_prefix(CURSOR_PREFIX)
        .ok_or_else(invalid)?
        .parse::<i32>()
        .map_err(|_| invalid())?;
    if offset < 0 {
        return Err(invalid());
    }
    Ok(offset)
}

pub fn page_info(cursor: &str, offset: i32, page_size: i32, total_count: i32) -> PageInfo {
    let next_offset = offset.saturating_add(page_size);
    let has_next_page = total_count > next_offset;
    PageInfo {
        start_cursor: cursor.to_string(),
        end_cursor: if has_next_page {
            encode_offset_cursor(next_offset)
        } else {
            String::new()
        },
        has_next_page,
    }
}
