//! Input validation for queries.
//!
//! Rejections come back as `ValidationError` values; re-prompting is the caller's job.

use std::sync::LazyLock;

use regex::Regex;

use super::types::{QueryRequest, YearRange};
use crate::error::ValidationError;

/// Field separator of the wire format; cannot appear inside a field.
const FIELD_SEPARATOR: char = ';';

/// Sentinel the prompt uses for "no time filter": `[-1,-1]`.
const NO_FILTER_YEAR: i32 = -1;

static RANGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[([^,\[\]]*),([^,\[\]]*)\]$").expect("range pattern is a valid regex")
});

impl QueryRequest {
    /// Builds a request after checking the author and accepting the year range as is.
    pub fn new(author: impl Into<String>, years: YearRange) -> Result<Self, ValidationError> {
        let author = author.into();
        validate_author(&author)?;
        if let YearRange::Between { start, end } = years
            && start > end
        {
            return Err(ValidationError::InvertedRange { start, end });
        }
        Ok(Self::from_validated(author, years))
    }
}

/// Author names must be non-empty and free of the field separator. Case and inner
/// spacing are kept, since nodes match the full name exactly.
pub fn validate_author(author: &str) -> Result<(), ValidationError> {
    if author.trim().is_empty() {
        return Err(ValidationError::EmptyAuthor);
    }
    if author.contains(FIELD_SEPARATOR) {
        return Err(ValidationError::ReservedCharacter {
            ch: FIELD_SEPARATOR,
        });
    }
    Ok(())
}

impl YearRange {
    /// Parses the closed interval syntax `[start,end]`.
    ///
    /// `[-1,-1]` means no time filter.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();

        let captures =
            RANGE_PATTERN
                .captures(&compact)
                .ok_or_else(|| ValidationError::MalformedRange {
                    input: input.trim().to_string(),
                })?;

        let start = parse_year(&captures[1])?;
        let end = parse_year(&captures[2])?;

        if start == NO_FILTER_YEAR && end == NO_FILTER_YEAR {
            return Ok(Self::Any);
        }
        if start > end {
            return Err(ValidationError::InvertedRange { start, end });
        }

        Ok(Self::Between { start, end })
    }
}

fn parse_year(value: &str) -> Result<i32, ValidationError> {
    value
        .parse::<i32>()
        .map_err(|_| ValidationError::NonNumericYear {
            value: value.to_string(),
        })
}
