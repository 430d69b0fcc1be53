//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - The sorted file catalog ([`FileCatalog`])
//! - Byte-level content comparison ([`ByteComparator`])
//! - Size-block grouping into verified duplicate sets ([`DuplicateFinder`])

pub mod catalog;
pub mod compare;
pub mod finder;
pub mod groups;

pub use catalog::{CatalogError, FileCatalog, FileRecord, DEFAULT_CONTENT_TYPE};
pub use compare::{
    ByteComparator, CompareError, Comparison, ContentComparator, COMPARE_BUFFER_SIZE,
    MAX_COMPARE_BUFFER_SIZE,
};
pub use finder::{DuplicateFinder, FinderError, GroupingOutcome};
pub use groups::{ComparisonFailure, DuplicateGroup, DuplicateSet, GroupingStats};
