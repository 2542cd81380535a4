//! Pagination module
//!
//! Offset/limit pagination terminated by an empty page.
//!
//! # Overview
//!
//! The `Paginator` requests pages in fixed-size batches. Page offsets run
//! `offset, offset + 1, ..., offset + batch_size - 1` and the next batch
//! starts `batch_size` further on. A batch is scanned in submission order;
//! the first empty page ends the listing (see [`ScanPolicy`] for the
//! alternative rule).

mod paginator;
mod types;

pub use paginator::Paginator;
pub use types::{
    scan_batch, FetchResult, FetchStats, PageRequest, PageResponse, PaginationConfig,
    PaginationState, ScanPolicy, StopResult, LIMIT_PARAM, OFFSET_PARAM,
};
