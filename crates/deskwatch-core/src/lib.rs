//! deskwatch-core: change detection for TOPdesk incidents and changes.
//!
//! The crate is built around three pieces:
//!
//! - [`snapshot`]: a durable JSON document recording the last-observed
//!   status and comment date for every item the tracker has ever seen.
//! - [`diff`]: the engine that classifies a freshly fetched item list
//!   against the snapshot into typed [`diff::ChangeEvent`]s.
//! - [`tracker`]: orchestration of one poll cycle (fetch, diff, persist)
//!   and of the summary view over everything tracked so far.
//!
//! Transport lives behind the [`source::Source`] trait so the engine can be
//! driven by a real HTTP client or a scripted test double.

pub mod config;
pub mod diff;
pub mod model;
pub mod recency;
pub mod snapshot;
pub mod source;
pub mod tracker;
