//! calgrid - Calendar Event Layout Library
//!
//! This library turns a flat list of kanban calendar events into a
//! deterministic, collision-free month, week, or day layout.
//!
//! # Core Concepts
//!
//! - **Wall-clock time**: timestamps are literal local values, never shifted
//!   through UTC
//! - **Segments**: the part of an event that renders within one calendar day
//! - **Lanes**: slots in the banner row or the hour grid that keep
//!   overlapping segments apart
//! - **Day buckets**: per-day query results with geometry and overflow counts
//!
//! # Module Organization
//!
//! - `wallclock`: Wall-clock parsing and serialization
//! - `event`: Input records, validation, and warnings
//! - `segment`: Per-day segmentation of events
//! - `lanes`: Banner and timed lane allocation
//! - `position`: Geometry and day-cell overflow
//! - `grid`: Month/week/day grouping and the layout entry point
//! - `config`: Configuration loading from `.calgrid.toml`
//! - `error`: Error types and result aliases
//! - `output`: Shared CLI output formatting
//! - `cli`: Command-line interface using clap

pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod grid;
pub mod lanes;
pub mod output;
pub mod position;
pub mod segment;
pub mod wallclock;

pub use config::LayoutOptions;
pub use error::{Error, Result};
pub use event::{CalendarEvent, Event, LayoutWarning};
pub use grid::{layout, CalendarLayout, DayBucket, Granularity, ViewWindow, VisibilityFilter};
pub use wallclock::WallClock;
