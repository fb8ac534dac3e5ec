//! Event segmentation.
//!
//! A logical event becomes one [`Segment`] per calendar day it touches, from
//! the day of its start to the day of its end inclusive. Only the first and
//! last segment keep the event's own wall-clock times; days in between are
//! treated as full days.

use std::fmt;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::event::Event;
use crate::wallclock::{end_of_day, WallClock};

/// Position of a segment within its event's span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// The event starts and ends on this day.
    Single,
    Start,
    Middle,
    End,
}

impl SegmentKind {
    pub fn for_day(day_index: u32, span_days: u32) -> Self {
        if span_days <= 1 {
            SegmentKind::Single
        } else if day_index == 0 {
            SegmentKind::Start
        } else if day_index + 1 == span_days {
            SegmentKind::End
        } else {
            SegmentKind::Middle
        }
    }

    /// Whether the segment starts at the event's own start time.
    pub fn keeps_start(self) -> bool {
        matches!(self, SegmentKind::Single | SegmentKind::Start)
    }

    /// Whether the segment ends at the event's own end time.
    pub fn keeps_end(self) -> bool {
        matches!(self, SegmentKind::Single | SegmentKind::End)
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentKind::Single => write!(f, "single"),
            SegmentKind::Start => write!(f, "start"),
            SegmentKind::Middle => write!(f, "middle"),
            SegmentKind::End => write!(f, "end"),
        }
    }
}

/// Layout band a lane belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Band {
    /// All-day row above the hour grid (all-day and multi-day events).
    Banner,
    /// Hour grid.
    Timed,
}

/// The part of one event rendered within a single calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub event_id: String,
    pub day: NaiveDate,
    pub kind: SegmentKind,
    pub span_days: u32,
    pub day_index: u32,
    pub effective_start: WallClock,
    pub effective_end: WallClock,
    /// The parent event's true bounds, for display.
    pub event_start: WallClock,
    pub event_end: WallClock,
    pub all_day: bool,
}

impl Segment {
    pub fn is_first_day(&self) -> bool {
        self.day_index == 0
    }

    pub fn is_last_day(&self) -> bool {
        self.day_index + 1 == self.span_days
    }

    /// Identifier of this segment, unique within one layout pass.
    pub fn key(&self) -> String {
        format!("{}@{}", self.event_id, self.day)
    }

    /// Whether the segment takes a banner lane.
    pub fn in_banner(&self) -> bool {
        self.all_day || self.span_days > 1
    }

    /// Whether the segment takes a lane in the hour grid.
    pub fn in_timed_grid(&self) -> bool {
        !self.all_day
    }

    /// Band the segment is drawn in first. Multi-day timed segments also
    /// take a timed lane.
    pub fn band(&self) -> Band {
        if self.in_banner() {
            Band::Banner
        } else {
            Band::Timed
        }
    }

    pub fn duration(&self) -> Duration {
        self.effective_end.naive() - self.effective_start.naive()
    }
}

/// Split `event` into per-day segments ordered by day index.
pub fn segment_event(event: &Event) -> Vec<Segment> {
    segments_between(event, event.first_day(), event.last_day())
}

/// Segments of `event` for the days in `[first, last]` only.
///
/// Days outside the range are never built. `day_index` and `span_days` still
/// describe the whole event.
pub fn segments_between(event: &Event, first: NaiveDate, last: NaiveDate) -> Vec<Segment> {
    let span_days = event.span_days();
    let first_day = event.first_day();
    let from = (first - first_day).num_days().max(0);
    let to = (last - first_day).num_days().min(i64::from(span_days) - 1);

    (from..=to)
        .filter_map(|offset| u32::try_from(offset).ok())
        .map(|day_index| {
            let day = first_day + Duration::days(i64::from(day_index));
            let kind = SegmentKind::for_day(day_index, span_days);
            let effective_start = if kind.keeps_start() {
                event.start
            } else {
                WallClock::from_parts(day, None)
            };
            let effective_end = if kind.keeps_end() {
                event.end
            } else {
                WallClock::new(end_of_day(day))
            };

            Segment {
                event_id: event.id.clone(),
                day,
                kind,
                span_days,
                day_index,
                effective_start,
                effective_end,
                event_start: event.start,
                event_end: event.end,
                all_day: event.all_day,
            }
        })
        .collect()
}
