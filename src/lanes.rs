//! Lane allocation.
//!
//! Two independent greedy first-fit passes keep overlapping segments apart:
//!
//! - **Banner**: all-day and multi-day events. An event holds one lane for
//!   its whole span, so its bar renders as a single unbroken row.
//! - **Timed**: per day, every segment of a non-all-day event, including the
//!   pieces of multi-day timed events that pass through the day.
//!
//! Occupancy windows are half-open: `[a0, a1)` and `[b0, b1)` overlap iff
//! `a0 < b1 && b0 < a1`. Inputs are sorted by start, so a lane is free when
//! its most recent occupant ended at or before the candidate's start.
//! Lane counts are deterministic but not guaranteed minimal.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::event::Event;
use crate::segment::{Band, Segment};
use crate::wallclock::{end_of_day, WallClock};

/// Half-open interval a segment claims within its lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occupancy {
    pub start: WallClock,
    pub end: WallClock,
}

impl Occupancy {
    pub fn overlaps(&self, other: &Occupancy) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The whole of `day`.
    pub fn full_day(day: NaiveDate) -> Self {
        Self {
            start: WallClock::from_parts(day, None),
            end: WallClock::new(end_of_day(day)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaneAssignment {
    /// Segment key (`<event id>@<date>`).
    pub subject_id: String,
    pub band: Band,
    pub lane: usize,
    pub occupancy: Occupancy,
}

/// Banner lane per event id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BannerLanes {
    lanes: BTreeMap<String, usize>,
}

impl BannerLanes {
    pub fn lane_of(&self, event_id: &str) -> Option<usize> {
        self.lanes.get(event_id).copied()
    }

    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Assignment for one day of a banner event.
    pub fn assignment(&self, segment: &Segment) -> Option<LaneAssignment> {
        let lane = self.lane_of(&segment.event_id)?;
        Some(LaneAssignment {
            subject_id: segment.key(),
            band: Band::Banner,
            lane,
            occupancy: Occupancy::full_day(segment.day),
        })
    }
}

/// Assign banner lanes to every all-day or multi-day event.
///
/// Events are ordered by start, then longer first, then id. Each takes the
/// first lane whose last occupant ended on an earlier day than its first day.
pub fn allocate_banner<'a, I>(events: I) -> BannerLanes
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut ordered: Vec<&Event> = events.into_iter().filter(|e| e.in_banner()).collect();
    ordered.sort_by(|a, b| a.layout_order(b));

    let mut lane_last_day: Vec<NaiveDate> = Vec::new();
    let mut lanes = BTreeMap::new();

    for event in ordered {
        let first_day = event.first_day();
        let lane = match lane_last_day.iter().position(|last| *last < first_day) {
            Some(lane) => lane,
            None => {
                lane_last_day.push(first_day);
                lane_last_day.len() - 1
            }
        };
        lane_last_day[lane] = event.last_day();
        lanes.insert(event.id.clone(), lane);
    }

    tracing::debug!(
        events = lanes.len(),
        lanes = lane_last_day.len(),
        "allocated banner lanes"
    );

    BannerLanes { lanes }
}

/// Timed-grid lanes for one day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayLanes {
    /// One assignment per input segment, in input order.
    pub assignments: Vec<LaneAssignment>,
    pub lane_count: usize,
}

/// Occupancy of a segment in the hour grid.
///
/// The window is `[effective_start, effective_end)`, which for multi-day
/// pieces means `[start, end of day)`, `[start of day, end)` or the full day.
/// Windows shorter than `min_visible` are stretched to it, capped at the end
/// of the day, so events that would render on top of each other still
/// conflict.
pub fn timed_occupancy(segment: &Segment, min_visible: Duration) -> Occupancy {
    let start = segment.effective_start.naive();
    let day_end = end_of_day(segment.day);
    let end = segment
        .effective_end
        .naive()
        .max(start + min_visible)
        .min(day_end)
        .max(start);
    Occupancy {
        start: segment.effective_start,
        end: WallClock::new(end),
    }
}

/// Assign timed lanes to the segments of a single day.
///
/// Segments are ordered by effective start, then longer first, then event id.
pub fn allocate_timed(segments: &[&Segment], min_visible: Duration) -> DayLanes {
    let windows: Vec<Occupancy> = segments
        .iter()
        .map(|segment| timed_occupancy(segment, min_visible))
        .collect();

    let mut order: Vec<usize> = (0..segments.len()).collect();
    order.sort_by_key(|&idx| {
        (
            windows[idx].start,
            Reverse(segments[idx].duration()),
            segments[idx].event_id.as_str(),
        )
    });

    let mut lane_end: Vec<WallClock> = Vec::new();
    let mut lanes = vec![0usize; segments.len()];

    for idx in order {
        let window = windows[idx];
        let lane = match lane_end.iter().position(|end| *end <= window.start) {
            Some(lane) => lane,
            None => {
                lane_end.push(window.end);
                lane_end.len() - 1
            }
        };
        lane_end[lane] = window.end;
        lanes[idx] = lane;
    }

    let assignments = segments
        .iter()
        .zip(windows)
        .zip(lanes)
        .map(|((segment, occupancy), lane)| LaneAssignment {
            subject_id: segment.key(),
            band: Band::Timed,
            lane,
            occupancy,
        })
        .collect();

    DayLanes {
        assignments,
        lane_count: lane_end.len(),
    }
}

/// First pair of same-band, same-lane assignments whose windows overlap.
///
/// Assignments are expected to belong to one day.
pub fn find_conflict(assignments: &[LaneAssignment]) -> Option<(&LaneAssignment, &LaneAssignment)> {
    for (i, a) in assignments.iter().enumerate() {
        for b in &assignments[i + 1..] {
            if a.band == b.band && a.lane == b.lane && a.occupancy.overlaps(&b.occupancy) {
                return Some((a, b));
            }
        }
    }
    None
}
