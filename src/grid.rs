//! Day, week and month grouping.
//!
//! [`layout`] is the query surface a rendering layer calls on every change to
//! the event list, the visible window, or the visibility filter. It runs the
//! whole pipeline (normalize, segment, allocate lanes, position) from scratch
//! and returns rows of [`DayBucket`]s. Nothing is cached between calls.

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::config::LayoutOptions;
use crate::error::{Error, Result};
use crate::event::{normalize_events, CalendarEvent, Event, LayoutWarning};
use crate::lanes::{allocate_banner, allocate_timed, BannerLanes, LaneAssignment};
use crate::position::{banner_geometry, timed_geometry, truncate_cell, BannerGeometry, TimedGeometry};
use crate::segment::{segments_between, Band, Segment};

// =============================================================================
// View window
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Month,
    Week,
    Day,
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Month => write!(f, "month"),
            Granularity::Week => write!(f, "week"),
            Granularity::Day => write!(f, "day"),
        }
    }
}

impl FromStr for Granularity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "month" => Ok(Granularity::Month),
            "week" => Ok(Granularity::Week),
            "day" => Ok(Granularity::Day),
            _ => Err(Error::InvalidArgument(format!(
                "Invalid view '{}'. Expected: month, week, day",
                s
            ))),
        }
    }
}

/// The visible date range: a granularity and any date inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ViewWindow {
    pub granularity: Granularity,
    pub anchor: NaiveDate,
}

impl ViewWindow {
    pub fn new(granularity: Granularity, anchor: NaiveDate) -> Self {
        Self {
            granularity,
            anchor,
        }
    }

    pub fn month(anchor: NaiveDate) -> Self {
        Self::new(Granularity::Month, anchor)
    }

    pub fn week(anchor: NaiveDate) -> Self {
        Self::new(Granularity::Week, anchor)
    }

    pub fn day(anchor: NaiveDate) -> Self {
        Self::new(Granularity::Day, anchor)
    }

    /// First and last day of the period itself (the month, the week, the day).
    pub fn period(&self, week_start: Weekday) -> (NaiveDate, NaiveDate) {
        match self.granularity {
            Granularity::Month => {
                let first = self.anchor - Duration::days(i64::from(self.anchor.day0()));
                let len = days_in_month(self.anchor.year(), self.anchor.month());
                (first, first + Duration::days(i64::from(len) - 1))
            }
            Granularity::Week => {
                let first = week_containing(self.anchor, week_start);
                (first, first + Duration::days(6))
            }
            Granularity::Day => (self.anchor, self.anchor),
        }
    }

    /// Grid rows: whole weeks covering the period, or a single day.
    ///
    /// Month grids always have at least five rows; a month that fits in four
    /// weeks gets a trailing week from the next month.
    pub fn rows(&self, week_start: Weekday) -> Vec<Vec<NaiveDate>> {
        let (first, last) = self.period(week_start);
        if self.granularity == Granularity::Day {
            return vec![vec![first]];
        }

        let min_rows = if self.granularity == Granularity::Month {
            MIN_MONTH_ROWS
        } else {
            1
        };

        let mut rows = Vec::new();
        let mut row_start = week_containing(first, week_start);
        while row_start <= last || rows.len() < min_rows {
            rows.push((0..7).map(|i| row_start + Duration::days(i)).collect());
            row_start += Duration::days(7);
        }
        rows
    }
}

const MIN_MONTH_ROWS: usize = 5;

/// Monday-, Sunday- or Saturday-based week start on or before `date`.
pub fn week_containing(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset = (date.weekday().num_days_from_monday() + 7
        - week_start.num_days_from_monday())
        % 7;
    date - Duration::days(i64::from(offset))
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ if NaiveDate::from_ymd_opt(year, 2, 29).is_some() => 29,
        _ => 28,
    }
}

// =============================================================================
// Visibility filter
// =============================================================================

/// Collections whose events are hidden.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityFilter {
    hidden: BTreeSet<String>,
}

impl VisibilityFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hide(mut self, collection_id: impl Into<String>) -> Self {
        self.hidden.insert(collection_id.into());
        self
    }

    pub fn is_hidden(&self, collection_id: &str) -> bool {
        self.hidden.contains(collection_id)
    }

    /// Events without a collection are always visible.
    pub fn is_visible(&self, event: &Event) -> bool {
        event
            .collection_id
            .as_deref()
            .map(|id| !self.is_hidden(id))
            .unwrap_or(true)
    }
}

impl<S: Into<String>> FromIterator<S> for VisibilityFilter {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            hidden: iter.into_iter().map(Into::into).collect(),
        }
    }
}

// =============================================================================
// Layout output
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BannerPlacement {
    pub assignment: LaneAssignment,
    pub geometry: BannerGeometry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedPlacement {
    pub assignment: LaneAssignment,
    pub geometry: TimedGeometry,
}

/// A segment with its lane assignments and geometry.
///
/// Multi-day timed segments carry both placements: a bar in the banner row
/// and a block in the hour grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedSegment {
    #[serde(flatten)]
    pub segment: Segment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<BannerPlacement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timed: Option<TimedPlacement>,
}

impl PlacedSegment {
    pub fn key(&self) -> String {
        self.segment.key()
    }

    pub fn banner_lane(&self) -> Option<usize> {
        self.banner.as_ref().map(|b| b.assignment.lane)
    }

    pub fn timed_lane(&self) -> Option<usize> {
        self.timed.as_ref().map(|t| t.assignment.lane)
    }

    /// Day cell order: banner segments first, then timed segments; within
    /// each group by effective start, longer first, then event id.
    pub fn day_order(&self, other: &PlacedSegment) -> Ordering {
        let rank = |p: &PlacedSegment| match p.segment.band() {
            Band::Banner => 0u8,
            Band::Timed => 1u8,
        };
        rank(self)
            .cmp(&rank(other))
            .then_with(|| {
                self.segment
                    .effective_start
                    .cmp(&other.segment.effective_start)
            })
            .then_with(|| Reverse(self.segment.duration()).cmp(&Reverse(other.segment.duration())))
            .then_with(|| self.segment.event_id.cmp(&other.segment.event_id))
    }
}

/// Everything rendered in one day cell or column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBucket {
    pub date: NaiveDate,
    /// False for leading/trailing days borrowed from adjacent months.
    pub in_period: bool,
    /// Segments of all-day events, by banner lane.
    pub all_day_segments: Vec<PlacedSegment>,
    /// Segments of multi-day timed events, by banner lane.
    pub multi_day_segments: Vec<PlacedSegment>,
    /// Single-day timed segments, by start.
    pub timed_segments: Vec<PlacedSegment>,
    /// Keys of the segments shown without expanding the cell.
    pub visible: Vec<String>,
    pub hidden_count: usize,
    pub banner_lanes: usize,
    pub timed_lanes: usize,
}

impl DayBucket {
    pub fn len(&self) -> usize {
        self.all_day_segments.len() + self.multi_day_segments.len() + self.timed_segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every segment of the day in cell order. Never truncated.
    pub fn sorted_segments(&self) -> Vec<&PlacedSegment> {
        let mut all: Vec<&PlacedSegment> = self
            .all_day_segments
            .iter()
            .chain(&self.multi_day_segments)
            .chain(&self.timed_segments)
            .collect();
        all.sort_by(|a, b| a.day_order(b));
        all
    }

    /// The first `visible.len()` segments of [`DayBucket::sorted_segments`].
    pub fn visible_segments(&self) -> Vec<&PlacedSegment> {
        let mut sorted = self.sorted_segments();
        sorted.truncate(self.visible.len());
        sorted
    }

    /// All lane assignments of the day, both bands.
    pub fn assignments(&self) -> Vec<&LaneAssignment> {
        self.sorted_segments()
            .into_iter()
            .flat_map(|p| {
                p.banner
                    .iter()
                    .map(|b| &b.assignment)
                    .chain(p.timed.iter().map(|t| &t.assignment))
            })
            .collect()
    }
}

/// Result of one layout pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarLayout {
    pub window: ViewWindow,
    pub rows: Vec<Vec<DayBucket>>,
    /// Events taking part in the layout, in layout order.
    pub events: Vec<Event>,
    pub warnings: Vec<LayoutWarning>,
}

impl CalendarLayout {
    pub fn days(&self) -> impl Iterator<Item = &DayBucket> {
        self.rows.iter().flatten()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayBucket> {
        self.days().find(|bucket| bucket.date == date)
    }

    pub fn event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    /// Every segment of `date`, fully sorted, for the "+N more" view.
    ///
    /// Empty when `date` is outside the grid.
    pub fn segments_for_day(&self, date: NaiveDate) -> Vec<&PlacedSegment> {
        self.day(date)
            .map(DayBucket::sorted_segments)
            .unwrap_or_default()
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.days().next().map(|bucket| bucket.date)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.days().last().map(|bucket| bucket.date)
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Lay out `events` for `window`.
///
/// Rejected records come back as warnings. Events in hidden collections and
/// events entirely outside the grid do not take part in lane allocation.
pub fn layout(
    events: &[CalendarEvent],
    window: &ViewWindow,
    filter: &VisibilityFilter,
    options: &LayoutOptions,
) -> CalendarLayout {
    let normalized = normalize_events(events);
    let rows = window.rows(options.week_start);
    let (period_first, period_last) = window.period(options.week_start);

    let (grid_first, grid_last) = match (rows.first().and_then(|r| r.first()), rows.last().and_then(|r| r.last())) {
        (Some(first), Some(last)) => (*first, *last),
        _ => (period_first, period_last),
    };

    let mut visible: Vec<Event> = normalized
        .events
        .into_iter()
        .filter(|event| filter.is_visible(event))
        .filter(|event| event.intersects(grid_first, grid_last))
        .collect();
    visible.sort_by(|a, b| a.layout_order(b));

    let banner = allocate_banner(&visible);

    let mut by_day: BTreeMap<NaiveDate, Vec<Segment>> = BTreeMap::new();
    for event in &visible {
        for segment in segments_between(event, grid_first, grid_last) {
            by_day.entry(segment.day).or_default().push(segment);
        }
    }

    let rows: Vec<Vec<DayBucket>> = rows
        .into_iter()
        .map(|row| {
            let row_start = row.first().copied().unwrap_or(window.anchor);
            let row_len = row.len();
            row.into_iter()
                .map(|date| {
                    let segments = by_day.remove(&date).unwrap_or_default();
                    let in_period = date >= period_first && date <= period_last;
                    build_bucket(date, in_period, segments, &banner, row_start, row_len, options)
                })
                .collect()
        })
        .collect();

    tracing::debug!(
        view = %window.granularity,
        anchor = %window.anchor,
        events = visible.len(),
        warnings = normalized.warnings.len(),
        "computed calendar layout"
    );

    CalendarLayout {
        window: *window,
        rows,
        events: visible,
        warnings: normalized.warnings,
    }
}

fn build_bucket(
    date: NaiveDate,
    in_period: bool,
    segments: Vec<Segment>,
    banner: &BannerLanes,
    row_start: NaiveDate,
    row_len: usize,
    options: &LayoutOptions,
) -> DayBucket {
    let timed_refs: Vec<&Segment> = segments.iter().filter(|s| s.in_timed_grid()).collect();
    let day_lanes = allocate_timed(&timed_refs, options.min_visible);
    let mut timed_by_key: BTreeMap<String, LaneAssignment> = day_lanes
        .assignments
        .into_iter()
        .map(|assignment| (assignment.subject_id.clone(), assignment))
        .collect();

    let mut all_day_segments = Vec::new();
    let mut multi_day_segments = Vec::new();
    let mut timed_segments = Vec::new();
    let mut banner_lanes = 0;

    for segment in segments {
        let banner_placement = if segment.band() == Band::Banner {
            banner.assignment(&segment).map(|assignment| {
                banner_lanes = banner_lanes.max(assignment.lane + 1);
                BannerPlacement {
                    geometry: banner_geometry(&segment, assignment.lane, row_start, row_len),
                    assignment,
                }
            })
        } else {
            None
        };

        let timed_placement = timed_by_key.remove(&segment.key()).map(|assignment| TimedPlacement {
            geometry: timed_geometry(&segment, assignment.lane, day_lanes.lane_count, options),
            assignment,
        });

        let placed = PlacedSegment {
            banner: banner_placement,
            timed: timed_placement,
            segment,
        };

        if placed.segment.all_day {
            all_day_segments.push(placed);
        } else if placed.segment.span_days > 1 {
            multi_day_segments.push(placed);
        } else {
            timed_segments.push(placed);
        }
    }

    all_day_segments.sort_by(|a, b| a.day_order(b));
    multi_day_segments.sort_by(|a, b| a.day_order(b));
    timed_segments.sort_by(|a, b| a.day_order(b));

    let mut bucket = DayBucket {
        date,
        in_period,
        all_day_segments,
        multi_day_segments,
        timed_segments,
        visible: Vec::new(),
        hidden_count: 0,
        banner_lanes,
        timed_lanes: day_lanes.lane_count,
    };

    let overflow = truncate_cell(
        bucket.sorted_segments().into_iter().map(PlacedSegment::key),
        options.max_visible,
    );
    bucket.visible = overflow.visible;
    bucket.hidden_count = overflow.hidden_count;
    bucket
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(raw: &str) -> NaiveDate {
        crate::wallclock::parse_date(raw).unwrap()
    }

    #[test]
    fn granularity_parse() {
        assert_eq!("Month".parse::<Granularity>().unwrap(), Granularity::Month);
        assert_eq!("week".parse::<Granularity>().unwrap(), Granularity::Week);
        assert_eq!("day".parse::<Granularity>().unwrap(), Granularity::Day);
        assert!("year".parse::<Granularity>().is_err());
    }

    #[test]
    fn week_containing_respects_week_start() {
        // 2026-02-04 is a Wednesday.
        assert_eq!(week_containing(date("2026-02-04"), Weekday::Mon), date("2026-02-02"));
        assert_eq!(week_containing(date("2026-02-04"), Weekday::Sun), date("2026-02-01"));
        assert_eq!(week_containing(date("2026-02-04"), Weekday::Sat), date("2026-01-31"));
        assert_eq!(week_containing(date("2026-02-02"), Weekday::Mon), date("2026-02-02"));
    }

    #[test]
    fn month_rows_cover_whole_weeks() {
        let rows = ViewWindow::month(date("2026-02-17")).rows(Weekday::Mon);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0][0], date("2026-01-26"));
        assert_eq!(rows[4][6], date("2026-03-01"));
        assert!(rows.iter().all(|row| row.len() == 7));

        // August 2026 starts on a Saturday and needs six rows.
        let rows = ViewWindow::month(date("2026-08-01")).rows(Weekday::Mon);
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[5][6], date("2026-09-06"));
    }

    #[test]
    fn month_grids_have_five_or_six_rows() {
        for week_start in [Weekday::Mon, Weekday::Sun, Weekday::Sat] {
            for year in 2026..=2030 {
                for month in 1..=12 {
                    let anchor = NaiveDate::from_ymd_opt(year, month, 15).unwrap();
                    let rows = ViewWindow::month(anchor).rows(week_start);
                    assert!(
                        (5..=6).contains(&rows.len()),
                        "{year}-{month:02} {week_start:?}: {} rows",
                        rows.len()
                    );
                    assert!(rows.iter().all(|row| row.len() == 7));
                    assert_eq!(rows[0][0].weekday(), week_start);
                }
            }
        }
    }

    #[test]
    fn four_week_february_gets_a_trailing_week() {
        // February 2027 starts on a Monday.
        let rows = ViewWindow::month(date("2027-02-10")).rows(Weekday::Mon);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0][0], date("2027-02-01"));
        assert_eq!(rows[4][0], date("2027-03-01"));
        assert_eq!(rows[4][6], date("2027-03-07"));

        let rows = ViewWindow::month(date("2026-02-10")).rows(Weekday::Sun);
        assert_eq!(rows.len(), 5);
    }

    #[test]
    fn leap_february_period() {
        let (first, last) = ViewWindow::month(date("2028-02-10")).period(Weekday::Mon);
        assert_eq!(first, date("2028-02-01"));
        assert_eq!(last, date("2028-02-29"));
    }

    #[test]
    fn week_and_day_rows() {
        let rows = ViewWindow::week(date("2026-02-08")).rows(Weekday::Mon);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].first(), Some(&date("2026-02-02")));
        assert_eq!(rows[0].last(), Some(&date("2026-02-08")));

        let rows = ViewWindow::day(date("2026-02-08")).rows(Weekday::Mon);
        assert_eq!(rows, vec![vec![date("2026-02-08")]]);
    }

    #[test]
    fn visibility_filter_hides_collections() {
        let filter: VisibilityFilter = ["space-b"].into_iter().collect();
        let a = CalendarEvent::new("a", "a", "2026-02-04T09:00")
            .in_collection("space-a")
            .normalize()
            .unwrap();
        let b = CalendarEvent::new("b", "b", "2026-02-04T09:00")
            .in_collection("space-b")
            .normalize()
            .unwrap();
        let loose = CalendarEvent::new("c", "c", "2026-02-04T09:00")
            .normalize()
            .unwrap();
        assert!(filter.is_visible(&a));
        assert!(!filter.is_visible(&b));
        assert!(filter.is_visible(&loose));
    }

    #[test]
    fn multi_day_timed_segment_has_both_placements() {
        let events = vec![
            CalendarEvent::new("trip", "Trip", "2026-02-04T14:30:00").ending("2026-02-06T15:30:00"),
            CalendarEvent::new("call", "Call", "2026-02-05T10:00:00").ending("2026-02-05T11:00:00"),
        ];
        let layout = layout(
            &events,
            &ViewWindow::week(date("2026-02-04")),
            &VisibilityFilter::new(),
            &LayoutOptions::default(),
        );

        let thursday = layout.day(date("2026-02-05")).unwrap();
        assert_eq!(thursday.multi_day_segments.len(), 1);
        let trip = &thursday.multi_day_segments[0];
        assert_eq!(trip.banner_lane(), Some(0));
        assert_eq!(trip.timed_lane(), Some(0));
        assert_eq!(thursday.timed_segments[0].timed_lane(), Some(1));
        assert_eq!(thursday.timed_lanes, 2);
        assert_eq!(thursday.banner_lanes, 1);
    }

    #[test]
    fn day_order_follows_start_not_lane() {
        let events = vec![
            CalendarEvent::new("p", "p", "2026-02-01").ending("2026-02-03").all_day(true),
            CalendarEvent::new("q", "q", "2026-02-01").all_day(true),
            CalendarEvent::new("r", "r", "2026-02-02T10:00:00").ending("2026-02-05T10:00:00"),
            CalendarEvent::new("s", "s", "2026-02-04T08:00:00").ending("2026-02-05T09:00:00"),
        ];
        let day = date("2026-02-04");
        let options = LayoutOptions::default();

        let month = layout(&events, &ViewWindow::month(day), &VisibilityFilter::new(), &options);
        let single = layout(&events, &ViewWindow::day(day), &VisibilityFilter::new(), &options);

        let ids = |result: &CalendarLayout| -> Vec<String> {
            result
                .segments_for_day(day)
                .into_iter()
                .map(|p| p.segment.event_id.clone())
                .collect()
        };

        // In the month grid s holds a lower banner lane than r.
        let month_bucket = month.day(day).unwrap();
        let lane = |id: &str| {
            month_bucket
                .sorted_segments()
                .into_iter()
                .find(|p| p.segment.event_id == id)
                .and_then(|p| p.banner_lane())
        };
        assert!(lane("s") < lane("r"));

        assert_eq!(ids(&month), vec!["r", "s"]);
        assert_eq!(ids(&single), vec!["r", "s"]);
        assert_eq!(month_bucket.visible, single.day(day).unwrap().visible);
    }

    #[test]
    fn events_outside_grid_are_ignored() {
        let events = vec![
            CalendarEvent::new("past", "Past", "2025-12-01T09:00:00"),
            CalendarEvent::new("now", "Now", "2026-02-04T09:00:00"),
        ];
        let layout = layout(
            &events,
            &ViewWindow::week(date("2026-02-04")),
            &VisibilityFilter::new(),
            &LayoutOptions::default(),
        );
        assert_eq!(layout.events.len(), 1);
        assert!(layout.event("past").is_none());
        assert!(layout.segments_for_day(date("2025-12-01")).is_empty());
    }
}
