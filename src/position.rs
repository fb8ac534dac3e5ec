//! Geometry for laid-out segments.
//!
//! Positions are fractions of a day column (timed band) or grid cells
//! (banner band); pixels are the rendering layer's business.

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::LayoutOptions;
use crate::segment::Segment;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Placement of a segment in the hour grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedGeometry {
    /// Distance from midnight, as a fraction of the day.
    pub offset_fraction: f64,
    pub height_fraction: f64,
    /// Distance from the column's left edge, as a fraction of its width.
    pub left_fraction: f64,
    pub width_fraction: f64,
}

/// Placement of a segment in the banner row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerGeometry {
    /// Banner row, equal to the lane.
    pub row: usize,
    /// Day position within its grid row.
    pub column: usize,
    /// Whether a bar is drawn from this cell.
    pub starts_bar: bool,
    /// Cells the bar covers when `starts_bar`, otherwise 0.
    pub column_span: usize,
    pub continues_before: bool,
    pub continues_after: bool,
}

pub fn timed_geometry(
    segment: &Segment,
    lane: usize,
    total_lanes: usize,
    options: &LayoutOptions,
) -> TimedGeometry {
    let midnight = segment.day.and_time(chrono::NaiveTime::MIN);
    let offset_secs = (segment.effective_start.naive() - midnight).num_seconds() as f64;
    let duration_secs = segment.duration().num_seconds().max(0) as f64;

    let height_fraction = (duration_secs / SECONDS_PER_DAY)
        .max(options.min_height_fraction())
        .min(1.0);
    let offset_fraction = (offset_secs / SECONDS_PER_DAY).clamp(0.0, 1.0 - height_fraction);

    let total = total_lanes.max(1) as f64;
    let lane_width = 1.0 / total;
    let width_fraction = (lane_width - options.lane_gutter).max(lane_width / 2.0);

    TimedGeometry {
        offset_fraction,
        height_fraction,
        left_fraction: lane as f64 * lane_width,
        width_fraction,
    }
}

/// Banner placement of `segment` in a grid row starting at `row_start` and
/// `row_len` days wide.
pub fn banner_geometry(
    segment: &Segment,
    lane: usize,
    row_start: NaiveDate,
    row_len: usize,
) -> BannerGeometry {
    let column = usize::try_from((segment.day - row_start).num_days()).unwrap_or(0);
    let starts_bar = segment.is_first_day() || column == 0;
    let remaining = (segment.span_days - segment.day_index) as usize;
    let column_span = if starts_bar {
        remaining.min(row_len.saturating_sub(column))
    } else {
        0
    };

    BannerGeometry {
        row: lane,
        column,
        starts_bar,
        column_span,
        continues_before: !segment.is_first_day(),
        continues_after: !segment.is_last_day(),
    }
}

/// Visible part of a day cell.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellOverflow {
    pub visible: Vec<String>,
    pub hidden_count: usize,
}

/// Keep the first `max_visible` keys of an already sorted day list.
pub fn truncate_cell<I, S>(sorted_keys: I, max_visible: usize) -> CellOverflow
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut overflow = CellOverflow::default();
    for key in sorted_keys {
        if overflow.visible.len() < max_visible {
            overflow.visible.push(key.into());
        } else {
            overflow.hidden_count += 1;
        }
    }
    overflow
}
