//! calgrid layout and day command implementations
//!
//! Both commands read a JSON array of events, run the layout pipeline, and
//! report the grid (`layout`) or the full sorted list of one day (`day`).

use std::io::Read;
use std::path::PathBuf;

use crate::config::LayoutOptions;
use crate::error::{Error, Result};
use crate::event::{decode_records, Decoded};
use crate::grid::{layout, CalendarLayout, Granularity, PlacedSegment, ViewWindow, VisibilityFilter};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::wallclock::parse_date;

/// Options for the layout command
pub struct LayoutCommandOptions {
    pub events: String,
    pub view: String,
    pub anchor: String,
    pub hide: Vec<String>,
    pub layout: LayoutOptions,
    pub json: bool,
    pub quiet: bool,
}

/// Options for the day command
pub struct DayCommandOptions {
    pub events: String,
    pub date: String,
    pub hide: Vec<String>,
    pub layout: LayoutOptions,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct DayReport<'a> {
    date: String,
    hidden_count: usize,
    segments: Vec<&'a PlacedSegment>,
}

pub fn run_layout(options: LayoutCommandOptions) -> Result<()> {
    let granularity: Granularity = options.view.parse()?;
    let anchor = parse_date(&options.anchor)?;
    let decoded = read_events(&options.events)?;
    let filter: VisibilityFilter = options.hide.iter().cloned().collect();

    let window = ViewWindow::new(granularity, anchor);
    let result = layout_decoded(decoded, &window, &filter, &options.layout);

    let human = layout_human(&result);
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "layout",
        &result,
        Some(&human),
    )
}

pub fn run_day(options: DayCommandOptions) -> Result<()> {
    let date = parse_date(&options.date)?;
    let decoded = read_events(&options.events)?;
    let filter: VisibilityFilter = options.hide.iter().cloned().collect();

    let result = layout_decoded(decoded, &ViewWindow::day(date), &filter, &options.layout);
    let hidden_count = result.day(date).map(|bucket| bucket.hidden_count).unwrap_or(0);
    let segments = result.segments_for_day(date);

    let mut human = HumanOutput::new(format!("calgrid day: {date}"));
    human.push_summary("segments", segments.len().to_string());
    human.push_summary("hidden in cell", hidden_count.to_string());
    for placed in &segments {
        human.push_detail(describe_segment(&result, placed));
    }
    for warning in &result.warnings {
        human.push_warning(warning.message.clone());
    }

    let report = DayReport {
        date: date.to_string(),
        hidden_count,
        segments,
    };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "day",
        &report,
        Some(&human),
    )
}

fn read_events(source: &str) -> Result<Decoded> {
    let source = source.trim();
    let content = if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        let path = PathBuf::from(source);
        if !path.exists() {
            return Err(Error::EventsNotFound(path));
        }
        std::fs::read_to_string(&path)?
    };

    let values: Vec<serde_json::Value> = serde_json::from_str(&content)?;
    let decoded = decode_records(values);
    tracing::debug!(
        count = decoded.records.len(),
        skipped = decoded.warnings.len(),
        source,
        "read events"
    );
    Ok(decoded)
}

/// Lay out decoded records, reporting skipped records ahead of validation warnings.
fn layout_decoded(
    decoded: Decoded,
    window: &ViewWindow,
    filter: &VisibilityFilter,
    options: &LayoutOptions,
) -> CalendarLayout {
    let mut result = layout(&decoded.records, window, filter, options);
    result.warnings.splice(0..0, decoded.warnings);
    result
}

fn layout_human(result: &CalendarLayout) -> HumanOutput {
    let mut human = HumanOutput::new(format!(
        "calgrid layout: {} of {}",
        result.window.granularity, result.window.anchor
    ));

    if let (Some(first), Some(last)) = (result.first_day(), result.last_day()) {
        human.push_summary("range", format!("{first} .. {last}"));
    }
    human.push_summary("rows", result.rows.len().to_string());
    human.push_summary("events", result.events.len().to_string());

    for bucket in result.days().filter(|bucket| !bucket.is_empty()) {
        let mut line = format!("{}: {} segment(s)", bucket.date, bucket.len());
        if bucket.hidden_count > 0 {
            line.push_str(&format!(" (+{} more)", bucket.hidden_count));
        }
        let shown: Vec<String> = bucket
            .visible_segments()
            .into_iter()
            .map(|placed| describe_segment(result, placed))
            .collect();
        if !shown.is_empty() {
            line.push_str(": ");
            line.push_str(&shown.join("; "));
        }
        human.push_detail(line);
    }

    for warning in &result.warnings {
        human.push_warning(warning.message.clone());
    }

    human
}

fn describe_segment(result: &CalendarLayout, placed: &PlacedSegment) -> String {
    let segment = &placed.segment;
    let title = result
        .event(&segment.event_id)
        .map(|event| event.title.as_str())
        .unwrap_or(segment.event_id.as_str());

    let when = if segment.all_day {
        "all day".to_string()
    } else {
        format!(
            "{}-{}",
            segment.effective_start.naive().format("%H:%M"),
            segment.effective_end.naive().format("%H:%M")
        )
    };

    let mut lanes = Vec::new();
    if let Some(lane) = placed.banner_lane() {
        lanes.push(format!("banner {lane}"));
    }
    if let Some(lane) = placed.timed_lane() {
        lanes.push(format!("lane {lane}"));
    }

    format!("{title} [{}, {when}, {}]", segment.kind, lanes.join(", "))
}
