//! Calendar events at the engine boundary.
//!
//! [`CalendarEvent`] is the closed input record handed over by the task
//! system. It is validated exactly once by [`normalize_events`], which turns
//! each record into an [`Event`] with resolved wall-clock bounds or into a
//! [`LayoutWarning`] explaining why it was left out. Input records are never
//! modified.

use std::collections::{BTreeMap, HashSet};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::EventError;
use crate::wallclock::WallClock;

/// Display metadata carried through layout untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EventMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Kanban card the event was scheduled from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_id: Option<String>,
    /// Badge counters (checklist items, comments, attachments...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub counts: BTreeMap<String, u32>,
}

/// One event as received from the task system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CalendarEvent {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_all_day: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Owning collection (space/board); drives the visibility filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    #[serde(default)]
    pub metadata: EventMetadata,
}

impl CalendarEvent {
    pub fn new(id: impl Into<String>, title: impl Into<String>, start: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start: Some(start.into()),
            end: None,
            is_all_day: None,
            color: None,
            collection_id: None,
            metadata: EventMetadata::default(),
        }
    }

    pub fn ending(mut self, end: impl Into<String>) -> Self {
        self.end = Some(end.into());
        self
    }

    pub fn all_day(mut self, all_day: bool) -> Self {
        self.is_all_day = Some(all_day);
        self
    }

    pub fn in_collection(mut self, collection_id: impl Into<String>) -> Self {
        self.collection_id = Some(collection_id.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Resolve wall-clock bounds and the all-day flag.
    ///
    /// A missing `end` defaults to `start`; when only `end` is present it
    /// stands in for `start`. An `end` before `start` is clamped to `start`.
    pub fn normalize(&self) -> Result<Event, EventError> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(EventError::MissingId);
        }

        let start = parse_bound(id, "start", self.start.as_deref())?;
        let end = parse_bound(id, "end", self.end.as_deref())?;

        let (start, end, end_clamped) = match (start, end) {
            (Some(start), Some(end)) if end < start => (start, start, true),
            (Some(start), Some(end)) => (start, end, false),
            (Some(start), None) => (start, start, false),
            (None, Some(end)) => (end, end, false),
            (None, None) => return Err(EventError::MissingTimes(id.to_string())),
        };

        let all_day = self
            .is_all_day
            .unwrap_or_else(|| start.is_all_day() && end.is_all_day());

        Ok(Event {
            id: id.to_string(),
            title: self.title.clone(),
            start,
            end,
            all_day,
            end_clamped,
            color: self.color.clone(),
            collection_id: self.collection_id.clone(),
            metadata: self.metadata.clone(),
        })
    }
}

fn parse_bound(
    id: &str,
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<WallClock>, EventError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => WallClock::parse(value)
            .map(Some)
            .map_err(|source| EventError::Malformed {
                id: id.to_string(),
                field,
                source,
            }),
        None => Ok(None),
    }
}

/// A validated event with `end >= start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub start: WallClock,
    pub end: WallClock,
    pub all_day: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub end_clamped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_id: Option<String>,
    pub metadata: EventMetadata,
}

impl Event {
    pub fn duration(&self) -> Duration {
        self.end.naive() - self.start.naive()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.end.date()
    }

    /// Number of calendar days touched, at least 1.
    pub fn span_days(&self) -> u32 {
        let days = (self.last_day() - self.first_day()).num_days();
        u32::try_from(days).unwrap_or(0) + 1
    }

    /// All-day and multi-day events render in the banner row.
    pub fn in_banner(&self) -> bool {
        self.all_day || self.span_days() > 1
    }

    pub fn intersects(&self, first: NaiveDate, last: NaiveDate) -> bool {
        self.first_day() <= last && self.last_day() >= first
    }

    /// Global ordering: start ascending, longer first, then id.
    pub fn layout_order(&self, other: &Event) -> std::cmp::Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| other.duration().cmp(&self.duration()))
            .then_with(|| self.id.cmp(&other.id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// The record does not fit the event shape (unknown field, wrong type).
    MalformedRecord,
    MissingId,
    MissingTimes,
    MalformedTimestamp,
    DuplicateId,
    /// Informational: the event is still laid out.
    ClampedEnd,
}

impl From<&EventError> for WarningKind {
    fn from(err: &EventError) -> Self {
        match err {
            EventError::MissingId => WarningKind::MissingId,
            EventError::MissingTimes(_) => WarningKind::MissingTimes,
            EventError::Malformed { .. } => WarningKind::MalformedTimestamp,
        }
    }
}

/// A problem found while validating input, returned next to the layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutWarning {
    pub event_id: String,
    pub kind: WarningKind,
    pub message: String,
}

impl LayoutWarning {
    pub fn excludes_event(&self) -> bool {
        self.kind != WarningKind::ClampedEnd
    }
}

/// Result of validating a batch of input events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    pub events: Vec<Event>,
    pub warnings: Vec<LayoutWarning>,
}

/// Raw records decoded from a JSON array, one element at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    pub records: Vec<CalendarEvent>,
    pub warnings: Vec<LayoutWarning>,
}

/// Decode each element of a JSON array into a [`CalendarEvent`].
///
/// An element that does not fit the record shape is skipped with a
/// `MalformedRecord` warning; the rest of the batch is kept.
pub fn decode_records(values: Vec<serde_json::Value>) -> Decoded {
    let mut decoded = Decoded::default();

    for (index, value) in values.into_iter().enumerate() {
        let event_id = value
            .get("id")
            .and_then(serde_json::Value::as_str)
            .filter(|id| !id.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{index}"));

        match serde_json::from_value::<CalendarEvent>(value) {
            Ok(record) => decoded.records.push(record),
            Err(err) => {
                tracing::warn!(event_id = %event_id, index, error = %err, "skipping malformed record");
                decoded.warnings.push(LayoutWarning {
                    message: format!("record {index} ('{event_id}') is malformed: {err}"),
                    event_id,
                    kind: WarningKind::MalformedRecord,
                });
            }
        }
    }

    decoded
}

/// Validate every record; rejected ones become warnings, never silent drops.
///
/// The first record with a given id wins; later duplicates are rejected.
pub fn normalize_events(raw: &[CalendarEvent]) -> Normalized {
    let mut normalized = Normalized::default();
    let mut seen = HashSet::new();

    for record in raw {
        let event = match record.normalize() {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(event_id = %record.id, error = %err, "excluding event from layout");
                normalized.warnings.push(LayoutWarning {
                    event_id: record.id.clone(),
                    kind: WarningKind::from(&err),
                    message: err.to_string(),
                });
                continue;
            }
        };

        if !seen.insert(event.id.clone()) {
            tracing::warn!(event_id = %event.id, "excluding duplicate event id");
            normalized.warnings.push(LayoutWarning {
                event_id: event.id.clone(),
                kind: WarningKind::DuplicateId,
                message: format!("event id '{}' appears more than once", event.id),
            });
            continue;
        }

        if event.end_clamped {
            normalized.warnings.push(LayoutWarning {
                event_id: event.id.clone(),
                kind: WarningKind::ClampedEnd,
                message: format!("event '{}' ends before it starts; end set to start", event.id),
            });
        }

        normalized.events.push(event);
    }

    normalized
}
