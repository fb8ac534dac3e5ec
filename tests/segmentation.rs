use std::collections::BTreeSet;

use calgrid::event::normalize_events;
use calgrid::segment::{segment_event, SegmentKind};
use chrono::Duration;

mod support;
use support::{all_day, date, generated_events, timed};

#[test]
fn segments_cover_each_day_exactly_once() {
    let normalized = normalize_events(&generated_events(7, 200));
    assert!(!normalized.events.is_empty());

    for event in &normalized.events {
        let segments = segment_event(event);
        let days: Vec<_> = segments.iter().map(|s| s.day).collect();
        let distinct: BTreeSet<_> = days.iter().copied().collect();

        assert_eq!(distinct.len(), days.len(), "duplicate day for {}", event.id);
        assert_eq!(days.len() as u32, event.span_days(), "{}", event.id);
        assert!(segments.iter().all(|s| s.span_days == event.span_days()));

        for pair in days.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::days(1), "gap in {}", event.id);
        }
        assert_eq!(days.first(), Some(&event.first_day()));
        assert_eq!(days.last(), Some(&event.last_day()));
    }
}

#[test]
fn exactly_one_first_and_last_segment() {
    let normalized = normalize_events(&generated_events(11, 200));

    for event in &normalized.events {
        let segments = segment_event(event);
        let firsts = segments.iter().filter(|s| s.is_first_day()).count();
        let lasts = segments.iter().filter(|s| s.is_last_day()).count();
        assert_eq!(firsts, 1, "{}", event.id);
        assert_eq!(lasts, 1, "{}", event.id);
    }
}

#[test]
fn same_day_event_is_a_single_segment() {
    let event = timed("a", "2026-02-04T14:30:00", "2026-02-04T15:30:00")
        .normalize()
        .expect("valid");
    let segments = segment_event(&event);

    assert_eq!(segments.len(), 1);
    let only = &segments[0];
    assert_eq!(only.kind, SegmentKind::Single);
    assert!(only.is_first_day() && only.is_last_day());
    assert_eq!(only.effective_start.hour(), 14);
    assert_eq!(only.effective_start.minute(), 30);
    assert_eq!(only.effective_end.to_string(), "2026-02-04T15:30:00");
}

#[test]
fn three_day_event_splits_into_start_middle_end() {
    let event = timed("b", "2026-02-04T14:30:00", "2026-02-06T15:30:00")
        .normalize()
        .expect("valid");
    let segments = segment_event(&event);

    let kinds: Vec<_> = segments.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![SegmentKind::Start, SegmentKind::Middle, SegmentKind::End]);
    assert!(segments.iter().all(|s| s.span_days == 3));

    let start = &segments[0];
    assert_eq!(start.effective_start.to_string(), "2026-02-04T14:30:00");

    let middle = &segments[1];
    assert_eq!(middle.day, date("2026-02-05"));
    assert_eq!(middle.effective_start.to_string(), "2026-02-05T00:00:00");
    assert_eq!(middle.event_start.to_string(), "2026-02-04T14:30:00");

    let end = &segments[2];
    assert_eq!(end.effective_start.to_string(), "2026-02-06T00:00:00");
    assert_eq!(end.effective_end.to_string(), "2026-02-06T15:30:00");
    assert_eq!(end.event_start.hour(), 14);
    assert_eq!(end.event_start.minute(), 30);
}

#[test]
fn all_day_range_is_inclusive_of_its_last_day() {
    let event = all_day("trip", "2026-02-09", "2026-02-11")
        .normalize()
        .expect("valid");
    let days: Vec<_> = segment_event(&event).iter().map(|s| s.day).collect();

    assert_eq!(
        days,
        vec![date("2026-02-09"), date("2026-02-10"), date("2026-02-11")]
    );
}

#[test]
fn long_events_are_clipped_to_the_grid() {
    use calgrid::config::LayoutOptions;
    use calgrid::{layout, ViewWindow, VisibilityFilter};

    let events = vec![timed("decade", "2020-01-01T09:00:00", "2030-12-31T17:00:00")];
    let day = date("2026-02-04");
    let result = layout(
        &events,
        &ViewWindow::month(day),
        &VisibilityFilter::new(),
        &LayoutOptions::default(),
    );

    let placed: Vec<_> = result.days().flat_map(|b| b.sorted_segments()).collect();
    assert_eq!(placed.len(), result.days().count());

    let event = result.event("decade").expect("event in window");
    let on_day = result.segments_for_day(day);
    assert_eq!(on_day.len(), 1);
    let segment = &on_day[0].segment;
    assert_eq!(segment.kind, SegmentKind::Middle);
    assert_eq!(segment.span_days, event.span_days());
    assert_eq!(
        i64::from(segment.day_index),
        (day - event.first_day()).num_days()
    );
}
