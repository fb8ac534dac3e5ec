#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use calgrid::event::CalendarEvent;
use calgrid::wallclock::parse_date;
use chrono::{Duration, NaiveDate};

pub fn date(raw: &str) -> NaiveDate {
    parse_date(raw).expect("valid test date")
}

pub fn timed(id: &str, start: &str, end: &str) -> CalendarEvent {
    CalendarEvent::new(id, id, start).ending(end)
}

pub fn all_day(id: &str, first: &str, last: &str) -> CalendarEvent {
    CalendarEvent::new(id, id, format!("{first}T00:00:00"))
        .ending(format!("{last}T00:00:00"))
        .all_day(true)
}

/// Deterministic pseudo-random events spread over late January to early
/// March 2026: timed, zero-length, multi-day timed, and all-day.
pub fn generated_events(seed: u64, count: usize) -> Vec<CalendarEvent> {
    let mut rng = Lcg(seed);
    let base = date("2026-01-20").and_hms_opt(0, 0, 0).expect("midnight");

    (0..count)
        .map(|idx| {
            let day = rng.below(45) as i64;
            let minute = (rng.below(96) * 15) as i64;
            let start = base + Duration::days(day) + Duration::minutes(minute);
            let id = format!("ev-{idx:03}");

            let event = match rng.below(10) {
                0 => CalendarEvent::new(&id, &id, fmt(start)),
                1 | 2 => {
                    let days = rng.below(5) as i64;
                    let first = start.date();
                    all_day(&id, &first.to_string(), &(first + Duration::days(days)).to_string())
                }
                3 | 4 => {
                    let length = Duration::minutes((rng.below(72 * 4) as i64 + 1) * 15);
                    timed(&id, &fmt(start), &fmt(start + length))
                }
                _ => {
                    let length = Duration::minutes((rng.below(16) as i64 + 1) * 15);
                    timed(&id, &fmt(start), &fmt(start + length))
                }
            };

            match rng.below(3) {
                0 => event.in_collection("space-a"),
                1 => event.in_collection("space-b"),
                _ => event,
            }
        })
        .collect()
}

fn fmt(value: chrono::NaiveDateTime) -> String {
    value.format("%Y-%m-%dT%H:%M:%S").to_string()
}

struct Lcg(u64);

impl Lcg {
    fn below(&mut self, bound: u64) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }
}

pub fn write_events(dir: &Path, events: &[CalendarEvent]) -> std::io::Result<PathBuf> {
    let path = dir.join("events.json");
    let json = serde_json::to_string_pretty(events)?;
    fs::write(&path, json)?;
    Ok(path)
}

pub fn calgrid_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("calgrid").expect("binary");
    cmd.env_remove("CALGRID_CONFIG");
    cmd.env_remove("RUST_LOG");
    cmd
}
