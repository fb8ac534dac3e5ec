//! Configuration loading and management
//!
//! Handles parsing of `.calgrid.toml` configuration files. Presentation
//! constants (cell overflow, lane gutter, minimum event height, first day of
//! the week) live here rather than in the engine.

use std::path::Path;

use chrono::{Duration, Weekday};
use serde::Deserialize;

use crate::error::{Error, Result};

pub const CONFIG_FILE: &str = ".calgrid.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Layout policy
    #[serde(default)]
    pub layout: LayoutConfig,
}

/// Layout-related configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    /// Segments shown in a day cell before "+N more"
    #[serde(default = "default_max_visible")]
    pub max_visible: usize,

    /// Reserved gap per lane, as a fraction of the day column width
    #[serde(default = "default_lane_gutter")]
    pub lane_gutter: f64,

    /// Minimum rendered duration of a timed event, in minutes
    #[serde(default = "default_min_visible_minutes")]
    pub min_visible_minutes: u32,

    /// First day of a week row: monday, sunday, or saturday
    #[serde(default = "default_week_start")]
    pub week_start: String,
}

fn default_max_visible() -> usize {
    3
}

fn default_lane_gutter() -> f64 {
    0.02
}

fn default_min_visible_minutes() -> u32 {
    15
}

fn default_week_start() -> String {
    "monday".to_string()
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_visible: default_max_visible(),
            lane_gutter: default_lane_gutter(),
            min_visible_minutes: default_min_visible_minutes(),
            week_start: default_week_start(),
        }
    }
}

/// Resolved layout parameters passed to the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub max_visible: usize,
    pub lane_gutter: f64,
    pub min_visible: Duration,
    pub week_start: Weekday,
}

impl LayoutOptions {
    /// Fraction of a day covered by [`LayoutOptions::min_visible`].
    pub fn min_height_fraction(&self) -> f64 {
        self.min_visible.num_seconds() as f64 / 86_400.0
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            max_visible: default_max_visible(),
            lane_gutter: default_lane_gutter(),
            min_visible: Duration::minutes(i64::from(default_min_visible_minutes())),
            week_start: Weekday::Mon,
        }
    }
}

impl LayoutConfig {
    /// Validate and convert into engine options.
    pub fn options(&self) -> Result<LayoutOptions> {
        self.validate()?;
        Ok(LayoutOptions {
            max_visible: self.max_visible,
            lane_gutter: self.lane_gutter,
            min_visible: Duration::minutes(i64::from(self.min_visible_minutes)),
            week_start: parse_week_start(&self.week_start)?,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.max_visible == 0 {
            return Err(Error::InvalidConfig(
                "layout.max_visible must be >= 1".to_string(),
            ));
        }
        if !self.lane_gutter.is_finite() || !(0.0..0.5).contains(&self.lane_gutter) {
            return Err(Error::InvalidConfig(format!(
                "layout.lane_gutter must be in [0.0, 0.5), got {}",
                self.lane_gutter
            )));
        }
        if !(1..=240).contains(&self.min_visible_minutes) {
            return Err(Error::InvalidConfig(format!(
                "layout.min_visible_minutes must be in 1..=240, got {}",
                self.min_visible_minutes
            )));
        }
        parse_week_start(&self.week_start)?;
        Ok(())
    }
}

fn parse_week_start(raw: &str) -> Result<Weekday> {
    match raw.trim().to_lowercase().as_str() {
        "monday" | "mon" => Ok(Weekday::Mon),
        "sunday" | "sun" => Ok(Weekday::Sun),
        "saturday" | "sat" => Ok(Weekday::Sat),
        _ => Err(Error::InvalidConfig(format!(
            "layout.week_start: invalid day '{raw}' (expected monday|sunday|saturday)"
        ))),
    }
}

impl Config {
    /// Load configuration from a `.calgrid.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.calgrid.toml` from a directory, or return defaults when absent.
    ///
    /// A present but invalid file is an error.
    pub fn discover(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        self.layout.validate()
    }
}
