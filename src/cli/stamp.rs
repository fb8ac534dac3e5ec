//! calgrid stamp command implementation
//!
//! Composes the wall-clock string persisted upstream from a date part and
//! an optional time part.

use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::wallclock::{compose, WallClock};

/// Options for the stamp command
pub struct StampOptions {
    pub date: String,
    pub time: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct StampReport {
    value: String,
    all_day: bool,
}

pub fn run(options: StampOptions) -> Result<()> {
    let value = compose(&options.date, options.time.as_deref())?;
    let all_day = WallClock::parse(&value)?.is_all_day();

    if !options.json && !options.quiet {
        println!("{value}");
        return Ok(());
    }

    let report = StampReport { value, all_day };
    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "stamp",
        &report,
        None::<&HumanOutput>,
    )
}
