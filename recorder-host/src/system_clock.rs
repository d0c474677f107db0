use chrono::{Local, Timelike};

use recorder_core::{Clock, TimeOfDay};

/// Wall clock backed by the host's local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn time_of_day(&self) -> TimeOfDay {
        let now = Local::now();
        TimeOfDay::new(now.hour() as u8, now.minute() as u8, now.second() as u8)
    }
}
