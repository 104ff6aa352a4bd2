use chrono::{DateTime, TimeZone, Timelike};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ClockFace {
    pub(crate) time: String,
    pub(crate) is_day: bool,
}

impl ClockFace {
    pub(crate) fn at<Tz: TimeZone>(now: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let hour = now.hour();
        Self {
            time: now.format("%H:%M").to_string(),
            is_day: (6..18).contains(&hour),
        }
    }

    pub(crate) fn glyph(&self) -> char {
        if self.is_day {
            '☀'
        } else {
            '☾'
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn at(h: u32, m: u32) -> ClockFace {
        let t = Utc.with_ymd_and_hms(2026, 10, 18, h, m, 0).unwrap();
        ClockFace::at(&t)
    }

    #[test]
    fn formats_24_hour_with_padding() {
        assert_eq!(at(7, 5).time, "07:05");
        assert_eq!(at(23, 59).time, "23:59");
        assert_eq!(at(0, 0).time, "00:00");
    }

    #[test]
    fn day_runs_from_six_to_eighteen() {
        assert!(!at(5, 59).is_day);
        assert!(at(6, 0).is_day);
        assert!(at(17, 59).is_day);
        assert!(!at(18, 0).is_day);
        assert_eq!(at(12, 0).glyph(), '☀');
        assert_eq!(at(2, 0).glyph(), '☾');
    }
}
