use std::fmt::Display;
use std::time::SystemTime;

use chrono::{DateTime, Local, TimeZone};

pub fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 && weight.abs() < 1e15 {
        format!("{}", weight as i64)
    } else {
        format!("{weight:.1}")
    }
}

pub fn vehicles_label(weight: f64) -> String {
    format!("{} vehicles", format_weight(weight))
}

pub fn format_route(route: &[String]) -> String {
    route.join(" → ")
}

/// Local wall-clock time of day, `HH:MM:SS`.
pub fn format_clock(time: SystemTime) -> String {
    time_of_day(DateTime::<Local>::from(time))
}

fn time_of_day<Tz>(time: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    time.format("%H:%M:%S").to_string()
}

pub fn format_countdown(secs: f64) -> String {
    if secs.is_finite() {
        format!("{}s", secs.max(0.0).round() as u64)
    } else {
        "-".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use chrono::{FixedOffset, Utc};

    use super::*;

    #[test]
    fn weights_drop_trailing_zeroes() {
        assert_eq!(vehicles_label(12.0), "12 vehicles");
        assert_eq!(vehicles_label(2.75), "2.8 vehicles");
    }

    #[test]
    fn route_joins_with_arrows() {
        let route = vec!["Start".to_owned(), "R1".to_owned(), "End".to_owned()];
        assert_eq!(format_route(&route), "Start → R1 → End");
        assert_eq!(format_route(&[]), "");
    }

    #[test]
    fn clock_follows_the_given_zone() {
        let time = UNIX_EPOCH + Duration::from_secs(86_400 * 3 + 3600 * 13 + 60 * 7 + 9);
        assert_eq!(time_of_day(DateTime::<Utc>::from(time)), "13:07:09");

        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            time_of_day(DateTime::<Utc>::from(time).with_timezone(&plus_two)),
            "15:07:09"
        );
    }

    #[test]
    fn clock_uses_local_time() {
        let time = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        let expected = DateTime::<Utc>::from(time).with_timezone(&Local);
        assert_eq!(format_clock(time), expected.format("%H:%M:%S").to_string());
        assert_eq!(format_clock(time).len(), 8);
    }

    #[test]
    fn countdown_never_goes_negative() {
        assert_eq!(format_countdown(2.4), "2s");
        assert_eq!(format_countdown(-3.0), "0s");
        assert_eq!(format_countdown(f64::NAN), "-");
    }
}
