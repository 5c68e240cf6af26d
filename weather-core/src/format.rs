//! Display formatting for temperatures and timestamps.
//!
//! All date output is pinned to the `ru_RU` locale regardless of the host
//! locale, so the same input always renders the same string.

use chrono::{DateTime, FixedOffset, Locale, Offset, Utc};

/// Locale every date string is rendered in.
pub const DISPLAY_LOCALE: Locale = Locale::ru_RU;

const ICON_URL_BASE: &str = "https://openweathermap.org/img/wn";

/// Signed display form of a Celsius temperature: `+3`, `-12`, `+0`.
///
/// An absent reading renders as `"Null"`.
pub fn format_temperature(celsius: Option<i32>) -> String {
    match celsius {
        None => "Null".to_string(),
        Some(t) if t >= 0 => format!("+{t}"),
        Some(t) => format!("-{}", t.unsigned_abs()),
    }
}

/// Whole degrees as shown to the user; the fractional part is truncated.
pub fn celsius_to_display(raw: f64) -> i32 {
    raw.trunc() as i32
}

/// Image URL for an icon id; `None` for a blank id.
pub fn icon_url(icon: &str) -> Option<String> {
    let icon = icon.trim();
    if icon.is_empty() {
        return None;
    }
    Some(format!("{ICON_URL_BASE}/{icon}@2x.png"))
}

/// Renders unix timestamps in a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFormatter {
    offset: FixedOffset,
}

impl Default for DateFormatter {
    fn default() -> Self {
        Self::utc()
    }
}

impl DateFormatter {
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Builds a formatter from an offset in seconds east of UTC, as carried by
    /// the weather payloads. Out-of-range offsets fall back to `fallback`.
    pub fn from_offset_seconds(seconds: Option<i32>, fallback: DateFormatter) -> Self {
        seconds
            .and_then(FixedOffset::east_opt)
            .map(Self::new)
            .unwrap_or(fallback)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Weekday, day of month and month name, e.g. `Пт, 5 марта`.
    pub fn long_date(&self, unix_seconds: i64) -> String {
        self.render(unix_seconds, "%a, %-d %B")
    }

    /// Day of month and abbreviated month, e.g. `5 мар`.
    pub fn short_date(&self, unix_seconds: i64) -> String {
        self.render(unix_seconds, "%-d %b")
    }

    /// 24-hour `HH:MM`.
    pub fn time(&self, unix_seconds: i64) -> String {
        self.render(unix_seconds, "%H:%M")
    }

    fn render(&self, unix_seconds: i64, pattern: &str) -> String {
        match DateTime::from_timestamp(unix_seconds, 0) {
            Some(utc) => utc
                .with_timezone(&self.offset)
                .format_localized(pattern, DISPLAY_LOCALE)
                .to_string(),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // 2021-03-05 09:07:00 UTC
    const MARCH_5: i64 = 1_614_935_220;
    // 2021-03-15 23:30:00 UTC
    const MARCH_15_LATE: i64 = 1_615_851_000;
    // 2021-12-31 22:00:00 UTC
    const NEW_YEARS_EVE: i64 = 1_640_988_000;

    fn moscow() -> DateFormatter {
        DateFormatter::new(FixedOffset::east_opt(3 * 3600).expect("valid offset"))
    }

    #[test]
    fn temperature_sign_prefixes() {
        assert_eq!(format_temperature(Some(0)), "+0");
        assert_eq!(format_temperature(Some(21)), "+21");
        assert_eq!(format_temperature(Some(-7)), "-7");
        assert_eq!(format_temperature(Some(i32::MIN)), "-2147483648");
        assert_eq!(format_temperature(None), "Null");
    }

    #[test]
    fn display_temperature_truncates_toward_zero() {
        assert_eq!(celsius_to_display(3.9), 3);
        assert_eq!(celsius_to_display(-3.9), -3);
        assert_eq!(celsius_to_display(-0.4), 0);
    }

    #[test]
    fn icon_url_uses_double_density_png() {
        assert_eq!(
            icon_url("01d").as_deref(),
            Some("https://openweathermap.org/img/wn/01d@2x.png")
        );
    }

    #[test]
    fn blank_icon_has_no_url() {
        assert_eq!(icon_url(""), None);
        assert_eq!(icon_url("  "), None);
    }

    #[test]
    fn single_digit_day_has_no_leading_zero() {
        let fmt = DateFormatter::utc();

        let short = fmt.short_date(MARCH_5);
        assert!(short.starts_with("5 "), "got {short:?}");

        let long = fmt.long_date(MARCH_5);
        assert!(long.contains(", 5 "), "got {long:?}");
        assert!(!long.contains("05"), "got {long:?}");
    }

    #[test]
    fn time_is_24_hour() {
        assert_eq!(DateFormatter::utc().time(MARCH_5), "09:07");
        assert_eq!(DateFormatter::utc().time(MARCH_15_LATE), "23:30");
    }

    #[test]
    fn offset_shifts_the_calendar_day() {
        let fmt = moscow();

        assert_eq!(fmt.time(MARCH_15_LATE), "02:30");
        assert!(fmt.short_date(MARCH_15_LATE).starts_with("16 "));
        assert!(fmt.short_date(NEW_YEARS_EVE).starts_with("1 "));
        assert_eq!(fmt.time(NEW_YEARS_EVE), "01:00");
    }

    #[test]
    fn from_offset_seconds_falls_back_when_missing_or_invalid() {
        let fallback = moscow();

        assert_eq!(DateFormatter::from_offset_seconds(None, fallback), fallback);
        assert_eq!(DateFormatter::from_offset_seconds(Some(i32::MAX), fallback), fallback);
        assert_eq!(
            DateFormatter::from_offset_seconds(Some(0), fallback),
            DateFormatter::utc()
        );
    }

    proptest! {
        #[test]
        fn non_negative_temperatures_get_plus(t in 0i32..=i32::MAX) {
            prop_assert_eq!(format_temperature(Some(t)), format!("+{t}"));
        }

        #[test]
        fn negative_temperatures_have_exactly_one_minus(t in i32::MIN..0i32) {
            let s = format_temperature(Some(t));
            prop_assert_eq!(&s, &format!("-{}", t.unsigned_abs()));
            prop_assert!(!s.starts_with("--"));
        }

        #[test]
        fn dates_never_lead_with_zero_day(ts in 0i64..4_102_444_800i64, offset_h in -12i32..=14i32) {
            let fmt = DateFormatter::new(FixedOffset::east_opt(offset_h * 3600).unwrap());

            let short = fmt.short_date(ts);
            prop_assert!(!short.starts_with('0'), "short date {:?}", short);

            let long = fmt.long_date(ts);
            let day = long.split(", ").nth(1).unwrap_or_default();
            prop_assert!(!day.starts_with('0'), "long date {:?}", long);
        }
    }
}
