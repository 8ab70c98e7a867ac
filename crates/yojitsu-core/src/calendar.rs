//! Public holiday lookup.
//!
//! Deterministic, pure logic. No IO, no wall-clock, no randomness.
//!
//! The weekday coloring of the monthly sheets treats public holidays like
//! Sundays, so the report needs a date → holiday lookup. It is injected as a
//! capability ([`HolidayCalendar`]) rather than read from ambient state:
//! the built-in [`JapaneseHolidays`] covers the primary deployment, and
//! [`NoHolidays`] backs locale-free runs and tests.

use chrono::{Datelike, NaiveDate, Weekday};

/// Date → public holiday lookup, initialized once per run.
pub trait HolidayCalendar {
    /// Name of the public holiday falling on `date`, if any.
    fn holiday_name(&self, date: NaiveDate) -> Option<&'static str>;

    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holiday_name(date).is_some()
    }
}

/// Calendar with no public holidays.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHolidays;

impl HolidayCalendar for NoHolidays {
    fn holiday_name(&self, _date: NaiveDate) -> Option<&'static str> {
        None
    }
}

/// Japanese national holidays, computed from the statutory rules.
///
/// Valid for 2000-2099:
/// - fixed-date holidays (era-aware: the Emperor's Birthday moved from
///   December 23rd to February 23rd with the 2019 accession),
/// - Happy Monday holidays (second/third Mondays),
/// - equinox days via the standard astronomical approximation,
/// - the 2020/2021 Olympic one-off moves of Marine Day, Sports Day and
///   Mountain Day,
/// - substitute holidays (振替休日) for holidays falling on a Sunday,
/// - the citizens' holiday (国民の休日) for a weekday sandwiched between
///   two holidays.
#[derive(Clone, Copy, Debug, Default)]
pub struct JapaneseHolidays;

impl HolidayCalendar for JapaneseHolidays {
    fn holiday_name(&self, date: NaiveDate) -> Option<&'static str> {
        if let Some(name) = base_holiday(date) {
            return Some(name);
        }
        if is_substitute_holiday(date) {
            return Some("振替休日");
        }
        if is_citizens_holiday(date) {
            return Some("国民の休日");
        }
        None
    }
}

/// Statutory holiday on its own date, ignoring substitute rules.
fn base_holiday(date: NaiveDate) -> Option<&'static str> {
    let (year, month, day) = (date.year(), date.month(), date.day());

    // One-off moves for the Tokyo Olympic years override the regular rules.
    if let Some(name) = olympic_exception(year, month, day) {
        return Some(name);
    }
    if olympic_suppressed(year, month, day) {
        return None;
    }

    match (month, day) {
        (1, 1) => return Some("元日"),
        (2, 11) => return Some("建国記念の日"),
        (2, 23) if year >= 2020 => return Some("天皇誕生日"),
        (4, 29) => return Some("昭和の日"),
        (5, 3) => return Some("憲法記念日"),
        (5, 4) => return Some("みどりの日"),
        (5, 5) => return Some("こどもの日"),
        (8, 11) if year >= 2016 => return Some("山の日"),
        (11, 3) => return Some("文化の日"),
        (11, 23) => return Some("勤労感謝の日"),
        (12, 23) if year <= 2018 => return Some("天皇誕生日"),
        _ => {}
    }

    // Happy Monday holidays
    if month == 1 && is_nth_monday(date, 2) {
        return Some("成人の日");
    }
    if month == 7 {
        if year >= 2003 && is_nth_monday(date, 3) {
            return Some("海の日");
        }
        if year < 2003 && day == 20 {
            return Some("海の日");
        }
    }
    if month == 9 {
        if year >= 2003 && is_nth_monday(date, 3) {
            return Some("敬老の日");
        }
        if year < 2003 && day == 15 {
            return Some("敬老の日");
        }
    }
    if month == 10 && is_nth_monday(date, 2) {
        return Some(if year >= 2020 { "スポーツの日" } else { "体育の日" });
    }

    // Equinoxes
    if month == 3 && day == vernal_equinox_day(year) {
        return Some("春分の日");
    }
    if month == 9 && day == autumnal_equinox_day(year) {
        return Some("秋分の日");
    }

    None
}

/// Marine Day, Sports Day and Mountain Day were moved to bracket the Tokyo
/// Olympic opening/closing ceremonies in 2020 and (postponed) 2021.
fn olympic_exception(year: i32, month: u32, day: u32) -> Option<&'static str> {
    match (year, month, day) {
        (2020, 7, 23) | (2021, 7, 22) => Some("海の日"),
        (2020, 7, 24) | (2021, 7, 23) => Some("スポーツの日"),
        (2020, 8, 10) | (2021, 8, 8) => Some("山の日"),
        _ => None,
    }
}

/// The regular dates those moved holidays would otherwise fall on.
fn olympic_suppressed(year: i32, month: u32, day: u32) -> bool {
    if year != 2020 && year != 2021 {
        return false;
    }
    (month == 7 && is_nth_monday_ymd(year, month, day, 3))
        || (month == 10 && is_nth_monday_ymd(year, month, day, 2))
        || (month == 8 && day == 11)
}

/// A non-holiday immediately following a run of holidays that started on a
/// Sunday holiday is the substitute for it.
fn is_substitute_holiday(date: NaiveDate) -> bool {
    if base_holiday(date).is_some() {
        return false;
    }
    let mut cursor = date.pred_opt();
    while let Some(prev) = cursor {
        if base_holiday(prev).is_none() {
            return false;
        }
        if prev.weekday() == Weekday::Sun {
            return true;
        }
        cursor = prev.pred_opt();
    }
    false
}

/// A weekday sandwiched between two holidays becomes one itself
/// (the September "Silver Week" pattern).
fn is_citizens_holiday(date: NaiveDate) -> bool {
    if date.weekday() == Weekday::Sun || base_holiday(date).is_some() {
        return false;
    }
    let before = date.pred_opt().map(base_holiday);
    let after = date.succ_opt().map(base_holiday);
    matches!((before, after), (Some(Some(_)), Some(Some(_))))
}

fn is_nth_monday(date: NaiveDate, nth: u32) -> bool {
    date.weekday() == Weekday::Mon && (date.day() + 6) / 7 == nth
}

fn is_nth_monday_ymd(year: i32, month: u32, day: u32, nth: u32) -> bool {
    NaiveDate::from_ymd_opt(year, month, day)
        .map(|d| is_nth_monday(d, nth))
        .unwrap_or(false)
}

/// Day of March of the vernal equinox. Standard approximation, valid
/// 1980-2099.
fn vernal_equinox_day(year: i32) -> u32 {
    let offset = f64::from(year - 1980);
    (20.8431 + 0.242194 * offset - (offset / 4.0).floor()).floor() as u32
}

/// Day of September of the autumnal equinox. Same approximation window.
fn autumnal_equinox_day(year: i32) -> u32 {
    let offset = f64::from(year - 1980);
    (23.2488 + 0.242194 * offset - (offset / 4.0).floor()).floor() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn fixed_holidays() {
        let cal = JapaneseHolidays;
        assert_eq!(cal.holiday_name(date(2025, 1, 1)), Some("元日"));
        assert_eq!(cal.holiday_name(date(2025, 5, 3)), Some("憲法記念日"));
        assert_eq!(cal.holiday_name(date(2025, 11, 3)), Some("文化の日"));
        assert_eq!(cal.holiday_name(date(2025, 1, 2)), None);
    }

    #[test]
    fn emperors_birthday_moves_with_accession() {
        let cal = JapaneseHolidays;
        assert_eq!(cal.holiday_name(date(2018, 12, 23)), Some("天皇誕生日"));
        assert_eq!(cal.holiday_name(date(2020, 12, 23)), None);
        assert_eq!(cal.holiday_name(date(2019, 2, 23)), None);
        assert_eq!(cal.holiday_name(date(2025, 2, 23)), Some("天皇誕生日"));
    }

    #[test]
    fn happy_monday_holidays() {
        let cal = JapaneseHolidays;
        // Second Monday of January 2025
        assert_eq!(cal.holiday_name(date(2025, 1, 13)), Some("成人の日"));
        // Third Monday of July 2025
        assert_eq!(cal.holiday_name(date(2025, 7, 21)), Some("海の日"));
        // Third Monday of September 2025
        assert_eq!(cal.holiday_name(date(2025, 9, 15)), Some("敬老の日"));
        // Second Monday of October 2025
        assert_eq!(cal.holiday_name(date(2025, 10, 13)), Some("スポーツの日"));
        assert_eq!(cal.holiday_name(date(2025, 1, 6)), None);
    }

    #[test]
    fn equinox_days() {
        let cal = JapaneseHolidays;
        assert_eq!(cal.holiday_name(date(2025, 3, 20)), Some("春分の日"));
        assert_eq!(cal.holiday_name(date(2025, 9, 23)), Some("秋分の日"));
        assert_eq!(cal.holiday_name(date(2024, 3, 20)), Some("春分の日"));
        assert_eq!(cal.holiday_name(date(2026, 3, 20)), Some("春分の日"));
    }

    #[test]
    fn substitute_holiday_after_sunday_holiday() {
        let cal = JapaneseHolidays;
        // 2025-02-23 (Emperor's Birthday) is a Sunday; Monday substitutes.
        assert_eq!(cal.holiday_name(date(2025, 2, 24)), Some("振替休日"));
        // 2025-05-06: May 3rd-5th run ends, May 4th was Sunday.
        assert_eq!(cal.holiday_name(date(2025, 5, 6)), Some("振替休日"));
        assert_eq!(cal.holiday_name(date(2025, 2, 25)), None);
    }

    #[test]
    fn citizens_holiday_between_two_holidays() {
        let cal = JapaneseHolidays;
        // 2026: Respect-for-the-Aged Day (Mon 9/21) + Autumnal Equinox
        // (Wed 9/23) sandwich Tuesday 9/22.
        assert_eq!(cal.holiday_name(date(2026, 9, 21)), Some("敬老の日"));
        assert_eq!(cal.holiday_name(date(2026, 9, 23)), Some("秋分の日"));
        assert_eq!(cal.holiday_name(date(2026, 9, 22)), Some("国民の休日"));
    }

    #[test]
    fn olympic_year_moves() {
        let cal = JapaneseHolidays;
        assert_eq!(cal.holiday_name(date(2021, 7, 22)), Some("海の日"));
        assert_eq!(cal.holiday_name(date(2021, 7, 23)), Some("スポーツの日"));
        assert_eq!(cal.holiday_name(date(2021, 8, 8)), Some("山の日"));
        // The regular dates are suppressed in those years
        assert_eq!(cal.holiday_name(date(2021, 7, 19)), None);
        assert_eq!(cal.holiday_name(date(2021, 8, 11)), None);
        assert_eq!(cal.holiday_name(date(2021, 10, 11)), None);
    }

    #[test]
    fn no_holidays_calendar_is_empty() {
        let cal = NoHolidays;
        assert!(!cal.is_holiday(date(2025, 1, 1)));
    }
}
