//! Relative-date resolution.
//!
//! Free-text queries name dates relative to "today": tomorrow, the day
//! after, a weekday of this or next week. Resolution is deterministic given
//! the reference date, so everything here takes `today` as a parameter
//! instead of reading the clock.

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Weekday words, English and CJK, in `Weekday::num_days_from_monday` order.
const WEEKDAYS: [(&[&str], Weekday); 7] = [
    (&["monday", "周一", "礼拜一"], Weekday::Mon),
    (&["tuesday", "周二", "礼拜二"], Weekday::Tue),
    (&["wednesday", "周三", "礼拜三"], Weekday::Wed),
    (&["thursday", "周四", "礼拜四"], Weekday::Thu),
    (&["friday", "周五", "礼拜五"], Weekday::Fri),
    (&["saturday", "周六", "礼拜六"], Weekday::Sat),
    (&["sunday", "周日", "周天", "礼拜日"], Weekday::Sun),
];

/// The date of `weekday` in the week containing `today` (Monday-based).
///
/// Can be earlier than `today`: asking for "this Monday" on a Wednesday
/// resolves to two days ago, mirroring how people use the phrase.
pub fn this_weekday(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    let offset = weekday.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64;
    add_days(today, offset)
}

/// The date of `weekday` in the week after the one containing `today`.
///
/// Always strictly more than 6 days ahead: "next Monday" asked on any day
/// of this week lands on the following week's Monday, never tomorrow.
pub fn next_weekday(today: NaiveDate, weekday: Weekday) -> NaiveDate {
    add_days(this_weekday(today, weekday), 7)
}

fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    if days >= 0 {
        date.checked_add_days(Days::new(days as u64))
    } else {
        date.checked_sub_days(Days::new((-days) as u64))
    }
    .expect("date arithmetic within calendar range")
}

/// Resolve the first relative-date phrase found in `text`, if any.
///
/// Longer phrases are checked before their substrings ("day after
/// tomorrow" before "tomorrow", "next monday" before "monday"), so a text
/// mentioning both resolves to the more specific one.
pub fn find_in_text(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let lower = text.to_lowercase();

    if lower.contains("day after tomorrow") || lower.contains("后天") {
        return Some(add_days(today, 2));
    }
    if lower.contains("tomorrow") || lower.contains("明天") {
        return Some(add_days(today, 1));
    }
    if lower.contains("today") || lower.contains("今天") {
        return Some(today);
    }

    for (words, weekday) in WEEKDAYS {
        for word in words {
            if lower.contains(&format!("next {word}")) || lower.contains(&format!("下{word}")) {
                return Some(next_weekday(today, weekday));
            }
        }
    }
    for (words, weekday) in WEEKDAYS {
        for word in words {
            if lower.contains(word) {
                return Some(this_weekday(today, weekday));
            }
        }
    }

    None
}

/// Render the resolved-date table handed to the interpretation service.
///
/// Lists today (with weekday), tomorrow, the day after, and every weekday
/// of this week and the next, so the service never has to do calendar
/// arithmetic itself.
pub fn date_table(today: NaiveDate) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "today is {} ({})\n",
        today.format("%Y-%m-%d"),
        weekday_name(today.weekday()),
    ));
    out.push_str(&format!("tomorrow is {}\n", add_days(today, 1).format("%Y-%m-%d")));
    out.push_str(&format!(
        "the day after tomorrow is {}\n",
        add_days(today, 2).format("%Y-%m-%d"),
    ));
    for (words, weekday) in WEEKDAYS {
        out.push_str(&format!(
            "this {} is {}\n",
            words[0],
            this_weekday(today, weekday).format("%Y-%m-%d"),
        ));
    }
    for (words, weekday) in WEEKDAYS {
        out.push_str(&format!(
            "next {} is {}\n",
            words[0],
            next_weekday(today, weekday).format("%Y-%m-%d"),
        ));
    }
    out
}

fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2024-06-05 is a Wednesday.
    fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 5).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn this_weekday_stays_in_week() {
        assert_eq!(this_weekday(wednesday(), Weekday::Mon), ymd(2024, 6, 3));
        assert_eq!(this_weekday(wednesday(), Weekday::Wed), ymd(2024, 6, 5));
        assert_eq!(this_weekday(wednesday(), Weekday::Sun), ymd(2024, 6, 9));
    }

    #[test]
    fn next_weekday_always_beyond_six_days() {
        // From Wednesday: next Thursday is not tomorrow but next week's
        assert_eq!(next_weekday(wednesday(), Weekday::Thu), ymd(2024, 6, 13));
        assert_eq!(next_weekday(wednesday(), Weekday::Mon), ymd(2024, 6, 10));

        // From Sunday, next Monday is still 8 days out, not 1
        let sunday = ymd(2024, 6, 9);
        assert_eq!(next_weekday(sunday, Weekday::Mon), ymd(2024, 6, 10));
        // this Monday from Sunday is the past Monday of the same week
        assert_eq!(this_weekday(sunday, Weekday::Mon), ymd(2024, 6, 3));

        for wd in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ] {
            let resolved = next_weekday(wednesday(), wd);
            assert!((resolved - wednesday()).num_days() > 6);
        }
    }

    #[test]
    fn finds_phrases_in_text() {
        let today = wednesday();
        assert_eq!(find_in_text("leave today please", today), Some(today));
        assert_eq!(find_in_text("明天的高铁", today), Some(ymd(2024, 6, 6)));
        assert_eq!(
            find_in_text("the day after tomorrow works", today),
            Some(ymd(2024, 6, 7))
        );
        assert_eq!(find_in_text("后天出发", today), Some(ymd(2024, 6, 7)));
        assert_eq!(find_in_text("next friday morning", today), Some(ymd(2024, 6, 14)));
        assert_eq!(find_in_text("下周五出发", today), Some(ymd(2024, 6, 14)));
        assert_eq!(find_in_text("friday morning", today), Some(ymd(2024, 6, 7)));
        assert_eq!(find_in_text("no date here", today), None);
    }

    #[test]
    fn more_specific_phrase_wins() {
        let today = wednesday();
        // "day after tomorrow" contains "tomorrow"
        assert_eq!(
            find_in_text("day after tomorrow, not tomorrow", today),
            Some(ymd(2024, 6, 7))
        );
        // "next monday" contains "monday"
        assert_eq!(
            find_in_text("next monday not this monday", today),
            Some(ymd(2024, 6, 10))
        );
    }

    #[test]
    fn table_lists_all_resolutions() {
        let table = date_table(wednesday());
        assert!(table.contains("today is 2024-06-05 (Wednesday)"));
        assert!(table.contains("tomorrow is 2024-06-06"));
        assert!(table.contains("the day after tomorrow is 2024-06-07"));
        assert!(table.contains("this monday is 2024-06-03"));
        assert!(table.contains("next monday is 2024-06-10"));
        assert!(table.contains("next sunday is 2024-06-16"));
    }
}
