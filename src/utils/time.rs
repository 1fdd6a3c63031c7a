use chrono::{DateTime, Datelike, Local, Utc};

/// Formats a chat's activity timestamp for the sidebar.
///
/// Same calendar day shows the time, the previous day shows "Yesterday",
/// anything within the prior week shows the weekday, and older entries show
/// month and day. All comparisons are against the local calendar.
pub fn format_chat_timestamp(timestamp: DateTime<Utc>) -> String {
    format_relative_to(timestamp.with_timezone(&Local), Local::now())
}

fn format_relative_to(timestamp: DateTime<Local>, now: DateTime<Local>) -> String {
    let days = (now.date_naive() - timestamp.date_naive()).num_days();
    match days {
        d if d <= 0 => timestamp.format("%H:%M").to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => timestamp.format("%a").to_string(),
        _ => format!("{} {}", timestamp.format("%b"), timestamp.day()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, 0).single().unwrap()
    }

    #[test]
    fn same_day_shows_time() {
        let now = local(2025, 3, 15, 14, 30);
        assert_eq!(format_relative_to(local(2025, 3, 15, 9, 5), now), "09:05");
    }

    #[test]
    fn previous_day_is_yesterday() {
        let now = local(2025, 3, 15, 14, 30);
        assert_eq!(
            format_relative_to(local(2025, 3, 14, 21, 0), now),
            "Yesterday"
        );
    }

    #[test]
    fn within_a_week_shows_weekday() {
        let now = local(2025, 3, 15, 14, 30);
        assert_eq!(format_relative_to(local(2025, 3, 12, 8, 0), now), "Wed");
        assert_eq!(format_relative_to(local(2025, 3, 9, 23, 59), now), "Sun");
    }

    #[test]
    fn a_week_or_older_shows_month_and_day() {
        let now = local(2025, 3, 15, 14, 30);
        assert_eq!(format_relative_to(local(2025, 3, 8, 10, 0), now), "Mar 8");
        assert_eq!(
            format_relative_to(local(2024, 12, 25, 18, 0), now),
            "Dec 25"
        );
    }

    #[test]
    fn future_timestamps_fall_back_to_time() {
        let now = local(2025, 3, 15, 14, 30);
        assert_eq!(format_relative_to(local(2025, 3, 16, 0, 10), now), "00:10");
    }
}
