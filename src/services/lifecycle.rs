//! lifecycle.rs
//!
//! Статус события и работа с датами события.
//!
//! - Статус (SCHEDULED / COMING_UP / LIVE / COMPLETED) вычисляется из начала,
//!   конца и текущего момента. Он нигде не хранится и пересчитывается при
//!   каждом чтении.
//! - Подпись диапазона дат ("June 10-12") для списков.
//! - Перевод между UTC и локальным временем объекта для формы редактирования.

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// За сколько до начала событие считается "скоро".
pub const COMING_UP_WINDOW_DAYS: i64 = 5;

/// Зона для формы, если у объекта её нет.
pub const DEFAULT_TIME_ZONE: &str = "America/New_York";

const LOCAL_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    Scheduled,
    ComingUp,
    Live,
    Completed,
}

impl EventStatus {
    /// Правила проверяются строго по порядку.
    pub fn derive(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now < start - Duration::days(COMING_UP_WINDOW_DAYS) {
            EventStatus::Scheduled
        } else if now < start {
            EventStatus::ComingUp
        } else if now <= end {
            EventStatus::Live
        } else {
            EventStatus::Completed
        }
    }

    /// Порядок в списке: LIVE, COMING_UP, SCHEDULED, COMPLETED.
    pub fn display_rank(self) -> u8 {
        match self {
            EventStatus::Live => 0,
            EventStatus::ComingUp => 1,
            EventStatus::Scheduled => 2,
            EventStatus::Completed => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EventStatus::Scheduled => "SCHEDULED",
            EventStatus::ComingUp => "COMING UP",
            EventStatus::Live => "LIVE",
            EventStatus::Completed => "COMPLETED",
        }
    }
}

pub fn parse_time_zone(name: &str) -> AppResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| AppError::Validation(format!("unknown time zone '{}'", name)))
}

/// Зона отображения: явная, иначе зона по умолчанию.
pub fn display_zone(name: Option<&str>) -> Tz {
    name.and_then(|n| n.parse::<Tz>().ok())
        .unwrap_or(chrono_tz::America::New_York)
}

/// "June 10", "June 10-12" или "Jun 30 - Jul 2" в зоне `tz`.
pub fn format_event_date(start: DateTime<Utc>, end: Option<DateTime<Utc>>, tz: Tz) -> String {
    let start = start.with_timezone(&tz);
    let end = end.unwrap_or(start.with_timezone(&Utc)).with_timezone(&tz);

    if start.date_naive() == end.date_naive() {
        format!("{}", start.format("%B %-d"))
    } else if start.year() == end.year() && start.month() == end.month() {
        format!("{}-{}", start.format("%B %-d"), end.day())
    } else {
        format!("{} - {}", start.format("%b %-d"), end.format("%b %-d"))
    }
}

/// Время для поля `datetime-local`: `YYYY-MM-DDTHH:MM` в зоне объекта.
pub fn to_local_input(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format(LOCAL_INPUT_FORMAT).to_string()
}

/// Обратное преобразование. Неоднозначное время при переводе часов берём
/// самое раннее, несуществующее время - ошибка формы.
pub fn from_local_input(value: &str, tz: Tz) -> AppResult<DateTime<Utc>> {
    let value = value.trim();
    let naive = NaiveDateTime::parse_from_str(value, LOCAL_INPUT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| AppError::Validation(format!("'{}' is not a valid date and time", value)))?;

    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            AppError::Validation(format!("'{}' does not exist in {}", value, tz.name()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn status_examples() {
        let start = at("2025-06-10T00:00:00Z");
        let end = at("2025-06-12T00:00:00Z");

        assert_eq!(EventStatus::derive(start, end, at("2025-06-01T00:00:00Z")), EventStatus::Scheduled);
        assert_eq!(EventStatus::derive(start, end, at("2025-06-08T00:00:00Z")), EventStatus::ComingUp);
        assert_eq!(EventStatus::derive(start, end, at("2025-06-11T00:00:00Z")), EventStatus::Live);
        assert_eq!(EventStatus::derive(start, end, at("2025-06-13T00:00:00Z")), EventStatus::Completed);
    }

    #[test]
    fn window_boundaries() {
        let start = at("2025-06-10T00:00:00Z");
        let end = at("2025-06-12T00:00:00Z");

        // Ровно за 5 дней уже "скоро"
        assert_eq!(EventStatus::derive(start, end, at("2025-06-05T00:00:00Z")), EventStatus::ComingUp);
        assert_eq!(EventStatus::derive(start, end, start), EventStatus::Live);
        assert_eq!(EventStatus::derive(start, end, end), EventStatus::Live);
    }

    #[test]
    fn inverted_range_skips_live() {
        let start = at("2025-06-10T00:00:00Z");
        let end = at("2025-06-09T00:00:00Z");
        assert_eq!(EventStatus::derive(start, end, start), EventStatus::Completed);
    }

    #[test]
    fn formats_date_ranges() {
        let tz = chrono_tz::UTC;
        assert_eq!(
            format_event_date(at("2025-06-10T09:00:00Z"), Some(at("2025-06-10T18:00:00Z")), tz),
            "June 10"
        );
        assert_eq!(
            format_event_date(at("2025-06-10T09:00:00Z"), Some(at("2025-06-12T18:00:00Z")), tz),
            "June 10-12"
        );
        assert_eq!(
            format_event_date(at("2025-06-30T09:00:00Z"), Some(at("2025-07-02T18:00:00Z")), tz),
            "Jun 30 - Jul 2"
        );
        assert_eq!(format_event_date(at("2025-06-30T09:00:00Z"), None, tz), "June 30");
    }

    #[test]
    fn date_label_uses_event_zone() {
        // 02:00 UTC 11 июня - это ещё 10 июня в Чикаго
        let tz = parse_time_zone("America/Chicago").unwrap();
        assert_eq!(
            format_event_date(at("2025-06-10T15:00:00Z"), Some(at("2025-06-11T02:00:00Z")), tz),
            "June 10"
        );
    }

    #[test]
    fn local_input_round_trip_in_zone() {
        let tz = parse_time_zone("America/Denver").unwrap();
        let instant = at("2025-03-01T17:30:00Z");
        let local = to_local_input(instant, tz);
        assert_eq!(local, "2025-03-01T10:30");
        assert_eq!(from_local_input(&local, tz).unwrap(), instant);
    }

    #[test]
    fn nonexistent_local_time_is_rejected() {
        let tz = parse_time_zone("America/New_York").unwrap();
        // Перевод часов: 02:30 9 марта 2025 не существует
        assert!(matches!(
            from_local_input("2025-03-09T02:30", tz),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn unknown_zone_is_validation_error() {
        assert!(parse_time_zone("Mars/Olympus").is_err());
        assert_eq!(display_zone(Some("Mars/Olympus")), chrono_tz::America::New_York);
    }
}
