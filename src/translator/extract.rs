//! Signal extractors
//!
//! Each extractor reads the normalized question and returns an optional typed
//! value. Extractors are independent: none consults another's result, and
//! the absence of one signal says nothing about the others.
//!
//! Extractors that can see a malformed value return `SignalResult`, so the
//! caller can tell "not mentioned" (`Ok(None)`) from "mentioned but
//! unusable" (`Err`). `ExtractedSignals::extract` folds both into an absent
//! signal and keeps the error as a diagnostic.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::{Captures, Regex};
use serde::Serialize;

use super::errors::{SignalError, SignalResult};
use super::lexicon::{genitive_alternation, genitive_month, locative_alternation, locative_month};
use super::metric::Metric;
use super::sql::Column;

static THRESHOLD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<trigger>\bбольше|\bболее|\bне меньше|>=|\bот)\s*(?P<digits>[0-9][0-9 \x{a0}]*)")
        .expect("threshold pattern")
});

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b([0-9]{{1,2}})\s+({})\s+([0-9]{{4}})\b",
        genitive_alternation()
    ))
    .expect("date pattern")
});

static RANGE_FULL_RE: LazyLock<Regex> = LazyLock::new(|| {
    let months = genitive_alternation();
    Regex::new(&format!(
        r"\bс\s+([0-9]{{1,2}})\s+({m})\s+([0-9]{{4}})\s+по\s+([0-9]{{1,2}})\s+({m})\s+([0-9]{{4}})",
        m = months
    ))
    .expect("full date range pattern")
});

static RANGE_SHARED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\bс\s+([0-9]{{1,2}})\s+по\s+([0-9]{{1,2}})\s+({})\s+([0-9]{{4}})",
        genitive_alternation()
    ))
    .expect("shared date range pattern")
});

static MONTH_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\bв\s+({})\s+([0-9]{{4}})\b",
        locative_alternation()
    ))
    .expect("month-year pattern")
});

const CLOCK: &str = r"([0-9]{1,2})(?::([0-9]{2}))?";

/// Time range surface forms, in the order they are tried
static TIME_RANGE_RES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(&format!(r"\bс\s+{CLOCK}\s*(?:до|по|-|–)\s*{CLOCK}\b")),
        Regex::new(&format!(r"\bмежду\s+{CLOCK}\s*(?:и|-|–)\s*{CLOCK}\b")),
        Regex::new(&format!(r"\b{CLOCK}\s*[-–]\s*{CLOCK}\b")),
    ]
    .map(|re| re.expect("time range pattern"))
});

static MONTH_FOLLOWS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s+(?:{})\b", genitive_alternation())).expect("month lookahead")
});

static CREATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:автор(?:а)?|креатор(?:а)?)(?:\s+с)?(?:\s+id)?\s*[:=]?\s*([a-z0-9_-]+)")
        .expect("creator pattern")
});

static TOP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bтоп\s*([0-9]+)").expect("top pattern"));

/// Comparison carried by a threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Comparison {
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterOrEqual,
}

impl Comparison {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Comparison::Greater => " > ",
            Comparison::GreaterOrEqual => " >= ",
        }
    }
}

/// Integer threshold with its operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Threshold {
    pub op: Comparison,
    pub value: i64,
}

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// A calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthYear {
    pub year: i32,
    pub month: u32,
}

impl MonthYear {
    /// Half-open window `[first day, first day of next month)`
    pub fn window(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = NaiveDate::from_ymd_opt(self.year, self.month, 1)?;
        let end = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)?
        };
        Some((start, end))
    }
}

/// Half-open time-of-day window `[from, to)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub from: NaiveTime,
    pub to: NaiveTime,
}

/// Every signal found in one question
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedSignals {
    pub creator_id: Option<String>,
    pub threshold: Option<Threshold>,
    pub date: Option<NaiveDate>,
    pub date_range: Option<DateRange>,
    pub month_year: Option<MonthYear>,
    pub time_range: Option<TimeRange>,
    pub metric: Option<Metric>,
    pub top_limit: Option<i64>,
    /// Signals that were present but malformed
    #[serde(skip)]
    pub diagnostics: Vec<SignalError>,
}

impl ExtractedSignals {
    /// Runs every extractor over normalized text
    pub fn extract(text: &str) -> Self {
        let mut diagnostics = Vec::new();

        let threshold = keep(threshold(text), &mut diagnostics);
        let date = keep(explicit_date(text), &mut diagnostics);
        let date_range = keep(date_range(text), &mut diagnostics);
        let time_range = keep(time_range(text), &mut diagnostics);
        let top_limit = keep(top_limit(text), &mut diagnostics);

        Self {
            creator_id: creator_id(text),
            threshold,
            date,
            date_range,
            month_year: month_year(text),
            time_range,
            metric: Metric::resolve(text),
            top_limit,
            diagnostics,
        }
    }

    pub fn value_column(&self) -> Option<Column> {
        self.metric.map(|m| m.value_column())
    }

    pub fn delta_column(&self) -> Option<Column> {
        self.metric.map(|m| m.delta_column())
    }

    /// True when any calendar signal narrows the question
    pub fn has_calendar_scope(&self) -> bool {
        self.date.is_some()
            || self.date_range.is_some()
            || self.month_year.is_some()
            || self.time_range.is_some()
    }
}

/// "больше 100 000" → `> 100000`, "не меньше 50" → `>= 50`.
///
/// Spaces are stripped only inside the digit run that directly follows the
/// trigger word.
pub fn threshold(text: &str) -> SignalResult<Option<Threshold>> {
    let Some(caps) = THRESHOLD_RE.captures(text) else {
        return Ok(None);
    };

    let op = match &caps["trigger"] {
        "не меньше" | ">=" | "от" => Comparison::GreaterOrEqual,
        _ => Comparison::Greater,
    };

    let raw = caps["digits"].trim_end();
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let value = digits
        .parse::<i64>()
        .map_err(|_| SignalError::malformed_number(raw))?;

    Ok(Some(Threshold { op, value }))
}

/// "28 ноября 2025". The year is mandatory.
pub fn explicit_date(text: &str) -> SignalResult<Option<NaiveDate>> {
    let Some(caps) = DATE_RE.captures(text) else {
        return Ok(None);
    };
    calendar_date("date", &caps, 1, 2, 3).map(Some)
}

/// "с 1 ноября 2025 по 5 декабря 2025" or "с 1 по 5 ноября 2025"
pub fn date_range(text: &str) -> SignalResult<Option<DateRange>> {
    if let Some(caps) = RANGE_FULL_RE.captures(text) {
        let start = calendar_date("date_range", &caps, 1, 2, 3)?;
        let end = calendar_date("date_range", &caps, 4, 5, 6)?;
        return Ok(Some(DateRange { start, end }));
    }

    if let Some(caps) = RANGE_SHARED_RE.captures(text) {
        let start = calendar_date("date_range", &caps, 1, 3, 4)?;
        let end = calendar_date("date_range", &caps, 2, 3, 4)?;
        return Ok(Some(DateRange { start, end }));
    }

    Ok(None)
}

/// "в июне 2025" → (2025, 6)
pub fn month_year(text: &str) -> Option<MonthYear> {
    let caps = MONTH_YEAR_RE.captures(text)?;
    let month = locative_month(&caps[1])?;
    let year = caps[2].parse().ok()?;
    Some(MonthYear { year, month })
}

/// "с 10:00 до 15:00", "между 10 и 12", "10:30-11:45"
///
/// A candidate followed by a month name ("с 1 по 5 ноября") is a day range
/// and is skipped. The first remaining candidate decides: if any part of it
/// is out of range the whole signal is void.
pub fn time_range(text: &str) -> SignalResult<Option<TimeRange>> {
    for re in TIME_RANGE_RES.iter() {
        let candidate = re.captures_iter(text).find(|caps| {
            let end = caps.get(0).map_or(text.len(), |m| m.end());
            !MONTH_FOLLOWS_RE.is_match(&text[end..])
        });

        if let Some(caps) = candidate {
            let from = clock(&caps, 1, 2)?;
            let to = clock(&caps, 3, 4)?;
            return Ok(Some(TimeRange { from, to }));
        }
    }
    Ok(None)
}

/// Token after "автор(а)"/"креатор(а)", e.g. "креатора с id abc-123"
pub fn creator_id(text: &str) -> Option<String> {
    CREATOR_RE
        .captures(text)
        .map(|caps| caps[1].to_string())
}

/// "топ 10" → 10
pub fn top_limit(text: &str) -> SignalResult<Option<i64>> {
    let Some(caps) = TOP_RE.captures(text) else {
        return Ok(None);
    };
    caps[1]
        .parse::<i64>()
        .map(Some)
        .map_err(|_| SignalError::malformed_number(&caps[1]))
}

fn keep<T>(result: SignalResult<Option<T>>, diagnostics: &mut Vec<SignalError>) -> Option<T> {
    result.unwrap_or_else(|err| {
        diagnostics.push(err);
        None
    })
}

fn calendar_date(
    signal: &'static str,
    caps: &Captures<'_>,
    day: usize,
    month: usize,
    year: usize,
) -> SignalResult<NaiveDate> {
    // The patterns guarantee 1-2 and 4 digit groups and a lexicon month.
    let d: u32 = caps[day].parse().unwrap_or(0);
    let m = genitive_month(&caps[month]).unwrap_or(0);
    let y: i32 = caps[year].parse().unwrap_or(0);

    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| SignalError::malformed_date(signal, y, m, d))
}

fn clock(caps: &Captures<'_>, hour: usize, minute: usize) -> SignalResult<NaiveTime> {
    let h: u32 = caps[hour].parse().unwrap_or(u32::MAX);
    let m: u32 = caps
        .get(minute)
        .map_or(Some(0), |g| g.as_str().parse().ok())
        .unwrap_or(u32::MAX);

    if h > 23 || m > 59 {
        return Err(SignalError::malformed_time(h, m));
    }
    NaiveTime::from_hms_opt(h, m, 0).ok_or_else(|| SignalError::malformed_time(h, m))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_threshold_strips_thousands_separators() {
        let t = threshold("набрало больше 100 000 просмотров").unwrap().unwrap();
        assert_eq!(t.op, Comparison::Greater);
        assert_eq!(t.value, 100_000);
    }

    #[test]
    fn test_threshold_inclusive_triggers() {
        let t = threshold("не меньше 50 лайков").unwrap().unwrap();
        assert_eq!(t, Threshold { op: Comparison::GreaterOrEqual, value: 50 });

        let t = threshold("просмотров >= 7").unwrap().unwrap();
        assert_eq!(t.op, Comparison::GreaterOrEqual);

        let t = threshold("от 1000 просмотров").unwrap().unwrap();
        assert_eq!(t, Threshold { op: Comparison::GreaterOrEqual, value: 1000 });
    }

    #[test]
    fn test_threshold_needs_digits() {
        assert_eq!(threshold("набрало больше просмотров").unwrap(), None);
    }

    #[test]
    fn test_threshold_ignores_trigger_inside_word() {
        // "которых" contains "от" but is not the trigger word
        assert_eq!(threshold("видео, которых 5").unwrap(), None);
    }

    #[test]
    fn test_threshold_overflow_is_malformed() {
        let err = threshold("больше 99999999999999999999").unwrap_err();
        assert_eq!(err.signal(), "threshold");
    }

    #[test]
    fn test_threshold_stays_local() {
        let t = threshold("больше 1 000 просмотров в 2025").unwrap().unwrap();
        assert_eq!(t.value, 1000);
    }

    #[test]
    fn test_explicit_date() {
        assert_eq!(explicit_date("28 ноября 2025").unwrap(), Some(ymd(2025, 11, 28)));
        assert_eq!(explicit_date("28 ноября").unwrap(), None);
    }

    #[test]
    fn test_explicit_date_invalid_day() {
        assert!(explicit_date("31 февраля 2025").is_err());
    }

    #[test]
    fn test_date_range_shared_month() {
        let range = date_range("с 1 по 5 ноября 2025").unwrap().unwrap();
        assert_eq!(range.start, ymd(2025, 11, 1));
        assert_eq!(range.end, ymd(2025, 11, 5));
    }

    #[test]
    fn test_date_range_independent_endpoints() {
        let range = date_range("с 1 ноября 2025 по 5 декабря 2025")
            .unwrap()
            .unwrap();
        assert_eq!(range.start, ymd(2025, 11, 1));
        assert_eq!(range.end, ymd(2025, 12, 5));
    }

    #[test]
    fn test_month_year_uses_locative() {
        assert_eq!(
            month_year("в июне 2025 года"),
            Some(MonthYear { year: 2025, month: 6 })
        );
        assert_eq!(month_year("в июня 2025"), None);
    }

    #[test]
    fn test_month_window_rolls_over_year() {
        let (start, end) = MonthYear { year: 2025, month: 12 }.window().unwrap();
        assert_eq!(start, ymd(2025, 12, 1));
        assert_eq!(end, ymd(2026, 1, 1));

        let (start, end) = MonthYear { year: 2024, month: 2 }.window().unwrap();
        assert_eq!(start, ymd(2024, 2, 1));
        assert_eq!(end, ymd(2024, 3, 1));
    }

    #[test]
    fn test_time_range_forms() {
        let expected = TimeRange { from: hm(10, 0), to: hm(15, 0) };
        assert_eq!(time_range("с 10:00 до 15:00").unwrap(), Some(expected));
        assert_eq!(time_range("с 10 по 15 часов").unwrap(), Some(expected));
        assert_eq!(time_range("между 10:00 и 15:00").unwrap(), Some(expected));
        assert_eq!(time_range("в 10:00-15:00").unwrap(), Some(expected));
        assert_eq!(
            time_range("между 9:30 - 11:45").unwrap(),
            Some(TimeRange { from: hm(9, 30), to: hm(11, 45) })
        );
    }

    #[test]
    fn test_time_range_out_of_range_voids_everything() {
        assert!(time_range("с 10:00 до 25:00").is_err());
        assert!(time_range("с 10:75 до 12:00").is_err());
    }

    #[test]
    fn test_day_range_is_not_time_range() {
        assert_eq!(time_range("с 1 по 5 ноября 2025").unwrap(), None);
    }

    #[test]
    fn test_creator_id_variants() {
        assert_eq!(creator_id("у креатора abc123"), Some("abc123".into()));
        assert_eq!(creator_id("у автора с id x_y-1"), Some("x_y-1".into()));
        assert_eq!(creator_id("автор: qwe"), Some("qwe".into()));
        assert_eq!(creator_id("сколько видео у авторов"), None);
    }

    #[test]
    fn test_top_limit() {
        assert_eq!(top_limit("топ 5 авторов").unwrap(), Some(5));
        assert_eq!(top_limit("топ авторов").unwrap(), None);
    }

    #[test]
    fn test_signals_are_independent() {
        let signals = ExtractedSignals::extract("сколько всего видео");
        assert_eq!(signals, ExtractedSignals::default());

        let signals = ExtractedSignals::extract("лайки 28 ноября 2025");
        assert_eq!(signals.metric, Some(Metric::Likes));
        assert_eq!(signals.date, Some(ymd(2025, 11, 28)));
        assert!(signals.creator_id.is_none());
        assert!(signals.threshold.is_none());
        assert!(signals.time_range.is_none());
    }

    #[test]
    fn test_malformed_signals_become_diagnostics() {
        let signals = ExtractedSignals::extract("просмотры 28 ноября 2025 с 10:00 до 24:00");
        assert!(signals.time_range.is_none());
        assert_eq!(signals.date, Some(ymd(2025, 11, 28)));
        assert_eq!(signals.diagnostics.len(), 1);
        assert_eq!(signals.diagnostics[0].signal(), "time_range");
    }

    #[test]
    fn test_zero_threshold_is_present() {
        let signals = ExtractedSignals::extract("больше 0 просмотров");
        assert_eq!(
            signals.threshold,
            Some(Threshold { op: Comparison::Greater, value: 0 })
        );
    }
}
