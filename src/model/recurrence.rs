// File: ./src/model/recurrence.rs
//! Translation of natural-language recurrence phrases into RRULE values.
//!
//! Phrases are tried against an ordered table of patterns. The first pattern that
//! matches *and* manages to build a rule wins; a pattern whose builder gives up lets
//! the next one have a go. New phrasings are added by appending a variant to
//! [`PhrasePattern`] together with its matcher and builder.
use crate::model::item::{DueDate, SourceTask};
use chrono::{Month, Weekday};
use regex::{Captures, Regex};
use rrule::RRuleSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use strum::{Display, EnumIter, IntoEnumIterator};

const WEEKDAYS: &str = "monday|tuesday|wednesday|thursday|friday|saturday|sunday";
const MONTHS: &str =
    "january|february|march|april|may|june|july|august|september|october|november|december";

static NTH_WEEKDAY_OF_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)every!? (?P<nth>\d+)(?:st|nd|rd|th) (?P<day>{WEEKDAYS}) of (?P<month>{MONTHS})\b"
    ))
    .expect("nth-weekday pattern")
});

static DAY_OF_FIXED_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)every!? (?P<month>december|june|august) (?P<date>\d{1,2})\b")
        .expect("fixed-month pattern")
});

static UNIT_CADENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"[Ee]very!? (?P<unit>day|week|month|year|(?i:{WEEKDAYS}))\b\s*(?P<time>.*)"
    ))
    .expect("unit pattern")
});

static INTERVAL_CADENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[Ee]very!? (?P<interval>\d+) (?P<unit>days|weeks|months)\b")
        .expect("interval pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// Structured RRULE. Renders as the RRULE property value via `Display`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub freq: Frequency,
    pub interval: Option<u32>,
    pub by_hour: Option<u32>,
    /// Weekday code, optionally prefixed with an ordinal (`SU`, `3SU`).
    pub by_day: Option<String>,
    pub by_month: Option<u32>,
}

impl RecurrenceRule {
    pub fn new(freq: Frequency) -> Self {
        Self {
            freq,
            interval: None,
            by_hour: None,
            by_day: None,
            by_month: None,
        }
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FREQ={}", self.freq)?;
        if let Some(interval) = self.interval {
            write!(f, ";INTERVAL={}", interval)?;
        }
        if let Some(hour) = self.by_hour {
            write!(f, ";BYHOUR={}", hour)?;
        }
        if let Some(day) = &self.by_day {
            write!(f, ";BYDAY={}", day)?;
        }
        if let Some(month) = self.by_month {
            write!(f, ";BYMONTH={}", month)?;
        }
        Ok(())
    }
}

/// Phrase shapes we understand, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
enum PhrasePattern {
    /// "every 3rd sunday of november"
    NthWeekdayOfMonth,
    /// "every december 1". The day number is matched but not kept.
    DayOfFixedMonth,
    /// "every week", "every day 9 AM", "every monday 3 PM"
    UnitCadence,
    /// "every 3 days"
    IntervalCadence,
}

impl PhrasePattern {
    fn matcher(self) -> &'static Regex {
        match self {
            Self::NthWeekdayOfMonth => &NTH_WEEKDAY_OF_MONTH,
            Self::DayOfFixedMonth => &DAY_OF_FIXED_MONTH,
            Self::UnitCadence => &UNIT_CADENCE,
            Self::IntervalCadence => &INTERVAL_CADENCE,
        }
    }

    fn build(self, caps: &Captures<'_>) -> Option<RecurrenceRule> {
        match self {
            Self::NthWeekdayOfMonth => {
                let nth: u8 = caps["nth"].parse().ok()?;
                if !(1..=5).contains(&nth) {
                    return None;
                }
                let day = weekday_code(Weekday::from_str(&caps["day"]).ok()?);
                let mut rule = RecurrenceRule::new(convert_date_unit("year")?);
                rule.by_day = Some(format!("{}{}", nth, day));
                rule.by_month = Some(month_number(&caps["month"])?);
                Some(rule)
            }
            Self::DayOfFixedMonth => {
                // TODO: keep `date` as BYMONTHDAY once phrases other than "<month> 1" show up.
                let mut rule = RecurrenceRule::new(convert_date_unit("year")?);
                rule.by_month = Some(month_number(&caps["month"])?);
                Some(rule)
            }
            Self::UnitCadence => {
                let unit = &caps["unit"];
                let freq = if Weekday::from_str(unit).is_ok() {
                    Frequency::Weekly
                } else {
                    convert_date_unit(unit)?
                };
                let mut rule = RecurrenceRule::new(freq);
                let time = caps.name("time").map(|m| m.as_str().trim()).unwrap_or("");
                if !time.is_empty() {
                    match parse_clock_hour(time) {
                        Some(hour) => rule.by_hour = Some(hour),
                        None => log::warn!("ignoring unrecognised time of day '{}'", time),
                    }
                }
                Some(rule)
            }
            Self::IntervalCadence => {
                let mut rule = RecurrenceRule::new(convert_date_unit(&caps["unit"])?);
                rule.interval = Some(caps["interval"].parse().ok()?);
                Some(rule)
            }
        }
    }
}

/// Maps an English unit name to a frequency. Lowercase singular or plural only.
pub fn convert_date_unit(unit: &str) -> Option<Frequency> {
    match unit {
        "day" | "days" => Some(Frequency::Daily),
        "week" | "weeks" => Some(Frequency::Weekly),
        "month" | "months" => Some(Frequency::Monthly),
        "year" | "years" => Some(Frequency::Yearly),
        _ => {
            log::error!("unknown unit {}", unit);
            None
        }
    }
}

/// Translates a recurrence phrase. Pure apart from logging.
pub fn translate(phrase: &str) -> Option<RecurrenceRule> {
    PhrasePattern::iter().find_map(|pattern| {
        let caps = pattern.matcher().captures(phrase)?;
        pattern.build(&caps)
    })
}

/// Recurrence rule for a source task's due phrase, logging phrases we cannot read.
pub fn convert_recurring(task: &SourceTask) -> Option<RecurrenceRule> {
    let phrase = task.due.as_ref().map(|d| d.string.as_str()).unwrap_or("");
    log::debug!("{} searching {}", task.content, phrase);
    let rule = translate(phrase);
    if rule.is_none() {
        log::error!("For {}, {} does not match", task.content, phrase);
    }
    rule
}

/// Checks that the rule expands from the given due date.
pub fn validate(rule: &RecurrenceRule, due: &DueDate) -> Result<(), String> {
    let dtstart = due.naive().format("%Y%m%dT%H%M%SZ");
    let text = format!("DTSTART:{}\nRRULE:{}", dtstart, rule);
    RRuleSet::from_str(&text)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

/// "3 PM", "3pm", "at 11 am" -> hour of day (0-23).
pub fn parse_clock_hour(text: &str) -> Option<u32> {
    let lower = text.trim().to_lowercase();
    let clock = lower.strip_prefix("at ").unwrap_or(&lower);
    let (digits, afternoon) = if let Some(h) = clock.strip_suffix("am") {
        (h, false)
    } else if let Some(h) = clock.strip_suffix("pm") {
        (h, true)
    } else {
        return None;
    };
    let hour: u32 = digits.trim().parse().ok()?;
    if !(1..=12).contains(&hour) {
        return None;
    }
    Some(match (hour, afternoon) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    })
}

fn month_number(name: &str) -> Option<u32> {
    Month::from_str(name).ok().map(|m| m.number_from_month())
}

fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}
