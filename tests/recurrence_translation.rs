// File: tests/recurrence_translation.rs
use todoist_caldav::model::recurrence::{convert_date_unit, convert_recurring, translate};
use todoist_caldav::model::{Due, Frequency, RecurrenceRule, SourceTask};

fn rule(freq: Frequency) -> RecurrenceRule {
    RecurrenceRule::new(freq)
}

fn recurring_task(phrase: &str) -> SourceTask {
    SourceTask {
        id: "1".to_string(),
        content: "Water plants".to_string(),
        description: String::new(),
        priority: 1,
        due: Some(Due {
            date: Some("2024-03-15".to_string()),
            datetime: None,
            string: phrase.to_string(),
            is_recurring: true,
        }),
        parent_id: None,
        project_id: "p".to_string(),
        labels: vec![],
        order: 1,
        comment_count: 0,
    }
}

#[test]
fn test_unit_names() {
    for (unit, freq) in [
        ("day", Frequency::Daily),
        ("days", Frequency::Daily),
        ("week", Frequency::Weekly),
        ("weeks", Frequency::Weekly),
        ("month", Frequency::Monthly),
        ("months", Frequency::Monthly),
        ("year", Frequency::Yearly),
        ("years", Frequency::Yearly),
    ] {
        assert_eq!(convert_date_unit(unit), Some(freq), "unit {}", unit);
    }

    for unit in ["fortnight", "Day", "hours", ""] {
        assert_eq!(convert_date_unit(unit), None, "unit {}", unit);
    }
}

#[test]
fn test_weekday_with_time() {
    let mut expected = rule(Frequency::Weekly);
    expected.by_hour = Some(15);
    assert_eq!(translate("every monday 3 PM"), Some(expected.clone()));
    assert_eq!(translate("Every Monday 3pm"), Some(expected));
}

#[test]
fn test_unit_with_and_without_time() {
    assert_eq!(translate("every day"), Some(rule(Frequency::Daily)));
    assert_eq!(translate("every! week"), Some(rule(Frequency::Weekly)));

    let mut morning = rule(Frequency::Daily);
    morning.by_hour = Some(9);
    assert_eq!(translate("every day at 9 am"), Some(morning));

    let mut midnight = rule(Frequency::Monthly);
    midnight.by_hour = Some(0);
    assert_eq!(translate("every month 12 AM"), Some(midnight));
}

#[test]
fn test_unparseable_time_is_dropped() {
    assert_eq!(
        translate("every year on the first snow"),
        Some(rule(Frequency::Yearly))
    );
}

#[test]
fn test_nth_weekday_of_month() {
    let mut expected = rule(Frequency::Yearly);
    expected.by_day = Some("3SU".to_string());
    expected.by_month = Some(11);
    assert_eq!(translate("every 3rd sunday of november"), Some(expected.clone()));
    assert_eq!(translate("Every 3rd Sunday of November"), Some(expected));

    let mut expected = rule(Frequency::Yearly);
    expected.by_day = Some("1MO".to_string());
    expected.by_month = Some(9);
    assert_eq!(translate("every 1st monday of september"), Some(expected));

    // A sixth weekday of a month does not exist.
    assert_eq!(translate("every 6th friday of may"), None);
}

#[test]
fn test_fixed_month_day_keeps_only_the_month() {
    let mut december = rule(Frequency::Yearly);
    december.by_month = Some(12);
    assert_eq!(translate("every december 1"), Some(december));

    let mut june = rule(Frequency::Yearly);
    june.by_month = Some(6);
    assert_eq!(translate("every june 21"), Some(june));
}

#[test]
fn test_interval_cadence() {
    let mut expected = rule(Frequency::Weekly);
    expected.interval = Some(2);
    assert_eq!(translate("every 2 weeks"), Some(expected));

    let mut expected = rule(Frequency::Daily);
    expected.interval = Some(10);
    assert_eq!(translate("every 10 days"), Some(expected));

    assert_eq!(translate("every 99999999999 days"), None);
}

#[test]
fn test_rule_strings() {
    assert_eq!(
        translate("every 3rd sunday of november").unwrap().to_string(),
        "FREQ=YEARLY;BYDAY=3SU;BYMONTH=11"
    );
    assert_eq!(
        translate("every 2 weeks").unwrap().to_string(),
        "FREQ=WEEKLY;INTERVAL=2"
    );
    assert_eq!(
        translate("every monday 3 PM").unwrap().to_string(),
        "FREQ=WEEKLY;BYHOUR=15"
    );
}

#[test]
fn test_unknown_phrases() {
    assert_eq!(translate("every other tuesday"), None);
    assert_eq!(translate("daily"), None);
    assert_eq!(translate(""), None);
    assert_eq!(convert_recurring(&recurring_task("every workday")), None);
}

#[test]
fn test_convert_recurring_reads_the_due_phrase() {
    let mut expected = rule(Frequency::Daily);
    expected.by_hour = Some(18);
    assert_eq!(
        convert_recurring(&recurring_task("every day 6 pm")),
        Some(expected)
    );
}
