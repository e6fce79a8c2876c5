// File: tests/field_mapping.rs
use chrono::{NaiveDate, TimeZone, Utc};
use todoist_caldav::model::convert::{convert_priority, due_date_from};
use todoist_caldav::model::{Comment, Due, DueDate, Frequency, RecurrenceRule, SourceTask, Todo};

fn task() -> SourceTask {
    SourceTask {
        id: "6X7rM8997g3RQmvh".to_string(),
        content: "Buy milk".to_string(),
        description: String::new(),
        priority: 1,
        due: None,
        parent_id: None,
        project_id: "2203306141".to_string(),
        labels: vec![],
        order: 3,
        comment_count: 0,
    }
}

fn due(date: Option<&str>, datetime: Option<&str>, phrase: &str, recurring: bool) -> Due {
    Due {
        date: date.map(str::to_string),
        datetime: datetime.map(str::to_string),
        string: phrase.to_string(),
        is_recurring: recurring,
    }
}

fn comment(content: &str) -> Comment {
    Comment {
        id: "c".to_string(),
        task_id: Some("6X7rM8997g3RQmvh".to_string()),
        content: content.to_string(),
    }
}

#[test]
fn test_priority_table() {
    let cases = [
        (Some(1), None),
        (Some(2), Some(8)),
        (Some(3), Some(5)),
        (Some(4), Some(2)),
        (None, None),
        (Some(5), None),
        (Some(0), None),
    ];
    for (input, expected) in cases {
        assert_eq!(convert_priority(input), expected, "priority {:?}", input);
    }
}

#[test]
fn test_due_date_only_is_midnight() {
    let mut t = task();
    t.due = Some(due(Some("2024-03-15"), None, "Mar 15", false));
    let expected = NaiveDate::from_ymd_opt(2024, 3, 15)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(due_date_from(&t), Some(DueDate::Floating(expected)));
}

#[test]
fn test_due_datetime_wins_over_date() {
    let mut t = task();
    t.due = Some(due(
        Some("2024-03-15"),
        Some("2024-03-15T14:30:00"),
        "Mar 15 2:30 PM",
        false,
    ));
    let expected = NaiveDate::from_ymd_opt(2024, 3, 15)
        .unwrap()
        .and_hms_opt(14, 30, 0)
        .unwrap();
    assert_eq!(due_date_from(&t), Some(DueDate::Floating(expected)));
}

#[test]
fn test_due_datetime_with_zone_is_utc() {
    let mut t = task();
    t.due = Some(due(
        Some("2024-03-15"),
        Some("2024-03-15T14:30:00Z"),
        "Mar 15 2:30 PM",
        false,
    ));
    let expected = Utc.with_ymd_and_hms(2024, 3, 15, 14, 30, 0).unwrap();
    assert_eq!(due_date_from(&t), Some(DueDate::Utc(expected)));
    assert_eq!(due_date_from(&t).unwrap().to_ical(), "20240315T143000Z");
}

#[test]
fn test_missing_or_malformed_due() {
    let mut t = task();
    assert_eq!(due_date_from(&t), None);

    t.due = Some(due(Some("15/03/2024"), None, "", false));
    assert_eq!(due_date_from(&t), None);

    t.due = Some(due(None, Some("tomorrow-ish"), "", false));
    assert_eq!(due_date_from(&t), None);

    t.due = Some(due(None, None, "someday", false));
    assert_eq!(due_date_from(&t), None);
}

#[test]
fn test_from_source_basic_fields() {
    let mut t = task();
    t.priority = 4;
    t.labels = vec!["errand".to_string(), "home".to_string()];

    let todo = Todo::from_source(&t, &[]);
    assert_eq!(todo.uid, "6X7rM8997g3RQmvh");
    assert_eq!(todo.summary, "Buy milk");
    assert_eq!(todo.sort_order, 3);
    assert_eq!(todo.priority, Some(2));
    assert_eq!(todo.categories, vec!["errand", "home"]);
    assert_eq!(todo.description, "");
    assert!(todo.due.is_none());
    assert!(todo.rrule.is_none());
    assert!(todo.related_to.is_none());
}

#[test]
fn test_from_source_joins_description_and_comments() {
    let mut t = task();
    t.description = "2 litres".to_string();
    t.comment_count = 2;
    let todo = Todo::from_source(&t, &[comment("semi-skimmed"), comment("from the market")]);
    assert_eq!(todo.description, "2 litres\nsemi-skimmed\nfrom the market");

    t.description = String::new();
    let todo = Todo::from_source(&t, &[comment("only a comment")]);
    assert_eq!(todo.description, "only a comment");

    // Comments are ignored when the task says it has none.
    t.comment_count = 0;
    let todo = Todo::from_source(&t, &[comment("stale")]);
    assert_eq!(todo.description, "");
}

#[test]
fn test_from_source_recurring() {
    let mut t = task();
    t.due = Some(due(Some("2024-03-18"), None, "every monday 3 PM", true));
    let todo = Todo::from_source(&t, &[]);

    let mut expected = RecurrenceRule::new(Frequency::Weekly);
    expected.by_hour = Some(15);
    assert_eq!(todo.rrule, Some(expected));
    assert!(todo.due.is_some());
}

#[test]
fn test_literal_interval_is_kept() {
    for (phrase, interval) in [("every 0 days", 0), ("every 70000 days", 70000)] {
        let mut t = task();
        t.due = Some(due(Some("2024-03-18"), None, phrase, true));
        let todo = Todo::from_source(&t, &[]);

        let mut expected = RecurrenceRule::new(Frequency::Daily);
        expected.interval = Some(interval);
        assert_eq!(todo.rrule, Some(expected), "phrase {}", phrase);
        assert!(
            todo.to_ics()
                .contains(&format!("RRULE:FREQ=DAILY;INTERVAL={}", interval))
        );
    }
}

#[test]
fn test_unmatched_recurrence_keeps_due() {
    let mut t = task();
    t.due = Some(due(Some("2024-03-18"), None, "every other weekday", true));
    let todo = Todo::from_source(&t, &[]);
    assert!(todo.rrule.is_none());
    assert!(todo.due.is_some());
}

#[test]
fn test_non_recurring_due_has_no_rule() {
    let mut t = task();
    t.due = Some(due(Some("2024-03-18"), None, "every day", false));
    let todo = Todo::from_source(&t, &[]);
    assert!(todo.rrule.is_none());
}

#[test]
fn test_to_ics_contents() {
    let mut t = task();
    t.priority = 3;
    t.labels = vec!["a,b".to_string(), "c".to_string()];
    t.due = Some(due(
        Some("2024-11-17"),
        None,
        "every 3rd sunday of november",
        true,
    ));
    let mut todo = Todo::from_source(&t, &[]);
    todo.related_to = Some("parent-1".to_string());

    let ics = todo.to_ics();
    assert!(ics.contains("BEGIN:VTODO"));
    assert!(ics.contains("UID:6X7rM8997g3RQmvh"));
    assert!(ics.contains("SUMMARY:Buy milk"));
    assert!(ics.contains("PRIORITY:5"));
    assert!(ics.contains("X-APPLE-SORT-ORDER:3"));
    assert!(ics.contains("DUE:20241117T000000"));
    assert!(ics.contains("RRULE:FREQ=YEARLY;BYDAY=3SU;BYMONTH=11"));
    assert!(ics.contains("RELATED-TO:parent-1"));
    assert!(ics.contains("CATEGORIES:a\\,b,c"));
    assert!(!ics.contains("DESCRIPTION"));

    let cat_pos = ics.find("CATEGORIES").unwrap();
    let end_pos = ics.find("END:VTODO").unwrap();
    assert!(cat_pos < end_pos);
}

#[test]
fn test_to_ics_omits_unset_fields() {
    let todo = Todo::from_source(&task(), &[]);
    let ics = todo.to_ics();
    assert!(!ics.contains("PRIORITY"));
    assert!(!ics.contains("DUE"));
    assert!(!ics.contains("RRULE"));
    assert!(!ics.contains("RELATED-TO"));
    assert!(!ics.contains("CATEGORIES"));
}
