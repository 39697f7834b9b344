use std::fs;

use chrono::NaiveDate;
use milktally_core::{
    open_file_tracker, ApplyTo, CalendarData, CalendarRepository, DayEntry,
    FileCalendarRepository, MonthKey, Settings,
};

fn ides_of_march() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

fn month(y: i32, m: u32) -> MonthKey {
    MonthKey::new(y, m).unwrap()
}

#[test]
fn calendar_round_trips_through_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let repo = FileCalendarRepository::new(Some(tmp.path().to_path_buf())).unwrap();

    let mut data = CalendarData::new();
    data.set_day(month(2024, 3), 1, DayEntry::new(2.0, 10.0)).unwrap();
    data.set_day(month(2024, 3), 31, DayEntry::new(1.25, 12.5)).unwrap();
    data.set_day(month(2023, 12), 7, DayEntry::new(0.5, 60.0)).unwrap();
    // Not an exact binary fraction; needs the shortest-digits text to parse back bit for bit.
    data.set_day(month(2023, 12), 8, DayEntry::new(0.010410608307313543, 0.1 + 0.2))
        .unwrap();
    repo.save(&data).unwrap();

    let reloaded = repo.load().unwrap().unwrap();
    assert_eq!(reloaded, data);
    let dec = reloaded.get(month(2023, 12)).unwrap();
    assert_eq!(dec[&8].volume.to_bits(), 0.010410608307313543_f64.to_bits());
    assert_eq!(dec[&8].cost.to_bits(), (0.1_f64 + 0.2).to_bits());
    assert_eq!(
        reloaded.month_keys().collect::<Vec<_>>(),
        vec![month(2023, 12), month(2024, 3)]
    );
}

#[test]
fn stored_json_uses_canonical_keys() {
    let tmp = tempfile::tempdir().unwrap();
    let repo = FileCalendarRepository::new(Some(tmp.path().to_path_buf())).unwrap();

    let mut data = CalendarData::new();
    data.set_day(month(2024, 3), 9, DayEntry::new(1.0, 2.0)).unwrap();
    repo.save(&data).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(repo.path()).unwrap()).unwrap();
    assert_eq!(raw["2024-03"]["9"]["volume"], 1.0);
    assert_eq!(raw["2024-03"]["9"]["cost"], 2.0);
}

#[test]
fn legacy_file_is_read_and_rewritten_canonically() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(
        tmp.path().join("calendarData.json"),
        r#"{ "2024-3": { "2024-03-05": { "volume": 2, "cost": 30 }, "6": { "volume": 1, "cost": 30 } } }"#,
    )
    .unwrap();

    let mut tracker = open_file_tracker(Some(tmp.path().to_path_buf()))
        .unwrap()
        .with_clock(ides_of_march);
    let mar = tracker.month(month(2024, 3)).unwrap();
    assert_eq!(mar[&5], DayEntry::new(2.0, 30.0));
    assert_eq!(mar[&6], DayEntry::new(1.0, 30.0));

    // A month with recorded days is not backfilled.
    assert!(!tracker.ensure_month_initialized(month(2024, 3)).unwrap());
    assert_eq!(tracker.month(month(2024, 3)).unwrap().len(), 2);

    tracker
        .set_day_entry(month(2024, 3), 7, DayEntry::new(1.5, 30.0))
        .unwrap();

    let raw = fs::read_to_string(tmp.path().join("calendarData.json")).unwrap();
    assert!(raw.contains("\"2024-03\""));
    assert!(!raw.contains("2024-03-05"));
}

#[test]
fn settings_survive_reopen_and_drive_propagation() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().to_path_buf();

    {
        let mut tracker = open_file_tracker(Some(dir.clone()))
            .unwrap()
            .with_clock(ides_of_march);
        assert!(tracker.is_first_load());
        tracker.save_settings(Settings::default()).unwrap();
        tracker.ensure_month_initialized(month(2024, 2)).unwrap();
        tracker.ensure_month_initialized(month(2024, 3)).unwrap();
        tracker.ensure_month_initialized(month(2024, 4)).unwrap();
    }

    let mut tracker = open_file_tracker(Some(dir.clone()))
        .unwrap()
        .with_clock(ides_of_march);
    assert!(!tracker.is_first_load());
    assert_eq!(tracker.calendar().len(), 3);

    let touched = tracker
        .save_settings(Settings {
            default_volume: 2.0,
            cost_per_volume: 55.0,
            apply_to: ApplyTo::CurrentAndFuture,
            ..Settings::default()
        })
        .unwrap();
    assert_eq!(touched, vec![month(2024, 3), month(2024, 4)]);

    let reopened = open_file_tracker(Some(dir)).unwrap();
    assert_eq!(reopened.settings().apply_to, ApplyTo::CurrentAndFuture);
    assert_eq!(reopened.month(month(2024, 3)).unwrap()[&10], DayEntry::new(2.0, 55.0));
    assert_eq!(reopened.month(month(2024, 2)).unwrap()[&10], DayEntry::ZERO);
}

#[test]
fn malformed_settings_fall_back_to_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("settings.json"), "not json at all").unwrap();

    let tracker = open_file_tracker(Some(tmp.path().to_path_buf())).unwrap();
    assert!(tracker.is_first_load());
    assert_eq!(tracker.settings(), &Settings::default());
}

#[test]
fn unreadable_settings_fields_keep_the_rest() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(
        tmp.path().join("settings.json"),
        r#"{ "unit": null, "costPerVolume": 42, "currency": "USD", "applyTo": "sometimes" }"#,
    )
    .unwrap();

    let tracker = open_file_tracker(Some(tmp.path().to_path_buf())).unwrap();
    assert!(!tracker.is_first_load());
    assert_eq!(tracker.settings().unit, "litre");
    assert_eq!(tracker.settings().cost_per_volume, 42.0);
    assert_eq!(tracker.settings().currency, "USD");
    assert_eq!(tracker.settings().apply_to, ApplyTo::Future);
}
