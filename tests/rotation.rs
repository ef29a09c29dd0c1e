#![forbid(unsafe_code)]
use chrono::{Duration, NaiveDate, NaiveTime};
use roulement::generation::{is_working_date, iso_weekday, resolve_pattern_day, Rotation};
use roulement::template::PatternDay;
use roulement::GenerationError;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn t(h: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, min, 0).unwrap()
}

fn day(week_number: u16, weekday: u8, start: NaiveTime, end: NaiveTime) -> PatternDay {
    PatternDay {
        week_number,
        weekday,
        start_time: start,
        end_time: end,
        is_rest_day: false,
        break_minutes: None,
    }
}

// Semaine 1: lun/mer/ven 09:00-17:00 ; semaine 2: mar/jeu 08:00-16:00.
fn alternating_days() -> Vec<PatternDay> {
    vec![
        day(1, 1, t(9, 0), t(17, 0)),
        day(1, 3, t(9, 0), t(17, 0)),
        day(1, 5, t(9, 0), t(17, 0)),
        day(2, 2, t(8, 0), t(16, 0)),
        day(2, 4, t(8, 0), t(16, 0)),
    ]
}

#[test]
fn rejects_zero_cycle_and_zero_start_week() {
    let monday = d(2025, 3, 3);
    assert!(matches!(
        Rotation::new(0, monday, 1),
        Err(GenerationError::InvalidCycle)
    ));
    assert!(matches!(
        Rotation::new(2, monday, 0),
        Err(GenerationError::InvalidStartWeek)
    ));
}

#[test]
fn anchor_is_normalized_to_monday() {
    // affectation ancrée un mercredi
    let rotation = Rotation::new(2, d(2025, 3, 5), 1).unwrap();
    assert_eq!(rotation.anchor(), d(2025, 3, 3));
    // le lundi et le mardi de la même semaine sont déjà en semaine 1
    assert_eq!(rotation.week_number(d(2025, 3, 3)), 1);
    assert_eq!(rotation.week_number(d(2025, 3, 4)), 1);
    assert_eq!(rotation.week_number(d(2025, 3, 10)), 2);
}

#[test]
fn rotation_start_week_offsets_the_cycle() {
    let rotation = Rotation::new(2, d(2025, 3, 3), 2).unwrap();
    assert_eq!(rotation.week_number(d(2025, 3, 3)), 2);
    assert_eq!(rotation.week_number(d(2025, 3, 10)), 1);
    assert_eq!(rotation.week_number(d(2025, 3, 17)), 2);
}

#[test]
fn week_number_is_total_before_the_anchor() {
    let rotation = Rotation::new(3, d(2025, 3, 3), 1).unwrap();
    assert_eq!(rotation.week_number(d(2025, 2, 24)), 3);
    assert_eq!(rotation.week_number(d(2025, 2, 17)), 2);
    assert_eq!(rotation.week_number(d(2025, 2, 10)), 1);
    // dimanche de la semaine précédant l'ancre
    assert_eq!(rotation.week_number(d(2025, 3, 2)), 3);
}

#[test]
fn sunday_maps_to_seven() {
    assert_eq!(iso_weekday(d(2025, 3, 9)), 7);
    assert_eq!(iso_weekday(d(2025, 3, 3)), 1);

    let days = vec![day(1, 7, t(8, 0), t(14, 0))];
    let rotation = Rotation::new(1, d(2025, 3, 3), 1).unwrap();
    let resolved = resolve_pattern_day(d(2025, 3, 9), &days, &rotation);
    assert!(resolved.is_some());
    assert_eq!(resolved.unwrap().weekday, 7);
}

#[test]
fn resolution_is_periodic_over_the_cycle() {
    let days = alternating_days();
    let rotation = Rotation::new(2, d(2025, 3, 3), 1).unwrap();

    let mut date = d(2025, 1, 1);
    let last = d(2025, 12, 31);
    while date <= last {
        let here = resolve_pattern_day(date, &days, &rotation);
        let next_cycle = resolve_pattern_day(date + Duration::weeks(2), &days, &rotation);
        assert_eq!(here, next_cycle, "rotation drifted at {date}");
        date = date.succ_opt().unwrap();
    }
}

#[test]
fn resolution_is_deterministic() {
    let days = alternating_days();
    let rotation = Rotation::new(2, d(2025, 3, 3), 1).unwrap();
    let date = d(2025, 3, 11);
    assert_eq!(
        resolve_pattern_day(date, &days, &rotation),
        resolve_pattern_day(date, &days, &rotation)
    );
}

#[test]
fn unmatched_dates_resolve_to_none() {
    let days = alternating_days();
    let rotation = Rotation::new(2, d(2025, 3, 3), 1).unwrap();
    // mardi de la semaine 1 : aucune règle
    assert!(resolve_pattern_day(d(2025, 3, 4), &days, &rotation).is_none());
    assert!(!is_working_date(d(2025, 3, 4), &days, &rotation));
}

#[test]
fn four_weeks_of_alternating_pattern() {
    let days = alternating_days();
    let rotation = Rotation::new(2, d(2025, 3, 3), 1).unwrap();

    let mut working = Vec::new();
    let mut date = d(2025, 3, 3);
    while date <= d(2025, 3, 30) {
        if is_working_date(date, &days, &rotation) {
            working.push(date);
        }
        date = date.succ_opt().unwrap();
    }

    assert_eq!(working.len(), 10);
    let expected = [
        d(2025, 3, 3),
        d(2025, 3, 5),
        d(2025, 3, 7),
        d(2025, 3, 11),
        d(2025, 3, 13),
        d(2025, 3, 17),
        d(2025, 3, 19),
        d(2025, 3, 21),
        d(2025, 3, 25),
        d(2025, 3, 27),
    ];
    assert_eq!(working, expected);

    // les semaines impaires tombent lun/mer/ven, les paires mar/jeu
    for date in &working {
        let week = rotation.week_number(*date);
        let wd = iso_weekday(*date);
        match week {
            1 => assert!(matches!(wd, 1 | 3 | 5)),
            2 => assert!(matches!(wd, 2 | 4)),
            other => panic!("week number out of cycle: {other}"),
        }
    }
}

#[test]
fn rest_days_are_never_working_dates() {
    let mut days = alternating_days();
    days.push(PatternDay {
        week_number: 1,
        weekday: 6,
        start_time: t(0, 0),
        end_time: t(0, 0),
        is_rest_day: true,
        break_minutes: None,
    });
    let rotation = Rotation::new(2, d(2025, 3, 3), 1).unwrap();
    // samedi de la semaine 1 : règle présente mais repos
    assert!(resolve_pattern_day(d(2025, 3, 8), &days, &rotation).is_some());
    assert!(!is_working_date(d(2025, 3, 8), &days, &rotation));
}
