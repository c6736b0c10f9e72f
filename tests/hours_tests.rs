use chrono::NaiveDate;
use shift_rota::calculations::hours::{slot_hours, total_hours, total_hours_for_days};
use shift_rota::calendar::DayProjection;
use shift_rota::time_of_day::SlotText;

#[test]
fn day_shift_hours() {
    assert_eq!(slot_hours("09:00", "17:00").unwrap(), 8.0);
    assert_eq!(slot_hours("13:00", "17:45").unwrap(), 4.75);
}

#[test]
fn night_shift_crosses_midnight() {
    assert_eq!(slot_hours("22:00", "02:00").unwrap(), 4.0);
    assert_eq!(slot_hours("10:00", "10:00").unwrap(), 0.0);
}

#[test]
fn totals_sum_every_slot() {
    let slots = vec![
        SlotText::new("09:00", "12:00"),
        SlotText::new("13:00", "18:45"),
        SlotText::new("23:30", "00:30"),
    ];
    assert_eq!(total_hours(&slots).unwrap(), 9.75);
    assert_eq!(total_hours(&[]).unwrap(), 0.0);
}

#[test]
fn malformed_slot_is_reported_with_its_date() {
    let mut day = DayProjection::new(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    day.time_slots.push(SlotText::new("9h", "12:00"));
    let err = total_hours_for_days(&[day]).unwrap_err();
    assert!(err.message().contains("2024-03-05"), "{err}");
    assert!(err.message().contains("'9h'"), "{err}");
}
