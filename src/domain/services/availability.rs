use crate::domain::models::appointment::Appointment;
use crate::domain::models::availability_rule::AvailabilityRule;
use crate::domain::services::interval::overlaps;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::BTreeMap;

/// One candidate slot start produced by expanding a rule for a date.
/// The label is the wall-clock HH:mm of the instant in the tenant timezone.
#[derive(Debug, Clone)]
pub struct SlotCandidate {
    pub label: String,
    pub start: DateTime<Utc>,
}

/// The public read-model: a labeled slot and whether it can still be booked.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Slot {
    pub time: String,
    pub available: bool,
}

/// Expands one weekly rule into the candidate slot starts for `date`.
///
/// Candidates step by `slot_minutes` from the rule start and are emitted
/// while they start before the rule end. Only the start is bounded: a slot
/// whose service duration trails past the rule end is still emitted, which
/// lets a service run past closing time. A window shorter than one step
/// yields nothing.
pub fn expand_rule(rule: &AvailabilityRule, date: NaiveDate, tz: Tz) -> Vec<SlotCandidate> {
    if !rule.is_active || rule.slot_minutes <= 0 {
        return Vec::new();
    }

    let local_start = match tz.from_local_datetime(&date.and_time(rule.start_time)).single() {
        Some(dt) => dt,
        None => return Vec::new(),
    };
    let local_end = match tz.from_local_datetime(&date.and_time(rule.end_time)).single() {
        Some(dt) => dt,
        None => return Vec::new(),
    };

    let rule_start = local_start.with_timezone(&Utc);
    let rule_end = local_end.with_timezone(&Utc);
    let step = Duration::minutes(rule.slot_minutes as i64);

    if rule_end - rule_start < step {
        return Vec::new();
    }

    let mut candidates = Vec::new();
    let mut cur = rule_start;
    while cur < rule_end {
        candidates.push(SlotCandidate {
            label: cur.with_timezone(&tz).format("%H:%M").to_string(),
            start: cur,
        });
        cur += step;
    }
    candidates
}

/// Merges candidates from all rules active on the weekday: where overlapping
/// rule windows produce the same label, the earliest underlying instant
/// wins. The result is label-unique and sorted by label, which for same-day
/// HH:mm labels is chronological order.
pub fn compose_slots(candidates: Vec<SlotCandidate>) -> Vec<SlotCandidate> {
    let mut by_label: BTreeMap<String, SlotCandidate> = BTreeMap::new();
    for candidate in candidates {
        match by_label.get(&candidate.label) {
            Some(existing) if existing.start <= candidate.start => {}
            _ => {
                by_label.insert(candidate.label.clone(), candidate);
            }
        }
    }
    by_label.into_values().collect()
}

/// Marks each composed slot available or unavailable against the day's
/// booked appointments. The slot end is recomputed here from the service
/// duration; the rule step only controls candidate density.
///
/// Staff scoping: an unscoped query conflicts with any overlapping booked
/// appointment. A staff-scoped query conflicts only with appointments
/// assigned to that same staff member; unassigned appointments do not block
/// a scoped query.
pub fn resolve_availability(
    slots: &[SlotCandidate],
    duration_minutes: i32,
    appointments: &[Appointment],
    staff_id: Option<&str>,
) -> Vec<Slot> {
    let duration = Duration::minutes(duration_minutes as i64);

    slots
        .iter()
        .map(|slot| {
            let slot_end = slot.start + duration;
            let conflict = appointments.iter().any(|appt| {
                if let Some(scope) = staff_id {
                    match appt.staff_id.as_deref() {
                        Some(assigned) if assigned == scope => {}
                        _ => return false,
                    }
                }
                overlaps(slot.start, slot_end, appt.start_at, appt.end_at)
            });
            Slot {
                time: slot.label.clone(),
                available: !conflict,
            }
        })
        .collect()
}

/// Full read path: expand every rule, compose, resolve. Pure with respect to
/// its inputs, so calling it twice with the same data yields the same slots.
pub fn compute_slots(
    rules: &[AvailabilityRule],
    date: NaiveDate,
    duration_minutes: i32,
    appointments: &[Appointment],
    staff_id: Option<&str>,
    tz: Tz,
) -> Vec<Slot> {
    let mut candidates = Vec::new();
    for rule in rules {
        candidates.extend(expand_rule(rule, date, tz));
    }
    let composed = compose_slots(candidates);
    resolve_availability(&composed, duration_minutes, appointments, staff_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::appointment::{Appointment, NewAppointmentParams};
    use chrono::NaiveTime;
    use chrono_tz::America::Sao_Paulo;

    const TZ: Tz = Sao_Paulo;

    fn rule(start: &str, end: &str, step: i32) -> AvailabilityRule {
        AvailabilityRule::new(
            "t1".into(),
            2, // Tuesday
            NaiveTime::parse_from_str(start, "%H:%M").unwrap(),
            NaiveTime::parse_from_str(end, "%H:%M").unwrap(),
            step,
        )
    }

    // 2026-02-03 is a Tuesday.
    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 3).unwrap()
    }

    fn booked(start: &str, end: &str, staff: Option<&str>) -> Appointment {
        let day = date();
        let start = TZ
            .from_local_datetime(&day.and_time(NaiveTime::parse_from_str(start, "%H:%M").unwrap()))
            .unwrap()
            .with_timezone(&Utc);
        let end = TZ
            .from_local_datetime(&day.and_time(NaiveTime::parse_from_str(end, "%H:%M").unwrap()))
            .unwrap()
            .with_timezone(&Utc);
        let mut appt = Appointment::new(NewAppointmentParams {
            tenant_id: "t1".into(),
            service_id: "s1".into(),
            staff_id: staff.map(str::to_string),
            client_user_id: None,
            start,
            duration_min: (end - start).num_minutes() as i32,
            appointment_date: day,
            first_name: "Maria".into(),
            last_name: "Silva".into(),
            phone: "11988887777".into(),
            notes: None,
            rescheduled_from_id: None,
        });
        appt.end_at = end;
        appt
    }

    fn labels(slots: &[Slot]) -> Vec<&str> {
        slots.iter().map(|s| s.time.as_str()).collect()
    }

    #[test]
    fn window_shorter_than_step_yields_nothing() {
        let r = rule("09:00", "09:20", 30);
        assert!(expand_rule(&r, date(), TZ).is_empty());
    }

    #[test]
    fn window_equal_to_step_yields_one_slot() {
        let r = rule("09:00", "09:30", 30);
        let out = expand_rule(&r, date(), TZ);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].label, "09:00");
    }

    #[test]
    fn inactive_rule_yields_nothing() {
        let mut r = rule("09:00", "12:00", 30);
        r.is_active = false;
        assert!(expand_rule(&r, date(), TZ).is_empty());
    }

    #[test]
    fn expansion_is_bounded_by_start_only() {
        // 09:00-10:00 with step 45: 09:00 and 09:45 both start before 10:00,
        // even though 09:45 + 45min trails past the window.
        let r = rule("09:00", "10:00", 45);
        let out = expand_rule(&r, date(), TZ);
        assert_eq!(
            out.iter().map(|c| c.label.as_str()).collect::<Vec<_>>(),
            vec!["09:00", "09:45"]
        );
    }

    #[test]
    fn overlapping_rules_compose_sorted_and_unique() {
        let mut candidates = expand_rule(&rule("09:00", "11:00", 30), date(), TZ);
        candidates.extend(expand_rule(&rule("10:00", "12:00", 30), date(), TZ));
        let composed = compose_slots(candidates);

        let labels: Vec<_> = composed.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["09:00", "09:30", "10:00", "10:30", "11:00", "11:30"]);

        let mut sorted = labels.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(labels, sorted);
    }

    #[test]
    fn scenario_morning_booking_blocks_two_slots() {
        // Rule Tue 09:00-12:00 step 30, one appointment 09:15-09:45,
        // duration 30: the 09:00 and 09:30 slots overlap it, 10:00 onward
        // does not.
        let rules = vec![rule("09:00", "12:00", 30)];
        let appts = vec![booked("09:15", "09:45", None)];
        let slots = compute_slots(&rules, date(), 30, &appts, None, TZ);

        assert_eq!(
            labels(&slots),
            vec!["09:00", "09:30", "10:00", "10:30", "11:00", "11:30"]
        );
        assert!(!slots[0].available);
        assert!(!slots[1].available);
        assert!(slots[2].available);
        assert!(slots[5].available);
    }

    #[test]
    fn slot_ending_at_appointment_start_stays_available() {
        let rules = vec![rule("08:00", "10:00", 30)];
        let appts = vec![booked("09:00", "09:30", None)];
        let slots = compute_slots(&rules, date(), 30, &appts, None, TZ);

        let by_time: BTreeMap<_, _> = slots.iter().map(|s| (s.time.as_str(), s.available)).collect();
        assert_eq!(by_time["08:30"], true);
        assert_eq!(by_time["09:00"], false);
        assert_eq!(by_time["09:30"], true);
    }

    #[test]
    fn staff_scope_ignores_other_staff_and_unassigned() {
        let rules = vec![rule("09:00", "10:00", 30)];
        let appts = vec![
            booked("09:00", "09:30", Some("staff-b")),
            booked("09:30", "10:00", None),
        ];

        let scoped = compute_slots(&rules, date(), 30, &appts, Some("staff-a"), TZ);
        assert!(scoped.iter().all(|s| s.available));

        let unscoped = compute_slots(&rules, date(), 30, &appts, None, TZ);
        assert!(unscoped.iter().all(|s| !s.available));
    }

    #[test]
    fn duration_widens_conflict_window_not_candidate_density() {
        // 60-minute service on a 30-minute grid: 09:30-10:30 overlaps an
        // appointment at 10:00-10:30, while the grid itself is unchanged.
        let rules = vec![rule("09:00", "11:00", 30)];
        let appts = vec![booked("10:00", "10:30", None)];
        let slots = compute_slots(&rules, date(), 60, &appts, None, TZ);

        let by_time: BTreeMap<_, _> = slots.iter().map(|s| (s.time.as_str(), s.available)).collect();
        assert_eq!(by_time["09:00"], true);
        assert_eq!(by_time["09:30"], false);
        assert_eq!(by_time["10:30"], true);
    }

    #[test]
    fn compute_is_idempotent() {
        let rules = vec![rule("09:00", "12:00", 30)];
        let appts = vec![booked("09:15", "09:45", None)];
        let first = compute_slots(&rules, date(), 30, &appts, None, TZ);
        let second = compute_slots(&rules, date(), 30, &appts, None, TZ);
        assert_eq!(first, second);
    }
}
