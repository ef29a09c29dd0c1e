use super::rotation::{resolve_pattern_day, Rotation};
use super::types::{Conflict, ConflictKind, ProjectedTimes};
use crate::model::{DateRange, ExistingLeave, ExistingShift, LeaveStatus};
use crate::template::PatternDay;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Index par date des enregistrements existants, possédé par l'appelant
/// de la passe de détection. Évite le produit jours × enregistrements
/// sur les grosses périodes.
#[derive(Debug)]
pub struct RecordIndex<'a> {
    shifts_by_date: BTreeMap<NaiveDate, &'a ExistingShift>,
    leave_by_date: BTreeMap<NaiveDate, &'a ExistingLeave>,
}

impl<'a> RecordIndex<'a> {
    /// Indexe les enregistrements intersectant `range`. Si plusieurs
    /// vacations partagent une date, la première l'emporte (au plus un
    /// conflit par date).
    pub fn build(
        range: &DateRange,
        shifts: &'a [ExistingShift],
        leave: &'a [ExistingLeave],
    ) -> Self {
        let mut shifts_by_date = BTreeMap::new();
        for shift in shifts {
            if range.contains(shift.date) {
                shifts_by_date.entry(shift.date).or_insert(shift);
            }
        }
        let mut leave_by_date = BTreeMap::new();
        for record in leave {
            let first = record.start_date.max(range.start());
            let last = record.end_date.min(range.end());
            let mut date = first;
            while date <= last {
                leave_by_date.entry(date).or_insert(record);
                match date.succ_opt() {
                    Some(next) => date = next,
                    None => break,
                }
            }
        }
        Self {
            shifts_by_date,
            leave_by_date,
        }
    }

    pub fn shift_on(&self, date: NaiveDate) -> Option<&'a ExistingShift> {
        self.shifts_by_date.get(&date).copied()
    }

    pub fn leave_on(&self, date: NaiveDate) -> Option<&'a ExistingLeave> {
        self.leave_by_date.get(&date).copied()
    }
}

/// Parcourt l'intervalle et croise les dates travaillées du roulement
/// avec l'existant. Au plus un conflit par date, la vacation primant
/// sur l'absence ; sortie en ordre de dates croissant. Lecture seule :
/// aucune écriture n'a lieu avant l'exécution du plan.
pub fn detect_conflicts(
    range: &DateRange,
    days: &[PatternDay],
    rotation: &Rotation,
    shifts: &[ExistingShift],
    leave: &[ExistingLeave],
) -> Vec<Conflict> {
    let index = RecordIndex::build(range, shifts, leave);
    let mut out = Vec::new();

    for date in range.days() {
        let Some(day) = resolve_pattern_day(date, days, rotation) else {
            continue;
        };
        if day.is_rest_day {
            continue;
        }
        let projected = ProjectedTimes {
            start_time: day.start_time,
            end_time: day.end_time,
        };

        if let Some(existing) = index.shift_on(date) {
            let kind = if existing.from_pattern {
                ConflictKind::OtherPattern {
                    shift: existing.id.clone(),
                }
            } else {
                ConflictKind::ExistingShift {
                    shift: existing.id.clone(),
                }
            };
            out.push(Conflict {
                date,
                kind,
                description: describe_shift(existing),
                projected,
            });
        } else if let Some(record) = index.leave_on(date) {
            let kind = if record.status == LeaveStatus::Approved {
                ConflictKind::ApprovedLeave {
                    leave: record.id.clone(),
                }
            } else {
                ConflictKind::PendingLeave {
                    leave: record.id.clone(),
                }
            };
            out.push(Conflict {
                date,
                kind,
                description: describe_leave(record),
                projected,
            });
        }
    }

    out
}

fn describe_shift(shift: &ExistingShift) -> String {
    let times = format!(
        "{}-{}",
        shift.start_time.format("%H:%M"),
        shift.end_time.format("%H:%M")
    );
    let origin = if shift.from_pattern {
        "Pattern shift"
    } else {
        "Existing shift"
    };
    match &shift.name {
        Some(name) => format!("{origin} '{name}' ({times})"),
        None => format!("{origin} ({times})"),
    }
}

fn describe_leave(record: &ExistingLeave) -> String {
    let status = match record.status {
        LeaveStatus::Approved => "Approved",
        _ => "Pending",
    };
    format!(
        "{status} leave '{}' ({} to {})",
        record.kind, record.start_date, record.end_date
    )
}
