use super::plan::GenerationPlan;
use super::types::{GenerationResult, SkippedDate};
use crate::model::{AssignmentId, ExistingShift, Rota, ShiftId, StaffId, StaffPatternAssignment};
use anyhow::bail;
use chrono::{NaiveDate, NaiveTime};

/// Demande de création d'une vacation planifiée.
#[derive(Debug, Clone)]
pub struct NewShift {
    pub staff: StaffId,
    pub assignment: AssignmentId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub label: String,
}

/// Collaborateur d'écriture du planning. Un appel par enregistrement,
/// jamais de lot : l'attribution des échecs reste par date.
pub trait ShiftWriter {
    fn create_shift(&mut self, shift: &NewShift) -> anyhow::Result<ShiftId>;
    fn delete_shift(&mut self, id: &ShiftId) -> anyhow::Result<()>;
}

impl ShiftWriter for Rota {
    fn create_shift(&mut self, shift: &NewShift) -> anyhow::Result<ShiftId> {
        let record = ExistingShift {
            id: ShiftId::random(),
            staff: shift.staff.clone(),
            date: shift.date,
            start_time: shift.start_time,
            end_time: shift.end_time,
            name: Some(shift.label.clone()),
            from_pattern: true,
            assignment: Some(shift.assignment.clone()),
        };
        let id = record.id.clone();
        self.shifts.push(record);
        Ok(id)
    }

    fn delete_shift(&mut self, id: &ShiftId) -> anyhow::Result<()> {
        let Some(pos) = self.shifts.iter().position(|s| &s.id == id) else {
            bail!("unknown shift: {}", id.as_str());
        };
        self.shifts.remove(pos);
        Ok(())
    }
}

/// Exécute le plan date par date. Chaque création/suppression est
/// tentée indépendamment : un échec alimente `errors` et la boucle
/// continue. Une suppression d'override qui échoue laisse la date sans
/// création, l'existant reste en place.
pub fn execute(
    plan: &GenerationPlan,
    assignment: &StaffPatternAssignment,
    label: &str,
    writer: &mut dyn ShiftWriter,
) -> GenerationResult {
    let mut result = GenerationResult::default();

    for planned in plan.to_create() {
        if let Some(existing) = plan.override_for(planned.date) {
            if let Err(err) = writer.delete_shift(existing) {
                result
                    .errors
                    .push(format!("{}: delete failed: {err:#}", planned.date));
                result.shifts_skipped.push(SkippedDate {
                    date: planned.date,
                    reason: "override delete failed, existing shift kept".to_string(),
                });
                continue;
            }
        }
        let request = NewShift {
            staff: assignment.staff.clone(),
            assignment: assignment.id.clone(),
            date: planned.date,
            start_time: planned.start_time,
            end_time: planned.end_time,
            label: label.to_string(),
        };
        match writer.create_shift(&request) {
            Ok(id) => result.shifts_created.push(id),
            Err(err) => result
                .errors
                .push(format!("{}: create failed: {err:#}", planned.date)),
        }
    }

    for (date, reason) in plan.dates_to_skip() {
        result.shifts_skipped.push(SkippedDate {
            date: *date,
            reason: reason.clone(),
        });
    }

    result
}
