use super::resolve::ResolutionSet;
use super::rotation::{resolve_pattern_day, Rotation};
use super::types::Resolution;
use crate::model::{DateRange, ShiftId};
use crate::template::PatternDay;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Vacation à créer, horaires résolus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedShift {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Plan de génération concret : dates travaillées, créations, dates
/// écartées (avec raison) et vacations existantes à supprimer. Pur
/// calcul, aucune écriture.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationPlan {
    working_dates: Vec<NaiveDate>,
    to_create: Vec<PlannedShift>,
    dates_to_skip: BTreeMap<NaiveDate, String>,
    overrides: BTreeMap<NaiveDate, ShiftId>,
}

impl GenerationPlan {
    /// Combine les dates travaillées du roulement avec les résolutions.
    /// `Keep` et `Skip` écartent la date ; `Override` met en file la
    /// suppression de l'existant et laisse la date candidate.
    pub fn build(
        range: &DateRange,
        days: &[PatternDay],
        rotation: &Rotation,
        resolutions: &ResolutionSet,
    ) -> Self {
        let mut working_dates = Vec::new();
        let mut to_create = Vec::new();
        let mut dates_to_skip = BTreeMap::new();
        let mut overrides = BTreeMap::new();

        for entry in resolutions.iter() {
            match entry.resolution {
                Resolution::Keep | Resolution::Skip => {
                    dates_to_skip
                        .insert(entry.conflict.date, entry.conflict.description.clone());
                }
                Resolution::Override => {
                    // garde du ResolutionSet : seules les vacations sont overridables
                    if let Some(shift) = entry.conflict.kind.shift_id() {
                        overrides.insert(entry.conflict.date, shift.clone());
                    }
                }
            }
        }

        for date in range.days() {
            let Some(day) = resolve_pattern_day(date, days, rotation) else {
                continue;
            };
            if day.is_rest_day {
                continue;
            }
            working_dates.push(date);
            if !dates_to_skip.contains_key(&date) {
                to_create.push(PlannedShift {
                    date,
                    start_time: day.start_time,
                    end_time: day.end_time,
                });
            }
        }

        debug_assert_eq!(
            to_create.len(),
            working_dates.len() - dates_to_skip.len(),
            "every skipped date must be a working date"
        );

        Self {
            working_dates,
            to_create,
            dates_to_skip,
            overrides,
        }
    }

    /// Dates travaillées du roulement sur l'intervalle, indépendamment
    /// des conflits.
    pub fn working_dates(&self) -> &[NaiveDate] {
        &self.working_dates
    }

    pub fn to_create(&self) -> &[PlannedShift] {
        &self.to_create
    }

    pub fn shifts_to_generate(&self) -> usize {
        self.to_create.len()
    }

    pub fn dates_to_skip(&self) -> &BTreeMap<NaiveDate, String> {
        &self.dates_to_skip
    }

    /// Vacation existante à supprimer avant de créer sur cette date.
    pub fn override_for(&self, date: NaiveDate) -> Option<&ShiftId> {
        self.overrides.get(&date)
    }

    pub fn shifts_to_delete(&self) -> impl Iterator<Item = &ShiftId> {
        self.overrides.values()
    }

    pub fn delete_count(&self) -> usize {
        self.overrides.len()
    }
}

impl fmt::Display for GenerationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} working date(s), {} to create, {} to skip, {} to delete",
            self.working_dates.len(),
            self.to_create.len(),
            self.dates_to_skip.len(),
            self.overrides.len()
        )?;
        for (date, reason) in &self.dates_to_skip {
            writeln!(f, "  skip {date}: {reason}")?;
        }
        Ok(())
    }
}
