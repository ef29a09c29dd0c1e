use super::types::GenerationError;
use crate::template::PatternDay;
use chrono::{Datelike, Duration, NaiveDate};

/// Paramètres de rotation validés : longueur de cycle, ancre calendaire
/// et semaine de départ. Construire une `Rotation` garantit que
/// l'arithmétique aval ne divise jamais par zéro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotation {
    cycle_weeks: u16,
    anchor: NaiveDate,
    start_week: u16,
}

impl Rotation {
    /// `assignment_start` ancre la semaine `rotation_start_week` du
    /// cycle ; l'ancre effective est ramenée au lundi de sa semaine ISO.
    pub fn new(
        cycle_weeks: u16,
        assignment_start: NaiveDate,
        rotation_start_week: u16,
    ) -> Result<Self, GenerationError> {
        if cycle_weeks == 0 {
            return Err(GenerationError::InvalidCycle);
        }
        if rotation_start_week == 0 {
            return Err(GenerationError::InvalidStartWeek);
        }
        Ok(Self {
            cycle_weeks,
            anchor: monday_of_week(assignment_start),
            start_week: rotation_start_week,
        })
    }

    pub fn cycle_weeks(&self) -> u16 {
        self.cycle_weeks
    }

    /// Lundi ancrant la semaine 1 du cycle.
    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    /// Semaine du cycle régissant `date`, dans `1..=cycle_weeks`. Totale
    /// pour toute date : l'arithmétique euclidienne absorbe les dates
    /// antérieures à l'ancre.
    pub fn week_number(&self, date: NaiveDate) -> u16 {
        let days_since_anchor = (date - self.anchor).num_days();
        let week_index = days_since_anchor.div_euclid(7);
        let offset = week_index + i64::from(self.start_week) - 1;
        (offset.rem_euclid(i64::from(self.cycle_weeks)) + 1) as u16
    }
}

/// Lundi de la semaine ISO contenant `date`.
pub fn monday_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Jour de semaine ISO, lundi=1 .. dimanche=7.
pub fn iso_weekday(date: NaiveDate) -> u8 {
    date.weekday().number_from_monday() as u8
}

/// Jour de roulement régissant `date`, s'il existe. `None` équivaut à
/// un jour de repos pour tous les consommateurs. Déterministe : une
/// prévisualisation et la génération qui la suit voient le même
/// résultat.
pub fn resolve_pattern_day<'a>(
    date: NaiveDate,
    days: &'a [PatternDay],
    rotation: &Rotation,
) -> Option<&'a PatternDay> {
    let week_number = rotation.week_number(date);
    let weekday = iso_weekday(date);
    days.iter()
        .find(|d| d.week_number == week_number && d.weekday == weekday)
}

/// Vrai si la date est travaillée d'après le roulement (jour défini et
/// non marqué repos).
pub fn is_working_date(date: NaiveDate, days: &[PatternDay], rotation: &Rotation) -> bool {
    resolve_pattern_day(date, days, rotation).is_some_and(|d| !d.is_rest_day)
}
