use super::types::{Conflict, ConflictClass, ConflictKey, GenerationError, Resolution};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Conflit accompagné de la décision de l'opérateur.
#[derive(Debug, Clone)]
pub struct ResolvedConflict {
    pub conflict: Conflict,
    pub resolution: Resolution,
}

/// Conflits indexés par leur identité stable. Le détecteur garantit au
/// plus un conflit par date, la date sert donc de clé primaire ; la
/// classe est revérifiée à chaque mutation pour écarter les clés
/// périmées d'une passe précédente.
#[derive(Debug, Clone, Default)]
pub struct ResolutionSet {
    entries: BTreeMap<NaiveDate, ResolvedConflict>,
}

impl ResolutionSet {
    /// Affecte à chaque conflit sa résolution par défaut : `Skip` pour
    /// les absences, `Keep` pour le reste.
    pub fn from_conflicts(conflicts: Vec<Conflict>) -> Self {
        let mut entries = BTreeMap::new();
        for conflict in conflicts {
            let resolution = conflict.kind.class().default_resolution();
            entries.insert(
                conflict.date,
                ResolvedConflict {
                    conflict,
                    resolution,
                },
            );
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Itération en ordre de dates croissant.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedConflict> {
        self.entries.values()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&ResolvedConflict> {
        self.entries.get(&date)
    }

    /// Pose une résolution sur un conflit identifié par sa clé stable.
    /// Rejette `Override` sur une absence (la valeur en place est
    /// conservée) et les clés ne correspondant à aucun conflit de la
    /// passe courante.
    pub fn set(&mut self, key: &ConflictKey, resolution: Resolution) -> Result<(), GenerationError> {
        let entry = self
            .entries
            .get_mut(&key.date)
            .filter(|e| e.conflict.kind.class() == key.class)
            .ok_or_else(|| GenerationError::UnknownConflict(key.to_string()))?;
        if resolution == Resolution::Override && key.class.is_leave() {
            return Err(GenerationError::LeaveOverride);
        }
        entry.resolution = resolution;
        Ok(())
    }

    /// Variante par date seule, pour les surfaces où la classe n'est
    /// pas connue de l'appelant.
    pub fn set_by_date(
        &mut self,
        date: NaiveDate,
        resolution: Resolution,
    ) -> Result<(), GenerationError> {
        let key = self
            .entries
            .get(&date)
            .map(|e| e.conflict.key())
            .ok_or_else(|| GenerationError::UnknownConflict(date.to_string()))?;
        self.set(&key, resolution)
    }

    /// Applique `resolution` à tous les conflits d'une classe. Les
    /// tentatives d'`Override` sur une absence sont ignorées sans faire
    /// échouer le lot. Retourne le nombre d'entrées modifiées.
    pub fn bulk_set(&mut self, class: ConflictClass, resolution: Resolution) -> usize {
        if resolution == Resolution::Override && class.is_leave() {
            return 0;
        }
        let mut applied = 0;
        for entry in self.entries.values_mut() {
            if entry.conflict.kind.class() == class {
                entry.resolution = resolution;
                applied += 1;
            }
        }
        applied
    }

    pub fn conflicts(&self) -> Vec<&Conflict> {
        self.entries.values().map(|e| &e.conflict).collect()
    }
}
