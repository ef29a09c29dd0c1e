use crate::model::{LeaveId, ShiftId};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classe de conflit, sans référence à l'enregistrement en cause.
/// Sert de clé stable (avec la date) et de cible des opérations bulk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictClass {
    ExistingShift,
    OtherPattern,
    ApprovedLeave,
    PendingLeave,
}

impl ConflictClass {
    pub fn is_leave(&self) -> bool {
        matches!(self, Self::ApprovedLeave | Self::PendingLeave)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExistingShift => "existing_shift",
            Self::OtherPattern => "other_pattern",
            Self::ApprovedLeave => "approved_leave",
            Self::PendingLeave => "pending_leave",
        }
    }

    /// Résolution par défaut : les absences sont sautées, le reste est
    /// conservé tel quel.
    pub fn default_resolution(&self) -> Resolution {
        if self.is_leave() {
            Resolution::Skip
        } else {
            Resolution::Keep
        }
    }
}

impl fmt::Display for ConflictClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nature du conflit + référence à l'enregistrement en collision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConflictKind {
    ExistingShift { shift: ShiftId },
    OtherPattern { shift: ShiftId },
    ApprovedLeave { leave: LeaveId },
    PendingLeave { leave: LeaveId },
}

impl ConflictKind {
    pub fn class(&self) -> ConflictClass {
        match self {
            Self::ExistingShift { .. } => ConflictClass::ExistingShift,
            Self::OtherPattern { .. } => ConflictClass::OtherPattern,
            Self::ApprovedLeave { .. } => ConflictClass::ApprovedLeave,
            Self::PendingLeave { .. } => ConflictClass::PendingLeave,
        }
    }

    /// Identifiant de la vacation en collision, pour les conflits de
    /// type vacation.
    pub fn shift_id(&self) -> Option<&ShiftId> {
        match self {
            Self::ExistingShift { shift } | Self::OtherPattern { shift } => Some(shift),
            _ => None,
        }
    }
}

/// Horaires que le roulement créerait sur la date en conflit, pour
/// comparaison côte à côte par l'appelant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedTimes {
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Collision détectée entre le roulement projeté et l'existant.
/// Artefact transitoire : reconstruit à chaque passe de détection,
/// jamais persisté.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conflict {
    pub date: NaiveDate,
    pub kind: ConflictKind,
    pub description: String,
    pub projected: ProjectedTimes,
}

impl Conflict {
    pub fn key(&self) -> ConflictKey {
        ConflictKey {
            date: self.date,
            class: self.kind.class(),
        }
    }
}

/// Identité stable d'un conflit (date + classe), indépendante de toute
/// position dans une liste.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConflictKey {
    pub date: NaiveDate,
    pub class: ConflictClass,
}

impl fmt::Display for ConflictKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.date, self.class)
    }
}

/// Décision de l'opérateur pour un conflit. `Keep` et `Skip` sont un
/// vocabulaire distinct pour un même effet planificateur : aucune
/// vacation générée sur la date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Keep,
    Skip,
    Override,
}

impl Resolution {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "keep" => Some(Self::Keep),
            "skip" => Some(Self::Skip),
            "override" => Some(Self::Override),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Skip => "skip",
            Self::Override => "override",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("invalid rotation cycle: must be at least 1 week")]
    InvalidCycle,
    #[error("invalid rotation start week: must be at least 1")]
    InvalidStartWeek,
    #[error("invalid date range: end must not be before start")]
    InvalidDateRange,
    #[error("unknown conflict: {0}")]
    UnknownConflict(String),
    #[error("leave conflicts cannot be overridden")]
    LeaveOverride,
    #[error("invalid run state: {0}")]
    InvalidState(&'static str),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Date écartée de la génération, avec sa raison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDate {
    pub date: NaiveDate,
    pub reason: String,
}

/// Bilan d'une passe de génération. Les échecs partiels sont visibles
/// dans `errors`, jamais convertis en échec global.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationResult {
    pub shifts_created: Vec<ShiftId>,
    pub shifts_skipped: Vec<SkippedDate>,
    pub errors: Vec<String>,
}

impl fmt::Display for GenerationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} skipped, {} error(s)",
            self.shifts_created.len(),
            self.shifts_skipped.len(),
            self.errors.len()
        )
    }
}
