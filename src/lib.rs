#![forbid(unsafe_code)]
//! Roulement — bibliothèque de génération de plannings soignants (sans BD).
//!
//! - Roulements multi-semaines ancrés par affectation, arithmétique de
//!   rotation déterministe.
//! - Détection de conflits contre l'existant (vacations, absences),
//!   arbitrage par conflit ou par classe, plan puis exécution.
//! - Stockage fichiers (JSON/CSV) ; dates et heures naïves, le fuseau
//!   relève de l'appelant.

pub mod generation;
pub mod io;
pub mod model;
pub mod storage;
pub mod template;

pub use generation::{
    detect_conflicts, resolve_pattern_day, Conflict, ConflictClass, ConflictKey, ConflictKind,
    GenerationError, GenerationPlan, GenerationResult, GenerationRun, NewShift, Resolution,
    ResolutionSet, Rotation, RunState, ShiftWriter,
};
pub use model::{
    AssignmentId, DateRange, ExistingLeave, ExistingShift, LeaveId, LeaveStatus, Rota, ShiftId,
    Staff, StaffId, StaffPatternAssignment,
};
pub use storage::{JsonStorage, Storage};
pub use template::{
    export_template_json, load_template_from_file, PatternDay, PatternTemplate, TemplateInfo,
    TemplateStatus, TemplateStore,
};
