mod detect;
mod execute;
mod plan;
mod resolve;
mod rotation;
mod types;

pub use detect::{detect_conflicts, RecordIndex};
pub use execute::{execute, NewShift, ShiftWriter};
pub use plan::{GenerationPlan, PlannedShift};
pub use resolve::{ResolutionSet, ResolvedConflict};
pub use rotation::{is_working_date, iso_weekday, monday_of_week, resolve_pattern_day, Rotation};
pub use types::{
    Conflict, ConflictClass, ConflictKey, ConflictKind, GenerationError, GenerationResult,
    ProjectedTimes, Resolution, SkippedDate,
};

use crate::model::{DateRange, ExistingLeave, ExistingShift, StaffPatternAssignment};
use crate::template::PatternTemplate;
use chrono::NaiveDate;

/// États d'une passe de génération. `Complete` est terminal : une
/// nouvelle passe est une nouvelle valeur, jamais un état réutilisé.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Detecting,
    AwaitingResolution,
    Generating,
    Complete,
}

/// Une passe de génération complète : détection, arbitrage des
/// conflits, planification puis exécution contre un `ShiftWriter`. Les
/// collections d'existant sont pré-collectées par l'appelant ; la passe
/// ne consulte jamais le magasin elle-même.
#[derive(Debug)]
pub struct GenerationRun<'a> {
    template: &'a PatternTemplate,
    assignment: &'a StaffPatternAssignment,
    range: DateRange,
    shifts: &'a [ExistingShift],
    leave: &'a [ExistingLeave],
    rotation: Rotation,
    state: RunState,
    resolutions: ResolutionSet,
}

impl<'a> GenerationRun<'a> {
    /// Valide la configuration avant tout travail : roulement bien
    /// formé, cycle non nul, semaine de départ non nulle.
    pub fn new(
        template: &'a PatternTemplate,
        assignment: &'a StaffPatternAssignment,
        range: DateRange,
        shifts: &'a [ExistingShift],
        leave: &'a [ExistingLeave],
    ) -> Result<Self, GenerationError> {
        template.validate()?;
        let rotation = Rotation::new(
            template.rotation_cycle_weeks,
            assignment.start_date,
            assignment.rotation_start_week,
        )?;
        Ok(Self {
            template,
            assignment,
            range,
            shifts,
            leave,
            rotation,
            state: RunState::Idle,
            resolutions: ResolutionSet::default(),
        })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn rotation(&self) -> &Rotation {
        &self.rotation
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    /// Passe de détection, lecture seule. Chaque conflit reçoit sa
    /// résolution par défaut ; un conflit jamais retouché part donc
    /// avec elle en génération.
    pub fn detect(&mut self) -> Result<&ResolutionSet, GenerationError> {
        if self.state != RunState::Idle {
            return Err(GenerationError::InvalidState(
                "detect requires a fresh run",
            ));
        }
        self.state = RunState::Detecting;
        let conflicts = detect_conflicts(
            &self.range,
            &self.template.days,
            &self.rotation,
            self.shifts,
            self.leave,
        );
        self.resolutions = ResolutionSet::from_conflicts(conflicts);
        self.state = RunState::AwaitingResolution;
        Ok(&self.resolutions)
    }

    pub fn resolutions(&self) -> &ResolutionSet {
        &self.resolutions
    }

    pub fn set_resolution(
        &mut self,
        key: &ConflictKey,
        resolution: Resolution,
    ) -> Result<(), GenerationError> {
        self.require_awaiting("set_resolution requires a detected run")?;
        self.resolutions.set(key, resolution)
    }

    pub fn set_resolution_by_date(
        &mut self,
        date: NaiveDate,
        resolution: Resolution,
    ) -> Result<(), GenerationError> {
        self.require_awaiting("set_resolution requires a detected run")?;
        self.resolutions.set_by_date(date, resolution)
    }

    /// Applique une résolution à toute une classe de conflits ;
    /// retourne le nombre d'entrées modifiées.
    pub fn bulk_set_resolution(
        &mut self,
        class: ConflictClass,
        resolution: Resolution,
    ) -> Result<usize, GenerationError> {
        self.require_awaiting("bulk_set_resolution requires a detected run")?;
        Ok(self.resolutions.bulk_set(class, resolution))
    }

    /// Plan concret à partir des résolutions courantes. Pur : peut être
    /// rappelé autant de fois que nécessaire pour prévisualiser.
    pub fn plan(&self) -> Result<GenerationPlan, GenerationError> {
        if self.state != RunState::AwaitingResolution {
            return Err(GenerationError::InvalidState(
                "plan requires a detected run",
            ));
        }
        Ok(GenerationPlan::build(
            &self.range,
            &self.template.days,
            &self.rotation,
            &self.resolutions,
        ))
    }

    /// Planifie puis exécute contre le collaborateur d'écriture. Les
    /// échecs par date restent dans le bilan ; seule une utilisation
    /// hors état est une erreur.
    pub fn execute(
        &mut self,
        writer: &mut dyn ShiftWriter,
    ) -> Result<GenerationResult, GenerationError> {
        if self.state != RunState::AwaitingResolution {
            return Err(GenerationError::InvalidState(
                "execute requires a detected, resolved run",
            ));
        }
        let plan = GenerationPlan::build(
            &self.range,
            &self.template.days,
            &self.rotation,
            &self.resolutions,
        );
        self.state = RunState::Generating;
        let result = execute(&plan, self.assignment, &self.template.name, writer);
        self.state = RunState::Complete;
        Ok(result)
    }

    fn require_awaiting(&self, msg: &'static str) -> Result<(), GenerationError> {
        if self.state != RunState::AwaitingResolution {
            return Err(GenerationError::InvalidState(msg));
        }
        Ok(())
    }
}
