use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifiant fort pour Staff
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaffId(String);

impl StaffId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifiant fort pour Shift
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShiftId(String);

impl ShiftId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifiant fort pour Leave
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaveId(String);

impl LeaveId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifiant fort pour StaffPatternAssignment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssignmentId(String);

impl AssignmentId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Membre du personnel soignant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub id: StaffId,
    pub handle: String,
    pub display_name: String,
}

impl Staff {
    pub fn new<H: Into<String>, D: Into<String>>(handle: H, display_name: D) -> Self {
        Self {
            id: StaffId::random(),
            handle: handle.into(),
            display_name: display_name.into(),
        }
    }
}

/// Intervalle de dates inclusif `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if end < start {
            return Err("range end must not be before start".to_string());
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Itère sur chaque jour de l'intervalle, bornes comprises.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Affectation d'un membre du personnel à un roulement, sur une période
/// d'effet. `start_date` ancre la semaine 1 du cycle ;
/// `rotation_start_week` décale le point d'entrée dans le cycle (départs
/// échelonnés sur un même roulement). Une affectation terminée est close
/// via `end_date`, jamais supprimée.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffPatternAssignment {
    pub id: AssignmentId,
    pub staff: StaffId,
    pub template: String,
    pub start_date: NaiveDate,
    #[serde(default = "default_rotation_start_week")]
    pub rotation_start_week: u16,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

fn default_rotation_start_week() -> u16 {
    1
}

impl StaffPatternAssignment {
    pub fn new(staff: StaffId, template: String, start_date: NaiveDate) -> Self {
        Self {
            id: AssignmentId::random(),
            staff,
            template,
            start_date,
            rotation_start_week: 1,
            end_date: None,
        }
    }

    /// Vrai si la date tombe dans la période d'effet.
    pub fn is_effective_on(&self, date: NaiveDate) -> bool {
        date >= self.start_date && self.end_date.map_or(true, |end| date <= end)
    }

    /// Restreint `range` à la période d'effet. `None` si l'intersection
    /// est vide.
    pub fn clamp_range(&self, range: &DateRange) -> Option<DateRange> {
        let start = range.start().max(self.start_date);
        let end = match self.end_date {
            Some(e) => range.end().min(e),
            None => range.end(),
        };
        DateRange::new(start, end).ok()
    }
}

/// Vacation concrète déjà présente au planning. Lecture seule pour le
/// moteur de génération ; `from_pattern` indique qu'elle provient
/// elle-même d'un roulement (pas forcément le même).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingShift {
    pub id: ShiftId,
    pub staff: StaffId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub from_pattern: bool,
    #[serde(default)]
    pub assignment: Option<AssignmentId>,
}

impl ExistingShift {
    pub fn new(
        staff: StaffId,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            id: ShiftId::random(),
            staff,
            date,
            start_time,
            end_time,
            name: None,
            from_pattern: false,
            assignment: None,
        }
    }
}

/// Statut d'approbation d'une absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveStatus {
    Approved,
    Pending,
    Other,
}

impl LeaveStatus {
    /// Parsing tolérant pour les imports CSV.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "approved" | "approuve" | "approuvé" => Self::Approved,
            "pending" | "en_attente" => Self::Pending,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Pending => "pending",
            Self::Other => "other",
        }
    }
}

/// Absence posée sur un intervalle de dates inclusif.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistingLeave {
    pub id: LeaveId,
    pub staff: StaffId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: LeaveStatus,
    pub kind: String,
}

impl ExistingLeave {
    pub fn new(
        staff: StaffId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        status: LeaveStatus,
        kind: String,
    ) -> Result<Self, String> {
        if end_date < start_date {
            return Err("leave end must not be before start".to_string());
        }
        Ok(Self {
            id: LeaveId::random(),
            staff,
            start_date,
            end_date,
            status,
            kind,
        })
    }

    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Document rota complet, persisté en JSON.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Rota {
    pub staff: Vec<Staff>,
    pub assignments: Vec<StaffPatternAssignment>,
    pub shifts: Vec<ExistingShift>,
    pub leave: Vec<ExistingLeave>,
}

impl Rota {
    pub fn find_staff_by_handle<'a>(&'a self, handle: &str) -> Option<&'a Staff> {
        self.staff.iter().find(|s| s.handle == handle)
    }
    pub fn find_staff_by_id<'a>(&'a self, id: &StaffId) -> Option<&'a Staff> {
        self.staff.iter().find(|s| &s.id == id)
    }
    pub fn find_assignment<'a>(&'a self, id: &AssignmentId) -> Option<&'a StaffPatternAssignment> {
        self.assignments.iter().find(|a| &a.id == id)
    }

    /// Affectation effective pour un membre à une date donnée.
    pub fn find_assignment_for<'a>(
        &'a self,
        staff: &StaffId,
        date: NaiveDate,
    ) -> Option<&'a StaffPatternAssignment> {
        self.assignments
            .iter()
            .find(|a| &a.staff == staff && a.is_effective_on(date))
    }

    /// Pré-collecte des vacations d'un membre sur un intervalle. Le
    /// moteur reçoit des collections figées, jamais le document vivant.
    pub fn shifts_for(&self, staff: &StaffId, range: &DateRange) -> Vec<ExistingShift> {
        self.shifts
            .iter()
            .filter(|s| &s.staff == staff && range.contains(s.date))
            .cloned()
            .collect()
    }

    /// Pré-collecte des absences intersectant l'intervalle.
    pub fn leave_for(&self, staff: &StaffId, range: &DateRange) -> Vec<ExistingLeave> {
        self.leave
            .iter()
            .filter(|l| {
                &l.staff == staff && l.start_date <= range.end() && l.end_date >= range.start()
            })
            .cloned()
            .collect()
    }
}
