use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Statut de publication d'un roulement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateStatus {
    Draft,
    Active,
    Retired,
}

impl Default for TemplateStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// Description complète d'un roulement multi-semaines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TemplateStatus,
    pub rotation_cycle_weeks: u16,
    #[serde(default)]
    pub days: Vec<PatternDay>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl PatternTemplate {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            bail!("template id cannot be empty");
        }
        if self.name.trim().is_empty() {
            bail!("template name cannot be empty");
        }
        if self.rotation_cycle_weeks == 0 {
            bail!("rotation_cycle_weeks must be > 0");
        }
        if self.days.is_empty() {
            bail!("template must define at least one day");
        }
        for day in &self.days {
            day.validate(self.rotation_cycle_weeks)?;
        }
        validate_day_uniqueness(&self.days)?;
        Ok(())
    }

    /// Jour régissant `(week_number, weekday)`, s'il existe.
    pub fn day_for(&self, week_number: u16, weekday: u8) -> Option<&PatternDay> {
        self.days
            .iter()
            .find(|d| d.week_number == week_number && d.weekday == weekday)
    }
}

/// Une règle du roulement : semaine du cycle + jour de semaine
/// (1=lundi .. 7=dimanche). `end_time <= start_time` signifie que la
/// vacation franchit minuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDay {
    pub week_number: u16,
    pub weekday: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(default)]
    pub is_rest_day: bool,
    #[serde(default)]
    pub break_minutes: Option<u16>,
}

impl PatternDay {
    fn validate(&self, cycle_weeks: u16) -> Result<()> {
        if self.week_number == 0 || self.week_number > cycle_weeks {
            bail!(
                "day week_number {} outside cycle 1..={cycle_weeks}",
                self.week_number
            );
        }
        if self.weekday == 0 || self.weekday > 7 {
            bail!("day weekday {} must be within 1..=7", self.weekday);
        }
        if !self.is_rest_day && self.start_time == self.end_time {
            bail!("day start_time and end_time cannot be equal");
        }
        Ok(())
    }
}

// Au plus un jour par (semaine, jour de semaine).
fn validate_day_uniqueness(days: &[PatternDay]) -> Result<()> {
    for (i, a) in days.iter().enumerate() {
        for b in days.iter().skip(i + 1) {
            if a.week_number == b.week_number && a.weekday == b.weekday {
                bail!(
                    "duplicate day for week {} weekday {}",
                    a.week_number,
                    a.weekday
                );
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct TemplateInfo {
    pub template: PatternTemplate,
    pub path: PathBuf,
    pub modified: Option<DateTime<Utc>>,
}

/// Gestion simple des roulements persistés sur disque.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    base_dir: PathBuf,
}

impl TemplateStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            base_dir: dir.as_ref().to_path_buf(),
        }
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.base_dir)
            .with_context(|| format!("creating template directory {}", self.base_dir.display()))
    }

    pub fn save(&self, template: &PatternTemplate) -> Result<PathBuf> {
        template.validate()?;
        self.ensure_dir()?;
        let path = self.base_dir.join(format!("{}.json", template.id));
        let json = serde_json::to_string_pretty(template)?;
        fs::write(&path, json).with_context(|| format!("writing template {}", path.display()))?;
        Ok(path)
    }

    pub fn load(&self, id: &str) -> Result<PatternTemplate> {
        let path = self.base_dir.join(format!("{id}.json"));
        let data =
            fs::read(&path).with_context(|| format!("reading template {}", path.display()))?;
        let template: PatternTemplate = serde_json::from_slice(&data)
            .with_context(|| format!("parsing template {}", path.display()))?;
        template.validate()?;
        Ok(template)
    }

    pub fn list(&self) -> Result<Vec<TemplateInfo>> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }
        let mut infos = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let data = fs::read(&path)?;
            let template: PatternTemplate = match serde_json::from_slice(&data) {
                Ok(t) => t,
                Err(err) => {
                    eprintln!("Warning: could not parse template {}: {err}", path.display());
                    continue;
                }
            };
            let modified = entry
                .metadata()
                .and_then(|meta| meta.modified())
                .ok()
                .map(DateTime::<Utc>::from);
            infos.push(TemplateInfo {
                template,
                path,
                modified,
            });
        }
        infos.sort_by(|a, b| a.template.id.cmp(&b.template.id));
        Ok(infos)
    }
}

pub fn export_template_json<P: AsRef<Path>>(path: P, template: &PatternTemplate) -> Result<()> {
    let json = serde_json::to_string_pretty(template)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn load_template_from_file<P: AsRef<Path>>(path: P) -> Result<PatternTemplate> {
    let data = fs::read(&path)?;
    let template: PatternTemplate = serde_json::from_slice(&data)?;
    template.validate()?;
    Ok(template)
}
