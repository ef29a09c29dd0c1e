use crate::generation::{GenerationResult, ResolutionSet};
use crate::model::{ExistingLeave, ExistingShift, LeaveStatus, Rota, Staff};
use anyhow::{bail, Context};
use chrono::{NaiveDate, NaiveTime};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::Path;

/// Import de personnel depuis CSV: header `handle,display_name`
pub fn import_staff_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Staff>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let handle = rec.get(0).context("missing handle")?.trim();
        let display = rec.get(1).context("missing display_name")?.trim();
        if handle.is_empty() || display.is_empty() {
            bail!("invalid staff row (empty)");
        }
        out.push(Staff::new(handle.to_string(), display.to_string()));
    }
    Ok(out)
}

/// Import de vacations existantes:
/// header `handle,date,start,end[,name][,from_pattern]`
pub fn import_shifts_csv<P: AsRef<Path>>(path: P, rota: &Rota) -> anyhow::Result<Vec<ExistingShift>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let handle = rec.get(0).context("missing handle")?.trim();
        let staff = rota
            .find_staff_by_handle(handle)
            .with_context(|| format!("unknown staff handle: {handle}"))?;
        let date = parse_date(rec.get(1).context("missing date")?.trim())?;
        let start = parse_time(rec.get(2).context("missing start")?.trim())?;
        let end = parse_time(rec.get(3).context("missing end")?.trim())?;

        let mut shift = ExistingShift::new(staff.id.clone(), date, start, end);
        if let Some(name) = rec.get(4) {
            let name = name.trim();
            if !name.is_empty() {
                shift.name = Some(name.to_string());
            }
        }
        if let Some(flag) = rec.get(5) {
            let flag = flag.trim();
            if !flag.is_empty() {
                shift.from_pattern = parse_bool(flag)
                    .with_context(|| format!("invalid from_pattern value for {handle} {date}"))?;
            }
        }
        out.push(shift);
    }
    Ok(out)
}

/// Import d'absences: header `handle,start_date,end_date,status,kind`
pub fn import_leave_csv<P: AsRef<Path>>(path: P, rota: &Rota) -> anyhow::Result<Vec<ExistingLeave>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let handle = rec.get(0).context("missing handle")?.trim();
        let staff = rota
            .find_staff_by_handle(handle)
            .with_context(|| format!("unknown staff handle: {handle}"))?;
        let start = parse_date(rec.get(1).context("missing start_date")?.trim())?;
        let end = parse_date(rec.get(2).context("missing end_date")?.trim())?;
        let status = LeaveStatus::parse(rec.get(3).context("missing status")?.trim());
        let kind = rec
            .get(4)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "leave".to_string());
        let record = ExistingLeave::new(staff.id.clone(), start, end, status, kind)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("invalid leave row for handle {handle}"))?;
        out.push(record);
    }
    Ok(out)
}

fn parse_bool(s: &str) -> anyhow::Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "oui" => Ok(true),
        "false" | "0" | "no" | "n" | "non" => Ok(false),
        _ => bail!("expected boolean"),
    }
}

fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date: {s}"))
}

fn parse_time(s: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .with_context(|| format!("invalid time: {s}"))
}

/// Export JSON du rota (jolie mise en forme)
pub fn export_rota_json<P: AsRef<Path>>(path: P, rota: &Rota) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(rota)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV des vacations:
/// header `id,handle,date,start,end,name,from_pattern`
pub fn export_shifts_csv<P: AsRef<Path>>(path: P, rota: &Rota) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["id", "handle", "date", "start", "end", "name", "from_pattern"])?;
    for s in &rota.shifts {
        let handle = rota
            .find_staff_by_id(&s.staff)
            .map(|p| p.handle.as_str())
            .unwrap_or("");
        let date = s.date.to_string();
        let start = s.start_time.format("%H:%M").to_string();
        let end = s.end_time.format("%H:%M").to_string();
        let from_pattern = if s.from_pattern { "true" } else { "false" };
        w.write_record([
            s.id.as_str(),
            handle,
            date.as_str(),
            start.as_str(),
            end.as_str(),
            s.name.as_deref().unwrap_or(""),
            from_pattern,
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV des conflits détectés, avec la résolution courante:
/// header `date,type,description,projected_start,projected_end,resolution`
pub fn export_conflicts_csv<P: AsRef<Path>>(
    path: P,
    resolutions: &ResolutionSet,
) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "date",
        "type",
        "description",
        "projected_start",
        "projected_end",
        "resolution",
    ])?;
    for entry in resolutions.iter() {
        let c = &entry.conflict;
        let date = c.date.to_string();
        let start = c.projected.start_time.format("%H:%M").to_string();
        let end = c.projected.end_time.format("%H:%M").to_string();
        w.write_record([
            date.as_str(),
            c.kind.class().as_str(),
            c.description.as_str(),
            start.as_str(),
            end.as_str(),
            entry.resolution.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export JSON du bilan de génération.
pub fn export_result_json<P: AsRef<Path>>(path: P, result: &GenerationResult) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(result)?;
    fs::write(path, s)?;
    Ok(())
}
