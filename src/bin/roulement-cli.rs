#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use roulement::{
    io,
    model::{DateRange, Rota, StaffPatternAssignment},
    storage::{JsonStorage, Storage},
    template::{load_template_from_file, TemplateStatus, TemplateStore},
    ConflictClass, GenerationRun, Resolution,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI minimaliste de génération de plannings (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON de rota
    #[arg(long, global = true, default_value = "rota.json")]
    rota: String,

    /// Répertoire des roulements persistés
    #[arg(long, global = true, default_value = "templates")]
    templates: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Importer du personnel depuis un CSV
    ImportStaff {
        #[arg(long)]
        csv: String,
    },

    /// Importer des vacations existantes depuis un CSV
    ImportShifts {
        #[arg(long)]
        csv: String,
    },

    /// Importer des absences depuis un CSV
    ImportLeave {
        #[arg(long)]
        csv: String,
    },

    /// Valider et enregistrer un roulement (fichier JSON)
    TemplateImport {
        #[arg(long)]
        file: String,
    },

    /// Lister les roulements enregistrés
    TemplateList,

    /// Affecter un membre du personnel à un roulement
    Assign {
        #[arg(long)]
        staff: String,
        #[arg(long)]
        template: String,
        /// Date d'ancrage (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        #[arg(long, default_value_t = 1)]
        rotation_start_week: u16,
        /// Fin de période d'effet (YYYY-MM-DD, optionnelle)
        #[arg(long)]
        end: Option<String>,
    },

    /// Détecter les conflits sans rien écrire
    Preview {
        #[arg(long)]
        staff: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Export CSV des conflits (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Générer les vacations du roulement sur un intervalle
    Generate {
        #[arg(long)]
        staff: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Résolution par date: "YYYY-MM-DD=keep|skip|override" (répétable)
        #[arg(long)]
        resolve: Vec<String>,
        /// Résolution en lot des conflits de vacation
        #[arg(long)]
        resolve_shifts: Option<String>,
        /// Résolution en lot des conflits d'absence (override ignoré)
        #[arg(long)]
        resolve_leave: Option<String>,
        /// Export JSON du bilan (optionnel)
        #[arg(long)]
        out_json: Option<String>,
    },

    /// Lister et optionnellement exporter
    List {
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.rota)?;
    let mut rota = storage.load_or_default()?;
    let store = TemplateStore::new(&cli.templates);

    let code = match cli.cmd {
        Commands::ImportStaff { csv } => {
            let staff = io::import_staff_csv(csv)?;
            rota.staff.extend(staff);
            storage.save(&rota)?;
            0
        }
        Commands::ImportShifts { csv } => {
            let shifts = io::import_shifts_csv(csv, &rota)?;
            rota.shifts.extend(shifts);
            storage.save(&rota)?;
            0
        }
        Commands::ImportLeave { csv } => {
            let leave = io::import_leave_csv(csv, &rota)?;
            rota.leave.extend(leave);
            storage.save(&rota)?;
            0
        }
        Commands::TemplateImport { file } => {
            let template = load_template_from_file(&file)?;
            let path = store.save(&template)?;
            println!("Template '{}' saved to {}", template.id, path.display());
            0
        }
        Commands::TemplateList => {
            for info in store.list()? {
                let t = &info.template;
                println!(
                    "{} | {} | {} week(s) | {} day rule(s)",
                    t.id,
                    t.name,
                    t.rotation_cycle_weeks,
                    t.days.len()
                );
            }
            0
        }
        Commands::Assign {
            staff,
            template,
            start,
            rotation_start_week,
            end,
        } => {
            let member = rota
                .find_staff_by_handle(&staff)
                .with_context(|| format!("unknown staff handle: {staff}"))?
                .clone();
            let tpl = store.load(&template)?;
            if tpl.status == TemplateStatus::Retired {
                bail!("template '{}' is retired", template);
            }
            let start = parse_date(&start)?;
            let mut assignment =
                StaffPatternAssignment::new(member.id.clone(), tpl.id.clone(), start);
            assignment.rotation_start_week = rotation_start_week;
            if let Some(end) = end {
                assignment.end_date = Some(parse_date(&end)?);
            }
            println!(
                "Assigned {} to '{}' from {} (start week {})",
                member.handle, tpl.id, start, rotation_start_week
            );
            rota.assignments.push(assignment);
            storage.save(&rota)?;
            0
        }
        Commands::Preview {
            staff,
            from,
            to,
            report,
        } => {
            let (assignment, template, range) = prepare(&rota, &store, &staff, &from, &to)?;
            let shifts = rota.shifts_for(&assignment.staff, &range);
            let leave = rota.leave_for(&assignment.staff, &range);
            let mut run = GenerationRun::new(&template, &assignment, range, &shifts, &leave)?;
            run.detect()?;

            if run.resolutions().is_empty() {
                println!("OK: no conflicts");
                0
            } else {
                eprintln!("Found {} conflict(s)", run.resolutions().len());
                for entry in run.resolutions().iter() {
                    let c = &entry.conflict;
                    println!(
                        "{} | {} | {} | pattern {}-{} | {}",
                        c.date,
                        c.kind.class(),
                        c.description,
                        c.projected.start_time.format("%H:%M"),
                        c.projected.end_time.format("%H:%M"),
                        entry.resolution
                    );
                }
                if let Some(path) = report {
                    io::export_conflicts_csv(path, run.resolutions())?;
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Generate {
            staff,
            from,
            to,
            resolve,
            resolve_shifts,
            resolve_leave,
            out_json,
        } => {
            let (assignment, template, range) = prepare(&rota, &store, &staff, &from, &to)?;
            let shifts = rota.shifts_for(&assignment.staff, &range);
            let leave = rota.leave_for(&assignment.staff, &range);
            let mut run = GenerationRun::new(&template, &assignment, range, &shifts, &leave)?;
            run.detect()?;

            if let Some(raw) = resolve_shifts {
                let resolution = parse_resolution(&raw)?;
                run.bulk_set_resolution(ConflictClass::ExistingShift, resolution)?;
                run.bulk_set_resolution(ConflictClass::OtherPattern, resolution)?;
            }
            if let Some(raw) = resolve_leave {
                let resolution = parse_resolution(&raw)?;
                run.bulk_set_resolution(ConflictClass::ApprovedLeave, resolution)?;
                run.bulk_set_resolution(ConflictClass::PendingLeave, resolution)?;
            }
            for raw in &resolve {
                let (date, resolution) = parse_resolve_arg(raw)?;
                run.set_resolution_by_date(date, resolution)?;
            }

            let plan = run.plan()?;
            print!("{plan}");
            let result = run.execute(&mut rota)?;
            storage.save(&rota)?;
            println!("{result}");
            for err in &result.errors {
                eprintln!("error: {err}");
            }
            if let Some(path) = out_json {
                io::export_result_json(path, &result)?;
            }
            if result.errors.is_empty() {
                0
            } else {
                2
            }
        }
        Commands::List { out_json, out_csv } => {
            if let Some(path) = out_json {
                io::export_rota_json(path, &rota)?;
            }
            if let Some(path) = out_csv {
                io::export_shifts_csv(path, &rota)?;
            }
            // impression compacte
            for s in &rota.shifts {
                let handle = rota
                    .find_staff_by_id(&s.staff)
                    .map(|p| p.handle.as_str())
                    .unwrap_or("-");
                println!(
                    "{} | {} {} → {} | {} | {}",
                    s.id.as_str(),
                    s.date,
                    s.start_time.format("%H:%M"),
                    s.end_time.format("%H:%M"),
                    handle,
                    if s.from_pattern { "pattern" } else { "manual" }
                );
            }
            0
        }
    };

    std::process::exit(code);
}

/// Résout l'affectation effective, charge son roulement et borne
/// l'intervalle demandé à la période d'effet.
fn prepare(
    rota: &Rota,
    store: &TemplateStore,
    staff: &str,
    from: &str,
    to: &str,
) -> Result<(StaffPatternAssignment, roulement::PatternTemplate, DateRange)> {
    let member = rota
        .find_staff_by_handle(staff)
        .with_context(|| format!("unknown staff handle: {staff}"))?;
    let from = parse_date(from)?;
    let to = parse_date(to)?;
    let requested = DateRange::new(from, to).map_err(anyhow::Error::msg)?;
    let assignment = rota
        .find_assignment_for(&member.id, from)
        .or_else(|| rota.find_assignment_for(&member.id, to))
        .with_context(|| format!("no effective assignment for {staff} in range"))?
        .clone();
    let range = assignment
        .clamp_range(&requested)
        .with_context(|| "requested range does not intersect the assignment period")?;
    let template = store.load(&assignment.template)?;
    Ok((assignment, template, range))
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date: {s}"))
}

fn parse_resolution(s: &str) -> Result<Resolution> {
    Resolution::parse(s).with_context(|| format!("invalid resolution: {s}"))
}

fn parse_resolve_arg(raw: &str) -> Result<(NaiveDate, Resolution)> {
    let Some((date_raw, res_raw)) = raw.split_once('=') else {
        bail!("invalid --resolve value (expected DATE=RESOLUTION): {raw}");
    };
    Ok((parse_date(date_raw.trim())?, parse_resolution(res_raw.trim())?))
}
