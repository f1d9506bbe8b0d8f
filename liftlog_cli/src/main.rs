use clap::{ArgAction, Parser, Subcommand};
use liftlog_core::aggregate::STRENGTH_SCORE;
use liftlog_core::catalog::KNOWN_CATEGORIES;
use liftlog_core::export::{cleanup_processed, export_series_csv, rollup_to_csv};
use liftlog_core::mutation::build_logged_set;
use liftlog_core::sink::{read_lifts, table_from_stored};
use liftlog_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(about = "Lifting log and strength progress tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More diagnostics on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up the category of an exercise
    Category {
        /// Exercise name (exact match)
        name: String,
    },

    /// Estimate a one-rep max from weight and reps
    Orm {
        #[arg(long)]
        weight: f64,

        #[arg(long)]
        reps: u32,
    },

    /// Strength score for a total at a bodyweight
    Score {
        #[arg(long)]
        total: f64,

        #[arg(long)]
        bodyweight: f64,

        /// "F" for the female coefficients, anything else for the default set
        #[arg(long)]
        sex: Option<String>,

        /// "lb" for pounds, anything else for kilograms
        #[arg(long)]
        units: Option<String>,
    },

    /// Log a set
    Add {
        #[arg(long)]
        exercise: String,

        #[arg(long)]
        weight: f64,

        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=99))]
        reps: u32,

        /// Date of the set (defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Category (defaults to the catalog lookup); must be a known category
        #[arg(long)]
        category: Option<String>,

        /// Owner id stored with the set
        #[arg(long)]
        owner: Option<u32>,

        /// Show the computed set without storing it
        #[arg(long)]
        dry_run: bool,
    },

    /// List logged sets, optionally filtered by exercise and 1RM cutoff
    Lifts {
        /// Only sets whose estimated 1RM is above this
        #[arg(long)]
        cutoff: Option<f64>,

        /// Only these exercises (repeatable)
        #[arg(long)]
        exercise: Vec<String>,

        /// Exercise log CSV (defaults to stored lifts)
        #[arg(long)]
        lifts: Option<PathBuf>,
    },

    /// Period maxima for one exercise (or Bodyweight)
    Maxes {
        #[arg(long)]
        exercise: String,

        /// Period alias: D, W, SM, M, Q, A
        #[arg(long)]
        period: Option<String>,

        /// Exercise log CSV (defaults to stored lifts)
        #[arg(long)]
        lifts: Option<PathBuf>,

        /// Body tracker CSV, required for Bodyweight
        #[arg(long)]
        bodyweight: Option<PathBuf>,
    },

    /// Squat/bench/deadlift maxima, total and strength score per period
    Progress {
        /// Period alias: D, W, SM, M, Q, A
        #[arg(long)]
        period: Option<String>,

        /// Exercise log CSV (defaults to stored lifts)
        #[arg(long)]
        lifts: Option<PathBuf>,

        /// Body tracker CSV
        #[arg(long)]
        bodyweight: Option<PathBuf>,

        /// Write all series to this CSV file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Roll up stored lifts to CSV
    Rollup {
        /// Clean up processed lift logs after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

/// Upper bound on the weight accepted when logging a set
const MAX_WEIGHT: f64 = 1000.0;

fn main() -> Result<()> {
    let cli = Cli::parse();
    liftlog_core::logging::init(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.validate()?;
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data dir {:?}", data_dir);

    match cli.command {
        Commands::Category { name } => {
            println!("{}", config.catalog().category(&name));
            Ok(())
        }
        Commands::Orm { weight, reps } => {
            println!("{:.2}", estimate_one_rep_max(weight, reps));
            Ok(())
        }
        Commands::Score {
            total,
            bodyweight,
            sex,
            units,
        } => {
            let sex = sex.as_deref().map(Sex::from).unwrap_or(config.lifter.sex());
            let units = units
                .as_deref()
                .map(Units::from_label)
                .unwrap_or(config.lifter.units());
            println!("{:.1}", strength_score(total, bodyweight, sex, units)?);
            Ok(())
        }
        Commands::Add {
            exercise,
            weight,
            reps,
            date,
            category,
            owner,
            dry_run,
        } => cmd_add(
            &data_dir,
            &config,
            NewExercise {
                date: date.unwrap_or_else(|| chrono::Local::now().date_naive().to_string()),
                exercise,
                weight,
                reps,
                category,
                one_rep_max: None,
            },
            owner,
            dry_run,
        ),
        Commands::Lifts {
            cutoff,
            exercise,
            lifts,
        } => cmd_lifts(&data_dir, cutoff, &exercise, lifts.as_deref()),
        Commands::Maxes {
            exercise,
            period,
            lifts,
            bodyweight,
        } => cmd_maxes(
            &data_dir,
            &config,
            &exercise,
            period.as_deref(),
            lifts.as_deref(),
            bodyweight.as_deref(),
        ),
        Commands::Progress {
            period,
            lifts,
            bodyweight,
            export,
        } => cmd_progress(
            &data_dir,
            &config,
            period.as_deref(),
            lifts.as_deref(),
            bodyweight.as_deref(),
            export.as_deref(),
        ),
        Commands::Rollup { cleanup } => cmd_rollup(&data_dir, cleanup),
    }
}

fn lifts_jsonl(data_dir: &Path) -> PathBuf {
    data_dir.join("lifts.jsonl")
}

fn lifts_csv(data_dir: &Path) -> PathBuf {
    data_dir.join("lifts.csv")
}

fn resolve_period(alias: Option<&str>, config: &Config) -> Result<Period> {
    match alias {
        Some(alias) => alias.parse(),
        None => Ok(config.analysis.period),
    }
}

/// Exercise table from an explicit CSV, or from the rolled-up CSV followed
/// by the lifts still in the sink
fn load_table(data_dir: &Path, lifts: Option<&Path>) -> Result<ExerciseTable> {
    if let Some(path) = lifts {
        return load_lifts_csv(path);
    }

    let mut rows = Vec::new();
    let archived = lifts_csv(data_dir);
    if archived.exists() {
        rows.extend(load_lifts_csv(&archived)?.into_rows());
    }
    rows.extend(table_from_stored(&read_lifts(&lifts_jsonl(data_dir))?).into_rows());
    Ok(ExerciseTable::from_rows(rows))
}

fn cmd_add(
    data_dir: &Path,
    config: &Config,
    fields: NewExercise,
    owner: Option<u32>,
    dry_run: bool,
) -> Result<()> {
    if !(0.0..=MAX_WEIGHT).contains(&fields.weight) {
        return Err(Error::InvalidRecord(format!(
            "weight must be between 0 and {}, got {}",
            MAX_WEIGHT, fields.weight
        )));
    }

    if let Some(category) = &fields.category {
        if !KNOWN_CATEGORIES.contains(&category.as_str()) {
            return Err(Error::InvalidRecord(format!(
                "unknown category {:?}, expected one of: {}",
                category,
                KNOWN_CATEGORIES.join(", ")
            )));
        }
    }

    let set = build_logged_set(fields, &config.catalog())?;
    println!(
        "{} | {} | {} x {} | 1RM {:.2} | {}",
        set.date, set.exercise, set.weight, set.reps, set.one_rep_max, set.category
    );

    if dry_run {
        println!("[Dry run - not storing set]");
        return Ok(());
    }

    let mut sink = JsonlLiftSink::new(lifts_jsonl(data_dir));
    sink.append(&StoredLift::from_logged_set(&set, owner))?;
    println!("✓ Set logged");
    Ok(())
}

fn cmd_lifts(
    data_dir: &Path,
    cutoff: Option<f64>,
    exercises: &[String],
    lifts: Option<&Path>,
) -> Result<()> {
    let mut table = load_table(data_dir, lifts)?;
    let available: Vec<String> = table.exercises().into_iter().map(String::from).collect();

    if !exercises.is_empty() {
        let names: Vec<&str> = exercises.iter().map(String::as_str).collect();
        table = table.only_exercises(&names);
    }
    if let Some(cutoff) = cutoff {
        table = table.above_one_rep_max(cutoff);
    }

    if table.is_empty() {
        println!("No sets match");
    } else {
        for set in &table {
            println!(
                "{} | {} | {} x {} | 1RM {:.2} | {}",
                set.date, set.exercise, set.weight, set.reps, set.one_rep_max, set.category
            );
        }
    }

    println!("\n{} sets shown", table.len());
    if !available.is_empty() {
        println!("Exercises: {}", available.join(", "));
    }
    Ok(())
}

/// Bodyweight table from a body tracker CSV, in the lifter's units
fn load_bodyweight(path: &Path, config: &Config) -> Result<BodyweightTable> {
    Ok(load_bodyweight_csv(path)?.in_units(config.lifter.units()))
}

fn cmd_maxes(
    data_dir: &Path,
    config: &Config,
    exercise: &str,
    period: Option<&str>,
    lifts: Option<&Path>,
    bodyweight: Option<&Path>,
) -> Result<()> {
    let period = resolve_period(period, config)?;

    let maxima = if exercise == BODYWEIGHT {
        let Some(path) = bodyweight else {
            return Err(Error::InvalidRecord(
                "--bodyweight is required for Bodyweight maxima".into(),
            ));
        };
        period_maxima(&load_bodyweight(path, config)?, exercise, period)
    } else {
        period_maxima(&load_table(data_dir, lifts)?, exercise, period)
    };

    if maxima.is_empty() {
        println!("No data for {}", exercise);
        return Ok(());
    }

    println!("{} ({})", maxima.name, period);
    for (period_end, value) in maxima.iter() {
        println!("  {}  {:>8.2}", period_end, value);
    }
    Ok(())
}

fn cmd_progress(
    data_dir: &Path,
    config: &Config,
    period: Option<&str>,
    lifts: Option<&Path>,
    bodyweight: Option<&Path>,
    export: Option<&Path>,
) -> Result<()> {
    let period = resolve_period(period, config)?;
    let table = load_table(data_dir, lifts)?;
    let analysis = &config.analysis;

    let squat = period_maxima(&table, &analysis.squat, period);
    let bench = period_maxima(&table, &analysis.bench, period);
    let deadlift = period_maxima(&table, &analysis.deadlift, period);
    let total = composite_total_with(&squat, &bench, &deadlift, analysis.total_mode);

    let body = match bodyweight {
        Some(path) => Some(period_maxima(
            &load_bodyweight(path, config)?,
            BODYWEIGHT,
            period,
        )),
        None => None,
    };
    let bw_source = match &body {
        Some(series) => BodyweightSource::Series(series),
        None => BodyweightSource::Fixed(config.lifter.bodyweight),
    };
    let scores =
        strength_score_series(&total, &bw_source, config.lifter.sex(), config.lifter.units())?;

    let mut series = vec![&squat, &bench, &deadlift];
    if let Some(body) = &body {
        series.push(body);
    }
    series.push(&total);
    series.push(&scores);

    print_series_table(&series);

    if let Some(path) = export {
        export_series_csv(&series, path)?;
        println!("✓ Exported {} series to {}", series.len(), path.display());
    }

    match scores.latest() {
        Some((period_end, score)) => {
            println!("\nLatest {}: {:.1} ({})", STRENGTH_SCORE, score, period_end)
        }
        None => println!(
            "\nNo periods with all of {}, {}, {}",
            analysis.squat, analysis.bench, analysis.deadlift
        ),
    }
    Ok(())
}

fn print_series_table(series: &[&PeriodMaxima]) {
    let periods: std::collections::BTreeSet<_> = series
        .iter()
        .flat_map(|s| s.values.keys().copied())
        .collect();

    print!("{:<12}", "period");
    for s in series {
        print!(" {:>26}", s.name);
    }
    println!();

    for period_end in periods {
        print!("{:<12}", period_end.to_string());
        for s in series {
            match s.get(period_end) {
                Some(value) => print!(" {:>26.2}", value),
                None => print!(" {:>26}", "-"),
            }
        }
        println!();
    }
}

fn cmd_rollup(data_dir: &Path, cleanup: bool) -> Result<()> {
    let jsonl_path = lifts_jsonl(data_dir);
    let csv_path = lifts_csv(data_dir);

    if !jsonl_path.exists() {
        println!("No stored lifts found - nothing to roll up.");
        return Ok(());
    }

    let count = rollup_to_csv(&jsonl_path, &csv_path)?;

    println!("✓ Rolled up {} lifts to CSV", count);
    println!("  CSV: {}", csv_path.display());

    if cleanup {
        let cleaned = cleanup_processed(data_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed lift logs", cleaned);
        }
    }

    Ok(())
}
