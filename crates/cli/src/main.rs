mod render;
mod session_file;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

use cadence_core::{validate_definition, ProgramDefinition};
use cadence_engine::{validate_config, LiftResult, Outcome, Session};

use render::render_rows;
use session_file::SessionFile;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// A logged result, from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ResultArg {
    Success,
    Fail,
}

/// Cadence training program toolchain.
#[derive(Parser)]
#[command(name = "cadence", version, about = "Cadence training program toolchain")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a program definition file
    Check {
        /// Path to the program definition JSON
        file: PathBuf,
    },

    /// Validate raw config values against a program definition
    Config {
        /// Path to the program definition JSON
        file: PathBuf,
        /// Path to the raw values JSON (string map keyed by config key)
        #[arg(long)]
        values: PathBuf,
    },

    /// Generate a session from a definition and raw config values
    Generate {
        /// Path to the program definition JSON
        file: PathBuf,
        /// Path to the raw values JSON
        #[arg(long)]
        values: PathBuf,
        /// Path the session document is written to
        #[arg(long)]
        session: PathBuf,
    },

    /// Print the materialized schedule of a session
    Plan {
        /// Path to the session document
        #[arg(long)]
        session: PathBuf,
    },

    /// Log an outcome for a slot occurrence
    Log {
        #[arg(long)]
        session: PathBuf,
        /// Workout index (0-based)
        #[arg(long)]
        workout: u32,
        /// Slot id
        #[arg(long)]
        slot: String,
        #[arg(long, value_enum)]
        result: ResultArg,
        /// Reps achieved on an AMRAP set
        #[arg(long)]
        amrap: Option<u32>,
        /// Rated perceived exertion
        #[arg(long)]
        rpe: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },

    /// Undo the most recent edit, or a specific target's most recent edit
    Undo {
        #[arg(long)]
        session: PathBuf,
        /// Workout index (requires --slot)
        #[arg(long, requires = "slot")]
        workout: Option<u32>,
        /// Slot id (requires --workout)
        #[arg(long, requires = "workout")]
        slot: Option<String>,
    },

    /// Clear the outcome log and undo stack
    Reset {
        #[arg(long)]
        session: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { file } => cmd_check(&file, cli.output, cli.quiet),
        Commands::Config { file, values } => cmd_config(&file, &values, cli.output, cli.quiet),
        Commands::Generate {
            file,
            values,
            session,
        } => cmd_generate(&file, &values, &session, cli.output, cli.quiet),
        Commands::Plan { session } => cmd_plan(&session, cli.output, cli.quiet),
        Commands::Log {
            session,
            workout,
            slot,
            result,
            amrap,
            rpe,
            note,
        } => cmd_log(
            &session, workout, &slot, result, amrap, rpe, note, cli.output, cli.quiet,
        ),
        Commands::Undo {
            session,
            workout,
            slot,
        } => cmd_undo(&session, workout, slot.as_deref(), cli.output, cli.quiet),
        Commands::Reset { session } => cmd_reset(&session, cli.output, cli.quiet),
    }
}

// ──────────────────────────────────────────────
// Commands
// ──────────────────────────────────────────────

fn cmd_check(file: &Path, output: OutputFormat, quiet: bool) {
    let (def, raw) = load_definition(file, output, quiet);
    let errors = validate_definition(&def);

    if !errors.is_empty() {
        match output {
            OutputFormat::Json => {
                let json = serde_json::json!({ "ok": false, "errors": errors });
                println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
            }
            OutputFormat::Text => {
                if !quiet {
                    for e in &errors {
                        eprintln!("{}", e);
                    }
                    eprintln!("{} definition error(s)", errors.len());
                }
            }
        }
        process::exit(1);
    }

    let fingerprint = compute_fingerprint(&raw);
    match output {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "ok": true,
                "id": def.id,
                "version": def.version,
                "fingerprint": fingerprint,
            });
            println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        }
        OutputFormat::Text => {
            if !quiet {
                println!("ok: {} v{} ({})", def.id, def.version, fingerprint);
            }
        }
    }
}

fn cmd_config(file: &Path, values: &Path, output: OutputFormat, quiet: bool) {
    let (def, _) = load_checked_definition(file, output, quiet);
    let raw = load_raw_values(values, output, quiet);

    match validate_config(&def.inputs, &raw) {
        Ok(config) => match output {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&config).unwrap_or_default()
                );
            }
            OutputFormat::Text => {
                if !quiet {
                    println!("ok: {} value(s)", config.values.len());
                }
            }
        },
        Err(errors) => {
            report_field_errors(&errors, output, quiet);
            process::exit(1);
        }
    }
}

fn cmd_generate(file: &Path, values: &Path, session_path: &Path, output: OutputFormat, quiet: bool) {
    let (def, _) = load_checked_definition(file, output, quiet);
    let raw = load_raw_values(values, output, quiet);

    let config = match validate_config(&def.inputs, &raw) {
        Ok(config) => config,
        Err(errors) => {
            report_field_errors(&errors, output, quiet);
            process::exit(1);
        }
    };

    let session = Session::generate(def, config);
    save_session(&session, session_path, output, quiet);

    match output {
        OutputFormat::Json => print_rows_json(&session),
        OutputFormat::Text => {
            if !quiet {
                println!(
                    "generated {} workout(s) into {}",
                    session.rows().len(),
                    session_path.display()
                );
            }
        }
    }
}

fn cmd_plan(session_path: &Path, output: OutputFormat, quiet: bool) {
    let session = load_session(session_path, output, quiet);
    match output {
        OutputFormat::Json => print_rows_json(&session),
        OutputFormat::Text => {
            if !quiet {
                print!("{}", render_rows(session.rows()));
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_log(
    session_path: &Path,
    workout: u32,
    slot: &str,
    result: ResultArg,
    amrap: Option<u32>,
    rpe: Option<String>,
    note: Option<String>,
    output: OutputFormat,
    quiet: bool,
) {
    let rpe = rpe.map(|raw| match Decimal::from_str(raw.trim()) {
        Ok(v) => v,
        Err(_) => {
            report_error(&format!("invalid --rpe value '{}'", raw), output, quiet);
            process::exit(2);
        }
    });

    let outcome = Outcome {
        result: match result {
            ResultArg::Success => LiftResult::Success,
            ResultArg::Fail => LiftResult::Fail,
        },
        amrap_reps: amrap,
        rpe,
        note,
    };

    let mut session = load_session(session_path, output, quiet);
    if let Err(e) = session.log_outcome(workout, slot, outcome) {
        report_error(&e.to_string(), output, quiet);
        process::exit(1);
    }
    save_session(&session, session_path, output, quiet);
    print_workout(&session, workout, output, quiet);
}

fn cmd_undo(
    session_path: &Path,
    workout: Option<u32>,
    slot: Option<&str>,
    output: OutputFormat,
    quiet: bool,
) {
    let mut session = load_session(session_path, output, quiet);
    let result = match (workout, slot) {
        (Some(workout), Some(slot)) => session.undo_specific(workout, slot),
        _ => session.undo_last(),
    };
    if let Err(e) = result {
        report_error(&e.to_string(), output, quiet);
        process::exit(1);
    }
    save_session(&session, session_path, output, quiet);
    match output {
        OutputFormat::Json => print_rows_json(&session),
        OutputFormat::Text => {
            if !quiet {
                println!("undone ({} undo entr(ies) left)", session.undo_entries().len());
            }
        }
    }
}

fn cmd_reset(session_path: &Path, output: OutputFormat, quiet: bool) {
    let mut session = load_session(session_path, output, quiet);
    session.reset_all();
    save_session(&session, session_path, output, quiet);
    match output {
        OutputFormat::Json => print_rows_json(&session),
        OutputFormat::Text => {
            if !quiet {
                println!("reset to seeded state");
            }
        }
    }
}

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

/// Content fingerprint of a definition document: sha256 over the
/// canonical serialization.
fn compute_fingerprint(doc: &serde_json::Value) -> String {
    let canonical = serde_json::to_string(doc).unwrap_or_default();
    let hash = Sha256::digest(canonical.as_bytes());
    format!("sha256:{:x}", hash)
}

fn load_definition(
    file: &Path,
    output: OutputFormat,
    quiet: bool,
) -> (ProgramDefinition, serde_json::Value) {
    let src = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            report_error(
                &format!("error reading file '{}': {}", file.display(), e),
                output,
                quiet,
            );
            process::exit(2);
        }
    };
    let raw: serde_json::Value = match serde_json::from_str(&src) {
        Ok(v) => v,
        Err(e) => {
            report_error(
                &format!("error parsing JSON in '{}': {}", file.display(), e),
                output,
                quiet,
            );
            process::exit(2);
        }
    };
    match ProgramDefinition::from_json(&src) {
        Ok(def) => (def, raw),
        Err(e) => {
            report_error(
                &format!("error parsing definition '{}': {}", file.display(), e),
                output,
                quiet,
            );
            process::exit(2);
        }
    }
}

/// Load a definition and require it to pass validation.
fn load_checked_definition(
    file: &Path,
    output: OutputFormat,
    quiet: bool,
) -> (ProgramDefinition, serde_json::Value) {
    let (def, raw) = load_definition(file, output, quiet);
    let errors = validate_definition(&def);
    if !errors.is_empty() {
        for e in &errors {
            report_error(&e.to_string(), output, quiet);
        }
        process::exit(1);
    }
    (def, raw)
}

fn load_raw_values(path: &Path, output: OutputFormat, quiet: bool) -> BTreeMap<String, String> {
    let src = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            report_error(
                &format!("error reading values '{}': {}", path.display(), e),
                output,
                quiet,
            );
            process::exit(2);
        }
    };
    match serde_json::from_str(&src) {
        Ok(map) => map,
        Err(e) => {
            report_error(
                &format!("error parsing values '{}': {}", path.display(), e),
                output,
                quiet,
            );
            process::exit(2);
        }
    }
}

fn load_session(path: &Path, output: OutputFormat, quiet: bool) -> Session {
    match SessionFile::load(path) {
        Ok(doc) => doc.into_session(),
        Err(e) => {
            report_error(&e, output, quiet);
            process::exit(2);
        }
    }
}

fn save_session(session: &Session, path: &Path, output: OutputFormat, quiet: bool) {
    if let Err(e) = SessionFile::from_session(session).save(path) {
        report_error(&e, output, quiet);
        process::exit(2);
    }
}

fn print_rows_json(session: &Session) {
    println!(
        "{}",
        serde_json::to_string_pretty(session.rows()).unwrap_or_default()
    );
}

fn print_workout(session: &Session, workout: u32, output: OutputFormat, quiet: bool) {
    match output {
        OutputFormat::Json => print_rows_json(session),
        OutputFormat::Text => {
            if !quiet {
                if let Some(row) = session.rows().iter().find(|r| r.index == workout) {
                    print!("{}", render_rows(std::slice::from_ref(row)));
                }
            }
        }
    }
}

fn report_field_errors(
    errors: &cadence_engine::FieldErrors,
    output: OutputFormat,
    quiet: bool,
) {
    match output {
        OutputFormat::Json => {
            eprintln!(
                "{}",
                serde_json::to_string_pretty(errors).unwrap_or_default()
            );
        }
        OutputFormat::Text => {
            if !quiet {
                for (key, error) in errors {
                    eprintln!("{}: {}", key, error);
                }
            }
        }
    }
}

fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{{\"error\": \"{}\"}}", msg.replace('"', "\\\""));
        }
    }
}
