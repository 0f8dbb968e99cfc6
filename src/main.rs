use anyhow::{bail, Context, Result};
use benchreport::cli::{Cli, Command};
use benchreport::definition::ReportDefinition;
use benchreport::render::{self, OutputFormat};
use benchreport::report::Report;
use benchreport::table::TrialTable;
use benchreport::variants::{grouped, learning, preprocessing};
use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the stderr subscriber
///
/// Warnings are always shown; `--debug` enables everything. `RUST_LOG`
/// overrides both.
fn init_tracing(debug: bool) {
    let default = if debug { "trace" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(path: &Path) -> Result<TrialTable> {
    TrialTable::from_path(path).with_context(|| format!("Failed to load {}", path.display()))
}

/// Report plus where it goes by default
struct Built {
    report: Report,
    subdirectory: String,
    format: OutputFormat,
}

fn build_grouped(
    definition: ReportDefinition,
    input: &Path,
    memory: Option<&Path>,
) -> Result<Built> {
    if memory.is_some() && definition.merge.is_none() {
        bail!(
            "--memory given, but report '{}' has no [merge] section",
            definition.name
        );
    }

    let trials = load(input)?;
    let merge_input = memory.map(load).transpose()?;
    let report = grouped::build(&definition, &trials, merge_input.as_ref())?;
    Ok(Built {
        report,
        subdirectory: definition.subdirectory,
        format: definition.format,
    })
}

fn build(command: &Command) -> Result<Built> {
    match command {
        Command::Learning {
            input, time_limit, ..
        } => Ok(Built {
            report: learning::build(&load(input)?, *time_limit)?,
            subdirectory: "figures".to_string(),
            format: OutputFormat::Latex,
        }),
        Command::Preprocessing { input, .. } => Ok(Built {
            report: preprocessing::build(&load(input)?)?,
            subdirectory: "preprocessing".to_string(),
            format: OutputFormat::Latex,
        }),
        Command::Validation {
            memory,
            extended,
            input,
            ..
        } => {
            let preset = if *extended {
                "validation-extended"
            } else {
                "validation"
            };
            build_grouped(ReportDefinition::preset(preset)?, input, memory.as_deref())
        }
        Command::Custom {
            config,
            memory,
            input,
            ..
        } => build_grouped(ReportDefinition::from_file(config)?, input, memory.as_deref()),
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let built = build(&args.command)?;

    let divergences = built.report.divergences.len();
    if divergences > 0 {
        eprintln!(
            "{} group(s) where the cross-validated outputs disagree",
            divergences
        );
    }

    let subdirectory = args.subdir.as_deref().unwrap_or(&built.subdirectory);
    let format = args.format.unwrap_or(built.format);
    let path = render::destination(&args.output_dir, subdirectory, args.command.name(), format);

    render::write_report(&built.report.table, &path, format, args.precision)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("{}", path.display());
    Ok(())
}
