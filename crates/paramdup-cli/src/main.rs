//! paramdup CLI - command line interface for the parameter duplication pass

mod logging;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{error, info};

use paramdup_batch::{run, BatchConfig, ExecutionMode};
use paramdup_parser::ParseError;
use paramdup_rewrite::{transform_source, SelectionPolicy, TransformError};

use logging::{init_logging, LogOptions};

/// Exit status for configuration errors and other aborting failures
const EXIT_FATAL: i32 = 1;
/// Exit status for runs where at least one file failed
const EXIT_FILE_FAILURES: i32 = 2;

#[derive(Parser)]
#[command(name = "paramdup")]
#[command(about = "Duplicate method parameters across a C# source tree", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Also append plain log lines to this file
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform every .cs file under INPUT into OUTPUT
    Run {
        /// Input root directory
        input: PathBuf,
        /// Output root directory
        output: PathBuf,
        /// Duplicate every parameter of methods with one or more parameters
        #[arg(long)]
        all_params: bool,
        /// Process one file at a time
        #[arg(long, conflicts_with = "jobs")]
        sequential: bool,
        /// Number of worker threads
        #[arg(short, long, value_name = "N")]
        jobs: Option<usize>,
        /// Create the output root if it does not exist
        #[arg(long)]
        create_output: bool,
        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Transform a single file and print the result
    Preview {
        /// Input file
        file: PathBuf,
        /// Duplicate every parameter of methods with one or more parameters
        #[arg(long)]
        all_params: bool,
    },
    /// Write a sample class covering the supported parameter shapes
    Generate {
        /// Directory to write into
        output_dir: PathBuf,
        /// Name of the generated class and file
        #[arg(long, default_value = "GeneratedTests")]
        class_name: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_options = LogOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        log_file: cli.log_file.clone(),
        no_color: cli.no_color,
    };
    if let Err(e) = init_logging(&log_options) {
        eprintln!("Error opening log file: {}", e);
        process::exit(EXIT_FATAL);
    }

    match cli.command {
        Commands::Run {
            input,
            output,
            all_params,
            sequential,
            jobs,
            create_output,
            json,
        } => {
            let mut config = BatchConfig::new(input, output).with_policy(policy(all_params));
            if sequential {
                config = config.with_mode(ExecutionMode::Sequential);
            } else if let Some(jobs) = jobs {
                config = config.with_workers(jobs);
            }
            cmd_run(&config, create_output, json)
        }
        Commands::Preview { file, all_params } => cmd_preview(&file, policy(all_params), cli.no_color),
        Commands::Generate {
            output_dir,
            class_name,
        } => cmd_generate(&output_dir, &class_name),
    }
}

fn policy(all_params: bool) -> SelectionPolicy {
    if all_params {
        SelectionPolicy::All
    } else {
        SelectionPolicy::ExactlyOne
    }
}

fn fatal(message: impl std::fmt::Display) -> ! {
    error!(fatal = true, "{}", message);
    process::exit(EXIT_FATAL);
}

fn cmd_run(config: &BatchConfig, create_output: bool, json: bool) {
    if create_output {
        if let Err(e) = fs::create_dir_all(&config.output_root) {
            fatal(format!("cannot create {}: {}", config.output_root.display(), e));
        }
    }

    let metrics = match run(config) {
        Ok(metrics) => metrics,
        Err(e) => fatal(e),
    };

    if json {
        match serde_json::to_string_pretty(&metrics) {
            Ok(text) => println!("{}", text),
            Err(e) => fatal(e),
        }
    } else {
        println!("{}", metrics);
    }

    if metrics.has_failures() {
        process::exit(EXIT_FILE_FAILURES);
    }
}

fn cmd_preview(file: &Path, policy: SelectionPolicy, no_color: bool) {
    let source = match fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => fatal(format!("cannot read {}: {}", file.display(), e)),
    };

    match transform_source(Some(file), &source, policy) {
        Ok(out) => {
            print!("{}", out.text);
            info!(
                processed = out.metrics.declarations_processed,
                skipped = out.metrics.declarations_skipped,
                duplicated = out.metrics.parameters_duplicated,
                "preview of {}",
                file.display()
            );
        }
        Err(TransformError::Parse(e)) => {
            report_parse_error(&source, file, &e, no_color);
            process::exit(EXIT_FATAL);
        }
        Err(e) => fatal(e),
    }
}

fn cmd_generate(output_dir: &Path, class_name: &str) {
    if let Err(e) = fs::create_dir_all(output_dir) {
        fatal(format!("cannot create {}: {}", output_dir.display(), e));
    }
    match paramdup_samples::write_sample(output_dir, class_name) {
        Ok(path) => info!("file: {}", path.display()),
        Err(e) => fatal(format!("cannot write sample: {}", e)),
    }
}

fn report_parse_error(source: &str, file: &Path, error: &ParseError, no_color: bool) {
    let name = file.to_string_lossy().to_string();
    let span = error.span();
    let result = Report::build(ReportKind::Error, name.clone(), span.start)
        .with_config(Config::default().with_color(!no_color))
        .with_message(error.to_string())
        .with_label(
            Label::new((name.clone(), span.start..span.end))
                .with_message(error.to_string())
                .with_color(Color::Red),
        )
        .finish()
        .eprint((name, Source::from(source)));
    if let Err(e) = result {
        error!("{}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_arguments() {
        let cli = Cli::parse_from(["paramdup", "-vv", "run", "in", "out", "--all-params", "--jobs", "3"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run {
                input,
                output,
                all_params,
                sequential,
                jobs,
                ..
            } => {
                assert_eq!(input, PathBuf::from("in"));
                assert_eq!(output, PathBuf::from("out"));
                assert!(all_params);
                assert!(!sequential);
                assert_eq!(jobs, Some(3));
            }
            _ => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_sequential_conflicts_with_jobs() {
        let result = Cli::try_parse_from(["paramdup", "run", "in", "out", "--sequential", "--jobs", "2"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_generate_default_class_name() {
        let cli = Cli::parse_from(["paramdup", "--no-color", "generate", "fixtures"]);
        assert!(cli.no_color);
        match cli.command {
            Commands::Generate { output_dir, class_name } => {
                assert_eq!(output_dir, PathBuf::from("fixtures"));
                assert_eq!(class_name, "GeneratedTests");
            }
            _ => panic!("Expected generate command"),
        }
    }
}
