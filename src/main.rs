/*!
 * Command-line interface for aktool
 */

use std::fs;
use std::io;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};

use aktool::config::{Args, Command, Session};
use aktool::copy_rules::copy_saved_file;
use aktool::error::{AppError, Result};
use aktool::prompt::{AssumeYes, ConflictResolver, TerminalPrompt};
use aktool::rebuild::{rebuild_from_structure, RebuildOptions};
use aktool::report::Reporter;
use aktool::samples::example_document;
use aktool::writer::{generate_structure, GenerateOptions};

fn main() {
    let args = Args::parse();
    setup_logging(args.quiet, args.verbose);

    let exit_code = match run(args) {
        Ok(()) => 0,
        Err(e) => {
            log::error!("{}", e);
            e.exit_code()
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Error
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn progress_bar() -> Result<ProgressBar> {
    let progress = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos}/{len} ({percent}%) ⏱️  Elapsed: {elapsed_precise}")
        .map_err(|e| AppError::Unexpected(format!("Invalid progress template: {}", e)))?;
    progress.set_style(style);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress.set_prefix("📊 Rebuilding");
    Ok(progress)
}

fn run(args: Args) -> Result<()> {
    let session = Session::from_args(&args)?;
    let reporter = Reporter::new();

    match args.command {
        Command::Generate {
            code,
            structure_out,
            code_out,
        } => {
            log::debug!("Executing 'generate' command...");
            let mut options = GenerateOptions::new(&session, code);
            if let Some(path) = structure_out {
                options.structure_out = session.resolve(&path);
            }
            if let Some(path) = code_out {
                options.code_out = session.resolve(&path);
            }

            let report = generate_structure(&session, &options)?;
            println!("\n{}", reporter.generate_report(&report));
        }

        Command::Rebuild {
            from,
            from_code,
            to,
            no_structure,
            no_code,
            yes,
        } => {
            log::debug!("Executing 'rebuild' command...");
            aktool::ensure!(
                !(no_structure && no_code),
                InvalidArgument,
                "Nothing to do: both --no-structure and --no-code given"
            );
            let options = RebuildOptions {
                from,
                from_code,
                to,
                apply_structure: !no_structure,
                apply_code: !no_code,
            };

            let mut resolver: Box<dyn ConflictResolver> = if yes {
                Box::new(AssumeYes)
            } else {
                Box::new(TerminalPrompt)
            };
            let progress = Arc::new(progress_bar()?);
            let result = rebuild_from_structure(&session, &options, resolver.as_mut(), progress.clone());
            progress.finish_and_clear();

            println!("\n{}", reporter.rebuild_report(&result?));
        }

        Command::Init { force } => {
            log::debug!("Executing 'init' command...");
            let path = session.config_file();
            aktool::ensure!(
                force || !path.exists(),
                InvalidArgument,
                "{} already exists (use --force to replace it)",
                path.display()
            );
            let content = serde_json::to_string_pretty(&example_document())?;
            fs::write(path, content).map_err(|e| AppError::write(path, e))?;
            println!("Example configuration written to {}", path.display());
        }

        Command::Copy { file } => {
            log::debug!("Executing 'copy' command...");
            let report = copy_saved_file(&session, &file)?;
            println!("\n{}", reporter.copy_report(&report));
        }

        Command::Completions { shell } => {
            log::debug!("Executing 'completions' command...");
            let mut command = Args::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut io::stdout());
        }
    }

    Ok(())
}
