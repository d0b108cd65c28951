use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Args, LogFormat, Shell, process_servers};
use crate::config::Config;
use crate::errors::VariabilizerError;
use crate::openapi::parse_spec;
use crate::report::{render, GroupReport};
use crate::status::ExitStatus;
use crate::variabilize::{VariabilizationSession, Variabilizer};

/// Source label for servers given with `--server`
const AD_HOC_SOURCE: &str = "--server";

/// Main entry point for the CLI.
///
/// Handles configuration loading, argument parsing and logging setup, then
/// runs the variabilization.
pub fn run(args: Vec<String>) -> ExitStatus {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Failed to load config: {}", e);
            Config::default()
        }
    };

    let merged_args = merge_default_options(args, &config);

    let parsed = match Args::try_parse_from(&merged_args) {
        Ok(args) => args,
        Err(e) => {
            e.print().ok();
            return if e.kind() == clap::error::ErrorKind::DisplayHelp
                || e.kind() == clap::error::ErrorKind::DisplayVersion {
                ExitStatus::Success
            } else {
                ExitStatus::Error
            };
        }
    };

    if let Some(shell) = &parsed.generate_completions {
        generate_completions(shell);
        return ExitStatus::Success;
    }

    init_logging(&parsed);

    let config = match &parsed.config {
        Some(path) => match Config::load_from(path) {
            Ok(config) => config,
            Err(e) => return handle_error(e, parsed.debug),
        },
        None => config,
    };

    let debug = parsed.debug;
    match program(parsed, config) {
        Ok(status) => status,
        Err(e) => handle_error(e, debug),
    }
}

pub fn program(args: Args, config: Config) -> Result<ExitStatus, VariabilizerError> {
    if args.debug {
        eprintln!("Debug: {:?}", args);
        eprintln!("Debug: config dir {}", config.config_dir.display());
        eprintln!("Debug: {:?}", config.variabilizer);
    }

    if args.specs.is_empty() && args.servers.is_empty() {
        eprintln!("usage: apigee-variabilizer [OPTIONS] [SPEC]... [--server [ENV=]URL]...");
        eprintln!("\nFor more information, run: apigee-variabilizer --help");
        return Ok(ExitStatus::Error);
    }

    let start_index = args.start_index.or(config.start_index).unwrap_or(1);
    let variabilizer = Variabilizer::new(config.variabilizer);
    let mut session = VariabilizationSession::new(variabilizer, start_index);
    let mut reports = Vec::with_capacity(args.specs.len() + 1);

    for path in &args.specs {
        let spec = parse_spec(path)?;
        let servers = spec.server_descriptors();
        debug!(spec = %path.display(), servers = servers.len(), "Parsed OpenAPI document");

        if servers.is_empty() {
            warn!(spec = %path.display(), "No servers declared");
        }

        let mut report = GroupReport::from_spec(path.display().to_string(), &spec, session.variabilizer());
        if !args.list {
            report.result = Some(session.variabilize(&servers));
        }
        reports.push(report);
    }

    if !args.servers.is_empty() {
        let servers = process_servers(&args.servers)?;
        let mut report = GroupReport::new(AD_HOC_SOURCE, &servers, session.variabilizer());
        if !args.list {
            report.result = Some(session.variabilize(&servers));
        }
        reports.push(report);
    }

    let rendered = render(&reports, args.format)?;

    if let Some(ref output_path) = args.output {
        std::fs::write(output_path, &rendered)?;
        eprintln!("Report written to: {}", output_path.display());
        eprintln!("  Groups: {}", reports.len());
        match session.next_index() {
            Some(index) => eprintln!("  Next KVM index: {}", index),
            None => eprintln!("  Next KVM index: exhausted"),
        }
    } else {
        print!("{}", rendered);
    }

    Ok(ExitStatus::Success)
}

/// Install the tracing subscriber on stderr.
///
/// `RUST_LOG` wins when set; otherwise `-v` selects info and `-vv` debug.
fn init_logging(args: &Args) {
    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("apigee_variabilizer={}", level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let _ = match args.log_format.unwrap_or_default() {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

fn merge_default_options(args: Vec<String>, config: &Config) -> Vec<String> {
    if config.default_options.is_empty() {
        return args;
    }

    // A bare value directly after a `--flag` (without `=`) is that flag's value
    let mut flags = Vec::new();
    let mut positional = Vec::new();
    let mut expects_value = false;
    for opt in &config.default_options {
        if opt.starts_with('-') {
            flags.push(opt);
            expects_value = !opt.contains('=');
        } else if expects_value {
            flags.push(opt);
            expects_value = false;
        } else {
            positional.push(opt);
        }
    }

    if !positional.is_empty() {
        eprintln!("\x1b[33mWarning: Positional arguments in default_options are ignored: {:?}\x1b[0m", positional);
        eprintln!("Only flags (starting with -) can be used in default_options.");
    }

    if flags.is_empty() {
        return args;
    }

    let mut merged = Vec::with_capacity(args.len() + flags.len());

    if let Some(program) = args.first() {
        merged.push(program.clone());
    }

    merged.extend(flags.into_iter().cloned());
    merged.extend(args.into_iter().skip(1));

    merged
}

fn handle_error(error: VariabilizerError, debug: bool) -> ExitStatus {
    if debug {
        eprintln!("Error: {:?}", error);
    } else {
        eprintln!("Error: {}", error);
    }

    ExitStatus::Error
}

fn generate_completions(shell: &Shell) {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as ClapShell};

    let mut cmd = Args::command();
    let shell = match shell {
        Shell::Bash => ClapShell::Bash,
        Shell::Zsh => ClapShell::Zsh,
        Shell::Fish => ClapShell::Fish,
        Shell::PowerShell => ClapShell::PowerShell,
        Shell::Elvish => ClapShell::Elvish,
    };

    generate(shell, &mut cmd, "apigee-variabilizer", &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_merge_default_options() {
        let mut config = Config::default();
        config.default_options = args(&["--format", "yaml", "--start-index=3", "ignored.json"]);

        let merged = merge_default_options(args(&["apigee-variabilizer", "spec.json"]), &config);
        assert_eq!(
            merged,
            args(&["apigee-variabilizer", "--format", "yaml", "--start-index=3", "spec.json"])
        );
    }

    #[test]
    fn test_merge_without_defaults_is_noop() {
        let original = args(&["apigee-variabilizer", "spec.json"]);
        assert_eq!(merge_default_options(original.clone(), &Config::default()), original);
    }

    #[test]
    fn test_program_without_inputs_is_usage_error() {
        let status = program(Args::default(), Config::default()).unwrap();
        assert_eq!(status, ExitStatus::Error);
    }

    #[test]
    fn test_program_missing_spec_is_error() {
        let parsed = Args {
            specs: vec![PathBuf::from("/nonexistent/spec.yaml")],
            ..Default::default()
        };
        assert!(program(parsed, Config::default()).is_err());
    }
}
