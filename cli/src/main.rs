mod shell;

use std::io::{self, IsTerminal, Read, Write};

use clap::{Args, Parser, Subcommand, ValueEnum};
use orgchart::tabular::{TabularError, export_csv, export_json, import_csv};
use orgchart::{DiagramOptions, Direction, Hierarchy, IdentifierPolicy, Outcome, apply, compile_with};

use crate::shell::{Shell, feedback};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: String, source: io::Error },
    #[error("{0}")]
    Tabular(#[from] TabularError),
    #[error("command not recognized: `{command}`: {reason}")]
    Unrecognized { command: String, reason: orgchart::ParseError },
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "orgchart", about = "Edit an org chart with plain-text commands and render it as Mermaid")]
struct Cli {
    /// Log level for diagnostics written to stderr.
    #[arg(long, env = "ORGCHART_LOG_LEVEL", default_value = "warn")]
    log_level: tracing::Level,

    /// Flowchart direction: TD, TB, BT, LR, or RL.
    #[arg(long, env = "ORGCHART_DIRECTION", default_value = "TD")]
    direction: Direction,

    /// Give colliding node identifiers numeric suffixes instead of merging them.
    #[arg(long, env = "ORGCHART_DISAMBIGUATE", default_value_t = false)]
    disambiguate: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Apply commands to a chart and print the result.
    Render(RenderArgs),
    /// Edit a chart interactively, one command per line.
    Shell(ShellArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[arg(long, short, help = "CSV file (Name,Title,ReportsTo), or - for stdin")]
    input: Option<String>,

    #[arg(long = "command", short = 'c', help = "Command to apply; repeat to apply several in order")]
    commands: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Mermaid)]
    format: OutputFormat,

    #[arg(long, short, help = "Also write the resulting CSV to this file")]
    output: Option<String>,

    #[arg(long, default_value_t = false, help = "Fail on the first unrecognized command")]
    strict: bool,
}

#[derive(Args, Debug)]
struct ShellArgs {
    #[arg(long, short, help = "CSV file to load at start")]
    input: Option<String>,

    #[arg(long, default_value_t = false, help = "Print the diagram after every edit")]
    live: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Mermaid,
    Csv,
    Json,
    All,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(io::stderr)
        .init();

    let options = DiagramOptions {
        direction: cli.direction,
        identifiers: if cli.disambiguate { IdentifierPolicy::Disambiguate } else { IdentifierPolicy::Merge },
    };

    match cli.command {
        CliCommand::Render(args) => run_render(&args, &options),
        CliCommand::Shell(args) => run_shell(&args, options),
    }
}

fn run_render(args: &RenderArgs, options: &DiagramOptions) -> Result<(), CliError> {
    let mut hierarchy = Hierarchy::new();
    if let Some(path) = &args.input {
        import_csv(&mut hierarchy, &read_input(path)?)?;
    }

    for command in &args.commands {
        let outcome = apply(&mut hierarchy, command);
        if let Outcome::Unrecognized(reason) = &outcome {
            if args.strict {
                return Err(CliError::Unrecognized { command: command.clone(), reason: reason.clone() });
            }
        }
        eprintln!("{command}: {}", feedback(&outcome));
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_render(&hierarchy, args.format, options, &mut out)?;

    if let Some(path) = &args.output {
        std::fs::write(path, export_csv(&hierarchy)?)
            .map_err(|source| CliError::Write { path: path.clone(), source })?;
        tracing::info!(path = %path, records = hierarchy.len(), "chart written");
    }
    Ok(())
}

fn write_render<W: Write>(
    hierarchy: &Hierarchy,
    format: OutputFormat,
    options: &DiagramOptions,
    out: &mut W,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Mermaid => writeln!(out, "{}", compile_with(hierarchy, options))?,
        OutputFormat::Csv => write!(out, "{}", export_csv(hierarchy)?)?,
        OutputFormat::Json => writeln!(out, "{}", export_json(hierarchy)?)?,
        OutputFormat::All => {
            writeln!(out, "{}", compile_with(hierarchy, options))?;
            writeln!(out)?;
            write!(out, "{}", export_csv(hierarchy)?)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn run_shell(args: &ShellArgs, options: DiagramOptions) -> Result<(), CliError> {
    let mut hierarchy = Hierarchy::new();
    if let Some(path) = &args.input {
        import_csv(&mut hierarchy, &read_input(path)?)?;
    }

    let stdin = io::stdin();
    let mut shell = Shell::new(hierarchy, options);
    shell.live = args.live;
    shell.prompt = stdin.is_terminal();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    shell.run(stdin.lock(), &mut out)
}

/// Read a file, or stdin when `path` is `-`.
fn read_input(path: &str) -> Result<String, CliError> {
    if path == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|source| CliError::Read { path: "stdin".to_owned(), source })?;
        return Ok(text);
    }
    std::fs::read_to_string(path).map_err(|source| CliError::Read { path: path.to_owned(), source })
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
