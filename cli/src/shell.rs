//! Line-oriented editing session.
//!
//! DESIGN
//! ======
//! The shell owns the session's [`Hierarchy`] for its whole lifetime: empty
//! (or loaded from `--input`) at start, replaced by `:load`, edited by plain
//! command lines, dropped on `:quit` or end of input. Every line produces
//! feedback; nothing a user types ends the session with an error except a
//! failure to write to the output stream.

use std::io::{BufRead, Write};

use orgchart::command::{Command, Outcome};
use orgchart::tabular::{export_csv, import_csv};
use orgchart::{DiagramOptions, Hierarchy, apply, compile_with};

use crate::CliError;

const HELP: &str = "\
Commands:
  Move <name> under <manager>
  Add <name> as <title> reporting to <manager>
  Remove <name>

Shell commands:
  :load <file>   replace the chart with a CSV file (Name,Title,ReportsTo)
  :save <file>   write the chart as CSV
  :mermaid       print the Mermaid diagram
  :csv           print the chart as CSV
  :list          list employees with their managers
  :help          show this help
  :quit          leave the shell";

/// Session state owned by the shell.
pub struct Shell {
    pub hierarchy: Hierarchy,
    pub options: DiagramOptions,
    /// Print the diagram after every edit that changed the chart.
    pub live: bool,
    /// Print a `> ` prompt before reading each line.
    pub prompt: bool,
}

/// Whether the session should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

impl Shell {
    #[must_use]
    pub fn new(hierarchy: Hierarchy, options: DiagramOptions) -> Self {
        Self { hierarchy, options, live: false, prompt: false }
    }

    /// Read lines from `input` until `:quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns `Io` if reading input or writing output fails.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<(), CliError> {
        self.show_prompt(out)?;
        for line in input.lines() {
            let line = line?;
            if self.handle_line(line.trim(), out)? == Flow::Quit {
                break;
            }
            self.show_prompt(out)?;
        }
        out.flush()?;
        Ok(())
    }

    fn show_prompt<W: Write>(&self, out: &mut W) -> Result<(), CliError> {
        if self.prompt {
            write!(out, "> ")?;
            out.flush()?;
        }
        Ok(())
    }

    fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow, CliError> {
        if line.is_empty() {
            return Ok(Flow::Continue);
        }
        if let Some(meta) = line.strip_prefix(':') {
            return self.handle_meta(meta.trim(), out);
        }

        let outcome = apply(&mut self.hierarchy, line);
        writeln!(out, "{}", feedback(&outcome))?;
        if self.live && outcome.affected() > 0 {
            writeln!(out, "{}", compile_with(&self.hierarchy, &self.options))?;
        }
        Ok(Flow::Continue)
    }

    fn handle_meta<W: Write>(&mut self, meta: &str, out: &mut W) -> Result<Flow, CliError> {
        let (name, arg) = meta
            .split_once(char::is_whitespace)
            .map_or((meta, ""), |(n, a)| (n, a.trim()));

        match name {
            "q" | "quit" | "exit" => return Ok(Flow::Quit),
            "h" | "help" => writeln!(out, "{HELP}")?,
            "mermaid" | "diagram" => writeln!(out, "{}", compile_with(&self.hierarchy, &self.options))?,
            "csv" => match export_csv(&self.hierarchy) {
                Ok(text) => write!(out, "{text}")?,
                Err(e) => writeln!(out, "Error exporting CSV: {e}")?,
            },
            "list" => self.list(out)?,
            "load" if !arg.is_empty() => self.load(arg, out)?,
            "save" if !arg.is_empty() => self.save(arg, out)?,
            "load" | "save" => writeln!(out, "Usage: :{name} <file>")?,
            other => writeln!(out, "Unknown shell command `:{other}`; try :help")?,
        }
        Ok(Flow::Continue)
    }

    fn list<W: Write>(&self, out: &mut W) -> Result<(), CliError> {
        if self.hierarchy.is_empty() {
            writeln!(out, "(no employees)")?;
            return Ok(());
        }
        for record in self.hierarchy.all() {
            match record.manager() {
                Some(manager) => writeln!(out, "{} ({}) -> {manager}", record.name, record.title)?,
                None => writeln!(out, "{} ({})", record.name, record.title)?,
            }
        }
        Ok(())
    }

    fn load<W: Write>(&mut self, path: &str, out: &mut W) -> Result<(), CliError> {
        let result = std::fs::read_to_string(path)
            .map_err(|source| CliError::Read { path: path.to_owned(), source })
            .and_then(|text| import_csv(&mut self.hierarchy, &text).map_err(CliError::from));
        match result {
            Ok(count) => writeln!(out, "Chart loaded successfully ({count} employees).")?,
            Err(e) => writeln!(out, "Error loading CSV: {e}")?,
        }
        Ok(())
    }

    fn save<W: Write>(&self, path: &str, out: &mut W) -> Result<(), CliError> {
        let result = export_csv(&self.hierarchy)
            .map_err(CliError::from)
            .and_then(|text| {
                std::fs::write(path, text).map_err(|source| CliError::Write { path: path.to_owned(), source })
            });
        match result {
            Ok(()) => writeln!(out, "Saved {} employees to {path}.", self.hierarchy.len())?,
            Err(e) => writeln!(out, "Error saving CSV: {e}")?,
        }
        Ok(())
    }
}

/// One-line user feedback for an applied command.
#[must_use]
pub fn feedback(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Unrecognized(e) => format!("Command not recognized: {e}."),
        Outcome::Applied { command, affected, ambiguous } => {
            let mut message = describe(command, *affected);
            if *ambiguous {
                message.push_str(" (ambiguous command: split on the last keyword)");
            }
            message
        }
    }
}

fn describe(command: &Command, affected: usize) -> String {
    match command {
        Command::Add { name, .. } => format!("Added {name}."),
        Command::Move { name, .. } | Command::Remove { name } if affected == 0 => {
            format!("No employee named '{name}'; nothing changed.")
        }
        Command::Move { manager, .. } => format!("Moved {affected} {} under {manager}.", plural(affected)),
        Command::Remove { .. } => format!("Removed {affected} {}.", plural(affected)),
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "employee" } else { "employees" }
}

#[cfg(test)]
#[path = "shell_test.rs"]
mod tests;
