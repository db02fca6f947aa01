//! Shared output layer for pretty/text/JSON parity across all commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its result
//! accordingly: aligned sections for humans, tab-separated rows for pipes,
//! or stable JSON.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format`
//! 2. `CHAINSTAT_FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.

use std::io::{self, IsTerminal, Write};

use chainstat_metrics::{Cell, MetricsTable};
use clap::ValueEnum;
use serde::Serialize;

/// Shared width for pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Decimal places for floats in pretty and text output.
pub const FLOAT_PRECISION: usize = 6;

/// Write a horizontal separator used by pretty output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line, padding keys to `width`.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>, width: usize) -> io::Result<()> {
    writeln!(w, "{:<width$} {}", format!("{key}:"), value.as_ref(), width = width + 1)
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (sections, aligned values).
    Pretty,
    /// Tab-separated plain text for pipes and scripts.
    Text,
    /// Machine-readable JSON.
    Json,
}

fn resolve_output_mode_inner(
    format_flag: Option<OutputMode>,
    format_env: Option<&str>,
    is_tty: bool,
) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }

    if let Some(val) = format_env {
        match val.to_lowercase().as_str() {
            "json" => return OutputMode::Json,
            "text" => return OutputMode::Text,
            "pretty" => return OutputMode::Pretty,
            _ => {} // unknown value: fall through to TTY detection
        }
    }

    if is_tty {
        OutputMode::Pretty
    } else {
        OutputMode::Text
    }
}

/// Resolve the output mode from the `--format` flag, environment, and TTY.
pub fn resolve_output_mode(format_flag: Option<OutputMode>) -> OutputMode {
    let env_val = std::env::var("CHAINSTAT_FORMAT").ok();
    let is_tty = io::stdout().is_terminal();
    resolve_output_mode_inner(format_flag, env_val.as_deref(), is_tty)
}

/// Render a serializable value with explicit pretty/text renderers.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, &mut out)?,
        OutputMode::Pretty => pretty_fn(value, &mut out)?,
    }
    Ok(())
}

/// Render a serializable value; pretty and text share `human_fn`.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => human_fn(value, &mut out)?,
    }
    Ok(())
}

/// Format one cell for human output.
pub fn format_cell(cell: &Cell) -> String {
    format!("{cell:.prec$}", prec = FLOAT_PRECISION)
}

/// Write a table as tab-separated rows with a header line.
pub fn write_table_text(table: &MetricsTable, w: &mut dyn Write) -> io::Result<()> {
    write!(w, "name")?;
    for column in table.columns() {
        write!(w, "\t{column}")?;
    }
    writeln!(w)?;
    for row in table.rows() {
        write!(w, "{}", row.name)?;
        for cell in &row.cells {
            write!(w, "\t{}", format_cell(cell))?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Write a table as one key/value block per row.
pub fn write_table_pretty(table: &MetricsTable, w: &mut dyn Write) -> io::Result<()> {
    let width = table.columns().iter().map(String::len).max().unwrap_or(0);
    for (i, row) in table.rows().iter().enumerate() {
        if i > 0 {
            writeln!(w)?;
        }
        pretty_section(w, &row.name)?;
        for (column, cell) in table.columns().iter().zip(&row.cells) {
            pretty_kv(w, column, format_cell(cell), width)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_wins_over_env_and_tty() {
        let mode = resolve_output_mode_inner(Some(OutputMode::Text), Some("json"), true);
        assert_eq!(mode, OutputMode::Text);
    }

    #[test]
    fn env_wins_over_tty() {
        assert_eq!(
            resolve_output_mode_inner(None, Some("JSON"), true),
            OutputMode::Json
        );
    }

    #[test]
    fn unknown_env_falls_through() {
        assert_eq!(
            resolve_output_mode_inner(None, Some("yaml"), false),
            OutputMode::Text
        );
        assert_eq!(
            resolve_output_mode_inner(None, None, true),
            OutputMode::Pretty
        );
    }

    fn table() -> MetricsTable {
        let mut table = MetricsTable::new(["nodes", "density"]);
        table.push_row("science", vec![Cell::Int(3), Cell::Float(1.0 / 3.0)]);
        table.push_row("pics", vec![Cell::Int(2), Cell::Null]);
        table
    }

    #[test]
    fn text_table_is_tab_separated() {
        let mut out = Vec::new();
        write_table_text(&table(), &mut out).expect("render");
        let rendered = String::from_utf8(out).expect("utf8");
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "name\tnodes\tdensity");
        assert_eq!(lines[1], "science\t3\t0.333333");
        assert_eq!(lines[2], "pics\t2\t-");
    }

    #[test]
    fn pretty_table_has_one_section_per_row() {
        let mut out = Vec::new();
        write_table_pretty(&table(), &mut out).expect("render");
        let rendered = String::from_utf8(out).expect("utf8");
        assert!(rendered.contains("science\n"));
        assert!(rendered.contains("density: 0.333333"));
        assert!(rendered.contains("pics\n"));
    }
}
