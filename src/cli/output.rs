//! User-facing output for the `list` and `audit` commands.

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::golden::GoldenAudit;
use crate::scenario::Scenario;

/// Print the catalog as aligned columns: id, golden file, kind.
pub fn print_catalog(scenarios: &[Scenario]) -> io::Result<()> {
    let width = scenarios.iter().map(|s| s.id.len()).max().unwrap_or(0);
    let golden_width = scenarios.iter().map(|s| s.golden.len()).max().unwrap_or(0);
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    for s in scenarios {
        stdout.set_color(ColorSpec::new().set_bold(true))?;
        write!(stdout, "{:<width$}", s.id, width = width)?;
        stdout.reset()?;
        writeln!(
            stdout,
            "  {:<gw$}  {}",
            s.golden,
            s.kind,
            gw = golden_width
        )?;
    }
    Ok(())
}

/// Print orphaned goldens in yellow and missing goldens in red.
pub fn print_audit(audit: &GoldenAudit) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    if audit.is_clean() {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        writeln!(stdout, "Every scenario has a golden file and every golden file is used.")?;
        stdout.reset()?;
        return Ok(());
    }
    for path in &audit.orphaned {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
        write!(stdout, "orphaned")?;
        stdout.reset()?;
        writeln!(stdout, ": {}", path.display())?;
    }
    for path in &audit.missing {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(stdout, "missing")?;
        stdout.reset()?;
        writeln!(stdout, ":  {}", path.display())?;
    }
    Ok(())
}
