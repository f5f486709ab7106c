use crate::{compare::RoleComparison, error::Error, persist::DumpPaths, role::ContractRole};
use std::io::{self, Write};

pub const MATCH_MARK: &str = "\u{2705}";
pub const MISMATCH_MARK: &str = "\u{274c}";
pub const ALL_EQUAL: &str = "ALL SOURCES EQUAL";
pub const SEPARATOR: &str = "-------------------------------------------";

pub fn header(out: &mut impl Write, role: ContractRole) -> io::Result<()> {
    writeln!(out, "COMPARING '{role}' CONTRACT")?;
    writeln!(out)
}

/// Prints one mark per compared file followed by the role summary.
pub fn comparison(out: &mut impl Write, comparison: &RoleComparison) -> io::Result<()> {
    for file in &comparison.files {
        let mark = if file.status.is_match() { MATCH_MARK } else { MISMATCH_MARK };
        writeln!(out, "{} {mark}", file.path)?;
    }
    if comparison.is_equal() {
        writeln!(out)?;
        writeln!(out, "{ALL_EQUAL}")?;
    } else {
        writeln!(out, "{} not equal, writing source to files", comparison.role)?;
    }
    Ok(())
}

pub fn written(out: &mut impl Write, paths: &DumpPaths) -> io::Result<()> {
    writeln!(out, "wrote {}", paths.origin.display())?;
    writeln!(out, "wrote {}", paths.fork.display())
}

pub fn failure(out: &mut impl Write, role: ContractRole, error: &Error) -> io::Result<()> {
    writeln!(out, "{role} failed ({}): {error}", error.kind())
}

pub fn separator(out: &mut impl Write) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{SEPARATOR}")?;
    writeln!(out)
}
