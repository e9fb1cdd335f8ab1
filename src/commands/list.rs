use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use glob::Pattern;

use crate::{bundle_fs::FS, commands::matches_any};

/// List packed paths matching a glob pattern
pub fn list_files(file_system: &FS, patterns: &[Pattern]) -> Result<()> {
    let mut stdout = BufWriter::new(io::stdout().lock());

    file_system
        .list()
        .filter(|path| matches_any(patterns, path))
        .try_for_each(|p| writeln!(stdout, "{}", p).context("Failed to write to stdout"))?;

    stdout.flush().context("Failed to flush stdout")
}
