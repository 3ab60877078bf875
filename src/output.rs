//! Writing the generated package to disk.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::error::GenerateError;

/// Create the parent directory of `path`, including intermediate directories.
pub fn ensure_parent_dir(path: &Path) -> Result<(), GenerateError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
            debug!(dir = %dir.display(), "Creating output directory");
            fs::create_dir_all(dir).map_err(|err| GenerateError::io(dir, err))
        },
        _ => Ok(()),
    }
}

/// Concatenate fragments in order, one blank line apart.
pub fn join_fragments(fragments: &[String]) -> String {
    let mut out = String::new();
    for (i, fragment) in fragments.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(fragment);
        if !fragment.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

/// Write `fragments` to `path`, creating parent directories and truncating
/// any existing file.
pub fn write_source_file(path: &Path, fragments: &[String]) -> Result<(), GenerateError> {
    ensure_parent_dir(path)?;

    let file = File::create(path).map_err(|err| GenerateError::io(path, err))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(join_fragments(fragments).as_bytes())
        .and_then(|()| writer.flush())
        .map_err(|err| GenerateError::io(path, err))?;

    debug!(path = %path.display(), fragments = fragments.len(), "Wrote source file");
    Ok(())
}
