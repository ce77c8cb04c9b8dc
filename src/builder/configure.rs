//! `configure.ac` generation from `configure.ac.in`.
//!
//! The template is copied line for line except control lines of the form
//! `<KEYWORD> <COMMAND>`, which are replaced by generated content:
//!
//! ```text
//! AMFORGE_INSERT_HERE AC_CONFIG_FILES
//! ```
//!
//! becomes
//!
//! ```text
//! AC_CONFIG_FILES([ \
//!   src/Core/Makefile \
//!   ./Makefile \
//! ])
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::core::layout::FRAGMENT_FILE;
use crate::core::ReformatError;
use crate::util::fs::{read_to_string, relative_unix, write_string};

/// Template file name, expected at the output root.
pub const TEMPLATE_FILE: &str = "configure.ac.in";

/// Generated file name.
pub const CONFIGURE_FILE: &str = "configure.ac";

/// The only control command the template may use.
pub const AC_CONFIG_FILES: &str = "AC_CONFIG_FILES";

/// Directories under `root` that hold a fragment, deepest first.
///
/// Paths are relative to `root`; the root itself is `.`.
pub fn fragment_dirs(root: &Path) -> Result<Vec<String>> {
    let mut dirs = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name().contents_first(true) {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if !entry.file_type().is_dir() || !entry.path().join(FRAGMENT_FILE).is_file() {
            continue;
        }
        let rel = relative_unix(root, entry.path());
        dirs.push(if rel.is_empty() { ".".to_string() } else { rel });
    }
    Ok(dirs)
}

/// Substitute control lines in `template`.
pub fn render_configure(template: &str, keyword: &str, fragment_dirs: &[String]) -> Result<String> {
    let mut output = String::with_capacity(template.len());

    for (index, line) in template.split_inclusive('\n').enumerate() {
        let mut tokens = line.split_whitespace();
        if tokens.next() != Some(keyword) {
            output.push_str(line);
            continue;
        }

        match tokens.next() {
            Some(AC_CONFIG_FILES) => {
                output.push_str("AC_CONFIG_FILES([ \\\n");
                for dir in fragment_dirs {
                    output.push_str(&format!("  {}/Makefile \\\n", dir));
                }
                output.push_str("])\n");
            }
            other => {
                return Err(ReformatError::UnknownTemplateCommand {
                    line: index + 1,
                    command: other.unwrap_or_default().to_string(),
                }
                .into())
            }
        }
    }

    Ok(output)
}

/// Render `<root>/configure.ac` from `<root>/configure.ac.in`.
///
/// Returns `false` without writing anything when there is no template.
pub fn write_configure(root: &Path, keyword: &str) -> Result<bool> {
    let template_path = root.join(TEMPLATE_FILE);
    if !template_path.is_file() {
        tracing::warn!(
            "no {} in {}, skipping {}",
            TEMPLATE_FILE,
            root.display(),
            CONFIGURE_FILE
        );
        return Ok(false);
    }

    let template = read_to_string(&template_path)?;
    let dirs = fragment_dirs(root)?;
    let rendered = render_configure(&template, keyword, &dirs)?;
    write_string(&root.join(CONFIGURE_FILE), &rendered)?;
    tracing::info!("wrote {} with {} build files", CONFIGURE_FILE, dirs.len());
    Ok(true)
}
