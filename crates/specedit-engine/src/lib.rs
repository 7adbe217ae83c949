//! Editing operations over a lossless RPM spec model.
//!
//! [`SpecEditor`] answers queries such as "which packages require what" and
//! applies edits such as adding a changelog entry, then renders the file
//! back with everything it did not touch unchanged. [`io`] reads and writes
//! spec files, with `-` standing for standard input or output.

pub mod editing;
pub mod io;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use editing::{DependencyKind, NewChangelogEntry, PackageSelector, SpecEditor};
pub use io::{IoError, STDIO_PATH, read_spec, write_spec};
pub use specedit_syntax::{Result, SectionKind, SpecError, StatementKind};
