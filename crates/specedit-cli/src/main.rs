//! specedit
//!
//! Query and edit RPM spec files. Every command parses the whole file and
//! prints it back, so whatever a command does not edit stays byte-for-byte
//! the same.

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use specedit_config::Config;
use specedit_engine::{
    DependencyKind, NewChangelogEntry, PackageSelector, STDIO_PATH, SpecEditor, StatementKind,
    read_spec, write_spec,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "specedit")]
#[command(version)]
#[command(about = "Query and edit RPM spec files without reformatting them")]
#[command(
    long_about = "Query and edit RPM spec files without reformatting them.\n\
Use `-` as the spec path to read standard input.\n\
\n\
Examples:\n  \
specedit show foo.spec build                 # Print the %build section\n  \
specedit deps foo.spec requires -p devel     # List Requires of foo-devel\n  \
specedit changelog-add -i foo.spec -m 'Rebuild'  # Add a changelog entry in place"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, help = "Path to config.toml")]
    config: Option<PathBuf>,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Write edits back to the spec file instead of standard output
    #[arg(short, long, global = true)]
    in_place: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and print the spec unchanged
    Render { spec: PathBuf },

    /// Print every instance of a section
    Show {
        spec: PathBuf,
        /// Section keyword, e.g. build, files, changelog, package
        section: String,
    },

    /// Replace the body of a section
    Edit {
        spec: PathBuf,
        section: String,
        /// Subpackage whose section to edit (`-` for the main package)
        #[arg(short, long)]
        package: Option<String>,
        /// File with the new body (default: standard input)
        #[arg(short, long)]
        with: Option<PathBuf>,
    },

    /// List dependencies as `package:value` lines
    Deps {
        spec: PathBuf,
        kind: DepsKind,
        /// Package to list (`-` main, `*` all); repeatable
        #[arg(short, long)]
        package: Vec<String>,
    },

    /// Add dependencies to a package
    DepsAdd {
        spec: PathBuf,
        kind: DepsKind,
        #[arg(required = true)]
        values: Vec<String>,
        #[arg(short, long, default_value = PackageSelector::MAIN)]
        package: String,
    },

    /// Remove dependencies from a package
    DepsRemove {
        spec: PathBuf,
        kind: DepsKind,
        #[arg(required = true)]
        values: Vec<String>,
        #[arg(short, long, default_value = PackageSelector::MAIN)]
        package: String,
    },

    /// Add a changelog entry as the newest one
    ChangelogAdd {
        spec: PathBuf,
        #[arg(short, long)]
        message: String,
        /// Version-release; defaults to the newest entry's
        #[arg(long)]
        version: Option<String>,
        /// Packager name; defaults to `[packager] name` from the config
        #[arg(long)]
        user: Option<String>,
        /// Packager email; defaults to `[packager] email` from the config
        #[arg(long)]
        email: Option<String>,
        /// Entry date as YYYY-MM-DD; defaults to today
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Add or replace whole sections from a spec fragment
    SectionsAdd {
        spec: PathBuf,
        /// File with the sections (default: standard input)
        #[arg(short, long)]
        with: Option<PathBuf>,
    },

    /// Add subpackages
    PackageAdd {
        spec: PathBuf,
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Remove subpackage `%package` blocks
    PackageRemove {
        spec: PathBuf,
        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DepsKind {
    Provides,
    Requires,
    Buildrequires,
}

impl From<DepsKind> for DependencyKind {
    fn from(kind: DepsKind) -> Self {
        match kind {
            DepsKind::Provides => DependencyKind::Provides,
            DepsKind::Requires => DependencyKind::Requires,
            DepsKind::Buildrequires => DependencyKind::BuildRequires,
        }
    }
}

fn parse_date(text: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    // RUST_LOG, when set, wins over -v
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn section_kind(section: &str) -> Result<StatementKind> {
    StatementKind::from_keyword(section).ok_or_else(|| anyhow!("unknown section '{section}'"))
}

fn open(spec: &Path) -> Result<SpecEditor> {
    let text = read_spec(spec)?;
    SpecEditor::from_text(&text).with_context(|| format!("failed to parse {}", spec.display()))
}

/// Read replacement text from `with`, or from standard input.
fn replacement(spec: &Path, with: Option<&Path>) -> Result<String> {
    let source = with.unwrap_or(Path::new(STDIO_PATH));
    if spec.as_os_str() == STDIO_PATH && source.as_os_str() == STDIO_PATH {
        bail!("the spec and the replacement cannot both come from standard input; use --with");
    }
    Ok(read_spec(source)?)
}

/// Print the edited spec, or write it back with `--in-place`.
fn emit(spec: &Path, editor: &SpecEditor, in_place: bool) -> Result<()> {
    let text = editor.to_text()?;
    if in_place && spec.as_os_str() != STDIO_PATH {
        log::info!("writing {}", spec.display());
        write_spec(spec, &text)?;
    } else {
        write_spec(Path::new(STDIO_PATH), &text)?;
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let loaded = match path {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    if loaded.is_none() {
        log::debug!("no config file, using defaults");
    }
    Ok(loaded.unwrap_or_default())
}

fn items(package: &str, values: Vec<String>) -> Vec<(PackageSelector, String)> {
    values
        .into_iter()
        .map(|value| (PackageSelector::from(package), value))
        .collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Render { spec } => {
            let editor = open(&spec)?;
            emit(&spec, &editor, cli.in_place)?;
        }
        Commands::Show { spec, section } => {
            let kind = section_kind(&section)?;
            let editor = open(&spec)?;
            let mut stdout = io::stdout().lock();
            editor.section_show(kind, &mut stdout)?;
            stdout.flush()?;
        }
        Commands::Edit {
            spec,
            section,
            package,
            with,
        } => {
            let kind = section_kind(&section)?;
            let text = replacement(&spec, with.as_deref())?;
            let mut editor = open(&spec)?;
            match (kind, package.as_deref()) {
                (StatementKind::Section(section), Some(package)) => {
                    editor.section_edit_for(section, Some(package), &text)?
                }
                (_, Some(_)) => bail!("--package only applies to sections such as %files"),
                (kind, None) => editor.section_edit(kind, &text)?,
            }
            emit(&spec, &editor, cli.in_place)?;
        }
        Commands::Deps {
            spec,
            kind,
            package,
        } => {
            let editor = open(&spec)?;
            let selectors: Vec<PackageSelector> =
                package.iter().map(|p| PackageSelector::from(p.as_str())).collect();
            let mut stdout = io::stdout().lock();
            editor.dependencies_show(kind.into(), &selectors, &mut stdout)?;
            stdout.flush()?;
        }
        Commands::DepsAdd {
            spec,
            kind,
            values,
            package,
        } => {
            let mut editor = open(&spec)?;
            editor.dependencies_add(kind.into(), &items(&package, values))?;
            emit(&spec, &editor, cli.in_place)?;
        }
        Commands::DepsRemove {
            spec,
            kind,
            values,
            package,
        } => {
            let mut editor = open(&spec)?;
            editor.dependencies_remove(kind.into(), &items(&package, values))?;
            emit(&spec, &editor, cli.in_place)?;
        }
        Commands::ChangelogAdd {
            spec,
            message,
            version,
            user,
            email,
            date,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let user = user
                .or(config.packager.name)
                .context("no packager name; pass --user or set [packager] name in the config")?;
            let email = email
                .or(config.packager.email)
                .context("no packager email; pass --email or set [packager] email in the config")?;
            let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());

            let mut editor = open(&spec)?;
            editor.changelog_add(NewChangelogEntry {
                date,
                user,
                email,
                version,
                message,
            })?;
            emit(&spec, &editor, cli.in_place)?;
        }
        Commands::SectionsAdd { spec, with } => {
            let text = replacement(&spec, with.as_deref())?;
            let mut editor = open(&spec)?;
            editor
                .sections_add(&text)
                .context("failed to add sections")?;
            emit(&spec, &editor, cli.in_place)?;
        }
        Commands::PackageAdd { spec, names } => {
            let mut editor = open(&spec)?;
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            editor.package_add(&names)?;
            emit(&spec, &editor, cli.in_place)?;
        }
        Commands::PackageRemove { spec, names } => {
            let mut editor = open(&spec)?;
            let selectors: Vec<PackageSelector> =
                names.iter().map(|n| PackageSelector::from(n.as_str())).collect();
            editor.package_remove(&selectors)?;
            emit(&spec, &editor, cli.in_place)?;
        }
    }

    Ok(())
}
