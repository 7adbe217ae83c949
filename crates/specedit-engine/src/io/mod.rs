use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Path that stands for standard input or standard output.
pub const STDIO_PATH: &str = "-";

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("{}: No such file or directory", .0.display())]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == STDIO_PATH
}

/// Read a spec file; `-` reads standard input to the end.
pub fn read_spec(path: &Path) -> Result<String, IoError> {
    if is_stdio(path) {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        return Ok(content);
    }
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(IoError::Io)
}

/// Write a spec file; `-` writes to standard output.
pub fn write_spec(path: &Path, content: &str) -> Result<(), IoError> {
    if is_stdio(path) {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(content.as_bytes())?;
        stdout.flush()?;
        return Ok(());
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(path, content).map_err(IoError::Io)
}
