use std::fmt;
use std::io;
use std::path::PathBuf;

/// Every way the boot-path checks can fail. All of them are fatal to the
/// build step that hit them.
#[derive(Debug)]
pub enum GateError {
    /// A section's size could not be observed (missing or unreadable file).
    Stat {
        section: String,
        path: PathBuf,
        source: io::Error,
    },
    /// A section is larger than its sector budget.
    SizeExceeded {
        section: String,
        size: u64,
        limit: u64,
    },
    /// The generated assembly could not be written out.
    Write { path: PathBuf, source: io::Error },
    /// The linked image could not be read.
    Read { path: PathBuf, source: io::Error },
    /// The linked image is not a well-formed ELF file.
    Elf {
        path: PathBuf,
        source: goblin::error::Error,
    },
    /// A section the image must contain is absent from it.
    MissingSection { section: String, path: PathBuf },
    /// A section's address range runs past the end of the address space.
    SectionRange {
        section: String,
        path: PathBuf,
        addr: u64,
        size: u64,
    },
    /// A section limit table was rejected at construction.
    InvalidLimits(String),
}

impl GateError {
    /// Name of the section the error is about, if any.
    pub fn section(&self) -> Option<&str> {
        match self {
            GateError::Stat { section, .. }
            | GateError::SizeExceeded { section, .. }
            | GateError::MissingSection { section, .. }
            | GateError::SectionRange { section, .. } => Some(section),
            _ => None,
        }
    }
}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateError::Stat {
                section,
                path,
                source,
            } => write!(
                f,
                "Unable to stat {} file ({}): {}",
                section,
                path.display(),
                source
            ),
            GateError::SizeExceeded {
                section,
                size,
                limit,
            } => write!(
                f,
                "{} section too large: {} bytes (limit {})",
                section, size, limit
            ),
            GateError::Write { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
            GateError::Read { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            GateError::Elf { path, source } => {
                write!(f, "failed to parse ELF file {}: {}", path.display(), source)
            }
            GateError::MissingSection { section, path } => {
                write!(f, "No {} section in {}", section, path.display())
            }
            GateError::SectionRange {
                section,
                path,
                addr,
                size,
            } => write!(
                f,
                "{} section in {} wraps the address space: addr {:#x}, size {:#x}",
                section,
                path.display(),
                addr,
                size
            ),
            GateError::InvalidLimits(reason) => write!(f, "invalid section limits: {}", reason),
        }
    }
}

impl std::error::Error for GateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GateError::Stat { source, .. }
            | GateError::Write { source, .. }
            | GateError::Read { source, .. } => Some(source),
            GateError::Elf { source, .. } => Some(source),
            GateError::SizeExceeded { .. }
            | GateError::MissingSection { .. }
            | GateError::SectionRange { .. }
            | GateError::InvalidLimits(_) => None,
        }
    }
}
