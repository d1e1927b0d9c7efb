use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::elf::{parse_elf_from_bytes, ElfInfo};
use crate::error::GateError;

/// Where the gate learns how big each section of the built image is.
pub trait SectionSource {
    /// Size in bytes of `section` in the built image.
    fn section_size(&self, section: &str) -> Result<u64, GateError>;

    /// Human readable location of `section`, for diagnostics.
    fn describe(&self, section: &str) -> String;
}

/// One raw file per section, named `<base><section>`, e.g.
/// `./boot-stage2.text` as produced by `objcopy -j .text -O binary`.
#[derive(Debug, Clone)]
pub struct SplitFiles {
    base: PathBuf,
}

impl SplitFiles {
    pub fn new<P: AsRef<Path>>(base: P) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Appends the section name to the base as a plain suffix; `Path::join`
    /// would start a new path component instead.
    pub fn path_for(&self, section: &str) -> PathBuf {
        let mut name = OsString::from(self.base.as_os_str());
        name.push(section);
        PathBuf::from(name)
    }
}

impl SectionSource for SplitFiles {
    fn section_size(&self, section: &str) -> Result<u64, GateError> {
        let path = self.path_for(section);
        debug!("stat {} for {}", path.display(), section);

        let metadata = fs::metadata(&path).map_err(|source| GateError::Stat {
            section: section.to_string(),
            path: path.clone(),
            source,
        })?;

        Ok(metadata.len())
    }

    fn describe(&self, section: &str) -> String {
        self.path_for(section).display().to_string()
    }
}

/// Section sizes taken straight from the linked ELF image.
pub struct ElfImage {
    path: PathBuf,
    info: ElfInfo,
}

impl ElfImage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GateError> {
        let path = path.as_ref().to_path_buf();
        let bytes = fs::read(&path).map_err(|source| GateError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_bytes(path, &bytes)
    }

    /// `path` is only used in diagnostics.
    pub fn from_bytes(path: PathBuf, bytes: &[u8]) -> Result<Self, GateError> {
        let info = parse_elf_from_bytes(bytes).map_err(|source| GateError::Elf {
            path: path.clone(),
            source,
        })?;
        debug!(
            "{}: {} named sections",
            path.display(),
            info.sections.len()
        );
        Ok(Self { path, info })
    }

    pub fn info(&self) -> &ElfInfo {
        &self.info
    }
}

/// An image without these has no loader code in it at all.
const REQUIRED_SECTIONS: &[&str] = &[".text"];

fn prefixes_for(section: &str) -> Vec<&str> {
    match section {
        ".bss" => vec![".bss", ".sbss"],
        other => vec![other],
    }
}

impl SectionSource for ElfImage {
    fn section_size(&self, section: &str) -> Result<u64, GateError> {
        match self.info.span_of(&prefixes_for(section)) {
            Ok(Some(size)) => Ok(size),
            Ok(None) if REQUIRED_SECTIONS.iter().any(|r| *r == section) => {
                Err(GateError::MissingSection {
                    section: section.to_string(),
                    path: self.path.clone(),
                })
            }
            Ok(None) => {
                // objcopy emits an empty file for a section the image lacks
                debug!("{}: no {} section, treating as empty", self.path.display(), section);
                Ok(0)
            }
            Err(wrapped) => Err(GateError::SectionRange {
                section: wrapped.name.clone(),
                path: self.path.clone(),
                addr: wrapped.addr,
                size: wrapped.size,
            }),
        }
    }

    fn describe(&self, section: &str) -> String {
        format!("{} [{}]", self.path.display(), section)
    }
}
