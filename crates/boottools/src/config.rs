use std::env;
use std::path::PathBuf;

use crate::error::GateError;
use crate::sections::SectionLimits;
use crate::source::{ElfImage, SectionSource, SplitFiles};
use crate::trap_table::ExceptionVectors;

/// Default prefix of the per-section stage 2 files, relative to the build dir.
pub const DEFAULT_STAGE2_BASE: &str = "./boot-stage2";

/// Overrides `DEFAULT_STAGE2_BASE` when the orchestrator builds elsewhere.
pub const STAGE2_BASE_ENV: &str = "BOOT_STAGE2_BASE";

pub const DEFAULT_DISPATCHER: &str = "tp_mktf";
pub const DEFAULT_TABLE_SYMBOL: &str = "trap_handlers";
pub const DEFAULT_LABEL_PREFIX: &str = "handle_int_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageLocation {
    SplitFiles { base: PathBuf },
    Elf { path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct VerifyConfig {
    pub limits: SectionLimits,
    pub image: ImageLocation,
}

impl VerifyConfig {
    /// Default config with the split-file base taken from
    /// `$BOOT_STAGE2_BASE` when it is set.
    pub fn from_env() -> Self {
        let base = env::var(STAGE2_BASE_ENV)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_STAGE2_BASE.to_string());

        Self {
            limits: SectionLimits::boot_stage2(),
            image: ImageLocation::SplitFiles {
                base: PathBuf::from(base),
            },
        }
    }

    pub fn with_base(mut self, base: PathBuf) -> Self {
        self.image = ImageLocation::SplitFiles { base };
        self
    }

    pub fn with_elf(mut self, path: PathBuf) -> Self {
        self.image = ImageLocation::Elf { path };
        self
    }

    /// Opens whatever `image` points at. For ELF images this reads and
    /// parses the file up front.
    pub fn source(&self) -> Result<Box<dyn SectionSource>, GateError> {
        match &self.image {
            ImageLocation::SplitFiles { base } => Ok(Box::new(SplitFiles::new(base))),
            ImageLocation::Elf { path } => Ok(Box::new(ElfImage::open(path)?)),
        }
    }
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            limits: SectionLimits::boot_stage2(),
            image: ImageLocation::SplitFiles {
                base: PathBuf::from(DEFAULT_STAGE2_BASE),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrapTableConfig {
    pub exception_vectors: ExceptionVectors,
    /// Common trap handler every stub jumps to.
    pub dispatcher: String,
    /// Data symbol of the 256-entry address table.
    pub table_symbol: String,
    pub label_prefix: String,
}

impl Default for TrapTableConfig {
    fn default() -> Self {
        Self {
            exception_vectors: ExceptionVectors::x86(),
            dispatcher: DEFAULT_DISPATCHER.to_string(),
            table_symbol: DEFAULT_TABLE_SYMBOL.to_string(),
            label_prefix: DEFAULT_LABEL_PREFIX.to_string(),
        }
    }
}
