pub mod error;
pub use error::GateError;

pub mod sections;
pub use sections::*;

pub mod elf;
pub use elf::parse_elf_from_bytes;

pub mod source;
pub use source::{ElfImage, SectionSource, SplitFiles};

pub mod verify;
pub use verify::*;

pub mod trap_table;
pub use trap_table::*;

pub mod config;
pub use config::*;

pub mod logger;
