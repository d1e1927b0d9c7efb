use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;

use crate::config::TrapTableConfig;
use crate::error::GateError;

/// Number of entries in the x86 interrupt descriptor table.
pub const VECTOR_COUNT: usize = 256;

/// Vectors for which the CPU itself pushes an error code before entering
/// the handler.
pub const X86_ERROR_CODE_VECTORS: [u8; 7] = [
    8,  // Double fault
    10, // Invalid TSS
    11, // Segment not present
    12, // Stack segment fault
    13, // General protection
    14, // Page fault
    17, // Alignment check
];

/// Membership table over all 256 vectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionVectors {
    pushes_error_code: [bool; VECTOR_COUNT],
}

impl ExceptionVectors {
    pub fn new(vectors: &[u8]) -> Self {
        let mut pushes_error_code = [false; VECTOR_COUNT];
        for &v in vectors {
            pushes_error_code[v as usize] = true;
        }
        Self { pushes_error_code }
    }

    pub fn x86() -> Self {
        Self::new(&X86_ERROR_CODE_VECTORS)
    }

    pub fn contains(&self, vector: u8) -> bool {
        self.pushes_error_code[vector as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(move |&v| self.contains(v))
    }

    pub fn len(&self) -> usize {
        self.pushes_error_code.iter().filter(|&&b| b).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ExceptionVectors {
    fn default() -> Self {
        Self::x86()
    }
}

/// One line of generated i386 (AT&T syntax) assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmLine {
    Global(String),
    Label(String),
    PushImm(u32),
    Jump(String),
    /// Switch to the writable data section.
    Data,
    /// One 32-bit table slot holding the address of a symbol.
    Long(String),
}

impl fmt::Display for AsmLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmLine::Global(sym) => write!(f, ".globl {}", sym),
            AsmLine::Label(sym) => write!(f, "{}:", sym),
            AsmLine::PushImm(value) => write!(f, "\tpushl ${}", value),
            AsmLine::Jump(sym) => write!(f, "\tjmp {}", sym),
            AsmLine::Data => write!(f, ".data"),
            AsmLine::Long(sym) => write!(f, "\t.long {}", sym),
        }
    }
}

/// Emits the 256 interrupt entry stubs and the `trap_handlers` table.
///
/// Every stub leaves the same two words on the stack for the dispatcher:
/// the error code (or a zero standing in for it) and the vector number.
pub struct TrapTableGenerator {
    config: TrapTableConfig,
}

impl TrapTableGenerator {
    pub fn new(config: TrapTableConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrapTableConfig {
        &self.config
    }

    pub fn label(&self, vector: u8) -> String {
        format!("{}{}", self.config.label_prefix, vector)
    }

    /// Body of a single stub, without the `.globl` and label lines.
    pub fn stub(&self, vector: u8) -> Vec<AsmLine> {
        let mut body = Vec::with_capacity(3);
        if !self.config.exception_vectors.contains(vector) {
            body.push(AsmLine::PushImm(0));
        }
        body.push(AsmLine::PushImm(vector as u32));
        body.push(AsmLine::Jump(self.config.dispatcher.clone()));
        body
    }

    pub fn generate(&self) -> Vec<AsmLine> {
        let mut lines = Vec::with_capacity(1 + VECTOR_COUNT * 6 + 3);

        lines.push(AsmLine::Global(self.config.dispatcher.clone()));

        for vector in 0..=u8::MAX {
            let label = self.label(vector);
            lines.push(AsmLine::Global(label.clone()));
            lines.push(AsmLine::Label(label));
            lines.extend(self.stub(vector));
        }

        lines.push(AsmLine::Data);
        lines.push(AsmLine::Global(self.config.table_symbol.clone()));
        lines.push(AsmLine::Label(self.config.table_symbol.clone()));
        for vector in 0..=u8::MAX {
            lines.push(AsmLine::Long(self.label(vector)));
        }

        lines
    }

    pub fn render(&self) -> String {
        let mut text = String::new();
        for line in self.generate() {
            text.push_str(&line.to_string());
            text.push('\n');
        }
        text
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_all(self.render().as_bytes())?;
        out.flush()
    }

    /// Writes the assembly to `path`. The file is flushed before this
    /// returns Ok and closed on every path.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), GateError> {
        let path = path.as_ref();
        let to_write_error = |source: std::io::Error| GateError::Write {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(to_write_error)?;
        let mut out = BufWriter::new(file);
        self.write_to(&mut out).map_err(to_write_error)?;
        out.into_inner()
            .map_err(|e| to_write_error(e.into_error()))?
            .sync_all()
            .map_err(to_write_error)?;

        debug!("wrote {} trap stubs to {}", VECTOR_COUNT, path.display());
        Ok(())
    }
}

impl Default for TrapTableGenerator {
    fn default() -> Self {
        Self::new(TrapTableConfig::default())
    }
}

/// Assembly for all 256 vectors with the default symbol names.
pub fn generate_trap_table(exception_vectors: &ExceptionVectors) -> Vec<AsmLine> {
    TrapTableGenerator::new(TrapTableConfig {
        exception_vectors: exception_vectors.clone(),
        ..TrapTableConfig::default()
    })
    .generate()
}
