use goblin::elf::Elf;
use goblin::elf::section_header::SHT_NOBITS;

pub struct ElfInfo {
    pub sections: Vec<ElfSection>,
}

pub struct ElfSection {
    pub name: String,
    pub addr: u64,
    pub size: u64,
    pub nobits: bool,
}

impl ElfInfo {
    /// Returns a reference to a section by its name, if it exists.
    /// Only the first section with the given name is returned.
    pub fn get_section_by_name(&self, name: &str) -> Option<&ElfSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Address span covered by every section whose name starts with one of
    /// `prefixes`, or `Ok(None)` when no such section exists.
    ///
    /// `.text` and `.text.startup` are placed back to back by the linker, so
    /// the loader has to reserve the whole range rather than the sum.
    /// A section whose end address does not fit in 64 bits is returned as
    /// the error.
    pub fn span_of(&self, prefixes: &[&str]) -> Result<Option<u64>, &ElfSection> {
        let mut bounds: Option<(u64, u64)> = None;

        for section in self
            .sections
            .iter()
            .filter(|s| prefixes.iter().any(|p| s.name.starts_with(p)))
        {
            let end = section.end().ok_or(section)?;
            bounds = Some(match bounds {
                Some((min, max)) => (min.min(section.addr), max.max(end)),
                None => (section.addr, end),
            });
        }

        Ok(bounds.map(|(min, max)| max - min))
    }
}

impl ElfSection {
    /// First address past the section, `None` if it wraps.
    pub fn end(&self) -> Option<u64> {
        self.addr.checked_add(self.size)
    }
}

pub fn parse_elf_from_bytes(bytes: &[u8]) -> Result<ElfInfo, goblin::error::Error> {
    let elf = Elf::parse(bytes)?;

    let mut sections = Vec::new();
    for section in elf.section_headers.iter() {
        let Some(name) = elf.shdr_strtab.get_at(section.sh_name) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }

        let nobits = section.sh_type == SHT_NOBITS;
        let end = section.sh_offset.saturating_add(section.sh_size);
        if nobits || end <= bytes.len() as u64 {
            sections.push(ElfSection {
                name: name.to_string(),
                addr: section.sh_addr,
                size: section.sh_size,
                nobits,
            });
        }
    }

    Ok(ElfInfo { sections })
}
