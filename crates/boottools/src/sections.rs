use crate::error::GateError;

/// Disk addressing unit the first-stage loader reads stage 2 in.
pub const SECTOR_SIZE: u64 = 512;

pub const TEXT_SECTORS: u64 = 128;
pub const DATA_SECTORS: u64 = 4;
pub const BSS_SECTORS: u64 = 4;
pub const RODATA_SECTORS: u64 = 4;

pub const TEXT_MAX: u64 = SECTOR_SIZE * TEXT_SECTORS;
pub const DATA_MAX: u64 = SECTOR_SIZE * DATA_SECTORS;
pub const BSS_MAX: u64 = SECTOR_SIZE * BSS_SECTORS;
pub const RODATA_MAX: u64 = SECTOR_SIZE * RODATA_SECTORS;

/// A named output section and the most bytes it may occupy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionDescriptor {
    name: String,
    capacity: u64,
}

impl SectionDescriptor {
    /// Budget a section in bytes. `SectionLimits::new` rejects capacities
    /// that are not whole sectors.
    pub fn new(name: &str, capacity: u64) -> Self {
        Self {
            name: name.to_string(),
            capacity,
        }
    }

    /// Budget a section in whole sectors. A count too large to express in
    /// bytes saturates, which `SectionLimits::new` then rejects.
    pub fn from_sectors(name: &str, sectors: u64) -> Self {
        Self {
            name: name.to_string(),
            capacity: sectors.saturating_mul(SECTOR_SIZE),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Capacity in bytes.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn sectors(&self) -> u64 {
        self.capacity / SECTOR_SIZE
    }
}

/// Ordered, validated set of section budgets. The order is the order the
/// gate checks (and reports) sections in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionLimits {
    sections: Vec<SectionDescriptor>,
}

impl SectionLimits {
    pub fn new(sections: Vec<SectionDescriptor>) -> Result<Self, GateError> {
        if sections.is_empty() {
            return Err(GateError::InvalidLimits("no sections given".to_string()));
        }

        for (i, section) in sections.iter().enumerate() {
            if !section.name.starts_with('.') || section.name.len() < 2 {
                return Err(GateError::InvalidLimits(format!(
                    "section name {:?} must start with '.'",
                    section.name
                )));
            }
            if section.capacity == 0 || section.capacity % SECTOR_SIZE != 0 {
                return Err(GateError::InvalidLimits(format!(
                    "{} capacity {} is not a whole number of {}-byte sectors",
                    section.name, section.capacity, SECTOR_SIZE
                )));
            }
            if sections[..i].iter().any(|s| s.name == section.name) {
                return Err(GateError::InvalidLimits(format!(
                    "section {} listed twice",
                    section.name
                )));
            }
        }

        Ok(Self { sections })
    }

    /// The fixed budgets of the second-stage boot loader.
    pub fn boot_stage2() -> Self {
        Self {
            sections: vec![
                SectionDescriptor::from_sectors(".text", TEXT_SECTORS),
                SectionDescriptor::from_sectors(".data", DATA_SECTORS),
                SectionDescriptor::from_sectors(".bss", BSS_SECTORS),
                SectionDescriptor::from_sectors(".rodata", RODATA_SECTORS),
            ],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionDescriptor> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&SectionDescriptor> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Sum of all budgets, i.e. how much of the disk stage 2 may claim.
    pub fn total_capacity(&self) -> u64 {
        self.sections
            .iter()
            .fold(0u64, |total, s| total.saturating_add(s.capacity))
    }
}

impl Default for SectionLimits {
    fn default() -> Self {
        Self::boot_stage2()
    }
}
