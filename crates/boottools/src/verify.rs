//! Size gate for the second-stage boot loader.
//!
//! Stage 1 reads stage 2 off the disk by raw sector count, so a section that
//! outgrows its budget does not fail to load: it spills into memory the
//! loader does not own. Checking the budgets at build time turns that into a
//! hard error.

use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::GateError;
use crate::sections::{SectionLimits, SECTOR_SIZE};
use crate::source::{SectionSource, SplitFiles};

/// Observed size of one section next to its budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionUsage {
    pub section: String,
    pub size: u64,
    pub limit: u64,
}

impl SectionUsage {
    /// Sectors the section occupies on disk, rounded up.
    pub fn sectors_used(&self) -> u64 {
        self.size.div_ceil(SECTOR_SIZE)
    }

    pub fn headroom(&self) -> u64 {
        self.limit.saturating_sub(self.size)
    }

    pub fn percent_used(&self) -> f64 {
        if self.limit == 0 {
            return 0.0;
        }
        (self.size as f64 / self.limit as f64) * 100.0
    }
}

/// Result of a passing verification, one entry per section in check order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    pub sections: Vec<SectionUsage>,
}

impl VerifyReport {
    pub fn total_size(&self) -> u64 {
        self.sections.iter().map(|s| s.size).sum()
    }

    pub fn get(&self, section: &str) -> Option<&SectionUsage> {
        self.sections.iter().find(|s| s.section == section)
    }
}

/// Checks the per-section files `<image_base_path><section>` against
/// `section_limits`.
pub fn verify_boot_stage<P: AsRef<Path>>(
    section_limits: &SectionLimits,
    image_base_path: P,
) -> Result<VerifyReport, GateError> {
    verify_with_source(section_limits, &SplitFiles::new(image_base_path))
}

/// Checks every section in `section_limits` order and stops at the first
/// failure; sections after it are neither checked nor reported.
pub fn verify_with_source(
    section_limits: &SectionLimits,
    source: &dyn SectionSource,
) -> Result<VerifyReport, GateError> {
    let mut report = VerifyReport::default();

    for descriptor in section_limits.iter() {
        let section = descriptor.name();
        let size = source.section_size(section)?;
        let limit = descriptor.capacity();

        debug!("{}: {} of {} bytes ({})", section, size, limit, source.describe(section));

        if size > limit {
            return Err(GateError::SizeExceeded {
                section: section.to_string(),
                size,
                limit,
            });
        }

        report.sections.push(SectionUsage {
            section: section.to_string(),
            size,
            limit,
        });
    }

    info!(
        "boot stage 2 within budget: {} bytes over {} sections",
        report.total_size(),
        report.sections.len()
    );
    Ok(report)
}
