use boottools::{
    GateError, SectionDescriptor, SectionLimits, BSS_MAX, DATA_MAX, RODATA_MAX, SECTOR_SIZE,
    TEXT_MAX,
};

#[test]
fn test_boot_stage2_budgets() {
    assert_eq!(SECTOR_SIZE, 512);
    assert_eq!(TEXT_MAX, 65536);
    assert_eq!(DATA_MAX, 2048);
    assert_eq!(BSS_MAX, 2048);
    assert_eq!(RODATA_MAX, 2048);

    let limits = SectionLimits::boot_stage2();
    let names: Vec<&str> = limits.iter().map(|s| s.name()).collect();
    assert_eq!(names, vec![".text", ".data", ".bss", ".rodata"]);
    assert_eq!(limits.get(".text").unwrap().sectors(), 128);
    assert_eq!(limits.get(".rodata").unwrap().capacity(), 2048);
    assert!(limits.get(".eh_frame").is_none());
    assert_eq!(limits.total_capacity(), 65536 + 3 * 2048);
    assert_eq!(SectionLimits::default(), limits);
}

#[test]
fn test_boot_stage2_budgets_pass_validation() {
    let limits = SectionLimits::boot_stage2();
    let rebuilt = SectionLimits::new(limits.iter().cloned().collect()).unwrap();
    assert_eq!(rebuilt, limits);
    assert_eq!(rebuilt.len(), 4);
}

#[test]
fn test_rejects_empty_limits() {
    let err = SectionLimits::new(Vec::new()).unwrap_err();
    assert!(matches!(err, GateError::InvalidLimits(_)));
}

#[test]
fn test_rejects_duplicate_sections() {
    let err = SectionLimits::new(vec![
        SectionDescriptor::from_sectors(".text", 1),
        SectionDescriptor::from_sectors(".data", 1),
        SectionDescriptor::from_sectors(".text", 2),
    ])
    .unwrap_err();
    assert!(err.to_string().contains("listed twice"));
}

#[test]
fn test_rejects_partial_sectors() {
    let err = SectionLimits::new(vec![SectionDescriptor::new(".text", 1000)]).unwrap_err();
    assert!(matches!(err, GateError::InvalidLimits(_)));

    let err = SectionLimits::new(vec![SectionDescriptor::from_sectors(".data", 0)]).unwrap_err();
    assert!(matches!(err, GateError::InvalidLimits(_)));

    assert!(SectionLimits::new(vec![SectionDescriptor::new(".text", 1024)]).is_ok());
}

#[test]
fn test_rejects_bad_section_names() {
    for name in ["text", ".", ""] {
        let err = SectionLimits::new(vec![SectionDescriptor::from_sectors(name, 1)]).unwrap_err();
        assert!(matches!(err, GateError::InvalidLimits(_)), "{:?}", name);
    }
}

#[test]
fn test_sector_count_overflow_is_rejected() {
    let huge = SectionDescriptor::from_sectors(".text", u64::MAX);
    assert_eq!(huge.capacity(), u64::MAX);

    let err = SectionLimits::new(vec![huge]).unwrap_err();
    assert!(matches!(err, GateError::InvalidLimits(_)));
}
