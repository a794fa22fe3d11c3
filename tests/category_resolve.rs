use tidy_watch::{default_categories, resolve, CategoryTable, Resolution, FALLBACK_CATEGORY, TRANSIENT_EXTENSIONS};

#[test]
fn known_extensions_map_to_their_label() {
    let table = default_categories();
    assert_eq!(resolve("invoice.pdf", &table).category(), Some("Documents"));
    assert_eq!(resolve("holiday.PNG", &table).category(), Some("Images"));
    assert_eq!(resolve("clip.mkv", &table).category(), Some("Videos"));
    assert_eq!(resolve("backup.zip", &table).category(), Some("Archives"));
    assert_eq!(resolve("main.cpp", &table).category(), Some("Code"));
}

#[test]
fn unknown_and_missing_extensions_fall_back() {
    let table = default_categories();
    assert_eq!(resolve("data.xyz", &table), Resolution::Category(FALLBACK_CATEGORY));
    assert_eq!(resolve("Makefile", &table), Resolution::Category(FALLBACK_CATEGORY));
    assert_eq!(resolve(".bashrc", &table), Resolution::Category(FALLBACK_CATEGORY));
}

#[test]
fn transient_extensions_are_skipped_regardless_of_case() {
    let table = default_categories();
    for ext in TRANSIENT_EXTENSIONS {
        let name = format!("partial{}", ext.to_uppercase());
        assert_eq!(resolve(&name, &table), Resolution::Skip, "{name} should be skipped");
    }
}

#[test]
fn only_the_last_extension_counts() {
    let table = default_categories();
    assert_eq!(resolve("archive.tar.gz", &table).category(), Some(FALLBACK_CATEGORY));
    assert_eq!(resolve("scan.pdf.zip", &table).category(), Some("Archives"));
}

#[test]
fn custom_table_is_honoured() {
    let mut table = CategoryTable::new();
    table.insert(".xlsx".into(), "Spreadsheets".into());
    assert_eq!(resolve("budget.XLSX", &table).category(), Some("Spreadsheets"));
    assert_eq!(resolve("report.pdf", &table).category(), Some(FALLBACK_CATEGORY));
    // Transient types are skipped even when the table maps them.
    table.insert(".tmp".into(), "Temp".into());
    assert_eq!(resolve("x.tmp", &table), Resolution::Skip);
}
