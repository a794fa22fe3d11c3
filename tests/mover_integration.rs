use std::fs;
use tempfile::tempdir;

use tidy_watch::{default_categories, organize_file, OrganizeError};

#[test]
fn loose_file_moves_into_category_folder() {
    let td = tempdir().unwrap();
    let root = td.path();
    let src = root.join("invoice.pdf");
    fs::write(&src, b"%PDF").unwrap();

    let outcome = organize_file(&src, root, &default_categories(), false);
    assert!(outcome.moved, "message: {}", outcome.message);
    assert!(outcome.is_settled());
    assert_eq!(outcome.message, "Moved invoice.pdf to Documents");
    let dest = root.join("Documents").join("invoice.pdf");
    assert_eq!(outcome.destination.as_deref(), Some(dest.as_path()));
    assert!(!src.exists());
    assert_eq!(fs::read(&dest).unwrap(), b"%PDF");
}

#[test]
fn second_pass_over_moved_file_is_a_skip() {
    let td = tempdir().unwrap();
    let root = td.path();
    let src = root.join("song.txt");
    fs::write(&src, b"la").unwrap();
    let table = default_categories();

    let first = organize_file(&src, root, &table, false);
    let moved_to = first.destination.clone().expect("destination");
    let second = organize_file(&moved_to, root, &table, false);
    assert!(!second.moved);
    assert!(second.is_settled());
    assert_eq!(second.message, "Skipped song.txt: already in correct folder Documents");
    assert!(moved_to.exists());
}

#[test]
fn collision_gets_numbered_and_keeps_existing() {
    let td = tempdir().unwrap();
    let root = td.path();
    let docs = root.join("Documents");
    fs::create_dir_all(&docs).unwrap();
    fs::write(docs.join("report.pdf"), b"old").unwrap();
    fs::write(docs.join("report_1.pdf"), b"older").unwrap();
    let src = root.join("report.pdf");
    fs::write(&src, b"new").unwrap();

    let outcome = organize_file(&src, root, &default_categories(), false);
    assert!(outcome.moved);
    assert_eq!(fs::read(docs.join("report.pdf")).unwrap(), b"old");
    assert_eq!(fs::read(docs.join("report_1.pdf")).unwrap(), b"older");
    assert_eq!(fs::read(docs.join("report_2.pdf")).unwrap(), b"new");
}

#[test]
fn unknown_type_goes_to_others() {
    let td = tempdir().unwrap();
    let root = td.path();
    let src = root.join("blob.xyz");
    fs::write(&src, b"?").unwrap();
    let outcome = organize_file(&src, root, &default_categories(), false);
    assert_eq!(outcome.message, "Moved blob.xyz to Others");
    assert!(root.join("Others").join("blob.xyz").exists());
}

#[test]
fn transient_file_is_left_in_place() {
    let td = tempdir().unwrap();
    let root = td.path();
    let src = root.join("movie.mp4.download");
    fs::write(&src, b"partial").unwrap();
    let outcome = organize_file(&src, root, &default_categories(), false);
    assert!(!outcome.moved);
    assert!(outcome.is_settled());
    assert_eq!(outcome.message, "Skipped movie.mp4.download: temporary or unsupported file type");
    assert!(src.exists());
}

#[test]
fn vanished_source_is_reported_not_raised() {
    let td = tempdir().unwrap();
    let root = td.path();
    let outcome = organize_file(&root.join("gone.pdf"), root, &default_categories(), false);
    assert!(!outcome.moved);
    assert!(matches!(outcome.failure, Some(OrganizeError::SourceVanished(_))));
    assert!(outcome.message.starts_with("File not found for gone.pdf"), "{}", outcome.message);
}

#[test]
fn nested_file_moves_to_root_category() {
    let td = tempdir().unwrap();
    let root = td.path();
    let nested = root.join("inbox").join("2024");
    fs::create_dir_all(&nested).unwrap();
    let src = nested.join("photo.jpg");
    fs::write(&src, b"jpg").unwrap();
    let outcome = organize_file(&src, root, &default_categories(), false);
    assert!(outcome.moved);
    assert!(root.join("Images").join("photo.jpg").exists());
}
