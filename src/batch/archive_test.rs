use std::io::Read;

use bytes::Bytes;

use super::Archive;
use crate::batch::types::ArchiveError;

#[test]
fn test_empty_archive_has_nothing_to_save() {
    let archive = Archive::new();
    assert!(archive.is_empty());

    match archive.generate() {
        Err(ArchiveError::Empty) => {}
        other => panic!("expected Empty, got {:?}", other.map(|b| b.len())),
    }
}

#[test]
fn test_entries_keep_insertion_order() {
    let mut archive = Archive::new();
    archive.file("1.jpg", Bytes::from_static(b"aaa"));
    archive.file("2.jpg", Bytes::from_static(b"bbb"));
    archive.file("3.jpg", Bytes::from_static(b"ccc"));

    assert_eq!(archive.len(), 3);
    assert_eq!(
        archive.entry_names().collect::<Vec<_>>(),
        vec!["1.jpg", "2.jpg", "3.jpg"]
    );
    assert_eq!(archive.get("2.jpg").unwrap(), &Bytes::from_static(b"bbb"));
    assert!(archive.get("4.jpg").is_none());
}

#[test]
fn test_generate_packages_entries_under_images_folder() {
    let mut archive = Archive::new();
    archive.file("1.jpg", Bytes::from_static(b"aaa"));
    archive.file("2.jpg", Bytes::from_static(b"bbb"));

    let data = archive.generate().unwrap();
    let mut zip = zip::ZipArchive::new(std::io::Cursor::new(data.to_vec())).unwrap();
    assert_eq!(zip.len(), 2);

    let mut first = String::new();
    zip.by_index(0).unwrap().read_to_string(&mut first).unwrap();
    assert_eq!(first, "aaa");

    let names: Vec<String> = (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect();
    assert_eq!(names, vec!["images/1.jpg", "images/2.jpg"]);
}

#[test]
fn test_generate_is_repeatable() {
    let mut archive = Archive::new();
    archive.file("1.jpg", Bytes::from_static(b"aaa"));

    // Packaging on demand never drains the archive.
    let first = archive.generate().unwrap();
    let second = archive.generate().unwrap();
    assert_eq!(first, second);
    assert_eq!(archive.len(), 1);
}

#[test]
fn test_custom_folder() {
    let mut archive = Archive::with_folder("shots");
    archive.file("1.jpg", Bytes::from_static(b"x"));

    let data = archive.generate().unwrap();
    let mut zip = zip::ZipArchive::new(std::io::Cursor::new(data.to_vec())).unwrap();
    assert_eq!(zip.by_index(0).unwrap().name(), "shots/1.jpg");
}
