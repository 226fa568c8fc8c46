use super::*;

fn image(name: &str) -> FileRef {
    FileRef::new(name, "image/png", name.as_bytes().to_vec())
}

fn other(name: &str, mime: &str) -> FileRef {
    FileRef::new(name, mime, name.as_bytes().to_vec())
}

fn names(set: &StagedFileSet) -> Vec<&str> {
    set.files().iter().map(|f| f.name.as_str()).collect()
}

#[test]
fn keeps_only_image_mime_types_in_original_order() {
    let mut staged = StagedFileSet::new();
    let report = staged.ingest(
        IngestSource::DragDrop,
        vec![
            image("a.png"),
            other("notes.pdf", "application/pdf"),
            FileRef::new("b.tiff", "image/tiff", vec![1]),
            other("scan.dcm", "application/dicom"),
            other("blank", ""),
            FileRef::new("c.jpg", "image/jpeg", vec![2]),
        ],
    );

    assert_eq!(names(&staged), vec!["a.png", "b.tiff", "c.jpg"]);
    assert_eq!(report.accepted, 3);
    assert_eq!(report.rejected, vec!["notes.pdf", "scan.dcm", "blank"]);
}

#[test]
fn accumulates_across_entry_points() {
    let mut staged = StagedFileSet::new();
    staged.ingest(IngestSource::DragDrop, vec![image("first.png")]);
    staged.ingest(
        IngestSource::FileDialog,
        vec![other("readme.txt", "text/plain"), image("second.png")],
    );
    staged.ingest(IngestSource::DragDrop, vec![image("third.png")]);

    assert_eq!(names(&staged), vec!["first.png", "second.png", "third.png"]);
}

#[test]
fn mime_prefix_match_is_exact() {
    let mut staged = StagedFileSet::new();
    let report = staged.ingest(
        IngestSource::FileDialog,
        vec![other("upper.png", "IMAGE/PNG"), other("x", "application/image/png")],
    );
    assert!(staged.is_empty());
    assert_eq!(report.accepted, 0);
}

#[test]
fn remove_drops_one_entry_and_keeps_order() {
    let mut staged = StagedFileSet::from(vec![image("a"), image("b"), image("c"), image("d")]);

    let removed = staged.remove(1).expect("in range");
    assert_eq!(removed.name, "b");
    assert_eq!(staged.len(), 3);
    assert_eq!(names(&staged), vec!["a", "c", "d"]);

    staged.remove(2).expect("last");
    assert_eq!(names(&staged), vec!["a", "c"]);
}

#[test]
fn remove_out_of_range_is_rejected_without_change() {
    let mut staged = StagedFileSet::from(vec![image("a")]);
    assert_eq!(
        staged.remove(1),
        Err(StagingError::IndexOutOfRange { index: 1, len: 1 })
    );
    assert_eq!(staged.len(), 1);
}
