use super::*;

const MINIMAL: &str = r#"
page: { title: Notes, route: /notes }
layout: { type: stack }
components:
  - id: body
    type: text
    position: { col: 1, row: 1 }
    props: { text: hello }
"#;

#[test]
fn malformed_yaml_is_a_parse_error() {
    let err = DescriptorParser::new()
        .parse_str("page: [unclosed")
        .unwrap_err();
    assert!(matches!(err, PagesmithError::Parse(_)), "{err}");
}

#[tokio::test]
async fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = DescriptorParser::new()
        .parse(dir.path().join("nope.yaml"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn write_stamps_last_modified_and_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.yaml");
    let parser = DescriptorParser::new();

    let mut desc = parser.parse_str(MINIMAL).unwrap();
    assert!(desc.meta.is_none());

    let before = chrono::Utc::now();
    parser.write(&path, &mut desc).await.unwrap();
    let stamped = desc.meta.as_ref().unwrap().last_modified.unwrap();
    assert!(stamped >= before);

    let back = parser.load(&path).await.unwrap();
    assert_eq!(back, desc);

    let leftovers = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().contains(".tmp-"))
        .count();
    assert_eq!(leftovers, 0);
}

#[test]
fn temp_files_are_unique_per_write() {
    let path = Path::new("pages/notes/page.yaml");
    let a = temp_sibling(path);
    let b = temp_sibling(path);
    assert_ne!(a, b);
    assert_eq!(a.parent(), path.parent());
}

#[tokio::test]
async fn joined_writes_to_one_path_both_land() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.yaml");
    let parser = DescriptorParser::new();
    let mut first = parser.parse_str(MINIMAL).unwrap();
    let mut second = parser.parse_str(&MINIMAL.replace("Notes", "Journal")).unwrap();

    let (a, b) = tokio::join!(
        parser.write(&path, &mut first),
        parser.write(&path, &mut second)
    );
    a.unwrap();
    b.unwrap();

    let back = parser.load(&path).await.unwrap();
    assert!(back == first || back == second);
    let leftovers = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().contains(".tmp-"))
        .count();
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn failed_write_leaves_target_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let parser = DescriptorParser::new();
    let mut desc = parser.parse_str(MINIMAL).unwrap();
    let missing_parent = dir.path().join("absent").join("page.yaml");
    assert!(parser.write(&missing_parent, &mut desc).await.is_err());
    assert!(!missing_parent.exists());
}

#[tokio::test]
async fn load_rejects_invalid_descriptor() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("page.yaml");
    std::fs::write(&path, "page: { title: X, route: /x }\n").unwrap();
    let err = DescriptorParser::new().load(&path).await.unwrap_err();
    let report = err.report().unwrap();
    assert_eq!(report.errors.len(), 2);
}
