use std::path::PathBuf;

use tempfile::TempDir;

use validate_json::{DiscoveryError, FileDiscovery, SchemaError, ValidationError};

fn tree() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path();
    std::fs::create_dir_all(base.join("nested")).unwrap();
    for name in ["b.json", "a.json", "c.yml", "nested/d.json"] {
        std::fs::write(base.join(name), "{}").unwrap();
    }
    temp_dir
}

#[test]
fn test_glob_is_sorted() {
    let temp_dir = tree();
    let pattern = temp_dir.path().join("*.json");

    let paths = FileDiscovery::new()
        .glob(&pattern.to_string_lossy())
        .unwrap();
    assert_eq!(
        paths,
        vec![temp_dir.path().join("a.json"), temp_dir.path().join("b.json")]
    );
}

#[test]
fn test_glob_without_match() {
    let temp_dir = tree();
    let pattern = temp_dir.path().join("*.xml").to_string_lossy().into_owned();

    let err = FileDiscovery::new().glob(&pattern).unwrap_err();
    assert_eq!(err.to_string(), format!("{pattern}: no such file or directory"));
}

#[test]
fn test_invalid_pattern() {
    let err = FileDiscovery::new().glob("[").unwrap_err();
    assert!(matches!(err, DiscoveryError::InvalidPattern { .. }));
}

#[test]
fn test_home_expansion() {
    let discovery = FileDiscovery::new().with_home_dir(Some(PathBuf::from("/home/someone")));

    assert_eq!(discovery.expand_home("~"), "/home/someone");
    assert_eq!(discovery.expand_home("~/docs/*.json"), "/home/someone/docs/*.json");
    assert_eq!(discovery.expand_home("~other/x.json"), "~other/x.json");
    assert_eq!(discovery.expand_home("docs/~/x.json"), "docs/~/x.json");

    let no_home = FileDiscovery::new().with_home_dir(None);
    assert_eq!(no_home.expand_home("~/x.json"), "~/x.json");
}

#[tokio::test]
async fn test_documents_then_lists_in_order() {
    let temp_dir = tree();
    let base = temp_dir.path();
    let list = base.join("docs.txt");
    std::fs::write(&list, "nested/*.json\n\n   a.json  \n").unwrap();

    let args = vec![base.join("c.yml").to_string_lossy().into_owned()];
    let docs = FileDiscovery::new()
        .resolve_documents(&args, &[list])
        .await
        .unwrap();

    assert_eq!(
        docs,
        vec![base.join("c.yml"), base.join("nested/d.json"), base.join("a.json")]
    );
}

#[tokio::test]
async fn test_unmatched_document_is_usage_error() {
    let temp_dir = tree();
    let args = vec![temp_dir.path().join("*.xml").to_string_lossy().into_owned()];

    let err = FileDiscovery::new()
        .resolve_documents(&args, &[])
        .await
        .unwrap_err();
    assert!(matches!(err, ValidationError::Usage(_)));
    assert_eq!(err.exit_code(), 4);
}

#[tokio::test]
async fn test_list_entry_without_match_is_list_error() {
    let temp_dir = tree();
    let list = temp_dir.path().join("docs.txt");
    std::fs::write(&list, "missing.json\n").unwrap();

    let err = FileDiscovery::new().read_file_list(&list).await.unwrap_err();
    assert!(matches!(&err, ValidationError::FileList { path, .. } if *path == list));
    assert_eq!(err.exit_code(), 5);
}

#[test]
fn test_unmatched_ref_is_schema_error() {
    let temp_dir = tree();
    let patterns = vec![temp_dir.path().join("refs/*.json").to_string_lossy().into_owned()];

    let err = FileDiscovery::new().resolve_refs(&patterns).unwrap_err();
    assert!(matches!(
        err,
        ValidationError::Schema(SchemaError::Pattern(DiscoveryError::NoMatch { .. }))
    ));
}
