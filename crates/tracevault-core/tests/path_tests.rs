use tempfile::TempDir;
use tracevault_core::*;

#[test]
fn test_resolve_workspace_path_explicit_wins() {
    let result = resolve_workspace_path(Some("/explicit/root")).unwrap();
    assert_eq!(result, std::path::PathBuf::from("/explicit/root"));
}

#[test]
fn test_normalize_path() {
    let temp_dir = TempDir::new().unwrap();
    let temp_path = temp_dir.path();

    let normalized = normalize_path(temp_path);
    assert!(normalized.is_absolute());
}

#[test]
fn test_paths_equal() {
    let temp_dir = TempDir::new().unwrap();
    let path1 = temp_dir.path();
    let path2 = temp_dir.path();

    assert!(paths_equal(path1, path2));
}

#[test]
fn test_paths_equal_different_representations() {
    let temp_dir = TempDir::new().unwrap();
    let abs_path = temp_dir.path().canonicalize().unwrap();

    assert!(paths_equal(&abs_path, &abs_path));
}
