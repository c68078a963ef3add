//! End-to-end tests for the size → build → upload pipeline

mod common;

use agentfs_core::RuntimeConfig;
use agentfs_tarball::{
    compute_total_size, exclusions_for, pack_directory, upload_directory, ExclusionSet, Error,
};
use common::*;
use tempfile::TempDir;
use wiremock::MockServer;

fn quiet_config() -> RuntimeConfig {
    let mut config = RuntimeConfig::default();
    config.display.show_progress = false;
    config
}

#[test]
fn test_scenario_archive_holds_only_kept_file() {
    let tree = scenario_tree();

    let packed = pack_directory(tree.path(), &[], &quiet_config()).unwrap();

    assert_eq!(packed.total_bytes, 5);
    let entries = unpack_entries(packed.tarball.as_bytes());
    assert_eq!(entries.keys().collect::<Vec<_>>(), vec!["a.txt"]);
    assert_eq!(entries["a.txt"], b"hello");
}

#[test]
fn test_round_trip_reproduces_non_excluded_files() {
    let tree = project_tree();
    let config = quiet_config();

    let packed = pack_directory(tree.path(), &["cache".to_string()], &config).unwrap();

    let out = TempDir::new().unwrap();
    let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(packed.tarball.as_bytes()));
    archive.unpack(out.path()).unwrap();

    let mut expected = read_tree(tree.path());
    expected.retain(|path, _| {
        !path.starts_with(".git/")
            && !path.starts_with("node_modules/")
            && !path.starts_with("cache/")
            && !path.ends_with(".env")
    });

    assert_eq!(read_tree(out.path()), expected);
    assert!(expected.contains_key("Dockerfile"));
    assert!(out.path().join("prompts/examples").is_dir());
}

#[test]
fn test_total_size_matches_archived_file_content() {
    let tree = project_tree();
    let config = quiet_config();

    let packed = pack_directory(tree.path(), &[], &config).unwrap();

    let archived: u64 = unpack_entries(packed.tarball.as_bytes())
        .iter()
        .filter(|(name, _)| !name.ends_with('/'))
        .map(|(_, content)| content.len() as u64)
        .sum();
    assert_eq!(packed.total_bytes, archived);
    assert_eq!(packed.tarball.statistics().content_bytes, archived);
}

#[test]
fn test_excluded_directory_prunes_descendants_that_would_not_match() {
    let tree = create_tree(&[
        ("vendor/lib/keep-me.py", "x"),
        ("vendor/README", "y"),
        ("app.py", "z"),
    ]);

    let packed = pack_directory(tree.path(), &["vendor".to_string()], &quiet_config()).unwrap();

    assert_eq!(file_entry_names(packed.tarball.as_bytes()), vec!["app.py"]);
    assert_eq!(packed.total_bytes, 1);
}

#[test]
fn test_dockerignore_rules_apply_to_both_passes() {
    let tree = create_tree(&[
        (".dockerignore", "# build output\ndist\n*.pyc\n\n  Dockerfile.dev  \n"),
        ("dist/bundle.js", "bundle"),
        ("main.pyc", "bytecode"),
        ("main.py", "print()"),
        ("Dockerfile.dev", "FROM dev"),
    ]);

    let config = quiet_config();
    let exclusions = exclusions_for(tree.path(), &[], &config).unwrap();
    let total = compute_total_size(tree.path(), &exclusions).unwrap();
    let packed = pack_directory(tree.path(), &[], &config).unwrap();

    assert_eq!(
        file_entry_names(packed.tarball.as_bytes()),
        vec!["Dockerfile.dev", "main.py"]
    );
    assert_eq!(total, packed.total_bytes);
    assert_eq!(total, "FROM dev".len() as u64 + "print()".len() as u64);
}

#[test]
fn test_config_extra_excludes_are_applied() {
    let tree = create_tree(&[("notes.md", "n"), ("debug.log", "l")]);
    let mut config = quiet_config();
    config.archive.extra_excludes = vec!["*.log".to_string()];

    let packed = pack_directory(tree.path(), &[], &config).unwrap();
    assert_eq!(file_entry_names(packed.tarball.as_bytes()), vec!["notes.md"]);
}

#[test]
fn test_malformed_pattern_does_not_abort() {
    let tree = create_tree(&[("a.txt", "a"), ("b.tmp", "b")]);

    let packed = pack_directory(
        tree.path(),
        &["[unclosed".to_string(), "*.tmp".to_string()],
        &quiet_config(),
    )
    .unwrap();

    assert_eq!(file_entry_names(packed.tarball.as_bytes()), vec!["a.txt"]);
}

#[cfg(unix)]
#[test]
fn test_unreadable_dockerignore_aborts_before_sizing() {
    let tree = create_tree(&[("a.txt", "a")]);
    std::fs::create_dir(tree.path().join(".dockerignore")).unwrap();

    let err = pack_directory(tree.path(), &[], &quiet_config()).unwrap_err();
    assert!(matches!(err, Error::IgnoreFile { .. }));
}

#[test]
fn test_missing_source_directory_fails_sizing() {
    let dir = TempDir::new().unwrap();
    let err = pack_directory(&dir.path().join("absent"), &[], &quiet_config()).unwrap_err();
    assert!(matches!(err, Error::Sizing(_)));
}

#[tokio::test]
async fn test_upload_directory_end_to_end() {
    let server = MockServer::start().await;
    mock_successful_upload(&server).await;

    let tree = project_tree();
    let summary = upload_directory(
        tree.path(),
        &presigned_url(&server),
        &["cache".to_string()],
        &quiet_config(),
    )
    .await
    .unwrap();

    let request = single_request(&server).await;
    assert_eq!(request.body.len() as u64, summary.compressed_bytes);
    assert_eq!(summary.upload.bytes_sent, summary.compressed_bytes);

    let names = file_entry_names(&request.body);
    assert_eq!(
        names,
        vec![
            "Dockerfile",
            "agent.py",
            "prompts/examples/greeting.md",
            "prompts/system.md",
            "requirements.txt",
        ]
    );
    assert_eq!(summary.files, 5);
    assert_eq!(summary.directories, 2);
}

#[tokio::test]
async fn test_upload_directory_rejected() {
    let server = MockServer::start().await;
    mock_upload_response(&server, 403, "forbidden").await;

    let tree = scenario_tree();
    let err = upload_directory(tree.path(), &presigned_url(&server), &[], &quiet_config())
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("403"));
    assert!(message.contains("forbidden"));
}

#[tokio::test]
async fn test_invalid_url_fails_before_any_work() {
    let dir = TempDir::new().unwrap();
    let err = upload_directory(
        &dir.path().join("never-walked"),
        "not a url",
        &[],
        &quiet_config(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::InvalidUrl(_)));
}

#[test]
fn test_default_exclusion_set_has_builtins() {
    let set = ExclusionSet::default();
    let active: Vec<&str> = set.active_patterns().collect();
    assert_eq!(
        active,
        vec![".dockerignore", ".gitignore", ".git", "node_modules", "*.env"]
    );
}
