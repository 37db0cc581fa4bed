use crate::config::Config;
use crate::handlers::run_update;
use crate::tests::fakes::{RecordingVcs, StaticSource};
use crate::{PatchOutcome, StageOutcome, UpdateError};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

fn test_config(dir: &Path) -> Config {
    let mut config = Config::from_base_dir(&dir.join("scripts"));
    config.token_ttl_secs = 86400;
    config.signature = "ABC".to_string();
    config.cookie_name = None;
    config
}

fn read_output(config: &Config) -> Value {
    serde_json::from_str(&fs::read_to_string(&config.output_path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let source = StaticSource {
        document: Some(json!({"#EXTHTTP": "{\"cookie\":\"OLD\"}"})),
    };
    let vcs = RecordingVcs::dirty();

    let report = run_update(&config, &source, &vcs, 1000).await.unwrap();

    assert_eq!(report.patch, PatchOutcome::Replaced);
    assert_eq!(report.stage, StageOutcome::Staged);
    assert_eq!(report.token.expires_at, 87400);

    let written = read_output(&config);
    assert_eq!(
        written,
        json!({"#EXTHTTP": "{\"cookie\":\"st=1000~exp=87400~acl=/*~hmac=ABC\"}"})
    );
    assert!(dir.path().join("data").join("playlist.json").exists());
    assert_eq!(vcs.added().len(), 1);
    assert!(vcs.added()[0].ends_with("data/playlist.json"));
}

#[tokio::test]
async fn test_round_trip_changes_only_the_cookie() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.cookie_name = Some("__hdnea__".to_string());
    let upstream = json!({
        "name": "Ünïcode channel",
        "#EXTHTTP": "{\"cookie\":\"OLD\",\"user-agent\":\"plaYtv\"}",
        "streams": [{"url": "https://cdn.example/1.m3u8"}],
        "count": 3
    });
    let source = StaticSource { document: Some(upstream.clone()) };
    let vcs = RecordingVcs::clean();

    let report = run_update(&config, &source, &vcs, 50).await.unwrap();
    assert_eq!(report.stage, StageOutcome::Skipped);
    assert!(vcs.added().is_empty());

    let mut expected = upstream;
    expected["#EXTHTTP"] = json!(
        "{\"cookie\":\"__hdnea__=st=50~exp=86450~acl=/*~hmac=ABC\",\"user-agent\":\"plaYtv\"}"
    );
    assert_eq!(read_output(&config), expected);
}

#[tokio::test]
async fn test_missing_key_writes_and_stages_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let source = StaticSource {
        document: Some(json!({"other": "{\"cookie\":\"OLD\"}"})),
    };
    let vcs = RecordingVcs::dirty();

    let err = run_update(&config, &source, &vcs, 1000).await.unwrap_err();

    assert!(err.is_schema());
    assert!(!config.output_path.exists());
    assert_eq!(vcs.status_calls(), 0);
    assert!(vcs.added().is_empty());
}

#[tokio::test]
async fn test_fetch_failure_stops_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let source = StaticSource { document: None };
    let vcs = RecordingVcs::dirty();

    let err = run_update(&config, &source, &vcs, 1000).await.unwrap_err();

    assert!(matches!(err, UpdateError::Network(_)));
    assert!(!config.output_path.exists());
    assert_eq!(vcs.status_calls(), 0);
}

#[tokio::test]
async fn test_no_match_still_persists() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let document = json!({"#EXTHTTP": "{\"referer\":\"x\"}"});
    let source = StaticSource { document: Some(document.clone()) };
    let vcs = RecordingVcs::dirty();

    let report = run_update(&config, &source, &vcs, 1000).await.unwrap();

    assert_eq!(report.patch, PatchOutcome::NoMatch);
    assert_eq!(read_output(&config), document);
}

#[tokio::test]
async fn test_unavailable_tree_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let source = StaticSource {
        document: Some(json!({"#EXTHTTP": "{\"cookie\":\"OLD\"}"})),
    };
    let vcs = RecordingVcs::broken();

    let report = run_update(&config, &source, &vcs, 1000).await.unwrap();

    assert!(matches!(report.stage, StageOutcome::Unavailable(_)));
    assert!(config.output_path.exists());
}

#[tokio::test]
async fn test_invalid_config_is_rejected_before_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.token_ttl_secs = 0;
    let source = StaticSource {
        document: Some(json!({"#EXTHTTP": "{\"cookie\":\"OLD\"}"})),
    };
    let vcs = RecordingVcs::dirty();

    let err = run_update(&config, &source, &vcs, 1000).await.unwrap_err();
    assert!(matches!(err, UpdateError::Config(_)));
    assert!(!config.output_path.exists());
}
