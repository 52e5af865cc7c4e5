//! Focused unit tests covering merge CLI configuration and request parsing.

use super::helpers::{merge_request, workspace, write_merge_request, write_utf8};
use super::*;
use crate::merge::{MergeConfig, config_from_layers_for_test, execute_merge, load_merge_request};
use change_merger_core::{Action, ChangeError, ChangesetCodec, MergeError};
use change_merger_data::XmlChangesetCodec;
use rstest::rstest;
use serde_json::json;

#[rstest]
fn converting_merge_without_request_errors() {
    let err = MergeConfig::try_from(MergeArgs::default()).expect_err("missing request");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_MERGE_REQUEST);
            assert_eq!(env, ENV_MERGE_REQUEST);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
#[case::default_tag(None, "externalId")]
#[case::custom_tag(Some("ref:source"), "ref:source")]
fn merge_config_resolves_external_id_tag(#[case] tag: Option<&str>, #[case] expected: &str) {
    let args = MergeArgs {
        request_path: Some("request.json".into()),
        external_id_tag: tag.map(str::to_owned),
    };

    let config = MergeConfig::try_from(args).expect("config should build");
    assert_eq!(config.external_id_tag, expected);
}

#[rstest]
fn load_merge_request_decodes_json() {
    let (_tmp, root) = workspace();
    let request_path = root.join("request.json");
    write_merge_request(&request_path, &merge_request());

    let request = load_merge_request(&request_path).expect("request should decode");

    assert_eq!(request.changeset_id, 7);
    assert_eq!(request.changes.len(), 2);
    assert_eq!(request.changes[0].action, Action::Create);
    assert_eq!(request.changes[0].temp_osm_id, Some(-1));
    assert_eq!(request.changes[1].temp_osm_id, None);
}

#[rstest]
fn load_merge_request_rejects_invalid_json() {
    let (_tmp, root) = workspace();
    let request_path = root.join("request.json");
    write_utf8(&request_path, b"{ not valid json");

    let err = load_merge_request(&request_path).expect_err("invalid json should error");
    match err {
        CliError::ParseMergeRequest { path, .. } => assert_eq!(path, request_path),
        other => panic!("unexpected error {other:?}"),
    }
}

#[rstest]
fn load_merge_request_rejects_unknown_actions() {
    let (_tmp, root) = workspace();
    let request_path = root.join("request.json");
    let mut request = merge_request();
    request["changes"][0]["action"] = json!("upsert");
    write_merge_request(&request_path, &request);

    let err = load_merge_request(&request_path).expect_err("unknown action should error");
    assert!(matches!(err, CliError::ParseMergeRequest { .. }), "{err:?}");
}

#[rstest]
fn load_merge_request_io_error_returns_open_error() {
    let (_tmp, root) = workspace();
    let request_path = root.join("missing.json");

    let err = load_merge_request(&request_path).expect_err("missing request should error");
    match err {
        CliError::OpenInput { field, path, .. } => {
            assert_eq!(field, ARG_MERGE_REQUEST);
            assert_eq!(path, request_path);
        }
        other => panic!("expected OpenInput, found {other:?}"),
    }
}

#[rstest]
fn execute_merge_reports_generated_ids() {
    let (_tmp, root) = workspace();
    let request_path = root.join("request.json");
    write_merge_request(&request_path, &merge_request());
    let config = MergeConfig {
        request_path,
        external_id_tag: "externalId".to_owned(),
    };

    let response = execute_merge(&config).expect("merge should succeed");

    assert_eq!(response.created.len(), 1);
    assert_eq!(response.created[0].external_id, "road-1");
    assert!(response.created[0].temp_osm_id < 0);
    assert_eq!(response.deleted, vec!["poi-9".to_owned()]);

    let document = XmlChangesetCodec
        .decode(&response.change)
        .expect("merged document should decode");
    assert_eq!(document.create.len(), 3);
    assert_eq!(document.delete.len(), 1);
}

#[rstest]
fn execute_merge_rejects_unresolved_references() {
    let (_tmp, root) = workspace();
    let request_path = root.join("request.json");
    let mut request = merge_request();
    request["changes"][0]["change"]["create"][2]["nodes"] = json!([{ "id": -2 }, { "id": -9 }]);
    write_merge_request(&request_path, &request);
    let config = MergeConfig {
        request_path,
        external_id_tag: "externalId".to_owned(),
    };

    let err = execute_merge(&config).expect_err("dangling reference should fail");
    match err {
        CliError::Change(ChangeError::Merge(MergeError::UnresolvedReference {
            external_id,
            reference,
            ..
        })) => {
            assert_eq!(external_id, "road-1");
            assert_eq!(reference, -9);
        }
        other => panic!("expected UnresolvedReference, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "request_path": 42 }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;

    let (_tmp, root) = workspace();
    let env_request = root.join("from-env.json");
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "request_path": root.join("from-file.json").as_str(),
            "external_id_tag": "file:ref",
        }),
        None,
    );
    composer.push_environment(json!({ "request_path": env_request.as_str() }));
    composer.push_cli(json!({ "external_id_tag": "cli:ref" }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.request_path, env_request);
    assert_eq!(config.external_id_tag, "cli:ref");
}
