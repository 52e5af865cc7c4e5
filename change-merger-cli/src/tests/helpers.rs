//! Test helpers for composing CLI inputs on disk and stub changeset sources.

use super::*;
use crate::fetch::{FetchConfig, SourceBuilder};
use camino::{Utf8Path, Utf8PathBuf};
use change_merger_core::ChangesetSource;
use change_merger_data::remote::test_support::RecordedChangesetSource;
use serde_json::{Value, json};
use std::cell::RefCell;
use tempfile::TempDir;

/// An osmChange download touching every action section.
pub(super) const PUBLISHED_CHANGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osmChange version="0.6" generator="openstreetmap-cgimap 2.0.1">
  <create>
    <node id="5001" lat="32.1" lon="34.8" version="1" changeset="77">
      <tag k="externalId" v="poi-1"/>
      <tag k="name" v="Kiosk"/>
    </node>
    <node id="5002" lat="32.2" lon="34.9" version="1" changeset="77"/>
  </create>
  <modify>
    <way id="6001" version="3" changeset="77">
      <nd ref="5001"/>
      <nd ref="5002"/>
      <tag k="externalId" v="road-1"/>
    </way>
  </modify>
  <delete>
    <node id="4001" lat="32.0" lon="34.0" version="2" changeset="77">
      <tag k="externalId" v="poi-0"/>
    </node>
  </delete>
</osmChange>
"#;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path, contents).unwrap_or_else(|err| panic!("write {path}: {err}"));
}

/// A temporary directory addressed through UTF-8 paths.
pub(super) fn workspace() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

/// A merge request creating one road and deleting one existing point.
pub(super) fn merge_request() -> Value {
    json!({
        "changesetId": 7,
        "changes": [
            {
                "externalId": "road-1",
                "action": "create",
                "tempOsmId": -1,
                "change": {
                    "create": [
                        { "type": "node", "id": -2, "lat": 32.1, "lon": 34.8 },
                        { "type": "node", "id": -3, "lat": 32.2, "lon": 34.9 },
                        {
                            "type": "way",
                            "id": -1,
                            "tags": { "externalId": "road-1", "highway": "residential" },
                            "nodes": [{ "id": -2 }, { "id": -3 }]
                        }
                    ]
                }
            },
            {
                "externalId": "poi-9",
                "action": "delete",
                "change": {
                    "delete": [
                        {
                            "type": "node",
                            "id": 90,
                            "lat": 31.0,
                            "lon": 35.0,
                            "version": 3,
                            "tags": { "externalId": "poi-9" }
                        }
                    ]
                }
            }
        ]
    })
}

pub(super) fn write_merge_request(path: &Utf8Path, request: &Value) {
    let payload = serde_json::to_string_pretty(request).expect("serialise request");
    write_utf8(path, payload.as_bytes());
}

/// Serves [`PUBLISHED_CHANGE`] for one changeset on both remotes and records
/// the configurations it was asked to build for.
#[derive(Debug)]
pub(super) struct StubSourceBuilder {
    changeset_id: u64,
    built: RefCell<Vec<FetchConfig>>,
}

impl StubSourceBuilder {
    pub(super) fn serving(changeset_id: u64) -> Self {
        Self {
            changeset_id,
            built: RefCell::new(Vec::new()),
        }
    }

    pub(super) fn built(&self) -> Vec<FetchConfig> {
        self.built.borrow().clone()
    }
}

impl SourceBuilder for StubSourceBuilder {
    fn build(&self, config: &FetchConfig) -> Result<Box<dyn ChangesetSource>, CliError> {
        self.built.borrow_mut().push(config.clone());
        let source = RecordedChangesetSource::default()
            .with_api_body(self.changeset_id, PUBLISHED_CHANGE)
            .with_replication_body(self.changeset_id, PUBLISHED_CHANGE);
        Ok(Box::new(source))
    }
}
