//! Test doubles and fixtures shared by unit and behaviour tests.

use std::cell::RefCell;

use crate::{
    Action, ChangeBundle, ChangeDocument, ChangesetCodec, ChangesetSource, CodecError,
    ConsolidatedChangeset, FetchError, LogicalChange, OsmNode, OsmWay, Primitive, RemoteKind,
    Tags,
};

/// An untagged node at the origin.
pub fn node(id: i64) -> Primitive {
    Primitive::Node(OsmNode::new(id, 0.0, 0.0, Tags::new()))
}

/// A node with a position and one tag.
pub fn tagged_node(id: i64, lat: f64, lon: f64, key: &str, value: &str) -> Primitive {
    let tags = Tags::from([(key.to_owned(), value.to_owned())]);
    Primitive::Node(OsmNode::new(id, lat, lon, tags))
}

/// An untagged way over `node_ids`.
pub fn way<I>(id: i64, node_ids: I) -> Primitive
where
    I: IntoIterator<Item = i64>,
{
    Primitive::Way(OsmWay::new(id, node_ids, Tags::new()))
}

/// Three changes covering create, modify, and delete.
///
/// - `a` creates a three-node line with temporary ids and reports the way.
/// - `b` creates a node and modifies existing way 1 to reference it.
/// - `c` deletes way 5 together with its nodes and an unrelated node 1.
pub fn sample_changes() -> Vec<LogicalChange> {
    vec![
        LogicalChange::new(
            "a",
            Action::Create,
            ChangeBundle::with_create(vec![
                tagged_node(-2, 24.0, 24.0, "cat", "bark"),
                located(-3, 25.0),
                located(-4, 26.0),
                way(-1, [-2, -3, -4]),
            ]),
        )
        .with_temp_osm_id(-1),
        LogicalChange::new(
            "b",
            Action::Modify,
            ChangeBundle {
                create: vec![tagged_node(-2, 24.0, 24.0, "cat", "bark")],
                modify: vec![way(1, [-2, 3, 4])],
                delete: Vec::new(),
            },
        ),
        LogicalChange::new(
            "c",
            Action::Delete,
            ChangeBundle::with_delete(vec![
                tagged_node(1, 24.0, 24.0, "cat", "bark"),
                tagged_node(6, 24.0, 24.0, "cat", "bark"),
                located(7, 25.0),
                located(8, 26.0),
                way(5, [6, 7, 8]),
            ]),
        ),
    ]
}

fn located(id: i64, coordinate: f64) -> Primitive {
    Primitive::Node(OsmNode::new(id, coordinate, coordinate, Tags::new()))
}

/// Codec returning canned results and recording what it was given.
#[derive(Debug)]
pub struct StubCodec {
    encoded: Result<String, CodecError>,
    decoded: Result<ChangeDocument, CodecError>,
    encode_calls: RefCell<Vec<ConsolidatedChangeset>>,
    decode_calls: RefCell<Vec<String>>,
}

impl Default for StubCodec {
    fn default() -> Self {
        Self {
            encoded: Ok(String::new()),
            decoded: Ok(ChangeDocument::default()),
            encode_calls: RefCell::new(Vec::new()),
            decode_calls: RefCell::new(Vec::new()),
        }
    }
}

impl StubCodec {
    /// Encode every changeset to `text`.
    #[must_use]
    pub fn encoding_to(mut self, text: impl Into<String>) -> Self {
        self.encoded = Ok(text.into());
        self
    }

    /// Decode every input to `document`.
    #[must_use]
    pub fn decoding_to(mut self, document: ChangeDocument) -> Self {
        self.decoded = Ok(document);
        self
    }

    /// Fail every encode call with `error`.
    #[must_use]
    pub fn failing_encode(mut self, error: CodecError) -> Self {
        self.encoded = Err(error);
        self
    }

    /// Fail every decode call with `error`.
    #[must_use]
    pub fn failing_decode(mut self, error: CodecError) -> Self {
        self.decoded = Err(error);
        self
    }

    /// Changesets passed to `encode`, in call order.
    pub fn encoded_changesets(&self) -> Vec<ConsolidatedChangeset> {
        self.encode_calls.borrow().clone()
    }

    /// Texts passed to `decode`, in call order.
    pub fn decoded_texts(&self) -> Vec<String> {
        self.decode_calls.borrow().clone()
    }
}

impl ChangesetCodec for StubCodec {
    fn encode(&self, changeset: &ConsolidatedChangeset) -> Result<String, CodecError> {
        self.encode_calls.borrow_mut().push(changeset.clone());
        self.encoded.clone()
    }

    fn decode(&self, text: &str) -> Result<ChangeDocument, CodecError> {
        self.decode_calls.borrow_mut().push(text.to_owned());
        self.decoded.clone()
    }
}

/// In-memory [`ChangesetSource`] returning a canned response.
#[derive(Debug)]
pub struct StubChangesetSource {
    response: Result<ChangeDocument, FetchError>,
    calls: RefCell<Vec<(RemoteKind, u64)>>,
}

impl StubChangesetSource {
    /// A source serving `document` for every request.
    pub fn serving(document: ChangeDocument) -> Self {
        Self {
            response: Ok(document),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// A source failing every request with `error`.
    pub fn failing(error: FetchError) -> Self {
        Self {
            response: Err(error),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Requests received so far.
    pub fn calls(&self) -> Vec<(RemoteKind, u64)> {
        self.calls.borrow().clone()
    }
}

impl ChangesetSource for StubChangesetSource {
    fn fetch_change(
        &self,
        remote: RemoteKind,
        changeset_id: u64,
    ) -> Result<ChangeDocument, FetchError> {
        self.calls.borrow_mut().push((remote, changeset_id));
        self.response.clone()
    }
}
