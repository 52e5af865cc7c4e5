//! osmChange serialisation.

use std::borrow::Cow;

use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::name::QName;

use change_merger_core::{
    Action, ActionBucket, ChangesetNode, ChangesetWay, CodecError, ConsolidatedChangeset, OsmTag,
};

type XmlWriter = Writer<Vec<u8>>;

const INDENT_WIDTH: usize = 2;

fn encode_error(err: impl std::fmt::Display) -> CodecError {
    CodecError::Encode {
        message: err.to_string(),
    }
}

fn write(writer: &mut XmlWriter, event: Event<'_>) -> Result<(), CodecError> {
    writer.write_event(event).map_err(encode_error)
}

/// Attribute carrying free text.
///
/// Line breaks and tabs become character references so that parsers applying
/// attribute-value normalisation read them back unchanged.
fn text_attribute<'a>(key: &'a str, value: &str) -> Attribute<'a> {
    let markup_escaped = escape(value);
    let mut escaped = String::with_capacity(markup_escaped.len());
    for ch in markup_escaped.chars() {
        match ch {
            '\n' => escaped.push_str("&#10;"),
            '\r' => escaped.push_str("&#13;"),
            '\t' => escaped.push_str("&#9;"),
            other => escaped.push(other),
        }
    }
    Attribute {
        key: QName(key.as_bytes()),
        value: Cow::Owned(escaped.into_bytes()),
    }
}

/// Serialise `changeset` as an indented osmChange document.
///
/// Every action section is written, empty ones as self-closing elements.
/// Within a section nodes precede ways.
pub(super) fn write_changeset(changeset: &ConsolidatedChangeset) -> Result<String, CodecError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT_WIDTH);
    write(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let root = BytesStart::new("osmChange").with_attributes([
        Attribute::from(("version", changeset.version())),
        text_attribute("generator", &changeset.generator),
    ]);
    write(&mut writer, Event::Start(root.borrow()))?;
    for action in Action::ALL {
        write_bucket(&mut writer, action, changeset.bucket(action))?;
    }
    write(&mut writer, Event::End(root.to_end()))?;

    String::from_utf8(writer.into_inner()).map_err(encode_error)
}

fn write_bucket(
    writer: &mut XmlWriter,
    action: Action,
    bucket: &ActionBucket,
) -> Result<(), CodecError> {
    let section = BytesStart::new(action.as_str());
    if bucket.is_empty() {
        return write(writer, Event::Empty(section));
    }
    write(writer, Event::Start(section.borrow()))?;
    for node in &bucket.nodes {
        write_node(writer, node)?;
    }
    for way in &bucket.ways {
        write_way(writer, way)?;
    }
    write(writer, Event::End(BytesEnd::new(action.as_str())))
}

fn write_node(writer: &mut XmlWriter, node: &ChangesetNode) -> Result<(), CodecError> {
    let id = node.id.to_string();
    let lat = node.lat.to_string();
    let lon = node.lon.to_string();
    let version = node.version.to_string();
    let changeset = node.changeset.to_string();
    let start = BytesStart::new("node").with_attributes([
        ("id", id.as_str()),
        ("lat", lat.as_str()),
        ("lon", lon.as_str()),
        ("version", version.as_str()),
        ("changeset", changeset.as_str()),
    ]);
    if node.tags.is_empty() {
        return write(writer, Event::Empty(start));
    }
    write(writer, Event::Start(start.borrow()))?;
    write_tags(writer, &node.tags)?;
    write(writer, Event::End(start.to_end()))
}

fn write_way(writer: &mut XmlWriter, way: &ChangesetWay) -> Result<(), CodecError> {
    let id = way.id.to_string();
    let version = way.version.to_string();
    let changeset = way.changeset.to_string();
    let start = BytesStart::new("way").with_attributes([
        ("id", id.as_str()),
        ("version", version.as_str()),
        ("changeset", changeset.as_str()),
    ]);
    if way.node_refs.is_empty() && way.tags.is_empty() {
        return write(writer, Event::Empty(start));
    }
    write(writer, Event::Start(start.borrow()))?;
    for node_ref in &way.node_refs {
        let reference = node_ref.to_string();
        write(
            writer,
            Event::Empty(BytesStart::new("nd").with_attributes([("ref", reference.as_str())])),
        )?;
    }
    write_tags(writer, &way.tags)?;
    write(writer, Event::End(start.to_end()))
}

fn write_tags(writer: &mut XmlWriter, tags: &[OsmTag]) -> Result<(), CodecError> {
    for tag in tags {
        let element = BytesStart::new("tag")
            .with_attributes([text_attribute("k", &tag.k), text_attribute("v", &tag.v)]);
        write(writer, Event::Empty(element))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn changeset() -> ConsolidatedChangeset {
        let mut changeset = ConsolidatedChangeset::new("change-merger");
        changeset.create.nodes.push(ChangesetNode {
            id: -1,
            lat: 24.5,
            lon: 13.0,
            version: 0,
            changeset: 7,
            tags: vec![OsmTag::new("name", "Fish & \"Chips\"")],
        });
        changeset.create.ways.push(ChangesetWay {
            id: -2,
            version: 0,
            changeset: 7,
            node_refs: vec![-1, 4],
            tags: Vec::new(),
        });
        changeset.delete.nodes.push(ChangesetNode {
            id: 9,
            lat: 1.0,
            lon: 2.0,
            version: 3,
            changeset: 7,
            tags: Vec::new(),
        });
        changeset
    }

    #[rstest]
    fn writes_root_with_version_and_generator(changeset: ConsolidatedChangeset) {
        let xml = write_changeset(&changeset).expect("encode succeeds");

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<osmChange version=\"0.6\" generator=\"change-merger\">"));
        assert!(xml.trim_end().ends_with("</osmChange>"));
    }

    #[rstest]
    fn writes_sections_in_action_order(changeset: ConsolidatedChangeset) {
        let xml = write_changeset(&changeset).expect("encode succeeds");

        let create = xml.find("<create>").expect("create section");
        let modify = xml.find("<modify/>").expect("empty modify section");
        let delete = xml.find("<delete>").expect("delete section");
        assert!(create < modify && modify < delete);
    }

    #[rstest]
    fn writes_node_attributes_and_escaped_tags(changeset: ConsolidatedChangeset) {
        let xml = write_changeset(&changeset).expect("encode succeeds");

        assert!(xml.contains(
            "<node id=\"-1\" lat=\"24.5\" lon=\"13\" version=\"0\" changeset=\"7\">"
        ));
        assert!(xml.contains("<tag k=\"name\" v=\"Fish &amp; &quot;Chips&quot;\"/>"));
        assert!(xml.contains("<node id=\"9\" lat=\"1\" lon=\"2\" version=\"3\" changeset=\"7\"/>"));
    }

    #[rstest]
    fn writes_way_references_in_order(changeset: ConsolidatedChangeset) {
        let xml = write_changeset(&changeset).expect("encode succeeds");

        let first = xml.find("<nd ref=\"-1\"/>").expect("first reference");
        let second = xml.find("<nd ref=\"4\"/>").expect("second reference");
        assert!(first < second);
        assert!(
            xml.find("<node id=\"-1\"").expect("node") < xml.find("<way id=\"-2\"").expect("way"),
            "nodes precede ways"
        );
    }

    #[rstest]
    fn encoding_is_deterministic(changeset: ConsolidatedChangeset) {
        assert_eq!(
            write_changeset(&changeset).expect("encode succeeds"),
            write_changeset(&changeset).expect("encode succeeds")
        );
    }

    #[rstest]
    fn escapes_line_breaks_and_tabs_in_tag_values() {
        let mut changeset = ConsolidatedChangeset::new("change-merger");
        changeset.modify.nodes.push(ChangesetNode {
            id: 5,
            lat: 0.0,
            lon: 0.0,
            version: 2,
            changeset: 7,
            tags: vec![OsmTag::new("note", "a\nb\tc\r<d>")],
        });

        let xml = write_changeset(&changeset).expect("encode succeeds");

        assert!(
            xml.contains("<tag k=\"note\" v=\"a&#10;b&#9;c&#13;&lt;d&gt;\"/>"),
            "{xml}"
        );
    }
}
