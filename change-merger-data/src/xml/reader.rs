//! osmChange parsing into the normalised read model.
//!
//! Action sections may repeat, as in API downloads where every element sits
//! in its own `<modify>` block; their entries are appended in document order.
//! Children other than `<tag>` are ignored, so way `<nd>` references and
//! relation members never reach the read model.

use std::str::FromStr;

use log::warn;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use change_merger_core::{
    Action, ChangeDocument, ChangeElement, ChangeEntry, CodecError, ElementKind, OsmTag,
};

type XmlReader<'a> = Reader<&'a [u8]>;

const ROOT: &[u8] = b"osmChange";

fn decode_error(err: impl std::fmt::Display) -> CodecError {
    CodecError::Decode {
        message: err.to_string(),
    }
}

fn element_name(start: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

fn section_action(name: &[u8]) -> Option<Action> {
    match name {
        b"create" => Some(Action::Create),
        b"modify" => Some(Action::Modify),
        b"delete" => Some(Action::Delete),
        _ => None,
    }
}

fn element_kind(name: &[u8]) -> Option<ElementKind> {
    std::str::from_utf8(name).ok().and_then(ElementKind::from_name)
}

/// Read `text` as an osmChange document.
pub(super) fn read_document(text: &str) -> Result<ChangeDocument, CodecError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let (root, has_children) = loop {
        match reader.read_event().map_err(decode_error)? {
            Event::Start(start) => break (start, true),
            Event::Empty(start) => break (start, false),
            Event::Eof => return Err(decode_error("document has no root element")),
            _ => {}
        }
    };
    if root.name().as_ref() != ROOT {
        return Err(decode_error(format_args!(
            "expected <osmChange> root element, found <{}>",
            element_name(&root)
        )));
    }

    let mut document = ChangeDocument {
        generator: attribute(&root, "generator")?,
        version: attribute(&root, "version")?,
        ..ChangeDocument::default()
    };
    if has_children {
        read_sections(&mut reader, &mut document)?;
    }
    Ok(document)
}

fn read_sections(reader: &mut XmlReader<'_>, document: &mut ChangeDocument) -> Result<(), CodecError> {
    loop {
        match reader.read_event().map_err(decode_error)? {
            Event::Start(start) => match section_action(start.name().as_ref()) {
                Some(action) => read_entries(reader, document.entries_mut(action))?,
                None => {
                    warn!("skipping unknown osmChange section <{}>", element_name(&start));
                    reader.read_to_end(start.name()).map_err(decode_error)?;
                }
            },
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(decode_error("unexpected end of document in <osmChange>")),
            _ => {}
        }
    }
}

fn read_entries(reader: &mut XmlReader<'_>, entries: &mut Vec<ChangeEntry>) -> Result<(), CodecError> {
    loop {
        match reader.read_event().map_err(decode_error)? {
            Event::Start(start) => {
                let entry = match element_kind(start.name().as_ref()) {
                    Some(kind) => {
                        let mut element = read_element(&start, kind)?;
                        element.tags = read_tags(reader)?;
                        ChangeEntry::Element(element)
                    }
                    None => {
                        reader.read_to_end(start.name()).map_err(decode_error)?;
                        ChangeEntry::Unsupported {
                            name: element_name(&start),
                        }
                    }
                };
                entries.push(entry);
            }
            Event::Empty(start) => {
                let entry = match element_kind(start.name().as_ref()) {
                    Some(kind) => ChangeEntry::Element(read_element(&start, kind)?),
                    None => ChangeEntry::Unsupported {
                        name: element_name(&start),
                    },
                };
                entries.push(entry);
            }
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(decode_error("unexpected end of document in action section")),
            _ => {}
        }
    }
}

/// Collect `<tag>` children up to the end of the enclosing element.
fn read_tags(reader: &mut XmlReader<'_>) -> Result<Vec<OsmTag>, CodecError> {
    let mut tags = Vec::new();
    loop {
        match reader.read_event().map_err(decode_error)? {
            Event::Empty(start) => {
                if start.name().as_ref() == b"tag" {
                    tags.push(read_tag(&start)?);
                }
            }
            Event::Start(start) => {
                if start.name().as_ref() == b"tag" {
                    tags.push(read_tag(&start)?);
                }
                reader.read_to_end(start.name()).map_err(decode_error)?;
            }
            Event::End(_) => return Ok(tags),
            Event::Eof => return Err(decode_error("unexpected end of document in element")),
            _ => {}
        }
    }
}

fn read_tag(start: &BytesStart<'_>) -> Result<OsmTag, CodecError> {
    let key = required(start, "k")?;
    let value = attribute(start, "v")?.unwrap_or_default();
    Ok(OsmTag::new(key, value))
}

fn read_element(start: &BytesStart<'_>, kind: ElementKind) -> Result<ChangeElement, CodecError> {
    let id = parse(start, "id", &required(start, "id")?)?;
    let mut element = ChangeElement::new(kind, id, Vec::new());
    element.version = attribute(start, "version")?
        .map(|raw| parse(start, "version", &raw))
        .transpose()?;
    element.changeset = attribute(start, "changeset")?
        .map(|raw| parse(start, "changeset", &raw))
        .transpose()?;
    Ok(element)
}

fn attribute(start: &BytesStart<'_>, key: &str) -> Result<Option<String>, CodecError> {
    for attr in start.attributes() {
        let attr = attr.map_err(decode_error)?;
        if attr.key.as_ref() == key.as_bytes() {
            let value = attr.unescape_value().map_err(decode_error)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn required(start: &BytesStart<'_>, key: &str) -> Result<String, CodecError> {
    attribute(start, key)?.ok_or_else(|| {
        decode_error(format_args!(
            "<{}> is missing the {key} attribute",
            element_name(start)
        ))
    })
}

fn parse<T>(start: &BytesStart<'_>, key: &str, raw: &str) -> Result<T, CodecError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|err| {
        decode_error(format_args!(
            "invalid {key} {raw:?} on <{}>: {err}",
            element_name(start)
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn elements(entries: &[ChangeEntry]) -> Vec<(ElementKind, i64)> {
        entries
            .iter()
            .filter_map(|entry| match entry {
                ChangeEntry::Element(element) => Some((element.kind, element.id)),
                ChangeEntry::Unsupported { .. } => None,
            })
            .collect()
    }

    #[rstest]
    fn reads_single_element_with_single_tag() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
            <osmChange version="0.6" generator="osm">
              <create>
                <node id="-1" lat="1" lon="2" version="1" changeset="5">
                  <tag k="externalId" v="a"/>
                </node>
              </create>
            </osmChange>"#;

        let document = read_document(xml).expect("decode succeeds");

        assert_eq!(document.generator.as_deref(), Some("osm"));
        assert_eq!(document.version.as_deref(), Some("0.6"));
        let ChangeEntry::Element(element) = &document.create[0] else {
            panic!("expected an element");
        };
        assert_eq!(element.kind, ElementKind::Node);
        assert_eq!(element.id, -1);
        assert_eq!(element.version, Some(1));
        assert_eq!(element.changeset, Some(5));
        assert_eq!(element.tags, vec![OsmTag::new("externalId", "a")]);
    }

    #[rstest]
    fn keeps_interleaved_kinds_in_document_order() {
        let xml = r#"<osmChange version="0.6">
              <delete>
                <way id="5" version="2"><nd ref="6"/><nd ref="7"/></way>
                <node id="6" lat="1" lon="1" version="1"/>
                <way id="8" version="1"/>
              </delete>
            </osmChange>"#;

        let document = read_document(xml).expect("decode succeeds");

        assert_eq!(
            elements(&document.delete),
            vec![
                (ElementKind::Way, 5),
                (ElementKind::Node, 6),
                (ElementKind::Way, 8)
            ]
        );
    }

    #[rstest]
    fn appends_repeated_sections() {
        let xml = r#"<osmChange version="0.6">
              <modify><node id="1" lat="0" lon="0"/></modify>
              <create><node id="2" lat="0" lon="0"/></create>
              <modify><way id="3"/></modify>
            </osmChange>"#;

        let document = read_document(xml).expect("decode succeeds");

        assert_eq!(
            elements(&document.modify),
            vec![(ElementKind::Node, 1), (ElementKind::Way, 3)]
        );
        assert_eq!(elements(&document.create), vec![(ElementKind::Node, 2)]);
    }

    #[rstest]
    fn records_relations_as_unsupported() {
        let xml = r#"<osmChange version="0.6">
              <create>
                <relation id="-9" version="0">
                  <member type="way" ref="-1" role="outer"/>
                  <tag k="externalId" v="r"/>
                </relation>
                <node id="1" lat="0" lon="0"><tag k="externalId" v="n"/></node>
              </create>
            </osmChange>"#;

        let document = read_document(xml).expect("decode succeeds");

        assert_eq!(
            document.create[0],
            ChangeEntry::Unsupported {
                name: "relation".into()
            }
        );
        assert_eq!(elements(&document.create), vec![(ElementKind::Node, 1)]);
    }

    #[rstest]
    fn unescapes_tag_values() {
        let xml = r#"<osmChange><create>
              <node id="1" lat="0" lon="0"><tag k="name" v="Fish &amp; Chips"/></node>
            </create></osmChange>"#;

        let document = read_document(xml).expect("decode succeeds");

        let ChangeEntry::Element(element) = &document.create[0] else {
            panic!("expected an element");
        };
        assert_eq!(element.tags, vec![OsmTag::new("name", "Fish & Chips")]);
    }

    #[rstest]
    fn accepts_empty_document() {
        let document = read_document("<osmChange version=\"0.6\"/>").expect("decode succeeds");

        assert!(document.create.is_empty());
        assert!(document.modify.is_empty());
        assert!(document.delete.is_empty());
    }

    #[rstest]
    #[case("", "no root element")]
    #[case("<osm version=\"0.6\"/>", "expected <osmChange>")]
    #[case("<osmChange><create><node lat=\"0\"/></create></osmChange>", "missing the id")]
    #[case("<osmChange><create><node id=\"x\"/></create></osmChange>", "invalid id")]
    #[case("<osmChange><create><node id=\"1\">", "")]
    fn rejects_malformed_documents(#[case] xml: &str, #[case] expected: &str) {
        let err = read_document(xml).expect_err("decode fails");

        let CodecError::Decode { message } = err else {
            panic!("expected a decode error, got {err:?}");
        };
        assert!(message.contains(expected), "{message}");
    }
}
