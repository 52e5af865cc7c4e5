//! Extraction of external-identifier mappings from osmChange documents.

use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Action, ChangeDocument, ChangeElement, ChangeEntry, ElementKind, OsmTag};

/// Tag key carrying the external identifier unless configured otherwise.
pub const DEFAULT_EXTERNAL_ID_TAG: &str = "externalId";

/// Actions interpreted when the caller does not name any.
pub const DEFAULT_ACTIONS: [Action; 2] = [Action::Create, Action::Delete];

/// One element that carried the external-identifier tag.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct InterpretedEntry {
    /// Kind of the element.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: ElementKind,
    /// OSM identifier of the element.
    pub osm_id: i64,
    /// Value of the external-identifier tag.
    pub external_id: String,
    /// Requested lookup tags present on the element, in element order.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub tags: Option<Vec<OsmTag>>,
}

/// Interpretation output keyed by past-tense action name.
///
/// A field is `Some` exactly when its action was requested.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InterpretResult {
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub created: Option<Vec<InterpretedEntry>>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub modified: Option<Vec<InterpretedEntry>>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub deleted: Option<Vec<InterpretedEntry>>,
}

impl InterpretResult {
    /// Entries for `action`, if it was requested.
    pub fn entries(&self, action: Action) -> Option<&[InterpretedEntry]> {
        match action {
            Action::Create => self.created.as_deref(),
            Action::Modify => self.modified.as_deref(),
            Action::Delete => self.deleted.as_deref(),
        }
    }

    fn slot_mut(&mut self, action: Action) -> &mut Option<Vec<InterpretedEntry>> {
        match action {
            Action::Create => &mut self.created,
            Action::Modify => &mut self.modified,
            Action::Delete => &mut self.deleted,
        }
    }
}

/// Walks a decoded document looking for the external-identifier tag.
///
/// # Examples
/// ```
/// use change_merger_core::{
///     Action, ChangeDocument, ChangeElement, ChangeEntry, ElementKind, Interpreter, OsmTag,
/// };
///
/// let mut document = ChangeDocument::default();
/// document.modify.push(ChangeEntry::Element(ChangeElement::new(
///     ElementKind::Node,
///     42,
///     vec![OsmTag::new("externalId", "ext-1"), OsmTag::new("name", "x")],
/// )));
///
/// let interpreter = Interpreter::new("externalId");
/// let result = interpreter.interpret(&document, Some(&[Action::Modify]), None);
///
/// let modified = result.modified.expect("modify was requested");
/// assert_eq!(modified[0].osm_id, 42);
/// assert_eq!(modified[0].external_id, "ext-1");
/// assert!(result.created.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Interpreter {
    external_id_tag: String,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(DEFAULT_EXTERNAL_ID_TAG)
    }
}

impl Interpreter {
    /// An interpreter matching tags keyed `external_id_tag`.
    pub fn new(external_id_tag: impl Into<String>) -> Self {
        Self {
            external_id_tag: external_id_tag.into(),
        }
    }

    /// The configured external-identifier tag key.
    pub fn external_id_tag(&self) -> &str {
        &self.external_id_tag
    }

    /// Interpret `actions` of `document`, defaulting to create and delete.
    ///
    /// Only requested actions are populated, each with an empty list when the
    /// document holds nothing relevant for it.
    pub fn interpret(
        &self,
        document: &ChangeDocument,
        actions: Option<&[Action]>,
        lookup_tags: Option<&[String]>,
    ) -> InterpretResult {
        let actions = actions.unwrap_or(&DEFAULT_ACTIONS);
        let mut result = InterpretResult::default();
        for &action in actions {
            let entries = self.interpret_entries(document.entries(action), lookup_tags);
            *result.slot_mut(action) = Some(entries);
        }
        result
    }

    fn interpret_entries(
        &self,
        entries: &[ChangeEntry],
        lookup_tags: Option<&[String]>,
    ) -> Vec<InterpretedEntry> {
        entries
            .iter()
            .filter_map(|entry| match entry {
                ChangeEntry::Element(element) => self.interpret_element(element, lookup_tags),
                ChangeEntry::Unsupported { name } => {
                    debug!("skipping unsupported element <{name}>");
                    None
                }
            })
            .collect()
    }

    fn interpret_element(
        &self,
        element: &ChangeElement,
        lookup_tags: Option<&[String]>,
    ) -> Option<InterpretedEntry> {
        let external_id = element
            .tags
            .iter()
            .find(|tag| tag.k == self.external_id_tag)?;
        Some(InterpretedEntry {
            kind: element.kind,
            osm_id: element.id,
            external_id: external_id.v.clone(),
            tags: lookup_tags.and_then(|keys| select_tags(&element.tags, keys)),
        })
    }
}

fn select_tags(tags: &[OsmTag], keys: &[String]) -> Option<Vec<OsmTag>> {
    let found: Vec<OsmTag> = tags
        .iter()
        .filter(|tag| keys.iter().any(|key| *key == tag.k))
        .cloned()
        .collect();
    (!found.is_empty()).then_some(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn element(kind: ElementKind, id: i64, tags: &[(&str, &str)]) -> ChangeEntry {
        ChangeEntry::Element(ChangeElement::new(
            kind,
            id,
            tags.iter().map(|(k, v)| OsmTag::new(*k, *v)).collect(),
        ))
    }

    #[fixture]
    fn document() -> ChangeDocument {
        ChangeDocument {
            generator: Some("test".into()),
            version: Some("0.6".into()),
            create: vec![
                element(ElementKind::Node, -1, &[("externalId", "n1"), ("cat", "meow")]),
                element(ElementKind::Node, -2, &[("cat", "meow")]),
                element(ElementKind::Way, -3, &[("externalId", "w1"), ("road", "yes")]),
                ChangeEntry::Unsupported {
                    name: "relation".into(),
                },
            ],
            modify: vec![element(ElementKind::Way, 7, &[("externalId", "w2")])],
            delete: vec![element(ElementKind::Node, 9, &[("externalId", "n9")])],
        }
    }

    #[rstest]
    fn defaults_to_create_and_delete(document: ChangeDocument) {
        let result = Interpreter::default().interpret(&document, None, None);

        let created = result.created.expect("create is a default action");
        assert_eq!(
            created,
            vec![
                InterpretedEntry {
                    kind: ElementKind::Node,
                    osm_id: -1,
                    external_id: "n1".into(),
                    tags: None,
                },
                InterpretedEntry {
                    kind: ElementKind::Way,
                    osm_id: -3,
                    external_id: "w1".into(),
                    tags: None,
                },
            ]
        );
        assert!(result.modified.is_none());
        assert_eq!(result.deleted.map(|entries| entries.len()), Some(1));
    }

    #[rstest]
    fn default_actions_are_present_when_empty() {
        let result = Interpreter::default().interpret(&ChangeDocument::default(), None, None);

        assert_eq!(result.created, Some(Vec::new()));
        assert_eq!(result.deleted, Some(Vec::new()));
        assert!(result.modified.is_none());
    }

    #[rstest]
    fn explicit_empty_action_list_yields_empty_result(document: ChangeDocument) {
        let result = Interpreter::default().interpret(&document, Some(&[]), None);

        assert_eq!(result, InterpretResult::default());
    }

    #[rstest]
    #[case(Action::Create, 2)]
    #[case(Action::Modify, 1)]
    #[case(Action::Delete, 1)]
    fn populates_only_requested_action(
        document: ChangeDocument,
        #[case] action: Action,
        #[case] expected: usize,
    ) {
        let result = Interpreter::default().interpret(&document, Some(&[action]), None);

        for other in Action::ALL {
            let entries = result.entries(other);
            if other == action {
                assert_eq!(entries.map(<[InterpretedEntry]>::len), Some(expected));
            } else {
                assert!(entries.is_none(), "{other} was not requested");
            }
        }
    }

    #[rstest]
    fn lookup_tags_select_matching_keys(document: ChangeDocument) {
        let lookup = vec!["cat".to_owned(), "missing".to_owned()];

        let result =
            Interpreter::default().interpret(&document, Some(&[Action::Create]), Some(&lookup));

        let created = result.created.expect("create was requested");
        assert_eq!(created[0].tags, Some(vec![OsmTag::new("cat", "meow")]));
        assert_eq!(created[1].tags, None, "no requested tag on the way");
    }

    #[rstest]
    fn honours_configured_tag_key() {
        let document = ChangeDocument {
            create: vec![element(ElementKind::Node, 4, &[("ref:ext", "r4")])],
            ..ChangeDocument::default()
        };

        let result = Interpreter::new("ref:ext").interpret(&document, None, None);

        assert_eq!(
            result.created.expect("create requested")[0].external_id,
            "r4"
        );
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn serialises_with_wire_field_names() {
        let result = InterpretResult {
            created: Some(vec![InterpretedEntry {
                kind: ElementKind::Way,
                osm_id: 5,
                external_id: "x".into(),
                tags: Some(vec![OsmTag::new("a", "b")]),
            }]),
            modified: None,
            deleted: Some(Vec::new()),
        };

        let value = serde_json::to_value(&result).expect("serialise result");

        assert_eq!(
            value,
            serde_json::json!({
                "created": [{ "type": "way", "osmId": 5, "externalId": "x", "tags": [{ "k": "a", "v": "b" }] }],
                "deleted": []
            })
        );
    }
}
