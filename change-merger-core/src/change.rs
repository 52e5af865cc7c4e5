//! Logical changes: the unit of work submitted to the merger.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Primitive;

/// The three osmChange actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Action {
    /// New elements.
    Create,
    /// Changed elements.
    Modify,
    /// Removed elements.
    Delete,
}

impl Action {
    /// Every action in osmChange document order.
    pub const ALL: [Self; 3] = [Self::Create, Self::Modify, Self::Delete];

    /// The lowercase osmChange section name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Modify => "modify",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an [`Action`] from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action {value:?} (expected create, modify or delete)")]
pub struct ParseActionError {
    /// The rejected input.
    pub value: String,
}

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "create" => Ok(Self::Create),
            "modify" => Ok(Self::Modify),
            "delete" => Ok(Self::Delete),
            other => Err(ParseActionError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Primitives of a logical change, grouped per action.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChangeBundle {
    /// Elements to create.
    #[cfg_attr(feature = "serde", serde(default))]
    pub create: Vec<Primitive>,
    /// Elements to modify.
    #[cfg_attr(feature = "serde", serde(default))]
    pub modify: Vec<Primitive>,
    /// Elements to delete.
    #[cfg_attr(feature = "serde", serde(default))]
    pub delete: Vec<Primitive>,
}

impl ChangeBundle {
    /// A bundle containing only created primitives.
    pub fn with_create(create: Vec<Primitive>) -> Self {
        Self {
            create,
            ..Self::default()
        }
    }

    /// A bundle containing only modified primitives.
    pub fn with_modify(modify: Vec<Primitive>) -> Self {
        Self {
            modify,
            ..Self::default()
        }
    }

    /// A bundle containing only deleted primitives.
    pub fn with_delete(delete: Vec<Primitive>) -> Self {
        Self {
            delete,
            ..Self::default()
        }
    }

    /// Primitives recorded for `action`.
    pub fn primitives(&self, action: Action) -> &[Primitive] {
        match action {
            Action::Create => &self.create,
            Action::Modify => &self.modify,
            Action::Delete => &self.delete,
        }
    }

    /// Iterate every primitive in create, modify, delete order.
    pub fn iter(&self) -> impl Iterator<Item = &Primitive> + '_ {
        Action::ALL
            .into_iter()
            .flat_map(move |action| self.primitives(action).iter())
    }
}

/// One caller-submitted unit tied to a single external identifier.
///
/// # Examples
/// ```
/// use change_merger_core::{Action, ChangeBundle, LogicalChange};
///
/// let change = LogicalChange::new("road-17", Action::Delete, ChangeBundle::default());
/// assert_eq!(change.temp_osm_id, None);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct LogicalChange {
    /// Identifier of the record in the external system.
    pub external_id: String,
    /// What the change does to that record.
    pub action: Action,
    /// The primitives to apply.
    pub change: ChangeBundle,
    /// Temporary id of the primitive whose generated id must be reported.
    #[cfg_attr(feature = "serde", serde(default))]
    pub temp_osm_id: Option<i64>,
}

impl LogicalChange {
    /// Construct a change without a reported temporary id.
    pub fn new(external_id: impl Into<String>, action: Action, change: ChangeBundle) -> Self {
        Self {
            external_id: external_id.into(),
            action,
            change,
            temp_osm_id: None,
        }
    }

    /// Name the primitive whose generated id is reported back.
    #[must_use]
    pub fn with_temp_osm_id(mut self, temp_osm_id: i64) -> Self {
        self.temp_osm_id = Some(temp_osm_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OsmNode, Tags};
    use rstest::rstest;

    #[rstest]
    #[case("create", Action::Create)]
    #[case(" modify ", Action::Modify)]
    #[case("delete", Action::Delete)]
    fn parses_actions(#[case] input: &str, #[case] expected: Action) {
        assert_eq!(input.parse::<Action>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_actions() {
        let err = "xd".parse::<Action>().expect_err("unknown action");
        assert_eq!(err.value, "xd");
    }

    #[rstest]
    fn bundle_iterates_in_action_order() {
        let node = |id| Primitive::Node(OsmNode::new(id, 0.0, 0.0, Tags::new()));
        let bundle = ChangeBundle {
            create: vec![node(1)],
            modify: vec![node(2), node(3)],
            delete: vec![node(4)],
        };

        let ids: Vec<i64> = bundle.iter().map(Primitive::id).collect();

        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn deserialises_camel_case_request_items() {
        let json = r#"{
            "action": "create",
            "tempOsmId": -5,
            "externalId": "aaa",
            "change": {
                "type": "osmchange",
                "create": [{ "id": -5, "type": "node", "lon": 13, "lat": 14, "tags": { "cat": "meow" }, "version": 1 }]
            }
        }"#;

        let change: LogicalChange = serde_json::from_str(json).expect("change should deserialise");

        assert_eq!(change.external_id, "aaa");
        assert_eq!(change.action, Action::Create);
        assert_eq!(change.temp_osm_id, Some(-5));
        assert_eq!(change.change.create.len(), 1);
        assert!(change.change.modify.is_empty());
    }
}
