//! osmChange XML codec.
//!
//! [`XmlChangesetCodec`] implements [`ChangesetCodec`] on top of the
//! `quick-xml` event API. Encoding writes every action section with nodes
//! before ways; decoding normalises lone and repeated elements into plain
//! lists and keeps unknown element kinds as
//! [`ChangeEntry::Unsupported`](change_merger_core::ChangeEntry::Unsupported).
//!
//! # Example
//!
//! ```
//! use change_merger_core::{ChangesetCodec, ConsolidatedChangeset};
//! use change_merger_data::xml::XmlChangesetCodec;
//!
//! let codec = XmlChangesetCodec;
//! let xml = codec.encode(&ConsolidatedChangeset::new("change-merger"))?;
//! let document = codec.decode(&xml)?;
//! assert_eq!(document.generator.as_deref(), Some("change-merger"));
//! # Ok::<(), change_merger_core::CodecError>(())
//! ```

mod reader;
mod writer;

use change_merger_core::{ChangeDocument, ChangesetCodec, CodecError, ConsolidatedChangeset};

/// Reads and writes osmChange 0.6 XML.
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlChangesetCodec;

impl ChangesetCodec for XmlChangesetCodec {
    fn encode(&self, changeset: &ConsolidatedChangeset) -> Result<String, CodecError> {
        writer::write_changeset(changeset)
    }

    fn decode(&self, text: &str) -> Result<ChangeDocument, CodecError> {
        reader::read_document(text)
    }
}
