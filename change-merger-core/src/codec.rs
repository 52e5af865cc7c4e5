//! Text encoding seam for osmChange documents.

use thiserror::Error;

use crate::{ChangeDocument, ConsolidatedChangeset};

/// Errors raised while converting between documents and text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Writing the document failed.
    #[error("failed to encode osmChange: {message}")]
    Encode { message: String },
    /// The text is not a readable osmChange document.
    #[error("failed to decode osmChange: {message}")]
    Decode { message: String },
}

/// Converts changesets to text and text to documents.
///
/// Implementations must be deterministic: encoding the same changeset twice
/// yields identical text.
pub trait ChangesetCodec {
    /// Serialise a merged changeset.
    fn encode(&self, changeset: &ConsolidatedChangeset) -> Result<String, CodecError>;

    /// Parse an osmChange document into its normalised read model.
    fn decode(&self, text: &str) -> Result<ChangeDocument, CodecError>;
}

impl<T: ChangesetCodec + ?Sized> ChangesetCodec for &T {
    fn encode(&self, changeset: &ConsolidatedChangeset) -> Result<String, CodecError> {
        (**self).encode(changeset)
    }

    fn decode(&self, text: &str) -> Result<ChangeDocument, CodecError> {
        (**self).decode(text)
    }
}
