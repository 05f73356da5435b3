pub mod dto;
pub mod loader;

use crate::chain::{ApiStep, Chain};
use crate::codec::dto::{ChainDocument, StepDto};
use crate::error::CodecError;

/// Version stamped on every exported document and required on import.
pub const FORMAT_VERSION: &str = "1.0";

/// Encodes a chain as a portable `{"version": "1.0", "chain": [...]}`
/// document.
pub fn encode(chain: &Chain) -> String {
    serde_json::to_string_pretty(&document(chain)).expect("chain document serialization is infallible")
}

/// Decodes a portable document back into a chain.
///
/// All-or-nothing: version mismatch, a non-sequence `chain` field or any
/// invalid step yields a [`CodecError`] and no chain. Unknown extra fields
/// are tolerated.
pub fn decode(text: &str) -> Result<Chain, CodecError> {
    let doc: ChainDocument =
        serde_json::from_str(text).map_err(|e| CodecError::Malformed(e.to_string()))?;
    decode_document(doc)
}

/// Appends the imported chain's steps after the existing ones.
///
/// Pure concatenation: no de-duplication, no reordering, no identity checks.
/// Two steps with identical content stay two distinct entries.
pub fn merge(existing: &Chain, imported: &Chain) -> Chain {
    let mut steps = existing.steps.clone();
    steps.extend(imported.steps.iter().cloned());
    Chain::new(steps)
}

pub(crate) fn document(chain: &Chain) -> ChainDocument {
    ChainDocument {
        version: FORMAT_VERSION.to_string(),
        chain: chain.steps.iter().map(StepDto::from).collect(),
    }
}

pub(crate) fn decode_document(doc: ChainDocument) -> Result<Chain, CodecError> {
    if doc.version != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion(doc.version));
    }

    let mut steps = Vec::with_capacity(doc.chain.len());
    for (index, dto) in doc.chain.into_iter().enumerate() {
        let step =
            ApiStep::try_from(dto).map_err(|reason| CodecError::InvalidStep { index, reason })?;
        steps.push(step);
    }

    Ok(Chain::new(steps))
}
