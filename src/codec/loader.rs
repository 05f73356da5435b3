use anyhow::{Context as AnyhowContext, Result};
use std::fs;
use std::path::Path;

use crate::chain::Chain;
use crate::codec::dto::ChainDocument;
use crate::codec::{decode, decode_document};

/// Loads a chain document from disk.
///
/// `.yaml`/`.yml` files hold the same document shape in YAML for hand
/// authoring; everything else is parsed as the portable JSON format. Both go
/// through the same version and step validation.
pub fn load_chain_from_path(path: &Path) -> Result<Chain> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read chain document from {}", path.display()))?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );

    if is_yaml {
        let doc: ChainDocument = serde_yaml::from_str(&text)
            .with_context(|| format!("failed to parse YAML chain document {}", path.display()))?;
        Ok(decode_document(doc)?)
    } else {
        decode(&text).with_context(|| format!("failed to parse chain document {}", path.display()))
    }
}
