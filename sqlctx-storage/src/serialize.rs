//! Embedding BLOB codec and metadata JSON mapping.
//!
//! Embedding format: a little-endian `u32` length prefix followed by that
//! many little-endian IEEE-754 binary32 values. The `embeddings.dimension`
//! column independently records the same count for fast validation without
//! decoding the blob.

use std::collections::BTreeMap;

use sqlctx_core::document::{Metadata, Value};
use sqlctx_core::error::{Error, Result};

#[must_use]
pub fn encode_embedding(vector: &[f32]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(4 + vector.len() * 4);
    buf.extend_from_slice(&(vector.len() as u32).to_le_bytes());
    for value in vector {
        buf.extend_from_slice(&value.to_le_bytes());
    }
    buf
}

pub fn decode_embedding(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() < 4 {
        return Err(Error::Storage("embedding blob shorter than length prefix".to_string()));
    }
    let (len_bytes, rest) = bytes.split_at(4);
    let len = u32::from_le_bytes(len_bytes.try_into().unwrap()) as usize;
    if rest.len() != len * 4 {
        return Err(Error::Storage(format!(
            "embedding blob declares {len} floats but has {} payload bytes",
            rest.len()
        )));
    }
    Ok(rest
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes(chunk.try_into().unwrap()))
        .collect())
}

pub fn metadata_to_json(metadata: &Metadata) -> Result<String> {
    serde_json::to_string(metadata).map_err(Error::from)
}

pub fn metadata_from_json(json: &str) -> Result<Metadata> {
    if json.is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(json).map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_roundtrips_bit_exactly() {
        let original = vec![0.1_f32, -2.5, 3.0, f32::MIN_POSITIVE, -0.0, 1234.5678];
        let encoded = encode_embedding(&original);
        let decoded = decode_embedding(&encoded).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn truncated_blob_is_an_error() {
        let encoded = encode_embedding(&[1.0, 2.0, 3.0]);
        assert!(decode_embedding(&encoded[..5]).is_err());
    }

    #[test]
    fn metadata_roundtrips_through_json() {
        let mut metadata = Metadata::new();
        metadata.insert("table".to_string(), Value::string("orders"));
        metadata.insert(
            "child_ids".to_string(),
            Value::list_of_strings(["a", "b"]),
        );
        let json = metadata_to_json(&metadata).unwrap();
        let restored = metadata_from_json(&json).unwrap();
        assert_eq!(metadata, restored);
    }
}
