//! Bundle codec: gzip-compressed JSON `[register, table, index]`.

use crate::error::{FilestoreError, Result};
use bundledb_commons::Bundle;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Value of the `Content-Encoding` attribute attached to stored bundles.
pub const CONTENT_ENCODING: &str = "gzip";

/// Serialize and gzip a bundle.
pub fn encode_bundle(bundle: &Bundle) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(bundle)?;
    let mut encoder = GzEncoder::new(Vec::with_capacity(json.len() / 4), Compression::default());
    encoder.write_all(&json)?;
    Ok(encoder.finish()?)
}

/// Decode a stored bundle.
///
/// Uncompressed JSON is accepted as well, so hand-written fixtures load.
pub fn decode_bundle(data: &[u8]) -> Result<Bundle> {
    if is_gzip(data) {
        let mut json = Vec::new();
        GzDecoder::new(data)
            .read_to_end(&mut json)
            .map_err(|e| FilestoreError::Codec(format!("gunzip failed: {e}")))?;
        Ok(serde_json::from_slice(&json)?)
    } else {
        Ok(serde_json::from_slice(data)?)
    }
}

/// Check the gzip magic bytes.
#[inline]
pub fn is_gzip(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0x1f && data[1] == 0x8b
}
