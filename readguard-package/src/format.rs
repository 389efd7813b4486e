//! Wire encoding of the package container.

use crate::error::{PackageError, PackageResult};
use crate::metadata::PackageMetadata;

/// Size of the metadata length prefix.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Upper bound on the metadata header; anything larger is not a package.
pub const MAX_METADATA_LEN: usize = 64 * 1024;

/// Conventional file extension for packages.
pub const PACKAGE_EXTENSION: &str = "rgpkg";

/// MIME type used when serving packages for download.
pub const PACKAGE_MIME_TYPE: &str = "application/x-readguard-package";

/// Serializes metadata and ciphertext into package bytes.
pub fn assemble(metadata: &PackageMetadata, ciphertext: &[u8]) -> PackageResult<Vec<u8>> {
    let header =
        serde_json::to_vec(metadata).map_err(|e| PackageError::Malformed(e.to_string()))?;
    if header.len() > MAX_METADATA_LEN {
        return Err(PackageError::Malformed(format!(
            "metadata is {} bytes, limit is {MAX_METADATA_LEN}",
            header.len()
        )));
    }

    let mut out = Vec::with_capacity(LENGTH_PREFIX_SIZE + header.len() + ciphertext.len());
    out.extend_from_slice(&(header.len() as u32).to_be_bytes());
    out.extend_from_slice(&header);
    out.extend_from_slice(ciphertext);
    Ok(out)
}

/// Splits package bytes into parsed metadata and the ciphertext slice.
pub fn parse(bytes: &[u8]) -> PackageResult<(PackageMetadata, &[u8])> {
    let prefix: [u8; LENGTH_PREFIX_SIZE] = bytes
        .get(..LENGTH_PREFIX_SIZE)
        .and_then(|p| p.try_into().ok())
        .ok_or_else(|| PackageError::Malformed("truncated length prefix".to_string()))?;
    let header_len = u32::from_be_bytes(prefix) as usize;

    if header_len > MAX_METADATA_LEN {
        return Err(PackageError::Malformed(format!(
            "metadata length {header_len} exceeds limit"
        )));
    }

    let rest = &bytes[LENGTH_PREFIX_SIZE..];
    if rest.len() < header_len {
        return Err(PackageError::Malformed("truncated metadata".to_string()));
    }
    let (header, ciphertext) = rest.split_at(header_len);

    let metadata: PackageMetadata = serde_json::from_slice(header)
        .map_err(|e| PackageError::Malformed(format!("invalid metadata: {e}")))?;

    if metadata.encrypted_size != ciphertext.len() {
        return Err(PackageError::Malformed(format!(
            "expected {} encrypted bytes, found {}",
            metadata.encrypted_size,
            ciphertext.len()
        )));
    }

    Ok((metadata, ciphertext))
}

/// Reads only the metadata, e.g. to show a title before asking for the
/// password.
pub fn read_metadata(bytes: &[u8]) -> PackageResult<PackageMetadata> {
    parse(bytes).map(|(metadata, _)| metadata)
}
