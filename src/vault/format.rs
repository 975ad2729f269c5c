//! Binary entry-file format and HMAC integrity verification.
//!
//! Each vault's entries live in `<data_dir>/vaults/<vault>.vault`:
//!
//! ```text
//! [HVLT: 4 bytes][version: 1 byte][header_len: 4 bytes LE][header JSON][entries JSON][HMAC-SHA256: 32 bytes]
//! ```
//!
//! - **Magic** (`HVLT`): identifies the file as a HoneyVault entry file.
//! - **Version**: format version (currently `1`).
//! - **Header length**: little-endian u32 telling us where the header
//!   JSON ends and the entries JSON begins.
//! - **Header JSON**: serialized `VaultHeader`.
//! - **Entries JSON**: serialized `Vec<VaultEntry>`, in storage order.
//! - **HMAC-SHA256**: 32-byte tag over header + entries bytes, keyed from
//!   the vault's master key.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::entry::VaultEntry;
use crate::errors::{HoneyVaultError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every entry file.
const MAGIC: &[u8; 4] = b"HVLT";

/// Current binary format version.
pub const CURRENT_VERSION: u8 = 1;

/// Size of the HMAC tag appended to the file (SHA-256 = 32 bytes).
const HMAC_LEN: usize = 32;

/// Fixed-size prefix: 4 (magic) + 1 (version) + 4 (header_len).
const PREFIX_LEN: usize = 9;

// ---------------------------------------------------------------------------
// VaultHeader
// ---------------------------------------------------------------------------

/// Metadata stored at the beginning of an entry file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultHeader {
    /// Format version.
    pub version: u8,

    /// Name of the vault this collection belongs to.
    pub vault_name: String,

    /// When the collection was first written.
    pub created_at: DateTime<Utc>,
}

impl VaultHeader {
    pub fn new(vault_name: &str) -> Self {
        Self {
            version: CURRENT_VERSION,
            vault_name: vault_name.to_string(),
            created_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Write an entry file to disk **atomically**.
///
/// 1. Serialize header and entries to JSON.
/// 2. Compute HMAC over header + entries bytes.
/// 3. Write to a temp file in the same directory.
/// 4. Rename temp file over the target path.
pub fn write_entries(
    path: &Path,
    header: &VaultHeader,
    entries: &[VaultEntry],
    hmac_key: &[u8],
) -> Result<()> {
    let header_bytes = serde_json::to_vec(header)
        .map_err(|e| HoneyVaultError::SerializationError(format!("header: {e}")))?;
    let entries_bytes = serde_json::to_vec(entries)
        .map_err(|e| HoneyVaultError::SerializationError(format!("entries: {e}")))?;

    let hmac_tag = compute_hmac(hmac_key, &header_bytes, &entries_bytes)?;

    let header_len = u32::try_from(header_bytes.len()).map_err(|_| {
        HoneyVaultError::SerializationError(format!(
            "header length {} exceeds u32::MAX",
            header_bytes.len()
        ))
    })?;
    let total = PREFIX_LEN + header_bytes.len() + entries_bytes.len() + HMAC_LEN;
    let mut buf = Vec::with_capacity(total);

    buf.extend_from_slice(MAGIC);
    buf.push(CURRENT_VERSION);
    buf.extend_from_slice(&header_len.to_le_bytes());
    buf.extend_from_slice(&header_bytes);
    buf.extend_from_slice(&entries_bytes);
    buf.extend_from_slice(&hmac_tag);

    // Temp file lives next to the target so the rename stays on one filesystem.
    let parent = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(parent)?;
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    fs::write(&tmp_path, &buf)?;
    fs::rename(&tmp_path, path)?;

    Ok(())
}

/// Raw data read from an entry file on disk.
///
/// Keeps the raw bytes so the HMAC can be verified over the
/// exact bytes that were written.
pub struct RawEntries {
    pub header: VaultHeader,
    pub entries: Vec<VaultEntry>,
    /// The raw header JSON bytes exactly as stored on disk.
    pub header_bytes: Vec<u8>,
    /// The raw entries JSON bytes exactly as stored on disk.
    pub entries_bytes: Vec<u8>,
    /// The HMAC tag stored at the end of the file.
    pub stored_hmac: Vec<u8>,
}

/// Read an entry file from disk and return its parts **with raw bytes**.
///
/// The caller must verify the HMAC before trusting the entries.
pub fn read_entries(path: &Path) -> Result<RawEntries> {
    let data = fs::read(path)?;

    let min_size = PREFIX_LEN + HMAC_LEN;
    if data.len() < min_size {
        return Err(HoneyVaultError::InvalidVaultFormat(
            "file too small to be a valid entry file".into(),
        ));
    }

    // --- Parse the fixed-size prefix ---

    if &data[0..4] != MAGIC {
        return Err(HoneyVaultError::InvalidVaultFormat(
            "missing HVLT magic bytes".into(),
        ));
    }

    let version = data[4];
    if version != CURRENT_VERSION {
        return Err(HoneyVaultError::InvalidVaultFormat(format!(
            "unsupported version {version}, expected {CURRENT_VERSION}"
        )));
    }

    let header_len_u32 = u32::from_le_bytes(
        data[5..9]
            .try_into()
            .map_err(|_| HoneyVaultError::InvalidVaultFormat("bad header length".into()))?,
    );
    let header_len = usize::try_from(header_len_u32).map_err(|_| {
        HoneyVaultError::InvalidVaultFormat(format!(
            "header length {header_len_u32} exceeds platform address space"
        ))
    })?;

    let header_end = PREFIX_LEN + header_len;
    if header_end + HMAC_LEN > data.len() {
        return Err(HoneyVaultError::InvalidVaultFormat(
            "header length exceeds file size".into(),
        ));
    }

    // --- Extract the three variable-length sections ---

    let header_bytes = data[PREFIX_LEN..header_end].to_vec();
    let entries_end = data.len() - HMAC_LEN;
    let entries_bytes = data[header_end..entries_end].to_vec();
    let stored_hmac = data[entries_end..].to_vec();

    let header: VaultHeader = serde_json::from_slice(&header_bytes)
        .map_err(|e| HoneyVaultError::InvalidVaultFormat(format!("header JSON: {e}")))?;

    let entries: Vec<VaultEntry> = serde_json::from_slice(&entries_bytes)
        .map_err(|e| HoneyVaultError::InvalidVaultFormat(format!("entries JSON: {e}")))?;

    Ok(RawEntries {
        header,
        entries,
        header_bytes,
        entries_bytes,
        stored_hmac,
    })
}

/// Compute HMAC-SHA256 over header + entries bytes.
pub fn compute_hmac(hmac_key: &[u8], header_bytes: &[u8], entries_bytes: &[u8]) -> Result<Vec<u8>> {
    let mut mac = Hmac::<Sha256>::new_from_slice(hmac_key)
        .map_err(|e| HoneyVaultError::HmacError(format!("invalid HMAC key: {e}")))?;

    mac.update(header_bytes);
    mac.update(entries_bytes);

    Ok(mac.finalize().into_bytes().to_vec())
}

/// Verify that the HMAC matches using constant-time comparison.
pub fn verify_hmac(
    hmac_key: &[u8],
    header_bytes: &[u8],
    entries_bytes: &[u8],
    expected_hmac: &[u8],
) -> Result<()> {
    let mut mac = Hmac::<Sha256>::new_from_slice(hmac_key)
        .map_err(|e| HoneyVaultError::HmacError(format!("invalid HMAC key: {e}")))?;

    mac.update(header_bytes);
    mac.update(entries_bytes);

    mac.verify_slice(expected_hmac)
        .map_err(|_| HoneyVaultError::HmacMismatch)
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
