//! Segment export: raw `.bin` files plus a JSON sidecar per segment.
//!
//! The sidecar keeps the segment's identity (id, address, size) and digests
//! next to its bytes, so reloading a segment never depends on parsing a
//! formatted report.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::ExportError;
use super::layout::OutputLayout;
use crate::{AddressSpace, Range, Segment, SegmentBuffer};

const CRC32: crc::Crc<u32> = crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC);

/// Copy one segment's bytes out of the address space.
///
/// The segment was derived from populated addresses, so the buffer is always
/// exactly `segment.size()` bytes.
pub fn export_segment(space: &AddressSpace, segment: &Segment) -> SegmentBuffer {
    let data = space.read_range(segment.range());
    debug_assert_eq!(data.len() as u64, segment.size());
    SegmentBuffer::new(segment.start_address(), data)
}

/// Metadata persisted alongside each exported `.bin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentSidecar {
    pub id: usize,
    pub start_address: u32,
    /// Exclusive end address.
    pub end_address: u64,
    pub size: u64,
    pub crc32: u32,
    pub sha256: String,
    /// Binary file name, relative to the sidecar's directory.
    pub binary: String,
}

impl SegmentSidecar {
    pub fn describe(segment: &Segment, buffer: &SegmentBuffer, binary: String) -> Self {
        Self {
            id: segment.id,
            start_address: segment.start_address(),
            end_address: segment.end_exclusive(),
            size: segment.size(),
            crc32: CRC32.checksum(&buffer.data),
            sha256: sha256_hex(&buffer.data),
            binary,
        }
    }

    pub fn segment(&self) -> Result<Segment, ExportError> {
        let range = Range::from_start_length(self.start_address, self.size).map_err(|e| {
            ExportError::InvalidSegment {
                id: self.id,
                message: e.to_string(),
            }
        })?;
        if range.end_exclusive() != self.end_address {
            return Err(ExportError::InvalidSegment {
                id: self.id,
                message: format!(
                    "end {:#X} does not match start {:#X} + size {}",
                    self.end_address, self.start_address, self.size
                ),
            });
        }
        Ok(Segment::new(self.id, range))
    }

    /// Check `data` against the recorded size and digests.
    pub fn verify(&self, data: &[u8]) -> Result<(), ExportError> {
        if data.len() as u64 != self.size {
            return Err(ExportError::SizeMismatch {
                id: self.id,
                expected: self.size,
                actual: data.len(),
            });
        }
        let crc = CRC32.checksum(data);
        if crc != self.crc32 {
            return Err(ExportError::DigestMismatch {
                id: self.id,
                digest: "CRC-32",
                expected: format!("{:08X}", self.crc32),
                actual: format!("{crc:08X}"),
            });
        }
        let sha = sha256_hex(data);
        if !sha.eq_ignore_ascii_case(&self.sha256) {
            return Err(ExportError::DigestMismatch {
                id: self.id,
                digest: "SHA-256",
                expected: self.sha256.clone(),
                actual: sha,
            });
        }
        Ok(())
    }
}

/// Paths written for one exported segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedSegment {
    pub binary: PathBuf,
    pub sidecar: Option<PathBuf>,
}

/// Write the segment's raw bytes and, if requested, its sidecar.
pub fn write_segment(
    layout: &OutputLayout,
    segment: &Segment,
    buffer: &SegmentBuffer,
    with_sidecar: bool,
) -> Result<ExportedSegment, ExportError> {
    let binary = layout.bin_path(segment);
    write_file(&binary, &buffer.data)?;

    let sidecar = if with_sidecar {
        let path = layout.sidecar_path(segment);
        let meta = SegmentSidecar::describe(segment, buffer, layout.bin_name(segment));
        let json = serde_json::to_vec_pretty(&meta).map_err(|source| ExportError::Sidecar {
            path: path.display().to_string(),
            source,
        })?;
        write_file(&path, &json)?;
        Some(path)
    } else {
        None
    };

    Ok(ExportedSegment { binary, sidecar })
}

/// A segment reloaded from disk, with the binary file name its sidecar names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSegment {
    pub segment: Segment,
    pub buffer: SegmentBuffer,
    pub binary: String,
}

/// Reload an exported segment from its sidecar, verifying the binary.
pub fn load_segment(sidecar_path: &Path) -> Result<LoadedSegment, ExportError> {
    let json = read_file(sidecar_path)?;
    let meta: SegmentSidecar =
        serde_json::from_slice(&json).map_err(|source| ExportError::Sidecar {
            path: sidecar_path.display().to_string(),
            source,
        })?;
    let segment = meta.segment()?;

    let binary_path = sidecar_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(&meta.binary);
    let data = read_file(&binary_path)?;
    meta.verify(&data)?;

    Ok(LoadedSegment {
        segment,
        buffer: SegmentBuffer::new(segment.start_address(), data),
        binary: meta.binary,
    })
}

pub(crate) fn write_file(path: &Path, data: &[u8]) -> Result<(), ExportError> {
    std::fs::write(path, data).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn read_file(path: &Path) -> Result<Vec<u8>, ExportError> {
    std::fs::read(path).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
