// src/tdigest/wire.rs
//
// Binary wire codec for TDigest ("TDTR" format).
//
// Layout (floats little-endian, integers unsigned LEB128 varints):
//
//   header:
//     0..4   : magic = b"TDTR"
//     4      : version (u8)
//     5..13  : compression (f64)
//     13..   : total_weight   (varint)
//              centroid_count (varint)
//
//   centroids (payload), ascending by mean:
//     each centroid = mean(f64) + count(varint)
//
// Decoding is strict: the buffer must hold exactly one digest, counts must be
// >= 1, means finite and strictly ascending, and their counts must add up to
// total_weight.

use std::io::{Read, Write};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::tdigest::centroids::Centroid;
use crate::tdigest::store::CentroidStore;
use crate::tdigest::TDigest;

pub const MAGIC: &[u8; 4] = b"TDTR";
pub const VERSION: u8 = 1;

/// magic + version + compression
const FIXED_HEADER_LEN: usize = 4 + 1 + 8;
/// Smallest encoded centroid: 8-byte mean plus a one-byte count.
const MIN_CENTROID_LEN: usize = 8 + 1;
/// A u64 never needs more than ten 7-bit groups.
const MAX_VARINT_LEN: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("invalid TDTR magic header")]
    InvalidMagic,
    #[error("unsupported TDTR version: {0}")]
    UnsupportedVersion(u8),
    #[error("invalid TDTR header: {0}")]
    InvalidHeader(&'static str),
    #[error("invalid TDTR payload: {0}")]
    InvalidPayload(&'static str),
    #[error("TDTR i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type WireResult<T> = Result<T, WireError>;

/* ============================
 * Varints
 * ============================ */

#[inline]
fn write_varint(buf: &mut Vec<u8>, mut v: u64) {
    while v >= 0x80 {
        buf.push((v as u8) | 0x80);
        v >>= 7;
    }
    buf.push(v as u8);
}

#[inline]
fn varint_len(v: u64) -> usize {
    let bits = 64 - (v | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

fn read_varint(bytes: &[u8], offset: &mut usize, truncated: &'static str) -> WireResult<u64> {
    let mut value: u64 = 0;
    for i in 0..MAX_VARINT_LEN {
        let Some(&b) = bytes.get(*offset + i) else {
            return Err(WireError::InvalidPayload(truncated));
        };
        let low = u64::from(b & 0x7f);
        if i == MAX_VARINT_LEN - 1 && low > 1 {
            return Err(WireError::InvalidPayload("varint overflows u64"));
        }
        value |= low << (7 * i);
        if b & 0x80 == 0 {
            if b == 0 && i > 0 {
                return Err(WireError::InvalidPayload("non-canonical varint"));
            }
            *offset += i + 1;
            return Ok(value);
        }
    }
    Err(WireError::InvalidPayload("varint overflows u64"))
}

/* ============================
 * Small helpers
 * ============================ */

#[inline]
fn write_f64(buf: &mut Vec<u8>, v: f64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

#[inline]
fn read_f64(bytes: &[u8], offset: &mut usize, truncated: &'static str) -> WireResult<f64> {
    let Some(raw) = bytes.get(*offset..*offset + 8) else {
        return Err(WireError::InvalidPayload(truncated));
    };
    let mut arr = [0u8; 8];
    arr.copy_from_slice(raw);
    *offset += 8;
    Ok(f64::from_le_bytes(arr))
}

/// Check decoded parts and assemble the store.
///
/// Shared by the binary decoder and the serde bridge so both accept exactly
/// the same digests.
pub(crate) fn store_from_parts(
    compression: f64,
    total_weight: u64,
    centroids: &[Centroid],
) -> WireResult<CentroidStore> {
    if !compression.is_finite() || compression <= 0.0 {
        return Err(WireError::InvalidHeader(
            "compression must be finite and positive",
        ));
    }

    let mut sum: u64 = 0;
    let mut prev: Option<f64> = None;
    for c in centroids {
        if c.count() == 0 {
            return Err(WireError::InvalidPayload("centroid count must be >= 1"));
        }
        if !c.mean().is_finite() {
            return Err(WireError::InvalidPayload("non-finite centroid mean"));
        }
        if prev.is_some_and(|p| p >= c.mean()) {
            return Err(WireError::InvalidPayload(
                "centroid means must be strictly ascending",
            ));
        }
        prev = Some(c.mean());
        sum = sum
            .checked_add(c.count())
            .ok_or(WireError::InvalidPayload("centroid counts overflow u64"))?;
    }
    if sum != total_weight {
        return Err(WireError::InvalidHeader(
            "total_weight does not match centroid counts",
        ));
    }

    Ok(centroids.iter().copied().collect())
}

/* ============================
 * Encode
 * ============================ */

/// Exact size of [`encode_digest`]'s output.
pub fn encoded_len(td: &TDigest) -> usize {
    let payload: usize = td
        .centroids()
        .map(|c| 8 + varint_len(c.count()))
        .sum();
    FIXED_HEADER_LEN + varint_len(td.total_weight()) + varint_len(td.len() as u64) + payload
}

pub fn encode_digest(td: &TDigest) -> Vec<u8> {
    let mut buf = Vec::with_capacity(encoded_len(td));

    // magic + version
    buf.extend_from_slice(MAGIC);
    buf.push(VERSION);

    write_f64(&mut buf, td.compression());
    write_varint(&mut buf, td.total_weight());
    write_varint(&mut buf, td.len() as u64);

    for c in td.centroids() {
        write_f64(&mut buf, c.mean());
        write_varint(&mut buf, c.count());
    }

    debug_assert_eq!(buf.len(), encoded_len(td));
    buf
}

/* ============================
 * Decode
 * ============================ */

/// Decode one digest; the new digest draws randomness from `rng`.
pub fn decode_digest(bytes: &[u8], rng: StdRng) -> WireResult<TDigest> {
    if bytes.len() < FIXED_HEADER_LEN {
        return Err(WireError::InvalidHeader("buffer too small"));
    }
    if &bytes[0..4] != MAGIC {
        return Err(WireError::InvalidMagic);
    }
    let version = bytes[4];
    if version != VERSION {
        return Err(WireError::UnsupportedVersion(version));
    }

    let mut offset = 5;
    let compression = read_f64(bytes, &mut offset, "truncated compression")?;
    if !compression.is_finite() || compression <= 0.0 {
        return Err(WireError::InvalidHeader(
            "compression must be finite and positive",
        ));
    }
    let total_weight = read_varint(bytes, &mut offset, "truncated total_weight")?;
    let centroid_count = read_varint(bytes, &mut offset, "truncated centroid_count")?;

    // Bound the allocation by what the buffer can actually hold.
    let remaining = bytes.len() - offset;
    let centroid_count = usize::try_from(centroid_count)
        .ok()
        .filter(|&n| n <= remaining / MIN_CENTROID_LEN)
        .ok_or(WireError::InvalidHeader(
            "centroid_count exceeds payload size",
        ))?;

    let mut cents = Vec::with_capacity(centroid_count);
    for _ in 0..centroid_count {
        let mean = read_f64(bytes, &mut offset, "truncated centroid mean")?;
        let count = read_varint(bytes, &mut offset, "truncated centroid count")?;
        if count == 0 {
            return Err(WireError::InvalidPayload("centroid count must be >= 1"));
        }
        cents.push(Centroid::new(mean, count));
    }

    if offset != bytes.len() {
        return Err(WireError::InvalidPayload("trailing bytes after digest"));
    }

    let store = store_from_parts(compression, total_weight, &cents)?;
    Ok(TDigest::from_parts(compression, total_weight, store, rng))
}

/* ============================
 * TDigest surface
 * ============================ */

impl TDigest {
    /// Serialize to the TDTR binary format.
    pub fn to_bytes(&self) -> WireResult<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    /// Stream the TDTR encoding into `w`.
    pub fn write_to<W: Write>(&self, mut w: W) -> WireResult<()> {
        w.write_all(&encode_digest(self))?;
        Ok(())
    }

    /// Size in bytes of [`to_bytes`](Self::to_bytes)' output.
    #[inline]
    pub fn encoded_len(&self) -> usize {
        encoded_len(self)
    }

    /// Rebuild a digest from [`to_bytes`](Self::to_bytes) output.
    ///
    /// Malformed, truncated or padded input is an error; no partial digest is
    /// ever returned. The decoded digest seeds its random source from the OS.
    pub fn from_bytes(bytes: &[u8]) -> WireResult<TDigest> {
        decode_digest(bytes, StdRng::from_os_rng())
    }

    /// Like [`from_bytes`](Self::from_bytes) with a fixed random seed.
    pub fn from_bytes_with_seed(bytes: &[u8], seed: u64) -> WireResult<TDigest> {
        decode_digest(bytes, StdRng::seed_from_u64(seed))
    }

    /// Read `r` to the end and decode its contents as one digest.
    pub fn read_from<R: Read>(mut r: R) -> WireResult<TDigest> {
        let mut bytes = Vec::new();
        r.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }
}
