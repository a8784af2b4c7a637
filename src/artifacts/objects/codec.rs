//! Framing, hashing and compression of objects
//!
//! Every object is hashed and stored in its framed form:
//! `<type> <decimal payload length>\0<payload>`.
//! The digest is the SHA-1 of the framed bytes; the stored file is the zlib
//! stream of the same bytes.

use crate::artifacts::objects::RAW_OBJECT_ID_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::Write;

/// Build the framed representation of a payload
pub fn frame(object_type: ObjectType, payload: &[u8]) -> Bytes {
    let header = format!("{} {}\0", object_type.as_str(), payload.len());

    let mut framed = Vec::with_capacity(header.len() + payload.len());
    framed.extend_from_slice(header.as_bytes());
    framed.extend_from_slice(payload);

    Bytes::from(framed)
}

/// SHA-1 of the framed bytes
pub fn digest(framed: &[u8]) -> ObjectId {
    let mut hasher = Sha1::new();
    hasher.update(framed);

    let raw: [u8; RAW_OBJECT_ID_LENGTH] = hasher.finalize().into();
    ObjectId::from_raw(&raw)
}

/// Split framed bytes into their type and payload
///
/// The declared length must match the payload length exactly.
pub fn parse_frame(framed: Bytes) -> Result<(ObjectType, Bytes)> {
    let space = framed
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| Error::malformed("missing space after object type"))?;
    let nul = framed[space + 1..]
        .iter()
        .position(|&b| b == 0)
        .map(|offset| space + 1 + offset)
        .ok_or_else(|| Error::malformed("missing NUL after object size"))?;

    let type_token = std::str::from_utf8(&framed[..space])
        .map_err(|_| Error::malformed("object type is not valid UTF-8"))?;
    let object_type = ObjectType::try_from(type_token)?;

    let size = std::str::from_utf8(&framed[space + 1..nul])
        .ok()
        .filter(|size| !size.is_empty() && size.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|size| size.parse::<usize>().ok())
        .ok_or_else(|| Error::malformed("object size is not a decimal number"))?;

    let payload = framed.slice(nul + 1..);
    if size != payload.len() {
        return Err(Error::malformed(format!(
            "bad length: header declares {size} bytes, payload has {}",
            payload.len()
        )));
    }

    Ok((object_type, payload))
}

pub fn compress(data: &[u8]) -> Result<Bytes> {
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| Error::CorruptStream(format!("unable to compress: {e}")))?;

    encoder
        .finish()
        .map(Bytes::from)
        .map_err(|e| Error::CorruptStream(format!("unable to finish compressing: {e}")))
}

pub fn decompress(data: &[u8]) -> Result<Bytes> {
    let mut decoder = flate2::Decompress::new(true);
    let mut decompressed = Vec::with_capacity(data.len() * 2 + 64);

    loop {
        if decompressed.len() == decompressed.capacity() {
            decompressed.reserve(decompressed.capacity().max(1024));
        }

        let (before_in, before_out) = (decoder.total_in(), decoder.total_out());
        let status = decoder
            .decompress_vec(
                &data[before_in as usize..],
                &mut decompressed,
                flate2::FlushDecompress::Finish,
            )
            .map_err(|e| Error::CorruptStream(e.to_string()))?;

        match status {
            flate2::Status::StreamEnd => break,
            _ if decoder.total_in() == before_in && decoder.total_out() == before_out => {
                return Err(Error::CorruptStream(format!(
                    "stream ended before its terminator after {before_in} bytes"
                )));
            }
            _ => continue,
        }
    }

    let consumed = decoder.total_in() as usize;
    if consumed != data.len() {
        return Err(Error::CorruptStream(format!(
            "{} trailing bytes after end of stream",
            data.len() - consumed
        )));
    }

    Ok(Bytes::from(decompressed))
}
