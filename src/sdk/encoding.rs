//! Byte encodings shared by the access models: hex and base64 text forms,
//! plus the RLP primitives the canonical transaction forms are built from.

use alloy::rlp::{Decodable, Header};
use base64::Engine;

/// Decode hex text, tolerating a `0x` prefix.
pub fn decode_hex(text: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let trimmed = text.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.len() % 2 == 1 {
        hex::decode(format!("0{}", digits))
    } else {
        hex::decode(digits)
    }
}

pub fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

pub fn decode_base64(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    base64::engine::general_purpose::STANDARD.decode(text.trim())
}

/// Serde adapter writing byte vectors as lowercase hex strings.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::decode_hex(&text).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for lists of byte vectors, each as a hex string.
pub mod hex_bytes_list {
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            seq.serialize_element(&hex::encode(value))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Vec<u8>>, D::Error> {
        let texts = Vec::<String>::deserialize(deserializer)?;
        texts
            .iter()
            .map(|t| super::decode_hex(t).map_err(serde::de::Error::custom))
            .collect()
    }
}

pub(crate) fn rlp_bytes(bytes: &[u8]) -> Vec<u8> {
    alloy::rlp::encode(bytes)
}

pub(crate) fn rlp_u64(value: u64) -> Vec<u8> {
    alloy::rlp::encode(value)
}

/// Wrap already-encoded items into an RLP list.
pub(crate) fn rlp_list(items: &[Vec<u8>]) -> Vec<u8> {
    let payload_length = items.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(payload_length + 9);
    Header {
        list: true,
        payload_length,
    }
    .encode(&mut out);
    for item in items {
        out.extend_from_slice(item);
    }
    out
}

/// Encode a sequence of byte strings as an RLP list.
pub(crate) fn rlp_bytes_list<'a>(values: impl IntoIterator<Item = &'a [u8]>) -> Vec<u8> {
    let items: Vec<Vec<u8>> = values.into_iter().map(rlp_bytes).collect();
    rlp_list(&items)
}

/// Split the payload of the next RLP list off `buf`.
pub(crate) fn rlp_take_list<'a>(buf: &mut &'a [u8]) -> Result<&'a [u8], alloy::rlp::Error> {
    let header = Header::decode(buf)?;
    if !header.list {
        return Err(alloy::rlp::Error::UnexpectedString);
    }
    if buf.len() < header.payload_length {
        return Err(alloy::rlp::Error::InputTooShort);
    }
    let (payload, rest) = buf.split_at(header.payload_length);
    *buf = rest;
    Ok(payload)
}

pub(crate) fn rlp_take_bytes<'a>(buf: &mut &'a [u8]) -> Result<&'a [u8], alloy::rlp::Error> {
    Header::decode_bytes(buf, false)
}

pub(crate) fn rlp_take_u64(buf: &mut &[u8]) -> Result<u64, alloy::rlp::Error> {
    u64::decode(buf)
}

/// Decode every item of an RLP list payload as a byte string.
pub(crate) fn rlp_take_bytes_list(buf: &mut &[u8]) -> Result<Vec<Vec<u8>>, alloy::rlp::Error> {
    let mut payload = rlp_take_list(buf)?;
    let mut values = Vec::new();
    while !payload.is_empty() {
        values.push(rlp_take_bytes(&mut payload)?.to_vec());
    }
    Ok(values)
}
