use crate::error::{Error, Result};

/// An owned, immutable byte sequence. Operations return new values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ByteArray {
    bytes: Vec<u8>,
}

impl ByteArray {
    pub fn from_bytes(bytes: Vec<u8>) -> ByteArray {
        ByteArray { bytes }
    }

    pub fn from_hex(hex: &str) -> Result<ByteArray> {
        let digits = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<Vec<u8>>>()
            .ok_or(Error::InvalidHex)?;

        if digits.len() % 2 != 0 {
            return Err(Error::InvalidHex);
        }

        let bytes = digits
            .chunks(2)
            .map(|pair| (pair[0] << 4) | pair[1])
            .collect();

        Ok(ByteArray::from_bytes(bytes))
    }

    /// Decodes standard base64, ignoring line breaks.
    pub fn from_base64(encoded: &str) -> Result<ByteArray> {
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = base64::decode(&compact)?;
        Ok(ByteArray::from_bytes(bytes))
    }

    pub fn from_string(s: &str) -> ByteArray {
        ByteArray::from_bytes(s.as_bytes().to_vec())
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    /// Latin-1 view of the bytes; never fails.
    pub fn string(&self) -> String {
        self.bytes.iter().map(|&b| b as char).collect()
    }

    pub fn hex(&self) -> String {
        let char_table: Vec<u8> = vec![(b'0'..=b'9'), (b'a'..=b'f')]
            .into_iter()
            .flatten()
            .collect();

        let mut result = String::with_capacity(self.bytes.len() * 2);

        for byte in &self.bytes {
            let upper = ((byte & 0xF0) >> 4) as usize;
            let lower = (byte & 0x0F) as usize;

            result.push(char_table[upper] as char);
            result.push(char_table[lower] as char);
        }

        result
    }

    pub fn base64(&self) -> String {
        base64::encode(&self.bytes)
    }

    /// Fixed XOR; the result is as long as the shorter operand.
    pub fn xor(&self, other: &ByteArray) -> ByteArray {
        let xored = self
            .bytes
            .iter()
            .zip(other.bytes.iter())
            .map(|(b1, b2)| b1 ^ b2)
            .collect();

        ByteArray { bytes: xored }
    }

    /// XOR with `key` repeated cyclically over the whole buffer.
    pub fn repeating_xor(&self, key: &[u8]) -> Result<ByteArray> {
        if key.is_empty() {
            return Err(Error::invalid_input("repeating XOR key is empty"));
        }

        Ok(ByteArray::from_bytes(repeating_xor(&self.bytes, key)))
    }
}

/// Callers guarantee `key` is non-empty.
pub(crate) fn repeating_xor(data: &[u8], key: &[u8]) -> Vec<u8> {
    data.iter()
        .zip(key.iter().cycle())
        .map(|(b, k)| b ^ k)
        .collect()
}
