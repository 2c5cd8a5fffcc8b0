// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use crate::byte_array::ByteArray;
use crate::utils::validate_two_bytes_data;
use crate::{DecodeError, DecodePacket, EncodeError, EncodePacket};

/// Binary data is represented by a two-byte big-endian length followed by that
/// number of raw bytes. Used for will messages.
///
/// ```text
/// +-------------------+
/// | Binary Length     |
/// +-------------------+
/// | Bytes             |
/// +-------------------+
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BinaryData(Vec<u8>);

impl BinaryData {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Convert a byte slice into binary data.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::TooManyData`] if `data` is too large for the 2-byte
    /// length prefix.
    pub fn from_slice(data: &[u8]) -> Result<Self, EncodeError> {
        validate_two_bytes_data(data)?;
        Ok(Self(data.to_vec()))
    }

    /// Byte length on the wire, including the 2-byte length prefix.
    #[must_use]
    pub fn bytes(&self) -> usize {
        2 + self.0.len()
    }
}

impl AsRef<[u8]> for BinaryData {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl DecodePacket for BinaryData {
    fn decode(ba: &mut ByteArray) -> Result<Self, DecodeError> {
        let len = ba.read_u16()?;
        let data = ba.read_bytes(len as usize)?;
        Ok(Self(data.to_vec()))
    }
}

impl EncodePacket for BinaryData {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, EncodeError> {
        #[allow(clippy::cast_possible_truncation)]
        let len = self.0.len() as u16;
        buf.extend_from_slice(&len.to_be_bytes());
        buf.extend_from_slice(&self.0);
        Ok(self.bytes())
    }
}
