// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use crate::byte_array::ByteArray;
use crate::string_data::StringData;
use crate::{DecodeError, DecodePacket, EncodeError, EncodePacket};

/// A topic name used in a Publish packet.
///
/// Topic-filter wildcard matching (`+`, `#`) is out of scope for this codec;
/// both `PubTopic` and `SubTopic` only carry the validated UTF-8 string used for
/// framing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PubTopic(StringData);

impl PubTopic {
    /// # Errors
    ///
    /// Returns [`EncodeError::TooManyData`] if `s` is too large for the 2-byte
    /// length prefix.
    pub fn new(s: &str) -> Result<Self, EncodeError> {
        Ok(Self(StringData::from(s)?))
    }

    #[must_use]
    pub fn bytes(&self) -> usize {
        self.0.bytes()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }
}

impl DecodePacket for PubTopic {
    fn decode(ba: &mut ByteArray) -> Result<Self, DecodeError> {
        Ok(Self(StringData::decode(ba)?))
    }
}

impl EncodePacket for PubTopic {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, EncodeError> {
        self.0.encode(buf)
    }
}

/// A topic filter used in a Subscribe or Unsubscribe packet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubTopic(StringData);

impl SubTopic {
    /// # Errors
    ///
    /// Returns [`EncodeError::TooManyData`] if `s` is too large for the 2-byte
    /// length prefix.
    pub fn new(s: &str) -> Result<Self, EncodeError> {
        Ok(Self(StringData::from(s)?))
    }

    #[must_use]
    pub fn bytes(&self) -> usize {
        self.0.bytes()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }
}

impl DecodePacket for SubTopic {
    fn decode(ba: &mut ByteArray) -> Result<Self, DecodeError> {
        Ok(Self(StringData::decode(ba)?))
    }
}

impl EncodePacket for SubTopic {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, EncodeError> {
        self.0.encode(buf)
    }
}
