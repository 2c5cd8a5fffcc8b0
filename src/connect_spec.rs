// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use std::convert::TryFrom;

use crate::binary_data::BinaryData;
use crate::string_data::StringData;
use crate::{EncodeError, EncodePacket, QoS};

/// Configuration for a Connect packet's optional fields: user name, password,
/// and will message.
///
/// Every invariant below is checked once, at construction, rather than spread
/// across individual setters — a `ConnectSpec` that exists is always valid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectSpec {
    username: Option<StringData>,
    password: Option<StringData>,
    will_topic: Option<StringData>,
    will_message: Option<BinaryData>,
    will_qos: QoS,
}

impl ConnectSpec {
    /// Build a `ConnectSpec`.
    ///
    /// `will_topic` and `will_message` must be both set or both unset.
    /// `password` may only be set when `username` is set.
    /// `will_qos` may only be nonzero when a will is present.
    ///
    /// # Errors
    ///
    /// - [`EncodeError::PasswordWithoutUsername`] if `password` is set without `username`.
    /// - [`EncodeError::WillFieldMismatch`] if exactly one of `will_topic`/`will_message` is set.
    /// - [`EncodeError::InvalidQoS`] if `will_qos` is not in `{0, 1, 2}`.
    /// - [`EncodeError::InvalidWillQos`] if `will_qos` is nonzero without a will.
    /// - [`EncodeError::TooManyData`] if any text/binary field exceeds 65,535 bytes.
    pub fn new(
        username: Option<&str>,
        password: Option<&str>,
        will_topic: Option<&str>,
        will_message: Option<&[u8]>,
        will_qos: u8,
    ) -> Result<Self, EncodeError> {
        if password.is_some() && username.is_none() {
            return Err(EncodeError::PasswordWithoutUsername);
        }
        if will_topic.is_some() != will_message.is_some() {
            return Err(EncodeError::WillFieldMismatch);
        }
        let will_qos = QoS::try_from(will_qos).map_err(|_| EncodeError::InvalidQoS)?;
        if will_qos != QoS::AtMostOnce && will_topic.is_none() {
            return Err(EncodeError::InvalidWillQos);
        }

        Ok(Self {
            username: username.map(StringData::from).transpose()?,
            password: password.map(StringData::from).transpose()?,
            will_topic: will_topic.map(StringData::from).transpose()?,
            will_message: will_message.map(BinaryData::from_slice).transpose()?,
            will_qos,
        })
    }

    /// The connect-flags byte contributed by this spec: bit 1 (clean session) is
    /// always set; bits 2, 3-4, 6, 7 reflect the fields present here. Bit 5
    /// (will retain) is not modeled and is always 0.
    #[must_use]
    pub fn flags_byte(&self) -> u8 {
        let mut flags = 0b0000_0010_u8;
        if self.will_topic.is_some() {
            flags |= 0b0000_0100;
            flags |= self.will_qos.value() << 3;
        }
        if self.username.is_some() {
            flags |= 0b1000_0000;
        }
        if self.password.is_some() {
            flags |= 0b0100_0000;
        }
        flags
    }

    /// Byte contribution of this spec's payload fields (excluding client id).
    #[must_use]
    pub fn payload_remaining_length(&self) -> usize {
        let mut len = 0;
        if let Some(topic) = &self.will_topic {
            len += topic.bytes();
        }
        if let Some(message) = &self.will_message {
            len += message.bytes();
        }
        if let Some(username) = &self.username {
            len += username.bytes();
        }
        if let Some(password) = &self.password {
            len += password.bytes();
        }
        len
    }

    /// Encode will-topic, will-message, user-name, password, in that order
    /// (MQTT 3.1.1 §3.1.3), appending only the fields present.
    ///
    /// # Errors
    ///
    /// Propagates any [`EncodeError`] from the underlying field encoders.
    pub fn encode_payload(&self, buf: &mut Vec<u8>) -> Result<usize, EncodeError> {
        let start = buf.len();
        if let Some(topic) = &self.will_topic {
            topic.encode(buf)?;
        }
        if let Some(message) = &self.will_message {
            message.encode(buf)?;
        }
        if let Some(username) = &self.username {
            username.encode(buf)?;
        }
        if let Some(password) = &self.password {
            password.encode(buf)?;
        }
        Ok(buf.len() - start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_will_topic_alone_is_rejected() {
        let err = ConnectSpec::new(None, None, Some("foo"), None, 0).unwrap_err();
        assert_eq!(err, EncodeError::WillFieldMismatch);
    }

    #[test]
    fn test_password_without_username_is_rejected() {
        let err = ConnectSpec::new(None, Some("p"), None, None, 0).unwrap_err();
        assert_eq!(err, EncodeError::PasswordWithoutUsername);
    }

    #[test]
    fn test_will_qos_without_will_is_rejected() {
        let err = ConnectSpec::new(None, None, None, None, 1).unwrap_err();
        assert_eq!(err, EncodeError::InvalidWillQos);
    }

    #[test]
    fn test_will_qos_out_of_range_is_rejected() {
        let err = ConnectSpec::new(None, None, Some("t"), Some(b"m"), 3).unwrap_err();
        assert_eq!(err, EncodeError::InvalidQoS);
    }

    #[test]
    fn test_flags_byte_with_will_and_credentials() {
        let spec = ConnectSpec::new(Some("u"), Some("p"), Some("t"), Some(b"m"), 2).unwrap();
        // username(0x80) | password(0x40) | will_qos=2(0x10) | will(0x04) | clean_session(0x02)
        assert_eq!(spec.flags_byte(), 0b1101_0110);
    }
}
