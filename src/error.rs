// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use std::fmt;
use std::string::FromUtf8Error;

use crate::byte_array::ByteArrayError;
use crate::var_int::VarIntError;

/// Errors produced while decoding bytes received from a peer into packet values.
///
/// Every variant here means the current packet is unrecoverable and the caller
/// should treat the connection as closed; `InvalidRemainingLength` and
/// `InvalidPacketId` are kept distinct from the plain "malformed header" variants
/// only so a caller can log the more specific reason.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The fixed-header type/flags byte does not map to any of the fifteen control
    /// packet types.
    InvalidPacketType,

    /// A reserved flag bit in the fixed header was not set to the value mandated by
    /// the packet type.
    InvalidPacketFlags,

    /// Connect packet did not start with the "MQTT" protocol name.
    InvalidProtocolName,

    /// Connect packet declared a protocol level other than 4.
    InvalidProtocolLevel,

    /// Connect flags byte violated MQTT-3.1.2-3 (reserved bit) or MQTT-3.1.2-22
    /// (password without user name), or declared an out-of-range will QoS.
    InvalidConnectFlags,

    /// A QoS field carried a value outside `{0, 1, 2}`.
    InvalidQoS,

    /// The remaining-length variable integer required a fifth continuation byte.
    InvalidVarInt,

    /// A packet's declared remaining length did not match the shape required for
    /// its type (e.g. Puback/Pingresp/Disconnect with the wrong body size).
    InvalidRemainingLength,

    /// Subscribe/Unsubscribe/Publish(QoS>0) carried a zero packet identifier.
    InvalidPacketId,

    /// Subscribe or Unsubscribe payload contained no topic filters.
    EmptyTopicFilter,

    /// A length-prefixed string was not valid UTF-8.
    InvalidUtf8String,

    /// Internal invariant violation: a sub-parser read past the slice the stream
    /// parser had already proven complete. Surfacing this instead of panicking
    /// keeps the codec exception-free even if that invariant is ever violated.
    UnexpectedEnd,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidPacketType => write!(f, "invalid control packet type"),
            Self::InvalidPacketFlags => write!(f, "invalid fixed header flags"),
            Self::InvalidProtocolName => write!(f, "invalid protocol name"),
            Self::InvalidProtocolLevel => write!(f, "invalid protocol level"),
            Self::InvalidConnectFlags => write!(f, "invalid connect flags"),
            Self::InvalidQoS => write!(f, "invalid QoS value"),
            Self::InvalidVarInt => write!(f, "remaining length exceeds four bytes"),
            Self::InvalidRemainingLength => {
                write!(f, "remaining length does not match packet shape")
            }
            Self::InvalidPacketId => write!(f, "packet identifier must be nonzero"),
            Self::EmptyTopicFilter => write!(f, "topic filter list must not be empty"),
            Self::InvalidUtf8String => write!(f, "invalid utf-8 string"),
            Self::UnexpectedEnd => write!(f, "unexpected end of packet"),
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<ByteArrayError> for DecodeError {
    fn from(e: ByteArrayError) -> Self {
        match e {
            ByteArrayError::OutOfRange => Self::UnexpectedEnd,
            ByteArrayError::InvalidUtf8String => Self::InvalidUtf8String,
        }
    }
}

impl From<FromUtf8Error> for DecodeError {
    fn from(_e: FromUtf8Error) -> Self {
        Self::InvalidUtf8String
    }
}

impl From<VarIntError> for DecodeError {
    fn from(_e: VarIntError) -> Self {
        Self::InvalidVarInt
    }
}

/// Errors raised synchronously by builder functions when the caller-supplied
/// inputs violate an MQTT 3.1.1 construction rule. The caller sees no output
/// bytes when a builder fails.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A length-prefixed string or binary field exceeded 65,535 bytes.
    TooManyData,

    /// QoS value supplied to a builder was outside `{0, 1, 2}`.
    InvalidQoS,

    /// `dup` was set to true on a QoS 0 publish.
    UnexpectedDup,

    /// QoS was nonzero but no packet identifier was supplied.
    MissingPacketId,

    /// QoS was zero but a packet identifier was supplied anyway.
    UnexpectedPacketId,

    /// Subscribe/Unsubscribe packet identifier was 0 or 65535.
    InvalidPacketId,

    /// Subscribe or Unsubscribe was built with an empty topic list.
    EmptyTopicFilter,

    /// Password was set on a `ConnectSpec` without a user name.
    PasswordWithoutUsername,

    /// Will topic and will message were not both set or both unset.
    WillFieldMismatch,

    /// Will QoS was nonzero but no will topic/message was set.
    InvalidWillQos,

    /// Remaining length would exceed the 4-byte variable integer's maximum,
    /// `268_435_455`.
    InvalidVarInt,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::TooManyData => write!(f, "string or binary field exceeds 65535 bytes"),
            Self::InvalidQoS => write!(f, "qos must be 0, 1 or 2"),
            Self::UnexpectedDup => write!(f, "dup must not be set on qos 0"),
            Self::MissingPacketId => write!(f, "qos of 1 or 2 requires a packet id"),
            Self::UnexpectedPacketId => write!(f, "qos of 0 must not carry a packet id"),
            Self::InvalidPacketId => write!(f, "packet id must satisfy 0 < id < 65535"),
            Self::EmptyTopicFilter => write!(f, "at least one topic filter must be specified"),
            Self::PasswordWithoutUsername => write!(f, "password requires a user name"),
            Self::WillFieldMismatch => {
                write!(f, "will topic and will message must be set together")
            }
            Self::InvalidWillQos => write!(f, "will qos requires a will topic and message"),
            Self::InvalidVarInt => write!(f, "remaining length exceeds maximum packet size"),
        }
    }
}

impl std::error::Error for EncodeError {}

impl From<VarIntError> for EncodeError {
    fn from(_e: VarIntError) -> Self {
        Self::InvalidVarInt
    }
}
