// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use std::convert::TryFrom;

use crate::byte_array::ByteArray;
use crate::var_int::{VarInt, VarIntError};
use crate::{DecodeError, DecodePacket, EncodeError, EncodePacket, QoS};

/// The MQTT 3.1.1 control packet type registry. Type codes 0 and 15 are
/// reserved and never constructed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PacketType {
    #[default]
    Connect,
    ConnectAck,
    Publish {
        dup: bool,
        qos: QoS,
        retain: bool,
    },
    PublishAck,
    PublishReceived,
    PublishRelease,
    PublishComplete,
    Subscribe,
    SubscribeAck,
    Unsubscribe,
    UnsubscribeAck,
    PingRequest,
    PingResponse,
    Disconnect {
        reserved: u8,
    },
}

impl PacketType {
    #[must_use]
    pub const fn bytes() -> usize {
        1
    }
}

impl From<PacketType> for u8 {
    fn from(packet_type: PacketType) -> Self {
        let type_bits: u8 = match packet_type {
            PacketType::Connect => 1,
            PacketType::ConnectAck => 2,
            PacketType::Publish { .. } => 3,
            PacketType::PublishAck => 4,
            PacketType::PublishReceived => 5,
            PacketType::PublishRelease => 6,
            PacketType::PublishComplete => 7,
            PacketType::Subscribe => 8,
            PacketType::SubscribeAck => 9,
            PacketType::Unsubscribe => 10,
            PacketType::UnsubscribeAck => 11,
            PacketType::PingRequest => 12,
            PacketType::PingResponse => 13,
            PacketType::Disconnect { .. } => 14,
        };

        let flags_bits: u8 = match packet_type {
            PacketType::Publish { dup, qos, retain } => {
                let dup = u8::from(dup) << 3;
                let qos = match qos {
                    QoS::AtMostOnce => 0b0000_0000,
                    QoS::AtLeastOnce => 0b0000_0010,
                    QoS::ExactOnce => 0b0000_0100,
                };
                let retain = u8::from(retain);
                dup | qos | retain
            }
            // Bits 3,2,1 and 0 of PUBREL/SUBSCRIBE/UNSUBSCRIBE are reserved and
            // MUST be set to 0,0,1,0 [MQTT-3.6.1-1], [MQTT-3.8.1-1], [MQTT-3.10.1-1].
            PacketType::PublishRelease | PacketType::Subscribe | PacketType::Unsubscribe => {
                0b0000_0010
            }
            PacketType::Disconnect { reserved } => reserved,
            _ => 0b0000_0000,
        };
        (type_bits << 4) | flags_bits
    }
}

impl TryFrom<u8> for PacketType {
    type Error = DecodeError;

    /// Parse a packet type from the fixed header's first byte.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidPacketType`] for type codes 0 and 15, and
    /// [`DecodeError::InvalidPacketFlags`] if a reserved flag bit does not carry
    /// the value MQTT 3.1.1 mandates for that type.
    fn try_from(v: u8) -> Result<Self, Self::Error> {
        let type_bits = (v & 0b1111_0000) >> 4;
        let flag = v & 0b0000_1111;

        let reserved_ok = |name: &str, expected: u8| {
            if flag == expected {
                Ok(())
            } else {
                log::error!("header: got packet flag in {name}: {flag:#06b}");
                Err(DecodeError::InvalidPacketFlags)
            }
        };

        match type_bits {
            1 => reserved_ok("Connect", 0b0000_0000).map(|()| Self::Connect),
            2 => reserved_ok("ConnectAck", 0b0000_0000).map(|()| Self::ConnectAck),
            3 => {
                let dup = flag & 0b0000_1000 == 0b0000_1000;
                let retain = flag & 0b0000_0001 == 0b0000_0001;
                let qos = match flag & 0b0000_0110 {
                    0b0000_0000 => QoS::AtMostOnce,
                    0b0000_0010 => QoS::AtLeastOnce,
                    0b0000_0100 => QoS::ExactOnce,
                    _ => {
                        log::error!("header: got invalid qos bits in Publish: {flag:#06b}");
                        return Err(DecodeError::InvalidQoS);
                    }
                };
                Ok(Self::Publish { dup, retain, qos })
            }
            4 => reserved_ok("PublishAck", 0b0000_0000).map(|()| Self::PublishAck),
            5 => reserved_ok("PublishReceived", 0b0000_0000).map(|()| Self::PublishReceived),
            6 => reserved_ok("PublishRelease", 0b0000_0010).map(|()| Self::PublishRelease),
            7 => reserved_ok("PublishComplete", 0b0000_0000).map(|()| Self::PublishComplete),
            8 => reserved_ok("Subscribe", 0b0000_0010).map(|()| Self::Subscribe),
            9 => reserved_ok("SubscribeAck", 0b0000_0000).map(|()| Self::SubscribeAck),
            10 => reserved_ok("Unsubscribe", 0b0000_0010).map(|()| Self::Unsubscribe),
            11 => reserved_ok("UnsubscribeAck", 0b0000_0000).map(|()| Self::UnsubscribeAck),
            12 => reserved_ok("PingRequest", 0b0000_0000).map(|()| Self::PingRequest),
            13 => reserved_ok("PingResponse", 0b0000_0000).map(|()| Self::PingResponse),
            // The Disconnect reserved nibble is carried through rather than validated
            // here: the packet value model exposes it to the caller (§3 `reserved`).
            14 => Ok(Self::Disconnect { reserved: flag }),
            _ => {
                log::debug!("header: unrecognized packet type nibble {type_bits:#x}");
                Err(DecodeError::InvalidPacketType)
            }
        }
    }
}

/// Fixed header part of an MQTT control packet: at least two bytes.
///
/// ```text
///  7 6 5 4 3 2 1 0
/// +-------+-------+
/// | Type  | Flags |
/// +-------+-------+
/// | Remaining Len |
/// +-------+-------+
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedHeader {
    packet_type: PacketType,
    remaining_length: VarInt,
}

impl FixedHeader {
    /// # Errors
    ///
    /// Returns a [`VarIntError`] if `remaining_length` exceeds `268_435_455`.
    pub fn new(packet_type: PacketType, remaining_length: usize) -> Result<Self, VarIntError> {
        Ok(Self {
            packet_type,
            remaining_length: VarInt::from_usize(remaining_length)?,
        })
    }

    #[must_use]
    pub const fn packet_type(&self) -> PacketType {
        self.packet_type
    }

    #[must_use]
    pub const fn remaining_length(&self) -> usize {
        self.remaining_length.value()
    }

    #[must_use]
    pub const fn bytes(&self) -> usize {
        PacketType::bytes() + self.remaining_length.bytes()
    }
}

impl DecodePacket for FixedHeader {
    fn decode(ba: &mut ByteArray) -> Result<Self, DecodeError> {
        let flag = ba.read_byte()?;
        let packet_type = PacketType::try_from(flag)?;
        let remaining_length = VarInt::decode(ba)?;
        Ok(Self {
            packet_type,
            remaining_length,
        })
    }
}

impl EncodePacket for FixedHeader {
    fn encode(&self, buf: &mut Vec<u8>) -> Result<usize, EncodeError> {
        buf.push(self.packet_type.into());
        let written = self.remaining_length.encode(buf)?;
        Ok(PacketType::bytes() + written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        let mut buf = Vec::new();
        let fixed_header = FixedHeader::new(PacketType::PingResponse, 0).unwrap();
        let ret = fixed_header.encode(&mut buf).unwrap();
        assert_eq!(ret, 2);
        assert_eq!(buf, vec![0xd0, 0x00]);
    }

    #[test]
    fn test_decode() {
        let buf = [0x30, 0x02, 0xAA, 0xBB];
        let mut ba = ByteArray::new(&buf);
        let fixed_header = FixedHeader::decode(&mut ba).unwrap();
        assert_eq!(
            fixed_header.packet_type(),
            PacketType::Publish {
                dup: false,
                qos: QoS::AtMostOnce,
                retain: false,
            }
        );
        assert_eq!(fixed_header.remaining_length(), 2);
    }

    #[test]
    fn test_reject_reserved_flags() {
        // PUBACK (type 4) must carry flag nibble 0.
        let buf = [0x41, 0x00];
        let mut ba = ByteArray::new(&buf);
        assert!(FixedHeader::decode(&mut ba).is_err());
    }

    #[test]
    fn test_reject_unknown_type() {
        let buf = [0x00, 0x00];
        let mut ba = ByteArray::new(&buf);
        assert_eq!(
            FixedHeader::decode(&mut ba).unwrap_err(),
            DecodeError::InvalidPacketType
        );
        let buf = [0xF0, 0x00];
        let mut ba = ByteArray::new(&buf);
        assert_eq!(
            FixedHeader::decode(&mut ba).unwrap_err(),
            DecodeError::InvalidPacketType
        );
    }
}
