// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use bytes::Bytes;

use crate::byte_array::ByteArray;
use crate::header::PacketType;
use crate::packet_id::PacketId;
use crate::packet_trait::DecodePacket;
use crate::topic::PubTopic;
use crate::{DecodeError, QoS};

/// An inbound packet value, produced by [`crate::parse`].
///
/// This is a sum type rather than a family of structs: a caller pattern-matches
/// on the variant instead of querying a `pkt_type` discriminant, which is the
/// idiomatic Rust translation of the source's integer-tagged dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Packet {
    /// Acknowledgement of a Connect packet.
    Connack { return_code: u8, session_present: bool },

    /// Acknowledgement of a Subscribe packet.
    Suback {
        packet_id: PacketId,
        return_codes: Vec<u8>,
    },

    /// A message published by the peer.
    Publish {
        dup: bool,
        qos: QoS,
        retain: bool,
        topic: PubTopic,
        packet_id: Option<PacketId>,
        payload: Bytes,
    },

    /// Acknowledgement of a QoS 1 Publish.
    Puback { packet_id: PacketId },

    /// Response to a Pingreq keep-alive probe. No payload.
    Pingresp,

    /// Final packet sent before the peer closes the connection.
    Disconnect { reserved: u8 },

    /// Any recognized control packet type this codec does not model with a
    /// dedicated variant (e.g. `PublishRec`/`PublishRel`/`PublishComp`,
    /// `UnsubscribeAck`, `PingRequest`, or a server-received `Connect`,
    /// `Subscribe`, `Unsubscribe`). Carries the raw packet body so a caller
    /// that needs the full MQTT 3.1.1 surface can decode it further.
    Other { packet_type: PacketType, body: Bytes },
}

impl Packet {
    /// Decode a Connack body. `body` must be exactly the bytes following the
    /// fixed header (already proven complete by the stream parser).
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidRemainingLength`] if `body` is not 2 bytes,
    /// or [`DecodeError::InvalidPacketFlags`] if a reserved ack-flags bit is set.
    pub(crate) fn decode_connack(body: &[u8]) -> Result<Self, DecodeError> {
        if body.len() != 2 {
            log::debug!("packet: Connack remaining length {} != 2", body.len());
            return Err(DecodeError::InvalidRemainingLength);
        }
        let ack_flags = body[0];
        let return_code = body[1];
        // Bits 1-7 of the Connect Acknowledge Flags are reserved and MUST be
        // set to 0 [MQTT-3.2.2-1].
        if ack_flags & 0b1111_1110 != 0 {
            log::debug!("packet: Connack reserved ack flag bits set: {ack_flags:#010b}");
            return Err(DecodeError::InvalidPacketFlags);
        }
        let session_present = ack_flags & 0b0000_0001 == 0b0000_0001;
        Ok(Self::Connack {
            return_code,
            session_present,
        })
    }

    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidRemainingLength`] if `body` is shorter than
    /// 3 bytes.
    pub(crate) fn decode_suback(body: &[u8]) -> Result<Self, DecodeError> {
        if body.len() < 3 {
            log::debug!("packet: Suback remaining length {} < 3", body.len());
            return Err(DecodeError::InvalidRemainingLength);
        }
        let mut ba = ByteArray::new(&body[0..2]);
        let packet_id = PacketId::decode(&mut ba)?;
        let return_codes = body[2..].to_vec();
        Ok(Self::Suback {
            packet_id,
            return_codes,
        })
    }

    /// # Errors
    ///
    /// Propagates [`DecodeError`] from topic/packet-id decoding.
    pub(crate) fn decode_publish(
        dup: bool,
        qos: QoS,
        retain: bool,
        body: &[u8],
    ) -> Result<Self, DecodeError> {
        let mut ba = ByteArray::new(body);
        let topic = PubTopic::decode(&mut ba)?;
        let packet_id = if qos == QoS::AtMostOnce {
            None
        } else {
            Some(PacketId::decode(&mut ba)?)
        };
        let payload = Bytes::copy_from_slice(ba.read_remaining());
        Ok(Self::Publish {
            dup,
            qos,
            retain,
            topic,
            packet_id,
            payload,
        })
    }

    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidRemainingLength`] if `body` is not 2 bytes.
    pub(crate) fn decode_puback(body: &[u8]) -> Result<Self, DecodeError> {
        if body.len() != 2 {
            log::debug!("packet: Puback remaining length {} != 2", body.len());
            return Err(DecodeError::InvalidRemainingLength);
        }
        let mut ba = ByteArray::new(body);
        let packet_id = PacketId::decode(&mut ba)?;
        Ok(Self::Puback { packet_id })
    }

    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidRemainingLength`] if `body` is not empty.
    pub(crate) fn decode_pingresp(body: &[u8]) -> Result<Self, DecodeError> {
        if !body.is_empty() {
            log::debug!("packet: Pingresp remaining length {} != 0", body.len());
            return Err(DecodeError::InvalidRemainingLength);
        }
        Ok(Self::Pingresp)
    }

    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidRemainingLength`] if `body` is not empty.
    pub(crate) fn decode_disconnect(reserved: u8, body: &[u8]) -> Result<Self, DecodeError> {
        if !body.is_empty() {
            log::debug!("packet: Disconnect remaining length {} != 0", body.len());
            return Err(DecodeError::InvalidRemainingLength);
        }
        Ok(Self::Disconnect { reserved })
    }

    /// Wrap a recognized-but-unmodeled packet type and its body verbatim.
    pub(crate) fn decode_other(packet_type: PacketType, body: &[u8]) -> Self {
        Self::Other {
            packet_type,
            body: Bytes::copy_from_slice(body),
        }
    }
}
