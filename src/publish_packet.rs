// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use std::convert::TryFrom;

use crate::header::{FixedHeader, PacketType};
use crate::packet_id::PacketId;
use crate::packet_trait::EncodePacket;
use crate::topic::PubTopic;
use crate::{EncodeError, QoS};

/// Build a Publish packet.
///
/// QoS 0 publishes must not set `dup` and must not carry a packet id; QoS 1/2
/// publishes must carry a nonzero packet id.
///
/// # Errors
///
/// - [`EncodeError::InvalidQoS`] if `qos` is not in `{0, 1, 2}`.
/// - [`EncodeError::UnexpectedDup`] if `dup` is set at QoS 0.
/// - [`EncodeError::UnexpectedPacketId`] if `packet_id` is set at QoS 0.
/// - [`EncodeError::MissingPacketId`] if `packet_id` is absent at QoS 1/2.
/// - [`EncodeError::TooManyData`] if `topic` is too large for the 2-byte
///   length prefix.
pub fn publish(
    topic: &str,
    dup: bool,
    qos: u8,
    retain: bool,
    payload: &[u8],
    packet_id: Option<u16>,
) -> Result<Vec<u8>, EncodeError> {
    let qos = QoS::try_from(qos).map_err(|_| EncodeError::InvalidQoS)?;

    match qos {
        QoS::AtMostOnce => {
            if dup {
                return Err(EncodeError::UnexpectedDup);
            }
            if packet_id.is_some() {
                return Err(EncodeError::UnexpectedPacketId);
            }
        }
        QoS::AtLeastOnce | QoS::ExactOnce => {
            if packet_id.map_or(true, |id| id == 0) {
                return Err(EncodeError::MissingPacketId);
            }
        }
    }

    let topic = PubTopic::new(topic)?;
    let packet_id = packet_id.map(PacketId::new);

    let mut remaining_length = topic.bytes() + payload.len();
    if packet_id.is_some() {
        remaining_length += PacketId::bytes();
    }

    let packet_type = PacketType::Publish { dup, qos, retain };
    let fixed_header = FixedHeader::new(packet_type, remaining_length)?;

    let mut buf = Vec::with_capacity(fixed_header.bytes() + remaining_length);
    fixed_header.encode(&mut buf)?;
    topic.encode(&mut buf)?;
    if let Some(packet_id) = packet_id {
        packet_id.encode(&mut buf)?;
    }
    buf.extend_from_slice(payload);

    Ok(buf)
}
