// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use crate::header::{FixedHeader, PacketType};
use crate::packet_id::PacketId;
use crate::packet_trait::EncodePacket;
use crate::subscription::SubscriptionSpec;
use crate::EncodeError;

/// Build a Subscribe packet.
///
/// # Errors
///
/// - [`EncodeError::InvalidPacketId`] if `packet_id` is 0 or 65535.
/// - [`EncodeError::EmptyTopicFilter`] if `subscriptions` is empty; MQTT-3.8.3-3
///   requires at least one topic filter.
pub fn subscribe(
    packet_id: u16,
    subscriptions: &[SubscriptionSpec],
) -> Result<Vec<u8>, EncodeError> {
    if packet_id == 0 || packet_id == u16::MAX {
        return Err(EncodeError::InvalidPacketId);
    }
    if subscriptions.is_empty() {
        return Err(EncodeError::EmptyTopicFilter);
    }

    let payload_len: usize = subscriptions.iter().map(SubscriptionSpec::bytes).sum();
    let remaining_length = PacketId::bytes() + payload_len;

    let fixed_header = FixedHeader::new(PacketType::Subscribe, remaining_length)?;

    let mut buf = Vec::with_capacity(fixed_header.bytes() + remaining_length);
    fixed_header.encode(&mut buf)?;
    PacketId::new(packet_id).encode(&mut buf)?;
    for subscription in subscriptions {
        subscription.encode(&mut buf)?;
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_two_filters() {
        let subscriptions = vec![
            SubscriptionSpec::new("a/b", 1).unwrap(),
            SubscriptionSpec::new("c/d", 2).unwrap(),
        ];
        let buf = subscribe(10, &subscriptions).unwrap();
        assert_eq!(
            buf,
            vec![
                0x82, 0x0E, 0x00, 0x0A, 0x00, 0x03, b'a', b'/', b'b', 0x01, 0x00, 0x03, b'c',
                b'/', b'd', 0x02,
            ]
        );
    }

    #[test]
    fn test_subscribe_rejects_zero_packet_id() {
        let subscriptions = vec![SubscriptionSpec::new("a", 0).unwrap()];
        assert_eq!(
            subscribe(0, &subscriptions).unwrap_err(),
            EncodeError::InvalidPacketId
        );
    }

    #[test]
    fn test_subscribe_rejects_empty_filter_list() {
        assert_eq!(
            subscribe(1, &[]).unwrap_err(),
            EncodeError::EmptyTopicFilter
        );
    }
}
