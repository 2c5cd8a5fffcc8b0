// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use std::convert::TryFrom;

use crate::header::PacketType;
use crate::packet::Packet;
use crate::var_int::decode_remaining_length;
use crate::DecodeError;

/// Carve zero or more complete packets out of the front of `buf`.
///
/// This is the incremental stream-parsing entry point: `buf` holds whatever
/// bytes have accumulated from the transport so far (a prior call's leftover
/// tail plus anything freshly read). Each complete packet found is appended,
/// in order, to `sink`. The return value is the number of bytes consumed from
/// the front of `buf` -- the caller discards that prefix and keeps the rest
/// for the next call, growing it with more bytes read from the peer.
///
/// A return of `0` with `Ok` does not mean `buf` was empty; it means no
/// packet in it is complete yet. Nothing is ever discarded for you: this
/// function never mutates `buf`, it only reads it.
///
/// # Errors
///
/// Returns [`DecodeError`] on the first malformed or ill-shaped packet
/// encountered. Per MQTT 3.1.1's own policy, a caller that sees this error
/// must treat the connection as unrecoverable and discard the whole buffer
/// rather than try to resynchronize on a later byte -- any packets already
/// appended to `sink` during this call remain there, but `buf` is not
/// considered partially consumed.
pub fn parse(buf: &mut [u8], sink: &mut Vec<Packet>) -> Result<usize, DecodeError> {
    let mut offset = 0usize;

    loop {
        let remaining = &buf[offset..];
        if remaining.len() < 2 {
            return Ok(offset);
        }

        let packet_type = PacketType::try_from(remaining[0])?;

        let (remaining_length, rl_bytes) = match decode_remaining_length(&remaining[1..])? {
            Some(v) => v,
            None => return Ok(offset),
        };

        let header_size = 1 + rl_bytes;
        let total = header_size + remaining_length;
        if remaining.len() < total {
            return Ok(offset);
        }

        let body = &remaining[header_size..total];
        let packet = dispatch(packet_type, body)?;
        sink.push(packet);
        offset += total;
    }
}

/// Decode a single already-framed packet body. `packet_type` and `body` have
/// already been proven complete by [`parse`]; sub-decoders never need to
/// signal "need more data".
fn dispatch(packet_type: PacketType, body: &[u8]) -> Result<Packet, DecodeError> {
    match packet_type {
        PacketType::ConnectAck => Packet::decode_connack(body),
        PacketType::SubscribeAck => Packet::decode_suback(body),
        PacketType::Publish { dup, qos, retain } => Packet::decode_publish(dup, qos, retain, body),
        PacketType::PublishAck => Packet::decode_puback(body),
        PacketType::PingResponse => Packet::decode_pingresp(body),
        PacketType::Disconnect { reserved } => Packet::decode_disconnect(reserved, body),
        other => Ok(Packet::decode_other(other, body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QoS;

    #[test]
    fn test_parse_connack() {
        let mut buf = [0x20, 0x02, 0x00, 0x00];
        let mut sink = Vec::new();
        let consumed = parse(&mut buf, &mut sink).unwrap();
        assert_eq!(consumed, 4);
        assert_eq!(sink.len(), 1);
        match &sink[0] {
            Packet::Connack {
                return_code,
                session_present,
            } => {
                assert_eq!(*return_code, 0);
                assert!(!session_present);
            }
            other => panic!("unexpected packet: {other:?}"),
        }
    }

    #[test]
    fn test_parse_suback() {
        let mut buf = [0x90, 0x03, 0x00, 0x01, 0x00];
        let mut sink = Vec::new();
        let consumed = parse(&mut buf, &mut sink).unwrap();
        assert_eq!(consumed, 5);
        match &sink[0] {
            Packet::Suback {
                packet_id,
                return_codes,
            } => {
                assert_eq!(packet_id.value(), 1);
                assert_eq!(return_codes, &vec![0]);
            }
            other => panic!("unexpected packet: {other:?}"),
        }
    }

    #[test]
    fn test_parse_puback() {
        let mut buf = [0x40, 0x02, 0x30, 0x39];
        let mut sink = Vec::new();
        let consumed = parse(&mut buf, &mut sink).unwrap();
        assert_eq!(consumed, 4);
        match &sink[0] {
            Packet::Puback { packet_id } => assert_eq!(packet_id.value(), 12345),
            other => panic!("unexpected packet: {other:?}"),
        }
    }

    #[test]
    fn test_parse_puback_wrong_shape_is_invalid() {
        let mut buf = [0x40, 0x01, 0x30];
        let mut sink = Vec::new();
        assert!(parse(&mut buf, &mut sink).is_err());
    }

    #[test]
    fn test_parse_needs_more_data_returns_zero_consumed() {
        // Declares remaining_length=2 but only one payload byte present.
        let mut buf = [0x20, 0x02, 0x00];
        let mut sink = Vec::new();
        let consumed = parse(&mut buf, &mut sink).unwrap();
        assert_eq!(consumed, 0);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_parse_prefix_of_header_returns_zero_consumed() {
        let mut buf = [0x20];
        let mut sink = Vec::new();
        let consumed = parse(&mut buf, &mut sink).unwrap();
        assert_eq!(consumed, 0);
    }

    #[test]
    fn test_parse_two_packets_back_to_back() {
        let mut buf = [
            0xd0, 0x00, // Pingresp
            0xe0, 0x00, // Disconnect
        ];
        let mut sink = Vec::new();
        let consumed = parse(&mut buf, &mut sink).unwrap();
        assert_eq!(consumed, 4);
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0], Packet::Pingresp);
        assert_eq!(sink[1], Packet::Disconnect { reserved: 0 });
    }

    #[test]
    fn test_parse_publish_qos0_has_no_packet_id() {
        let mut buf = vec![0x30, 0x08, 0x00, 0x04, b't', b'e', b's', b't', b'h', b'i'];
        let mut sink = Vec::new();
        let consumed = parse(&mut buf, &mut sink).unwrap();
        assert_eq!(consumed, 10);
        match &sink[0] {
            Packet::Publish {
                dup,
                qos,
                retain,
                topic,
                packet_id,
                payload,
            } => {
                assert!(!dup);
                assert_eq!(*qos, QoS::AtMostOnce);
                assert!(!retain);
                assert_eq!(topic.as_str(), "test");
                assert_eq!(*packet_id, None);
                assert_eq!(payload.as_ref(), b"hi");
            }
            other => panic!("unexpected packet: {other:?}"),
        }
    }

    #[test]
    fn test_parse_unrecognized_type_is_malformed() {
        let mut buf = [0x00, 0x00];
        let mut sink = Vec::new();
        assert_eq!(
            parse(&mut buf, &mut sink).unwrap_err(),
            DecodeError::InvalidPacketType
        );
    }

    #[test]
    fn test_parse_other_placeholder_for_unmodeled_type() {
        // PINGREQ, type 12, flags must be 0.
        let mut buf = [0xc0, 0x00];
        let mut sink = Vec::new();
        let consumed = parse(&mut buf, &mut sink).unwrap();
        assert_eq!(consumed, 2);
        match &sink[0] {
            Packet::Other { packet_type, body } => {
                assert_eq!(*packet_type, PacketType::PingRequest);
                assert!(body.is_empty());
            }
            other => panic!("unexpected packet: {other:?}"),
        }
    }
}
