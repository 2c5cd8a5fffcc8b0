// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use crate::connect_spec::ConnectSpec;
use crate::header::{FixedHeader, PacketType};
use crate::packet_trait::EncodePacket;
use crate::string_data::StringData;
use crate::EncodeError;

/// Protocol name literal every Connect packet begins with, MQTT 3.1.1 §3.1.2.1.
const PROTOCOL_NAME: &str = "MQTT";

/// Protocol level byte for MQTT 3.1.1, MQTT 3.1.1 §3.1.2.2.
const PROTOCOL_LEVEL: u8 = 0x04;

const DEFAULT_KEEPALIVE: u16 = 60;

/// Build a Connect packet.
///
/// `keepalive` defaults to 60 seconds when `None`. `connect_spec` supplies the
/// optional user name, password and will fields; when `None` the connect-flags
/// byte carries only the clean-session bit (`0x02`).
///
/// # Errors
///
/// Returns [`EncodeError::TooManyData`] if `client_id` is too large for the
/// 2-byte length prefix, or propagates any [`EncodeError`] raised while
/// encoding the fields of `connect_spec`.
pub fn connect(
    client_id: &str,
    keepalive: Option<u16>,
    connect_spec: Option<&ConnectSpec>,
) -> Result<Vec<u8>, EncodeError> {
    let protocol_name = StringData::from(PROTOCOL_NAME)?;
    let client_id = StringData::from(client_id)?;
    let keepalive = keepalive.unwrap_or(DEFAULT_KEEPALIVE);
    let flags_byte = connect_spec.map_or(0b0000_0010, ConnectSpec::flags_byte);

    let variable_header_len = protocol_name.bytes() + 1 + 1 + 2;
    let payload_len = client_id.bytes()
        + connect_spec.map_or(0, ConnectSpec::payload_remaining_length);
    let remaining_length = variable_header_len + payload_len;

    let fixed_header = FixedHeader::new(PacketType::Connect, remaining_length)?;

    let mut buf = Vec::with_capacity(fixed_header.bytes() + remaining_length);
    fixed_header.encode(&mut buf)?;

    protocol_name.encode(&mut buf)?;
    buf.push(PROTOCOL_LEVEL);
    buf.push(flags_byte);
    buf.extend_from_slice(&keepalive.to_be_bytes());

    client_id.encode(&mut buf)?;
    if let Some(spec) = connect_spec {
        spec.encode_payload(&mut buf)?;
    }

    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_minimal() {
        let buf = connect("Foobar", None, None).unwrap();
        assert_eq!(
            buf,
            vec![
                0x10, 0x12, 0x00, 0x04, 0x4D, 0x51, 0x54, 0x54, 0x04, 0x02, 0x00, 0x3C, 0x00,
                0x06, 0x46, 0x6F, 0x6F, 0x62, 0x61, 0x72,
            ]
        );
    }

    #[test]
    fn test_connect_with_credentials_and_will() {
        let spec = ConnectSpec::new(Some("u"), Some("p"), Some("t"), Some(b"m"), 1).unwrap();
        let buf = connect("c", Some(30), Some(&spec)).unwrap();
        // Fixed header + protocol name/level.
        assert_eq!(&buf[0..9], &[0x10, buf[1], 0x00, 0x04, b'M', b'Q', b'T', b'T', 0x04]);
        // Connect flags: user(0x80)|pass(0x40)|will_qos=1(0x08)|will(0x04)|clean(0x02).
        assert_eq!(buf[9], 0b1100_1110);
        // Keepalive big-endian.
        assert_eq!(&buf[10..12], &30u16.to_be_bytes());
        // client id "c"
        assert_eq!(&buf[12..15], &[0x00, 0x01, b'c']);
        // will topic "t"
        assert_eq!(&buf[15..18], &[0x00, 0x01, b't']);
        // will message "m"
        assert_eq!(&buf[18..21], &[0x00, 0x01, b'm']);
        // username "u"
        assert_eq!(&buf[21..24], &[0x00, 0x01, b'u']);
        // password "p"
        assert_eq!(&buf[24..27], &[0x00, 0x01, b'p']);
        assert_eq!(buf.len(), 27);
    }

    #[test]
    fn test_connect_client_id_too_large_is_rejected() {
        let huge = "a".repeat(70_000);
        assert_eq!(
            connect(&huge, None, None).unwrap_err(),
            EncodeError::TooManyData
        );
    }
}
