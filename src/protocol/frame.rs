use crate::error::{Error, Result};

/// Start byte for every frame (STX)
pub const START_BYTE: u8 = 0x02;
/// End byte for every frame, followed by the checksum (ETX)
pub const END_BYTE: u8 = 0x03;

/// Address every sign on the bus listens to
pub const BROADCAST_ADDRESS: u8 = 0x0;
/// Command and address each take a single hex digit on the wire
pub const MAX_ADDRESS: u8 = 0xF;
pub const MAX_COMMAND_CODE: u8 = 0xF;

/// Largest packed image that fits the one-byte resolution field
pub const MAX_IMAGE_BYTES: usize = 0xFF;
/// Resolution field plus every image byte rendered as two hex digits
pub const MAX_PAYLOAD_LEN: usize = 2 + 2 * MAX_IMAGE_BYTES;

/// Start + command + address + end + two checksum digits
const FRAME_OVERHEAD: usize = 6;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Hanover command codes
pub const CMD_WRITE_IMAGE: u8 = 0x1;
pub const CMD_START_TEST_SIGNS: u8 = 0x3;
pub const CMD_STOP_TEST_SIGNS: u8 = 0xC;

/// A command the controller can put on the bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show an image; holds the packed column-major image bytes
    DrawImage(Vec<u8>),
    /// Every sign loops its built-in test sequence
    StartTestSigns,
    /// Every sign leaves the test sequence
    StopTestSigns,
}

impl Command {
    /// Wire command code for this command
    pub fn code(&self) -> u8 {
        match self {
            Command::DrawImage(_) => CMD_WRITE_IMAGE,
            Command::StartTestSigns => CMD_START_TEST_SIGNS,
            Command::StopTestSigns => CMD_STOP_TEST_SIGNS,
        }
    }

    /// Build the payload bytes that follow the frame header
    pub fn payload(&self) -> Result<Vec<u8>> {
        match self {
            Command::DrawImage(image_bytes) => image_payload(image_bytes),
            Command::StartTestSigns | Command::StopTestSigns => Ok(Vec::new()),
        }
    }

    /// Encode this command into a complete frame for `address`
    pub fn to_frame(&self, address: u8) -> Result<Vec<u8>> {
        encode(address, self.code(), &self.payload()?)
    }
}

/// Build a Hanover frame
///
/// Layout: `STX, hex(command), hex(address), payload..., ETX, checksum hi, checksum lo`.
/// The payload is copied verbatim; callers are responsible for its ASCII encoding.
pub fn encode(address: u8, command_code: u8, payload: &[u8]) -> Result<Vec<u8>> {
    if address > MAX_ADDRESS {
        return Err(Error::Encoding(format!(
            "address {} out of range (0-{})",
            address, MAX_ADDRESS
        )));
    }
    if command_code > MAX_COMMAND_CODE {
        return Err(Error::Encoding(format!(
            "command code {} out of range (0-{})",
            command_code, MAX_COMMAND_CODE
        )));
    }
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(Error::Encoding(format!(
            "payload of {} bytes exceeds the {} byte limit",
            payload.len(),
            MAX_PAYLOAD_LEN
        )));
    }

    let mut frame = Vec::with_capacity(FRAME_OVERHEAD + payload.len());

    // Header
    frame.push(START_BYTE);
    frame.push(HEX_DIGITS[command_code as usize]);
    frame.push(HEX_DIGITS[address as usize]);

    frame.extend_from_slice(payload);

    // Footer: end byte, then checksum over everything after the start byte
    frame.push(END_BYTE);
    let sum = checksum(&frame[1..]);
    push_hex(&mut frame, sum);

    Ok(frame)
}

/// Modular checksum: two's complement of the low byte of the sum
pub fn checksum(data: &[u8]) -> u8 {
    let total = data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    (!total).wrapping_add(1)
}

/// Payload of a write-image frame: packed length, then the packed bytes, all as ASCII hex
pub fn image_payload(image_bytes: &[u8]) -> Result<Vec<u8>> {
    if image_bytes.len() > MAX_IMAGE_BYTES {
        return Err(Error::Encoding(format!(
            "image of {} bytes exceeds the {} byte limit",
            image_bytes.len(),
            MAX_IMAGE_BYTES
        )));
    }

    let mut payload = Vec::with_capacity(2 + 2 * image_bytes.len());
    push_hex(&mut payload, image_bytes.len() as u8);
    for &byte in image_bytes {
        push_hex(&mut payload, byte);
    }
    Ok(payload)
}

/// A frame split back into its fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub command_code: u8,
    pub address: u8,
    pub payload: Vec<u8>,
}

impl DecodedFrame {
    /// Recover the packed image bytes from a write-image payload
    pub fn image_bytes(&self) -> Result<Vec<u8>> {
        if self.command_code != CMD_WRITE_IMAGE {
            return Err(Error::MalformedFrame(format!(
                "command {:X} carries no image",
                self.command_code
            )));
        }
        if self.payload.len() < 2 {
            return Err(Error::MalformedFrame(format!(
                "image payload of {} bytes is missing its length field",
                self.payload.len()
            )));
        }
        if self.payload.len() % 2 != 0 {
            return Err(Error::MalformedFrame(format!(
                "image payload has odd length {}",
                self.payload.len()
            )));
        }

        let count = parse_hex_byte(self.payload[0], self.payload[1])?;
        let bytes = self.payload[2..]
            .chunks_exact(2)
            .map(|pair| parse_hex_byte(pair[0], pair[1]))
            .collect::<Result<Vec<u8>>>()?;

        if bytes.len() != count as usize {
            return Err(Error::MalformedFrame(format!(
                "image declares {} bytes, carries {}",
                count,
                bytes.len()
            )));
        }
        Ok(bytes)
    }
}

/// Parse and verify a frame produced by [`encode`]
pub fn decode(frame: &[u8]) -> Result<DecodedFrame> {
    if frame.len() < FRAME_OVERHEAD {
        return Err(Error::MalformedFrame(format!(
            "{} bytes is shorter than the minimum frame",
            frame.len()
        )));
    }
    if frame[0] != START_BYTE {
        return Err(Error::MalformedFrame(format!(
            "expected start byte 0x{:02x}, got 0x{:02x}",
            START_BYTE, frame[0]
        )));
    }

    let end = frame.len() - 3;
    if frame[end] != END_BYTE {
        return Err(Error::MalformedFrame(format!(
            "expected end byte 0x{:02x}, got 0x{:02x}",
            END_BYTE, frame[end]
        )));
    }

    let expected = checksum(&frame[1..=end]);
    let actual = parse_hex_byte(frame[end + 1], frame[end + 2])?;
    if expected != actual {
        return Err(Error::MalformedFrame(format!(
            "checksum mismatch: expected {:02X}, got {:02X}",
            expected, actual
        )));
    }

    Ok(DecodedFrame {
        command_code: parse_hex_digit(frame[1])?,
        address: parse_hex_digit(frame[2])?,
        payload: frame[3..end].to_vec(),
    })
}

fn push_hex(buf: &mut Vec<u8>, byte: u8) {
    buf.push(HEX_DIGITS[(byte >> 4) as usize]);
    buf.push(HEX_DIGITS[(byte & 0x0F) as usize]);
}

fn parse_hex_digit(digit: u8) -> Result<u8> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        _ => Err(Error::MalformedFrame(format!(
            "0x{:02x} is not an uppercase hex digit",
            digit
        ))),
    }
}

fn parse_hex_byte(hi: u8, lo: u8) -> Result<u8> {
    Ok((parse_hex_digit(hi)? << 4) | parse_hex_digit(lo)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_no_payload() {
        let frame = encode(2, 1, &[]).unwrap();
        assert_eq!(frame, b"\x0212\x039A");
    }

    #[test]
    fn test_with_payload() {
        let frame = encode(2, 1, b"345").unwrap();
        assert_eq!(frame, b"\x0212345\x03FE");
    }

    #[test]
    fn test_start_test_signs_frame() {
        let frame = Command::StartTestSigns.to_frame(BROADCAST_ADDRESS).unwrap();
        assert_eq!(frame, b"\x0230\x039A");
    }

    #[test]
    fn test_stop_test_signs_frame() {
        let frame = Command::StopTestSigns.to_frame(BROADCAST_ADDRESS).unwrap();
        assert_eq!(frame, b"\x02C0\x038A");
    }

    #[test]
    fn test_draw_image_frame() {
        let frame = Command::DrawImage(vec![0x04, 0x00]).to_frame(1).unwrap();
        assert_eq!(frame, b"\x0211020400\x0375");
    }

    #[test]
    fn test_address_out_of_range() {
        let err = encode(0x10, 1, &[]).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }

    #[test]
    fn test_command_out_of_range() {
        let err = encode(1, 0x10, &[]).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }

    #[test]
    fn test_payload_too_long() {
        let payload = vec![b'0'; MAX_PAYLOAD_LEN + 1];
        assert!(matches!(encode(1, 1, &payload), Err(Error::Encoding(_))));

        let payload = vec![b'0'; MAX_PAYLOAD_LEN];
        assert!(encode(1, 1, &payload).is_ok());
    }

    #[test]
    fn test_image_too_large() {
        let err = Command::DrawImage(vec![0; MAX_IMAGE_BYTES + 1])
            .to_frame(1)
            .unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }

    #[test]
    fn test_decode_rejects_bad_checksum() {
        let mut frame = encode(2, 1, b"345").unwrap();
        let last = frame.len() - 1;
        frame[last] = b'0';
        assert!(matches!(decode(&frame), Err(Error::MalformedFrame(_))));
    }

    #[test]
    fn test_decode_rejects_missing_markers() {
        assert!(decode(b"\x0212\x03").is_err());
        assert!(decode(b"X12\x039A").is_err());
        assert!(decode(b"\x0212X9A").is_err());
    }

    #[test]
    fn test_image_bytes_rejects_short_and_odd_payloads() {
        let mut decoded = decode(&encode(1, CMD_WRITE_IMAGE, &[]).unwrap()).unwrap();
        match decoded.image_bytes() {
            Err(Error::MalformedFrame(msg)) => assert!(msg.contains("missing its length field")),
            other => panic!("unexpected result: {:?}", other),
        }

        decoded.payload = b"010".to_vec();
        match decoded.image_bytes() {
            Err(Error::MalformedFrame(msg)) => assert!(msg.contains("odd length 3")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_decode_image_roundtrip() {
        let image = vec![0x40, 0x20, 0x00, 0x00];
        let frame = Command::DrawImage(image.clone()).to_frame(1).unwrap();
        assert_eq!(frame, b"\x02110440200000\x03B1");

        let decoded = decode(&frame).unwrap();
        assert_eq!(decoded.address, 1);
        assert_eq!(decoded.command_code, CMD_WRITE_IMAGE);
        assert_eq!(decoded.image_bytes().unwrap(), image);
    }

    proptest! {
        #[test]
        fn checksum_matches_recomputation(
            address in 0u8..=MAX_ADDRESS,
            command in 0u8..=MAX_COMMAND_CODE,
            payload in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            let frame = encode(address, command, &payload).unwrap();
            let end = frame.len() - 3;
            let sum = checksum(&frame[1..=end]);
            let digits = [HEX_DIGITS[(sum >> 4) as usize], HEX_DIGITS[(sum & 0x0F) as usize]];
            prop_assert_eq!(&frame[end + 1..], &digits[..]);

            // Every byte after the start byte, checksum included, sums to zero
            let body: u8 = frame[1..=end].iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
            prop_assert_eq!(body.wrapping_add(sum), 0);
        }

        #[test]
        fn decode_recovers_fields(
            address in 0u8..=MAX_ADDRESS,
            image in proptest::collection::vec(any::<u8>(), 0..=MAX_IMAGE_BYTES),
        ) {
            let frame = Command::DrawImage(image.clone()).to_frame(address).unwrap();
            let decoded = decode(&frame).unwrap();
            prop_assert_eq!(decoded.address, address);
            prop_assert_eq!(decoded.command_code, CMD_WRITE_IMAGE);
            prop_assert_eq!(decoded.image_bytes().unwrap(), image);
        }
    }
}
