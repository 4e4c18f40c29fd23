// Frame layer for the relay's TCP streams.
//
// Every message travels as a 4-byte big-endian length prefix followed by
// that many payload bytes. The payload is an encoded `Message`, but this
// module never inspects it; callers encode and decode separately.
//
// Lengths above `MAX_FRAME_SIZE` are refused on both sides so a corrupt or
// hostile prefix cannot drive an arbitrarily large allocation. The largest
// legitimate frame is a full-roster update late in a game, which stays far
// below the cap.

use std::io::{self, Read, Write};

/// Upper bound on a frame's payload length, in bytes.
pub const MAX_FRAME_SIZE: u32 = 1024 * 1024;

fn oversize(len: usize, kind: io::ErrorKind) -> io::Error {
    io::Error::new(kind, format!("frame of {len} bytes exceeds {MAX_FRAME_SIZE}"))
}

/// Send one frame. The prefix and payload go out as a single write so a
/// buffered writer flushes them together.
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> io::Result<()> {
    let len = u32::try_from(payload.len())
        .ok()
        .filter(|&len| len <= MAX_FRAME_SIZE)
        .ok_or_else(|| oversize(payload.len(), io::ErrorKind::InvalidInput))?;
    let mut frame = Vec::with_capacity(payload.len() + 4);
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(payload);
    writer.write_all(&frame)?;
    writer.flush()
}

/// Receive one frame's payload.
///
/// A stream that closes before a complete frame arrives yields
/// `UnexpectedEof`; a prefix above `MAX_FRAME_SIZE` yields `InvalidData`
/// without allocating for the payload.
pub fn read_frame<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut prefix = [0u8; 4];
    reader.read_exact(&mut prefix)?;
    let len = u32::from_be_bytes(prefix);
    if len > MAX_FRAME_SIZE {
        return Err(oversize(len as usize, io::ErrorKind::InvalidData));
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload)?;
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use crate::message::Message;

    use super::*;

    #[test]
    fn frames_carry_encoded_messages_in_order() {
        let sent = [Message::RequestDeck, Message::TimeToConnect, Message::LaunchGame];
        let mut stream = Vec::new();
        for msg in &sent {
            write_frame(&mut stream, &msg.encode()).unwrap();
        }

        let mut cursor = Cursor::new(&stream);
        for msg in &sent {
            let payload = read_frame(&mut cursor).unwrap();
            assert_eq!(&Message::decode(&payload).unwrap(), msg);
        }
        // Nothing trailing after the last frame.
        assert!(read_frame(&mut cursor).is_err());
    }

    #[test]
    fn empty_payload_is_a_valid_frame() {
        let mut stream = Vec::new();
        write_frame(&mut stream, b"").unwrap();
        assert_eq!(stream, [0, 0, 0, 0]);
        assert!(read_frame(&mut Cursor::new(&stream)).unwrap().is_empty());
    }

    #[test]
    fn oversized_payload_is_refused_before_sending() {
        let payload = vec![0u8; MAX_FRAME_SIZE as usize + 1];
        let mut stream = Vec::new();
        let err = write_frame(&mut stream, &payload).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(stream.is_empty());
    }

    #[test]
    fn oversized_prefix_is_refused_on_receive() {
        let stream = (MAX_FRAME_SIZE + 1).to_be_bytes();
        let err = read_frame(&mut Cursor::new(&stream)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn truncated_streams_report_eof() {
        // Cut inside the prefix.
        let err = read_frame(&mut Cursor::new(vec![0u8, 1])).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

        // Cut inside the payload.
        let mut stream = Vec::new();
        write_frame(&mut stream, b"half a frame").unwrap();
        stream.truncate(stream.len() - 3);
        let err = read_frame(&mut Cursor::new(&stream)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
