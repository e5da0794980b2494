//! Chunked message framing: splits/joins Bolt message payloads into
//! length-prefixed chunks terminated by a zero-length chunk.
//!
//! Exposed twice: as async helpers over any `AsyncRead + AsyncWrite` (used by
//! the stub and proxy connection actors) and as plain in-memory functions
//! (used by unit tests and anywhere a full byte buffer is already at hand).

mod error;

pub use error::{FrameError, FrameResult};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest payload a single chunk may carry.
pub const MAX_CHUNK_SIZE: usize = 0xFFFF;

/// Split `payload` into one or more length-prefixed chunks, followed by the
/// zero-length terminator, and append the result to `out`.
pub fn write_message_chunks(payload: &[u8], out: &mut Vec<u8>) {
    if payload.is_empty() {
        out.extend_from_slice(&0u16.to_be_bytes());
        return;
    }
    for slice in payload.chunks(MAX_CHUNK_SIZE) {
        out.extend_from_slice(&(slice.len() as u16).to_be_bytes());
        out.extend_from_slice(slice);
    }
    out.extend_from_slice(&0u16.to_be_bytes());
}

/// Encode a single message into its on-wire chunked form.
pub fn encode_message(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + payload.len() / MAX_CHUNK_SIZE + 4);
    write_message_chunks(payload, &mut out);
    out
}

/// Read one framed message from an in-memory buffer, returning the
/// reassembled payload and the bytes left over after the terminator.
pub fn read_message_from(mut buf: &[u8]) -> FrameResult<(Vec<u8>, &[u8])> {
    let mut payload = Vec::new();
    loop {
        if buf.len() < 2 {
            return Err(FrameError::TruncatedFrame);
        }
        let len = u16::from_be_bytes([buf[0], buf[1]]) as usize;
        buf = &buf[2..];
        if len == 0 {
            return Ok((payload, buf));
        }
        if buf.len() < len {
            return Err(FrameError::TruncatedFrame);
        }
        payload.extend_from_slice(&buf[..len]);
        buf = &buf[len..];
    }
}

/// Write one message to an async sink as length-prefixed chunks plus terminator.
pub async fn write_message<W: AsyncWrite + Unpin>(writer: &mut W, payload: &[u8]) -> FrameResult<()> {
    let mut buf = Vec::new();
    write_message_chunks(payload, &mut buf);
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one message from an async source, reassembling chunks until the
/// zero-length terminator. Returns `Ok(None)` if the peer closed the
/// connection before sending any bytes of a new message.
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> FrameResult<Option<Vec<u8>>> {
    let mut payload = Vec::new();
    let mut started = false;
    loop {
        let mut len_buf = [0u8; 2];
        match read_exact_or_eof(reader, &mut len_buf).await? {
            ReadOutcome::Eof if !started => return Ok(None),
            ReadOutcome::Eof => return Err(FrameError::TruncatedFrame),
            ReadOutcome::Full => {}
        }
        started = true;
        let len = u16::from_be_bytes(len_buf) as usize;
        if len == 0 {
            return Ok(Some(payload));
        }
        let mut chunk = vec![0u8; len];
        reader
            .read_exact(&mut chunk)
            .await
            .map_err(|_| FrameError::TruncatedFrame)?;
        payload.extend_from_slice(&chunk);
    }
}

enum ReadOutcome {
    Full,
    Eof,
}

async fn read_exact_or_eof<R: AsyncRead + Unpin>(
    reader: &mut R,
    buf: &mut [u8],
) -> FrameResult<ReadOutcome> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            return if filled == 0 {
                Ok(ReadOutcome::Eof)
            } else {
                Err(FrameError::TruncatedFrame)
            };
        }
        filled += n;
    }
    Ok(ReadOutcome::Full)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_message_round_trips() {
        let encoded = encode_message(&[]);
        assert_eq!(encoded, vec![0x00, 0x00]);
        let (payload, rest) = read_message_from(&encoded).unwrap();
        assert!(payload.is_empty());
        assert!(rest.is_empty());
    }

    #[test]
    fn single_chunk_round_trips() {
        let payload = vec![1, 2, 3, 4, 5];
        let encoded = encode_message(&payload);
        assert_eq!(&encoded[..2], &[0x00, 0x05]);
        let (decoded, rest) = read_message_from(&encoded).unwrap();
        assert_eq!(decoded, payload);
        assert!(rest.is_empty());
    }

    #[test]
    fn splits_oversize_payload_into_multiple_chunks() {
        let payload = vec![0xAB; MAX_CHUNK_SIZE + 10];
        let encoded = encode_message(&payload);
        let (decoded, rest) = read_message_from(&encoded).unwrap();
        assert_eq!(decoded, payload);
        assert!(rest.is_empty());
    }

    #[test]
    fn truncated_frame_is_reported() {
        let err = read_message_from(&[0x00, 0x05, 1, 2]).unwrap_err();
        assert!(matches!(err, FrameError::TruncatedFrame));
    }

    #[test]
    fn leftover_bytes_preserved_after_terminator() {
        let mut buf = encode_message(&[9, 9]);
        buf.extend_from_slice(&[0xFF]);
        let (_, rest) = read_message_from(&buf).unwrap();
        assert_eq!(rest, &[0xFF]);
    }

    #[tokio::test]
    async fn async_round_trip() {
        let payload = vec![7u8; 200_000];
        let mut buf = Vec::new();
        write_message(&mut buf, &payload).await.unwrap();
        let mut cursor = std::io::Cursor::new(buf);
        let decoded = read_message(&mut cursor).await.unwrap().unwrap();
        assert_eq!(decoded, payload);
    }

    #[tokio::test]
    async fn async_clean_eof_before_message_yields_none() {
        let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
        let decoded = read_message(&mut cursor).await.unwrap();
        assert!(decoded.is_none());
    }
}
