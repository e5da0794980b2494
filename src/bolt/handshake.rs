//! The Bolt handshake: a fixed 20-byte client preamble and a 4-byte server reply.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::error::{BoltError, BoltResult};
use super::version::{BoltVersion, SUPPORTED_VERSIONS};

pub const MAGIC: [u8; 4] = [0x60, 0x60, 0xB0, 0x17];

/// The four candidate versions a client proposes, most preferred first.
#[derive(Debug, Clone, Copy)]
pub struct ProposedVersions(pub [BoltVersion; 4]);

/// Read the 20-byte client preamble: 4-byte magic plus four 4-byte version proposals.
pub async fn read_preamble<R: AsyncRead + Unpin>(reader: &mut R) -> BoltResult<ProposedVersions> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic).await?;
    if magic != MAGIC {
        return Err(BoltError::HandshakeMagicMismatch { found: magic });
    }
    let mut versions = [BoltVersion::new(0, 0); 4];
    for slot in versions.iter_mut() {
        let mut bytes = [0u8; 4];
        reader.read_exact(&mut bytes).await?;
        *slot = BoltVersion::from_wire_bytes(bytes);
    }
    Ok(ProposedVersions(versions))
}

/// Choose the first proposed version this toolkit supports, in server preference order.
pub fn negotiate(proposed: ProposedVersions) -> Option<BoltVersion> {
    SUPPORTED_VERSIONS
        .iter()
        .find(|supported| proposed.0.contains(supported))
        .copied()
}

/// Write the 4-byte chosen-version reply (or all-zero refusal).
pub async fn write_reply<W: AsyncWrite + Unpin>(
    writer: &mut W,
    chosen: Option<BoltVersion>,
) -> BoltResult<()> {
    let bytes = chosen.map(BoltVersion::to_wire_bytes).unwrap_or([0, 0, 0, 0]);
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}

/// Perform the full handshake: read the preamble, negotiate, write the reply.
/// Returns the negotiated version, or `None` if the client proposed nothing supported
/// (in which case the zero reply has already been sent and the caller should close).
pub async fn perform<S: AsyncRead + AsyncWrite + Unpin>(
    stream: &mut S,
) -> BoltResult<Option<BoltVersion>> {
    let proposed = read_preamble(stream).await?;
    let chosen = negotiate(proposed);
    write_reply(stream, chosen).await?;
    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bolt::version::{V1_0, V3_0, V4_0};

    fn preamble(versions: [BoltVersion; 4]) -> Vec<u8> {
        let mut buf = MAGIC.to_vec();
        for v in versions {
            buf.extend_from_slice(&v.to_wire_bytes());
        }
        buf
    }

    #[tokio::test]
    async fn negotiates_highest_common_version() {
        let bytes = preamble([V1_0, V3_0, BoltVersion::new(0, 0), BoltVersion::new(0, 0)]);
        let mut cursor = std::io::Cursor::new(bytes);
        let mut out = Vec::new();
        let proposed = read_preamble(&mut cursor).await.unwrap();
        let negotiated = negotiate(proposed);
        assert_eq!(negotiated, Some(V3_0));
        write_reply(&mut out, negotiated).await.unwrap();
        assert_eq!(out, V3_0.to_wire_bytes());
    }

    #[tokio::test]
    async fn full_handshake_over_duplex_stream() {
        let (mut client, mut server) = tokio::io::duplex(64);
        let bytes = preamble([V4_0, V3_0, V1_0, BoltVersion::new(0, 0)]);
        client.write_all(&bytes).await.unwrap();
        let chosen = perform(&mut server).await.unwrap();
        assert_eq!(chosen, Some(V4_0));
        let mut reply = [0u8; 4];
        client.read_exact(&mut reply).await.unwrap();
        assert_eq!(reply, V4_0.to_wire_bytes());
    }

    #[tokio::test]
    async fn rejects_bad_magic() {
        let mut bytes = preamble([V1_0, V1_0, V1_0, V1_0]);
        bytes[0] = 0x00;
        let mut cursor = std::io::Cursor::new(bytes);
        let err = read_preamble(&mut cursor).await.unwrap_err();
        assert!(matches!(err, BoltError::HandshakeMagicMismatch { .. }));
    }

    #[tokio::test]
    async fn refuses_when_no_common_version() {
        let weird = BoltVersion::new(99, 0);
        let proposed = ProposedVersions([weird, weird, weird, weird]);
        assert_eq!(negotiate(proposed), None);
        let mut out = Vec::new();
        write_reply(&mut out, None).await.unwrap();
        assert_eq!(out, [0, 0, 0, 0]);
    }

    #[tokio::test]
    async fn v4_preferred_when_proposed() {
        let proposed = ProposedVersions([V4_0, V3_0, V1_0, BoltVersion::new(0, 0)]);
        assert_eq!(negotiate(proposed), Some(V4_0));
    }
}
