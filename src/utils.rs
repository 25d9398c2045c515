use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::Error;

/// Largest packet accepted from the peer, as in OpenSSH's `SFTP_MAX_MSG_LENGTH`
pub const MAX_PACKET_LEN: u32 = 256 * 1024;

/// Reads one length-prefixed packet and returns its payload (type byte included).
///
/// An oversized length ends the stream: framing cannot be recovered after it.
pub async fn read_packet<S: AsyncRead + Unpin>(stream: &mut S) -> Result<Bytes, Error> {
    let length = stream.read_u32().await?;
    if length > MAX_PACKET_LEN {
        return Err(Error::IO(format!(
            "packet of {} bytes exceeds the {} byte limit",
            length, MAX_PACKET_LEN
        )));
    }

    let mut buf = vec![0; length as usize];
    stream.read_exact(&mut buf).await?;

    Ok(Bytes::from(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn oversized_length_is_refused_before_reading() {
        let mut stream: &[u8] = &[0xff, 0xff, 0xff, 0xff, 1, 2, 3];

        assert!(matches!(read_packet(&mut stream).await, Err(Error::IO(_))));
        assert_eq!(stream.len(), 3);
    }

    #[tokio::test]
    async fn packet_at_the_limit_is_read() {
        let mut framed = MAX_PACKET_LEN.to_be_bytes().to_vec();
        framed.resize(4 + MAX_PACKET_LEN as usize, 7);
        let mut stream = &framed[..];

        let packet = read_packet(&mut stream).await.unwrap();
        assert_eq!(packet.len(), MAX_PACKET_LEN as usize);
        assert!(stream.is_empty());
    }
}
