//! Response framing.
//!
//! The engine marks the end of a reply by appending a NUL byte. There is no
//! length prefix and the connection is not closed, so completeness is only
//! known by finding the sentinel in what has been received so far.

use crate::error::CsqlError;
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// End-of-response sentinel.
pub const TERMINATOR: u8 = 0;

/// Buffer space reserved before each socket read.
pub const READ_CHUNK_SIZE: usize = 4096;

/// Decoder for NUL-terminated replies.
///
/// A frame is everything buffered up to the point a terminator is seen,
/// including any bytes that arrived after it in the same read.
#[derive(Debug, Clone)]
pub struct NulFrameCodec {
    max_len: usize,
}

impl NulFrameCodec {
    /// Creates a codec that gives up once `max_len` bytes are buffered.
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }
}

impl Decoder for NulFrameCodec {
    type Item = String;
    type Error = CsqlError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, CsqlError> {
        if src.len() > self.max_len {
            return Err(CsqlError::transport(format!(
                "response exceeded {} bytes without a terminator",
                self.max_len
            )));
        }

        // The sentinel can arrive in a read of its own, so scan everything.
        if !src.contains(&TERMINATOR) {
            return Ok(None);
        }

        let frame = src.split();
        let payload: Vec<u8> = frame.iter().copied().filter(|&b| b != TERMINATOR).collect();
        Ok(Some(String::from_utf8_lossy(&payload).into_owned()))
    }
}
