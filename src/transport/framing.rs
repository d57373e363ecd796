//! Wire framing for request and response payloads.

use std::fmt;
use std::io;
use std::str::FromStr;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Read buffer capacity of the legacy raw protocol.
pub const RAW_BUFFER_LEN: usize = 2048;

/// Upper bound for a single length-prefixed frame.
pub const DEFAULT_MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// How payloads are delimited on a node connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Framing {
    /// 4-byte big-endian length followed by the payload, in both directions.
    #[default]
    LengthPrefixed,
    /// Bare payload out, a single read of at most `RAW_BUFFER_LEN` bytes back.
    Raw,
}

impl FromStr for Framing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "length" | "length-prefixed" => Ok(Self::LengthPrefixed),
            "raw" | "legacy" => Ok(Self::Raw),
            other => Err(format!("unknown framing '{}'", other)),
        }
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthPrefixed => write!(f, "length"),
            Self::Raw => write!(f, "raw"),
        }
    }
}

#[derive(Debug)]
pub(crate) enum FrameError {
    Io(io::Error),
    TooLarge { len: usize, max: usize },
    Truncated { capacity: usize },
}

impl From<io::Error> for FrameError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl Framing {
    pub(crate) async fn write_frame<W>(&self, writer: &mut W, payload: &[u8]) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        match self {
            Self::LengthPrefixed => {
                let len = u32::try_from(payload.len()).map_err(|_| {
                    io::Error::new(io::ErrorKind::InvalidInput, "payload exceeds u32 length")
                })?;
                writer.write_u32(len).await?;
                writer.write_all(payload).await?;
            }
            Self::Raw => {
                writer.write_all(payload).await?;
            }
        }
        writer.flush().await
    }

    pub(crate) async fn read_frame<R>(
        &self,
        reader: &mut R,
        max_len: usize,
    ) -> Result<Vec<u8>, FrameError>
    where
        R: AsyncRead + Unpin,
    {
        match self {
            Self::LengthPrefixed => {
                let len = reader.read_u32().await? as usize;
                if len > max_len {
                    return Err(FrameError::TooLarge { len, max: max_len });
                }
                let mut payload = vec![0u8; len];
                reader.read_exact(&mut payload).await?;
                Ok(payload)
            }
            Self::Raw => {
                let mut buf = vec![0u8; RAW_BUFFER_LEN];
                let n = reader.read(&mut buf).await?;
                if n == 0 {
                    return Err(FrameError::Io(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "connection closed by peer",
                    )));
                }
                // A completely filled buffer cannot be told apart from a cut-off response.
                if n == RAW_BUFFER_LEN {
                    return Err(FrameError::Truncated {
                        capacity: RAW_BUFFER_LEN,
                    });
                }
                buf.truncate(n);
                Ok(buf)
            }
        }
    }
}
