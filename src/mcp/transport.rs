//! Newline-delimited JSON transport.
//!
//! MCP's stdio transport carries one JSON-RPC message per line: requests
//! arrive on stdin, replies leave on stdout, logs go to stderr. The
//! transport is generic over its streams so the framing can be exercised
//! against in-memory buffers.

use std::io;

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Line-framed message transport.
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
}

/// The transport used by the server binary.
pub type StdioTransport = LineTransport<BufReader<tokio::io::Stdin>, tokio::io::Stdout>;

impl StdioTransport {
    /// Binds the transport to the process's stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> LineTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Wraps a reader and a writer.
    pub const fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Reads the next line without its terminator. `None` means EOF.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader fails or the line is not UTF-8.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }

        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    /// Serialises `message` onto a single line and flushes it.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or the writer fails.
    pub async fn send<T: Serialize>(&mut self, message: &T) -> io::Result<()> {
        // Compact serde_json output never contains a raw newline.
        let mut frame = serde_json::to_vec(message)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        frame.push(b'\n');

        self.writer.write_all(&frame).await?;
        self.writer.flush().await
    }

    #[cfg(test)]
    fn into_writer(self) -> W {
        self.writer
    }
}
