//! Line framing on top of a [`Backend`].

use crate::backend::{Backend, UNKNOWN_BACKEND_NAME};
use std::io;

/// The byte that terminates every line a device sends.
const RECORD_TERMINATOR: u8 = b'\r';

/// The byte that terminates every line sent to a device.
const COMMAND_TERMINATOR: u8 = b'\n';

/// A backend plus the bytes read from it that do not yet form a complete line.
#[derive(Debug)]
pub(crate) struct LineChannel<B> {
	/// The underlying backend
	backend: B,
	/// Bytes read but not yet returned
	pending: Vec<u8>,
	/// The backend's name, for logging
	name: String,
}

impl<B: Backend> LineChannel<B> {
	/// Wrap a backend.
	pub fn new(backend: B) -> Self {
		let name = backend
			.name()
			.unwrap_or_else(|| UNKNOWN_BACKEND_NAME.to_string());
		LineChannel {
			backend,
			pending: Vec::new(),
			name,
		}
	}

	/// The backend's name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Write `line` followed by a newline.
	pub fn write_line(&mut self, line: &str) -> io::Result<()> {
		log::debug!("{} TX:   {}", self.name, line);
		let mut buffer = Vec::with_capacity(line.len() + 1);
		buffer.extend_from_slice(line.as_bytes());
		buffer.push(COMMAND_TERMINATOR);
		self.backend.write_all(&buffer)?;
		self.backend.flush()
	}

	/// Read one line.
	///
	/// `Ok(None)` means the read timed out before any data arrived. If the
	/// read times out part way through a line, the partial line is returned.
	pub fn read_line(&mut self) -> io::Result<Option<String>> {
		let mut buf = [0u8; 256];
		loop {
			if let Some(pos) = self.pending.iter().position(|&b| b == RECORD_TERMINATOR) {
				let bytes: Vec<u8> = self.pending.drain(..=pos).collect();
				return Ok(Some(self.decode(&bytes)));
			}
			match self.backend.read(&mut buf) {
				Ok(0) => {
					return Err(io::Error::new(
						io::ErrorKind::UnexpectedEof,
						"the backend was closed",
					))
				}
				Ok(n) => self.pending.extend_from_slice(&buf[..n]),
				Err(e) if is_timeout(&e) => {
					if self.pending.is_empty() {
						return Ok(None);
					}
					let bytes = std::mem::take(&mut self.pending);
					return Ok(Some(self.decode(&bytes)));
				}
				Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
				Err(e) => return Err(e),
			}
		}
	}

	/// Read lines until a read times out.
	pub fn read_lines(&mut self) -> io::Result<Vec<String>> {
		let mut lines = Vec::new();
		while let Some(line) = self.read_line()? {
			lines.push(line);
		}
		Ok(lines)
	}

	/// Drop any bytes that have been read but not returned yet.
	///
	/// The number of bytes dropped is returned.
	pub fn discard_buffered(&mut self) -> usize {
		let n = self.pending.len();
		self.pending.clear();
		n
	}

	/// Convert raw line bytes into a string, dropping the terminator and the
	/// newline left over from the previous `\r\n` terminator.
	fn decode(&self, bytes: &[u8]) -> String {
		let line = String::from_utf8_lossy(bytes);
		let line = line
			.trim_start_matches(char::from(COMMAND_TERMINATOR))
			.trim_end_matches(['\r', '\n']);
		log::debug!("{} RX:   {}", self.name, line);
		line.to_string()
	}
}

/// Whether the error just means no data arrived in time.
pub(crate) fn is_timeout(e: &io::Error) -> bool {
	matches!(
		e.kind(),
		io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
	)
}
