//! An in-memory backend for use in testing.

use super::Backend;
use std::{
	collections::VecDeque,
	io,
	sync::{Arc, Mutex, MutexGuard, PoisonError},
	time::Duration,
};

/// How long a read of an empty [`Mock`] waits before reporting a timeout.
const SIMULATED_WAIT: Duration = Duration::from_millis(1);

/// A function called with every complete line written to a [`Mock`]. The
/// bytes it returns, if any, become readable.
type Responder = Box<dyn FnMut(&str) -> Option<Vec<u8>> + Send>;

/// The state shared by all handles to the same [`Mock`].
#[derive(Default)]
struct State {
	/// The data waiting to be read.
	buffer: VecDeque<u8>,
	/// Everything written so far.
	written: Vec<u8>,
	/// Where the current, incomplete, written line starts in `written`.
	line_start: usize,
	/// The number of calls to `read`.
	reads: usize,
	/// The number of handles that have been dropped.
	dropped: usize,
	/// The read timeout, which only bounds the simulated wait.
	read_timeout: Option<Duration>,
	/// The error to surface on the next read, if any. It is only surfaced once.
	read_error: Option<io::Error>,
	/// The error to surface on the next write, if any. It is only surfaced once.
	write_error: Option<io::Error>,
	/// Whether all reads and writes fail, as if the device was unplugged.
	disconnected: bool,
	/// Answers written lines.
	responder: Option<Responder>,
}

/// A mock backend for use in testing.
///
/// It has the following features:
///   * It records all data written to it.
///   * It can be filled with data for reading, either directly or by a
///     responder that answers each line written to it.
///   * Reading while it is empty waits briefly and then reports a timeout,
///     like a real serial port would.
///   * Specific errors can be inserted for calls to `read` and `write`.
///   * Handles are cheap to clone and share the same state, so a test can
///     keep one handle to inspect what a session did with another. Dropping
///     a handle is counted, which is how a test observes a session closing.
pub struct Mock {
	/// The shared state
	state: Arc<Mutex<State>>,
}

impl Mock {
	/// Create a new Mock backend.
	pub fn new() -> Self {
		Mock {
			state: Arc::new(Mutex::new(State {
				read_timeout: Some(Duration::ZERO),
				..State::default()
			})),
		}
	}

	/// Lock the shared state, ignoring poisoning from a panicking test thread.
	fn state(&self) -> MutexGuard<'_, State> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}

	/// Append data to the read buffer.
	///
	/// The data is not validated in any way.
	pub fn append_data<T: AsRef<[u8]>>(&self, bytes: T) {
		self.state().buffer.extend(bytes.as_ref());
	}

	/// Append a line, terminated the way the function generators terminate
	/// their responses (`\r\n`), to the read buffer.
	pub fn append_line(&self, line: &str) {
		self.append_data(format!("{line}\r\n"));
	}

	/// Set a function that is called with every line written to the mock
	/// (without its terminating newline). Any bytes it returns are appended
	/// to the read buffer before the write returns.
	pub fn set_responder<F>(&self, responder: F)
	where
		F: FnMut(&str) -> Option<Vec<u8>> + Send + 'static,
	{
		self.state().responder = Some(Box::new(responder));
	}

	/// Get a copy of all the bytes written so far.
	pub fn written(&self) -> Vec<u8> {
		self.state().written.clone()
	}

	/// Get all the complete lines written so far, without their terminators.
	pub fn written_lines(&self) -> Vec<String> {
		let state = self.state();
		String::from_utf8_lossy(&state.written[..state.line_start])
			.lines()
			.map(str::to_string)
			.collect()
	}

	/// Forget everything written so far.
	pub fn clear_written(&self) {
		let mut state = self.state();
		state.written.clear();
		state.line_start = 0;
	}

	/// Clear the read buffer.
	pub fn clear_buffer(&self) {
		self.state().buffer.clear();
	}

	/// The number of bytes waiting to be read.
	pub fn pending(&self) -> usize {
		self.state().buffer.len()
	}

	/// The number of times `read` has been called on any handle.
	pub fn read_count(&self) -> usize {
		self.state().reads
	}

	/// The number of handles that have been dropped.
	pub fn dropped(&self) -> usize {
		self.state().dropped
	}

	/// Set the error for the next `read`, if any.
	pub fn read_error(&self, err: Option<io::Error>) {
		self.state().read_error = err;
	}

	/// Set the error for the next `write`, if any.
	pub fn write_error(&self, err: Option<io::Error>) {
		self.state().write_error = err;
	}

	/// Make every subsequent read and write fail, as if the device was unplugged.
	pub fn disconnect(&self) {
		self.state().disconnected = true;
	}
}

impl Clone for Mock {
	fn clone(&self) -> Self {
		Mock {
			state: Arc::clone(&self.state),
		}
	}
}

impl Drop for Mock {
	fn drop(&mut self) {
		self.state().dropped += 1;
	}
}

impl Default for Mock {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for Mock {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Mock")
			.field("name", &self.name())
			.finish_non_exhaustive()
	}
}

/// The error reported by a disconnected mock.
fn disconnected() -> io::Error {
	io::Error::new(io::ErrorKind::BrokenPipe, "Simulated disconnection")
}

impl Backend for Mock {
	fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), io::Error> {
		self.state().read_timeout = timeout;
		Ok(())
	}

	fn read_timeout(&self) -> Result<Option<Duration>, io::Error> {
		Ok(self.state().read_timeout)
	}

	fn name(&self) -> Option<String> {
		Some(format!("<mock 0x{:x}>", Arc::as_ptr(&self.state) as usize))
	}
}

impl io::Read for Mock {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		let wait = {
			let mut state = self.state();
			state.reads += 1;
			if let Some(err) = state.read_error.take() {
				return Err(err);
			}
			if state.disconnected {
				return Err(disconnected());
			}
			if state.buffer.is_empty() {
				state
					.read_timeout
					.map_or(SIMULATED_WAIT, |timeout| timeout.min(SIMULATED_WAIT))
			} else {
				let n = buf.len().min(state.buffer.len());
				for (dst, src) in buf.iter_mut().zip(state.buffer.drain(..n)) {
					*dst = src;
				}
				return Ok(n);
			}
		};
		// For a real device, having no data ready would result in a wait and
		// then eventual timeout error. Simulate that, but without holding the
		// lock so other handles can append data in the meantime.
		std::thread::sleep(wait);
		Err(io::Error::new(
			io::ErrorKind::TimedOut,
			"Simulated timeout error",
		))
	}
}

impl io::Write for Mock {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		let mut state = self.state();
		if let Some(err) = state.write_error.take() {
			return Err(err);
		}
		if state.disconnected {
			return Err(disconnected());
		}
		state.written.extend_from_slice(buf);

		// Hand every newly completed line to the responder.
		while let Some(offset) = state.written[state.line_start..]
			.iter()
			.position(|&b| b == b'\n')
		{
			let end = state.line_start + offset;
			let line = String::from_utf8_lossy(&state.written[state.line_start..end]).into_owned();
			state.line_start = end + 1;
			let reply = state.responder.as_mut().and_then(|respond| respond(&line));
			if let Some(reply) = reply {
				state.buffer.extend(reply);
			}
		}
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		if self.state().disconnected {
			Err(disconnected())
		} else {
			Ok(())
		}
	}
}
