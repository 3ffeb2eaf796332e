//! A line-oriented connection to a function generator.
//!
//! A [`Session`] owns a [`Backend`] and sends newline terminated commands
//! over it. Whether the lines the device sends back are read depends on the
//! session's *capture mode*:
//!
//! * With capture on (the default), every command is followed by reading all
//!   of the lines that arrive before the read times out.
//! * With capture off, commands are written and nothing is read. A
//!   background thread instead reads and discards whatever the device sends
//!   so the port's buffers never fill up.
//!
//! Only one of the caller and the background thread ever reads from the
//! backend at a time. Turning capture on waits for any read the background
//! thread has in progress to finish before returning, so the background
//! thread can never swallow a line the caller is about to ask for.

mod channel;

use crate::{
	backend::{Backend, READ_TIMEOUT},
	error::Error,
	response::Response,
};
use channel::LineChannel;
use std::{
	io,
	sync::{Arc, Condvar, Mutex, MutexGuard},
	thread::JoinHandle,
};

/// The state the caller and the background drain thread coordinate through.
#[derive(Debug, Default)]
struct Mode {
	/// Whether the caller is reading responses.
	capture: bool,
	/// Whether the drain thread is in the middle of a read.
	draining: bool,
	/// Whether the session is closing.
	closed: bool,
}

/// The parts of a session shared with its drain thread.
#[derive(Debug)]
struct Shared<B> {
	/// The framed backend. Whoever holds this lock is the only reader.
	channel: Mutex<LineChannel<B>>,
	/// The capture mode and drain thread state.
	mode: Mutex<Mode>,
	/// Signalled whenever `mode` changes.
	signal: Condvar,
	/// The backend's name, for logging
	name: String,
}

/// The error reported when a thread panicked while holding a session lock.
fn poisoned() -> io::Error {
	io::Error::new(io::ErrorKind::Other, "session lock poisoned")
}

/// Lock `mutex`, converting poisoning into an [`io::Error`].
fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, io::Error> {
	mutex.lock().map_err(|_| poisoned())
}

/// An open connection to a function generator.
///
/// The connection, and the background drain thread if there is one, are
/// closed when the session is dropped or [`close`](Session::close)d.
pub struct Session<B: Backend> {
	/// The state shared with the drain thread.
	shared: Arc<Shared<B>>,
	/// The drain thread, if one was started.
	drain: Option<JoinHandle<()>>,
	/// Whether the session has not been closed yet.
	open: bool,
}

impl<B: Backend> std::fmt::Debug for Session<B> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Session")
			.field("name", &self.shared.name)
			.field("drain", &self.drain.is_some())
			.finish_non_exhaustive()
	}
}

impl<B: Backend> Session<B> {
	/// Open a session over `backend` and start its background drain thread.
	///
	/// The backend's read timeout is set to [`READ_TIMEOUT`] and capture is on.
	pub fn open(backend: B) -> Result<Self, Error> {
		let mut session = Session::open_without_drain(backend)?;
		let shared = Arc::clone(&session.shared);
		let handle = std::thread::Builder::new()
			.name(format!("afgctl drain {}", session.shared.name))
			.spawn(move || drain(&shared))?;
		session.drain = Some(handle);
		Ok(session)
	}

	/// Open a session over `backend` without a background drain thread.
	///
	/// Such a session is meant for short exchanges with capture on. If
	/// capture is turned off, unread lines simply accumulate in the port's
	/// buffer.
	pub fn open_without_drain(mut backend: B) -> Result<Self, Error> {
		backend.set_read_timeout(Some(READ_TIMEOUT))?;
		let channel = LineChannel::new(backend);
		let name = channel.name().to_string();
		log::debug!("{name} session opened");
		Ok(Session {
			shared: Arc::new(Shared {
				channel: Mutex::new(channel),
				mode: Mutex::new(Mode {
					capture: true,
					..Mode::default()
				}),
				signal: Condvar::new(),
				name,
			}),
			drain: None,
			open: true,
		})
	}

	/// Get whether responses are currently being captured.
	pub fn capture(&self) -> Result<bool, Error> {
		Ok(lock(&self.shared.mode)?.capture)
	}

	/// Turn response capture on or off.
	///
	/// When turning capture on, this waits for any read the drain thread has
	/// in progress to finish. Once it returns, only the caller reads from
	/// the backend.
	///
	/// Anything the drain thread already pulled off the port but has not
	/// yet discarded arrived while capture was off, so it is dropped too.
	pub fn set_capture(&mut self, capture: bool) -> Result<(), Error> {
		let mut mode = lock(&self.shared.mode)?;
		let was_capturing = std::mem::replace(&mut mode.capture, capture);
		if !capture {
			self.shared.signal.notify_all();
			return Ok(());
		}
		while mode.draining {
			mode = self.shared.signal.wait(mode).map_err(|_| poisoned())?;
		}
		drop(mode);

		if !was_capturing && self.drain.is_some() {
			let discarded = lock(&self.shared.channel)?.discard_buffered();
			if discarded > 0 {
				log::trace!("{} discarded {} buffered bytes", self.shared.name, discarded);
			}
		}
		Ok(())
	}

	/// Send `line` to the device.
	///
	/// With capture on, all the lines that arrive before the read times out
	/// are returned. With capture off, nothing is read and the response is
	/// empty.
	pub fn send(&mut self, line: &str) -> Result<Response, Error> {
		let capture = self.capture()?;
		let mut channel = lock(&self.shared.channel)?;
		channel.write_line(line)?;
		if capture {
			Ok(Response::new(channel.read_lines()?))
		} else {
			Ok(Response::empty())
		}
	}

	/// Send `line` to the device and return the first non-empty line of the
	/// response, trimmed.
	///
	/// `None` is returned if nothing but blank lines arrived before the read
	/// timed out, or if capture is off.
	pub fn send_and_read(&mut self, line: &str) -> Result<Option<String>, Error> {
		Ok(self.send(line)?.into_first())
	}

	/// Close the session.
	///
	/// The drain thread, if any, is stopped and the backend is dropped.
	pub fn close(mut self) {
		self.shutdown();
	}

	/// Stop the drain thread. Safe to call more than once.
	fn shutdown(&mut self) {
		if !std::mem::replace(&mut self.open, false) {
			return;
		}
		if let Ok(mut mode) = self.shared.mode.lock() {
			mode.closed = true;
		}
		self.shared.signal.notify_all();
		if let Some(handle) = self.drain.take() {
			if handle.join().is_err() {
				log::warn!("{} drain thread panicked", self.shared.name);
			}
		}
		log::debug!("{} session closed", self.shared.name);
	}
}

impl<B: Backend> Drop for Session<B> {
	fn drop(&mut self) {
		self.shutdown();
	}
}

/// Marks the drain thread as reading until dropped.
struct Draining<'a, B>(&'a Shared<B>);

impl<'a, B> Draining<'a, B> {
	/// Wait until capture is off and mark the drain thread as reading.
	///
	/// Returns `None` if the session is closing.
	fn begin(shared: &'a Shared<B>) -> Option<Self> {
		let mut mode = shared.mode.lock().ok()?;
		while mode.capture && !mode.closed {
			mode = shared.signal.wait(mode).ok()?;
		}
		if mode.closed {
			return None;
		}
		mode.draining = true;
		Some(Draining(shared))
	}
}

impl<B> Drop for Draining<'_, B> {
	fn drop(&mut self) {
		if let Ok(mut mode) = self.0.mode.lock() {
			mode.draining = false;
		}
		self.0.signal.notify_all();
	}
}

/// How long the drain thread waits after a failed read before trying again.
const RETRY_DELAY: std::time::Duration = READ_TIMEOUT;

/// Whether the error means the port is gone for good.
fn is_closed(e: &io::Error) -> bool {
	matches!(
		e.kind(),
		io::ErrorKind::UnexpectedEof | io::ErrorKind::BrokenPipe | io::ErrorKind::NotConnected
	)
}

/// Read and discard lines whenever capture is off, until the session closes
/// or the port is closed.
///
/// Any other read failure is logged and the drain keeps going.
fn drain<B: Backend>(shared: &Shared<B>) {
	loop {
		let result = {
			let Some(_draining) = Draining::begin(shared) else {
				return;
			};
			let Ok(mut channel) = shared.channel.lock() else {
				return;
			};
			channel.read_line()
		};
		match result {
			Ok(Some(line)) => log::trace!("{} discarded: {}", shared.name, line),
			Ok(None) => {}
			Err(e) if is_closed(&e) => {
				// The caller sees the same failure on its next command.
				log::debug!("{} drain stopped: {}", shared.name, e);
				return;
			}
			Err(e) => {
				log::warn!("{} drain read failed: {}", shared.name, e);
				std::thread::sleep(RETRY_DELAY);
			}
		}
	}
}
