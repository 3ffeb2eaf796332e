//! Types that can exchange (read/write) bytes with a connected function generator.
//!
//! The [`Backend`] trait represents all such types, and the [`Connector`]
//! trait represents anything that can open one given an address.

use std::io;
use std::time::Duration;

use serialport as sp;

#[cfg(windows)]
use sp::COMPort as ExternSerial;
use sp::SerialPort;
#[cfg(unix)]
use sp::TTYPort as ExternSerial;

use crate::error::Error;

/// The placeholder name for a backend that doesn't have a name.
pub(crate) const UNKNOWN_BACKEND_NAME: &str = "<unknown backend>";

/// The baud rate used by every supported model.
pub const BAUD_RATE: u32 = 9600;

/// The read timeout applied to every session.
///
/// No read ever blocks longer than this. A read that times out is not an
/// error; it simply means the device had nothing more to say.
pub const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Types that allow reading and writing bytes with a connected device.
///
/// Backends are moved into a session that is shared with a background
/// thread, so they must be `Send + 'static`.
pub trait Backend: io::Read + io::Write + Send + 'static + private::Sealed {
	/// Set the read timeout.
	///
	/// If timeout is `None`, reads will block indefinitely.
	fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), io::Error>;

	/// Get the read timeout.
	///
	/// If timeout is `None`, reads will block indefinitely.
	fn read_timeout(&self) -> Result<Option<Duration>, io::Error>;

	/// Get the "name" of the backend.
	///
	/// This can be in any format, but should uniquely identify the backend
	/// instance.
	fn name(&self) -> Option<String>;
}

impl<C: Backend + ?Sized> Backend for Box<C> {
	fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), io::Error> {
		(**self).set_read_timeout(timeout)
	}
	fn read_timeout(&self) -> Result<Option<Duration>, io::Error> {
		(**self).read_timeout()
	}
	fn name(&self) -> Option<String> {
		(**self).name()
	}
}

/// A platform agnostic serial port backend.
//
// The `serialport` crate exposes two platform specific serial ports, `COMPort`
// and `TTYPort` for windows and unix, respectively. Wrapping whichever one the
// platform uses in a new type keeps consumers free of platform specific types
// without paying for dynamic dispatch.
#[derive(Debug)]
pub struct Serial(pub(crate) ExternSerial);

impl Serial {
	/// Open the serial port at `path` with the fixed settings every
	/// supported model uses: 9600 baud, 8 data bits, no parity, 1 stop bit,
	/// no flow control and a [`READ_TIMEOUT`] read timeout.
	pub fn open(path: &str) -> Result<Serial, Error> {
		// Due to https://gitlab.com/susurrus/serialport-rs/-/issues/102, the
		// baud rate passed to new is ignored. It must also be set using the
		// baud_rate method below.
		sp::new(path, BAUD_RATE)
			.data_bits(sp::DataBits::Eight)
			.parity(sp::Parity::None)
			.flow_control(sp::FlowControl::None)
			.stop_bits(sp::StopBits::One)
			.timeout(READ_TIMEOUT)
			.baud_rate(BAUD_RATE)
			.open_native()
			.map(Serial)
			.map_err(Into::into)
	}
}

impl io::Read for Serial {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		self.0.read(buf)
	}
}

impl io::Write for Serial {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.0.write(buf)
	}

	fn flush(&mut self) -> io::Result<()> {
		self.0.flush()
	}
}

impl Backend for Serial {
	fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<(), io::Error> {
		// The serialport API does not support infinite timeouts, so simply set
		// the timeout to the largest possible duration if `timeout` is `None`,
		// which is practically infinite.
		Ok(self.0.set_timeout(timeout.unwrap_or(Duration::MAX))?)
	}
	fn read_timeout(&self) -> Result<Option<Duration>, io::Error> {
		Ok(Some(self.0.timeout()))
	}
	fn name(&self) -> Option<String> {
		self.0.name()
	}
}

/// Types that can open a [`Backend`] given an address.
///
/// Resolving a device opens two connections to the same address: a short
/// lived one to ask the device who it is, and the long lived one the
/// resulting [`Device`](crate::Device) keeps.
///
/// Any `Fn(&str) -> Result<B, Error>` is a connector:
///
/// ```
/// # use afgctl::{backend::Serial, error::Error};
/// # fn wrapper() -> Result<(), Error> {
/// let device = afgctl::resolve(&|path: &str| Serial::open(path), "/dev/ttyUSB0")?;
/// # Ok(())
/// # }
/// ```
pub trait Connector {
	/// The type of backend this connector opens.
	type Backend: Backend;

	/// Open a new backend connected to `address`.
	fn connect(&self, address: &str) -> Result<Self::Backend, Error>;
}

impl<F, B> Connector for F
where
	F: Fn(&str) -> Result<B, Error>,
	B: Backend,
{
	type Backend = B;

	fn connect(&self, address: &str) -> Result<B, Error> {
		(self)(address)
	}
}

/// A [`Connector`] that opens [`Serial`] ports, treating the address as a path.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SerialConnector;

impl Connector for SerialConnector {
	type Backend = Serial;

	fn connect(&self, address: &str) -> Result<Serial, Error> {
		Serial::open(address)
	}
}

#[cfg(any(test, feature = "mock"))]
mod mock;
#[cfg(any(test, feature = "mock"))]
pub use mock::Mock;

mod private {
	pub trait Sealed {}

	impl Sealed for super::Serial {}
	#[cfg(any(test, feature = "mock"))]
	impl Sealed for super::Mock {}
	impl<C: super::Backend + ?Sized> Sealed for Box<C> {}
}
