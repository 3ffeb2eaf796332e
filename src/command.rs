//! Types for building command lines.
//!
//! Every typed operation on a [`Device`](crate::Device) builds a [`Command`]
//! and sends it. A `Command` can also be built by hand and sent with
//! [`Device::msg`](crate::Device::msg) for anything not covered by a typed
//! operation:
//!
//! ```
//! use afgctl::command::{Command, Value};
//!
//! let cmd = Command::source(1, "APPLY:SIN").arg(1250).arg(1.254).arg(0.52);
//! assert_eq!(cmd.as_str(), "SOURCE1:APPLY:SIN 1250,1.254,0.52");
//!
//! let cmd = Command::source(2, "FREQ").arg(Value::Max);
//! assert_eq!(cmd.as_str(), "SOURCE2:FREQ MAX");
//!
//! let cmd = Command::source(1, "FREQ").query();
//! assert_eq!(cmd.as_str(), "SOURCE1:FREQ?");
//! ```

mod choice;

use crate::error::InvalidParameterError;
pub use choice::*;
use std::{fmt, ops::RangeInclusive, str::FromStr};

/// The registers that [`save`](crate::Device::save) and
/// [`recall`](crate::Device::recall) accept.
///
/// Registers 0 through 9 hold instrument settings, 10 through 19 hold
/// arbitrary waveforms.
pub const REGISTERS: RangeInclusive<u8> = 0..=19;

/// A single command line, without its terminating newline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command {
	/// The text of the command
	line: String,
	/// Whether any arguments have been added
	has_args: bool,
}

impl Command {
	/// Create a command from its header, such as `*RST` or `OUTP:LOAD`.
	pub fn new<S: Into<String>>(header: S) -> Self {
		Command {
			line: header.into(),
			has_args: false,
		}
	}

	/// Create a command addressed to a channel: `SOURCE<channel>:<header>`.
	pub fn source(channel: u8, header: &str) -> Self {
		Command::new(format!("SOURCE{channel}:{header}"))
	}

	/// Append an argument.
	///
	/// The first argument is separated from the header by a space, the rest
	/// from each other by commas.
	#[must_use]
	pub fn arg<T: fmt::Display>(mut self, arg: T) -> Self {
		use fmt::Write as _;

		let separator = if self.has_args { ',' } else { ' ' };
		// Writing to a String cannot fail.
		let _ = write!(self.line, "{separator}{arg}");
		self.has_args = true;
		self
	}

	/// Append several arguments.
	#[must_use]
	pub fn args<I>(self, args: I) -> Self
	where
		I: IntoIterator,
		I::Item: fmt::Display,
	{
		args.into_iter().fold(self, Command::arg)
	}

	/// Turn the command into a query by appending `?`.
	#[must_use]
	pub fn query(mut self) -> Self {
		self.line.push('?');
		self
	}

	/// Get the command's text.
	pub fn as_str(&self) -> &str {
		&self.line
	}
}

impl fmt::Display for Command {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.line)
	}
}

impl AsRef<str> for Command {
	fn as_ref(&self) -> &str {
		&self.line
	}
}

/// A numeric parameter.
///
/// Besides plain numbers, the devices accept `MIN` and `MAX`, which they
/// interpret as the smallest and largest value allowed in their current
/// state. Numbers are not checked against any range before being sent; the
/// device decides what it accepts. Typed operations do reject numbers that
/// are not finite, the same as parsing does.
///
/// ```
/// use afgctl::command::Value;
///
/// assert_eq!(Value::from(1250).to_string(), "1250");
/// assert_eq!(Value::from(0.52).to_string(), "0.52");
/// assert_eq!("max".parse::<Value>().unwrap(), Value::Max);
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Value {
	/// A plain number.
	Number(f64),
	/// The device's minimum.
	Min,
	/// The device's maximum.
	Max,
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Number(n) => write!(f, "{n}"),
			Value::Min => f.write_str("MIN"),
			Value::Max => f.write_str("MAX"),
		}
	}
}

impl FromStr for Value {
	type Err = InvalidParameterError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.eq_ignore_ascii_case("MIN") {
			Ok(Value::Min)
		} else if s.eq_ignore_ascii_case("MAX") {
			Ok(Value::Max)
		} else {
			s.trim()
				.parse::<f64>()
				.ok()
				.filter(|n| n.is_finite())
				.map(Value::Number)
				.ok_or_else(|| InvalidParameterError::new("value", s, VALUE_ALLOWED))
		}
	}
}

/// What a [`Value`] may be, for error messages.
const VALUE_ALLOWED: &str = "a number, MIN or MAX";

macro_rules! impl_value_from {
	($($t:ty),+) => {
		$(
			impl From<$t> for Value {
				fn from(other: $t) -> Self {
					Value::Number(f64::from(other))
				}
			}
		)+
	};
}

impl_value_from!(f64, i32, u32, i16, u16, i8, u8);

/// Convert `value` for sending as `parameter`, rejecting NaN and infinities.
pub(crate) fn check_number<V: Into<Value>>(parameter: &'static str, value: V) -> Result<Value, InvalidParameterError> {
	match value.into() {
		Value::Number(n) if !n.is_finite() => Err(InvalidParameterError::new(parameter, n, VALUE_ALLOWED)),
		value => Ok(value),
	}
}

/// Check that `register` is one of the [`REGISTERS`].
pub(crate) fn check_register(register: u8) -> Result<u8, InvalidParameterError> {
	if REGISTERS.contains(&register) {
		Ok(register)
	} else {
		Err(InvalidParameterError::new(
			"register",
			register,
			format!("{} to {}", REGISTERS.start(), REGISTERS.end()),
		))
	}
}
