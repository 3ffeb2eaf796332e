//! Typed access to a connected function generator.
//!
//! A [`Device`] is obtained by [resolving](crate::resolve) an address, which
//! identifies the attached model and opens a long lived session to it:
//!
//! ```rust
//! # use afgctl::error::Error;
//! # fn wrapper() -> Result<(), Error> {
//! let mut device = afgctl::open_serial("/dev/ttyACM1")?;
//! println!("connected to an {}", device.info());
//! device.apply_sine(1250, 1.254, 0.52, 1)?;
//! device.set_output_enabled(true)?;
//! # Ok(())
//! # }
//! ```
//!
//! Every operation builds a [`Command`], transmits it, and returns what the
//! device sent back. Setters return the whole [`Response`], which is empty
//! when [capture](Device::set_capture) is off. Getters return the first
//! non-blank line of the response, or `None` if nothing arrived before the
//! read timed out.
//!
//! Parameters that take one of a fixed set of keywords are checked before
//! anything is sent, and are accepted either as their typed [`Choice`] or as
//! a string in any letter case:
//!
//! ```rust
//! # use afgctl::{command::OutputLoad, error::Error};
//! # fn wrapper() -> Result<(), Error> {
//! # let mut device = afgctl::open_serial("/dev/ttyACM1")?;
//! device.set_output_load(OutputLoad::HighZ)?;
//! device.set_output_load("inf")?;
//! assert!(device.set_output_load("75").is_err());
//! # Ok(())
//! # }
//! ```
//!
//! Numeric parameters accept any finite number or [`Value::Min`]/[`Value::Max`]
//! and are not checked against any range before being sent.
//!
//! [`Choice`]: crate::command::Choice

mod extended;
#[cfg(test)]
mod test;

use crate::{
	backend::Backend,
	capture_guard::CaptureGuard,
	command::{self, Command, IntoChoice, OutputLoad, Shape, Value, VoltageUnit},
	error::{Error, InvalidParameterError},
	model::{FrequencyRange, Model, Tier},
	response::Response,
	session::Session,
};
pub use extended::Extended;
use std::io;

/// The identification query.
pub(crate) const IDENTIFY: &str = "*idn?";

/// Render a boolean the way the devices expect switches.
fn on_off(enabled: bool) -> &'static str {
	if enabled {
		"ON"
	} else {
		"OFF"
	}
}

/// A connected function generator.
///
/// The device owns its session for its whole lifetime. Dropping the device,
/// or calling [`close`](Device::close), closes the session.
pub struct Device<B: Backend> {
	/// The session to the device
	session: Session<B>,
	/// The identified model
	model: &'static Model,
	/// If populated, the error that has "poisoned" the device. This error
	/// MUST be reported before the device is used for communication again.
	///
	/// The device is poisoned when a [`CaptureGuard`] cannot restore the
	/// capture mode in its Drop implementation.
	poison: Option<io::Error>,
}

impl<B: Backend> std::fmt::Debug for Device<B> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Device")
			.field("model", &self.model.name)
			.field("session", &self.session)
			.finish_non_exhaustive()
	}
}

/// Define `apply_<shape>` aliases for [`Device::apply`].
macro_rules! apply_aliases {
	($($name:ident: $shape:ident),+ $(,)?) => {
		paste::paste! {
			$(
				#[doc = "Output a " $name " waveform on `channel`."]
				#[doc = ""]
				#[doc = "This is the same as calling [`apply`](Device::apply) with [`Shape::" $shape "`]."]
				pub fn [< apply_ $name >]<F, A, O>(
					&mut self,
					frequency: F,
					amplitude: A,
					offset: O,
					channel: u8,
				) -> Result<Response, Error>
				where
					F: Into<Value>,
					A: Into<Value>,
					O: Into<Value>,
				{
					self.apply(Shape::$shape, frequency, amplitude, offset, channel)
				}
			)+
		}
	};
}

impl<B: Backend> Device<B> {
	/// Wrap an open session to an identified model.
	pub(crate) fn new(session: Session<B>, model: &'static Model) -> Self {
		Device {
			session,
			model,
			poison: None,
		}
	}

	/// Check if the device is poisoned and report the error if it exists.
	fn check_poisoned(&mut self) -> Result<(), io::Error> {
		if let Some(poison) = self.poison.take() {
			Err(poison)
		} else {
			Ok(())
		}
	}

	/// Poison the device.
	pub(crate) fn poison(&mut self, e: io::Error) {
		self.poison = Some(e);
	}

	/// Transmit `command` and return the response.
	fn send(&mut self, command: Command) -> Result<Response, Error> {
		self.check_poisoned()?;
		self.session.send(command.as_str())
	}

	/// Transmit `command` as a query and return the first non-blank line of
	/// the response.
	fn query(&mut self, command: Command) -> Result<Option<String>, Error> {
		self.check_poisoned()?;
		self.session.send_and_read(command.query().as_str())
	}

	/// Send a raw command line and return the full response.
	///
	/// The line is sent as is, followed by a newline.
	pub fn msg<C: AsRef<str>>(&mut self, line: C) -> Result<Response, Error> {
		self.send(Command::new(line.as_ref()))
	}

	/// Get the model's tag, such as `"AFG2125"`.
	pub fn info(&self) -> &'static str {
		self.model.name
	}

	/// Get the identified model.
	pub fn model(&self) -> &'static Model {
		self.model
	}

	/// Get the command set the model supports.
	pub fn tier(&self) -> Tier {
		self.model.tier
	}

	/// Get the frequency range `shape` can be generated at on this model.
	///
	/// The range is informational: frequencies outside of it are still sent
	/// to the device, which decides how to handle them.
	pub fn frequency_range(&self, shape: Shape) -> Option<FrequencyRange> {
		self.model.frequency_range(shape)
	}

	/// Get the modulation, frequency-shift keying, sweep, and counter
	/// commands, if the model supports them.
	///
	/// Returns `None` for [`Tier::Base`] models.
	pub fn extended(&mut self) -> Option<Extended<'_, B>> {
		match self.model.tier {
			Tier::Extended => Some(Extended::new(self)),
			Tier::Base => None,
		}
	}

	/// Turn response capture on or off.
	///
	/// While capture is off, commands do not wait for a response and a
	/// background thread discards anything the device sends. This is useful
	/// when streaming many commands whose responses are of no interest.
	pub fn set_capture(&mut self, capture: bool) -> Result<(), Error> {
		self.session.set_capture(capture)
	}

	/// Get whether responses are currently being captured.
	pub fn capture(&self) -> Result<bool, Error> {
		self.session.capture()
	}

	/// Set the capture mode until the returned guard is dropped, at which
	/// point the previous mode is restored.
	///
	/// ```rust
	/// # use afgctl::error::Error;
	/// # fn wrapper() -> Result<(), Error> {
	/// # let mut device = afgctl::open_serial("/dev/ttyACM1")?;
	/// {
	///     let mut quiet = device.capture_guard(false)?;
	///     for step in 1..=100 {
	///         quiet.set_frequency(step * 10, 1)?;
	///     }
	/// }
	/// // Capture is back on here.
	/// # Ok(())
	/// # }
	/// ```
	///
	/// If the previous mode cannot be restored, the device is poisoned and
	/// the next command reports the failure.
	pub fn capture_guard(&mut self, capture: bool) -> Result<CaptureGuard<'_, B>, Error> {
		self.check_poisoned()?;
		CaptureGuard::new(self, capture)
	}

	/// Close the session to the device.
	pub fn close(self) {
		self.session.close();
	}

	// System

	/// Get the manufacturer, model number, serial number and firmware
	/// version of the device.
	///
	/// The full response is returned.
	pub fn identify(&mut self) -> Result<Response, Error> {
		self.send(Command::new(IDENTIFY))
	}

	/// Reset the device to its factory default state.
	pub fn reset(&mut self) -> Result<Response, Error> {
		self.send(Command::new("*rst"))
	}

	/// Clear the device's state.
	///
	/// The devices are cleared with `*rst`, the same command as [`reset`](Device::reset).
	pub fn clear(&mut self) -> Result<Response, Error> {
		self.send(Command::new("*rst"))
	}

	/// Read the oldest entry from the device's error queue.
	pub fn system_error(&mut self) -> Result<Option<String>, Error> {
		self.query(Command::new("SYST:ERR"))
	}

	/// Get the SCPI version the device implements.
	pub fn system_version(&mut self) -> Result<Option<String>, Error> {
		self.query(Command::new("SYST:VERS"))
	}

	// Apply

	/// Output a waveform with the given shape, frequency (Hz), amplitude and
	/// offset (V) on `channel`, all in one command.
	///
	/// ```rust
	/// # use afgctl::{command::Value, error::Error};
	/// # fn wrapper() -> Result<(), Error> {
	/// # let mut device = afgctl::open_serial("/dev/ttyACM1")?;
	/// // Sends "SOURCE1:APPLY:SQUARE 1000,MAX,0"
	/// device.apply("square", 1000, Value::Max, 0, 1)?;
	/// # Ok(())
	/// # }
	/// ```
	pub fn apply<S, F, A, O>(
		&mut self,
		shape: S,
		frequency: F,
		amplitude: A,
		offset: O,
		channel: u8,
	) -> Result<Response, Error>
	where
		S: IntoChoice<Shape>,
		F: Into<Value>,
		A: Into<Value>,
		O: Into<Value>,
	{
		let shape = shape.into_choice()?;
		let frequency = command::check_number("frequency", frequency)?;
		let amplitude = command::check_number("amplitude", amplitude)?;
		let offset = command::check_number("offset", offset)?;
		self.send(
			Command::source(channel, &format!("APPLY:{shape}"))
				.arg(frequency)
				.arg(amplitude)
				.arg(offset),
		)
	}

	apply_aliases!(sine: Sine, square: Square, ramp: Ramp, noise: Noise, user: User);

	/// Get the shape, frequency, amplitude and offset `channel` is set to.
	pub fn get_apply(&mut self, channel: u8) -> Result<Option<String>, Error> {
		self.query(Command::source(channel, "APPLY"))
	}

	// Waveform

	/// Select the waveform shape on `channel`.
	pub fn set_function<S: IntoChoice<Shape>>(&mut self, shape: S, channel: u8) -> Result<Response, Error> {
		let shape = shape.into_choice()?;
		self.send(Command::source(channel, "FUNC").arg(shape))
	}

	/// Get the waveform shape on `channel`.
	pub fn function(&mut self, channel: u8) -> Result<Option<String>, Error> {
		self.query(Command::source(channel, "FUNC"))
	}

	/// Set the frequency of `channel`, in Hz.
	pub fn set_frequency<V: Into<Value>>(&mut self, frequency: V, channel: u8) -> Result<Response, Error> {
		let frequency = command::check_number("frequency", frequency)?;
		self.send(Command::source(channel, "FREQ").arg(frequency))
	}

	/// Get the frequency of `channel`, in Hz.
	pub fn frequency(&mut self, channel: u8) -> Result<Option<String>, Error> {
		self.query(Command::source(channel, "FREQ"))
	}

	/// Set the amplitude of `channel`, in the current [voltage unit](Device::set_voltage_unit).
	pub fn set_amplitude<V: Into<Value>>(&mut self, amplitude: V, channel: u8) -> Result<Response, Error> {
		let amplitude = command::check_number("amplitude", amplitude)?;
		self.send(Command::source(channel, "AMPL").arg(amplitude))
	}

	/// Get the amplitude of `channel`.
	pub fn amplitude(&mut self, channel: u8) -> Result<Option<String>, Error> {
		self.query(Command::source(channel, "AMPL"))
	}

	/// Set the DC offset of `channel`, in volts.
	pub fn set_offset<V: Into<Value>>(&mut self, offset: V, channel: u8) -> Result<Response, Error> {
		let offset = command::check_number("offset", offset)?;
		self.send(Command::source(channel, "DCO").arg(offset))
	}

	/// Get the DC offset of `channel`.
	pub fn offset(&mut self, channel: u8) -> Result<Option<String>, Error> {
		self.query(Command::source(channel, "DCO"))
	}

	/// Set the duty cycle of the square wave on `channel`, in percent.
	pub fn set_duty_cycle<V: Into<Value>>(&mut self, duty: V, channel: u8) -> Result<Response, Error> {
		let duty = command::check_number("duty_cycle", duty)?;
		self.send(Command::source(channel, "SQUARE:DCYCLE").arg(duty))
	}

	/// Get the duty cycle of the square wave on `channel`.
	pub fn duty_cycle(&mut self, channel: u8) -> Result<Option<String>, Error> {
		self.query(Command::source(channel, "SQUARE:DCYCLE"))
	}

	/// Set the symmetry of the ramp on `channel`, in percent.
	pub fn set_ramp_symmetry<V: Into<Value>>(&mut self, symmetry: V, channel: u8) -> Result<Response, Error> {
		let symmetry = command::check_number("symmetry", symmetry)?;
		self.send(Command::source(channel, "RAMP:SYMM").arg(symmetry))
	}

	/// Get the symmetry of the ramp on `channel`.
	pub fn ramp_symmetry(&mut self, channel: u8) -> Result<Option<String>, Error> {
		self.query(Command::source(channel, "RAMP:SYMM"))
	}

	// Output

	/// Turn the output on or off.
	pub fn set_output_enabled(&mut self, enabled: bool) -> Result<Response, Error> {
		self.send(Command::new("OUTP").arg(on_off(enabled)))
	}

	/// Get whether the output is on.
	pub fn output_enabled(&mut self) -> Result<Option<String>, Error> {
		self.query(Command::new("OUTP"))
	}

	/// Set the load the output is terminated with.
	pub fn set_output_load<L: IntoChoice<OutputLoad>>(&mut self, load: L) -> Result<Response, Error> {
		let load = load.into_choice()?;
		self.send(Command::new("OUTP:LOAD").arg(load))
	}

	/// Terminate the output with 50 Ω.
	pub fn set_output_load_50ohm(&mut self) -> Result<Response, Error> {
		self.set_output_load(OutputLoad::Default)
	}

	/// Terminate the output with a high impedance.
	pub fn set_output_load_high(&mut self) -> Result<Response, Error> {
		self.set_output_load(OutputLoad::HighZ)
	}

	/// Get the load the output is terminated with.
	pub fn output_load(&mut self) -> Result<Option<String>, Error> {
		self.query(Command::new("OUTP:LOAD"))
	}

	/// Set the unit amplitudes on `channel` are expressed in.
	pub fn set_voltage_unit<U: IntoChoice<VoltageUnit>>(&mut self, unit: U, channel: u8) -> Result<Response, Error> {
		let unit = unit.into_choice()?;
		self.send(Command::source(channel, "VOLT:UNIT").arg(unit))
	}

	/// Express amplitudes on `channel` in volts peak-to-peak.
	pub fn set_voltage_unit_vpp(&mut self, channel: u8) -> Result<Response, Error> {
		self.set_voltage_unit(VoltageUnit::Vpp, channel)
	}

	/// Express amplitudes on `channel` in volts RMS.
	pub fn set_voltage_unit_vrms(&mut self, channel: u8) -> Result<Response, Error> {
		self.set_voltage_unit(VoltageUnit::Vrms, channel)
	}

	/// Express amplitudes on `channel` in decibel-milliwatts.
	pub fn set_voltage_unit_dbm(&mut self, channel: u8) -> Result<Response, Error> {
		self.set_voltage_unit(VoltageUnit::Dbm, channel)
	}

	/// Get the unit amplitudes on `channel` are expressed in.
	pub fn voltage_unit(&mut self, channel: u8) -> Result<Option<String>, Error> {
		self.query(Command::source(channel, "VOLT:UNIT"))
	}

	// Registers

	/// Save the current settings to one of the on-board [registers](command::REGISTERS).
	///
	/// Registers outside of 0 to 19 are rejected before anything is sent.
	pub fn save(&mut self, register: u8) -> Result<Response, Error> {
		let register = command::check_register(register)?;
		self.send(Command::new("*SAV").arg(register))
	}

	/// Restore the settings saved to one of the on-board [registers](command::REGISTERS).
	///
	/// Registers outside of 0 to 19 are rejected before anything is sent.
	pub fn recall(&mut self, register: u8) -> Result<Response, Error> {
		let register = command::check_register(register)?;
		self.send(Command::new("*RCL").arg(register))
	}

	// Arbitrary waveforms

	/// Load the points of an arbitrary waveform into volatile memory,
	/// starting at address 0.
	///
	/// The waveform is output with [`Shape::User`].
	pub fn load_arbitrary(&mut self, samples: &[i16]) -> Result<Response, Error> {
		if samples.is_empty() {
			return Err(InvalidParameterError::new("samples", "[]", "at least one sample").into());
		}
		self.send(Command::new("DATA:DAC VOLATILE, 0,").args(samples))
	}
}
