//! Commands only the extended tier models support.

use super::{on_off, Device};
use crate::{
	backend::Backend,
	command::{self, Command, IntoChoice, ModulationShape, ModulationSource, SweepSpacing, Value},
	error::Error,
	response::Response,
};

/// Define the commands shared by amplitude and frequency modulation.
macro_rules! modulation {
	($prefix:ident, $keyword:literal, $kind:literal) => {
		paste::paste! {
			#[doc = "Turn " $kind " modulation on or off."]
			pub fn [< set_ $prefix _enabled >](&mut self, enabled: bool, channel: u8) -> Result<Response, Error> {
				self.send(Command::source(channel, concat!($keyword, ":STAT")).arg(on_off(enabled)))
			}

			#[doc = "Get whether " $kind " modulation is on."]
			pub fn [< $prefix _enabled >](&mut self, channel: u8) -> Result<Option<String>, Error> {
				self.query(Command::source(channel, concat!($keyword, ":STAT")))
			}

			#[doc = "Select where the " $kind " modulating signal comes from."]
			pub fn [< set_ $prefix _source >]<S>(&mut self, source: S, channel: u8) -> Result<Response, Error>
			where
				S: IntoChoice<ModulationSource>,
			{
				let source = source.into_choice()?;
				self.send(Command::source(channel, concat!($keyword, ":SOUR")).arg(source))
			}

			#[doc = "Get where the " $kind " modulating signal comes from."]
			pub fn [< $prefix _source >](&mut self, channel: u8) -> Result<Option<String>, Error> {
				self.query(Command::source(channel, concat!($keyword, ":SOUR")))
			}

			#[doc = "Set the shape of the internal " $kind " modulating signal."]
			pub fn [< set_ $prefix _shape >]<S>(&mut self, shape: S, channel: u8) -> Result<Response, Error>
			where
				S: IntoChoice<ModulationShape>,
			{
				let shape = shape.into_choice()?;
				self.send(Command::source(channel, concat!($keyword, ":INT:FUNC")).arg(shape))
			}

			#[doc = "Get the shape of the internal " $kind " modulating signal."]
			pub fn [< $prefix _shape >](&mut self, channel: u8) -> Result<Option<String>, Error> {
				self.query(Command::source(channel, concat!($keyword, ":INT:FUNC")))
			}

			#[doc = "Set the frequency of the internal " $kind " modulating signal, in Hz."]
			pub fn [< set_ $prefix _frequency >]<V: Into<Value>>(&mut self, frequency: V, channel: u8) -> Result<Response, Error> {
				let frequency = command::check_number("frequency", frequency)?;
				self.send(Command::source(channel, concat!($keyword, ":INT:FREQ")).arg(frequency))
			}

			#[doc = "Get the frequency of the internal " $kind " modulating signal."]
			pub fn [< $prefix _frequency >](&mut self, channel: u8) -> Result<Option<String>, Error> {
				self.query(Command::source(channel, concat!($keyword, ":INT:FREQ")))
			}
		}
	};
}

/// The modulation, frequency-shift keying, sweep, and counter commands of
/// an extended tier model.
///
/// Get one from [`Device::extended`]. It borrows the device, so it is
/// usually created, used, and dropped in one statement. Like the base
/// commands, every command but the counter's takes the channel it addresses:
///
/// ```rust
/// # use afgctl::{command::ModulationSource, error::Error};
/// # fn wrapper() -> Result<(), Error> {
/// # let mut device = afgctl::open_serial("/dev/ttyACM1")?;
/// if let Some(mut extended) = device.extended() {
///     extended.set_am_source(ModulationSource::Internal, 1)?;
///     extended.set_am_depth(80, 1)?;
///     extended.set_am_enabled(true, 1)?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Extended<'a, B: Backend> {
	/// The device the commands are sent to
	device: &'a mut Device<B>,
}

impl<'a, B: Backend> Extended<'a, B> {
	/// Borrow an extended tier device.
	pub(super) fn new(device: &'a mut Device<B>) -> Self {
		Extended { device }
	}

	/// Transmit `command` and return the response.
	fn send(&mut self, command: Command) -> Result<Response, Error> {
		self.device.send(command)
	}

	/// Transmit `command` as a query and return the first non-blank line.
	fn query(&mut self, command: Command) -> Result<Option<String>, Error> {
		self.device.query(command)
	}

	// Amplitude modulation

	modulation!(am, "AM", "amplitude");

	/// Set the amplitude modulation depth, in percent.
	pub fn set_am_depth<V: Into<Value>>(&mut self, depth: V, channel: u8) -> Result<Response, Error> {
		let depth = command::check_number("depth", depth)?;
		self.send(Command::source(channel, "AM:DEPT").arg(depth))
	}

	/// Get the amplitude modulation depth.
	pub fn am_depth(&mut self, channel: u8) -> Result<Option<String>, Error> {
		self.query(Command::source(channel, "AM:DEPT"))
	}

	// Frequency modulation

	modulation!(fm, "FM", "frequency");

	/// Set the peak frequency deviation, in Hz.
	pub fn set_fm_deviation<V: Into<Value>>(&mut self, deviation: V, channel: u8) -> Result<Response, Error> {
		let deviation = command::check_number("deviation", deviation)?;
		self.send(Command::source(channel, "FM:DEV").arg(deviation))
	}

	/// Get the peak frequency deviation.
	pub fn fm_deviation(&mut self, channel: u8) -> Result<Option<String>, Error> {
		self.query(Command::source(channel, "FM:DEV"))
	}

	// Frequency-shift keying

	/// Turn frequency-shift keying on or off.
	pub fn set_fsk_enabled(&mut self, enabled: bool, channel: u8) -> Result<Response, Error> {
		self.send(Command::source(channel, "FSK:STAT").arg(on_off(enabled)))
	}

	/// Get whether frequency-shift keying is on.
	pub fn fsk_enabled(&mut self, channel: u8) -> Result<Option<String>, Error> {
		self.query(Command::source(channel, "FSK:STAT"))
	}

	/// Select what triggers a hop: the internal rate or the rear panel input.
	pub fn set_fsk_source<S: IntoChoice<ModulationSource>>(&mut self, source: S, channel: u8) -> Result<Response, Error> {
		let source = source.into_choice()?;
		self.send(Command::source(channel, "FSK:SOUR").arg(source))
	}

	/// Get what triggers a hop.
	pub fn fsk_source(&mut self, channel: u8) -> Result<Option<String>, Error> {
		self.query(Command::source(channel, "FSK:SOUR"))
	}

	/// Set the hop frequency, in Hz.
	pub fn set_fsk_frequency<V: Into<Value>>(&mut self, frequency: V, channel: u8) -> Result<Response, Error> {
		let frequency = command::check_number("frequency", frequency)?;
		self.send(Command::source(channel, "FSK:FREQ").arg(frequency))
	}

	/// Get the hop frequency.
	pub fn fsk_frequency(&mut self, channel: u8) -> Result<Option<String>, Error> {
		self.query(Command::source(channel, "FSK:FREQ"))
	}

	/// Set the rate the output hops between the carrier and hop frequency
	/// when the source is internal, in Hz.
	pub fn set_fsk_rate<V: Into<Value>>(&mut self, rate: V, channel: u8) -> Result<Response, Error> {
		let rate = command::check_number("rate", rate)?;
		self.send(Command::source(channel, "FSK:INT:RATE").arg(rate))
	}

	/// Get the internal hop rate.
	pub fn fsk_rate(&mut self, channel: u8) -> Result<Option<String>, Error> {
		self.query(Command::source(channel, "FSK:INT:RATE"))
	}

	// Sweep

	/// Turn the frequency sweep on or off.
	pub fn set_sweep_enabled(&mut self, enabled: bool, channel: u8) -> Result<Response, Error> {
		self.send(Command::source(channel, "SWE:STAT").arg(on_off(enabled)))
	}

	/// Get whether the frequency sweep is on.
	pub fn sweep_enabled(&mut self, channel: u8) -> Result<Option<String>, Error> {
		self.query(Command::source(channel, "SWE:STAT"))
	}

	/// Set the frequency the sweep starts at, in Hz.
	pub fn set_sweep_start<V: Into<Value>>(&mut self, frequency: V, channel: u8) -> Result<Response, Error> {
		let frequency = command::check_number("frequency", frequency)?;
		self.send(Command::source(channel, "FREQ:STAR").arg(frequency))
	}

	/// Get the frequency the sweep starts at.
	pub fn sweep_start(&mut self, channel: u8) -> Result<Option<String>, Error> {
		self.query(Command::source(channel, "FREQ:STAR"))
	}

	/// Set the frequency the sweep stops at, in Hz.
	pub fn set_sweep_stop<V: Into<Value>>(&mut self, frequency: V, channel: u8) -> Result<Response, Error> {
		let frequency = command::check_number("frequency", frequency)?;
		self.send(Command::source(channel, "FREQ:STOP").arg(frequency))
	}

	/// Get the frequency the sweep stops at.
	pub fn sweep_stop(&mut self, channel: u8) -> Result<Option<String>, Error> {
		self.query(Command::source(channel, "FREQ:STOP"))
	}

	/// Set how the sweep steps between its start and stop frequency.
	pub fn set_sweep_spacing<S: IntoChoice<SweepSpacing>>(&mut self, spacing: S, channel: u8) -> Result<Response, Error> {
		let spacing = spacing.into_choice()?;
		self.send(Command::source(channel, "SWE:SPAC").arg(spacing))
	}

	/// Get how the sweep steps between its start and stop frequency.
	pub fn sweep_spacing(&mut self, channel: u8) -> Result<Option<String>, Error> {
		self.query(Command::source(channel, "SWE:SPAC"))
	}

	/// Set how long one sweep takes, in seconds.
	pub fn set_sweep_time<V: Into<Value>>(&mut self, seconds: V, channel: u8) -> Result<Response, Error> {
		let seconds = command::check_number("seconds", seconds)?;
		self.send(Command::source(channel, "SWE:TIME").arg(seconds))
	}

	/// Get how long one sweep takes.
	pub fn sweep_time(&mut self, channel: u8) -> Result<Option<String>, Error> {
		self.query(Command::source(channel, "SWE:TIME"))
	}

	/// Select what triggers a sweep.
	pub fn set_sweep_source<S: IntoChoice<ModulationSource>>(&mut self, source: S, channel: u8) -> Result<Response, Error> {
		let source = source.into_choice()?;
		self.send(Command::source(channel, "SWE:SOUR").arg(source))
	}

	/// Get what triggers a sweep.
	pub fn sweep_source(&mut self, channel: u8) -> Result<Option<String>, Error> {
		self.query(Command::source(channel, "SWE:SOUR"))
	}

	// Counter

	// Counter commands address no channel.

	/// Turn the frequency counter on or off.
	pub fn set_counter_enabled(&mut self, enabled: bool) -> Result<Response, Error> {
		self.send(Command::new("COUN:STAT").arg(on_off(enabled)))
	}

	/// Get whether the frequency counter is on.
	pub fn counter_enabled(&mut self) -> Result<Option<String>, Error> {
		self.query(Command::new("COUN:STAT"))
	}

	/// Set the counter's gate time, in seconds.
	pub fn set_counter_gate<V: Into<Value>>(&mut self, seconds: V) -> Result<Response, Error> {
		let seconds = command::check_number("seconds", seconds)?;
		self.send(Command::new("COUN:GAT").arg(seconds))
	}

	/// Get the counter's gate time.
	pub fn counter_gate(&mut self) -> Result<Option<String>, Error> {
		self.query(Command::new("COUN:GAT"))
	}

	/// Get the frequency the counter last measured, in Hz.
	pub fn counter_value(&mut self) -> Result<Option<String>, Error> {
		self.query(Command::new("COUN:VAL"))
	}
}
