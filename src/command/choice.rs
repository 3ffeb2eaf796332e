//! Parameters that take one of a fixed set of keywords.

use crate::error::InvalidParameterError;

/// A parameter that must be one of a fixed set of keywords.
///
/// Keywords are matched case-insensitively and always sent in upper case.
pub trait Choice: Copy + Sized + 'static + private::Sealed {
	/// The name of the parameter, used in error messages.
	const PARAMETER: &'static str;

	/// Every allowed value.
	const ALL: &'static [Self];

	/// The keyword sent to the device.
	fn token(self) -> &'static str;

	/// Find the value whose keyword matches `value`, ignoring case.
	fn parse(value: &str) -> Result<Self, InvalidParameterError> {
		Self::ALL
			.iter()
			.copied()
			.find(|choice| choice.token().eq_ignore_ascii_case(value))
			.ok_or_else(|| {
				let tokens: Vec<&str> = Self::ALL.iter().map(|choice| choice.token()).collect();
				InvalidParameterError::not_one_of(Self::PARAMETER, value, &tokens)
			})
	}
}

/// Types that can be converted into a [`Choice`], possibly failing.
///
/// This is implemented by every `Choice` and by strings, so operations
/// accept either the typed value or its keyword:
///
/// ```
/// use afgctl::command::{IntoChoice, OutputLoad};
///
/// assert_eq!(IntoChoice::<OutputLoad>::into_choice("inf").unwrap(), OutputLoad::HighZ);
/// assert!(IntoChoice::<OutputLoad>::into_choice("75").is_err());
/// ```
pub trait IntoChoice<C> {
	/// Perform the conversion.
	fn into_choice(self) -> Result<C, InvalidParameterError>;
}

impl<C: Choice> IntoChoice<C> for C {
	fn into_choice(self) -> Result<C, InvalidParameterError> {
		Ok(self)
	}
}

impl<C: Choice> IntoChoice<C> for &str {
	fn into_choice(self) -> Result<C, InvalidParameterError> {
		C::parse(self)
	}
}

impl<C: Choice> IntoChoice<C> for &String {
	fn into_choice(self) -> Result<C, InvalidParameterError> {
		C::parse(self)
	}
}

impl<C: Choice> IntoChoice<C> for String {
	fn into_choice(self) -> Result<C, InvalidParameterError> {
		C::parse(&self)
	}
}

/// Define an enum implementing [`Choice`], `Display` and `FromStr`.
macro_rules! choice {
	(
		$(#[$attr:meta])*
		pub enum $name:ident ($parameter:literal) {
			$(
				$(#[$variant_attr:meta])*
				$variant:ident => $token:literal
			),+
			$(,)?
		}
	) => {
		$(#[$attr])*
		#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
		pub enum $name {
			$(
				$(#[$variant_attr])*
				$variant
			),+
		}

		impl Choice for $name {
			const PARAMETER: &'static str = $parameter;
			const ALL: &'static [Self] = &[$($name::$variant),+];

			fn token(self) -> &'static str {
				match self {
					$($name::$variant => $token),+
				}
			}
		}

		impl std::fmt::Display for $name {
			fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				f.write_str(self.token())
			}
		}

		impl std::str::FromStr for $name {
			type Err = InvalidParameterError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				<$name as Choice>::parse(s)
			}
		}

		impl private::Sealed for $name {}
	};
}

choice! {
	/// A waveform shape.
	pub enum Shape ("shape") {
		/// Sine wave
		Sine => "SIN",
		/// Square wave
		Square => "SQUARE",
		/// Ramp (triangle or sawtooth, depending on symmetry)
		Ramp => "RAMP",
		/// Noise
		Noise => "NOISE",
		/// The arbitrary waveform loaded into the device
		User => "USER",
	}
}

choice! {
	/// The load the output is terminated with.
	pub enum OutputLoad ("load") {
		/// 50 Ω
		Default => "DEF",
		/// High impedance
		HighZ => "INF",
	}
}

choice! {
	/// The unit amplitudes are expressed in.
	pub enum VoltageUnit ("voltage unit") {
		/// Volts peak-to-peak
		Vpp => "VPP",
		/// Volts RMS
		Vrms => "VRMS",
		/// Decibel-milliwatts
		Dbm => "DBM",
	}
}

choice! {
	/// Where a modulation, sweep or frequency-shift-keying signal comes from.
	pub enum ModulationSource ("source") {
		/// The device's internal generator
		Internal => "INT",
		/// The rear panel input
		External => "EXT",
	}
}

choice! {
	/// The shape of the internal modulating signal.
	pub enum ModulationShape ("modulation shape") {
		/// Sine wave
		Sine => "SIN",
		/// Square wave
		Square => "SQUARE",
		/// Ramp
		Ramp => "RAMP",
	}
}

choice! {
	/// How a sweep steps between its start and stop frequency.
	pub enum SweepSpacing ("sweep spacing") {
		/// Linear
		Linear => "LIN",
		/// Logarithmic
		Logarithmic => "LOG",
	}
}

mod private {
	pub trait Sealed {}
}

#[cfg(test)]
mod test {
	use super::*;

	/// Check every keyword of `C` parses in upper, lower, and mixed case.
	fn check_all_cases<C: Choice + std::fmt::Debug + PartialEq>() {
		for &choice in C::ALL {
			let token = choice.token();
			assert_eq!(token, token.to_uppercase());
			assert_eq!(C::parse(token).unwrap(), choice);
			assert_eq!(C::parse(&token.to_lowercase()).unwrap(), choice);
			let mixed: String = token
				.chars()
				.enumerate()
				.map(|(i, c)| if i % 2 == 0 { c.to_ascii_lowercase() } else { c })
				.collect();
			assert_eq!(C::parse(&mixed).unwrap(), choice);
		}
	}

	#[test]
	fn keywords_are_case_insensitive() {
		check_all_cases::<Shape>();
		check_all_cases::<OutputLoad>();
		check_all_cases::<VoltageUnit>();
		check_all_cases::<ModulationSource>();
		check_all_cases::<ModulationShape>();
		check_all_cases::<SweepSpacing>();
	}

	#[test]
	fn unknown_keywords_are_rejected() {
		let err = OutputLoad::parse("50").unwrap_err();
		assert_eq!(err.parameter(), "load");
		assert_eq!(err.value(), "50");
		assert_eq!(err.allowed(), "one of DEF, INF");

		assert!("VPP ".parse::<VoltageUnit>().is_err());
		assert!("".parse::<ModulationSource>().is_err());
		assert!("NOISE".parse::<ModulationShape>().is_err());
		assert!("TRIANGLE".parse::<Shape>().is_err());
	}

	#[test]
	fn into_choice() {
		let unit: VoltageUnit = "vrms".into_choice().unwrap();
		assert_eq!(unit, VoltageUnit::Vrms);
		let unit: VoltageUnit = String::from("dBm").into_choice().unwrap();
		assert_eq!(unit, VoltageUnit::Dbm);
		let unit: VoltageUnit = VoltageUnit::Vpp.into_choice().unwrap();
		assert_eq!(unit.to_string(), "VPP");
	}
}
