//! The supported function generator models.
//!
//! Every model speaks the same base command set. The AFG-21x5 and AFG-2112
//! ("1xx" models) additionally support amplitude and frequency modulation,
//! frequency-shift keying, frequency sweeps, and a frequency counter. The
//! models also differ in the frequencies each waveform shape can be
//! generated at:
//!
//! | Model    | Tier     | Sine/Square/Noise | Ramp   | User   |
//! |----------|----------|-------------------|--------|--------|
//! | AFG-2005 | Base     | 5 MHz             | 1 MHz  | 5 MHz  |
//! | AFG-2105 | Extended | 5 MHz             | 1 MHz  | 5 MHz  |
//! | AFG-2012 | Base     | 12 MHz            | 1 MHz  | 10 MHz |
//! | AFG-2112 | Extended | 12 MHz            | 1 MHz  | 10 MHz |
//! | AFG-2025 | Base     | 25 MHz            | 1 MHz  | 10 MHz |
//! | AFG-2125 | Extended | 25 MHz            | 1 MHz  | 10 MHz |
//!
//! The lower bound is 0.1 Hz for every shape. The frequency ranges are
//! informational only: commands are never checked against them before being
//! sent.

use crate::command::Shape;

/// The command set a model supports.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Tier {
	/// The base command set only.
	Base,
	/// The base command set plus modulation, frequency-shift keying,
	/// sweep, and counter commands.
	Extended,
}

/// The inclusive range of frequencies, in Hz, a waveform can be generated at.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrequencyRange {
	/// The lowest frequency, in Hz.
	pub min: f64,
	/// The highest frequency, in Hz.
	pub max: f64,
}

impl FrequencyRange {
	/// Whether `frequency` (in Hz) is within the range.
	pub fn contains(&self, frequency: f64) -> bool {
		(self.min..=self.max).contains(&frequency)
	}
}

/// A description of one function generator model.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
	/// The model's tag, such as `"AFG2125"`.
	pub name: &'static str,
	/// The text that identifies the model in the response to `*IDN?`, such as `"AFG-2125"`.
	pub identifier: &'static str,
	/// The command set the model supports.
	pub tier: Tier,
	/// The frequency range of every shape the model supports.
	ranges: [(Shape, FrequencyRange); 5],
}

/// The lowest frequency any shape can be generated at, in Hz.
const MIN_FREQUENCY: f64 = 0.1;

/// The highest frequency a ramp can be generated at on any model, in Hz.
const MAX_RAMP_FREQUENCY: f64 = 1e6;

/// A range from [`MIN_FREQUENCY`] up to `max`.
const fn up_to(max: f64) -> FrequencyRange {
	FrequencyRange {
		min: MIN_FREQUENCY,
		max,
	}
}

/// Build a frequency range table.
const fn range_table(max_frequency: f64, max_user_frequency: f64) -> [(Shape, FrequencyRange); 5] {
	[
		(Shape::Sine, up_to(max_frequency)),
		(Shape::Square, up_to(max_frequency)),
		(Shape::Ramp, up_to(MAX_RAMP_FREQUENCY)),
		(Shape::Noise, up_to(max_frequency)),
		(Shape::User, up_to(max_user_frequency)),
	]
}

/// Every supported model.
///
/// A device is identified by the first entry whose identifier appears in its
/// response to `*IDN?`, so no identifier may contain an earlier one.
pub static CATALOG: [Model; 6] = [
	Model {
		name: "AFG2005",
		identifier: "AFG-2005",
		tier: Tier::Base,
		ranges: range_table(5e6, 5e6),
	},
	Model {
		name: "AFG2105",
		identifier: "AFG-2105",
		tier: Tier::Extended,
		ranges: range_table(5e6, 5e6),
	},
	Model {
		name: "AFG2012",
		identifier: "AFG-2012",
		tier: Tier::Base,
		ranges: range_table(12e6, 10e6),
	},
	Model {
		name: "AFG2112",
		identifier: "AFG-2112",
		tier: Tier::Extended,
		ranges: range_table(12e6, 10e6),
	},
	Model {
		name: "AFG2025",
		identifier: "AFG-2025",
		tier: Tier::Base,
		ranges: range_table(25e6, 10e6),
	},
	Model {
		name: "AFG2125",
		identifier: "AFG-2125",
		tier: Tier::Extended,
		ranges: range_table(25e6, 10e6),
	},
];

impl Model {
	/// Find the model identified by `identification`, the device's response
	/// to `*IDN?`.
	pub fn lookup(identification: &str) -> Option<&'static Model> {
		CATALOG
			.iter()
			.find(|model| identification.contains(model.identifier))
	}

	/// Get the frequency range `shape` can be generated at.
	///
	/// Returns `None` if the model does not support the shape.
	pub fn frequency_range(&self, shape: Shape) -> Option<FrequencyRange> {
		self.ranges
			.iter()
			.find(|(s, _)| *s == shape)
			.map(|(_, range)| *range)
	}

	/// Get the shapes the model supports.
	pub fn shapes(&self) -> impl Iterator<Item = Shape> + '_ {
		self.ranges.iter().map(|(shape, _)| *shape)
	}

	/// Whether the model supports the extended command set.
	pub fn is_extended(&self) -> bool {
		self.tier == Tier::Extended
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::command::Choice as _;

	#[test]
	fn lookup_every_model() {
		for model in &CATALOG {
			let idn = format!("GW INSTEK,{},SN:GEQ812345,V1.05", model.identifier);
			let found = Model::lookup(&idn).unwrap();
			assert_eq!(found.name, model.name);
		}
		assert!(Model::lookup("GW INSTEK,AFG-3081,SN:1,V1.0").is_none());
		assert!(Model::lookup("").is_none());
	}

	#[test]
	fn catalog_order_puts_specific_identifiers_first() {
		for (i, earlier) in CATALOG.iter().enumerate() {
			for later in &CATALOG[i + 1..] {
				assert!(
					!later.identifier.contains(earlier.identifier),
					"{} shadows {}",
					earlier.identifier,
					later.identifier
				);
			}
		}
	}

	#[test]
	fn every_shape_has_exactly_one_range() {
		for model in &CATALOG {
			for &shape in Shape::ALL {
				let count = model.shapes().filter(|&s| s == shape).count();
				assert_eq!(count, 1, "{} {shape}", model.name);
				let range = model.frequency_range(shape).unwrap();
				assert!(range.min > 0.0 && range.min < range.max);
			}
			assert_eq!(model.shapes().count(), Shape::ALL.len());
		}
	}

	#[test]
	fn tiers() {
		let extended: Vec<_> = CATALOG
			.iter()
			.filter(|m| m.is_extended())
			.map(|m| m.name)
			.collect();
		assert_eq!(extended, ["AFG2105", "AFG2112", "AFG2125"]);
	}

	#[test]
	fn higher_models_reach_higher_frequencies() {
		let sine = |name: &str| {
			CATALOG
				.iter()
				.find(|m| m.name == name)
				.and_then(|m| m.frequency_range(Shape::Sine))
				.unwrap()
		};
		assert!(sine("AFG2005").max < sine("AFG2012").max);
		assert!(sine("AFG2012").max < sine("AFG2025").max);
		assert_eq!(sine("AFG2105"), sine("AFG2005"));
		assert!(sine("AFG2125").contains(25e6));
		assert!(!sine("AFG2125").contains(25.1e6));
	}
}
