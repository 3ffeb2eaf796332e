use super::Device;
use crate::{
	backend::{Mock, Serial},
	command::{Shape, Value},
	error::{Error, InvalidParameterError},
	model::{Model, Tier, CATALOG},
	response::Response,
	session::Session,
};
use static_assertions::assert_impl_all;
use std::io;

assert_impl_all!(Device<Serial>: Send, std::fmt::Debug);
assert_impl_all!(Device<Mock>: Send, std::fmt::Debug);

/// Find a model in the catalog by its tag.
fn model(name: &str) -> &'static Model {
	CATALOG.iter().find(|m| m.name == name).unwrap()
}

/// Open a device of the given model over a mock, without a drain thread so
/// every read the mock sees comes from the test itself.
fn open(name: &str) -> (Device<Mock>, Mock) {
	let mock = Mock::new();
	let session = Session::open_without_drain(mock.clone()).unwrap();
	(Device::new(session, model(name)), mock)
}

/// The last complete line written to the mock.
fn last_line(mock: &Mock) -> String {
	mock.written_lines().pop().unwrap_or_default()
}

#[test]
fn apply_sine_encoding() {
	let (mut device, mock) = open("AFG2025");
	device.apply_sine(1250, 1.254, 0.52, 1).unwrap();
	assert_eq!(mock.written(), b"SOURCE1:APPLY:SIN 1250,1.254,0.52\n");
}

#[test]
fn apply_aliases_delegate_to_apply() {
	let (mut device, mock) = open("AFG2005");
	device.apply_square(1000, 2, 0, 1).unwrap();
	device.apply_ramp(10_000, Value::Max, -1, 2).unwrap();
	device.apply_noise(Value::Min, 0.1, 0, 1).unwrap();
	device.apply_user(500, 1.5, 0.25, 1).unwrap();
	assert_eq!(
		mock.written_lines(),
		vec![
			"SOURCE1:APPLY:SQUARE 1000,2,0",
			"SOURCE2:APPLY:RAMP 10000,MAX,-1",
			"SOURCE1:APPLY:NOISE MIN,0.1,0",
			"SOURCE1:APPLY:USER 500,1.5,0.25",
		]
	);

	for &shape in <Shape as crate::command::Choice>::ALL {
		mock.clear_written();
		device.apply(shape, 100, 1, 0, 1).unwrap();
		assert_eq!(last_line(&mock), format!("SOURCE1:APPLY:{shape} 100,1,0"));
	}

	mock.clear_written();
	device.apply("Ramp", 100, 1, 0, 1).unwrap();
	assert_eq!(last_line(&mock), "SOURCE1:APPLY:RAMP 100,1,0");

	mock.clear_written();
	let err = device.apply("triangle", 100, 1, 0, 1).unwrap_err();
	assert_eq!(InvalidParameterError::try_from(err).unwrap().parameter(), "shape");
	assert!(mock.written().is_empty());
}

/// A typed operation taking one keyword parameter.
type Setter = fn(&mut Device<Mock>, &str) -> Result<Response, Error>;

/// Check that `setter` rejects unknown keywords without transmitting
/// anything, and transmits `expected` for `token` in any letter case.
fn check_choice(device: &mut Device<Mock>, mock: &Mock, setter: Setter, token: &str, expected: &str) {
	mock.clear_written();
	match setter(device, "bogus") {
		Err(Error::InvalidParameter(e)) => assert_eq!(e.value(), "bogus"),
		other => panic!("unexpected result for {expected}: {other:?}"),
	}
	assert!(mock.written().is_empty(), "{expected}: bytes were written");

	let lower = token.to_lowercase();
	let mixed: String = token
		.chars()
		.enumerate()
		.map(|(i, c)| if i % 2 == 1 { c.to_ascii_lowercase() } else { c })
		.collect();
	for input in [token, lower.as_str(), mixed.as_str()] {
		mock.clear_written();
		setter(device, input).unwrap();
		assert_eq!(last_line(mock), expected, "input {input:?}");
	}
}

#[test]
fn base_choices_are_validated_and_uppercased() {
	let cases: [(Setter, &str, &str); 5] = [
		(|d: &mut Device<Mock>, v: &str| d.set_output_load(v), "INF", "OUTP:LOAD INF"),
		(|d: &mut Device<Mock>, v: &str| d.set_output_load(v), "DEF", "OUTP:LOAD DEF"),
		(|d: &mut Device<Mock>, v: &str| d.set_voltage_unit(v, 1), "VRMS", "SOURCE1:VOLT:UNIT VRMS"),
		(|d: &mut Device<Mock>, v: &str| d.set_voltage_unit(v, 2), "DBM", "SOURCE2:VOLT:UNIT DBM"),
		(|d: &mut Device<Mock>, v: &str| d.set_function(v, 1), "SQUARE", "SOURCE1:FUNC SQUARE"),
	];
	let (mut device, mock) = open("AFG2012");
	for (setter, token, expected) in cases {
		check_choice(&mut device, &mock, setter, token, expected);
	}
}

#[test]
fn extended_choices_are_validated_and_uppercased() {
	let cases: [(Setter, &str, &str); 8] = [
		(|d: &mut Device<Mock>, v: &str| d.extended().unwrap().set_am_source(v, 1), "EXT", "SOURCE1:AM:SOUR EXT"),
		(|d: &mut Device<Mock>, v: &str| d.extended().unwrap().set_am_shape(v, 1), "RAMP", "SOURCE1:AM:INT:FUNC RAMP"),
		(|d: &mut Device<Mock>, v: &str| d.extended().unwrap().set_fm_source(v, 1), "INT", "SOURCE1:FM:SOUR INT"),
		(|d: &mut Device<Mock>, v: &str| d.extended().unwrap().set_fm_shape(v, 1), "SIN", "SOURCE1:FM:INT:FUNC SIN"),
		(|d: &mut Device<Mock>, v: &str| d.extended().unwrap().set_fsk_source(v, 1), "EXT", "SOURCE1:FSK:SOUR EXT"),
		(|d: &mut Device<Mock>, v: &str| d.extended().unwrap().set_sweep_source(v, 1), "INT", "SOURCE1:SWE:SOUR INT"),
		(|d: &mut Device<Mock>, v: &str| d.extended().unwrap().set_sweep_spacing(v, 1), "LOG", "SOURCE1:SWE:SPAC LOG"),
		(|d: &mut Device<Mock>, v: &str| d.extended().unwrap().set_sweep_spacing(v, 2), "LIN", "SOURCE2:SWE:SPAC LIN"),
	];
	let (mut device, mock) = open("AFG2125");
	for (setter, token, expected) in cases {
		check_choice(&mut device, &mock, setter, token, expected);
	}
}

#[test]
fn numeric_parameters() {
	let (mut device, mock) = open("AFG2025");
	device.set_frequency(Value::Max, 2).unwrap();
	device.set_amplitude(2.5, 1).unwrap();
	device.set_offset(-0.75, 1).unwrap();
	device.set_duty_cycle(25, 1).unwrap();
	device.set_ramp_symmetry(Value::Min, 1).unwrap();
	device.set_frequency("max".parse::<Value>().unwrap(), 1).unwrap();
	// Frequencies outside of the model's range are still sent.
	device.set_frequency(1e9, 1).unwrap();
	assert_eq!(
		mock.written_lines(),
		vec![
			"SOURCE2:FREQ MAX",
			"SOURCE1:AMPL 2.5",
			"SOURCE1:DCO -0.75",
			"SOURCE1:SQUARE:DCYCLE 25",
			"SOURCE1:RAMP:SYMM MIN",
			"SOURCE1:FREQ MAX",
			"SOURCE1:FREQ 1000000000",
		]
	);
}

#[test]
fn output_commands() {
	let (mut device, mock) = open("AFG2005");
	device.set_output_enabled(true).unwrap();
	device.set_output_enabled(false).unwrap();
	device.set_output_load_50ohm().unwrap();
	device.set_output_load_high().unwrap();
	device.set_voltage_unit_vpp(1).unwrap();
	device.set_voltage_unit_vrms(1).unwrap();
	device.set_voltage_unit_dbm(1).unwrap();
	assert_eq!(
		mock.written_lines(),
		vec![
			"OUTP ON",
			"OUTP OFF",
			"OUTP:LOAD DEF",
			"OUTP:LOAD INF",
			"SOURCE1:VOLT:UNIT VPP",
			"SOURCE1:VOLT:UNIT VRMS",
			"SOURCE1:VOLT:UNIT DBM",
		]
	);
}

#[test]
fn getters_return_the_first_trimmed_line() {
	let (mut device, mock) = open("AFG2125");
	mock.set_responder(|line| match line {
		"SOURCE1:FREQ?" => Some(b"\r\n  +1.0000000000000E+03 \r\n".to_vec()),
		"OUTP:LOAD?" => Some(b"INF\r\n".to_vec()),
		"SOURCE1:APPLY?" => Some(b"SIN +1.000E+03,+1.000E+00,+0.000E+00\r\n".to_vec()),
		_ => None,
	});
	assert_eq!(device.frequency(1).unwrap().as_deref(), Some("+1.0000000000000E+03"));
	assert_eq!(device.output_load().unwrap().as_deref(), Some("INF"));
	assert_eq!(
		device.get_apply(1).unwrap().as_deref(),
		Some("SIN +1.000E+03,+1.000E+00,+0.000E+00")
	);
	// No answer within the timeout reads as nothing.
	assert_eq!(device.amplitude(1).unwrap(), None);
	assert_eq!(device.system_error().unwrap(), None);
	assert_eq!(
		mock.written_lines(),
		vec![
			"SOURCE1:FREQ?",
			"OUTP:LOAD?",
			"SOURCE1:APPLY?",
			"SOURCE1:AMPL?",
			"SYST:ERR?",
		]
	);
}

#[test]
fn system_commands() {
	let (mut device, mock) = open("AFG2112");
	mock.set_responder(|line| {
		(line == "*idn?").then(|| b"GW INSTEK,AFG-2112,SN:EN000001,V1.10\r\n".to_vec())
	});
	let response = device.identify().unwrap();
	assert_eq!(response.first(), Some("GW INSTEK,AFG-2112,SN:EN000001,V1.10"));
	assert!(device.reset().unwrap().is_empty());
	assert!(device.clear().unwrap().is_empty());
	device.system_version().unwrap();
	device.msg("SOURCE1:FREQ 50").unwrap();
	assert_eq!(
		mock.written_lines(),
		vec!["*idn?", "*rst", "*rst", "SYST:VERS?", "SOURCE1:FREQ 50"]
	);
}

#[test]
fn save_and_recall_registers() {
	let (mut device, mock) = open("AFG2005");
	device.save(19).unwrap();
	device.recall(19).unwrap();
	device.save(0).unwrap();
	assert_eq!(mock.written_lines(), vec!["*SAV 19", "*RCL 19", "*SAV 0"]);

	mock.clear_written();
	for result in [device.save(20), device.recall(20), device.recall(255)] {
		match result {
			Err(Error::InvalidParameter(e)) => assert_eq!(e.parameter(), "register"),
			other => panic!("unexpected result {other:?}"),
		}
	}
	assert!(mock.written().is_empty());
}

#[test]
fn load_arbitrary_waveform() {
	let (mut device, mock) = open("AFG2025");
	device.load_arbitrary(&[0, 511, 0, -511]).unwrap();
	assert_eq!(last_line(&mock), "DATA:DAC VOLATILE, 0, 0,511,0,-511");

	mock.clear_written();
	assert!(matches!(device.load_arbitrary(&[]), Err(Error::InvalidParameter(_))));
	assert!(mock.written().is_empty());
}

#[test]
fn nothing_is_read_when_not_capturing() {
	let (mut device, mock) = open("AFG2125");
	mock.set_responder(|_| Some(b"ignored\r\n".to_vec()));
	device.set_capture(false).unwrap();
	assert!(!device.capture().unwrap());

	assert!(device.apply_sine(100, 1, 0, 1).unwrap().is_empty());
	assert_eq!(device.frequency(1).unwrap(), None);
	assert!(device.msg("*idn?").unwrap().is_empty());
	assert!(device.extended().unwrap().set_am_enabled(true, 1).unwrap().is_empty());
	assert_eq!(mock.read_count(), 0);
	assert_eq!(mock.written_lines().len(), 4);
}

#[test]
fn capture_guard_restores_the_previous_mode() {
	let (mut device, mock) = open("AFG2012");
	{
		let mut quiet = device.capture_guard(false).unwrap();
		assert!(!quiet.capture().unwrap());
		quiet.set_frequency(1000, 1).unwrap();
		{
			let loud = quiet.capture_guard(true).unwrap();
			assert!(loud.capture().unwrap());
		}
		assert!(!quiet.capture().unwrap());
	}
	assert!(device.capture().unwrap());
	assert_eq!(mock.read_count(), 0);
}

#[test]
fn poisoned_device_reports_once() {
	let (mut device, mock) = open("AFG2012");
	device.poison(io::Error::new(io::ErrorKind::Other, "failed to turn capture on again"));
	match device.reset().unwrap_err() {
		Error::Io(e) => assert_eq!(e.kind(), io::ErrorKind::Other),
		other => panic!("unexpected error {other:?}"),
	}
	assert!(mock.written().is_empty());
	device.reset().unwrap();
	assert_eq!(mock.written_lines(), vec!["*rst"]);
}

#[test]
fn extended_commands_depend_on_tier() {
	for model in &CATALOG {
		let (mut device, _mock) = open(model.name);
		assert_eq!(device.extended().is_some(), model.tier == Tier::Extended);
	}
}

#[test]
fn extended_commands() {
	let (mut device, mock) = open("AFG2105");
	let mut extended = device.extended().unwrap();
	extended.set_am_enabled(true, 1).unwrap();
	extended.set_am_frequency(100, 1).unwrap();
	extended.set_am_depth(80, 1).unwrap();
	extended.set_fm_enabled(false, 1).unwrap();
	extended.set_fm_frequency(Value::Max, 1).unwrap();
	extended.set_fm_deviation(500, 1).unwrap();
	extended.set_fsk_enabled(true, 1).unwrap();
	extended.set_fsk_frequency(2000, 1).unwrap();
	extended.set_fsk_rate(10, 1).unwrap();
	extended.set_sweep_enabled(true, 1).unwrap();
	extended.set_sweep_start(100, 1).unwrap();
	extended.set_sweep_stop(10_000, 1).unwrap();
	extended.set_sweep_time(2.5, 1).unwrap();
	extended.set_counter_enabled(true).unwrap();
	extended.set_counter_gate(0.1).unwrap();
	extended.counter_value().unwrap();
	extended.am_depth(1).unwrap();
	extended.sweep_spacing(1).unwrap();
	assert_eq!(
		mock.written_lines(),
		vec![
			"SOURCE1:AM:STAT ON",
			"SOURCE1:AM:INT:FREQ 100",
			"SOURCE1:AM:DEPT 80",
			"SOURCE1:FM:STAT OFF",
			"SOURCE1:FM:INT:FREQ MAX",
			"SOURCE1:FM:DEV 500",
			"SOURCE1:FSK:STAT ON",
			"SOURCE1:FSK:FREQ 2000",
			"SOURCE1:FSK:INT:RATE 10",
			"SOURCE1:SWE:STAT ON",
			"SOURCE1:FREQ:STAR 100",
			"SOURCE1:FREQ:STOP 10000",
			"SOURCE1:SWE:TIME 2.5",
			"COUN:STAT ON",
			"COUN:GAT 0.1",
			"COUN:VAL?",
			"SOURCE1:AM:DEPT?",
			"SOURCE1:SWE:SPAC?",
		]
	);
}

#[test]
fn extended_commands_address_the_given_channel() {
	let (mut device, mock) = open("AFG2125");
	let mut extended = device.extended().unwrap();
	extended.set_am_enabled(true, 2).unwrap();
	extended.set_fm_shape("square", 2).unwrap();
	extended.set_fsk_source("int", 2).unwrap();
	extended.set_sweep_stop(Value::Max, 2).unwrap();
	extended.fm_deviation(2).unwrap();
	extended.sweep_enabled(2).unwrap();
	assert_eq!(
		mock.written_lines(),
		vec![
			"SOURCE2:AM:STAT ON",
			"SOURCE2:FM:INT:FUNC SQUARE",
			"SOURCE2:FSK:SOUR INT",
			"SOURCE2:FREQ:STOP MAX",
			"SOURCE2:FM:DEV?",
			"SOURCE2:SWE:STAT?",
		]
	);
}

#[test]
fn non_finite_numbers_are_rejected_before_sending() {
	let (mut device, mock) = open("AFG2112");
	let parameter = |err: Error| InvalidParameterError::try_from(err).unwrap().parameter();
	assert_eq!(parameter(device.set_frequency(f64::NAN, 1).unwrap_err()), "frequency");
	assert_eq!(parameter(device.apply_sine(1000, f64::INFINITY, 0, 1).unwrap_err()), "amplitude");
	assert_eq!(parameter(device.set_offset(f64::NEG_INFINITY, 1).unwrap_err()), "offset");
	let mut extended = device.extended().unwrap();
	assert_eq!(parameter(extended.set_am_depth(f64::NAN, 1).unwrap_err()), "depth");
	assert_eq!(parameter(extended.set_counter_gate(f64::INFINITY).unwrap_err()), "seconds");
	assert!(mock.written().is_empty());
}

#[test]
fn metadata() {
	let (device, _mock) = open("AFG2125");
	assert_eq!(device.info(), "AFG2125");
	assert_eq!(device.model().identifier, "AFG-2125");
	assert_eq!(device.tier(), Tier::Extended);
	let sine = device.frequency_range(Shape::Sine).unwrap();
	assert_eq!(sine.max, 25e6);
	assert!(device.frequency_range(Shape::Ramp).unwrap().max < sine.max);
}

#[test]
fn close_releases_the_session() {
	let mock = Mock::new();
	let device = Device::new(Session::open(mock.clone()).unwrap(), model("AFG2005"));
	device.close();
	assert_eq!(mock.dropped(), 1);
}

#[test]
fn drained_device_still_answers_queries() {
	let mock = Mock::new();
	let mut device = Device::new(Session::open(mock.clone()).unwrap(), model("AFG2125"));
	mock.set_responder(|line| (line == "OUTP?").then(|| b"ON\r\n".to_vec()));

	{
		let mut quiet = device.capture_guard(false).unwrap();
		for step in 0..20 {
			quiet.set_frequency(step * 100, 1).unwrap();
			mock.append_line("unsolicited");
		}
		let start = std::time::Instant::now();
		while mock.pending() > 0 {
			assert!(start.elapsed() < std::time::Duration::from_secs(5));
			std::thread::sleep(std::time::Duration::from_millis(1));
		}
	}
	assert_eq!(device.output_enabled().unwrap().as_deref(), Some("ON"));
}
