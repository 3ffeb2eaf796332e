//! Identifying the model attached at an address.

use crate::{
	backend::{Connector, Serial, SerialConnector},
	device::{Device, IDENTIFY},
	error::{DeviceNotRecognizedError, Error},
	model::Model,
	session::Session,
};

/// Identify the function generator at `address` and open a [`Device`] for it.
///
/// Two connections are made through `connector`. The first is only used to
/// ask the device who it is and is always closed before this returns,
/// whatever the outcome. The second is kept by the returned device and has
/// a background thread draining unwanted responses.
///
/// If the identification matches no [known model](crate::model::CATALOG),
/// a [`DeviceNotRecognized`](Error::DeviceNotRecognized) error carrying the
/// raw identification text is returned.
pub fn resolve<C: Connector + ?Sized>(
	connector: &C,
	address: &str,
) -> Result<Device<C::Backend>, Error> {
	let model = identify(connector, address)?;
	let session = Session::open(connector.connect(address)?)?;
	Ok(Device::new(session, model))
}

/// Identify the serial device at `path` and open a [`Device`] for it.
///
/// This is a shortcut for [`resolve`] with a [`SerialConnector`].
pub fn open_serial(path: &str) -> Result<Device<Serial>, Error> {
	resolve(&SerialConnector, path)
}

/// Ask the device at `address` who it is, over a short lived session.
fn identify<C: Connector + ?Sized>(connector: &C, address: &str) -> Result<&'static Model, Error> {
	let mut session = Session::open_without_drain(connector.connect(address)?)?;
	let response = session.send(IDENTIFY);
	session.close();

	let identification = response?.lines().join("\n");
	let identification = identification.trim();
	match Model::lookup(identification) {
		Some(model) => {
			log::debug!("identified {} from {:?}", model.name, identification);
			Ok(model)
		}
		None => Err(DeviceNotRecognizedError::new(identification).into()),
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::{backend::Mock, model::CATALOG};

	/// A mock that answers the identification query with `identification`.
	fn mock_answering(identification: &str) -> Mock {
		let mock = Mock::new();
		let reply = format!("{identification}\r\n").into_bytes();
		mock.set_responder(move |line| (line == IDENTIFY).then(|| reply.clone()));
		mock
	}

	#[test]
	fn every_model_resolves() {
		for model in &CATALOG {
			let mock = mock_answering(&format!(
				"GW INSTEK,{},SN:EN811111,V1.00",
				model.identifier
			));
			let connector = |_: &str| Ok::<_, Error>(mock.clone());
			let device = resolve(&connector, "mock").unwrap();
			assert_eq!(device.info(), model.name);
			assert_eq!(device.tier(), model.tier);
			// The identification session is closed, the device's is not.
			assert_eq!(mock.dropped(), 1);
			device.close();
			assert_eq!(mock.dropped(), 2);
		}
	}

	#[test]
	fn identification_substring_is_enough() {
		let mock = mock_answering("AFG-2112");
		let device = resolve(&|_: &str| Ok::<_, Error>(mock.clone()), "mock").unwrap();
		assert_eq!(device.info(), "AFG2112");
		assert_eq!(mock.written_lines(), vec![IDENTIFY]);
	}

	#[test]
	fn unknown_device_is_not_recognized() {
		let mock = mock_answering("RIGOL TECHNOLOGIES,DG1022Z,DG1ZA000000001,00.03.00");
		let err = resolve(&|_: &str| Ok::<_, Error>(mock.clone()), "mock").unwrap_err();
		match err {
			Error::DeviceNotRecognized(e) => assert_eq!(
				e.identification(),
				"RIGOL TECHNOLOGIES,DG1022Z,DG1ZA000000001,00.03.00"
			),
			other => panic!("unexpected error {other:?}"),
		}
		// Only the identification session was opened, and it was closed exactly once.
		assert_eq!(mock.dropped(), 1);
	}

	#[test]
	fn silent_device_is_not_recognized() {
		let mock = Mock::new();
		let err = resolve(&|_: &str| Ok::<_, Error>(mock.clone()), "mock").unwrap_err();
		assert!(matches!(err, Error::DeviceNotRecognized(ref e) if e.identification().is_empty()));
		assert_eq!(mock.dropped(), 1);
	}

	#[test]
	fn transport_failure_closes_the_identification_session() {
		let mock = Mock::new();
		mock.disconnect();
		let err = resolve(&|_: &str| Ok::<_, Error>(mock.clone()), "mock").unwrap_err();
		assert!(err.is_transport());
		assert_eq!(mock.dropped(), 1);
	}

	#[test]
	fn connect_failure_is_reported() {
		let connector = |address: &str| -> Result<Mock, Error> {
			Err(std::io::Error::new(std::io::ErrorKind::NotFound, address.to_string()).into())
		};
		let err = resolve(&connector, "/dev/nothing").unwrap_err();
		assert!(err.is_transport());
	}
}
