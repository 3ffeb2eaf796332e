//! A "scope guard" that will restore a device's capture mode when it goes out of scope.

use crate::{backend::Backend, device::Device, error::Error};
use std::io;

/// A "scope guard" that will update the device's capture mode and then
/// restore it when it goes out of scope.
///
/// To create a guard, use the device's [`capture_guard`](Device::capture_guard) method.
///
/// While the guard is in scope, the device can only be accessed through the guard.
/// However, because the guard implements [`Deref`](std::ops::Deref) and
/// [`DerefMut`](std::ops::DerefMut) callers can treat the guard as the device.
#[derive(Debug)]
pub struct CaptureGuard<'a, B: Backend> {
	/// The underlying device.
	device: &'a mut Device<B>,
	/// The original capture mode that will be restored when the guard is dropped.
	original: bool,
}

impl<'a, B: Backend> CaptureGuard<'a, B> {
	/// Update the device's capture mode and return a [`CaptureGuard`] wrapping the device.
	pub(crate) fn new(device: &'a mut Device<B>, capture: bool) -> Result<Self, Error> {
		let original = device.capture()?;
		device.set_capture(capture)?;
		Ok(CaptureGuard { device, original })
	}
}

impl<'a, B: Backend> std::ops::Deref for CaptureGuard<'a, B> {
	type Target = Device<B>;
	/// Get a shared reference to the underlying device.
	fn deref(&self) -> &Self::Target {
		self.device
	}
}

impl<'a, B: Backend> std::ops::DerefMut for CaptureGuard<'a, B> {
	/// Get an exclusive reference to the underlying device.
	fn deref_mut(&mut self) -> &mut Self::Target {
		self.device
	}
}

impl<'a, B: Backend> std::ops::Drop for CaptureGuard<'a, B> {
	fn drop(&mut self) {
		if let Err(err) = self.device.set_capture(self.original) {
			self.device.poison(io::Error::new(
				io::ErrorKind::Other,
				format!(
					"failed to turn capture {} again: {}",
					if self.original { "on" } else { "off" },
					err
				),
			));
		}
	}
}
