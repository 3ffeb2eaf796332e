//! Error types.
//!
//! Each error is represented by a unique type that implements [`std::error::Error`].
//! Most APIs return the higher level [`Error`] enum, which every error type is
//! convertible into, allowing them to be used with `?`:
//!
//! ```
//! use afgctl::error::{Error, InvalidParameterError};
//!
//! fn foo() -> Result<(), InvalidParameterError> {
//!     // ...
//! # unimplemented!();
//! }
//!
//! fn bar() -> Result<(), Error> {
//!     foo()?;
//!     // ...
//! # Ok(())
//! }
//! ```
//!
//! A failed read or write on the transport is reported as either
//! [`Error::Io`] or [`Error::SerialDeviceInUseOrDisconnected`]. Use
//! [`Error::is_transport`] to treat them uniformly. Nothing in this crate
//! retries on failure.

/// Implement Error and Display traits for the specified type.
///
/// After the type define the format string and any arguments it should
/// reference after `self =>` (to abide by macro hygiene rules).
macro_rules! impl_error_display {
    (
        $name:path,
        $self:ident =>
        $display:literal
        $(,
            $($arg:expr),+
        )?
    ) => {
        impl std::error::Error for $name {}

        impl std::fmt::Display for $name {
            fn fmt(&$self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(
                    f,
                    $display
                    $(,
                        $($arg),+
                    )?
                )
            }
        }
    };
}

/// Define error enums that contain concrete error types (not other error enums).
///
/// From and TryFrom traits will be implemented for the enum and it's underlying
/// errors. The enum's Display implementation will defer to the underlying errors'
/// Display implementations.
///
/// ```compile_fail
/// # // This fails to compile because the macro is not exported.
/// error_enum!{
///     #[non_exhaustive]
///     pub enum ThisError {
///         VariantA(A),
///         VariantB(B),
///     }
/// }
/// ```
macro_rules! error_enum {
    (
        $(#[$attr:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_attr:meta])*
                $variant:ident($inner:path)
            ),+
            $(,)?
        }
    ) => {
        $(
            #[$attr]
        )*
        pub enum $name {
            $(
                $(#[$variant_attr])*
                $variant($inner)
            ),+
        }

        impl std::error::Error for $name {
            fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
                match self {
                    $(
                        $name::$variant(e) => Some(e)
                    ),+
                }
            }
        }

        // Defer the display to the inner error type
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        $name::$variant(e) => e.fmt(f)
                    ),+
                }
            }
        }

        // Allow the enum to be convertible from an infallible error
        impl From<std::convert::Infallible> for $name {
            fn from(_: std::convert::Infallible) -> Self {
                unreachable!();
            }
        }

        // Conversions with underlying errors
        $(
            impl From<$inner> for $name {
                fn from(other: $inner) -> Self {
                    $name::$variant(other)
                }
            }

            impl TryFrom<$name> for $inner {
                type Error = $name;
                fn try_from(other: $name) -> Result<Self, Self::Error> {
                    match other {
                        $name::$variant(value) => Ok(value),
                        #[allow(unreachable_patterns)]
                        value => Err(value)
                    }
                }
            }
        )+
    };
}

error_enum! {
    /// Any error returned by this library.
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum Error {
        /// The identification string did not match any known model.
        DeviceNotRecognized(DeviceNotRecognizedError),
        /// An argument was rejected before anything was transmitted.
        InvalidParameter(InvalidParameterError),
        /// The serial device could not be opened.
        SerialDeviceInUseOrDisconnected(SerialDeviceInUseOrDisconnectedError),
        /// Reading from or writing to the transport failed.
        Io(std::io::Error),
    }
}

impl Error {
    /// A convenience function for determining if the error came from the
    /// transport rather than from this library's own checks.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Io(_) | Error::SerialDeviceInUseOrDisconnected(_)
        )
    }
}

impl From<serialport::Error> for Error {
    fn from(other: serialport::Error) -> Self {
        use std::io;

        match other.kind() {
            serialport::ErrorKind::NoDevice => Error::SerialDeviceInUseOrDisconnected(
                SerialDeviceInUseOrDisconnectedError(other.description.into_boxed_str()),
            ),
            serialport::ErrorKind::InvalidInput => Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                other.description,
            )),
            serialport::ErrorKind::Unknown => {
                Error::Io(io::Error::new(io::ErrorKind::Other, other.description))
            }
            serialport::ErrorKind::Io(kind) => Error::Io(io::Error::new(kind, other.description)),
        }
    }
}

/// The specified device is either disconnected or already in use by another process.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SerialDeviceInUseOrDisconnectedError(Box<str>);

impl_error_display! {
    SerialDeviceInUseOrDisconnectedError,
    self =>
    "the specified device is either disconnected or already in use by another process: {}", self.0
}

/// The identification string reported by the device matched no known model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceNotRecognizedError(Box<str>);

impl DeviceNotRecognizedError {
    /// Create an instance of the error.
    pub(crate) fn new<S: AsRef<str>>(identification: S) -> Self {
        DeviceNotRecognizedError(Box::from(identification.as_ref()))
    }

    /// Get the raw identification text the device returned.
    pub fn identification(&self) -> &str {
        &self.0
    }
}

impl_error_display! {
    DeviceNotRecognizedError,
    self =>
    "device not recognized: {:?}", self.0
}

/// An argument was outside of the values the command accepts.
///
/// The command was not transmitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InvalidParameterError {
    /// The name of the parameter.
    parameter: &'static str,
    /// The rejected value, as the caller supplied it.
    value: Box<str>,
    /// A human readable description of what is accepted.
    allowed: Box<str>,
}

impl InvalidParameterError {
    /// Create an instance of the error.
    pub(crate) fn new<V: ToString, A: ToString>(parameter: &'static str, value: V, allowed: A) -> Self {
        InvalidParameterError {
            parameter,
            value: value.to_string().into_boxed_str(),
            allowed: allowed.to_string().into_boxed_str(),
        }
    }

    /// Create an instance of the error for a value that is not one of `choices`.
    pub(crate) fn not_one_of<V: ToString>(
        parameter: &'static str,
        value: V,
        choices: &[&str],
    ) -> Self {
        InvalidParameterError::new(parameter, value, format!("one of {}", choices.join(", ")))
    }

    /// Get the name of the offending parameter.
    pub fn parameter(&self) -> &'static str {
        self.parameter
    }

    /// Get the rejected value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Get a description of the accepted values.
    pub fn allowed(&self) -> &str {
        &self.allowed
    }
}

impl_error_display! {
    InvalidParameterError,
    self =>
    "invalid {} {:?}: expected {}", self.parameter, self.value, self.allowed
}
