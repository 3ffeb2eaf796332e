//! The lines a device sends back after a command.

/// The lines read after sending a command.
///
/// A `Response` is empty when response capture was off, when the command
/// produces no output, or when the device simply did not answer within the
/// read timeout. These cases cannot be told apart from the response alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Response {
	/// The lines, without their terminators.
	lines: Vec<String>,
}

impl Response {
	/// Create a response from the lines that were read.
	pub(crate) fn new(lines: Vec<String>) -> Self {
		Response { lines }
	}

	/// A response with no lines.
	pub fn empty() -> Self {
		Response::default()
	}

	/// All of the lines, in the order they were received.
	pub fn lines(&self) -> &[String] {
		&self.lines
	}

	/// Whether no lines were received.
	pub fn is_empty(&self) -> bool {
		self.lines.is_empty()
	}

	/// The first line that is not blank, with surrounding whitespace removed.
	pub fn first(&self) -> Option<&str> {
		self.lines
			.iter()
			.map(|line| line.trim())
			.find(|line| !line.is_empty())
	}

	/// Consume the response and return [`first`](Response::first) as an owned string.
	pub fn into_first(self) -> Option<String> {
		self.first().map(str::to_string)
	}

	/// Consume the response and return all of its lines.
	pub fn into_lines(self) -> Vec<String> {
		self.lines
	}
}

impl IntoIterator for Response {
	type Item = String;
	type IntoIter = std::vec::IntoIter<String>;

	fn into_iter(self) -> Self::IntoIter {
		self.lines.into_iter()
	}
}
