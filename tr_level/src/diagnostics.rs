//! Advisory anomalies found while reading. These never abort a load.

use std::fmt;
use log::warn;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
	/// A filler or sentinel did not hold any of its documented values.
	UnexpectedValue { field: &'static str, expected: &'static [u32], found: u32 },
	/// A count went past what shipped files contain.
	ExceedsTypical { field: &'static str, value: u32, max: u32 },
	/// An index pointed outside the table it refers to.
	OutOfRange { field: &'static str, value: u32, len: usize },
	/// Two counts describing the same data disagree.
	CountMismatch { field: &'static str, declared: u32, found: u32 },
	/// Bytes left over after the last section.
	TrailingData { bytes: u64 },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
	/// Byte position in the cursor that was active when the anomaly was found.
	pub position: u64,
	pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "at byte {}: ", self.position)?;
		match &self.kind {
			DiagnosticKind::UnexpectedValue { field, expected, found } => {
				write!(f, "{}: expected ", field)?;
				for (i, value) in expected.iter().enumerate() {
					if i > 0 {
						f.write_str(" or ")?;
					}
					write!(f, "{:#X}", value)?;
				}
				write!(f, ", found {:#X}", found)
			},
			DiagnosticKind::ExceedsTypical { field, value, max } => {
				write!(f, "{} is {}, more than the usual maximum of {}", field, value, max)
			},
			DiagnosticKind::OutOfRange { field, value, len } => {
				write!(f, "{} {} is out of range (len {})", field, value, len)
			},
			DiagnosticKind::CountMismatch { field, declared, found } => {
				write!(f, "{}: declared {}, found {}", field, declared, found)
			},
			DiagnosticKind::TrailingData { bytes } => {
				write!(f, "{} bytes of data after end of level", bytes)
			},
		}
	}
}

/// Collects diagnostics for one load and mirrors each to the log.
#[derive(Debug, Default)]
pub struct Diagnostics {
	entries: Vec<Diagnostic>,
}

impl Diagnostics {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, position: u64, kind: DiagnosticKind) {
		let diagnostic = Diagnostic { position, kind };
		warn!("{}", diagnostic);
		self.entries.push(diagnostic);
	}

	/// Records an `UnexpectedValue` unless `found` is one of `expected`.
	pub fn expect(&mut self, position: u64, field: &'static str, expected: &'static [u32], found: u32) {
		if !expected.contains(&found) {
			self.push(position, DiagnosticKind::UnexpectedValue { field, expected, found });
		}
	}

	/// Records an `ExceedsTypical` when `value > max`.
	pub fn check_max(&mut self, position: u64, field: &'static str, value: u32, max: u32) {
		if value > max {
			self.push(position, DiagnosticKind::ExceedsTypical { field, value, max });
		}
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
		self.entries.iter()
	}

	pub fn into_boxed_slice(self) -> Box<[Diagnostic]> {
		self.entries.into_boxed_slice()
	}
}
