//! Reader for Tomb Raider level files, TR1 through TR5.
//!
//! [`load`] detects the generation from the leading version word and the file
//! extension, then reads every section into an owned [`Level`]. Anomalies that
//! shipped files are known to contain are collected in `Level::diagnostics`
//! rather than failing the load.

extern crate self as tr_level;

pub mod convert;
pub mod cursor;
pub mod decoder;
pub mod detect;
pub mod diagnostics;
pub mod error;
mod loader;
pub mod model;
pub mod read;
pub mod resolve;
pub mod version;

use std::{fs::{self, File}, io::{BufReader, Cursor, Read, Seek}, path::Path};
use log::{debug, info};

pub use cursor::{ByteCursor, OwnedCursor, SliceCursor};
pub use detect::{detect, detect_stream};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{Error, Result};
pub use model::Level;
pub use read::Readable;
pub use tr_derive::Readable;
pub use version::{Game, Generation};

/// Sample bank shipped beside TR2 and TR3 levels.
const SAMPLE_BANK_NAMES: [&str; 2] = ["MAIN.SFX", "main.sfx"];

#[derive(Clone, Debug)]
pub struct LoadOptions {
	/// Decode texture pages into `Level::textures`. When off, page bytes are skipped.
	pub convert_textures: bool,
	/// TR2/TR3 keep their samples in a separate file.
	pub sample_bank: Option<Box<[u8]>>,
	/// Replaces the detected game. Demo and gold releases share their magic
	/// with the retail files, so only the caller can tell them apart.
	pub game: Option<Game>,
}

impl Default for LoadOptions {
	fn default() -> Self {
		LoadOptions { convert_textures: true, sample_bank: None, game: None }
	}
}

pub fn load(bytes: &[u8], extension: &str) -> Result<Level> {
	load_with(bytes, extension, &LoadOptions::default())
}

pub fn load_with(bytes: &[u8], extension: &str, options: &LoadOptions) -> Result<Level> {
	load_reader(Cursor::new(bytes), extension, options)
}

/// Loads from any seekable source. `extension` may carry a leading dot.
pub fn load_reader<R: Read + Seek>(reader: R, extension: &str, options: &LoadOptions) -> Result<Level> {
	let mut cursor = ByteCursor::new(reader)?;
	let (detected, magic) = detect_stream(&mut cursor, extension)?;
	let game = options.game.unwrap_or(detected);
	if game != detected {
		debug!("detected {:?}, loading as {:?}", detected, game);
	}
	let generation = game.generation().ok_or_else(|| Error::UnknownFormat {
		magic,
		extension: extension.to_owned(),
	})?;
	info!("loading {:?} level, {} bytes", game, cursor.len());
	let loader = loader::Loader::new(game, generation, options);
	let level = match generation {
		Generation::Tr1 => loader::load_tr1(loader, &mut cursor)?,
		Generation::Tr2 => loader::load_tr2(loader, &mut cursor)?,
		Generation::Tr3 => loader::load_tr3(loader, &mut cursor)?,
		Generation::Tr4 => loader::load_tr4(loader, &mut cursor)?,
		Generation::Tr5 => loader::load_tr5(loader, &mut cursor)?,
	};
	info!("loaded {} rooms, {} diagnostics", level.rooms.len(), level.diagnostics.len());
	Ok(level)
}

/// Loads a level file, taking the extension from the path.
/// A `MAIN.SFX` next to a `.TR2` file is used as its sample bank.
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Level> {
	let path = path.as_ref();
	let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
	let mut options = LoadOptions::default();
	if extension.eq_ignore_ascii_case("tr2") {
		let bank = SAMPLE_BANK_NAMES
			.iter()
			.map(|name| path.with_file_name(name))
			.find(|bank| bank.is_file());
		if let Some(bank) = bank {
			debug!("sample bank {}", bank.display());
			options.sample_bank = Some(fs::read(bank)?.into_boxed_slice());
		}
	}
	let reader = BufReader::new(File::open(path)?);
	load_reader(reader, extension, &options)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn assert_send_sync<T: Send + Sync>() {}

	#[test]
	fn level_is_send_and_sync() {
		assert_send_sync::<Level>();
	}

	#[test]
	fn unknown_format_is_fatal() {
		let bytes = 0x1234u32.to_le_bytes();
		match load(&bytes, "PHD") {
			Err(Error::UnknownFormat { magic, extension }) => {
				assert_eq!(magic, 0x1234);
				assert_eq!(extension, "PHD");
			},
			other => panic!("expected UnknownFormat, got {:?}", other.map(|_| ())),
		}
	}

	#[test]
	fn short_input_fails() {
		assert!(matches!(load(&[0x20, 0], "PHD"), Err(Error::UnexpectedEnd { .. })));
	}
}
