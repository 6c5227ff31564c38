use std::io::{Read, Seek};
use crate::{ByteCursor, Game, Result};

pub const TR1_VERSION: u32 = 0x00000020;
pub const TR2_VERSION: u32 = 0x0000002D;
pub const TR3_VERSIONS: [u32; 3] = [0xFF080038, 0xFF180038, TR3_VICT_VERSION];
/// VICT.TR2 holds only palettes and texture pages.
pub const TR3_VICT_VERSION: u32 = 0xFF180034;
pub const TR4_VERSIONS: [u32; 2] = [0x00345254, 0xFFFFFFF0];
pub const TR4_DEMO_VERSION: u32 = 0x63345254;
pub const TR5_VERSION: u32 = 0x00345254;

/// Classifies a level from its leading magic and file extension.
/// The extension may carry a leading dot and any case.
pub fn detect(magic: u32, extension: &str) -> Game {
	let extension = extension.trim_start_matches('.').to_ascii_uppercase();
	match (extension.as_str(), magic) {
		("PHD", TR1_VERSION) => Game::Tr1,
		("TUB", TR1_VERSION) => Game::Tr1UnfinishedBusiness,
		("TR2", TR2_VERSION) => Game::Tr2,
		("TR2", m) if TR3_VERSIONS.contains(&m) => Game::Tr3,
		("TR4", m) if TR4_VERSIONS.contains(&m) => Game::Tr4,
		("TR4", TR4_DEMO_VERSION) => Game::Tr4Demo,
		("TRC", TR5_VERSION) => Game::Tr5,
		_ => Game::Unknown,
	}
}

/// Peeks the magic and classifies. The cursor position is unchanged.
pub fn detect_stream<R: Read + Seek>(cursor: &mut ByteCursor<R>, extension: &str) -> Result<(Game, u32)> {
	let magic = cursor.peek_u32()?;
	Ok((detect(magic, extension), magic))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn phd_and_tub_share_magic() {
		assert_eq!(detect(0x20, ".PHD"), Game::Tr1);
		assert_eq!(detect(0x20, ".TUB"), Game::Tr1UnfinishedBusiness);
		assert_eq!(detect(0x20, "phd"), Game::Tr1);
	}

	#[test]
	fn tr2_extension_covers_two_generations() {
		assert_eq!(detect(0x2D, ".TR2"), Game::Tr2);
		for magic in TR3_VERSIONS {
			assert_eq!(detect(magic, ".tr2"), Game::Tr3);
		}
	}

	#[test]
	fn tr4_and_tr5() {
		assert_eq!(detect(0x00345254, ".TR4"), Game::Tr4);
		assert_eq!(detect(0xFFFFFFF0, ".TR4"), Game::Tr4);
		assert_eq!(detect(0x63345254, ".TR4"), Game::Tr4Demo);
		assert_eq!(detect(0x00345254, ".TRC"), Game::Tr5);
	}

	#[test]
	fn mismatches_are_unknown() {
		assert_eq!(detect(0x2D, ".PHD"), Game::Unknown);
		assert_eq!(detect(0x20, ".TR2"), Game::Unknown);
		assert_eq!(detect(0x63345254, ".TRC"), Game::Unknown);
		assert_eq!(detect(0x20, ""), Game::Unknown);
		assert_eq!(Game::Unknown.generation(), None);
	}

	#[test]
	fn stream_detection_does_not_consume() {
		let bytes = 0x2Du32.to_le_bytes();
		let mut cursor = ByteCursor::from_slice(&bytes);
		let (game, magic) = detect_stream(&mut cursor, "TR2").unwrap();
		assert_eq!(game, Game::Tr2);
		assert_eq!(magic, 0x2D);
		assert_eq!(cursor.position(), 0);
	}
}
