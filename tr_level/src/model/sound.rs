use std::io::{Read, Seek};
use crate::{ByteCursor, Diagnostics, Generation, Readable, Result};

const DEFAULT_RANGE: u16 = 8;
const DEFAULT_PITCH: i16 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopType {
	None,
	Forward,
	PingPong,
	Wait,
}

/// Playback parameters for one sound effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SoundDetails {
	/// Index into `Level.sample_indices`, or a sample number once remapped.
	pub sample: u16,
	pub volume: u16,
	pub range: u16,
	pub chance: u16,
	pub pitch: i16,
	pub flags: u16,
}

impl SoundDetails {
	pub fn loop_type(&self, generation: Generation) -> LoopType {
		match (self.flags & 3, generation) {
			(1, Generation::Tr1 | Generation::Tr2) => LoopType::PingPong,
			(1, Generation::Tr3 | Generation::Tr4 | Generation::Tr5) => LoopType::Wait,
			(2, Generation::Tr1) => LoopType::Forward,
			(2, Generation::Tr2 | Generation::Tr3 | Generation::Tr4 | Generation::Tr5) => LoopType::PingPong,
			(3, Generation::Tr3 | Generation::Tr4 | Generation::Tr5) => LoopType::Forward,
			_ => LoopType::None,
		}
	}

	/// Number of consecutive samples to pick from.
	pub fn sample_count(&self) -> u8 {
		((self.flags >> 2) & 0x0F) as u8
	}

	pub fn random_pitch(&self) -> bool {
		self.flags & 0x2000 != 0
	}

	pub fn random_volume(&self) -> bool {
		self.flags & 0x4000 != 0
	}
}

impl Readable for SoundDetails {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, generation: Generation, _: &mut Diagnostics) -> Result<Self> {
		let sample = cursor.read_u16()?;
		Ok(match generation {
			Generation::Tr1 | Generation::Tr2 => SoundDetails {
				sample,
				volume: cursor.read_u16()?,
				chance: cursor.read_u16()?,
				flags: cursor.read_u16()?,
				range: DEFAULT_RANGE,
				pitch: DEFAULT_PITCH,
			},
			Generation::Tr3 | Generation::Tr4 | Generation::Tr5 => SoundDetails {
				sample,
				volume: cursor.read_u8()? as u16,
				range: cursor.read_u8()? as u16,
				chance: cursor.read_u8()? as u16,
				pitch: cursor.read_u8()? as i16,
				flags: cursor.read_u16()?,
			},
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tr1_layout_uses_defaults() {
		let bytes = [3, 0, 0xFF, 0x7F, 0, 0, 0x02, 0x60];
		let mut cursor = ByteCursor::from_slice(&bytes);
		let details = SoundDetails::read(&mut cursor, Generation::Tr1, &mut Diagnostics::new()).unwrap();
		assert_eq!(details.sample, 3);
		assert_eq!(details.volume, 0x7FFF);
		assert_eq!(details.range, 8);
		assert_eq!(details.pitch, 1);
		assert_eq!(details.loop_type(Generation::Tr1), LoopType::Forward);
		assert!(details.random_pitch());
		assert!(details.random_volume());
	}

	#[test]
	fn tr3_layout_is_packed() {
		let bytes = [1, 0, 100, 10, 50, 200, 0x0D, 0];
		let mut cursor = ByteCursor::from_slice(&bytes);
		let details = SoundDetails::read(&mut cursor, Generation::Tr3, &mut Diagnostics::new()).unwrap();
		assert_eq!((details.volume, details.range, details.chance, details.pitch), (100, 10, 50, 200));
		assert_eq!(details.sample_count(), 3);
		assert_eq!(details.loop_type(Generation::Tr3), LoopType::Wait);
		assert_eq!(cursor.remaining(), 0);
	}

	#[test]
	fn loop_types_per_generation() {
		let details = |flags| SoundDetails { sample: 0, volume: 0, range: 0, chance: 0, pitch: 0, flags };
		assert_eq!(details(1).loop_type(Generation::Tr2), LoopType::PingPong);
		assert_eq!(details(2).loop_type(Generation::Tr4), LoopType::PingPong);
		assert_eq!(details(3).loop_type(Generation::Tr2), LoopType::None);
		assert_eq!(details(3).loop_type(Generation::Tr5), LoopType::Forward);
		assert_eq!(details(0).loop_type(Generation::Tr3), LoopType::None);
	}
}
