//! Section readers shared by the per-generation loaders.

mod tr1;
mod tr2;
mod tr3;
mod tr4;
mod tr5;

pub(crate) use tr1::load as load_tr1;
pub(crate) use tr2::load as load_tr2;
pub(crate) use tr3::load as load_tr3;
pub(crate) use tr4::load as load_tr4;
pub(crate) use tr5::load as load_tr5;

use std::io::{Read, Seek};
use log::debug;
use num_traits::AsPrimitive;
use crate::{
	convert::{self, PAGE_AREA}, decoder::{read_block, BlockHeader}, model::*, read::{read_boxed_slice, read_list},
	resolve, ByteCursor, DiagnosticKind, Diagnostics, Error, Game, Generation, LoadOptions, Readable, Result,
};

/// Bytes in one 32-bit texture page.
const PAGE_BYTES_32: usize = PAGE_AREA * 4;

/// Raw texture pages of one pixel depth.
pub(crate) type RawPages = Box<[Box<[u8]>]>;

/// State of one load. Section helpers take the cursor explicitly since TR4 reads
/// most of its sections from a decompressed block.
pub(crate) struct Loader<'a> {
	pub generation: Generation,
	pub game: Game,
	pub options: &'a LoadOptions,
	pub diagnostics: Diagnostics,
	pub level: Level,
}

impl<'a> Loader<'a> {
	pub fn new(game: Game, generation: Generation, options: &'a LoadOptions) -> Self {
		Loader {
			generation,
			game,
			options,
			diagnostics: Diagnostics::new(),
			level: Level::empty(game, generation),
		}
	}

	/// Fails unless the leading version word is one of `accepted`.
	pub fn version<R: Read + Seek>(&mut self, cursor: &mut ByteCursor<R>, accepted: &[u32]) -> Result<u32> {
		let found = cursor.read_u32()?;
		if !accepted.contains(&found) {
			return Err(Error::WrongVersion { generation: self.generation, found });
		}
		debug!("{} version {:#010X}", self.generation, found);
		Ok(found)
	}

	/// Count-prefixed table in the active generation's layout.
	pub fn list<R, T, L>(&mut self, cursor: &mut ByteCursor<R>, what: &str) -> Result<Box<[T]>>
	where R: Read + Seek, T: Readable, L: Readable + AsPrimitive<usize> {
		let items = read_list::<R, T, L>(cursor, self.generation, &mut self.diagnostics)?;
		debug!("{}: {}", what, items.len());
		Ok(items)
	}

	pub fn record<R: Read + Seek, T: Readable>(&mut self, cursor: &mut ByteCursor<R>) -> Result<T> {
		T::read(cursor, self.generation, &mut self.diagnostics)
	}

	pub fn unused<R: Read + Seek>(&mut self, cursor: &mut ByteCursor<R>, field: &'static str) -> Result<()> {
		let at = cursor.position();
		let value = cursor.read_u32()?;
		self.diagnostics.expect(at, field, &[0], value);
		Ok(())
	}

	/// Fails when the next bytes are not `expected`.
	pub fn marker<R: Read + Seek>(&mut self, cursor: &mut ByteCursor<R>, expected: &'static [u8]) -> Result<()> {
		let found = cursor.read_bytes(expected.len())?;
		if *found != *expected {
			return Err(Error::MissingMarker { expected, found });
		}
		Ok(())
	}

	/// Reads `count` pages of `page_len` bytes, or skips them when textures are not converted.
	pub fn raw_pages<R: Read + Seek>(&mut self, cursor: &mut ByteCursor<R>, count: usize, page_len: usize) -> Result<RawPages> {
		if !self.options.convert_textures {
			cursor.skip((count * page_len) as u64)?;
			return Ok(Box::default());
		}
		cursor.read_array(count, |c| c.read_bytes(page_len))
	}

	pub fn rooms<R, L>(&mut self, cursor: &mut ByteCursor<R>) -> Result<()>
	where R: Read + Seek, L: Readable + AsPrimitive<usize> {
		self.level.rooms = self.list::<R, Room, L>(cursor, "rooms")?;
		self.level.floor_data = self.list::<R, u16, u32>(cursor, "floor data")?;
		Ok(())
	}

	pub fn meshes<R: Read + Seek>(&mut self, cursor: &mut ByteCursor<R>) -> Result<()> {
		let resolved = resolve::read_meshes(cursor, self.generation, &mut self.diagnostics)?;
		self.level.meshes = resolved.items;
		self.level.mesh_indices = resolved.indices;
		Ok(())
	}

	/// Animations through moveables, with frame offsets resolved.
	pub fn animation_tables<R: Read + Seek>(&mut self, cursor: &mut ByteCursor<R>) -> Result<()> {
		self.level.animations = self.list::<R, Animation, u32>(cursor, "animations")?;
		self.level.state_changes = self.list::<R, StateChange, u32>(cursor, "state changes")?;
		self.level.anim_dispatches = self.list::<R, AnimDispatch, u32>(cursor, "anim dispatches")?;
		self.level.anim_commands = self.list::<R, i16, u32>(cursor, "anim commands")?;
		self.level.mesh_tree_data = self.list::<R, u32, u32>(cursor, "mesh tree words")?;
		self.level.frame_data = self.list::<R, u16, u32>(cursor, "frame words")?;
		let mut moveables = self.list::<R, Moveable, u32>(cursor, "moveables")?;
		self.level.frame_offsets = resolve::resolve_frames(&mut moveables)?;
		self.level.moveables = moveables;
		Ok(())
	}

	/// TR1 stores no usable frame size, so it is derived from the mesh count in each first frame.
	pub fn derive_frame_sizes(&mut self, at: u64) {
		let frame_data = &self.level.frame_data;
		for animation in self.level.animations.iter_mut() {
			let index = animation.frame_offset as usize / 2 + FRAME_HEADER_WORDS;
			match frame_data.get(index) {
				Some(&num_meshes) => animation.frame_size = (num_meshes as u32 * 2 + 10) as u8,
				None => self.diagnostics.push(at, DiagnosticKind::OutOfRange {
					field: "animation frame offset",
					value: animation.frame_offset,
					len: frame_data.len() * 2,
				}),
			}
		}
	}

	pub fn static_meshes<R: Read + Seek>(&mut self, cursor: &mut ByteCursor<R>) -> Result<()> {
		self.level.static_meshes = self.list::<R, StaticMesh, u32>(cursor, "static meshes")?;
		Ok(())
	}

	pub fn object_textures<R: Read + Seek>(&mut self, cursor: &mut ByteCursor<R>) -> Result<()> {
		self.level.object_textures = self.list::<R, ObjectTexture, u32>(cursor, "object textures")?;
		Ok(())
	}

	pub fn sprites<R: Read + Seek>(&mut self, cursor: &mut ByteCursor<R>) -> Result<()> {
		self.sprite_textures(cursor)?;
		self.level.sprite_sequences = self.list::<R, SpriteSequence, u32>(cursor, "sprite sequences")?;
		Ok(())
	}

	pub fn sprite_textures<R: Read + Seek>(&mut self, cursor: &mut ByteCursor<R>) -> Result<()> {
		self.level.sprite_textures = self.list::<R, SpriteTexture, u32>(cursor, "sprite textures")?;
		Ok(())
	}

	/// Cameras, then flyby cameras in TR4+, then sound sources.
	pub fn cameras_and_sources<R: Read + Seek>(&mut self, cursor: &mut ByteCursor<R>) -> Result<()> {
		self.level.cameras = self.list::<R, Camera, u32>(cursor, "cameras")?;
		match self.generation {
			Generation::Tr1 | Generation::Tr2 | Generation::Tr3 => {},
			Generation::Tr4 | Generation::Tr5 => {
				self.level.flyby_cameras = self.list::<R, FlybyCamera, u32>(cursor, "flyby cameras")?;
			},
		}
		self.level.sound_sources = self.list::<R, SoundSource, u32>(cursor, "sound sources")?;
		Ok(())
	}

	/// Boxes, overlaps, one zone per box, then animated textures.
	pub fn box_data<R: Read + Seek>(&mut self, cursor: &mut ByteCursor<R>) -> Result<()> {
		self.level.boxes = self.list::<R, TrBox, u32>(cursor, "boxes")?;
		self.level.overlaps = self.list::<R, u16, u32>(cursor, "overlaps")?;
		let num_zones = self.level.boxes.len();
		self.level.zones = read_boxed_slice(cursor, num_zones, self.generation, &mut self.diagnostics)?;
		self.level.animated_textures = self.list::<R, u16, u32>(cursor, "animated texture words")?;
		Ok(())
	}

	pub fn items<R: Read + Seek>(&mut self, cursor: &mut ByteCursor<R>) -> Result<()> {
		self.level.items = self.list::<R, Item, u32>(cursor, "items")?;
		Ok(())
	}

	pub fn ai_objects<R: Read + Seek>(&mut self, cursor: &mut ByteCursor<R>) -> Result<()> {
		self.level.ai_objects = self.list::<R, AiObject, u32>(cursor, "ai objects")?;
		Ok(())
	}

	pub fn light_map<R: Read + Seek>(&mut self, cursor: &mut ByteCursor<R>) -> Result<()> {
		self.level.light_map = Some(self.record(cursor)?);
		Ok(())
	}

	/// 3-byte palette, in every generation that has one.
	pub fn palette<R: Read + Seek>(&mut self, cursor: &mut ByteCursor<R>) -> Result<()> {
		self.level.palette = Some(Palette::read(cursor, Generation::Tr1, &mut self.diagnostics)?);
		Ok(())
	}

	pub fn cinematic_frames<R: Read + Seek>(&mut self, cursor: &mut ByteCursor<R>) -> Result<()> {
		self.level.cinematic_frames = self.list::<R, CinematicFrame, u16>(cursor, "cinematic frames")?;
		Ok(())
	}

	/// Demo data, sound map, sound details, then sample indices.
	pub fn sound_tables<R: Read + Seek>(&mut self, cursor: &mut ByteCursor<R>) -> Result<()> {
		let num_demo_bytes = cursor.read_u16()?;
		self.level.demo_data = cursor.read_bytes(num_demo_bytes as usize)?;
		self.level.sound_map = cursor.read_array(self.generation.sound_map_len(), |c| c.read_i16())?;
		self.level.sound_details = self.list::<R, SoundDetails, u32>(cursor, "sound details")?;
		match self.generation {
			Generation::Tr1 => {
				let num_sample_bytes = cursor.read_u32()?;
				self.level.sample_data = cursor.read_bytes(num_sample_bytes as usize)?;
				self.level.sample_indices = self.list::<R, u32, u32>(cursor, "sample indices")?;
				self.level.samples_count = self.level.sample_indices.len() as u32;
			},
			Generation::Tr2 | Generation::Tr3 | Generation::Tr4 | Generation::Tr5 => {
				self.level.sample_indices = self.list::<R, u32, u32>(cursor, "sample indices")?;
			},
		}
		Ok(())
	}

	/// Points each sound's `sample` at the sample itself rather than its index slot.
	pub fn remap_samples(&mut self) {
		let indices = &self.level.sample_indices;
		for details in self.level.sound_details.iter_mut() {
			if let Some(&sample) = indices.get(details.sample as usize) {
				details.sample = sample as u16;
			}
		}
	}

	/// Takes samples from the external bank, if one was supplied.
	pub fn sample_bank(&mut self) {
		match &self.options.sample_bank {
			Some(bank) => {
				self.level.samples_count = count_riff_headers(bank);
				self.level.sample_data = bank.clone();
				debug!("{} samples in external bank", self.level.samples_count);
			},
			None => debug!("no sample bank, no samples loaded"),
		}
	}

	/// Sample count then the rest of the file as sample data.
	pub fn trailing_samples<R: Read + Seek>(&mut self, cursor: &mut ByteCursor<R>) -> Result<()> {
		let num_samples = cursor.read_u32()?;
		if num_samples > 0 {
			self.level.samples_count = num_samples;
			self.level.sample_data = cursor.read_bytes(cursor.remaining() as usize)?;
		}
		debug!("{} samples, {} bytes", num_samples, self.level.sample_data.len());
		Ok(())
	}

	pub fn pages_from_indexed(&mut self, pages: &[Box<[u8]>]) {
		if let Some(palette) = &self.level.palette {
			self.level.textures = pages.iter().map(|page| convert::from_indexed(palette, page)).collect();
		}
	}

	pub fn pages_from_argb16(&mut self, pages: &[Box<[u8]>]) {
		self.level.textures = pages.iter().map(|page| convert::from_argb16(page)).collect();
	}

	/// The three compressed texture blocks of TR4 and TR5.
	/// The 16-bit block is only decoded when there are no 32-bit pages.
	pub fn texture_blocks<R: Read + Seek>(&mut self, cursor: &mut ByteCursor<R>, num_misc: u32) -> Result<()> {
		let num_room = cursor.read_u16()?;
		let num_object = cursor.read_u16()?;
		let num_bump = cursor.read_u16()?;
		let num_pages = num_room as usize + num_object as usize + num_bump as usize;
		debug!("texture pages: {} room, {} object, {} bump", num_room, num_object, num_bump);
		let pages32 = self.texture_block(cursor, "32-bit textures", num_pages, PAGE_BYTES_32, true)?;
		let pages16 = self.texture_block(cursor, "16-bit textures", num_pages, PAGE_AREA * 2, pages32.is_empty())?;
		let at = cursor.position();
		let header = BlockHeader::read(cursor)?.require_data("misc textures")?;
		let num_stored = header.uncompressed_len / PAGE_BYTES_32 as u32;
		self.diagnostics.check_max(at, "misc texture pages", num_stored, num_misc);
		let mut misc = Box::default();
		if header.compressed_len > 0 {
			if self.options.convert_textures {
				let mut block = read_block(cursor, header)?;
				let count = num_stored.min(num_misc) as usize;
				misc = block.read_array(count, |c| c.read_bytes(PAGE_BYTES_32))?;
			} else {
				cursor.skip(header.compressed_len as u64)?;
			}
		}
		if !self.options.convert_textures {
			return Ok(());
		}
		let mut textures = if pages32.is_empty() {
			pages16.iter().map(|page| convert::from_argb16(page)).collect::<Vec<_>>()
		} else {
			pages32.iter().map(|page| convert::from_bgra32(page)).collect::<Vec<_>>()
		};
		textures.extend(misc.iter().map(|page| convert::from_bgra32(page)));
		self.level.textures = textures.into_boxed_slice();
		Ok(())
	}

	fn texture_block<R: Read + Seek>(
		&mut self,
		cursor: &mut ByteCursor<R>,
		section: &'static str,
		num_pages: usize,
		page_len: usize,
		wanted: bool,
	) -> Result<RawPages> {
		let header = BlockHeader::read(cursor)?.require_data(section)?;
		if header.compressed_len == 0 {
			return Ok(Box::default());
		}
		if !wanted || !self.options.convert_textures {
			cursor.skip(header.compressed_len as u64)?;
			return Ok(Box::default());
		}
		let mut block = read_block(cursor, header)?;
		block.read_array(num_pages, |c| c.read_bytes(page_len))
	}

	/// Records leftover bytes and hands over the finished level.
	pub fn finish<R: Read + Seek>(mut self, cursor: &ByteCursor<R>) -> Level {
		self.trailing(cursor);
		self.level.diagnostics = self.diagnostics.into_boxed_slice();
		self.level
	}

	pub fn trailing<R: Read + Seek>(&mut self, cursor: &ByteCursor<R>) {
		let bytes = cursor.remaining();
		if bytes > 0 {
			self.diagnostics.push(cursor.position(), DiagnosticKind::TrailingData { bytes });
		}
	}
}

/// Number of `RIFF` chunk headers, one per sample in a bank.
pub(crate) fn count_riff_headers(bank: &[u8]) -> u32 {
	bank.windows(4).filter(|w| *w == b"RIFF").count() as u32
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn riff_headers_are_counted() {
		assert_eq!(count_riff_headers(b""), 0);
		assert_eq!(count_riff_headers(b"RIFFxxxxRIFF"), 2);
		assert_eq!(count_riff_headers(b"RIF"), 0);
		assert_eq!(count_riff_headers(b"RIFRIFF"), 1);
	}

	#[test]
	fn markers_must_match() {
		let options = LoadOptions::default();
		let mut loader = Loader::new(Game::Tr4, Generation::Tr4, &options);
		let mut cursor = ByteCursor::from_slice(b"SPRTEY");
		loader.marker(&mut cursor, b"SPR").unwrap();
		match loader.marker(&mut cursor, b"TEX") {
			Err(Error::MissingMarker { expected, found }) => {
				assert_eq!(expected, b"TEX");
				assert_eq!(&*found, b"TEY");
			},
			other => panic!("expected MissingMarker, got {:?}", other),
		}
	}

	#[test]
	fn wrong_version_is_fatal() {
		let options = LoadOptions::default();
		let mut loader = Loader::new(Game::Tr2, Generation::Tr2, &options);
		let bytes = 0x20u32.to_le_bytes();
		let mut cursor = ByteCursor::from_slice(&bytes);
		assert!(matches!(
			loader.version(&mut cursor, &[0x2D]),
			Err(Error::WrongVersion { generation: Generation::Tr2, found: 0x20 }),
		));
	}

	#[test]
	fn tr1_frame_sizes_come_from_frame_data() {
		let options = LoadOptions::default();
		let mut loader = Loader::new(Game::Tr1, Generation::Tr1, &options);
		let mut frame_data = vec![0u16; 12];
		frame_data[FRAME_HEADER_WORDS + 1] = 3;
		loader.level.frame_data = frame_data.into_boxed_slice();
		let animation = |frame_offset| Animation {
			frame_offset,
			frame_rate: 1,
			frame_size: 0,
			state_id: 0,
			speed: 0,
			accel: 0,
			lateral_speed: 0,
			lateral_accel: 0,
			frame_start: 0,
			frame_end: 0,
			next_animation: 0,
			next_frame: 0,
			num_state_changes: 0,
			state_change_offset: 0,
			num_anim_commands: 0,
			anim_command: 0,
		};
		loader.level.animations = vec![animation(2), animation(100)].into_boxed_slice();
		loader.derive_frame_sizes(0);
		assert_eq!(loader.level.animations[0].frame_size, 16);
		assert_eq!(loader.level.animations[1].frame_size, 0);
		assert_eq!(loader.diagnostics.len(), 1);
	}

	#[test]
	fn samples_remap_through_indices() {
		let options = LoadOptions::default();
		let mut loader = Loader::new(Game::Tr2, Generation::Tr2, &options);
		let details = |sample| SoundDetails { sample, volume: 0, range: 8, chance: 0, pitch: 1, flags: 0 };
		loader.level.sound_details = vec![details(1), details(5)].into_boxed_slice();
		loader.level.sample_indices = vec![10, 20].into_boxed_slice();
		loader.remap_samples();
		assert_eq!(loader.level.sound_details[0].sample, 20);
		assert_eq!(loader.level.sound_details[1].sample, 5);
	}

	#[test]
	fn leftover_bytes_are_reported() {
		let options = LoadOptions::default();
		let loader = Loader::new(Game::Tr3, Generation::Tr3, &options);
		let mut cursor = ByteCursor::from_slice(&[1, 2, 3]);
		cursor.read_u8().unwrap();
		let level = loader.finish(&cursor);
		assert_eq!(level.diagnostics.len(), 1);
		assert_eq!(level.diagnostics[0].kind, DiagnosticKind::TrailingData { bytes: 2 });
		assert_eq!(level.diagnostics[0].position, 1);
	}
}
