use std::io::{Read, Seek};
use crate::{
	read::Readable, ByteCursor, Diagnostics, Generation, Result,
	convert::{PAGE_AREA, PAGE_SIDE},
};

pub const PALETTE_LEN: usize = 256;
pub const LIGHT_MAP_LEN: usize = 32 * 256;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: u8,
}

impl Color {
	pub fn to_array(self) -> [u8; 4] {
		[self.r, self.g, self.b, self.a]
	}
}

/// 3 bytes in TR1 layout with opaque alpha, 4 bytes otherwise.
impl Readable for Color {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, generation: Generation, _: &mut Diagnostics) -> Result<Self> {
		let r = cursor.read_u8()?;
		let g = cursor.read_u8()?;
		let b = cursor.read_u8()?;
		let a = match generation {
			Generation::Tr1 => 0xFF,
			Generation::Tr2 | Generation::Tr3 | Generation::Tr4 | Generation::Tr5 => cursor.read_u8()?,
		};
		Ok(Color { r, g, b, a })
	}
}

/// 256 colors. Entry 0 is transparent when indexing texture pages.
#[derive(Clone, Debug)]
pub struct Palette {
	pub colors: Box<[Color]>,
}

impl Readable for Palette {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, generation: Generation, diagnostics: &mut Diagnostics) -> Result<Self> {
		let colors = cursor.read_array(PALETTE_LEN, |c| Color::read(c, generation, diagnostics))?;
		Ok(Palette { colors })
	}
}

/// 32 shades for each of the 256 palette entries.
#[derive(Clone, Debug)]
pub struct LightMap(pub Box<[u8]>);

impl LightMap {
	/// Palette index for `color` at darkness `shade` (0..32).
	pub fn get(&self, shade: u8, color: u8) -> Option<u8> {
		self.0.get(shade as usize * PALETTE_LEN + color as usize).copied()
	}
}

impl Readable for LightMap {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, _: Generation, _: &mut Diagnostics) -> Result<Self> {
		Ok(LightMap(cursor.read_bytes(LIGHT_MAP_LEN)?))
	}
}

/// 256x256 RGBA pixels, row-major.
#[derive(Clone, Debug)]
pub struct TexturePage {
	pub pixels: Box<[[u8; 4]]>,
}

impl TexturePage {
	pub fn transparent() -> Self {
		TexturePage { pixels: vec![[0; 4]; PAGE_AREA].into_boxed_slice() }
	}

	pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
		if x >= PAGE_SIDE {
			return None;
		}
		self.pixels.get(y * PAGE_SIDE + x).copied()
	}

	pub fn as_bytes(&self) -> Vec<u8> {
		self.pixels.iter().flatten().copied().collect()
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendMode {
	Opaque,
	Transparent,
	Multiply,
	SimpleShade,
	TransparentIgnoreZ,
	InvertSrc,
	Wireframe,
	TransparentAlpha,
	InvertDst,
	Screen,
	Hide,
	AnimatedTexture,
	Unknown(u16),
}

impl From<u16> for BlendMode {
	fn from(value: u16) -> Self {
		match value {
			0 => BlendMode::Opaque,
			1 => BlendMode::Transparent,
			2 => BlendMode::Multiply,
			3 => BlendMode::SimpleShade,
			4 => BlendMode::TransparentIgnoreZ,
			5 => BlendMode::InvertSrc,
			6 => BlendMode::Wireframe,
			7 => BlendMode::TransparentAlpha,
			8 => BlendMode::InvertDst,
			9 => BlendMode::Screen,
			10 => BlendMode::Hide,
			11 => BlendMode::AnimatedTexture,
			m => BlendMode::Unknown(m),
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObjectTextureVertex {
	pub x_coordinate: u8,
	pub x_pixel: u8,
	pub y_coordinate: u8,
	pub y_pixel: u8,
}

impl Readable for ObjectTextureVertex {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, generation: Generation, _: &mut Diagnostics) -> Result<Self> {
		let mut vertex = ObjectTextureVertex {
			x_coordinate: cursor.read_u8()?,
			x_pixel: cursor.read_u8()?,
			y_coordinate: cursor.read_u8()?,
			y_pixel: cursor.read_u8()?,
		};
		match generation {
			Generation::Tr1 | Generation::Tr2 | Generation::Tr3 => {},
			Generation::Tr4 | Generation::Tr5 => {
				vertex.x_coordinate = vertex.x_coordinate.max(1);
				vertex.y_coordinate = vertex.y_coordinate.max(1);
			},
		}
		Ok(vertex)
	}
}

const TILE_FLIPPED: u16 = 0x8000;

#[derive(Clone, Copy, Debug)]
pub struct ObjectTexture {
	pub blend_mode: BlendMode,
	/// Tile word as stored.
	pub tile_and_flag: u16,
	/// Index into `Level.textures`.
	pub tile: u16,
	/// Top bit of the tile word, marks the flipped triangle variant.
	pub flipped: bool,
	/// TR4+.
	pub new_flags: u16,
	pub vertices: [ObjectTextureVertex; 4],
	/// TR4+ pixel-space rectangle.
	pub original_u: u32,
	pub original_v: u32,
	pub width: u32,
	pub height: u32,
}

impl Readable for ObjectTexture {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, generation: Generation, diagnostics: &mut Diagnostics) -> Result<Self> {
		let start = cursor.position();
		let blend_mode = cursor.read_u16()?.into();
		let tile_and_flag = cursor.read_u16()?;
		let new_flags = match generation {
			Generation::Tr1 | Generation::Tr2 | Generation::Tr3 => {
				diagnostics.check_max(start, "object texture tile", tile_and_flag as u32, 64);
				if tile_and_flag & TILE_FLIPPED != 0 {
					diagnostics.expect(start, "object texture tile top bit", &[0], 1);
				}
				0
			},
			Generation::Tr4 | Generation::Tr5 => {
				diagnostics.check_max(start, "object texture tile", (tile_and_flag & 0x7FFF) as u32, 128);
				cursor.read_u16()?
			},
		};
		let vertices = <[ObjectTextureVertex; 4]>::read(cursor, generation, diagnostics)?;
		let (original_u, original_v, width, height) = match generation {
			Generation::Tr1 | Generation::Tr2 | Generation::Tr3 => (0, 0, 0, 0),
			Generation::Tr4 | Generation::Tr5 => (cursor.read_u32()?, cursor.read_u32()?, cursor.read_u32()?, cursor.read_u32()?),
		};
		match generation {
			Generation::Tr1 | Generation::Tr2 | Generation::Tr3 | Generation::Tr4 => {},
			Generation::Tr5 => {
				let at = cursor.position();
				let filler = cursor.read_u16()?;
				diagnostics.expect(at, "object texture filler", &[0], filler as u32);
			},
		}
		Ok(ObjectTexture {
			blend_mode,
			tile_and_flag,
			tile: tile_and_flag & generation.tile_mask(),
			flipped: tile_and_flag & TILE_FLIPPED != 0,
			new_flags,
			vertices,
			original_u,
			original_v,
			width,
			height,
		})
	}
}

/// Rectangle of a texture page used by a sprite, with its world-space extents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteTexture {
	/// Index into `Level.textures`.
	pub tile: u16,
	pub x0: i16,
	pub y0: i16,
	pub x1: i16,
	pub y1: i16,
	pub left: i16,
	pub top: i16,
	pub right: i16,
	pub bottom: i16,
}

impl Readable for SpriteTexture {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, generation: Generation, diagnostics: &mut Diagnostics) -> Result<Self> {
		let start = cursor.position();
		let tile = cursor.read_u16()?;
		let x = cursor.read_u8()? as i16;
		let y = cursor.read_u8()? as i16;
		let width = cursor.read_u16()?;
		let height = cursor.read_u16()?;
		let left = cursor.read_i16()?;
		let top = cursor.read_i16()?;
		let right = cursor.read_i16()?;
		let bottom = cursor.read_i16()?;
		Ok(match generation {
			Generation::Tr1 | Generation::Tr2 | Generation::Tr3 => {
				diagnostics.check_max(start, "sprite texture tile", tile as u32, 64);
				SpriteTexture {
					tile,
					x0: x,
					y0: y,
					x1: x + ((width as i32 - 255) / 256) as i16,
					y1: y + ((height as i32 - 255) / 256) as i16,
					left,
					top: bottom.wrapping_neg(),
					right,
					bottom: top.wrapping_neg(),
				}
			},
			Generation::Tr4 | Generation::Tr5 => {
				diagnostics.check_max(start, "sprite texture tile", tile as u32, 128);
				SpriteTexture {
					tile,
					x0: left,
					y0: bottom,
					x1: right,
					y1: top,
					left: x,
					top: y + (height as f32 / 256.0).round_ties_even() as i16,
					right: x + (width as f32 / 256.0).round_ties_even() as i16,
					bottom: y,
				}
			},
		})
	}
}

/// Run of sprite textures used by a sprite object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteSequence {
	pub object_id: i32,
	/// Number of sprites, stored negated.
	pub length: i16,
	/// Index into `Level.sprite_textures`.
	pub offset: i16,
}

impl Readable for SpriteSequence {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, _: Generation, _: &mut Diagnostics) -> Result<Self> {
		Ok(SpriteSequence {
			object_id: cursor.read_i32()?,
			length: cursor.read_i16()?.wrapping_neg(),
			offset: cursor.read_i16()?,
		})
	}
}
