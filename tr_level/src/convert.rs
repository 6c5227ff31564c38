//! Conversion of stored texture pages to 32-bit RGBA.

use crate::model::{Palette, TexturePage};

pub const PAGE_SIDE: usize = 256;
pub const PAGE_AREA: usize = PAGE_SIDE * PAGE_SIDE;

pub trait PixelFormat<const N: usize> {
	fn to_rgba(pixel: [u8; N]) -> [u8; 4];
}

/// 1-5-5-5 ARGB, little-endian.
pub struct Argb16;
/// 8-8-8-8 stored as B, G, R, A.
pub struct Bgra32;

impl PixelFormat<2> for Argb16 {
	fn to_rgba(pixel: [u8; 2]) -> [u8; 4] {
		let c = u16::from_le_bytes(pixel);
		if c & 0x8000 == 0 {
			return [0; 4];
		}
		[
			(((c & 0x7C00) >> 10) << 3) as u8,
			(((c & 0x03E0) >> 5) << 3) as u8,
			((c & 0x001F) << 3) as u8,
			0xFF,
		]
	}
}

impl PixelFormat<4> for Bgra32 {
	fn to_rgba([b, g, r, a]: [u8; 4]) -> [u8; 4] {
		[r, g, b, a]
	}
}

/// Pixels past the end of `raw` are transparent.
fn convert<const N: usize, P: PixelFormat<N>>(raw: &[u8]) -> TexturePage {
	let mut pixels = raw
		.chunks_exact(N)
		.take(PAGE_AREA)
		.map(|chunk| {
			let mut pixel = [0u8; N];
			pixel.copy_from_slice(chunk);
			P::to_rgba(pixel)
		})
		.collect::<Vec<_>>();
	pixels.resize(PAGE_AREA, [0; 4]);
	TexturePage { pixels: pixels.into_boxed_slice() }
}

pub fn from_argb16(raw: &[u8]) -> TexturePage {
	convert::<2, Argb16>(raw)
}

pub fn from_bgra32(raw: &[u8]) -> TexturePage {
	convert::<4, Bgra32>(raw)
}

/// Index 0 is fully transparent, every other entry is opaque.
pub fn palette_rgba(palette: &Palette, index: u8) -> [u8; 4] {
	if index == 0 {
		return [0; 4];
	}
	match palette.colors.get(index as usize) {
		Some(color) => [color.r, color.g, color.b, 0xFF],
		None => [0; 4],
	}
}

pub fn from_indexed(palette: &Palette, raw: &[u8]) -> TexturePage {
	let mut pixels = raw
		.iter()
		.take(PAGE_AREA)
		.map(|&index| palette_rgba(palette, index))
		.collect::<Vec<_>>();
	pixels.resize(PAGE_AREA, [0; 4]);
	TexturePage { pixels: pixels.into_boxed_slice() }
}
