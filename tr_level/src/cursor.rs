use std::io::{self, Cursor, Read, Seek, SeekFrom};
use byteorder::{ReadBytesExt, LE};
use glam::{vec3, IVec3, Vec3};
use crate::{Error, Result};

/// Sequential little-endian reader over a seekable byte source of known length.
pub struct ByteCursor<R> {
	inner: R,
	pos: u64,
	len: u64,
}

/// Cursor over a borrowed buffer.
pub type SliceCursor<'a> = ByteCursor<Cursor<&'a [u8]>>;
/// Cursor over an owned buffer, as produced by the decoder.
pub type OwnedCursor = ByteCursor<Cursor<Box<[u8]>>>;

impl<'a> ByteCursor<Cursor<&'a [u8]>> {
	pub fn from_slice(bytes: &'a [u8]) -> Self {
		ByteCursor { len: bytes.len() as u64, inner: Cursor::new(bytes), pos: 0 }
	}
}

impl ByteCursor<Cursor<Box<[u8]>>> {
	pub fn from_boxed(bytes: Box<[u8]>) -> Self {
		ByteCursor { len: bytes.len() as u64, inner: Cursor::new(bytes), pos: 0 }
	}
}

macro_rules! read_prim {
	($fn_name:ident, $type:ty, $size:expr, $read:ident $(, $endian:ty)?) => {
		pub fn $fn_name(&mut self) -> Result<$type> {
			let value = self.inner.$read$(::<$endian>)?().map_err(|e| self.fail(e))?;
			self.pos += $size;
			Ok(value)
		}
	};
}

impl<R: Read + Seek> ByteCursor<R> {
	/// Wraps any seekable source, measuring it and rewinding to the start.
	pub fn new(mut inner: R) -> Result<Self> {
		let len = inner.seek(SeekFrom::End(0))?;
		inner.seek(SeekFrom::Start(0))?;
		Ok(ByteCursor { inner, pos: 0, len })
	}

	fn fail(&self, err: io::Error) -> Error {
		match err.kind() {
			io::ErrorKind::UnexpectedEof => Error::UnexpectedEnd { position: self.pos },
			_ => Error::Io(err),
		}
	}

	pub fn position(&self) -> u64 {
		self.pos
	}

	pub fn len(&self) -> u64 {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	pub fn remaining(&self) -> u64 {
		self.len.saturating_sub(self.pos)
	}

	pub fn seek(&mut self, to: SeekFrom) -> Result<u64> {
		self.pos = self.inner.seek(to)?;
		Ok(self.pos)
	}

	pub fn skip(&mut self, num: u64) -> Result<()> {
		if num > self.remaining() {
			return Err(Error::UnexpectedEnd { position: self.pos });
		}
		self.seek(SeekFrom::Current(num as i64))?;
		Ok(())
	}

	read_prim!(read_u8, u8, 1, read_u8);
	read_prim!(read_i8, i8, 1, read_i8);
	read_prim!(read_u16, u16, 2, read_u16, LE);
	read_prim!(read_i16, i16, 2, read_i16, LE);
	read_prim!(read_u32, u32, 4, read_u32, LE);
	read_prim!(read_i32, i32, 4, read_i32, LE);
	read_prim!(read_f32, f32, 4, read_f32, LE);

	pub fn read_bytes(&mut self, num: usize) -> Result<Box<[u8]>> {
		if num as u64 > self.remaining() {
			return Err(Error::UnexpectedEnd { position: self.pos });
		}
		let mut bytes = vec![0; num];
		self.inner.read_exact(&mut bytes).map_err(|e| self.fail(e))?;
		self.pos += num as u64;
		Ok(bytes.into_boxed_slice())
	}

	/// Calls `read_item` exactly `len` times, in order.
	pub fn read_array<T, F>(&mut self, len: usize, mut read_item: F) -> Result<Box<[T]>>
	where F: FnMut(&mut Self) -> Result<T> {
		//a corrupt count must not reserve more than the data could hold
		let mut items = Vec::with_capacity(len.min(self.remaining() as usize));
		for _ in 0..len {
			items.push(read_item(self)?);
		}
		Ok(items.into_boxed_slice())
	}

	/// Reads the next u32 without moving.
	pub fn peek_u32(&mut self) -> Result<u32> {
		let start = self.pos;
		let value = self.read_u32()?;
		self.seek(SeekFrom::Start(start))?;
		Ok(value)
	}

	/// Angle in degrees. Stored as 1/65536 of a turn.
	pub fn read_angle(&mut self) -> Result<f32> {
		Ok(self.read_u16()? as f32 / 16384.0 * -90.0)
	}

	/// 16-bit vertex with y and z flipped.
	pub fn read_vertex16(&mut self) -> Result<Vec3> {
		let x = self.read_i16()?;
		let y = self.read_i16()?;
		let z = self.read_i16()?;
		Ok(vec3(x as f32, -(y as f32), -(z as f32)))
	}

	/// 32-bit vertex with y and z flipped.
	pub fn read_vertex32(&mut self) -> Result<Vec3> {
		let x = self.read_i32()?;
		let y = self.read_i32()?;
		let z = self.read_i32()?;
		Ok(vec3(x as f32, -(y as f32), -(z as f32)))
	}

	/// Float vertex with y and z flipped.
	pub fn read_vertex_f(&mut self) -> Result<Vec3> {
		let x = self.read_f32()?;
		let y = self.read_f32()?;
		let z = self.read_f32()?;
		Ok(vec3(x, -y, -z))
	}

	/// 32-bit vertex as stored.
	pub fn read_ivec3(&mut self) -> Result<IVec3> {
		Ok(IVec3::new(self.read_i32()?, self.read_i32()?, self.read_i32()?))
	}
}
