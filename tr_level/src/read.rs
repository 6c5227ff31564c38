use std::io::{Read, Seek};
use arrayvec::ArrayVec;
use glam::IVec3;
use nonmax::{NonMaxU8, NonMaxU16};
use num_traits::AsPrimitive;
use crate::{ByteCursor, Diagnostics, Error, Generation, Result};

/// A record decoded from a level. Layout differences between generations are
/// resolved inside `read` by matching on `generation`.
pub trait Readable: Sized {
	fn read<R: Read + Seek>(
		cursor: &mut ByteCursor<R>,
		generation: Generation,
		diagnostics: &mut Diagnostics,
	) -> Result<Self>;
}

pub fn read_boxed_slice<R: Read + Seek, T: Readable>(
	cursor: &mut ByteCursor<R>,
	len: usize,
	generation: Generation,
	diagnostics: &mut Diagnostics,
) -> Result<Box<[T]>> {
	cursor.read_array(len, |cursor| T::read(cursor, generation, diagnostics))
}

/// Reads an `L` count, then that many items.
pub fn read_list<R: Read + Seek, T: Readable, L: Readable + AsPrimitive<usize>>(
	cursor: &mut ByteCursor<R>,
	generation: Generation,
	diagnostics: &mut Diagnostics,
) -> Result<Box<[T]>> {
	let len = L::read(cursor, generation, diagnostics)?.as_();
	read_boxed_slice(cursor, len, generation, diagnostics)
}

//primitive impls

macro_rules! impl_readable_prim {
	($type:ty, $func:ident) => {
		impl Readable for $type {
			fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, _: Generation, _: &mut Diagnostics) -> Result<Self> {
				cursor.$func()
			}
		}
	};
}

impl_readable_prim!(u8, read_u8);
impl_readable_prim!(i8, read_i8);
impl_readable_prim!(u16, read_u16);
impl_readable_prim!(i16, read_i16);
impl_readable_prim!(u32, read_u32);
impl_readable_prim!(i32, read_i32);
impl_readable_prim!(f32, read_f32);
impl_readable_prim!(IVec3, read_ivec3);

//array impl

impl<T: Readable, const N: usize> Readable for [T; N] {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, generation: Generation, diagnostics: &mut Diagnostics) -> Result<Self> {
		let mut array = ArrayVec::<T, N>::new();
		for _ in 0..N {
			array.push(T::read(cursor, generation, diagnostics)?);
		}
		array.into_inner().map_err(|partial| Error::Inconsistent {
			what: format!("read {} of {} array items", partial.len(), N),
			position: cursor.position(),
		})
	}
}

//nonmax impls, the all-ones value means "none"

impl Readable for Option<NonMaxU8> {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, _: Generation, _: &mut Diagnostics) -> Result<Self> {
		Ok(NonMaxU8::new(cursor.read_u8()?))
	}
}

impl Readable for Option<NonMaxU16> {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, _: Generation, _: &mut Diagnostics) -> Result<Self> {
		Ok(NonMaxU16::new(cursor.read_u16()?))
	}
}
