use std::io::{Read, Seek};
use arrayvec::ArrayVec;
use bitfield::bitfield;
use glam::{IVec3, Vec3};
use shared::min_max::{MinMax, ScalarMinMax};
use crate::{ByteCursor, Diagnostics, Generation, Readable, Result};
use super::invert_intensity;

/// TR2+ store box extents in sectors of this many units.
const BOX_SECTOR: u32 = 1024;

/// Walkable area used by AI pathing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrBox {
	pub z: MinMax<u32>,
	pub x: MinMax<u32>,
	pub true_floor: i16,
	/// Index into `Level.overlaps`. TR2+ keep flags in the top bits.
	pub overlap_index: i16,
}

impl TrBox {
	pub fn contains(&self, x: u32, z: u32) -> bool {
		self.x.contains(x) && self.z.contains(z)
	}
}

impl Readable for TrBox {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, generation: Generation, _: &mut Diagnostics) -> Result<Self> {
		let [z_min, z_max, x_min, x_max] = match generation {
			Generation::Tr1 => [cursor.read_u32()?, cursor.read_u32()?, cursor.read_u32()?, cursor.read_u32()?],
			Generation::Tr2 | Generation::Tr3 | Generation::Tr4 | Generation::Tr5 => {
				let mut sector = || -> Result<u32> { Ok(cursor.read_u8()? as u32 * BOX_SECTOR) };
				[sector()?, sector()?, sector()?, sector()?]
			},
		};
		Ok(TrBox {
			z: MinMax { min: z_min, max: z_max },
			x: MinMax { min: x_min, max: x_max },
			true_floor: cursor.read_i16()?.wrapping_neg(),
			overlap_index: cursor.read_i16()?,
		})
	}
}

/// Per-box zone ids for each creature class, normal and alternate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Zone {
	pub fly_normal: u16,
	/// 2 classes in TR1, 4 after.
	pub ground_normal: ArrayVec<u16, 4>,
	pub ground_alternate: ArrayVec<u16, 4>,
	pub fly_alternate: u16,
}

impl Readable for Zone {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, generation: Generation, _: &mut Diagnostics) -> Result<Self> {
		let len = match generation {
			Generation::Tr1 => 2,
			Generation::Tr2 | Generation::Tr3 | Generation::Tr4 | Generation::Tr5 => 4,
		};
		let fly_normal = cursor.read_u16()?;
		let mut ground_normal = ArrayVec::new();
		for _ in 0..len {
			ground_normal.push(cursor.read_u16()?);
		}
		let mut ground_alternate = ArrayVec::new();
		for _ in 0..len {
			ground_alternate.push(cursor.read_u16()?);
		}
		Ok(Zone {
			fly_normal,
			ground_normal,
			ground_alternate,
			fly_alternate: cursor.read_u16()?,
		})
	}
}

bitfield! {
	#[derive(Readable, Clone, Copy, Default, PartialEq, Eq)]
	pub struct ItemFlags(u16);
	impl Debug;
	pub invisible, _: 8;
	pub u8, activation_mask, _: 13, 9;
	pub clear_body, _: 15;
}

/// Placed object instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Item {
	pub object_id: i16,
	/// Index into `Level.rooms`.
	pub room: i16,
	pub position: Vec3,
	/// Degrees.
	pub rotation: f32,
	/// -1 means use mesh lighting.
	pub intensity1: i16,
	pub intensity2: i16,
	/// Object code bit, TR4+.
	pub ocb: i16,
	pub flags: ItemFlags,
}

impl Item {
	/// `None` when the item takes its lighting from its mesh.
	pub fn constant_lighting(&self) -> Option<i16> {
		(self.intensity1 != -1).then_some(self.intensity1)
	}
}

/// -1 is kept as the mesh lighting marker.
fn invert_unless_mesh_lit(intensity: i16) -> i16 {
	match intensity {
		-1 => -1,
		v => invert_intensity(v),
	}
}

impl Readable for Item {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, generation: Generation, diagnostics: &mut Diagnostics) -> Result<Self> {
		let object_id = cursor.read_i16()?;
		let room = cursor.read_i16()?;
		let position = cursor.read_vertex32()?;
		let rotation = cursor.read_angle()?;
		let mut intensity1 = cursor.read_i16()?;
		let (intensity2, ocb) = match generation {
			Generation::Tr1 => {
				intensity1 = invert_unless_mesh_lit(intensity1);
				(intensity1, 0)
			},
			Generation::Tr2 => {
				intensity1 = invert_unless_mesh_lit(intensity1);
				(invert_unless_mesh_lit(cursor.read_i16()?), 0)
			},
			Generation::Tr3 => (cursor.read_i16()?, 0),
			Generation::Tr4 | Generation::Tr5 => (intensity1, cursor.read_i16()?),
		};
		Ok(Item {
			object_id,
			room,
			position,
			rotation,
			intensity1,
			intensity2,
			ocb,
			flags: ItemFlags::read(cursor, generation, diagnostics)?,
		})
	}
}

#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Camera {
	pub position: IVec3,
	pub room: i16,
	pub flag: u16,
}

#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlybyCamera {
	pub position: IVec3,
	pub target: IVec3,
	pub sequence: u8,
	pub index: u8,
	pub fov: u16,
	pub roll: i16,
	pub timer: u16,
	pub speed: u16,
	pub flags: u16,
	pub room: u32,
}

#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SoundSource {
	pub position: IVec3,
	/// Index into `Level.sound_map`.
	pub sound_id: u16,
	pub flags: u16,
}

/// Pathing hint for TR4+ enemies.
#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AiObject {
	pub object_id: u16,
	pub room: u16,
	pub position: IVec3,
	pub ocb: i16,
	pub flags: u16,
	pub angle: i32,
}
