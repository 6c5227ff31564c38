use std::{io::{Read, Seek}, slice::Iter};
use bitfield::bitfield;
use glam::{I16Vec3, IVec3, U16Vec3, Vec3, vec3};
use nonmax::NonMaxU16;
use shared::min_max::MinMax;
use crate::{ByteCursor, Diagnostics, Generation, Readable, Result};

const TR5_MOVEABLE_FILLER: u16 = 0xFFEF;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Animation {
	/// Byte offset into `Level.frame_data`.
	pub frame_offset: u32,
	pub frame_rate: u8,
	/// Words per frame.
	pub frame_size: u8,
	pub state_id: u16,
	pub speed: i32,
	pub accel: i32,
	/// TR4+.
	pub lateral_speed: i32,
	pub lateral_accel: i32,
	pub frame_start: u16,
	pub frame_end: u16,
	pub next_animation: u16,
	pub next_frame: u16,
	pub num_state_changes: u16,
	/// Index into `Level.state_changes`.
	pub state_change_offset: u16,
	pub num_anim_commands: u16,
	/// Index into `Level.anim_commands`.
	pub anim_command: u16,
}

impl Readable for Animation {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, generation: Generation, _: &mut Diagnostics) -> Result<Self> {
		let frame_offset = cursor.read_u32()?;
		let frame_rate = cursor.read_u8()?;
		let frame_size = cursor.read_u8()?;
		let state_id = cursor.read_u16()?;
		let speed = cursor.read_i32()?;
		let accel = cursor.read_i32()?;
		let (lateral_speed, lateral_accel) = match generation {
			Generation::Tr1 | Generation::Tr2 | Generation::Tr3 => (0, 0),
			Generation::Tr4 | Generation::Tr5 => (cursor.read_i32()?, cursor.read_i32()?),
		};
		Ok(Animation {
			frame_offset,
			frame_rate,
			frame_size,
			state_id,
			speed,
			accel,
			lateral_speed,
			lateral_accel,
			frame_start: cursor.read_u16()?,
			frame_end: cursor.read_u16()?,
			next_animation: cursor.read_u16()?,
			next_frame: cursor.read_u16()?,
			num_state_changes: cursor.read_u16()?,
			state_change_offset: cursor.read_u16()?,
			num_anim_commands: cursor.read_u16()?,
			anim_command: cursor.read_u16()?,
		})
	}
}

#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateChange {
	pub state_id: u16,
	pub num_anim_dispatches: u16,
	/// Index into `Level.anim_dispatches`.
	pub anim_dispatch: u16,
}

#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimDispatch {
	/// Frame range the dispatch applies to.
	pub low: i16,
	pub high: i16,
	pub next_animation: i16,
	pub next_frame: i16,
}

/// Animated object type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Moveable {
	pub object_id: u32,
	pub num_meshes: u16,
	/// Index into `Level.mesh_indices`.
	pub starting_mesh: u16,
	/// Index into `Level.mesh_tree_data`.
	pub mesh_tree_index: u32,
	/// Byte offset into `Level.frame_data` as stored, 0 once resolved.
	pub frame_offset: u32,
	/// Index into `Level.frame_offsets` once resolved.
	pub frame_index: u32,
	/// Index into `Level.animations`.
	pub animation_index: Option<NonMaxU16>,
}

impl Readable for Moveable {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, generation: Generation, diagnostics: &mut Diagnostics) -> Result<Self> {
		let moveable = Moveable {
			object_id: cursor.read_u32()?,
			num_meshes: cursor.read_u16()?,
			starting_mesh: cursor.read_u16()?,
			mesh_tree_index: cursor.read_u32()?,
			frame_offset: cursor.read_u32()?,
			frame_index: 0,
			animation_index: Readable::read(cursor, generation, diagnostics)?,
		};
		match generation {
			Generation::Tr1 | Generation::Tr2 | Generation::Tr3 | Generation::Tr4 => {},
			Generation::Tr5 => {
				let at = cursor.position();
				let filler = cursor.read_u16()?;
				diagnostics.expect(at, "moveable filler", &[TR5_MOVEABLE_FILLER as u32], filler as u32);
			},
		}
		Ok(moveable)
	}
}

bitfield! {
	#[derive(Clone, Copy, PartialEq, Eq)]
	pub struct MeshNodeFlags(u32);
	impl Debug;
	pub pop, _: 0;
	pub push, _: 1;
}

/// Placement of a mesh relative to its parent in a moveable's hierarchy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshTreeNode {
	pub flags: MeshNodeFlags,
	pub offset: IVec3,
}

pub(crate) const MESH_NODE_WORDS: usize = 4;

impl MeshTreeNode {
	pub(crate) fn from_words(words: &[u32]) -> Option<Self> {
		match *words {
			[flags, x, y, z] => Some(MeshTreeNode {
				flags: MeshNodeFlags(flags),
				offset: IVec3::new(x as i32, y as i32, z as i32),
			}),
			_ => None,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CinematicFrame {
	pub rotation_x: i16,
	pub rotation_y: i16,
	pub rotation_z: i16,
	pub rotation_z2: i16,
	pub position: Vec3,
	pub unknown: i16,
}

impl Readable for CinematicFrame {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, _: Generation, _: &mut Diagnostics) -> Result<Self> {
		let rotation_y = cursor.read_i16()?;
		let rotation_z = cursor.read_i16()?;
		let rotation_z2 = cursor.read_i16()?;
		let z = cursor.read_i16()?;
		let y = cursor.read_i16()?;
		let x = cursor.read_i16()?;
		let unknown = cursor.read_i16()?;
		let rotation_x = cursor.read_i16()?;
		Ok(CinematicFrame {
			rotation_x,
			rotation_y,
			rotation_z,
			rotation_z2,
			position: vec3(x as f32, y as f32, z as f32),
			unknown,
		})
	}
}

//frames

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis { X, Y, Z }

/// Units are 1/1024 of a turn, or 1/4096 for single-axis rotations in TR4+.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameRotation {
	AllAxes(U16Vec3),
	SingleAxis(Axis, u16),
}

fn packed_angles(word1: u16, word2: u16) -> U16Vec3 {
	U16Vec3::new(
		(word1 >> 4) & 1023,
		((word1 & 15) << 6) | (word2 >> 10),
		word2 & 1023,
	)
}

/// One keyframe: bounds and root offset, then a rotation per mesh.
#[derive(Clone, Debug)]
pub struct Frame<'a> {
	pub bounds: MinMax<I16Vec3>,
	pub offset: I16Vec3,
	generation: Generation,
	num_meshes: usize,
	rotation_data: &'a [u16],
}

pub(crate) const FRAME_HEADER_WORDS: usize = 9;

impl<'a> Frame<'a> {
	/// `None` when the header runs past `frame_data`.
	pub(crate) fn get(frame_data: &'a [u16], word_offset: usize, num_meshes: usize, generation: Generation) -> Option<Self> {
		let data = frame_data.get(word_offset..)?;
		let header = data.get(..FRAME_HEADER_WORDS)?;
		let w = |i: usize| header[i] as i16;
		let rotation_data = match generation {
			//TR1 stores a rotation count, always equal to the mesh count
			Generation::Tr1 => data.get(FRAME_HEADER_WORDS + 1..)?,
			Generation::Tr2 | Generation::Tr3 | Generation::Tr4 | Generation::Tr5 => &data[FRAME_HEADER_WORDS..],
		};
		//stored as x min, x max, y min, y max, z min, z max
		let bounds = MinMax {
			min: I16Vec3::new(w(0), w(2), w(4)),
			max: I16Vec3::new(w(1), w(3), w(5)),
		};
		let offset = I16Vec3::new(w(6), w(7), w(8));
		Some(Frame { bounds, offset, generation, num_meshes, rotation_data })
	}

	pub fn iter_rotations(&self) -> RotationIterator<'a> {
		RotationIterator {
			rotation_data: self.rotation_data.iter(),
			remaining: self.num_meshes,
			generation: self.generation,
		}
	}
}

/// Stops early if the frame data runs out.
pub struct RotationIterator<'a> {
	rotation_data: Iter<'a, u16>,
	remaining: usize,
	generation: Generation,
}

impl Iterator for RotationIterator<'_> {
	type Item = FrameRotation;

	fn next(&mut self) -> Option<Self::Item> {
		if self.remaining == 0 {
			return None;
		}
		self.remaining -= 1;
		let first = *self.rotation_data.next()?;
		let rotation = match self.generation {
			Generation::Tr1 => {
				//word order is swapped
				let second = *self.rotation_data.next()?;
				FrameRotation::AllAxes(packed_angles(second, first))
			},
			Generation::Tr2 | Generation::Tr3 | Generation::Tr4 | Generation::Tr5 => match first >> 14 {
				0 => {
					let second = *self.rotation_data.next()?;
					FrameRotation::AllAxes(packed_angles(first, second))
				},
				axis => {
					let axis = match axis {
						1 => Axis::X,
						2 => Axis::Y,
						_ => Axis::Z,
					};
					FrameRotation::SingleAxis(axis, first & self.generation.single_rotation_mask())
				},
			},
		};
		Some(rotation)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		(0, Some(self.remaining))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tr4_animation_has_lateral_motion() {
		let mut bytes = vec![0u8; 4 + 1 + 1 + 2 + 4 + 4];
		bytes[4] = 1;
		bytes[5] = 11;
		bytes.extend_from_slice(&5i32.to_le_bytes());
		bytes.extend_from_slice(&(-5i32).to_le_bytes());
		for v in 0..8u16 {
			bytes.extend_from_slice(&v.to_le_bytes());
		}
		let mut cursor = ByteCursor::from_slice(&bytes);
		let anim = Animation::read(&mut cursor, Generation::Tr4, &mut Diagnostics::new()).unwrap();
		assert_eq!(anim.frame_rate, 1);
		assert_eq!(anim.frame_size, 11);
		assert_eq!((anim.lateral_speed, anim.lateral_accel), (5, -5));
		assert_eq!(anim.frame_end, 1);
		assert_eq!(anim.anim_command, 7);
		assert_eq!(cursor.remaining(), 0);
	}

	#[test]
	fn tr5_moveable_filler() {
		let mut bytes = vec![0u8; 4 + 2 + 2 + 4 + 4];
		bytes.extend_from_slice(&0xFFFFu16.to_le_bytes());
		bytes.extend_from_slice(&0xFFEFu16.to_le_bytes());
		let mut cursor = ByteCursor::from_slice(&bytes);
		let mut diag = Diagnostics::new();
		let moveable = Moveable::read(&mut cursor, Generation::Tr5, &mut diag).unwrap();
		assert_eq!(moveable.animation_index, None);
		assert!(diag.is_empty());
	}

	#[test]
	fn mesh_node_words() {
		let node = MeshTreeNode::from_words(&[2, 10, (-20i32) as u32, 30]).unwrap();
		assert!(node.flags.push());
		assert!(!node.flags.pop());
		assert_eq!(node.offset, IVec3::new(10, -20, 30));
		assert_eq!(MeshTreeNode::from_words(&[1, 2]), None);
	}

	fn frame_words(rotations: &[u16]) -> Vec<u16> {
		let mut words = vec![0, 1, 2, 3, 4, 5, 6, 7, 8];
		words.extend_from_slice(rotations);
		words
	}

	#[test]
	fn tr2_frame_rotations() {
		//all axes (1, 2, 3), then a single y rotation
		let words = frame_words(&[(1 << 4), (2 << 10) | 3, (2 << 14) | 1023]);
		let frame = Frame::get(&words, 0, 2, Generation::Tr2).unwrap();
		assert_eq!(frame.offset, I16Vec3::new(6, 7, 8));
		assert_eq!(frame.bounds.min, I16Vec3::new(0, 2, 4));
		assert_eq!(frame.bounds.max, I16Vec3::new(1, 3, 5));
		let rotations = frame.iter_rotations().collect::<Vec<_>>();
		assert_eq!(rotations, [
			FrameRotation::AllAxes(U16Vec3::new(1, 2, 3)),
			FrameRotation::SingleAxis(Axis::Y, 1023),
		]);
	}

	#[test]
	fn tr4_single_axis_mask() {
		let words = frame_words(&[(3 << 14) | 4095]);
		let frame = Frame::get(&words, 0, 1, Generation::Tr4).unwrap();
		assert_eq!(frame.iter_rotations().next(), Some(FrameRotation::SingleAxis(Axis::Z, 4095)));
	}

	#[test]
	fn tr1_frame_swaps_words() {
		let words = frame_words(&[1, (2 << 10) | 3, 1 << 4]);
		let frame = Frame::get(&words, 0, 1, Generation::Tr1).unwrap();
		assert_eq!(frame.iter_rotations().collect::<Vec<_>>(), [FrameRotation::AllAxes(U16Vec3::new(1, 2, 3))]);
	}

	#[test]
	fn truncated_frames() {
		let words = frame_words(&[0]);
		assert!(Frame::get(&words, 8, 1, Generation::Tr2).is_none());
		let frame = Frame::get(&words, 0, 3, Generation::Tr2).unwrap();
		assert_eq!(frame.iter_rotations().count(), 0);
	}
}
