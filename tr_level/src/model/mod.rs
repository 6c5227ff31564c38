//! Owned, generation-independent level model.

mod anim;
mod mesh;
mod room;
mod sound;
mod texture;
mod world;

pub use anim::*;
pub use mesh::*;
pub use room::*;
pub use sound::*;
pub use texture::*;
pub use world::*;

use crate::{Diagnostic, Game, Generation};

/// Early generations store intensities inverted on a 13-bit scale.
pub(crate) fn invert_intensity(v: i16) -> i16 {
	((8191 - v as i32) << 2) as i16
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LaraType {
	Normal,
	Catsuit,
	Divesuit,
	Invisible,
	Unknown(u16),
}

impl From<u16> for LaraType {
	fn from(value: u16) -> Self {
		match value {
			0 => LaraType::Normal,
			3 => LaraType::Catsuit,
			4 => LaraType::Divesuit,
			6 => LaraType::Invisible,
			t => LaraType::Unknown(t),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeatherType {
	Normal,
	Rain,
	Snow,
	Unknown(u16),
}

impl From<u16> for WeatherType {
	fn from(value: u16) -> Self {
		match value {
			0 => WeatherType::Normal,
			1 => WeatherType::Rain,
			2 => WeatherType::Snow,
			w => WeatherType::Unknown(w),
		}
	}
}

/// A fully loaded level. Absent sections are empty.
#[derive(Clone, Debug)]
pub struct Level {
	pub game: Game,
	pub generation: Generation,
	/// TR1 to TR3.
	pub palette: Option<Palette>,
	/// TR2 and TR3.
	pub palette16: Option<Palette>,
	pub textures: Box<[TexturePage]>,
	pub rooms: Box<[Room]>,
	pub floor_data: Box<[u16]>,
	pub meshes: Box<[Mesh]>,
	/// Index into `meshes` for each stored mesh pointer.
	pub mesh_indices: Box<[u32]>,
	pub animations: Box<[Animation]>,
	pub state_changes: Box<[StateChange]>,
	pub anim_dispatches: Box<[AnimDispatch]>,
	pub anim_commands: Box<[i16]>,
	pub mesh_tree_data: Box<[u32]>,
	pub frame_data: Box<[u16]>,
	/// Sorted, unique byte offsets into `frame_data`, indexed by `Moveable::frame_index`.
	pub frame_offsets: Box<[u32]>,
	pub moveables: Box<[Moveable]>,
	pub static_meshes: Box<[StaticMesh]>,
	pub object_textures: Box<[ObjectTexture]>,
	pub animated_textures: Box<[u16]>,
	/// TR4+.
	pub animated_textures_uv_count: u8,
	pub sprite_textures: Box<[SpriteTexture]>,
	pub sprite_sequences: Box<[SpriteSequence]>,
	pub cameras: Box<[Camera]>,
	/// TR4+.
	pub flyby_cameras: Box<[FlybyCamera]>,
	pub sound_sources: Box<[SoundSource]>,
	pub boxes: Box<[TrBox]>,
	pub overlaps: Box<[u16]>,
	pub zones: Box<[Zone]>,
	pub items: Box<[Item]>,
	/// TR1 to TR3.
	pub light_map: Option<LightMap>,
	/// TR4+.
	pub ai_objects: Box<[AiObject]>,
	/// TR1 to TR3.
	pub cinematic_frames: Box<[CinematicFrame]>,
	pub demo_data: Box<[u8]>,
	/// Sound id to index into `sound_details`, -1 for none.
	pub sound_map: Box<[i16]>,
	pub sound_details: Box<[SoundDetails]>,
	pub sample_indices: Box<[u32]>,
	pub sample_data: Box<[u8]>,
	pub samples_count: u32,
	/// TR5.
	pub lara_type: LaraType,
	pub weather_type: WeatherType,
	/// Advisory findings, in file order.
	pub diagnostics: Box<[Diagnostic]>,
}

impl Level {
	pub(crate) fn empty(game: Game, generation: Generation) -> Self {
		Level {
			game,
			generation,
			palette: None,
			palette16: None,
			textures: Box::default(),
			rooms: Box::default(),
			floor_data: Box::default(),
			meshes: Box::default(),
			mesh_indices: Box::default(),
			animations: Box::default(),
			state_changes: Box::default(),
			anim_dispatches: Box::default(),
			anim_commands: Box::default(),
			mesh_tree_data: Box::default(),
			frame_data: Box::default(),
			frame_offsets: Box::default(),
			moveables: Box::default(),
			static_meshes: Box::default(),
			object_textures: Box::default(),
			animated_textures: Box::default(),
			animated_textures_uv_count: 0,
			sprite_textures: Box::default(),
			sprite_sequences: Box::default(),
			cameras: Box::default(),
			flyby_cameras: Box::default(),
			sound_sources: Box::default(),
			boxes: Box::default(),
			overlaps: Box::default(),
			zones: Box::default(),
			items: Box::default(),
			light_map: None,
			ai_objects: Box::default(),
			cinematic_frames: Box::default(),
			demo_data: Box::default(),
			sound_map: Box::default(),
			sound_details: Box::default(),
			sample_indices: Box::default(),
			sample_data: Box::default(),
			samples_count: 0,
			lara_type: LaraType::Normal,
			weather_type: WeatherType::Normal,
			diagnostics: Box::default(),
		}
	}

	/// Mesh behind a mesh pointer slot.
	pub fn mesh(&self, slot: usize) -> Option<&Mesh> {
		let index = *self.mesh_indices.get(slot)?;
		self.meshes.get(index as usize)
	}

	/// Meshes of a moveable, in hierarchy order.
	pub fn moveable_meshes<'a>(&'a self, moveable: &Moveable) -> impl Iterator<Item = Option<&'a Mesh>> + 'a {
		let start = moveable.starting_mesh as usize;
		(start..start + moveable.num_meshes as usize).map(move |slot| self.mesh(slot))
	}

	/// One node per mesh after the first. Stops early if the tree data runs out.
	pub fn mesh_tree<'a>(&'a self, moveable: &Moveable) -> impl Iterator<Item = MeshTreeNode> + 'a {
		let start = moveable.mesh_tree_index as usize;
		let num_nodes = (moveable.num_meshes as usize).saturating_sub(1);
		self.mesh_tree_data
			.get(start..)
			.unwrap_or_default()
			.chunks_exact(MESH_NODE_WORDS)
			.take(num_nodes)
			.filter_map(MeshTreeNode::from_words)
	}

	/// First frame of a moveable's animations.
	pub fn moveable_frame(&self, moveable: &Moveable) -> Option<Frame> {
		let byte_offset = *self.frame_offsets.get(moveable.frame_index as usize)?;
		Frame::get(&self.frame_data, byte_offset as usize / 2, moveable.num_meshes as usize, self.generation)
	}

	/// Keyframe `frame` of `animation`, counted from its first stored frame.
	pub fn animation_frame(&self, animation: &Animation, num_meshes: u16, frame: usize) -> Option<Frame> {
		let word_offset = animation.frame_offset as usize / 2 + frame * animation.frame_size as usize;
		Frame::get(&self.frame_data, word_offset, num_meshes as usize, self.generation)
	}

	pub fn state_changes_of(&self, animation: &Animation) -> &[StateChange] {
		let start = animation.state_change_offset as usize;
		self.state_changes.get(start..start + animation.num_state_changes as usize).unwrap_or_default()
	}

	pub fn anim_dispatches_of(&self, state_change: &StateChange) -> &[AnimDispatch] {
		let start = state_change.anim_dispatch as usize;
		self.anim_dispatches.get(start..start + state_change.num_anim_dispatches as usize).unwrap_or_default()
	}

	pub fn sprites_of(&self, sequence: &SpriteSequence) -> &[SpriteTexture] {
		let start = sequence.offset.max(0) as usize;
		self.sprite_textures.get(start..start + sequence.length.max(0) as usize).unwrap_or_default()
	}

	pub fn sound_details_for(&self, sound_id: usize) -> Option<&SoundDetails> {
		let index = usize::try_from(*self.sound_map.get(sound_id)?).ok()?;
		self.sound_details.get(index)
	}
}

#[cfg(test)]
mod tests {
	use glam::IVec3;
	use super::*;

	#[test]
	fn intensity_inversion() {
		assert_eq!(invert_intensity(8191), 0);
		assert_eq!(invert_intensity(0), 32764);
		assert_eq!(invert_intensity(4095), 16384);
	}

	#[test]
	fn header_enums() {
		assert_eq!(LaraType::from(3), LaraType::Catsuit);
		assert_eq!(LaraType::from(1), LaraType::Unknown(1));
		assert_eq!(WeatherType::from(2), WeatherType::Snow);
	}

	fn moveable(num_meshes: u16) -> Moveable {
		Moveable {
			object_id: 0,
			num_meshes,
			starting_mesh: 1,
			mesh_tree_index: 4,
			frame_offset: 0,
			frame_index: 1,
			animation_index: None,
		}
	}

	#[test]
	fn mesh_tree_nodes() {
		let mut level = Level::empty(Game::Tr2, Generation::Tr2);
		level.mesh_tree_data = vec![0, 0, 0, 0, 1, 5, 6, 7, 2, 8, 9, 10].into_boxed_slice();
		let nodes = level.mesh_tree(&moveable(3)).collect::<Vec<_>>();
		assert_eq!(nodes.len(), 2);
		assert!(nodes[0].flags.pop());
		assert_eq!(nodes[1].offset, IVec3::new(8, 9, 10));
		//truncated tree data yields what is there
		assert_eq!(level.mesh_tree(&moveable(5)).count(), 2);
	}

	#[test]
	fn moveable_frame_uses_resolved_index() {
		let mut level = Level::empty(Game::Tr2, Generation::Tr2);
		level.frame_data = (0..40).collect();
		level.frame_offsets = vec![0, 20].into_boxed_slice();
		let frame = level.moveable_frame(&moveable(1)).unwrap();
		assert_eq!(frame.bounds.min.x, 10);
		assert!(level.moveable_frame(&Moveable { frame_index: 2, ..moveable(1) }).is_none());
	}

	#[test]
	fn ranges_clamp_to_tables() {
		let mut level = Level::empty(Game::Tr1, Generation::Tr1);
		level.sound_map = vec![-1, 0].into_boxed_slice();
		assert!(level.sound_details_for(0).is_none());
		assert!(level.sound_details_for(1).is_none());
		assert!(level.sound_details_for(7).is_none());
		let sequence = SpriteSequence { object_id: 0, length: 3, offset: 0 };
		assert!(level.sprites_of(&sequence).is_empty());
		level.mesh_indices = vec![0, 0].into_boxed_slice();
		assert!(level.moveable_meshes(&moveable(2)).all(|m| m.is_none()));
	}
}
