use std::io::{Read, Seek, SeekFrom};
use bitfield::bitfield;
use glam::{vec3, vec4, IVec3, Vec3, Vec4};
use nonmax::{NonMaxU8, NonMaxU16};
use shared::min_max::MinMax;
use crate::{
	read::{read_boxed_slice, read_list},
	ByteCursor, DiagnosticKind, Diagnostics, Error, Generation, Readable, Result,
};
use super::{invert_intensity, Color, Quad, Triangle};

/// Filler written by the TR5 level editor.
pub const TR5_SEPARATOR: u32 = 0xCDCDCDCD;
pub const TR5_ROOM_MARKER: u32 = 0x414C4558;
/// Offsets inside a TR5 room are relative to the end of its fixed header.
pub const TR5_ROOM_HEADER_LEN: u64 = 208;
pub const TR5_LAYER_LEN: u64 = 56;
pub const TR5_VERTEX_LEN: u32 = 28;
const TR5_MAX_LIGHTS: u32 = 512;
const TR5_MAX_STATIC_MESHES: u32 = 512;
const TR5_MAX_TRIANGLES: u32 = 512;
const TR5_MAX_QUADS: u32 = 1024;

bitfield! {
	/// 1-5-5-5 color word.
	#[derive(Readable, Clone, Copy, PartialEq, Eq)]
	pub struct Color16(u16);
	impl Debug;
	u8;
	pub a, _: 15;
	pub r, _: 14, 10;
	pub g, _: 9, 5;
	pub b, _: 4, 0;
}

impl Color16 {
	/// Channels divided by `scale`, opaque.
	pub fn to_vec4(self, scale: f32) -> Vec4 {
		vec4(self.r() as f32 / scale, self.g() as f32 / scale, self.b() as f32 / scale, 1.0)
	}
}

fn grey(c: f32) -> Vec4 {
	vec4(c, c, c, 1.0)
}

/// 5-5-5 colors are scaled by 62 in TR3 and 31 in TR4+.
fn color16_scale(generation: Generation) -> f32 {
	match generation {
		Generation::Tr1 | Generation::Tr2 | Generation::Tr3 => 62.0,
		Generation::Tr4 | Generation::Tr5 => 31.0,
	}
}

bitfield! {
	#[derive(Readable, Clone, Copy, Default, PartialEq, Eq)]
	pub struct RoomFlags(u16);
	impl Debug;
	pub water, _: 0;
	pub quicksand, _: 1;
	pub sky_box, _: 3;
	pub wind, _: 5;
}

/// TR3 stores quicksand in bit 7.
const TR3_QUICKSAND: u16 = 0x80;
const QUICKSAND: u16 = 0x02;

bitfield! {
	#[derive(Readable, Clone, Copy, Default, PartialEq, Eq)]
	pub struct VertexAttributes(u16);
	impl Debug;
	pub water_surface_movement, _: 13;
	pub underwater_modulation, _: 14;
	pub water_surface, _: 15;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reverb {
	Outside,
	SmallRoom,
	MediumRoom,
	LargeRoom,
	Pipe,
	Unknown(u8),
}

impl From<u8> for Reverb {
	fn from(value: u8) -> Self {
		match value {
			0 => Reverb::Outside,
			1 => Reverb::SmallRoom,
			2 => Reverb::MediumRoom,
			3 => Reverb::LargeRoom,
			4 => Reverb::Pipe,
			r => Reverb::Unknown(r),
		}
	}
}

/// One cell of a room's floor grid.
#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sector {
	/// Index into `Level.floor_data`.
	pub floor_data_index: u16,
	/// Index into `Level.boxes`. TR3+ keep the material in the low 4 bits.
	pub box_index: u16,
	pub room_below: Option<NonMaxU8>,
	/// In clicks of 256 units.
	pub floor: i8,
	pub room_above: Option<NonMaxU8>,
	pub ceiling: i8,
}

impl Sector {
	pub fn floor_height(&self) -> i32 {
		self.floor as i32 * 256
	}

	pub fn ceiling_height(&self) -> i32 {
		self.ceiling as i32 * 256
	}
}

/// Opening into an adjoining room.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Portal {
	pub adjoining_room: u16,
	pub normal: Vec3,
	pub vertices: [Vec3; 4],
}

impl Readable for Portal {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, _: Generation, _: &mut Diagnostics) -> Result<Self> {
		Ok(Portal {
			adjoining_room: cursor.read_u16()?,
			normal: cursor.read_vertex16()?,
			vertices: [
				cursor.read_vertex16()?,
				cursor.read_vertex16()?,
				cursor.read_vertex16()?,
				cursor.read_vertex16()?,
			],
		})
	}
}

#[derive(Readable, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoomSprite {
	/// Index into the room's vertices.
	pub vertex: i16,
	/// Index into `Level.sprite_textures`.
	pub texture: i16,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoomVertex {
	/// Relative to the room offset.
	pub position: Vec3,
	pub lighting1: i16,
	pub attributes: VertexAttributes,
	pub lighting2: i16,
	/// TR5.
	pub normal: Vec3,
	pub color: Vec4,
}

impl Readable for RoomVertex {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, generation: Generation, diagnostics: &mut Diagnostics) -> Result<Self> {
		let mut vertex = RoomVertex {
			position: Vec3::ZERO,
			lighting1: 0,
			attributes: VertexAttributes(0),
			lighting2: 0,
			normal: Vec3::ZERO,
			color: Vec4::ONE,
		};
		match generation {
			Generation::Tr1 => {
				vertex.position = cursor.read_vertex16()?;
				vertex.lighting1 = invert_intensity(cursor.read_i16()?);
				vertex.lighting2 = vertex.lighting1;
				vertex.color = grey(vertex.lighting1 as f32 / 32768.0);
			},
			Generation::Tr2 => {
				vertex.position = cursor.read_vertex16()?;
				vertex.lighting1 = invert_intensity(cursor.read_i16()?);
				vertex.attributes = VertexAttributes::read(cursor, generation, diagnostics)?;
				vertex.lighting2 = invert_intensity(cursor.read_i16()?);
				vertex.color = grey(vertex.lighting2 as f32 / 32768.0);
			},
			Generation::Tr3 | Generation::Tr4 => {
				vertex.position = cursor.read_vertex16()?;
				vertex.lighting1 = cursor.read_i16()?;
				vertex.attributes = VertexAttributes::read(cursor, generation, diagnostics)?;
				vertex.lighting2 = cursor.read_i16()?;
				vertex.color = Color16(vertex.lighting2 as u16).to_vec4(color16_scale(generation));
			},
			Generation::Tr5 => {
				vertex.position = cursor.read_vertex_f()?;
				vertex.normal = cursor.read_vertex_f()?;
				let color = Color::read(cursor, generation, diagnostics)?;
				vertex.color = Vec4::from_array(color.to_array().map(|c| c as f32)) / 255.0;
			},
		}
		Ok(vertex)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightKind {
	Null,
	Point,
	Spot,
	Sun,
	Shadow,
	Unknown(u8),
}

impl From<u8> for LightKind {
	fn from(value: u8) -> Self {
		match value {
			0 => LightKind::Null,
			1 => LightKind::Point,
			2 => LightKind::Spot,
			3 => LightKind::Sun,
			4 => LightKind::Shadow,
			k => LightKind::Unknown(k),
		}
	}
}

/// Fields only some generations store.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LightDetail {
	/// TR1 to TR3. TR1 repeats the first intensity, TR3 stores only fades.
	Fade { intensity: [u16; 2], fade: [u32; 2] },
	Tr4 {
		intensity: u8,
		unknown: u8,
		hotspot: f32,
		falloff: f32,
		length: f32,
		cutoff: f32,
		direction: Vec3,
	},
	Tr5 {
		inner: f32,
		outer: f32,
		radius_in: f32,
		radius_out: f32,
		range: f32,
		direction: Vec3,
		position2: IVec3,
		direction2: IVec3,
	},
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
	pub position: Vec3,
	pub color: Color,
	pub kind: LightKind,
	pub detail: LightDetail,
}

const WHITE: Color = Color { r: 0xFF, g: 0xFF, b: 0xFF, a: 0xFF };

impl Readable for Light {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, generation: Generation, diagnostics: &mut Diagnostics) -> Result<Self> {
		Ok(match generation {
			Generation::Tr1 => {
				let position = cursor.read_vertex32()?;
				let intensity = ((8191 - cursor.read_u16()? as i32) << 2) as u16;
				let fade = cursor.read_u32()?;
				Light {
					position,
					color: WHITE,
					kind: LightKind::Point,
					detail: LightDetail::Fade { intensity: [intensity; 2], fade: [fade, 0] },
				}
			},
			Generation::Tr2 => Light {
				position: cursor.read_vertex32()?,
				color: WHITE,
				kind: LightKind::Point,
				detail: LightDetail::Fade {
					intensity: [cursor.read_u16()?, cursor.read_u16()?],
					fade: [cursor.read_u32()?, cursor.read_u32()?],
				},
			},
			Generation::Tr3 => {
				let position = cursor.read_vertex32()?;
				let color = Color::read(cursor, generation, diagnostics)?;
				let fade = [cursor.read_u32()?, cursor.read_u32()?];
				Light {
					position,
					color,
					kind: LightKind::Point,
					detail: LightDetail::Fade { intensity: [0; 2], fade },
				}
			},
			Generation::Tr4 => {
				let position = cursor.read_vertex32()?;
				let color = Color::read(cursor, Generation::Tr1, diagnostics)?;
				let kind = cursor.read_u8()?.into();
				let unknown = cursor.read_u8()?;
				let intensity = cursor.read_u8()?;
				Light {
					position,
					color,
					kind,
					detail: LightDetail::Tr4 {
						intensity,
						unknown,
						hotspot: cursor.read_f32()?,
						falloff: cursor.read_f32()?,
						length: cursor.read_f32()?,
						cutoff: cursor.read_f32()?,
						direction: cursor.read_vertex_f()?,
					},
				}
			},
			Generation::Tr5 => {
				let position = cursor.read_vertex_f()?;
				let mut channel = || -> Result<u8> { Ok((cursor.read_f32()? * 255.0).clamp(0.0, 255.0) as u8) };
				let color = Color { r: channel()?, g: channel()?, b: channel()?, a: 0xFF };
				let detail = LightDetail::Tr5 {
					inner: cursor.read_f32()?,
					outer: cursor.read_f32()?,
					radius_in: cursor.read_f32()?,
					radius_out: cursor.read_f32()?,
					range: cursor.read_f32()?,
					direction: cursor.read_vertex_f()?,
					position2: cursor.read_ivec3()?,
					direction2: cursor.read_ivec3()?,
				};
				let kind = cursor.read_u8()?.into();
				for _ in 0..3 {
					let at = cursor.position();
					let filler = cursor.read_u8()?;
					diagnostics.expect(at, "light filler", &[0xCD], filler as u32);
				}
				Light { position, color, kind, detail }
			},
		})
	}
}

/// Placement of a static mesh inside a room.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoomStaticMesh {
	pub position: Vec3,
	/// Degrees.
	pub rotation: f32,
	pub intensity1: i16,
	pub intensity2: i16,
	/// Matches `StaticMesh::object_id`.
	pub object_id: u16,
	pub tint: Vec4,
}

impl Readable for RoomStaticMesh {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, generation: Generation, _: &mut Diagnostics) -> Result<Self> {
		let position = cursor.read_vertex32()?;
		let rotation = cursor.read_angle()?;
		let mut intensity1 = cursor.read_i16()?;
		let mut intensity2 = match generation {
			Generation::Tr1 => intensity1,
			Generation::Tr2 | Generation::Tr3 | Generation::Tr4 | Generation::Tr5 => cursor.read_i16()?,
		};
		let object_id = cursor.read_u16()?;
		if intensity1 >= 0 {
			intensity1 = invert_intensity(intensity1);
		}
		if intensity2 >= 0 {
			intensity2 = invert_intensity(intensity2);
		}
		let tint = match generation {
			Generation::Tr1 | Generation::Tr2 => grey(intensity2 as f32 / 16384.0),
			Generation::Tr3 | Generation::Tr4 | Generation::Tr5 => {
				//channels are stored blue-high here
				let c = Color16(intensity1 as u16);
				let scale = color16_scale(generation);
				vec4(c.b() as f32 / scale, c.g() as f32 / scale, c.r() as f32 / scale, 1.0)
			},
		};
		Ok(RoomStaticMesh { position, rotation, intensity1, intensity2, object_id, tint })
	}
}

/// TR5 subdivision of a room's geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layer {
	pub num_vertices: u16,
	pub unknown1: u16,
	pub unknown2: u16,
	pub num_quads: u16,
	pub num_triangles: u16,
	pub unknown3: u16,
	pub bounds: MinMax<Vec3>,
	pub unknown4: u32,
	pub unknown5: u32,
	pub unknown6: u32,
}

impl Readable for Layer {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, _: Generation, diagnostics: &mut Diagnostics) -> Result<Self> {
		let num_vertices = cursor.read_u16()?;
		let unknown1 = cursor.read_u16()?;
		let unknown2 = cursor.read_u16()?;
		let num_quads = cursor.read_u16()?;
		let num_triangles = cursor.read_u16()?;
		let unknown3 = cursor.read_u16()?;
		for _ in 0..2 {
			let at = cursor.position();
			let filler = cursor.read_u16()?;
			diagnostics.expect(at, "layer filler", &[0], filler as u32);
		}
		let bounds = MinMax { min: cursor.read_vertex_f()?, max: cursor.read_vertex_f()? };
		let at = cursor.position();
		let filler = cursor.read_u32()?;
		diagnostics.expect(at, "layer filler", &[0], filler);
		Ok(Layer {
			num_vertices,
			unknown1,
			unknown2,
			num_quads,
			num_triangles,
			unknown3,
			bounds,
			unknown4: cursor.read_u32()?,
			unknown5: cursor.read_u32()?,
			unknown6: cursor.read_u32()?,
		})
	}
}

#[derive(Clone, Debug)]
pub struct Room {
	/// World position of the room origin.
	pub offset: Vec3,
	pub y_bottom: f32,
	pub y_top: f32,
	/// TR5.
	pub layers: Box<[Layer]>,
	pub vertices: Box<[RoomVertex]>,
	pub quads: Box<[Quad]>,
	pub triangles: Box<[Triangle]>,
	pub sprites: Box<[RoomSprite]>,
	pub portals: Box<[Portal]>,
	pub num_z_sectors: u16,
	pub num_x_sectors: u16,
	/// `num_z_sectors * num_x_sectors` entries, indexed `x * num_z_sectors + z`.
	pub sectors: Box<[Sector]>,
	pub intensity1: i16,
	pub intensity2: i16,
	/// TR2.
	pub light_mode: i16,
	pub light_color: Vec4,
	pub lights: Box<[Light]>,
	pub static_meshes: Box<[RoomStaticMesh]>,
	/// Index into `Level.rooms`.
	pub alternate_room: Option<NonMaxU16>,
	pub alternate_group: i8,
	pub flags: RoomFlags,
	pub water_scheme: u8,
	pub reverb: Reverb,
}

impl Room {
	pub fn sector(&self, x: u16, z: u16) -> Option<&Sector> {
		if x >= self.num_x_sectors || z >= self.num_z_sectors {
			return None;
		}
		self.sectors.get(x as usize * self.num_z_sectors as usize + z as usize)
	}

	fn empty() -> Self {
		Room {
			offset: Vec3::ZERO,
			y_bottom: 0.0,
			y_top: 0.0,
			layers: Box::default(),
			vertices: Box::default(),
			quads: Box::default(),
			triangles: Box::default(),
			sprites: Box::default(),
			portals: Box::default(),
			num_z_sectors: 0,
			num_x_sectors: 0,
			sectors: Box::default(),
			intensity1: 0,
			intensity2: 0,
			light_mode: 0,
			light_color: Vec4::ONE,
			lights: Box::default(),
			static_meshes: Box::default(),
			alternate_room: None,
			alternate_group: 0,
			flags: RoomFlags(0),
			water_scheme: 0,
			reverb: Reverb::MediumRoom,
		}
	}
}

impl Readable for Room {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, generation: Generation, diagnostics: &mut Diagnostics) -> Result<Self> {
		match generation {
			Generation::Tr1 | Generation::Tr2 | Generation::Tr3 | Generation::Tr4 => read_room(cursor, generation, diagnostics),
			Generation::Tr5 => read_room_tr5(cursor, diagnostics),
		}
	}
}

fn read_sector_grid<R: Read + Seek>(cursor: &mut ByteCursor<R>, room: &mut Room, diagnostics: &mut Diagnostics) -> Result<()> {
	room.num_z_sectors = cursor.read_u16()?;
	room.num_x_sectors = cursor.read_u16()?;
	let len = room.num_z_sectors as usize * room.num_x_sectors as usize;
	room.sectors = read_boxed_slice(cursor, len, Generation::Tr1, diagnostics)?;
	Ok(())
}

fn read_room<R: Read + Seek>(cursor: &mut ByteCursor<R>, generation: Generation, diagnostics: &mut Diagnostics) -> Result<Room> {
	let mut room = Room::empty();
	let x = cursor.read_i32()?;
	let z = cursor.read_i32()?;
	room.offset = vec3(x as f32, 0.0, -(z as f32));
	room.y_bottom = -(cursor.read_i32()? as f32);
	room.y_top = -(cursor.read_i32()? as f32);
	let num_data_words = cursor.read_u32()?;
	let data_start = cursor.position();
	room.vertices = read_list::<_, _, u16>(cursor, generation, diagnostics)?;
	//room faces never carry the lighting word
	room.quads = read_list::<_, _, u16>(cursor, Generation::Tr1, diagnostics)?;
	room.triangles = read_list::<_, _, u16>(cursor, Generation::Tr1, diagnostics)?;
	room.sprites = read_list::<_, _, u16>(cursor, generation, diagnostics)?;
	cursor.seek(SeekFrom::Start(data_start + num_data_words as u64 * 2))?;
	room.portals = read_list::<_, _, u16>(cursor, generation, diagnostics)?;
	read_sector_grid(cursor, &mut room, diagnostics)?;
	match generation {
		Generation::Tr1 => {
			room.intensity1 = invert_intensity(cursor.read_i16()?);
			room.intensity2 = room.intensity1;
		},
		Generation::Tr2 => {
			room.intensity1 = invert_intensity(cursor.read_i16()?);
			room.intensity2 = invert_intensity(cursor.read_i16()?);
			room.light_mode = cursor.read_i16()?;
		},
		Generation::Tr3 | Generation::Tr4 | Generation::Tr5 => {
			room.intensity1 = cursor.read_i16()?;
			room.intensity2 = cursor.read_i16()?;
		},
	}
	room.lights = read_list::<_, _, u16>(cursor, generation, diagnostics)?;
	room.static_meshes = read_list::<_, _, u16>(cursor, generation, diagnostics)?;
	room.alternate_room = Readable::read(cursor, generation, diagnostics)?;
	room.flags = RoomFlags::read(cursor, generation, diagnostics)?;
	match generation {
		Generation::Tr1 => room.reverb = Reverb::MediumRoom,
		Generation::Tr2 => {
			room.reverb = if room.flags.wind() { Reverb::Outside } else { Reverb::MediumRoom };
		},
		Generation::Tr3 => {
			if room.flags.0 & TR3_QUICKSAND != 0 {
				room.flags = RoomFlags((room.flags.0 | QUICKSAND) ^ TR3_QUICKSAND);
			}
			room.water_scheme = cursor.read_u8()?;
			room.reverb = cursor.read_u8()?.into();
			cursor.skip(1)?;
		},
		Generation::Tr4 | Generation::Tr5 => {
			room.water_scheme = cursor.read_u8()?;
			room.reverb = cursor.read_u8()?.into();
			room.alternate_group = cursor.read_i8()?;
		},
	}
	room.light_color = match generation {
		Generation::Tr1 => grey(room.intensity1 as f32 / 32767.0),
		Generation::Tr2 => grey(room.intensity1 as f32 / 16384.0),
		Generation::Tr3 => grey(room.intensity1 as f32 / 65534.0),
		Generation::Tr4 | Generation::Tr5 => {
			let [i1_low, i1_high] = room.intensity1.to_le_bytes();
			let [i2_low, i2_high] = room.intensity2.to_le_bytes();
			vec4(i2_low as f32, i1_high as f32, i1_low as f32, i2_high as f32) / 255.0
		},
	};
	Ok(room)
}

fn expect_u32<R: Read + Seek>(
	cursor: &mut ByteCursor<R>,
	diagnostics: &mut Diagnostics,
	field: &'static str,
	expected: &'static [u32],
) -> Result<u32> {
	let at = cursor.position();
	let value = cursor.read_u32()?;
	diagnostics.expect(at, field, expected, value);
	Ok(value)
}

fn separator<R: Read + Seek>(cursor: &mut ByteCursor<R>, diagnostics: &mut Diagnostics) -> Result<()> {
	expect_u32(cursor, diagnostics, "room separator", &[TR5_SEPARATOR])?;
	Ok(())
}

fn read_room_tr5<R: Read + Seek>(cursor: &mut ByteCursor<R>, diagnostics: &mut Diagnostics) -> Result<Room> {
	let generation = Generation::Tr5;
	let mut room = Room::empty();
	//TR5 rooms take their light from `light_color`
	room.intensity1 = 0x7FFF;
	room.intensity2 = 0x7FFF;
	expect_u32(cursor, diagnostics, "room marker", &[TR5_ROOM_MARKER])?;
	let size = cursor.read_u32()?;
	let start = cursor.position();
	let end = start + size as u64;
	let data = start + TR5_ROOM_HEADER_LEN;

	separator(cursor, diagnostics)?;
	let _portal_offset = cursor.read_i32()?;
	let sector_offset = cursor.read_u32()?;
	expect_u32(cursor, diagnostics, "room separator", &[0, TR5_SEPARATOR])?;
	let static_mesh_offset = cursor.read_u32()?;
	let x = cursor.read_i32()?;
	let y = cursor.read_u32()?;
	let z = cursor.read_i32()?;
	room.offset = vec3(x as f32, y as f32, -(z as f32));
	room.y_bottom = -(cursor.read_i32()? as f32);
	room.y_top = -(cursor.read_i32()? as f32);
	room.num_z_sectors = cursor.read_u16()?;
	room.num_x_sectors = cursor.read_u16()?;
	let [b, g, r, _] = <[u8; 4]>::read(cursor, generation, diagnostics)?;
	room.light_color = vec4(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0);
	let at = cursor.position();
	let num_lights = cursor.read_u16()? as u32;
	diagnostics.check_max(at, "room lights", num_lights, TR5_MAX_LIGHTS);
	let at = cursor.position();
	let num_static_meshes = cursor.read_u16()? as u32;
	diagnostics.check_max(at, "room static meshes", num_static_meshes, TR5_MAX_STATIC_MESHES);
	room.reverb = cursor.read_u8()?.into();
	room.alternate_group = cursor.read_i8()?;
	room.water_scheme = cursor.read_u16()? as u8;
	expect_u32(cursor, diagnostics, "room filler", &[0x7FFF])?;
	expect_u32(cursor, diagnostics, "room filler", &[0x7FFF])?;
	separator(cursor, diagnostics)?;
	separator(cursor, diagnostics)?;
	expect_u32(cursor, diagnostics, "room filler", &[0xFFFFFFFF])?;
	room.alternate_room = Readable::read(cursor, generation, diagnostics)?;
	room.flags = RoomFlags::read(cursor, generation, diagnostics)?;
	cursor.skip(12)?;
	expect_u32(cursor, diagnostics, "room separator", &[0, TR5_SEPARATOR])?;
	//two unknown words, room x, an unknown dword, room z
	cursor.skip(16)?;
	for _ in 0..4 {
		separator(cursor, diagnostics)?;
	}
	expect_u32(cursor, diagnostics, "room separator", &[0, TR5_SEPARATOR])?;
	separator(cursor, diagnostics)?;
	let mut face_count = |max: u32, field: &'static str| -> Result<u32> {
		let at = cursor.position();
		let count = match cursor.read_u32()? {
			TR5_SEPARATOR => 0,
			count => count,
		};
		diagnostics.check_max(at, field, count, max);
		Ok(count)
	};
	let num_triangles = face_count(TR5_MAX_TRIANGLES, "room triangles")?;
	let num_quads = face_count(TR5_MAX_QUADS, "room quads")?;
	expect_u32(cursor, diagnostics, "room separator", &[0])?;
	let _light_size = cursor.read_u32()?;
	let num_lights2 = cursor.read_u32()?;
	if num_lights2 != num_lights {
		return Err(Error::Inconsistent {
			what: format!("room light counts differ: {} and {}", num_lights, num_lights2),
			position: cursor.position(),
		});
	}
	//unknown dword, room y top and bottom
	cursor.skip(12)?;
	let num_layers = cursor.read_u32()?;
	let layer_offset = cursor.read_u32()?;
	let vertex_offset = cursor.read_u32()?;
	let face_offset = cursor.read_u32()?;
	let face_offset2 = cursor.read_u32()?;
	if face_offset != face_offset2 {
		return Err(Error::Inconsistent {
			what: format!("room face offsets differ: {} and {}", face_offset, face_offset2),
			position: cursor.position(),
		});
	}
	let vertices_size = cursor.read_u32()?;
	if vertices_size % TR5_VERTEX_LEN != 0 {
		return Err(Error::Inconsistent {
			what: format!("room vertex data size {} is not a multiple of {}", vertices_size, TR5_VERTEX_LEN),
			position: cursor.position(),
		});
	}
	for _ in 0..4 {
		separator(cursor, diagnostics)?;
	}

	room.lights = read_boxed_slice(cursor, num_lights as usize, generation, diagnostics)?;

	cursor.seek(SeekFrom::Start(data + sector_offset as u64))?;
	let len = room.num_z_sectors as usize * room.num_x_sectors as usize;
	room.sectors = read_boxed_slice(cursor, len, generation, diagnostics)?;
	room.portals = read_list::<_, _, u16>(cursor, generation, diagnostics)?;

	cursor.seek(SeekFrom::Start(data + static_mesh_offset as u64))?;
	room.static_meshes = read_boxed_slice(cursor, num_static_meshes as usize, Generation::Tr4, diagnostics)?;

	cursor.seek(SeekFrom::Start(data + layer_offset as u64))?;
	room.layers = read_boxed_slice(cursor, num_layers as usize, generation, diagnostics)?;

	cursor.seek(SeekFrom::Start(data + face_offset as u64))?;
	let mut quads = Vec::new();
	let mut triangles = Vec::new();
	let mut first_vertex = 0u16;
	for layer in room.layers.iter() {
		for _ in 0..layer.num_quads {
			let mut quad = Quad::read(cursor, Generation::Tr4, diagnostics)?;
			quad.vertex_indices = quad.vertex_indices.map(|v| v.wrapping_add(first_vertex));
			quads.push(quad);
		}
		for _ in 0..layer.num_triangles {
			let mut triangle = Triangle::read(cursor, Generation::Tr4, diagnostics)?;
			triangle.vertex_indices = triangle.vertex_indices.map(|v| v.wrapping_add(first_vertex));
			triangles.push(triangle);
		}
		first_vertex = first_vertex.wrapping_add(layer.num_vertices);
	}
	room.quads = quads.into_boxed_slice();
	room.triangles = triangles.into_boxed_slice();

	cursor.seek(SeekFrom::Start(data + vertex_offset as u64))?;
	let num_vertices = room.layers.iter().map(|l| l.num_vertices as usize).sum::<usize>();
	room.vertices = read_boxed_slice(cursor, num_vertices, generation, diagnostics)?;

	let counts = [
		("room vertices", vertices_size / TR5_VERTEX_LEN, room.vertices.len()),
		("room quads", num_quads, room.quads.len()),
		("room triangles", num_triangles, room.triangles.len()),
	];
	for (field, declared, found) in counts {
		if declared as usize != found {
			diagnostics.push(start, DiagnosticKind::CountMismatch { field, declared, found: found as u32 });
		}
	}

	cursor.seek(SeekFrom::Start(end))?;
	Ok(room)
}
