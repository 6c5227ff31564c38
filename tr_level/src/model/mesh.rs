use std::io::{Read, Seek};
use glam::{vec3, Vec3};
use shared::min_max::{MinMax, VecMinMaxFromIterator};
use crate::{read::Readable, ByteCursor, Diagnostics, Generation, Result};

const DOUBLE_SIDED: u16 = 0x8000;

/// Polygon with `N` vertex indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Face<const N: usize> {
	/// Indices into the owner's vertices.
	pub vertex_indices: [u16; N],
	/// Object texture index, or palette color for colored mesh faces.
	pub texture: u16,
	/// TR4+ mesh faces only, 0 elsewhere.
	pub lighting: u16,
}

pub type Quad = Face<4>;
pub type Triangle = Face<3>;

impl<const N: usize> Face<N> {
	pub fn texture_index(&self) -> u16 {
		self.texture & !DOUBLE_SIDED
	}

	pub fn double_sided(&self) -> bool {
		self.texture & DOUBLE_SIDED != 0
	}

	/// Alpha is taken from intensity.
	pub fn additive(&self) -> bool {
		self.lighting & 1 != 0
	}

	pub fn shininess(&self) -> u16 {
		(self.lighting >> 1) & 0x7F
	}
}

/// The lighting word is part of the layout in TR4+.
impl<const N: usize> Readable for Face<N> {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, generation: Generation, diagnostics: &mut Diagnostics) -> Result<Self> {
		let vertex_indices = <[u16; N]>::read(cursor, generation, diagnostics)?;
		let texture = cursor.read_u16()?;
		let lighting = match generation {
			Generation::Tr1 | Generation::Tr2 | Generation::Tr3 => 0,
			Generation::Tr4 | Generation::Tr5 => cursor.read_u16()?,
		};
		Ok(Face { vertex_indices, texture, lighting })
	}
}

#[derive(Clone, Debug, PartialEq)]
pub enum MeshLighting {
	Normals(Box<[Vec3]>),
	/// Per-vertex intensities, used when the stored count is negative.
	Lights(Box<[i16]>),
}

#[derive(Clone, Debug)]
pub struct Mesh {
	pub centre: Vec3,
	pub collision_size: i32,
	pub vertices: Box<[Vec3]>,
	pub lighting: MeshLighting,
	pub textured_quads: Box<[Quad]>,
	pub textured_triangles: Box<[Triangle]>,
	/// Before TR4.
	pub colored_quads: Box<[Quad]>,
	/// Before TR4.
	pub colored_triangles: Box<[Triangle]>,
}

impl Mesh {
	pub fn bounds(&self) -> Option<MinMax<Vec3>> {
		self.vertices.iter().copied().min_max()
	}

	pub fn num_faces(&self) -> usize {
		self.textured_quads.len() + self.textured_triangles.len() + self.colored_quads.len() + self.colored_triangles.len()
	}
}

fn read_faces<R: Read + Seek, const N: usize>(
	cursor: &mut ByteCursor<R>,
	generation: Generation,
	diagnostics: &mut Diagnostics,
) -> Result<Box<[Face<N>]>> {
	let len = cursor.read_i16()?.max(0) as usize;
	crate::read::read_boxed_slice(cursor, len, generation, diagnostics)
}

impl Readable for Mesh {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, generation: Generation, diagnostics: &mut Diagnostics) -> Result<Self> {
		let centre = cursor.read_vertex16()?;
		let collision_size = cursor.read_i32()?;
		let num_vertices = cursor.read_i16()?.max(0) as usize;
		let vertices = cursor.read_array(num_vertices, |c| c.read_vertex16())?;
		let num_normals = cursor.read_i16()?;
		let lighting = if num_normals >= 0 {
			MeshLighting::Normals(cursor.read_array(num_normals as usize, |c| c.read_vertex16())?)
		} else {
			MeshLighting::Lights(cursor.read_array(num_normals.unsigned_abs() as usize, |c| c.read_i16())?)
		};
		let textured_quads = read_faces(cursor, generation, diagnostics)?;
		let textured_triangles = read_faces(cursor, generation, diagnostics)?;
		let (colored_quads, colored_triangles) = match generation {
			Generation::Tr1 | Generation::Tr2 | Generation::Tr3 => (
				read_faces(cursor, generation, diagnostics)?,
				read_faces(cursor, generation, diagnostics)?,
			),
			Generation::Tr4 | Generation::Tr5 => (Box::default(), Box::default()),
		};
		Ok(Mesh {
			centre,
			collision_size,
			vertices,
			lighting,
			textured_quads,
			textured_triangles,
			colored_quads,
			colored_triangles,
		})
	}
}

pub mod static_mesh_flags {
	pub const NON_COLLIDABLE: u16 = 1;
	pub const VISIBLE: u16 = 2;
}

/// Non-animated object placed in rooms.
#[derive(Clone, Copy, Debug)]
pub struct StaticMesh {
	pub object_id: u32,
	/// Index into `Level.mesh_indices`.
	pub mesh: u16,
	/// Bounds as stored, with y and z flipped.
	pub visibility_box: MinMax<Vec3>,
	pub collision_box: MinMax<Vec3>,
	pub flags: u16,
}

fn read_bounding_box<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<MinMax<Vec3>> {
	let mut read = || -> Result<f32> { Ok(cursor.read_i16()? as f32) };
	let (x_min, x_max) = (read()?, read()?);
	let (y_min, y_max) = (-read()?, -read()?);
	let (z_min, z_max) = (-read()?, -read()?);
	Ok(MinMax {
		min: vec3(x_min, y_min, z_min),
		max: vec3(x_max, y_max, z_max),
	})
}

impl Readable for StaticMesh {
	fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>, _: Generation, _: &mut Diagnostics) -> Result<Self> {
		Ok(StaticMesh {
			object_id: cursor.read_u32()?,
			mesh: cursor.read_u16()?,
			visibility_box: read_bounding_box(cursor)?,
			collision_box: read_bounding_box(cursor)?,
			flags: cursor.read_u16()?,
		})
	}
}
