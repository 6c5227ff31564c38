//! Byte builder for synthetic level images.

#![allow(dead_code)]

pub const PAGE_AREA: usize = 256 * 256;

#[derive(Default)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn u8(&mut self, v: u8) -> &mut Self {
		self.0.push(v);
		self
	}

	pub fn u16(&mut self, v: u16) -> &mut Self {
		self.0.extend_from_slice(&v.to_le_bytes());
		self
	}

	pub fn i16(&mut self, v: i16) -> &mut Self {
		self.0.extend_from_slice(&v.to_le_bytes());
		self
	}

	pub fn u32(&mut self, v: u32) -> &mut Self {
		self.0.extend_from_slice(&v.to_le_bytes());
		self
	}

	pub fn i32(&mut self, v: i32) -> &mut Self {
		self.0.extend_from_slice(&v.to_le_bytes());
		self
	}

	pub fn bytes(&mut self, v: &[u8]) -> &mut Self {
		self.0.extend_from_slice(v);
		self
	}

	pub fn zeros(&mut self, len: usize) -> &mut Self {
		self.0.resize(self.0.len() + len, 0);
		self
	}

	/// `num` empty u32-counted tables.
	pub fn empty_lists(&mut self, num: usize) -> &mut Self {
		self.zeros(num * 4)
	}

	pub fn block(&mut self, data: &[u8]) -> &mut Self {
		let compressed = zlib_stored(data);
		self.u32(data.len() as u32).u32(compressed.len() as u32).bytes(&compressed)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}
}

fn adler32(data: &[u8]) -> u32 {
	let (mut a, mut b) = (1u32, 0u32);
	for &byte in data {
		a = (a + byte as u32) % 65521;
		b = (b + a) % 65521;
	}
	(b << 16) | a
}

/// Zlib stream of stored deflate blocks, which any inflater accepts.
pub fn zlib_stored(data: &[u8]) -> Vec<u8> {
	let mut out = vec![0x78, 0x01];
	let mut chunks = data.chunks(0xFFFF).peekable();
	if chunks.peek().is_none() {
		out.extend_from_slice(&[1, 0, 0, 0xFF, 0xFF]);
	}
	while let Some(chunk) = chunks.next() {
		out.push(chunks.peek().is_none() as u8);
		let len = chunk.len() as u16;
		out.extend_from_slice(&len.to_le_bytes());
		out.extend_from_slice(&(!len).to_le_bytes());
		out.extend_from_slice(chunk);
	}
	out.extend_from_slice(&adler32(data).to_be_bytes());
	out
}

/// Unused word, rooms, floor data, meshes, then animations through moveables, all empty.
pub fn empty_geometry(b: &mut Bytes, rooms_u32: bool) {
	b.u32(0);
	if rooms_u32 {
		b.u32(0);
	} else {
		b.u16(0);
	}
	//floor data, mesh words, mesh pointers
	b.empty_lists(3);
	//animations, state changes, dispatches, commands, mesh tree, frames, moveables
	b.empty_lists(7);
}

/// Sound map of `len` entries, all "none".
pub fn sound_map(b: &mut Bytes, len: usize) {
	for _ in 0..len {
		b.i16(-1);
	}
}

pub fn palette(b: &mut Bytes, entry_len: usize, first: [u8; 3]) {
	b.zeros(entry_len);
	b.bytes(&first);
	b.zeros(entry_len - 3);
	b.zeros(entry_len * 254);
}

pub fn tr1_level(demo_or_ub: bool, pages: &[Vec<u8>], rooms: &[u8]) -> Bytes {
	let mut b = Bytes::new();
	b.u32(0x20).u32(pages.len() as u32);
	for page in pages {
		b.bytes(page);
	}
	b.u32(0);
	b.u16(if rooms.is_empty() { 0 } else { 1 }).bytes(rooms);
	b.empty_lists(10);
	//static meshes, object textures, sprite textures, sequences
	b.empty_lists(4);
	if demo_or_ub {
		palette(&mut b, 3, [10, 20, 30]);
	}
	//cameras, sound sources, boxes, overlaps, animated textures, items
	b.empty_lists(6);
	b.zeros(32 * 256);
	if !demo_or_ub {
		palette(&mut b, 3, [10, 20, 30]);
	}
	b.u16(0).u16(0);
	sound_map(&mut b, 256);
	//sound details, sample bytes, sample indices
	b.empty_lists(3);
	b
}

/// Light map whose first byte is 1, so that reading it as a count goes wrong.
fn light_map(b: &mut Bytes) {
	b.u8(1).zeros(32 * 256 - 1);
}

/// Demo files store the light map before the cameras.
pub fn tr2_level(demo: bool, sound_details: &[[u16; 4]], sample_indices: &[u32]) -> Bytes {
	let mut b = Bytes::new();
	b.u32(0x2D);
	palette(&mut b, 3, [1, 2, 3]);
	palette(&mut b, 4, [1, 2, 3]);
	b.u32(0);
	empty_geometry(&mut b, false);
	//static meshes, object textures, sprite textures, sequences
	b.empty_lists(4);
	if demo {
		light_map(&mut b);
	}
	//cameras, sound sources, boxes, overlaps, animated textures, items
	b.empty_lists(6);
	if !demo {
		light_map(&mut b);
	}
	b.u16(0).u16(0);
	sound_map(&mut b, 370);
	b.u32(sound_details.len() as u32);
	for details in sound_details {
		for word in details {
			b.u16(*word);
		}
	}
	b.u32(sample_indices.len() as u32);
	for index in sample_indices {
		b.u32(*index);
	}
	b
}

pub fn tr3_level() -> Bytes {
	let mut b = Bytes::new();
	b.u32(0xFF080038);
	palette(&mut b, 3, [1, 2, 3]);
	palette(&mut b, 4, [1, 2, 3]);
	b.u32(0);
	empty_geometry(&mut b, false);
	//static meshes, sprite textures, sequences
	b.empty_lists(3);
	//cameras, sound sources, boxes, overlaps, animated textures
	b.empty_lists(5);
	//object textures, items
	b.empty_lists(2);
	b.zeros(32 * 256);
	b.u16(0).u16(0);
	sound_map(&mut b, 370);
	b.empty_lists(2);
	b
}

/// Packed geometry of a TR4 level. `spr` replaces the sprite marker.
pub fn tr4_geometry(spr: &[u8], mesh_pointers: &[u32], items: &[[u8; 24]]) -> Vec<u8> {
	let mut b = Bytes::new();
	b.u32(0).u16(0).u32(0);
	//one mesh: centre, collision size, no vertices, normals or faces
	let mesh_len = 6 + 4 + 2 * 4;
	b.u32(mesh_len as u32 / 2);
	b.i16(0).i16(0).i16(0).i32(100).zeros(8);
	b.u32(mesh_pointers.len() as u32);
	for pointer in mesh_pointers {
		b.u32(*pointer);
	}
	b.empty_lists(7);
	b.u32(0);
	b.bytes(spr);
	//sprite textures, sequences, cameras, flyby cameras, sound sources, boxes, overlaps, animated textures
	b.empty_lists(8);
	b.u8(0).bytes(b"TEX");
	b.u32(0);
	b.u32(items.len() as u32);
	for item in items {
		b.bytes(item);
	}
	b.u32(0);
	b.u16(0);
	sound_map(&mut b, 370);
	b.empty_lists(2);
	b.0
}

pub fn tr4_level(pages32: &[Vec<u8>], geometry: &[u8], samples: &[u8]) -> Bytes {
	let mut b = Bytes::new();
	b.u32(0x00345254);
	b.u16(pages32.len() as u16).u16(0).u16(0);
	if pages32.is_empty() {
		b.u32(1).u32(0);
	} else {
		b.block(&pages32.concat());
	}
	b.u32(1).u32(0);
	b.u32(PAGE_AREA as u32 * 4 * 2).u32(0);
	b.block(geometry);
	b.u32(if samples.is_empty() { 0 } else { 1 }).bytes(samples);
	b
}

pub fn tr5_level(padding: [u32; 7], rooms: &[Vec<u8>]) -> Bytes {
	let mut b = Bytes::new();
	b.u32(0x00345254);
	b.u16(0).u16(0).u16(0);
	for _ in 0..3 {
		b.u32(1).u32(0);
	}
	b.u16(3).u16(2);
	for word in padding {
		b.u32(word);
	}
	b.u32(0).u32(0);
	b.u32(0).u32(rooms.len() as u32);
	for room in rooms {
		b.bytes(room);
	}
	//floor data, mesh words, mesh pointers
	b.empty_lists(3);
	//animations, state changes, dispatches, commands, mesh tree, frames, moveables
	b.empty_lists(7);
	b.u32(0).bytes(b"SPR\0");
	b.empty_lists(8);
	b.u8(0).bytes(b"TEX\0");
	//object textures, items, ai objects
	b.empty_lists(3);
	b.u16(0);
	sound_map(&mut b, 450);
	b.empty_lists(2);
	b.zeros(6);
	b.u32(0);
	b
}

pub const TR5_SEPARATOR: u32 = 0xCDCDCDCD;

/// Knobs for `tr5_room`.
pub struct Tr5Room {
	/// Written in place of the first separator.
	pub first_separator: u32,
	/// Stored triangle count, 0xCDCDCDCD meaning none.
	pub num_triangles: u32,
	pub num_lights: u16,
	pub num_lights2: u32,
}

impl Default for Tr5Room {
	fn default() -> Self {
		Tr5Room { first_separator: TR5_SEPARATOR, num_triangles: 1, num_lights: 0, num_lights2: 0 }
	}
}

/// One TR5 room of 1x1 sectors and two layers: four vertices and a quad, then
/// three vertices and a triangle. Each layer's faces count from its first vertex.
pub fn tr5_room(room: &Tr5Room) -> Vec<u8> {
	const HEADER_LEN: u32 = 208;
	let sector_offset = 0u32;
	let static_mesh_offset = 8 + 2;
	let layer_offset = static_mesh_offset;
	let face_offset = layer_offset + 2 * 56;
	let vertex_offset = face_offset + 12 + 10;
	let vertices_size = 7 * 28;
	//bytes after the vertices that the room size still covers
	let tail = 4;
	let size = HEADER_LEN + vertex_offset + vertices_size + tail;

	let mut b = Bytes::new();
	b.bytes(b"XELA").u32(size);
	b.u32(room.first_separator);
	b.i32(0).u32(sector_offset).u32(0).u32(static_mesh_offset);
	//x, y, z, y bottom, y top
	b.i32(1024).u32(0).i32(2048).i32(0).i32(-512);
	b.u16(1).u16(1);
	//b, g, r, a
	b.bytes(&[0, 0x80, 0xFF, 0]);
	b.u16(room.num_lights).u16(0);
	b.u8(2).u8(0).u16(0);
	b.u32(0x7FFF).u32(0x7FFF);
	b.u32(TR5_SEPARATOR).u32(TR5_SEPARATOR);
	b.u32(0xFFFFFFFF);
	//no alternate room, flags
	b.u16(0xFFFF).u16(0);
	b.zeros(12);
	b.u32(0);
	b.zeros(16);
	for _ in 0..4 {
		b.u32(TR5_SEPARATOR);
	}
	b.u32(0).u32(TR5_SEPARATOR);
	b.u32(room.num_triangles).u32(1);
	b.u32(0);
	b.u32(0).u32(room.num_lights2);
	b.zeros(12);
	b.u32(2).u32(layer_offset).u32(vertex_offset).u32(face_offset).u32(face_offset);
	b.u32(vertices_size);
	for _ in 0..4 {
		b.u32(TR5_SEPARATOR);
	}
	assert_eq!(b.len(), 8 + HEADER_LEN as usize);

	//sector: floor data, box, room below, floor, room above, ceiling
	b.u16(0).u16(3).u8(0xFF).u8(0).u8(0xFF).u8(0xFC);
	b.u16(0);
	for (num_vertices, num_quads, num_triangles) in [(4u16, 1u16, 0u16), (3, 0, 1)] {
		b.u16(num_vertices).u16(0).u16(0).u16(num_quads).u16(num_triangles).u16(0);
		b.u16(0).u16(0);
		b.zeros(6 * 4);
		b.u32(0);
		b.zeros(12);
	}
	//quad and triangle, each with texture and lighting words
	b.u16(0).u16(1).u16(2).u16(3).u16(5).u16(0);
	b.u16(0).u16(1).u16(2).u16(6).u16(0);
	for i in 0..7u8 {
		b.bytes(&(i as f32).to_le_bytes()).zeros(8);
		b.zeros(12);
		b.bytes(&[0xFF, 0xFF, 0xFF, 0xFF]);
	}
	b.zeros(tail as usize);
	assert_eq!(b.len(), 8 + size as usize);
	b.0
}
