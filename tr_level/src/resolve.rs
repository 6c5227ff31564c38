//! Turns stored byte offsets into indices of deduplicated tables.

use std::io::{Read, Seek, SeekFrom};
use log::debug;
use crate::{
	model::{Mesh, Moveable}, read::Readable, ByteCursor, DiagnosticKind, Diagnostics, Generation, Result,
};

/// Items read once per distinct offset, in ascending offset order.
#[derive(Clone, Debug)]
pub struct Resolved<T> {
	pub items: Box<[T]>,
	/// Logical index into `items` for each input offset.
	pub indices: Box<[u32]>,
}

/// Calls `read_at` once for each distinct offset, smallest first.
/// Equal offsets share an index, so the result does not depend on input order.
pub fn resolve_offsets<T, F>(offsets: &[u32], mut read_at: F) -> Result<Resolved<T>>
where F: FnMut(u32) -> Result<T> {
	let mut unique = offsets.to_vec();
	unique.sort_unstable();
	unique.dedup();
	let items = unique.iter().map(|&offset| read_at(offset)).collect::<Result<Box<[T]>>>()?;
	let indices = offsets
		.iter()
		.map(|offset| unique.binary_search(offset).unwrap_or_else(|i| i) as u32)
		.collect();
	Ok(Resolved { items, indices })
}

/// Reads the mesh blob and its pointer table, then one `Mesh` per distinct pointer.
/// Leaves the cursor after the pointer table.
pub fn read_meshes<R: Read + Seek>(
	cursor: &mut ByteCursor<R>,
	generation: Generation,
	diagnostics: &mut Diagnostics,
) -> Result<Resolved<Mesh>> {
	let num_words = cursor.read_u32()?;
	let blob_start = cursor.position();
	let blob_len = num_words as u64 * 2;
	cursor.skip(blob_len)?;
	let num_pointers = cursor.read_u32()?;
	let pointers = cursor.read_array(num_pointers as usize, |c| c.read_u32())?;
	let end = cursor.position();
	let resolved = resolve_offsets(&pointers, |offset| {
		if offset as u64 >= blob_len {
			diagnostics.push(cursor.position(), DiagnosticKind::OutOfRange {
				field: "mesh pointer",
				value: offset,
				len: blob_len as usize,
			});
		}
		cursor.seek(SeekFrom::Start(blob_start + offset as u64))?;
		Mesh::read(cursor, generation, diagnostics)
	})?;
	cursor.seek(SeekFrom::Start(end))?;
	debug!("{} mesh pointers, {} meshes", pointers.len(), resolved.items.len());
	Ok(resolved)
}

/// Gives each moveable a `frame_index` into the returned offsets and clears its `frame_offset`.
pub fn resolve_frames(moveables: &mut [Moveable]) -> Result<Box<[u32]>> {
	let offsets = moveables.iter().map(|m| m.frame_offset).collect::<Vec<_>>();
	let resolved = resolve_offsets(&offsets, Ok)?;
	for (moveable, &index) in moveables.iter_mut().zip(resolved.indices.iter()) {
		moveable.frame_index = index;
		moveable.frame_offset = 0;
	}
	Ok(resolved.items)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn duplicate_offsets_share_indices() {
		let mut visited = Vec::new();
		let resolved = resolve_offsets(&[0, 8, 0, 16], |offset| {
			visited.push(offset);
			Ok(offset * 10)
		}).unwrap();
		assert_eq!(&*resolved.indices, &[0, 1, 0, 2]);
		assert_eq!(&*resolved.items, &[0, 80, 160]);
		assert_eq!(visited, [0, 8, 16]);
	}

	#[test]
	fn input_order_does_not_matter() {
		let a = resolve_offsets(&[16, 0, 8, 16], Ok).unwrap();
		let b = resolve_offsets(&[8, 16, 16, 0], Ok).unwrap();
		assert_eq!(a.items, b.items);
		assert_eq!(&*a.indices, &[2, 0, 1, 2]);
		assert_eq!(&*b.indices, &[1, 2, 2, 0]);
	}

	#[test]
	fn read_errors_propagate() {
		let result = resolve_offsets(&[4], |offset| -> Result<u32> {
			Err(crate::Error::UnexpectedEnd { position: offset as u64 })
		});
		assert!(result.is_err());
	}

	#[test]
	fn empty_table() {
		let resolved = resolve_offsets::<u32, _>(&[], Ok).unwrap();
		assert!(resolved.items.is_empty());
		assert!(resolved.indices.is_empty());
	}

	fn empty_mesh() -> Vec<u8> {
		//centre, collision size, then zero counts for vertices, normals and four face lists
		let mut bytes = vec![0; 6];
		bytes.extend_from_slice(&0i32.to_le_bytes());
		bytes.extend_from_slice(&[0; 12]);
		bytes
	}

	#[test]
	fn meshes_are_read_once_per_pointer() {
		let mesh = empty_mesh();
		let mut bytes = Vec::new();
		bytes.extend_from_slice(&((mesh.len() * 2 / 2) as u32).to_le_bytes());
		bytes.extend_from_slice(&mesh);
		bytes.extend_from_slice(&mesh);
		bytes.extend_from_slice(&3u32.to_le_bytes());
		for pointer in [mesh.len() as u32, 0, mesh.len() as u32] {
			bytes.extend_from_slice(&pointer.to_le_bytes());
		}
		bytes.push(0xAB);
		let mut cursor = ByteCursor::from_slice(&bytes);
		let mut diag = Diagnostics::new();
		let resolved = read_meshes(&mut cursor, Generation::Tr1, &mut diag).unwrap();
		assert_eq!(resolved.items.len(), 2);
		assert_eq!(&*resolved.indices, &[1, 0, 1]);
		assert_eq!(cursor.remaining(), 1);
		assert!(diag.is_empty());
	}

	#[test]
	fn frames_resolve_to_sorted_offsets() {
		let moveable = |frame_offset| Moveable {
			object_id: 0,
			num_meshes: 1,
			starting_mesh: 0,
			mesh_tree_index: 0,
			frame_offset,
			frame_index: 0,
			animation_index: None,
		};
		let mut moveables = [moveable(40), moveable(0), moveable(40)];
		let offsets = resolve_frames(&mut moveables).unwrap();
		assert_eq!(&*offsets, &[0, 40]);
		assert_eq!(moveables.map(|m| (m.frame_index, m.frame_offset)), [(1, 0), (0, 0), (1, 0)]);
	}
}
