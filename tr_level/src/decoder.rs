use std::io::{Cursor, Read, Seek};
use compress::zlib::Decoder;
use log::debug;
use crate::{ByteCursor, Error, OwnedCursor, Result};

/// Deflate cannot expand input by more than this factor.
const MAX_DEFLATE_RATIO: usize = 1032;

/// Inflates a zlib stream that must expand to exactly `uncompressed_len` bytes.
/// Output past `uncompressed_len + 1` bytes is never produced.
pub fn decode(uncompressed_len: u32, compressed: Box<[u8]>) -> Result<OwnedCursor> {
	let capacity = (uncompressed_len as usize).min(compressed.len().saturating_mul(MAX_DEFLATE_RATIO));
	let mut decoder = Decoder::new(Cursor::new(compressed));
	let mut bytes = Vec::with_capacity(capacity);
	decoder
		.by_ref()
		.take(uncompressed_len as u64 + 1)
		.read_to_end(&mut bytes)
		.map_err(|e| Error::Decompression(e.to_string()))?;
	if bytes.len() != uncompressed_len as usize {
		return Err(Error::Decompression(format!(
			"expected {} bytes, got {}", uncompressed_len, bytes.len(),
		)));
	}
	Ok(ByteCursor::from_boxed(bytes.into_boxed_slice()))
}

/// Header of a compressed block: uncompressed length then compressed length.
#[derive(Clone, Copy, Debug)]
pub struct BlockHeader {
	pub uncompressed_len: u32,
	pub compressed_len: u32,
}

impl BlockHeader {
	pub fn read<R: Read + Seek>(cursor: &mut ByteCursor<R>) -> Result<Self> {
		Ok(BlockHeader { uncompressed_len: cursor.read_u32()?, compressed_len: cursor.read_u32()? })
	}

	/// Fails when the uncompressed length is 0, the section being mandatory.
	pub fn require_data(self, section: &'static str) -> Result<Self> {
		match self.uncompressed_len {
			0 => Err(Error::ZeroUncompressedSize { section }),
			_ => Ok(self),
		}
	}
}

/// Reads the compressed bytes following `header` and inflates them.
pub fn read_block<R: Read + Seek>(cursor: &mut ByteCursor<R>, header: BlockHeader) -> Result<OwnedCursor> {
	let compressed = cursor.read_bytes(header.compressed_len as usize)?;
	debug!("inflating {} bytes into {}", header.compressed_len, header.uncompressed_len);
	decode(header.uncompressed_len, compressed)
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;

	fn adler32(data: &[u8]) -> u32 {
		let (mut a, mut b) = (1u32, 0u32);
		for &byte in data {
			a = (a + byte as u32) % 65521;
			b = (b + a) % 65521;
		}
		(b << 16) | a
	}

	/// Zlib stream made of stored (uncompressed) deflate blocks.
	pub(crate) fn zlib_stored(data: &[u8]) -> Vec<u8> {
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

	#[test]
	fn inflates_exact_length() {
		let data: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
		let compressed = zlib_stored(&data).into_boxed_slice();
		let mut cursor = decode(data.len() as u32, compressed).unwrap();
		assert_eq!(cursor.len(), data.len() as u64);
		assert_eq!(cursor.read_u8().unwrap(), 0);
		assert_eq!(cursor.read_u8().unwrap(), 1);
	}

	#[test]
	fn length_mismatch_is_an_error() {
		let compressed = zlib_stored(&[1, 2, 3, 4]).into_boxed_slice();
		assert!(matches!(decode(5, compressed), Err(Error::Decompression(_))));
	}

	#[test]
	fn forged_length_is_rejected() {
		let compressed = zlib_stored(&[1, 2, 3]).into_boxed_slice();
		match decode(u32::MAX, compressed) {
			Err(Error::Decompression(message)) => assert!(message.contains("got 3"), "{}", message),
			other => panic!("expected Decompression, got {:?}", other.map(|c| c.len())),
		}
	}

	#[test]
	fn output_stops_past_declared_length() {
		let data = vec![7u8; 200_000];
		let compressed = zlib_stored(&data).into_boxed_slice();
		match decode(10, compressed) {
			Err(Error::Decompression(message)) => assert!(message.contains("expected 10 bytes, got 11"), "{}", message),
			other => panic!("expected Decompression, got {:?}", other.map(|c| c.len())),
		}
	}

	#[test]
	fn zero_uncompressed_size_is_fatal() {
		let header = BlockHeader { uncompressed_len: 0, compressed_len: 10 };
		assert!(matches!(
			header.require_data("packed geometry"),
			Err(Error::ZeroUncompressedSize { section: "packed geometry" }),
		));
	}

	#[test]
	fn reads_block_from_cursor() {
		let payload = [9u8, 8, 7];
		let compressed = zlib_stored(&payload);
		let mut bytes = Vec::new();
		bytes.extend_from_slice(&3u32.to_le_bytes());
		bytes.extend_from_slice(&(compressed.len() as u32).to_le_bytes());
		bytes.extend_from_slice(&compressed);
		let mut cursor = ByteCursor::from_slice(&bytes);
		let header = BlockHeader::read(&mut cursor).unwrap();
		let mut inner = read_block(&mut cursor, header).unwrap();
		assert_eq!(cursor.remaining(), 0);
		assert_eq!(&*inner.read_bytes(3).unwrap(), &payload);
	}
}
