use std::io;
use thiserror::Error;
use crate::Generation;

/// Fatal load errors. No `Level` is produced when one of these is returned.
#[derive(Debug, Error)]
pub enum Error {
	#[error("unexpected end of data at byte {position}")]
	UnexpectedEnd { position: u64 },
	#[error("IO error has occurred: {0}")]
	Io(#[from] io::Error),
	#[error("zlib block could not be decompressed: {0}")]
	Decompression(String),
	#[error("unrecognized level format (magic {magic:#010x}, extension {extension:?})")]
	UnknownFormat { magic: u32, extension: String },
	#[error("wrong {generation} level version {found:#010x}")]
	WrongVersion { generation: Generation, found: u32 },
	#[error("{section}: uncompressed size is 0")]
	ZeroUncompressedSize { section: &'static str },
	#[error("expected marker {expected:?}, found {found:?}")]
	MissingMarker { expected: &'static [u8], found: Box<[u8]> },
	#[error("inconsistent level data at byte {position}: {what}")]
	Inconsistent { what: String, position: u64 },
}

pub type Result<T> = std::result::Result<T, Error>;
