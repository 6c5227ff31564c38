use std::io::{Read, Seek};
use log::debug;
use crate::{
	decoder::{read_block, BlockHeader}, detect::{TR4_DEMO_VERSION, TR4_VERSIONS}, ByteCursor, Error, Level, Result,
};
use super::Loader;

const NUM_MISC_PAGES: u32 = 2;

pub(crate) fn load<R: Read + Seek>(mut loader: Loader, cursor: &mut ByteCursor<R>) -> Result<Level> {
	let [v1, v2] = TR4_VERSIONS;
	loader.version(cursor, &[v1, v2, TR4_DEMO_VERSION])?;
	loader.texture_blocks(cursor, NUM_MISC_PAGES)?;
	let at = cursor.position();
	let header = BlockHeader::read(cursor)?.require_data("packed geometry")?;
	if header.compressed_len == 0 {
		return Err(Error::Inconsistent { what: "packed geometry has no compressed bytes".into(), position: at });
	}
	let mut geometry = read_block(cursor, header)?;
	loader.unused(&mut geometry, "unused")?;
	loader.rooms::<_, u16>(&mut geometry)?;
	loader.meshes(&mut geometry)?;
	loader.animation_tables(&mut geometry)?;
	loader.static_meshes(&mut geometry)?;
	loader.marker(&mut geometry, b"SPR")?;
	loader.sprites(&mut geometry)?;
	loader.cameras_and_sources(&mut geometry)?;
	loader.box_data(&mut geometry)?;
	loader.level.animated_textures_uv_count = geometry.read_u8()?;
	loader.marker(&mut geometry, b"TEX")?;
	loader.object_textures(&mut geometry)?;
	loader.items(&mut geometry)?;
	loader.ai_objects(&mut geometry)?;
	loader.sound_tables(&mut geometry)?;
	loader.trailing(&geometry);
	debug!("packed geometry done, {} bytes", geometry.len());
	loader.trailing_samples(cursor)?;
	Ok(loader.finish(cursor))
}
