use std::io::{Read, Seek};
use log::debug;
use crate::{detect::TR5_VERSION, model::{LaraType, WeatherType}, ByteCursor, Level, Result};
use super::Loader;

const NUM_MISC_PAGES: u32 = 3;
const NUM_HEADER_PADDING: usize = 7;
/// Between the sample indices and the sample count.
const SAMPLE_GAP: u64 = 6;

pub(crate) fn load<R: Read + Seek>(mut loader: Loader, cursor: &mut ByteCursor<R>) -> Result<Level> {
	loader.version(cursor, &[TR5_VERSION])?;
	loader.texture_blocks(cursor, NUM_MISC_PAGES)?;
	loader.level.lara_type = LaraType::from(cursor.read_u16()?);
	loader.level.weather_type = WeatherType::from(cursor.read_u16()?);
	for _ in 0..NUM_HEADER_PADDING {
		loader.unused(cursor, "header padding")?;
	}
	//sizes of the level body, which is stored uncompressed
	let uncompressed_len = cursor.read_u32()?;
	let compressed_len = cursor.read_u32()?;
	debug!("level body: {} bytes, {} stored", uncompressed_len, compressed_len);
	loader.unused(cursor, "unused")?;
	loader.rooms::<R, u32>(cursor)?;
	loader.meshes(cursor)?;
	loader.animation_tables(cursor)?;
	loader.static_meshes(cursor)?;
	loader.marker(cursor, b"SPR\0")?;
	loader.sprites(cursor)?;
	loader.cameras_and_sources(cursor)?;
	loader.box_data(cursor)?;
	loader.level.animated_textures_uv_count = cursor.read_u8()?;
	loader.marker(cursor, b"TEX\0")?;
	loader.object_textures(cursor)?;
	loader.items(cursor)?;
	loader.ai_objects(cursor)?;
	loader.sound_tables(cursor)?;
	cursor.skip(SAMPLE_GAP)?;
	loader.trailing_samples(cursor)?;
	Ok(loader.finish(cursor))
}
