use std::io::{Read, Seek};
use log::debug;
use crate::{convert::PAGE_AREA, detect::TR1_VERSION, ByteCursor, Level, Result};
use super::Loader;

pub(crate) fn load<R: Read + Seek>(mut loader: Loader, cursor: &mut ByteCursor<R>) -> Result<Level> {
	loader.version(cursor, &[TR1_VERSION])?;
	let num_pages = cursor.read_u32()? as usize;
	let pages = loader.raw_pages(cursor, num_pages, PAGE_AREA)?;
	debug!("texture pages: {}", num_pages);
	loader.unused(cursor, "unused")?;
	loader.rooms::<R, u16>(cursor)?;
	loader.meshes(cursor)?;
	loader.animation_tables(cursor)?;
	loader.derive_frame_sizes(cursor.position());
	loader.static_meshes(cursor)?;
	loader.object_textures(cursor)?;
	loader.sprites(cursor)?;
	let demo_or_ub = loader.game.is_demo_or_ub();
	if demo_or_ub {
		loader.palette(cursor)?;
	}
	loader.cameras_and_sources(cursor)?;
	loader.box_data(cursor)?;
	loader.items(cursor)?;
	loader.light_map(cursor)?;
	if !demo_or_ub {
		loader.palette(cursor)?;
	}
	loader.cinematic_frames(cursor)?;
	loader.sound_tables(cursor)?;
	loader.pages_from_indexed(&pages);
	Ok(loader.finish(cursor))
}
