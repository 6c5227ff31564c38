use std::io::{Read, Seek};
use log::debug;
use crate::{convert::PAGE_AREA, detect::TR2_VERSION, model::Palette, ByteCursor, Level, Readable, Result};
use super::Loader;

pub(crate) fn load<R: Read + Seek>(mut loader: Loader, cursor: &mut ByteCursor<R>) -> Result<Level> {
	loader.version(cursor, &[TR2_VERSION])?;
	loader.palette(cursor)?;
	loader.level.palette16 = Some(Palette::read(cursor, loader.generation, &mut loader.diagnostics)?);
	let num_pages = cursor.read_u32()? as usize;
	//8-bit pages are superseded by the 16-bit ones
	cursor.skip((num_pages * PAGE_AREA) as u64)?;
	let pages = loader.raw_pages(cursor, num_pages, PAGE_AREA * 2)?;
	debug!("texture pages: {}", num_pages);
	loader.unused(cursor, "unused")?;
	loader.rooms::<R, u16>(cursor)?;
	loader.meshes(cursor)?;
	loader.animation_tables(cursor)?;
	loader.static_meshes(cursor)?;
	loader.object_textures(cursor)?;
	loader.sprites(cursor)?;
	let demo = loader.game.is_demo_or_ub();
	if demo {
		loader.light_map(cursor)?;
	}
	loader.cameras_and_sources(cursor)?;
	loader.box_data(cursor)?;
	loader.items(cursor)?;
	if !demo {
		loader.light_map(cursor)?;
	}
	loader.cinematic_frames(cursor)?;
	loader.sound_tables(cursor)?;
	loader.remap_samples();
	loader.sample_bank();
	loader.pages_from_argb16(&pages);
	Ok(loader.finish(cursor))
}
