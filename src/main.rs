mod save_image;

use std::{env::args, path::PathBuf};
use anyhow::{bail, Context, Result};
use log::{info, warn};
use tr_level::Level;

const USAGE: &str = "usage: tr_inspect <level> [--textures <dir>]";

struct Args {
	level: PathBuf,
	textures: Option<PathBuf>,
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<Args> {
	let mut level = None;
	let mut textures = None;
	while let Some(arg) = args.next() {
		match arg.as_str() {
			"--textures" => textures = Some(PathBuf::from(args.next().context(USAGE)?)),
			_ if level.is_none() => level = Some(PathBuf::from(arg)),
			_ => bail!("unexpected argument {:?}\n{}", arg, USAGE),
		}
	}
	Ok(Args { level: level.context(USAGE)?, textures })
}

fn summarize(level: &Level) {
	info!("{:?} ({})", level.game, level.generation);
	info!("rooms: {}, sectors: {}", level.rooms.len(), level.rooms.iter().map(|r| r.sectors.len()).sum::<usize>());
	info!("meshes: {} from {} pointers", level.meshes.len(), level.mesh_indices.len());
	info!("moveables: {}, static meshes: {}", level.moveables.len(), level.static_meshes.len());
	info!("animations: {}, frame offsets: {}", level.animations.len(), level.frame_offsets.len());
	info!("object textures: {}, sprite textures: {}", level.object_textures.len(), level.sprite_textures.len());
	info!("texture pages: {}", level.textures.len());
	info!("items: {}, boxes: {}", level.items.len(), level.boxes.len());
	info!("sound details: {}, samples: {}", level.sound_details.len(), level.samples_count);
	for diagnostic in level.diagnostics.iter() {
		warn!("{}", diagnostic);
	}
}

fn main() -> Result<()> {
	env_logger::init();
	let args = parse_args(args().skip(1))?;
	let level = tr_level::load_file(&args.level).with_context(|| format!("loading {}", args.level.display()))?;
	summarize(&level);
	if let Some(dir) = args.textures {
		let prefix = args.level.file_stem().and_then(|s| s.to_str()).unwrap_or("page");
		let written = save_image::save_pages(&level.textures, &dir, prefix)?;
		info!("wrote {} pages to {}", written, dir.display());
	}
	Ok(())
}
