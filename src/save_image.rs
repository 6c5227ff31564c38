use std::path::Path;
use anyhow::{Context, Result};
use image::RgbaImage;
use tr_level::{convert::PAGE_SIDE, model::TexturePage};

const PAGE_DIM: u32 = PAGE_SIDE as u32;

pub fn page_image(page: &TexturePage) -> Result<RgbaImage> {
	RgbaImage::from_raw(PAGE_DIM, PAGE_DIM, page.as_bytes()).context("texture page has the wrong size")
}

/// Writes `<prefix>_<index>.png` per page into `dir`.
pub fn save_pages(pages: &[TexturePage], dir: &Path, prefix: &str) -> Result<usize> {
	std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
	for (index, page) in pages.iter().enumerate() {
		let path = dir.join(format!("{}_{}.png", prefix, index));
		page_image(page)?.save(&path).with_context(|| format!("writing {}", path.display()))?;
	}
	Ok(pages.len())
}
