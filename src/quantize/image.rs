use ::image::{Pixel, RgbImage, RgbaImage};

use super::Quantizer;
use crate::octree::error::BuildError;
use crate::octree::palette::Color;

/// Color stand-in for pixels that have no palette entry.
pub const FALLBACK_COLOR: Color = ::image::Rgb([0, 0, 0]);

/// The colors of an RGBA image in row-major order, alpha dropped.
pub fn pixels(img: &RgbaImage) -> impl Iterator<Item = Color> + '_ {
	img.pixels().map(|p| p.to_rgb())
}

/// The colors of an RGB image in row-major order.
pub fn rgb_pixels(img: &RgbImage) -> impl Iterator<Item = Color> + '_ {
	img.pixels().copied()
}

impl Quantizer {
	/// Builds an unreduced quantizer from every pixel of an image.
	pub fn from_image(img: &RgbaImage, max_depth: u8) -> Result<Self, BuildError> {
		let mut quantizer = Quantizer::new(max_depth)?;
		let colors = pixels(img).collect::<Vec<_>>();
		// A fresh quantizer has not been reduced, so this cannot be refused.
		if let Err(e) = quantizer.quantize(&colors) {
			unreachable!("fresh quantizer refused pixels: {}", e);
		}
		Ok(quantizer)
	}

	/// Redraws an image with palette colors.
	///
	/// Pixels without a palette entry become `FALLBACK_COLOR`. Every output
	/// pixel is opaque.
	pub fn to_image(&self, img: &RgbaImage) -> RgbaImage {
		let mut output = RgbaImage::new(img.width(), img.height());
		for (out, pix) in output.pixels_mut().zip(img.pixels()) {
			let c = self.map_color(&pix.to_rgb()).unwrap_or(FALLBACK_COLOR);
			*out = ::image::Rgba([c.0[0], c.0[1], c.0[2], 255]);
		}
		output
	}

	/// Converts an image to a "rectangle" of palette positions, one per pixel,
	/// in the palette's insertion order.
	pub fn palette_indices(&self, img: &RgbaImage) -> Vec<Option<u32>> {
		img.pixels().map(|pix| self.palette_index(&pix.to_rgb())).collect()
	}
}
