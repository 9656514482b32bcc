use std::collections::HashMap;

use super::index::PaletteKey;

pub type Color = image::Rgb<u8>;
/// Component-wise sum of many colors.
pub type BigColor = image::Rgb<u64>;

fn color_add_big(a: BigColor, b: BigColor) -> BigColor {
	image::Rgb::<u64>([
		a.0[0] + b.0[0],
		a.0[1] + b.0[1],
		a.0[2] + b.0[2],
	])
}

fn color_widen(c: &Color) -> BigColor {
	image::Rgb::<u64>([c.0[0] as u64, c.0[1] as u64, c.0[2] as u64])
}

fn color_div(a: BigColor, b: u64) -> Color {
	let channel = |n: u64| std::cmp::min(n / b, 255) as u8;
	image::Rgb::<u8>([channel(a.0[0]), channel(a.0[1]), channel(a.0[2])])
}

/// Running color sum and sample count of the pixels a node represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorStats {
	pub sum: BigColor,
	pub count: u64,
}

impl Default for ColorStats {
	fn default() -> Self {
		ColorStats { sum: image::Rgb([0; 3]), count: 0 }
	}
}

impl ColorStats {
	/// Statistics of a single sample.
	pub fn sample(color: &Color) -> Self {
		ColorStats { sum: color_widen(color), count: 1 }
	}

	/// Adds a color to the sum only; the count is the caller's business.
	pub fn add_color(&mut self, color: &Color) {
		self.sum = color_add_big(self.sum, color_widen(color));
	}

	/// Folds another set of statistics into this one.
	pub fn merge(&mut self, other: &ColorStats) {
		self.sum = color_add_big(self.sum, other.sum);
		self.count += other.count;
	}

	/// The floored mean color, each channel clamped to 255.
	///
	/// `None` if no samples have been counted.
	pub fn average(&self) -> Option<Color> {
		if self.count == 0 {
			None
		} else {
			Some(color_div(self.sum, self.count))
		}
	}
}

/// Colors a quantized tree reduces to, keyed by palette key.
///
/// Entries keep the order in which they were first inserted; inserting a key
/// that is already present leaves the existing color in place.
#[derive(Clone, Debug, Default)]
pub struct Palette {
	entries: Vec<(PaletteKey, Color)>,
	positions: HashMap<PaletteKey, usize>,
}

impl Palette {
	pub fn new() -> Self {
		Default::default()
	}

	/// Adds an entry unless `key` is already taken.
	///
	/// Returns whether the entry was added.
	pub fn insert(&mut self, key: PaletteKey, color: Color) -> bool {
		if self.positions.contains_key(&key) {
			return false;
		}
		self.positions.insert(key, self.entries.len());
		self.entries.push((key, color));
		true
	}

	pub fn get(&self, key: PaletteKey) -> Option<Color> {
		self.positions.get(&key).map(|&pos| self.entries[pos].1)
	}

	/// Position of `key` in insertion order, usable as an indexed-color number.
	pub fn index_of(&self, key: PaletteKey) -> Option<u32> {
		self.positions.get(&key).map(|&pos| pos as u32)
	}

	pub fn contains_key(&self, key: PaletteKey) -> bool {
		self.positions.contains_key(&key)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (PaletteKey, Color)> + '_ {
		self.entries.iter().copied()
	}

	/// The palette colors in insertion order.
	pub fn colors(&self) -> Vec<Color> {
		self.entries.iter().map(|e| e.1).collect()
	}
}
