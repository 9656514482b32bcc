pub mod image;

use crate::octree::error::{BuildError, LookupError, PruneError, QuantizeError};
use crate::octree::index::palette_key;
use crate::octree::palette::{Color, Palette};
use crate::octree::{Octree, MIN_PRUNE_DEPTH};

/// Builds an octree from pixels, reduces it, and maps colors onto its palette.
///
/// Building and reducing are separate steps so the tree can be inspected in
/// between. Palette keys only mean something at the depth they were computed
/// at, so the quantizer tracks the depth its leaves currently sit at (the max
/// depth until the first reduction) and refuses lookups at any other depth.
#[derive(Clone, Debug, Default)]
pub struct Quantizer {
	tree: Octree,
	depth: Option<u8>,
	palette: Palette,
}

impl Quantizer {
	pub fn new(max_depth: u8) -> Result<Self, BuildError> {
		Ok(Quantizer { tree: Octree::new(max_depth)?, depth: None, palette: Palette::new() })
	}

	pub fn tree(&self) -> &Octree {
		&self.tree
	}

	pub fn max_depth(&self) -> u8 {
		self.tree.max_depth()
	}

	/// Depth the palette keys are currently relative to.
	pub fn depth(&self) -> u8 {
		self.depth.unwrap_or_else(|| self.tree.max_depth())
	}

	pub fn is_reduced(&self) -> bool {
		self.depth.is_some()
	}

	pub fn palette(&self) -> &Palette {
		&self.palette
	}

	/// Feeds pixels into the tree; nothing is pruned.
	///
	/// May be called repeatedly until the first reduction. Afterwards the
	/// tree's leaves no longer share one depth with new colors, so further
	/// pixels are refused.
	pub fn quantize<'a, I>(&mut self, pixels: I) -> Result<(), QuantizeError>
	where
		I: IntoIterator<Item = &'a Color>,
	{
		if let Some(depth) = self.depth {
			return Err(QuantizeError::AlreadyReduced(depth));
		}
		self.tree.insert_all(pixels);
		self.palette = self.tree.palette();
		log::trace!(
			"quantized {} samples into {} leaves",
			self.tree.sample_count(), self.palette.len()
		);
		Ok(())
	}

	/// Prunes the tree once, at `depth`.
	pub fn reduce_to_depth(&mut self, depth: u8) -> Result<(), PruneError> {
		self.tree.prune_at(depth)?;
		let depth = std::cmp::min(depth, self.depth());
		self.depth = Some(depth);
		self.palette = self.tree.palette();
		log::debug!("reduced to depth {}: {} palette colors", depth, self.palette.len());
		Ok(())
	}

	/// Prunes progressively shallower levels until the palette has at most
	/// `max_colors` entries or the tree can't be pruned any further.
	///
	/// Returns the final palette size, which can still exceed `max_colors`
	/// when the tree stops at the shallowest prunable depth.
	pub fn reduce_to_colors(&mut self, max_colors: usize) -> Result<usize, PruneError> {
		while self.palette.len() > max_colors && self.depth() > MIN_PRUNE_DEPTH {
			self.reduce_to_depth(self.depth() - 1)?;
		}
		Ok(self.palette.len())
	}

	/// Palette color for `color`, with keys computed at `depth`.
	///
	/// `depth` has to be the quantizer's current depth. `Ok(None)` means the
	/// color falls into a part of the color space no pixel landed in.
	pub fn lookup(&self, color: &Color, depth: u8) -> Result<Option<Color>, LookupError> {
		let current = self.depth();
		if depth != current {
			return Err(LookupError::StaleDepth { requested: depth, current });
		}
		Ok(self.palette.get(palette_key(color, depth)?))
	}

	/// Palette color for `color` at the current depth.
	pub fn map_color(&self, color: &Color) -> Option<Color> {
		self.lookup(color, self.depth()).ok().flatten()
	}

	/// Position of `color`'s palette entry at the current depth.
	pub fn palette_index(&self, color: &Color) -> Option<u32> {
		palette_key(color, self.depth()).ok().and_then(|key| self.palette.index_of(key))
	}
}
