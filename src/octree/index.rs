use bitvec::prelude::*;

use super::error::KeyError;
use super::palette::Color;

/// Depth-relative identifier of a palette entry.
pub type PaletteKey = u32;

/// Shallowest depth a palette key is defined for.
pub const MIN_KEY_DEPTH: u8 = 1;
/// Deepest depth a palette key is defined for.
pub const MAX_KEY_DEPTH: u8 = 6;

/// Picks which of a node's eight children a color descends into at `depth`.
///
/// Takes bit `7 - depth` of each channel (depth 0 is the most significant
/// bit) and packs them as `rgb`, red being the highest bit. Channels only
/// have eight bits, so any depth past 7 selects child 0.
pub fn child_index_at(color: &Color, depth: u8) -> u8 {
	if depth > 7 {
		return 0;
	}
	color.0.iter().fold(0, |index, channel| {
		(index << 1) | channel.view_bits::<Msb0>()[depth as usize] as u8
	})
}

/// Concatenates the child indices a color takes from `depth` up to depth 1.
///
/// The index at `depth` ends up in the most significant triplet and the
/// index at depth 1 in the least significant one. Two colors share a key at
/// a given depth exactly when they would share a leaf in a tree pruned to
/// that depth, so a key is only meaningful together with its depth.
pub fn palette_key(color: &Color, depth: u8) -> Result<PaletteKey, KeyError> {
	if !(MIN_KEY_DEPTH..=MAX_KEY_DEPTH).contains(&depth) {
		return Err(KeyError::InvalidDepth(depth));
	}
	Ok((MIN_KEY_DEPTH..=depth)
		.rev()
		.fold(0, |key, d| (key << 3) | PaletteKey::from(child_index_at(color, d))))
}
