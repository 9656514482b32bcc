use super::error::NodeError;
use super::index::{palette_key, PaletteKey};
use super::palette::{BigColor, Color, ColorStats};

/// Index of a node in an octree's arena.
pub type NodeId = usize;

/// What a node currently holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
	/// Subdivides its color cube further.
	Internal { children: [Option<NodeId>; 8] },
	/// Carries at least one sample.
	Leaf(ColorStats),
}

/// Vertex in an octree over RGB space.
///
/// A node's color statistics are the sum of every pixel merged into it or
/// folded into it by pruning, never a single averaged color.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
	pub(crate) depth: u8,
	pub(crate) palette_key: Option<PaletteKey>,
	pub(crate) kind: NodeKind,
}

impl Node {
	/// Creates the node that `color` produces at `depth`.
	///
	/// A node at `max_depth` cannot subdivide, so it starts out as a leaf
	/// holding that one sample. Shallower nodes start out internal and empty.
	/// The palette key is derived from `color` either way; it is `None`
	/// where keys are undefined, which for a valid tree is only the root.
	pub fn new(color: &Color, depth: u8, max_depth: u8) -> Result<Node, NodeError> {
		if depth > max_depth {
			return Err(NodeError::DepthOutOfRange { depth, max_depth });
		}
		let kind = if depth == max_depth {
			NodeKind::Leaf(ColorStats::sample(color))
		} else {
			NodeKind::Internal { children: [None; 8] }
		};
		Ok(Node { depth, palette_key: palette_key(color, depth).ok(), kind })
	}

	pub fn depth(&self) -> u8 {
		self.depth
	}

	pub fn palette_key(&self) -> Option<PaletteKey> {
		self.palette_key
	}

	pub fn kind(&self) -> &NodeKind {
		&self.kind
	}

	pub fn is_leaf(&self) -> bool {
		matches!(self.kind, NodeKind::Leaf(_))
	}

	/// Number of pixels represented; always 0 for internal nodes.
	pub fn sample_count(&self) -> u64 {
		match &self.kind {
			NodeKind::Leaf(stats) => stats.count,
			NodeKind::Internal { .. } => 0,
		}
	}

	/// Summed color of the pixels represented; zero for internal nodes.
	pub fn color_sum(&self) -> BigColor {
		match &self.kind {
			NodeKind::Leaf(stats) => stats.sum,
			NodeKind::Internal { .. } => image::Rgb([0; 3]),
		}
	}

	pub fn children(&self) -> Option<&[Option<NodeId>; 8]> {
		match &self.kind {
			NodeKind::Internal { children, .. } => Some(children),
			NodeKind::Leaf(_) => None,
		}
	}

	/// Adds `color` to a leaf's sum without counting it.
	pub fn merge_sample(&mut self, color: &Color) -> Result<(), NodeError> {
		self.stats_mut()?.add_color(color);
		Ok(())
	}

	pub fn increment_count(&mut self, n: u64) -> Result<(), NodeError> {
		self.stats_mut()?.count += n;
		Ok(())
	}

	/// Mean color of the pixels this leaf represents.
	pub fn averaged_color(&self) -> Result<Color, NodeError> {
		match &self.kind {
			NodeKind::Leaf(stats) => stats.average().ok_or(NodeError::NotLeaf),
			NodeKind::Internal { .. } => Err(NodeError::NotLeaf),
		}
	}

	fn stats_mut(&mut self) -> Result<&mut ColorStats, NodeError> {
		match &mut self.kind {
			NodeKind::Leaf(stats) => Ok(stats),
			NodeKind::Internal { .. } => Err(NodeError::NotLeaf),
		}
	}

	/// Replaces the node's contents with `stats` after its children were
	/// folded away: a leaf if that adds up to any samples, an empty internal
	/// node otherwise.
	pub(crate) fn promote(&mut self, stats: ColorStats) {
		self.kind = if stats.count > 0 {
			NodeKind::Leaf(stats)
		} else {
			NodeKind::Internal { children: [None; 8] }
		};
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const VALUE: Color = image::Rgb([118, 100, 38]);

	#[test]
	fn construction_depth_bounds() {
		assert_eq!(
			Node::new(&VALUE, 6, 5),
			Err(NodeError::DepthOutOfRange { depth: 6, max_depth: 5 })
		);
		let internal = Node::new(&VALUE, 4, 5).unwrap();
		assert!(!internal.is_leaf());
		assert_eq!(internal.sample_count(), 0);
		assert_eq!(internal.color_sum(), image::Rgb([0, 0, 0]));
		assert!(internal.children().is_some());

		let leaf = Node::new(&VALUE, 5, 5).unwrap();
		assert!(leaf.is_leaf());
		assert_eq!(leaf.sample_count(), 1);
		assert_eq!(leaf.color_sum(), image::Rgb([118, 100, 38]));
		assert!(leaf.children().is_none());
	}

	#[test]
	fn key_follows_depth() {
		assert_eq!(Node::new(&VALUE, 0, 5).unwrap().palette_key(), None);
		for depth in 1..=5 {
			let node = Node::new(&VALUE, depth, 5).unwrap();
			assert_eq!(node.palette_key(), palette_key(&VALUE, depth).ok());
		}
	}

	#[test]
	fn averaged_color() {
		let mut node = Node::new(&VALUE, 5, 5).unwrap();
		assert_eq!(node.averaged_color(), Ok(VALUE));

		node.merge_sample(&image::Rgb([10, 10, 10])).unwrap();
		assert_eq!(node.averaged_color(), Ok(image::Rgb([128, 110, 48])));

		node.merge_sample(&image::Rgb([255, 255, 255])).unwrap();
		assert_eq!(node.averaged_color(), Ok(image::Rgb([255, 255, 255])));

		// 383 / 2, 365 / 2, 303 / 2
		node.increment_count(1).unwrap();
		assert_eq!(node.averaged_color(), Ok(image::Rgb([191, 182, 151])));
	}

	#[test]
	fn internal_nodes_reject_leaf_operations() {
		let mut node = Node::new(&VALUE, 2, 5).unwrap();
		assert_eq!(node.averaged_color(), Err(NodeError::NotLeaf));
		assert_eq!(node.merge_sample(&VALUE), Err(NodeError::NotLeaf));
		assert_eq!(node.increment_count(1), Err(NodeError::NotLeaf));
	}

	#[test]
	fn promote_with_nothing_stays_internal() {
		let mut node = Node::new(&VALUE, 2, 5).unwrap();
		node.promote(ColorStats::default());
		assert!(!node.is_leaf());

		node.promote(ColorStats::sample(&VALUE));
		assert!(node.is_leaf());
		assert_eq!(node.averaged_color(), Ok(VALUE));
	}
}
