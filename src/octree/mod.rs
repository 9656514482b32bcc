pub mod error;
pub mod index;
pub mod node;
pub mod palette;

use std::collections::HashSet;

use error::{BuildError, NodeError, PruneError};
use index::{child_index_at, MAX_KEY_DEPTH, MIN_KEY_DEPTH};
use node::{Node, NodeId, NodeKind};
use palette::{Color, ColorStats, Palette};

/// Max depth used when none is given.
pub const DEFAULT_MAX_DEPTH: u8 = 5;
/// Shallowest depth a tree may be pruned at.
pub const MIN_PRUNE_DEPTH: u8 = 2;

/// Octree over RGB space for color quantization.
///
/// Nodes live in an arena and refer to their children by `NodeId`. Every node
/// created by insertion is also recorded in a per-depth registry, so that a
/// whole level can be pruned without walking the tree to find it.
#[derive(Clone, Debug)]
pub struct Octree {
	nodes: Vec<Option<Node>>,
	free_list: Vec<NodeId>,
	levels: Vec<Vec<NodeId>>,
	root: NodeId,
	max_depth: u8,
}

impl Default for Octree {
	fn default() -> Self {
		Self::with_root(DEFAULT_MAX_DEPTH)
	}
}

impl Octree {
	/// Creates an empty tree whose leaves sit at `max_depth`.
	///
	/// `max_depth` must be within 1 to 6, the depths a palette key exists for.
	pub fn new(max_depth: u8) -> Result<Self, BuildError> {
		if !(MIN_KEY_DEPTH..=MAX_KEY_DEPTH).contains(&max_depth) {
			return Err(BuildError::MaxDepthOutOfRange(max_depth));
		}
		Ok(Self::with_root(max_depth))
	}

	fn with_root(max_depth: u8) -> Self {
		let root = Node {
			depth: 0,
			palette_key: None,
			kind: NodeKind::Internal { children: [None; 8] },
		};
		Octree {
			nodes: vec![Some(root)],
			free_list: Vec::new(),
			levels: vec![Vec::new(); max_depth as usize + 1],
			root: 0,
			max_depth,
		}
	}

	pub fn max_depth(&self) -> u8 {
		self.max_depth
	}

	pub fn root(&self) -> NodeId {
		self.root
	}

	pub fn node(&self, id: NodeId) -> Option<&Node> {
		self.nodes.get(id).and_then(Option::as_ref)
	}

	/// Number of live nodes, the root included.
	pub fn node_count(&self) -> usize {
		self.nodes.len() - self.free_list.len()
	}

	/// Nodes created at `depth` that haven't been pruned away since.
	pub fn nodes_at(&self, depth: u8) -> impl Iterator<Item = &Node> + '_ {
		self.levels
			.get(depth as usize)
			.into_iter()
			.flatten()
			.filter_map(move |&id| self.node(id))
	}

	fn get(&self, id: NodeId) -> Result<&Node, NodeError> {
		self.node(id).ok_or(NodeError::UnknownNode(id))
	}

	fn get_mut(&mut self, id: NodeId) -> Result<&mut Node, NodeError> {
		self.nodes.get_mut(id).and_then(Option::as_mut).ok_or(NodeError::UnknownNode(id))
	}

	fn alloc(&mut self, node: Node) -> NodeId {
		match self.free_list.pop() {
			Some(id) => {
				self.nodes[id] = Some(node);
				id
			}
			None => {
				self.nodes.push(Some(node));
				self.nodes.len() - 1
			}
		}
	}

	fn release(&mut self, id: NodeId) -> Option<Node> {
		let node = self.nodes.get_mut(id)?.take()?;
		self.free_list.push(id);
		Some(node)
	}

	/// Adds one pixel to the tree.
	///
	/// The color descends along its child indices. It is merged into the
	/// first leaf met on the way; missing nodes are created one at a time
	/// until a new leaf at the max depth is made, so every distinct color
	/// gets its own leaf the first time it is seen.
	pub fn insert(&mut self, color: &Color) {
		let mut current = self.root;
		loop {
			let depth = match self.node(current) {
				Some(node) => node.depth,
				None => return,
			};
			let next_depth = depth + 1;
			let slot = child_index_at(color, next_depth) as usize;
			let existing = match self.nodes[current].as_mut().map(|n| &mut n.kind) {
				Some(NodeKind::Leaf(stats)) => {
					stats.add_color(color);
					stats.count += 1;
					return;
				}
				Some(NodeKind::Internal { children, .. }) => children[slot],
				None => return,
			};
			match existing {
				Some(child) => match self.nodes[child].as_mut().map(|n| &mut n.kind) {
					Some(NodeKind::Leaf(stats)) => {
						stats.add_color(color);
						stats.count += 1;
						return;
					}
					Some(NodeKind::Internal { .. }) => current = child,
					None => return,
				},
				None => {
					if next_depth > self.max_depth {
						return;
					}
					let node = match Node::new(color, next_depth, self.max_depth) {
						Ok(node) => node,
						Err(_) => return,
					};
					let is_leaf = node.is_leaf();
					let child = self.alloc(node);
					if let Some(NodeKind::Internal { children, .. }) =
						self.nodes[current].as_mut().map(|n| &mut n.kind)
					{
						children[slot] = Some(child);
					}
					self.levels[next_depth as usize].push(child);
					if is_leaf {
						return;
					}
					current = child;
				}
			}
		}
	}

	/// Adds every pixel of a stream to the tree, in order.
	pub fn insert_all<'a, I>(&mut self, pixels: I)
	where
		I: IntoIterator<Item = &'a Color>,
	{
		for color in pixels {
			self.insert(color);
		}
	}

	/// Leaves below (or at) `id`, depth-first in child index order.
	pub fn collect_leaves(&self, id: NodeId) -> Vec<&Node> {
		let mut leaves = Vec::new();
		let mut stack = vec![id];
		while let Some(id) = stack.pop() {
			match self.node(id) {
				Some(node) => match &node.kind {
					NodeKind::Leaf(_) => leaves.push(node),
					NodeKind::Internal { children, .. } => {
						stack.extend(children.iter().rev().flatten().copied());
					}
				},
				None => continue,
			}
		}
		leaves
	}

	/// Every leaf of the tree, depth-first in child index order.
	pub fn leaves(&self) -> Vec<&Node> {
		self.collect_leaves(self.root)
	}

	pub fn leaf_count(&self) -> usize {
		self.leaves().len()
	}

	/// Total number of samples held by the leaves.
	pub fn sample_count(&self) -> u64 {
		self.leaves().iter().map(|leaf| leaf.sample_count()).sum()
	}

	/// Releases a subtree, returning its combined statistics and the released ids.
	fn absorb_subtree(&mut self, id: NodeId) -> (ColorStats, Vec<NodeId>) {
		let mut stats = ColorStats::default();
		let mut released = Vec::new();
		let mut stack = vec![id];
		while let Some(id) = stack.pop() {
			let node = match self.release(id) {
				Some(node) => node,
				None => continue,
			};
			released.push(id);
			match node.kind {
				NodeKind::Leaf(own) => stats.merge(&own),
				NodeKind::Internal { children } => stack.extend(children.iter().flatten().copied()),
			}
		}
		(stats, released)
	}

	/// Folds every child of `id` into it and removes them.
	///
	/// Each child's whole subtree is absorbed, so no sample is lost however
	/// deep the tree below is. The node becomes a leaf if anything was
	/// absorbed. The root is refused, since a leaf root has no palette key.
	/// Returns the number of direct children removed.
	pub fn prune_children(&mut self, id: NodeId) -> Result<usize, NodeError> {
		if id == self.root {
			return Err(NodeError::RootCollapse);
		}
		let (absorbed, released) = self.fold_children(id)?;
		self.unregister(&released);
		Ok(absorbed)
	}

	fn fold_children(&mut self, id: NodeId) -> Result<(usize, Vec<NodeId>), NodeError> {
		let children = match &self.get(id)?.kind {
			NodeKind::Internal { children, .. } => *children,
			NodeKind::Leaf(_) => return Err(NodeError::NotInternal),
		};
		let mut stats = ColorStats::default();
		let mut released = Vec::new();
		let mut absorbed = 0;
		for child in children.iter().flatten() {
			let (child_stats, mut child_ids) = self.absorb_subtree(*child);
			stats.merge(&child_stats);
			released.append(&mut child_ids);
			absorbed += 1;
		}
		self.get_mut(id)?.promote(stats);
		Ok((absorbed, released))
	}

	/// Drops released ids from the registries; their slots may be reused.
	fn unregister(&mut self, released: &[NodeId]) {
		if released.is_empty() {
			return;
		}
		let released = released.iter().copied().collect::<HashSet<_>>();
		for level in self.levels.iter_mut() {
			level.retain(|id| !released.contains(id));
		}
	}

	/// Folds a single child of `parent` into it and removes it.
	///
	/// Returns `false` without touching anything if `child` isn't a child of
	/// `parent`. A node holding samples is a leaf, so the parent turns into
	/// one: `child` goes first, then any siblings are folded in with it so
	/// that none of their samples drop out of the tree. The root is refused
	/// for the same reason as in `prune_children`.
	pub fn detach_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool, NodeError> {
		let slot = match &self.get(parent)?.kind {
			NodeKind::Internal { children } => match children.iter().position(|&c| c == Some(child)) {
				Some(slot) => slot,
				None => return Ok(false),
			},
			NodeKind::Leaf(_) => return Ok(false),
		};
		if parent == self.root {
			return Err(NodeError::RootCollapse);
		}
		let (mut stats, mut released) = self.absorb_subtree(child);
		let siblings = match &mut self.get_mut(parent)?.kind {
			NodeKind::Internal { children } => {
				children[slot] = None;
				*children
			}
			NodeKind::Leaf(_) => [None; 8],
		};
		for sibling in siblings.iter().flatten() {
			let (sibling_stats, mut sibling_ids) = self.absorb_subtree(*sibling);
			stats.merge(&sibling_stats);
			released.append(&mut sibling_ids);
		}
		self.get_mut(parent)?.promote(stats);
		self.unregister(&released);
		Ok(true)
	}

	/// Collapses every node registered at `depth` into a leaf.
	///
	/// All nodes of the level are pruned in one pass, so afterwards no leaf
	/// is deeper than `depth`. The registries below `depth` are emptied.
	/// Depths 0 and 1 are refused because they would throw away too much
	/// color information, and the max depth has nothing below it.
	///
	/// Returns the number of children absorbed.
	pub fn prune_at(&mut self, depth: u8) -> Result<usize, PruneError> {
		if depth < MIN_PRUNE_DEPTH || depth >= self.max_depth {
			return Err(PruneError::DepthOutOfRange { depth, max_depth: self.max_depth });
		}
		let level = std::mem::take(&mut self.levels[depth as usize]);
		let mut absorbed = 0;
		for &id in level.iter() {
			// Leaves were already pruned at this depth.
			if let Ok((n, _)) = self.fold_children(id) {
				absorbed += n;
			}
		}
		self.levels[depth as usize] = level;
		for deeper in self.levels.iter_mut().skip(depth as usize + 1) {
			deeper.clear();
		}
		log::debug!(
			"pruned depth {}: {} children absorbed, {} leaves left",
			depth, absorbed, self.leaf_count()
		);
		Ok(absorbed)
	}

	/// Builds the palette from the current leaves.
	///
	/// The first leaf seen for a key decides its color.
	pub fn palette(&self) -> Palette {
		let mut palette = Palette::new();
		for leaf in self.leaves() {
			if let (Some(key), Ok(color)) = (leaf.palette_key(), leaf.averaged_color()) {
				palette.insert(key, color);
			}
		}
		palette
	}
}
