use thiserror::Error;

/// Reason why a palette key couldn't be computed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum KeyError {
	/// Keys only exist for depths 1 through 6.
	#[error("palette key depth must be within 1..=6, got {0}")]
	InvalidDepth(u8),
}

/// Reason why an operation on a single node failed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum NodeError {
	/// The node would sit outside the tree's depth range.
	#[error("node depth {depth} is outside 0..={max_depth}")]
	DepthOutOfRange { depth: u8, max_depth: u8 },
	/// The operation needs sample statistics, but the node is internal.
	#[error("node is not a leaf")]
	NotLeaf,
	/// The operation needs a children container, but the node is a leaf.
	#[error("node has no children to prune")]
	NotInternal,
	/// The root has to stay internal; a leaf root has no palette key.
	#[error("the root cannot become a leaf")]
	RootCollapse,
	/// The id does not refer to a live node of this tree.
	#[error("no node with id {0}")]
	UnknownNode(usize),
}

/// Reason why an octree couldn't be built.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BuildError {
	/// Leaves must sit at a depth that has a palette key.
	#[error("max depth must be within 1..=6, got {0}")]
	MaxDepthOutOfRange(u8),
}

/// Reason why a tree level couldn't be pruned.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PruneError {
	/// Pruning is only allowed from depth 2 up to (not including) the max depth.
	#[error("cannot prune at depth {depth}; must be within 2..{max_depth}")]
	DepthOutOfRange { depth: u8, max_depth: u8 },
}

/// Reason why pixels couldn't be fed into a quantizer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QuantizeError {
	/// The tree has already been pruned to the given depth.
	#[error("tree was already reduced to depth {0}")]
	AlreadyReduced(u8),
}

/// Reason why a color lookup couldn't be answered.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
	/// Palette keys are depth-relative; this one was asked for at the wrong depth.
	#[error("lookup at depth {requested}, but the palette is at depth {current}")]
	StaleDepth { requested: u8, current: u8 },
	#[error(transparent)]
	Key(#[from] KeyError),
}
