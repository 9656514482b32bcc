use octree_quant::error::PruneError;
use octree_quant::palette::Color;
use octree_quant::Octree;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Ten colors that all take different paths through a depth-5 tree.
fn distinct_pixels() -> Vec<Color> {
	(0..10u8).map(|i| image::Rgb([i * 4, i * 8, i * 12])).collect()
}

fn random_pixels(n: usize, seed: u64) -> Vec<Color> {
	let mut rng = StdRng::seed_from_u64(seed);
	(0..n).map(|_| image::Rgb([rng.gen(), rng.gen(), rng.gen()])).collect()
}

#[test]
fn distinct_colors_get_their_own_leaves() {
	let mut tree = Octree::default();
	tree.insert_all(&distinct_pixels());

	let leaves = tree.leaves();
	assert_eq!(leaves.len(), 10);
	for leaf in leaves {
		assert_eq!(leaf.depth(), 5);
		assert_eq!(leaf.sample_count(), 1);
	}
}

#[test]
fn identical_colors_share_a_leaf() {
	let color = image::Rgb([37, 201, 99]);
	let mut tree = Octree::new(6).unwrap();
	tree.insert_all(&vec![color; 1000]);

	let leaves = tree.leaves();
	assert_eq!(leaves.len(), 1);
	assert_eq!(leaves[0].sample_count(), 1000);
	assert_eq!(leaves[0].averaged_color(), Ok(color));
}

#[test]
fn only_the_leaf_level_holds_samples() {
	let mut tree = Octree::default();
	tree.insert_all(&distinct_pixels());
	for depth in 1..=4 {
		assert!(tree.nodes_at(depth).next().is_some());
		assert!(tree.nodes_at(depth).all(|n| n.sample_count() == 0));
	}
	assert_eq!(tree.nodes_at(5).count(), 10);
	assert!(tree.nodes_at(5).all(|n| n.sample_count() == 1));
	assert!(tree.nodes_at(0).next().is_none());
	assert!(tree.nodes_at(9).next().is_none());
}

#[test]
fn prune_depth_limits() {
	let mut tree = Octree::default();
	tree.insert_all(&distinct_pixels());
	assert_eq!(tree.prune_at(1), Err(PruneError::DepthOutOfRange { depth: 1, max_depth: 5 }));
	assert_eq!(tree.prune_at(5), Err(PruneError::DepthOutOfRange { depth: 5, max_depth: 5 }));
	assert_eq!(tree.prune_at(6), Err(PruneError::DepthOutOfRange { depth: 6, max_depth: 5 }));
	assert_eq!(tree.leaf_count(), 10);
}

#[test]
fn prune_one_level() {
	let mut tree = Octree::default();
	tree.insert_all(&distinct_pixels());

	assert_eq!(tree.prune_at(4), Ok(10));
	assert!(tree.nodes_at(5).next().is_none());
	assert_eq!(tree.leaf_count(), 10);
	assert!(tree.leaves().iter().all(|leaf| leaf.depth() == 4));
	assert_eq!(tree.sample_count(), 10);

	tree.prune_at(3).unwrap();
	assert_eq!(tree.leaf_count(), 7);
	assert_eq!(tree.sample_count(), 10);
}

#[test]
fn prune_skipping_levels_keeps_every_sample() {
	let mut tree = Octree::default();
	tree.insert_all(&distinct_pixels());

	tree.prune_at(2).unwrap();
	assert_eq!(tree.leaf_count(), 5);
	assert_eq!(tree.sample_count(), 10);
	for depth in 3..=5 {
		assert!(tree.nodes_at(depth).next().is_none());
	}
	// only the root, its children and the depth 2 leaves remain
	assert_eq!(tree.node_count(), 1 + tree.nodes_at(1).count() + tree.nodes_at(2).count());
}

#[test]
fn pruning_conserves_samples() {
	let pixels = random_pixels(5000, 0x5eed);
	for &max_depth in [3u8, 5, 6].iter() {
		for depth in 2..max_depth {
			let mut tree = Octree::new(max_depth).unwrap();
			tree.insert_all(&pixels);
			let leaves_before = tree.leaf_count();

			tree.prune_at(depth).unwrap();
			assert_eq!(tree.sample_count(), 5000);
			assert!(tree.leaf_count() <= leaves_before);
			assert!(tree.leaves().iter().all(|leaf| leaf.depth() <= depth));
			for deeper in depth + 1..=max_depth {
				assert!(tree.nodes_at(deeper).next().is_none());
			}
		}
	}
}

#[test]
fn progressive_pruning_conserves_samples() {
	let pixels = random_pixels(2000, 7);
	let mut tree = Octree::new(6).unwrap();
	tree.insert_all(&pixels);
	let mut leaves = tree.leaf_count();
	for depth in (2..6).rev() {
		tree.prune_at(depth).unwrap();
		assert_eq!(tree.sample_count(), 2000);
		assert!(tree.leaf_count() <= leaves);
		leaves = tree.leaf_count();
	}
	// two levels of eight children
	assert!(leaves <= 64);
}

#[test]
fn palette_has_one_entry_per_leaf() {
	let pixels = random_pixels(3000, 99);
	let mut tree = Octree::default();
	tree.insert_all(&pixels);
	tree.prune_at(3).unwrap();

	let palette = tree.palette();
	assert_eq!(palette.len(), tree.leaf_count());
	for leaf in tree.leaves() {
		let key = leaf.palette_key().unwrap();
		assert_eq!(palette.get(key), Some(leaf.averaged_color().unwrap()));
	}
}

#[test]
fn small_tree_palette() {
	let pixels = distinct_pixels();
	let mut tree = Octree::new(2).unwrap();
	tree.insert_all(&pixels);

	let palette = tree.palette();
	assert_eq!(palette.len(), 5);
	assert_eq!(
		palette.colors(),
		vec![
			image::Rgb([4, 8, 12]),
			image::Rgb([12, 24, 36]),
			image::Rgb([18, 36, 54]),
			image::Rgb([26, 52, 78]),
			image::Rgb([34, 68, 102]),
		]
	);
}
