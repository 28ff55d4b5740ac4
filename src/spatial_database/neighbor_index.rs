use nalgebra::Point2;
use rstar::primitives::GeomWithData;
use rstar::RTree;

type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// A data point returned by a neighbor query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the point in the indexed slice.
    pub index: usize,
    pub distance: f64,
}

/// Nearest-neighbor index over working-frame data locations.
pub struct NeighborIndex {
    tree: RTree<IndexedPoint>,
}

impl NeighborIndex {
    pub fn new(points: &[Point2<f64>]) -> Self {
        let tree_points = points
            .iter()
            .enumerate()
            .map(|(i, p)| IndexedPoint::new([p.x, p.y], i))
            .collect();
        let tree = RTree::bulk_load(tree_points);

        Self { tree }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// The `k` data points closest to `query`, sorted by ascending distance.
    pub fn nearest(&self, query: &Point2<f64>, k: usize) -> Vec<Neighbor> {
        self.tree
            .nearest_neighbor_iter_with_distance_2(&[query.x, query.y])
            .take(k)
            .map(|(point, dist_2)| Neighbor {
                index: point.data,
                distance: dist_2.sqrt(),
            })
            .collect()
    }
}
