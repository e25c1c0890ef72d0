use crate::geometry::Rect;
use crate::net::TrappingNet;
use rstar::{RTree, RTreeObject, AABB};

/// One net edge in panel space, tagged with its position in scan order.
#[derive(Clone, Debug)]
pub struct NetEdge {
    pub circle: usize,
    pub edge: usize,
    pub a: [f64; 2],
    pub b: [f64; 2],
}

impl RTreeObject for NetEdge {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.a, self.b)
    }
}

/// Build an R*-tree over every edge of every circle via bulk_load.
pub fn build_index(net: &TrappingNet) -> RTree<NetEdge> {
    let edges: Vec<NetEdge> = net
        .circles()
        .iter()
        .enumerate()
        .flat_map(|(circle, c)| {
            c.polygon()
                .edges()
                .enumerate()
                .map(move |(edge, (a, b))| NetEdge { circle, edge, a, b })
        })
        .collect();
    RTree::bulk_load(edges)
}

/// First `(circle, edge)` in scan order whose segment crosses `rect`.
///
/// Candidates come from an envelope query; the minimum over exact hits is the
/// same edge a linear innermost-first scan would stop at.
pub fn first_hit(tree: &RTree<NetEdge>, rect: &Rect) -> Option<(usize, usize)> {
    let envelope = AABB::from_corners(rect.min(), rect.max());
    tree.locate_in_envelope_intersecting(&envelope)
        .filter(|e| rect.intersects_segment(e.a, e.b))
        .map(|e| (e.circle, e.edge))
        .min()
}
