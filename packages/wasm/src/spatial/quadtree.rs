//! Barnes-Hut quadtree over point-mass positions.
//!
//! The tree is stored as a flat arena. Children are always appended after
//! their parent, so a reverse sweep over the arena visits children before
//! parents, which is how aggregate mass and center of mass are computed.
//!
//! Bodies live only in leaves. A leaf holds more than one body when they sit
//! at exactly the same position or when the depth limit is reached, which
//! keeps insertion finite for coincident input.

use crate::error::{LayoutError, LayoutResult};
use crate::sim::PointMass;

/// Largest accepted depth limit.
pub const MAX_TREE_DEPTH: u32 = 32;

/// Depth limit used unless configured otherwise.
pub const DEFAULT_TREE_DEPTH: u32 = 20;

/// A source of force seen from a query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    /// A single body, by point-mass index. May be the query body itself.
    Body(usize),
    /// A far-away subtree collapsed into its aggregate.
    Cluster { mass: f32, center: [f32; 2] },
}

#[derive(Debug, Clone)]
struct QuadNode {
    /// Minimum corner of the square cell.
    origin: [f32; 2],
    /// Side length of the cell.
    size: f32,
    mass: f32,
    center_of_mass: [f32; 2],
    /// Child cells indexed by quadrant: bit 0 = right half, bit 1 = lower half.
    children: [Option<u32>; 4],
    bodies: Vec<usize>,
}

impl QuadNode {
    fn new(origin: [f32; 2], size: f32) -> Self {
        Self {
            origin,
            size,
            mass: 0.0,
            center_of_mass: [0.0; 2],
            children: [None; 4],
            bodies: Vec::new(),
        }
    }

    #[inline]
    fn contains(&self, p: [f32; 2]) -> bool {
        (self.origin[0]..=self.origin[0] + self.size).contains(&p[0])
            && (self.origin[1]..=self.origin[1] + self.size).contains(&p[1])
    }

    #[inline]
    fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    #[inline]
    fn quadrant(&self, p: [f32; 2]) -> usize {
        let half = self.size * 0.5;
        let right = (p[0] >= self.origin[0] + half) as usize;
        let lower = (p[1] >= self.origin[1] + half) as usize;
        right | (lower << 1)
    }
}

/// Step-scoped Barnes-Hut quadtree.
#[derive(Debug, Clone, Default)]
pub struct QuadTree {
    nodes: Vec<QuadNode>,
    max_depth: u32,
    body_count: usize,
}

impl QuadTree {
    /// Check a depth limit before it is handed to [`QuadTree::build`].
    pub fn validate_depth(depth: u32) -> LayoutResult<u32> {
        if depth == 0 || depth > MAX_TREE_DEPTH {
            return Err(LayoutError::InvalidTreeDepth {
                depth,
                max: MAX_TREE_DEPTH,
            });
        }
        Ok(depth)
    }

    /// Build a tree over the finite positions in `items`.
    ///
    /// `max_depth` is clamped into `1..=MAX_TREE_DEPTH`.
    pub fn build(items: &[PointMass], max_depth: u32) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            max_depth: max_depth.clamp(1, MAX_TREE_DEPTH),
            body_count: 0,
        };

        let finite = |item: &&PointMass| item.position.iter().all(|c| c.is_finite());
        let mut min = [f32::INFINITY; 2];
        let mut max = [f32::NEG_INFINITY; 2];
        for item in items.iter().filter(finite) {
            for axis in 0..2 {
                min[axis] = min[axis].min(item.position[axis]);
                max[axis] = max[axis].max(item.position[axis]);
            }
        }
        if min[0] == f32::INFINITY {
            return tree;
        }

        let extent = (max[0] - min[0]).max(max[1] - min[1]).max(1.0);
        tree.nodes.push(QuadNode::new(min, extent * 1.001));

        for (index, item) in items.iter().enumerate() {
            if finite(&item) {
                tree.insert(index, items);
                tree.body_count += 1;
            }
        }
        tree.compute_aggregates(items);
        tree
    }

    fn insert(&mut self, index: usize, items: &[PointMass]) {
        let p = items[index].position;
        let mut node = 0usize;
        let mut depth = 0u32;

        loop {
            if self.nodes[node].is_leaf() {
                let bodies = &self.nodes[node].bodies;
                let coincident = bodies.first().is_some_and(|&b| items[b].position == p);
                if bodies.is_empty() || coincident || depth >= self.max_depth {
                    self.nodes[node].bodies.push(index);
                    return;
                }

                // Split: push the residents one level down, then keep descending.
                let residents = std::mem::take(&mut self.nodes[node].bodies);
                for resident in residents {
                    let quadrant = self.nodes[node].quadrant(items[resident].position);
                    let child = self.child(node, quadrant);
                    self.nodes[child].bodies.push(resident);
                }
            }

            let quadrant = self.nodes[node].quadrant(p);
            node = self.child(node, quadrant);
            depth += 1;
        }
    }

    fn child(&mut self, node: usize, quadrant: usize) -> usize {
        if let Some(child) = self.nodes[node].children[quadrant] {
            return child as usize;
        }
        let parent = &self.nodes[node];
        let half = parent.size * 0.5;
        let origin = [
            parent.origin[0] + if quadrant & 1 != 0 { half } else { 0.0 },
            parent.origin[1] + if quadrant & 2 != 0 { half } else { 0.0 },
        ];
        let child = self.nodes.len();
        self.nodes.push(QuadNode::new(origin, half));
        self.nodes[node].children[quadrant] = Some(child as u32);
        child
    }

    fn compute_aggregates(&mut self, items: &[PointMass]) {
        for i in (0..self.nodes.len()).rev() {
            let mut mass = 0.0f32;
            let mut weighted = [0.0f32; 2];

            let node = &self.nodes[i];
            for &b in &node.bodies {
                let item = &items[b];
                mass += item.mass;
                weighted[0] += item.mass * item.position[0];
                weighted[1] += item.mass * item.position[1];
            }
            for child in node.children.iter().flatten() {
                let child = &self.nodes[*child as usize];
                mass += child.mass;
                weighted[0] += child.mass * child.center_of_mass[0];
                weighted[1] += child.mass * child.center_of_mass[1];
            }

            let node = &mut self.nodes[i];
            node.mass = mass;
            if mass > 0.0 {
                node.center_of_mass = [weighted[0] / mass, weighted[1] / mass];
            }
        }
    }

    /// Walk the tree from `point`, reporting every force source.
    ///
    /// A subtree is collapsed into a [`Interaction::Cluster`] when its cell
    /// size divided by the distance to its center of mass falls below
    /// `theta`. With `theta == 0` every body is reported individually.
    pub fn for_each_interaction(
        &self,
        point: [f32; 2],
        theta: f32,
        mut visit: impl FnMut(Interaction),
    ) {
        if self.nodes.is_empty() {
            return;
        }

        let mut stack = vec![0u32];
        while let Some(i) = stack.pop() {
            let node = &self.nodes[i as usize];
            if node.mass <= 0.0 {
                continue;
            }
            if node.is_leaf() {
                for &b in &node.bodies {
                    visit(Interaction::Body(b));
                }
                continue;
            }

            let dx = node.center_of_mass[0] - point[0];
            let dy = node.center_of_mass[1] - point[1];
            let r = dx.hypot(dy);
            // A cell holding the query point is always opened.
            if r > 0.0 && node.size / r < theta && !node.contains(point) {
                visit(Interaction::Cluster {
                    mass: node.mass,
                    center: node.center_of_mass,
                });
            } else {
                stack.extend(node.children.iter().flatten());
            }
        }
    }

    /// Number of bodies indexed.
    pub fn len(&self) -> usize {
        self.body_count
    }

    /// Whether no body is indexed.
    pub fn is_empty(&self) -> bool {
        self.body_count == 0
    }

    /// Number of cells in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth limit the tree was built with.
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Total indexed mass.
    pub fn total_mass(&self) -> f32 {
        self.nodes.first().map_or(0.0, |root| root.mass)
    }

    /// Center of mass of all indexed bodies.
    pub fn center_of_mass(&self) -> Option<[f32; 2]> {
        self.nodes
            .first()
            .filter(|root| root.mass > 0.0)
            .map(|root| root.center_of_mass)
    }
}
