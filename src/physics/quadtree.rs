use std::ops::Range;

use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 12;
const MAX_DEPTH: usize = 10;
const NO_CHILD: u32 = u32::MAX;

/// Axis-aligned square region of the plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Square {
    pub(super) center: Vec2,
    pub(super) half: f32,
}

impl Square {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(min, max), point| (min.min(*point), max.max(*point)));
        if !(min.is_finite() && max.is_finite()) {
            return None;
        }

        let span = (max - min).max_elem().max(1.0);
        Some(Self {
            center: (min + max) * 0.5,
            half: span * 0.5 + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let offset = (point - self.center).abs();
        offset.x <= self.half && offset.y <= self.half
    }

    pub(super) fn side(self) -> f32 {
        self.half * 2.0
    }

    /// Bit 0 is set east of the center, bit 1 south of it.
    fn quadrant(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }

    fn child(self, quadrant: usize) -> Self {
        let quarter = self.half * 0.5;
        let sign = |bit: usize| if quadrant & bit == 0 { -quarter } else { quarter };
        Self {
            center: self.center + vec2(sign(1), sign(2)),
            half: quarter,
        }
    }

    /// Squared length of the shortest segment between the two squares.
    fn gap_sq(self, other: Self) -> f32 {
        let gap = ((self.center - other.center).abs() - Vec2::splat(self.half + other.half))
            .max(Vec2::ZERO);
        gap.length_sq()
    }
}

/// One arena slot. `members` indexes into the tree's point order and covers
/// every point below the cell, so a leaf's members are its own points.
#[derive(Clone, Debug)]
pub(super) struct Cell {
    pub(super) square: Square,
    /// Points below the cell; every node carries unit mass.
    pub(super) mass: f32,
    pub(super) center_of_mass: Vec2,
    members: Range<usize>,
    children: [u32; 4],
}

impl Cell {
    fn children(&self) -> impl Iterator<Item = usize> + '_ {
        self.children
            .iter()
            .filter(|&&child| child != NO_CHILD)
            .map(|&child| child as usize)
    }
}

/// Region quadtree stored as a flat cell arena. The root is cell 0 and the
/// point indices are permuted so each cell owns a contiguous run of them.
#[derive(Clone, Debug)]
pub(super) struct Quadtree {
    cells: Vec<Cell>,
    order: Vec<usize>,
}

impl Quadtree {
    pub(super) const ROOT: usize = 0;

    /// `None` for an empty set or any non-finite point.
    pub(super) fn build(points: &[Vec2]) -> Option<Self> {
        let square = Square::enclosing(points)?;
        let mut tree = Self {
            cells: Vec::with_capacity(points.len() / LEAF_CAPACITY * 2 + 1),
            order: (0..points.len()).collect(),
        };
        tree.subdivide(square, 0..points.len(), points, 0);
        Some(tree)
    }

    fn subdivide(&mut self, square: Square, members: Range<usize>, points: &[Vec2], depth: usize) -> usize {
        let id = self.cells.len();
        let run = &mut self.order[members.clone()];
        let mass = run.len() as f32;
        let sum = run.iter().fold(Vec2::ZERO, |sum, &index| sum + points[index]);
        self.cells.push(Cell {
            square,
            mass,
            center_of_mass: if mass > 0.0 { sum / mass } else { square.center },
            members: members.clone(),
            children: [NO_CHILD; 4],
        });

        if depth >= MAX_DEPTH || run.len() <= LEAF_CAPACITY {
            return id;
        }

        let mut counts = [0usize; 4];
        for &index in run.iter() {
            counts[square.quadrant(points[index])] += 1;
        }
        // All points in one quadrant means they coincide at this depth.
        if counts.contains(&run.len()) {
            return id;
        }
        run.sort_by_key(|&index| square.quadrant(points[index]));

        let mut start = members.start;
        for (quadrant, &count) in counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let child = self.subdivide(square.child(quadrant), start..start + count, points, depth + 1);
            self.cells[id].children[quadrant] = child as u32;
            start += count;
        }
        id
    }

    pub(super) fn cell(&self, id: usize) -> &Cell {
        &self.cells[id]
    }

    pub(super) fn is_leaf(&self, id: usize) -> bool {
        self.cells[id].children().next().is_none()
    }

    pub(super) fn children(&self, id: usize) -> impl Iterator<Item = usize> + '_ {
        self.cells[id].children()
    }

    pub(super) fn members(&self, id: usize) -> &[usize] {
        &self.order[self.cells[id].members.clone()]
    }

    /// Pushes every index pair `(low, high)` closer than `max_distance_sq`,
    /// in no particular order.
    pub(super) fn close_pairs(&self, points: &[Vec2], max_distance_sq: f32, pairs: &mut Vec<(usize, usize)>) {
        self.pairs_between(Self::ROOT, Self::ROOT, points, max_distance_sq, pairs);
    }

    fn pairs_between(
        &self,
        a: usize,
        b: usize,
        points: &[Vec2],
        max_distance_sq: f32,
        pairs: &mut Vec<(usize, usize)>,
    ) {
        let (cell_a, cell_b) = (&self.cells[a], &self.cells[b]);
        if cell_a.square.gap_sq(cell_b.square) >= max_distance_sq {
            return;
        }

        match (self.is_leaf(a), self.is_leaf(b)) {
            (true, true) => {
                let mut keep = |from: usize, to: usize| {
                    if (points[from] - points[to]).length_sq() < max_distance_sq {
                        pairs.push((from.min(to), from.max(to)));
                    }
                };
                let members_a = self.members(a);
                if a == b {
                    for (offset, &from) in members_a.iter().enumerate() {
                        for &to in &members_a[offset + 1..] {
                            keep(from, to);
                        }
                    }
                } else {
                    for &from in members_a {
                        for &to in self.members(b) {
                            keep(from, to);
                        }
                    }
                }
            }
            _ if a == b => {
                let children = cell_a.children;
                for (slot, &first) in children.iter().enumerate().filter(|(_, child)| **child != NO_CHILD) {
                    let first = first as usize;
                    self.pairs_between(first, first, points, max_distance_sq, pairs);
                    for &second in children[slot + 1..].iter().filter(|&&child| child != NO_CHILD) {
                        self.pairs_between(first, second as usize, points, max_distance_sq, pairs);
                    }
                }
            }
            (false, leaf_b) if leaf_b || cell_a.square.half >= cell_b.square.half => {
                for child in cell_a.children() {
                    self.pairs_between(child, b, points, max_distance_sq, pairs);
                }
            }
            _ => {
                for child in cell_b.children() {
                    self.pairs_between(a, child, points, max_distance_sq, pairs);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(side: usize, spacing: f32) -> Vec<Vec2> {
        (0..side * side)
            .map(|index| vec2((index % side) as f32 * spacing, (index / side) as f32 * spacing))
            .collect()
    }

    #[test]
    fn mass_and_center_of_mass_cover_all_points() {
        let points = grid(10, 5.0);
        let tree = Quadtree::build(&points).unwrap();
        let root = tree.cell(Quadtree::ROOT);

        assert_eq!(root.mass, 100.0);
        assert!((root.center_of_mass - vec2(22.5, 22.5)).length() < 1e-3);
        assert!(!tree.is_leaf(Quadtree::ROOT));
        let child_mass = tree
            .children(Quadtree::ROOT)
            .map(|child| tree.cell(child).mass)
            .sum::<f32>();
        assert_eq!(child_mass, 100.0);
    }

    #[test]
    fn every_point_lies_inside_each_cell_that_owns_it() {
        let points = grid(9, 13.0);
        let tree = Quadtree::build(&points).unwrap();

        let mut leaf_points = Vec::new();
        let mut stack = vec![Quadtree::ROOT];
        while let Some(id) = stack.pop() {
            for &index in tree.members(id) {
                assert!(tree.cell(id).square.contains(points[index]), "point {index} outside cell {id}");
            }
            if tree.is_leaf(id) {
                leaf_points.extend_from_slice(tree.members(id));
            }
            stack.extend(tree.children(id));
        }
        leaf_points.sort_unstable();
        assert_eq!(leaf_points, (0..points.len()).collect::<Vec<_>>());
    }

    #[test]
    fn coincident_points_stay_in_one_leaf() {
        let points = vec![vec2(3.0, 3.0); 40];
        let tree = Quadtree::build(&points).unwrap();

        assert!(tree.is_leaf(Quadtree::ROOT));
        assert_eq!(tree.members(Quadtree::ROOT).len(), 40);
    }

    #[test]
    fn close_pairs_match_brute_force() {
        let points = grid(12, 7.0);
        let tree = Quadtree::build(&points).unwrap();
        let max_distance_sq = 10.0 * 10.0;

        let mut pairs = Vec::new();
        tree.close_pairs(&points, max_distance_sq, &mut pairs);
        pairs.sort_unstable();

        let mut expected = Vec::new();
        for from in 0..points.len() {
            for to in (from + 1)..points.len() {
                if (points[from] - points[to]).length_sq() < max_distance_sq {
                    expected.push((from, to));
                }
            }
        }

        assert_eq!(pairs, expected);
    }

    #[test]
    fn empty_and_non_finite_inputs_build_nothing() {
        assert!(Quadtree::build(&[]).is_none());
        assert!(Quadtree::build(&[vec2(f32::NAN, 0.0)]).is_none());
    }
}
