//! Breadth-first pathfinding on the navigation grid
//!
//! Unweighted search over eight neighbours with corner-cut prevention,
//! followed by line-of-sight smoothing into a short waypoint list.

use std::collections::VecDeque;

use glam::Vec2;

use super::{GridCell, NavGrid, WalkabilityOracle, has_line_of_sight};

/// Neighbour offsets: the four cardinal and four diagonal directions,
/// counter-clockwise from +x.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Ordered waypoints from the current position to a destination.
///
/// Consumed from the front as waypoints are reached. An empty path means
/// "no movement command".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    waypoints: VecDeque<Vec2>,
}

impl Path {
    /// An empty path
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a path from points in travel order
    #[must_use]
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Self {
        Self {
            waypoints: points.into_iter().collect(),
        }
    }

    /// Check if there is nothing left to follow
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Number of remaining waypoints
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Next waypoint to reach
    #[must_use]
    pub fn head(&self) -> Option<Vec2> {
        self.waypoints.front().copied()
    }

    /// Drop the reached head waypoint
    pub fn pop_head(&mut self) -> Option<Vec2> {
        self.waypoints.pop_front()
    }

    /// Final waypoint
    #[must_use]
    pub fn destination(&self) -> Option<Vec2> {
        self.waypoints.back().copied()
    }

    /// Remaining waypoints in order
    pub fn iter(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.waypoints.iter().copied()
    }

    /// Copy out the remaining waypoints
    #[must_use]
    pub fn to_vec(&self) -> Vec<Vec2> {
        self.waypoints.iter().copied().collect()
    }

    /// Total length along the remaining waypoints
    #[must_use]
    pub fn length(&self) -> f32 {
        self.waypoints
            .iter()
            .zip(self.waypoints.iter().skip(1))
            .map(|(a, b)| a.distance(*b))
            .sum()
    }
}

/// Plain walkability of a cell centre.
///
/// Clearance is left to the goal gate and smoothing so that corridors a
/// single body wide stay traversable.
fn cell_open(oracle: &WalkabilityOracle, grid: &NavGrid, cell: GridCell) -> bool {
    let c = grid.cell_center(cell);
    oracle.is_walkable(c.x, c.y)
}

/// Run the breadth-first search, returning cells from start to goal
fn search_cells(
    oracle: &WalkabilityOracle,
    grid: &NavGrid,
    start: GridCell,
    goal: GridCell,
) -> Option<Vec<GridCell>> {
    let open = |cell| cell_open(oracle, grid, cell);
    let mut visited = vec![false; grid.cell_count()];
    let mut parent: Vec<Option<usize>> = vec![None; grid.cell_count()];
    let mut queue = VecDeque::new();

    visited[grid.index(start)] = true;
    queue.push_back(start);

    let mut found = false;
    while let Some(current) = queue.pop_front() {
        if current == goal {
            found = true;
            break;
        }

        for &(di, dj) in &NEIGHBOR_OFFSETS {
            let Some(next) = grid.offset(current, di, dj) else {
                continue;
            };
            let next_idx = grid.index(next);
            if visited[next_idx] || !open(next) {
                continue;
            }

            // Diagonals need both bracketing orthogonal cells open
            if di != 0 && dj != 0 {
                let side_a = grid.offset(current, di, 0);
                let side_b = grid.offset(current, 0, dj);
                let clear = match (side_a, side_b) {
                    (Some(a), Some(b)) => open(a) && open(b),
                    _ => false,
                };
                if !clear {
                    continue;
                }
            }

            visited[next_idx] = true;
            parent[next_idx] = Some(grid.index(current));
            queue.push_back(next);
        }
    }

    if !found {
        return None;
    }

    let mut cells = vec![goal];
    let mut cur = grid.index(goal);
    while let Some(prev) = parent[cur] {
        cells.push(grid.cell_at(prev));
        cur = prev;
    }
    cells.reverse();
    Some(cells)
}

/// Find a path between two world points.
///
/// The first waypoint is the literal `start`; the rest are cell centres,
/// smoothed so consecutive waypoints see each other. Out-of-bounds
/// endpoints, a goal without clearance, an unready oracle, or an
/// unreachable goal all produce an empty path.
#[must_use]
pub fn find_path(
    oracle: &WalkabilityOracle,
    grid: &NavGrid,
    clearance: f32,
    start: Vec2,
    goal: Vec2,
) -> Path {
    let (Some(start_cell), Some(goal_cell)) = (grid.world_to_grid(start), grid.world_to_grid(goal))
    else {
        log::debug!("Path request outside grid: {start} -> {goal}");
        return Path::empty();
    };

    if !oracle.is_walkable_with_clearance(goal.x, goal.y, clearance) {
        log::debug!("Path goal {goal} is not walkable");
        return Path::empty();
    }

    let Some(cells) = search_cells(oracle, grid, start_cell, goal_cell) else {
        log::debug!("No path from {start} to {goal}");
        return Path::empty();
    };

    // Literal start instead of the start cell centre avoids an initial snap
    let mut points: Vec<Vec2> = cells.iter().map(|&c| grid.cell_center(c)).collect();
    points[0] = start;

    let smoothed = smooth_path(&points, |a, b| {
        has_line_of_sight(oracle, grid, clearance, a, b)
    });
    Path::from_points(smoothed)
}

/// Collapse a waypoint chain greedily using a line-of-sight test.
///
/// Keeps the first and last points and every point where sight from the
/// current anchor breaks. Never returns more points than it was given.
pub fn smooth_path(points: &[Vec2], mut sight: impl FnMut(Vec2, Vec2) -> bool) -> Vec<Vec2> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let last = points.len() - 1;
    let mut result = vec![points[0]];
    let mut anchor = 0;
    let mut i = 1;
    while i <= last {
        if sight(points[anchor], points[i]) {
            i += 1;
            continue;
        }
        // An adjacent point without sight is kept as is
        let keep = if i - 1 > anchor { i - 1 } else { i };
        result.push(points[keep]);
        anchor = keep;
        i = keep + 1;
    }
    if anchor != last {
        result.push(points[last]);
    }

    result.dedup();
    result
}
