//! Planar transformations and connectivity checks on piece cells.
//!
//! A piece in the plane has at most 4 distinct orientations under rotation.
//! Symmetric pieces (the square, the straight line, S and Z) produce fewer.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::pieces::{Point, Shape};

/// Number of quarter turns in a full rotation.
const QUARTER_TURNS: usize = 4;

/// Rotates a normalized shape a quarter turn clockwise.
///
/// Maps `(x, y)` to `(height - 1 - y, x)`, which keeps the result inside the
/// first quadrant; the new width is the old height and vice versa.
pub fn rotate_quarter(shape: &Shape) -> Shape {
    let height = extent(shape).1;
    let mut rotated = *shape;
    for point in &mut rotated {
        *point = Point::new(height - 1 - point.y, point.x);
    }
    rotated.sort();
    rotated
}

/// Returns every distinct rotation of a shape, starting with the shape itself.
///
/// Rotations are generated by repeatedly turning the previous result, and a
/// rotation equal to one already seen is dropped. The identity orientation
/// always comes first.
pub fn all_rotations(shape: &Shape) -> Vec<Shape> {
    let mut seen: FxHashSet<Shape> = FxHashSet::default();
    let mut rotations = Vec::with_capacity(QUARTER_TURNS);

    let mut current = normalize_to_origin(*shape);
    for _ in 0..QUARTER_TURNS {
        if seen.insert(current) {
            rotations.push(current);
        }
        current = rotate_quarter(&current);
    }

    rotations
}

/// Translates points so the minimum x and y are both zero, and sorts them
/// row-major so equal shapes compare equal.
pub fn normalize_to_origin(mut shape: Shape) -> Shape {
    let min_x = shape.iter().map(|point| point.x).min().unwrap_or(0);
    let min_y = shape.iter().map(|point| point.y).min().unwrap_or(0);

    for point in &mut shape {
        point.x -= min_x;
        point.y -= min_y;
    }

    shape.sort();
    shape
}

/// Width and height of the bounding box of a normalized shape.
pub fn extent(shape: &Shape) -> (usize, usize) {
    let width = shape.iter().map(|point| point.x).max().unwrap_or(0) + 1;
    let height = shape.iter().map(|point| point.y).max().unwrap_or(0) + 1;
    (width, height)
}

/// True if two cells share an edge. Diagonal neighbours do not count.
#[inline]
pub fn is_adjacent(a: Point, b: Point) -> bool {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y) == 1
}

/// Checks that all points form one 4-connected component.
///
/// Builds the edge-adjacency graph between the points and runs a
/// breadth-first search from the first one. Duplicate points are never
/// adjacent to each other, so a shape with repeated cells is rejected too.
pub fn is_connected(points: &[Point]) -> bool {
    if points.is_empty() {
        return false;
    }

    let mut neighbours: Vec<Vec<usize>> = vec![Vec::new(); points.len()];
    for (i, &a) in points.iter().enumerate() {
        for (j, &b) in points.iter().enumerate().skip(i + 1) {
            if is_adjacent(a, b) {
                neighbours[i].push(j);
                neighbours[j].push(i);
            }
        }
    }

    let mut visited = vec![false; points.len()];
    let mut queue = VecDeque::from([0]);
    visited[0] = true;
    let mut reached = 1;

    while let Some(current) = queue.pop_front() {
        for &next in &neighbours[current] {
            if !visited[next] {
                visited[next] = true;
                reached += 1;
                queue.push_back(next);
            }
        }
    }

    reached == points.len() && has_distinct_points(points)
}

fn has_distinct_points(points: &[Point]) -> bool {
    let unique: FxHashSet<Point> = points.iter().copied().collect();
    unique.len() == points.len()
}

/// Builds a shape from `(x, y)` pairs, normalizing it to the origin.
///
/// Returns `None` unless exactly four pairs are given.
pub fn shape_from_coords(coords: &[(usize, usize)]) -> Option<Shape> {
    let points: Vec<Point> = coords.iter().map(|&(x, y)| Point::new(x, y)).collect();
    let shape: Shape = points.try_into().ok()?;
    Some(normalize_to_origin(shape))
}
