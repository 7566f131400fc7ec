//! Problem domains shared by the engine tests: the N-Puzzle sliding game
//! and a weighted maze grid.

use crate::graph::{Edge, Graph};

/// An N-Puzzle position. Tile 0 is the empty cell; the puzzle is solved
/// when the tiles read 1..n with the empty cell last.
#[derive(Clone, PartialEq, Eq, Hash)]
pub(crate) struct Puzzle {
    size: usize,
    empty: usize,
    tiles: Vec<u8>,
}

impl std::fmt::Debug for Puzzle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Puzzle{:?}", self.tiles)
    }
}

impl Puzzle {
    pub(crate) fn new(tiles: &[u8]) -> Self {
        let size = (tiles.len() as f64).sqrt() as usize;
        assert_eq!(size * size, tiles.len(), "tile count must be a square");
        let empty = tiles
            .iter()
            .position(|&t| t == 0)
            .expect("puzzle needs an empty cell");
        Puzzle {
            size,
            empty,
            tiles: tiles.to_vec(),
        }
    }

    pub(crate) fn is_solved(&self) -> bool {
        self.tiles[self.tiles.len() - 1] == 0
            && self.tiles[..self.tiles.len() - 1]
                .iter()
                .enumerate()
                .all(|(i, &t)| t as usize == i + 1)
    }

    fn slide(&self, new_empty: usize) -> Self {
        let mut tiles = self.tiles.clone();
        tiles.swap(self.empty, new_empty);
        Puzzle {
            size: self.size,
            empty: new_empty,
            tiles,
        }
    }
}

/// The graph of N-Puzzle positions: up to four moves slide a neighbouring
/// tile into the empty cell, each at unit cost.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PuzzleGraph;

impl Graph for PuzzleGraph {
    type Node = Puzzle;

    fn outgoing_edges(&self, node: &Puzzle) -> Vec<Edge<Puzzle>> {
        let size = node.size;
        let (row, col) = (node.empty / size, node.empty % size);
        let mut edges = Vec::with_capacity(4);
        if row > 0 {
            edges.push(Edge::labeled("UP", 1.0, node.slide(node.empty - size)));
        }
        if row < size - 1 {
            edges.push(Edge::labeled("DOWN", 1.0, node.slide(node.empty + size)));
        }
        if col > 0 {
            edges.push(Edge::labeled("LEFT", 1.0, node.slide(node.empty - 1)));
        }
        if col < size - 1 {
            edges.push(Edge::labeled("RIGHT", 1.0, node.slide(node.empty + 1)));
        }
        edges
    }
}

/// Sum over all tiles of the Manhattan distance to the tile's solved
/// position. Consistent for unit move costs.
pub(crate) fn manhattan(puzzle: &Puzzle) -> f64 {
    let size = puzzle.size as i64;
    let mut total = 0;
    for (index, &tile) in puzzle.tiles.iter().enumerate() {
        if tile == 0 {
            continue;
        }
        let index = index as i64;
        let goal = tile as i64 - 1;
        total += (index / size - goal / size).abs() + (index % size - goal % size).abs();
    }
    total as f64
}

/// Number of tiles not in their solved position. Consistent, but much
/// weaker than [`manhattan`].
pub(crate) fn out_of_place(puzzle: &Puzzle) -> f64 {
    puzzle
        .tiles
        .iter()
        .enumerate()
        .filter(|&(index, &tile)| tile != 0 && tile as usize != index + 1)
        .count() as f64
}

/// A cell in a [`MazeGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Cell {
    pub(crate) row: i32,
    pub(crate) col: i32,
}

impl Cell {
    pub(crate) fn new(row: i32, col: i32) -> Self {
        Cell { row, col }
    }
}

/// A grid maze with 8-directional movement. A cell value of zero is a
/// wall; a positive value is the cost of stepping onto the cell.
#[derive(Debug, Clone)]
pub(crate) struct MazeGraph {
    grid: Vec<Vec<u8>>,
    target: Cell,
}

const DIRECTIONS: [(i32, i32, &str); 8] = [
    (0, -1, "LEFT"),
    (0, 1, "RIGHT"),
    (-1, 0, "UP"),
    (1, 0, "DOWN"),
    (-1, -1, "UP-LEFT"),
    (-1, 1, "UP-RIGHT"),
    (1, -1, "DOWN-LEFT"),
    (1, 1, "DOWN-RIGHT"),
];

impl MazeGraph {
    /// The 10×10 grid used across the engine tests.
    pub(crate) fn fixture_10x10(target_row: i32, target_col: i32) -> Self {
        let grid = [
            [1, 1, 1, 1, 0, 0, 1, 1, 1, 1],
            [1, 0, 1, 0, 0, 1, 1, 0, 1, 1],
            [1, 0, 1, 1, 1, 1, 0, 0, 1, 1],
            [1, 0, 1, 0, 0, 1, 1, 1, 1, 1],
            [1, 0, 1, 0, 1, 1, 1, 0, 0, 1],
            [1, 1, 1, 1, 0, 1, 0, 1, 1, 1],
            [0, 0, 0, 1, 0, 1, 1, 1, 1, 1],
            [1, 1, 1, 1, 1, 1, 1, 0, 1, 1],
            [1, 1, 1, 0, 0, 0, 0, 0, 1, 1],
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
        ];
        let grid: Vec<Vec<u8>> = grid.iter().map(|row| row.to_vec()).collect();
        let target = Cell::new(target_row, target_col);
        assert!(grid[target.row as usize][target.col as usize] > 0);
        MazeGraph { grid, target }
    }

    pub(crate) fn is_target(&self, cell: &Cell) -> bool {
        *cell == self.target
    }

    pub(crate) fn is_walkable(&self, cell: &Cell) -> bool {
        self.cost(cell.row, cell.col).is_some()
    }

    fn cost(&self, row: i32, col: i32) -> Option<u8> {
        if row < 0 || col < 0 {
            return None;
        }
        let value = *self.grid.get(row as usize)?.get(col as usize)?;
        (value > 0).then_some(value)
    }
}

impl Graph for MazeGraph {
    type Node = Cell;

    fn outgoing_edges(&self, cell: &Cell) -> Vec<Edge<Cell>> {
        let mut edges = Vec::with_capacity(8);
        for (dr, dc, label) in DIRECTIONS {
            let (row, col) = (cell.row + dr, cell.col + dc);
            if let Some(cost) = self.cost(row, col) {
                edges.push(Edge::labeled(label, cost as f64, Cell::new(row, col)));
            }
        }
        edges
    }
}

/// Walks `path` from `start`, asserting that every edge is one of the
/// outgoing edges of the node it leaves from and that the walk ends on a
/// target node.
pub(crate) fn assert_valid_path<G: Graph>(
    graph: &G,
    start: &G::Node,
    path: &[Edge<G::Node>],
    target: impl Fn(&G::Node) -> bool,
) {
    let mut current = start.clone();
    for edge in path {
        assert!(
            graph.outgoing_edges(&current).contains(edge),
            "edge {edge:?} does not leave {current:?}"
        );
        current = edge.destination.clone();
    }
    assert!(target(&current), "path ends at {current:?}, not a target");
}
