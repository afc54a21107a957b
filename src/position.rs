use itertools::iproduct;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// The eight surrounding positions, without any bounds filtering.
    pub fn neighbors(self) -> impl Iterator<Item = Position> {
        iproduct!(-1..=1, -1..=1)
            .filter(|&(dr, dc)| (dr, dc) != (0, 0))
            .map(move |(dr, dc)| Position::new(self.row + dr, self.col + dc))
    }
}

impl From<(i32, i32)> for Position {
    fn from((row, col): (i32, i32)) -> Self {
        Self::new(row, col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_creation() {
        let pos = Position::new(5, 10);
        assert_eq!(pos.row, 5);
        assert_eq!(pos.col, 10);
        assert_eq!(Position::from((5, 10)), pos);
    }

    #[test]
    fn test_neighbors() {
        let pos = Position::new(1, 1);
        let neighbors: Vec<Position> = pos.neighbors().collect();

        assert_eq!(neighbors.len(), 8);
        assert!(!neighbors.contains(&pos));
        assert!(neighbors.contains(&Position::new(0, 0))); // Top-left
        assert!(neighbors.contains(&Position::new(0, 1))); // Top
        assert!(neighbors.contains(&Position::new(0, 2))); // Top-right
        assert!(neighbors.contains(&Position::new(1, 0))); // Left
        assert!(neighbors.contains(&Position::new(1, 2))); // Right
        assert!(neighbors.contains(&Position::new(2, 0))); // Bottom-left
        assert!(neighbors.contains(&Position::new(2, 1))); // Bottom
        assert!(neighbors.contains(&Position::new(2, 2))); // Bottom-right
    }

    #[test]
    fn test_corner_neighbors_are_unbounded() {
        let neighbors: Vec<Position> = Position::new(0, 0).neighbors().collect();
        assert!(neighbors.contains(&Position::new(-1, -1)));
    }
}
