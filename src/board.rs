use crate::{BoardConfig, GameError, Position};
use itertools::iproduct;
use log::{debug, trace};
use ndarray::Array2;
use rand::Rng;
use std::collections::{HashSet, VecDeque};

/// What a cell holds. Fixed once mines are placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellContent {
    Mine,
    Empty(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Hidden,
    Revealed,
    Flagged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub content: CellContent,
    pub visibility: Visibility,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            content: CellContent::Empty(0),
            visibility: Visibility::Hidden,
        }
    }
}

impl Cell {
    pub fn is_mine(&self) -> bool {
        self.content == CellContent::Mine
    }

    pub fn is_hidden(&self) -> bool {
        self.visibility == Visibility::Hidden
    }

    pub fn is_revealed(&self) -> bool {
        self.visibility == Visibility::Revealed
    }

    pub fn is_flagged(&self) -> bool {
        self.visibility == Visibility::Flagged
    }
}

/// A cell uncovered by a single reveal, in the order it was uncovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealedCell {
    pub position: Position,
    pub content: CellContent,
}

#[derive(Debug, Clone)]
pub struct Board {
    cells: Array2<Cell>,
    mines_count: u32,
    mines_placed: bool,
    revealed_count: usize,
}

impl Board {
    pub fn new(config: BoardConfig) -> Result<Self, GameError> {
        config.validate()?;

        Ok(Board {
            cells: Array2::from_elem(
                (config.rows as usize, config.cols as usize),
                Cell::default(),
            ),
            mines_count: config.mine_count,
            mines_placed: false,
            revealed_count: 0,
        })
    }

    /// Places mines uniformly at random on every cell except `exclude`, then
    /// fills in adjacency counts. Does nothing once mines are placed.
    pub(crate) fn place_mines<R: Rng + ?Sized>(&mut self, rng: &mut R, exclude: Position) {
        if self.mines_placed {
            return;
        }
        let (rows, cols) = self.cells.dim();
        let mut mines_placed = 0;

        // Terminates because validation leaves at least `mines_count` candidates.
        while mines_placed < self.mines_count {
            let pos = Position::new(
                rng.gen_range(0..rows) as i32,
                rng.gen_range(0..cols) as i32,
            );
            if pos == exclude {
                continue;
            }

            let cell = &mut self.cells[(pos.row as usize, pos.col as usize)];
            if !cell.is_mine() {
                cell.content = CellContent::Mine;
                mines_placed += 1;
            }
        }

        debug!(
            "Placed {} mines on {}x{} board, first reveal at {:?}",
            self.mines_count, rows, cols, exclude
        );
        self.mines_placed = true;
        self.compute_adjacency();
    }

    /// Places mines exactly at the given positions. Does nothing once mines
    /// are placed.
    pub(crate) fn place_mines_at(&mut self, mines: &[Position]) -> Result<(), GameError> {
        if self.mines_placed {
            return Ok(());
        }
        self.validate_layout(mines)?;
        for &pos in mines {
            self.cell_mut(pos)?.content = CellContent::Mine;
        }
        self.mines_placed = true;
        self.compute_adjacency();
        Ok(())
    }

    pub fn mines_placed(&self) -> bool {
        self.mines_placed
    }

    pub fn validate_layout(&self, mines: &[Position]) -> Result<(), GameError> {
        if mines.len() != self.mines_count as usize {
            return Err(GameError::InvalidLayout(format!(
                "expected {} mines, got {}",
                self.mines_count,
                mines.len()
            )));
        }

        let mut seen = HashSet::new();
        for &pos in mines {
            if !self.is_within_bounds(pos) {
                return Err(GameError::InvalidLayout(format!(
                    "mine at {pos:?} is out of bounds"
                )));
            }
            if !seen.insert(pos) {
                return Err(GameError::InvalidLayout(format!(
                    "mine at {pos:?} is listed twice"
                )));
            }
        }
        Ok(())
    }

    fn compute_adjacency(&mut self) {
        let (rows, cols) = self.cells.dim();
        for (row, col) in iproduct!(0..rows, 0..cols) {
            if self.cells[(row, col)].is_mine() {
                continue;
            }
            let count = self.count_adjacent_mines(Position::new(row as i32, col as i32));
            self.cells[(row, col)].content = CellContent::Empty(count);
        }
    }

    /// Reveals `start` and, when it borders no mines, the whole connected
    /// zero region together with its numbered border.
    ///
    /// Flagged and already revealed cells are left untouched. `start` must
    /// not be a mine.
    pub fn flood_reveal(&mut self, start: Position) -> Vec<RevealedCell> {
        let mut revealed = Vec::new();
        let mut visited = HashSet::from([start]);
        let mut to_visit = VecDeque::from([start]);

        while let Some(pos) = to_visit.pop_front() {
            let Some(index) = self.index(pos) else {
                continue;
            };

            let cell = &mut self.cells[index];
            if !cell.is_hidden() || cell.is_mine() {
                continue;
            }
            cell.visibility = Visibility::Revealed;
            let content = cell.content;
            self.revealed_count += 1;
            revealed.push(RevealedCell {
                position: pos,
                content,
            });

            if content == CellContent::Empty(0) {
                for neighbor in pos.neighbors() {
                    if self.is_within_bounds(neighbor) && visited.insert(neighbor) {
                        to_visit.push_back(neighbor);
                    }
                }
            }
        }

        trace!("Reveal at {:?} uncovered {} cells", start, revealed.len());
        revealed
    }

    /// Uncovers a mine. Ends any hope of a win for this board.
    pub fn reveal_mine(&mut self, pos: Position) -> Result<(), GameError> {
        let cell = self.cell_mut(pos)?;
        if cell.is_hidden() {
            cell.visibility = Visibility::Revealed;
            self.revealed_count += 1;
        }
        Ok(())
    }

    pub fn is_within_bounds(&self, pos: Position) -> bool {
        self.index(pos).is_some()
    }

    fn index(&self, pos: Position) -> Option<(usize, usize)> {
        let (rows, cols) = self.cells.dim();
        let row = usize::try_from(pos.row).ok()?;
        let col = usize::try_from(pos.col).ok()?;
        (row < rows && col < cols).then_some((row, col))
    }

    pub fn get_cell(&self, pos: Position) -> Result<&Cell, GameError> {
        self.index(pos)
            .map(|index| &self.cells[index])
            .ok_or(GameError::OutOfBounds(pos))
    }

    pub(crate) fn cell_mut(&mut self, pos: Position) -> Result<&mut Cell, GameError> {
        let index = self.index(pos).ok_or(GameError::OutOfBounds(pos))?;
        Ok(&mut self.cells[index])
    }

    pub fn neighbors(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        pos.neighbors().filter(move |p| self.is_within_bounds(*p))
    }

    pub fn count_adjacent_mines(&self, pos: Position) -> u8 {
        self.neighbors(pos)
            .filter(|p| matches!(self.get_cell(*p), Ok(cell) if cell.is_mine()))
            .count() as u8
    }

    /// Every mine position in row-major order.
    pub fn mine_positions(&self) -> Vec<Position> {
        self.iter_cells()
            .filter(|(_, cell)| cell.is_mine())
            .map(|(pos, _)| pos)
            .collect()
    }

    /// All cells with their positions in row-major order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (Position, &Cell)> + '_ {
        self.cells
            .indexed_iter()
            .map(|((row, col), cell)| (Position::new(row as i32, col as i32), cell))
    }

    /// Number of revealed cells, mines included.
    pub fn revealed_count(&self) -> usize {
        self.revealed_count
    }

    pub fn all_safe_cells_revealed(&self) -> bool {
        self.revealed_count + self.mines_count as usize == self.cells.len()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        let (rows, cols) = self.cells.dim();
        (rows as u32, cols as u32)
    }

    pub fn mines_count(&self) -> u32 {
        self.mines_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn board_with_mines(rows: u32, cols: u32, mines: &[(i32, i32)]) -> Board {
        let mut board = Board::new(BoardConfig::new(rows, cols, mines.len() as u32)).unwrap();
        let mines: Vec<Position> = mines.iter().copied().map(Position::from).collect();
        board.place_mines_at(&mines).unwrap();
        board
    }

    #[test]
    fn test_new_board_is_empty_and_hidden() {
        let board = Board::new(BoardConfig::new(4, 5, 3)).unwrap();
        assert_eq!(board.dimensions(), (4, 5));
        assert_eq!(board.iter_cells().count(), 20);
        assert!(board
            .iter_cells()
            .all(|(_, cell)| *cell == Cell::default()));
        assert!(board.mine_positions().is_empty());
    }

    #[test]
    fn test_new_board_rejects_too_many_mines() {
        assert!(matches!(
            Board::new(BoardConfig::new(3, 3, 9)),
            Err(GameError::TooManyMines { .. })
        ));
    }

    #[test]
    fn test_place_mines_respects_count_and_exclusion() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut board = Board::new(BoardConfig::new(3, 3, 8)).unwrap();
            let exclude = Position::new((seed % 3) as i32, ((seed / 3) % 3) as i32);
            board.place_mines(&mut rng, exclude);

            let mines = board.mine_positions();
            assert_eq!(mines.len(), 8);
            assert!(!mines.contains(&exclude));
            assert_eq!(
                board.get_cell(exclude).unwrap().content,
                CellContent::Empty(board.neighbors(exclude).count() as u8)
            );
        }
    }

    #[test]
    fn test_mines_are_placed_once() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut board = Board::new(BoardConfig::new(8, 8, 10)).unwrap();
        assert!(!board.mines_placed());

        board.place_mines(&mut rng, Position::new(0, 0));
        let first = board.mine_positions();
        assert!(board.mines_placed());

        board.place_mines(&mut rng, Position::new(7, 7));
        let bottom_rows: Vec<_> = (0..10).map(|i| Position::new(6 + i / 8, i % 8)).collect();
        board.place_mines_at(&bottom_rows).unwrap();
        assert_eq!(board.mine_positions(), first);
        assert_eq!(board.mine_positions().len(), 10);
    }

    #[test]
    fn test_adjacency_counts() {
        let board = board_with_mines(3, 3, &[(0, 0), (2, 2)]);
        let content = |r, c| board.get_cell(Position::new(r, c)).unwrap().content;

        assert_eq!(content(0, 0), CellContent::Mine);
        assert_eq!(content(0, 1), CellContent::Empty(1));
        assert_eq!(content(1, 1), CellContent::Empty(2));
        assert_eq!(content(2, 0), CellContent::Empty(0));
        assert_eq!(content(0, 2), CellContent::Empty(0));
        assert_eq!(content(2, 2), CellContent::Mine);
    }

    #[test]
    fn test_layout_validation() {
        let board = Board::new(BoardConfig::new(2, 2, 1)).unwrap();
        assert!(board.validate_layout(&[Position::new(1, 1)]).is_ok());
        assert!(board.validate_layout(&[]).is_err());
        assert!(board.validate_layout(&[Position::new(2, 0)]).is_err());

        let board = Board::new(BoardConfig::new(2, 2, 2)).unwrap();
        assert!(board
            .validate_layout(&[Position::new(0, 0), Position::new(0, 0)])
            .is_err());
    }

    #[test]
    fn test_flood_reveal_stops_at_numbers() {
        // Mines down the right column of a 3x4 board.
        let mut board = board_with_mines(3, 4, &[(0, 3), (1, 3), (2, 3)]);
        let revealed = board.flood_reveal(Position::new(1, 0));

        assert_eq!(revealed.len(), 9);
        assert_eq!(revealed[0].position, Position::new(1, 0));
        assert!(revealed.iter().all(|cell| cell.position.col < 3));
        assert_eq!(board.revealed_count(), 9);
        assert!(board.all_safe_cells_revealed());
    }

    #[test]
    fn test_flood_reveal_skips_flags() {
        let mut board = Board::new(BoardConfig::new(3, 3, 0)).unwrap();
        board.place_mines_at(&[]).unwrap();
        board.cell_mut(Position::new(1, 1)).unwrap().visibility = Visibility::Flagged;

        let revealed = board.flood_reveal(Position::new(0, 0));

        assert_eq!(revealed.len(), 8);
        assert!(board.get_cell(Position::new(1, 1)).unwrap().is_flagged());
        assert!(!board.all_safe_cells_revealed());
    }

    #[test]
    fn test_out_of_bounds() {
        let board = Board::new(BoardConfig::new(2, 2, 0)).unwrap();
        let pos = Position::new(-1, 0);
        assert_eq!(board.get_cell(pos), Err(GameError::OutOfBounds(pos)));
        assert!(!board.is_within_bounds(Position::new(0, 2)));
        assert_eq!(board.neighbors(Position::new(0, 0)).count(), 3);
    }
}
