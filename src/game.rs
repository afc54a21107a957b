use crate::board::{CellContent, RevealedCell, Visibility};
use crate::{Board, BoardConfig, GameError, Position, Preset};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    /// No reveal yet, mines not placed.
    NotStarted,
    Playing,
    Won,
    Lost,
}

impl GameState {
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealResult {
    NoOp,
    Revealed(Vec<RevealedCell>),
    Exploded {
        at: Position,
        mines: Vec<Position>,
    },
    Won(Vec<RevealedCell>),
}

impl RevealResult {
    /// Cells uncovered by this reveal. Empty for `NoOp` and `Exploded`.
    pub fn cells(&self) -> &[RevealedCell] {
        match self {
            Self::Revealed(cells) | Self::Won(cells) => cells,
            Self::NoOp | Self::Exploded { .. } => &[],
        }
    }

    pub fn has_update(&self) -> bool {
        !matches!(self, Self::NoOp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagResult {
    Flagged,
    Unflagged,
    NoOp,
}

/// What a renderer may know about one cell.
///
/// `content` is only filled in for revealed cells, or for every cell once the
/// game is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellView {
    pub position: Position,
    pub visibility: Visibility,
    pub content: Option<CellContent>,
}

#[derive(Debug, Clone)]
enum MineSource {
    Random(StdRng),
    Fixed(Vec<Position>),
}

/// One game, from the first reveal to a win or a loss.
#[derive(Debug, Clone)]
pub struct GameSession {
    config: BoardConfig,
    board: Board,
    mines: MineSource,
    flags_placed: u32,
    elapsed_seconds: u32,
    started: bool,
    over: bool,
    won: bool,
}

impl GameSession {
    pub fn new(config: BoardConfig) -> Result<Self, GameError> {
        Self::with_source(config, MineSource::Random(StdRng::from_entropy()))
    }

    pub fn from_preset(preset: Preset) -> Result<Self, GameError> {
        Self::new(preset.config())
    }

    /// Same seed and same first reveal give the same board.
    pub fn with_seed(config: BoardConfig, seed: u64) -> Result<Self, GameError> {
        Self::with_source(config, MineSource::Random(StdRng::seed_from_u64(seed)))
    }

    /// Uses `mines` as the layout instead of sampling one on the first reveal.
    ///
    /// The first reveal is not guaranteed safe with a caller-chosen layout.
    pub fn with_mine_layout(config: BoardConfig, mines: &[Position]) -> Result<Self, GameError> {
        let session = Self::with_source(config, MineSource::Fixed(mines.to_vec()))?;
        session.board.validate_layout(mines)?;
        Ok(session)
    }

    fn with_source(config: BoardConfig, mines: MineSource) -> Result<Self, GameError> {
        Ok(Self {
            config,
            board: Board::new(config)?,
            mines,
            flags_placed: 0,
            elapsed_seconds: 0,
            started: false,
            over: false,
            won: false,
        })
    }

    pub fn reveal(&mut self, pos: Position) -> Result<RevealResult, GameError> {
        let cell = self.board.get_cell(pos)?;
        if self.over || !cell.is_hidden() {
            return Ok(RevealResult::NoOp);
        }

        if !self.started {
            self.start(pos)?;
        }

        if self.board.get_cell(pos)?.is_mine() {
            self.board.reveal_mine(pos)?;
            self.end_game(false);
            return Ok(RevealResult::Exploded {
                at: pos,
                mines: self.board.mine_positions(),
            });
        }

        let cells = self.board.flood_reveal(pos);
        if self.board.all_safe_cells_revealed() {
            self.end_game(true);
            Ok(RevealResult::Won(cells))
        } else {
            Ok(RevealResult::Revealed(cells))
        }
    }

    pub fn toggle_flag(&mut self, pos: Position) -> Result<FlagResult, GameError> {
        let cell = self.board.cell_mut(pos)?;
        if self.over {
            return Ok(FlagResult::NoOp);
        }

        Ok(match cell.visibility {
            Visibility::Revealed => FlagResult::NoOp,
            Visibility::Flagged => {
                cell.visibility = Visibility::Hidden;
                self.flags_placed -= 1;
                FlagResult::Unflagged
            }
            Visibility::Hidden if self.flags_placed < self.config.mine_count => {
                cell.visibility = Visibility::Flagged;
                self.flags_placed += 1;
                FlagResult::Flagged
            }
            Visibility::Hidden => FlagResult::NoOp,
        })
    }

    /// One timer tick. Ignored before the first reveal and after the game ends.
    pub fn increment_elapsed(&mut self) {
        if self.started && !self.over {
            self.elapsed_seconds = self.elapsed_seconds.saturating_add(1);
        }
    }

    fn start(&mut self, first: Position) -> Result<(), GameError> {
        match &mut self.mines {
            MineSource::Random(rng) => self.board.place_mines(rng, first),
            MineSource::Fixed(mines) => self.board.place_mines_at(mines)?,
        }
        self.started = true;
        debug!("Game started at {:?}", first);
        Ok(())
    }

    fn end_game(&mut self, won: bool) {
        self.over = true;
        self.won = won;
        info!(
            "Game {} after {}s on {}x{} board",
            if won { "won" } else { "lost" },
            self.elapsed_seconds,
            self.config.rows,
            self.config.cols
        );
    }

    pub fn state(&self) -> GameState {
        match (self.started, self.over, self.won) {
            (_, true, true) => GameState::Won,
            (_, true, false) => GameState::Lost,
            (false, false, _) => GameState::NotStarted,
            (true, false, _) => GameState::Playing,
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    pub fn flags_placed(&self) -> u32 {
        self.flags_placed
    }

    pub fn flags_remaining(&self) -> u32 {
        self.config.mine_count - self.flags_placed
    }

    pub fn config(&self) -> BoardConfig {
        self.config
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.board.dimensions()
    }

    pub fn mine_count(&self) -> u32 {
        self.config.mine_count
    }

    /// The full board, hidden content included.
    ///
    /// A debugging accessor for tests, benchmarks and replays. Renderers
    /// should go through [`GameSession::cell`] and [`GameSession::cells`],
    /// which never show unrevealed content while the game is running.
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn is_within_bounds(&self, pos: Position) -> bool {
        self.board.is_within_bounds(pos)
    }

    pub fn cell(&self, pos: Position) -> Result<CellView, GameError> {
        let cell = self.board.get_cell(pos)?;
        Ok(self.view(pos, cell.visibility, cell.content))
    }

    /// Every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellView> + '_ {
        self.board
            .iter_cells()
            .map(move |(pos, cell)| self.view(pos, cell.visibility, cell.content))
    }

    /// Mine positions, once the game is over.
    pub fn mine_positions(&self) -> Vec<Position> {
        if self.over {
            self.board.mine_positions()
        } else {
            Vec::new()
        }
    }

    fn view(&self, position: Position, visibility: Visibility, content: CellContent) -> CellView {
        let visible = self.over || visibility == Visibility::Revealed;
        CellView {
            position,
            visibility,
            content: visible.then_some(content),
        }
    }
}
