//! Depth-bounded minimax with alpha-beta pruning, without recursion.
//!
//! The search runs over an arena of frames, one per ply, allocated once when
//! the [`Searcher`] is built and overwritten on every visit. Frame 0 holds
//! the root position and its candidate moves; frame `d` holds the position
//! after `d` plies together with its own alpha, beta, running best score,
//! move cursor and maximizing flag.
//!
//! Each root move is scored by a depth-first walk driven by a small tagged
//! loop ([`Step`]):
//!
//! - `Enter` generates the moves of a freshly opened frame, or turns it into
//!   a leaf when the depth limit is reached or the side to move must pass.
//! - `Next` pushes the frame's next move as a child, or returns the frame's
//!   best score once its moves are exhausted or it was cut off.
//! - `Return` pops to the parent and folds the value in, re-checking the
//!   cutoff condition.
//!
//! Leaves are always scored from the AI's own perspective; odd plies
//! minimize that score and even plies maximize it.

use crate::board::{Board, Color};
use crate::constants::{INF, MAT_HEIGHT, MAT_WIDTH, MAX_MOVES, MAX_SEARCH_DEPTH};
use crate::eval::evaluate;
use crate::rules::{is_placeable, play};

/// A candidate move. `score` is only meaningful after a search.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Move {
    pub x: usize,
    pub y: usize,
    pub score: i32,
}

const NO_MOVE: Move = Move {
    x: 0,
    y: 0,
    score: -INF,
};

/// Fixed-capacity list of legal moves in row-major order.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; MAX_MOVES],
    len: usize,
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveList {
    pub const fn new() -> Self {
        Self {
            moves: [NO_MOVE; MAX_MOVES],
            len: 0,
        }
    }

    /// Refill with every legal move for `color` on `board`.
    pub fn generate(&mut self, board: &Board, color: Color) {
        self.len = 0;
        for y in 0..MAT_HEIGHT {
            for x in 0..MAT_WIDTH {
                if is_placeable(board, x, y, color) {
                    self.moves[self.len] = Move { x, y, score: -INF };
                    self.len += 1;
                }
            }
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn get(&self, i: usize) -> Move {
        self.as_slice()[i]
    }

    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    fn set_score(&mut self, i: usize, score: i32) {
        self.moves[i].score = score;
    }
}

/// One ply of the explicit search stack.
#[derive(Clone, Default)]
struct Frame {
    alpha: i32,
    beta: i32,
    best: i32,
    move_idx: usize,
    is_max: bool,
    cutoff: bool,
    board: Board,
    moves: MoveList,
}

impl Frame {
    /// Reset for a new node. The board must already be in place.
    fn open(&mut self, alpha: i32, beta: i32, is_max: bool) {
        self.alpha = alpha;
        self.beta = beta;
        self.is_max = is_max;
        self.best = if is_max { -INF } else { INF };
        self.move_idx = 0;
        self.cutoff = false;
    }

    /// Fold a finished child's value into this node and advance to the next
    /// move. Returns true if the node is now cut off.
    fn fold(&mut self, score: i32) -> bool {
        if self.is_max {
            self.best = self.best.max(score);
            if self.best >= self.beta {
                self.cutoff = true;
            } else {
                self.alpha = self.alpha.max(self.best);
            }
        } else {
            self.best = self.best.min(score);
            if self.best <= self.alpha {
                self.cutoff = true;
            } else {
                self.beta = self.beta.min(self.best);
            }
        }
        self.move_idx += 1;
        self.cutoff
    }
}

/// Counters from the last search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes entered below the root
    pub nodes: u64,
    /// Nodes scored by the static evaluator
    pub leaves: u64,
    /// Nodes abandoned by alpha-beta
    pub cutoffs: u64,
}

/// Control state of the traversal loop.
#[derive(Debug, Clone, Copy)]
enum Step {
    /// A frame was just opened at the current depth
    Enter,
    /// Push the current frame's next child, or finish it
    Next,
    /// The frame at the current depth is done with this value
    Return(i32),
}

/// Reusable search engine with a fixed frame arena.
pub struct Searcher {
    frames: [Frame; MAX_SEARCH_DEPTH + 1],
    stats: SearchStats,
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Searcher {
    pub fn new() -> Self {
        Self {
            frames: std::array::from_fn(|_| Frame::default()),
            stats: SearchStats::default(),
        }
    }

    /// Score every legal move of `ai` on `board`, looking `max_depth` plies
    /// ahead (clamped to `1..=MAX_SEARCH_DEPTH`).
    ///
    /// Returns the best root score, or `None` if `ai` has no legal move.
    /// The annotated root moves are available from [`Searcher::root_moves`].
    /// `board` is copied into the arena and never touched.
    pub fn search(&mut self, board: &Board, ai: Color, max_depth: usize) -> Option<i32> {
        let max_depth = max_depth.clamp(1, MAX_SEARCH_DEPTH);
        self.stats = SearchStats::default();

        let root = &mut self.frames[0];
        root.board = *board;
        root.moves.generate(&root.board, ai);
        if root.moves.is_empty() {
            return None;
        }

        let mut best = -INF;
        for i in 0..self.frames[0].moves.len() {
            let mv = self.frames[0].moves.get(i);
            let mut child = self.frames[0].board;
            play(&mut child, mv.x, mv.y, ai);

            // Every root move gets a full window so its score is exact.
            self.frames[1].board = child;
            self.frames[1].open(-INF, INF, false);
            let score = self.walk(ai, max_depth);

            self.frames[0].moves.set_score(i, score);
            best = best.max(score);
        }
        Some(best)
    }

    /// Depth-first traversal below one root move, starting at frame 1.
    fn walk(&mut self, ai: Color, max_depth: usize) -> i32 {
        let mut depth = 1;
        let mut step = Step::Enter;
        loop {
            step = match step {
                Step::Enter => {
                    self.stats.nodes += 1;
                    let frame = &mut self.frames[depth];
                    if depth >= max_depth {
                        self.stats.leaves += 1;
                        Step::Return(evaluate(&frame.board, ai))
                    } else {
                        frame.moves.generate(&frame.board, mover(ai, depth));
                        if frame.moves.is_empty() {
                            // Forced pass: scored in place, not expanded.
                            self.stats.leaves += 1;
                            Step::Return(evaluate(&frame.board, ai))
                        } else {
                            Step::Next
                        }
                    }
                }
                Step::Next => {
                    let frame = &self.frames[depth];
                    if frame.cutoff || frame.move_idx >= frame.moves.len() {
                        Step::Return(frame.best)
                    } else {
                        let mv = frame.moves.get(frame.move_idx);
                        let (alpha, beta, is_max) = (frame.alpha, frame.beta, frame.is_max);
                        let mut child = frame.board;
                        play(&mut child, mv.x, mv.y, mover(ai, depth));

                        depth += 1;
                        let next = &mut self.frames[depth];
                        next.board = child;
                        next.open(alpha, beta, !is_max);
                        Step::Enter
                    }
                }
                Step::Return(score) => {
                    depth -= 1;
                    if depth == 0 {
                        return score;
                    }
                    if self.frames[depth].fold(score) {
                        self.stats.cutoffs += 1;
                    }
                    Step::Next
                }
            };
        }
    }

    /// Root candidates from the last search, each annotated with its score.
    pub fn root_moves(&self) -> &[Move] {
        self.frames[0].moves.as_slice()
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Pick one of the best-scoring root moves of the last search, uniformly
    /// at random when several tie.
    pub fn choose(&self, rng: &mut fastrand::Rng) -> Option<Move> {
        let moves = self.root_moves();
        let best = moves.iter().map(|m| m.score).max()?;

        let mut ties = [0usize; MAX_MOVES];
        let mut n = 0;
        for (i, m) in moves.iter().enumerate() {
            if m.score == best {
                ties[n] = i;
                n += 1;
            }
        }
        let pick = if n > 1 { ties[rng.usize(..n)] } else { ties[0] };
        Some(moves[pick])
    }

    /// Search and pick in one go.
    pub fn best_move(
        &mut self,
        board: &Board,
        ai: Color,
        max_depth: usize,
        rng: &mut fastrand::Rng,
    ) -> Option<Move> {
        self.search(board, ai, max_depth)?;
        self.choose(rng)
    }
}

/// Color to move at `depth`: the opponent on odd plies, the AI on even ones.
#[inline]
fn mover(ai: Color, depth: usize) -> Color {
    if depth % 2 == 1 { ai.opponent() } else { ai }
}

/// Print the root candidates of the last search to stderr.
pub fn dump_root_moves(searcher: &Searcher) {
    for m in searcher.root_moves() {
        eprintln!("move ({},{}) score={}", m.x, m.y, m.score);
    }
    let s = searcher.stats();
    eprintln!(
        "nodes={} leaves={} cutoffs={}",
        s.nodes, s.leaves, s.cutoffs
    );
}
