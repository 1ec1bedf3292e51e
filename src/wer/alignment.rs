//! # Word Alignment
//!
//! Minimum edit distance between two token sequences, with a backtrace that
//! classifies each step as a match, substitution, deletion or insertion.
//!
//! ## Tie-break:
//! When several predecessors reach the same minimum cost the engine prefers
//! substitution, then deletion, then insertion. The total edit count never
//! depends on this order, but the S/D/I split does, so it is fixed here.

/// One step of the alignment path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EditOp {
    Match,
    Substitution,
    /// Reference token with no hypothesis counterpart.
    Deletion,
    /// Hypothesis token with no reference counterpart.
    Insertion,
}

/// Counts collected along the alignment path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlignmentResult {
    pub hits: usize,
    pub substitutions: usize,
    pub deletions: usize,
    pub insertions: usize,
    pub reference_len: usize,
    pub hypothesis_len: usize,
}

impl AlignmentResult {
    /// Total edit operations, equal to the edit distance.
    pub fn errors(&self) -> usize {
        self.substitutions + self.deletions + self.insertions
    }

    fn record(&mut self, op: EditOp) {
        match op {
            EditOp::Match => self.hits += 1,
            EditOp::Substitution => self.substitutions += 1,
            EditOp::Deletion => self.deletions += 1,
            EditOp::Insertion => self.insertions += 1,
        }
    }
}

/// Align `reference` against `hypothesis` and tally the edit operations.
pub fn align<T: PartialEq>(reference: &[T], hypothesis: &[T]) -> AlignmentResult {
    let ops = edit_path(reference, hypothesis);

    let mut result = AlignmentResult {
        reference_len: reference.len(),
        hypothesis_len: hypothesis.len(),
        ..AlignmentResult::default()
    };
    for op in ops {
        result.record(op);
    }
    result
}

/// Cells in the step table for sequences of `m` and `n` tokens.
pub fn table_cells(m: usize, n: usize) -> usize {
    m.saturating_add(1).saturating_mul(n.saturating_add(1))
}

/// Edit operations turning `reference` into `hypothesis`, in reading order.
///
/// Only the step table is kept whole; costs live in two rows of `n + 1`.
pub fn edit_path<T: PartialEq>(reference: &[T], hypothesis: &[T]) -> Vec<EditOp> {
    let m = reference.len();
    let n = hypothesis.len();
    let width = n + 1;

    // Row-major (m+1) x (n+1): the step that reached each cell.
    let mut step = vec![EditOp::Match; table_cells(m, n)];
    for j in 1..=n {
        step[j] = EditOp::Insertion;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0usize; width];

    for i in 1..=m {
        curr[0] = i;
        step[i * width] = EditOp::Deletion;

        for j in 1..=n {
            let here = i * width + j;
            let diagonal = prev[j - 1];

            if reference[i - 1] == hypothesis[j - 1] {
                curr[j] = diagonal;
                step[here] = EditOp::Match;
                continue;
            }

            let substitution = diagonal + 1;
            let deletion = prev[j] + 1;
            let insertion = curr[j - 1] + 1;

            let (best, op) = if substitution <= deletion && substitution <= insertion {
                (substitution, EditOp::Substitution)
            } else if deletion <= insertion {
                (deletion, EditOp::Deletion)
            } else {
                (insertion, EditOp::Insertion)
            };
            curr[j] = best;
            step[here] = op;
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    let mut path = Vec::with_capacity(m.max(n));
    let (mut i, mut j) = (m, n);
    while i > 0 || j > 0 {
        let op = step[i * width + j];
        path.push(op);
        match op {
            EditOp::Match | EditOp::Substitution => {
                i -= 1;
                j -= 1;
            }
            EditOp::Deletion => i -= 1,
            EditOp::Insertion => j -= 1,
        }
    }
    path.reverse();
    path
}
