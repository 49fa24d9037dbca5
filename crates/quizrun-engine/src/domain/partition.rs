//! Shuffling and partitioning a pool across competitors.
//!
//! The pool is shuffled once and cut into contiguous ranges of
//! `ceil(len / players)` questions. The last player's range always ends at
//! the end of the shuffled pool, absorbing any remainder. Range bounds are
//! clamped to the pool length, so when there are more players than the
//! ceiling division can serve, trailing players get empty subsets.

use std::ops::Range;

use quizrun_core::error::QuizError;
use quizrun_core::question::Question;
use quizrun_core::rng::DeterministicRng;
use tracing::debug;

use super::pool::QuestionPool;

/// Questions per player before the last player's adjustment.
#[must_use]
pub fn questions_per_player(pool_len: usize, player_count: usize) -> usize {
    if player_count == 0 {
        return 0;
    }
    pool_len.div_ceil(player_count)
}

/// Computes each player's index range into the shuffled pool.
///
/// # Errors
///
/// Returns `QuizError::Validation` if `player_count` is zero.
pub fn partition_ranges(
    pool_len: usize,
    player_count: usize,
) -> Result<Vec<Range<usize>>, QuizError> {
    if player_count == 0 {
        return Err(QuizError::Validation(
            "cannot partition a pool across zero players".to_owned(),
        ));
    }
    let per_player = questions_per_player(pool_len, player_count);
    let ranges = (0..player_count)
        .map(|i| {
            let start = (i * per_player).min(pool_len);
            let end = if i + 1 == player_count {
                pool_len
            } else {
                ((i + 1) * per_player).min(pool_len)
            };
            start..end
        })
        .collect();
    Ok(ranges)
}

/// Shuffles `pool` and splits it into `player_count` disjoint subsets whose
/// concatenation, in player order, is a permutation of the pool.
///
/// # Errors
///
/// Returns `QuizError::Validation` if `player_count` is zero.
pub fn partition(
    pool: &QuestionPool,
    player_count: usize,
    rng: &mut dyn DeterministicRng,
) -> Result<Vec<Vec<Question>>, QuizError> {
    let ranges = partition_ranges(pool.len(), player_count)?;
    let shuffled = pool.shuffled(rng);
    debug!(
        pool_len = pool.len(),
        player_count,
        per_player = questions_per_player(pool.len(), player_count),
        "partitioning question pool"
    );
    Ok(ranges
        .into_iter()
        .map(|range| shuffled[range].to_vec())
        .collect())
}
