// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Splitting index ranges into dispatch units.
//!
//! * [`computation_groups`] splits a trajectory's frames into one contiguous
//!   group per part; an analysis driver turns each group into one computation.
//! * [`chunk_ranges`] splits a computation list into fixed-size chunks, the unit
//!   a pool worker pulls at a time.

use std::ops::Range;

/// Split `0..n_frames` into `n_parts` contiguous groups of near-equal size.
///
/// The first `n_frames % n_parts` groups are one frame longer. Empty groups are
/// omitted, so asking for more parts than frames yields one group per frame.
///
/// # Example
/// ```
/// use analysis_backends::partition::computation_groups;
///
/// assert_eq!(computation_groups(10, 3), vec![0..4, 4..7, 7..10]);
/// ```
pub fn computation_groups(n_frames: usize, n_parts: usize) -> Vec<Range<usize>> {
    if n_frames == 0 || n_parts == 0 {
        return Vec::new();
    }

    let base = n_frames / n_parts;
    let extra = n_frames % n_parts;
    let mut groups = Vec::with_capacity(n_parts.min(n_frames));
    let mut start = 0;
    for part in 0..n_parts {
        let len = base + usize::from(part < extra);
        if len == 0 {
            break;
        }
        groups.push(start..start + len);
        start += len;
    }
    groups
}

/// Default chunk size for a pool of `n_workers`: about four chunks per worker.
pub fn default_chunksize(len: usize, n_workers: usize) -> usize {
    let per_round = n_workers.max(1) * 4;
    len.div_ceil(per_round).max(1)
}

/// Split `0..len` into consecutive ranges of at most `chunksize` items.
pub fn chunk_ranges(len: usize, chunksize: usize) -> Vec<Range<usize>> {
    let chunksize = chunksize.max(1);
    (0..len)
        .step_by(chunksize)
        .map(|start| start..(start + chunksize).min(len))
        .collect()
}
