//! Block cursor and scan planning.
//!
//! The cursor remembers the last block height a watcher has fully processed and
//! turns each newly polled height into the range of blocks to scan next.

use std::ops::RangeInclusive;

/// What a watcher has to do with a freshly polled chain height
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanPlan {
	/// First observation: record the height, scan nothing
	Start,
	/// The chain has not advanced past the cursor
	Idle,
	/// Scan `blocks` in ascending order; `skipped` blocks below the range were
	/// dropped by the backfill limit
	Scan {
		blocks: RangeInclusive<u64>,
		skipped: u64,
	},
}

/// Last processed block height of a single watcher
///
/// Owned by exactly one watcher task. The recorded height never decreases.
#[derive(Debug, Clone)]
pub struct BlockCursor {
	last_seen: Option<u64>,
	max_backfill_depth: u64,
}

impl BlockCursor {
	/// Creates a cursor that has not observed any block yet
	///
	/// # Arguments
	/// * `max_backfill_depth` - Maximum number of blocks scanned in one tick (at least 1)
	pub fn new(max_backfill_depth: u64) -> Self {
		Self {
			last_seen: None,
			max_backfill_depth: max_backfill_depth.max(1),
		}
	}

	/// Returns the last processed height, if any
	pub fn last_seen(&self) -> Option<u64> {
		self.last_seen
	}

	/// Returns the maximum number of blocks scanned in one tick
	pub fn max_backfill_depth(&self) -> u64 {
		self.max_backfill_depth
	}

	/// Plans the work for a newly polled `height` without moving the cursor
	pub fn plan(&self, height: u64) -> ScanPlan {
		let Some(last_seen) = self.last_seen else {
			return ScanPlan::Start;
		};

		if height <= last_seen {
			return ScanPlan::Idle;
		}

		let delta = height - last_seen;
		let skipped = delta.saturating_sub(self.max_backfill_depth);

		ScanPlan::Scan {
			blocks: (last_seen + skipped + 1)..=height,
			skipped,
		}
	}

	/// Moves the cursor to `height`; lower heights are ignored
	pub fn advance(&mut self, height: u64) {
		self.last_seen = Some(self.last_seen.map_or(height, |last| last.max(height)));
	}
}
