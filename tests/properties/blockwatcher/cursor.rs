use crate::properties::strategies::polled_heights_strategy;

use address_watcher::services::blockwatcher::{BlockCursor, ScanPlan};
use proptest::{prelude::*, test_runner::Config};

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	// Scanned and skipped blocks together cover every height past the start
	// exactly once, and no tick scans more than the backfill depth
	#[test]
	fn test_plans_cover_chain_without_overlap(
		heights in polled_heights_strategy(),
		depth in 1u64..20,
	) {
		let mut cursor = BlockCursor::new(depth);
		let start = heights[0];
		let mut next_expected = start + 1;
		let mut scanned = 0u64;
		let mut skipped_total = 0u64;

		prop_assert_eq!(cursor.plan(start), ScanPlan::Start);
		cursor.advance(start);

		for &height in &heights[1..] {
			let last = cursor.last_seen().unwrap();

			match cursor.plan(height) {
				ScanPlan::Start => prop_assert!(false, "cursor restarted"),
				ScanPlan::Idle => prop_assert!(height <= last),
				ScanPlan::Scan { blocks, skipped } => {
					prop_assert!(height > last);
					prop_assert_eq!(*blocks.start(), next_expected + skipped);
					prop_assert_eq!(*blocks.end(), height);

					let length = blocks.end() - blocks.start() + 1;
					prop_assert!(length <= depth);
					prop_assert_eq!(skipped + length, height - last);

					scanned += length;
					skipped_total += skipped;
					next_expected = height + 1;
				}
			}

			cursor.advance(height);
			prop_assert!(cursor.last_seen().unwrap() >= last);
		}

		let top = cursor.last_seen().unwrap();
		prop_assert_eq!(top, *heights.iter().max().unwrap());
		prop_assert_eq!(scanned + skipped_total, top - start);
	}

	#[test]
	fn test_plan_does_not_move_cursor(
		start in 0u64..1_000_000,
		height in 0u64..2_000_000,
		depth in 0u64..50,
	) {
		let mut cursor = BlockCursor::new(depth);
		cursor.advance(start);

		let first = cursor.plan(height);
		prop_assert_eq!(cursor.plan(height), first);
		prop_assert_eq!(cursor.last_seen(), Some(start));
		prop_assert!(cursor.max_backfill_depth() >= 1);
	}
}
