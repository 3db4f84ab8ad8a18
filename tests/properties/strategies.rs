use address_watcher::{models::Transaction, utils::tests::builders::transaction::TransactionBuilder};
use proptest::prelude::*;

const MAX_HEIGHT_STEP: u64 = 64;
const MAX_POLLS: usize = 30;

pub fn address_strategy() -> impl Strategy<Value = String> {
	"0x[0-9a-f]{40}".prop_map(|s| s.to_string())
}

/// Transfers between addresses of `pool`, identified by their position
pub fn transfers_strategy(
	pool: Vec<String>,
	max_len: usize,
) -> impl Strategy<Value = Vec<Transaction>> {
	prop::collection::vec(
		(
			prop::sample::select(pool.clone()),
			prop::sample::select(pool),
			0u64..1_000,
		),
		0..max_len,
	)
	.prop_map(|entries| {
		entries
			.into_iter()
			.enumerate()
			.map(|(n, (from, to, block))| {
				TransactionBuilder::new()
					.hash_from(n as u64)
					.from(&from)
					.to(&to)
					.block_number(block)
					.build()
			})
			.collect()
	})
}

/// Successive heights reported by a chain: a start height followed by polls that
/// mostly advance and sometimes report a lower height
pub fn polled_heights_strategy() -> impl Strategy<Value = Vec<u64>> {
	(
		0u64..1_000_000,
		prop::collection::vec((0u64..MAX_HEIGHT_STEP, any::<bool>()), 1..MAX_POLLS),
	)
		.prop_map(|(start, steps)| {
			let mut height = start;
			let mut heights = vec![start];
			for (step, backwards) in steps {
				if backwards {
					heights.push(height.saturating_sub(step));
				} else {
					height += step;
					heights.push(height);
				}
			}
			heights
		})
}
