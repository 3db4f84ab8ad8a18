use address_watcher::services::blockchain::parse_block_number;
use proptest::{prelude::*, test_runner::Config};

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	#[test]
	fn test_hex_heights_parse(height in any::<u64>()) {
		prop_assert_eq!(parse_block_number(&format!("0x{:x}", height)).unwrap(), height);
		prop_assert_eq!(parse_block_number(&format!("0X{:X}", height)).unwrap(), height);
	}

	#[test]
	fn test_decimal_heights_parse(height in any::<u64>()) {
		prop_assert_eq!(parse_block_number(&height.to_string()).unwrap(), height);
		prop_assert_eq!(parse_block_number(&format!("  {}\n", height)).unwrap(), height);
	}

	#[test]
	fn test_garbage_is_rejected(raw in "[g-zG-Z_ -]{1,20}") {
		prop_assert!(parse_block_number(&raw).is_err());
	}

	#[test]
	fn test_out_of_range_is_rejected(digits in "[1-9a-f][0-9a-f]{16,30}") {
		let raw = format!("0x{}", digits);
		prop_assert!(parse_block_number(&raw).is_err());
	}
}
