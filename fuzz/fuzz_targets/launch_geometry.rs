//! Fuzz target: launch geometry normalization.
//!
//! Accepted geometry keeps the caller's arity and component values; everything else is a
//! `LaunchConfig` error.

#![no_main]

use accel_jit::{JitError, LaunchGeometry};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    grid: Vec<i64>,
    block: Vec<i64>,
}

fn in_range(values: &[i64], max_arity: usize) -> bool {
    (1..=max_arity).contains(&values.len()) && values.iter().all(|&v| u32::try_from(v).is_ok())
}

fuzz_target!(|input: Input| {
    let valid = in_range(&input.grid, 2) && in_range(&input.block, 3);
    match LaunchGeometry::normalize(input.grid.clone(), input.block.clone()) {
        Ok(geometry) => {
            assert!(valid);
            let grid: Vec<i64> = geometry.grid().as_slice().iter().map(|&c| i64::from(c)).collect();
            let block: Vec<i64> = geometry.block().as_slice().iter().map(|&c| i64::from(c)).collect();
            assert_eq!(grid, input.grid);
            assert_eq!(block, input.block);
        }
        Err(err) => {
            assert!(!valid);
            assert!(matches!(err, JitError::LaunchConfig(_)));
        }
    }
});
