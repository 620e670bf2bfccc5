//! Liquidity pre-filter.

use crate::types::Market;

/// Reduce a market window to the subset meeting the liquidity threshold.
///
/// Pure and order-preserving: the output is exactly the input markets
/// with `liquidity ≥ threshold`, in input order.
pub fn filter_by_liquidity(markets: Vec<Market>, threshold: i64) -> Vec<Market> {
    markets
        .into_iter()
        .filter(|m| m.meets_liquidity(threshold))
        .collect()
}
