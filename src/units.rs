//! Conversions between duffs (the smallest unit) and whole coins.

/// Duffs per whole coin.
pub const COIN: u64 = 100_000_000;

/// Whole-coin value as a JSON number.
pub fn to_coins(duffs: u64) -> f64 {
    duffs as f64 / COIN as f64
}

/// Whole-coin value with exactly eight decimal places, e.g. `"1.50000000"`.
///
/// Computed on integers so large values never fall back to exponent notation
/// or pick up float rounding in the last digit.
pub fn format_coins(duffs: u64) -> String {
    format!("{}.{:08}", duffs / COIN, duffs % COIN)
}
