use serde::Serialize;

use super::error::{EngineError, Result};

pub const GOLD_SHARE_PERCENT: u32 = 10;
pub const DEFAULT_SAFETY_PERCENT: u32 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub stock_percent: u32,
    pub bond_percent: u32,
    pub gold_percent: u32,
    pub stock_amount: f64,
    pub bond_amount: f64,
    pub gold_amount: f64,
}

/// Splits a monthly amount into stocks, bonds and optionally gold.
///
/// `safety_percent` is the bond share of whatever gold leaves over; amounts
/// are rounded to the nearest 10.
pub fn split_portfolio(
    monthly_amount: f64,
    safety_percent: u32,
    include_gold: bool,
) -> Result<Allocation> {
    if !monthly_amount.is_finite() || monthly_amount < 0.0 {
        return Err(EngineError::invalid_input(
            "monthly_amount",
            "must be a finite amount >= 0",
        ));
    }
    if safety_percent > 100 {
        return Err(EngineError::invalid_input(
            "safety_percent",
            "must be between 0 and 100",
        ));
    }

    let gold_percent = if include_gold { GOLD_SHARE_PERCENT } else { 0 };
    let remainder = 100 - gold_percent;
    let bond_percent = (safety_percent as f64 / 100.0 * remainder as f64).round() as u32;
    let stock_percent = remainder - bond_percent;

    let amount_for = |percent: u32| {
        if percent == 0 {
            0.0
        } else {
            (monthly_amount * percent as f64 / 100.0 / 10.0).round() * 10.0
        }
    };

    Ok(Allocation {
        stock_percent,
        bond_percent,
        gold_percent,
        stock_amount: amount_for(stock_percent),
        bond_amount: amount_for(bond_percent),
        gold_amount: amount_for(gold_percent),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    #[test]
    fn classic_sixty_forty_split() {
        let split = split_portfolio(800.0, DEFAULT_SAFETY_PERCENT, false).expect("valid");
        assert_eq!(
            (split.stock_percent, split.bond_percent, split.gold_percent),
            (60, 40, 0)
        );
        assert_eq!(split.stock_amount, 480.0);
        assert_eq!(split.bond_amount, 320.0);
        assert_eq!(split.gold_amount, 0.0);
    }

    #[test]
    fn gold_takes_its_share_before_the_split() {
        let split = split_portfolio(800.0, 40, true).expect("valid");
        assert_eq!(
            (split.stock_percent, split.bond_percent, split.gold_percent),
            (54, 36, 10)
        );
        assert_eq!(split.stock_amount, 430.0);
        assert_eq!(split.bond_amount, 290.0);
        assert_eq!(split.gold_amount, 80.0);
    }

    #[test]
    fn extremes_put_everything_in_one_bucket() {
        let all_bonds = split_portfolio(1_000.0, 100, false).expect("valid");
        assert_eq!((all_bonds.stock_percent, all_bonds.bond_percent), (0, 100));
        assert_eq!(all_bonds.stock_amount, 0.0);

        let all_stocks = split_portfolio(1_000.0, 0, false).expect("valid");
        assert_eq!((all_stocks.stock_percent, all_stocks.bond_percent), (100, 0));
        assert_eq!(all_stocks.bond_amount, 0.0);
    }

    #[test]
    fn rejects_out_of_range_inputs() {
        assert!(split_portfolio(800.0, 101, false).is_err());
        assert!(split_portfolio(-1.0, 40, false).is_err());
        assert!(split_portfolio(f64::NAN, 40, false).is_err());
    }

    proptest! {
        #[test]
        fn prop_percentages_always_sum_to_hundred(
            safety in 0u32..=100,
            include_gold in proptest::bool::ANY,
            amount in 0u32..100_000
        ) {
            let split = split_portfolio(amount as f64, safety, include_gold).expect("valid");
            prop_assert_eq!(split.stock_percent + split.bond_percent + split.gold_percent, 100);
            for value in [split.stock_amount, split.bond_amount, split.gold_amount] {
                prop_assert!(value >= 0.0);
                prop_assert_eq!(value % 10.0, 0.0);
            }
        }
    }
}
