use core_types::Asset;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A per-asset holding with its volume-weighted average cost basis.
///
/// `quantity` is signed: positive is long, negative is short, in
/// base-currency units. `cost_price` is the average entry price in quote
/// currency. `latest_price` is mark-to-market data supplied by the caller
/// each cycle; it never feeds the cost basis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub asset: Asset,
    pub quantity: Decimal,
    pub cost_price: Decimal,
    pub latest_price: Decimal,
    /// Cumulative fees paid across the fills that built this position.
    pub fee: Decimal,
}

impl Position {
    pub fn new(asset: Asset) -> Self {
        Self {
            asset,
            quantity: Decimal::ZERO,
            cost_price: Decimal::ZERO,
            latest_price: Decimal::ZERO,
            fee: Decimal::ZERO,
        }
    }

    pub fn is_long(&self) -> bool {
        self.quantity > Decimal::ZERO
    }

    pub fn is_short(&self) -> bool {
        self.quantity < Decimal::ZERO
    }

    pub fn is_flat(&self) -> bool {
        self.quantity.is_zero()
    }

    /// Applies one transaction to the cost basis.
    ///
    /// Three regimes, branching on where the resulting quantity lands:
    /// - lands exactly on zero: the position closes flat, basis resets to 0;
    /// - the transaction opposes the held direction and overshoots it
    ///   (`|txn_quantity| > |quantity|`): the old position is closed and a
    ///   new one opens in the opposite direction at `txn_price` — no blend;
    /// - otherwise (same direction, or a partial reduction that stays on the
    ///   held side of zero): volume-weighted blend
    ///   `(quantity * cost_price + txn_quantity * txn_price) / total`.
    ///
    /// Fees accumulate on the position and are subtracted in `cost_value`;
    /// they are never folded into `cost_price` itself.
    pub fn update(&mut self, txn_quantity: Decimal, txn_price: Decimal, txn_fee: Decimal) {
        let total_quantity = self.quantity + txn_quantity;

        if total_quantity.is_zero() {
            self.cost_price = Decimal::ZERO;
        } else {
            let opposes = !self.quantity.is_zero()
                && (self.quantity > Decimal::ZERO) != (txn_quantity > Decimal::ZERO);
            if opposes && txn_quantity.abs() > self.quantity.abs() {
                // Direction reversal: basis of the new position is the
                // reversal fill price, not a blend with the closed side.
                self.cost_price = txn_price;
            } else {
                self.cost_price = (self.quantity * self.cost_price
                    + txn_quantity * txn_price)
                    / total_quantity;
            }
        }

        self.quantity = total_quantity;
        self.fee += txn_fee;
    }

    /// Records the latest market price for mark-to-market valuation.
    pub fn mark(&mut self, price: Decimal) {
        self.latest_price = price;
    }

    /// Signed mark-to-market value: `quantity * latest_price`.
    pub fn market_value(&self) -> Decimal {
        self.quantity * self.latest_price
    }

    /// Signed entry value net of fees: `quantity * cost_price - fee`.
    pub fn cost_value(&self) -> Decimal {
        self.quantity * self.cost_price - self.fee
    }

    /// Mark-to-market PnL against the cost basis, ignoring fees.
    pub fn unrealized_pnl(&self) -> Decimal {
        (self.latest_price - self.cost_price) * self.quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn flat() -> Position {
        Position::new(Asset::new("BTC", "USDT"))
    }

    #[test]
    fn first_buy_sets_basis_to_fill_price() {
        let mut pos = flat();
        pos.update(dec!(1.0), dec!(10000), dec!(0));
        assert_eq!(pos.quantity, dec!(1.0));
        assert_eq!(pos.cost_price, dec!(10000));
    }

    #[test]
    fn same_direction_buys_blend_the_basis() {
        let mut pos = flat();
        pos.update(dec!(1.0), dec!(10000), dec!(0));
        pos.update(dec!(1.0), dec!(15000), dec!(0));
        assert_eq!(pos.quantity, dec!(2.0));
        assert_eq!(pos.cost_price, dec!(12500));
        assert_eq!(pos.cost_value(), dec!(25000));
    }

    #[test]
    fn short_then_add_then_cover_to_flat() {
        let mut pos = flat();
        pos.update(dec!(-1.0), dec!(10000), dec!(0));
        assert_eq!(pos.quantity, dec!(-1.0));
        assert_eq!(pos.cost_price, dec!(10000));
        assert_eq!(pos.cost_value(), dec!(-10000));

        pos.update(dec!(-1.0), dec!(11000), dec!(0));
        assert_eq!(pos.quantity, dec!(-2.0));
        assert_eq!(pos.cost_price, dec!(10500));
        assert_eq!(pos.cost_value(), dec!(-21000));

        pos.update(dec!(2.0), dec!(9000), dec!(0));
        assert_eq!(pos.quantity, dec!(0.0));
        assert_eq!(pos.cost_price, dec!(0.0));
        assert_eq!(pos.cost_value(), dec!(0.0));
        assert!(pos.is_flat());
    }

    #[test]
    fn reduction_exactly_to_zero_closes_flat_not_reversed() {
        let mut pos = flat();
        pos.update(dec!(2.0), dec!(10000), dec!(0));
        // |txn| == |held|: the boundary case closes cleanly to flat.
        pos.update(dec!(-2.0), dec!(12000), dec!(0));
        assert!(pos.is_flat());
        assert_eq!(pos.cost_price, dec!(0));
    }

    #[test]
    fn overshoot_reverses_direction_at_the_fill_price() {
        let mut pos = flat();
        pos.update(dec!(1.0), dec!(10000), dec!(0));
        pos.update(dec!(-2.0), dec!(9000), dec!(0));
        assert_eq!(pos.quantity, dec!(-1.0));
        assert_eq!(pos.cost_price, dec!(9000));
    }

    #[test]
    fn partial_reduction_blends_per_the_weighted_formula() {
        let mut pos = flat();
        pos.update(dec!(2.0), dec!(100), dec!(0));
        pos.update(dec!(-1.0), dec!(150), dec!(0));
        assert_eq!(pos.quantity, dec!(1.0));
        // (2*100 + (-1)*150) / 1 = 50: the realized gain folds into the
        // remaining basis.
        assert_eq!(pos.cost_price, dec!(50));
    }

    #[test]
    fn fees_accumulate_and_reduce_cost_value() {
        let mut pos = flat();
        pos.update(dec!(1.0), dec!(10000), dec!(10));
        pos.update(dec!(1.0), dec!(15000), dec!(15));
        assert_eq!(pos.fee, dec!(25));
        assert_eq!(pos.cost_price, dec!(12500));
        assert_eq!(pos.cost_value(), dec!(24975));
    }

    #[test]
    fn mark_to_market_is_independent_of_basis() {
        let mut pos = flat();
        pos.update(dec!(2.0), dec!(10000), dec!(0));
        pos.mark(dec!(11000));
        assert_eq!(pos.market_value(), dec!(22000));
        assert_eq!(pos.unrealized_pnl(), dec!(2000));
        assert_eq!(pos.cost_price, dec!(10000));
    }

    #[test]
    fn short_position_market_value_is_negative() {
        let mut pos = flat();
        pos.update(dec!(-1.0), dec!(10000), dec!(0));
        pos.mark(dec!(9000));
        assert_eq!(pos.market_value(), dec!(-9000));
        assert_eq!(pos.unrealized_pnl(), dec!(1000));
    }
}
