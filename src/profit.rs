//! Resale profit arithmetic: commission, shipping and target margin.

use crate::config::Config;
use serde::{Deserialize, Serialize};

/// Margins (TL) evaluated against competitor prices.
pub const MARGIN_OPTIONS: [f64; 5] = [50.0, 75.0, 100.0, 125.0, 150.0];

/// Selling price for one candidate margin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginOption {
    pub margin: f64,
    pub selling_price: f64,
    /// Selling price minus purchase and shipping
    pub net_profit: f64,
}

/// Full cost and pricing breakdown for reselling the best offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitBreakdown {
    pub purchase_price: f64,
    pub shipping_cost: f64,
    pub total_cost: f64,
    pub commission_rate: f64,
    pub commission_amount: f64,
    pub profit_margin: f64,
    pub suggested_price: f64,
    pub net_profit: f64,
    pub profit_percentage: f64,
    pub min_competitor_price: f64,
    pub max_competitor_price: f64,
    pub avg_competitor_price: f64,
    /// True if the suggested price undercuts the most expensive competitor
    pub can_compete: bool,
    /// Margin options that still undercut the most expensive competitor
    pub options: Vec<MarginOption>,
}

/// Computes resale prices from marketplace commission and shipping costs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfitCalculator {
    commission_rate: f64,
    shipping_cost: f64,
    profit_margin: f64,
}

impl ProfitCalculator {
    pub fn new(commission_rate: f64, shipping_cost: f64, profit_margin: f64) -> Self {
        Self { commission_rate, shipping_cost, profit_margin }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.commission_rate, config.shipping_cost, config.profit_margin)
    }

    /// Selling price that covers purchase, shipping and commission and leaves `margin`.
    ///
    /// Commission is charged on purchase price plus margin.
    pub fn selling_price(&self, purchase_price: f64, margin: f64) -> f64 {
        let total_cost = purchase_price + self.shipping_cost;
        let commission = (purchase_price + margin) * self.commission_rate;
        total_cost + commission + margin
    }

    /// Builds the breakdown for `purchase_price` against the observed competitor prices.
    ///
    /// Non-positive competitor prices are ignored.
    pub fn breakdown(&self, purchase_price: f64, competitor_prices: &[f64]) -> ProfitBreakdown {
        let prices: Vec<f64> = competitor_prices.iter().copied().filter(|p| *p > 0.0).collect();

        let min_price = prices.iter().copied().reduce(f64::min).unwrap_or(0.0);
        let max_price = prices.iter().copied().reduce(f64::max).unwrap_or(0.0);
        let avg_price =
            if prices.is_empty() { 0.0 } else { prices.iter().sum::<f64>() / prices.len() as f64 };

        let total_cost = purchase_price + self.shipping_cost;
        let commission_amount = (purchase_price + self.profit_margin) * self.commission_rate;
        let suggested_price = self.selling_price(purchase_price, self.profit_margin);
        let profit_percentage =
            if suggested_price > 0.0 { self.profit_margin / suggested_price * 100.0 } else { 0.0 };

        let options = MARGIN_OPTIONS
            .iter()
            .map(|&margin| {
                let selling_price = self.selling_price(purchase_price, margin);
                MarginOption { margin, selling_price, net_profit: selling_price - total_cost }
            })
            .filter(|option| option.selling_price < max_price)
            .collect();

        ProfitBreakdown {
            purchase_price,
            shipping_cost: self.shipping_cost,
            total_cost,
            commission_rate: self.commission_rate,
            commission_amount,
            profit_margin: self.profit_margin,
            suggested_price,
            net_profit: suggested_price - total_cost,
            profit_percentage,
            min_competitor_price: min_price,
            max_competitor_price: max_price,
            avg_competitor_price: avg_price,
            can_compete: suggested_price < max_price,
            options,
        }
    }
}

impl Default for ProfitCalculator {
    fn default() -> Self {
        Self::new(0.21, 70.0, 100.0)
    }
}
