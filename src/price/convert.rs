//! Btcon <-> EUR display helpers. 1 Btcon = 1 sat.

use crate::core::keys::price::BTCON_PER_BTC;

/// EUR value of `btcon` at `btc_eur`, two decimals. Ties round up.
pub fn btcon_to_euro(btcon: f64, btc_eur: f64) -> String {
    let eur = btcon / BTCON_PER_BTC * btc_eur;
    format!("{:.2}", (eur * 100.0).round() / 100.0)
}

/// `"1500 Btcon (≈ 1.50 €)"`. Btcon amount is floored.
pub fn format_btcon_with_euro(btcon: f64, btc_eur: f64) -> String {
    format!("{} Btcon (≈ {} €)", btcon.floor(), btcon_to_euro(btcon, btc_eur))
}
