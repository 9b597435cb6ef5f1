//! The cart as the server sees it: a batch of lines submitted at checkout.
//!
//! Browsers keep the working cart locally; it only reaches the API when the
//! customer places the whole thing as orders.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: i64,
    pub name: String,
    pub price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

impl CartLine {
    /// Quantity with the lower bound applied. A line that made it to checkout
    /// is never for less than one unit.
    pub fn effective_quantity(&self) -> i64 {
        self.quantity.max(1)
    }

    pub fn line_total(&self) -> f64 {
        self.price * self.effective_quantity() as f64
    }
}

pub fn cart_total(lines: &[CartLine]) -> f64 {
    lines.iter().map(CartLine::line_total).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: f64, quantity: i64) -> CartLine {
        CartLine {
            product_id: 1,
            name: "Rose Glow Serum".into(),
            price,
            quantity,
        }
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line(3200.0, 2).line_total(), 6400.0);
    }

    #[test]
    fn test_quantity_clamped_to_one() {
        assert_eq!(line(3200.0, 0).effective_quantity(), 1);
        assert_eq!(line(3200.0, -5).effective_quantity(), 1);
        assert_eq!(line(3200.0, 0).line_total(), 3200.0);
    }

    #[test]
    fn test_cart_total_sums_lines() {
        let lines = vec![line(3200.0, 2), line(1500.0, 1)];
        assert_eq!(cart_total(&lines), 7900.0);
        assert_eq!(cart_total(&[]), 0.0);
    }

    #[test]
    fn test_quantity_defaults_to_one_when_absent() {
        let parsed: CartLine =
            serde_json::from_str(r#"{"productId": 3, "name": "Lip Tint", "price": 950.0}"#)
                .unwrap();
        assert_eq!(parsed.quantity, 1);
    }
}
