//! WhatsApp handoff messages and `wa.me` deep links.
//!
//! The store owner can configure a message template with `{product}`, `{qty}`,
//! `{total}`, `{name}`, `{phone}` and `{email}` placeholders; without one the
//! built-in English message is used.

use crate::cart::{CartLine, cart_total};

/// Values substituted into a single-product order message.
pub struct MessageContext<'a> {
    pub product: &'a str,
    pub quantity: i64,
    pub total: f64,
    pub name: &'a str,
    pub phone: &'a str,
    pub email: Option<&'a str>,
}

/// Customer details appended to a cart checkout message.
pub struct Customer<'a> {
    pub name: &'a str,
    pub phone: &'a str,
    pub email: Option<&'a str>,
}

/// Substitute every placeholder occurrence in the configured template.
/// A missing email renders as the empty string.
pub fn render_message(template: &str, ctx: &MessageContext<'_>) -> String {
    template
        .replace("{product}", ctx.product)
        .replace("{qty}", &ctx.quantity.to_string())
        .replace("{total}", &format_amount(ctx.total))
        .replace("{name}", ctx.name)
        .replace("{phone}", ctx.phone)
        .replace("{email}", ctx.email.unwrap_or(""))
}

/// Fallback message when no template is configured.
pub fn default_message(ctx: &MessageContext<'_>) -> String {
    format!(
        "Hello! I'm interested in ordering: {} (Qty: {}) - Total: Rs. {}. Customer Name: {}, Phone: {}, Email: {}",
        ctx.product,
        ctx.quantity,
        format_amount(ctx.total),
        ctx.name,
        ctx.phone,
        ctx.email.unwrap_or(""),
    )
}

/// Multi-line message for a whole cart: one line per item, then the total and
/// the customer's details. A missing email renders as `N/A`.
pub fn cart_message(lines: &[CartLine], customer: &Customer<'_>) -> String {
    let details = lines
        .iter()
        .map(|line| {
            format!(
                "{} (Qty: {}) - Rs. {}",
                line.name,
                line.effective_quantity(),
                format_amount(line.line_total())
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Hello! I would like to order:\n\n{}\n\nTotal: Rs. {}\n\nCustomer Details:\nName: {}\nPhone: {}\nEmail: {}",
        details,
        format_amount(cart_total(lines)),
        customer.name,
        customer.phone,
        customer.email.unwrap_or("N/A"),
    )
}

/// `https://wa.me/<number>?text=<message>` with the message percent-encoded.
pub fn deep_link(number: &str, message: &str) -> String {
    format!("https://wa.me/{}?text={}", number, urlencoding::encode(message))
}

/// Whole rupee amounts print without a trailing `.0`.
fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 {
        format!("{}", amount as i64)
    } else {
        format!("{}", amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>() -> MessageContext<'a> {
        MessageContext {
            product: "Rose Glow Serum",
            quantity: 2,
            total: 6400.0,
            name: "Amna",
            phone: "0771234567",
            email: Some("amna@example.com"),
        }
    }

    #[test]
    fn test_render_message_substitutes_all_placeholders() {
        let template = "Order: {product} x{qty} = Rs.{total} from {name} ({phone}, {email})";
        let message = render_message(template, &ctx());
        assert_eq!(
            message,
            "Order: Rose Glow Serum x2 = Rs.6400 from Amna (0771234567, amna@example.com)"
        );
    }

    #[test]
    fn test_render_message_repeated_placeholder() {
        let message = render_message("{name} {name}", &ctx());
        assert_eq!(message, "Amna Amna");
    }

    #[test]
    fn test_render_message_missing_email_is_empty() {
        let mut context = ctx();
        context.email = None;
        assert_eq!(render_message("<{email}>", &context), "<>");
    }

    #[test]
    fn test_default_message() {
        let message = default_message(&ctx());
        assert_eq!(
            message,
            "Hello! I'm interested in ordering: Rose Glow Serum (Qty: 2) - Total: Rs. 6400. Customer Name: Amna, Phone: 0771234567, Email: amna@example.com"
        );
    }

    #[test]
    fn test_cart_message_lists_items_and_total() {
        let lines = vec![
            CartLine {
                product_id: 1,
                name: "Rose Glow Serum".into(),
                price: 3200.0,
                quantity: 2,
            },
            CartLine {
                product_id: 2,
                name: "Lip Tint".into(),
                price: 950.0,
                quantity: 1,
            },
        ];
        let customer = Customer {
            name: "Amna",
            phone: "0771234567",
            email: None,
        };
        let message = cart_message(&lines, &customer);
        assert!(message.contains("Rose Glow Serum (Qty: 2) - Rs. 6400"));
        assert!(message.contains("Lip Tint (Qty: 1) - Rs. 950"));
        assert!(message.contains("Total: Rs. 7350"));
        assert!(message.contains("Email: N/A"));
    }

    #[test]
    fn test_deep_link_encodes_message() {
        let link = deep_link("94767388576", "Hello! Order: 2 x serum");
        assert!(link.starts_with("https://wa.me/94767388576?text="));
        assert!(!link.contains(' '));
        assert!(link.contains("Hello%21"));
    }

    #[test]
    fn test_format_amount_drops_trailing_zero() {
        assert_eq!(format_amount(2500.0), "2500");
        assert_eq!(format_amount(2500.5), "2500.5");
    }
}
