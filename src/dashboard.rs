//! Admin dashboard aggregation.
//!
//! Works over the fetched order list plus table counts. Revenue only counts
//! completed orders; channel and status buckets are fixed so the charts always
//! render every series, even at zero.

use chrono::{Days, NaiveDate};

use crate::models::{
    DailyRevenue, DashboardStats, NamedCount, Order, OrderChannel, OrderStatus,
};

/// Number of calendar days covered by the daily revenue series.
const REVENUE_DAYS: u64 = 7;

pub fn compute_stats(
    orders: &[Order],
    total_products: i64,
    total_reviews: i64,
    today: NaiveDate,
) -> DashboardStats {
    let total_revenue = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Completed)
        .map(|o| o.total_price)
        .sum();

    let orders_by_channel = OrderChannel::ALL
        .iter()
        .map(|channel| NamedCount {
            name: channel.display_name().to_string(),
            value: orders.iter().filter(|o| o.channel == *channel).count() as i64,
        })
        .collect();

    let orders_by_status = OrderStatus::ALL
        .iter()
        .map(|status| NamedCount {
            name: status.display_name().to_string(),
            value: orders.iter().filter(|o| o.status == *status).count() as i64,
        })
        .collect();

    let daily_revenue = (0..REVENUE_DAYS)
        .rev()
        .map(|days_back| {
            let date = today - Days::new(days_back);
            let key = date.format("%Y-%m-%d").to_string();
            let revenue = orders
                .iter()
                .filter(|o| o.status == OrderStatus::Completed && o.order_date.starts_with(&key))
                .map(|o| o.total_price)
                .sum();
            DailyRevenue {
                date: date.format("%b %-d").to_string(),
                revenue,
            }
        })
        .collect();

    DashboardStats {
        total_orders: orders.len() as i64,
        total_revenue,
        total_products,
        total_reviews,
        orders_by_channel,
        orders_by_status,
        daily_revenue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(channel: OrderChannel, status: OrderStatus, total: f64, date: &str) -> Order {
        Order {
            id: 0,
            product_id: 1,
            user_id: None,
            customer_name: "Amna".into(),
            customer_phone: "0771234567".into(),
            customer_email: None,
            quantity: 1,
            total_price: total,
            channel,
            status,
            order_date: format!("{} 12:30:00", date),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 31).unwrap()
    }

    #[test]
    fn test_empty_orders_still_produce_full_series() {
        let stats = compute_stats(&[], 0, 0, today());
        assert_eq!(stats.total_orders, 0);
        assert_eq!(stats.total_revenue, 0.0);
        assert_eq!(stats.orders_by_channel.len(), 3);
        assert_eq!(stats.orders_by_status.len(), 4);
        assert_eq!(stats.daily_revenue.len(), 7);
        assert!(stats.daily_revenue.iter().all(|d| d.revenue == 0.0));
    }

    #[test]
    fn test_revenue_counts_only_completed_orders() {
        let orders = vec![
            order(OrderChannel::Whatsapp, OrderStatus::Completed, 1000.0, "2026-08-31"),
            order(OrderChannel::Whatsapp, OrderStatus::Pending, 500.0, "2026-08-31"),
            order(OrderChannel::Instagram, OrderStatus::Cancelled, 700.0, "2026-08-31"),
        ];
        let stats = compute_stats(&orders, 5, 2, today());
        assert_eq!(stats.total_orders, 3);
        assert_eq!(stats.total_revenue, 1000.0);
        assert_eq!(stats.total_products, 5);
        assert_eq!(stats.total_reviews, 2);
    }

    #[test]
    fn test_channel_and_status_buckets() {
        let orders = vec![
            order(OrderChannel::Whatsapp, OrderStatus::Pending, 100.0, "2026-08-31"),
            order(OrderChannel::Whatsapp, OrderStatus::Completed, 100.0, "2026-08-31"),
            order(OrderChannel::Facebook, OrderStatus::Processing, 100.0, "2026-08-31"),
        ];
        let stats = compute_stats(&orders, 0, 0, today());

        let channel = |name: &str| {
            stats
                .orders_by_channel
                .iter()
                .find(|c| c.name == name)
                .unwrap()
                .value
        };
        assert_eq!(channel("WhatsApp"), 2);
        assert_eq!(channel("Instagram"), 0);
        assert_eq!(channel("Facebook"), 1);

        let status = |name: &str| {
            stats
                .orders_by_status
                .iter()
                .find(|s| s.name == name)
                .unwrap()
                .value
        };
        assert_eq!(status("Pending"), 1);
        assert_eq!(status("Processing"), 1);
        assert_eq!(status("Completed"), 1);
        assert_eq!(status("Cancelled"), 0);
    }

    #[test]
    fn test_daily_revenue_buckets_by_day_oldest_first() {
        let orders = vec![
            order(OrderChannel::Whatsapp, OrderStatus::Completed, 1000.0, "2026-08-31"),
            order(OrderChannel::Whatsapp, OrderStatus::Completed, 500.0, "2026-08-29"),
            // Outside the 7-day window.
            order(OrderChannel::Whatsapp, OrderStatus::Completed, 9999.0, "2026-08-20"),
            // Inside the window but not completed.
            order(OrderChannel::Whatsapp, OrderStatus::Pending, 400.0, "2026-08-31"),
        ];
        let stats = compute_stats(&orders, 0, 0, today());
        let daily = &stats.daily_revenue;
        assert_eq!(daily.len(), 7);
        assert_eq!(daily[0].date, "Aug 25");
        assert_eq!(daily[6].date, "Aug 31");
        assert_eq!(daily[6].revenue, 1000.0);
        assert_eq!(daily[4].revenue, 500.0);
        let window_total: f64 = daily.iter().map(|d| d.revenue).sum();
        assert_eq!(window_total, 1500.0);
    }
}
