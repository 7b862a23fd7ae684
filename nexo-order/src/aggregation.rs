//! Pure order arithmetic: pricing requested lines against catalog records and
//! joining persisted lines with display names. No I/O.

use nexo_catalog::{find_record, CatalogRecord};
use nexo_shared::ProductId;
use rust_decimal::Decimal;

use crate::models::{EnrichedOrderItem, NewOrder, OrderItem, OrderLineRequest};

/// Display name used when the catalog no longer knows a product.
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// Price resolution for one requested line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinePrice {
    Resolved(Decimal),
    /// No catalog record for the product. Counts as zero.
    Unresolved,
}

impl LinePrice {
    pub fn amount(&self) -> Decimal {
        match self {
            LinePrice::Resolved(price) => *price,
            LinePrice::Unresolved => Decimal::ZERO,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, LinePrice::Resolved(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: LinePrice,
}

impl PricedLine {
    /// `price × quantity`, or `None` when it does not fit a `Decimal`.
    pub fn subtotal(&self) -> Option<Decimal> {
        self.price.amount().checked_mul(Decimal::from(self.quantity))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregationError {
    #[error("Amount for product {product_id} is out of range")]
    LineOverflow { product_id: ProductId },

    #[error("Order total is out of range")]
    TotalOverflow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderAggregate {
    pub total_amount: Decimal,
    pub total_items: i64,
    pub lines: Vec<PricedLine>,
}

impl OrderAggregate {
    /// Products that had no catalog record, in line order.
    pub fn unresolved(&self) -> Vec<&ProductId> {
        self.lines
            .iter()
            .filter(|line| !line.price.is_resolved())
            .map(|line| &line.product_id)
            .collect()
    }

    /// Persistence input. Unresolved lines are snapshotted at zero.
    pub fn into_new_order(self) -> NewOrder {
        NewOrder {
            total_amount: self.total_amount,
            total_items: self.total_items,
            items: self
                .lines
                .into_iter()
                .map(|line| OrderItem {
                    price: line.price.amount(),
                    product_id: line.product_id,
                    quantity: line.quantity,
                })
                .collect(),
        }
    }
}

/// Price each requested line and compute the order totals.
pub fn aggregate(
    items: &[OrderLineRequest],
    catalog: &[CatalogRecord],
) -> Result<OrderAggregate, AggregationError> {
    let lines: Vec<PricedLine> = items
        .iter()
        .map(|item| PricedLine {
            product_id: item.product_id.clone(),
            quantity: item.quantity,
            price: find_record(catalog, &item.product_id)
                .map(|record| LinePrice::Resolved(record.price))
                .unwrap_or(LinePrice::Unresolved),
        })
        .collect();

    let mut total_amount = Decimal::ZERO;
    for line in &lines {
        let subtotal = line.subtotal().ok_or_else(|| AggregationError::LineOverflow {
            product_id: line.product_id.clone(),
        })?;
        total_amount = total_amount
            .checked_add(subtotal)
            .ok_or(AggregationError::TotalOverflow)?;
    }
    let total_items = lines.iter().map(|line| i64::from(line.quantity)).sum();

    Ok(OrderAggregate {
        total_amount,
        total_items,
        lines,
    })
}

/// Attach catalog names to persisted lines, keeping length and order.
pub fn enrich(items: &[OrderItem], catalog: &[CatalogRecord]) -> Vec<EnrichedOrderItem> {
    items
        .iter()
        .map(|item| EnrichedOrderItem {
            product_id: item.product_id.clone(),
            quantity: item.quantity,
            price: item.price,
            name: find_record(catalog, &item.product_id)
                .map(|record| record.name.clone())
                .unwrap_or_else(|| UNKNOWN_PRODUCT.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<CatalogRecord> {
        vec![
            CatalogRecord::new("a", "Widget", Decimal::from(10)),
            CatalogRecord::new("b", "Gadget", Decimal::new(2550, 2)),
        ]
    }

    #[test]
    fn test_totals_sum_price_times_quantity() {
        let items = vec![
            OrderLineRequest::new("a", 2),
            OrderLineRequest::new("b", 3),
        ];

        let agg = aggregate(&items, &catalog()).unwrap();

        // 2 * 10 + 3 * 25.50
        assert_eq!(agg.total_amount, Decimal::new(9650, 2));
        assert_eq!(agg.total_items, 5);
        assert_eq!(agg.lines.len(), 2);
        assert_eq!(agg.lines[1].price, LinePrice::Resolved(Decimal::new(2550, 2)));
        assert!(agg.unresolved().is_empty());
    }

    #[test]
    fn test_unknown_product_prices_at_zero_without_failing() {
        let items = vec![
            OrderLineRequest::new("a", 1),
            OrderLineRequest::new("ghost", 4),
        ];

        let agg = aggregate(&items, &catalog()).unwrap();

        assert_eq!(agg.total_amount, Decimal::from(10));
        assert_eq!(agg.total_items, 5);
        assert_eq!(agg.lines[1].price, LinePrice::Unresolved);
        assert_eq!(agg.unresolved(), vec![&ProductId::from("ghost")]);

        let new_order = agg.into_new_order();
        assert_eq!(new_order.items[1].price, Decimal::ZERO);
    }

    #[test]
    fn test_empty_order_yields_zero_totals() {
        let agg = aggregate(&[], &catalog()).unwrap();

        assert_eq!(agg.total_amount, Decimal::ZERO);
        assert_eq!(agg.total_items, 0);
        assert!(agg.lines.is_empty());
    }

    #[test]
    fn test_duplicate_catalog_records_first_match_wins() {
        let mut records = catalog();
        records.push(CatalogRecord::new("a", "Widget (stale)", Decimal::from(99)));

        let agg = aggregate(&[OrderLineRequest::new("a", 1)], &records).unwrap();

        assert_eq!(agg.total_amount, Decimal::from(10));
    }

    #[test]
    fn test_repeated_product_lines_are_priced_independently() {
        let items = vec![
            OrderLineRequest::new("a", 1),
            OrderLineRequest::new("a", 2),
        ];

        let new_order = aggregate(&items, &catalog()).unwrap().into_new_order();

        assert_eq!(new_order.total_amount, Decimal::from(30));
        assert_eq!(new_order.items.len(), 2);
        let line_sum: Decimal = new_order
            .items
            .iter()
            .map(|item| item.price * Decimal::from(item.quantity))
            .sum();
        assert_eq!(line_sum, new_order.total_amount);
    }

    #[test]
    fn test_line_amount_out_of_range_is_an_error() {
        let records = vec![CatalogRecord::new("huge", "Huge", Decimal::from_scientific("4e28").unwrap())];

        let err = aggregate(&[OrderLineRequest::new("huge", 2)], &records).unwrap_err();

        assert!(matches!(err, AggregationError::LineOverflow { ref product_id } if product_id.as_str() == "huge"));
        assert_eq!(err.to_string(), "Amount for product huge is out of range");
    }

    #[test]
    fn test_total_out_of_range_is_an_error() {
        let records = vec![CatalogRecord::new("big", "Big", Decimal::from_scientific("6e28").unwrap())];
        let items = vec![
            OrderLineRequest::new("big", 1),
            OrderLineRequest::new("big", 1),
        ];

        let err = aggregate(&items, &records).unwrap_err();

        assert!(matches!(err, AggregationError::TotalOverflow));
    }

    #[test]
    fn test_enrich_keeps_order_and_defaults_name() {
        let items = vec![
            OrderItem { product_id: ProductId::from("b"), quantity: 1, price: Decimal::from(7) },
            OrderItem { product_id: ProductId::from("gone"), quantity: 2, price: Decimal::from(3) },
            OrderItem { product_id: ProductId::from("a"), quantity: 5, price: Decimal::from(8) },
        ];

        let enriched = enrich(&items, &catalog());

        assert_eq!(enriched.len(), 3);
        let names: Vec<&str> = enriched.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, vec!["Gadget", UNKNOWN_PRODUCT, "Widget"]);
        // persisted snapshot wins over the live catalog price
        assert_eq!(enriched[0].price, Decimal::from(7));
        assert_eq!(enriched[2].quantity, 5);
    }
}
