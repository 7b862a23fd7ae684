use nexo_shared::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product data as reported by the remote catalog for one request.
///
/// Never persisted. Lives only for the duration of a single aggregation or
/// enrichment pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
}

impl CatalogRecord {
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
        }
    }
}

/// First record whose id matches exactly.
pub fn find_record<'a>(records: &'a [CatalogRecord], id: &ProductId) -> Option<&'a CatalogRecord> {
    records.iter().find(|record| &record.id == id)
}

/// Restrict a reply to the ids that were asked for, one record per id.
///
/// The first record seen for an id wins; records for ids nobody asked for
/// are dropped.
pub fn retain_requested(records: Vec<CatalogRecord>, requested: &[ProductId]) -> Vec<CatalogRecord> {
    let mut seen = std::collections::HashSet::new();
    records
        .into_iter()
        .filter(|record| requested.contains(&record.id) && seen.insert(record.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accepts_numeric_id_and_price() {
        let record: CatalogRecord =
            serde_json::from_str(r#"{"id": 3, "name": "Keyboard", "price": 49.9}"#).unwrap();
        assert_eq!(record.id, ProductId::from("3"));
        assert_eq!(record.price, Decimal::new(499, 1));
    }

    #[test]
    fn test_find_record_first_match_wins() {
        let records = vec![
            CatalogRecord::new("a", "First", Decimal::from(1)),
            CatalogRecord::new("a", "Second", Decimal::from(2)),
        ];
        let found = find_record(&records, &ProductId::from("a")).unwrap();
        assert_eq!(found.name, "First");
        assert!(find_record(&records, &ProductId::from("b")).is_none());
    }

    #[test]
    fn test_retain_requested_dedupes_and_filters() {
        let records = vec![
            CatalogRecord::new("a", "A", Decimal::from(1)),
            CatalogRecord::new("x", "X", Decimal::from(9)),
            CatalogRecord::new("a", "A again", Decimal::from(5)),
        ];
        let kept = retain_requested(records, &[ProductId::from("a"), ProductId::from("b")]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "A");
    }
}
