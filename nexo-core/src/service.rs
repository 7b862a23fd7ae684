use nexo_catalog::CatalogClient;
use nexo_order::{aggregate, enrich, CreateOrder, EnrichedOrder, Order, OrderStatus};
use nexo_shared::ids::distinct;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::pagination::{OrderFilter, Page, PageMeta};
use crate::repository::{OrderRepository, StoreError};
use crate::{CoreResult, OrderError};

/// Policy knobs for order intake
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderRules {
    /// Refuse orders containing products the catalog does not know.
    /// When off, such lines are kept at a price of zero.
    pub reject_unresolved_products: bool,
}

/// Coordinates the catalog, the pricing engine and the order store.
///
/// Holds no per-request state; one instance serves all requests.
pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
    catalog: Arc<dyn CatalogClient>,
    rules: OrderRules,
}

impl OrderService {
    pub fn new(repo: Arc<dyn OrderRepository>, catalog: Arc<dyn CatalogClient>, rules: OrderRules) -> Self {
        Self { repo, catalog, rules }
    }

    /// Price and persist a new order.
    ///
    /// Every failure along the way, the store included, is reported as
    /// `InvalidRequest` carrying the underlying message. The store is only
    /// touched after the catalog answered.
    pub async fn create(&self, request: CreateOrder) -> CoreResult<EnrichedOrder> {
        match self.place(request).await {
            Ok(order) => {
                info!(
                    "Order {} created: {} item(s), total {}",
                    order.order.id, order.order.total_items, order.order.total_amount
                );
                Ok(order)
            }
            Err(err) => {
                warn!("Order rejected: {}", err);
                Err(OrderError::InvalidRequest(err.to_string()))
            }
        }
    }

    async fn place(&self, request: CreateOrder) -> Result<EnrichedOrder, StoreError> {
        request.validate()?;

        let records = self.catalog.resolve(&request.product_ids()).await?;
        let priced = aggregate(&request.items, &records)?;

        if self.rules.reject_unresolved_products {
            let unknown = distinct(priced.unresolved());
            if !unknown.is_empty() {
                let ids: Vec<String> = unknown.iter().map(ToString::to_string).collect();
                return Err(format!("Unknown products: {}", ids.join(", ")).into());
            }
        }

        let stored = self.repo.create_order(&priced.into_new_order()).await?;
        let items = enrich(&stored.items, &records);

        Ok(EnrichedOrder {
            order: stored.order,
            items,
        })
    }

    /// Load one order and re-attach current catalog names to its lines.
    pub async fn find_one(&self, id: Uuid) -> CoreResult<EnrichedOrder> {
        let stored = self
            .repo
            .find_order(id)
            .await
            .map_err(|e| {
                error!("Failed to load order {}: {}", id, e);
                OrderError::Internal(e.to_string())
            })?
            .ok_or(OrderError::NotFound(id))?;

        let records = if stored.items.is_empty() {
            Vec::new()
        } else {
            let ids = distinct(stored.items.iter().map(|item| &item.product_id));
            self.catalog.resolve(&ids).await.map_err(|e| {
                warn!("Catalog lookup for order {} failed: {}", id, e);
                OrderError::CatalogUnavailable(e.to_string())
            })?
        };

        Ok(EnrichedOrder {
            items: enrich(&stored.items, &records),
            order: stored.order,
        })
    }

    /// One page of order headers. Lines and names are not loaded.
    pub async fn find_all(&self, filter: OrderFilter) -> CoreResult<Page<Order>> {
        let page = filter.page;

        let total = self.repo.count_orders(filter.status).await.map_err(internal)?;
        let data = self
            .repo
            .list_orders(filter.status, page.skip(), page.take())
            .await
            .map_err(internal)?;

        debug!(
            "Listed {} of {} order(s), page {} (status {:?})",
            data.len(),
            total,
            page.page(),
            filter.status
        );

        Ok(Page {
            data,
            meta: PageMeta {
                total,
                page: page.page(),
                last_page: page.last_page(total),
            },
        })
    }

    /// Status transitions have no defined rules yet; nothing is read or written.
    pub async fn change_status(&self, id: Uuid, status: OrderStatus) -> CoreResult<Order> {
        debug!("Ignoring status change of order {} to {}", id, status);
        Err(OrderError::Unsupported("Changing order status"))
    }
}

fn internal(err: StoreError) -> OrderError {
    error!("Order store failure: {}", err);
    OrderError::Internal(err.to_string())
}
