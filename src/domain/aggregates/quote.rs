//! Quote Aggregate
//!
//! The quote is the storefront's cart: a de-duplicated list of product
//! variants with quantities, persisted after every mutation.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::domain::events::QuoteEvent;
use crate::domain::value_objects::{Money, Quantity};
use crate::storage::Storage;

/// Storage key holding the serialized quote.
pub const QUOTE_STORAGE_KEY: &str = "madeTimberQuote";

/// Point-in-time copy of the product data a quote line was added with.
/// Never refreshed from the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSnapshot {
    /// `<productId>[-<medidaId>][-<acabadoId>]`, the de-duplication key.
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub price_per_unit: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_ai_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_medida_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_acabado_label: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteItem {
    #[serde(flatten)]
    pub snapshot: ItemSnapshot,
    pub quantity: Quantity,
}

impl QuoteItem {
    pub fn id(&self) -> &str { &self.snapshot.id }
    pub fn price_per_unit(&self) -> Money { self.snapshot.price_per_unit }
    pub fn line_total(&self) -> Money { self.snapshot.price_per_unit.multiply(self.quantity) }
}

pub struct QuoteStore<S: Storage> {
    storage: S,
    items: Vec<QuoteItem>,
    events: Vec<QuoteEvent>,
}

impl<S: Storage> QuoteStore<S> {
    /// Rehydrates the quote from `storage`. Unreadable or corrupt data is
    /// dropped and the quote starts empty.
    pub fn load(storage: S) -> Self {
        let items = match storage.get(QUOTE_STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<QuoteItem>>(&raw) {
                Ok(items) => dedupe(items),
                Err(e) => {
                    warn!(error = %e, "discarding corrupt quote data");
                    if let Err(e) = storage.remove(QUOTE_STORAGE_KEY) {
                        warn!(error = %e, "failed to remove corrupt quote data");
                    }
                    vec![]
                }
            },
            Ok(None) => vec![],
            Err(e) => {
                warn!(error = %e, "quote storage unreadable, starting empty");
                vec![]
            }
        };
        Self { storage, items, events: vec![] }
    }

    pub fn items(&self) -> &[QuoteItem] { &self.items }
    pub fn len(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub fn get_item(&self, id: &str) -> Option<&QuoteItem> {
        self.items.iter().find(|i| i.id() == id)
    }

    /// Sum of all quantities.
    pub fn total_item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity.value())).sum()
    }

    /// Sum of `pricePerUnit × quantity` over all items.
    pub fn total_price(&self) -> Money {
        self.items.iter().map(QuoteItem::line_total).sum()
    }

    /// Adds `quantity` units of the snapshot's variant. An existing entry
    /// with the same id only has its quantity increased; its snapshot is
    /// kept. Non-positive quantities are ignored.
    pub fn add_item(&mut self, snapshot: ItemSnapshot, quantity: i64) {
        let Some(added) = Quantity::from_signed(quantity) else {
            debug!(item_id = %snapshot.id, quantity, "ignoring non-positive add");
            return;
        };
        let item_id = snapshot.id.clone();
        let quantity = match self.items.iter_mut().find(|i| i.snapshot.id == snapshot.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.add(added);
                existing.quantity
            }
            None => {
                self.items.push(QuoteItem { snapshot, quantity: added });
                added
            }
        };
        debug!(%item_id, %added, %quantity, "item added to quote");
        self.raise_event(QuoteEvent::ItemAdded { item_id, added, quantity });
        self.persist();
    }

    pub fn remove_item(&mut self, id: &str) {
        let before = self.items.len();
        self.items.retain(|i| i.id() != id);
        if self.items.len() == before { return; }
        debug!(item_id = id, "item removed from quote");
        self.raise_event(QuoteEvent::ItemRemoved { item_id: id.to_string() });
        self.persist();
    }

    /// Sets the quantity of an entry; `quantity <= 0` removes it.
    pub fn update_quantity(&mut self, id: &str, quantity: i64) {
        let Some(quantity) = Quantity::from_signed(quantity) else {
            self.remove_item(id);
            return;
        };
        let Some(item) = self.items.iter_mut().find(|i| i.snapshot.id == id) else { return };
        item.quantity = quantity;
        debug!(item_id = id, %quantity, "quote quantity updated");
        self.raise_event(QuoteEvent::QuantityUpdated { item_id: id.to_string(), quantity });
        self.persist();
    }

    pub fn clear(&mut self) {
        let items_removed = self.items.len();
        self.items.clear();
        debug!(items_removed, "quote cleared");
        self.raise_event(QuoteEvent::Cleared { items_removed });
        self.persist();
    }

    pub fn take_events(&mut self) -> Vec<QuoteEvent> { std::mem::take(&mut self.events) }

    pub fn into_storage(self) -> S { self.storage }

    fn raise_event(&mut self, e: QuoteEvent) { self.events.push(e); }

    fn persist(&self) {
        let result = serde_json::to_string(&self.items)
            .map_err(|e| e.to_string())
            .and_then(|json| self.storage.set(QUOTE_STORAGE_KEY, &json).map_err(|e| e.to_string()));
        if let Err(error) = result {
            warn!(%error, "failed to persist quote");
        }
    }
}

/// Folds repeated ids into the first occurrence so loaded data upholds the
/// one-entry-per-id invariant.
fn dedupe(items: Vec<QuoteItem>) -> Vec<QuoteItem> {
    let mut merged: Vec<QuoteItem> = Vec::with_capacity(items.len());
    for item in items {
        match merged.iter_mut().find(|m| m.snapshot.id == item.snapshot.id) {
            Some(existing) => existing.quantity = existing.quantity.add(item.quantity),
            None => merged.push(item),
        }
    }
    merged
}
