//! Domain events
use crate::domain::value_objects::Quantity;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum QuoteEvent {
    ItemAdded { item_id: String, added: Quantity, quantity: Quantity },
    QuantityUpdated { item_id: String, quantity: Quantity },
    ItemRemoved { item_id: String },
    Cleared { items_removed: usize },
}

impl QuoteEvent {
    pub fn item_id(&self) -> Option<&str> {
        match self {
            Self::ItemAdded { item_id, .. }
            | Self::QuantityUpdated { item_id, .. }
            | Self::ItemRemoved { item_id } => Some(item_id),
            Self::Cleared { .. } => None,
        }
    }
}
