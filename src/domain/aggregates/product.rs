//! Product Aggregate
//!
//! Catalog entries are immutable. A [`ProductConfiguration`] holds the
//! shopper's medida/acabado selection on a product page and derives the
//! per-unit price and the quote item identity from it.

use serde::Serialize;
use thiserror::Error;
use crate::domain::aggregates::quote::ItemSnapshot;
use crate::domain::value_objects::{Money, Quantity, Slug};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOption {
    pub id: String,
    pub label: String,
    /// Added to the base price when selected. May be negative.
    pub price_additive: Money,
}

impl ProductOption {
    pub fn new(id: impl Into<String>, label: impl Into<String>, price_additive: Money) -> Self {
        Self { id: id.into(), label: label.into(), price_additive }
    }
}

/// One variant axis of a product.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "options", rename_all = "camelCase")]
pub enum OptionAxis {
    #[default]
    NoOptions,
    SingleChoice(ProductOption),
    /// Two or more options; the shopper must pick one explicitly.
    MultipleChoices(Vec<ProductOption>),
}

impl OptionAxis {
    pub fn options(&self) -> &[ProductOption] {
        match self {
            Self::NoOptions => &[],
            Self::SingleChoice(option) => std::slice::from_ref(option),
            Self::MultipleChoices(options) => options,
        }
    }

    pub fn find(&self, option_id: &str) -> Option<&ProductOption> {
        self.options().iter().find(|o| o.id == option_id)
    }
}

impl From<Vec<ProductOption>> for OptionAxis {
    fn from(mut options: Vec<ProductOption>) -> Self {
        match options.len() {
            0 => Self::NoOptions,
            1 => Self::SingleChoice(options.remove(0)),
            _ => Self::MultipleChoices(options),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Axis { Medida, Acabado }

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self { Self::Medida => f.write_str("medida"), Self::Acabado => f.write_str("acabado") }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage { pub id: String, pub src: String, pub alt: String, pub data_ai_hint: String }

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Specification { pub label: String, pub value: String }

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub slug: Slug,
    pub name: String,
    pub description: String,
    /// Base price of one unit before option additives.
    pub price: Money,
    pub images: Vec<ProductImage>,
    pub medidas: OptionAxis,
    pub acabado: OptionAxis,
    pub specifications: Vec<Specification>,
}

impl ProductDetail {
    pub fn new(slug: Slug, name: impl Into<String>, price: Money) -> Self {
        Self {
            slug, name: name.into(), description: String::new(), price,
            images: vec![], medidas: OptionAxis::NoOptions, acabado: OptionAxis::NoOptions,
            specifications: vec![],
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self { self.description = description.into(); self }
    pub fn with_medidas(mut self, options: Vec<ProductOption>) -> Self { self.medidas = options.into(); self }
    pub fn with_acabado(mut self, options: Vec<ProductOption>) -> Self { self.acabado = options.into(); self }
    pub fn with_image(mut self, image: ProductImage) -> Self { self.images.push(image); self }
    pub fn with_spec(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.specifications.push(Specification { label: label.into(), value: value.into() });
        self
    }

    pub fn configure(&self) -> ProductConfiguration<'_> { ProductConfiguration::new(self) }
}

/// `base + medida additive + acabado additive`; a missing option adds 0.
pub fn unit_price(base: Money, medida: Option<&ProductOption>, acabado: Option<&ProductOption>) -> Money {
    [medida, acabado].into_iter().flatten().fold(base, |acc, o| acc.add(&o.price_additive))
}

/// `<slug>[-<medidaId>][-<acabadoId>]`
pub fn compose_item_id(slug: &Slug, medida_id: Option<&str>, acabado_id: Option<&str>) -> String {
    let mut id = slug.as_str().to_string();
    for part in [medida_id, acabado_id].into_iter().flatten() {
        id.push('-');
        id.push_str(part);
    }
    id
}

/// Selection state of one axis on a product page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisSelection<'a> {
    NoOptions,
    SingleChoice(&'a ProductOption),
    MultipleChoices { options: &'a [ProductOption], selected: Option<usize> },
}

impl<'a> AxisSelection<'a> {
    fn for_axis(axis: &'a OptionAxis) -> Self {
        match axis {
            OptionAxis::NoOptions => Self::NoOptions,
            OptionAxis::SingleChoice(option) => Self::SingleChoice(option),
            OptionAxis::MultipleChoices(options) => Self::MultipleChoices { options, selected: None },
        }
    }

    /// The option used for pricing and identity. Falls back to the first
    /// option while nothing has been chosen.
    pub fn effective(&self) -> Option<&'a ProductOption> {
        match *self {
            Self::NoOptions => None,
            Self::SingleChoice(option) => Some(option),
            Self::MultipleChoices { options, selected } => options.get(selected.unwrap_or(0)),
        }
    }

    /// Whether the shopper still has to make an explicit choice.
    pub fn needs_choice(&self) -> bool {
        matches!(self, Self::MultipleChoices { selected: None, .. })
    }

    fn select(&mut self, option_id: &str) -> bool {
        match self {
            Self::NoOptions => false,
            Self::SingleChoice(option) => option.id == option_id,
            Self::MultipleChoices { options, selected } => match options.iter().position(|o| o.id == option_id) {
                Some(index) => { *selected = Some(index); true }
                None => false,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    #[error("product not found: {0}")]
    NotFound(String),
    #[error("unknown {axis} option '{option_id}'")]
    UnknownOption { axis: Axis, option_id: String },
    #[error("a {0} must be selected before adding to the quote")]
    SelectionRequired(Axis),
    #[error("quantity must be at least 1")]
    InvalidQuantity,
}

#[derive(Clone, Debug)]
pub struct ProductConfiguration<'a> {
    product: &'a ProductDetail,
    medida: AxisSelection<'a>,
    acabado: AxisSelection<'a>,
    quantity: Quantity,
}

impl<'a> ProductConfiguration<'a> {
    pub fn new(product: &'a ProductDetail) -> Self {
        Self {
            product,
            medida: AxisSelection::for_axis(&product.medidas),
            acabado: AxisSelection::for_axis(&product.acabado),
            quantity: Quantity::ONE,
        }
    }

    pub fn product(&self) -> &'a ProductDetail { self.product }
    pub fn medida(&self) -> AxisSelection<'a> { self.medida }
    pub fn acabado(&self) -> AxisSelection<'a> { self.acabado }
    pub fn quantity(&self) -> Quantity { self.quantity }

    pub fn select_medida(&mut self, option_id: &str) -> Result<(), ProductError> {
        if self.medida.select(option_id) { return Ok(()); }
        Err(ProductError::UnknownOption { axis: Axis::Medida, option_id: option_id.to_string() })
    }

    pub fn select_acabado(&mut self, option_id: &str) -> Result<(), ProductError> {
        if self.acabado.select(option_id) { return Ok(()); }
        Err(ProductError::UnknownOption { axis: Axis::Acabado, option_id: option_id.to_string() })
    }

    pub fn set_quantity(&mut self, quantity: i64) -> Result<(), ProductError> {
        self.quantity = Quantity::from_signed(quantity).ok_or(ProductError::InvalidQuantity)?;
        Ok(())
    }

    pub fn price_per_unit(&self) -> Money {
        unit_price(self.product.price, self.medida.effective(), self.acabado.effective())
    }

    pub fn line_total(&self) -> Money { self.price_per_unit().multiply(self.quantity) }

    pub fn item_id(&self) -> String {
        compose_item_id(
            &self.product.slug,
            self.medida.effective().map(|o| o.id.as_str()),
            self.acabado.effective().map(|o| o.id.as_str()),
        )
    }

    pub fn can_add_to_quote(&self) -> bool {
        !self.medida.needs_choice() && !self.acabado.needs_choice()
    }

    /// Freezes the current selection into a quote item snapshot.
    pub fn snapshot(&self) -> Result<ItemSnapshot, ProductError> {
        if self.medida.needs_choice() { return Err(ProductError::SelectionRequired(Axis::Medida)); }
        if self.acabado.needs_choice() { return Err(ProductError::SelectionRequired(Axis::Acabado)); }
        let image = self.product.images.first();
        Ok(ItemSnapshot {
            id: self.item_id(),
            product_id: self.product.slug.to_string(),
            name: self.product.name.clone(),
            price_per_unit: self.price_per_unit(),
            image_url: image.map(|i| i.src.clone()),
            data_ai_hint: image.map(|i| i.data_ai_hint.clone()),
            selected_medida_label: self.medida.effective().map(|o| o.label.clone()),
            selected_acabado_label: self.acabado.effective().map(|o| o.label.clone()),
        })
    }
}
