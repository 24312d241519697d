//! Catalog data provider.
//!
//! Read-only lookup of product details by slug. The quote never holds
//! references into the catalog, only snapshots taken at add time.

use std::collections::BTreeMap;

use crate::domain::aggregates::{ProductDetail, ProductOption};
use crate::domain::aggregates::product::ProductImage;
use crate::domain::value_objects::{Money, Slug, SlugError};

pub trait CatalogProvider: Send + Sync {
    fn product_by_slug(&self, slug: &str) -> Option<&ProductDetail>;
    fn products(&self) -> Box<dyn Iterator<Item = &ProductDetail> + '_>;
}

#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    products: BTreeMap<String, ProductDetail>,
}

impl StaticCatalog {
    pub fn new(products: impl IntoIterator<Item = ProductDetail>) -> Self {
        Self { products: products.into_iter().map(|p| (p.slug.to_string(), p)).collect() }
    }

    pub fn len(&self) -> usize { self.products.len() }
    pub fn is_empty(&self) -> bool { self.products.is_empty() }

    /// The retailer's current price sheet.
    pub fn lumber() -> Result<Self, SlugError> {
        let mut products = Vec::new();
        for (slug, name, price, largo, hint, kind, color, uses, description) in LONG_BOARDS {
            let mut detail = product(slug, name, *price, hint)?
                .with_description(*description)
                .with_medidas(vec![
                    ProductOption::new("corto", "Corto (Precio Base)", Money::ZERO),
                    ProductOption::new("largo", format!("Largo (+RD${largo})"), Money::pesos(*largo)),
                ])
                .with_spec("Tipo:", *kind);
            if !color.is_empty() { detail = detail.with_spec("Color:", *color); }
            products.push(detail.with_spec("Usos:", *uses));
        }
        for (slug, name, price, thickness, hydro) in MDF_BOARDS {
            let (kind, hint, alt) = if *hydro {
                ("Tablero Hidrófugo", "waterproof mdf", "MDF Hidrofugo")
            } else {
                ("Tablero", "mdf board", "MDF")
            };
            let description = if *hydro {
                format!("Tablero de MDF resistente a la humedad de {thickness}.")
            } else {
                format!("Tablero de fibra de densidad media (MDF) de {thickness} de grosor.")
            };
            let mut detail = product(slug, name, *price, hint)?
                .with_description(description)
                .with_spec("Tipo:", kind)
                .with_spec("Grosor:", *thickness);
            if let Some(image) = detail.images.first_mut() { image.alt = alt.to_string(); }
            products.push(detail);
        }
        products.push(
            product("melamina-blanca", "Melamina Blanca", 2200, "white melamine")?
                .with_description("Tablero de melamina con acabado blanco, perfecto para fabricación de muebles modulares.")
                .with_medidas(vec![
                    ProductOption::new("1cara", "1 Cara (Precio Base)", Money::ZERO),
                    ProductOption::new("2caras", "2 Caras (+RD$250)", Money::pesos(250)),
                ])
                .with_spec("Tipo:", "Tablero Melamínico")
                .with_spec("Color:", "Blanco"),
        );
        products.push(
            product("playwood", "Playwood", 1200, "plywood sheet")?
                .with_description("Tableros de contrachapado (playwood) versátiles para una variedad de aplicaciones estructurales y decorativas.")
                .with_medidas(vec![
                    ProductOption::new("sencillo", "Sencillo (Precio Base)", Money::ZERO),
                    ProductOption::new("marino", "Marino (+RD$500)", Money::pesos(500)),
                ])
                .with_spec("Tipo:", "Contrachapado")
                .with_spec("Grosor:", "Variable"),
        );
        let mut canto = product("canto-blanco-mt-1mm", "Canto Blanco MT 1mm", 25, "white edge banding")?
            .with_description("Canto de PVC color blanco para un acabado profesional en tableros de melamina. Precio por metro lineal.")
            .with_spec("Tipo:", "Accesorio")
            .with_spec("Material:", "PVC");
        if let Some(image) = canto.images.first_mut() { image.alt = "Canto Blanco".to_string(); }
        products.push(canto);
        Ok(Self::new(products))
    }
}

impl CatalogProvider for StaticCatalog {
    fn product_by_slug(&self, slug: &str) -> Option<&ProductDetail> { self.products.get(slug) }

    fn products(&self) -> Box<dyn Iterator<Item = &ProductDetail> + '_> { Box::new(self.products.values()) }
}

fn product(slug: &str, name: &str, price: i64, hint: &str) -> Result<ProductDetail, SlugError> {
    Ok(ProductDetail::new(Slug::new(slug)?, name, Money::pesos(price)).with_image(ProductImage {
        id: "1".into(),
        src: PLACEHOLDER_IMAGE.into(),
        alt: name.into(),
        data_ai_hint: hint.into(),
    }))
}

const PLACEHOLDER_IMAGE: &str = "https://placehold.co/800x600.png";

/// slug, name, base (corto) price, largo additive, image hint, type, color, uses, description
type LongBoard = (&'static str, &'static str, i64, i64, &'static str, &'static str, &'static str, &'static str, &'static str);

const LONG_BOARDS: &[LongBoard] = &[
    ("caoba-andina", "Caoba Andina", 2800, 350, "andina mahogany", "Madera dura", "Rojizo profundo", "Muebles, carpintería fina",
     "Madera de Caoba Andina, apreciada por su color rojizo profundo y veta elegante. Adecuada para muebles de calidad, carpintería interior y acabados decorativos."),
    ("caoba-sudamericana", "Caoba Sudamericana", 3500, 500, "south american mahogany", "Madera dura de lujo", "Marrón rojizo", "Ebanistería de alta gama",
     "Una de las maderas más finas del mundo, la Caoba Sudamericana es conocida por su durabilidad, belleza y color rico. Ideal para ebanistería de lujo."),
    ("roble-congona", "Roble Congona", 2500, 300, "congona oak", "Madera dura", "Marrón claro a medio", "Pisos, vigas, muebles rústicos",
     "Madera robusta y resistente, perfecta para proyectos que requieren durabilidad y un aspecto rústico y atractivo."),
    ("cedro-macho", "Cedro Macho", 1950, 250, "male cedar", "Madera blanda", "Marrón rosado", "Revestimientos, cajonería",
     "Madera versátil y aromática, con buena resistencia a la intemperie y a los insectos."),
    ("jequitiba", "Jequitiba", 3500, 400, "jequitiba wood", "Madera dura brasileña", "Rosa a marrón rojizo", "Muebles finos, puertas",
     "Madera brasileña de alta calidad, con una textura fina y un color que va del rosa pálido al marrón rojizo. Excelente para muebles y acabados de interiores."),
    ("roble-cerejeira", "Roble Cerejeira", 2750, 350, "cerejeira oak", "Madera dura", "Amarillo a marrón claro", "Mobiliario, carpintería general",
     "También conocida como Cerejeira, esta madera ofrece una alternativa atractiva al roble tradicional, con una veta interesante y buena trabajabilidad."),
    ("poplar-alamo", "Poplar/Alamo", 2200, 250, "poplar wood", "Madera blanda", "Blanco a verdoso", "Molduras, carpintería pintada",
     "Madera ligera y económica, fácil de trabajar. Ideal para carpintería interior, marcos y proyectos que serán pintados."),
    ("pino-americano", "Pino Americano", 2500, 250, "american pine", "Madera blanda", "", "Construcción, muebles",
     "Madera de pino americano, conocida por su veta distintiva y versatilidad. Ideal para construcción y carpintería en general."),
    ("pino-caribe", "Pino Caribe", 1750, 200, "caribbean pine", "Madera blanda tratada", "", "Exteriores, estructuras",
     "Pino tratado resistente, ideal para exteriores y construcción. Ofrece una solución duradera y económica."),
];

/// slug, name, price, thickness, moisture resistant
const MDF_BOARDS: &[(&str, &str, i64, &str, bool)] = &[
    ("mdf-3mm", "MDF 3mm", 400, "3mm", false),
    ("mdf-5mm", "MDF 5mm", 550, "5mm", false),
    ("mdf-9mm", "MDF 9mm", 900, "9mm", false),
    ("mdf-12mm", "MDF 12mm", 1100, "12mm", false),
    ("mdf-15mm", "MDF 15mm", 1300, "15mm", false),
    ("mdf-18mm", "MDF 18mm", 1550, "18mm", false),
    ("mdf-hidrofugo-15mm", "MDF Hidrofugo 15mm", 1700, "15mm", true),
    ("mdf-hidrofugo-18mm", "MDF Hidrofugo 18mm", 1950, "18mm", true),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::OptionAxis;

    #[test]
    fn test_lumber_catalog() {
        let catalog = StaticCatalog::lumber().unwrap();
        assert_eq!(catalog.len(), 20);
        assert!(catalog.product_by_slug("no-such-wood").is_none());
        assert_eq!(catalog.products().count(), 20);
    }

    #[test]
    fn test_long_board_pricing() {
        let catalog = StaticCatalog::lumber().unwrap();
        let caoba = catalog.product_by_slug("caoba-andina").unwrap();
        assert!(matches!(caoba.medidas, OptionAxis::MultipleChoices(_)));
        assert_eq!(caoba.acabado, OptionAxis::NoOptions);
        let mut config = caoba.configure();
        assert_eq!(config.price_per_unit(), Money::pesos(2800));
        config.select_medida("largo").unwrap();
        assert_eq!(config.price_per_unit(), Money::pesos(3150));
        assert_eq!(config.item_id(), "caoba-andina-largo");
    }

    #[test]
    fn test_boards_without_options() {
        let catalog = StaticCatalog::lumber().unwrap();
        let mdf = catalog.product_by_slug("mdf-hidrofugo-18mm").unwrap();
        assert_eq!(mdf.medidas, OptionAxis::NoOptions);
        let snapshot = mdf.configure().snapshot().unwrap();
        assert_eq!(snapshot.id, "mdf-hidrofugo-18mm");
        assert_eq!(snapshot.price_per_unit, Money::pesos(1950));
        assert_eq!(snapshot.data_ai_hint.as_deref(), Some("waterproof mdf"));
    }

    #[test]
    fn test_image_alt_text() {
        let catalog = StaticCatalog::lumber().unwrap();
        let alt = |slug: &str| catalog.product_by_slug(slug).unwrap().images[0].alt.clone();
        assert_eq!(alt("canto-blanco-mt-1mm"), "Canto Blanco");
        assert_eq!(alt("mdf-hidrofugo-15mm"), "MDF Hidrofugo");
        assert_eq!(alt("mdf-9mm"), "MDF");
        assert_eq!(alt("caoba-andina"), "Caoba Andina");
    }

    #[test]
    fn test_pine_specs_skip_color() {
        let catalog = StaticCatalog::lumber().unwrap();
        let pino = catalog.product_by_slug("pino-caribe").unwrap();
        let labels: Vec<_> = pino.specifications.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["Tipo:", "Usos:"]);
    }
}
