//! Static product database searched in memory.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use storefront_core::domain::Suggestion;
use storefront_core::ports::{LookupError, SuggestionSource};

const BUILTIN_PRODUCTS: &str = include_str!("../../data/products.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// How closely a product matched; lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchRank {
    ExactName,
    NamePrefix,
    WordPrefix,
    NameContains,
    TagPrefix,
    TagContains,
}

/// In-memory product catalog.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    products: Vec<Product>,
}

impl StaticCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The catalog bundled with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_PRODUCTS)
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        Ok(Self::new(serde_json::from_str(raw)?))
    }

    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let catalog = Self::from_json(&raw)?;
        tracing::info!(
            path = %path.as_ref().display(),
            products = catalog.len(),
            "Loaded product catalog"
        );
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Products matching `query`, best match first. Matching is case-insensitive.
    pub fn find(&self, query: &str) -> Vec<&Product> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<(MatchRank, String, &Product)> = self
            .products
            .iter()
            .filter_map(|product| {
                let name = product.name.to_lowercase();
                rank(product, &name, &needle).map(|r| (r, name, product))
            })
            .collect();

        ranked.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));
        ranked.into_iter().map(|(_, _, product)| product).collect()
    }
}

fn rank(product: &Product, name: &str, needle: &str) -> Option<MatchRank> {
    if name == needle {
        return Some(MatchRank::ExactName);
    }
    if name.starts_with(needle) {
        return Some(MatchRank::NamePrefix);
    }
    if name.split_whitespace().any(|word| word.starts_with(needle)) {
        return Some(MatchRank::WordPrefix);
    }
    if name.contains(needle) {
        return Some(MatchRank::NameContains);
    }

    let tags: Vec<String> = product
        .keywords
        .iter()
        .chain(std::iter::once(&product.category))
        .map(|tag| tag.to_lowercase())
        .collect();

    if tags.iter().any(|tag| tag.starts_with(needle)) {
        Some(MatchRank::TagPrefix)
    } else if tags.iter().any(|tag| tag.contains(needle)) {
        Some(MatchRank::TagContains)
    } else {
        None
    }
}

impl From<&Product> for Suggestion {
    fn from(product: &Product) -> Self {
        Suggestion::new(product.id.clone(), product.name.clone())
            .with_category(product.category.clone())
    }
}

#[async_trait]
impl SuggestionSource for StaticCatalog {
    async fn search(&self, query: &str) -> Result<Vec<Suggestion>, LookupError> {
        Ok(self.find(query).into_iter().map(Suggestion::from).collect())
    }
}
