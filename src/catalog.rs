//! Catalog - Houses and Their Priceable Items
//!
//! Static data: loaded once, never written at runtime.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::selection::{FinishState, ItemValue, NO_CHOICE};
use crate::ENGINE_VERSION;

pub type HouseId = String;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid version string: {0}")]
    InvalidVersion(String),

    #[error("Catalog {0} requires engine >= {1}, current is {2}")]
    EngineVersionMismatch(String, String, String),

    #[error("Duplicate item code {code} for house {house}")]
    DuplicateCode { house: String, code: String },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum HouseStatus {
    Completed,
    Draft,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HouseDetails {
    pub built_area: String,
    pub usable_area: String,
    /// Free text, e.g. "2" or "3-4"
    pub bedrooms: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct House {
    pub id: HouseId,
    pub name: String,
    pub status: HouseStatus,
    pub image: String,
    /// Closed raw shell price, net PLN
    pub base_price: u64,
    /// Developer finish price, net PLN
    pub developer_price: u64,
    pub area: String,
    #[serde(default)]
    pub details: Option<HouseDetails>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub floor_plan_pdf: Option<String>,
}

impl House {
    pub fn base_price_for(&self, finish: FinishState) -> u64 {
        match finish {
            FinishState::Unfinished => self.base_price,
            FinishState::Developer => self.developer_price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemOption {
    pub id: String,
    pub name: String,
    /// Zero means included at no extra cost
    pub price: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ItemKind {
    #[serde(rename_all = "camelCase")]
    Toggle { price: u64 },
    #[serde(rename_all = "camelCase")]
    SingleChoice { options: Vec<ItemOption> },
    #[serde(rename_all = "camelCase")]
    Quantity { unit_price: u64, unit: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OfferItem {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub kind: ItemKind,
    #[serde(default)]
    pub default_value: Option<ItemValue>,
}

impl OfferItem {
    /// Value a fresh selection starts from.
    pub fn default_value(&self) -> ItemValue {
        if let Some(value) = &self.default_value {
            return value.clone();
        }
        match &self.kind {
            ItemKind::Toggle { .. } => ItemValue::Toggle(false),
            ItemKind::SingleChoice { .. } => ItemValue::Choice(NO_CHOICE.to_string()),
            ItemKind::Quantity { .. } => ItemValue::Quantity(0),
        }
    }

    pub fn option(&self, id: &str) -> Option<&ItemOption> {
        match &self.kind {
            ItemKind::SingleChoice { options } => options.iter().find(|o| o.id == id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogFile {
    catalog_version: String,
    engine_min_version: String,
    houses: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogEntry {
    #[serde(flatten)]
    house: House,
    #[serde(default)]
    items: Vec<OfferItem>,
}

/// Catalog registry - houses in display order plus their item sets
#[derive(Debug, Clone)]
pub struct Catalog {
    houses: Vec<House>,
    items: HashMap<HouseId, Vec<OfferItem>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self { houses: vec![], items: HashMap::new() }
    }

    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(content)?;
        check_engine_version(&file.catalog_version, &file.engine_min_version)?;

        let mut catalog = Self::new();
        for entry in file.houses {
            catalog.register(entry.house, entry.items)?;
        }
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&House> {
        self.houses.iter().find(|h| h.id == id)
    }

    pub fn list(&self) -> Vec<&House> {
        self.houses.iter().collect()
    }

    /// Item set for a house. Unknown ids price at base alone.
    pub fn items_for(&self, id: &str) -> &[OfferItem] {
        self.items.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn register(&mut self, house: House, items: Vec<OfferItem>) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for item in &items {
            if !seen.insert(item.code.as_str()) {
                return Err(CatalogError::DuplicateCode {
                    house: house.id.clone(),
                    code: item.code.clone(),
                });
            }
        }

        self.items.insert(house.id.clone(), items);
        match self.houses.iter_mut().find(|h| h.id == house.id) {
            Some(existing) => *existing = house,
            None => self.houses.push(house),
        }
        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn check_engine_version(catalog_version: &str, min_version: &str) -> Result<(), CatalogError> {
    let engine = semver::Version::parse(ENGINE_VERSION)
        .map_err(|_| CatalogError::InvalidVersion(ENGINE_VERSION.to_string()))?;
    let min = semver::Version::parse(min_version)
        .map_err(|_| CatalogError::InvalidVersion(min_version.to_string()))?;

    if engine < min {
        return Err(CatalogError::EngineVersionMismatch(
            catalog_version.to_string(),
            min_version.to_string(),
            ENGINE_VERSION.to_string(),
        ));
    }
    Ok(())
}
