//! Offer Session - the salesperson's working state
//!
//! Every mutation goes through an explicit method; totals are recomputed on
//! request with `quote()`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::{Catalog, House, OfferItem};
use crate::hashing::{compute_manifest_hash, compute_offer_hash};
use crate::images::ImageSet;
use crate::pricing::{compute_total, Quote, TaxSummary};
use crate::selection::{FinishState, ItemValue, Selection, SelectionError};
use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum OfferError {
    #[error("House not found: {0}")]
    HouseNotFound(String),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("Image slot not found: {0}")]
    SlotNotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Reproducible snapshot of a priced offer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferManifest {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub engine_version: String,
    pub client_name: Option<String>,
    pub house_id: String,
    pub house_name: String,
    pub finish: FinishState,
    pub selection: Selection,
    pub quote: Quote,
    pub tax: TaxSummary,
    pub offer_hash: String,
    pub manifest_hash: String,
}

pub struct OfferSession {
    catalog: Catalog,
    house: House,
    finish: FinishState,
    selection: Selection,
    images: ImageSet,
    client_name: Option<String>,
}

impl OfferSession {
    pub fn new(catalog: Catalog, house_id: &str) -> Result<Self, OfferError> {
        let house = catalog
            .get(house_id)
            .cloned()
            .ok_or_else(|| OfferError::HouseNotFound(house_id.to_string()))?;
        let selection = Selection::defaults(catalog.items_for(house_id));
        let images = ImageSet::for_house(&house);

        Ok(Self {
            catalog,
            house,
            finish: FinishState::default(),
            selection,
            images,
            client_name: None,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn house(&self) -> &House {
        &self.house
    }

    pub fn items(&self) -> &[OfferItem] {
        self.catalog.items_for(&self.house.id)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn finish(&self) -> FinishState {
        self.finish
    }

    pub fn images(&self) -> &ImageSet {
        &self.images
    }

    /// Switches house: selection back to the new house's defaults, photo slots re-pointed.
    pub fn select_house(&mut self, house_id: &str) -> Result<(), OfferError> {
        let house = self
            .catalog
            .get(house_id)
            .cloned()
            .ok_or_else(|| OfferError::HouseNotFound(house_id.to_string()))?;

        self.selection = Selection::defaults(self.catalog.items_for(house_id));
        self.images.rebind_house(&house);
        self.house = house;
        Ok(())
    }

    pub fn set_finish(&mut self, finish: FinishState) {
        self.finish = finish;
    }

    pub fn set_client_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.client_name = (!name.trim().is_empty()).then_some(name);
    }

    pub fn set_item(&mut self, code: &str, value: ItemValue) -> Result<(), OfferError> {
        let items = self.catalog.items_for(&self.house.id);
        self.selection.set(items, code, value)?;
        Ok(())
    }

    pub fn quote(&self) -> Quote {
        compute_total(&self.house, self.finish, self.items(), &self.selection)
    }

    pub fn upload_image(&mut self, slot: &str, mime: &str, bytes: &[u8]) -> Result<(), OfferError> {
        if self.images.upload(slot, mime, bytes) {
            Ok(())
        } else {
            Err(OfferError::SlotNotFound(slot.to_string()))
        }
    }

    /// Commits a whole prepared image set at once.
    pub fn apply_images(&mut self, images: ImageSet) {
        self.images = images;
    }

    pub fn manifest(&self) -> Result<OfferManifest, OfferError> {
        let quote = self.quote();
        let tax = quote.tax();
        let offer_hash = compute_offer_hash(&self.house.id, self.finish, &self.selection, ENGINE_VERSION)?;

        let mut manifest = OfferManifest {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            client_name: self.client_name.clone(),
            house_id: self.house.id.clone(),
            house_name: self.house.name.clone(),
            finish: self.finish,
            selection: self.selection.clone(),
            quote,
            tax,
            offer_hash,
            manifest_hash: String::new(), // Computed after
        };
        manifest.manifest_hash = compute_manifest_hash(&manifest)?;
        Ok(manifest)
    }
}
