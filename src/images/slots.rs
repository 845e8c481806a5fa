//! Named image slots of the offer document, in document order.

use serde::{Deserialize, Serialize};

use super::source::{EmbeddedImage, ImageSource};
use crate::catalog::House;

/// Slots that follow the selected house's photo
pub const HOUSE_BOUND_SLOTS: [&str; 3] = ["main", "gallery1", "gallery2"];

const FIXED_SLOTS: [(&str, &str); 9] = [
    ("interior", "https://starterhome.pl/wp-content/uploads/2025/10/ujecie-1-scaled.png"),
    ("floorPlan", "https://howsmart.pl/wp-content/uploads/2025/02/EMILY-RZUT-PL-scaled.jpg"),
    ("advisor", "https://i.ibb.co/j9NzkpfG/Krystian.jpg"),
    ("logo", "https://i.ibb.co/PZJv90w6/logo.png"),
    ("decorLeaf", "https://starterhome.pl/wp-content/uploads/2025/12/cropped-Favicon.png"),
    ("techRoof", "https://starterhome.pl/wp-content/uploads/2025/12/G_F_4.png"),
    ("techWallExt", "https://starterhome.pl/wp-content/uploads/2025/12/G_F_2.png"),
    ("techWallInt", "https://starterhome.pl/wp-content/uploads/2025/12/G_2.png"),
    ("techFloor", "https://starterhome.pl/wp-content/uploads/2025/12/G_F_5.png"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSlot {
    pub name: String,
    pub source: ImageSource,
}

/// Ordered slot collection. Replaced as a unit by the batch driver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSet {
    slots: Vec<ImageSlot>,
}

impl ImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard twelve slots for a house offer.
    pub fn for_house(house: &House) -> Self {
        let mut set = Self::new();
        for name in HOUSE_BOUND_SLOTS {
            set.insert(name, ImageSource::Remote(house.image.clone()));
        }
        for (name, url) in FIXED_SLOTS {
            set.insert(name, ImageSource::Remote(url.to_string()));
        }
        set
    }

    /// Sets a slot, appending it when new. Order of existing slots is kept.
    pub fn insert(&mut self, name: &str, source: ImageSource) {
        match self.slots.iter_mut().find(|s| s.name == name) {
            Some(slot) => slot.source = source,
            None => self.slots.push(ImageSlot { name: name.to_string(), source }),
        }
    }

    /// Replaces an existing slot only. Returns false for unknown names.
    pub fn replace(&mut self, name: &str, source: ImageSource) -> bool {
        match self.slots.iter_mut().find(|s| s.name == name) {
            Some(slot) => {
                slot.source = source;
                true
            }
            None => false,
        }
    }

    /// Stores uploaded bytes as an embedded image.
    pub fn upload(&mut self, name: &str, mime: &str, bytes: &[u8]) -> bool {
        self.replace(name, ImageSource::Embedded(EmbeddedImage::from_bytes(mime, bytes)))
    }

    pub fn rebind_house(&mut self, house: &House) {
        for name in HOUSE_BOUND_SLOTS {
            self.replace(name, ImageSource::Remote(house.image.clone()));
        }
    }

    pub fn get(&self, name: &str) -> Option<&ImageSource> {
        self.slots.iter().find(|s| s.name == name).map(|s| &s.source)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageSlot> {
        self.slots.iter()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn test_house_set_layout() {
        let catalog = Catalog::builtin();
        let house = catalog.get("haven_house").unwrap();
        let set = ImageSet::for_house(house);

        assert_eq!(set.len(), 12);
        assert_eq!(set.keys()[0], "main");
        assert_eq!(set.keys()[11], "techFloor");
        assert_eq!(set.get("gallery2"), Some(&ImageSource::Remote(house.image.clone())));
    }

    #[test]
    fn test_rebind_touches_only_house_slots() {
        let catalog = Catalog::builtin();
        let mut set = ImageSet::for_house(catalog.get("haven_house").unwrap());
        let logo = set.get("logo").cloned();

        let vista = catalog.get("vista_house").unwrap();
        set.rebind_house(vista);
        assert_eq!(set.get("main"), Some(&ImageSource::Remote(vista.image.clone())));
        assert_eq!(set.get("logo").cloned(), logo);
    }

    #[test]
    fn test_replace_unknown_slot() {
        let mut set = ImageSet::new();
        assert!(!set.upload("cover", "image/png", &[0]));
        set.insert("cover", ImageSource::Remote("x".into()));
        assert!(set.upload("cover", "image/png", &[0]));
        assert!(set.get("cover").unwrap().is_embedded());
    }
}
