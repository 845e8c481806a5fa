//! Selection State - one value per item code

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::catalog::{ItemKind, OfferItem};

/// Single-choice sentinel for "nothing selected"
pub const NO_CHOICE: &str = "none";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Unknown item code: {0}")]
    UnknownCode(String),

    #[error("Invalid value for {code}: {value}")]
    InvalidValue { code: String, value: String },
}

/// Binary pricing tier orthogonal to item selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishState {
    #[default]
    Unfinished,
    Developer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemValue {
    Toggle(bool),
    Quantity(u32),
    Choice(String),
}

impl ItemValue {
    /// Parses CLI text: `true`/`false`, a non-negative integer, else an option id.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw {
            "true" => Self::Toggle(true),
            "false" => Self::Toggle(false),
            _ => raw
                .parse::<u32>()
                .map(Self::Quantity)
                .unwrap_or_else(|_| Self::Choice(raw.to_string())),
        }
    }

    /// True when the value contributes nothing by definition.
    pub fn is_unset(&self) -> bool {
        match self {
            Self::Toggle(on) => !on,
            Self::Quantity(n) => *n == 0,
            Self::Choice(id) => id.is_empty() || id == NO_CHOICE,
        }
    }

    /// Numeric option ids arrive as quantities from the CLI parser.
    fn coerce(self, kind: &ItemKind) -> Self {
        match (self, kind) {
            (Self::Quantity(n), ItemKind::SingleChoice { .. }) => Self::Choice(n.to_string()),
            (value, _) => value,
        }
    }

    fn fits(&self, item: &OfferItem) -> bool {
        match (self, &item.kind) {
            (Self::Toggle(_), ItemKind::Toggle { .. }) | (Self::Quantity(_), ItemKind::Quantity { .. }) => true,
            (Self::Choice(id), ItemKind::SingleChoice { .. }) => id == NO_CHOICE || item.option(id).is_some(),
            _ => false,
        }
    }
}

/// Mapping from item code to its current value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    values: BTreeMap<String, ItemValue>,
}

impl Selection {
    /// Seeds every code of the item set with its default.
    pub fn defaults(items: &[OfferItem]) -> Self {
        let values = items
            .iter()
            .map(|item| (item.code.clone(), item.default_value()))
            .collect();
        Self { values }
    }

    pub fn get(&self, code: &str) -> Option<&ItemValue> {
        self.values.get(code)
    }

    /// Updates a code that belongs to the item set.
    pub fn set(&mut self, items: &[OfferItem], code: &str, value: ItemValue) -> Result<(), SelectionError> {
        let item = items
            .iter()
            .find(|i| i.code == code)
            .ok_or_else(|| SelectionError::UnknownCode(code.to_string()))?;

        let value = value.coerce(&item.kind);
        if !value.fits(item) {
            return Err(SelectionError::InvalidValue {
                code: code.to_string(),
                value: format!("{:?}", value),
            });
        }

        self.values.insert(code.to_string(), value);
        Ok(())
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn insert_raw(&mut self, code: &str, value: ItemValue) {
        self.values.insert(code.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn test_parse_values() {
        assert_eq!(ItemValue::parse("true"), ItemValue::Toggle(true));
        assert_eq!(ItemValue::parse(" 20 "), ItemValue::Quantity(20));
        assert_eq!(ItemValue::parse("pump_full"), ItemValue::Choice("pump_full".into()));
        assert_eq!(ItemValue::parse("-3"), ItemValue::Choice("-3".into()));
    }

    #[test]
    fn test_defaults_cover_every_code() {
        let catalog = Catalog::builtin();
        let items = catalog.items_for("zenith_house");
        let selection = Selection::defaults(items);
        assert_eq!(selection.len(), items.len());
        assert!(items.iter().all(|i| selection.get(&i.code).is_some()));
    }

    #[test]
    fn test_set_rejects_unknown_code() {
        let catalog = Catalog::builtin();
        let items = catalog.items_for("zenith_house");
        let mut selection = Selection::defaults(items);
        let err = selection.set(items, "POOL", ItemValue::Toggle(true)).unwrap_err();
        assert_eq!(err, SelectionError::UnknownCode("POOL".into()));
    }

    #[test]
    fn test_set_rejects_wrong_kind() {
        let catalog = Catalog::builtin();
        let items = catalog.items_for("zenith_house");
        let mut selection = Selection::defaults(items);
        assert!(selection.set(items, "AC", ItemValue::Quantity(3)).is_err());
        assert!(selection.set(items, "AC", ItemValue::Toggle(true)).is_ok());
        assert_eq!(selection.get("AC"), Some(&ItemValue::Toggle(true)));
    }

    #[test]
    fn test_set_rejects_unknown_option() {
        let catalog = Catalog::builtin();
        let items = catalog.items_for("zenith_house");
        let mut selection = Selection::defaults(items);

        let err = selection.set(items, "HEAT", ItemValue::parse("geothermal")).unwrap_err();
        assert!(matches!(err, SelectionError::InvalidValue { ref code, .. } if code == "HEAT"));
        assert_eq!(selection.get("HEAT"), Some(&ItemValue::Choice(NO_CHOICE.into())));

        assert!(selection.set(items, "HEAT", ItemValue::parse("pump_full")).is_ok());
        assert!(selection.set(items, "HEAT", ItemValue::parse("none")).is_ok());
    }

    #[test]
    fn test_untagged_json() {
        let value: ItemValue = serde_json::from_str("12").unwrap();
        assert_eq!(value, ItemValue::Quantity(12));
        let value: ItemValue = serde_json::from_str("\"septic\"").unwrap();
        assert_eq!(value, ItemValue::Choice("septic".into()));
    }
}
