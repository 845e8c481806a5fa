//! Pricing Engine
//!
//! Pure: (house, finish, items, selection) -> quote. Callers decide when to
//! recompute. Absent or mismatched values contribute nothing; there is no
//! error path.

use serde::{Deserialize, Serialize};

use crate::catalog::{House, ItemKind, OfferItem};
use crate::selection::{FinishState, ItemValue, Selection, NO_CHOICE};

/// VAT applied to prefabricated housing
pub const VAT_RATE: f64 = 0.08;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLine {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub variant: Option<String>,
    pub price: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub house_id: String,
    pub finish: FinishState,
    pub base_price: u64,
    pub subtotal: u64,
    pub lines: Vec<PricedLine>,
}

impl Quote {
    pub fn tax(&self) -> TaxSummary {
        TaxSummary::from_subtotal(self.subtotal, VAT_RATE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxSummary {
    pub net: u64,
    pub rate: f64,
    pub tax: f64,
    pub gross: f64,
}

impl TaxSummary {
    /// Tax is rounded to grosze.
    pub fn from_subtotal(net: u64, rate: f64) -> Self {
        let tax = (net as f64 * rate * 100.0).round() / 100.0;
        Self { net, rate, tax, gross: net as f64 + tax }
    }
}

/// Computes the net subtotal and itemized lines in item order.
pub fn compute_total(house: &House, finish: FinishState, items: &[OfferItem], selection: &Selection) -> Quote {
    let base_price = house.base_price_for(finish);
    let mut subtotal = base_price;
    let mut lines = vec![];

    for item in items {
        if let Some(line) = price_item(item, selection.get(&item.code)) {
            subtotal = subtotal.saturating_add(line.price);
            lines.push(line);
        }
    }

    Quote {
        house_id: house.id.clone(),
        finish,
        base_price,
        subtotal,
        lines,
    }
}

fn price_item(item: &OfferItem, value: Option<&ItemValue>) -> Option<PricedLine> {
    let line = |variant: Option<String>, price: u64| PricedLine {
        code: item.code.clone(),
        name: item.name.clone(),
        variant,
        price,
    };

    match (&item.kind, value?) {
        (ItemKind::Toggle { price }, ItemValue::Toggle(true)) => Some(line(None, *price)),
        (ItemKind::SingleChoice { options }, ItemValue::Choice(id)) if id != NO_CHOICE => {
            // Stale ids (e.g. from another house) resolve to nothing.
            let option = options.iter().find(|o| &o.id == id)?;
            (option.price > 0).then(|| line(Some(option.name.clone()), option.price))
        }
        (ItemKind::Quantity { unit_price, unit }, ItemValue::Quantity(qty)) if *qty > 0 => {
            let variant = format!("{} {}", qty, unit).trim_end().to_string();
            Some(line(Some(variant), u64::from(*qty).saturating_mul(*unit_price)))
        }
        _ => None,
    }
}

/// Formats whole złoty with space-grouped thousands, e.g. `211 700 zł`.
pub fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    format!("{} zł", grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn zenith() -> (Catalog, House) {
        let catalog = Catalog::builtin();
        let house = catalog.get("zenith_house").cloned().unwrap();
        (catalog, house)
    }

    #[test]
    fn test_defaults_price_at_base() {
        let (catalog, house) = zenith();
        let items = catalog.items_for(&house.id);
        let selection = Selection::defaults(items);

        let quote = compute_total(&house, FinishState::Unfinished, items, &selection);
        assert_eq!(quote.subtotal, 184900);
        assert!(quote.lines.is_empty());

        let quote = compute_total(&house, FinishState::Developer, items, &selection);
        assert_eq!(quote.subtotal, 249800);
    }

    #[test]
    fn test_zero_priced_choice_not_itemized() {
        let (catalog, house) = zenith();
        let items = catalog.items_for(&house.id);
        let mut selection = Selection::defaults(items);
        selection.set(items, "FUND", ItemValue::Choice("self".into())).unwrap();

        let quote = compute_total(&house, FinishState::Unfinished, items, &selection);
        assert_eq!(quote.subtotal, 184900);
        assert!(quote.lines.is_empty());
    }

    #[test]
    fn test_choice_line_carries_option_label() {
        let (catalog, house) = zenith();
        let items = catalog.items_for(&house.id);
        let mut selection = Selection::defaults(items);
        selection.set(items, "HEAT", ItemValue::Choice("pump_full".into())).unwrap();

        let quote = compute_total(&house, FinishState::Unfinished, items, &selection);
        assert_eq!(quote.subtotal, 184900 + 58800);
        assert_eq!(quote.lines.len(), 1);
        assert_eq!(quote.lines[0].variant.as_deref(), Some("Podłogowe wodne + pompa ciepła + wylewka"));
    }

    #[test]
    fn test_mismatched_kind_contributes_nothing() {
        let (catalog, house) = zenith();
        let items = catalog.items_for(&house.id);
        let mut selection = Selection::defaults(items);
        selection.insert_raw("AC", ItemValue::Quantity(4));
        selection.insert_raw("TERRACE", ItemValue::Toggle(true));

        let quote = compute_total(&house, FinishState::Unfinished, items, &selection);
        assert_eq!(quote.subtotal, 184900);
    }

    #[test]
    fn test_missing_value_contributes_nothing() {
        let (catalog, house) = zenith();
        let items = catalog.items_for(&house.id);
        let quote = compute_total(&house, FinishState::Unfinished, items, &Selection::default());
        assert_eq!(quote.subtotal, 184900);
    }

    #[test]
    fn test_huge_catalog_prices_saturate() {
        let (_, mut house) = zenith();
        house.base_price = u64::MAX - 10;
        let items = vec![
            OfferItem {
                code: "AC".to_string(),
                name: "Klimatyzacja".to_string(),
                description: None,
                kind: ItemKind::Toggle { price: 1000 },
                default_value: None,
            },
            OfferItem {
                code: "TERRACE".to_string(),
                name: "Taras".to_string(),
                description: None,
                kind: ItemKind::Quantity { unit_price: u64::MAX / 2, unit: "m²".to_string() },
                default_value: None,
            },
        ];
        let mut selection = Selection::defaults(&items);
        selection.set(&items, "AC", ItemValue::Toggle(true)).unwrap();
        selection.set(&items, "TERRACE", ItemValue::Quantity(3)).unwrap();

        let quote = compute_total(&house, FinishState::Unfinished, &items, &selection);
        assert_eq!(quote.lines[1].price, u64::MAX);
        assert_eq!(quote.subtotal, u64::MAX);
    }

    #[test]
    fn test_tax_rounding() {
        let tax = TaxSummary::from_subtotal(211700, VAT_RATE);
        assert_eq!(tax.tax, 16936.0);
        assert_eq!(tax.gross, 228636.0);

        let tax = TaxSummary::from_subtotal(13, VAT_RATE);
        assert_eq!(tax.tax, 1.04);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0), "0 zł");
        assert_eq!(format_amount(990), "990 zł");
        assert_eq!(format_amount(211700), "211 700 zł");
        assert_eq!(format_amount(1234567), "1 234 567 zł");
    }
}
