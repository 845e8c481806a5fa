//! Contract Invariant Tests
//!
//! Pricing and session guarantees.

use offerdesk_core::{
    catalog::{HouseStatus, ItemKind, ItemOption},
    compute_total, Catalog, FinishState, House, ImageSource, ItemValue, OfferItem, OfferSession,
    Selection, TaxSummary, VAT_RATE,
};

fn create_test_house() -> House {
    House {
        id: "test_house".to_string(),
        name: "Test HOUSE".to_string(),
        status: HouseStatus::Draft,
        image: "https://example.com/test.png".to_string(),
        base_price: 184900,
        developer_price: 249800,
        area: "55 m²".to_string(),
        details: None,
        description: None,
        floor_plan_pdf: None,
    }
}

fn create_test_items() -> Vec<OfferItem> {
    vec![
        OfferItem {
            code: "HEAT".to_string(),
            name: "Ogrzewanie".to_string(),
            description: None,
            kind: ItemKind::SingleChoice {
                options: vec![
                    ItemOption { id: "elec".to_string(), name: "Elektryczne".to_string(), price: 28700 },
                    ItemOption { id: "self".to_string(), name: "Własny zakres".to_string(), price: 0 },
                ],
            },
            default_value: None,
        },
        OfferItem {
            code: "AC".to_string(),
            name: "Klimatyzacja".to_string(),
            description: None,
            kind: ItemKind::Toggle { price: 7000 },
            default_value: None,
        },
        OfferItem {
            code: "TERRACE".to_string(),
            name: "Taras".to_string(),
            description: None,
            kind: ItemKind::Quantity { unit_price: 990, unit: "m²".to_string() },
            default_value: None,
        },
    ]
}

fn create_catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.register(create_test_house(), create_test_items()).unwrap();
    catalog
}

#[test]
fn invariant_end_to_end_quote() {
    let house = create_test_house();
    let items = create_test_items();
    let mut selection = Selection::defaults(&items);
    selection.set(&items, "TERRACE", ItemValue::Quantity(20)).unwrap();
    selection.set(&items, "AC", ItemValue::Toggle(true)).unwrap();

    let quote = compute_total(&house, FinishState::Unfinished, &items, &selection);
    assert_eq!(quote.subtotal, 211700);

    let tax = TaxSummary::from_subtotal(quote.subtotal, VAT_RATE);
    assert_eq!(tax.gross, 228636.0);
    assert_eq!(quote.tax(), tax);

    // Lines follow item definition order
    let codes: Vec<_> = quote.lines.iter().map(|l| l.code.as_str()).collect();
    assert_eq!(codes, vec!["AC", "TERRACE"]);
    assert_eq!(quote.lines[1].variant.as_deref(), Some("20 m²"));
    assert_eq!(quote.lines[1].price, 19800);
}

#[test]
fn invariant_defaults_price_at_base_for_every_house() {
    let catalog = Catalog::builtin();
    for house in catalog.list() {
        let items = catalog.items_for(&house.id);
        let selection = Selection::defaults(items);
        for finish in [FinishState::Unfinished, FinishState::Developer] {
            let quote = compute_total(house, finish, items, &selection);
            assert_eq!(quote.subtotal, house.base_price_for(finish));
            assert!(quote.lines.is_empty());
        }
    }
}

#[test]
fn invariant_none_choice_contributes_nothing() {
    let house = create_test_house();
    let items = create_test_items();
    let mut selection = Selection::defaults(&items);
    selection.set(&items, "HEAT", ItemValue::Choice("elec".into())).unwrap();
    assert_eq!(compute_total(&house, FinishState::Unfinished, &items, &selection).subtotal, 184900 + 28700);

    selection.set(&items, "HEAT", ItemValue::Choice("none".into())).unwrap();
    let quote = compute_total(&house, FinishState::Unfinished, &items, &selection);
    assert_eq!(quote.subtotal, 184900);
    assert!(quote.lines.is_empty());
}

#[test]
fn invariant_stale_choice_contributes_nothing() {
    // Selection made against another house's item set
    let catalog = Catalog::builtin();
    let zenith_items = catalog.items_for("zenith_house");
    let mut selection = Selection::defaults(zenith_items);
    selection.set(zenith_items, "HEAT", ItemValue::Choice("pump_full".into())).unwrap();

    let house = create_test_house();
    let items = create_test_items();
    let quote = compute_total(&house, FinishState::Unfinished, &items, &selection);
    assert_eq!(quote.subtotal, 184900);
    assert!(quote.lines.is_empty());
}

#[test]
fn invariant_unknown_option_rejected_by_session() {
    let mut session = OfferSession::new(create_catalog(), "test_house").unwrap();
    assert!(session.set_item("HEAT", ItemValue::parse("geothermal")).is_err());
    assert!(session.set_item("HEAT", ItemValue::parse("elec")).is_ok());
    assert_eq!(session.quote().subtotal, 184900 + 28700);
}

#[test]
fn invariant_quantity_zero_and_positive() {
    let house = create_test_house();
    let items = create_test_items();
    let mut selection = Selection::defaults(&items);

    selection.set(&items, "TERRACE", ItemValue::Quantity(0)).unwrap();
    let quote = compute_total(&house, FinishState::Unfinished, &items, &selection);
    assert!(quote.lines.is_empty());

    for n in [1u32, 7, 35] {
        selection.set(&items, "TERRACE", ItemValue::Quantity(n)).unwrap();
        let quote = compute_total(&house, FinishState::Unfinished, &items, &selection);
        assert_eq!(quote.subtotal, 184900 + u64::from(n) * 990);
        assert_eq!(quote.lines.len(), 1);
    }
}

#[test]
fn invariant_pricing_idempotent() {
    let house = create_test_house();
    let items = create_test_items();
    let mut selection = Selection::defaults(&items);
    selection.set(&items, "AC", ItemValue::Toggle(true)).unwrap();
    let before = selection.clone();

    let q1 = compute_total(&house, FinishState::Developer, &items, &selection);
    let q2 = compute_total(&house, FinishState::Developer, &items, &selection);
    assert_eq!(q1, q2);
    assert_eq!(selection, before);
}

#[test]
fn invariant_house_switch_resets_selection() {
    let mut session = OfferSession::new(Catalog::builtin(), "zenith_house").unwrap();
    session.set_item("AC", ItemValue::Toggle(true)).unwrap();
    session.set_item("TERRACE", ItemValue::Quantity(15)).unwrap();
    session.set_item("HEAT", ItemValue::Choice("pump_full".into())).unwrap();

    session.select_house("vista_house").unwrap();
    let expected = Selection::defaults(session.catalog().items_for("vista_house"));
    assert_eq!(session.selection(), &expected);
    assert_eq!(session.quote().subtotal, 295700);
}

#[test]
fn invariant_switch_to_smaller_item_set_drops_codes() {
    let mut catalog = Catalog::builtin();
    catalog.register(create_test_house(), create_test_items()).unwrap();

    let mut session = OfferSession::new(catalog, "nest_house").unwrap();
    session.set_item("BLINDS", ItemValue::Toggle(true)).unwrap();
    session.select_house("test_house").unwrap();

    let codes: Vec<_> = session.selection().codes().collect();
    assert_eq!(codes, vec!["AC", "HEAT", "TERRACE"]);
    assert!(session.set_item("BLINDS", ItemValue::Toggle(true)).is_err());
}

#[test]
fn invariant_house_switch_rebinds_photos() {
    let mut session = OfferSession::new(Catalog::builtin(), "nest_house").unwrap();
    session.upload_image("logo", "image/png", &[1, 2, 3]).unwrap();

    session.select_house("peak_house").unwrap();
    let peak_image = session.house().image.clone();
    assert_eq!(session.images().get("main"), Some(&ImageSource::Remote(peak_image)));
    assert!(session.images().get("logo").unwrap().is_embedded());
}

#[test]
fn invariant_unknown_house_rejected_by_session() {
    let mut session = OfferSession::new(create_catalog(), "test_house").unwrap();
    assert!(session.select_house("missing").is_err());
    assert_eq!(session.house().id, "test_house");
    assert!(OfferSession::new(create_catalog(), "missing").is_err());
}

#[test]
fn invariant_unknown_house_prices_at_base() {
    let catalog = create_catalog();
    let mut orphan = create_test_house();
    orphan.id = "orphan".to_string();

    let items = catalog.items_for(&orphan.id);
    assert!(items.is_empty());
    let quote = compute_total(&orphan, FinishState::Developer, items, &Selection::default());
    assert_eq!(quote.subtotal, 249800);
}

#[test]
fn invariant_offer_hash_stable() {
    let mut session = OfferSession::new(Catalog::builtin(), "balance_house").unwrap();
    session.set_finish(FinishState::Developer);
    session.set_item("SEW", ItemValue::Choice("wwtp".into())).unwrap();

    let m1 = session.manifest().unwrap();
    let m2 = session.manifest().unwrap();

    // Same configuration, same offer hash; ids and timestamps differ
    assert_eq!(m1.offer_hash, m2.offer_hash);
    assert_ne!(m1.id, m2.id);
    assert_eq!(m1.quote.subtotal, 329700 + 17400);
    assert!(!m1.manifest_hash.is_empty());
}

#[test]
fn invariant_catalog_file_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    let json = serde_json::json!({
        "catalogVersion": "2025.2.0",
        "engineMinVersion": "1.0.0",
        "houses": [{
            "id": "test_house",
            "name": "Test HOUSE",
            "status": "DRAFT",
            "image": "https://example.com/test.png",
            "basePrice": 184900,
            "developerPrice": 249800,
            "area": "55 m²",
            "items": create_test_items(),
        }]
    });
    std::fs::write(&path, serde_json::to_string_pretty(&json).unwrap()).unwrap();

    let catalog = Catalog::load_from_file(&path).unwrap();
    assert_eq!(catalog.items_for("test_house"), create_test_items().as_slice());
    assert_eq!(catalog.get("test_house"), Some(&create_test_house()));
}
