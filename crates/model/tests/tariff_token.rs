//! Tariffs and tokens: ordered collections, nested restrictions and the
//! `uid`-keyed token identity.

use ocpi_contract::{Entity, IdentityFragment, PatchError, Patchable, ProtocolObject};
use ocpi_model::v2_2_1::{
    DayOfWeek, EnergyContract, ProfileType, Tariff, TariffDimensionType, TariffType, Token,
    WhitelistType,
};
use serde_json::{json, Value};

fn tariff_json() -> Value {
    json!({
        "country_code": "DE",
        "party_id": "ALL",
        "id": "12",
        "currency": "EUR",
        "type": "REGULAR",
        "tariff_alt_text": [{"language": "en", "text": "2 euro p/hour"}],
        "elements": [
            {
                "price_components": [
                    {"type": "TIME", "price": 2.00, "vat": 10.0, "step_size": 300}
                ],
                "restrictions": {"day_of_week": ["MONDAY", "TUESDAY"]}
            },
            {
                "price_components": [{"type": "FLAT", "price": 0.50, "step_size": 1}]
            },
            {
                "price_components": [{"type": "ENERGY", "price": 0.25, "step_size": 1}],
                "restrictions": {"min_kwh": 10}
            }
        ],
        "last_updated": "2015-06-29T20:39:09.000Z"
    })
}

fn tariff() -> Tariff {
    Tariff::from_json(&tariff_json(), &IdentityFragment::new()).unwrap()
}

fn token_json() -> Value {
    json!({
        "country_code": "DE",
        "party_id": "TNM",
        "uid": "bdf21bce-fc97-11e8-8eb2-f2801f1b9fd1",
        "type": "APP_USER",
        "contract_id": "DE8ACC12E46L89",
        "issuer": "TheNewMotion",
        "valid": true,
        "whitelist": "ALLOWED",
        "language": "nl",
        "default_profile_type": "GREEN",
        "energy_contract": {"supplier_name": "Greenpeace Energy eG", "contract_id": "0123456789"},
        "last_updated": "2018-12-10T17:25:10.000Z"
    })
}

// ──────────────────────────────────────────────
// 1. Tariffs
// ──────────────────────────────────────────────

#[test]
fn elements_keep_wire_order() {
    let tariff = tariff();
    let kinds: Vec<TariffDimensionType> = tariff
        .elements
        .iter()
        .map(|e| e.price_components[0].component_type)
        .collect();
    assert_eq!(
        kinds,
        vec![
            TariffDimensionType::Time,
            TariffDimensionType::Flat,
            TariffDimensionType::Energy
        ]
    );
    assert_eq!(tariff.tariff_type, Some(TariffType::Regular));
    assert_eq!(
        tariff.elements[0].restrictions.as_ref().unwrap().day_of_week,
        vec![DayOfWeek::Monday, DayOfWeek::Tuesday]
    );
}

#[test]
fn tariff_round_trips_to_the_same_text() {
    let tariff = tariff();
    let text = tariff.to_canonical_string();
    let reparsed = Tariff::parse(&text, &IdentityFragment::new()).unwrap();
    assert_eq!(reparsed, tariff);
    assert_eq!(reparsed.to_canonical_string(), text);
    assert_eq!(tariff.to_json(), {
        let mut expected = tariff_json();
        // 2.00 and 10.0 are integral and come back as integers.
        expected["elements"][0]["price_components"][0]["price"] = json!(2);
        expected["elements"][0]["price_components"][0]["vat"] = json!(10);
        expected
    });
}

#[test]
fn tariff_needs_elements() {
    let mut doc = tariff_json();
    doc["elements"] = json!([]);
    let err = Tariff::from_json(&doc, &IdentityFragment::new()).unwrap_err();
    assert_eq!(err.failure.field(), Some("elements"));
}

#[test]
fn element_errors_point_into_the_collection() {
    let mut doc = tariff_json();
    doc["elements"][2]["price_components"][0]["step_size"] = json!("one");
    let err = Tariff::from_json(&doc, &IdentityFragment::new()).unwrap_err();
    assert!(err.to_string().ends_with(
        "\"elements[2].price_components[0].step_size\": expected integer, found string"
    ));
}

#[test]
fn replacing_elements_keeps_the_new_order() {
    let outcome = tariff().patch(&json!({
        "elements": [
            {"price_components": [{"type": "ENERGY", "price": 0.30, "step_size": 1}]},
            {"price_components": [{"type": "PARKING_TIME", "price": 5, "step_size": 60}]}
        ],
        "last_updated": "2016-01-01T00:00:00Z"
    }));
    assert!(outcome.is_success());
    let elements = &outcome.patched().elements;
    assert_eq!(elements.len(), 2);
    assert_eq!(
        elements[1].price_components[0].component_type,
        TariffDimensionType::ParkingTime
    );
}

#[test]
fn elements_cannot_be_cleared() {
    let outcome = tariff().patch(&json!({"elements": null}));
    assert!(matches!(
        outcome.error(),
        Some(PatchError::NullMandatory { field: "elements", .. })
    ));
}

#[test]
fn alt_text_can_be_cleared() {
    let outcome = tariff().patch(&json!({"tariff_alt_text": null}));
    assert!(outcome.is_success());
    assert!(outcome.patched().tariff_alt_text.is_empty());
    assert!(outcome.patched().to_json().get("tariff_alt_text").is_none());
}

// ──────────────────────────────────────────────
// 2. Tokens
// ──────────────────────────────────────────────

#[test]
fn token_identity_uses_uid() {
    let token = Token::from_json(&token_json(), &IdentityFragment::new()).unwrap();
    assert_eq!(token.uid, "bdf21bce-fc97-11e8-8eb2-f2801f1b9fd1");
    assert_eq!(token.identity().id, token.uid);
    assert_eq!(token.whitelist, WhitelistType::Allowed);
    assert_eq!(token.default_profile_type, Some(ProfileType::Green));
    assert_eq!(token.to_json(), token_json());
}

#[test]
fn token_uid_may_come_from_the_path() {
    let mut doc = token_json();
    doc.as_object_mut().unwrap().remove("uid");
    let path = IdentityFragment::new().with_id("from-path");
    let token = Token::from_json(&doc, &path).unwrap();
    assert_eq!(token.uid, "from-path");
}

#[test]
fn token_without_uid_anywhere_is_rejected() {
    let mut doc = token_json();
    doc.as_object_mut().unwrap().remove("uid");
    let err = Token::from_json(&doc, &IdentityFragment::new()).unwrap_err();
    assert_eq!(err.failure.field(), Some("uid"));
    assert_eq!(
        err.to_string(),
        "The given JSON representation of a Token is invalid: \"uid\": missing"
    );
}

#[test]
fn token_uid_conflict_names_uid() {
    let path = IdentityFragment::new().with_id("other-uid");
    let err = Token::from_json(&token_json(), &path).unwrap_err();
    assert_eq!(err.failure.field(), Some("uid"));
    let expected = "\"uid\": 'bdf21bce-fc97-11e8-8eb2-f2801f1b9fd1' \
                    does not match 'other-uid' given out-of-band";
    assert!(err.to_string().ends_with(expected));
}

#[test]
fn uid_patch_is_rejected() {
    let token = Token::from_json(&token_json(), &IdentityFragment::new()).unwrap();
    let outcome = token.patch(&json!({"uid": "other"}));
    assert_eq!(
        outcome.error().map(ToString::to_string).as_deref(),
        Some("Patching the 'identification' of a token is not allowed!")
    );
    assert_eq!(outcome.patched(), &token);
}

#[test]
fn energy_contract_merges_and_clears() {
    let token = Token::from_json(&token_json(), &IdentityFragment::new()).unwrap();

    let merged = token.patch(&json!({"energy_contract": {"contract_id": null}}));
    assert_eq!(
        merged.patched().energy_contract,
        Some(EnergyContract {
            supplier_name: "Greenpeace Energy eG".to_string(),
            contract_id: None,
        })
    );

    let cleared = merged.patched().patch(&json!({"energy_contract": null}));
    assert!(cleared.is_success());
    assert_eq!(cleared.patched().energy_contract, None);
}
