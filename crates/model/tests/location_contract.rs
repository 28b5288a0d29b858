//! Parse, render and patch behaviour of OCPI 2.2.1 locations, exercised
//! through the public contract only.

use ocpi_contract::{
    CountryCode, Entity, IdentityComponent, IdentityError, IdentityFragment, ParseFailure,
    PatchError, Patchable, ProtocolObject, Timestamp,
};
use ocpi_model::v2_2_1::{Facility, Location, ParkingType};
use serde_json::{json, Value};

fn location_json() -> Value {
    json!({
        "country_code": "DE",
        "party_id": "ALL",
        "id": "LOC0001",
        "publish": true,
        "name": "Gent Zuid",
        "address": "F.Rooseveltlaan 3A",
        "city": "Gent",
        "postal_code": "9000",
        "country": "BEL",
        "coordinates": {"latitude": "51.047599", "longitude": "3.729944"},
        "parking_type": "ON_STREET",
        "evses": [{
            "uid": "3256",
            "evse_id": "BE*BEC*E041503001",
            "status": "AVAILABLE",
            "capabilities": ["RESERVABLE"],
            "connectors": [{
                "id": "1",
                "standard": "IEC_62196_T2",
                "format": "CABLE",
                "power_type": "AC_3_PHASE",
                "max_voltage": 220,
                "max_amperage": 16,
                "tariff_ids": ["11"],
                "last_updated": "2015-03-16T10:10:02.000Z"
            }],
            "floor_level": "-1",
            "physical_reference": "1",
            "last_updated": "2015-06-28T08:12:01.000Z"
        }],
        "operator": {"name": "BeCharged"},
        "facilities": ["HOTEL"],
        "time_zone": "Europe/Brussels",
        "opening_times": {"twentyfourseven": true},
        "charging_when_closed": true,
        "last_updated": "2020-09-21T00:00:00.000Z"
    })
}

fn location() -> Location {
    Location::from_json(&location_json(), &IdentityFragment::new()).unwrap()
}

fn ts(s: &str) -> Timestamp {
    Timestamp::parse(s).unwrap()
}

// ──────────────────────────────────────────────
// 1. Parsing
// ──────────────────────────────────────────────

#[test]
fn parses_full_location() {
    let location = location();
    assert_eq!(location.identity().to_string(), "DE/ALL/LOC0001");
    assert_eq!(location.parking_type, Some(ParkingType::OnStreet));
    assert_eq!(location.facilities, vec![Facility::Hotel]);
    assert_eq!(location.evses.len(), 1);
    assert_eq!(location.evses[0].connectors[0].tariff_ids, vec!["11"]);
    assert_eq!(location.last_updated, ts("2020-09-21T00:00:00Z"));
}

#[test]
fn identity_may_come_from_the_path_only() {
    let mut doc = location_json();
    let body = doc.as_object_mut().unwrap();
    body.remove("country_code");
    body.remove("party_id");
    body.remove("id");

    let path = IdentityFragment::new()
        .with_country_code("NL".parse().unwrap())
        .with_party_id("TNM".parse().unwrap())
        .with_id("LOC9");
    let location = Location::from_json(&doc, &path).unwrap();
    assert_eq!(location.identity().to_string(), "NL/TNM/LOC9");
}

#[test]
fn conflicting_country_code_is_an_identity_error() {
    let path = IdentityFragment::new().with_country_code("FR".parse::<CountryCode>().unwrap());
    let err = Location::from_json(&location_json(), &path).unwrap_err();
    match err.failure {
        ParseFailure::Identity(IdentityError::ConflictingComponent { component, .. }) => {
            assert_eq!(component, IdentityComponent::CountryCode)
        }
        other => panic!("expected identity conflict, got {:?}", other),
    }
}

#[test]
fn missing_identity_everywhere_names_the_component() {
    let mut doc = location_json();
    doc.as_object_mut().unwrap().remove("party_id");
    let err = Location::from_json(&doc, &IdentityFragment::new()).unwrap_err();
    assert_eq!(
        err.failure,
        ParseFailure::Identity(IdentityError::MissingComponent(IdentityComponent::PartyId))
    );
}

#[test]
fn each_missing_mandatory_field_is_named() {
    for field in ["publish", "address", "city", "country", "coordinates", "time_zone"] {
        let mut doc = location_json();
        doc.as_object_mut().unwrap().remove(field);
        let err = Location::from_json(&doc, &IdentityFragment::new()).unwrap_err();
        assert_eq!(err.failure.field(), Some(field), "removing {}", field);
        assert_eq!(
            err.to_string(),
            format!(
                "The given JSON representation of a Location is invalid: \"{}\": missing",
                field
            )
        );
    }
}

#[test]
fn null_mandatory_field_counts_as_missing() {
    let mut doc = location_json();
    doc["city"] = Value::Null;
    let err = Location::from_json(&doc, &IdentityFragment::new()).unwrap_err();
    assert_eq!(err.failure.field(), Some("city"));
}

#[test]
fn first_error_in_declaration_order_wins() {
    let mut doc = location_json();
    doc["publish"] = json!("yes");
    doc.as_object_mut().unwrap().remove("time_zone");
    let err = Location::from_json(&doc, &IdentityFragment::new()).unwrap_err();
    assert_eq!(err.failure.field(), Some("publish"));
}

#[test]
fn deep_errors_keep_their_path() {
    let mut doc = location_json();
    doc["evses"][0]["connectors"][0]["max_voltage"] = json!(-5);
    let err = Location::from_json(&doc, &IdentityFragment::new()).unwrap_err();
    assert_eq!(err.failure.field(), Some("evses"));
    assert!(err
        .to_string()
        .contains("\"evses[0].connectors[0].max_voltage\""));
}

#[test]
fn invalid_text_is_reported_as_such() {
    let err = Location::parse("{not json", &IdentityFragment::new()).unwrap_err();
    assert!(matches!(err.failure, ParseFailure::InvalidText(_)));
    assert!(err.to_string().contains("invalid text representation"));
}

#[test]
fn absent_last_updated_is_stamped_now() {
    let mut doc = location_json();
    doc.as_object_mut().unwrap().remove("last_updated");
    let before = Timestamp::now();
    let location = Location::from_json(&doc, &IdentityFragment::new()).unwrap();
    assert!(location.last_updated >= before);
}

// ──────────────────────────────────────────────
// 2. Serialization
// ──────────────────────────────────────────────

#[test]
fn renders_canonical_form() {
    let location = location();
    assert_eq!(location.to_json(), location_json());
    let text = location.to_canonical_string();
    assert!(text.starts_with("{\"country_code\":\"DE\",\"party_id\":\"ALL\",\"id\":\"LOC0001\""));
    assert!(text.ends_with("\"last_updated\":\"2020-09-21T00:00:00.000Z\"}"));
}

#[test]
fn round_trips_through_text() {
    let location = location();
    let text = location.to_canonical_string();
    let reparsed = Location::parse(&text, &IdentityFragment::new()).unwrap();
    assert_eq!(reparsed, location);
    assert_eq!(reparsed.to_canonical_string(), text);
}

#[test]
fn pretty_and_compact_forms_agree() {
    let location = location();
    let pretty = serde_json::to_string_pretty(&location.to_json()).unwrap();
    let reparsed = Location::parse(&pretty, &IdentityFragment::new()).unwrap();
    assert_eq!(reparsed, location);
}

// ──────────────────────────────────────────────
// 3. Patching
// ──────────────────────────────────────────────

#[test]
fn immutable_country_code_is_rejected() {
    let location = location();
    let outcome = location.patch(&json!({"country_code": "FR"}));

    assert!(!outcome.is_success());
    assert_eq!(
        outcome.error().map(ToString::to_string).as_deref(),
        Some("Patching the 'country code' of a charging location is not allowed!")
    );
    assert_eq!(outcome.patched().country_code.as_str(), "DE");
    assert_eq!(outcome.patched().last_updated, location.last_updated);
}

#[test]
fn immutable_id_is_rejected_even_with_a_timestamp() {
    let location = location();
    let outcome = location.patch(&json!({"id": "2", "last_updated": "2020-10-15T00:00:00Z"}));

    let error = outcome.error().unwrap();
    assert!(error.to_string().contains("identification"));
    assert_eq!(error.field(), Some("id"));
    assert_eq!(outcome.patched().id, "LOC0001");
    assert_eq!(
        outcome.patched().last_updated.to_string(),
        "2020-09-21T00:00:00.000Z"
    );
}

#[test]
fn patching_identity_to_its_own_value_still_fails() {
    let outcome = location().patch(&json!({"party_id": "ALL"}));
    assert!(matches!(
        outcome.error(),
        Some(PatchError::Immutable { field: "party_id", .. })
    ));
}

#[test]
fn null_clears_an_optional_field() {
    let outcome = location().patch(&json!({
        "name": null,
        "last_updated": "2020-10-15T00:00:00Z"
    }));

    assert!(outcome.is_success());
    assert_eq!(outcome.patched().name, None);
    assert_eq!(
        outcome.patched().last_updated.to_string(),
        "2020-10-15T00:00:00.000Z"
    );
    assert!(outcome.patched().to_json().get("name").is_none());
}

#[test]
fn null_on_a_mandatory_field_is_rejected() {
    let location = location();
    let outcome = location.patch(&json!({"city": null}));
    assert_eq!(
        outcome.error().map(ToString::to_string).as_deref(),
        Some("Invalid JSON merge patch for a charging location: 'city' must not be null!")
    );
    assert_eq!(outcome.patched(), &location);
}

#[test]
fn missing_timestamp_stamps_now() {
    let before = Timestamp::now();
    let outcome = location().patch(&json!({"name": "X"}));
    let after = Timestamp::now();

    assert!(outcome.is_success());
    assert_eq!(outcome.patched().name.as_deref(), Some("X"));
    let stamped = outcome.patched().last_updated;
    assert!(before <= stamped && stamped <= after);
}

#[test]
fn facilities_are_replaced_in_order_then_cleared() {
    let outcome = location().patch(&json!({"facilities": ["CAFE", "AIRPORT"]}));
    assert_eq!(
        outcome.patched().facilities,
        vec![Facility::Cafe, Facility::Airport]
    );

    let cleared = outcome.patched().patch(&json!({"facilities": null}));
    assert!(cleared.is_success());
    assert!(cleared.patched().facilities.is_empty());
}

#[test]
fn malformed_collection_element_names_the_field() {
    let location = location();
    let outcome = location.patch(&json!({"facilities": ["CAFE", "SPACEPORT"]}));
    let error = outcome.error().unwrap();
    assert_eq!(error.field(), Some("facilities"));
    assert!(error.to_string().contains("\"facilities[1]\": unsupported value 'SPACEPORT'"));
    assert_eq!(outcome.patched(), &location);
}

#[test]
fn wrong_shape_is_rejected() {
    let outcome = location().patch(&json!({"coordinates": "51.0,3.7"}));
    assert!(matches!(
        outcome.error(),
        Some(PatchError::InvalidShape { field: "coordinates", found: "string", .. })
    ));
}

#[test]
fn nested_objects_merge_instead_of_replacing() {
    let outcome = location().patch(&json!({
        "operator": {"website": "https://becharged.example"},
        "last_updated": "2020-10-15T00:00:00Z"
    }));
    let operator = outcome.patched().operator.clone().unwrap();
    assert_eq!(operator.name, "BeCharged");
    assert_eq!(operator.website.as_deref(), Some("https://becharged.example"));
}

#[test]
fn unparsable_timestamp_fails_the_whole_patch() {
    let location = location();
    let outcome = location.patch(&json!({"name": "X", "last_updated": "last tuesday"}));
    assert!(matches!(
        outcome.error(),
        Some(PatchError::InvalidTimestamp { .. })
    ));
    assert_eq!(outcome.patched().name.as_deref(), Some("Gent Zuid"));
}

#[test]
fn null_timestamp_is_unparsable() {
    let outcome = location().patch(&json!({"last_updated": null}));
    assert!(matches!(
        outcome.error(),
        Some(PatchError::InvalidTimestamp { .. })
    ));
}

#[test]
fn evses_are_replaced_wholesale() {
    let outcome = location().patch(&json!({"evses": [{
        "uid": "9999",
        "status": "PLANNED",
        "connectors": [{
            "id": "A",
            "standard": "CHADEMO",
            "format": "CABLE",
            "power_type": "DC",
            "max_voltage": 500,
            "max_amperage": 125
        }]
    }]}));
    assert!(outcome.is_success());
    assert!(outcome.patched().evse("3256").is_none());
    assert!(outcome.patched().evse("9999").is_some());
}

#[test]
fn unknown_keys_are_ignored() {
    let outcome = location().patch(&json!({
        "color": "green",
        "last_updated": "2020-10-15T00:00:00Z"
    }));
    assert!(outcome.is_success());
    assert!(outcome.patched().to_json().get("color").is_none());
}

#[test]
fn patch_leaves_the_original_untouched() {
    let location = location();
    let snapshot = location.clone();
    let _ = location.patch(&json!({"name": "Renamed"}));
    assert_eq!(location, snapshot);
}

#[test]
fn patched_entity_survives_a_round_trip() {
    let outcome = location().patch(&json!({
        "facilities": ["WIFI"],
        "last_updated": "2020-10-15T00:00:00Z"
    }));
    let patched = outcome.into_patched();
    let text = patched.to_canonical_string();
    assert_eq!(Location::parse(&text, &IdentityFragment::new()).unwrap(), patched);
}

#[test]
fn identity_ordering_groups_by_party() {
    let a = location();
    let mut b = location();
    b.id = "LOC0002".to_string();
    let mut c = location();
    c.country_code = "BE".parse().unwrap();

    let mut all = vec![b.clone(), a.clone(), c.clone()];
    all.sort_by(|x, y| x.cmp_identity(y));
    let ids: Vec<String> = all.iter().map(|l| l.identity().to_string()).collect();
    assert_eq!(ids, vec!["BE/ALL/LOC0001", "DE/ALL/LOC0001", "DE/ALL/LOC0002"]);
    assert!(!a.same_identity(&b));
}
