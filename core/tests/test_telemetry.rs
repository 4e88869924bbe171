// tests/test_telemetry.rs
use k2_core::kettler::decode_status;
use k2_core::telemetry::{parse_status_message, MISSING};
use k2_core::{format_status, KettlerData};
use serde_json::json;

#[test]
fn serial_line_to_status_bar() {
    let data = decode_status("000 087 284 012 150 0042 05:31 148").unwrap();
    let view = format_status(&data);
    assert_eq!(view.time, "05:31");
    assert_eq!(view.distance, "1.2 km");
    assert_eq!(view.speed, "28.4 km/h");
    assert_eq!(view.cadence, "87");
    assert_eq!(view.power, "148 / 150 W");
    assert_eq!(view.energy, "42 kJ");
}

#[test]
fn any_subset_of_fields_renders() {
    let fields = [
        ("timeElapsed", json!("00:01")),
        ("distance", json!(0.1)),
        ("speed", json!(20.0)),
        ("cadence", json!(80)),
        ("realPower", json!(120)),
        ("destPower", json!(120)),
        ("energy", json!(3)),
    ];
    // every subset of the seven fields
    for mask in 0u32..(1 << fields.len()) {
        let mut payload = serde_json::Map::new();
        for (i, (k, v)) in fields.iter().enumerate() {
            if mask & (1 << i) != 0 {
                payload.insert(k.to_string(), v.clone());
            }
        }
        let body = json!({"payload": payload}).to_string();
        let msg = parse_status_message(body.as_bytes()).expect("status envelope");
        let view = format_status(&msg.payload);
        if mask & 1 == 0 {
            assert_eq!(view.time, MISSING);
        }
    }
}

#[test]
fn empty_reading_is_all_placeholders() {
    let view = format_status(&KettlerData::default());
    assert_eq!(view.distance, MISSING);
    assert_eq!(view.energy, MISSING);
    assert!(view.to_html().contains("<td>-- / -- W</td>"));
}
