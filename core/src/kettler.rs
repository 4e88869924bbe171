use crate::error::{K2Error, Result};
use crate::telemetry::KettlerData;

/// Decode the serial `ST` reply of a Kettler ergometer.
///
/// Columns: pulse cadence speed distance destPower energy timeElapsed realPower,
/// e.g. `000 052 095 000 030 0001 00:12 030`. Speed and distance come in
/// tenths (km/h, km). Pulse is dropped.
pub fn decode_status(line: &str) -> Result<KettlerData> {
    let cols: Vec<&str> = line.split_whitespace().collect();
    if cols.len() != 8 {
        return Err(K2Error::BadStatusLine(line.trim().to_string()));
    }

    let num = |s: &str| -> Result<f64> {
        s.parse::<u32>()
            .map(f64::from)
            .map_err(|_| K2Error::BadStatusLine(line.trim().to_string()))
    };

    Ok(KettlerData {
        cadence: Some(num(cols[1])?),
        speed: Some(num(cols[2])? / 10.0),
        distance: Some(num(cols[3])? / 10.0),
        dest_power: Some(num(cols[4])?),
        energy: Some(num(cols[5])?),
        time_elapsed: Some(cols[6].to_string()),
        real_power: Some(num(cols[7])?),
        calc_distance: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_reference_line() {
        let d = decode_status("000 052 095 000 030 0001 00:12 030").unwrap();
        assert_eq!(d.cadence, Some(52.0));
        assert_eq!(d.speed, Some(9.5));
        assert_eq!(d.distance, Some(0.0));
        assert_eq!(d.dest_power, Some(30.0));
        assert_eq!(d.energy, Some(1.0));
        assert_eq!(d.time_elapsed.as_deref(), Some("00:12"));
        assert_eq!(d.real_power, Some(30.0));
    }

    #[test]
    fn rejects_short_or_garbled_lines() {
        assert!(matches!(decode_status("ACK"), Err(K2Error::BadStatusLine(_))));
        assert!(decode_status("000 05x 095 000 030 0001 00:12 030").is_err());
    }
}
