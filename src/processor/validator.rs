use serde_json::Value;
use tracing::debug;

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;
pub const MIN_MAGNITUDE: f64 = -10.0;
pub const MAX_MAGNITUDE: f64 = 12.0;
pub const MIN_CDI: f64 = 0.0;
pub const MAX_CDI: f64 = 12.0;
pub const MIN_DEPTH: f64 = -100.0;
pub const MAX_DEPTH: f64 = 1000.0;

pub fn is_valid_latitude(value: &Value) -> bool {
    in_range("latitude", value, MIN_LATITUDE, MAX_LATITUDE)
}

pub fn is_valid_longitude(value: &Value) -> bool {
    in_range("longitude", value, MIN_LONGITUDE, MAX_LONGITUDE)
}

pub fn is_valid_magnitude(value: &Value) -> bool {
    in_range("magnitude", value, MIN_MAGNITUDE, MAX_MAGNITUDE)
}

pub fn is_valid_cdi(value: &Value) -> bool {
    in_range("cdi", value, MIN_CDI, MAX_CDI)
}

pub fn is_valid_depth(value: &Value) -> bool {
    in_range("depth", value, MIN_DEPTH, MAX_DEPTH)
}

/// Only JSON numbers qualify; booleans, strings and null never do.
fn in_range(field: &str, value: &Value, min: f64, max: f64) -> bool {
    match value {
        Value::Number(n) => n.as_f64().is_some_and(|v| (min..=max).contains(&v)),
        other => {
            debug!("Invalid {} type: {}", field, type_name(other));
            false
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_latitude_boundaries() {
        assert!(is_valid_latitude(&json!(90.0)));
        assert!(is_valid_latitude(&json!(-90)));
        assert!(!is_valid_latitude(&json!(90.0001)));
        assert!(!is_valid_latitude(&json!(-90.0001)));
    }

    #[test]
    fn test_magnitude_boundaries() {
        assert!(is_valid_magnitude(&json!(12.0)));
        assert!(is_valid_magnitude(&json!(-10)));
        assert!(!is_valid_magnitude(&json!(12.0001)));
    }

    #[test]
    fn test_longitude_cdi_and_depth_ranges() {
        assert!(is_valid_longitude(&json!(-180)));
        assert!(!is_valid_longitude(&json!(180.5)));
        assert!(is_valid_cdi(&json!(0)));
        assert!(!is_valid_cdi(&json!(-0.1)));
        assert!(is_valid_depth(&json!(1000)));
        assert!(is_valid_depth(&json!(-100.0)));
        assert!(!is_valid_depth(&json!(1000.5)));
    }

    #[test]
    fn test_non_numeric_values_are_rejected() {
        for value in [json!("45"), json!(true), json!(null), json!([1.0]), json!({"v": 1})] {
            assert!(!is_valid_latitude(&value), "{value} accepted");
            assert!(!is_valid_longitude(&value), "{value} accepted");
            assert!(!is_valid_magnitude(&value), "{value} accepted");
            assert!(!is_valid_cdi(&value), "{value} accepted");
            assert!(!is_valid_depth(&value), "{value} accepted");
        }
    }

    #[test]
    fn test_predicates_are_repeatable() {
        let value = json!(12.0001);
        assert_eq!(is_valid_magnitude(&value), is_valid_magnitude(&value));
        let value = json!(45.5);
        assert_eq!(is_valid_latitude(&value), is_valid_latitude(&value));
    }
}
