use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// GeoJSON document returned by the feed endpoint.
///
/// Features are kept as raw values so a single malformed feature can be
/// skipped without rejecting the whole document.
#[derive(Debug, Deserialize)]
pub struct FeedDocument {
    #[serde(default)]
    pub features: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    pub id: Option<String>,
    pub properties: Option<Properties>,
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
pub struct Properties {
    #[serde(default, deserialize_with = "parse_millis_option")]
    pub updated: Option<i64>,
    #[serde(default, deserialize_with = "parse_millis_option")]
    pub time: Option<i64>,
    pub detail: Option<String>,
    pub felt: Option<Value>,
    pub place: Option<String>,
    pub tsunami: Option<Value>,
    pub mag: Option<Value>,
    pub net: Option<String>,
    pub alert: Option<String>,
    #[serde(rename = "magType")]
    pub mag_type: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub cdi: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub coordinates: Vec<Value>,
}

impl Geometry {
    pub fn longitude(&self) -> Option<&Value> {
        self.coordinates.first()
    }

    pub fn latitude(&self) -> Option<&Value> {
        self.coordinates.get(1)
    }

    /// Depth is optional in GeoJSON positions; only a third element counts.
    pub fn depth(&self) -> Option<&Value> {
        self.coordinates.get(2)
    }
}

/// Epoch-millisecond timestamps occasionally arrive as floats or strings.
fn parse_millis_option<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Millis {
        Int(i64),
        Float(f64),
        String(String),
    }

    let v: Option<Millis> = Option::deserialize(deserializer)?;
    match v {
        Some(Millis::Int(i)) => Ok(Some(i)),
        Some(Millis::Float(f)) => Ok(Some(f as i64)),
        Some(Millis::String(s)) => {
            if s.trim().is_empty() {
                Ok(None)
            } else {
                s.trim().parse::<i64>().map(Some).map_err(serde::de::Error::custom)
            }
        }
        None => Ok(None),
    }
}
