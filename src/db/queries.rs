pub const SELECT_ALERT_ID: &str = r#"
SELECT alert_id FROM alerts WHERE alert_type = $1;
"#;

pub const SELECT_MAGNITUDE_TYPE_ID: &str = r#"
SELECT magnitude_id FROM magnitude_types WHERE magnitude_type = $1;
"#;

pub const SELECT_NETWORK_ID: &str = r#"
SELECT network_id FROM networks WHERE network_name = $1;
"#;

pub const SELECT_EVENT_TYPE_ID: &str = r#"
SELECT type_id FROM event_types WHERE type_name = $1;
"#;

/// Prefix for the multi-row insert; the VALUES list is appended per batch.
pub const INSERT_EARTHQUAKES: &str = r#"
INSERT INTO earthquakes (
    event_id, time, tsunami, felt_report_count, magnitude, cdi,
    latitude, longitude, depth, place, detail_url,
    alert_id, magnitude_id, network_id, type_id
) "#;

pub const INSERT_EARTHQUAKES_SUFFIX: &str = r#"
ON CONFLICT (event_id) DO NOTHING
RETURNING earthquake_id, event_id, created_at
"#;

pub const SELECT_REGIONS_CONTAINING: &str = r#"
SELECT region_name, min_latitude, max_latitude, min_longitude, max_longitude
FROM regions
WHERE $1 BETWEEN min_latitude AND max_latitude
  AND $2 BETWEEN min_longitude AND max_longitude
ORDER BY region_name;
"#;

pub const SELECT_TOPIC_ARN: &str = r#"
SELECT topic_arn FROM topics WHERE topic_name = $1;
"#;
