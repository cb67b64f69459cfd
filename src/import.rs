// OCR detections arrive as a flat JSON object of item name to count.

use crate::conversion::MAX_QUANTITY;
use crate::model::ItemKind;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read detections: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed detections: {0}")]
    Json(#[from] serde_json::Error),

    #[error("detections must be a JSON object of item name to count")]
    NotAnObject,
}

pub fn parse_detections(json: &str) -> Result<HashMap<ItemKind, u64>, ImportError> {
    let value: Value = serde_json::from_str(json)?;
    let Value::Object(entries) = value else {
        return Err(ImportError::NotAnObject);
    };

    let mut detected = HashMap::new();
    for (name, count) in entries {
        let Some(kind) = ItemKind::from_name(&name) else {
            debug!(item = %name, "ignoring detection for unknown item");
            continue;
        };
        let Some(count) = count_from(&count) else {
            debug!(item = %name, "ignoring non-numeric detection");
            continue;
        };
        detected.insert(kind, count.min(MAX_QUANTITY));
    }
    Ok(detected)
}

pub fn load_detections<P: AsRef<Path>>(path: P) -> Result<HashMap<ItemKind, u64>, ImportError> {
    let data = std::fs::read_to_string(path)?;
    parse_detections(&data)
}

fn count_from(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    if let Some(n) = value.as_i64() {
        return Some(n.max(0) as u64);
    }
    let f = value.as_f64()?;
    if f.is_finite() && f > 0.0 {
        Some(f.trunc() as u64)
    } else {
        Some(0)
    }
}
