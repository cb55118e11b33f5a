// driftwatch-core/src/domain/trigger.rs

// Trigger descriptors: "an object landed at <source>/<key>".
// The batch accepts the object-storage notification envelope as well as a
// flat list of events.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical address of a dataset: a source (bucket) and an object key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetLocation {
    pub source: String,
    pub key: String,
}

impl DatasetLocation {
    pub fn new(source: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for DatasetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.source, self.key)
    }
}

pub type TriggerEvent = DatasetLocation;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TriggerBatch {
    pub events: Vec<TriggerEvent>,
}

impl TriggerBatch {
    pub fn single(event: TriggerEvent) -> Self {
        Self {
            events: vec![event],
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

// --- WIRE FORMATS ---

#[derive(Deserialize)]
struct BucketRef {
    name: String,
}

#[derive(Deserialize)]
struct ObjectRef {
    key: String,
}

#[derive(Deserialize)]
struct StorageNotification {
    bucket: BucketRef,
    object: ObjectRef,
}

#[derive(Deserialize)]
struct NotificationRecord {
    s3: StorageNotification,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BatchWire {
    Notification {
        #[serde(rename = "Records")]
        records: Vec<NotificationRecord>,
    },
    Plain {
        events: Vec<TriggerEvent>,
    },
}

impl<'de> Deserialize<'de> for TriggerBatch {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let events = match BatchWire::deserialize(deserializer)? {
            BatchWire::Notification { records } => records
                .into_iter()
                .map(|r| DatasetLocation::new(r.s3.bucket.name, r.s3.object.key))
                .collect(),
            BatchWire::Plain { events } => events,
        };
        Ok(Self { events })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_parses_storage_notification() -> Result<()> {
        let raw = r#"{
            "Records": [
                {"s3": {"bucket": {"name": "cur-data"}, "object": {"key": "2024/05/batch.csv", "size": 12}}},
                {"s3": {"bucket": {"name": "other"}, "object": {"key": "x.csv"}}}
            ]
        }"#;

        let batch: TriggerBatch = serde_json::from_str(raw)?;
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.events[0], DatasetLocation::new("cur-data", "2024/05/batch.csv"));
        assert_eq!(batch.events[1].to_string(), "other/x.csv");
        Ok(())
    }

    #[test]
    fn test_parses_plain_events() -> Result<()> {
        let raw = r#"{"events": [{"source": "cur-data", "key": "a.csv"}]}"#;
        let batch: TriggerBatch = serde_json::from_str(raw)?;
        assert_eq!(batch, TriggerBatch::single(DatasetLocation::new("cur-data", "a.csv")));
        Ok(())
    }

    #[test]
    fn test_rejects_unknown_shape() {
        let res: Result<TriggerBatch, _> = serde_json::from_str(r#"{"files": []}"#);
        assert!(res.is_err());
    }
}
