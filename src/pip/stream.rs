//! Lazy, one-shot feature sequence over a GeoJSON FeatureCollection.
//!
//! The collection is parsed incrementally on a blocking worker. Only the
//! `features` array is descended into; each element is decoded on its own
//! and handed over a bounded channel, so at most a handful of features are
//! in memory at a time. Closing the stream closes the channel, which aborts
//! the parse at the next hand-off and drops the underlying reader.

use std::fmt;
use std::io::Read;

use geojson::Feature;
use serde::de::{self, DeserializeSeed, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserializer as _;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{LookupError, Result};

/// Features buffered between the parser and the consumer
const CHANNEL_CAPACITY: usize = 8;

/// Marker error used to unwind the parser once the consumer has gone away
const CONSUMER_CLOSED: &str = "feature consumer closed";

type FeatureSender = mpsc::Sender<Result<Feature>>;

/// A lazy sequence of features read from one dataset.
///
/// Not restartable. Dropping the stream cancels the producer; `close`
/// additionally waits for it to release its reader.
pub struct FeatureStream {
    dataset: String,
    rx: mpsc::Receiver<Result<Feature>>,
    producer: Option<JoinHandle<()>>,
}

impl FeatureStream {
    /// Start streaming features out of `reader`.
    ///
    /// `dataset` names the source in logs and errors. Must be called from
    /// within a tokio runtime.
    pub fn from_reader<R>(reader: R, dataset: impl Into<String>) -> Self
    where
        R: Read + Send + 'static,
    {
        let dataset = dataset.into();
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        let name = dataset.clone();
        let producer = tokio::task::spawn_blocking(move || produce(reader, &name, tx));

        Self {
            dataset,
            rx,
            producer: Some(producer),
        }
    }

    /// Name of the dataset being streamed
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// Next feature, `None` once the collection is exhausted.
    pub async fn next(&mut self) -> Option<Result<Feature>> {
        self.rx.recv().await
    }

    /// Stop the producer without consuming further input and wait until it
    /// has dropped its reader.
    pub async fn close(mut self) {
        self.rx.close();
        if let Some(producer) = self.producer.take() {
            if let Err(e) = producer.await {
                warn!("Feature producer for {} failed: {}", self.dataset, e);
            }
        }
    }
}

impl Drop for FeatureStream {
    fn drop(&mut self) {
        // Wakes a producer blocked on a full channel; it unwinds on its own.
        self.rx.close();
    }
}

impl fmt::Debug for FeatureStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureStream")
            .field("dataset", &self.dataset)
            .finish_non_exhaustive()
    }
}

/// Parse the collection, forwarding features until done or cancelled
fn produce<R: Read>(reader: R, dataset: &str, tx: FeatureSender) {
    let mut deserializer = serde_json::Deserializer::from_reader(reader);

    let outcome = (&mut deserializer)
        .deserialize_map(CollectionVisitor { tx: &tx })
        .and_then(|found| deserializer.end().map(|_| found));

    if tx.is_closed() {
        debug!("Stopped reading {} after consumer closed", dataset);
        return;
    }

    let reason = match outcome {
        Ok(true) => return,
        Ok(false) => "missing \"features\" array".to_string(),
        Err(e) => e.to_string(),
    };

    let _ = tx.blocking_send(Err(LookupError::DatasetCorrupt {
        dataset: dataset.to_string(),
        reason,
    }));
}

/// Walks the top-level object, streaming `features` and skipping the rest.
/// Yields whether a `features` member was seen.
struct CollectionVisitor<'a> {
    tx: &'a FeatureSender,
}

impl<'de> Visitor<'de> for CollectionVisitor<'_> {
    type Value = bool;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a GeoJSON FeatureCollection object")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<bool, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut found = false;
        while let Some(key) = map.next_key::<String>()? {
            if key == "features" {
                map.next_value_seed(FeatureSink { tx: self.tx })?;
                found = true;
            } else {
                map.next_value::<IgnoredAny>()?;
            }
        }
        Ok(found)
    }
}

/// Decodes the `features` array one element at a time
struct FeatureSink<'a> {
    tx: &'a FeatureSender,
}

impl<'de> DeserializeSeed<'de> for FeatureSink<'_> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<(), D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_seq(self)
    }
}

impl<'de> Visitor<'de> for FeatureSink<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an array of GeoJSON features")
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<(), A::Error>
    where
        A: SeqAccess<'de>,
    {
        while let Some(feature) = seq.next_element::<Feature>()? {
            if self.tx.blocking_send(Ok(feature)).is_err() {
                return Err(de::Error::custom(CONSUMER_CLOSED));
            }
        }
        Ok(())
    }
}
