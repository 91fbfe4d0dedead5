//! Implements envelope containers.
//!
//! Envelopes are containers for payloads sent together in one request. They carry a JSON header
//! line followed by any number of items, each of which has its own header line and a payload.
//!
//! ```plain
//! {"event_id":"9ec79c33ec9942ab8353589fcb2e04dc"}
//! {"type":"transaction","length":41}
//! {"message":"hello world","level":"error"}
//! {"type":"profile","length":2}
//! {}
//! ```
//!
//! The profiling integration inspects the transaction items of an outgoing envelope and appends
//! the profiles recorded for them.

use std::collections::BTreeMap;
use std::io::{self, Write};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

mod item;

pub use self::item::*;

/// Content type of JSON item payloads.
pub const CONTENT_TYPE_JSON: &str = "application/json";

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("unexpected end of file")]
    UnexpectedEof,
    #[error("missing envelope header")]
    MissingHeader,
    #[error("missing newline after header or payload")]
    MissingNewline,
    #[error("invalid envelope header")]
    InvalidHeader(#[source] serde_json::Error),
    #[error("invalid item header")]
    InvalidItemHeader(#[source] serde_json::Error),
    #[error("failed to write header")]
    HeaderIoFailed(#[source] serde_json::Error),
    #[error("failed to write payload")]
    PayloadIoFailed(#[source] io::Error),
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EnvelopeHeaders {
    /// Unique identifier of the event associated to this envelope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,

    /// Other attributes for forward compatibility.
    #[serde(flatten)]
    other: BTreeMap<String, serde_json::Value>,
}

pub type Items = SmallVec<[Item; 3]>;
pub type ItemIter<'a> = std::slice::Iter<'a, Item>;
pub type ItemIterMut<'a> = std::slice::IterMut<'a, Item>;

#[derive(Clone, Debug, Default)]
pub struct Envelope {
    headers: EnvelopeHeaders,
    items: Items,
}

impl Envelope {
    /// Creates an envelope without items for the given event.
    pub fn new(event_id: Option<String>) -> Self {
        Self {
            headers: EnvelopeHeaders {
                event_id,
                other: BTreeMap::new(),
            },
            items: Items::new(),
        }
    }

    /// Parses an envelope from bytes.
    pub fn parse_bytes(bytes: Bytes) -> Result<Self, EnvelopeError> {
        let (headers, offset) = Self::parse_headers(&bytes)?;
        let items = Self::parse_items(&bytes, offset)?;

        Ok(Envelope { headers, items })
    }

    /// Returns reference to the [`EnvelopeHeaders`].
    pub fn headers(&self) -> &EnvelopeHeaders {
        &self.headers
    }

    /// Unique identifier of the event associated to this envelope.
    pub fn event_id(&self) -> Option<&str> {
        self.headers.event_id.as_deref()
    }

    /// Returns the number of items in this envelope.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if this envelope does not contain any items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns an iterator over items in this envelope.
    pub fn items(&self) -> ItemIter<'_> {
        self.items.iter()
    }

    /// Returns a mutable iterator over items in this envelope.
    pub fn items_mut(&mut self) -> ItemIterMut<'_> {
        self.items.iter_mut()
    }

    /// Returns an option with a reference to the first item that matches
    /// the predicate, or None if the predicate is not matched by any item.
    pub fn get_item_by<F>(&self, mut pred: F) -> Option<&Item>
    where
        F: FnMut(&Item) -> bool,
    {
        self.items().find(|item| pred(item))
    }

    /// Adds a new item to this envelope.
    pub fn add_item(&mut self, item: Item) {
        self.items.push(item)
    }

    /// Retains only the items specified by the predicate.
    ///
    /// In other words, remove all elements where `f(&item)` returns `false`. This method operates
    /// in place and preserves the order of the retained items.
    pub fn retain_items<F>(&mut self, f: F)
    where
        F: FnMut(&mut Item) -> bool,
    {
        self.items.retain(f)
    }

    /// Serializes this envelope into the given writer.
    pub fn serialize<W>(&self, mut writer: W) -> Result<(), EnvelopeError>
    where
        W: Write,
    {
        serde_json::to_writer(&mut writer, &self.headers).map_err(EnvelopeError::HeaderIoFailed)?;
        write(&mut writer, b"\n")?;

        for item in &self.items {
            serde_json::to_writer(&mut writer, &item.headers)
                .map_err(EnvelopeError::HeaderIoFailed)?;
            write(&mut writer, b"\n")?;

            write(&mut writer, &item.payload)?;
            write(&mut writer, b"\n")?;
        }

        Ok(())
    }

    /// Serializes this envelope into a buffer.
    pub fn to_vec(&self) -> Result<Vec<u8>, EnvelopeError> {
        let mut vec = Vec::new();
        self.serialize(&mut vec)?;
        Ok(vec)
    }

    fn parse_headers(slice: &[u8]) -> Result<(EnvelopeHeaders, usize), EnvelopeError> {
        let mut stream = serde_json::Deserializer::from_slice(slice).into_iter();

        let headers = match stream.next() {
            None => return Err(EnvelopeError::MissingHeader),
            Some(Err(error)) => return Err(EnvelopeError::InvalidHeader(error)),
            Some(Ok(headers)) => headers,
        };

        // Each header is terminated by a UNIX newline.
        require_termination(slice, stream.byte_offset())?;

        Ok((headers, stream.byte_offset() + 1))
    }

    fn parse_items(bytes: &Bytes, mut offset: usize) -> Result<Items, EnvelopeError> {
        let mut items = Items::new();

        while offset < bytes.len() {
            let (item, item_size) = Item::parse(bytes.slice(offset..))?;
            offset += item_size;
            items.push(item);
        }

        Ok(items)
    }
}

fn write<W>(mut writer: W, buf: &[u8]) -> Result<(), EnvelopeError>
where
    W: Write,
{
    writer
        .write_all(buf)
        .map_err(EnvelopeError::PayloadIoFailed)
}

fn require_termination(slice: &[u8], offset: usize) -> Result<(), EnvelopeError> {
    match slice.get(offset) {
        Some(&b'\n') | None => Ok(()),
        Some(_) => Err(EnvelopeError::MissingNewline),
    }
}
