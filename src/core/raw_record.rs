//! Raw event records as delivered by the OS subscription.
//!
//! The Security log hands the watcher heterogeneous property lists; this
//! module models them as an ordered sequence of loosely-typed values plus the
//! numeric event ID, which keeps the decoder independent of any one
//! platform's event-log API. The XML bridge converts `EvtRender` output into
//! a record using `roxmltree`.

use crate::util::error::{Result, WfpLogError};

/// One positional property of a raw event record.
///
/// The live subscription renders properties as text; typed variants exist so
/// embedders feeding pre-typed values (and tests) do not have to stringify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    UInt64(u64),
    UInt32(u32),
    Text(String),
    /// Property present in the schema but carrying no value.
    Null,
}

/// A raw, undecoded event record: numeric ID plus ordered properties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEventRecord {
    /// Numeric Security-log event ID.
    pub event_id: u32,
    /// Properties in schema order. Offsets are meaningful; names are not
    /// carried.
    pub properties: Vec<PropertyValue>,
}

impl RawEventRecord {
    /// Build a record from an event ID and ordered properties.
    pub fn new(event_id: u32, properties: Vec<PropertyValue>) -> Self {
        Self {
            event_id,
            properties,
        }
    }

    /// Text value at `offset`. Missing or `Null` properties yield `""`;
    /// numeric properties are stringified.
    pub fn text_at(&self, offset: usize) -> String {
        match self.properties.get(offset) {
            Some(PropertyValue::Text(s)) => s.clone(),
            Some(PropertyValue::UInt64(n)) => n.to_string(),
            Some(PropertyValue::UInt32(n)) => n.to_string(),
            Some(PropertyValue::Null) | None => String::new(),
        }
    }

    /// Unsigned 64-bit value at `offset`. Numeric text parses; any other
    /// shape defaults to 0 (the OS emits sentinel process IDs).
    pub fn u64_at(&self, offset: usize) -> u64 {
        match self.properties.get(offset) {
            Some(PropertyValue::UInt64(n)) => *n,
            Some(PropertyValue::UInt32(n)) => u64::from(*n),
            Some(PropertyValue::Text(s)) => s.trim().parse().unwrap_or(0),
            Some(PropertyValue::Null) | None => 0,
        }
    }

    /// Unsigned 32-bit value at `offset`, defaulting to 0 on any unexpected
    /// shape.
    pub fn u32_at(&self, offset: usize) -> u32 {
        match self.properties.get(offset) {
            Some(PropertyValue::UInt32(n)) => *n,
            Some(PropertyValue::UInt64(n)) => u32::try_from(*n).unwrap_or(0),
            Some(PropertyValue::Text(s)) => s.trim().parse().unwrap_or(0),
            Some(PropertyValue::Null) | None => 0,
        }
    }

    /// Port number at `offset`, parsed base-10.
    ///
    /// Unlike the other accessors this is a hard fault on malformed text: a
    /// port that does not parse means the record does not match the schema
    /// the decoder selected, which is worth surfacing rather than zeroing.
    pub fn port_at(&self, offset: usize) -> Result<u16> {
        match self.properties.get(offset) {
            Some(PropertyValue::UInt32(n)) => {
                u16::try_from(*n).map_err(|_| self.malformed_port(offset, n.to_string()))
            }
            Some(PropertyValue::UInt64(n)) => {
                u16::try_from(*n).map_err(|_| self.malformed_port(offset, n.to_string()))
            }
            Some(PropertyValue::Text(s)) => s
                .trim()
                .parse()
                .map_err(|_| self.malformed_port(offset, s.clone())),
            Some(PropertyValue::Null) | None => Err(self.malformed_port(offset, String::new())),
        }
    }

    fn malformed_port(&self, offset: usize, value: String) -> WfpLogError {
        WfpLogError::MalformedPort {
            event_id: self.event_id,
            offset,
            value,
        }
    }

    /// Parse an `EvtRender`-style event XML document into a raw record.
    ///
    /// Reads the event ID from `<System><EventID>` and the ordered `<Data>`
    /// children of `<EventData>` as positional text properties. `Name`
    /// attributes are ignored; document order is the schema order.
    pub fn from_event_xml(xml: &str) -> Result<Self> {
        let doc = roxmltree::Document::parse(xml)
            .map_err(|e| WfpLogError::XmlParse(format!("Failed to parse XML: {e}")))?;
        let root = doc.root_element();

        let system = find_child(&root, "System")
            .ok_or_else(|| WfpLogError::XmlParse("Missing <System> element".into()))?;

        let event_id: u32 = find_child(&system, "EventID")
            .and_then(|e| e.text())
            .and_then(|t| t.trim().parse().ok())
            .ok_or_else(|| WfpLogError::XmlParse("Missing or non-numeric <EventID>".into()))?;

        let mut properties = Vec::new();
        if let Some(event_data) = find_child(&root, "EventData") {
            for child in event_data
                .children()
                .filter(|n| n.is_element() && n.tag_name().name() == "Data")
            {
                let value = child.text().unwrap_or("").trim();
                if value.is_empty() {
                    properties.push(PropertyValue::Null);
                } else {
                    properties.push(PropertyValue::Text(value.to_string()));
                }
            }
        }

        Ok(Self {
            event_id,
            properties,
        })
    }
}

/// Find a direct child element by local name, ignoring namespace.
fn find_child<'a>(
    parent: &'a roxmltree::Node<'a, 'a>,
    local_name: &str,
) -> Option<roxmltree::Node<'a, 'a>> {
    parent
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == local_name)
}
