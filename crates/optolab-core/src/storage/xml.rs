//! XML documents as serde values.
//!
//! Lab manifests written for the earlier tooling are tag based:
//!
//! ```xml
//! <appli>
//!     <name>Machine Vision</name>
//!     <module><name>default</name></module>
//!     <module name="images" location="modules/images"/>
//! </appli>
//! ```
//!
//! The root element becomes an object. A child holding only text becomes a
//! string field, a child with children or attributes becomes a nested object,
//! and a tag repeated under one parent becomes an array. Attributes are
//! fields like child elements.
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

type XmlError = Box<dyn std::error::Error + Send + Sync + 'static>;

struct Element {
    name: String,
    fields: Map<String, Value>,
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self, XmlError> {
        let mut fields = Map::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            fields.insert(key, Value::String(attr.unescape_value()?.into_owned()));
        }
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        Ok(Self { name, fields, text: String::new() })
    }

    fn close(mut self) -> (String, Value) {
        let text = self.text.trim();
        let value = if self.fields.is_empty() {
            // `<logo/>` reads as an absent value
            if self.text.is_empty() { Value::Null } else { Value::String(text.to_string()) }
        } else {
            if !text.is_empty() {
                self.fields.insert("$text".to_string(), Value::String(text.to_string()));
            }
            Value::Object(self.fields)
        };
        (self.name, value)
    }
}

fn insert_child(fields: &mut Map<String, Value>, name: String, value: Value) {
    match fields.get_mut(&name) {
        // Element values are never arrays, so an array here is a repeated tag
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            fields.insert(name, value);
        }
    }
}

/// Parse `data` into the value of its root element
pub fn to_value(data: &str) -> Result<Value, XmlError> {
    let mut reader = Reader::from_str(data);
    let mut stack: Vec<Element> = Vec::new();
    let mut root = None;

    loop {
        let closed = match reader.read_event()? {
            Event::Start(start) => {
                stack.push(Element::open(&start)?);
                None
            }
            Event::Empty(start) => Some(Element::open(&start)?.close()),
            Event::End(_) => stack.pop().map(Element::close),
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text.unescape()?);
                }
                None
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
                None
            }
            Event::Eof => break,
            _ => None,
        };
        if let Some((name, value)) = closed {
            match stack.last_mut() {
                Some(parent) => insert_child(&mut parent.fields, name, value),
                None if root.is_none() => root = Some(value),
                None => return Err(format!("second root element <{}>", name).into()),
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(format!("unclosed element <{}>", open.name).into());
    }
    root.ok_or_else(|| "document has no root element".into())
}
