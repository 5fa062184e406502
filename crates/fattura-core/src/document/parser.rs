//! XML to element tree conversion using quick-xml.

use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use tracing::trace;

use super::{Document, Element, Result};
use crate::error::DocumentError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse raw bytes into a [`Document`].
///
/// The input must be well-formed XML with a single root element. Text is
/// decoded with the encoding named in the XML declaration, UTF-8 otherwise.
/// Comments and processing instructions are ignored.
pub fn parse_document(bytes: &[u8]) -> Result<Document> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = NsReader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let position = reader.buffer_position() as u64;
        let decoder = reader.decoder();

        match reader.read_resolved_event_into(&mut buf) {
            Ok((ns, Event::Start(e))) => {
                stack.push(open_element(ns, &e, decoder, position)?);
            }
            Ok((ns, Event::Empty(e))) => {
                let element = open_element(ns, &e, decoder, position)?;
                close_element(&mut stack, &mut root, element, position)?;
            }
            Ok((_, Event::End(_))) => {
                let element = stack.pop().ok_or_else(|| malformed(position, "unexpected end tag"))?;
                close_element(&mut stack, &mut root, element, position)?;
            }
            Ok((_, Event::Text(e))) => {
                if let Some(current) = stack.last_mut() {
                    let text = e
                        .unescape()
                        .map_err(|err| malformed(position, err.to_string()))?;
                    current.push_text(&text);
                }
            }
            Ok((_, Event::CData(e))) => {
                if let Some(current) = stack.last_mut() {
                    let text = decoder
                        .decode(&e)
                        .map_err(|err| malformed(position, err.to_string()))?;
                    current.push_text(&text);
                }
            }
            Ok((_, Event::Eof)) => break,
            Ok(_) => {}
            Err(err) => return Err(malformed(position, err.to_string())),
        }

        buf.clear();
    }

    if !stack.is_empty() {
        return Err(DocumentError::UnexpectedEof(stack.len()));
    }

    let root = root.ok_or(DocumentError::NoRoot)?;
    trace!(
        "Parsed document with root {{{}}}{}",
        root.namespace().unwrap_or(""),
        root.local_name()
    );
    Ok(Document::new(root))
}

fn open_element(
    ns: ResolveResult<'_>,
    start: &BytesStart<'_>,
    decoder: Decoder,
    position: u64,
) -> Result<Element> {
    let namespace = match ns {
        ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
        ResolveResult::Unbound => None,
        ResolveResult::Unknown(prefix) => {
            return Err(DocumentError::UndeclaredPrefix(
                String::from_utf8_lossy(&prefix).into_owned(),
            ));
        }
    };

    let local_name = start.local_name();
    let local_name = decoder
        .decode(local_name.as_ref())
        .map_err(|err| malformed(position, err.to_string()))?;

    Ok(Element::new(namespace, local_name.to_string()))
}

fn close_element(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
    position: u64,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.push_child(element);
        return Ok(());
    }

    if root.is_some() {
        return Err(malformed(position, "multiple root elements"));
    }
    *root = Some(element);
    Ok(())
}

fn malformed(position: u64, reason: impl Into<String>) -> DocumentError {
    DocumentError::Malformed {
        position,
        reason: reason.into(),
    }
}
