//! XML reading and writing for [`Document`]

use super::document::{Document, NodeId, NodeKind, XmlDeclaration};
use crate::error::{AnonymizerError, Result};
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn start_element(doc: &mut Document, parent: NodeId, e: &BytesStart<'_>) -> Result<NodeId> {
    let name = lossy(e.name().as_ref());
    let id = doc.append_element(parent, name);
    for attr in e.attributes() {
        let attr = attr.map_err(|err| AnonymizerError::xml(err.to_string()))?;
        let key = lossy(attr.key.as_ref());
        let value = attr
            .unescape_value()
            .map_err(|err| AnonymizerError::xml(err.to_string()))?;
        doc.put_attribute(id, &key, &value);
    }
    Ok(id)
}

impl Document {
    /// Parse a well-formed XML document
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);

        let mut doc = Document::new();
        let mut stack = vec![doc.document_node()];

        loop {
            let parent = *stack.last().unwrap_or(&doc.document_node());
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let id = start_element(&mut doc, parent, &e)?;
                    stack.push(id);
                }
                Ok(Event::Empty(e)) => {
                    start_element(&mut doc, parent, &e)?;
                }
                Ok(Event::End(_)) => {
                    if stack.len() <= 1 {
                        return Err(AnonymizerError::xml("unexpected closing tag"));
                    }
                    stack.pop();
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|err| AnonymizerError::xml(err.to_string()))?;
                    if stack.len() > 1 || !text.trim().is_empty() {
                        doc.append(parent, NodeKind::Text(text.into_owned()));
                    }
                }
                Ok(Event::CData(e)) => {
                    doc.append(parent, NodeKind::CData(lossy(&e)));
                }
                Ok(Event::Comment(e)) => {
                    doc.append(parent, NodeKind::Comment(lossy(&e)));
                }
                Ok(Event::PI(e)) => {
                    doc.append(parent, NodeKind::ProcessingInstruction(lossy(&e)));
                }
                Ok(Event::DocType(e)) => {
                    doc.append(parent, NodeKind::DocType(lossy(&e)));
                }
                Ok(Event::Decl(decl)) => {
                    let version = decl
                        .version()
                        .map(|v| lossy(&v))
                        .map_err(|err| AnonymizerError::xml(err.to_string()))?;
                    let encoding = decl.encoding().and_then(|e| e.ok()).map(|e| lossy(&e));
                    let standalone = decl.standalone().and_then(|s| s.ok()).map(|s| lossy(&s));
                    doc.set_declaration(Some(XmlDeclaration {
                        version,
                        encoding,
                        standalone,
                    }));
                }
                Ok(Event::Eof) => break,
                Err(err) => {
                    return Err(AnonymizerError::xml(format!(
                        "error at position {}: {err}",
                        reader.buffer_position()
                    )));
                }
            }
        }

        if stack.len() > 1 {
            return Err(AnonymizerError::xml("unclosed element at end of input"));
        }
        if doc.root_element().is_none() {
            return Err(AnonymizerError::xml("document has no root element"));
        }
        Ok(doc)
    }

    /// Serialize the document, starting with its declaration if it has one
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        let mut first = true;
        if let Some(decl) = self.declaration() {
            writer
                .write_event(Event::Decl(BytesDecl::new(
                    &decl.version,
                    decl.encoding.as_deref(),
                    decl.standalone.as_deref(),
                )))
                .map_err(|err| AnonymizerError::xml(err.to_string()))?;
            first = false;
        }
        for child in self.children(self.document_node()) {
            if !first {
                writer
                    .write_event(Event::Text(BytesText::from_escaped("\n")))
                    .map_err(|err| AnonymizerError::xml(err.to_string()))?;
            }
            first = false;
            self.write_node(&mut writer, *child)?;
        }
        String::from_utf8(writer.into_inner()).map_err(|err| AnonymizerError::xml(err.to_string()))
    }

    fn write_node(&self, writer: &mut Writer<Vec<u8>>, id: NodeId) -> Result<()> {
        let event = match self.kind(id) {
            NodeKind::Document => return Ok(()),
            NodeKind::Element { name, attributes } => {
                let mut start = BytesStart::new(name.as_str());
                for (key, value) in attributes {
                    start.push_attribute((key.as_str(), value.as_str()));
                }
                if self.children(id).is_empty() {
                    Event::Empty(start)
                } else {
                    writer
                        .write_event(Event::Start(start))
                        .map_err(|err| AnonymizerError::xml(err.to_string()))?;
                    for child in self.children(id) {
                        self.write_node(writer, *child)?;
                    }
                    Event::End(BytesEnd::new(name.as_str()))
                }
            }
            NodeKind::Text(text) => Event::Text(BytesText::new(text)),
            NodeKind::CData(text) => Event::CData(BytesCData::new(text.as_str())),
            NodeKind::Comment(text) => Event::Comment(BytesText::from_escaped(text.as_str())),
            NodeKind::ProcessingInstruction(text) => {
                Event::PI(BytesText::from_escaped(text.as_str()))
            }
            NodeKind::DocType(text) => Event::DocType(BytesText::from_escaped(text.as_str())),
        };
        writer
            .write_event(event)
            .map_err(|err| AnonymizerError::xml(err.to_string()))
    }
}
