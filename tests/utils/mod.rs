//! Shared helpers for the integration tests

#![allow(dead_code)]

use ctp_anonymizer::{Anonymizer, Script, XmlOutcome};

pub use ctp_anonymizer::registry::functions::md5_decimal;

/// Anonymizer with the standard functions for an inline script
pub fn anonymizer(script: &str) -> Anonymizer {
    Anonymizer::new(Script::parse(script).expect("script parses"))
}

/// Run an inline script against inline XML
pub fn run(script: &str, xml: &str) -> XmlOutcome {
    anonymizer(script).anonymize_xml(xml)
}

/// A small clinical report used across tests
pub fn report() -> &'static str {
    concat!(
        "<report id=\"R-1\">",
        "<patient mrn=\"12345\"><name>Doe^John^Q</name><birth>19700214</birth><age>045Y</age></patient>",
        "<study uid=\"1.2.840.1.7\"><date>20230115</date>",
        "<series uid=\"1.2.840.1.7.1\"/><series uid=\"1.2.840.1.7.2\"/></study>",
        "<notes>seen by Dr. Smith</notes>",
        "</report>"
    )
}
