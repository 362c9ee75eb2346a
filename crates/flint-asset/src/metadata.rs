//! Splitting a content identifier into base path and metadata parameter

/// Parts of an identifier such as `/fonts/mono.ttf|size:24`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedIdentifier<'a> {
    pub base_path: &'a str,
    /// Everything after the first delimiter, unvalidated
    pub parameter: Option<&'a str>,
}

impl ParsedIdentifier<'_> {
    pub fn has_delimiter(&self) -> bool {
        self.parameter.is_some()
    }
}

/// Splits identifiers on the first occurrence of a delimiter character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataKeyParser {
    delimiter: char,
}

impl MetadataKeyParser {
    pub fn new(delimiter: char) -> Self {
        Self { delimiter }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    pub fn parse<'a>(&self, identifier: &'a str) -> ParsedIdentifier<'a> {
        match identifier.split_once(self.delimiter) {
            Some((base_path, parameter)) => ParsedIdentifier {
                base_path,
                parameter: Some(parameter),
            },
            None => ParsedIdentifier {
                base_path: identifier,
                parameter: None,
            },
        }
    }
}

impl Default for MetadataKeyParser {
    fn default() -> Self {
        Self::new('|')
    }
}
