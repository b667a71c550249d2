//! GraphQL documents and operation name extraction.

use std::fmt;

use async_graphql_parser::types::{DocumentOperations, ExecutableDocument};

use crate::{GraphQLError, Result};

/// A query or mutation document, either as raw text or already parsed.
#[derive(Debug, Clone)]
pub enum Document {
    /// Raw document text, parsed lazily whenever its operation name is needed.
    Text(String),
    /// Parsed document together with its source text.
    Parsed(ParsedDocument),
}

/// A document that went through the GraphQL parser.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    source: String,
    ast: ExecutableDocument,
}

impl ParsedDocument {
    /// Source text of the document.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parsed syntax tree.
    pub fn ast(&self) -> &ExecutableDocument {
        &self.ast
    }
}

impl Document {
    /// Parse a document, failing on invalid GraphQL.
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let ast = async_graphql_parser::parse_query(&source)
            .map_err(|e| GraphQLError::Parse(e.to_string()))?;
        Ok(Self::Parsed(ParsedDocument { source, ast }))
    }

    /// The text sent on the wire.
    pub fn query(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Parsed(parsed) => &parsed.source,
        }
    }

    /// Name of the first top-level operation, if it has one.
    ///
    /// A `Text` document is parsed on every call. Build the document with
    /// [`gql`] to parse it once when it is sent repeatedly.
    ///
    /// Text documents that fail to parse have no operation name; the server
    /// reports the syntax error instead.
    pub fn operation_name(&self) -> Option<String> {
        match self {
            Self::Text(text) => async_graphql_parser::parse_query(text)
                .ok()
                .and_then(|ast| first_operation_name(&ast)),
            Self::Parsed(parsed) => first_operation_name(&parsed.ast),
        }
    }
}

/// Parse a document up front.
///
/// ```
/// let document = graphql_request::gql("query GetUser { user { id } }").unwrap();
/// assert_eq!(document.operation_name().as_deref(), Some("GetUser"));
/// ```
pub fn gql(source: impl Into<String>) -> Result<Document> {
    Document::parse(source)
}

/// Anonymous operations parse to `Single`; named ones always land in
/// `Multiple`, keyed by name, so source position decides which comes first.
fn first_operation_name(ast: &ExecutableDocument) -> Option<String> {
    match &ast.operations {
        DocumentOperations::Single(_) => None,
        DocumentOperations::Multiple(operations) => operations
            .iter()
            .min_by_key(|(_, operation)| (operation.pos.line, operation.pos.column))
            .map(|(name, _)| name.to_string()),
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Document {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&String> for Document {
    fn from(text: &String) -> Self {
        Self::Text(text.clone())
    }
}

impl From<&Document> for Document {
    fn from(document: &Document) -> Self {
        document.clone()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.query())
    }
}
