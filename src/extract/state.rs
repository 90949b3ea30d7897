//! Embedded application-state tree
//!
//! Meetup pages are server rendered with a `__NEXT_DATA__` script holding the
//! page props as JSON. Inside it, `props.pageProps.__APOLLO_STATE__` is a flat
//! table of entities keyed by a type-prefixed id (`Event:123`, `Group:456`).
//! Entities point at each other with `{"__ref": "<key>"}` objects instead of
//! nesting, so every hop goes through [`StateGraph::resolve`].

use scraper::Html;
use serde_json::{Map, Value};

use super::dom::FixedSelector;
use crate::StrategyError;

/// Script element carrying the state tree
static STATE_SCRIPT: FixedSelector = FixedSelector::new("script#__NEXT_DATA__");

/// Key holding a reference to another node
pub const REF_KEY: &str = "__ref";

/// Returns the raw JSON text of the embedded state script
pub fn state_script_text(document: &Html) -> Result<String, StrategyError> {
    let script = document
        .select(STATE_SCRIPT.get())
        .next()
        .ok_or(StrategyError::MissingStateScript)?;

    let text = script.text().collect::<String>();
    if text.trim().is_empty() {
        return Err(StrategyError::MissingStateScript);
    }
    Ok(text)
}

/// Locates and parses the embedded state tree
pub fn parse_state_tree(document: &Html) -> Result<Value, StrategyError> {
    let text = state_script_text(document)?;
    Ok(serde_json::from_str(&text)?)
}

/// Read-only view over the node table of a parsed state tree
#[derive(Debug, Clone, Copy)]
pub struct StateGraph<'a> {
    nodes: &'a Map<String, Value>,
}

impl<'a> StateGraph<'a> {
    /// Finds the node table (`props.pageProps.__APOLLO_STATE__`)
    pub fn from_tree(tree: &'a Value) -> Result<Self, StrategyError> {
        let nodes = tree
            .get("props")
            .and_then(|props| props.get("pageProps"))
            .and_then(|page_props| page_props.get("__APOLLO_STATE__"))
            .and_then(Value::as_object)
            .ok_or_else(|| StrategyError::MissingNode("node table".to_string()))?;

        Ok(Self { nodes })
    }

    /// Looks up a node by its key
    pub fn node(&self, key: &str) -> Option<Node<'a>> {
        let (key, value) = self.nodes.get_key_value(key)?;
        Node::new(key, value)
    }

    /// First node, in document order, whose key starts with `prefix`
    pub fn first_with_prefix(&self, prefix: &str) -> Option<Node<'a>> {
        self.nodes
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .find_map(|(key, value)| Node::new(key, value))
    }

    /// Resolves a `{"__ref": key}` object against the node table
    ///
    /// Returns None if the value is not a reference or the key is unknown.
    pub fn resolve(&self, reference: &Value) -> Option<Node<'a>> {
        let key = reference.get(REF_KEY)?.as_str()?;
        self.node(key)
    }

    /// Resolves the reference stored under `field` of `node`
    pub fn resolve_field(&self, node: &Node<'a>, field: &str) -> Option<Node<'a>> {
        node.get(field).and_then(|reference| self.resolve(reference))
    }
}

/// A single entity of the node table
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    key: &'a str,
    fields: &'a Map<String, Value>,
}

impl<'a> Node<'a> {
    fn new(key: &'a str, value: &'a Value) -> Option<Self> {
        value.as_object().map(|fields| Self { key, fields })
    }

    pub fn key(&self) -> &'a str {
        self.key
    }

    /// Raw field value; JSON `null` counts as absent
    pub fn get(&self, field: &str) -> Option<&'a Value> {
        self.fields.get(field).filter(|value| !value.is_null())
    }

    /// First field whose key satisfies `predicate`
    pub fn find_field<P>(&self, predicate: P) -> Option<(&'a str, &'a Value)>
    where
        P: Fn(&str) -> bool,
    {
        self.fields
            .iter()
            .find(|(key, _)| predicate(key.as_str()))
            .map(|(key, value)| (key.as_str(), value))
    }

    /// String field, None when absent or not a string
    pub fn str_field(&self, field: &str) -> Option<&'a str> {
        self.get(field).and_then(Value::as_str)
    }

    /// String field that must be present
    pub fn required_str(&self, field: &str) -> Result<&'a str, StrategyError> {
        let value = self.get(field).ok_or_else(|| StrategyError::MissingField {
            node: self.key.to_string(),
            field: field.to_string(),
        })?;

        value.as_str().ok_or_else(|| self.invalid(field, "string"))
    }

    /// String field that must be present and non-blank
    pub fn required_text(&self, field: &str) -> Result<&'a str, StrategyError> {
        let value = self.required_str(field)?;
        if value.trim().is_empty() {
            return Err(self.invalid(field, "non-empty string"));
        }
        Ok(value)
    }

    fn invalid(&self, field: &str, expected: &'static str) -> StrategyError {
        StrategyError::InvalidField {
            node: self.key.to_string(),
            field: field.to_string(),
            expected,
        }
    }
}
