//! Helpers for the DOM-selector fallback
//!
//! The rendered markup uses generated utility classes, so the selectors the
//! fallback relies on are long and positional. Everything here reports a
//! typed [`StrategyError`] instead of panicking when markup drifts.

use std::sync::OnceLock;

use scraper::{ElementRef, Node, Selector};

use crate::StrategyError;

/// Marker placed before list items when flattening rich text
pub const BULLET: &str = "• ";

/// Compiles a CSS selector
pub fn selector(css: &str) -> Result<Selector, StrategyError> {
    Selector::parse(css).map_err(|e| StrategyError::InvalidSelector {
        selector: css.to_string(),
        message: format!("{:?}", e),
    })
}

/// First element under `scope` matching `css`
pub fn select_first<'a>(
    scope: ElementRef<'a>,
    css: &str,
) -> Result<Option<ElementRef<'a>>, StrategyError> {
    let selector = selector(css)?;
    Ok(scope.select(&selector).next())
}

/// A selector known at compile time, parsed once on first use
///
/// Meant for `static` items. The source text is kept for error messages.
pub struct FixedSelector {
    css: &'static str,
    compiled: OnceLock<Selector>,
}

impl FixedSelector {
    pub const fn new(css: &'static str) -> Self {
        Self {
            css,
            compiled: OnceLock::new(),
        }
    }

    pub fn css(&self) -> &'static str {
        self.css
    }

    /// The parsed selector
    ///
    /// # Panics
    ///
    /// If the constant source text is not valid CSS.
    pub fn get(&self) -> &Selector {
        self.compiled.get_or_init(|| {
            Selector::parse(self.css)
                .unwrap_or_else(|e| panic!("invalid fixed selector '{}': {:?}", self.css, e))
        })
    }

    /// First element under `scope` matching this selector
    pub fn first<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        scope.select(self.get()).next()
    }

    /// First element under `scope` matching this selector, which must exist
    pub fn require<'a>(&self, scope: ElementRef<'a>) -> Result<ElementRef<'a>, StrategyError> {
        self.first(scope).ok_or_else(|| self.missing())
    }

    /// Error for this selector matching nothing
    pub fn missing(&self) -> StrategyError {
        missing(self.css)
    }
}

static RICH_TEXT_BLOCKS: FixedSelector = FixedSelector::new("p, li");

/// Error for a selector that matched nothing
pub fn missing(css: &str) -> StrategyError {
    StrategyError::MissingElement {
        selector: css.to_string(),
    }
}

/// Collapses runs of whitespace (including newlines) into single spaces
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// All descendant text of an element, whitespace collapsed
pub fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// Text of the element's direct text children only, whitespace collapsed
///
/// Nested elements such as icons or badges are ignored.
pub fn own_text(element: ElementRef<'_>) -> String {
    let text = element
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => Some(&**text),
            _ => None,
        })
        .collect::<String>();
    collapse_whitespace(&text)
}

/// Attribute value of an element, None when absent or blank
pub fn attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Flattens a rich-text container into plain lines
///
/// Every `p` and `li` under `container`, in document order, becomes one line
/// with its whitespace collapsed. List items get a [`BULLET`] prefix.
pub fn flatten_rich_text(container: ElementRef<'_>) -> String {
    container
        .select(RICH_TEXT_BLOCKS.get())
        .map(|block| {
            let text = element_text(block);
            if block.value().name() == "li" {
                format!("{}{}", BULLET, text)
            } else {
                text
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
