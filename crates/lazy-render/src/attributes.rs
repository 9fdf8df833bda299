//! Directive attribute surface.
//!
//! Markup-driven hosts describe lazy components with string attributes:
//!
//! | Attribute | Meaning |
//! |-----------|---------|
//! | `lazyModule` | placeholder template reference of a [`LazyModule`](crate::LazyModule) |
//! | `lazyIf` | condition expression, enabled when unset |
//! | `lazyRepeater` | initial item limit of a [`LazyRepeater`](crate::LazyRepeater) |
//! | `lazyPlaceholder` / `lazyTemplate` | trailing placeholder template reference |
//!
//! Names are accepted in camelCase or in kebab/snake case (`lazy-if`,
//! `lazy_if`). Condition expressions are not evaluated here: they are
//! resolved to typed predicates through [`ConditionBindings`].

use std::fmt;

use indexmap::IndexMap;
use lazy_render_core::collections::Map;

use crate::condition::Condition;
use crate::lazy_module::LazyModuleSpec;
use crate::lazy_repeater::LazyRepeaterSpec;

pub const LAZY_MODULE: &str = "lazyModule";
pub const LAZY_IF: &str = "lazyIf";
pub const LAZY_REPEATER: &str = "lazyRepeater";
pub const LAZY_PLACEHOLDER: &str = "lazyPlaceholder";
pub const LAZY_TEMPLATE: &str = "lazyTemplate";

/// Failure to read the attribute surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeError {
    /// A required attribute is absent.
    Missing(&'static str),
    /// `lazyRepeater` is not a non-negative integer.
    InvalidLimit(String),
    /// `lazyIf` names an expression with no bound predicate.
    UnboundCondition(String),
    /// A repeat expression has no `in <collection>` clause.
    MalformedRepeat(String),
}

impl fmt::Display for AttributeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeError::Missing(name) => write!(f, "missing attribute `{name}`"),
            AttributeError::InvalidLimit(value) => {
                write!(f, "`{LAZY_REPEATER}` expects a non-negative integer, got {value:?}")
            }
            AttributeError::UnboundCondition(expr) => {
                write!(f, "no predicate bound for `{LAZY_IF}` expression {expr:?}")
            }
            AttributeError::MalformedRepeat(expr) => {
                write!(f, "repeat expression {expr:?} has no `in` clause")
            }
        }
    }
}

impl std::error::Error for AttributeError {}

/// Converts `lazy-if`, `lazy_if` or `lazy:if` to `lazyIf`.
pub fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.trim().chars() {
        if matches!(ch, '-' | '_' | ':') {
            upper_next = !normalized.is_empty();
            continue;
        }
        if upper_next {
            normalized.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            normalized.push(ch);
        }
    }
    normalized
}

/// Attribute values of one element, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    values: IndexMap<String, String>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute, normalizing its name. Returns `self` for chaining.
    pub fn set(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(normalize_name(name), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(&normalize_name(name)).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (name, value) in iter {
            attributes.insert(name.as_ref(), value);
        }
        attributes
    }
}

/// Predicates that `lazyIf` expressions resolve to.
#[derive(Clone, Debug, Default)]
pub struct ConditionBindings {
    bindings: Map<String, Condition>,
}

impl ConditionBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, expression: &str, condition: Condition) -> Self {
        self.bindings.insert(expression.trim().to_owned(), condition);
        self
    }

    /// Resolves an expression.
    ///
    /// Empty expressions are unset, `true`/`false` literals are constants,
    /// anything else must have been bound.
    pub fn resolve(&self, expression: &str) -> Result<Condition, AttributeError> {
        match expression.trim() {
            "" => Ok(Condition::always()),
            "true" => Ok(Condition::constant(true)),
            "false" => Ok(Condition::constant(false)),
            other => self
                .bindings
                .get(other)
                .cloned()
                .ok_or_else(|| AttributeError::UnboundCondition(other.to_owned())),
        }
    }

    fn condition_for(&self, attributes: &Attributes) -> Result<Condition, AttributeError> {
        attributes
            .get(LAZY_IF)
            .map_or_else(|| Ok(Condition::always()), |expr| self.resolve(expr))
    }
}

impl LazyModuleSpec {
    /// Reads `lazyModule` and `lazyIf`.
    pub fn from_attributes(
        attributes: &Attributes,
        bindings: &ConditionBindings,
    ) -> Result<Self, AttributeError> {
        let placeholder = attributes
            .get(LAZY_MODULE)
            .ok_or(AttributeError::Missing(LAZY_MODULE))?;
        Ok(LazyModuleSpec::new(placeholder.trim()).with_condition(bindings.condition_for(attributes)?))
    }
}

impl LazyRepeaterSpec {
    /// Reads `lazyRepeater`, `lazyPlaceholder`/`lazyTemplate` and `lazyIf`.
    ///
    /// `lazyPlaceholder` wins when both placeholder attributes are present.
    pub fn from_attributes(
        attributes: &Attributes,
        bindings: &ConditionBindings,
    ) -> Result<Self, AttributeError> {
        let raw_limit = attributes
            .get(LAZY_REPEATER)
            .ok_or(AttributeError::Missing(LAZY_REPEATER))?;
        let initial_limit = raw_limit
            .trim()
            .parse::<usize>()
            .map_err(|_| AttributeError::InvalidLimit(raw_limit.to_owned()))?;

        let mut spec = LazyRepeaterSpec::new(initial_limit)
            .with_condition(bindings.condition_for(attributes)?);
        if let Some(placeholder) = attributes
            .get(LAZY_PLACEHOLDER)
            .or_else(|| attributes.get(LAZY_TEMPLATE))
            .filter(|reference| !reference.trim().is_empty())
        {
            spec = spec.with_placeholder(placeholder.trim());
        }
        Ok(spec)
    }
}
