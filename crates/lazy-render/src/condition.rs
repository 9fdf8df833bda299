use std::fmt;
use std::rc::Rc;

/// Typed predicate deciding whether a lazy component takes action.
///
/// Only an evaluation of `false` switches a component off. An unset
/// condition behaves as `true`.
#[derive(Clone, Default)]
pub struct Condition {
    predicate: Option<Rc<dyn Fn() -> bool>>,
}

impl Condition {
    /// The unset condition: always enabled.
    pub fn always() -> Self {
        Self::default()
    }

    pub fn constant(value: bool) -> Self {
        Self::when(move || value)
    }

    pub fn when(predicate: impl Fn() -> bool + 'static) -> Self {
        Self {
            predicate: Some(Rc::new(predicate)),
        }
    }

    pub fn is_set(&self) -> bool {
        self.predicate.is_some()
    }

    /// Evaluates the predicate. Unset conditions are enabled.
    pub fn is_enabled(&self) -> bool {
        self.predicate.as_ref().map_or(true, |predicate| predicate())
    }
}

impl From<bool> for Condition {
    fn from(value: bool) -> Self {
        Self::constant(value)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.predicate {
            None => f.write_str("Condition(unset)"),
            Some(_) => f.write_str("Condition(predicate)"),
        }
    }
}
