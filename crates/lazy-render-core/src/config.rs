//! Runtime configuration shared by lazy components.

use std::time::Duration;

/// When a swapped module asks the visibility service to recheck.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum RecheckPolicy {
    /// Recheck once both the enter and the leave animation have settled.
    #[default]
    AfterSettle,
    /// Recheck after a fixed delay from the start of the swap, whether or
    /// not the animations have finished.
    FixedDelay(Duration),
}

/// Configuration carried by a [`RenderContext`](crate::RenderContext).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LazyRenderConfig {
    /// Recheck timing after a module swap.
    pub recheck: RecheckPolicy,

    /// Delay between a placeholder finishing its enter animation and its
    /// registration with the visibility service. `None` registers at once.
    pub observe_delay: Option<Duration>,

    /// Whether modules and repeaters ask for a recheck right after a
    /// placeholder is registered, so one already on screen is reported.
    pub recheck_after_placeholder_enter: bool,
}

impl Default for LazyRenderConfig {
    fn default() -> Self {
        Self {
            recheck: RecheckPolicy::AfterSettle,
            observe_delay: None,
            recheck_after_placeholder_enter: true,
        }
    }
}

impl LazyRenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recheck(mut self, recheck: RecheckPolicy) -> Self {
        self.recheck = recheck;
        self
    }

    pub fn with_observe_delay(mut self, delay: Duration) -> Self {
        self.observe_delay = Some(delay);
        self
    }

    pub fn with_recheck_after_placeholder_enter(mut self, enabled: bool) -> Self {
        self.recheck_after_placeholder_enter = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LazyRenderConfig::default();
        assert_eq!(config.recheck, RecheckPolicy::AfterSettle);
        assert_eq!(config.observe_delay, None);
        assert!(config.recheck_after_placeholder_enter);
    }

    #[test]
    fn test_builder() {
        let config = LazyRenderConfig::new()
            .with_recheck(RecheckPolicy::FixedDelay(Duration::from_millis(50)))
            .with_observe_delay(Duration::from_millis(10))
            .with_recheck_after_placeholder_enter(false);
        assert_eq!(config.recheck, RecheckPolicy::FixedDelay(Duration::from_millis(50)));
        assert_eq!(config.observe_delay, Some(Duration::from_millis(10)));
        assert!(!config.recheck_after_placeholder_enter);
    }
}
