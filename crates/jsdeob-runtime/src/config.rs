//! Execution policy for the Transform Runtime.
//!
//! Separate from the server's own `ServerConfig` (`jsdeob-server`'s
//! ambient-config layer) — this is specifically the handful of knobs §4.2
//! and §9 call out as policy switches on the `run()` escape hatch and log
//! capture, following `otter-runtime::tsconfig`'s `TypeScriptConfig`
//! builder-struct convention rather than scattering raw booleans through
//! call sites.

#[derive(Debug, Clone)]
pub struct RuntimePolicy {
    /// Whether the `run(codeString)` escape hatch actually evaluates code.
    /// When `false` the binding exists but every call logs an error and
    /// returns `undefined` (§9: "an explicit policy switch").
    /// Default: true.
    pub allow_eval: bool,

    /// Caps the number of `console.*` entries captured per invocation, so a
    /// runaway loop in user code can't grow `logs` without bound.
    /// Default: 1000.
    pub max_log_entries: usize,
}

impl Default for RuntimePolicy {
    fn default() -> Self {
        Self {
            allow_eval: true,
            max_log_entries: 1000,
        }
    }
}

impl RuntimePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_eval(mut self, enabled: bool) -> Self {
        self.allow_eval = enabled;
        self
    }

    pub fn max_log_entries(mut self, max: usize) -> Self {
        self.max_log_entries = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_allow_eval() {
        let policy = RuntimePolicy::default();
        assert!(policy.allow_eval);
        assert_eq!(policy.max_log_entries, 1000);
    }

    #[test]
    fn builder_pattern() {
        let policy = RuntimePolicy::new().allow_eval(false).max_log_entries(10);
        assert!(!policy.allow_eval);
        assert_eq!(policy.max_log_entries, 10);
    }
}
