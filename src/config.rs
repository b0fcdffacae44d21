//! Ambient, non-semantic configuration for a single compile run.
//!
//! Nothing here changes emitted bytecode — it only toggles the reporting
//! the base pipeline leaves to its caller (whether to disassemble the
//! resulting chunk, whether diagnostics are retained for programmatic
//! inspection).

/// Builder-style configuration handed to [`crate::compiler::compile_with_options`].
#[derive(Debug, Clone, Default)]
pub struct CompilerOptions {
    /// When set, the CLI driver disassembles the resulting chunk to stdout
    /// after a successful compile.
    pub trace: bool,
    /// Always `true` via the library entry point: diagnostics are how a
    /// caller finds out why a compile failed, so there is no builder method
    /// to turn this off — `compile`/`compile_with_options` always collect
    /// them regardless of this field's value.
    pub collect_diagnostics: bool,
}

impl CompilerOptions {
    pub fn new() -> Self {
        CompilerOptions {
            trace: false,
            collect_diagnostics: true,
        }
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_collects_diagnostics_but_does_not_trace() {
        let opts = CompilerOptions::new();
        assert!(!opts.trace);
        assert!(opts.collect_diagnostics);
    }

    #[test]
    fn builder_methods_chain() {
        let opts = CompilerOptions::new().with_trace(true);
        assert!(opts.trace);
        assert!(opts.collect_diagnostics);
    }
}
