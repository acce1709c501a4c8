use crate::host::HostIntrinsicLibrary;
use ff_core::diagnostics::DiagnosticBuffer;
use ff_core::span::Span;
use ff_core::symbol::DerivedTypeSpec;
use ff_core::value::Rounding;
use std::sync::Arc;

/// Knobs a driver sets up before folding.
#[derive(Debug, Clone, Copy)]
pub struct FoldingOptions {
    pub rounding: Rounding,
    pub flush_subnormals_to_zero: bool,
}

impl Default for FoldingOptions {
    fn default() -> Self {
        Self {
            rounding: Rounding::TiesToEven,
            flush_subnormals_to_zero: false,
        }
    }
}

/// State threaded by mutable reference through one folding pass: the
/// diagnostic sink, the host math library, IEEE evaluation controls,
/// the active implied-DO bindings, and the parameterized-derived-type
/// instance whose scope resolves bare type-parameter inquiries.
///
/// Contexts are not shared between concurrently folded expressions;
/// each holds mutable implied-DO state and a mutable message sink.
pub struct FoldingContext {
    pub messages: DiagnosticBuffer,
    pub host: Arc<HostIntrinsicLibrary>,
    pub rounding: Rounding,
    pub flush_subnormals_to_zero: bool,
    /// Source location diagnostics attach to.
    pub at: Span,
    pub pdt_instance: Option<Arc<DerivedTypeSpec>>,
    implied_dos: Vec<(String, i64)>,
}

impl FoldingContext {
    pub fn new(options: FoldingOptions) -> Self {
        Self {
            messages: DiagnosticBuffer::new(),
            host: HostIntrinsicLibrary::shared(),
            rounding: options.rounding,
            flush_subnormals_to_zero: options.flush_subnormals_to_zero,
            at: Span::null(),
            pdt_instance: None,
            implied_dos: Vec::new(),
        }
    }

    pub fn with_pdt_instance(mut self, instance: Arc<DerivedTypeSpec>) -> Self {
        self.pdt_instance = Some(instance);
        self
    }

    pub fn say_error(&mut self, message: impl Into<String>) {
        let at = self.at;
        self.messages.say_error(at, message);
    }

    pub fn say_warning(&mut self, message: impl Into<String>) {
        let at = self.at;
        self.messages.say_warning(at, message);
    }

    /// The current value of an active implied-DO index, innermost wins.
    pub fn implied_do(&self, name: &str) -> Option<i64> {
        self.implied_dos
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Pushes a binding. Nested implied DOs use distinct names; the
    /// analyzer enforces that, we only observe it.
    pub fn start_implied_do(&mut self, name: &str, value: i64) {
        debug_assert!(self.implied_do(name).is_none());
        self.implied_dos.push((name.to_string(), value));
    }

    pub fn set_implied_do(&mut self, name: &str, value: i64) {
        if let Some(entry) = self.implied_dos.iter_mut().rev().find(|(n, _)| n == name) {
            entry.1 = value;
        }
    }

    /// Pops a binding; balanced with `start_implied_do` on every exit
    /// path, including fold abandonment.
    pub fn end_implied_do(&mut self, name: &str) {
        if let Some(pos) = self.implied_dos.iter().rposition(|(n, _)| n == name) {
            self.implied_dos.remove(pos);
        }
    }
}

impl Default for FoldingContext {
    fn default() -> Self {
        Self::new(FoldingOptions::default())
    }
}
