use crate::config::Config;

/// Operator-facing diagnostic channel. Nothing logged here reaches the end user.
pub trait Diagnostics {
    fn error(&self, message: &str);

    fn warn(&self, message: &str);

    fn debug(&self, message: &str);
}

/// Writes diagnostics to the browser console.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleDiagnostics {
    verbose: bool,
}

impl ConsoleDiagnostics {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Default for ConsoleDiagnostics {
    fn default() -> Self {
        Self::new(Config::DEBUG_LOGGING)
    }
}

impl Diagnostics for ConsoleDiagnostics {
    fn error(&self, message: &str) {
        gloo::console::error!(message);
    }

    fn warn(&self, message: &str) {
        gloo::console::warn!(message);
    }

    fn debug(&self, message: &str) {
        if self.verbose {
            gloo::console::debug!(message);
        }
    }
}
