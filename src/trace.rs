use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

type Sink = Arc<Mutex<dyn Write + Send>>;

/// Verbose diagnostics, interleaved with normal command output on standard
/// output unless another writer is given. A disabled tracer writes nothing.
#[derive(Clone)]
pub struct Tracer {
    enabled: bool,
    sink: Sink,
}

impl Tracer {
    pub fn new(enabled: bool) -> Self {
        Self::with_writer(enabled, io::stdout())
    }

    pub fn with_writer(enabled: bool, writer: impl Write + Send + 'static) -> Self {
        Self {
            enabled,
            sink: Arc::new(Mutex::new(writer)),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Writes a `DEBUG:` line.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.emit(format_args!("DEBUG: {}", args));
    }

    /// Writes one `token_array[i]=tok` line per token.
    pub fn tokens(&self, tokens: &[String]) {
        if !self.enabled {
            return;
        }
        for (i, token) in tokens.iter().enumerate() {
            self.emit(format_args!("token_array[{}]={}", i, token));
        }
    }

    /// Writes an untagged line.
    pub fn note(&self, args: fmt::Arguments<'_>) {
        self.emit(args);
    }

    fn emit(&self, args: fmt::Arguments<'_>) {
        if !self.enabled {
            return;
        }
        // Tracing never fails a command, not even on a poisoned sink.
        let mut out = match self.sink.lock() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        };
        let _ = writeln!(out, "{}", args);
        let _ = out.flush();
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new(false)
    }
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer").field("enabled", &self.enabled).finish()
    }
}

/// In-memory trace sink for tests.
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct Captured(Arc<Mutex<Vec<u8>>>);

#[cfg(test)]
impl Captured {
    pub(crate) fn tracer(&self, enabled: bool) -> Tracer {
        Tracer::with_writer(enabled, self.clone())
    }

    pub(crate) fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[cfg(test)]
impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
