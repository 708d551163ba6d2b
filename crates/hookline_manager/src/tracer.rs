//! Tag-based trace messages.
//!
//! A [`TagTracer`] routes messages addressed by a tag path (`pluginmanage`,
//! `hook`, `pluginmanage:register`) to an optional writer and to processors
//! registered for an exact tag path. Every message is also emitted as a
//! `tracing` event at trace level.
//!
//! Messages render as one line with the tags in brackets, followed by one
//! indented line per extra field:
//!
//! ```text
//!   on_save [hook]
//!       path: "/tmp/out"
//! ```

use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;

/// Receives every rendered message.
pub type TraceWriter = Arc<dyn Fn(&str) + Send + Sync>;

/// Receives `(tags, args)` for messages addressed to one exact tag path.
pub type TraceProcessor = Arc<dyn Fn(&[String], &[String]) + Send + Sync>;

#[derive(Default)]
struct TracerState {
    writer: RwLock<Option<TraceWriter>>,
    processors: RwLock<HashMap<Vec<String>, TraceProcessor>>,
    indent: AtomicUsize,
}

/// Root of a tracer tree. Clones share state.
#[derive(Clone, Default)]
pub struct TagTracer {
    state: Arc<TracerState>,
}

impl TagTracer {
    /// Creates a tracer with no writer and no processors.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a sub-tracer for the single tag `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> TagTracerSub {
        TagTracerSub {
            root: self.clone(),
            tags: vec![name.to_string()],
        }
    }

    /// Installs or removes the writer.
    pub fn set_writer(&self, writer: Option<TraceWriter>) {
        *self.state.writer.write() = writer;
    }

    /// Registers a processor for the exact tag path `tags` (`"a:b"`).
    pub fn set_processor(&self, tags: &str, processor: TraceProcessor) {
        let key = tags.split(':').map(String::from).collect();
        self.state.processors.write().insert(key, processor);
    }

    /// Current indentation level.
    #[must_use]
    pub fn indent(&self) -> usize {
        self.state.indent.load(Ordering::Relaxed)
    }

    /// Sets the indentation level.
    pub fn set_indent(&self, indent: usize) {
        self.state.indent.store(indent, Ordering::Relaxed);
    }

    /// Increments the indentation level.
    pub fn push_indent(&self) {
        self.state.indent.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrements the indentation level, saturating at zero.
    pub fn pop_indent(&self) {
        self.state
            .indent
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |indent| {
                Some(indent.saturating_sub(1))
            })
            .ok();
    }

    /// Renders a message at the current indentation.
    #[must_use]
    pub fn format_message(&self, tags: &[String], args: &[String], extra: &[(String, String)]) -> String {
        let indent = "  ".repeat(self.indent());
        let mut message = format!("{indent}{} [{}]\n", args.join(" "), tags.join(":"));
        for (name, value) in extra {
            message.push_str(&format!("{indent}    {name}: {value}\n"));
        }
        message
    }

    fn process(&self, tags: &[String], args: &[String], extra: &[(String, String)]) {
        if args.is_empty() {
            return;
        }
        let rendered = self.format_message(tags, args, extra);
        tracing::trace!(tags = %tags.join(":"), "{}", rendered.trim_end());

        let writer = self.state.writer.read().clone();
        if let Some(writer) = writer {
            writer(&rendered);
        }
        let processor = self.state.processors.read().get(tags).cloned();
        if let Some(processor) = processor {
            processor(tags, args);
        }
    }
}

impl fmt::Debug for TagTracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagTracer")
            .field("indent", &self.indent())
            .field("has_writer", &self.state.writer.read().is_some())
            .field("processors", &self.state.processors.read().len())
            .finish()
    }
}

/// A tracer bound to a tag path.
#[derive(Debug, Clone)]
pub struct TagTracerSub {
    root: TagTracer,
    tags: Vec<String>,
}

impl TagTracerSub {
    /// The shared root.
    #[must_use]
    pub fn root(&self) -> &TagTracer {
        &self.root
    }

    /// The tag path.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns a tracer for this path extended by `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> TagTracerSub {
        let mut tags = self.tags.clone();
        tags.push(name.to_string());
        TagTracerSub {
            root: self.root.clone(),
            tags,
        }
    }

    /// Emits a message made of `args` joined by spaces. Empty messages are dropped.
    pub fn call(&self, args: &[&dyn fmt::Display]) {
        self.call_with(args, &[]);
    }

    /// Emits a message with extra `name: value` lines.
    pub fn call_with(&self, args: &[&dyn fmt::Display], extra: &[(&str, &dyn fmt::Display)]) {
        let args: Vec<String> = args.iter().map(ToString::to_string).collect();
        let extra: Vec<(String, String)> = extra
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.to_string()))
            .collect();
        self.root.process(&self.tags, &args, &extra);
    }
}
