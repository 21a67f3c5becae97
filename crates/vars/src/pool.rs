//! Parser pooling.
//!
//! Building a value formats its canonical text through a [`Parser`]. Parsers
//! are kept in a small idle list so concurrent callers reuse buffers instead
//! of allocating per call. Oversized parsers are dropped on release so one
//! large value does not pin memory for the lifetime of the process.

use std::ops::{Deref, DerefMut};
use std::sync::LazyLock;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::parser::Parser;

static GLOBAL: LazyLock<ParserPool> = LazyLock::new(ParserPool::default);

/// Objects that can be kept in a pool between uses.
pub(crate) trait Poolable {
    /// Clear any state that must not leak into the next use.
    fn reset(&mut self);

    /// `false` when the object should be discarded instead of pooled.
    fn is_reusable(&self, config: &PoolConfig) -> bool;
}

impl Poolable for Parser {
    fn reset(&mut self) {
        Parser::reset(self);
    }

    fn is_reusable(&self, config: &PoolConfig) -> bool {
        self.capacity() <= config.max_buffer_capacity
    }
}

/// Pool sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Parsers kept idle; extra released parsers are dropped.
    pub max_idle: usize,
    /// Largest buffer, in bytes, a parser may hold and still be reused.
    pub max_buffer_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle: 32,
            max_buffer_capacity: 64 * 1024,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn with_max_idle(mut self, max_idle: usize) -> Self {
        self.max_idle = max_idle;
        self
    }

    #[must_use]
    pub fn with_max_buffer_capacity(mut self, bytes: usize) -> Self {
        self.max_buffer_capacity = bytes;
        self
    }
}

/// Thread-safe pool of [`Parser`]s.
///
/// ```rust
/// use sdk_vars::{Kind, ParserPool, PoolConfig};
///
/// let pool = ParserPool::new(PoolConfig::default().with_max_idle(4));
/// let v = pool.acquire().value(&42_u8).unwrap();
/// assert_eq!(v.kind(), Kind::Uint8);
/// assert_eq!(pool.idle(), 1);
/// ```
#[derive(Debug)]
pub struct ParserPool {
    idle: Mutex<Vec<Parser>>,
    config: PoolConfig,
}

impl Default for ParserPool {
    fn default() -> Self {
        Self::new(PoolConfig::default())
    }
}

impl ParserPool {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            idle: Mutex::new(Vec::with_capacity(config.max_idle)),
            config,
        }
    }

    /// Process-wide pool used by [`Value::new`](crate::Value::new).
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Take an idle parser or create one. It returns to the pool on drop.
    pub fn acquire(&self) -> PooledParser<'_> {
        let parser = self.idle.lock().pop().unwrap_or_default();
        PooledParser { parser, pool: self }
    }

    /// Run `f` with a pooled parser.
    pub fn with_pooled<R>(&self, f: impl FnOnce(&mut Parser) -> R) -> R {
        let mut parser = self.acquire();
        f(&mut parser)
    }

    /// Number of parsers currently idle.
    pub fn idle(&self) -> usize {
        self.idle.lock().len()
    }

    fn release(&self, mut parser: Parser) {
        if !parser.is_reusable(&self.config) {
            tracing::trace!(
                capacity = parser.capacity(),
                limit = self.config.max_buffer_capacity,
                "discarding oversized parser"
            );
            return;
        }

        let mut idle = self.idle.lock();
        if idle.len() >= self.config.max_idle {
            tracing::trace!(idle = idle.len(), "parser pool full, dropping parser");
            return;
        }
        Poolable::reset(&mut parser);
        idle.push(parser);
    }
}

/// RAII guard over a pooled [`Parser`].
pub struct PooledParser<'a> {
    parser: Parser,
    pool: &'a ParserPool,
}

impl Deref for PooledParser<'_> {
    type Target = Parser;

    fn deref(&self) -> &Parser {
        &self.parser
    }
}

impl DerefMut for PooledParser<'_> {
    fn deref_mut(&mut self) -> &mut Parser {
        &mut self.parser
    }
}

impl Drop for PooledParser<'_> {
    fn drop(&mut self) {
        // A fresh parser holds no allocation, so the swap is free.
        let parser = std::mem::take(&mut self.parser);
        self.pool.release(parser);
    }
}

impl std::fmt::Debug for PooledParser<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledParser").finish_non_exhaustive()
    }
}
