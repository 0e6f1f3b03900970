//! Compile options shared by all stages.

use serde::{Deserialize, Serialize};

/// How non-capacity diagnostics are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Any diagnostic fails the stage that produced it.
    Strict,
    /// Diagnostics accumulate and the stage continues best-effort.
    #[default]
    Lenient,
}

/// Hard bounds on the size of a compilation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Tokens produced by the lexer, including the trailing EOF.
    pub max_tokens: usize,
    /// Nodes allocated in the AST arena.
    pub max_nodes: usize,
    /// Direct children of a single node.
    pub max_children: usize,
    /// Recursion depth of nested expressions and blocks.
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_tokens: 1 << 20,
            max_nodes: 1 << 20,
            max_children: 1 << 16,
            max_depth: 256,
        }
    }
}

impl Limits {
    /// Largest token or node count addressable by a 32-bit id.
    pub const MAX_IDS: usize = u32::MAX as usize;

    /// Caps the id-producing limits at [`Limits::MAX_IDS`].
    pub fn clamped(self) -> Self {
        Self {
            max_tokens: self.max_tokens.min(Self::MAX_IDS),
            max_nodes: self.max_nodes.min(Self::MAX_IDS),
            ..self
        }
    }
}

/// What the generator emits for the runtime shim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    /// Prototypes only; the shim is linked separately.
    #[default]
    Declarations,
    /// Shim definitions inlined so the output compiles standalone.
    Embedded,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub mode: Mode,
    pub limits: Limits,
    pub runtime: RuntimeMode,
}

impl Options {
    pub fn strict() -> Self {
        Self {
            mode: Mode::Strict,
            ..Self::default()
        }
    }

    pub fn lenient() -> Self {
        Self::default()
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_runtime(mut self, runtime: RuntimeMode) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.mode == Mode::Strict
    }
}
