//! Lexical scope frames
//!
//! A parent-linked arena of frames, generic over the variable and function
//! binding payloads: the checker stores [`Variable`]/[`Function`] bindings,
//! the interpreter stores runtime values. Frames never move or drop while
//! the arena lives, so a frame id can be held across calls (the interpreter
//! uses this for closures over a method's defining frame).
//!
//! Variable lookup walks the parent chain innermost to root. Functions are
//! keyed by name and arity, so `f(x)` and `f(x, y)` coexist.
//!
//! [`Variable`]: crate::types::Variable
//! [`Function`]: crate::types::Function

use id_arena::{Arena, Id};
use indexmap::IndexMap;

pub type FrameId<V, F> = Id<Frame<V, F>>;

/// One scope level: its bindings plus a link to the enclosing frame.
#[derive(Debug)]
pub struct Frame<V, F> {
    parent: Option<FrameId<V, F>>,
    variables: IndexMap<String, V>,
    functions: IndexMap<(String, usize), F>,
}

impl<V, F> Frame<V, F> {
    fn new(parent: Option<FrameId<V, F>>) -> Self {
        Self {
            parent,
            variables: IndexMap::new(),
            functions: IndexMap::new(),
        }
    }
}

/// Arena owning every frame of one checker or interpreter run.
#[derive(Debug)]
pub struct ScopeArena<V, F> {
    frames: Arena<Frame<V, F>>,
}

impl<V, F> ScopeArena<V, F> {
    /// Create an arena holding a single root frame.
    pub fn new() -> (Self, FrameId<V, F>) {
        let mut frames = Arena::new();
        let root = frames.alloc(Frame::new(None));
        (Self { frames }, root)
    }

    /// Open a child frame of `parent`.
    pub fn push(&mut self, parent: FrameId<V, F>) -> FrameId<V, F> {
        self.frames.alloc(Frame::new(Some(parent)))
    }

    pub fn parent(&self, frame: FrameId<V, F>) -> Option<FrameId<V, F>> {
        self.frames[frame].parent
    }

    /// Bind `name` in `frame`, shadowing any outer binding and replacing a
    /// previous one in the same frame.
    pub fn define_variable(&mut self, frame: FrameId<V, F>, name: impl Into<String>, value: V) {
        self.frames[frame].variables.insert(name.into(), value);
    }

    pub fn define_function(
        &mut self,
        frame: FrameId<V, F>,
        name: impl Into<String>,
        arity: usize,
        value: F,
    ) {
        self.frames[frame]
            .functions
            .insert((name.into(), arity), value);
    }

    /// True if `name` is bound directly in `frame` (parents not consulted).
    pub fn is_defined_here(&self, frame: FrameId<V, F>, name: &str) -> bool {
        self.frames[frame].variables.contains_key(name)
    }

    /// True if the function `name`/`arity` is bound directly in `frame`.
    pub fn is_function_defined_here(&self, frame: FrameId<V, F>, name: &str, arity: usize) -> bool {
        self.frames[frame]
            .functions
            .contains_key(&(name.to_string(), arity))
    }

    /// Resolve `name` starting at `frame` and walking outward.
    pub fn lookup_variable(&self, frame: FrameId<V, F>, name: &str) -> Option<&V> {
        self.frame_defining(frame, name)
            .map(|f| &self.frames[f].variables[name])
    }

    pub fn lookup_variable_mut(&mut self, frame: FrameId<V, F>, name: &str) -> Option<&mut V> {
        let defining = self.frame_defining(frame, name)?;
        self.frames[defining].variables.get_mut(name)
    }

    /// Resolve the function `name` with exactly `arity` parameters,
    /// starting at `frame` and walking outward.
    pub fn lookup_function(&self, frame: FrameId<V, F>, name: &str, arity: usize) -> Option<&F> {
        let mut current = Some(frame);
        while let Some(f) = current {
            if let Some(found) = self.frames[f].functions.get(&(name.to_string(), arity)) {
                return Some(found);
            }
            current = self.frames[f].parent;
        }
        None
    }

    fn frame_defining(&self, frame: FrameId<V, F>, name: &str) -> Option<FrameId<V, F>> {
        let mut current = Some(frame);
        while let Some(f) = current {
            if self.frames[f].variables.contains_key(name) {
                return Some(f);
            }
            current = self.frames[f].parent;
        }
        None
    }
}
