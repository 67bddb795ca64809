use std::collections::HashMap;
use std::fmt;

use crate::error::RuntimeError;
use crate::interpreter::value::{Value, ValueType};

/// A variable together with the type it was first defined with.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub value: Value,
    pub declared: ValueType,
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} = {}", self.name, self.declared, self.value)
    }
}

/// Stack of nested variable frames. Frame 0 is the global frame and is
/// never popped, so there is always at least one frame.
#[derive(Debug)]
pub struct ScopeTable {
    frames: Vec<HashMap<String, Symbol>>,
}

impl Default for ScopeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTable {
    pub fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
        }
    }

    pub fn enter_scope(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Pops the innermost frame; a no-op when only the global frame is left.
    pub fn exit_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Number of active frames, the global one included.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Defines (or redefines) `name` in the innermost frame, taking its
    /// declared type from `value`.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        let symbol = Symbol {
            name: name.clone(),
            declared: value.value_type(),
            value,
        };
        self.current_frame_mut().insert(name, symbol);
    }

    /// Overwrites an existing variable in the innermost frame that holds it.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), RuntimeError> {
        let symbol = self
            .frames
            .iter_mut()
            .rev()
            .find_map(|frame| frame.get_mut(name))
            .ok_or_else(|| RuntimeError::undefined_variable(name))?;

        let offered = value.value_type();
        if !symbol.declared.accepts(offered) {
            return Err(RuntimeError::TypeMismatch {
                name: name.to_string(),
                declared: symbol.declared,
                found: offered,
                span: None,
            });
        }
        symbol.value = value;
        Ok(())
    }

    pub fn symbol(&self, name: &str) -> Option<&Symbol> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.symbol(name).map(|symbol| &symbol.value)
    }

    /// Like `lookup`, but an absent variable is an error.
    pub fn get(&self, name: &str) -> Result<Value, RuntimeError> {
        self.lookup(name)
            .cloned()
            .ok_or_else(|| RuntimeError::undefined_variable(name))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.symbol(name).is_some()
    }

    /// Symbols of the global frame, sorted by name.
    pub fn globals(&self) -> Vec<&Symbol> {
        let mut symbols: Vec<&Symbol> = self.frames[0].values().collect();
        symbols.sort_by(|a, b| a.name.cmp(&b.name));
        symbols
    }

    fn current_frame_mut(&mut self) -> &mut HashMap<String, Symbol> {
        self.frames
            .last_mut()
            .expect("scope table always holds the global frame")
    }
}

impl fmt::Display for ScopeTable {
    /// Frames innermost first, each with its symbols sorted by name.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (depth, frame) in self.frames.iter().enumerate().rev() {
            writeln!(f, "frame {depth}:")?;
            let mut symbols: Vec<&Symbol> = frame.values().collect();
            symbols.sort_by(|a, b| a.name.cmp(&b.name));
            for symbol in symbols {
                writeln!(f, "  {symbol}")?;
            }
        }
        Ok(())
    }
}
