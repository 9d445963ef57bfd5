/*
 * bridge.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The extension bridge.
//!
//! Custom styles, presentations and processes delegate to named callables,
//! and `%%...%%` / `%(...)%` evaluate scripts. The parser only reaches
//! extensions through [`ExtensionBridge`]; elements cross the boundary as
//! plain [`Element`] values.

use nml_syntax::{Document, Element, Variable};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("No extension language is available")]
    Unavailable,

    #[error("Unknown procedure '{0}'")]
    UnknownProcedure(String),

    #[error("Malformed script: {0}")]
    Malformed(String),

    #[error("{0}")]
    Failed(String),
}

/// A named extension callable: elements in, elements out.
pub type Callable = Arc<dyn Fn(Vec<Element>) -> Result<Vec<Element>, BridgeError> + Send + Sync>;

/// A native function reachable from scripts.
pub type NativeFunction =
    Arc<dyn Fn(&[String], &mut Document) -> Result<String, BridgeError> + Send + Sync>;

pub trait ExtensionBridge {
    /// Evaluate a script fragment, possibly mutating the document. Returns
    /// the textual result.
    fn eval(&self, script: &str, doc: &mut Document) -> Result<String, BridgeError>;

    /// Look up a callable. `None` when undefined.
    fn lookup(&self, name: &str) -> Option<Callable>;
}

/// Bridge with no extension language: nothing is callable and every
/// script fails.
#[derive(Debug, Clone, Default)]
pub struct NullBridge;

impl ExtensionBridge for NullBridge {
    fn eval(&self, _script: &str, _doc: &mut Document) -> Result<String, BridgeError> {
        Err(BridgeError::Unavailable)
    }

    fn lookup(&self, _name: &str) -> Option<Callable> {
        None
    }
}

/// Bridge backed by Rust closures.
///
/// Scripts have the form `(name arg ...)`; arguments are separated by
/// whitespace and may be double-quoted. `get-var` and `set-var` are always
/// available.
///
/// ```
/// use nml_parser::{ExtensionBridge, NativeBridge};
/// use nml_syntax::Document;
///
/// let bridge = NativeBridge::new();
/// let mut doc = Document::new();
/// bridge.eval(r#"(set-var Title "Hello world")"#, &mut doc).unwrap();
/// assert_eq!(bridge.eval("(get-var Title)", &mut doc).unwrap(), "Hello world");
/// ```
#[derive(Clone)]
pub struct NativeBridge {
    procedures: HashMap<String, Callable>,
    functions: HashMap<String, NativeFunction>,
}

impl fmt::Debug for NativeBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut procedures: Vec<_> = self.procedures.keys().collect();
        procedures.sort();
        let mut functions: Vec<_> = self.functions.keys().collect();
        functions.sort();
        f.debug_struct("NativeBridge")
            .field("procedures", &procedures)
            .field("functions", &functions)
            .finish()
    }
}

impl Default for NativeBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeBridge {
    pub fn new() -> Self {
        let mut bridge = NativeBridge {
            procedures: HashMap::new(),
            functions: HashMap::new(),
        };
        bridge.add_function("get-var", |args, doc| match args {
            [name] => doc
                .resolve_variable(name, Path::new("."))
                .ok_or_else(|| BridgeError::Failed(format!("Unknown variable '{}'", name))),
            _ => Err(BridgeError::Failed("get-var expects 1 argument".to_string())),
        });
        bridge.add_function("set-var", |args, doc| match args {
            [name, value] => {
                doc.set_variable(name.clone(), Variable::Text(value.clone()));
                Ok(String::new())
            }
            _ => Err(BridgeError::Failed("set-var expects 2 arguments".to_string())),
        });
        bridge
    }

    /// Register a callable for custom types.
    pub fn add_procedure(
        &mut self,
        name: impl Into<String>,
        procedure: impl Fn(Vec<Element>) -> Result<Vec<Element>, BridgeError> + Send + Sync + 'static,
    ) -> &mut Self {
        self.procedures.insert(name.into(), Arc::new(procedure));
        self
    }

    /// Register a function for scripts.
    pub fn add_function(
        &mut self,
        name: impl Into<String>,
        function: impl Fn(&[String], &mut Document) -> Result<String, BridgeError> + Send + Sync + 'static,
    ) -> &mut Self {
        self.functions.insert(name.into(), Arc::new(function));
        self
    }

    pub fn with_procedure(
        mut self,
        name: impl Into<String>,
        procedure: impl Fn(Vec<Element>) -> Result<Vec<Element>, BridgeError> + Send + Sync + 'static,
    ) -> Self {
        self.add_procedure(name, procedure);
        self
    }

    pub fn with_function(
        mut self,
        name: impl Into<String>,
        function: impl Fn(&[String], &mut Document) -> Result<String, BridgeError> + Send + Sync + 'static,
    ) -> Self {
        self.add_function(name, function);
        self
    }
}

impl ExtensionBridge for NativeBridge {
    fn eval(&self, script: &str, doc: &mut Document) -> Result<String, BridgeError> {
        let words = parse_call(script)?;
        let Some((name, args)) = words.split_first() else {
            return Err(BridgeError::Malformed("empty call".to_string()));
        };
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| BridgeError::UnknownProcedure(name.clone()))?;
        function(args, doc)
    }

    fn lookup(&self, name: &str) -> Option<Callable> {
        self.procedures.get(name).cloned()
    }
}

/// Split `(name arg "quoted arg")` into its words.
fn parse_call(script: &str) -> Result<Vec<String>, BridgeError> {
    let inner = script
        .trim()
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| BridgeError::Malformed(format!("expected `(name ...)`, got `{}`", script.trim())))?;

    let mut words = Vec::new();
    let mut chars = inner.chars().peekable();
    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }
        let mut word = String::new();
        if ch == '"' {
            chars.next();
            let mut closed = false;
            while let Some(ch) = chars.next() {
                match ch {
                    '\\' => {
                        if let Some(escaped) = chars.next() {
                            word.push(escaped);
                        }
                    }
                    '"' => {
                        closed = true;
                        break;
                    }
                    other => word.push(other),
                }
            }
            if !closed {
                return Err(BridgeError::Malformed("unterminated string".to_string()));
            }
        } else {
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() {
                    break;
                }
                word.push(ch);
                chars.next();
            }
        }
        words.push(word);
    }
    Ok(words)
}
