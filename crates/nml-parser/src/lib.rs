/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Incremental multi-pattern scanner for NML.
//!
//! ```
//! use nml_parser::Engine;
//! use nml_syntax::Element;
//!
//! let doc = Engine::new().parse_str("doc", "#+Who world\nHello %Who%").unwrap();
//! assert!(doc.tree().iter().any(|e| e == &Element::text("world")));
//! ```

pub mod bridge;
pub mod config;
pub mod engine;
pub mod error;
pub mod fs;
mod handlers;
pub mod pattern;
pub mod renderer;
pub mod scanner;
pub mod state;
pub mod token;

pub use bridge::{BridgeError, Callable, ExtensionBridge, NativeBridge, NativeFunction, NullBridge};
pub use config::{NmlConfig, ParserConfig, RenderOptions};
pub use engine::Engine;
pub use error::{ErrorKind, ParseError, ParseResult};
pub use fs::{FileSystem, MemoryFileSystem, NullFileSystem, RealFileSystem};
pub use pattern::{PatternEntry, PatternKind, PatternTable};
pub use renderer::{Renderer, TextRenderer};
