/*
 * engine.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The parse entry point.
//!
//! An [`Engine`] bundles everything a parse consults besides the source:
//! configuration, filesystem, extension bridge and the renderer whose
//! reserved variables are validated. It is built once and shared by every
//! parse.

use crate::bridge::{ExtensionBridge, NullBridge};
use crate::config::ParserConfig;
use crate::error::{ErrorKind, ParseError, ParseResult};
use crate::fs::{FileSystem, RealFileSystem, normalize};
use crate::pattern::PatternTable;
use crate::renderer::Renderer;
use crate::scanner::{Scanner, Session};
use nml_source_map::Buffer;
use nml_syntax::Document;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct Engine {
    config: ParserConfig,
    fs: Box<dyn FileSystem>,
    bridge: Box<dyn ExtensionBridge>,
    renderer: Option<Box<dyn Renderer>>,
    working_dir: PathBuf,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("renderer", &self.renderer.as_ref().map(|r| r.name().to_string()))
            .field("working_dir", &self.working_dir)
            .finish_non_exhaustive()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Engine over the real filesystem, without extensions or renderer.
    pub fn new() -> Self {
        Engine {
            config: ParserConfig::default(),
            fs: Box::new(RealFileSystem),
            bridge: Box::new(NullBridge),
            renderer: None,
            working_dir: PathBuf::from("."),
        }
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_file_system(mut self, fs: impl FileSystem + 'static) -> Self {
        self.fs = Box::new(fs);
        self
    }

    pub fn with_bridge(mut self, bridge: impl ExtensionBridge + 'static) -> Self {
        self.bridge = Box::new(bridge);
        self
    }

    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Directory relative includes and path variables start from.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn file_system(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    pub fn bridge(&self) -> &dyn ExtensionBridge {
        self.bridge.as_ref()
    }

    pub fn renderer(&self) -> Option<&dyn Renderer> {
        self.renderer.as_deref()
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Parse a whole buffer into a document.
    pub fn parse(&self, buffer: &Buffer) -> ParseResult<Document> {
        self.parse_in(buffer, self.working_dir.clone())
    }

    pub fn parse_str(&self, name: &str, content: &str) -> ParseResult<Document> {
        self.parse(&Buffer::new(name, content))
    }

    /// Read and parse a file. Includes inside it resolve against the
    /// file's directory.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> ParseResult<Document> {
        let path = normalize(&self.working_dir.join(path.as_ref()));
        let content = self.fs.read_to_string(&path).map_err(|e| {
            ParseError::new(
                ErrorKind::IncludeIO,
                "Invalid Input",
                format!("Unable to open file '{}'", path.display()),
            )
            .with_hint(e.to_string())
        })?;
        let cwd = path.parent().map(Path::to_path_buf).unwrap_or_default();
        info!(path = %path.display(), "parsing");
        self.parse_in(&Buffer::new(path.display().to_string(), content), cwd)
    }

    fn parse_in(&self, buffer: &Buffer, cwd: PathBuf) -> ParseResult<Document> {
        let mut session = Session::new(self, cwd);
        let (doc, _) = Scanner::run(&mut session, buffer, None, PatternTable::builtin())?;
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFileSystem;
    use crate::renderer::TextRenderer;
    use nml_syntax::Element;

    #[test]
    fn test_parse_str() {
        let doc = Engine::new().parse_str("doc", "hello").unwrap();
        assert_eq!(doc.tree().iter().collect::<Vec<_>>(), vec![&Element::text("hello")]);
    }

    #[test]
    fn test_parse_file_from_memory() {
        let engine = Engine::new()
            .with_file_system(MemoryFileSystem::with_files([("notes/a.nml", "text")]))
            .with_working_dir("");
        let doc = engine.parse_file("notes/a.nml").unwrap();
        assert_eq!(doc.tree().len(), 1);

        let err = engine.parse_file("notes/missing.nml").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncludeIO);
    }

    #[test]
    fn test_debug_names_renderer() {
        let engine = Engine::new().with_renderer(TextRenderer);
        assert!(format!("{:?}", engine).contains("Text"));
    }
}
