/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Document model for NML.
//!
//! A parse produces a [`Document`]: an ordered [`SyntaxTree`] of
//! [`Element`]s plus side-tables for variables, figures, external
//! references, the section outline and user-defined custom types.

pub mod bullet;
pub mod custom;
pub mod document;
pub mod element;
pub mod outline;
pub mod style;
pub mod tree;
pub mod variable;

pub use bullet::{Bullet, NumberingKind, OrderedBullet};
pub use custom::{CustomPresentation, CustomProcess, CustomStyle, CustomType};
pub use document::{Document, ExternalRefEntry, FigureEntry};
pub use element::{
    Annotation, Break, Code, CodeFragment, CustomPresentationMark, CustomStyleMark, Element,
    ElementTag, ExternalRef, Figure, Latex, Link, ListBegin, ListEnd, ListEntry, Presentation,
    PresentationKind, Quote, Raw, Reference, ReferenceKind, Ruler, Section, TexMode, Text,
};
pub use outline::{Outline, OutlineEntry};
pub use style::Style;
pub use tree::{NodeId, SyntaxTree};
pub use variable::{ProxyError, Variable};
