/*
 * document.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The parsed document: a syntax tree plus its side-tables.

use crate::custom::CustomType;
use crate::element::Element;
use crate::outline::Outline;
use crate::tree::{NodeId, SyntaxTree};
use crate::variable::{ProxyError, Variable};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Upper bound on proxy hops when resolving a variable
const MAX_PROXY_HOPS: usize = 64;

/// Registry entry for a figure, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FigureEntry {
    pub id: usize,
    pub path: String,
}

/// Registry entry for an external reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalRefEntry {
    pub num: usize,
    pub description: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    tree: SyntaxTree,
    variables: BTreeMap<String, Variable>,
    figures: IndexMap<String, FigureEntry>,
    external_refs: Vec<ExternalRefEntry>,
    outline: Outline,
    custom_types: IndexMap<String, CustomType>,
    figure_counter: usize,
    external_ref_counter: usize,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty document for a nested parse. Variables, figures, custom types
    /// and id counters are inherited from `parent`.
    pub fn inherit(parent: &Document) -> Self {
        Document {
            variables: parent.variables.clone(),
            figures: parent.figures.clone(),
            custom_types: parent.custom_types.clone(),
            figure_counter: parent.figure_counter,
            external_ref_counter: parent.external_ref_counter,
            ..Document::default()
        }
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut SyntaxTree {
        &mut self.tree
    }

    pub fn into_tree(self) -> SyntaxTree {
        self.tree
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn last(&self) -> Option<&Element> {
        self.tree.last()
    }

    pub fn last_mut(&mut self) -> Option<&mut Element> {
        self.tree.last_mut()
    }

    /// Append an element, registering figures, external references and
    /// sections in the side-tables. Figure and reference ids are assigned
    /// here.
    pub fn push(&mut self, mut element: Element) -> NodeId {
        match &mut element {
            Element::Figure(figure) => {
                self.figure_counter += 1;
                figure.id = self.figure_counter;
                self.figures.insert(
                    figure.name.clone(),
                    FigureEntry {
                        id: figure.id,
                        path: figure.path.clone(),
                    },
                );
            }
            Element::ExternalRef(reference) => {
                self.external_ref_counter += 1;
                reference.num = self.external_ref_counter;
                self.external_refs.push(ExternalRefEntry {
                    num: reference.num,
                    description: reference.description.clone(),
                    url: reference.url.clone(),
                });
            }
            Element::Section(section) => self.outline.record(section),
            _ => {}
        }
        self.tree.push(element)
    }

    /// Take variables and custom types from `other`.
    pub fn merge_non_elems(&mut self, other: &Document) {
        for (name, value) in &other.variables {
            self.variables.insert(name.clone(), value.clone());
        }
        for (name, custom) in &other.custom_types {
            if !self.custom_types.contains_key(name) {
                self.custom_types.insert(name.clone(), custom.clone());
            }
        }
    }

    /// Take the side-tables of `other` and append its elements.
    pub fn merge(&mut self, other: Document) {
        self.merge_non_elems(&other);
        for element in other.tree.into_elements() {
            self.push(element);
        }
    }

    // Variables

    pub fn set_variable(&mut self, name: impl Into<String>, value: Variable) {
        self.variables.insert(name.into(), value);
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn remove_variable(&mut self, name: &str) -> Option<Variable> {
        self.variables.remove(name)
    }

    pub fn variables(&self) -> impl Iterator<Item = (&String, &Variable)> {
        self.variables.iter()
    }

    /// String value of `name`, following proxies. Path variables display
    /// relative to `base`. Returns `None` for undefined names and dangling
    /// or looping proxy chains.
    pub fn resolve_variable(&self, name: &str, base: &Path) -> Option<String> {
        let mut current = name;
        for _ in 0..MAX_PROXY_HOPS {
            match self.variables.get(current)? {
                Variable::Text(text) => return Some(text.clone()),
                Variable::Path(path) => return Some(Variable::display_path(path, base)),
                Variable::Proxy(target) => current = target,
            }
        }
        None
    }

    pub fn variable_or(&self, name: &str, default: &str, base: &Path) -> String {
        self.resolve_variable(name, base)
            .unwrap_or_else(|| default.to_string())
    }

    /// Check that defining `name` as a proxy of `target` is sound.
    ///
    /// The target must exist. Its proxy chain is followed; reaching `name`
    /// again or a name already on the chain is a cycle, and ending on an
    /// undefined name is a dangling chain.
    ///
    /// ```
    /// use nml_syntax::{Document, ProxyError, Variable};
    ///
    /// let mut doc = Document::new();
    /// doc.set_variable("B", Variable::Text("x".into()));
    /// assert!(doc.check_proxy("A", "B").is_ok());
    ///
    /// doc.set_variable("A", Variable::Proxy("B".into()));
    /// assert!(matches!(doc.check_proxy("B", "A"), Err(ProxyError::Cycle(_))));
    /// ```
    pub fn check_proxy(&self, name: &str, target: &str) -> Result<(), ProxyError> {
        if !self.variables.contains_key(target) {
            return Err(ProxyError::Missing(target.to_string()));
        }

        let mut chain = vec![name.to_string(), target.to_string()];
        if name == target {
            return Err(ProxyError::Cycle(chain));
        }
        let mut current = target;
        loop {
            match self.variables.get(current) {
                None => return Err(ProxyError::Dangling(chain)),
                Some(Variable::Proxy(next)) => {
                    let seen = chain.iter().any(|visited| visited == next);
                    chain.push(next.clone());
                    if seen {
                        return Err(ProxyError::Cycle(chain));
                    }
                    current = next;
                }
                Some(_) => return Ok(()),
            }
        }
    }

    // Figures and references

    pub fn figure(&self, name: &str) -> Option<&FigureEntry> {
        self.figures.get(name)
    }

    pub fn has_figure(&self, name: &str) -> bool {
        self.figures.contains_key(name)
    }

    pub fn figures(&self) -> impl Iterator<Item = (&String, &FigureEntry)> {
        self.figures.iter()
    }

    pub fn external_refs(&self) -> &[ExternalRefEntry] {
        &self.external_refs
    }

    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    // Custom types

    /// Register a custom type. Returns false if the name is taken.
    pub fn add_custom_type(&mut self, custom: CustomType) -> bool {
        let name = custom.name().to_string();
        if self.custom_types.contains_key(&name) {
            return false;
        }
        self.custom_types.insert(name, custom);
        true
    }

    pub fn custom_type(&self, name: &str) -> Option<&CustomType> {
        self.custom_types.get(name)
    }

    /// Custom types in registration order
    pub fn custom_types(&self) -> impl Iterator<Item = &CustomType> {
        self.custom_types.values()
    }
}
