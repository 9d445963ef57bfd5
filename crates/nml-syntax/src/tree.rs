/*
 * tree.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Arena-backed ordered element sequence.
//!
//! Elements live in slots addressed by [`NodeId`] handles. A handle carries
//! the generation of its slot, so a handle to a removed element never
//! resolves to whatever reuses the slot later. Document order is kept in a
//! separate handle list.

use crate::element::Element;
use serde::de::Deserializer;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

/// Stable handle to an element of one [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    element: Option<Element>,
}

#[derive(Debug, Clone, Default)]
pub struct SyntaxTree {
    slots: Vec<Slot>,
    free: Vec<usize>,
    order: Vec<NodeId>,
}

impl SyntaxTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    fn allocate(&mut self, element: Element) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.element = Some(element);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    element: Some(element),
                });
                NodeId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    fn release(&mut self, id: NodeId) -> Option<Element> {
        let slot = self.slots.get_mut(id.index)?;
        if slot.generation != id.generation {
            return None;
        }
        let element = slot.element.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(element)
    }

    /// Append an element at the end of the tree.
    pub fn push(&mut self, element: Element) -> NodeId {
        let id = self.allocate(element);
        self.order.push(id);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_mut())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn last_id(&self) -> Option<NodeId> {
        self.order.last().copied()
    }

    pub fn last(&self) -> Option<&Element> {
        self.last_id().and_then(|id| self.get(id))
    }

    pub fn last_mut(&mut self) -> Option<&mut Element> {
        let id = self.last_id()?;
        self.get_mut(id)
    }

    pub fn pop(&mut self) -> Option<Element> {
        let id = self.order.pop()?;
        self.release(id)
    }

    /// Position of `id` in document order
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.order.iter().position(|other| *other == id)
    }

    pub fn remove(&mut self, id: NodeId) -> Option<Element> {
        let position = self.position(id)?;
        self.order.remove(position);
        self.release(id)
    }

    /// Insert `element` right before `anchor`. Returns `None` if `anchor`
    /// is not in the tree.
    pub fn insert_before(&mut self, anchor: NodeId, element: Element) -> Option<NodeId> {
        let position = self.position(anchor)?;
        let id = self.allocate(element);
        self.order.insert(position, id);
        Some(id)
    }

    /// Handles in document order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.order.iter().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> + '_ {
        self.order.iter().filter_map(|id| self.get(*id))
    }

    /// Last element matching `predicate`, searching backwards
    pub fn rfind(&self, predicate: impl Fn(&Element) -> bool) -> Option<NodeId> {
        self.order
            .iter()
            .rev()
            .copied()
            .find(|id| self.get(*id).is_some_and(&predicate))
    }

    /// Detach every element after `anchor`, in order.
    pub fn split_off_after(&mut self, anchor: NodeId) -> Vec<Element> {
        let Some(position) = self.position(anchor) else {
            return Vec::new();
        };
        let tail = self.order.split_off(position + 1);
        tail.into_iter().filter_map(|id| self.release(id)).collect()
    }

    pub fn into_elements(mut self) -> Vec<Element> {
        let order = std::mem::take(&mut self.order);
        order.into_iter().filter_map(|id| self.release(id)).collect()
    }
}

impl PartialEq for SyntaxTree {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Extend<Element> for SyntaxTree {
    fn extend<I: IntoIterator<Item = Element>>(&mut self, iter: I) {
        for element in iter {
            self.push(element);
        }
    }
}

impl FromIterator<Element> for SyntaxTree {
    fn from_iter<I: IntoIterator<Item = Element>>(iter: I) -> Self {
        let mut tree = SyntaxTree::new();
        tree.extend(iter);
        tree
    }
}

impl Serialize for SyntaxTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for element in self.iter() {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for SyntaxTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let elements = Vec::<Element>::deserialize(deserializer)?;
        Ok(elements.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Break, Element};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn texts(tree: &SyntaxTree) -> Vec<String> {
        tree.iter()
            .map(|e| e.as_text().unwrap_or("<other>").to_string())
            .collect()
    }

    #[test]
    fn test_push_and_get() {
        let mut tree = SyntaxTree::new();
        let a = tree.push(Element::text("a"));
        let b = tree.push(Element::text("b"));

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get(a).and_then(Element::as_text), Some("a"));
        assert_eq!(tree.get(b).and_then(Element::as_text), Some("b"));
        assert_eq!(tree.last_id(), Some(b));
    }

    #[test]
    fn test_stale_handle_does_not_resolve() {
        let mut tree = SyntaxTree::new();
        let a = tree.push(Element::text("a"));
        tree.remove(a);
        let b = tree.push(Element::text("b"));

        // Slot reused, generation bumped
        assert!(tree.get(a).is_none());
        assert!(!tree.contains(a));
        assert_eq!(tree.get(b).and_then(Element::as_text), Some("b"));
        assert!(tree.remove(a).is_none());
    }

    #[test]
    fn test_insert_before() {
        let mut tree: SyntaxTree = vec![Element::text("a"), Element::text("c")]
            .into_iter()
            .collect();
        let c = tree.last_id().unwrap();
        tree.insert_before(c, Element::text("b")).unwrap();
        assert_eq!(texts(&tree), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_off_after() {
        let mut tree = SyntaxTree::new();
        tree.push(Element::text("a"));
        let mark = tree.push(Element::Break(Break { size: 0 }));
        tree.push(Element::text("b"));
        tree.push(Element::text("c"));

        let tail = tree.split_off_after(mark);
        assert_eq!(tail, vec![Element::text("b"), Element::text("c")]);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.last_id(), Some(mark));
    }

    #[test]
    fn test_rfind() {
        let mut tree = SyntaxTree::new();
        let first = tree.push(Element::text("x"));
        let second = tree.push(Element::text("x"));
        tree.push(Element::text("y"));

        assert_eq!(tree.rfind(|e| e.as_text() == Some("x")), Some(second));
        tree.remove(second);
        assert_eq!(tree.rfind(|e| e.as_text() == Some("x")), Some(first));
        assert_eq!(tree.rfind(|e| e.as_text() == Some("z")), None);
    }

    #[test]
    fn test_pop_and_last_mut() {
        let mut tree = SyntaxTree::new();
        tree.push(Element::text("a"));
        tree.push(Element::text("b"));

        if let Some(Element::Text(text)) = tree.last_mut() {
            text.content.push('!');
        }
        assert_eq!(tree.pop(), Some(Element::text("b!")));
        assert_eq!(tree.pop(), Some(Element::text("a")));
        assert_eq!(tree.pop(), None);
    }

    #[test]
    fn test_equality_ignores_slot_layout() {
        let mut left = SyntaxTree::new();
        let gone = left.push(Element::text("gone"));
        left.push(Element::text("a"));
        left.remove(gone);

        let right: SyntaxTree = std::iter::once(Element::text("a")).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_serializes_as_sequence() {
        let tree: SyntaxTree = vec![Element::text("a"), Element::Break(Break { size: 1 })]
            .into_iter()
            .collect();
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json[0]["Text"]["content"], "a");
        assert_eq!(json[1]["Break"]["size"], 1);

        let back: SyntaxTree = serde_json::from_value(json).unwrap();
        assert_eq!(back, tree);
    }

    proptest! {
        #[test]
        fn removals_preserve_relative_order(
            words in proptest::collection::vec("[a-z]{1,3}", 1..20),
            drop_mask in proptest::collection::vec(any::<bool>(), 20),
        ) {
            let mut tree = SyntaxTree::new();
            let ids: Vec<NodeId> = words.iter().map(|w| tree.push(Element::text(w.clone()))).collect();

            let mut expected = Vec::new();
            for (i, (id, word)) in ids.iter().zip(&words).enumerate() {
                if drop_mask[i] {
                    prop_assert!(tree.remove(*id).is_some());
                } else {
                    expected.push(word.clone());
                }
            }
            prop_assert_eq!(texts(&tree), expected);
        }
    }
}
