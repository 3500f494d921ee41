//! Composable nodes and the shared handle used to build trees of them
//!
//! A tree is a set of [`ComposableRef`] handles. Compositions hold strong
//! handles to their children; every child keeps a weak back-reference to
//! its parent that is only used for upward traversal.

use crate::clip::Clip;
use crate::composition::{Composition, CompositionData};
use crate::constants::schemas;
use crate::error::OtioError;
use crate::gap::Gap;
use crate::item::ItemData;
use crate::schema::Schema;
use crate::stack::Stack;
use crate::track::Track;
use crate::transition::Transition;
use crate::types::Metadata;
use crate::Result;
use opentime::TimeRange;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

/// Every kind of node that can sit inside a composition
#[derive(Debug)]
pub enum Composable {
    /// Media segment
    Clip(Clip),
    /// Empty space
    Gap(Gap),
    /// Blend between neighbours
    Transition(Transition),
    /// Sequential composition
    Track(Track),
    /// Layered composition
    Stack(Stack),
    /// Generic composition
    Composition(Composition),
}

impl Composable {
    /// Wire identity of this node kind
    pub fn schema(&self) -> Schema {
        match self {
            Composable::Clip(_) => schemas::CLIP,
            Composable::Gap(_) => schemas::GAP,
            Composable::Transition(_) => schemas::TRANSITION,
            Composable::Track(_) => schemas::TRACK,
            Composable::Stack(_) => schemas::STACK,
            Composable::Composition(_) => schemas::COMPOSITION,
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        match self {
            Composable::Transition(t) => &t.name,
            other => other.item().map(|item| item.name.as_str()).unwrap_or_default(),
        }
    }

    /// Set the display name
    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        match self {
            Composable::Transition(t) => t.name = name,
            other => {
                if let Some(item) = other.item_mut() {
                    item.name = name;
                }
            }
        }
    }

    /// User data
    pub fn metadata(&self) -> &Metadata {
        match self {
            Composable::Clip(c) => &c.item.metadata,
            Composable::Gap(g) => &g.item.metadata,
            Composable::Transition(t) => &t.metadata,
            Composable::Track(t) => &t.data.item.metadata,
            Composable::Stack(s) => &s.data.item.metadata,
            Composable::Composition(c) => &c.data.item.metadata,
        }
    }

    /// Mutable user data
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        match self {
            Composable::Clip(c) => &mut c.item.metadata,
            Composable::Gap(g) => &mut g.item.metadata,
            Composable::Transition(t) => &mut t.metadata,
            Composable::Track(t) => &mut t.data.item.metadata,
            Composable::Stack(s) => &mut s.data.item.metadata,
            Composable::Composition(c) => &mut c.data.item.metadata,
        }
    }

    /// Item attributes; `None` for transitions, which carry no trim or attachments
    pub fn item(&self) -> Option<&ItemData> {
        match self {
            Composable::Clip(c) => Some(&c.item),
            Composable::Gap(g) => Some(&g.item),
            Composable::Transition(_) => None,
            Composable::Track(t) => Some(&t.data.item),
            Composable::Stack(s) => Some(&s.data.item),
            Composable::Composition(c) => Some(&c.data.item),
        }
    }

    /// Mutable item attributes
    pub fn item_mut(&mut self) -> Option<&mut ItemData> {
        match self {
            Composable::Clip(c) => Some(&mut c.item),
            Composable::Gap(g) => Some(&mut g.item),
            Composable::Transition(_) => None,
            Composable::Track(t) => Some(&mut t.data.item),
            Composable::Stack(s) => Some(&mut s.data.item),
            Composable::Composition(c) => Some(&mut c.data.item),
        }
    }

    /// Explicit trim, if any
    pub fn source_range(&self) -> Option<TimeRange> {
        self.item().and_then(|item| item.source_range)
    }

    /// Set or clear the explicit trim
    pub fn set_source_range(&mut self, source_range: Option<TimeRange>) -> Result<()> {
        let schema = self.schema();
        match self.item_mut() {
            Some(item) => {
                item.source_range = source_range;
                Ok(())
            }
            None => Err(OtioError::type_mismatch("Item", schema.name())),
        }
    }

    /// Whether the node occupies time in a track
    pub fn visible(&self) -> bool {
        !matches!(self, Composable::Transition(_))
    }

    /// Whether the node consumes time from its neighbours
    pub fn overlapping(&self) -> bool {
        matches!(self, Composable::Transition(_))
    }

    /// Whether the node can hold children
    pub fn is_composition(&self) -> bool {
        self.composition_data().is_some()
    }

    /// Child list and item attributes of a composition
    pub fn composition_data(&self) -> Option<&CompositionData> {
        match self {
            Composable::Track(t) => Some(&t.data),
            Composable::Stack(s) => Some(&s.data),
            Composable::Composition(c) => Some(&c.data),
            _ => None,
        }
    }

    pub(crate) fn composition_data_mut(&mut self) -> Option<&mut CompositionData> {
        match self {
            Composable::Track(t) => Some(&mut t.data),
            Composable::Stack(s) => Some(&mut s.data),
            Composable::Composition(c) => Some(&mut c.data),
            _ => None,
        }
    }

    /// The clip, if this is one
    pub fn as_clip(&self) -> Option<&Clip> {
        match self {
            Composable::Clip(c) => Some(c),
            _ => None,
        }
    }

    /// The clip, mutably
    pub fn as_clip_mut(&mut self) -> Option<&mut Clip> {
        match self {
            Composable::Clip(c) => Some(c),
            _ => None,
        }
    }

    /// The gap, if this is one
    pub fn as_gap(&self) -> Option<&Gap> {
        match self {
            Composable::Gap(g) => Some(g),
            _ => None,
        }
    }

    /// The transition, if this is one
    pub fn as_transition(&self) -> Option<&Transition> {
        match self {
            Composable::Transition(t) => Some(t),
            _ => None,
        }
    }

    /// The transition, mutably
    pub fn as_transition_mut(&mut self) -> Option<&mut Transition> {
        match self {
            Composable::Transition(t) => Some(t),
            _ => None,
        }
    }

    /// The track, if this is one
    pub fn as_track(&self) -> Option<&Track> {
        match self {
            Composable::Track(t) => Some(t),
            _ => None,
        }
    }

    /// The track, mutably
    pub fn as_track_mut(&mut self) -> Option<&mut Track> {
        match self {
            Composable::Track(t) => Some(t),
            _ => None,
        }
    }

    /// The stack, if this is one
    pub fn as_stack(&self) -> Option<&Stack> {
        match self {
            Composable::Stack(s) => Some(s),
            _ => None,
        }
    }

    /// Copy of this node without any children
    fn shallow_copy(&self) -> Composable {
        match self {
            Composable::Clip(c) => Composable::Clip(c.clone()),
            Composable::Gap(g) => Composable::Gap(g.clone()),
            Composable::Transition(t) => Composable::Transition(t.clone()),
            Composable::Track(t) => Composable::Track(Track {
                data: t.data.without_children(),
                kind: t.kind.clone(),
            }),
            Composable::Stack(s) => Composable::Stack(Stack {
                data: s.data.without_children(),
            }),
            Composable::Composition(c) => Composable::Composition(Composition {
                data: c.data.without_children(),
            }),
        }
    }

    /// Field equality, excluding children
    fn shallow_equivalent(&self, other: &Composable) -> bool {
        match (self, other) {
            (Composable::Clip(a), Composable::Clip(b)) => a == b,
            (Composable::Gap(a), Composable::Gap(b)) => a == b,
            (Composable::Transition(a), Composable::Transition(b)) => a == b,
            (Composable::Track(a), Composable::Track(b)) => {
                a.kind == b.kind && a.data.item == b.data.item
            }
            (Composable::Stack(a), Composable::Stack(b)) => a.data.item == b.data.item,
            (Composable::Composition(a), Composable::Composition(b)) => {
                a.data.item == b.data.item
            }
            _ => false,
        }
    }
}

pub(crate) struct Node {
    parent: RefCell<Weak<Node>>,
    value: RefCell<Composable>,
}

/// Shared handle to a node of a timeline tree
///
/// Cloning the handle aliases the node; use [`deep_clone`](Self::deep_clone)
/// for an independent copy. Equality and hashing are by identity.
#[derive(Clone)]
pub struct ComposableRef(Rc<Node>);

impl ComposableRef {
    /// Wrap a node in a fresh, parentless handle
    pub fn new(value: Composable) -> Self {
        Self(Rc::new(Node {
            parent: RefCell::new(Weak::new()),
            value: RefCell::new(value),
        }))
    }

    /// Shared access to the node
    ///
    /// # Panics
    ///
    /// Panics if the node is currently borrowed mutably.
    pub fn borrow(&self) -> Ref<'_, Composable> {
        self.0.value.borrow()
    }

    /// Exclusive access to the node
    ///
    /// Children are not reachable through the returned guard; use the
    /// mutation methods on the handle to change them.
    ///
    /// # Panics
    ///
    /// Panics if the node is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, Composable> {
        self.0.value.borrow_mut()
    }

    /// The composition this node belongs to
    pub fn parent(&self) -> Option<ComposableRef> {
        self.0.parent.borrow().upgrade().map(ComposableRef)
    }

    pub(crate) fn set_parent(&self, parent: Option<&ComposableRef>) {
        *self.0.parent.borrow_mut() = parent.map(|p| Rc::downgrade(&p.0)).unwrap_or_default();
    }

    /// The root of the tree this node is in (itself when parentless)
    pub fn highest_ancestor(&self) -> ComposableRef {
        let mut node = self.clone();
        while let Some(parent) = node.parent() {
            node = parent;
        }
        node
    }

    /// Whether `self` is `other` or one of its ancestors
    pub(crate) fn is_self_or_ancestor_of(&self, other: &ComposableRef) -> bool {
        let mut node = Some(other.clone());
        while let Some(current) = node {
            if current.ptr_eq(self) {
                return true;
            }
            node = current.parent();
        }
        false
    }

    /// Whether both handles point at the same node
    pub fn ptr_eq(&self, other: &ComposableRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Wire identity of the node
    pub fn schema(&self) -> Schema {
        self.borrow().schema()
    }

    /// Display name
    pub fn name(&self) -> String {
        self.borrow().name().to_string()
    }

    /// Explicit trim, if any
    pub fn source_range(&self) -> Option<TimeRange> {
        self.borrow().source_range()
    }

    /// Set or clear the explicit trim
    pub fn set_source_range(&self, source_range: Option<TimeRange>) -> Result<()> {
        self.borrow_mut().set_source_range(source_range)
    }

    /// Whether the node can hold children
    pub fn is_composition(&self) -> bool {
        self.borrow().is_composition()
    }

    /// Whether the node is a clip
    pub fn is_clip(&self) -> bool {
        matches!(&*self.borrow(), Composable::Clip(_))
    }

    /// Independent copy of this node and its whole subtree
    ///
    /// The copy has no parent; children of the copy point at the copy.
    pub fn deep_clone(&self) -> ComposableRef {
        let copy = ComposableRef::new(self.borrow().shallow_copy());
        for child in self.children() {
            copy.attach(child.deep_clone());
        }
        copy
    }

    /// Structural equality of the subtrees, ignoring parents
    pub fn is_equivalent_to(&self, other: &ComposableRef) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if !self.borrow().shallow_equivalent(&other.borrow()) {
            return false;
        }
        let ours = self.children();
        let theirs = other.children();
        ours.len() == theirs.len()
            && ours
                .iter()
                .zip(theirs.iter())
                .all(|(a, b)| a.is_equivalent_to(b))
    }

    /// Push without validation; only for freshly built trees
    pub(crate) fn attach(&self, child: ComposableRef) {
        if let Some(data) = self.borrow_mut().composition_data_mut() {
            data.children.push(child.clone());
        }
        child.set_parent(Some(self));
    }
}

impl PartialEq for ComposableRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ComposableRef {}

impl Hash for ComposableRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Rc::as_ptr(&self.0), state);
    }
}

impl fmt::Debug for ComposableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.value.try_borrow() {
            Ok(value) => f
                .debug_struct("ComposableRef")
                .field("schema", &value.schema().to_string())
                .field("name", &value.name())
                .field("children", &value.composition_data().map_or(0, |d| d.children.len()))
                .finish(),
            Err(_) => f.write_str("ComposableRef(<borrowed>)"),
        }
    }
}

impl From<Composable> for ComposableRef {
    fn from(value: Composable) -> Self {
        ComposableRef::new(value)
    }
}

macro_rules! impl_from_variant {
    ($($ty:ident),*) => {
        $(
            impl From<$ty> for ComposableRef {
                fn from(value: $ty) -> Self {
                    ComposableRef::new(Composable::$ty(value))
                }
            }
        )*
    };
}

impl_from_variant!(Clip, Gap, Transition, Track, Stack, Composition);

#[cfg(test)]
mod tests {
    use super::*;
    use opentime::RationalTime;

    #[test]
    fn test_identity_equality() {
        let a = ComposableRef::from(Clip::new("a"));
        let b = ComposableRef::from(Clip::new("a"));
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert!(a.is_equivalent_to(&b));
    }

    #[test]
    fn test_transition_has_no_source_range() {
        let t = ComposableRef::from(Transition::default());
        let err = t
            .set_source_range(Some(TimeRange::from_values(0.0, 1.0, 24.0)))
            .unwrap_err();
        assert!(matches!(err, OtioError::TypeMismatch { .. }));
        assert!(!t.borrow().visible());
        assert!(t.borrow().overlapping());
    }

    #[test]
    fn test_deep_clone_is_independent() {
        let track = ComposableRef::from(Track::new("v1"));
        track
            .append_child(ComposableRef::from(Gap::new(RationalTime::new(10.0, 24.0))))
            .unwrap();

        let copy = track.deep_clone();
        assert!(copy.is_equivalent_to(&track));
        assert!(copy.parent().is_none());
        let copied_child = copy.child_at_index(0).unwrap();
        assert_eq!(copied_child.parent(), Some(copy.clone()));

        copied_child.borrow_mut().set_name("changed");
        assert_eq!(track.child_at_index(0).unwrap().name(), "");
        assert!(!copy.is_equivalent_to(&track));
    }

    #[test]
    fn test_debug_while_borrowed() {
        let clip = ComposableRef::from(Clip::new("c"));
        let _guard = clip.borrow_mut();
        assert_eq!(format!("{clip:?}"), "ComposableRef(<borrowed>)");
    }
}
