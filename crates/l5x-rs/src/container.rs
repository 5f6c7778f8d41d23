// crates/l5x-rs/src/container.rs

//! Ordered, name-unique collections backed directly by the element tree.
//!
//! A [`LogixContainer`] is a view over one parent element (e.g. `<Tags>`) and
//! its children of one element name (e.g. `<Tag>`). Collection operations are
//! translated into child-node mutations. Components are only deserialized when
//! they are requested, so iterating a large container costs one wrapper per
//! element actually visited.
//!
//! Components returned by [`find`](LogixContainer::find), [`get`](LogixContainer::get),
//! [`at`](LogixContainer::at) and iteration are live views: setting a property
//! on them writes straight into the document.

use crate::component::{LogixComponent, names_equal, validate_name};
use crate::error::L5xError;
use crate::xml::Element;
use core::fmt;
use core::marker::PhantomData;
use log::debug;

pub struct LogixContainer<T: LogixComponent> {
    element: Element,
    _marker: PhantomData<T>,
}

impl<T: LogixComponent> Clone for LogixContainer<T> {
    fn clone(&self) -> Self {
        Self::from_element(self.element.clone())
    }
}

impl<T: LogixComponent> fmt::Debug for LogixContainer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogixContainer")
            .field("element", &T::CONTAINER)
            .field("count", &self.count())
            .finish()
    }
}

impl<T: LogixComponent> Default for LogixContainer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: LogixComponent> LogixContainer<T> {
    /// Creates an empty, detached container element.
    pub fn new() -> Self {
        Self::from_element(Element::new(T::CONTAINER))
    }

    /// Wraps an existing container element.
    pub fn from_element(element: Element) -> Self {
        LogixContainer {
            element,
            _marker: PhantomData,
        }
    }

    /// Creates a detached container holding copies of `components`.
    pub fn from_components(components: &[T]) -> Result<Self, L5xError> {
        let container = Self::new();
        container.add_many(components)?;
        Ok(container)
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    /// The container element, for attaching it to a component.
    pub fn serialize(&self) -> Element {
        self.element.clone()
    }

    fn nodes(&self) -> Vec<Element> {
        self.element.elements_named(T::ELEMENT)
    }

    fn find_node(&self, name: &str) -> Option<Element> {
        self.nodes().into_iter().find(|node| {
            node.attribute("Name")
                .is_some_and(|n| names_equal(&n, name))
        })
    }

    fn node_at(&self, index: usize) -> Result<Element, L5xError> {
        let nodes = self.nodes();
        let len = nodes.len();
        nodes
            .into_iter()
            .nth(index)
            .ok_or(L5xError::IndexOutOfRange { index, len })
    }

    fn collision(&self, name: &str) -> L5xError {
        L5xError::NameCollision {
            name: name.to_string(),
            container: T::CONTAINER.to_string(),
        }
    }

    /// Validates the component name, returning it.
    fn checked_name(component: &T) -> Result<String, L5xError> {
        let name = component.name()?;
        validate_name(&name)?;
        Ok(name)
    }

    // --- Queries ---

    pub fn count(&self) -> usize {
        self.nodes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find_node(name).is_some()
    }

    /// Names of all children in node order, read without deserializing them.
    pub fn names(&self) -> Vec<String> {
        self.nodes()
            .iter()
            .filter_map(|node| node.attribute("Name"))
            .collect()
    }

    /// Lazily deserializes each child in node order.
    ///
    /// Each call builds fresh views from the current node state.
    pub fn iter(&self) -> impl Iterator<Item = Result<T, L5xError>> + '_ {
        self.nodes().into_iter().map(T::deserialize)
    }

    /// Deserializes every child. Prefer [`iter`](Self::iter) for large containers.
    pub fn to_vec(&self) -> Result<Vec<T>, L5xError> {
        self.iter().collect()
    }

    /// Looks up a component by name; absence is not an error.
    pub fn find(&self, name: &str) -> Result<Option<T>, L5xError> {
        self.find_node(name).map(T::deserialize).transpose()
    }

    /// Looks up a component by name; absence is a [`L5xError::NotFound`].
    pub fn get(&self, name: &str) -> Result<T, L5xError> {
        self.find(name)?.ok_or_else(|| L5xError::NotFound {
            name: name.to_string(),
            container: T::CONTAINER.to_string(),
        })
    }

    /// The component at `index` in node order.
    pub fn at(&self, index: usize) -> Result<T, L5xError> {
        T::deserialize(self.node_at(index)?)
    }

    // --- Mutation ---

    /// Appends a component after validating its name and uniqueness.
    pub fn add(&self, component: &T) -> Result<(), L5xError> {
        let name = Self::checked_name(component)?;
        if self.contains(&name) {
            return Err(self.collision(&name));
        }
        self.element.append(component.serialize());
        debug!("Added {} '{}' to {}", T::ELEMENT, name, T::CONTAINER);
        Ok(())
    }

    /// Appends all components, or none of them when any fails validation.
    pub fn add_many(&self, components: &[T]) -> Result<(), L5xError> {
        let mut batch: Vec<String> = Vec::with_capacity(components.len());
        for component in components {
            let name = Self::checked_name(component)?;
            if self.contains(&name) || batch.iter().any(|n| names_equal(n, &name)) {
                return Err(self.collision(&name));
            }
            batch.push(name);
        }
        for component in components {
            self.element.append(component.serialize());
        }
        debug!("Added {} {} elements to {}", batch.len(), T::ELEMENT, T::CONTAINER);
        Ok(())
    }

    /// Inserts a component at `index` in node order. `index == count()` appends.
    pub fn insert(&self, index: usize, component: &T) -> Result<(), L5xError> {
        let nodes = self.nodes();
        if index > nodes.len() {
            return Err(L5xError::IndexOutOfRange {
                index,
                len: nodes.len(),
            });
        }
        let name = Self::checked_name(component)?;
        if self.contains(&name) {
            return Err(self.collision(&name));
        }
        match nodes.get(index) {
            Some(next) => {
                next.add_before_self(component.serialize())?;
            }
            None => match nodes.last() {
                Some(last) => {
                    last.add_after_self(component.serialize())?;
                }
                None => {
                    self.element.append(component.serialize());
                }
            },
        }
        debug!("Inserted {} '{}' at {} in {}", T::ELEMENT, name, index, T::CONTAINER);
        Ok(())
    }

    /// Replaces the component at `index`.
    pub fn set_at(&self, index: usize, component: &T) -> Result<(), L5xError> {
        let target = self.node_at(index)?;
        let name = Self::checked_name(component)?;
        if let Some(existing) = self.find_node(&name) {
            if !existing.ptr_eq(&target) {
                return Err(self.collision(&name));
            }
        }
        target.replace_with(component.serialize())?;
        Ok(())
    }

    /// Removes the named component. Returns `false` (not an error) when absent.
    pub fn remove(&self, name: &str) -> bool {
        match self.find_node(name) {
            Some(node) => {
                node.remove();
                debug!("Removed {} '{}' from {}", T::ELEMENT, name, T::CONTAINER);
                true
            }
            None => false,
        }
    }

    pub fn remove_at(&self, index: usize) -> Result<(), L5xError> {
        self.node_at(index)?.remove();
        Ok(())
    }

    /// Removes every component matching `predicate`. Every child is
    /// deserialized before any is removed.
    pub fn remove_where(&self, predicate: impl Fn(&T) -> bool) -> Result<usize, L5xError> {
        let mut doomed = Vec::new();
        for node in self.nodes() {
            if predicate(&T::deserialize(node.clone())?) {
                doomed.push(node);
            }
        }
        for node in &doomed {
            node.remove();
        }
        debug!("Removed {} {} elements from {}", doomed.len(), T::ELEMENT, T::CONTAINER);
        Ok(doomed.len())
    }

    pub fn clear(&self) {
        self.element.remove_elements_named(T::ELEMENT);
    }

    /// Replaces the same-named component in place, or appends it when absent.
    ///
    /// A component already attached here is left in place, but fails when a
    /// sibling carries its name.
    pub fn update(&self, component: &T) -> Result<(), L5xError> {
        let name = Self::checked_name(component)?;
        let (own, others): (Vec<Element>, Vec<Element>) = self
            .nodes()
            .into_iter()
            .filter(|node| node.attribute("Name").is_some_and(|n| names_equal(&n, &name)))
            .partition(|node| node.ptr_eq(component.element()));
        match (own.is_empty(), others.as_slice()) {
            (true, []) => {
                self.element.append(component.serialize());
                debug!("Added {} '{}' to {}", T::ELEMENT, name, T::CONTAINER);
            }
            (true, [existing]) => {
                existing.replace_with(component.serialize())?;
                debug!("Updated {} '{}' in {}", T::ELEMENT, name, T::CONTAINER);
            }
            (false, []) => {}
            _ => return Err(self.collision(&name)),
        }
        Ok(())
    }

    /// Applies `mutate` to every component matching `predicate`.
    ///
    /// The sweep is all-or-nothing: each match is mutated on a detached copy,
    /// and nodes are only replaced once every mutation succeeded and the
    /// resulting names are valid and unique. Views obtained before the call
    /// keep pointing at the replaced (now detached) nodes.
    pub fn update_where(
        &self,
        predicate: impl Fn(&T) -> bool,
        mut mutate: impl FnMut(&T) -> Result<(), L5xError>,
    ) -> Result<usize, L5xError> {
        let nodes = self.nodes();
        let mut staged: Vec<(Element, T)> = Vec::new();
        for node in &nodes {
            if !predicate(&T::deserialize(node.clone())?) {
                continue;
            }
            let copy = T::deserialize(node.deep_clone())?;
            mutate(&copy)?;
            staged.push((node.clone(), copy));
        }

        let mut final_names: Vec<String> = Vec::with_capacity(nodes.len());
        for node in &nodes {
            let name = match staged.iter().find(|(n, _)| n.ptr_eq(node)) {
                Some((_, copy)) => Self::checked_name(copy)?,
                None => node.attribute("Name").unwrap_or_default(),
            };
            if final_names.iter().any(|n| names_equal(n, &name)) {
                return Err(self.collision(&name));
            }
            final_names.push(name);
        }

        for (node, copy) in &staged {
            node.replace_with(copy.serialize())?;
        }
        debug!("Updated {} {} elements in {}", staged.len(), T::ELEMENT, T::CONTAINER);
        Ok(staged.len())
    }

    /// Applies `mutate` to every component. See [`update_where`](Self::update_where).
    pub fn update_all(
        &self,
        mutate: impl FnMut(&T) -> Result<(), L5xError>,
    ) -> Result<usize, L5xError> {
        self.update_where(|_| true, mutate)
    }

    /// Renames a component after checking the new name is valid and unused.
    pub fn rename(&self, current: &str, new_name: &str) -> Result<(), L5xError> {
        validate_name(new_name)?;
        let node = self.find_node(current).ok_or_else(|| L5xError::NotFound {
            name: current.to_string(),
            container: T::CONTAINER.to_string(),
        })?;
        if let Some(other) = self.find_node(new_name) {
            if !other.ptr_eq(&node) {
                return Err(self.collision(new_name));
            }
        }
        node.set_attribute("Name", new_name);
        debug!("Renamed {} '{}' to '{}' in {}", T::ELEMENT, current, new_name, T::CONTAINER);
        Ok(())
    }
}
