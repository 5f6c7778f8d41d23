// crates/l5x-rs/src/xml.rs

//! The backing element tree.
//!
//! Every domain object in this crate is a view over an [`Element`] of this tree.
//! An `Element` is a reference-counted handle: cloning it aliases the same node,
//! so a write through one handle is immediately visible through every other.
//! Children are owned by their parent; the parent link is a weak back-reference.
//!
//! The tree is neither `Send` nor `Sync`. Callers that share a document between
//! threads must serialize access themselves.

use crate::config::SaveOptions;
use crate::error::L5xError;
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
}

struct ElementData {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
    parent: Weak<RefCell<ElementData>>,
}

/// Handle to a node of the backing tree.
#[derive(Clone)]
pub struct Element(Rc<RefCell<ElementData>>);

impl Element {
    /// Creates a detached element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Element(Rc::new(RefCell::new(ElementData {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            parent: Weak::new(),
        })))
    }

    /// Builder-style attribute setter, used when composing new elements.
    pub fn with_attribute(self, name: &str, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder-style child append.
    pub fn with_child(self, child: Element) -> Self {
        self.append(child);
        self
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.0.borrow().name == name
    }

    /// Returns `true` when both handles point at the same node.
    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    // --- Attributes ---

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0
            .borrow()
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.0.borrow().attributes.iter().any(|(k, _)| k == name)
    }

    /// Adds the attribute, or replaces its value in place keeping attribute order.
    pub fn set_attribute(&self, name: &str, value: impl Into<String>) {
        let value = value.into();
        let mut data = self.0.borrow_mut();
        match data.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => data.attributes.push((name.to_string(), value)),
        }
    }

    pub fn remove_attribute(&self, name: &str) -> bool {
        let mut data = self.0.borrow_mut();
        let before = data.attributes.len();
        data.attributes.retain(|(k, _)| k != name);
        data.attributes.len() != before
    }

    pub fn attributes(&self) -> Vec<(String, String)> {
        self.0.borrow().attributes.clone()
    }

    // --- Navigation ---

    pub fn parent(&self) -> Option<Element> {
        self.0.borrow().parent.upgrade().map(Element)
    }

    pub fn children(&self) -> Vec<Node> {
        self.0.borrow().children.clone()
    }

    /// All child elements in document order.
    pub fn elements(&self) -> Vec<Element> {
        self.0
            .borrow()
            .children
            .iter()
            .filter_map(|n| match n {
                Node::Element(e) => Some(e.clone()),
                _ => None,
            })
            .collect()
    }

    /// Child elements with the given name, in document order.
    pub fn elements_named(&self, name: &str) -> Vec<Element> {
        self.elements()
            .into_iter()
            .filter(|e| e.is_named(name))
            .collect()
    }

    /// The first child element with the given name.
    pub fn element(&self, name: &str) -> Option<Element> {
        self.elements().into_iter().find(|e| e.is_named(name))
    }

    pub fn first_element(&self) -> Option<Element> {
        self.elements().into_iter().next()
    }

    /// All descendants (excluding `self`) in document order.
    pub fn descendants(&self) -> Vec<Element> {
        let mut out = Vec::new();
        for child in self.elements() {
            out.push(child.clone());
            out.extend(child.descendants());
        }
        out
    }

    fn is_ancestor_of(&self, other: &Element) -> bool {
        let mut current = other.parent();
        while let Some(p) = current {
            if p.ptr_eq(self) {
                return true;
            }
            current = p.parent();
        }
        false
    }

    fn position_in_parent(&self) -> Option<(Element, usize)> {
        let parent = self.parent()?;
        let index = parent.0.borrow().children.iter().position(|n| match n {
            Node::Element(e) => e.ptr_eq(self),
            _ => false,
        })?;
        Some((parent, index))
    }

    // --- Text content ---

    /// Concatenated text and CDATA content, or `None` when there is none.
    pub fn text(&self) -> Option<String> {
        let data = self.0.borrow();
        let mut out: Option<String> = None;
        for child in &data.children {
            if let Node::Text(t) | Node::CData(t) = child {
                out.get_or_insert_with(String::new).push_str(t);
            }
        }
        out
    }

    /// Replaces all children with a single CDATA section.
    pub fn set_cdata(&self, text: impl Into<String>) {
        self.clear_children();
        self.0.borrow_mut().children.push(Node::CData(text.into()));
    }

    /// Replaces all children with a single text node.
    pub fn set_text(&self, text: impl Into<String>) {
        self.clear_children();
        self.0.borrow_mut().children.push(Node::Text(text.into()));
    }

    fn push_text(&self, text: String) {
        let mut data = self.0.borrow_mut();
        if let Some(Node::Text(last)) = data.children.last_mut() {
            last.push_str(&text);
        } else {
            data.children.push(Node::Text(text));
        }
    }

    fn push_node(&self, node: Node) {
        self.0.borrow_mut().children.push(node);
    }

    // --- Mutation ---

    /// Takes ownership of `child` for insertion below `self`.
    ///
    /// An element that already has a parent (or would create a cycle) is deep
    /// copied; the original stays where it is.
    fn adopt(&self, child: Element) -> Element {
        let child = if child.parent().is_some() || child.ptr_eq(self) || child.is_ancestor_of(self)
        {
            child.deep_clone()
        } else {
            child
        };
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        child
    }

    /// Appends `child` as the last child node and returns the attached handle.
    pub fn append(&self, child: Element) -> Element {
        let child = self.adopt(child);
        self.0
            .borrow_mut()
            .children
            .push(Node::Element(child.clone()));
        child
    }

    /// Inserts `child` as the first child node and returns the attached handle.
    pub fn prepend(&self, child: Element) -> Element {
        let child = self.adopt(child);
        self.0
            .borrow_mut()
            .children
            .insert(0, Node::Element(child.clone()));
        child
    }

    /// Inserts `sibling` directly before `self` in its parent.
    pub fn add_before_self(&self, sibling: Element) -> Result<Element, L5xError> {
        let (parent, index) = self
            .position_in_parent()
            .ok_or(L5xError::InvalidArgument("element has no parent"))?;
        let sibling = parent.adopt(sibling);
        parent
            .0
            .borrow_mut()
            .children
            .insert(index, Node::Element(sibling.clone()));
        Ok(sibling)
    }

    /// Inserts `sibling` directly after `self` in its parent.
    pub fn add_after_self(&self, sibling: Element) -> Result<Element, L5xError> {
        let (parent, index) = self
            .position_in_parent()
            .ok_or(L5xError::InvalidArgument("element has no parent"))?;
        let sibling = parent.adopt(sibling);
        parent
            .0
            .borrow_mut()
            .children
            .insert(index + 1, Node::Element(sibling.clone()));
        Ok(sibling)
    }

    /// Puts `replacement` at the position of `self` and detaches `self`.
    pub fn replace_with(&self, replacement: Element) -> Result<Element, L5xError> {
        if replacement.ptr_eq(self) {
            return Ok(replacement);
        }
        let (parent, index) = self
            .position_in_parent()
            .ok_or(L5xError::InvalidArgument("element has no parent"))?;
        let replacement = parent.adopt(replacement);
        parent.0.borrow_mut().children[index] = Node::Element(replacement.clone());
        self.0.borrow_mut().parent = Weak::new();
        Ok(replacement)
    }

    /// Detaches `self` from its parent. Returns `false` when already detached.
    pub fn remove(&self) -> bool {
        match self.position_in_parent() {
            Some((parent, index)) => {
                parent.0.borrow_mut().children.remove(index);
                self.0.borrow_mut().parent = Weak::new();
                true
            }
            None => false,
        }
    }

    /// Removes every child element with the given name. Returns how many were removed.
    pub fn remove_elements_named(&self, name: &str) -> usize {
        let doomed = self.elements_named(name);
        for e in &doomed {
            e.remove();
        }
        doomed.len()
    }

    pub fn clear_children(&self) {
        let children = std::mem::take(&mut self.0.borrow_mut().children);
        for child in children {
            if let Node::Element(e) = child {
                e.0.borrow_mut().parent = Weak::new();
            }
        }
    }

    /// Creates a detached, structurally equal copy of this subtree.
    pub fn deep_clone(&self) -> Element {
        let data = self.0.borrow();
        let copy = Element::new(data.name.clone());
        copy.0.borrow_mut().attributes = data.attributes.clone();
        for child in &data.children {
            match child {
                Node::Element(e) => {
                    copy.append(e.deep_clone());
                }
                other => copy.push_node(other.clone()),
            }
        }
        copy
    }

    // --- Text I/O ---

    /// Parses XML text into a detached root element.
    pub fn parse(xml: &str) -> Result<Element, L5xError> {
        parse(xml)
    }

    /// Writes this subtree as XML text (no declaration).
    pub fn to_xml_string(&self) -> Result<String, L5xError> {
        write(self, &SaveOptions::default().with_declaration(false))
    }
}

impl PartialEq for Element {
    /// Structural equality: same name, attributes and children.
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let a = self.0.borrow();
        let b = other.0.borrow();
        a.name == b.name && a.attributes == b.attributes && a.children == b.children
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("Element")
            .field("name", &data.name)
            .field("attributes", &data.attributes)
            .field("children", &data.children.len())
            .finish()
    }
}

// --- Reader ---

/// Parses XML text into a detached root element.
///
/// Whitespace-only text between elements is dropped, CDATA is preserved and
/// entity references are resolved.
pub fn parse(xml: &str) -> Result<Element, L5xError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut pending = String::new();

    loop {
        let event = reader.read_event()?;

        // Text and entity references arrive as separate events; join them first.
        match &event {
            Event::Text(_) | Event::GeneralRef(_) => {}
            _ => flush_text(&stack, &mut pending),
        }

        match event {
            Event::Start(e) => {
                let element = start_element(&e)?;
                if let Some(parent) = stack.last() {
                    parent.append(element.clone());
                }
                stack.push(element);
            }
            Event::Empty(e) => {
                let element = start_element(&e)?;
                match stack.last() {
                    Some(parent) => {
                        parent.append(element);
                    }
                    None => set_root(&mut root, element)?,
                }
            }
            Event::End(_) => {
                if let Some(element) = stack.pop() {
                    if stack.is_empty() {
                        set_root(&mut root, element)?;
                    }
                }
            }
            Event::Text(e) => {
                if !stack.is_empty() {
                    pending.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::GeneralRef(e) => {
                if let Some(ch) = e.resolve_char_ref()? {
                    pending.push(ch);
                } else {
                    let name = String::from_utf8_lossy(&e).into_owned();
                    match quick_xml::escape::resolve_predefined_entity(&name) {
                        Some(resolved) => pending.push_str(resolved),
                        None => {
                            return Err(L5xError::Unsupported {
                                element: "entity".into(),
                                detail: format!("unknown entity reference '&{};'", name),
                            });
                        }
                    }
                }
            }
            Event::CData(e) => {
                if let Some(parent) = stack.last() {
                    parent.push_node(Node::CData(String::from_utf8_lossy(&e).into_owned()));
                }
            }
            Event::Comment(e) => {
                if let Some(parent) = stack.last() {
                    parent.push_node(Node::Comment(String::from_utf8_lossy(&e).into_owned()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        let name = open.name();
        return Err(L5xError::MissingElement {
            child: format!("</{}>", name),
            element: name,
        });
    }

    root.ok_or_else(|| L5xError::MissingElement {
        element: "document".into(),
        child: "root element".into(),
    })
}

fn flush_text(stack: &[Element], pending: &mut String) {
    if pending.is_empty() {
        return;
    }
    let text = std::mem::take(pending);
    if text.trim().is_empty() {
        return;
    }
    if let Some(parent) = stack.last() {
        parent.push_text(text);
    }
}

fn set_root(root: &mut Option<Element>, element: Element) -> Result<(), L5xError> {
    if root.is_some() {
        return Err(L5xError::Unsupported {
            element: element.name(),
            detail: "document has more than one root element".into(),
        });
    }
    *root = Some(element);
    Ok(())
}

fn start_element(e: &BytesStart<'_>) -> Result<Element, L5xError> {
    let element = Element::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.0.borrow_mut().attributes.push((key, value));
    }
    Ok(element)
}

// --- Writer ---

/// Writes `root` as a complete XML document according to `options`.
pub fn write(root: &Element, options: &SaveOptions) -> Result<String, L5xError> {
    let mut writer = Writer::new(Vec::new());

    if options.declaration {
        let standalone = if options.standalone { Some("yes") } else { None };
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), standalone)))?;
        if options.indent_size > 0 {
            writer.write_event(Event::Text(BytesText::from_escaped("\n")))?;
        }
    }

    write_element(&mut writer, root, 0, options, false)?;

    String::from_utf8(writer.into_inner()).map_err(|_| L5xError::InvalidArgument("written XML is not UTF-8"))
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    element: &Element,
    depth: usize,
    options: &SaveOptions,
    inline: bool,
) -> Result<(), L5xError> {
    let name = element.name();
    let mut start = BytesStart::new(name.as_str());
    for (key, value) in element.attributes() {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    let children = element.children();
    if children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;

    // Mixed content is written as-is; indentation would alter the text.
    let has_text = children
        .iter()
        .any(|c| matches!(c, Node::Text(_) | Node::CData(_)));
    let indented = !inline && !has_text && options.indent_size > 0;

    for child in &children {
        if indented {
            let ws = format!("\n{}", options.indent(depth + 1));
            writer.write_event(Event::Text(BytesText::from_escaped(ws)))?;
        }
        match child {
            Node::Element(e) => write_element(writer, e, depth + 1, options, !indented)?,
            Node::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
            Node::CData(t) => writer.write_event(Event::CData(BytesCData::new(t.as_str())))?,
            Node::Comment(t) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(t.as_str())))?
            }
        }
    }

    if indented {
        let ws = format!("\n{}", options.indent(depth));
        writer.write_event(Event::Text(BytesText::from_escaped(ws)))?;
    }
    writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Tags>
  <Tag Name="A" DataType="DINT">
    <Description><![CDATA[Motor & pump]]></Description>
  </Tag>
  <Tag Name="B" DataType="BOOL"/>
</Tags>"#;

    #[test]
    fn test_parse_structure() {
        let root = parse(SAMPLE).unwrap();
        assert_eq!(root.name(), "Tags");
        let tags = root.elements_named("Tag");
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].attribute("Name").as_deref(), Some("A"));
        let description = tags[0].element("Description").unwrap();
        assert_eq!(description.text().as_deref(), Some("Motor & pump"));
        assert!(tags[1].parent().unwrap().ptr_eq(&root));
    }

    #[test]
    fn test_entities_are_resolved_in_attributes_and_text() {
        let root = parse(r#"<A Text="x &lt; y"><B>a &amp; b</B></A>"#).unwrap();
        assert_eq!(root.attribute("Text").as_deref(), Some("x < y"));
        assert_eq!(root.element("B").unwrap().text().as_deref(), Some("a & b"));
    }

    #[test]
    fn test_unclosed_document_is_an_error() {
        assert!(parse("<A><B></B>").is_err());
    }

    #[test]
    fn test_handles_alias_the_same_node() {
        let root = Element::new("Root");
        let child = root.append(Element::new("Child"));
        let again = root.element("Child").unwrap();
        again.set_attribute("Name", "X");
        assert_eq!(child.attribute("Name").as_deref(), Some("X"));
    }

    #[test]
    fn test_append_attached_element_copies_it() {
        let a = Element::new("A");
        let b = Element::new("B");
        let child = a.append(Element::new("C"));
        let copy = b.append(child.clone());
        assert!(!copy.ptr_eq(&child));
        assert_eq!(a.elements().len(), 1);
        assert_eq!(b.elements().len(), 1);
    }

    #[test]
    fn test_replace_with_keeps_position() {
        let root = parse("<R><A/><B/><C/></R>").unwrap();
        let b = root.element("B").unwrap();
        b.replace_with(Element::new("X")).unwrap();
        let names: Vec<String> = root.elements().iter().map(|e| e.name()).collect();
        assert_eq!(names, ["A", "X", "C"]);
        assert!(b.parent().is_none());
    }

    #[test]
    fn test_add_before_and_after_self() {
        let root = parse("<R><B/></R>").unwrap();
        let b = root.element("B").unwrap();
        b.add_before_self(Element::new("A")).unwrap();
        b.add_after_self(Element::new("C")).unwrap();
        let names: Vec<String> = root.elements().iter().map(|e| e.name()).collect();
        assert_eq!(names, ["A", "B", "C"]);
    }

    #[test]
    fn test_remove_detaches() {
        let root = parse("<R><A/><B/></R>").unwrap();
        let a = root.element("A").unwrap();
        assert!(a.remove());
        assert!(!a.remove());
        assert_eq!(root.elements().len(), 1);
    }

    #[test]
    fn test_write_then_parse_is_structurally_equal() {
        let root = parse(SAMPLE).unwrap();
        let text = write(&root, &SaveOptions::default()).unwrap();
        assert!(text.starts_with("<?xml"));
        assert!(text.contains("<![CDATA[Motor & pump]]>"));
        let again = parse(&text).unwrap();
        assert_eq!(root, again);
    }

    #[test]
    fn test_write_indents_nested_elements() {
        let root = parse("<R><A><B/></A></R>").unwrap();
        let text = root.to_xml_string().unwrap();
        assert_eq!(text, "<R>\n  <A>\n    <B/>\n  </A>\n</R>");
    }

    #[test]
    fn test_deep_clone_is_detached_and_equal() {
        let root = parse(SAMPLE).unwrap();
        let tag = root.element("Tag").unwrap();
        let copy = tag.deep_clone();
        assert!(copy.parent().is_none());
        assert_eq!(copy, tag);
        copy.set_attribute("Name", "Z");
        assert_eq!(tag.attribute("Name").as_deref(), Some("A"));
    }
}
