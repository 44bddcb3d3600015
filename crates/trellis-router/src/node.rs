//! Trie node implementation.
//!
//! Each node owns one pattern segment. Children are split by kind so the
//! lookup can try them in precedence order: static, regex, plain, wildcard.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::params::INLINE_PARAMS;
use crate::pattern::Segment;

/// Captured parameter values for the branch currently being explored.
pub(crate) type Captures<'p> = SmallVec<[&'p str; INLINE_PARAMS]>;

/// Payload stored where a pattern terminates.
#[derive(Debug, Clone)]
pub struct Leaf<T> {
    /// The registered value.
    pub value: T,
    /// Parameter names declared by the pattern, in order.
    pub names: Arc<[Arc<str>]>,
}

/// A node in the per-method trie.
#[derive(Debug, Clone)]
pub struct Node<T> {
    segment: Segment,
    leaf: Option<Leaf<T>>,
    /// Sorted by literal for binary search.
    static_children: Vec<Node<T>>,
    /// Registration order.
    regex_children: Vec<Node<T>>,
    /// Registration order.
    param_children: Vec<Node<T>>,
    wildcard_child: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    fn new(segment: Segment) -> Self {
        Self {
            segment,
            leaf: None,
            static_children: Vec::new(),
            regex_children: Vec::new(),
            param_children: Vec::new(),
            wildcard_child: None,
        }
    }

    /// Creates the root node of a tree.
    #[must_use]
    pub fn root() -> Self {
        Self::new(Segment::Static(String::new()))
    }

    /// Returns the segment this node matches.
    #[must_use]
    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    /// Returns the leaf terminating at this node, if any.
    #[must_use]
    pub fn leaf(&self) -> Option<&Leaf<T>> {
        self.leaf.as_ref()
    }

    /// Returns the number of direct children of every kind.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.static_children.len()
            + self.regex_children.len()
            + self.param_children.len()
            + usize::from(self.wildcard_child.is_some())
    }

    /// Inserts `segments` below this node, terminating in `leaf`.
    ///
    /// Returns the replaced payload when the pattern was already present.
    pub fn insert(&mut self, segments: &[Segment], leaf: Leaf<T>) -> Option<T> {
        let Some((first, rest)) = segments.split_first() else {
            return self.leaf.replace(leaf).map(|old| old.value);
        };

        let child = match first {
            Segment::Static(text) => {
                let i = match self
                    .static_children
                    .binary_search_by(|c| static_text(c).cmp(text.as_str()))
                {
                    Ok(i) => i,
                    Err(i) => {
                        self.static_children.insert(i, Node::new(first.clone()));
                        i
                    }
                };
                &mut self.static_children[i]
            }
            Segment::Regex { .. } => find_or_push(&mut self.regex_children, first),
            Segment::Param(_) => find_or_push(&mut self.param_children, first),
            Segment::Wildcard => &mut **self
                .wildcard_child
                .get_or_insert_with(|| Box::new(Node::new(Segment::Wildcard))),
        };

        child.insert(rest, leaf)
    }

    /// Looks up the leaf for `rest`, the unmatched part of the path.
    ///
    /// `None` means every segment has been consumed. Values bound along the
    /// way are pushed onto `captures` and popped again when a branch fails.
    pub(crate) fn find<'n, 'p>(
        &'n self,
        rest: Option<&'p str>,
        captures: &mut Captures<'p>,
    ) -> Option<&'n Leaf<T>> {
        let Some(rest) = rest else {
            return self.leaf.as_ref();
        };

        let (segment, next) = match rest.split_once('/') {
            Some((segment, next)) => (segment, Some(next)),
            None => (rest, None),
        };

        if let Some(child) = self.find_static_child(segment) {
            if let Some(leaf) = child.find(next, captures) {
                return Some(leaf);
            }
        }

        for child in &self.regex_children {
            if let Segment::Regex { regex, .. } = &child.segment {
                if regex.is_match(segment) {
                    if let Some(leaf) = child.try_bound(segment, next, captures) {
                        return Some(leaf);
                    }
                }
            }
        }

        if !segment.is_empty() {
            for child in &self.param_children {
                if let Some(leaf) = child.try_bound(segment, next, captures) {
                    return Some(leaf);
                }
            }
        }

        if let Some(child) = &self.wildcard_child {
            if let Some(leaf) = &child.leaf {
                captures.push(rest);
                return Some(leaf);
            }
        }

        None
    }

    fn try_bound<'n, 'p>(
        &'n self,
        value: &'p str,
        next: Option<&'p str>,
        captures: &mut Captures<'p>,
    ) -> Option<&'n Leaf<T>> {
        captures.push(value);
        let found = self.find(next, captures);
        if found.is_none() {
            captures.pop();
        }
        found
    }

    fn find_static_child(&self, segment: &str) -> Option<&Node<T>> {
        self.static_children
            .binary_search_by(|c| static_text(c).cmp(segment))
            .ok()
            .map(|i| &self.static_children[i])
    }

    /// Visits every leaf in the subtree.
    pub(crate) fn for_each_leaf<'n>(&'n self, f: &mut impl FnMut(&'n Leaf<T>)) {
        if let Some(leaf) = &self.leaf {
            f(leaf);
        }
        for child in self
            .static_children
            .iter()
            .chain(&self.regex_children)
            .chain(&self.param_children)
            .chain(self.wildcard_child.as_deref())
        {
            child.for_each_leaf(f);
        }
    }
}

fn static_text<T>(node: &Node<T>) -> &str {
    match &node.segment {
        Segment::Static(text) => text,
        _ => "",
    }
}

fn find_or_push<'a, T>(children: &'a mut Vec<Node<T>>, segment: &Segment) -> &'a mut Node<T> {
    let i = match children.iter().position(|c| c.segment == *segment) {
        Some(i) => i,
        None => {
            children.push(Node::new(segment.clone()));
            children.len() - 1
        }
    };
    &mut children[i]
}
