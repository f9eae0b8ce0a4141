//! Parse trees and the fragment stack used to build them.

use std::{borrow::Cow, fmt, mem};

/// A concrete parse tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tree<T> {
    /// A token consumed from the input.
    Leaf(T),

    /// A node built by a reduction.
    ///
    /// `index` identifies which production of `tag` was matched, counted
    /// in the order the productions were originally declared.
    Node {
        tag: Cow<'static, str>,
        index: usize,
        children: Vec<Tree<T>>,
    },
}

impl<T> Tree<T> {
    /// Return the tag name and production index if this is a node.
    pub fn tag(&self) -> Option<(&str, usize)> {
        match self {
            Self::Node { tag, index, .. } => Some((&**tag, *index)),
            Self::Leaf(..) => None,
        }
    }

    pub fn children(&self) -> &[Tree<T>] {
        match self {
            Self::Node { children, .. } => children,
            Self::Leaf(..) => &[],
        }
    }

    pub fn leaf(&self) -> Option<&T> {
        match self {
            Self::Leaf(token) => Some(token),
            Self::Node { .. } => None,
        }
    }

    /// Build a tree of the same shape with converted leaves.
    pub fn map<U>(&self, f: &mut impl FnMut(&T) -> U) -> Tree<U> {
        match self {
            Self::Leaf(token) => Tree::Leaf(f(token)),
            Self::Node {
                tag,
                index,
                children,
            } => Tree::Node {
                tag: tag.clone(),
                index: *index,
                children: children.iter().map(|child| child.map(f)).collect(),
            },
        }
    }
}

// Trees of left-recursive lists are as deep as the list is long. Dropping
// and printing them must not recurse on the depth.
impl<T> Drop for Tree<T> {
    fn drop(&mut self) {
        let mut pending = match self {
            Self::Node { children, .. } => mem::take(children),
            Self::Leaf(..) => return,
        };
        while let Some(mut tree) = pending.pop() {
            if let Self::Node { children, .. } = &mut tree {
                pending.append(children);
            }
        }
    }
}

// `(expr#1 (expr#0 1) + 2)`
impl<T: fmt::Display> fmt::Display for Tree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        enum Step<'t, T> {
            Open(&'t Tree<T>, bool),
            Close,
        }

        let mut steps = vec![Step::Open(self, false)];
        while let Some(step) = steps.pop() {
            let (tree, spaced) = match step {
                Step::Open(tree, spaced) => (tree, spaced),
                Step::Close => {
                    f.write_str(")")?;
                    continue;
                }
            };
            if spaced {
                f.write_str(" ")?;
            }
            match tree {
                Self::Leaf(token) => write!(f, "{}", token)?,
                Self::Node {
                    tag,
                    index,
                    children,
                } => {
                    write!(f, "({}#{}", tag, index)?;
                    steps.push(Step::Close);
                    steps.extend(children.iter().rev().map(|child| Step::Open(child, true)));
                }
            }
        }
        Ok(())
    }
}

/// The working stack of tree fragments maintained while parsing.
#[derive(Debug)]
pub struct TreeStack<T> {
    fragments: Vec<Tree<T>>,
}

impl<T> Default for TreeStack<T> {
    fn default() -> Self {
        Self {
            fragments: Vec::new(),
        }
    }
}

impl<T> TreeStack<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Push a consumed token as a leaf fragment.
    pub fn push(&mut self, token: T) {
        self.fragments.push(Tree::Leaf(token));
    }

    pub fn push_tree(&mut self, tree: Tree<T>) {
        self.fragments.push(tree);
    }

    /// Replace the `arg_count` most recent fragments with a single node.
    ///
    /// The popped fragments become the children of the new node in the
    /// order they were pushed.
    pub fn reduce(
        &mut self,
        tag: impl Into<Cow<'static, str>>,
        index: usize,
        arg_count: usize,
    ) -> Result<(), StackError> {
        let tag = tag.into();
        let available = self.fragments.len();
        if arg_count > available {
            return Err(StackError::Underflow {
                tag: tag.into_owned(),
                index,
                needed: arg_count,
                available,
            });
        }
        let children = self.fragments.split_off(available - arg_count);
        self.fragments.push(Tree::Node {
            tag,
            index,
            children,
        });
        Ok(())
    }

    /// Return the only remaining fragment.
    pub fn finish(mut self) -> Result<Tree<T>, StackError> {
        match self.fragments.len() {
            1 => self.fragments.pop().ok_or(StackError::Unfinished { fragments: 0 }),
            n => Err(StackError::Unfinished { fragments: n }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StackError {
    #[error(
        "cannot reduce to `{tag}' #{index}: {needed} fragment(s) needed, {available} available"
    )]
    Underflow {
        tag: String,
        index: usize,
        needed: usize,
        available: usize,
    },

    #[error("expected exactly one parse tree at the end of input, found {fragments}")]
    Unfinished { fragments: usize },
}
