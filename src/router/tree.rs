//! Compressed prefix tree holding the routes of one HTTP method.
//!
//! Every edge is labelled with a byte string. Static text is shared between
//! routes by splitting edges at the longest common prefix, so a lookup costs
//! one pass over the request path. Two wildcard kinds hang off the tree:
//!
//! | Syntax  | Matches                                        |
//! |---------|------------------------------------------------|
//! | `:name` | one path segment, up to the next `/` or the end |
//! | `*name` | the rest of the path, `/` included; last only    |
//!
//! A wildcard child is the only child of its parent, which is what keeps
//! every request path mapped to at most one route.

use std::borrow::Cow;

use crate::context::Parameters;

use super::error::RegistrationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Static,
    Param,
    CatchAll,
}

#[derive(Debug, Clone)]
struct Node<T> {
    // Edge label; may end in the middle of a UTF-8 sequence after a split.
    segment: Vec<u8>,
    kind: NodeKind,
    // Number of routes registered at or below this node.
    priority: u32,
    // First byte of each static child's segment, parallel to `children`.
    indices: Vec<u8>,
    // `children[0]` is a param or catch-all node and the only child.
    wild_child: bool,
    children: Vec<Node<T>>,
    value: Option<T>,
}

/// Result of [`Tree::get`].
#[derive(Debug)]
pub struct Lookup<'t, T> {
    /// The value registered for the path, if any.
    pub value: Option<&'t T>,
    /// Wildcard values bound on the way down, in root-to-leaf order.
    pub params: Parameters,
    /// `true` when no value matched but the same path with a trailing slash
    /// added or removed would.
    pub tsr: bool,
}

/// One radix tree. `T` is whatever a route resolves to, usually a handler.
///
/// # Examples
///
/// ```
/// use radixroute::router::Tree;
///
/// let mut tree = Tree::new();
/// tree.insert("/user/:name", "user").unwrap();
/// tree.insert("/static/*filepath", "files").unwrap();
///
/// let found = tree.get("/user/gopher");
/// assert_eq!(found.value, Some(&"user"));
/// assert_eq!(found.params.get("name"), Some("gopher"));
///
/// let found = tree.get("/static/css/site.css");
/// assert_eq!(found.params.get("filepath"), Some("/css/site.css"));
///
/// assert!(tree.get("/user/gopher/").tsr);
/// ```
#[derive(Debug, Clone)]
pub struct Tree<T> {
    root: Node<T>,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    pub fn new() -> Self {
        Self { root: Node::empty() }
    }

    /// Returns `true` if no route has been inserted.
    pub fn is_empty(&self) -> bool {
        self.root.segment.is_empty() && self.root.children.is_empty()
    }

    /// Resolves `path` to its value, binding wildcard parameters.
    ///
    /// Never mutates the tree, so any number of lookups may run concurrently.
    pub fn get(&self, path: &str) -> Lookup<'_, T> {
        let (value, params) = self.root.find(path);
        let tsr = value.is_none() && self.has_route(&toggle_trailing_slash(path));
        Lookup { value, params, tsr }
    }

    /// Returns `true` if `path` resolves to a value.
    pub fn has_route(&self, path: &str) -> bool {
        self.root.find(path).0.is_some()
    }

    /// Case-insensitive lookup returning the registered spelling of `path`.
    ///
    /// Static segments are compared ignoring ASCII case; wildcard values are
    /// copied from the request unchanged. With `fix_trailing_slash` a path
    /// that is only off by a trailing slash is corrected as well. Only the
    /// corrected path is returned, and only if it resolves to a value.
    pub fn find_case_insensitive_path(&self, path: &str, fix_trailing_slash: bool) -> Option<String> {
        let mut fixed = Vec::with_capacity(path.len() + 1);
        if !self
            .root
            .find_case_insensitive(path.as_bytes(), fix_trailing_slash, &mut fixed)
        {
            return None;
        }

        String::from_utf8(fixed)
            .ok()
            .filter(|fixed| self.has_route(fixed))
    }
}

impl<T> Tree<T> {
    /// Registers `value` under `path`.
    ///
    /// The path is checked against the tree before anything is modified, so
    /// a rejected path leaves the tree as it was.
    ///
    /// # Errors
    ///
    /// Any [`RegistrationError`] other than [`RegistrationError::MissingFilepath`].
    pub fn insert(&mut self, path: &str, value: T) -> Result<(), RegistrationError> {
        if !path.starts_with('/') {
            return Err(RegistrationError::MissingLeadingSlash {
                path: path.to_owned(),
            });
        }

        validate_wildcards(path)?;
        if !self.is_empty() {
            self.root.check_insert(path.as_bytes(), path)?;
        }
        self.root.add_route(path, value)
    }
}

impl<T> Node<T> {
    fn empty() -> Self {
        Self {
            segment: Vec::new(),
            kind: NodeKind::Static,
            priority: 0,
            indices: Vec::new(),
            wild_child: false,
            children: Vec::new(),
            value: None,
        }
    }

    // Bumps the priority of `children[pos]` and moves it in front of every
    // sibling with a lower priority. Returns the child's new position.
    fn increment_child_priority(&mut self, pos: usize) -> usize {
        self.children[pos].priority += 1;
        let priority = self.children[pos].priority;

        let mut new_pos = pos;
        while new_pos > 0 && self.children[new_pos - 1].priority < priority {
            self.children.swap(new_pos - 1, new_pos);
            new_pos -= 1;
        }

        if new_pos != pos {
            let index = self.indices.remove(pos);
            self.indices.insert(new_pos, index);
        }

        new_pos
    }

    fn add_route(&mut self, full_path: &str, value: T) -> Result<(), RegistrationError> {
        self.priority += 1;

        if self.segment.is_empty() && self.children.is_empty() {
            return self.insert_child(full_path.as_bytes(), full_path, value);
        }

        self.walk_insert(full_path.as_bytes(), full_path, value)
    }

    fn walk_insert(&mut self, path: &[u8], full_path: &str, value: T) -> Result<(), RegistrationError> {
        let common = path
            .iter()
            .zip(&self.segment)
            .take_while(|(a, b)| a == b)
            .count();

        // Split the edge: the shared prefix stays here, the rest moves down.
        if common < self.segment.len() {
            let suffix = self.segment.split_off(common);
            let child = Node {
                indices: std::mem::take(&mut self.indices),
                children: std::mem::take(&mut self.children),
                value: self.value.take(),
                wild_child: self.wild_child,
                kind: NodeKind::Static,
                priority: self.priority.saturating_sub(1),
                segment: suffix,
            };
            self.indices = vec![child.segment[0]];
            self.children = vec![child];
            self.wild_child = false;
        }

        if common == path.len() {
            if self.value.is_some() {
                return Err(RegistrationError::Duplicate {
                    path: full_path.to_owned(),
                });
            }
            self.value = Some(value);
            return Ok(());
        }

        let path = &path[common..];

        if self.wild_child {
            let child = &mut self.children[0];
            child.priority += 1;

            let len = child.segment.len();
            if path.len() >= len
                && path[..len] == child.segment[..]
                && child.kind != NodeKind::CatchAll
                // rules out a longer name like `:names` against `:name`
                && (len >= path.len() || path[len] == b'/')
            {
                return child.walk_insert(path, full_path, value);
            }

            return Err(wildcard_conflict(child, path, full_path));
        }

        let first = path[0];

        // `/` right after a param continues into its only child
        if self.kind == NodeKind::Param && first == b'/' && self.children.len() == 1 {
            let child = &mut self.children[0];
            child.priority += 1;
            return child.walk_insert(path, full_path, value);
        }

        if let Some(pos) = self.indices.iter().position(|&b| b == first) {
            let pos = self.increment_child_priority(pos);
            return self.children[pos].walk_insert(path, full_path, value);
        }

        if first != b':' && first != b'*' {
            self.indices.push(first);
            self.children.push(Node::empty());
            let pos = self.increment_child_priority(self.children.len() - 1);
            return self.children[pos].insert_child(path, full_path, value);
        }

        self.insert_child(path, full_path, value)
    }

    // Builds the chain of nodes for `path` below a node that has no
    // matching child yet.
    fn insert_child(&mut self, mut path: &[u8], full_path: &str, value: T) -> Result<(), RegistrationError> {
        let mut node = self;

        while let Some((wildcard, start, valid)) = find_wildcard(path) {
            if !valid {
                return Err(RegistrationError::InvalidWildcard {
                    path: full_path.to_owned(),
                    segment: lossy(wildcard),
                });
            }
            if wildcard.len() < 2 {
                return Err(RegistrationError::UnnamedWildcard {
                    path: full_path.to_owned(),
                });
            }
            if !node.children.is_empty() {
                return Err(RegistrationError::ChildConflict {
                    path: full_path.to_owned(),
                    segment: lossy(wildcard),
                });
            }

            if wildcard[0] == b':' {
                if start > 0 {
                    node.segment = path[..start].to_vec();
                    path = &path[start..];
                }

                node.wild_child = true;
                node.children = vec![Node {
                    segment: wildcard.to_vec(),
                    kind: NodeKind::Param,
                    priority: 1,
                    ..Node::empty()
                }];
                node = &mut node.children[0];

                // More path after the param: it starts with '/'.
                if wildcard.len() < path.len() {
                    path = &path[wildcard.len()..];
                    node.children = vec![Node {
                        priority: 1,
                        ..Node::empty()
                    }];
                    node = &mut node.children[0];
                    continue;
                }

                node.value = Some(value);
                return Ok(());
            }

            if start + wildcard.len() != path.len() {
                return Err(RegistrationError::CatchAllNotAtEnd {
                    path: full_path.to_owned(),
                });
            }
            if node.segment.last() == Some(&b'/') {
                return Err(RegistrationError::CatchAllConflict {
                    path: full_path.to_owned(),
                });
            }
            if start == 0 || path[start - 1] != b'/' {
                return Err(RegistrationError::MissingSlashBeforeCatchAll {
                    path: full_path.to_owned(),
                });
            }

            // The leading '/' belongs to the catch-all so `/src/*p` also
            // matches `/src/`.
            let slash = start - 1;
            node.segment = path[..slash].to_vec();
            node.indices = vec![b'/'];
            node.children = vec![Node {
                kind: NodeKind::CatchAll,
                wild_child: true,
                priority: 1,
                children: vec![Node {
                    segment: path[slash..].to_vec(),
                    kind: NodeKind::CatchAll,
                    priority: 1,
                    value: Some(value),
                    ..Node::empty()
                }],
                ..Node::empty()
            }];
            return Ok(());
        }

        node.segment = path.to_vec();
        node.value = Some(value);
        Ok(())
    }

    // Follows the same descent as `walk_insert` without changing anything and
    // reports the conflicts that depend on what is already in the tree.
    // Errors that depend only on the path are left to `validate_wildcards`.
    fn check_insert(&self, path: &[u8], full_path: &str) -> Result<(), RegistrationError> {
        let common = path
            .iter()
            .zip(&self.segment)
            .take_while(|(a, b)| a == b)
            .count();

        // A split leaves this node without a value and with one static child
        // whose first byte differs from the rest of the path.
        if common < self.segment.len() {
            return match path.get(common) {
                Some(b':' | b'*') => Err(self.child_conflict(&path[common..], full_path)),
                _ => Ok(()),
            };
        }

        if common == path.len() {
            return match self.value {
                Some(_) => Err(RegistrationError::Duplicate {
                    path: full_path.to_owned(),
                }),
                None => Ok(()),
            };
        }

        let path = &path[common..];

        if self.wild_child {
            let child = &self.children[0];
            let len = child.segment.len();
            if path.len() >= len
                && path[..len] == child.segment[..]
                && child.kind != NodeKind::CatchAll
                && (len >= path.len() || path[len] == b'/')
            {
                return child.check_insert(path, full_path);
            }
            return Err(wildcard_conflict(child, path, full_path));
        }

        let first = path[0];

        if self.kind == NodeKind::Param && first == b'/' && self.children.len() == 1 {
            return self.children[0].check_insert(path, full_path);
        }

        if let Some(pos) = self.indices.iter().position(|&b| b == first) {
            return self.children[pos].check_insert(path, full_path);
        }

        match first {
            b':' | b'*' if !self.children.is_empty() => Err(self.child_conflict(path, full_path)),
            b'*' if self.segment.last() == Some(&b'/') => Err(RegistrationError::CatchAllConflict {
                path: full_path.to_owned(),
            }),
            b'*' => Err(RegistrationError::MissingSlashBeforeCatchAll {
                path: full_path.to_owned(),
            }),
            _ => Ok(()),
        }
    }

    fn child_conflict(&self, path: &[u8], full_path: &str) -> RegistrationError {
        let end = path.iter().position(|&b| b == b'/').unwrap_or(path.len());
        RegistrationError::ChildConflict {
            path: full_path.to_owned(),
            segment: lossy(&path[..end]),
        }
    }

    // Walks the tree for an exact match. Never mutates anything.
    fn find(&self, path: &str) -> (Option<&T>, Parameters) {
        let bytes = path.as_bytes();
        let mut params = Parameters::new();
        let mut node = self;
        let mut offset = 0;

        loop {
            let rest = &bytes[offset..];
            let segment = node.segment.as_slice();

            if rest == segment {
                return (node.value.as_ref(), params);
            }
            if rest.len() < segment.len() || !rest.starts_with(segment) {
                return (None, params);
            }

            offset += segment.len();
            let rest = &bytes[offset..];

            if !node.wild_child {
                match node.indices.iter().position(|&b| b == rest[0]) {
                    Some(i) => {
                        node = &node.children[i];
                        continue;
                    }
                    None => return (None, params),
                }
            }

            node = &node.children[0];
            match node.kind {
                NodeKind::Param => {
                    let end = rest.iter().position(|&b| b == b'/').unwrap_or(rest.len());
                    if params.is_empty() {
                        params = Parameters::with_capacity(count_params(rest) + 1);
                    }
                    params.insert(lossy(&node.segment[1..]), lossy(&rest[..end]));

                    if end == rest.len() {
                        return (node.value.as_ref(), params);
                    }
                    match node.children.first() {
                        Some(child) => {
                            offset += end;
                            node = child;
                        }
                        None => return (None, params),
                    }
                }
                NodeKind::CatchAll => {
                    params.insert(lossy(&node.segment[2..]), lossy(rest));
                    return (node.value.as_ref(), params);
                }
                NodeKind::Static => return (None, params),
            }
        }
    }

    // True if this node, reached through a '/' index, completes a route on
    // the '/' alone.
    fn matches_bare_slash(&self) -> bool {
        (self.segment.len() == 1 && self.value.is_some())
            || (self.kind == NodeKind::CatchAll
                && self.children.first().is_some_and(|c| c.value.is_some()))
    }

    fn find_case_insensitive(&self, mut path: &[u8], fix_trailing_slash: bool, out: &mut Vec<u8>) -> bool {
        let mut node = self;

        while path.len() >= node.segment.len()
            && path[..node.segment.len()].eq_ignore_ascii_case(&node.segment)
        {
            path = &path[node.segment.len()..];
            out.extend_from_slice(&node.segment);

            if path.is_empty() {
                if node.value.is_some() {
                    return true;
                }

                if fix_trailing_slash {
                    if let Some(i) = node.indices.iter().position(|&b| b == b'/') {
                        if node.children[i].matches_bare_slash() {
                            out.push(b'/');
                            return true;
                        }
                    }
                }
                return false;
            }

            if !node.wild_child {
                // Both the lower and upper case index may exist; try each.
                let first = path[0].to_ascii_lowercase();
                for (i, index) in node.indices.iter().enumerate() {
                    if index.to_ascii_lowercase() == first {
                        let mark = out.len();
                        if node.children[i].find_case_insensitive(path, fix_trailing_slash, out) {
                            return true;
                        }
                        out.truncate(mark);
                    }
                }

                return fix_trailing_slash && path == b"/" && node.value.is_some();
            }

            node = &node.children[0];
            match node.kind {
                NodeKind::Param => {
                    let end = path.iter().position(|&b| b == b'/').unwrap_or(path.len());
                    out.extend_from_slice(&path[..end]);

                    if end < path.len() {
                        if let Some(child) = node.children.first() {
                            path = &path[end..];
                            node = child;
                            continue;
                        }
                        return fix_trailing_slash && path.len() == end + 1 && node.value.is_some();
                    }

                    if node.value.is_some() {
                        return true;
                    }
                    if fix_trailing_slash
                        && node.children.len() == 1
                        && node.children[0].segment == b"/"
                        && node.children[0].value.is_some()
                    {
                        out.push(b'/');
                        return true;
                    }
                    return false;
                }
                NodeKind::CatchAll => {
                    out.extend_from_slice(path);
                    return true;
                }
                NodeKind::Static => return false,
            }
        }

        // Nothing found; try adding or removing a trailing slash.
        if fix_trailing_slash {
            if path == b"/" {
                return true;
            }
            let segment = &node.segment;
            if path.len() + 1 == segment.len()
                && segment[path.len()] == b'/'
                && path.eq_ignore_ascii_case(&segment[..path.len()])
                && node.value.is_some()
            {
                out.extend_from_slice(segment);
                return true;
            }
        }
        false
    }
}

// Returns the first wildcard in `path`, its start offset, and whether its
// name is free of further ':' or '*'.
fn find_wildcard(path: &[u8]) -> Option<(&[u8], usize, bool)> {
    let start = path.iter().position(|&b| b == b':' || b == b'*')?;
    let mut valid = true;

    for (len, &b) in path[start + 1..].iter().enumerate() {
        match b {
            b'/' => return Some((&path[start..start + 1 + len], start, valid)),
            b':' | b'*' => valid = false,
            _ => {}
        }
    }

    Some((&path[start..], start, valid))
}

fn wildcard_conflict<T>(wild: &Node<T>, path: &[u8], full_path: &str) -> RegistrationError {
    let segment = if wild.kind == NodeKind::CatchAll {
        path
    } else {
        let end = path.iter().position(|&b| b == b'/').unwrap_or(path.len());
        &path[..end]
    };
    let segment = lossy(segment);
    let wildcard = lossy(&wild.segment);
    let prefix = match full_path.find(segment.as_str()) {
        Some(idx) => format!("{}{}", &full_path[..idx], wildcard),
        None => wildcard.clone(),
    };

    RegistrationError::WildcardConflict {
        path: full_path.to_owned(),
        segment,
        wildcard,
        prefix,
    }
}

// Rejects malformed wildcards anywhere in `path`: nameless, two in one
// segment, a catch-all that is not last or not preceded by '/', and a name
// used twice.
fn validate_wildcards(path: &str) -> Result<(), RegistrationError> {
    let bytes = path.as_bytes();
    let mut names: Vec<&[u8]> = Vec::new();
    let mut offset = 0;

    while let Some((wildcard, start, valid)) = find_wildcard(&bytes[offset..]) {
        let start = offset + start;
        if !valid {
            return Err(RegistrationError::InvalidWildcard {
                path: path.to_owned(),
                segment: lossy(wildcard),
            });
        }
        if wildcard.len() < 2 {
            return Err(RegistrationError::UnnamedWildcard {
                path: path.to_owned(),
            });
        }
        if wildcard[0] == b'*' {
            if start + wildcard.len() != bytes.len() {
                return Err(RegistrationError::CatchAllNotAtEnd {
                    path: path.to_owned(),
                });
            }
            if start == 0 || bytes[start - 1] != b'/' {
                return Err(RegistrationError::MissingSlashBeforeCatchAll {
                    path: path.to_owned(),
                });
            }
        }

        let name = &wildcard[1..];
        if names.contains(&name) {
            return Err(RegistrationError::DuplicateWildcardName {
                path: path.to_owned(),
                name: lossy(name),
            });
        }
        names.push(name);
        offset = start + wildcard.len();
    }

    Ok(())
}

// `/a/` becomes `/a` and `/a` becomes `/a/`.
fn toggle_trailing_slash(path: &str) -> Cow<'_, str> {
    match path.strip_suffix('/') {
        Some(trimmed) => Cow::Borrowed(trimmed),
        None => Cow::Owned(format!("{path}/")),
    }
}

fn count_params(path: &[u8]) -> usize {
    path.iter().filter(|&&b| b == b'/').count()
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
