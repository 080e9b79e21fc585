use oxrdf::NamedNode;
use std::fmt::{Display, Formatter};

/// The path of a property shape, describing how to step from one graph node to another.
///
/// The rendered form is SPARQL property path syntax. Two paths are considered to address the same
/// relationship iff their rendered forms are equal, see [PropertyPath::identity].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PropertyPath {
    /// A single predicate: `<p>`.
    Predicate(NamedNode),
    /// The inverse of a path: `^<p>`.
    Inverse(Box<PropertyPath>),
    /// A sequence of paths: `<p>/<q>`.
    Sequence(Vec<PropertyPath>),
}

/// How the relationship of an edge is written into a CONSTRUCT template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstructDirection {
    /// `?parent <p> ?child`
    Forward,
    /// `?child <p> ?parent`
    Backward,
}

impl PropertyPath {
    /// Creates a direct predicate path.
    pub fn predicate(iri: NamedNode) -> Self {
        Self::Predicate(iri)
    }

    /// Creates the inverse of `path`.
    ///
    /// The inverse of an inverse is simplified to the inner path.
    pub fn inverse(path: PropertyPath) -> Self {
        match path {
            Self::Inverse(inner) => *inner,
            path => Self::Inverse(Box::new(path)),
        }
    }

    /// Creates a sequence path. Nested sequences are flattened and a sequence with a single
    /// element collapses into that element.
    pub fn sequence(paths: impl IntoIterator<Item = PropertyPath>) -> Self {
        let mut flat = Vec::new();
        for path in paths {
            match path {
                Self::Sequence(inner) => flat.extend(inner),
                path => flat.push(path),
            }
        }

        if flat.len() == 1 {
            flat.remove(0)
        } else {
            Self::Sequence(flat)
        }
    }

    /// The key that is used to compare edges. Equal identities address the same relationship.
    pub fn identity(&self) -> String {
        self.to_string()
    }

    /// Returns the predicate and direction that can represent this path in a CONSTRUCT template.
    ///
    /// Only a direct predicate or the inverse of a direct predicate can be expressed as a single
    /// triple. Other paths require a synthetic predicate.
    pub fn construct_predicate(&self) -> Option<(&NamedNode, ConstructDirection)> {
        match self {
            Self::Predicate(iri) => Some((iri, ConstructDirection::Forward)),
            Self::Inverse(inner) => match inner.as_ref() {
                Self::Predicate(iri) => Some((iri, ConstructDirection::Backward)),
                Self::Inverse(_) | Self::Sequence(_) => None,
            },
            Self::Sequence(_) => None,
        }
    }
}

impl Display for PropertyPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Predicate(iri) => write!(f, "{iri}"),
            Self::Inverse(inner) => match inner.as_ref() {
                Self::Predicate(iri) => write!(f, "^{iri}"),
                Self::Inverse(_) | Self::Sequence(_) => write!(f, "^({inner})"),
            },
            Self::Sequence(paths) => {
                for (i, path) in paths.iter().enumerate() {
                    if i > 0 {
                        f.write_str("/")?;
                    }
                    match path {
                        Self::Sequence(_) => write!(f, "({path})")?,
                        Self::Predicate(_) | Self::Inverse(_) => write!(f, "{path}")?,
                    }
                }
                Ok(())
            }
        }
    }
}

impl From<NamedNode> for PropertyPath {
    fn from(iri: NamedNode) -> Self {
        Self::Predicate(iri)
    }
}
