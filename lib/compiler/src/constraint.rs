use shapeql_common::{CompileError, CompileResult};
use shapeql_model::{NamedNode, Term, Variable};
use shapeql_shapes::NodeShape;

/// An assertion on the node bound by a vertice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Constraint {
    /// The node is an instance of the classes of at least one group.
    Type(TypeConstraint),
    /// The node is exactly this term.
    Value(Term),
}

impl Constraint {
    pub fn as_type(&self) -> Option<&TypeConstraint> {
        match self {
            Self::Type(constraint) => Some(constraint),
            Self::Value(_) => None,
        }
    }
}

/// A type-membership assertion consisting of alternative groups of classes.
///
/// A single group is rendered as one `rdf:type` triple per class. Multiple groups are rendered as
/// an enumeration of the allowed classes, bound to `enumeration`, that feeds an
/// `rdf:type/rdfs:subClassOf*` path. An enumeration can only list single classes, so multiple
/// groups must each consist of exactly one class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeConstraint {
    groups: Vec<Vec<NamedNode>>,
    enumeration: Option<Variable>,
}

impl TypeConstraint {
    /// Creates the type constraint of `shape`. Returns `None` if the shape has no target classes.
    ///
    /// `next_variable` is only called if the constraint requires an enumeration variable.
    pub fn try_from_shape(
        shape: &NodeShape,
        next_variable: impl FnOnce() -> Variable,
    ) -> CompileResult<Option<Self>> {
        let groups = shape.target_classes();
        match groups {
            [] => Ok(None),
            [group] => Ok(Some(Self {
                groups: vec![group.clone()],
                enumeration: None,
            })),
            groups => {
                if let Some(group) = groups.iter().find(|group| group.len() != 1) {
                    return Err(CompileError::Multiplicity {
                        shape: shape.name().to_owned(),
                        reason: format!(
                            "alternative class group of size {} cannot be enumerated",
                            group.len()
                        ),
                    });
                }
                Ok(Some(Self {
                    groups: groups.to_vec(),
                    enumeration: Some(next_variable()),
                }))
            }
        }
    }

    pub fn groups(&self) -> &[Vec<NamedNode>] {
        &self.groups
    }

    /// The variable that binds the enumerated classes, if there is more than one group.
    pub fn enumeration(&self) -> Option<&Variable> {
        self.enumeration.as_ref()
    }

    /// Whether both constraints require the same classes, regardless of their variables.
    pub fn has_same_classes(&self, groups: &[Vec<NamedNode>]) -> bool {
        self.groups == groups
    }
}
