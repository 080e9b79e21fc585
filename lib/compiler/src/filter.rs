use crate::graph::QueryGraph;
use crate::walk::{find_or_create, force_required, resolve_steps};
use shapeql_common::{CompileError, CompileResult, CompilerConfig};
use shapeql_model::vocab::xsd;
use shapeql_model::{
    coerce_iri, coerce_language_range, coerce_typed_literal, NamedNodeRef, Term, TermCoercionError,
};
use shapeql_shapes::{
    AggregateFunction, FilterJoin, FilterRule, NodeShape, PropertyShape, ShapeRegistry,
};
use std::fmt::{Display, Formatter};
use std::slice;
use std::str::FromStr;

/// The supported filter operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Language,
}

impl FromStr for FilterOperator {
    type Err = CompileError;

    fn from_str(operator: &str) -> Result<Self, Self::Err> {
        Ok(match operator.to_ascii_lowercase().as_str() {
            "eq" | "=" => Self::Eq,
            "neq" | "ne" | "!=" => Self::Neq,
            "lt" | "<" => Self::Lt,
            "lte" | "le" | "<=" => Self::Lte,
            "gt" | ">" => Self::Gt,
            "gte" | "ge" | ">=" => Self::Gte,
            "language" => Self::Language,
            _ => {
                return Err(CompileError::UnsupportedOperator {
                    operator: operator.to_owned(),
                })
            }
        })
    }
}

impl Display for FilterOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Eq => "EQ",
            Self::Neq => "NEQ",
            Self::Lt => "LT",
            Self::Lte => "LTE",
            Self::Gt => "GT",
            Self::Gte => "GTE",
            Self::Language => "LANGUAGE",
        })
    }
}

/// A constraint on the value bound by a vertice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filter {
    operator: FilterOperator,
    operands: Vec<Term>,
    join: FilterJoin,
}

impl Filter {
    pub fn new(operator: FilterOperator, operands: Vec<Term>, join: FilterJoin) -> Self {
        Self {
            operator,
            operands,
            join,
        }
    }

    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    pub fn operands(&self) -> &[Term] {
        &self.operands
    }

    /// How this filter is combined with the filters before it on the same vertice.
    pub fn join(&self) -> FilterJoin {
        self.join
    }
}

/// Attaches [FilterRule]s to the query graph.
#[derive(Clone, Copy, Debug)]
pub struct FilterResolver<'a> {
    registry: &'a ShapeRegistry,
    config: &'a CompilerConfig,
}

impl<'a> FilterResolver<'a> {
    pub fn new(registry: &'a ShapeRegistry, config: &'a CompilerConfig) -> Self {
        Self { registry, config }
    }

    /// Resolves the path of `rule` relative to `shape` and attaches a [Filter] to the vertice
    /// the path ends in.
    ///
    /// Every edge on the way from the root is made non-optional afterwards, including edges that
    /// existed before as optional. A filter below an optional edge could otherwise fail to bind
    /// and would not restrict the result.
    ///
    /// Resource filters compare the identifier of the root (empty path) or of the node reached
    /// via the first path segment.
    pub fn apply_filter(
        &self,
        graph: &mut QueryGraph,
        shape: &NodeShape,
        rule: &FilterRule,
    ) -> CompileResult<()> {
        let operator = rule.operator.parse::<FilterOperator>()?;
        let field = rule.path.to_string();
        if rule.values.is_empty() {
            return Err(CompileError::InvalidFilterValue {
                field,
                reason: "no value given".to_owned(),
            });
        }

        let (target, visited, operands) = if rule.is_resource {
            let operands = rule
                .values
                .iter()
                .map(|value| coerce_iri(value).map(Term::from))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| CompileError::invalid_filter_value(field.as_str(), &err))?;
            match rule.path.segments() {
                [] => (graph.root(), Vec::new(), operands),
                [segment] => {
                    let steps = resolve_steps(self.registry, shape, slice::from_ref(segment))?;
                    let resolved = find_or_create(graph, self.config, &steps)?;
                    (resolved.target, resolved.edges, operands)
                }
                _ => return Err(CompileError::InvalidResourceFilter { field }),
            }
        } else {
            let steps = resolve_steps(self.registry, shape, rule.path.segments())?;
            let Some(last) = steps.last() else {
                return Err(CompileError::shape_resolution("", shape.name()));
            };
            let operands = coerce_operands(operator, last.property, &rule.values)
                .map_err(|err| CompileError::invalid_filter_value(field.as_str(), &err))?;
            let resolved = find_or_create(graph, self.config, &steps)?;
            (resolved.target, resolved.edges, operands)
        };

        tracing::debug!(field = %field, %operator, "Attaching filter");
        graph
            .vertice_mut(target)
            .add_filter(Filter::new(operator, operands, rule.join));
        force_required(graph, &visited);
        Ok(())
    }
}

fn coerce_operands(
    operator: FilterOperator,
    property: &PropertyShape,
    values: &[String],
) -> Result<Vec<Term>, TermCoercionError> {
    values
        .iter()
        .map(|value| {
            if operator == FilterOperator::Language {
                coerce_language_range(value).map(Term::from)
            } else if property.aggregate().is_none() && property.node_kind().is_resource() {
                coerce_iri(value).map(Term::from)
            } else {
                coerce_typed_literal(value, operand_datatype(property)).map(Term::from)
            }
        })
        .collect()
}

fn operand_datatype(property: &PropertyShape) -> NamedNodeRef<'_> {
    let declared = property.datatype().as_ref();
    match property.aggregate().map(|aggregate| &aggregate.function) {
        Some(AggregateFunction::Count) if declared == xsd::STRING => xsd::INTEGER,
        _ => declared,
    }
}
