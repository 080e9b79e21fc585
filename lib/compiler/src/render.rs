use crate::constraint::Constraint;
use crate::filter::{Filter, FilterOperator};
use crate::graph::{Edge, EdgeId, EdgeLabel, QueryGraph, VerticeId};
use crate::order::Ordering;
use itertools::Itertools;
use shapeql_model::vocab::{rdf, rdfs};
use shapeql_model::{ConstructDirection, Literal, Variable};
use shapeql_shapes::{Aggregate, AggregateFunction, FilterJoin};

/// The SPARQL fragments of a finished query graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedGraph {
    /// The top-level patterns of the WHERE block. Nested patterns are part of their parent.
    pub where_patterns: Vec<String>,
    /// The triples of the CONSTRUCT template.
    pub construct_patterns: Vec<String>,
    /// The sort expressions, in priority order.
    pub order_clauses: Vec<String>,
    subject: Variable,
}

impl RenderedGraph {
    /// The variable that binds the root nodes of the result.
    pub fn subject(&self) -> &Variable {
        &self.subject
    }

    /// Assembles a CONSTRUCT query that describes the selected fields of all matching nodes.
    pub fn construct_query(&self) -> String {
        format!(
            "CONSTRUCT {{\n{}\n}}\nWHERE {{\n{}\n}}",
            indent(&self.construct_patterns),
            indent(&self.where_patterns)
        )
    }

    /// Assembles a query that selects one page of the identifiers of the matching nodes.
    pub fn select_query(&self, limit: usize, offset: usize) -> String {
        let mut lines = vec![
            format!("SELECT DISTINCT {}", self.subject),
            format!("WHERE {{\n{}\n}}", indent(&self.where_patterns)),
        ];
        if !self.order_clauses.is_empty() {
            lines.push(format!("ORDER BY {}", self.order_clauses.join(" ")));
        }
        lines.push(format!("LIMIT {limit}"));
        if offset > 0 {
            lines.push(format!("OFFSET {offset}"));
        }
        lines.join("\n")
    }
}

fn indent(patterns: &[String]) -> String {
    patterns.iter().map(|pattern| format!("  {pattern}")).join("\n")
}

/// Renders a query graph that has been built, deduplicated, filtered and ordered.
pub fn render(graph: &QueryGraph) -> RenderedGraph {
    GraphRenderer { graph }.render()
}

struct GraphRenderer<'g> {
    graph: &'g QueryGraph,
}

impl GraphRenderer<'_> {
    fn render(&self) -> RenderedGraph {
        let root = self.graph.root();
        let subject = self.graph.vertice(root).subject().clone();

        let mut where_patterns = Vec::new();
        self.render_constraints(root, &mut where_patterns);
        for &edge in self.graph.vertice(root).edges() {
            self.render_edge(edge, &subject, &mut where_patterns);
        }
        self.render_filters(root, &mut where_patterns);

        let mut construct_patterns = Vec::new();
        self.construct_types(root, &mut construct_patterns);
        self.construct_edges(root, &mut construct_patterns);

        let order_clauses = self
            .graph
            .vertice(root)
            .orderings()
            .iter()
            .map(order_clause)
            .collect();

        RenderedGraph {
            where_patterns,
            construct_patterns,
            order_clauses,
            subject,
        }
    }

    fn render_edge(&self, id: EdgeId, parent: &Variable, out: &mut Vec<String>) {
        let edge = self.graph.edge(id);
        let target = edge.target();
        let child = self.graph.vertice(target);

        let mut block = vec![edge_pattern(edge, parent, child.subject())];
        self.render_constraints(target, &mut block);
        for &grandchild in child.edges() {
            self.render_edge(grandchild, child.subject(), &mut block);
        }
        self.render_filters(target, &mut block);

        if edge.optional {
            out.push(format!("OPTIONAL {{ {} }}", block.join(" ")));
        } else {
            out.extend(block);
        }
    }

    fn render_constraints(&self, vertice: VerticeId, out: &mut Vec<String>) {
        let vertice = self.graph.vertice(vertice);
        let subject = vertice.subject();
        for constraint in vertice.constraints() {
            match constraint {
                Constraint::Type(constraint) => match constraint.enumeration() {
                    None => {
                        for class in constraint.groups().iter().flatten() {
                            out.push(format!("{subject} {} {class} .", rdf::TYPE));
                        }
                    }
                    Some(variable) => {
                        let classes = constraint.groups().iter().flatten().join(" ");
                        out.push(format!(
                            "VALUES {variable} {{ {classes} }} {subject} {}/{}* {variable} .",
                            rdf::TYPE,
                            rdfs::SUB_CLASS_OF
                        ));
                    }
                },
                Constraint::Value(value) => out.push(format!("VALUES {subject} {{ {value} }}")),
            }
        }
    }

    fn render_filters(&self, vertice: VerticeId, out: &mut Vec<String>) {
        let vertice = self.graph.vertice(vertice);
        let mut filters = vertice.filters().iter();
        let Some(first) = filters.next() else {
            return;
        };

        let subject = vertice.subject();
        let mut expression = filter_expression(first, subject);
        for filter in filters {
            let operator = match filter.join() {
                FilterJoin::And => "&&",
                FilterJoin::Or => "||",
            };
            expression = format!(
                "({expression}) {operator} ({})",
                filter_expression(filter, subject)
            );
        }
        out.push(format!("FILTER({expression})"));
    }

    fn construct_types(&self, vertice: VerticeId, out: &mut Vec<String>) {
        let vertice = self.graph.vertice(vertice);
        let subject = vertice.subject();
        for constraint in vertice.constraints() {
            let Some(constraint) = constraint.as_type() else {
                continue;
            };
            match constraint.enumeration() {
                None => {
                    for class in constraint.groups().iter().flatten() {
                        out.push(format!("{subject} {} {class} .", rdf::TYPE));
                    }
                }
                Some(variable) => out.push(format!("{subject} {} {variable} .", rdf::TYPE)),
            }
        }
    }

    fn construct_edges(&self, vertice: VerticeId, out: &mut Vec<String>) {
        let parent = self.graph.vertice(vertice).subject();
        for (_, edge) in self.graph.edges_of(vertice) {
            let child = self.graph.vertice(edge.target()).subject();
            if edge.visible {
                let predicate = edge.construct_predicate();
                out.push(match edge.construct_direction() {
                    ConstructDirection::Forward => format!("{parent} {predicate} {child} ."),
                    ConstructDirection::Backward => format!("{child} {predicate} {parent} ."),
                });
                self.construct_types(edge.target(), out);
            }
            self.construct_edges(edge.target(), out);
        }
    }
}

fn edge_pattern(edge: &Edge, parent: &Variable, child: &Variable) -> String {
    match edge.label() {
        EdgeLabel::Path(path) => format!("{parent} {path} {child} ."),
        EdgeLabel::Aggregate {
            path,
            aggregate,
            inner,
        } => format!(
            "{{ SELECT {parent} ({} AS {child}) WHERE {{ {parent} {path} {inner} . }} GROUP BY {parent} }}",
            aggregate_expression(aggregate, inner)
        ),
    }
}

fn aggregate_expression(aggregate: &Aggregate, inner: &Variable) -> String {
    let distinct = if aggregate.distinct { "DISTINCT " } else { "" };
    match &aggregate.function {
        AggregateFunction::GroupConcat { separator } => format!(
            "GROUP_CONCAT({distinct}{inner}; SEPARATOR = {})",
            Literal::new_simple_literal(separator)
        ),
        function @ (AggregateFunction::Count
        | AggregateFunction::Sum
        | AggregateFunction::Min
        | AggregateFunction::Max
        | AggregateFunction::Avg) => format!("{function}({distinct}{inner})"),
    }
}

fn filter_expression(filter: &Filter, subject: &Variable) -> String {
    let operands = filter.operands();
    match (filter.operator(), operands) {
        (FilterOperator::Eq, [operand]) => format!("{subject} = {operand}"),
        (FilterOperator::Eq, operands) => format!("{subject} IN ({})", operands.iter().join(", ")),
        (FilterOperator::Neq, [operand]) => format!("{subject} != {operand}"),
        (FilterOperator::Neq, operands) => {
            format!("{subject} NOT IN ({})", operands.iter().join(", "))
        }
        (FilterOperator::Language, operands) => operands
            .iter()
            .map(|operand| format!("langMatches(lang({subject}), {operand})"))
            .join(" || "),
        (
            operator @ (FilterOperator::Lt
            | FilterOperator::Lte
            | FilterOperator::Gt
            | FilterOperator::Gte),
            operands,
        ) => {
            let symbol = match operator {
                FilterOperator::Lt => "<",
                FilterOperator::Lte => "<=",
                FilterOperator::Gt => ">",
                _ => ">=",
            };
            operands
                .iter()
                .map(|operand| format!("{subject} {symbol} {operand}"))
                .join(" && ")
        }
    }
}

fn order_clause(ordering: &Ordering) -> String {
    if ordering.null_safe {
        format!("{}(COALESCE({}, \"\"))", ordering.direction, ordering.key)
    } else {
        format!("{}({})", ordering.direction, ordering.key)
    }
}
