#![cfg(test)]
#![allow(clippy::panic_in_result_fn)]

use shapeql_common::{CompileError, CompilerConfig};
use shapeql_compiler::{
    render, EdgeId, FilterOperator, FilterResolver, OrderResolver, QueryGraph, QueryGraphBuilder,
    SortDirection, VerticeId,
};
use shapeql_model::{Literal, NamedNode, PropertyPath, Term};
use shapeql_shapes::{
    Aggregate, FilterRule, NodeShape, OrderBy, PropertyShape, SelectedField, ShapeRegistry,
};
use spargebra::SparqlParser;
use std::error::Error;

const DEF: &str = "https://example.org/def#";

fn iri(name: &str) -> NamedNode {
    NamedNode::new_unchecked(format!("{DEF}{name}"))
}

fn identity(name: &str) -> String {
    format!("<{DEF}{name}>")
}

fn registry() -> ShapeRegistry {
    ShapeRegistry::builder()
        .with_shape(
            NodeShape::new("Brewery")
                .with_target_class(iri("Brewery"))
                .with_property(PropertyShape::new("identifier", iri("identifier")).required())
                .with_property(PropertyShape::new("name", iri("name")).required())
                .with_property(PropertyShape::new("beers", iri("beers")).with_node("Beer"))
                .with_property(
                    PropertyShape::new("beerCount", iri("beers"))
                        .with_aggregate(Aggregate::count().distinct()),
                ),
        )
        .with_shape(
            NodeShape::new("Beer")
                .with_target_class(iri("Beer"))
                .with_property(PropertyShape::new("name", iri("name")))
                .with_property(
                    PropertyShape::new("ingredients", iri("ingredients")).with_node("Ingredient"),
                )
                .with_property(
                    PropertyShape::new("brewery", PropertyPath::inverse(iri("beers").into()))
                        .with_node("Brewery"),
                ),
        )
        .with_shape(
            NodeShape::new("Ingredient")
                .with_target_class(iri("Ingredient"))
                .with_property(PropertyShape::new("name", iri("name"))),
        )
        .build()
        .unwrap()
}

fn build(registry: &ShapeRegistry, fields: &[SelectedField]) -> QueryGraph {
    let config = CompilerConfig::default();
    let shape = registry.resolve("Brewery").unwrap();
    let output = QueryGraphBuilder::new(registry, &config)
        .build(shape, fields)
        .unwrap();
    assert!(output.errors.is_empty());
    output.graph
}

fn edge(graph: &QueryGraph, vertice: VerticeId, identity: &str) -> EdgeId {
    graph.find_edge(vertice, identity, |_| true).unwrap()
}

#[test]
fn test_mandatory_scalar_fields() {
    let registry = registry();
    let graph = build(
        &registry,
        &[SelectedField::new("identifier"), SelectedField::new("name")],
    );

    assert_eq!(graph.reachable_edge_count(), 2);
    let rendered = render(&graph);
    assert_eq!(rendered.where_patterns.len(), 3);
    assert!(rendered
        .where_patterns
        .iter()
        .all(|pattern| !pattern.starts_with("OPTIONAL")));
}

#[test]
fn test_filter_forces_path_to_be_required() -> Result<(), Box<dyn Error>> {
    let registry = registry();
    let config = CompilerConfig::default();
    let shape = registry.resolve("Brewery")?;
    let mut graph = build(
        &registry,
        &[SelectedField::nested(
            "beers",
            [SelectedField::nested(
                "ingredients",
                [SelectedField::new("name")],
            )],
        )],
    );
    let root = graph.root();
    let beers = edge(&graph, root, &identity("beers"));
    assert!(graph.edge(beers).optional);

    FilterResolver::new(&registry, &config).apply_filter(
        &mut graph,
        shape,
        &FilterRule::new("beers.ingredients.name", "eq", ["Alfa Brouwerij"]),
    )?;

    let beer = graph.edge(beers).target();
    let ingredients = edge(&graph, beer, &identity("ingredients"));
    let ingredient = graph.edge(ingredients).target();
    let name = edge(&graph, ingredient, &identity("name"));
    for id in [beers, ingredients, name] {
        assert!(!graph.edge(id).optional);
        assert!(graph.edge(id).visible);
    }
    assert_eq!(graph.reachable_edge_count(), 3);

    let filters = graph.vertice(graph.edge(name).target()).filters();
    assert_eq!(filters.len(), 1);
    assert_eq!(filters[0].operator(), FilterOperator::Eq);
    assert_eq!(
        filters[0].operands(),
        [Term::from(Literal::new_simple_literal("Alfa Brouwerij"))]
    );
    Ok(())
}

#[test]
fn test_filter_creates_invisible_edges() -> Result<(), Box<dyn Error>> {
    let registry = registry();
    let config = CompilerConfig::default();
    let shape = registry.resolve("Brewery")?;
    let mut graph = build(&registry, &[SelectedField::new("name")]);

    FilterResolver::new(&registry, &config).apply_filter(
        &mut graph,
        shape,
        &FilterRule::new("beers.name", "eq", ["Pils"]),
    )?;

    let beers = edge(&graph, graph.root(), &identity("beers"));
    assert!(!graph.edge(beers).visible);
    assert!(!graph.edge(beers).optional);

    let rendered = render(&graph);
    assert_eq!(rendered.construct_patterns.len(), 2);
    assert!(rendered
        .where_patterns
        .contains(&"FILTER(?x3 = \"Pils\")".to_owned()));
    Ok(())
}

#[test]
fn test_same_property_selected_twice_is_merged() -> Result<(), Box<dyn Error>> {
    let registry = registry();
    let config = CompilerConfig::default();
    let shape = registry.resolve("Brewery")?;
    let output = QueryGraphBuilder::new(&registry, &config).build(
        shape,
        &[
            SelectedField::nested("beers", [SelectedField::new("name")])
                .with_filter(FilterRule::new("name", "eq", ["Edel Pils"])),
            SelectedField::nested("beers", [SelectedField::new("name")])
                .with_filter(FilterRule::new("name", "eq", ["Krachtig Dort"])),
        ],
    )?;
    let mut graph = output.graph;
    for rule in &output.filters {
        FilterResolver::new(&registry, &config).apply_filter(&mut graph, shape, rule)?;
    }

    let root = graph.vertice(graph.root());
    assert_eq!(root.edges().len(), 1);
    let beer = graph.edge(root.edges()[0]).target();
    let name = edge(&graph, beer, &identity("name"));
    assert_eq!(graph.vertice(beer).edges().len(), 1);
    assert_eq!(graph.vertice(graph.edge(name).target()).filters().len(), 2);
    Ok(())
}

#[test]
fn test_order_by_aggregate() -> Result<(), Box<dyn Error>> {
    let registry = registry();
    let config = CompilerConfig::default();
    let shape = registry.resolve("Brewery")?;
    let mut graph = build(&registry, &[SelectedField::new("name")]);

    OrderResolver::new(&registry, &config).apply_order(
        &mut graph,
        shape,
        &OrderBy::new("beerCount").with_direction("DESC"),
    )?;

    assert_eq!(graph.reachable_edge_count(), 2);
    let count = edge(
        &graph,
        graph.root(),
        &format!("COUNT(DISTINCT {})", identity("beers")),
    );
    let count = graph.edge(count);
    assert!(count.is_aggregate());
    assert!(!count.visible);

    let orderings = graph.vertice(graph.root()).orderings();
    assert_eq!(orderings.len(), 1);
    assert_eq!(orderings[0].direction, SortDirection::Desc);
    assert_eq!(&orderings[0].key, graph.vertice(count.target()).subject());
    Ok(())
}

#[test]
fn test_order_by_unknown_field() -> Result<(), Box<dyn Error>> {
    let registry = registry();
    let config = CompilerConfig::default();
    let shape = registry.resolve("Brewery")?;
    let mut graph = build(&registry, &[SelectedField::new("name")]);

    let error = OrderResolver::new(&registry, &config)
        .apply_order(&mut graph, shape, &OrderBy::new("unexisting"))
        .unwrap_err();

    assert_eq!(
        error.to_string(),
        "No property shape found for name 'unexisting' nodeshape 'Brewery'"
    );
    assert_eq!(graph.reachable_edge_count(), 1);
    Ok(())
}

#[test]
fn test_null_safe_ordering() -> Result<(), Box<dyn Error>> {
    let registry = registry();
    let config = CompilerConfig::default();
    let shape = registry.resolve("Brewery")?;
    let mut graph = build(&registry, &[SelectedField::new("name")]);

    let resolver = OrderResolver::new(&registry, &config);
    resolver.apply_order(&mut graph, shape, &OrderBy::new("name").with_direction("asc"))?;
    resolver.apply_order(&mut graph, shape, &OrderBy::new("beers.name"))?;

    let rendered = render(&graph);
    assert_eq!(
        rendered.order_clauses,
        ["ASC(?x1)", "DESC(COALESCE(?x3, \"\"))"]
    );
    Ok(())
}

#[test]
fn test_unsupported_operator() -> Result<(), Box<dyn Error>> {
    let registry = registry();
    let config = CompilerConfig::default();
    let shape = registry.resolve("Brewery")?;
    let mut graph = build(&registry, &[SelectedField::new("name")]);

    let error = FilterResolver::new(&registry, &config)
        .apply_filter(&mut graph, shape, &FilterRule::new("name", "like", ["Alfa%"]))
        .unwrap_err();

    assert_eq!(
        error,
        CompileError::UnsupportedOperator {
            operator: "like".to_owned()
        }
    );
    assert_eq!(graph.reachable_edge_count(), 1);
    Ok(())
}

#[test]
fn test_rendered_queries_are_valid_sparql() -> Result<(), Box<dyn Error>> {
    let registry = registry();
    let config = CompilerConfig::default();
    let shape = registry.resolve("Brewery")?;
    let mut graph = build(
        &registry,
        &[
            SelectedField::new("name"),
            SelectedField::new("beerCount"),
            SelectedField::nested(
                "beers",
                [
                    SelectedField::new("name"),
                    SelectedField::nested("brewery", [SelectedField::new("identifier")]),
                ],
            ),
        ],
    );
    let filters = FilterResolver::new(&registry, &config);
    filters.apply_filter(
        &mut graph,
        shape,
        &FilterRule::new("beers.name", "neq", ["Pils", "Dort"]),
    )?;
    filters.apply_filter(
        &mut graph,
        shape,
        &FilterRule::new("beerCount", "gte", ["2"]),
    )?;
    filters.apply_filter(
        &mut graph,
        shape,
        &FilterRule::new("", "eq", [format!("{DEF}brewery1")]).resource(),
    )?;
    OrderResolver::new(&registry, &config).apply_order(
        &mut graph,
        shape,
        &OrderBy::new("beers.ingredients.name"),
    )?;

    let rendered = render(&graph);
    assert!(rendered
        .where_patterns
        .iter()
        .any(|pattern| pattern.contains("\"2\"^^<http://www.w3.org/2001/XMLSchema#integer>")));
    SparqlParser::new().parse_query(&rendered.construct_query())?;
    SparqlParser::new().parse_query(&rendered.select_query(10, 20))?;
    Ok(())
}

#[test]
fn test_compilation_is_deterministic() {
    let registry = registry();
    let fields = [
        SelectedField::new("identifier"),
        SelectedField::nested("beers", [SelectedField::new("name")]),
    ];

    let first = render(&build(&registry, &fields));
    let second = render(&build(&registry, &fields));

    assert_eq!(first, second);
}
