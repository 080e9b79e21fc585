use crate::{NodeShape, PropertyShape};
use rustc_hash::FxHashMap;
use shapeql_common::{CompileError, CompileResult};

/// An immutable mapping from entity-type names to their [NodeShape].
///
/// The registry is created once by a [ShapeRegistryBuilder], which verifies that every nested
/// shape reference can be resolved. Afterwards, the registry is never mutated and can be shared
/// between threads that compile requests concurrently.
#[derive(Clone, Debug, Default)]
pub struct ShapeRegistry {
    shapes: FxHashMap<String, NodeShape>,
}

impl ShapeRegistry {
    pub fn builder() -> ShapeRegistryBuilder {
        ShapeRegistryBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&NodeShape> {
        self.shapes.get(name)
    }

    /// Looks up the shape called `name`.
    pub fn resolve(&self, name: &str) -> CompileResult<&NodeShape> {
        self.get(name).ok_or_else(|| CompileError::UnknownShape {
            name: name.to_owned(),
        })
    }

    /// Returns the shape `property` points to, if it points to one.
    pub fn nested_shape(&self, property: &PropertyShape) -> CompileResult<Option<&NodeShape>> {
        property.node().map(|name| self.resolve(name)).transpose()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

/// Collects node shapes and validates them as a whole.
#[derive(Clone, Debug, Default)]
pub struct ShapeRegistryBuilder {
    shapes: Vec<NodeShape>,
}

impl ShapeRegistryBuilder {
    #[must_use]
    pub fn with_shape(mut self, shape: NodeShape) -> Self {
        self.shapes.push(shape);
        self
    }

    /// Validates the collected shapes and creates the registry.
    ///
    /// Fails if two shapes share a name, if a property points to an unknown shape, if a property
    /// combines an aggregate with a nested shape or a fixed value, or if a class group is empty.
    pub fn build(self) -> CompileResult<ShapeRegistry> {
        let mut shapes = FxHashMap::default();
        for shape in self.shapes {
            if shapes.contains_key(shape.name()) {
                return Err(CompileError::InvalidShape(format!(
                    "node shape '{}' is defined more than once",
                    shape.name()
                )));
            }
            shapes.insert(shape.name().to_owned(), shape);
        }

        for shape in shapes.values() {
            validate_shape(shape, &shapes)?;
        }

        Ok(ShapeRegistry { shapes })
    }
}

fn validate_shape(shape: &NodeShape, shapes: &FxHashMap<String, NodeShape>) -> CompileResult<()> {
    if shape.target_classes().iter().any(Vec::is_empty) {
        return Err(CompileError::InvalidShape(format!(
            "node shape '{}' declares an empty class group",
            shape.name()
        )));
    }

    for property in shape.properties() {
        if let Some(node) = property.node() {
            if !shapes.contains_key(node) {
                return Err(CompileError::InvalidShape(format!(
                    "property '{}' of node shape '{}' refers to unknown node shape '{node}'",
                    property.name(),
                    shape.name()
                )));
            }
        }

        if property.aggregate().is_some()
            && (property.node().is_some() || property.has_value().is_some())
        {
            return Err(CompileError::InvalidShape(format!(
                "aggregate property '{}' of node shape '{}' cannot have a nested shape or a fixed value",
                property.name(),
                shape.name()
            )));
        }
    }

    Ok(())
}
