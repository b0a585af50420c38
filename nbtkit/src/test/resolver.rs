use crate::error::Error;
use crate::test::Builder;
use crate::{Nbt, NbtKit, Result, ResolverVariant, TagKind, TypeDesc, TypeResolver};

/// The target type: what every concrete shape flattens into.
#[derive(Nbt, Debug, Default, Clone, PartialEq)]
struct Shape {
    kind: String,
    area: i32,
}

/// First-pass parse, just enough to pick the concrete type.
#[derive(Nbt, Debug, Default)]
struct ShapeProbe {
    kind: String,
}

#[derive(Nbt, Debug, Default)]
struct Circle {
    kind: String,
    radius: i32,
}

impl From<Circle> for Shape {
    fn from(c: Circle) -> Shape {
        Shape {
            kind: c.kind,
            area: 3 * c.radius * c.radius,
        }
    }
}

#[derive(Nbt, Debug, Default)]
struct Square {
    kind: String,
    side: i32,
}

impl From<Square> for Shape {
    fn from(s: Square) -> Shape {
        Shape {
            kind: s.kind,
            area: s.side * s.side,
        }
    }
}

struct ShapeResolver;

impl TypeResolver for ShapeResolver {
    type Target = Shape;
    type Base = ShapeProbe;

    fn possible_types(&self) -> Vec<ResolverVariant<Shape>> {
        vec![
            ResolverVariant::of::<Circle>(),
            ResolverVariant::of::<Square>(),
        ]
    }

    fn resolve(&self, base: &ShapeProbe) -> Option<TypeDesc> {
        match base.kind.as_str() {
            "circle" => Some(TypeDesc::of::<Circle>()),
            "square" => Some(TypeDesc::of::<Square>()),
            _ => None,
        }
    }
}

fn shape_bytes(kind: &str, field: &str, value: i32) -> Vec<u8> {
    Builder::new()
        .start_compound("")
        .string("kind", kind)
        .int(field, value)
        .end_compound()
        .build()
}

#[test]
fn resolvers_pick_the_concrete_parse() {
    let kit = NbtKit::new();
    kit.register_type_resolver(ShapeResolver);

    let circle: Shape = kit.from_bytes(&shape_bytes("circle", "radius", 2)).unwrap();
    assert_eq!(
        circle,
        Shape {
            kind: "circle".to_owned(),
            area: 12,
        }
    );

    let square: Shape = kit.from_bytes(&shape_bytes("square", "side", 5)).unwrap();
    assert_eq!(square.area, 25);
}

#[test]
fn unknown_kinds_fall_back_to_the_plain_adapter() {
    let kit = NbtKit::new();
    kit.register_type_resolver(ShapeResolver);

    let blob: Shape = kit.from_bytes(&shape_bytes("blob", "area", 7)).unwrap();
    assert_eq!(
        blob,
        Shape {
            kind: "blob".to_owned(),
            area: 7,
        }
    );
}

#[test]
fn resolvers_work_on_nested_fields() {
    #[derive(Nbt, Debug, Default, PartialEq)]
    struct World {
        name: String,
        marker: Shape,
    }

    let kit = NbtKit::new();
    kit.register_type_resolver(ShapeResolver);

    let data = Builder::new()
        .start_compound("")
        .string("name", "overworld")
        .start_compound("marker")
        .string("kind", "square")
        .int("side", 3)
        .end_compound()
        .end_compound()
        .build();

    let world: World = kit.from_bytes(&data).unwrap();
    assert_eq!(world.name, "overworld");
    assert_eq!(world.marker.area, 9);
}

struct RecoveringResolver;

impl TypeResolver for RecoveringResolver {
    type Target = Shape;
    type Base = ShapeProbe;

    fn possible_types(&self) -> Vec<ResolverVariant<Shape>> {
        vec![ResolverVariant::of::<Circle>()]
    }

    fn resolve(&self, _base: &ShapeProbe) -> Option<TypeDesc> {
        Some(TypeDesc::of::<Circle>())
    }

    fn on_error(&self, _error: Error, base: Option<&ShapeProbe>) -> Result<Shape> {
        Ok(Shape {
            kind: base.map(|b| b.kind.clone()).unwrap_or_default(),
            area: -1,
        })
    }
}

#[test]
fn on_error_is_the_recovery_point() {
    let kit = NbtKit::new();
    kit.register_type_resolver(RecoveringResolver);

    // radius is a list, which no numeric field accepts
    let data = Builder::new()
        .start_compound("")
        .string("kind", "circle")
        .start_list("radius", TagKind::Int, 1)
        .int_payload(1)
        .end_compound()
        .build();

    let recovered: Shape = kit.from_bytes(&data).unwrap();
    assert_eq!(recovered.kind, "circle");
    assert_eq!(recovered.area, -1);
}

#[test]
fn resolvers_leave_other_types_alone() {
    let kit = NbtKit::new();
    kit.register_type_resolver(ShapeResolver);

    let probe: ShapeProbe = kit.from_bytes(&shape_bytes("circle", "radius", 2)).unwrap();
    assert_eq!(probe.kind, "circle");
}
