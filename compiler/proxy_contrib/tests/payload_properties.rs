//! Property-based tests for the serialization payload.
//!
//! For randomly shaped proxies, checks that:
//! 1. `__interfaces` holds exactly the interface set, in order
//! 2. every non-static serializable field is written, and nothing else

#![cfg(feature = "serialization")]
#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::uninlined_format_args,
    reason = "Proptest macros generate code with these patterns"
)]

use proptest::prelude::*;
use proxy_contrib::{
    names, InterfaceSet, ProxyInstanceContributor, ProxyKind, ProxyTypeId, TypeContributor,
};
use proxy_ir::{
    well_known, AssignTarget, ClassEmitter, ConstValue, ExprKind, FieldFlags, MethodEmitter, Stmt,
    TypeId, TypeInfo, TypePool,
};

// -- Helpers --

/// Storage of a generated field.
#[derive(Clone, Copy, Debug)]
enum FieldShape {
    Serialized,
    NotSerialized,
    Static,
}

fn field_shape_strategy() -> impl Strategy<Value = FieldShape> {
    prop_oneof![
        Just(FieldShape::Serialized),
        Just(FieldShape::NotSerialized),
        Just(FieldShape::Static),
    ]
}

/// Build a class proxy with the given interfaces (indices into a pool of
/// eight) and extra fields, run the instance contributor and return the
/// pool, the interface set and the generated type.
fn generate(
    interface_picks: &[usize],
    fields: &[FieldShape],
) -> (TypePool, InterfaceSet, ClassEmitter) {
    let mut pool = TypePool::new();
    let available: Vec<TypeId> = (0..8)
        .map(|i| {
            pool.define(TypeInfo::interface(format!("I{i}"), format!("acme.I{i}")))
                .unwrap()
        })
        .collect();
    let target = pool.define(TypeInfo::class("Foo", "acme.Foo")).unwrap();
    let interfaces: InterfaceSet = interface_picks.iter().map(|&i| available[i]).collect();

    let mut class = ClassEmitter::new(
        &mut pool,
        "FooProxy",
        "acme.FooProxy",
        target,
        interfaces.as_slice(),
    )
    .unwrap();
    class
        .declare_field(names::INTERCEPTORS_FIELD, TypeId::INTERCEPTOR_ARRAY, false)
        .unwrap();
    class
        .declare_field_with_flags(
            names::GENERATION_OPTIONS_FIELD,
            TypeId::PROXY_GENERATION_OPTIONS,
            FieldFlags::STATIC,
        )
        .unwrap();
    class
        .declare_field(names::TARGET_FIELD, target, false)
        .unwrap();
    for (i, shape) in fields.iter().enumerate() {
        let name = format!("f{i}");
        let declared = match shape {
            FieldShape::Serialized => class.declare_field(&name, TypeId::INT32, true),
            FieldShape::NotSerialized => class.declare_field(&name, TypeId::INT32, false),
            FieldShape::Static => {
                class.declare_field_with_flags(&name, TypeId::STRING, FieldFlags::STATIC)
            }
        };
        declared.unwrap();
    }

    let contributor = ProxyInstanceContributor::new(
        ProxyKind::Class,
        target,
        interfaces.clone(),
        ProxyTypeId::from("class.with.target"),
    );
    contributor.generate(&mut class, &mut pool).unwrap();
    (pool, interfaces, class)
}

fn object_data(class: &ClassEmitter) -> &MethodEmitter {
    let id = class
        .find_method(
            well_known::GET_OBJECT_DATA,
            &[TypeId::SERIALIZATION_INFO, TypeId::STREAMING_CONTEXT],
        )
        .expect("serialization member");
    class.method(id)
}

fn string_constant(method: &MethodEmitter, expr: proxy_ir::ExprId) -> Option<&str> {
    match &method.body().expr(expr)?.kind {
        ExprKind::Constant(ConstValue::Str(value)) => Some(value),
        _ => None,
    }
}

/// `(index, value)` of every string stored into an array element.
fn array_stores(method: &MethodEmitter) -> Vec<(u32, String)> {
    method
        .body()
        .statements()
        .iter()
        .filter_map(|stmt| match stmt {
            Stmt::Assign {
                target: AssignTarget::ArrayElement { index, .. },
                value,
            } => string_constant(method, *value).map(|s| (*index, s.to_owned())),
            _ => None,
        })
        .collect()
}

/// Lengths of every array allocated in the body.
fn array_lengths(method: &MethodEmitter) -> Vec<u32> {
    method
        .body()
        .exprs()
        .iter()
        .filter_map(|node| match node.kind {
            ExprKind::NewArray { length, .. } => Some(length),
            _ => None,
        })
        .collect()
}

fn payload_keys(method: &MethodEmitter) -> Vec<String> {
    let body = method.body();
    body.statements()
        .iter()
        .filter_map(|stmt| match stmt {
            Stmt::Expr(expr) => match &body.expr(*expr)?.kind {
                ExprKind::Invoke { method: desc, args, .. }
                    if desc.name() == well_known::ADD_VALUE =>
                {
                    string_constant(method, args[0]).map(str::to_owned)
                }
                _ => None,
            },
            _ => None,
        })
        .collect()
}

// -- Properties --

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        max_shrink_iters: 500,
        ..ProptestConfig::default()
    })]

    /// `__interfaces` mirrors the interface set, in order.
    #[test]
    fn prop_interfaces_match_set(picks in prop::collection::vec(0usize..8, 0..12)) {
        let (pool, interfaces, class) = generate(&picks, &[]);
        let method = object_data(&class);

        let expected: Vec<(u32, String)> = interfaces
            .qualified_names(&pool)
            .enumerate()
            .map(|(i, name)| (u32::try_from(i).unwrap(), name.to_owned()))
            .collect();
        prop_assert_eq!(array_stores(method), expected);
        prop_assert_eq!(
            array_lengths(method),
            vec![u32::try_from(interfaces.len()).unwrap()]
        );
    }

    /// Serialized instance fields are written in declaration order; static
    /// and non-serialized ones never are.
    #[test]
    fn prop_payload_filters_fields(shapes in prop::collection::vec(field_shape_strategy(), 0..10)) {
        let (_, _, class) = generate(&[0], &shapes);
        let keys = payload_keys(object_data(&class));

        let expected_fields: Vec<String> = shapes
            .iter()
            .enumerate()
            .filter(|(_, shape)| matches!(shape, FieldShape::Serialized))
            .map(|(i, _)| format!("f{i}"))
            .collect();
        let written_fields: Vec<String> = keys
            .iter()
            .filter(|key| key.starts_with('f'))
            .cloned()
            .collect();
        prop_assert_eq!(written_fields, expected_fields);

        let reserved = keys.iter().filter(|key| key.starts_with("__")).count();
        // interfaces, base type, options, type id, target field type
        prop_assert_eq!(reserved, 5);
    }
}
