use pretty_assertions::assert_eq;

use super::*;

#[test]
fn duplicates_keep_first_position() {
    let set = InterfaceSet::new([
        TypeId::SERIALIZABLE,
        TypeId::INTERCEPTOR,
        TypeId::SERIALIZABLE,
        TypeId::PROXY_TARGET_ACCESSOR,
        TypeId::INTERCEPTOR,
    ]);
    assert_eq!(
        set.as_slice(),
        &[
            TypeId::SERIALIZABLE,
            TypeId::INTERCEPTOR,
            TypeId::PROXY_TARGET_ACCESSOR
        ]
    );
    assert_eq!(set.len(), 3);
    assert!(set.contains(TypeId::INTERCEPTOR));
    assert!(!set.contains(TypeId::OBJECT));
}

#[test]
fn qualified_names_follow_set_order() {
    let pool = TypePool::new();
    let set: InterfaceSet = [TypeId::PROXY_TARGET_ACCESSOR, TypeId::SERIALIZABLE]
        .into_iter()
        .collect();
    let names: Vec<&str> = set.qualified_names(&pool).collect();
    assert_eq!(names, vec!["proxy.ProxyTargetAccessor", "rt.Serializable"]);
}

#[test]
fn empty_set() {
    let set = InterfaceSet::default();
    assert!(set.is_empty());
    assert_eq!(set.iter().count(), 0);
}
