//! Class derivation tests: prototype inheritance, statics, constructors.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use observable_model::{Attributes, Model, ModelClass, ProtoProps, Rebind};
use serde_json::{json, Value};

fn attrs(value: Value) -> Attributes {
    value.as_object().cloned().unwrap_or_default()
}

// ============================================================================
// Prototype chain
// ============================================================================

#[test]
fn child_inherits_every_ancestor_method() {
    let animal = ModelClass::root("Animal");
    animal.method("speak", |_, _| json!("..."), false);
    animal.method("legs", |_, _| json!(4), false);

    let bird = animal.extend(
        "Bird",
        ProtoProps::new().method("legs", |_, _| json!(2)),
    );
    let parrot = bird.extend(
        "Parrot",
        ProtoProps::new().method("speak", |m, _| {
            let name = m
                .attr("name")
                .and_then(|v| v.as_str().map(String::from))
                .unwrap_or_default();
            json!(format!("{name} wants a cracker"))
        }),
    );

    let polly = parrot.create(attrs(json!({ "name": "Polly" })));
    assert_eq!(polly.call("speak", &[]), Some(json!("Polly wants a cracker")));
    assert_eq!(polly.call("legs", &[]), Some(json!(2)));
    assert_eq!(polly.call("fly", &[]), None);

    let generic = animal.create(Attributes::new());
    assert_eq!(generic.call("speak", &[]), Some(json!("...")));
    assert_eq!(generic.call("legs", &[]), Some(json!(4)));
}

#[test]
fn later_parent_methods_are_visible_to_children() {
    let base = ModelClass::root("Base");
    let child = base.extend("Child", ProtoProps::new());

    base.method("late", |_, _| json!("added after derivation"), false);

    let m = child.create(Attributes::new());
    assert_eq!(m.call("late", &[]), Some(json!("added after derivation")));
}

#[test]
fn child_methods_do_not_leak_to_parent() {
    let base = ModelClass::root("Base");
    let child = base.extend("Child", ProtoProps::new().method("only_child", |_, _| json!(1)));

    assert!(child.prototype().method("only_child").is_some());
    assert!(base.prototype().method("only_child").is_none());
}

#[test]
fn super_prototype_points_at_parent_prototype() {
    let base = ModelClass::root("Base");
    base.method("describe", |_, _| json!("base"), false);
    let child = base.extend(
        "Child",
        ProtoProps::new().method("describe", |_, _| json!("child")),
    );

    let sup = child.super_prototype().expect("child has a parent");
    assert!(Arc::ptr_eq(sup, base.prototype()));
    assert!(base.super_prototype().is_none());

    // Calling the overridden method explicitly.
    let m = child.create(Attributes::new());
    let parent_describe = sup.method("describe").unwrap();
    assert_eq!(parent_describe(&m, &[]), json!("base"));
    assert_eq!(m.call("describe", &[]), Some(json!("child")));
}

#[test]
fn subclass_relationships() {
    let base = ModelClass::root("Base");
    let child = base.extend("Child", ProtoProps::new());
    let grandchild = child.extend("Grandchild", ProtoProps::new());
    let other = ModelClass::root("Other");

    assert!(grandchild.is_subclass_of(&base));
    assert!(grandchild.is_subclass_of(&child));
    assert!(grandchild.is_subclass_of(&grandchild));
    assert!(!base.is_subclass_of(&child));
    assert!(!grandchild.is_subclass_of(&other));
    assert!(grandchild.prototype().inherits_from(base.prototype()));
    assert!(Arc::ptr_eq(grandchild.parent().unwrap(), &child));
}

#[test]
fn method_respects_overwrite_flag() {
    let base = ModelClass::root("Base");
    base.method("m", |_, _| json!("first"), false);
    let child = base.extend("Child", ProtoProps::new());

    // Inherited method counts as existing.
    child.method("m", |_, _| json!("ignored"), false);
    let m = child.create(Attributes::new());
    assert_eq!(m.call("m", &[]), Some(json!("first")));

    child.method("m", |_, _| json!("forced"), true);
    assert_eq!(m.call("m", &[]), Some(json!("forced")));
    assert_eq!(child.prototype().method_names(), vec!["m"]);
}

#[test]
fn method_receives_arguments() {
    let base = ModelClass::root("Calc");
    base.method(
        "add",
        |_, args| json!(args.iter().filter_map(Value::as_i64).sum::<i64>()),
        false,
    );
    let m = base.create(Attributes::new());
    assert_eq!(m.call("add", &[json!(2), json!(3)]), Some(json!(5)));
}

// ============================================================================
// Statics
// ============================================================================

#[test]
fn statics_set_before_derivation_are_copied() {
    let base = ModelClass::root("Base");
    base.set_static("table", "things");

    let child = base.extend("Child", ProtoProps::new());
    assert_eq!(child.static_value("table"), Some(json!("things")));
}

#[test]
fn child_statics_never_leak_to_parent() {
    let base = ModelClass::root("Base");
    base.set_static("table", "things");
    let child = base.extend("Child", ProtoProps::new());

    child.set_static("table", "children").set_static("extra", 1);

    assert_eq!(base.static_value("table"), Some(json!("things")));
    assert_eq!(base.static_value("extra"), None);
    assert_eq!(child.statics().len(), 2);
}

#[test]
fn parent_statics_after_derivation_stay_on_parent() {
    let base = ModelClass::root("Base");
    let child = base.extend("Child", ProtoProps::new());
    base.set_static("late", true);
    assert_eq!(child.static_value("late"), None);
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn default_constructor_delegates_to_parent() {
    let seen = Arc::new(AtomicUsize::new(0));
    let seen_clone = Arc::clone(&seen);

    let base = ModelClass::root("Base");
    base.set_initialize(move |_, _| {
        seen_clone.fetch_add(1, Ordering::SeqCst);
    });
    let child = base.extend("Child", ProtoProps::new());

    let m = child.create(attrs(json!({ "a": 1 })));
    assert_eq!(m.attr("a"), Some(json!(1)));
    assert_eq!(seen.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(m.class(), &child));
}

#[test]
fn initialize_uses_the_most_specific_hook() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (a, b) = (Arc::clone(&log), Arc::clone(&log));

    let base = ModelClass::root("Base");
    base.set_initialize(move |_, _| a.lock().unwrap().push("base"));
    let child = base.extend(
        "Child",
        ProtoProps::new().initialize(move |_, _| b.lock().unwrap().push("child")),
    );

    child.create(Attributes::new());
    assert_eq!(*log.lock().unwrap(), vec!["child"]);
}

#[test]
fn custom_constructor_replaces_parent_logic() {
    let base = ModelClass::root("Base");
    let parent = Arc::clone(&base);
    let child = base.extend(
        "Stamped",
        ProtoProps::new().constructor(move |model, mut attrs| {
            attrs.insert("stamped".into(), json!(true));
            parent.construct(model, attrs);
        }),
    );

    let m = child.create(attrs(json!({ "title": "x" })));
    assert_eq!(m.attr("stamped"), Some(json!(true)));
    assert_eq!(m.attr("title"), Some(json!("x")));
}

#[test]
fn custom_constructor_without_chaining_leaves_store_empty() {
    let base = ModelClass::root("Base");
    let child = base.extend("Bare", ProtoProps::new().constructor(|_, _| {}));
    let m = child.create(attrs(json!({ "title": "x" })));
    assert!(m.is_empty());
    // Still a fully usable instance.
    assert!(m.dispatch().has_channel("change"));
}

#[test]
fn grandchild_default_constructor_runs_custom_parent_constructor() {
    let base = ModelClass::root("Base");
    let parent = Arc::clone(&base);
    let child = base.extend(
        "Child",
        ProtoProps::new().constructor(move |model, mut attrs| {
            attrs.insert("via".into(), json!("child"));
            parent.construct(model, attrs);
        }),
    );
    let grandchild = child.extend("Grandchild", ProtoProps::new());

    let m = grandchild.create(Attributes::new());
    assert_eq!(m.attr("via"), Some(json!("child")));
}

#[test]
fn instances_get_unique_cids() {
    let a = Model::new(Attributes::new());
    let b = Model::new(Attributes::new());
    assert!(a.cid().starts_with('c'));
    assert_ne!(a.cid(), b.cid());
}

// ============================================================================
// Class-level configuration
// ============================================================================

#[test]
fn id_attribute_is_inherited_and_overridable() {
    let base = ModelClass::root("Base");
    base.set_id_attribute("_id");
    let child = base.extend("Child", ProtoProps::new());
    assert_eq!(child.id_attribute(), "_id");

    let other = base.extend("Other", ProtoProps::new().id_attribute("key"));
    assert_eq!(other.id_attribute(), "key");
    assert_eq!(base.id_attribute(), "_id");
    assert_eq!(ModelClass::root("Fresh").id_attribute(), "id");
}

#[test]
fn declared_channels_extend_the_defaults() {
    let base = ModelClass::root("Base");
    let child = base.extend("Child", ProtoProps::new().channel("ping").channel("bad name"));
    let grandchild = child.extend("Grandchild", ProtoProps::new().channel("pong"));

    assert_eq!(
        grandchild.prototype().channels(),
        vec!["sync", "change", "destroy", "invalid", "ping", "pong"]
    );

    let m = grandchild.create(Attributes::new());
    assert_eq!(m.dispatch().channels().len(), 6);
}

#[test]
fn added_channel_applies_to_new_instances() {
    let base = ModelClass::root("Base");
    let before = base.create(Attributes::new());
    base.add_channel("late");
    let after = base.create(Attributes::new());

    assert!(!before.dispatch().has_channel("late"));
    assert!(after.dispatch().has_channel("late"));
}
