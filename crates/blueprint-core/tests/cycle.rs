//! Cycle detection and cycle handlers

use blueprint_core::{
    Blueprint, BlueprintError, ConstantOnCycle, Configuration, FailOnCycle, Session, TypeMatcher,
};
use blueprint_reflect::Value;
use blueprint_test_utils::{fixture_registry, init_tracing};
use pretty_assertions::assert_eq;

fn blueprint() -> Blueprint {
    init_tracing();
    Blueprint::new(fixture_registry())
}

#[test]
fn mutual_reference_is_a_cycle() {
    let err = blueprint().construct("Parent").unwrap_err();
    assert!(err.is_cycle());
    assert_eq!(err.cycle_chain().unwrap(), ["Parent", "Child", "Parent"]);

    let message = err.to_string();
    let parent = message.find("Parent").unwrap();
    let child = message.find("Child").unwrap();
    assert!(parent < child, "{message}");
    assert!(message.contains("populating Child.setParent(Parent)"), "{message}");
}

#[test]
fn chain_starts_at_requested_type() {
    let err = blueprint().construct("Child").unwrap_err();
    assert_eq!(err.cycle_chain().unwrap(), ["Child", "Parent", "Child"]);
}

#[test]
fn null_handler_breaks_the_back_edge() {
    let config = Configuration::deterministic().with_null_on_cycle("Parent");
    let parent = blueprint().construct_with("Parent", &config).unwrap();

    let child = parent.field("child").unwrap();
    assert_eq!(child.as_object().unwrap().type_name(), "Child");
    assert_eq!(child.field("parent"), Some(Value::Null));
    assert_eq!(child.field("name"), Some(Value::from("")));
}

#[test]
fn handler_only_applies_to_its_type() {
    let config = Configuration::deterministic().with_null_on_cycle("Child");
    let blueprint = blueprint();

    let child = blueprint.construct_with("Child", &config).unwrap();
    let parent = child.field("parent").unwrap();
    assert_eq!(parent.field("child"), Some(Value::Null));

    // Starting from Parent the repeated type is Parent, which has no handler.
    assert!(blueprint.construct_with("Parent", &config).unwrap_err().is_cycle());
}

#[test]
fn later_handler_wins() {
    let config = Configuration::deterministic()
        .with_null_on_cycle("Parent")
        .with_cycle_handler(TypeMatcher::new("Parent"), FailOnCycle);
    let err = blueprint().construct_with("Parent", &config).unwrap_err();
    assert!(matches!(err, BlueprintError::Cycle { .. }));

    let config = config.with_cycle_handler(TypeMatcher::new("Parent"), ConstantOnCycle::new("loop"));
    let parent = blueprint().construct_with("Parent", &config).unwrap();
    let child = parent.field("child").unwrap();
    assert_eq!(child.field("parent"), Some(Value::from("loop")));
}

#[test]
fn session_survives_cycle_error() {
    let blueprint = blueprint();
    let config = Configuration::deterministic();
    let mut session = Session::new();

    assert!(blueprint.construct_in("Parent", &config, &mut session).is_err());
    assert_eq!(session.depth(), 0);
    assert_eq!(session.last_action(), "populating Child.setParent(Parent)");

    let config = config.with_null_on_cycle("Parent");
    assert!(blueprint.construct_in("Parent", &config, &mut session).is_ok());
    assert_eq!(session.depth(), 0);
}

#[test]
fn constructor_parameters_are_tracked() {
    let err = blueprint().construct("Hen").unwrap_err();
    assert_eq!(err.cycle_chain().unwrap(), ["Hen", "Egg", "Hen"]);
    assert!(
        err.to_string().contains("constructing parameter 0 (Hen) of Egg(Hen)"),
        "{err}"
    );
}

#[test]
fn constructor_cycle_broken_by_handler() {
    let config = Configuration::deterministic().with_null_on_cycle("Hen");
    let mut session = Session::new();
    let hen = blueprint().construct_in("Hen", &config, &mut session).unwrap();

    let egg = hen.field("egg").unwrap();
    assert_eq!(egg.as_object().unwrap().type_name(), "Egg");
    assert_eq!(egg.field("hen"), Some(Value::Null));
    assert_eq!(session.depth(), 0);
}

#[test]
fn separate_occurrences_are_not_cycles() {
    let roster = blueprint().construct("Roster").unwrap();
    let members = roster.field("members").unwrap();
    let addresses: Vec<Value> = members
        .as_array()
        .unwrap()
        .items
        .iter()
        .map(|m| m.field("address").unwrap())
        .collect();
    assert_eq!(addresses.len(), 7);
    assert!(addresses.iter().all(|a| a.as_object().is_some()));
}
