//! End-to-end tests running plain and adaptive automata through the executor.

use adaptive_automaton::{samples, Automaton, DeviceDescription, State, StringInput, Symbol};
use adaptive_engine::adaptive::{
    AdaptiveAction, AdaptiveDevice, AdaptiveFunction, InsertAction, Parameter, RemoveAction,
};
use adaptive_engine::{
    run, Configuration, Device, ExecutionContext, ExecutionErrorKind, Executor, ExecutorConfig,
    InputStream, OutputSymbol, ResolutionError, Rule,
};

// ============================================================================
// Helpers
// ============================================================================

fn chars(text: &str) -> StringInput {
    StringInput::with_separator(text, "")
}

fn verdict<D: Device<Event = Symbol>>(device: &mut D, text: &str) -> OutputSymbol {
    run(device, &mut chars(text)).expect("run should not fail")
}

fn s(name: &str) -> State {
    State::new(name)
}

// ============================================================================
// Scenario A: plain a*b*
// ============================================================================

#[test]
fn test_scenario_a_plain_automaton() {
    let mut device = samples::a_star_b_star().unwrap();

    assert_eq!(verdict(&mut device, "ab"), OutputSymbol::Accept);
    assert_eq!(verdict(&mut device, "ba"), OutputSymbol::Reject);
    assert_eq!(verdict(&mut device, ""), OutputSymbol::Reject);
}

#[test]
fn test_plain_automaton_is_deterministic() {
    let device = samples::a_star_b_star().unwrap();

    for state in device.configurations() {
        for event in ["a", "b", "c", ""] {
            let mut context = device.start().unwrap();
            context.change_configuration(state.clone()).unwrap();
            let symbol = Symbol::new(event);
            let key = if event.is_empty() { None } else { Some(&symbol) };
            assert!(context.rules_for(&device, key).len() <= 1);
        }
    }
}

// ============================================================================
// Scenario B: adaptive aⁿbⁿcⁿ
// ============================================================================

#[test]
fn test_scenario_b_fresh_devices() {
    for (text, expected) in [
        ("abc", OutputSymbol::Accept),
        ("aabbcc", OutputSymbol::Accept),
        ("aaabbbccc", OutputSymbol::Accept),
        ("aabccc", OutputSymbol::Reject),
        ("aabbc", OutputSymbol::Reject),
        ("abbcc", OutputSymbol::Reject),
    ] {
        let mut device = samples::anbncn().unwrap();
        assert_eq!(verdict(&mut device, text), expected, "input {text}");
    }
}

#[test]
fn test_scenario_b_from_description() {
    for (text, expected) in [
        ("abc", OutputSymbol::Accept),
        ("aabbcc", OutputSymbol::Accept),
        ("aabccc", OutputSymbol::Reject),
    ] {
        let mut device = samples::anbncn_description().build().unwrap();
        assert_eq!(verdict(&mut device, text), expected, "input {text}");
    }
}

#[test]
fn test_persistence_across_runs() {
    let mut device = samples::anbncn().unwrap();

    assert_eq!(verdict(&mut device, "aabbcc"), OutputSymbol::Accept);
    // The chains grown by the first run are still in place.
    assert_eq!(verdict(&mut device, "aabbcc"), OutputSymbol::Reject);
    assert_eq!(verdict(&mut device, "abbbccc"), OutputSymbol::Accept);
}

#[test]
fn test_generated_states_use_reserved_prefix() {
    let mut device = samples::anbncn().unwrap();
    verdict(&mut device, "aabbcc");

    let generated: Vec<String> = device
        .configurations()
        .iter()
        .map(|c| c.name().to_string())
        .filter(|n| n.starts_with("##"))
        .collect();
    assert_eq!(generated, vec!["##0", "##1"]);
}

// ============================================================================
// Scenario C: removing everything
// ============================================================================

#[test]
fn test_scenario_c_remove_everything_fails_at_construction() {
    assert_eq!(
        RemoveAction::new(None, None, None).unwrap_err(),
        ResolutionError::RemoveEverything
    );
}

// ============================================================================
// Executor properties
// ============================================================================

#[test]
fn test_epsilon_fallback_consumes_nothing() {
    let mut automaton = Automaton::new();
    let one = automaton.add_state("1", true, false).unwrap();
    let two = automaton.add_state("2", false, false).unwrap();
    let three = automaton.add_state("3", false, true).unwrap();
    automaton.add_rule(&one, "", &two).unwrap();
    automaton.add_rule(&two, "x", &three).unwrap();

    let mut input = chars("x");
    let mut context = automaton.start().unwrap();
    let epsilon = context.rules_for(&automaton, None).remove(0);
    assert!(epsilon.is_epsilon());
    context.apply(&mut automaton, &mut input, &epsilon).unwrap();
    assert!(input.has_next());

    assert_eq!(verdict(&mut automaton, "x"), OutputSymbol::Accept);
}

#[test]
fn test_rejection_without_error() {
    let mut automaton = Automaton::new();
    let one = automaton.add_state("1", true, true).unwrap();
    automaton.add_rule(&one, "a", &one).unwrap();

    assert_eq!(verdict(&mut automaton, "ab"), OutputSymbol::Reject);
}

#[test]
fn test_missing_initial_state_is_fatal() {
    let mut automaton = Automaton::new();
    automaton.add_state("1", false, true).unwrap();

    let err = run(&mut automaton, &mut chars("a")).unwrap_err();
    assert_eq!(err.kind, ExecutionErrorKind::MissingInitialConfiguration);
}

#[test]
fn test_step_limit_guards_epsilon_cycles() {
    let mut automaton = Automaton::new();
    let one = automaton.add_state("1", true, false).unwrap();
    let two = automaton.add_state("2", false, false).unwrap();
    automaton.add_rule(&one, "", &two).unwrap();
    automaton.add_rule(&two, "", &one).unwrap();

    let executor = Executor::with_config(ExecutorConfig::bounded(50));
    let err = executor.run(&mut automaton, &mut chars("")).unwrap_err();
    assert_eq!(err.kind, ExecutionErrorKind::StepLimitExceeded { limit: 50 });
}

#[test]
fn test_alphabet_applies_to_adaptive_devices() {
    let mut description = samples::anbncn_description();
    description.rules.push(adaptive_automaton::description::RuleDescription {
        source: "4".into(),
        event: "d".into(),
        destination: "4".into(),
        pre: None,
        post: None,
    });
    let mut device = description.build().unwrap();

    // No rule for an outside symbol is a plain rejection.
    assert_eq!(verdict(&mut device, "ad"), OutputSymbol::Reject);

    let err = run(&mut device, &mut chars("abcd")).unwrap_err();
    assert_eq!(err.kind, ExecutionErrorKind::InvalidSymbol { symbol: "d".into() });
    let input = err.diagnostics.input.expect("input snapshot");
    assert_eq!(input.render_consumed(), "abc");
}

// ============================================================================
// Adaptive behavior
// ============================================================================

fn self_removing_device() -> AdaptiveDevice<Automaton> {
    let mut automaton = Automaton::new();
    for (name, initial, accepting) in [("1", true, false), ("2", false, false), ("3", false, true)] {
        automaton.add_state(name, initial, accepting).unwrap();
    }
    let mut device = AdaptiveDevice::new(automaton);
    device.add_adaptive_function(
        AdaptiveFunction::new("divert")
            .with_action(AdaptiveAction::Remove(
                RemoveAction::new(
                    Some(Parameter::configuration("1")),
                    Some(Parameter::event("a")),
                    None,
                )
                .unwrap(),
            ))
            .with_action(AdaptiveAction::Insert(
                InsertAction::new(
                    Parameter::configuration("1"),
                    Some(Parameter::event("a")),
                    Parameter::configuration("3"),
                )
                .unwrap(),
            )),
    );
    let pre = device.call("divert", vec![]).unwrap();
    device
        .add_adaptive_rule(Some(pre), &s("1"), "a", &s("2"), None)
        .unwrap();
    device
}

#[test]
fn test_self_removal_abort() {
    let mut device = self_removing_device();
    let mut input = chars("a");
    let mut context = device.start().unwrap();
    let rule = context.rules_for(&device, input.peek()).remove(0);

    let next = context.apply(&mut device, &mut input, &rule).unwrap();

    assert_eq!(next, s("1"));
    assert_eq!(context.current(), &s("1"));
    assert_eq!(input.remaining().len(), 1);
    assert!(!device.rule_exists(&rule));
}

#[test]
fn test_self_removal_then_reselection() {
    let mut device = self_removing_device();

    assert_eq!(verdict(&mut device, "a"), OutputSymbol::Accept);
    assert_eq!(device.underlying().target("1", "a"), Some(&s("3")));
}

#[test]
fn test_rejection_keeps_mutations() {
    let mut device = samples::anbncn().unwrap();
    let before = device.rules().len();

    assert_eq!(verdict(&mut device, "aab"), OutputSymbol::Reject);
    assert!(device.rules().len() > before);
    assert_eq!(device.configurations().len(), 6);
}

// ============================================================================
// Descriptions
// ============================================================================

#[test]
fn test_description_round_trip() -> anyhow::Result<()> {
    let description = samples::anbncn_description();
    let json = description.to_json_pretty()?;
    let parsed = DeviceDescription::from_json(&json)?;
    assert_eq!(parsed, description);

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("anbncn.json");
    std::fs::write(&path, &json)?;
    let loaded = DeviceDescription::load(&path)?;
    assert_eq!(loaded, description);

    let mut device = loaded.build()?;
    assert_eq!(verdict(&mut device, "aaabbbccc"), OutputSymbol::Accept);
    Ok(())
}

#[test]
fn test_description_and_api_agree() {
    let built = samples::anbncn_description().build().unwrap();
    let direct = samples::anbncn().unwrap();

    let render = |device: &AdaptiveDevice<Automaton>| -> Vec<String> {
        device.rules().iter().map(|r| r.to_string()).collect()
    };
    assert_eq!(render(&built), render(&direct));
}

#[test]
fn test_load_missing_file() {
    let err = DeviceDescription::load("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("failed to read"));
}
