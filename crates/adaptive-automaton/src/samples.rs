//! Worked example devices.
//!
//! `a_star_b_star` is a plain automaton for `a*b+`. `anbncn` recognizes
//! `aⁿbⁿcⁿ` (n ≥ 1): every extra `a` calls `grow`, which splices one fresh
//! state into the `b` chain and one into the `c` chain.
//!
//! ```text
//!          a          b          c
//!   (1) ------> (2) ------> (3) ------> ((4))
//!               | ^
//!               +-+ a / grow(2, 3, 3, 4)
//! ```
//!
//! `grow(b_from, b_to, c_from, c_to)` with generators `g0`, `g1`:
//!
//! ```text
//! remove (b_from, b, b_to), (c_from, c, c_to), (b_from, a, b_from)
//! insert (b_from, b, g0), (g0, b, b_to), (c_from, c, g1), (g1, c, c_to)
//! insert (b_from, a, b_from) / grow(b_from, g0, c_from, g1)
//! ```
//!
//! The growth persists: a device that accepted `aabbcc` needs one more `b`
//! and `c` per run.

use adaptive_engine::adaptive::{
    AdaptiveAction, AdaptiveDevice, AdaptiveFunction, Argument, CallTemplate, InsertAction,
    Parameter, RemoveAction,
};
use adaptive_engine::{Device, ResolutionResult};

use crate::automaton::Automaton;
use crate::description::{
    ActionDescription, CallDescription, DeviceDescription, FunctionDescription, RuleDescription,
    StateDescription,
};

/// Names of the builtin samples.
pub const BUILTINS: [&str; 2] = ["ab", "anbncn"];

/// Name of the growth function of [`anbncn`].
pub const GROW: &str = "grow";

/// Plain `a*b+` automaton: states 1 (initial) and 2 (accepting).
pub fn a_star_b_star() -> ResolutionResult<Automaton> {
    let mut automaton = Automaton::new();
    let one = automaton.add_state("1", true, false)?;
    let two = automaton.add_state("2", false, true)?;
    automaton.add_rule(&one, "a", &one)?;
    automaton.add_rule(&one, "b", &two)?;
    automaton.add_rule(&two, "b", &two)?;
    Ok(automaton)
}

fn grow_actions() -> ResolutionResult<Vec<AdaptiveAction>> {
    let b_from = Parameter::configuration_ref(0);
    let b_to = Parameter::configuration_ref(1);
    let c_from = Parameter::configuration_ref(2);
    let c_to = Parameter::configuration_ref(3);
    let a = || Some(Parameter::event("a"));
    let b = || Some(Parameter::event("b"));
    let c = || Some(Parameter::event("c"));

    let remove = |source: &Parameter, event, destination: &Parameter| {
        RemoveAction::new(Some(source.clone()), event, Some(destination.clone()))
            .map(AdaptiveAction::Remove)
    };
    let insert = |source: &Parameter, event, destination: &Parameter| {
        InsertAction::new(source.clone(), event, destination.clone())
    };

    Ok(vec![
        remove(&b_from, b(), &b_to)?,
        remove(&c_from, c(), &c_to)?,
        remove(&b_from, a(), &b_from)?,
        AdaptiveAction::Insert(insert(&b_from, b(), &Parameter::generator(0))?),
        AdaptiveAction::Insert(insert(&Parameter::generator(0), b(), &b_to)?),
        AdaptiveAction::Insert(insert(&c_from, c(), &Parameter::generator(1))?),
        AdaptiveAction::Insert(insert(&Parameter::generator(1), c(), &c_to)?),
        AdaptiveAction::Insert(insert(&b_from, a(), &b_from)?.with_post(CallTemplate::new(
            GROW,
            vec![
                b_from.clone(),
                Parameter::generator(0),
                c_from.clone(),
                Parameter::generator(1),
            ],
        ))),
    ])
}

fn grow_arguments() -> Vec<Argument> {
    ["2", "3", "3", "4"]
        .into_iter()
        .map(Argument::configuration)
        .collect()
}

/// Adaptive `aⁿbⁿcⁿ` recognizer built through the device API.
pub fn anbncn() -> ResolutionResult<AdaptiveDevice<Automaton>> {
    let mut automaton = Automaton::new();
    let states = [
        automaton.add_state("1", true, false)?,
        automaton.add_state("2", false, false)?,
        automaton.add_state("3", false, false)?,
        automaton.add_state("4", false, true)?,
    ];

    let mut device = AdaptiveDevice::new(automaton);
    device.add_adaptive_function(
        AdaptiveFunction::new(GROW)
            .with_generators(2)
            .with_actions(grow_actions()?),
    );

    let [one, two, three, four] = &states;
    device.add_rule(one, "a", two)?;
    let grow = device.call(GROW, grow_arguments())?;
    device.add_adaptive_rule(None, two, "a", two, Some(grow))?;
    device.add_rule(two, "b", three)?;
    device.add_rule(three, "c", four)?;
    Ok(device)
}

/// Description of [`a_star_b_star`].
pub fn a_star_b_star_description() -> DeviceDescription {
    DeviceDescription {
        name: Some("ab".into()),
        states: vec![state("1", true, false), state("2", false, true)],
        alphabet: None,
        separator: None,
        functions: Vec::new(),
        rules: vec![rule("1", "a", "1"), rule("1", "b", "2"), rule("2", "b", "2")],
    }
}

/// Description of [`anbncn`].
pub fn anbncn_description() -> DeviceDescription {
    let reference = Parameter::configuration_ref;
    let event = |symbol: &str| Some(Parameter::event(symbol));
    let remove = |source: usize, symbol: &str, destination: usize| ActionDescription::Remove {
        source: Some(reference(source)),
        event: event(symbol),
        destination: Some(reference(destination)),
    };
    let insert = |source: Parameter, symbol: &str, destination: Parameter| ActionDescription::Insert {
        source,
        event: event(symbol),
        destination,
        pre: None,
        post: None,
    };

    let grow = FunctionDescription {
        name: GROW.into(),
        generators: 2,
        pre: None,
        actions: vec![
            remove(0, "b", 1),
            remove(2, "c", 3),
            remove(0, "a", 0),
            insert(reference(0), "b", Parameter::generator(0)),
            insert(Parameter::generator(0), "b", reference(1)),
            insert(reference(2), "c", Parameter::generator(1)),
            insert(Parameter::generator(1), "c", reference(3)),
            ActionDescription::Insert {
                source: reference(0),
                event: event("a"),
                destination: reference(0),
                pre: None,
                post: Some(CallTemplate::new(
                    GROW,
                    vec![
                        reference(0),
                        Parameter::generator(0),
                        reference(2),
                        Parameter::generator(1),
                    ],
                )),
            },
        ],
        post: None,
    };

    let mut looping = rule("2", "a", "2");
    looping.post = Some(CallDescription {
        function: GROW.into(),
        arguments: grow_arguments(),
    });

    DeviceDescription {
        name: Some("anbncn".into()),
        states: vec![
            state("1", true, false),
            state("2", false, false),
            state("3", false, false),
            state("4", false, true),
        ],
        alphabet: Some(vec!["a".into(), "b".into(), "c".into()]),
        separator: Some(String::new()),
        functions: vec![grow],
        rules: vec![
            rule("1", "a", "2"),
            looping,
            rule("2", "b", "3"),
            rule("3", "c", "4"),
        ],
    }
}

/// Description of a builtin sample by name.
pub fn builtin(name: &str) -> Option<DeviceDescription> {
    match name {
        "ab" => Some(a_star_b_star_description()),
        "anbncn" => Some(anbncn_description()),
        _ => None,
    }
}

fn state(name: &str, initial: bool, accepting: bool) -> StateDescription {
    StateDescription {
        name: name.into(),
        initial,
        accepting,
    }
}

fn rule(source: &str, event: &str, destination: &str) -> RuleDescription {
    RuleDescription {
        source: source.into(),
        event: event.into(),
        destination: destination.into(),
        pre: None,
        post: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::StringInput;
    use adaptive_engine::{run, OutputSymbol};

    fn verdict<D: Device<Event = crate::state::Symbol>>(device: &mut D, text: &str) -> OutputSymbol {
        run(device, &mut StringInput::with_separator(text, "")).unwrap()
    }

    #[test]
    fn test_a_star_b_star() {
        let mut device = a_star_b_star().unwrap();
        assert_eq!(verdict(&mut device, "aab"), OutputSymbol::Accept);
        assert_eq!(verdict(&mut device, "b"), OutputSymbol::Accept);
        assert_eq!(verdict(&mut device, "a"), OutputSymbol::Reject);
    }

    #[test]
    fn test_anbncn_grows_one_state_per_extra_a() {
        let mut device = anbncn().unwrap();
        assert_eq!(verdict(&mut device, "aaabbbccc"), OutputSymbol::Accept);
        // Two extra a's, two generators each.
        assert_eq!(device.configurations().len(), 8);
        assert_eq!(device.adaptive_rules().len(), 1);
    }

    #[test]
    fn test_builtin_lookup() {
        for name in BUILTINS {
            assert!(builtin(name).is_some());
        }
        assert!(builtin("nope").is_none());
    }
}
