//! Property-based tests for configuration building and execution.

use proptest::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use tmrun::{
    ActionDefinition, ConfigError, ExecutionError, ExecutionSettings, Executor,
    MachineConfiguration, MachineDefinition, OneOrMany, Step,
};

prop_compose! {
    /// A non-empty alphabet of distinct lowercase symbols.
    fn arbitrary_alphabet()(symbols in prop::collection::btree_set("[a-z]{1,3}", 1..6)) -> Vec<String> {
        symbols.into_iter().chain(std::iter::once("z0".to_string())).collect()
    }
}

/// A machine with a single working state `S` that moves in `movement` on every symbol
/// and enters the halting state `H`.
fn machine(alphabet: &[String], blank: &str, movement: &str) -> MachineDefinition {
    let mut definition = MachineDefinition::default();
    definition.alphabet.symbols = alphabet.to_vec();
    definition.alphabet.blank = blank.to_string();
    definition.alphabet.input = Some(OneOrMany::Many(alphabet.to_vec()));
    definition.states.initial = "S".to_string();
    definition.states.halting = Some(OneOrMany::Single("H".to_string()));

    let mut actions = BTreeMap::new();
    actions.insert(
        "default".to_string(),
        ActionDefinition::new(None, Some(movement), Some("H")),
    );
    definition.states.states.insert("S".to_string(), actions);
    definition.states.states.insert("H".to_string(), BTreeMap::new());
    definition
}

fn build(definition: &MachineDefinition) -> Result<MachineConfiguration, ConfigError> {
    MachineConfiguration::build(definition, &ExecutionSettings::default())
}

proptest! {
    #[test]
    fn blank_must_be_in_alphabet(alphabet in arbitrary_alphabet(), blank in "[A-Z]{1,2}") {
        let result = build(&machine(&alphabet, &blank, "R"));
        let is_blank_error = matches!(result, Err(ConfigError::BlankNotInAlphabet { .. }));
        prop_assert!(is_blank_error);

        prop_assert!(build(&machine(&alphabet, &alphabet[0], "R")).is_ok());
    }

    #[test]
    fn reserved_keywords_are_rejected(
        alphabet in arbitrary_alphabet(),
        keyword in prop::sample::select(vec!["blank", "default"]),
    ) {
        let mut symbols = alphabet.clone();
        symbols.push(keyword.to_string());

        prop_assert_eq!(
            build(&machine(&symbols, &alphabet[0], "R")).unwrap_err(),
            ConfigError::ReservedSymbolUsed(keyword.to_string())
        );
    }

    #[test]
    fn default_expands_to_identity_writes(alphabet in arbitrary_alphabet()) {
        let config = build(&machine(&alphabet, &alphabet[0], "L")).unwrap();
        let state = config.state("S").unwrap();

        prop_assert_eq!(state.actions().len(), alphabet.len());
        for symbol in &alphabet {
            let action = state.action(symbol).unwrap();
            prop_assert_eq!(action.write.as_deref(), Some(symbol.as_str()));
            prop_assert_eq!(action.movement, tmrun::Move::Left);
            prop_assert_eq!(action.transition.as_str(), "H");
        }
    }

    #[test]
    fn build_is_deterministic(alphabet in arbitrary_alphabet()) {
        let definition = machine(&alphabet, &alphabet[0], "R");
        prop_assert_eq!(build(&definition).unwrap(), build(&definition).unwrap());
    }

    #[test]
    fn right_at_end_appends_one_blank(alphabet in arbitrary_alphabet(), len in 1usize..8) {
        let config = Arc::new(build(&machine(&alphabet, &alphabet[0], "R")).unwrap());
        let tape: Vec<String> = (0..len).map(|i| alphabet[i % alphabet.len()].clone()).collect();
        let mut executor = Executor::new(config, tape.clone(), len - 1).unwrap();

        prop_assert_eq!(executor.step(), Ok(Step::Continue));

        let mut expected = tape;
        expected.push(alphabet[0].clone());
        prop_assert_eq!(executor.tape(), expected.as_slice());
        prop_assert_eq!(executor.head(), len);
    }

    #[test]
    fn left_at_start_prepends_one_blank(alphabet in arbitrary_alphabet(), len in 1usize..8) {
        let config = Arc::new(build(&machine(&alphabet, &alphabet[0], "L")).unwrap());
        let tape: Vec<String> = (0..len).map(|i| alphabet[i % alphabet.len()].clone()).collect();
        let mut executor = Executor::new(config, tape.clone(), 0).unwrap();

        prop_assert_eq!(executor.step(), Ok(Step::Continue));

        let mut expected = vec![alphabet[0].clone()];
        expected.extend(tape);
        prop_assert_eq!(executor.tape(), expected.as_slice());
        prop_assert_eq!(executor.head(), 0);
    }

    #[test]
    fn halting_never_mutates(alphabet in arbitrary_alphabet(), len in 1usize..8) {
        let config = Arc::new(build(&machine(&alphabet, &alphabet[0], "R")).unwrap());
        let tape: Vec<String> = (0..len).map(|i| alphabet[i % alphabet.len()].clone()).collect();
        let mut executor = Executor::new(config, tape, len - 1).unwrap();

        executor.step().unwrap();
        let before = executor.to_display();

        prop_assert_eq!(executor.step(), Ok(Step::Halted));
        prop_assert_eq!(executor.tape(), before.tape.as_slice());
        prop_assert_eq!(executor.head(), before.head);

        prop_assert_eq!(executor.step(), Err(ExecutionError::AlreadyHalted));
        prop_assert_eq!(executor.tape(), before.tape.as_slice());
    }
}

#[test]
fn single_cell_end_to_end() {
    let mut definition = MachineDefinition::default();
    definition.alphabet.symbols = vec!["0".to_string(), "1".to_string()];
    definition.alphabet.blank = "0".to_string();
    definition.alphabet.input = Some(OneOrMany::Single("1".to_string()));
    definition.states.initial = "A".to_string();
    definition.states.halting = Some(OneOrMany::Single("B".to_string()));

    let mut actions = BTreeMap::new();
    actions.insert(
        "1".to_string(),
        ActionDefinition::new(Some("0"), Some("R"), Some("B")),
    );
    definition.states.states.insert("A".to_string(), actions);
    definition.states.states.insert("B".to_string(), BTreeMap::new());

    let settings = ExecutionSettings::default().with_tape(vec!["1"], 0);
    let config = Arc::new(MachineConfiguration::build(&definition, &settings).unwrap());
    let mut executor = Executor::from_configuration(config).unwrap();

    assert_eq!(executor.step(), Ok(Step::Continue));
    assert_eq!(executor.tape(), &["0", "0"]);
    assert_eq!(executor.head(), 1);
    assert_eq!(executor.state(), "B");

    assert_eq!(executor.step(), Ok(Step::Halted));
    assert_eq!(executor.tape(), &["0", "0"]);
    assert!(executor.is_halted());
}
