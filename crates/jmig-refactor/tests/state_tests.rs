use jmig_refactor::{allowed_transitions, validate_transition, MigrationState, RunState};
use proptest::prelude::*;

fn any_state() -> impl Strategy<Value = MigrationState> {
    prop::sample::select(MigrationState::ALL.to_vec())
}

#[test]
fn test_linear_chain() {
    let chain = [
        MigrationState::NotStarted,
        MigrationState::InProgress,
        MigrationState::Phase1Complete,
        MigrationState::Phase2Complete,
        MigrationState::Phase3Complete,
        MigrationState::Phase4Complete,
        MigrationState::Verified,
        MigrationState::Complete,
    ];
    for pair in chain.windows(2) {
        assert!(validate_transition(pair[0], pair[1]).is_ok(), "{} -> {}", pair[0], pair[1]);
    }
}

#[test]
fn test_alternate_terminals() {
    assert!(validate_transition(MigrationState::InProgress, MigrationState::RolledBack).is_ok());
    assert!(validate_transition(MigrationState::Phase3Complete, MigrationState::Failed).is_ok());

    // Not from the ends of the chain
    assert!(validate_transition(MigrationState::NotStarted, MigrationState::Failed).is_err());
    assert!(validate_transition(MigrationState::Verified, MigrationState::RolledBack).is_err());
}

#[test]
fn test_no_phase_skipping() {
    assert!(validate_transition(MigrationState::InProgress, MigrationState::Phase2Complete).is_err());
    assert!(validate_transition(MigrationState::Phase4Complete, MigrationState::Complete).is_err());
}

#[test]
fn test_run_state_records_history() {
    let run = RunState::new();
    run.transition(MigrationState::InProgress).unwrap();
    run.transition(MigrationState::RolledBack).unwrap();
    assert!(run.transition(MigrationState::InProgress).is_err());

    let history = run.history();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].from, MigrationState::InProgress);
    assert_eq!(run.current(), MigrationState::RolledBack);
}

proptest! {
    #[test]
    fn prop_validation_matches_allowed_table(from in any_state(), to in any_state()) {
        let res = validate_transition(from, to);
        let allowed = allowed_transitions(from);
        prop_assert_eq!(res.is_ok(), allowed.contains(&to));
    }

    #[test]
    fn prop_terminal_states_have_no_exits(state in any_state()) {
        prop_assert_eq!(state.is_terminal(), allowed_transitions(state).is_empty());
    }

    #[test]
    fn prop_rejected_transition_leaves_state(path in prop::collection::vec(any_state(), 0..12)) {
        let run = RunState::new();
        for to in path {
            let before = run.current();
            if run.transition(to).is_err() {
                prop_assert_eq!(run.current(), before);
            } else {
                prop_assert_eq!(run.current(), to);
            }
        }
    }
}
