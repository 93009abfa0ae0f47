use crate::battle::engine::{
    BattleSession, PlayerAction, ATTACK_ANIMATION_DELAY, CAPTURE_DELAY, FLEE_FAILURE_DELAY,
};
use crate::battle::state::{BattleEvent, BattlePhase, Side};
use crate::battle::tests::common::{started_battle, test_provider, TestCombatantBuilder};
use crate::errors::InvalidTransition;
use crate::rng::TurnRng;
use rstest::rstest;
use std::time::Duration;

fn default_battle() -> BattleSession {
    started_battle(
        TestCombatantBuilder::new("Riolu").build(),
        TestCombatantBuilder::new("Ponyta").build(),
    )
}

#[test]
fn test_begin_leaves_intro_once() {
    let mut battle = BattleSession::new(
        TestCombatantBuilder::new("Riolu").build(),
        TestCombatantBuilder::new("Ponyta").build(),
    );
    assert_eq!(battle.phase(), BattlePhase::Intro);

    let bus = battle.begin();
    assert_eq!(bus.formatted(), vec!["A wild Ponyta appeared!".to_string()]);
    assert_eq!(battle.phase(), BattlePhase::AwaitingPlayerAction);
    assert_eq!(battle.headline(), "A wild Ponyta appeared!");
    assert!(battle.log().is_empty());

    assert!(battle.begin().is_empty());
}

#[rstest]
#[case(PlayerAction::Fight("tackle".to_string()), "Fight")]
#[case(PlayerAction::Run, "Run")]
#[case(PlayerAction::Capture, "Capture")]
fn test_actions_during_intro_are_rejected(
    #[case] action: PlayerAction,
    #[case] label: &'static str,
) {
    let mut battle = BattleSession::new(
        TestCombatantBuilder::new("Riolu").build(),
        TestCombatantBuilder::new("Ponyta").build(),
    );
    let err = battle.submit(action).unwrap_err();
    assert_eq!(
        err,
        InvalidTransition {
            action: label,
            phase: BattlePhase::Intro,
        }
    );
    assert_eq!(battle.phase(), BattlePhase::Intro);
    assert!(!battle.has_pending());
}

#[test]
fn test_double_submit_is_a_no_op() {
    let mut battle = default_battle();
    battle.submit(PlayerAction::Capture).unwrap();
    assert_eq!(battle.phase(), BattlePhase::Capturing);
    assert_eq!(battle.pending_delay(), Some(CAPTURE_DELAY));

    let before_hp = (battle.player().current_hp(), battle.opponent().current_hp());
    let err = battle.submit(PlayerAction::Fight("tackle".to_string()));
    assert!(err.is_err());
    assert_eq!(battle.phase(), BattlePhase::Capturing);
    assert_eq!(battle.pending_delay(), Some(CAPTURE_DELAY));
    assert_eq!(
        (battle.player().current_hp(), battle.opponent().current_hp()),
        before_hp
    );
    assert!(battle.log().is_empty());
}

#[test]
fn test_fight_schedules_the_counter_turn() {
    let provider = test_provider();
    let mut battle = default_battle();
    assert_eq!(battle.turn_owner(), Some(Side::Player));

    battle
        .submit(PlayerAction::Fight("tackle".to_string()))
        .unwrap();
    assert_eq!(battle.phase(), BattlePhase::ResolvingPlayerMove);
    assert_eq!(battle.turn_owner(), None);
    assert_eq!(battle.pending_delay(), Some(Duration::ZERO));

    let mut rng = TurnRng::new_for_test(vec![0.5, 0.5, 0.0, 0.5, 0.5]);
    battle.advance(&provider, &mut rng);
    assert_eq!(battle.phase(), BattlePhase::ResolvingOpponentMove);
    assert_eq!(battle.turn_owner(), Some(Side::Opponent));
    assert_eq!(battle.pending_delay(), Some(ATTACK_ANIMATION_DELAY));
    assert_eq!(battle.log().len(), 1);

    // The player cannot act while the opponent's reply is pending.
    assert!(battle.submit(PlayerAction::Run).is_err());

    battle.advance(&provider, &mut rng);
    assert_eq!(battle.phase(), BattlePhase::AwaitingPlayerAction);
    assert!(!battle.has_pending());
    assert_eq!(battle.log().len(), 2);
    assert_eq!(battle.turns_taken(), 1);
}

#[test]
fn test_failed_escape_hands_the_turn_over() {
    let provider = test_provider();
    let mut battle = default_battle();
    battle.submit(PlayerAction::Run).unwrap();
    assert_eq!(battle.phase(), BattlePhase::Fleeing);

    // 0.9 * 100 > 50 at full HP
    let mut rng = TurnRng::new_for_test(vec![0.9, 0.0, 0.5, 0.5]);
    battle.advance(&provider, &mut rng);
    assert_eq!(battle.phase(), BattlePhase::ResolvingOpponentMove);
    assert_eq!(battle.pending_delay(), Some(FLEE_FAILURE_DELAY));
    assert_eq!(battle.log(), ["Failed to escape!"]);

    let bus = battle.settle(&provider, &mut rng);
    assert!(bus
        .events()
        .iter()
        .any(|e| matches!(e, BattleEvent::AttackResolved { attacker: Side::Opponent, .. })));
    assert_eq!(battle.phase(), BattlePhase::AwaitingPlayerAction);
}

#[test]
fn test_failed_capture_triggers_an_immediate_counter() {
    let provider = test_provider();
    let mut battle = default_battle();
    battle.submit(PlayerAction::Capture).unwrap();

    // 0.9 * 100 = 90 > 50
    let mut rng = TurnRng::new_for_test(vec![0.9, 0.0, 0.5, 0.5]);
    battle.advance(&provider, &mut rng);
    assert_eq!(battle.phase(), BattlePhase::ResolvingOpponentMove);
    assert_eq!(battle.pending_delay(), Some(Duration::ZERO));
    assert_eq!(battle.headline(), "Capture failed!");
}

#[test]
fn test_settle_finishes_a_torn_down_turn() {
    let provider = test_provider();
    let mut battle = default_battle();
    battle
        .submit(PlayerAction::Fight("tackle".to_string()))
        .unwrap();

    let mut rng = TurnRng::new_for_test(vec![0.5, 0.5, 0.0, 0.5, 0.5]);
    battle.settle(&provider, &mut rng);
    assert_eq!(battle.phase(), BattlePhase::AwaitingPlayerAction);
    assert_eq!(battle.log().len(), 2);
}

#[test]
fn test_terminal_phase_freezes_the_battle() {
    let provider = test_provider();
    let mut battle = default_battle();
    let mut rng = TurnRng::new_for_test(vec![0.0]);
    battle.act(PlayerAction::Run, &provider, &mut rng).unwrap();
    assert_eq!(battle.phase(), BattlePhase::Fled);
    assert!(battle.is_over());

    let hp = (battle.player().current_hp(), battle.opponent().current_hp());
    let log = battle.log().to_vec();
    for action in [
        PlayerAction::Fight("tackle".to_string()),
        PlayerAction::Run,
        PlayerAction::Capture,
    ] {
        // An empty script would panic if anything were rolled.
        let mut empty = TurnRng::new_for_test(vec![]);
        assert!(battle.act(action, &provider, &mut empty).is_err());
        assert!(battle.advance(&provider, &mut empty).is_empty());
    }
    assert_eq!(battle.phase(), BattlePhase::Fled);
    assert_eq!(
        (battle.player().current_hp(), battle.opponent().current_hp()),
        hp
    );
    assert_eq!(battle.log(), log.as_slice());
}
