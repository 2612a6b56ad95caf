//! Property-based tests for the territory rules.
//!
//! Random intents are thrown at generated islands; after every step the
//! territory cache must agree with the grid and no treasury may go negative.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use hex_engine::generation::{generate_island, GenerationParams};
use hex_engine::piece::{merged_kind, PieceKind, BARON_STRENGTH};
use hex_engine::territory::connected_cells;
use hex_engine::{Coord, GameConfig, GameInteraction, GridLayout, Island, Snapshot, Team};

#[derive(Debug, Clone)]
enum Intent {
    Click(usize, bool),
    Buy(usize),
    EndTurn,
    Undo,
    Redo,
}

fn intent() -> impl Strategy<Value = Intent> {
    prop_oneof![
        6 => (any::<usize>(), prop::bool::weighted(0.1)).prop_map(|(i, long)| Intent::Click(i, long)),
        2 => any::<usize>().prop_map(Intent::Buy),
        1 => Just(Intent::EndTurn),
        1 => Just(Intent::Undo),
        1 => Just(Intent::Redo),
    ]
}

fn new_game(seed: u64) -> GameInteraction {
    let params = GenerationParams {
        width: 11,
        height: 11,
        layout: GridLayout::Hexagonal,
        seed,
        ..GenerationParams::default()
    };
    let config = GameConfig { human_teams: vec![Team::Leaf], ..GameConfig::default() };
    GameInteraction::new(generate_island(&params, config).unwrap())
}

fn apply(game: &mut GameInteraction, intent: &Intent) -> bool {
    let coords: Vec<Coord> = game.island().grid().visible_coords().collect();
    match *intent {
        Intent::Click(i, long) => game.click(coords[i % coords.len()], long),
        Intent::Buy(i) => {
            let kinds = game.island().config().prices.buyable();
            game.buy_unit(kinds[i % kinds.len()])
        }
        Intent::EndTurn => game.end_turn(),
        Intent::Undo => game.undo(),
        Intent::Redo => game.redo(),
    }
}

fn check_invariants(island: &Island) -> Result<(), TestCaseError> {
    for territory in island.territories().iter() {
        prop_assert_eq!(&connected_cells(island.grid(), territory.capital), &territory.cells);
        let capitals = territory
            .cells
            .iter()
            .filter(|c| island.piece_at(**c).is_some_and(|p| p.is_capital()))
            .count();
        prop_assert_eq!(capitals, 1);
        prop_assert!(island.balance_of(territory) >= 0);
    }
    prop_assert!(island.validate().is_ok());
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Merging never skips a tier and never exceeds a baron.
    #[test]
    fn prop_merge_strength_is_sum(a in 0usize..4, b in 0usize..4) {
        let (a, b) = (PieceKind::LIVING[a], PieceKind::LIVING[b]);
        let sum = a.strength() + b.strength();
        match merged_kind(a, b) {
            Some(kind) => prop_assert_eq!(kind.strength(), sum),
            None => prop_assert!(sum > BARON_STRENGTH),
        }
    }

    /// Arbitrary intents keep every territory connected, with one capital and
    /// a non-negative treasury.
    #[test]
    fn prop_random_play_keeps_invariants(
        seed in 0u64..1_000,
        intents in prop::collection::vec(intent(), 1..80)
    ) {
        let mut game = new_game(seed);
        check_invariants(game.island())?;
        for intent in &intents {
            apply(&mut game, intent);
            check_invariants(game.island())?;
        }
    }

    /// Undoing a recorded action and redoing it lands on the identical state.
    #[test]
    fn prop_undo_redo_roundtrip(
        seed in 0u64..1_000,
        intents in prop::collection::vec(intent(), 1..40)
    ) {
        let mut game = new_game(seed);
        for intent in &intents {
            let before = game.island().capture();
            let recording = game.history().is_enabled();
            let done = match intent {
                Intent::Click(..) | Intent::Buy(_) => apply(&mut game, intent),
                _ => false,
            };
            if done && recording && !game.is_game_over() {
                let after = game.island().capture();
                prop_assert!(game.undo());
                prop_assert_eq!(&game.island().capture(), &before);
                prop_assert!(game.redo());
                prop_assert_eq!(&game.island().capture(), &after);
            }
        }
    }

    /// Snapshots survive a trip through JSON and load back to the same island.
    #[test]
    fn prop_snapshot_json_lossless(seed in 0u64..1_000) {
        let game = new_game(seed);
        let snapshot = game.island().capture();
        let json = snapshot.to_json().unwrap();
        let parsed = Snapshot::from_json(&json).unwrap();
        prop_assert_eq!(&parsed, &snapshot);
        let loaded = Island::from_snapshot(&parsed, game.island().config().clone()).unwrap();
        prop_assert_eq!(loaded.capture(), snapshot);
    }
}
