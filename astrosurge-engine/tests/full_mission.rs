//! End-to-end mission campaigns against the in-memory backend.

use astrosurge_engine::{
    Asteroid, ElementDeposit, EventCatalog, MemoryStore, MiningGlobals, MissionEngine,
    MissionStatus, MissionStore, Ship, ShipStore, StaticPriceTable, UserProfile, UserStore,
};

fn seeded_backend(bank: i64) -> MemoryStore {
    let store = MemoryStore::new();
    store.put_globals(MiningGlobals::default());
    store.put_user(UserProfile::new("u-1", "alice", "Astro Co", bank));
    store.put_ship("u-1", Ship::new("Artemis", 50_000, 500));
    store.put_asteroid(Asteroid {
        full_name: "433 Eros".to_string(),
        moid_days: 10,
        elements: vec![
            ElementDeposit {
                name: "Gold".to_string(),
                mass_kg: 40_000_000,
            },
            ElementDeposit {
                name: "Platinum".to_string(),
                mass_kg: 20_000_000,
            },
            ElementDeposit {
                name: "Copper".to_string(),
                mass_kg: 90_000_000,
            },
            ElementDeposit {
                name: "Olivine".to_string(),
                mass_kg: 500_000_000,
            },
        ],
        commodity_factor: 1.3,
    });
    store
}

fn engine(bank: i64, seed: u64) -> MissionEngine<MemoryStore, StaticPriceTable> {
    MissionEngine::new(
        seeded_backend(bank),
        StaticPriceTable,
        EventCatalog::builtin(),
        seed,
    )
}

#[test]
fn rich_user_flies_a_full_mission() {
    let engine = engine(10_000_000_000, 42);
    let mission = engine.start_mission("u-1", "Artemis", "433 Eros").unwrap();
    assert_eq!(mission.status, MissionStatus::Active);
    assert_eq!(mission.base_travel_days, 10);
    assert!(!mission.weighted_elements.is_empty());

    // No funding loan was needed.
    let user = engine.backend().get_user("u-1").unwrap();
    assert_eq!(user.loan_count, 0);

    let report = engine.complete_mission(mission.id).unwrap();
    let settled = engine.backend().get_mission(mission.id).unwrap();
    assert!(settled.status.is_terminal());
    assert_eq!(report.status, settled.status);
    assert_eq!(report.profit, settled.total_revenue - settled.total_cost);

    if settled.status == MissionStatus::Completed {
        // At least the round trip must have been simulated.
        assert!(report.days_simulated >= 20);
        assert_eq!(settled.ship_location, 0);
        let ship = engine.backend().get_ship("u-1", "Artemis").unwrap();
        assert!(!ship.active);
        assert_eq!(ship.location, 0);
    }
}

#[test]
fn poor_user_takes_a_funding_loan() {
    let engine = engine(1_000, 42);
    let mission = engine.start_mission("u-1", "Artemis", "433 Eros").unwrap();
    let user = engine.backend().get_user("u-1").unwrap();
    assert_eq!(user.loan_count, 1);
    assert!(user.current_loan > mission.budget, "repayment includes interest");
}

#[test]
fn committed_ship_cannot_start_a_second_mission() {
    let engine = engine(10_000_000_000, 42);
    engine.start_mission("u-1", "Artemis", "433 Eros").unwrap();
    assert!(engine.start_mission("u-1", "Artemis", "433 Eros").is_err());
}

#[test]
fn same_seed_replays_the_same_mission() {
    let report_a = {
        let engine = engine(10_000_000_000, 1234);
        let mission = engine.start_mission("u-1", "Artemis", "433 Eros").unwrap();
        engine.complete_mission(mission.id).unwrap()
    };
    let report_b = {
        let engine = engine(10_000_000_000, 1234);
        let mission = engine.start_mission("u-1", "Artemis", "433 Eros").unwrap();
        engine.complete_mission(mission.id).unwrap()
    };
    assert_eq!(report_a, report_b);
}

#[test]
fn advance_all_steps_each_active_mission_once() {
    let engine = engine(10_000_000_000, 7);
    let store = engine.backend();
    store.put_ship("u-1", Ship::new("Borealis", 40_000, 400));

    let first = engine.start_mission("u-1", "Artemis", "433 Eros").unwrap();
    let second = engine.start_mission("u-1", "Borealis", "433 Eros").unwrap();

    let results = engine.advance_all("u-1").unwrap();
    assert_eq!(results.len(), 2);
    for (_, result) in &results {
        assert!(result.is_ok());
    }
    assert_eq!(
        store.get_mission(first.id).unwrap().days_into_mission(),
        1
    );
    assert_eq!(
        store.get_mission(second.id).unwrap().days_into_mission(),
        1
    );
}

#[test]
fn settlement_books_balance_for_any_seed() {
    for seed in [3_u64, 99, 4242, 1_000_003] {
        let engine = engine(10_000_000_000, seed);
        let mission = engine.start_mission("u-1", "Artemis", "433 Eros").unwrap();
        let report = engine.complete_mission(mission.id).unwrap();
        let settled = engine.backend().get_mission(mission.id).unwrap();
        if settled.status == MissionStatus::Completed {
            assert_eq!(
                settled.profit,
                settled.total_revenue - settled.total_cost,
                "seed {seed}"
            );
            assert_eq!(settled.previous_debt, (-settled.profit).max(0), "seed {seed}");
        } else {
            // Destruction writes replacement debt onto the owner.
            let user = engine.backend().get_user("u-1").unwrap();
            assert!(user.current_loan >= MiningGlobals::default().ship_cost, "seed {seed}");
            assert!(report.ship_destroyed);
        }
    }
}
