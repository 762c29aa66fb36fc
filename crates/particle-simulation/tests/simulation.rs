use glam::DVec3;
use particle_physics::{ParticleKind, Stage, TIME_PERIOD};
use particle_simulation::*;

const TOL: f64 = 1e-9;

// Helper: default session
fn world() -> SimulationWorld {
    SimulationWorld::new(SimulationParams::default()).unwrap()
}

// Helper: a point well away from the source chamber plates
fn open_space() -> DVec3 {
    DVec3::new(60.0, 0.0, -200.0)
}

#[test]
fn neutral_particle_moves_uniformly() {
    let mut world = world();
    let start = open_space();
    let velocity = DVec3::new(10.0, -2.0, 5.0);
    let id = world.spawn_particle(ParticleKind::Neutron, start, velocity);

    let ticks = 150;
    for _ in 0..ticks {
        world.step();
    }

    let p = world.particle(id).unwrap();
    let expected = start + velocity * ticks as f64 * TIME_PERIOD;
    assert!((p.position - expected).length() < 1e-6, "{:?} vs {:?}", p.position, expected);
    assert!((p.velocity - velocity).length() < 1e-6);
    assert_eq!(p.stage, Stage::Free);
}

#[test]
fn distance_matrix_is_symmetric() {
    let mut world = world();
    for k in 0..4 {
        let offset = DVec3::new(k as f64 * 3.0, k as f64, -(k as f64) * 7.0);
        world.spawn_particle(ParticleKind::Neutrino, open_space() + offset, DVec3::ZERO);
    }
    world.step();

    let matrix = world.distance_matrix();
    assert_eq!(matrix.len(), 4);
    for i in 0..4 {
        assert_eq!(matrix.get(i, i), DIAGONAL_SENTINEL);
        for j in 0..4 {
            assert_eq!(matrix.get(i, j), matrix.get(j, i));
        }
    }
}

#[test]
fn free_contact_conserves_momentum() {
    let mut world = world();
    let a = world.spawn_particle(ParticleKind::Neutron, open_space(), DVec3::new(2.0, 0.0, 0.0));
    let b = world.spawn_particle(
        ParticleKind::Neutron,
        open_space() + DVec3::new(0.45, 0.0, 0.0),
        DVec3::new(-2.0, 0.0, 0.0),
    );

    world.step();

    let (pa, pb) = (world.particle(a).unwrap(), world.particle(b).unwrap());
    let momentum = pa.velocity * pa.mass + pb.velocity * pb.mass;
    assert!(momentum.length() < TOL, "{momentum:?}");
    assert!(pa.velocity.x < 0.0 && pb.velocity.x > 0.0, "pair should bounce apart");
}

#[test]
fn linac_exit_enters_booster_once() {
    let mut world = world();
    let entry_velocity = DVec3::new(0.0, 0.0, -100.0);
    let id = world.spawn_particle(ParticleKind::Proton, DVec3::new(0.0, 6.5, -94.9), entry_velocity);

    world.step();
    let p = world.particle(id).unwrap();
    assert_eq!(p.stage, Stage::Boosting);
    assert!(p.completed_linac);
    let booster_radius = world.layout().booster.orbit_radius;
    assert!((p.orbit.angular_velocity - entry_velocity.length() / booster_radius).abs() < 1e-6);

    for _ in 0..200 {
        world.step();
        assert_eq!(world.particle(id).unwrap().stage, Stage::Boosting);
    }
}

#[test]
fn hydrogen_never_boosts() {
    let mut world = world();
    let id = world.spawn_particle(ParticleKind::HydrogenAtom, DVec3::new(0.0, 5.0, -94.9), DVec3::new(0.0, 0.0, -100.0));
    world.step();
    assert_eq!(world.particle(id).unwrap().stage, Stage::Free);
}

#[test]
fn classifier_contract() {
    let higgs = classify(125.0);
    assert_eq!(higgs, CollisionCategory::HiggsProduction);
    assert_eq!(higgs.products().len(), 8);

    let elastic = classify(0.1);
    assert_eq!(elastic, CollisionCategory::ElasticScattering);
    assert_eq!(elastic.products().len(), 2);

    assert_eq!(classify(5000.0), CollisionCategory::PartonPartonScattering);

    let mut estimate = RunningEstimate::new();
    estimate.record(125.0);
    assert_eq!(estimate.mean_probability(), 1.0);
    estimate.record(0.0);
    assert_eq!(estimate.mean_probability(), 0.5);
}

#[test]
fn reset_clears_everything() {
    let mut world = world();
    world.submit(Command::SpawnHydrogen);
    world.step();
    world.spawn_particle(ParticleKind::Pion, open_space(), DVec3::ZERO);
    assert_eq!(world.particle_count(), 2);

    world.submit(Command::Reset);
    world.step();

    assert_eq!(world.particle_count(), 0);
    assert_eq!(world.estimate().count(), 0);
    assert_eq!(world.estimate().mean_probability(), 0.0);
    assert!(!world.layout().source.sealed);
    assert!(!world.is_armed());
    assert_eq!(world.reading_number(), 1);
}

#[test]
fn rejected_commands_are_no_ops() {
    let mut world = world();
    assert!(!world.apply(Command::ActivateChamber));
    assert!(!world.apply(Command::StartCollider));
    assert!(!world.apply(Command::TriggerCollision));
    assert!(!world.apply(Command::NextReading));
    assert_eq!(world.particle_count(), 0);

    assert!(world.apply(Command::SealChamber));
    assert!(!world.apply(Command::SealChamber));
}

#[test]
fn invalid_params_are_rejected() {
    let mut params = SimulationParams::default();
    params.particle.mass = -1.0;
    assert!(matches!(
        SimulationWorld::new(params),
        Err(ParamsError::InvalidParticle { name: "mass", .. })
    ));
}

#[test]
fn chamber_sequence_reaches_the_linac() {
    let mut world = world();
    world.submit(Command::SpawnHydrogen);
    for _ in 0..40 {
        world.step();
    }
    world.submit(Command::SpawnHydrogen);
    // Second atom drifts past the seal wall position after ~205 ticks
    for _ in 0..210 {
        world.step();
    }
    assert_eq!(world.particle_count(), 2);

    world.submit(Command::SealChamber);
    world.step();
    assert_eq!(world.particle_count(), 2);
    assert!(world.particles().iter().all(|p| p.kind == ParticleKind::Proton));

    world.submit(Command::ActivateChamber);
    world.step();
    assert!(world.layout().source.activated);

    for _ in 0..600 {
        world.step();
    }
    assert!(
        world.particles().iter().all(|p| p.stage == Stage::Boosting),
        "{:?}",
        world.particles().iter().map(|p| (p.stage, p.position)).collect::<Vec<_>>()
    );
}

#[test]
fn instances_follow_particles() {
    let mut world = world();
    world.spawn_particle(ParticleKind::Lepton, open_space(), DVec3::ZERO);
    world.spawn_particle(ParticleKind::Proton, open_space() + DVec3::X * 5.0, DVec3::ZERO);

    let instances = world.instances();
    assert_eq!(instances.len(), 2);
    assert_eq!(instances[1].kind, ParticleKind::Proton as u32);
    assert_eq!(instances[1].color, ParticleKind::Proton.color());
    assert_eq!(instances[0].stage, Stage::Free as u32);
}

#[test]
fn coulomb_pairs_only_repel_like_charges() {
    let mut world = world();
    let base = open_space();
    let unlike = [
        world.spawn_particle(ParticleKind::Proton, base, DVec3::ZERO),
        world.spawn_particle(ParticleKind::Lepton, base + DVec3::Z, DVec3::ZERO),
    ];
    let neutral = [
        world.spawn_particle(ParticleKind::Neutron, base + DVec3::X * 20.0, DVec3::ZERO),
        world.spawn_particle(ParticleKind::Proton, base + DVec3::new(20.0, 0.0, 1.0), DVec3::ZERO),
    ];

    world.step();

    for id in unlike.into_iter().chain(neutral) {
        let p = world.particle(id).unwrap();
        assert_eq!(p.velocity, DVec3::ZERO, "{:?} was nudged", p.kind);
    }
    assert_eq!(world.particle(unlike[0]).unwrap().position, base);
}

#[test]
fn all_pairs_mode_reaches_non_adjacent_particles() {
    let run = |pair_mode: PairMode| {
        let mut params = SimulationParams::default();
        params.electrostatics.pair_mode = pair_mode;
        let mut world = SimulationWorld::new(params).unwrap();

        let first = world.spawn_particle(ParticleKind::Proton, open_space(), DVec3::ZERO);
        world.spawn_particle(ParticleKind::Proton, open_space() + DVec3::new(0.0, 0.0, -30.0), DVec3::ZERO);
        let third = world.spawn_particle(ParticleKind::Proton, open_space() + DVec3::X, DVec3::ZERO);

        world.step();
        (world.particle(first).unwrap().velocity, world.particle(third).unwrap().velocity)
    };

    let (first, third) = run(PairMode::Adjacent);
    assert_eq!(first, DVec3::ZERO);
    assert_eq!(third, DVec3::ZERO);

    let (first, third) = run(PairMode::AllPairs);
    assert!(first.x < 0.0 && third.x > 0.0, "{first:?} {third:?}");
    assert!((first + third).length() < TOL);
}
