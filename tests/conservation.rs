use pistongas::config::{ParticleGroup, PistonConfig, SimConfig, SweepMode};
use pistongas::core::boundary::{resolve_boundaries, WallImpulses};
use pistongas::core::collision::resolve_pair;
use pistongas::core::integrator::integrate;
use pistongas::core::{Particle, Simulation, SpatialGrid, Vec2};
use pistongas::error::Result;

/// A crowded two-species gas behind a fixed piston.
fn dense_config(sweep: SweepMode) -> SimConfig {
    SimConfig {
        width: 200.0,
        height: 100.0,
        dt: 0.1,
        grid_degree: 6,
        sweep,
        seed: 7,
        groups: vec![
            ParticleGroup {
                origin: Vec2::new(10.0, 10.0),
                extent: Vec2::new(150.0, 35.0),
                count_per_axis: 10,
                mass: 1.0,
                radius: 3.0,
                speed: 4.0,
            },
            ParticleGroup {
                origin: Vec2::new(12.0, 55.0),
                extent: Vec2::new(150.0, 35.0),
                count_per_axis: 10,
                mass: 2.5,
                radius: 2.0,
                speed: 3.0,
            },
        ],
        piston: PistonConfig {
            position: 190.0,
            active: false,
            ..Default::default()
        },
        stop_iteration: 0,
        ..Default::default()
    }
}

/// With a fixed piston every wall and pair collision is elastic, so the kinetic energy
/// of the gas must not drift.
#[test]
fn energy_conserved_with_fixed_piston() -> Result<()> {
    for sweep in [SweepMode::Grid, SweepMode::Full] {
        let mut sim = Simulation::new(dense_config(sweep))?;
        let e0 = sim.kinetic_energy();
        sim.advance(400);
        let e1 = sim.kinetic_energy();
        let rel = ((e1 - e0) / e0).abs();
        assert!(
            rel < 1e-9,
            "{sweep:?}: relative energy drift {rel} too large (E0={e0}, E1={e1})"
        );
        assert!(sim.collisions() > 0, "{sweep:?}: expected some pair collisions");
    }
    Ok(())
}

/// Same run twice gives the same state.
#[test]
fn runs_are_deterministic() -> Result<()> {
    let mut a = Simulation::new(dense_config(SweepMode::Grid))?;
    let mut b = Simulation::new(dense_config(SweepMode::Grid))?;
    a.advance(150);
    b.advance(150);
    assert_eq!(a.particles, b.particles);
    assert_eq!(a.collisions(), b.collisions());
    Ok(())
}

/// Boundary resolution always leaves every center inside the walls and the piston face.
#[test]
fn boundary_pass_clamps_every_particle() -> Result<()> {
    let mut sim = Simulation::new(dense_config(SweepMode::Grid))?;
    let height = sim.config().height;
    let dt = sim.config().dt;
    let mut impulses = WallImpulses::default();
    for _ in 0..300 {
        integrate(&mut sim.particles, &mut sim.piston, dt);
        resolve_boundaries(&mut sim.particles, &mut sim.piston, height, &mut impulses);
        for p in &sim.particles {
            assert!(
                p.position.y >= p.radius && p.position.y <= height - p.radius,
                "y = {} escaped",
                p.position.y
            );
            assert!(
                p.position.x >= p.radius && p.position.x <= sim.piston.position - p.radius,
                "x = {} escaped",
                p.position.x
            );
        }
    }
    assert!(impulses.left > 0.0 && impulses.top > 0.0 && impulses.piston > 0.0);
    Ok(())
}

/// Every particle of a generated gas lands in exactly the bucket its coordinates select.
#[test]
fn grid_rebuild_places_each_particle_once() -> Result<()> {
    let mut sim = Simulation::new(dense_config(SweepMode::Grid))?;
    sim.advance(25);
    let mut grid = SpatialGrid::new(6)?;
    let extent = sim.piston.position;
    let height = sim.config().height;
    grid.rebuild(&sim.particles, extent, height);

    let mut seen = vec![0usize; sim.num_particles()];
    for ix in 0..6 {
        for iy in 0..6 {
            for &i in grid.bucket(ix, iy) {
                seen[i] += 1;
                let p = &sim.particles[i];
                let direct = (
                    ((6.0 * p.position.x / extent).floor() as usize).min(5),
                    ((6.0 * p.position.y / height).floor() as usize).min(5),
                );
                assert_eq!((ix, iy), direct, "particle {i} at {}", p.position);
            }
        }
    }
    assert!(seen.iter().all(|&n| n == 1));
    Ok(())
}

/// Resolved pairs never stay overlapped, whatever their masses and approach.
#[test]
fn resolved_pairs_never_overlap() -> Result<()> {
    let offsets = [
        (0.1, 0.0),
        (0.0, 0.5),
        (1.2, -1.1),
        (-0.3, 0.2),
        (0.0, 0.0),
        (2.9, 0.1),
    ];
    for (k, &(dx, dy)) in offsets.iter().enumerate() {
        let m = 1.0 + k as f64;
        let mut a = Particle::new(m, 1.5, Vec2::new(50.0, 50.0), Vec2::new(1.0, -2.0))?;
        let mut b = Particle::new(
            2.0,
            1.5,
            Vec2::new(50.0 + dx, 50.0 + dy),
            Vec2::new(-3.0, 0.5),
        )?;
        resolve_pair(&mut a, &mut b);
        assert!(
            a.position.distance(b.position) >= a.radius + b.radius,
            "offset ({dx}, {dy}) left pair overlapping"
        );
    }
    Ok(())
}

/// Head-on scenario: equal masses swap velocities and end up separated.
#[test]
fn head_on_equal_masses_swap() -> Result<()> {
    let r = 1.0;
    let cfg = SimConfig {
        width: 100.0,
        height: 100.0,
        dt: 1e-9,
        grid_degree: 1,
        piston: PistonConfig {
            position: 100.0,
            ..Default::default()
        },
        ..Default::default()
    };
    let particles = vec![
        Particle::new(1.0, r, Vec2::new(10.0, 10.0), Vec2::new(5.0, 0.0))?,
        Particle::new(1.0, r, Vec2::new(10.0 + 2.0 * r - 0.1, 10.0), Vec2::new(-5.0, 0.0))?,
    ];
    let mut sim = Simulation::with_particles(cfg, particles)?;
    sim.step();
    let (a, b) = (&sim.particles[0], &sim.particles[1]);
    assert!((a.velocity - Vec2::new(-5.0, 0.0)).length() < 1e-9);
    assert!((b.velocity - Vec2::new(5.0, 0.0)).length() < 1e-9);
    assert!(a.position.distance(b.position) >= 2.0 * r);
    assert_eq!(sim.collisions(), 1);
    Ok(())
}
