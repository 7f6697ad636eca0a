//! This module provides toy event generation facilities
//!
//! Events are e⁺e⁻ → ZH collisions at a fixed center-of-mass energy, followed
//! by Z → μ⁺μ⁻ and H → γγ. All angular distributions are isotropic. This is
//! nowhere near a physics generator, but it produces events with the same
//! structure as reconstructed ones, which is what the analyses need.

use crate::{
    event::{Collection, Event},
    momentum::FourMomentum,
    numeric::Float,
    particle::{CollectionId, ObjectRef, Particle},
    random::RandomGenerator,
};
use eyre::{ensure, Result};
use nalgebra::Vector3;
use prefix_num_ops::real::*;

/// Z boson mass (GeV)
pub const Z_MASS: Float = 91.1876;

/// Higgs boson mass (GeV)
pub const HIGGS_MASS: Float = 125.25;

/// Muon mass (GeV)
pub const MUON_MASS: Float = 0.105_658_4;

// PDG particle IDs
const ELECTRON: i32 = 11;
const MUON: i32 = 13;
const PHOTON: i32 = 22;
const Z_BOSON: i32 = 23;
const HIGGS: i32 = 25;

// Generator status codes, as in the HepMC convention
const FINAL_STATE: i32 = 1;
const DECAYED: i32 = 2;
const BEAM: i32 = 4;

// Collection IDs of generated events
const PFOS: CollectionId = CollectionId(1);
const MUONS: CollectionId = CollectionId(2);
const MC_PARTICLES: CollectionId = CollectionId(3);

/// Momentum of the products of a two-body decay, in the rest frame of the
/// decaying particle
fn two_body_momentum(m: Float, m1: Float, m2: Float) -> Float {
    let m2_sum = (m1 + m2) * (m1 + m2);
    let m2_diff = (m1 - m2) * (m1 - m2);
    sqrt(((m * m - m2_sum) * (m * m - m2_diff)).max(0.)) / (2. * m)
}

/// Build a 4-momentum from a direction, a momentum norm and a mass
fn along(direction: &Vector3<Float>, p: Float, mass: Float) -> FourMomentum {
    let p3 = direction * p;
    FourMomentum::from_mass([p3.x, p3.y, p3.z], mass)
}

/// Generator of e⁺e⁻ → ZH → μ⁺μ⁻γγ events
pub struct EventGenerator {
    /// Total center-of-mass energy of the collision
    e_cms: Float,

    /// Momentum of the Z and of the H in the center-of-mass frame
    p_zh: Float,

    /// Minimal transverse momentum of selected muons
    muon_min_pt: Float,
}
//
impl EventGenerator {
    /// Prepare event generation at a center-of-mass energy of e_cms
    pub fn new(e_cms: Float, muon_min_pt: Float) -> Result<Self> {
        ensure!(
            e_cms > Z_MASS + HIGGS_MASS,
            "A center-of-mass energy of {e_cms} GeV is below the ZH threshold ({} GeV)",
            Z_MASS + HIGGS_MASS
        );
        ensure!(
            muon_min_pt >= 0.,
            "The muon pT threshold must be positive, got {muon_min_pt}"
        );
        Ok(Self {
            e_cms,
            p_zh: two_body_momentum(e_cms, Z_MASS, HIGGS_MASS),
            muon_min_pt,
        })
    }

    /// Generate one event
    ///
    /// The event holds the reconstructed particles ("PandoraPFOs"), the
    /// muons above the pT threshold as a subset of them ("Muons"), and the
    /// Monte Carlo truth ("MCParticle").
    ///
    pub fn generate(&self, number: u64, rng: &mut RandomGenerator) -> Result<Event> {
        // Production
        let zh_direction = rng.direction();
        let z = along(&zh_direction, self.p_zh, Z_MASS);
        let higgs = along(&zh_direction, -self.p_zh, HIGGS_MASS);

        // Z → μ⁻μ⁺
        let mu_direction = rng.direction();
        let p_mu = two_body_momentum(Z_MASS, MUON_MASS, MUON_MASS);
        let z_beta = z.beta();
        let mu_minus = along(&mu_direction, p_mu, MUON_MASS).boost(&z_beta);
        let mu_plus = along(&mu_direction, -p_mu, MUON_MASS).boost(&z_beta);

        // H → γγ
        let gamma_direction = rng.direction();
        let higgs_beta = higgs.beta();
        let gamma1 = along(&gamma_direction, HIGGS_MASS / 2., 0.).boost(&higgs_beta);
        let gamma2 = along(&gamma_direction, -HIGGS_MASS / 2., 0.).boost(&higgs_beta);

        // Reconstructed particles, and the muons that pass the pT cut
        let pfos = vec![
            Particle::new(MUON, mu_minus).with_charge(-1.),
            Particle::new(-MUON, mu_plus).with_charge(1.),
            Particle::new(PHOTON, gamma1),
            Particle::new(PHOTON, gamma2),
        ];
        let muons = pfos
            .iter()
            .enumerate()
            .filter(|(_, p)| p.pdg.abs() == MUON && p.pt() >= self.muon_min_pt)
            .map(|(idx, _)| ObjectRef::new(PFOS, idx))
            .collect();

        // Monte Carlo truth, where the bosons point to their decay products
        let half_e = self.e_cms / 2.;
        let mc_ref = |idx| ObjectRef::new(MC_PARTICLES, idx);
        let mut z_truth = Particle::new(Z_BOSON, z).with_generator_status(DECAYED);
        z_truth.particles = vec![mc_ref(4), mc_ref(5)];
        let mut higgs_truth = Particle::new(HIGGS, higgs).with_generator_status(DECAYED);
        higgs_truth.particles = vec![mc_ref(6), mc_ref(7)];
        let mc_particles = vec![
            Particle::new(ELECTRON, FourMomentum::new(0., 0., half_e, half_e))
                .with_charge(-1.)
                .with_generator_status(BEAM),
            Particle::new(-ELECTRON, FourMomentum::new(0., 0., -half_e, half_e))
                .with_charge(1.)
                .with_generator_status(BEAM),
            z_truth,
            higgs_truth,
            Particle::new(MUON, mu_minus)
                .with_charge(-1.)
                .with_generator_status(FINAL_STATE),
            Particle::new(-MUON, mu_plus)
                .with_charge(1.)
                .with_generator_status(FINAL_STATE),
            Particle::new(PHOTON, gamma1).with_generator_status(FINAL_STATE),
            Particle::new(PHOTON, gamma2).with_generator_status(FINAL_STATE),
        ];

        Event::new(
            number,
            vec![
                Collection::owned("PandoraPFOs", PFOS, pfos),
                Collection::subset("Muons", MUONS, muons),
                Collection::owned("MCParticle", MC_PARTICLES, mc_particles),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        momentum::{invariant_mass, recoil_mass},
        particle::P4Source,
    };
    use approx::assert_relative_eq;

    fn events(count: u64, seed: u64, muon_min_pt: Float) -> Vec<Event> {
        let generator = EventGenerator::new(250., muon_min_pt).unwrap();
        let mut rng = RandomGenerator::new(seed);
        (0..count)
            .map(|number| generator.generate(number, &mut rng).unwrap())
            .collect()
    }

    #[test]
    fn two_body_kinematics() {
        let p = two_body_momentum(250., Z_MASS, HIGGS_MASS);
        let e_z = sqrt(p * p + Z_MASS * Z_MASS);
        let e_h = sqrt(p * p + HIGGS_MASS * HIGGS_MASS);
        assert_relative_eq!(e_z + e_h, 250., max_relative = 1e-12);
        assert_relative_eq!(two_body_momentum(10., 0., 0.), 5.);
    }

    #[test]
    fn below_threshold_is_rejected() {
        assert!(EventGenerator::new(200., 10.).is_err());
        assert!(EventGenerator::new(250., -1.).is_err());
    }

    #[test]
    fn final_state_conserves_energy_and_momentum() {
        for event in events(20, 1, 0.) {
            let final_state = event
                .particles("MCParticle")
                .unwrap()
                .into_iter()
                .filter(|p| p.generator_status == Some(FINAL_STATE))
                .map(|p| p.p4(P4Source::Energy))
                .sum::<FourMomentum>();
            assert_relative_eq!(final_state.e(), 250., max_relative = 1e-9);
            assert!(final_state.p() < 1e-9);
        }
    }

    #[test]
    fn muons_reconstruct_the_z_and_recoil_against_the_higgs() {
        for event in events(20, 2, 0.) {
            let muons = event.particles("Muons").unwrap();
            assert_eq!(muons.len(), 2);
            let z_p4 = muons.iter().map(|m| m.p4(P4Source::Mass)).sum::<FourMomentum>();
            assert_relative_eq!(z_p4.mass(), Z_MASS, max_relative = 1e-9);
            assert_relative_eq!(
                recoil_mass(FourMomentum::at_rest(250.), z_p4),
                HIGGS_MASS,
                max_relative = 1e-9
            );

            let photons = event
                .particles("PandoraPFOs")
                .unwrap()
                .into_iter()
                .filter(|p| p.pdg == PHOTON)
                .map(|p| p.p4(P4Source::Energy));
            assert_relative_eq!(invariant_mass(photons), HIGGS_MASS, max_relative = 1e-9);
        }
    }

    #[test]
    fn muon_selection_applies_the_pt_cut() {
        for event in events(50, 3, 40.) {
            for muon in event.particles("Muons").unwrap() {
                assert!(muon.pt() >= 40.);
            }
        }
    }

    #[test]
    fn truth_bosons_point_to_their_decay_products() {
        let event = &events(1, 4, 0.)[0];
        let mc = event.particles("MCParticle").unwrap();
        let z = mc.iter().find(|p| p.pdg == Z_BOSON).unwrap();
        let daughters = event.constituents(z).unwrap();
        assert_eq!(daughters.iter().map(|d| d.pdg).collect::<Vec<_>>(), vec![MUON, -MUON]);
    }

    #[test]
    fn same_seed_same_events() {
        assert_eq!(events(5, 7, 10.), events(5, 7, 10.));
        assert_ne!(events(1, 7, 10.), events(1, 8, 10.));
    }
}
