//! Hand-made events for unit tests

use crate::{
    event::{Collection, Event},
    momentum::FourMomentum,
    numeric::Float,
    particle::{CollectionId, ObjectRef, Particle},
};

const PFOS: CollectionId = CollectionId(1);
const MUONS: CollectionId = CollectionId(2);
const MC: CollectionId = CollectionId(3);

/// Z(→μμ)H event at 250 GeV with the muons back to back along the beam
///
/// The Z candidate has a mass of 100 GeV and recoils against 150 GeV.
///
pub fn zh_event(number: u64) -> Event {
    muon_event(
        number,
        &[
            FourMomentum::new(0., 0., 49.9, 50.),
            FourMomentum::new(0., 0., -49.9, 50.),
        ],
    )
}

/// Event whose "Muons" subset collection refers to the given muons
pub fn muon_event(number: u64, muons: &[FourMomentum]) -> Event {
    let mut pfos = muons
        .iter()
        .enumerate()
        .map(|(idx, &p4)| {
            let charge = if idx % 2 == 0 { -1. } else { 1. };
            Particle::new(if idx % 2 == 0 { 13 } else { -13 }, p4).with_charge(charge)
        })
        .collect::<Vec<_>>();
    pfos.push(Particle::new(22, FourMomentum::new(10., 0., 0., 10.)));
    let muon_refs = (0..muons.len()).map(|idx| ObjectRef::new(PFOS, idx)).collect();

    // Status 1 particles add up to the full 250 GeV, the beam electron doesn't
    let recoil = FourMomentum::at_rest(250.) - muons.iter().copied().sum::<FourMomentum>();
    let mut mc = muons
        .iter()
        .map(|&p4| Particle::new(13, p4).with_generator_status(1))
        .collect::<Vec<_>>();
    mc.push(Particle::new(25, recoil).with_generator_status(1));
    mc.push(Particle::new(11, FourMomentum::new(0., 0., 125., 125.)).with_generator_status(4));

    Event::new(
        number,
        vec![
            Collection::owned("PandoraPFOs", PFOS, pfos),
            Collection::subset("Muons", MUONS, muon_refs),
            Collection::owned("MCParticle", MC, mc),
        ],
    )
    .expect("fixture collections are unique")
}

/// Event with Higgs and Z candidates of the given masses
pub fn candidate_event(number: u64, higgs: &[Float], z: &[Float]) -> Event {
    let candidates = |masses: &[Float]| {
        masses
            .iter()
            .map(|&m| Particle::new(0, FourMomentum::at_rest(m)))
            .collect::<Vec<_>>()
    };
    Event::new(
        number,
        vec![
            Collection::owned("Higgs", CollectionId(10), candidates(higgs)),
            Collection::owned("Z", CollectionId(11), candidates(z)),
        ],
    )
    .expect("fixture collections are unique")
}

/// Event with fitted π⁰ candidates
///
/// Each candidate is described by (stored mass, post-fit 4-momentum mass,
/// mass of the two photons it was built from). The photons have 1 GeV each.
///
pub fn pi0_event(number: u64, candidates: &[(Float, Float, Float)]) -> Event {
    const PHOTONS: CollectionId = CollectionId(1);
    const FILTERED: CollectionId = CollectionId(2);
    const FINDER: CollectionId = CollectionId(3);
    const PI0S: CollectionId = CollectionId(4);
    let e_gamma: Float = 1.;

    let mut photons = Vec::new();
    let mut pi0s = Vec::new();
    for &(stored_mass, postfit_mass, prefit_mass) in candidates {
        // m² = 2E²(1 - cos θ) for two massless photons of energy E
        let cos_theta = 1. - prefit_mass * prefit_mass / (2. * e_gamma * e_gamma);
        let half_theta = cos_theta.acos() / 2.;
        let (sin_half, cos_half) = (half_theta.sin(), half_theta.cos());
        let first = photons.len();
        photons.push(Particle::new(
            22,
            FourMomentum::new(e_gamma * sin_half, 0., e_gamma * cos_half, e_gamma),
        ));
        photons.push(Particle::new(
            22,
            FourMomentum::new(-e_gamma * sin_half, 0., e_gamma * cos_half, e_gamma),
        ));

        // The fit moves the kinematics, the finder stores the nominal mass
        let e_fit = 2. * e_gamma;
        let pz_fit = (e_fit * e_fit - postfit_mass * postfit_mass).sqrt();
        let mut pi0 = Particle::new(111, FourMomentum::new(0., 0., pz_fit, e_fit));
        pi0.mass = stored_mass;
        pi0.goodness_of_pid = 0.5;
        pi0.particles = vec![ObjectRef::new(PHOTONS, first), ObjectRef::new(PHOTONS, first + 1)];
        pi0s.push(pi0);
    }

    let filtered = (0..photons.len())
        .map(|idx| ObjectRef::new(PHOTONS, idx))
        .collect();
    let selected = (0..pi0s.len()).map(|idx| ObjectRef::new(FINDER, idx)).collect();
    Event::new(
        number,
        vec![
            Collection::owned("PandoraPFOs", PHOTONS, photons),
            Collection::subset("FilteredPhotons", FILTERED, filtered),
            Collection::owned("GammaGammaCandidates_Pi0_New", FINDER, pi0s),
            Collection::subset("Pi0s_New", PI0S, selected),
        ],
    )
    .expect("fixture collections are unique")
}
