use super::config::EnergyCutoffs;
use super::error::RelaxationError;
use super::transition::{SecondaryVacancyRule, TransitionClassifier, TransitionKind};
use crate::core::data::table::SubshellTable;
use crate::core::particle::{ParticleBank, ParticleState};
use crate::core::sampling::{DiscreteDistribution, sample_isotropic_direction};
use crate::core::subshell::Subshell;
use rand::Rng;
use std::sync::Arc;
use tracing::trace;

/// The result of filling one vacancy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionOutcome {
    pub transition_index: usize,
    pub kind: TransitionKind,
    pub energy: f64,
    /// `true` if the emitted particle was added to the bank, `false` if its
    /// energy was below the cutoff and deposited locally.
    pub banked: bool,
    pub primary: Subshell,
    pub secondary: Option<Subshell>,
}

/// Samples the transition that fills a vacancy in one subshell.
///
/// Immutable after construction and shared by every history that ionizes the
/// owning element.
#[derive(Debug, Clone)]
pub struct SubshellRelaxationModel {
    table: Arc<SubshellTable>,
    distribution: DiscreteDistribution,
    classifier: Arc<dyn TransitionClassifier>,
}

impl SubshellRelaxationModel {
    pub fn new(table: Arc<SubshellTable>) -> Result<Self, RelaxationError> {
        Self::with_classifier(table, Arc::new(SecondaryVacancyRule))
    }

    pub fn with_classifier(
        table: Arc<SubshellTable>,
        classifier: Arc<dyn TransitionClassifier>,
    ) -> Result<Self, RelaxationError> {
        let distribution = DiscreteDistribution::from_cdf(&table.cumulative_probabilities())?;
        Ok(Self {
            table,
            distribution,
            classifier,
        })
    }

    pub fn vacancy_subshell(&self) -> Subshell {
        self.table.subshell()
    }

    pub fn table(&self) -> &SubshellTable {
        &self.table
    }

    pub fn sample_transition_index<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.distribution.sample_index(rng)
    }

    /// Fills a vacancy in this model's subshell.
    ///
    /// A transition is sampled from the table and its particle is emitted
    /// isotropically from the relaxing particle's position. The particle is
    /// banked only if its energy reaches the cutoff for its type.
    ///
    /// # Errors
    ///
    /// Returns [`RelaxationError::WrongSubshell`] if `vacancy` is not the
    /// subshell this model was built for.
    pub fn relax<R: Rng + ?Sized>(
        &self,
        vacancy: Subshell,
        particle: &ParticleState,
        cutoffs: &EnergyCutoffs,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<TransitionOutcome, RelaxationError> {
        if vacancy != self.vacancy_subshell() {
            return Err(RelaxationError::WrongSubshell {
                expected: self.vacancy_subshell(),
                found: vacancy,
            });
        }

        let transition_index = self.sample_transition_index(rng);
        let transition = &self.table.transitions()[transition_index];
        let kind = self.classifier.classify(transition);
        let particle_type = kind.emitted_particle();
        let energy = transition.outgoing_energy;

        let banked = cutoffs.is_tracked(particle_type, energy);
        if banked {
            let direction = sample_isotropic_direction(rng);
            bank.push(ParticleState::secondary(
                particle,
                particle_type,
                energy,
                direction,
            ));
        }

        trace!(
            %vacancy,
            transition_index,
            %kind,
            energy,
            banked,
            "Sampled relaxation transition"
        );

        Ok(TransitionOutcome {
            transition_index,
            kind,
            energy,
            banked,
            primary: transition.primary,
            secondary: transition.secondary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::source::ProbabilityFormat;
    use crate::core::data::table::Transition;
    use crate::core::particle::ParticleType;
    use nalgebra::Point3;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn three_transition_model() -> SubshellRelaxationModel {
        let table = SubshellTable::new(
            Subshell::K,
            2.0,
            8.8e-2,
            3,
            &[
                (Subshell::L2, None),
                (Subshell::L3, None),
                (Subshell::L1, Some(Subshell::L2)),
            ],
            &[7.2e-2, 7.5e-2, 5.3e-2],
            &[0.2, 0.5, 1.0],
            ProbabilityFormat::Cdf,
        )
        .unwrap();
        SubshellRelaxationModel::new(Arc::new(table)).unwrap()
    }

    fn single_transition_model(
        secondary: Option<Subshell>,
        energy: f64,
    ) -> SubshellRelaxationModel {
        let table = SubshellTable::new(
            Subshell::K,
            2.0,
            7e-3,
            1,
            &[(Subshell::L3, secondary)],
            &[energy],
            &[1.0],
            ProbabilityFormat::Cdf,
        )
        .unwrap();
        SubshellRelaxationModel::new(Arc::new(table)).unwrap()
    }

    fn photon() -> ParticleState {
        ParticleState::new(ParticleType::Photon, 3)
            .with_position(Point3::new(1.0, -1.0, 0.5))
            .with_energy(0.1)
    }

    #[test]
    fn model_builds_from_a_cdf_tail_slightly_above_one() {
        let over = 1.0 + 4.0 * f64::EPSILON;
        let table = SubshellTable::new(
            Subshell::K,
            2.0,
            8.8e-2,
            3,
            &[(Subshell::L2, None), (Subshell::L3, None), (Subshell::M1, None)],
            &[7.2e-2, 7.5e-2, 7.8e-2],
            &[0.3, over, over],
            ProbabilityFormat::Cdf,
        )
        .unwrap();

        let model = SubshellRelaxationModel::new(Arc::new(table)).unwrap();
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..1_000 {
            assert!(model.sample_transition_index(&mut rng) < 2);
        }
    }

    #[test]
    fn relax_rejects_vacancy_in_wrong_subshell() {
        let model = three_transition_model();
        let mut bank = ParticleBank::new();
        let mut rng = StdRng::seed_from_u64(1);
        let cutoffs = EnergyCutoffs::default();

        let result = model.relax(Subshell::L1, &photon(), &cutoffs, &mut bank, &mut rng);

        assert_eq!(
            result,
            Err(RelaxationError::WrongSubshell {
                expected: Subshell::K,
                found: Subshell::L1
            })
        );
        assert!(bank.is_empty());
    }

    #[test]
    fn radiative_transition_above_cutoff_banks_one_photon() {
        let model = single_transition_model(None, 6e-3);
        let cutoffs = EnergyCutoffs::new(1e-3, 1e-5).unwrap();
        let mut bank = ParticleBank::new();
        let mut rng = StdRng::seed_from_u64(2);
        let parent = photon();

        let outcome = model
            .relax(Subshell::K, &parent, &cutoffs, &mut bank, &mut rng)
            .unwrap();

        assert_eq!(outcome.kind, TransitionKind::Radiative);
        assert!(outcome.banked);
        assert_eq!(outcome.primary, Subshell::L3);
        assert_eq!(outcome.secondary, None);
        assert_eq!(bank.len(), 1);
        let emitted = bank.iter().next().unwrap();
        assert_eq!(emitted.particle_type, ParticleType::Photon);
        assert_eq!(emitted.energy, 6e-3);
        assert_eq!(emitted.position, parent.position);
        assert_eq!(emitted.generation, parent.generation + 1);
        assert!((emitted.direction.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn auger_transition_banks_an_electron_and_reports_both_vacancies() {
        let model = single_transition_model(Some(Subshell::M1), 2e-3);
        let cutoffs = EnergyCutoffs::default();
        let mut bank = ParticleBank::new();
        let mut rng = StdRng::seed_from_u64(3);

        let outcome = model
            .relax(Subshell::K, &photon(), &cutoffs, &mut bank, &mut rng)
            .unwrap();

        assert_eq!(outcome.kind, TransitionKind::NonRadiative);
        assert_eq!(outcome.primary, Subshell::L3);
        assert_eq!(outcome.secondary, Some(Subshell::M1));
        assert_eq!(bank.count_of(ParticleType::Electron), 1);
    }

    #[test]
    fn energy_strictly_below_cutoff_is_never_banked() {
        let model = single_transition_model(None, 9.99e-4);
        let cutoffs = EnergyCutoffs::new(1e-3, 1e-5).unwrap();
        let mut bank = ParticleBank::new();
        let mut rng = StdRng::seed_from_u64(4);

        for _ in 0..100 {
            let outcome = model
                .relax(Subshell::K, &photon(), &cutoffs, &mut bank, &mut rng)
                .unwrap();
            assert!(!outcome.banked);
        }
        assert!(bank.is_empty());
    }

    #[test]
    fn energy_exactly_at_cutoff_is_always_banked() {
        let model = single_transition_model(None, 1e-3);
        let cutoffs = EnergyCutoffs::new(1e-3, 1e-5).unwrap();
        let mut bank = ParticleBank::new();
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..100 {
            model
                .relax(Subshell::K, &photon(), &cutoffs, &mut bank, &mut rng)
                .unwrap();
        }
        assert_eq!(bank.len(), 100);
    }

    #[test]
    fn sampled_frequencies_match_the_tabulated_cdf() {
        let model = three_transition_model();
        let mut rng = StdRng::seed_from_u64(20240601);
        let draws = 100_000;
        let mut counts = [0usize; 3];
        for _ in 0..draws {
            counts[model.sample_transition_index(&mut rng)] += 1;
        }

        let expected = [0.2, 0.3, 0.5];
        for (count, p) in counts.iter().zip(expected) {
            let observed = *count as f64 / draws as f64;
            let sigma = (p * (1.0 - p) / draws as f64).sqrt();
            assert!(
                (observed - p).abs() < 4.0 * sigma,
                "observed {observed}, expected {p} ± {}",
                4.0 * sigma
            );
        }
    }

    #[derive(Debug)]
    struct EverythingIsAuger;

    impl TransitionClassifier for EverythingIsAuger {
        fn classify(&self, _transition: &Transition) -> TransitionKind {
            TransitionKind::NonRadiative
        }
    }

    #[test]
    fn custom_classifier_controls_the_emitted_particle() {
        let table = single_transition_model(None, 6e-3).table().clone();
        let model =
            SubshellRelaxationModel::with_classifier(Arc::new(table), Arc::new(EverythingIsAuger))
                .unwrap();
        let mut bank = ParticleBank::new();
        let mut rng = StdRng::seed_from_u64(6);

        let outcome = model
            .relax(Subshell::K, &photon(), &EnergyCutoffs::default(), &mut bank, &mut rng)
            .unwrap();

        assert_eq!(outcome.kind, TransitionKind::NonRadiative);
        assert_eq!(bank.count_of(ParticleType::Electron), 1);
    }
}
