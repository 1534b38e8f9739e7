use super::atomic_model::{AtomicRelaxationModel, DetailedAtomicRelaxationModel};
use super::cache::ModelCache;
use super::config::EnergyCutoffs;
use super::error::RelaxationError;
use super::subshell_model::SubshellRelaxationModel;
use super::transition::{SecondaryVacancyRule, TransitionClassifier};
use crate::core::data::source::ElementRelaxationData;
use crate::core::data::table::SubshellTableSet;
use std::sync::Arc;
use tracing::{debug, instrument};

pub const MAX_ATOMIC_NUMBER: u32 = 100;

/// Builds atomic relaxation models from element data and caches them by
/// atomic number.
///
/// Entries are inserted only through [`get_or_build`](Self::get_or_build),
/// which takes `&mut self`; population therefore happens before the factory
/// is shared with worker threads. Cached entries are never replaced.
#[derive(Debug)]
pub struct AtomicRelaxationModelFactory {
    cache: ModelCache,
    classifier: Arc<dyn TransitionClassifier>,
}

impl Default for AtomicRelaxationModelFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl AtomicRelaxationModelFactory {
    pub fn new() -> Self {
        Self::with_classifier(Arc::new(SecondaryVacancyRule))
    }

    pub fn with_classifier(classifier: Arc<dyn TransitionClassifier>) -> Self {
        Self {
            cache: ModelCache::new(),
            classifier,
        }
    }

    /// Builds a model for one element without caching it.
    ///
    /// The void model is returned when `use_relaxation_data` is `false` or the
    /// element carries no relaxation data. Otherwise every subshell with data
    /// gets its own subshell model.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed subshell table or if the transition data
    /// is cyclic; no partial model is produced.
    pub fn create_model<D>(
        data: &D,
        cutoffs: EnergyCutoffs,
        use_relaxation_data: bool,
    ) -> Result<Arc<AtomicRelaxationModel>, RelaxationError>
    where
        D: ElementRelaxationData + ?Sized,
    {
        Self::create_model_with_classifier(
            data,
            cutoffs,
            use_relaxation_data,
            Arc::new(SecondaryVacancyRule),
        )
    }

    pub fn create_model_with_classifier<D>(
        data: &D,
        cutoffs: EnergyCutoffs,
        use_relaxation_data: bool,
        classifier: Arc<dyn TransitionClassifier>,
    ) -> Result<Arc<AtomicRelaxationModel>, RelaxationError>
    where
        D: ElementRelaxationData + ?Sized,
    {
        if !use_relaxation_data || !data.has_relaxation_data() {
            return Ok(AtomicRelaxationModel::void());
        }

        let tables = SubshellTableSet::from_element_data(data)?;
        let subshell_models = tables
            .iter()
            .map(|(_, table)| {
                SubshellRelaxationModel::with_classifier(Arc::clone(table), Arc::clone(&classifier))
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            atomic_number = tables.atomic_number(),
            subshells = subshell_models.len(),
            "Built detailed atomic relaxation model"
        );

        let model = DetailedAtomicRelaxationModel::new(subshell_models, cutoffs)?;
        Ok(Arc::new(AtomicRelaxationModel::Detailed(model)))
    }

    /// Returns the cached model for `atomic_number`, building it on first use.
    ///
    /// A cached entry is returned as is, whatever `use_relaxation_data` says.
    /// A newly built model is cached only when `use_relaxation_data` is
    /// `true`, so a disabled request never shadows a later detailed one.
    ///
    /// # Errors
    ///
    /// Returns [`RelaxationError::InvalidAtomicNumber`] outside `1..=100`, or
    /// the build error of [`create_model`](Self::create_model). Nothing is
    /// cached on error.
    #[instrument(level = "debug", skip(self, data, cutoffs))]
    pub fn get_or_build<D>(
        &mut self,
        atomic_number: u32,
        data: &D,
        cutoffs: EnergyCutoffs,
        use_relaxation_data: bool,
    ) -> Result<Arc<AtomicRelaxationModel>, RelaxationError>
    where
        D: ElementRelaxationData + ?Sized,
    {
        if !(1..=MAX_ATOMIC_NUMBER).contains(&atomic_number) {
            return Err(RelaxationError::InvalidAtomicNumber(atomic_number));
        }
        if let Some(model) = self.cache.get(atomic_number) {
            return Ok(Arc::clone(model));
        }

        let model = Self::create_model_with_classifier(
            data,
            cutoffs,
            use_relaxation_data,
            Arc::clone(&self.classifier),
        )?;
        if use_relaxation_data {
            self.cache.insert(atomic_number, Arc::clone(&model));
        }
        Ok(model)
    }

    pub fn get(&self, atomic_number: u32) -> Option<&Arc<AtomicRelaxationModel>> {
        self.cache.get(atomic_number)
    }

    pub fn is_cached(&self, atomic_number: u32) -> bool {
        self.cache.contains(atomic_number)
    }

    pub fn cached_atomic_numbers(&self) -> Vec<u32> {
        self.cache.atomic_numbers()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::container::ElementDataContainer;
    use crate::core::data::source::ProbabilityFormat;
    use crate::core::data::table::TableError;
    use crate::core::particle::{ParticleBank, ParticleState, ParticleType};
    use crate::core::subshell::Subshell;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    // Carbon-like: K relaxes into L1/L2/L3, the L shells carry no data.
    fn carbon() -> ElementDataContainer {
        let mut data = ElementDataContainer::new(6, ProbabilityFormat::Weights);
        data.set_subshells([1, 2, 3, 4]).unwrap();
        for (designator, occupancy, binding) in
            [(1, 2.0, 2.9e-4), (2, 2.0, 1.6e-5), (3, 1.0, 1.1e-5), (4, 1.0, 1.1e-5)]
        {
            data.set_subshell_occupancy(designator, occupancy).unwrap();
            data.set_subshell_binding_energy(designator, binding).unwrap();
        }
        data.set_subshell_relaxation_transitions(1, 2).unwrap();
        data.set_subshell_relaxation_vacancies(1, vec![(3, 0), (3, 4)])
            .unwrap();
        data.set_subshell_relaxation_particle_energies(1, vec![2.8e-4, 2.6e-4])
            .unwrap();
        data.set_subshell_relaxation_probabilities(1, vec![1.0, 99.0])
            .unwrap();
        data
    }

    fn hydrogen() -> ElementDataContainer {
        let mut data = ElementDataContainer::new(1, ProbabilityFormat::Weights);
        data.set_subshells([1]).unwrap();
        data.set_subshell_occupancy(1, 1.0).unwrap();
        data.set_subshell_binding_energy(1, 1.4e-5).unwrap();
        data
    }

    #[test]
    fn disabled_flag_yields_the_void_model() {
        let model =
            AtomicRelaxationModelFactory::create_model(&carbon(), EnergyCutoffs::default(), false)
                .unwrap();
        assert!(Arc::ptr_eq(&model, &AtomicRelaxationModel::void()));
    }

    #[test]
    fn element_without_relaxation_data_yields_the_void_model() {
        let model =
            AtomicRelaxationModelFactory::create_model(&hydrogen(), EnergyCutoffs::default(), true)
                .unwrap();
        assert!(model.is_void());
    }

    #[test]
    fn detailed_model_has_one_subshell_model_per_table() {
        let model =
            AtomicRelaxationModelFactory::create_model(&carbon(), EnergyCutoffs::default(), true)
                .unwrap();
        let AtomicRelaxationModel::Detailed(detailed) = model.as_ref() else {
            panic!("expected a detailed model");
        };
        assert_eq!(detailed.len(), 1);
        assert!(detailed.subshell_model(Subshell::K).is_some());
        assert!(detailed.subshell_model(Subshell::L1).is_none());
    }

    #[test]
    fn built_model_relaxes_a_k_vacancy() {
        let cutoffs = EnergyCutoffs::new(1e-6, 1e-6).unwrap();
        let model = AtomicRelaxationModelFactory::create_model(&carbon(), cutoffs, true).unwrap();
        let particle = ParticleState::new(ParticleType::Photon, 0).with_energy(1e-3);
        let mut bank = ParticleBank::new();
        let mut rng = StdRng::seed_from_u64(11);

        let summary = model
            .relax_atom(Subshell::K, &particle, &mut bank, &mut rng)
            .unwrap();

        assert_eq!(summary.transitions, 1);
        assert_eq!(bank.len(), 1);
    }

    #[test]
    fn repeated_requests_return_the_identical_model() {
        let mut factory = AtomicRelaxationModelFactory::new();
        let data = carbon();
        let cutoffs = EnergyCutoffs::default();

        let first = factory.get_or_build(6, &data, cutoffs, true).unwrap();
        let second = factory.get_or_build(6, &data, cutoffs, true).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(!first.is_void());
        assert_eq!(factory.len(), 1);
    }

    #[test]
    fn disabled_request_does_not_shadow_a_cached_model() {
        let mut factory = AtomicRelaxationModelFactory::new();
        let data = carbon();
        let cutoffs = EnergyCutoffs::default();

        let detailed = factory.get_or_build(6, &data, cutoffs, true).unwrap();
        let again = factory.get_or_build(6, &data, cutoffs, false).unwrap();

        assert!(Arc::ptr_eq(&detailed, &again));
        assert!(!again.is_void());
    }

    #[test]
    fn disabled_request_is_never_cached() {
        let mut factory = AtomicRelaxationModelFactory::new();
        let data = carbon();
        let cutoffs = EnergyCutoffs::default();

        let void = factory.get_or_build(6, &data, cutoffs, false).unwrap();
        assert!(void.is_void());
        assert!(!factory.is_cached(6));

        let detailed = factory.get_or_build(6, &data, cutoffs, true).unwrap();
        assert!(!detailed.is_void());
        assert!(factory.is_cached(6));
    }

    #[test]
    fn atomic_number_must_be_in_range() {
        let mut factory = AtomicRelaxationModelFactory::new();
        let data = carbon();
        for z in [0, 101] {
            assert_eq!(
                factory
                    .get_or_build(z, &data, EnergyCutoffs::default(), true)
                    .unwrap_err(),
                RelaxationError::InvalidAtomicNumber(z)
            );
        }
        assert!(factory.is_empty());
    }

    #[test]
    fn malformed_table_fails_and_is_not_cached() {
        // Declared transitions without the accompanying arrays.
        let mut data = hydrogen();
        data.set_subshell_relaxation_transitions(1, 1).unwrap();
        let mut factory = AtomicRelaxationModelFactory::new();

        let result = factory.get_or_build(1, &data, EnergyCutoffs::default(), true);

        assert!(matches!(
            result,
            Err(RelaxationError::Table {
                source: TableError::InvalidShapeParameter { designator: 1, .. }
            })
        ));
        assert!(!factory.is_cached(1));
    }

    #[test]
    fn cached_atomic_numbers_are_reported_in_order() {
        let mut factory = AtomicRelaxationModelFactory::new();
        let cutoffs = EnergyCutoffs::default();
        factory.get_or_build(6, &carbon(), cutoffs, true).unwrap();
        factory.get_or_build(1, &hydrogen(), cutoffs, true).unwrap();

        assert_eq!(factory.cached_atomic_numbers(), vec![1, 6]);
        assert!(factory.get(1).unwrap().is_void());
    }
}
