use super::config::EnergyCutoffs;
use super::error::RelaxationError;
use super::subshell_model::{SubshellRelaxationModel, TransitionOutcome};
use super::transition::TransitionKind;
use crate::core::particle::{ParticleBank, ParticleState};
use crate::core::subshell::Subshell;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use std::ops::{Add, AddAssign};
use std::sync::{Arc, LazyLock};
use tracing::{instrument, warn};

static VOID_MODEL: LazyLock<Arc<AtomicRelaxationModel>> =
    LazyLock::new(|| Arc::new(AtomicRelaxationModel::Void));

/// Tally of one relaxation cascade.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct CascadeSummary {
    pub transitions: usize,
    pub photons_banked: usize,
    pub electrons_banked: usize,
    /// Energy (MeV) of emitted particles that fell below their cutoff.
    pub deposited_energy: f64,
}

impl CascadeSummary {
    fn record(&mut self, outcome: &TransitionOutcome) {
        self.transitions += 1;
        match (outcome.banked, outcome.kind) {
            (true, TransitionKind::Radiative) => self.photons_banked += 1,
            (true, TransitionKind::NonRadiative) => self.electrons_banked += 1,
            (false, _) => self.deposited_energy += outcome.energy,
        }
    }

    pub fn particles_banked(&self) -> usize {
        self.photons_banked + self.electrons_banked
    }
}

impl Add for CascadeSummary {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            transitions: self.transitions + other.transitions,
            photons_banked: self.photons_banked + other.photons_banked,
            electrons_banked: self.electrons_banked + other.electrons_banked,
            deposited_energy: self.deposited_energy + other.deposited_energy,
        }
    }
}

impl AddAssign for CascadeSummary {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

/// De-excites an atom after an inner-shell ionization.
#[derive(Debug)]
pub enum AtomicRelaxationModel {
    /// Relaxation is disabled or no data exists: every cascade is a no-op.
    Void,
    Detailed(DetailedAtomicRelaxationModel),
}

impl AtomicRelaxationModel {
    /// The process-wide shared void model.
    pub fn void() -> Arc<Self> {
        Arc::clone(&VOID_MODEL)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    /// Cutoffs the model was built with; `None` for the void model.
    pub fn cutoffs(&self) -> Option<&EnergyCutoffs> {
        match self {
            Self::Void => None,
            Self::Detailed(model) => Some(model.cutoffs()),
        }
    }

    /// Relaxes the atom starting from a vacancy in `vacancy`, pushing every
    /// emitted particle above its cutoff into `bank`.
    pub fn relax_atom<R: Rng + ?Sized>(
        &self,
        vacancy: Subshell,
        particle: &ParticleState,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<CascadeSummary, RelaxationError> {
        match self {
            Self::Void => Ok(CascadeSummary::default()),
            Self::Detailed(model) => model.relax_atom(vacancy, particle, bank, rng),
        }
    }
}

/// Chains subshell models into a full cascade for one element.
#[derive(Debug)]
pub struct DetailedAtomicRelaxationModel {
    models: HashMap<Subshell, SubshellRelaxationModel>,
    cutoffs: EnergyCutoffs,
}

impl DetailedAtomicRelaxationModel {
    /// Collects subshell models into an atomic model.
    ///
    /// If several models answer for the same vacancy subshell the first is
    /// kept. The resulting transition graph must be acyclic.
    ///
    /// # Errors
    ///
    /// Returns [`RelaxationError::CyclicTransitionData`] if some vacancy can
    /// lead back to itself.
    pub fn new(
        subshell_models: impl IntoIterator<Item = SubshellRelaxationModel>,
        cutoffs: EnergyCutoffs,
    ) -> Result<Self, RelaxationError> {
        let model = Self::from_models_unchecked(subshell_models, cutoffs);
        model.check_acyclic()?;
        Ok(model)
    }

    fn from_models_unchecked(
        subshell_models: impl IntoIterator<Item = SubshellRelaxationModel>,
        cutoffs: EnergyCutoffs,
    ) -> Self {
        let mut models = HashMap::new();
        for model in subshell_models {
            let subshell = model.vacancy_subshell();
            if models.contains_key(&subshell) {
                warn!(%subshell, "Duplicate subshell relaxation model dropped, keeping the first");
                continue;
            }
            models.insert(subshell, model);
        }
        Self { models, cutoffs }
    }

    pub fn cutoffs(&self) -> &EnergyCutoffs {
        &self.cutoffs
    }

    pub fn subshell_model(&self, subshell: Subshell) -> Option<&SubshellRelaxationModel> {
        self.models.get(&subshell)
    }

    pub fn subshells(&self) -> impl Iterator<Item = Subshell> + '_ {
        self.models.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    #[instrument(level = "trace", skip_all, fields(%vacancy))]
    pub fn relax_atom<R: Rng + ?Sized>(
        &self,
        vacancy: Subshell,
        particle: &ParticleState,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<CascadeSummary, RelaxationError> {
        let mut summary = CascadeSummary::default();
        let mut path = Vec::with_capacity(self.models.len());
        self.cascade(vacancy, particle, bank, rng, &mut path, &mut summary)?;
        Ok(summary)
    }

    // Depth-first, primary vacancy before secondary. `path` holds the
    // vacancies currently being filled above this call.
    fn cascade<R: Rng + ?Sized>(
        &self,
        vacancy: Subshell,
        particle: &ParticleState,
        bank: &mut ParticleBank,
        rng: &mut R,
        path: &mut Vec<Subshell>,
        summary: &mut CascadeSummary,
    ) -> Result<(), RelaxationError> {
        let Some(model) = self.models.get(&vacancy) else {
            return Ok(());
        };
        if path.contains(&vacancy) {
            let mut cycle = path.clone();
            cycle.push(vacancy);
            return Err(RelaxationError::CyclicTransitionData { path: cycle });
        }

        path.push(vacancy);
        let outcome = model.relax(vacancy, particle, &self.cutoffs, bank, rng)?;
        summary.record(&outcome);

        self.cascade(outcome.primary, particle, bank, rng, path, summary)?;
        if let Some(secondary) = outcome.secondary {
            self.cascade(secondary, particle, bank, rng, path, summary)?;
        }
        path.pop();
        Ok(())
    }

    fn check_acyclic(&self) -> Result<(), RelaxationError> {
        let mut finished = HashSet::new();
        let mut path = Vec::new();
        let mut starts: Vec<Subshell> = self.models.keys().copied().collect();
        starts.sort();
        for start in starts {
            self.visit(start, &mut path, &mut finished)?;
        }
        Ok(())
    }

    fn visit(
        &self,
        subshell: Subshell,
        path: &mut Vec<Subshell>,
        finished: &mut HashSet<Subshell>,
    ) -> Result<(), RelaxationError> {
        if finished.contains(&subshell) {
            return Ok(());
        }
        let Some(model) = self.models.get(&subshell) else {
            return Ok(());
        };
        if path.contains(&subshell) {
            let mut cycle = path.clone();
            cycle.push(subshell);
            return Err(RelaxationError::CyclicTransitionData { path: cycle });
        }

        path.push(subshell);
        for transition in model.table().transitions() {
            self.visit(transition.primary, path, finished)?;
            if let Some(secondary) = transition.secondary {
                self.visit(secondary, path, finished)?;
            }
        }
        path.pop();
        finished.insert(subshell);
        Ok(())
    }
}
