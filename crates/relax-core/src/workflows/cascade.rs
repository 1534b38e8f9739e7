use crate::core::data::source::ElementRelaxationData;
use crate::core::particle::{ParticleBank, ParticleState, ParticleType};
use crate::core::subshell::Subshell;
use crate::engine::atomic_model::{AtomicRelaxationModel, CascadeSummary};
use crate::engine::config::{EnergyCutoffs, RelaxationConfig};
use crate::engine::error::{RelaxationError, WorkflowError};
use crate::engine::factory::AtomicRelaxationModelFactory;
use crate::engine::progress::{Progress, ProgressReporter};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use tracing::{info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// An inner-shell vacancy left in an atom by a collision.
#[derive(Debug, Clone)]
pub struct IonizationEvent {
    pub atomic_number: u32,
    pub vacancy: Subshell,
    /// The particle whose collision created the vacancy.
    pub particle: ParticleState,
}

#[derive(Debug, Clone, Default)]
pub struct CascadeResult {
    /// Every banked secondary, grouped by event in input order.
    pub bank: ParticleBank,
    pub summary: CascadeSummary,
    pub histories: usize,
}

/// Populates the factory cache for a set of elements.
///
/// Must run before [`run`]. Whether detailed models are built follows the
/// relaxation mode of `ionizing`, the particle type whose collisions create
/// the vacancies.
#[instrument(skip_all, name = "relaxation_warm_up")]
pub fn warm_up(
    factory: &mut AtomicRelaxationModelFactory,
    elements: &[&dyn ElementRelaxationData],
    ionizing: ParticleType,
    config: &RelaxationConfig,
    reporter: &ProgressReporter,
) -> Result<(), WorkflowError> {
    let cutoffs = config.cutoffs()?;
    let use_relaxation_data = config.relaxation_enabled_for(ionizing);

    info!(
        elements = elements.len(),
        %ionizing,
        use_relaxation_data,
        "Building atomic relaxation models."
    );
    reporter.report(Progress::WarmUpStart {
        elements: elements.len() as u64,
    });

    for data in elements {
        let atomic_number = data.atomic_number();
        let model = factory.get_or_build(atomic_number, *data, cutoffs, use_relaxation_data)?;
        reporter.report(Progress::ModelBuilt {
            atomic_number,
            detailed: !model.is_void(),
        });
    }

    reporter.report(Progress::WarmUpFinish);
    Ok(())
}

/// Relaxes every ionization event against the factory's cached models.
///
/// Each event is an independent history with its own random stream, seeded
/// from the configured seed and the event's position in `events`, and its own
/// bank. The per-history banks are merged in event order, so the result does
/// not depend on how histories are scheduled across threads.
///
/// Energy cutoffs are fixed when a model is built, so `config` must carry the
/// same cutoffs that were passed to [`warm_up`].
///
/// # Errors
///
/// Returns [`WorkflowError::CutoffMismatch`] if a cached model was built with
/// different cutoffs than `config`, [`RelaxationError::ModelNotBuilt`] for an
/// event whose element was not warmed up while relaxation is enabled for the
/// event's particle type, and any cascade failure of an individual history.
#[instrument(skip_all, name = "relaxation_cascade_workflow")]
pub fn run(
    factory: &AtomicRelaxationModelFactory,
    events: &[IonizationEvent],
    config: &RelaxationConfig,
    reporter: &ProgressReporter,
) -> Result<CascadeResult, WorkflowError> {
    check_cutoffs(factory, &config.cutoffs()?)?;
    info!(histories = events.len(), "Starting relaxation histories.");
    reporter.report(Progress::HistoriesStart {
        total: events.len() as u64,
    });

    #[cfg(not(feature = "parallel"))]
    let iterator = events.iter().enumerate();

    #[cfg(feature = "parallel")]
    let iterator = events.par_iter().enumerate();

    let histories = iterator
        .map(|(index, event)| {
            let outcome = run_history(factory, event, config, history_seed(config.seed, index));
            reporter.report(Progress::HistoryFinished);
            outcome
        })
        .collect::<Result<Vec<_>, RelaxationError>>()?;

    let mut result = CascadeResult {
        histories: histories.len(),
        ..CascadeResult::default()
    };
    for (mut bank, summary) in histories {
        result.bank.append(&mut bank);
        result.summary += summary;
    }

    reporter.report(Progress::HistoriesFinish);
    info!(
        photons = result.summary.photons_banked,
        electrons = result.summary.electrons_banked,
        deposited_energy = result.summary.deposited_energy,
        "Relaxation histories complete."
    );
    Ok(result)
}

fn check_cutoffs(
    factory: &AtomicRelaxationModelFactory,
    requested: &EnergyCutoffs,
) -> Result<(), WorkflowError> {
    for atomic_number in factory.cached_atomic_numbers() {
        let built = factory.get(atomic_number).and_then(|model| model.cutoffs());
        if let Some(built) = built.filter(|built| *built != requested) {
            return Err(WorkflowError::CutoffMismatch {
                atomic_number,
                built: *built,
                requested: *requested,
            });
        }
    }
    Ok(())
}

fn run_history(
    factory: &AtomicRelaxationModelFactory,
    event: &IonizationEvent,
    config: &RelaxationConfig,
    seed: u64,
) -> Result<(ParticleBank, CascadeSummary), RelaxationError> {
    let model = model_for_event(factory, event, config)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bank = ParticleBank::new();
    let summary = model.relax_atom(event.vacancy, &event.particle, &mut bank, &mut rng)?;
    Ok((bank, summary))
}

fn model_for_event(
    factory: &AtomicRelaxationModelFactory,
    event: &IonizationEvent,
    config: &RelaxationConfig,
) -> Result<Arc<AtomicRelaxationModel>, RelaxationError> {
    if !config.relaxation_enabled_for(event.particle.particle_type) {
        return Ok(AtomicRelaxationModel::void());
    }
    factory
        .get(event.atomic_number)
        .cloned()
        .ok_or(RelaxationError::ModelNotBuilt(event.atomic_number))
}

// SplitMix64 finalizer over the seed and history index.
fn history_seed(seed: u64, index: usize) -> u64 {
    let mut z = seed.wrapping_add((index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
