use crate::core::data::table::Transition;
use crate::core::particle::ParticleType;
use std::fmt;

/// Whether a transition fills its vacancy by emitting a photon or an electron.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// Fluorescence: a photon is emitted, only the primary vacancy remains.
    Radiative,
    /// Auger (or Coster-Kronig): an electron is emitted, leaving two vacancies.
    NonRadiative,
}

impl TransitionKind {
    pub fn emitted_particle(self) -> ParticleType {
        match self {
            TransitionKind::Radiative => ParticleType::Photon,
            TransitionKind::NonRadiative => ParticleType::Electron,
        }
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TransitionKind::Radiative => "Radiative",
                TransitionKind::NonRadiative => "NonRadiative",
            }
        )
    }
}

/// Decides the kind of a tabulated transition.
///
/// Relaxation tables do not store the kind explicitly, so the decision is a
/// property of the data convention and can be swapped per factory.
pub trait TransitionClassifier: fmt::Debug + Send + Sync {
    fn classify(&self, transition: &Transition) -> TransitionKind;
}

/// EADL/ENDF convention: radiative transitions carry secondary designator `0`,
/// which decodes to no secondary vacancy.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SecondaryVacancyRule;

impl TransitionClassifier for SecondaryVacancyRule {
    fn classify(&self, transition: &Transition) -> TransitionKind {
        match transition.secondary {
            None => TransitionKind::Radiative,
            Some(_) => TransitionKind::NonRadiative,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::subshell::Subshell;

    fn transition(secondary: Option<Subshell>) -> Transition {
        Transition {
            primary: Subshell::L3,
            secondary,
            outgoing_energy: 1e-3,
            cumulative_probability: 1.0,
        }
    }

    #[test]
    fn secondary_vacancy_rule_classifies_by_secondary_presence() {
        let rule = SecondaryVacancyRule;
        assert_eq!(rule.classify(&transition(None)), TransitionKind::Radiative);
        assert_eq!(
            rule.classify(&transition(Some(Subshell::M1))),
            TransitionKind::NonRadiative
        );
    }

    #[test]
    fn emitted_particle_matches_transition_kind() {
        assert_eq!(
            TransitionKind::Radiative.emitted_particle(),
            ParticleType::Photon
        );
        assert_eq!(
            TransitionKind::NonRadiative.emitted_particle(),
            ParticleType::Electron
        );
    }
}
