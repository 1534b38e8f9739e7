use super::source::{ElementRelaxationData, ProbabilityFormat};
use super::table::TableError;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
struct SubshellEntry {
    occupancy: Option<f64>,
    binding_energy: Option<f64>,
    transitions: Option<usize>,
    vacancies: Option<Vec<(u32, u32)>>,
    particle_energies: Option<Vec<f64>>,
    probabilities: Option<Vec<f64>>,
}

/// In-memory relaxation data for one element.
///
/// Every setter checks its input against what has already been recorded and
/// may only be called once per quantity; after construction the container is
/// read through [`ElementRelaxationData`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "ElementDataRecord")]
pub struct ElementDataContainer {
    atomic_number: u32,
    format: ProbabilityFormat,
    subshells: BTreeMap<u32, SubshellEntry>,
}

fn set_once<T>(
    slot: &mut Option<T>,
    value: T,
    designator: u32,
    what: &str,
) -> Result<(), TableError> {
    if slot.is_some() {
        return Err(TableError::invalid(
            designator,
            format!("{what} has already been set"),
        ));
    }
    *slot = Some(value);
    Ok(())
}

impl ElementDataContainer {
    pub fn new(atomic_number: u32, format: ProbabilityFormat) -> Self {
        Self {
            atomic_number,
            format,
            subshells: BTreeMap::new(),
        }
    }

    /// Registers the subshells of the element by ENDF designator.
    pub fn set_subshells(
        &mut self,
        designators: impl IntoIterator<Item = u32>,
    ) -> Result<(), TableError> {
        for designator in designators {
            if !(1..=39).contains(&designator) {
                return Err(TableError::invalid(
                    designator,
                    "designator is not a subshell",
                ));
            }
            self.subshells.entry(designator).or_default();
        }
        Ok(())
    }

    fn entry_mut(&mut self, designator: u32) -> Result<&mut SubshellEntry, TableError> {
        self.subshells
            .get_mut(&designator)
            .ok_or(TableError::UnknownSubshell(designator))
    }

    fn declared_transitions(
        &mut self,
        designator: u32,
    ) -> Result<(usize, &mut SubshellEntry), TableError> {
        let entry = self.entry_mut(designator)?;
        let count = entry.transitions.ok_or_else(|| {
            TableError::invalid(designator, "transition count has not been declared")
        })?;
        Ok((count, entry))
    }

    pub fn set_subshell_occupancy(
        &mut self,
        designator: u32,
        occupancy: f64,
    ) -> Result<(), TableError> {
        if !(occupancy.is_finite() && occupancy > 0.0) {
            return Err(TableError::invalid(
                designator,
                format!("occupancy must be positive, got {occupancy}"),
            ));
        }
        let entry = self.entry_mut(designator)?;
        set_once(&mut entry.occupancy, occupancy, designator, "occupancy")
    }

    pub fn set_subshell_binding_energy(
        &mut self,
        designator: u32,
        binding_energy: f64,
    ) -> Result<(), TableError> {
        if !(binding_energy.is_finite() && binding_energy > 0.0) {
            return Err(TableError::invalid(
                designator,
                format!("binding energy must be positive, got {binding_energy}"),
            ));
        }
        let entry = self.entry_mut(designator)?;
        set_once(
            &mut entry.binding_energy,
            binding_energy,
            designator,
            "binding energy",
        )
    }

    pub fn set_subshell_relaxation_transitions(
        &mut self,
        designator: u32,
        transitions: usize,
    ) -> Result<(), TableError> {
        if transitions == 0 {
            return Err(TableError::invalid(
                designator,
                "transition count must be positive",
            ));
        }
        let entry = self.entry_mut(designator)?;
        set_once(
            &mut entry.transitions,
            transitions,
            designator,
            "transition count",
        )
    }

    pub fn set_subshell_relaxation_vacancies(
        &mut self,
        designator: u32,
        vacancies: Vec<(u32, u32)>,
    ) -> Result<(), TableError> {
        let (count, entry) = self.declared_transitions(designator)?;
        check_len(designator, "vacancy", vacancies.len(), count)?;
        set_once(
            &mut entry.vacancies,
            vacancies,
            designator,
            "relaxation vacancies",
        )
    }

    pub fn set_subshell_relaxation_particle_energies(
        &mut self,
        designator: u32,
        energies: Vec<f64>,
    ) -> Result<(), TableError> {
        let (count, entry) = self.declared_transitions(designator)?;
        check_len(designator, "energy", energies.len(), count)?;
        if energies.iter().any(|e| !e.is_finite() || *e < 0.0) {
            return Err(TableError::invalid(
                designator,
                "particle energies must be non-negative",
            ));
        }
        set_once(
            &mut entry.particle_energies,
            energies,
            designator,
            "particle energies",
        )
    }

    pub fn set_subshell_relaxation_probabilities(
        &mut self,
        designator: u32,
        probabilities: Vec<f64>,
    ) -> Result<(), TableError> {
        let format = self.format;
        let (count, entry) = self.declared_transitions(designator)?;
        check_len(designator, "probability", probabilities.len(), count)?;
        if format == ProbabilityFormat::Weights && probabilities.iter().any(|p| !(*p > 0.0)) {
            return Err(TableError::invalid(
                designator,
                "transition weights must be positive",
            ));
        }
        set_once(
            &mut entry.probabilities,
            probabilities,
            designator,
            "probabilities",
        )
    }
}

fn check_len(designator: u32, what: &str, len: usize, expected: usize) -> Result<(), TableError> {
    if len != expected {
        return Err(TableError::invalid(
            designator,
            format!("{what} array has {len} entries, expected {expected}"),
        ));
    }
    Ok(())
}

impl ElementRelaxationData for ElementDataContainer {
    fn atomic_number(&self) -> u32 {
        self.atomic_number
    }

    fn subshells(&self) -> Vec<u32> {
        self.subshells.keys().copied().collect()
    }

    fn has_relaxation_data(&self) -> bool {
        self.subshells.values().any(|e| e.transitions.is_some())
    }

    fn has_subshell_relaxation_data(&self, subshell: u32) -> bool {
        self.subshells
            .get(&subshell)
            .is_some_and(|e| e.transitions.is_some())
    }

    fn subshell_occupancy(&self, subshell: u32) -> Option<f64> {
        self.subshells.get(&subshell)?.occupancy
    }

    fn subshell_binding_energy(&self, subshell: u32) -> Option<f64> {
        self.subshells.get(&subshell)?.binding_energy
    }

    fn subshell_relaxation_transitions(&self, subshell: u32) -> Option<usize> {
        self.subshells.get(&subshell)?.transitions
    }

    fn subshell_relaxation_vacancies(&self, subshell: u32) -> Option<&[(u32, u32)]> {
        self.subshells.get(&subshell)?.vacancies.as_deref()
    }

    fn subshell_relaxation_particle_energies(&self, subshell: u32) -> Option<&[f64]> {
        self.subshells.get(&subshell)?.particle_energies.as_deref()
    }

    fn subshell_relaxation_probabilities(&self, subshell: u32) -> Option<&[f64]> {
        self.subshells.get(&subshell)?.probabilities.as_deref()
    }

    fn probability_format(&self) -> ProbabilityFormat {
        self.format
    }
}

/// The deserialized layout of an element data file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ElementDataRecord {
    atomic_number: u32,
    #[serde(default)]
    probability_format: ProbabilityFormat,
    #[serde(default)]
    subshells: Vec<SubshellRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SubshellRecord {
    designator: u32,
    occupancy: f64,
    binding_energy: f64,
    #[serde(default)]
    relaxation: Option<RelaxationRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RelaxationRecord {
    vacancies: Vec<(u32, u32)>,
    energies: Vec<f64>,
    probabilities: Vec<f64>,
}

impl TryFrom<ElementDataRecord> for ElementDataContainer {
    type Error = TableError;

    fn try_from(record: ElementDataRecord) -> Result<Self, Self::Error> {
        let mut container = Self::new(record.atomic_number, record.probability_format);
        container.set_subshells(record.subshells.iter().map(|s| s.designator))?;
        for subshell in record.subshells {
            let designator = subshell.designator;
            container.set_subshell_occupancy(designator, subshell.occupancy)?;
            container.set_subshell_binding_energy(designator, subshell.binding_energy)?;
            if let Some(relaxation) = subshell.relaxation {
                container
                    .set_subshell_relaxation_transitions(designator, relaxation.vacancies.len())?;
                container.set_subshell_relaxation_vacancies(designator, relaxation.vacancies)?;
                container
                    .set_subshell_relaxation_particle_energies(designator, relaxation.energies)?;
                container
                    .set_subshell_relaxation_probabilities(designator, relaxation.probabilities)?;
            }
        }
        Ok(container)
    }
}
