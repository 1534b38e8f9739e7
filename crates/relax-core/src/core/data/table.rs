use super::source::{ElementRelaxationData, ProbabilityFormat};
use crate::core::sampling::DiscreteDistribution;
use crate::core::subshell::Subshell;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TableError {
    #[error("Invalid shape parameter for subshell {}: {reason}", describe_designator(.designator))]
    InvalidShapeParameter { designator: u32, reason: String },

    #[error("No data for subshell {} in this table", describe_designator(.0))]
    UnknownSubshell(u32),
}

impl TableError {
    pub(crate) fn invalid(designator: u32, reason: impl Into<String>) -> Self {
        Self::InvalidShapeParameter {
            designator,
            reason: reason.into(),
        }
    }
}

fn describe_designator(designator: &u32) -> String {
    match Subshell::from_endf_designator(*designator) {
        Some(subshell) => format!("{subshell} ({designator})"),
        None => format!("designator {designator}"),
    }
}

/// One way of filling a vacancy: the vacancies it leaves behind, the energy
/// of the particle it emits and the cumulative probability up to and
/// including it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub primary: Subshell,
    pub secondary: Option<Subshell>,
    pub outgoing_energy: f64,
    pub cumulative_probability: f64,
}

/// Tabulated relaxation data for a single subshell.
///
/// A constructed table always satisfies: at least one transition, cumulative
/// probabilities non-decreasing, first value `>= 0` and last value exactly `1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct SubshellTable {
    subshell: Subshell,
    occupancy: f64,
    binding_energy: f64,
    transitions: Vec<Transition>,
}

impl SubshellTable {
    /// Validates the raw parallel arrays of a subshell and builds its table.
    ///
    /// With [`ProbabilityFormat::Weights`] the probabilities are normalized
    /// into a cumulative distribution first.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InvalidShapeParameter`] when the occupancy or
    /// binding energy is not positive, an array length differs from
    /// `transition_count`, an energy is negative, or the probabilities do
    /// not form a valid distribution.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        subshell: Subshell,
        occupancy: f64,
        binding_energy: f64,
        transition_count: usize,
        vacancies: &[(Subshell, Option<Subshell>)],
        energies: &[f64],
        probabilities: &[f64],
        format: ProbabilityFormat,
    ) -> Result<Self, TableError> {
        let designator = subshell.endf_designator();

        if !(occupancy.is_finite() && occupancy > 0.0) {
            return Err(TableError::invalid(
                designator,
                format!("occupancy must be positive, got {occupancy}"),
            ));
        }
        if !(binding_energy.is_finite() && binding_energy > 0.0) {
            return Err(TableError::invalid(
                designator,
                format!("binding energy must be positive, got {binding_energy}"),
            ));
        }
        if transition_count == 0 {
            return Err(TableError::invalid(
                designator,
                "transition count must be positive",
            ));
        }
        for (name, len) in [
            ("vacancy", vacancies.len()),
            ("energy", energies.len()),
            ("probability", probabilities.len()),
        ] {
            if len != transition_count {
                return Err(TableError::invalid(
                    designator,
                    format!("{name} array has {len} entries, expected {transition_count}"),
                ));
            }
        }
        if let Some((index, energy)) = energies
            .iter()
            .enumerate()
            .find(|(_, e)| !e.is_finite() || **e < 0.0)
        {
            return Err(TableError::invalid(
                designator,
                format!("outgoing energy {energy} at transition {index} is negative"),
            ));
        }

        let distribution = match format {
            ProbabilityFormat::Cdf => DiscreteDistribution::from_cdf(probabilities),
            ProbabilityFormat::Weights => DiscreteDistribution::from_weights(probabilities),
        }
        .map_err(|e| TableError::invalid(designator, e.to_string()))?;

        let transitions = vacancies
            .iter()
            .zip(energies)
            .zip(distribution.cdf())
            .map(|((&(primary, secondary), &outgoing_energy), &cdf)| Transition {
                primary,
                secondary,
                outgoing_energy,
                cumulative_probability: cdf,
            })
            .collect();

        Ok(Self {
            subshell,
            occupancy,
            binding_energy,
            transitions,
        })
    }

    /// Decodes the table of `subshell` from a raw element data source,
    /// converting its numeric designators into [`Subshell`] values.
    pub fn from_element_data<D>(data: &D, subshell: Subshell) -> Result<Self, TableError>
    where
        D: ElementRelaxationData + ?Sized,
    {
        let designator = subshell.endf_designator();
        if !data.has_subshell_relaxation_data(designator) {
            return Err(TableError::UnknownSubshell(designator));
        }

        let missing = |what: &str| TableError::invalid(designator, format!("missing {what}"));

        let occupancy = data
            .subshell_occupancy(designator)
            .ok_or_else(|| missing("occupancy"))?;
        let binding_energy = data
            .subshell_binding_energy(designator)
            .ok_or_else(|| missing("binding energy"))?;
        let transition_count = data
            .subshell_relaxation_transitions(designator)
            .ok_or_else(|| missing("transition count"))?;
        let raw_vacancies = data
            .subshell_relaxation_vacancies(designator)
            .ok_or_else(|| missing("relaxation vacancies"))?;
        let energies = data
            .subshell_relaxation_particle_energies(designator)
            .ok_or_else(|| missing("relaxation particle energies"))?;
        let probabilities = data
            .subshell_relaxation_probabilities(designator)
            .ok_or_else(|| missing("relaxation probabilities"))?;

        let vacancies = raw_vacancies
            .iter()
            .map(|&(primary, secondary)| decode_vacancy_pair(designator, primary, secondary))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(
            subshell,
            occupancy,
            binding_energy,
            transition_count,
            &vacancies,
            energies,
            probabilities,
            data.probability_format(),
        )
    }

    pub fn subshell(&self) -> Subshell {
        self.subshell
    }

    pub fn occupancy(&self) -> f64 {
        self.occupancy
    }

    pub fn binding_energy(&self) -> f64 {
        self.binding_energy
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn transition(&self, index: usize) -> Option<&Transition> {
        self.transitions.get(index)
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn cumulative_probabilities(&self) -> Vec<f64> {
        self.transitions
            .iter()
            .map(|t| t.cumulative_probability)
            .collect()
    }
}

fn decode_vacancy_pair(
    designator: u32,
    primary: u32,
    secondary: u32,
) -> Result<(Subshell, Option<Subshell>), TableError> {
    let primary_subshell = Subshell::from_endf_designator(primary).ok_or_else(|| {
        TableError::invalid(
            designator,
            format!("primary vacancy designator {primary} is not a subshell"),
        )
    })?;
    let secondary_subshell = match secondary {
        0 => None,
        s => Some(Subshell::from_endf_designator(s).ok_or_else(|| {
            TableError::invalid(
                designator,
                format!("secondary vacancy designator {s} is not a subshell"),
            )
        })?),
    };
    Ok((primary_subshell, secondary_subshell))
}

/// Every subshell table of one element, keyed by subshell.
#[derive(Debug, Clone, Default)]
pub struct SubshellTableSet {
    atomic_number: u32,
    tables: BTreeMap<Subshell, Arc<SubshellTable>>,
}

impl SubshellTableSet {
    /// Decodes the table of every subshell that carries relaxation data.
    ///
    /// The first malformed table aborts the whole element.
    pub fn from_element_data<D>(data: &D) -> Result<Self, TableError>
    where
        D: ElementRelaxationData + ?Sized,
    {
        let mut tables = BTreeMap::new();
        for designator in data.subshells() {
            if !data.has_subshell_relaxation_data(designator) {
                continue;
            }
            let subshell = Subshell::from_endf_designator(designator).ok_or_else(|| {
                TableError::invalid(designator, "designator is not a subshell")
            })?;
            let table = SubshellTable::from_element_data(data, subshell)?;
            tables.insert(subshell, Arc::new(table));
        }
        Ok(Self {
            atomic_number: data.atomic_number(),
            tables,
        })
    }

    pub fn atomic_number(&self) -> u32 {
        self.atomic_number
    }

    pub fn get(&self, subshell: Subshell) -> Result<&Arc<SubshellTable>, TableError> {
        self.tables
            .get(&subshell)
            .ok_or(TableError::UnknownSubshell(subshell.endf_designator()))
    }

    pub fn contains(&self, subshell: Subshell) -> bool {
        self.tables.contains_key(&subshell)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Subshell, &Arc<SubshellTable>)> {
        self.tables.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::data::container::ElementDataContainer;

    fn k_table(
        probabilities: &[f64],
        format: ProbabilityFormat,
    ) -> Result<SubshellTable, TableError> {
        SubshellTable::new(
            Subshell::K,
            2.0,
            8.8e-2,
            3,
            &[
                (Subshell::L2, None),
                (Subshell::L3, None),
                (Subshell::L1, Some(Subshell::L1)),
            ],
            &[7.2e-2, 7.5e-2, 5.3e-2],
            probabilities,
            format,
        )
    }

    fn assert_invalid(result: Result<SubshellTable, TableError>) {
        assert!(
            matches!(result, Err(TableError::InvalidShapeParameter { .. })),
            "expected InvalidShapeParameter, got {result:?}"
        );
    }

    #[test]
    fn new_accepts_valid_cdf() {
        let table = k_table(&[0.2, 0.5, 1.0], ProbabilityFormat::Cdf).unwrap();
        assert_eq!(table.subshell(), Subshell::K);
        assert_eq!(table.transition_count(), 3);
        assert_eq!(table.cumulative_probabilities(), vec![0.2, 0.5, 1.0]);
        assert_eq!(table.transition(2).unwrap().secondary, Some(Subshell::L1));
        assert_eq!(table.transition(0).unwrap().secondary, None);
    }

    #[test]
    fn new_normalizes_weights() {
        let table = k_table(&[1.0, 1.0, 2.0], ProbabilityFormat::Weights).unwrap();
        assert_eq!(table.cumulative_probabilities(), vec![0.25, 0.5, 1.0]);
    }

    #[test]
    fn constructed_tables_satisfy_cdf_invariants() {
        for (probs, format) in [
            (vec![0.1, 0.1, 1.0], ProbabilityFormat::Cdf),
            (vec![0.0, 0.3, 1.0 - 1e-12], ProbabilityFormat::Cdf),
            (vec![3.0, 1e-9, 7.0], ProbabilityFormat::Weights),
            (vec![0.3, 0.3, 0.3], ProbabilityFormat::Weights),
        ] {
            let cdf = k_table(&probs, format).unwrap().cumulative_probabilities();
            assert!(cdf[0] >= 0.0);
            assert!(cdf.windows(2).all(|w| w[0] <= w[1]));
            assert_eq!(*cdf.last().unwrap(), 1.0);
        }
    }

    #[test]
    fn cdf_tail_summed_slightly_above_one_stays_monotone() {
        let over = 1.0 + 4.0 * f64::EPSILON;
        let table = k_table(&[0.3, over, over], ProbabilityFormat::Cdf).unwrap();
        let cdf = table.cumulative_probabilities();

        assert_eq!(cdf, vec![0.3, 1.0, 1.0]);
        assert!(cdf.windows(2).all(|w| w[0] <= w[1]));
        assert!(DiscreteDistribution::from_cdf(&cdf).is_ok());
    }

    #[test]
    fn new_rejects_non_positive_occupancy_and_binding_energy() {
        let vacancies = [(Subshell::L1, None)];
        assert_invalid(SubshellTable::new(
            Subshell::K,
            0.0,
            1.0,
            1,
            &vacancies,
            &[1.0],
            &[1.0],
            ProbabilityFormat::Cdf,
        ));
        assert_invalid(SubshellTable::new(
            Subshell::K,
            1.0,
            -1.0,
            1,
            &vacancies,
            &[1.0],
            &[1.0],
            ProbabilityFormat::Cdf,
        ));
    }

    #[test]
    fn new_rejects_length_mismatch() {
        assert_invalid(SubshellTable::new(
            Subshell::K,
            2.0,
            1.0,
            2,
            &[(Subshell::L1, None)],
            &[1.0, 2.0],
            &[0.5, 1.0],
            ProbabilityFormat::Cdf,
        ));
        assert_invalid(SubshellTable::new(
            Subshell::K,
            2.0,
            1.0,
            0,
            &[],
            &[],
            &[],
            ProbabilityFormat::Cdf,
        ));
    }

    #[test]
    fn new_rejects_malformed_cdf() {
        assert_invalid(k_table(&[0.5, 0.2, 1.0], ProbabilityFormat::Cdf));
        assert_invalid(k_table(&[-0.1, 0.5, 1.0], ProbabilityFormat::Cdf));
        assert_invalid(k_table(&[0.2, 0.5, 0.9], ProbabilityFormat::Cdf));
    }

    #[test]
    fn new_rejects_negative_energy() {
        assert_invalid(SubshellTable::new(
            Subshell::K,
            2.0,
            1.0,
            1,
            &[(Subshell::L1, None)],
            &[-1.0],
            &[1.0],
            ProbabilityFormat::Cdf,
        ));
    }

    #[test]
    fn from_element_data_decodes_designators() {
        let mut data = ElementDataContainer::new(6, ProbabilityFormat::Cdf);
        data.set_subshells([1, 2, 3]).unwrap();
        data.set_subshell_occupancy(1, 2.0).unwrap();
        data.set_subshell_binding_energy(1, 2.9e-4).unwrap();
        data.set_subshell_relaxation_transitions(1, 2).unwrap();
        data.set_subshell_relaxation_vacancies(1, vec![(3, 0), (2, 3)])
            .unwrap();
        data.set_subshell_relaxation_particle_energies(1, vec![2.8e-4, 2.6e-4])
            .unwrap();
        data.set_subshell_relaxation_probabilities(1, vec![0.01, 1.0])
            .unwrap();

        let table = SubshellTable::from_element_data(&data, Subshell::K).unwrap();
        assert_eq!(table.occupancy(), 2.0);
        assert_eq!(table.binding_energy(), 2.9e-4);
        assert_eq!(table.transitions()[0].primary, Subshell::L2);
        assert_eq!(table.transitions()[0].secondary, None);
        assert_eq!(table.transitions()[1].primary, Subshell::L1);
        assert_eq!(table.transitions()[1].secondary, Some(Subshell::L2));

        assert_eq!(
            SubshellTable::from_element_data(&data, Subshell::L1),
            Err(TableError::UnknownSubshell(2))
        );
    }

    #[test]
    fn from_element_data_rejects_invalid_vacancy_designators() {
        let mut data = ElementDataContainer::new(6, ProbabilityFormat::Cdf);
        data.set_subshells([1]).unwrap();
        data.set_subshell_occupancy(1, 2.0).unwrap();
        data.set_subshell_binding_energy(1, 2.9e-4).unwrap();
        data.set_subshell_relaxation_transitions(1, 1).unwrap();
        data.set_subshell_relaxation_vacancies(1, vec![(0, 0)]).unwrap();
        data.set_subshell_relaxation_particle_energies(1, vec![2.8e-4])
            .unwrap();
        data.set_subshell_relaxation_probabilities(1, vec![1.0])
            .unwrap();

        assert!(matches!(
            SubshellTable::from_element_data(&data, Subshell::K),
            Err(TableError::InvalidShapeParameter { designator: 1, .. })
        ));
    }

    #[test]
    fn table_set_lookup_of_missing_subshell_fails_with_unknown_subshell() {
        let mut data = ElementDataContainer::new(6, ProbabilityFormat::Weights);
        data.set_subshells([1, 2]).unwrap();
        for designator in [1, 2] {
            data.set_subshell_occupancy(designator, 2.0).unwrap();
            data.set_subshell_binding_energy(designator, 1e-4).unwrap();
        }
        data.set_subshell_relaxation_transitions(1, 1).unwrap();
        data.set_subshell_relaxation_vacancies(1, vec![(2, 0)]).unwrap();
        data.set_subshell_relaxation_particle_energies(1, vec![1e-4])
            .unwrap();
        data.set_subshell_relaxation_probabilities(1, vec![3.0])
            .unwrap();

        let set = SubshellTableSet::from_element_data(&data).unwrap();
        assert_eq!(set.atomic_number(), 6);
        assert_eq!(set.len(), 1);
        assert!(set.contains(Subshell::K));
        assert!(set.get(Subshell::K).is_ok());
        assert_eq!(
            set.get(Subshell::L1).unwrap_err(),
            TableError::UnknownSubshell(2)
        );
    }

    #[test]
    fn error_messages_name_the_subshell() {
        let err = TableError::UnknownSubshell(4);
        assert_eq!(err.to_string(), "No data for subshell L3 (4) in this table");
        let err = TableError::invalid(0, "bad");
        assert_eq!(
            err.to_string(),
            "Invalid shape parameter for subshell designator 0: bad"
        );
    }
}
