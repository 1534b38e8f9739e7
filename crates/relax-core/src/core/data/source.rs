use serde::Deserialize;

/// How a data source stores the per-transition probabilities of a subshell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProbabilityFormat {
    /// Values are already a cumulative distribution ending at one.
    Cdf,
    /// Values are unnormalized, positive weights.
    #[default]
    Weights,
}

/// Read access to the relaxation data of a single element.
///
/// Subshells are addressed by their ENDF designator, exactly as the
/// nuclear-data formats store them. Accessors return `None` when the
/// requested subshell or quantity is absent. Implemented once per data
/// format by the ingestion layer.
pub trait ElementRelaxationData {
    fn atomic_number(&self) -> u32;

    /// ENDF designators of every subshell in the element, ascending.
    fn subshells(&self) -> Vec<u32>;

    fn has_relaxation_data(&self) -> bool;

    fn has_subshell_relaxation_data(&self, subshell: u32) -> bool;

    fn subshell_occupancy(&self, subshell: u32) -> Option<f64>;

    fn subshell_binding_energy(&self, subshell: u32) -> Option<f64>;

    /// Number of transitions that can fill a vacancy in `subshell`.
    fn subshell_relaxation_transitions(&self, subshell: u32) -> Option<usize>;

    /// `(primary, secondary)` designator pairs of the vacancies left by each
    /// transition. A secondary designator of `0` means no secondary vacancy.
    fn subshell_relaxation_vacancies(&self, subshell: u32) -> Option<&[(u32, u32)]>;

    fn subshell_relaxation_particle_energies(&self, subshell: u32) -> Option<&[f64]>;

    fn subshell_relaxation_probabilities(&self, subshell: u32) -> Option<&[f64]>;

    fn probability_format(&self) -> ProbabilityFormat;
}
