/// Milestones of a relaxation run, in the order a caller receives them.
#[derive(Debug, Clone)]
pub enum Progress {
    /// Warm-up is about to build models for `elements` elements.
    WarmUpStart { elements: u64 },
    /// A model is available for `atomic_number`; `detailed` is `false` when
    /// the element relaxes through the void model.
    ModelBuilt { atomic_number: u32, detailed: bool },
    WarmUpFinish,

    /// `total` independent histories are about to run.
    HistoriesStart { total: u64 },
    /// One history has finished. Reported from worker threads, so arrival
    /// order is not event order.
    HistoryFinished,
    HistoriesFinish,

    Message(String),
}

/// Receives every [`Progress`] event. Must be callable from several threads
/// at once while histories run in parallel.
pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards events to an optional callback; without one, reporting is a no-op.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(callback) = &self.callback {
            callback(event);
        }
    }
}
