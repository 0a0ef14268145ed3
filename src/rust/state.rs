use std::sync::Arc;

use parking_lot::RwLock;

use crate::label_store::LabelStore;

/// The mutable state shared by every request: the model and the labels it was taught.
///
/// Writers (the trainer) hold the write lock for a whole labeling operation, so a
/// reader never sees a model update without its label, or the reverse.
#[derive(Debug)]
pub struct ModelState<L> {
    pub learner: L,
    pub labels: LabelStore,
}

pub type SharedState<L> = Arc<RwLock<ModelState<L>>>;

impl<L> ModelState<L> {
    pub fn new(learner: L, labels: LabelStore) -> Self {
        Self { learner, labels }
    }

    pub fn into_shared(self) -> SharedState<L> {
        Arc::new(RwLock::new(self))
    }
}
