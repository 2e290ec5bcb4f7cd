use crate::errors::SomnusResult;
use crate::models::{Contradiction, ContradictionStatus};

/// Persistence for contradiction records.
pub trait IContradictionStore: Send + Sync {
    fn record(&self, contradiction: &Contradiction) -> SomnusResult<()>;

    fn update(&self, contradiction: &Contradiction) -> SomnusResult<()>;

    /// The contradiction about `(a, b)` in either order, if any.
    fn find_pair(&self, a: &str, b: &str) -> SomnusResult<Option<Contradiction>>;

    fn list_by_status(
        &self,
        project_id: &str,
        status: ContradictionStatus,
    ) -> SomnusResult<Vec<Contradiction>>;
}
