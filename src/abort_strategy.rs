use crate::memory::*;

/// Enum with possible abort strategies.
/// These strategies specify when the iteration of a running k-means calculation is considered converged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AbortStrategy<T: Primitive> {
    /// Converged as soon as no coordinate of any center moved by more than **epsilon** within one
    /// iteration (`max(|centers - previous_centers|) <= epsilon`).
    /// ## Fields:
    /// - **epsilon**: Largest per-dimension center movement that still counts as "stable"
    CenterShift { epsilon: T },
    /// Converged directly after an iteration produced no improvement of the error where
    /// `improvement > threshold`.
    /// ## Fields:
    /// - **threshold**: Threshold, used to detect an improvement (`improvement > threshold`)
    NoImprovement { threshold: T },
}
impl<T: Primitive> Default for AbortStrategy<T> {
    fn default() -> Self {
        AbortStrategy::CenterShift { epsilon: T::from_f64(0.01) }
    }
}
impl<T: Primitive> AbortStrategy<T> {
    pub(crate) fn create_logic(&self) -> Box<dyn AbortStrategyLogic<T>> {
        match *self {
            AbortStrategy::CenterShift { epsilon } => Box::new(CenterShiftLogic { epsilon }),
            AbortStrategy::NoImprovement { threshold } => Box::new(NoImprovementLogic {
                threshold,
                prev_error: T::infinity()
            })
        }
    }
}

pub(crate) trait AbortStrategyLogic<T: Primitive> {
    /// Has to be called once per finished iteration.
    /// ## Arguments
    /// - **shift**: Largest per-dimension movement of any center in this iteration
    /// - **error**: The error (mean distance to the nearest center) after this iteration
    /// ## Returns
    /// - **true** if the calculation converged and should stop
    /// - **false** if the calculation should continue
    fn converged(&mut self, shift: T, error: T) -> bool;
}


pub(crate) struct CenterShiftLogic<T: Primitive> {
    epsilon: T
}
impl<T: Primitive> AbortStrategyLogic<T> for CenterShiftLogic<T> {
    fn converged(&mut self, shift: T, _error: T) -> bool {
        // NaN compares false: a degenerate center keeps the iteration running
        shift <= self.epsilon
    }
}


pub(crate) struct NoImprovementLogic<T: Primitive> {
    threshold: T,
    prev_error: T
}
impl<T: Primitive> AbortStrategyLogic<T> for NoImprovementLogic<T> {
    fn converged(&mut self, _shift: T, error: T) -> bool {
        let improvement = self.prev_error - error;
        self.prev_error = error;
        !(improvement > self.threshold)
    }
}
