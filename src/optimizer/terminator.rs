//! Termination policy
//!
//! A [`Terminator`] accumulates one scalar signal per iteration and decides
//! when an iterative optimizer should stop. Two modes exist:
//!
//! * [`TerminationMode::Converge`]: the signal is a loss value; stop once it has
//!   been stable for a number of consecutive iterations, or at the cap.
//! * [`TerminationMode::FinishMaxIter`]: the value is ignored; stop exactly
//!   when the number of signals reaches the cap.

use crate::core::OptimizerConfig;
use log::warn;

/// How a [`Terminator`] interprets its signals
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TerminationMode {
    /// Stop when successive signals change by at most `absolute_epsilon`, or
    /// by at most `relative_epsilon` times the previous value, for
    /// `max_stable_iterations` consecutive iterations
    Converge {
        absolute_epsilon: f64,
        relative_epsilon: f64,
        max_stable_iterations: usize,
    },
    /// Stop after the maximum number of iterations, whatever the signals are
    FinishMaxIter,
}

impl Default for TerminationMode {
    fn default() -> Self {
        Self::Converge {
            absolute_epsilon: 1e-9,
            relative_epsilon: 1e-4,
            max_stable_iterations: 5,
        }
    }
}

/// Iteration bookkeeping shared by both termination modes
#[derive(Debug, Clone)]
pub struct Terminator {
    mode: TerminationMode,
    max_iterations: usize,
    min_iterations: usize,
    history: Vec<f64>,
    stable_iterations: usize,
}

impl Default for Terminator {
    fn default() -> Self {
        Self::new(TerminationMode::default(), 500)
    }
}

impl Terminator {
    pub fn new(mode: TerminationMode, max_iterations: usize) -> Self {
        Self {
            mode,
            max_iterations,
            min_iterations: 0,
            history: Vec::new(),
            stable_iterations: 0,
        }
    }

    /// Loss-convergence policy with the given tolerance and cap
    pub fn converge(epsilon: f64, max_iterations: usize) -> Self {
        Self::new(
            TerminationMode::Converge {
                absolute_epsilon: epsilon,
                relative_epsilon: epsilon,
                max_stable_iterations: 5,
            },
            max_iterations,
        )
    }

    /// Fixed iteration cap
    pub fn max_iter(max_iterations: usize) -> Self {
        Self::new(TerminationMode::FinishMaxIter, max_iterations)
    }

    /// Policy described by an optimizer configuration
    pub fn from_config(config: &OptimizerConfig) -> Self {
        let mode = TerminationMode::Converge {
            absolute_epsilon: config.absolute_epsilon,
            relative_epsilon: config.relative_epsilon,
            max_stable_iterations: config.max_stable_iterations,
        };
        Self::new(mode, config.max_iterations).with_min_iterations(config.min_iterations)
    }

    /// Never declare convergence before `min_iterations` signals
    pub fn with_min_iterations(mut self, min_iterations: usize) -> Self {
        self.min_iterations = min_iterations;
        self
    }

    pub fn mode(&self) -> TerminationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: TerminationMode) {
        self.mode = mode;
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Record the signal of one iteration
    pub fn add(&mut self, value: f64) {
        if let (Some(&previous), TerminationMode::Converge { .. }) = (self.history.last(), self.mode)
        {
            if self.is_stable(previous, value) {
                self.stable_iterations += 1;
            } else {
                self.stable_iterations = 0;
            }
        }
        self.history.push(value);
    }

    fn is_stable(&self, previous: f64, value: f64) -> bool {
        match self.mode {
            TerminationMode::Converge {
                absolute_epsilon,
                relative_epsilon,
                ..
            } => {
                let change = (value - previous).abs();
                change <= absolute_epsilon || change <= relative_epsilon * previous.abs()
            }
            TerminationMode::FinishMaxIter => false,
        }
    }

    /// Whether the optimizer should stop after the signals seen so far
    pub fn should_terminate(&self) -> bool {
        let iterations = self.iterations();
        match self.mode {
            TerminationMode::FinishMaxIter => iterations >= self.max_iterations,
            TerminationMode::Converge {
                max_stable_iterations,
                ..
            } => {
                if iterations >= self.max_iterations {
                    warn!(
                        "stopped after reaching the maximum of {} iterations without converging",
                        self.max_iterations
                    );
                    return true;
                }
                iterations >= self.min_iterations && self.stable_iterations >= max_stable_iterations
            }
        }
    }

    /// Number of signals recorded
    pub fn iterations(&self) -> usize {
        self.history.len()
    }

    /// All signals recorded, oldest first
    pub fn history(&self) -> &[f64] {
        &self.history
    }

    pub fn last_value(&self) -> Option<f64> {
        self.history.last().copied()
    }

    /// Forget all signals, keeping mode and limits
    pub fn reset(&mut self) {
        self.history.clear();
        self.stable_iterations = 0;
    }
}
