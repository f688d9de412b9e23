//! Event-core constants and defaults

/// Highest witness time derivative the topology partitioner buckets.
///
/// A witness declaring more derivatives than this is still valid; only
/// orders `0..=MAX_WITNESS_DERIVS` are evaluated.
pub const MAX_WITNESS_DERIVS: usize = 2;

/// Default accuracy requirement for a new state
pub const DEFAULT_ACCURACY: f64 = 1e-3;

/// Default accuracy-relative localization time window for witnesses
pub const DEFAULT_LOCALIZATION_WINDOW: f64 = 0.1;
