//! Estimators backing the clustering and anomaly stages
//!
//! - `StandardScaler` - zero mean / unit variance for a single column
//! - `OneHotEncoder` - category labels to indicator columns
//! - `IsolationForest` - random-split isolation trees for outlier scoring
//!
//! K-means itself comes from `linfa-clustering`; see `crate::cluster`.
//! All randomness comes from a `StdRng` seeded by the caller, so a fit is
//! reproducible for a given seed and input.

pub mod encoder;
pub mod isolation_forest;
pub mod scaler;

pub use encoder::OneHotEncoder;
pub use isolation_forest::{FittedIsolationForest, IsolationForest};
pub use scaler::StandardScaler;
