pub mod analytical;
pub mod operational;
pub(crate) mod pool;

pub use analytical::{AnalyticalStore, NewArtifact};
pub use operational::OperationalStore;
