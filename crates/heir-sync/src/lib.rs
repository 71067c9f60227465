//! heir-sync: keeps an inheritance case's relational record and its graph
//! mirror correlated, and bridges the record into the calculation engine.
//!
//! - [`Coordinator`] owns the ownership guard, person/relationship
//!   lifecycles across both stores, the case lifecycle, and the reconciler.
//! - [`CalculationGateway`] runs calculations from relational data only.

pub mod coordinator;
pub mod error;
pub mod gateway;
pub mod lifecycle;
pub mod reconcile;

pub use coordinator::Coordinator;
pub use error::{Result, SyncError};
pub use gateway::CalculationGateway;
pub use lifecycle::CaseDetails;
pub use reconcile::ReconcileReport;
