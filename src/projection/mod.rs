//! Compounding calculator: monthly capital ledger, future and real values,
//! goal solvers and IRR

mod params;
mod state;
mod ledger;
mod engine;
mod perturb;
mod solver;
mod irr;

pub use params::{monthly_rate, ProjectionParameters};
pub use state::ProjectionState;
pub use ledger::{MonthlyProjectionRecord, ProjectionResult, ProjectionSummary};
pub use engine::{annualized_return, impact_percent, CompoundingCalculator};
pub use perturb::{SensitivityParameter, SensitivityPoint};
pub use solver::{BreakEven, TimeToGoal};
pub use irr::calculate_irr;
