use claims_core::ClaimsError;
use report_pdf::ExportError;
use thiserror::Error;

use crate::controller::DashboardState;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error(transparent)]
    Claims(#[from] ClaimsError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Cannot {action} while {state:?}")]
    InvalidTransition {
        state: DashboardState,
        action: &'static str,
    },

    #[error("No report is ready")]
    NotReady,

    #[error("Query was superseded by a newer search")]
    Superseded,

    #[error("Invalid configuration: {0}")]
    Config(String),
}
