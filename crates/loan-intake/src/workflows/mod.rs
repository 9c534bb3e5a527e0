//! Business workflows of the loan intake portal.

pub mod documents;
pub mod intake;
pub mod lenders;
