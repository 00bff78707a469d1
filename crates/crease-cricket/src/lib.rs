pub mod filter;
pub mod forms;
pub mod roster_csv;
pub mod selection;
pub mod valuation;
