//! Intent handlers. Single-shot commands emit exactly one result message;
//! the product and report commands open a flow and ask its first question.

pub mod finance;
pub mod help;
pub mod product;
pub mod report;
pub mod transformation;
