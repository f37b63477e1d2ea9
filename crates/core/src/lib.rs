pub mod layout;
pub mod price;
pub mod receipt;

pub use layout::{LogicalLine, RawWord};
pub use price::{ParsePriceError, Price};
pub use receipt::{ReceiptRecord, ReceiptSummary};
