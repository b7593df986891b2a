pub mod bill;
pub mod expense;
pub mod presign;

pub use bill::{Bill, Item, DEFAULT_TITLE};
pub use expense::{ExpenseAnalysis, ExpenseDocument, ExpenseField, LineItem, LineItemGroup};
pub use presign::{PresignRequest, PresignResponse};
