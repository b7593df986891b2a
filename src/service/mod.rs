pub mod extract;
pub mod formatter;
pub mod presign;
pub mod quota;

pub use extract::ExtractService;
pub use formatter::format_bill;
pub use presign::PresignService;
pub use quota::{DailyQuota, MemoryUsageCounter, PgUsageCounter, UsageCounter};
