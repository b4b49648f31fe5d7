pub mod growth_refresher;
pub mod growth_report;

pub use growth_refresher::run_growth_refresher;
pub use growth_report::{run_attribution, GrowthReportService, LiveSource, TransactionResolver};
