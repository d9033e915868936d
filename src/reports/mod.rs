// Reports module - return series, window normalization and views

pub mod benchmark;
pub mod performance;
pub mod returns;
pub mod summary;
pub mod window;

pub use benchmark::{align_benchmark, price_at_or_before, RebasePolicy};
pub use performance::{build_performance_view, PerformanceView};
pub use returns::{build_return_series, FlowWeight, ReturnFlag, ReturnRecord};
pub use summary::{summarize, PortfolioSummary};
pub use window::{normalize_window, PerformancePoint, Window};
