//! The data-access layer: catalog, calendar, window resolution, cache,
//! fetch/pivot, and the `DataReader` orchestration over all of them.

pub mod cache;
pub mod calendar;
pub mod catalog;
pub mod fetch;
pub mod reader;
pub mod window;

pub use cache::FrameCache;
pub use calendar::TradingCalendar;
pub use catalog::{FieldCatalog, FieldLookup, FieldRef};
pub use reader::{AsOf, DataError, DataReader, EmptyReason, FieldWindow, WindowStatus};
pub use window::{resolve_window, ResolvedWindow};
