// Application layer - session ownership, receipt-assisted entry, reports.

mod draft;
mod error;
mod service;
mod summary;

pub use draft::*;
pub use error::*;
pub use service::*;
pub use summary::*;
