mod expense;
mod ledger;
mod money;
mod trip;

pub use expense::*;
pub use ledger::*;
pub use money::*;
pub use trip::*;
