pub mod bar;
pub mod features;
pub mod ledger;

pub use bar::*;
pub use features::*;
pub use ledger::*;
