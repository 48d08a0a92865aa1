pub mod layout;
pub mod plain;
pub mod render;
pub mod view;

pub use plain::PlainPrinter;
pub use view::{ResultsView, Slot, ViewPhase};
