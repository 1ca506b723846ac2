// Entity Models
// Region ("state"), Settlement ("city") and Territory ("country").
//
// Each entity declares its storage shape statically through
// `Entity::DESCRIPTOR`; the storage plan turns those declarations into
// table and column names.

pub mod region;
pub mod settlement;
pub mod territory;

pub use region::Region;
pub use settlement::{Settlement, SettlementSummary};
pub use territory::Territory;
