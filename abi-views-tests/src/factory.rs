mod abis;
mod queues;
mod warehouses;

pub use abis::*;
pub use queues::*;
pub use warehouses::*;
