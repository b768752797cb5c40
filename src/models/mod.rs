mod appeal;
mod license_key;
mod order;
mod product;

pub use appeal::*;
pub use license_key::*;
pub use order::*;
pub use product::*;
