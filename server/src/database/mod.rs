pub mod create;
pub mod users;
pub mod utils;

pub use create::*;
pub use users::*;
pub use utils::*;
