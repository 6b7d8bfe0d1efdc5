mod house;
mod user;

pub use house::*;
pub use user::*;
