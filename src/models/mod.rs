pub mod audio;
pub mod reference;
pub mod usage;
pub mod user;
pub mod voice;

pub use audio::*;
pub use reference::*;
pub use usage::*;
pub use user::*;
pub use voice::*;
