pub mod cookie;
pub mod hyper;
pub mod request;
pub mod session;

pub use self::cookie::Cookie;
pub use self::hyper::{ConnectionInfo, SESSION_ID_NAME};
pub use self::request::{HttpDetails, Request};
pub use self::session::{Attributes, Session};
