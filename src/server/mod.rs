pub mod http;

pub use self::http::{PASSWORD_HEADER, USER_HEADER, router, serve};
