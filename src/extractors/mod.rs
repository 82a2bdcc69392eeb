mod flash;
mod request;

pub(crate) use flash::{encode_errors, set_cookie};
pub use flash::Flash;
pub use request::CrudRequest;
