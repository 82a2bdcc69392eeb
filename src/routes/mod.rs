//! CRUD route registration.

mod controller;
mod registrar;
mod table;

pub use controller::Controller;
pub use registrar::{plan_bindings, RouteRegistrar};
pub use table::{RouteBinding, RouteTable, Verb};
