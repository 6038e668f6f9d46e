pub mod csv;
pub mod session;
