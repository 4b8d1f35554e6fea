pub mod color;
pub mod csv_source;
pub mod layout;
pub mod legacy;
pub mod reconcile;
pub mod series;
pub mod session;
pub mod source;
