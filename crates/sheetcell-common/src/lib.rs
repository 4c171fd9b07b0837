pub mod coercion;
pub mod locale;
pub mod value;

pub use coercion::*;
pub use locale::{DateOrder, Locale};
pub use value::*;
