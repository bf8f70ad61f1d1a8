pub mod alert;
pub mod incident;
pub mod window;

pub use alert::*;
pub use incident::*;
pub use window::*;
