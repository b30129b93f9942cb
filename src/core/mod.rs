pub mod error;
pub mod node;
pub mod value;

pub use error::{DbError, Result};
pub use node::{Field, Node};
pub use value::{Row, Value};
