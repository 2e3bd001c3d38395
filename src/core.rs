//! Provides types that represent the user's instructions: the detfile, its environment, and the
//! actions it defines.

pub mod action;
pub mod detfile;
pub mod environment;
pub mod registry;
pub mod step;

#[doc(inline)]
pub use action::{Action, Invoke};

#[doc(inline)]
pub use detfile::Detfile;

#[doc(inline)]
pub use environment::Environment;

#[doc(inline)]
pub use registry::{ListActions, Registry};

#[doc(inline)]
pub use step::{Script, Step};
