//! TCP listener: binding, accepting and handing connections off to tasks.

pub mod listener;
