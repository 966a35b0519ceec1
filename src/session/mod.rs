//! Interactive session: persistent context and the flow controller

mod context;
mod flow;

pub use context::{SessionContext, Settings};
pub use flow::{
    run_session, AddressBook, Exit, Invocation, NextStep, Session, State, DEFAULT_WAIT_TIME,
};
