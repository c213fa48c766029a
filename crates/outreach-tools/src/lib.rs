//! `ToolExecutor` implementation (component F): a handler registry for the
//! five required effects, the capability traits those handlers dispatch to,
//! and scripted/in-memory stand-ins for evals and demos.

mod clients;
mod error;
mod mock;
mod registry;
mod stub;

pub use clients::{CallGateway, CallReceipt, EmailGateway, EmailReceipt, RecordStore};
pub use error::{Result, ToolError};
pub use mock::{RecordedCall, ScriptedToolExecutor};
pub use registry::ToolRegistry;
pub use stub::{InMemoryRecordStore, LoggingCallGateway, LoggingEmailGateway};
