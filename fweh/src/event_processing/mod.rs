//! Event Processing Module
//!
//! Firmware events travel through this module in two halves. The ingestion
//! half runs on whatever thread delivers bus packets; the dispatch half runs
//! on a single worker thread owned by the engine.
//!
//! Key components:
//! - Fweh: engine lifecycle, registration, activation and ingestion
//! - EventDecoder: validation of untrusted packets into owned queue items
//! - CodeMapper: canonical <-> firmware code translation
//! - HandlerRegistry: one handler per firmware code, plus the enable mask
//! - EventQueue: FIFO between ingestion and the worker
//! - EventDispatcher: worker loop and interface lifecycle handling

pub mod code_map;
pub mod decoder;
pub mod dispatcher;
pub mod if_event;
pub mod processor;
pub mod queue;
pub mod registry;

pub use code_map::{CodeMapEntry, CodeMapper, EventMap};
pub use decoder::{EventDecoder, RawEventItem};
pub use dispatcher::EventDispatcher;
pub use if_event::IfEventOutcome;
pub use processor::{Fweh, EVENT_MSGS_IOVAR};
pub use queue::EventQueue;
pub use registry::{handler_fn, EventHandler, EventMask, HandlerRegistry};
