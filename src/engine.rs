//! Matching and saturation engine.
//!
//! Parsing an input string is a pipeline:
//!
//! ```text
//! input ── TriggerInfo::scan ──── select active rules (buckets)
//!                                          │
//!                                          v
//!                              Parser::saturate (parser.rs)
//!                                - seed matches (regex-first)
//!                                - iterate to fixpoint
//!                                - add nodes to stash, dedup by key
//!                                          │
//!                                          v
//!                                   Parser::select
//!                                - keep semantic nodes
//!                                - drop spans contained in larger ones
//! ```
//!
//! The engine leans on **saturation**: repeatedly apply rules until an
//! iteration produces no new nodes. Rule composition falls out naturally: the
//! rule that recognizes "7/17" creates the node that lets the date+hour rule
//! fire on "7/17 4", which in turn feeds the range and list rules.
//!
//! The engine knows nothing about `now`, configuration, or rendering; it only
//! builds partial semantic values. Inference and rendering happen afterwards
//! in `infer.rs` and `render.rs` on the selected top-level nodes.

#[path = "engine/parser.rs"]
mod parser;
#[path = "engine/trigger.rs"]
mod trigger;

pub(crate) use parser::Parser;
pub(crate) use trigger::{BucketMask, TriggerInfo};
