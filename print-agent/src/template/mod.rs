//! Receipt template engine
//!
//! Compiles the declarative receipt markup plus an order context into an
//! ordered instruction list consumed by the document renderer.
//!
//! Markup syntax:
//! - `{{var}}` / `{{dotted.path}}` - variable substitution
//! - `{{#each items}} ... {{/each}}` - repeat per array element
//! - `{{#if key}} ... {{/if}}` - conditional (nests)
//! - `[SEP]` `[SEP:=]` - separator line
//! - `[BOLD:on|off]` `[SIZE:n]` `[ALIGN:left|center|right]` - styling
//! - `[FEED:n]` `[QR:data]` `[CUT]` - paper control

mod context;
mod default;
mod engine;

pub use context::{build_context, format_brl};
pub use default::{DEFAULT_TEMPLATE_58, DEFAULT_TEMPLATE_80, default_template_for_width};
pub use engine::compile;

use cupom_printer::Alignment;

/// One step of a compiled receipt
///
/// Produced once by the compiler, consumed once by the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Text(String),
    Separator(char),
    Bold(bool),
    /// Character size multiplier 1..8 (applied to width and height)
    Size(u8),
    Align(Alignment),
    Feed(u8),
    Qr(String),
    Cut,
}
