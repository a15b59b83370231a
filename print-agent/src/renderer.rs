//! Receipt document renderer
//!
//! Walks the compiled instruction list and emits the final ESC/POS byte
//! buffer for one printer's layout (width, codepage, margin, density).

use crate::template::{self, Instruction, build_context, default_template_for_width};
use cupom_printer::{Alignment, Charset, CutMode, columns_for_width, escpos};
use shared::{Order, PrinterConfig};

/// Render an order into a ready-to-dispatch ESC/POS document
pub fn render(order: &Order, printer: &PrinterConfig) -> Vec<u8> {
    let charset = Charset::from_name(&printer.character_set);
    let columns = columns_for_width(printer.width);
    let margin = usize::from(printer.margin_left);

    let mut doc = Vec::with_capacity(4096);
    doc.extend(escpos::init());
    doc.extend(escpos::codepage(charset));
    doc.extend(escpos::density(printer.density));
    doc.extend(escpos::line_spacing_default());

    let ctx = build_context(order, printer);
    for instruction in template::compile(pick_template(printer), &ctx) {
        match instruction {
            Instruction::Text(content) => {
                if margin > 0 {
                    doc.extend(escpos::margin_left(printer.margin_left));
                }
                doc.extend(escpos::text(&content, charset));
            }
            Instruction::Separator(ch) => {
                doc.extend(escpos::align(Alignment::Left));
                doc.extend(escpos::separator(columns.saturating_sub(margin), ch));
            }
            Instruction::Bold(on) => doc.extend(escpos::bold(on)),
            Instruction::Size(mult) => doc.extend(escpos::char_size(mult, mult)),
            Instruction::Align(alignment) => doc.extend(escpos::align(alignment)),
            Instruction::Feed(lines) => doc.extend(escpos::feed(lines)),
            Instruction::Qr(data) => {
                doc.extend(escpos::align(Alignment::Center));
                doc.extend(escpos::qr_code(&data, 4, 1));
                doc.extend(escpos::align(Alignment::Left));
            }
            Instruction::Cut => {
                doc.extend(escpos::feed_lines(4));
                doc.extend(escpos::cut(CutMode::Partial));
            }
        }
    }

    // Always feed and cut at the end, even when the template already did:
    // a malformed template must still separate from the next document
    doc.extend(escpos::feed_lines(4));
    doc.extend(escpos::cut(CutMode::Partial));

    doc
}

/// Per-printer template, else the built-in default for the paper width
///
/// Templates that look like JSON come from the legacy web panel block
/// format, which this renderer does not interpret.
fn pick_template(printer: &PrinterConfig) -> &str {
    match printer.template.as_deref() {
        Some(tpl) if !tpl.trim_start().starts_with('{') => tpl,
        _ => default_template_for_width(printer.width),
    }
}
