//! `property: value` capture shared by rulesets and block at-rules

use crate::lexical::diagnostics::DiagnosticKind;
use crate::lexical::recognizer::{CharEvent, Outcome, ScanContext};
use crate::lexical::state::LexState;
use crate::tokens::{Declaration, Token};

const IMPORTANT: &str = "!important";

/// Property whose values legitimately contain colons (`progid:DXImageTransform...`)
const COLON_VALUED_PROPERTY: &str = "filter";

/// States and tokens of one block family
#[derive(Clone, Copy)]
pub(super) struct DeclarationFamily {
    pub body: LexState,
    pub declaration: LexState,
    pub wrap: fn(Declaration) -> Token,
    pub end: fn() -> Token,
}

#[derive(Debug, Default)]
pub(super) struct DeclarationCapture {
    property: Option<String>,
    colon: usize,
}

impl DeclarationCapture {
    /// React to `:` `;` `}` inside the family's body or declaration state
    pub fn handle(
        &mut self,
        family: &DeclarationFamily,
        event: CharEvent,
        ctx: &mut ScanContext<'_>,
    ) -> Outcome {
        if event.state == family.body {
            match event.current {
                ':' => {
                    let property = ctx.take_buffer(&[], true).to_lowercase();
                    self.property = Some(property);
                    self.colon = event.position;
                    ctx.push_state(family.declaration);
                    Outcome::Handled
                }
                ';' => {
                    self.discard_stray_text(ctx);
                    Outcome::Handled
                }
                '}' => {
                    self.discard_stray_text(ctx);
                    ctx.emit((family.end)());
                    ctx.pop_state();
                    Outcome::Handled
                }
                _ => Outcome::NotHandled,
            }
        } else if event.state == family.declaration {
            match event.current {
                ':' => self.extra_colon(ctx),
                ';' => {
                    self.close(family, ctx);
                    Outcome::Handled
                }
                '}' => {
                    self.close(family, ctx);
                    ctx.emit((family.end)());
                    ctx.pop_state();
                    Outcome::Handled
                }
                _ => Outcome::NotHandled,
            }
        } else {
            Outcome::NotHandled
        }
    }

    pub fn reset(&mut self) {
        self.property = None;
        self.colon = 0;
    }

    fn extra_colon(&mut self, ctx: &mut ScanContext<'_>) -> Outcome {
        if self.property.as_deref() == Some(COLON_VALUED_PROPERTY) {
            return Outcome::NotHandled;
        }
        let pending = ctx.buffer().snapshot();
        ctx.report(
            DiagnosticKind::UnterminatedDeclaration,
            "declaration value contains ':'; a ';' is probably missing",
            Some(pending),
        );
        ctx.append(':');
        Outcome::Handled
    }

    fn close(&mut self, family: &DeclarationFamily, ctx: &mut ScanContext<'_>) {
        let raw = ctx.take_buffer(&[';', '}'], true);
        let (value, important) = split_important(&raw);
        let property = self.property.take().unwrap_or_default();
        ctx.emit_from((family.wrap)(Declaration::new(property, value, important)), self.colon);
        ctx.pop_state();
    }

    fn discard_stray_text(&mut self, ctx: &mut ScanContext<'_>) {
        if ctx.buffer().has_content() {
            let text = ctx.take_buffer(&[], true);
            ctx.report(
                DiagnosticKind::UnterminatedDeclaration,
                "declaration without a value",
                Some(text),
            );
        } else {
            ctx.clear_buffer();
        }
    }
}

/// Split a trailing, case-insensitive `!important` off a value
pub(super) fn split_important(value: &str) -> (String, bool) {
    let trimmed = value.trim();
    if let Some(cut) = trimmed.len().checked_sub(IMPORTANT.len()) {
        if trimmed.is_char_boundary(cut) && trimmed[cut..].eq_ignore_ascii_case(IMPORTANT) {
            return (trimmed[..cut].trim_end().to_string(), true);
        }
    }
    (trimmed.to_string(), false)
}
