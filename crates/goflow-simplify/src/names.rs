use std::ops::ControlFlow;

use goflow_ast::{
    File, Ident, Span,
    visit::{Visitor, walk_file},
};

use crate::diag::{DiagCtx, OptionExt};

/// Mints the `_<n>` temporaries of one compilation unit.
///
/// Numbering starts above the largest `_<n>` already spelled
/// anywhere in the unit, so minted names cannot shadow or capture
/// a source identifier.
#[derive(Clone, Debug)]
pub(crate) struct FreshNames {
    last: u32,
}

impl FreshNames {
    /// Reserves every `_<n>` that appears in `file`.
    pub fn above(file: &File) -> Self {
        struct MaxTemp(u32);

        impl<'ast> Visitor<'ast> for MaxTemp {
            type Break = ();

            fn visit_ident(&mut self, ident: &'ast Ident) -> ControlFlow<()> {
                if let Some(n) = temp_index(&ident.name) {
                    self.0 = self.0.max(n);
                }
                ControlFlow::Continue(())
            }
        }

        let mut max = MaxTemp(0);
        let _ = walk_file(&mut max, file);
        Self { last: max.0 }
    }

    /// Returns the next unused name.
    pub fn next(&mut self, dcx: &DiagCtx, span: Span) -> Ident {
        self.last = self
            .last
            .checked_add(1)
            .unwrap_or_bug(dcx, "ran out of temporary names");
        Ident::new(format!("_{}", self.last), span)
    }
}

fn temp_index(name: &str) -> Option<u32> {
    let digits = name.strip_prefix('_')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Too large to ever be minted.
    digits.parse().ok()
}
