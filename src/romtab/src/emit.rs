//! Event macro emission.
//!
//! Each table gets one parametrized macro covering a full row. Consecutive
//! columns that share a code width collapse into a single width-keyword
//! chunk, so the definition stays as short as the declared column order
//! allows; columns are never reordered to improve the grouping.

use crate::codec::CodeWidth;
use crate::layout::TableLayout;

/// Replace every character outside `[0-9A-Za-z_]` with `_`, yielding a
/// usable event identifier
pub fn sanitize_identifier(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Parametrized macro covering one table row
#[derive(Debug, Clone)]
pub struct RowMacro {
    name: String,
    args: Vec<String>,
    codes: Vec<String>,
}

impl RowMacro {
    /// Build the macro for a layout's column list.
    pub fn for_layout(name: &str, layout: &TableLayout) -> Self {
        let mut args = Vec::with_capacity(layout.columns.len());
        let mut codes: Vec<String> = Vec::new();
        let mut current_width = None;

        for (i, field) in layout.columns.iter().enumerate() {
            let arg = format!("__arg{:03}", i);
            let width = CodeWidth::for_field(field);

            // a width change starts a new code chunk
            match codes.last_mut() {
                Some(chunk) if current_width == Some(width) => {
                    chunk.push(' ');
                    chunk.push_str(&arg);
                }
                _ => {
                    current_width = Some(width);
                    codes.push(format!("{} {}", width.keyword(), arg));
                }
            }
            args.push(arg);
        }

        RowMacro {
            name: name.to_string(),
            args,
            codes,
        }
    }

    /// Macro name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `#define` line for this macro
    pub fn definition(&self) -> String {
        format!(
            "#define {}({}) \"{}\"",
            self.name,
            self.args.join(","),
            self.codes.join(";")
        )
    }

    /// One invocation line from per-column encoded entries
    pub fn invoke(&self, entries: &[String]) -> String {
        format!("{}({})", self.name, entries.join(","))
    }
}
