//! Indented text rendering of nested values, for debug output.
//!
//! ```text
//! {
//!       a: 1,
//!       b: [
//!             2,
//!             3,
//!       ],
//! }
//! ```
//!
//! The output is for people reading logs; nothing parses it back.

use serde::Serialize;
use serde_json::{Number, Value};

use crate::error::BridgeError;

const DEFAULT_INDENT: &str = "      ";

/// Render `value` with the default six-space indentation.
pub fn render(value: &Value) -> String {
    TreePrinter::default().render(value)
}

/// Render any serializable value by way of its JSON form.
pub fn render_serialize<T: Serialize + ?Sized>(value: &T) -> Result<String, BridgeError> {
    let value = serde_json::to_value(value).map_err(BridgeError::Encode)?;
    Ok(render(&value))
}

#[derive(Debug, Clone)]
pub struct TreePrinter {
    indent: String,
}

impl Default for TreePrinter {
    fn default() -> Self {
        Self::with_indent(DEFAULT_INDENT)
    }
}

impl TreePrinter {
    pub fn with_indent(indent: &str) -> Self {
        Self {
            indent: indent.to_string(),
        }
    }

    pub fn render(&self, value: &Value) -> String {
        let mut out = String::new();
        self.write_node(&mut out, None, value, 0);
        out
    }

    fn write_node(&self, out: &mut String, key: Option<&str>, value: &Value, depth: usize) {
        let pad = self.indent.repeat(depth);
        out.push_str(&pad);
        if let Some(key) = key.filter(|k| !k.is_empty()) {
            out.push_str(key);
            out.push_str(": ");
        }

        match value {
            Value::Array(items) => {
                out.push_str("[\n");
                for item in items {
                    self.write_node(out, None, item, depth + 1);
                    out.push_str(",\n");
                }
                out.push_str(&pad);
                out.push(']');
            }
            Value::Object(fields) => {
                out.push_str("{\n");
                for (k, v) in fields {
                    self.write_node(out, Some(k), v, depth + 1);
                    out.push_str(",\n");
                }
                out.push_str(&pad);
                out.push('}');
            }
            Value::String(s) => out.push_str(s),
            Value::Number(n) => out.push_str(&js_number(n)),
            scalar => out.push_str(&scalar.to_string()),
        }
    }
}

/// Number text as JavaScript's `Number#toString` writes it: `2.0` is `2`,
/// `1e21` is `1e+21`.
fn js_number(n: &Number) -> String {
    if !n.is_f64() {
        return n.to_string();
    }
    let Some(f) = n.as_f64() else {
        return n.to_string();
    };
    if f == 0.0 {
        return "0".to_string();
    }

    // Shortest round-trip digits, e.g. `1.2345e2`.
    let sci = format!("{:e}", f.abs());
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return n.to_string();
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return n.to_string();
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let len = digits.len() as i32;
    // Decimal point position relative to the first digit.
    let point = exp + 1;

    let body = if len <= point && point <= 21 {
        format!("{digits}{}", "0".repeat((point - len) as usize))
    } else if 0 < point && point <= 21 {
        let (whole, frac) = digits.split_at(point as usize);
        format!("{whole}.{frac}")
    } else if -6 < point && point <= 0 {
        format!("0.{}{digits}", "0".repeat(-point as usize))
    } else {
        let (first, rest) = digits.split_at(1);
        let frac = if rest.is_empty() {
            String::new()
        } else {
            format!(".{rest}")
        };
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{first}{frac}e{sign}{}", exp.abs())
    };

    if f < 0.0 {
        format!("-{body}")
    } else {
        body
    }
}
