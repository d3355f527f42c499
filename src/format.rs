//! Brace-style placeholder substitution for message templates.
//!
//! `{}` takes the next argument in order. A backslash in front of the
//! braces (`\{}`) keeps them literal without consuming an argument, and a
//! doubled backslash (`\\{}`) emits one backslash followed by the argument.
//! Surplus arguments are ignored; surplus placeholders are left as written.

use std::fmt::Write as _;

use crate::argument::Arg;

const DELIM: &str = "{}";
const ESCAPE: u8 = b'\\';

/// Substitute `args` into `template`.
pub fn format_message(template: &str, args: &[Arg]) -> String {
    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len() + args.len() * 8);
    let mut i = 0;
    let mut next = 0;

    while next < args.len() {
        let Some(offset) = template[i..].find(DELIM) else {
            break;
        };
        let j = i + offset;

        if is_escaped(bytes, j) {
            if is_double_escaped(bytes, j) {
                out.push_str(&template[i..j - 1]);
                let _ = write!(out, "{}", args[next]);
                next += 1;
                i = j + DELIM.len();
            } else {
                out.push_str(&template[i..j - 1]);
                out.push('{');
                i = j + 1;
            }
        } else {
            out.push_str(&template[i..j]);
            let _ = write!(out, "{}", args[next]);
            next += 1;
            i = j + DELIM.len();
        }
    }

    out.push_str(&template[i..]);
    out
}

fn is_escaped(bytes: &[u8], delim_start: usize) -> bool {
    delim_start >= 1 && bytes[delim_start - 1] == ESCAPE
}

fn is_double_escaped(bytes: &[u8], delim_start: usize) -> bool {
    delim_start >= 2 && bytes[delim_start - 2] == ESCAPE
}
