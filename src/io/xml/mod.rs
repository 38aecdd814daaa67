//! Persisted geometry in XML form.
//!
//! A `<geometry>` document holds flat, order-insensitive records:
//! `<cell>` elements tagged with the ID of the universe they belong to,
//! `<universe>` elements for names and empty universes,
//! `<dagmc_universe>` elements for mesh-backed universes, plus the
//! `<lattice>` and `<surface>` elements the cells reference.

mod reader;
mod writer;

pub use reader::{GeometryXmlReader, XmlGeometry};
pub use writer::{GeometryXmlWriter, XmlMemo};

use std::borrow::Cow;

fn escape(value: &str) -> Cow<'_, str> {
    if !value.contains(|c: char| matches!(c, '&' | '<' | '>' | '"' | '\'')) {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn join<T: std::fmt::Display>(values: impl IntoIterator<Item = T>) -> String {
    values
        .into_iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
