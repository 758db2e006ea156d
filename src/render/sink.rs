//! Output sinks for rendered markup.
//!
//! Renderers never build pages themselves; they push fragments into a
//! `Sink`. `raw` appends markup as is, `text` appends user-derived text with
//! HTML escaping. Implementations:
//! - `String`: in-memory string builder
//! - `WriteSink`: any `io::Write` stream (stdout, files)
//! - `routes::HtmlBody`: HTTP response body

use std::borrow::Cow;
use std::io::Write;

use crate::error::Result;

pub trait Sink {
    /// Append markup verbatim.
    fn raw(&mut self, s: &str) -> Result<()>;

    /// Append text, escaping HTML special characters.
    fn text(&mut self, s: &str) -> Result<()> {
        self.raw(&escape_html(s))
    }
}

impl Sink for String {
    fn raw(&mut self, s: &str) -> Result<()> {
        self.push_str(s);
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn raw(&mut self, s: &str) -> Result<()> {
        (**self).raw(s)
    }

    fn text(&mut self, s: &str) -> Result<()> {
        (**self).text(s)
    }
}

/// Sink over an `io::Write` stream.
pub struct WriteSink<W: Write> {
    inner: W,
}

impl<W: Write> WriteSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Sink for WriteSink<W> {
    fn raw(&mut self, s: &str) -> Result<()> {
        self.inner.write_all(s.as_bytes())?;
        Ok(())
    }
}

/// Escape `&`, `<`, `>`, `"` and `'`. Borrows when nothing needs escaping.
pub fn escape_html(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Relative link with a URL-encoded query string, e.g. `blame?path=a%2Fb`.
pub fn href(base: &str, params: &[(&str, &str)]) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        query.append_pair(key, value);
    }
    let query = query.finish();
    if query.is_empty() {
        base.to_string()
    } else {
        format!("{}?{}", base, query)
    }
}

/// `<a href="...">text</a>` with both parts escaped.
pub fn link<S: Sink + ?Sized>(sink: &mut S, href: &str, text: &str) -> Result<()> {
    sink.raw("<a href=\"")?;
    sink.text(href)?;
    sink.raw("\">")?;
    sink.text(text)?;
    sink.raw("</a>")
}
