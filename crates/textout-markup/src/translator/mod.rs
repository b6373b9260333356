//! Translator facade.

mod instance;
mod session;

use std::io::{Read, Write};

use session::Session;

use crate::{
    CharSource, DEFAULT_BUFFER_CAPACITY, OutputFormat, ReadSource, StrSource, TagRegistry,
    Tokenizer, TranslateError, Tweaks,
};

/// Markup translator.
///
/// Holds the read-only configuration of translations: the tag registry, the
/// output dialect, host tweaks and the tokenizer buffer size. Every call to
/// [`Translator::translate`] runs an independent session, so one translator
/// can serve many documents, including from several threads at once.
///
/// # Example
///
/// ```
/// use textout_markup::{OutputFormat, Translator};
///
/// let translator = Translator::default();
/// let html = translator.translate_str("[b]Hello[/b], world").unwrap();
/// assert_eq!(html, "<p><b>Hello</b>, world</p>");
///
/// let text = translator
///     .clone()
///     .with_format(OutputFormat::Lightscript)
///     .translate_str("[b]Hello[/b], world")
///     .unwrap();
/// assert_eq!(text, "Hello, world");
/// ```
#[derive(Clone, Debug)]
pub struct Translator {
    registry: TagRegistry,
    format: OutputFormat,
    tweaks: Tweaks,
    buffer_capacity: usize,
}

impl Translator {
    /// Create a translator producing HTML with the given registry.
    #[must_use]
    pub fn new(registry: TagRegistry) -> Self {
        Self {
            registry,
            format: OutputFormat::default(),
            tweaks: Tweaks::new(),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }

    /// Set the output dialect.
    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the host tweaks.
    #[must_use]
    pub fn with_tweaks(mut self, tweaks: Tweaks) -> Self {
        self.tweaks = tweaks;
        self
    }

    /// Set the tokenizer buffer capacity, in characters.
    ///
    /// Tags longer than the buffer are written as text.
    #[must_use]
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn tweaks(&self) -> &Tweaks {
        &self.tweaks
    }

    pub fn buffer_capacity(&self) -> usize {
        self.buffer_capacity
    }

    /// Translate `source` into `sink` and return the sink.
    ///
    /// Only source and sink failures are reported; malformed markup is
    /// written back as text.
    pub fn translate<S, W>(&self, source: S, sink: W) -> Result<W, TranslateError>
    where
        S: CharSource,
        W: Write,
    {
        let tokenizer = Tokenizer::with_capacity(source, self.buffer_capacity)
            .with_specials(self.registry.special_symbols());
        let session = Session::new(&self.registry, &self.tweaks, self.format, sink);
        Ok(session.run(tokenizer)?)
    }

    /// Translate UTF-8 text read from `reader`.
    pub fn translate_reader<R, W>(&self, reader: R, sink: W) -> Result<W, TranslateError>
    where
        R: Read,
        W: Write,
    {
        self.translate(ReadSource::new(reader), sink)
    }

    /// Translate a string.
    pub fn translate_str(&self, input: &str) -> Result<String, TranslateError> {
        let output = self.translate(StrSource::new(input), Vec::with_capacity(input.len()))?;
        Ok(String::from_utf8(output)?)
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(TagRegistry::default())
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use pretty_assertions::assert_eq;
    use static_assertions::assert_impl_all;

    use super::*;
    use crate::{SmileyTable, Tag, TagCapability, TagError, tokenize};

    assert_impl_all!(Translator: Send, Sync, Clone);

    fn html(input: &str) -> String {
        Translator::default().translate_str(input).unwrap()
    }

    fn light(input: &str) -> String {
        Translator::default()
            .with_format(OutputFormat::Lightscript)
            .translate_str(input)
            .unwrap()
    }

    struct Element(String);

    impl Tag for Element {
        fn begin(&mut self) -> String {
            format!("<{}>", self.0)
        }

        fn end(&mut self) -> String {
            format!("</{}>", self.0)
        }
    }

    /// Registry with inline tags `[t0]` to `[t{n-1}]` rendering as `<t0>` and so on.
    fn numbered_tags(n: usize) -> TagRegistry {
        let mut registry = TagRegistry::empty();
        for i in 0..n {
            let name = format!("t{i}");
            registry.register(
                TagCapability::inline(move |_| Ok(Box::new(Element(name.clone()))))
                    .with_alias(&format!("[t{i}]")),
            );
        }
        registry
    }

    /// Check that every element opened in `markup` is closed in order.
    fn assert_balanced(markup: &str) {
        let mut stack = Vec::new();
        let mut rest = markup;
        while let Some(start) = rest.find('<') {
            let end = rest[start..].find('>').unwrap() + start;
            let tag = &rest[start + 1..end];
            if let Some(name) = tag.strip_prefix('/') {
                assert_eq!(stack.pop(), Some(name), "in {markup}");
            } else if !tag.ends_with('/') {
                stack.push(tag.split_whitespace().next().unwrap_or(tag));
            }
            rest = &rest[end + 1..];
        }
        assert!(stack.is_empty(), "unclosed {stack:?} in {markup}");
    }

    #[test]
    fn test_plain_text_round_trip() {
        let text = "Just some words, nothing else";
        assert_eq!(html(text), format!("<p>{text}</p>"));
        assert_eq!(light(text), text);
        assert_eq!(html("1 < 2 & \"x\""), "<p>1 &lt; 2 &amp; &quot;x&quot;</p>");
        assert_eq!(light("1 < 2 & \"x\""), "1 < 2 & \"x\"");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(html(""), "");
        assert_eq!(light(""), "");
    }

    #[test]
    fn test_balanced_nesting() {
        let translator =
            Translator::new(numbered_tags(6)).with_tweaks(Tweaks::new().with("inline", "1"));
        let inputs = [
            "[t0][t1][t2]x[/t2][/t1][/t0]",
            "[t0][t1][t2]x[/t0]y",
            "[t3]a[t4]b[/t3]c[/t4]",
            "[t0]a[t1]b[t2]c",
            "[t5][t5]x[/t5][/t5][/t5]",
            "[/t1][t1][/][/]",
        ];
        for input in inputs {
            assert_balanced(&translator.translate_str(input).unwrap());
        }
    }

    #[test]
    fn test_balanced_nesting_across_blocks() {
        let inputs = [
            "[b]a[quote]b[i]c[/quote]d",
            "[quote][quote][b]x\n\ny[/quote]z",
            "[center][b]x[/center][/b]",
            "a\n\n[spoiler][u]b\n\nc[/spoiler]",
        ];
        for input in inputs {
            assert_balanced(&html(input));
        }
    }

    #[test]
    fn test_auto_close() {
        assert_eq!(html("[b][i]x[/b]"), html("[b][i]x[/i][/b]"));
        assert_eq!(html("[b][i]x[/b]"), "<p><b><i>x</i></b></p>");
    }

    #[test]
    fn test_generic_close() {
        assert_eq!(html("[b]x[/]y"), "<p><b>x</b>y</p>");
        assert_eq!(html("x[/]"), "<p>x[/]</p>");
    }

    #[test]
    fn test_unmatched_closer_is_text() {
        assert_eq!(html("a[/b]c"), "<p>a[/b]c</p>");
    }

    #[test]
    fn test_unknown_tag_passthrough() {
        assert_eq!(html("[zzz]x[/zzz]"), "<p>[zzz]x[/zzz]</p>");
        assert_eq!(html("[b=1 2]x"), "<p><b>x</b></p>");
    }

    #[test]
    fn test_raw_mode_is_verbatim() {
        assert_eq!(
            html("`[b]x[/b] [quote] <y>`"),
            "<p><code>[b]x[/b] [quote] &lt;y&gt;</code></p>"
        );
        assert_eq!(light("[noeval][b]x[/b][/noeval]"), "[b]x[/b]");
    }

    #[test]
    fn test_invalid_value_rollback() {
        assert_eq!(html("[size=huge]x[/size]"), "<p>[size=huge]x[/size]</p>");
        assert_eq!(
            html("[color=#zzz][b]x[/b][/color]"),
            "<p>[color=#zzz]<b>x</b>[/color]</p>"
        );
    }

    #[test]
    fn test_end_of_stream_flush() {
        assert_eq!(html("[quote]hello"), "<blockquote><p>hello</p></blockquote>");
        assert_eq!(html("[b]open"), "<p><b>open</b></p>");
        assert_eq!(html("[url]http://x.org"), r#"<p><a href="http://x.org">http://x.org</a></p>"#);
    }

    #[test]
    fn test_paragraphs() {
        assert_eq!(html("abc\n\ndef"), "<p>abc</p><p>def</p>");
        assert_eq!(html("a\nb"), "<p>a<br />\nb</p>");
        assert_eq!(html("abc\r\n\r\ndef\r\n"), "<p>abc</p><p>def<br />\n</p>");
        assert_eq!(html("\n\nabc"), "<p>abc</p>");
        assert_eq!(html("[b]a\n\nb[/b]"), "<p><b>a</b></p><p><b>b</b></p>");
        assert_eq!(light("abc\n\ndef"), "abc\n\ndef");
    }

    #[test]
    fn test_literal_fallback_is_stable() {
        let inputs = [
            "[zzz]x[/zzz]",
            "a[/b]c",
            "[url]not a url[/url]",
            "[size=huge]x[/size]",
            "[img]nowhere[/img]",
        ];
        for input in inputs {
            let once = light(input);
            assert_eq!(once, input);
            assert_eq!(light(&once), once);
        }
    }

    #[test]
    fn test_output_independent_of_buffer_capacity() {
        // Longest tag below is 29 characters.
        let input = "[quote=Someone]Hello [b]bold [color=red]red[/color][/b]\n\n\
                     [url=http://example.org/page]a link[/url] `code [i]` \
                     [code=rust]fn main() {}[/code][img=10x10]https://x.org/a.png[/img]";
        let expected = html(input);
        for capacity in [32, 48, 64, 4096] {
            let translated = Translator::default()
                .with_buffer_capacity(capacity)
                .translate_str(input)
                .unwrap();
            assert_eq!(translated, expected, "capacity {capacity}");
        }
    }

    #[test]
    fn test_tokens_reassemble_input() {
        let input = "[b]x[/b] [zzz] `y` \n\n[/]";
        let units = tokenize(input);
        let literal: String = units.iter().map(crate::Unit::literal).collect();
        assert_eq!(literal, input);
    }

    #[test]
    fn test_inline_mode() {
        let translator = Translator::default().with_tweaks(Tweaks::new().with("Inline", "yes"));
        assert_eq!(
            translator.translate_str("[b]a[/b]\n\n[quote]b[/quote]").unwrap(),
            "<b>a</b><br />\n<br />\n[quote]b[/quote]"
        );
    }

    #[test]
    fn test_smileys_from_registry() {
        let registry = TagRegistry::default()
            .with_smileys(SmileyTable::new().with(":)", "/smile.gif"));
        let translator = Translator::new(registry);
        assert_eq!(
            translator.translate_str("hi :) http://x.org/:)b :)").unwrap(),
            "<p>hi <img src=\"/smile.gif\" alt=\":)\" class=\"smiley\" /> \
             <a href=\"http://x.org/:)b\">http://x.org/:)b</a> \
             <img src=\"/smile.gif\" alt=\":)\" class=\"smiley\" /></p>"
        );
    }

    #[test]
    fn test_translate_reader() {
        let input = "[i]caf\u{e9}[/i]".as_bytes();
        let output = Translator::default()
            .translate_reader(input, Vec::new())
            .unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "<p><i>caf\u{e9}</i></p>");
    }

    #[test]
    fn test_sink_error_is_reported() {
        #[derive(Debug)]
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("disk full"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let err = Translator::default()
            .translate(StrSource::new("text"), Broken)
            .unwrap_err();
        assert!(matches!(err, TranslateError::Io(_)));
    }

    #[test]
    fn test_custom_paragraph() {
        let registry = TagRegistry::default().with_paragraph(
            TagCapability::block(|_| Ok(Box::new(Element("div".to_owned()))))
                .with_generic(false)
                .notempty(),
        );
        assert_eq!(
            Translator::new(registry).translate_str("a\n\nb").unwrap(),
            "<div>a</div><div>b</div>"
        );
    }

    /// Element that rejects content containing "bad".
    struct Checked;

    impl Tag for Checked {
        fn begin(&mut self) -> String {
            "<t>".to_owned()
        }

        fn end(&mut self) -> String {
            "</t>".to_owned()
        }

        fn preprocess(&mut self, content: &str) -> Result<Option<String>, TagError> {
            if content.contains("bad") {
                Err(TagError::InvalidContent(content.to_owned()))
            } else {
                Ok(None)
            }
        }
    }

    fn with_tag(capability: TagCapability) -> Translator {
        Translator::new(TagRegistry::default().with_tag(capability))
    }

    #[test]
    fn test_notempty_tag() {
        let translator = with_tag(
            TagCapability::inline(|_| Ok(Box::new(Element("n".to_owned()))))
                .with_alias("[n]")
                .notempty(),
        );
        assert_eq!(translator.translate_str("a[n][/n]b").unwrap(), "<p>ab</p>");
        assert_eq!(
            translator.translate_str("a[n]x[/n]b").unwrap(),
            "<p>a<n>x</n>b</p>"
        );
    }

    #[test]
    fn test_notempty_preprocessing_tag() {
        let translator = with_tag(
            TagCapability::inline(|_| Ok(Box::new(Element("t".to_owned()))))
                .with_alias("[t]")
                .preprocessing()
                .notempty(),
        );
        assert_eq!(translator.translate_str("a[t][/t]b").unwrap(), "<p>ab</p>");
        assert_eq!(
            translator.translate_str("a[t]x[/t]b").unwrap(),
            "<p>a<t>x</t>b</p>"
        );
    }

    #[test]
    fn test_cooked_preprocessing_tag() {
        let translator = with_tag(
            TagCapability::inline(|_| Ok(Box::new(Checked)))
                .with_alias("[t]")
                .preprocessing()
                .with_raw(false),
        );
        assert_eq!(
            translator.translate_str("a[t]ok [b]y[/b] <z>[/t]b").unwrap(),
            "<p>a<t>ok <b>y</b> &lt;z&gt;</t>b</p>"
        );
        // Rejected content was filtered once while buffered.
        assert_eq!(
            translator.translate_str("a[t]bad [b]y[/b] <z>[/t]b").unwrap(),
            "<p>a[t]bad <b>y</b> &lt;z&gt;[/t]b</p>"
        );
    }

    #[test]
    fn test_inlined_superblock_stays_in_paragraph() {
        let mut registry = TagRegistry::default();
        registry
            .register(
                TagCapability::block(|_| Ok(Box::new(Element("w".to_owned()))))
                    .with_alias("[w]")
                    .superblock()
                    .inlined(),
            )
            .register(
                TagCapability::block(|_| Ok(Box::new(Element("d".to_owned()))))
                    .with_alias("[d]"),
            );
        let translator = Translator::new(registry);

        assert_eq!(
            translator.translate_str("a[w]x[/w]b").unwrap(),
            "<p>a<w>x</w>b</p>"
        );
        assert_eq!(
            translator.translate_str("[w][d]x[/d]y[/w]").unwrap(),
            "<p><w><d>x</d>y</w></p>"
        );
        // A plain superblock ends the paragraph instead.
        assert_eq!(
            html("a[quote]x[/quote]b"),
            "<p>a</p><blockquote><p>x</p></blockquote><p>b</p>"
        );
    }

    #[test]
    fn test_registered_special() {
        let translator = with_tag(
            TagCapability::inline(|_| Ok(Box::new(Element("m".to_owned())))).with_alias("$"),
        );
        assert_eq!(translator.translate_str("a$x$b").unwrap(), "<p>a<m>x</m>b</p>");
        assert_eq!(html("a$x$b"), "<p>a$x$b</p>");
    }

    #[test]
    fn test_deeply_nested_unclosed_tags() {
        let depth = 2000;
        let output = html(&"[b]x".repeat(depth));
        let expected = format!("<p>{}{}</p>", "<b>x".repeat(depth), "</b>".repeat(depth));
        assert_eq!(output, expected);
    }
}
