//! Translation engine.
//!
//! A session owns the tag stack and the pending text group of one document.
//! Text is routed, run by run, to the innermost instance that wants it:
//! instances only tracking whether they received content get their flag set,
//! and the first accumulating instance receives the text itself. When no
//! instance accumulates, the text goes to the sink, after the pending tags
//! have been started.
//!
//! Starting tags is lazy. Opening a tag only records it; its opening markup
//! is written when content first reaches it (or immediately when it is not
//! `notempty`), and starting a new block first ends the started block at the
//! same level together with the inline tags inside it. Those are reset and
//! reopened in the new block when content arrives.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::mem;
use std::sync::Arc;

use super::instance::{Buffer, TagInstance};
use crate::text::{escape_html, render_text};
use crate::{CharSource, OutputFormat, Tag, TagCall, TagCapability, TagError, TagRegistry};
use crate::{Tokenizer, Tweaks, Unit};

/// How content is transformed before it is written or buffered.
#[derive(Clone, Copy, Debug)]
enum Processing {
    /// Text filter of the output dialect.
    Text,
    /// Already-rendered markup.
    Code,
}

/// Routing options for [`Session::add_text`].
#[derive(Clone, Copy, Debug)]
struct Emit {
    start_tags: bool,
    flush_text: bool,
    superblocks_only: bool,
    next_block_is_super: bool,
    skip_first: bool,
}

impl Emit {
    const CODE: Self = Self {
        start_tags: true,
        flush_text: true,
        superblocks_only: true,
        next_block_is_super: false,
        skip_first: false,
    };

    const TEXT: Self = Self {
        superblocks_only: false,
        ..Self::CODE
    };

    /// Closing markup is written without starting anything.
    const CLOSE: Self = Self {
        start_tags: false,
        ..Self::CODE
    };
}

pub(super) struct Session<'a, W> {
    registry: &'a TagRegistry,
    tweaks: &'a Tweaks,
    format: OutputFormat,
    sink: W,
    /// Index 0 is the innermost instance.
    stack: VecDeque<TagInstance>,
    /// Open content-replacing tags; text is dropped while non-zero.
    ignoring: usize,
    text_group: String,
    raw_mode: bool,
    /// Re-openings of the raw tag that still need their own closer.
    raw_depth: usize,
    inline_mode: bool,
}

impl<'a, W: Write> Session<'a, W> {
    pub(super) fn new(
        registry: &'a TagRegistry,
        tweaks: &'a Tweaks,
        format: OutputFormat,
        sink: W,
    ) -> Self {
        Self {
            registry,
            tweaks,
            format,
            sink,
            stack: VecDeque::new(),
            ignoring: 0,
            text_group: String::new(),
            raw_mode: false,
            raw_depth: 0,
            inline_mode: tweaks.flag("inline"),
        }
    }

    /// Translate every unit of `tokenizer`, then close what is left open.
    pub(super) fn run<S: CharSource>(mut self, mut tokenizer: Tokenizer<S>) -> io::Result<W> {
        if !self.inline_mode
            && let Some(paragraph) = self.paragraph()
        {
            self.push_tag(paragraph, true)?;
        }

        while let Some(unit) = tokenizer.next_unit()? {
            self.feed(unit)?;
        }

        while !self.stack.is_empty() {
            self.pop_tag("")?;
        }
        self.flush_text()?;
        self.sink.flush()?;
        Ok(self.sink)
    }

    fn feed(&mut self, unit: Unit) -> io::Result<()> {
        match unit {
            Unit::Text { text } => {
                self.put_text(&text);
                Ok(())
            }
            Unit::Newline => self.put_newline(),
            Unit::ParagraphBreak { literal } => self.paragraph_break(&literal),
            Unit::Begin {
                name,
                value,
                literal,
            } => self.open(&name, value, literal, false),
            Unit::End { name, literal } => {
                if !self.close(&name, &literal)? {
                    tracing::debug!(tag = %literal, "Unmatched closing tag, kept as text");
                    self.put_text(&literal);
                }
                Ok(())
            }
            Unit::Special { symbol } => {
                if self.close(&symbol, &symbol)? {
                    Ok(())
                } else {
                    self.open(&symbol, None, symbol.clone(), true)
                }
            }
        }
    }

    /// Handle a closer. Returns false when nothing on the stack matches.
    fn close(&mut self, name: &str, literal: &str) -> io::Result<bool> {
        let generic = name.is_empty();

        if self.raw_mode {
            let closes_top = self.stack.front().is_some_and(|top| {
                top.name.as_deref() == Some(name) || (generic && top.generic)
            });
            if !closes_top {
                self.put_text(literal);
                return Ok(true);
            }
            if self.raw_depth > 0 {
                self.raw_depth -= 1;
                self.put_text(literal);
                return Ok(true);
            }
        }

        let position = if generic {
            self.stack.iter().position(|inst| inst.generic)
        } else {
            self.stack
                .iter()
                .position(|inst| inst.name.as_deref() == Some(name))
        };
        let Some(position) = position else {
            return Ok(false);
        };

        for _ in 0..position {
            self.pop_tag("")?;
        }
        self.pop_tag(literal)?;
        Ok(true)
    }

    /// Handle an opener (or a special that closed nothing).
    fn open(
        &mut self,
        name: &str,
        value: Option<String>,
        literal: String,
        special: bool,
    ) -> io::Result<()> {
        if self.raw_mode {
            if self
                .stack
                .front()
                .is_some_and(|top| top.name.as_deref() == Some(name))
            {
                self.raw_depth += 1;
            }
            self.put_text(&literal);
            return Ok(());
        }

        let resolved = if special {
            self.registry.resolve_special(name)
        } else {
            self.registry.resolve(name)
        };
        let Some(capability) = resolved.map(Arc::clone) else {
            tracing::debug!(tag = %literal, "Unknown tag, kept as text");
            self.put_text(&literal);
            return Ok(());
        };

        if self.inline_mode && capability.is_block() {
            tracing::debug!(tag = %literal, "Block tag in inline mode, kept as text");
            self.put_text(&literal);
            return Ok(());
        }

        let value = match value {
            Some(value) if capability.processes_value() => Some(self.process_text(&value)),
            value => value,
        };

        let hooks = match self.prepare(&capability, name, value.as_deref()) {
            Ok(hooks) => hooks,
            Err(err) => {
                tracing::debug!(tag = %literal, error = %err, "Tag rejected, kept as text");
                self.put_text(&literal);
                return Ok(());
            }
        };

        let instance = TagInstance::new(capability, Some(name.to_owned()), value, literal, hooks);
        let wraps = instance.is_block() && instance.superblock && !instance.raw && !instance.inlined;

        // Tags are started once both the superblock and its paragraph are in.
        self.push_tag(instance, !wraps)?;
        if wraps {
            match self.paragraph() {
                Some(paragraph) => self.push_tag(paragraph, true)?,
                None => self.start_tags()?,
            }
        }
        Ok(())
    }

    fn paragraph_break(&mut self, literal: &str) -> io::Result<()> {
        if self.raw_mode {
            self.put_text(literal);
            return Ok(());
        }
        if self.ignoring > 0 {
            return Ok(());
        }

        self.flush_text()?;

        let block = self.stack.iter().position(TagInstance::is_block);
        let splits = self.format.is_html()
            && block.is_some_and(|idx| {
                self.stack[idx].is_implicit()
                    && !self.stack.iter().take(idx).any(TagInstance::is_accumulating)
            });

        match block {
            Some(idx) if splits => {
                if self.stack[idx].started {
                    self.end_started(0..=idx)?;
                }
                Ok(())
            }
            _ => {
                for _ in literal.chars() {
                    self.put_newline()?;
                }
                Ok(())
            }
        }
    }

    /// End and reset the started instances in `range`, innermost first.
    fn end_started(&mut self, range: std::ops::RangeInclusive<usize>) -> io::Result<()> {
        for idx in range {
            if !self.stack[idx].started {
                continue;
            }
            let end = self.stack[idx].hooks.end();
            self.put_code(&end, Emit::CLOSE)?;
            self.reset_instance(idx);
        }
        Ok(())
    }

    fn prepare(
        &self,
        capability: &TagCapability,
        name: &str,
        value: Option<&str>,
    ) -> Result<Box<dyn Tag>, TagError> {
        capability.prepare(&TagCall {
            name,
            value,
            format: self.format,
            tweaks: self.tweaks,
            media: self.registry.media(),
            smileys: self.registry.smileys(),
        })
    }

    /// Fresh implicit paragraph instance.
    fn paragraph(&self) -> Option<TagInstance> {
        let capability = Arc::clone(self.registry.paragraph());
        match self.prepare(&capability, "", None) {
            Ok(hooks) => Some(TagInstance::new(capability, None, None, String::new(), hooks)),
            Err(err) => {
                tracing::warn!(error = %err, "Paragraph tag rejected, content left unwrapped");
                None
            }
        }
    }

    /// Rebuild the hooks of an instance and forget it was started.
    fn reset_instance(&mut self, idx: usize) {
        let inst = &self.stack[idx];
        let hooks = match self.prepare(
            &inst.capability,
            inst.name.as_deref().unwrap_or_default(),
            inst.value.as_deref(),
        ) {
            Ok(hooks) => Some(hooks),
            Err(err) => {
                tracing::debug!(tag = %inst.literal, error = %err, "Tag could not be rebuilt");
                None
            }
        };
        self.stack[idx].reset(hooks);
    }

    // ---
    // Output.
    // ---

    fn process_text(&self, text: &str) -> String {
        if !self.format.is_html() {
            text.to_owned()
        } else if self.raw_mode {
            escape_html(text)
        } else {
            render_text(text, self.registry.smileys().as_ref())
        }
    }

    fn process(&self, text: &str, processing: Processing) -> String {
        match processing {
            Processing::Text => self.process_text(text),
            Processing::Code => text.to_owned(),
        }
    }

    fn put_text(&mut self, text: &str) {
        if self.ignoring == 0 {
            self.text_group.push_str(text);
        }
    }

    fn flush_text(&mut self) -> io::Result<()> {
        if self.text_group.is_empty() || self.ignoring > 0 {
            return Ok(());
        }
        let text = mem::take(&mut self.text_group);
        self.add_text(&text, Processing::Text, Emit::TEXT)
    }

    fn put_code(&mut self, code: &str, emit: Emit) -> io::Result<()> {
        if emit.flush_text {
            self.flush_text()?;
        }
        if code.is_empty() || self.ignoring > 0 {
            return Ok(());
        }
        self.add_text(code, Processing::Code, emit)
    }

    fn put_newline(&mut self) -> io::Result<()> {
        let newline = if self.format.is_html() && !self.raw_mode {
            "<br />\n"
        } else {
            "\n"
        };
        self.put_code(newline, Emit::CODE)
    }

    /// Route content to the stack, or to the sink when no tag buffers it.
    fn add_text(&mut self, text: &str, processing: Processing, emit: Emit) -> io::Result<()> {
        let mut target = None;
        let mut block_found = false;
        let mut next_block_is_super = emit.next_block_is_super;
        let mut skip_first = emit.skip_first;

        for (idx, inst) in self.stack.iter_mut().enumerate() {
            if inst.is_block() {
                if inst.superblock || next_block_is_super || (!emit.superblocks_only && !block_found)
                {
                    block_found = true;
                    next_block_is_super = inst.inlined;
                } else {
                    continue;
                }
            }

            if skip_first {
                skip_first = false;
                continue;
            }

            match &mut inst.buffer {
                Buffer::Flag(written) => *written = true,
                Buffer::Text(_) => {
                    target = Some(idx);
                    break;
                }
            }
        }

        if emit.start_tags {
            self.start_tags()?;
        }

        match target {
            Some(idx) => {
                let content = if self.stack[idx].raw {
                    text.to_owned()
                } else {
                    self.process(text, processing)
                };
                if let Buffer::Text(buffer) = &mut self.stack[idx].buffer {
                    buffer.push_str(&content);
                }
            }
            None => {
                let content = self.process(text, processing);
                self.sink.write_all(content.as_bytes())?;
            }
        }
        Ok(())
    }

    // ---
    // Stack management.
    // ---

    fn push_tag(&mut self, instance: TagInstance, start: bool) -> io::Result<()> {
        self.flush_text()?;

        tracing::trace!(
            tag = instance.name.as_deref().unwrap_or("<paragraph>"),
            depth = self.stack.len(),
            "Push tag"
        );

        let ignores = instance.capability.ignores_content();
        let raw = instance.raw;
        self.stack.push_front(instance);

        if start {
            self.start_tags()?;
        }
        if ignores {
            self.ignoring += 1;
        }
        if raw {
            self.raw_mode = true;
            self.raw_depth = 0;
        }
        Ok(())
    }

    /// Pop the innermost instance; `end` is its closer as written, if any.
    fn pop_tag(&mut self, end: &str) -> io::Result<()> {
        if self.stack.is_empty() {
            return Ok(());
        }
        self.flush_text()?;
        let Some(mut inst) = self.stack.pop_front() else {
            return Ok(());
        };

        tracing::trace!(
            tag = inst.name.as_deref().unwrap_or("<paragraph>"),
            depth = self.stack.len(),
            "Pop tag"
        );

        let emit = Emit {
            superblocks_only: inst.is_block(),
            next_block_is_super: inst.inlined,
            ..Emit::CODE
        };

        if inst.capability.has_preprocess() {
            self.finish_accumulated(&mut inst, end, emit)?;
        } else if inst.capability.ignores_content() {
            self.ignoring = self.ignoring.saturating_sub(1);
            let content = inst.hooks.content();
            self.put_code(&content, emit)?;
        } else if inst.capability.has_default() {
            self.finish_with_default(&mut inst, end, emit)?;
        }

        if inst.started {
            if inst.is_block() {
                self.close_inline_tags()?;
            }
            let end_code = inst.hooks.end();
            self.put_code(
                &end_code,
                Emit {
                    start_tags: false,
                    ..emit
                },
            )?;
        }

        if inst.raw {
            // Literal fallback text is still filtered as raw content.
            self.flush_text()?;
            self.raw_mode = false;
        }
        Ok(())
    }

    /// Validate and render the content of a preprocessing tag.
    ///
    /// On rejection, the opener, the raw content and the closer are written
    /// back as text and the instance stays unstarted.
    fn finish_accumulated(&mut self, inst: &mut TagInstance, end: &str, emit: Emit) -> io::Result<()> {
        let mut content = inst.take_content();

        if content.is_empty() && inst.capability.has_default() {
            match inst.hooks.default_content() {
                Ok(default) => content = default,
                Err(err) => {
                    tracing::debug!(tag = %inst.literal, error = %err, "Empty tag rejected, kept as text");
                    return self.roll_back(inst, "", end);
                }
            }
        }

        let content = match inst.hooks.preprocess(&content) {
            Ok(Some(replaced)) => replaced,
            Ok(None) => content,
            Err(err) => {
                tracing::debug!(tag = %inst.literal, error = %err, "Tag content rejected, kept as text");
                return self.roll_back(inst, &content, end);
            }
        };

        let replaced = inst
            .capability
            .replaces_content()
            .then(|| inst.hooks.content());
        let body = replaced.as_deref().unwrap_or(&content);
        if inst.capability.is_notempty() && body.is_empty() {
            tracing::debug!(tag = %inst.literal, "Empty tag dropped");
            return Ok(());
        }

        let begin = inst.hooks.begin();
        self.put_code(&begin, emit)?;
        inst.started = true;

        match replaced {
            Some(replaced) => self.put_code(&replaced, emit),
            None if inst.raw => {
                self.put_text(&content);
                Ok(())
            }
            None => self.put_code(&content, emit),
        }
    }

    fn roll_back(&mut self, inst: &TagInstance, content: &str, end: &str) -> io::Result<()> {
        self.put_text(&inst.literal);
        if inst.raw {
            self.put_text(content);
        } else {
            // Cooked content was already filtered when it was buffered.
            self.put_code(content, Emit::TEXT)?;
        }
        self.put_text(end);
        Ok(())
    }

    /// Write the default content of a tag that received nothing.
    fn finish_with_default(&mut self, inst: &mut TagInstance, end: &str, emit: Emit) -> io::Result<()> {
        if !inst.started {
            let begin = inst.hooks.begin();
            self.put_code(&begin, emit)?;
            inst.started = true;
        }

        if !inst.has_content() {
            match inst.hooks.default_content() {
                Ok(default) => self.put_text(&default),
                Err(err) => {
                    tracing::debug!(tag = %inst.literal, error = %err, "Empty tag rejected, kept as text");
                    self.put_text(&inst.literal);
                    self.put_text(end);
                }
            }
        }
        Ok(())
    }

    /// Start the pending instances that content is about to reach.
    ///
    /// Starting a new block ends the started block at the same level first,
    /// with the inline instances around it.
    fn start_tags(&mut self) -> io::Result<()> {
        let mut superblocks = Vec::new();
        let mut block_to_start = None;
        let mut block_to_end = None;
        let mut inlines = Vec::new();
        let mut next_block_is_super = false;

        for (idx, inst) in self.stack.iter().enumerate() {
            if idx > 0 && inst.is_accumulating() {
                break;
            }

            if !inst.is_block() {
                inlines.push(idx);
            } else if (block_to_start.is_some() && inst.superblock) || next_block_is_super {
                superblocks.push(idx);
                next_block_is_super = inst.inlined;
            } else if inst.started {
                block_to_end = Some(idx);
                next_block_is_super = inst.inlined;
            } else if block_to_end.is_none() && block_to_start.is_none() {
                block_to_start = Some(idx);
                next_block_is_super = inst.inlined;
            }
        }

        // Collected top first; begin from the bottom of the stack.
        superblocks.reverse();
        inlines.reverse();

        if block_to_start.is_none() {
            block_to_end = None;
        }

        if let Some(ending) = block_to_end {
            for idx in inlines.iter().rev().copied().chain([ending]) {
                if !self.stack[idx].started {
                    continue;
                }
                let end = self.stack[idx].hooks.end();
                self.put_code(
                    &end,
                    Emit {
                        skip_first: true,
                        ..Emit::CLOSE
                    },
                )?;
                self.reset_instance(idx);
            }
        }

        let to_begin = superblocks.into_iter().chain(block_to_start).chain(inlines);
        for idx in to_begin {
            let inst = &self.stack[idx];
            // Accumulating instances are begun once their content is accepted.
            if inst.started || inst.is_accumulating() {
                continue;
            }
            if inst.capability.is_notempty() && !inst.has_content() {
                break;
            }

            let begin = self.stack[idx].hooks.begin();
            self.put_code(
                &begin,
                Emit {
                    start_tags: false,
                    flush_text: false,
                    skip_first: idx == 0,
                    ..Emit::CODE
                },
            )?;
            self.stack[idx].started = true;
        }
        Ok(())
    }

    /// End the started inline instances; a block is closing around them.
    fn close_inline_tags(&mut self) -> io::Result<()> {
        for idx in 0..self.stack.len() {
            let inst = &self.stack[idx];
            if inst.is_block() || !inst.started {
                continue;
            }
            let end = self.stack[idx].hooks.end();
            self.put_code(&end, Emit::CLOSE)?;
            self.reset_instance(idx);
        }
        Ok(())
    }
}
