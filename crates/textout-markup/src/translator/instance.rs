//! Runtime state of one opened tag.

use std::sync::Arc;

use crate::{Tag, TagCapability};

/// Content tracking of an instance.
pub(super) enum Buffer {
    /// Only records whether anything was written inside.
    Flag(bool),
    /// Accumulates the whole content until the tag closes.
    Text(String),
}

/// An entry of the tag stack.
pub(super) struct TagInstance {
    pub(super) capability: Arc<TagCapability>,
    /// Alias used to open the tag; `None` for implicit paragraphs.
    pub(super) name: Option<String>,
    pub(super) value: Option<String>,
    /// Opening tag as written in the source.
    pub(super) literal: String,
    pub(super) hooks: Box<dyn Tag>,
    pub(super) started: bool,
    pub(super) buffer: Buffer,
    pub(super) generic: bool,
    pub(super) raw: bool,
    pub(super) superblock: bool,
    pub(super) inlined: bool,
}

impl TagInstance {
    pub(super) fn new(
        capability: Arc<TagCapability>,
        name: Option<String>,
        value: Option<String>,
        literal: String,
        hooks: Box<dyn Tag>,
    ) -> Self {
        let generic = name.is_some() && capability.is_generic();
        Self {
            buffer: Self::empty_buffer(&capability),
            generic,
            raw: capability.is_raw(),
            superblock: capability.is_superblock(),
            inlined: capability.is_inlined(),
            capability,
            name,
            value,
            literal,
            hooks,
            started: false,
        }
    }

    fn empty_buffer(capability: &TagCapability) -> Buffer {
        if capability.has_preprocess() {
            Buffer::Text(String::new())
        } else {
            Buffer::Flag(false)
        }
    }

    /// Forget that the tag was started; a rebuilt hook object replaces the
    /// current one.
    pub(super) fn reset(&mut self, hooks: Option<Box<dyn Tag>>) {
        if let Some(hooks) = hooks {
            self.hooks = hooks;
        }
        self.started = false;
        self.buffer = Self::empty_buffer(&self.capability);
    }

    pub(super) fn is_block(&self) -> bool {
        self.capability.is_block()
    }

    pub(super) fn is_implicit(&self) -> bool {
        self.name.is_none()
    }

    pub(super) fn is_accumulating(&self) -> bool {
        matches!(self.buffer, Buffer::Text(_))
    }

    pub(super) fn has_content(&self) -> bool {
        match &self.buffer {
            Buffer::Flag(written) => *written,
            Buffer::Text(text) => !text.is_empty(),
        }
    }

    /// Take the accumulated content, leaving the buffer empty.
    pub(super) fn take_content(&mut self) -> String {
        match &mut self.buffer {
            Buffer::Text(text) => std::mem::take(text),
            Buffer::Flag(_) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TagCall, TagError};

    struct Nothing;

    impl Tag for Nothing {}

    fn nothing(_: &TagCall<'_>) -> Result<Box<dyn Tag>, TagError> {
        Ok(Box::new(Nothing))
    }

    fn instance(capability: TagCapability, name: Option<&str>) -> TagInstance {
        TagInstance::new(
            Arc::new(capability),
            name.map(str::to_owned),
            None,
            String::new(),
            Box::new(Nothing),
        )
    }

    #[test]
    fn test_implicit_is_never_generic() {
        let named = instance(TagCapability::block(nothing), Some("[p]"));
        let implicit = instance(TagCapability::block(nothing), None);
        assert!(named.generic);
        assert!(!implicit.generic);
        assert!(implicit.is_implicit());
    }

    #[test]
    fn test_buffers() {
        let mut flag = instance(TagCapability::inline(nothing), Some("[b]"));
        assert!(!flag.is_accumulating());
        flag.buffer = Buffer::Flag(true);
        assert!(flag.has_content());
        assert_eq!(flag.take_content(), "");

        let mut text = instance(TagCapability::inline(nothing).preprocessing(), Some("[u]"));
        assert!(text.is_accumulating());
        text.buffer = Buffer::Text("abc".to_owned());
        assert!(text.has_content());
        assert_eq!(text.take_content(), "abc");
        assert!(!text.has_content());
    }

    #[test]
    fn test_reset() {
        let mut inst = instance(TagCapability::inline(nothing), Some("[b]"));
        inst.started = true;
        inst.buffer = Buffer::Flag(true);
        inst.reset(None);
        assert!(!inst.started);
        assert!(!inst.has_content());
    }
}
