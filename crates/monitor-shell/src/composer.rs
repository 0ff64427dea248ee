//! Inserting text into the composer at the cursor with spacing normalized
//! around the insertion point.

use std::sync::{Arc, Mutex, PoisonError};

use crate::deferred::DeferredQueue;

/// Selection offsets are byte offsets into the draft text.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SelectionRange {
    pub start: usize,
    pub end: usize,
}

impl SelectionRange {
    pub const fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }
}

/// The composer control as seen from the shell.
pub trait ComposerTextarea: Send {
    /// `None` when the control cannot report a selection.
    fn selection(&self) -> Option<SelectionRange>;
    fn focus(&mut self);
    fn set_selection_range(&mut self, start: usize, end: usize);
    /// Notify listeners that the selection moved.
    fn emit_select(&mut self);
}

/// Nullable shared handle to the mounted composer control.
#[derive(Clone, Default)]
pub struct ComposerRef {
    slot: Arc<Mutex<Option<Box<dyn ComposerTextarea>>>>,
}

impl ComposerRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, textarea: impl ComposerTextarea + 'static) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(Box::new(textarea));
    }

    pub fn detach(&self) -> Option<Box<dyn ComposerTextarea>> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn is_attached(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Runs `f` against the mounted control, if any.
    pub fn with<R>(&self, f: impl FnOnce(&mut dyn ComposerTextarea) -> R) -> Option<R> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        let textarea = slot.as_deref_mut()?;
        Some(f(textarea))
    }

    pub fn focus(&self) -> bool {
        self.with(|textarea| textarea.focus()).is_some()
    }

    pub fn selection(&self) -> Option<SelectionRange> {
        self.with(|textarea| textarea.selection()).flatten()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ComposerSplice {
    pub text: String,
    /// Caret position right after the inserted text and any trailing space.
    pub cursor: usize,
    pub leading_space: bool,
    pub trailing_space: bool,
}

/// Replaces `selection` (end of text when absent) with `insert`, adding a space
/// on either side only where the neighbouring text is non-empty and not already
/// whitespace.
pub fn splice_insert(text: &str, selection: Option<SelectionRange>, insert: &str) -> ComposerSplice {
    let (start, end) = match selection {
        Some(range) => {
            let start = clamp_to_char_boundary(text, range.start);
            let end = clamp_to_char_boundary(text, range.end);
            (start.min(end), start.max(end))
        }
        None => (text.len(), text.len()),
    };

    let before = &text[..start];
    let after = &text[end..];
    let leading_space = before.chars().next_back().is_some_and(|ch| !ch.is_whitespace());
    let trailing_space = after.chars().next().is_some_and(|ch| !ch.is_whitespace());

    let mut next = String::with_capacity(text.len() + insert.len() + 2);
    next.push_str(before);
    if leading_space {
        next.push(' ');
    }
    next.push_str(insert);
    if trailing_space {
        next.push(' ');
    }
    let cursor = next.len();
    next.push_str(after);

    ComposerSplice {
        text: next,
        cursor,
        leading_space,
        trailing_space,
    }
}

fn clamp_to_char_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while offset > 0 && !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

pub struct ComposerInsert {
    enabled: bool,
    textarea: ComposerRef,
    next_frame: DeferredQueue,
}

impl ComposerInsert {
    pub fn new(textarea: ComposerRef, next_frame: DeferredQueue) -> Self {
        Self {
            enabled: true,
            textarea,
            next_frame,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Splices `insert_text` into `draft_text` and hands the result to
    /// `on_draft_change`. Focus and caret placement happen on the next frame.
    /// Returns `None` without calling `on_draft_change` while disabled.
    pub fn insert(
        &self,
        draft_text: &str,
        insert_text: &str,
        on_draft_change: impl FnOnce(String),
    ) -> Option<ComposerSplice> {
        if !self.enabled {
            return None;
        }

        let splice = splice_insert(draft_text, self.textarea.selection(), insert_text);
        on_draft_change(splice.text.clone());

        let textarea = self.textarea.clone();
        let cursor = splice.cursor;
        self.next_frame.schedule(move || {
            textarea.with(|node| {
                node.focus();
                node.set_selection_range(cursor, cursor);
                node.emit_select();
            });
        });

        Some(splice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, PartialEq, Eq)]
    struct TextareaLog {
        focused: bool,
        selection: Option<(usize, usize)>,
        select_events: usize,
    }

    struct FakeTextarea {
        reported: Option<SelectionRange>,
        log: Arc<Mutex<TextareaLog>>,
    }

    impl ComposerTextarea for FakeTextarea {
        fn selection(&self) -> Option<SelectionRange> {
            self.reported
        }

        fn focus(&mut self) {
            self.log.lock().expect("log").focused = true;
        }

        fn set_selection_range(&mut self, start: usize, end: usize) {
            self.log.lock().expect("log").selection = Some((start, end));
        }

        fn emit_select(&mut self) {
            self.log.lock().expect("log").select_events += 1;
        }
    }

    fn mounted(selection: Option<SelectionRange>) -> (ComposerRef, Arc<Mutex<TextareaLog>>) {
        let log = Arc::new(Mutex::new(TextareaLog::default()));
        let textarea = ComposerRef::new();
        textarea.attach(FakeTextarea {
            reported: selection,
            log: Arc::clone(&log),
        });
        (textarea, log)
    }

    #[test]
    fn handle_reaches_mounted_control_until_detached() {
        let (textarea, log) = mounted(Some(SelectionRange { start: 2, end: 4 }));
        assert_eq!(textarea.selection(), Some(SelectionRange { start: 2, end: 4 }));
        assert_eq!(textarea.with(|node| node.set_selection_range(1, 3)), Some(()));
        assert!(textarea.focus());
        {
            let log = log.lock().expect("log");
            assert!(log.focused);
            assert_eq!(log.selection, Some((1, 3)));
        }

        assert!(textarea.detach().is_some());
        assert!(!textarea.is_attached());
        assert_eq!(textarea.with(|node| node.emit_select()), None);
        assert!(!textarea.focus());
        assert_eq!(textarea.selection(), None);
    }

    #[test]
    fn inserts_text_when_enabled() {
        let (textarea, log) = mounted(Some(SelectionRange::caret(5)));
        let frame = DeferredQueue::new();
        let insert = ComposerInsert::new(textarea, frame.clone());

        let mut changed = Vec::new();
        insert.insert("Hello", "./src", |next| changed.push(next));
        assert_eq!(changed, vec!["Hello ./src".to_string()]);

        assert_eq!(*log.lock().expect("log"), TextareaLog::default());
        assert_eq!(frame.run_pending(), 1);
        let log = log.lock().expect("log").clone();
        assert!(log.focused);
        assert_eq!(log.selection, Some((11, 11)));
        assert_eq!(log.select_events, 1);
    }

    #[test]
    fn does_nothing_when_disabled() {
        let (textarea, log) = mounted(Some(SelectionRange::caret(5)));
        let frame = DeferredQueue::new();
        let mut insert = ComposerInsert::new(textarea, frame.clone());
        insert.set_enabled(false);

        let mut called = false;
        assert!(insert.insert("Hello", "./src", |_| called = true).is_none());
        assert!(!called);
        assert!(frame.is_empty());
        assert_eq!(*log.lock().expect("log"), TextareaLog::default());
    }

    #[test]
    fn spaces_follow_neighbouring_text() {
        let cases = [
            ("", None, "x", "x", 1),
            ("a ", None, "x", "a x", 3),
            ("ab", Some(SelectionRange::caret(1)), "x", "a x b", 4),
            ("a b", Some(SelectionRange::caret(2)), "x", "a x b", 4),
            ("a\nb", Some(SelectionRange::caret(1)), "x", "a x\nb", 3),
            ("ab", Some(SelectionRange::caret(0)), "x", "x ab", 2),
        ];
        for (text, selection, insert, expected, cursor) in cases {
            let splice = splice_insert(text, selection, insert);
            assert_eq!(splice.text, expected, "text={text:?} selection={selection:?}");
            assert_eq!(splice.cursor, cursor, "text={text:?} selection={selection:?}");
        }
    }

    #[test]
    fn selection_is_replaced_and_normalized() {
        let splice = splice_insert(
            "open FILE now",
            Some(SelectionRange { start: 9, end: 5 }),
            "./src",
        );
        assert_eq!(splice.text, "open ./src now");
        assert_eq!(splice.cursor, 10);
        assert!(!splice.leading_space);
        assert!(!splice.trailing_space);
    }

    #[test]
    fn offsets_snap_to_char_boundaries() {
        // "é" spans bytes 0..2; offset 1 falls inside it.
        let splice = splice_insert("éa", Some(SelectionRange::caret(1)), "x");
        assert_eq!(splice.text, "x éa");
        let splice = splice_insert("ab", Some(SelectionRange::caret(99)), "x");
        assert_eq!(splice.text, "ab x");
    }

    #[test]
    fn missing_textarea_inserts_at_end_and_skips_focus() {
        let frame = DeferredQueue::new();
        let insert = ComposerInsert::new(ComposerRef::new(), frame.clone());
        let splice = insert
            .insert("Hello", "./src", |_| {})
            .expect("insert enabled");
        assert_eq!(splice.text, "Hello ./src");
        assert_eq!(frame.run_pending(), 1);
    }
}
