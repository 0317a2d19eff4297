use crate::config::Config;
use web_sys::Document;

/// Reports whether the host page is currently hidden from the user.
pub trait PageVisibility {
    fn is_hidden(&self) -> bool;
}

impl<F> PageVisibility for F
where
    F: Fn() -> bool,
{
    fn is_hidden(&self) -> bool {
        self()
    }
}

/// Visibility read from `document.hidden`.
#[derive(Debug, Clone, Default)]
pub struct DocumentVisibility {
    document: Option<Document>,
}

impl DocumentVisibility {
    pub fn new() -> Self {
        Self {
            document: web_sys::window().and_then(|w| w.document()),
        }
    }
}

impl PageVisibility for DocumentVisibility {
    fn is_hidden(&self) -> bool {
        // Without a document there is nothing to hide behind.
        Config::PAUSE_WHEN_HIDDEN && self.document.as_ref().is_some_and(Document::hidden)
    }
}
