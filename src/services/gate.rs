use crate::config::Config;
use crate::models::error::AdRefreshError;
use crate::models::settings::ModuleSettings;

/// Decides whether the current path is excluded by the configured page patterns.
///
/// Pattern syntax and matching belong to the host; the gate only consumes the verdict.
pub trait PageExclusions {
    fn is_excluded(&self, path: &str, patterns: &str) -> bool;
}

impl<F> PageExclusions for F
where
    F: Fn(&str, &str) -> bool,
{
    fn is_excluded(&self, path: &str, patterns: &str) -> bool {
        self(path, patterns)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Main,
    Sub,
}

/// Front-end assets attached to an outgoing response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachments {
    libraries: Vec<String>,
}

impl Attachments {
    /// Adds `library` unless it is already attached. Returns whether it was added.
    pub fn attach_library(&mut self, library: &str) -> bool {
        if self.has_library(library) {
            return false;
        }

        self.libraries.push(library.to_string());
        true
    }

    pub fn has_library(&self, library: &str) -> bool {
        self.libraries.iter().any(|l| l == library)
    }

    pub fn libraries(&self) -> &[String] {
        &self.libraries
    }
}

/// A response that may or may not be able to carry attachments.
pub trait AttachableResponse {
    fn attachments_mut(&mut self) -> Option<&mut Attachments>;
}

impl AttachableResponse for Attachments {
    fn attachments_mut(&mut self) -> Option<&mut Attachments> {
        Some(self)
    }
}

/// Outcome of the gate for one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentDecision {
    Attach,
    SubRequest,
    ModuleDisabled,
    PageExcluded,
    NoAttachments,
}

impl AttachmentDecision {
    pub fn should_attach(self) -> bool {
        matches!(self, AttachmentDecision::Attach)
    }
}

/// Server-side switch for shipping the ad refresh library.
///
/// Evaluated once per response. It has no view of individual slot statuses:
/// an included page can still have every slot disabled.
#[derive(Debug, Clone)]
pub struct AttachmentGate<P> {
    settings: ModuleSettings,
    exclusions: P,
}

impl<P: PageExclusions> AttachmentGate<P> {
    pub fn new(settings: ModuleSettings, exclusions: P) -> Self {
        Self {
            settings,
            exclusions,
        }
    }

    /// Builds the gate from the stored `items` setting.
    ///
    /// Unreadable settings leave the module disabled, so nothing is attached.
    pub fn from_items(items: &str, exclusions: P) -> Self {
        Self::new(ModuleSettings::parse(items).unwrap_or_default(), exclusions)
    }

    /// Like [`AttachmentGate::from_items`], but reports unreadable settings.
    pub fn try_from_items(items: &str, exclusions: P) -> Result<Self, AdRefreshError> {
        Ok(Self::new(ModuleSettings::parse(items)?, exclusions))
    }

    pub fn settings(&self) -> &ModuleSettings {
        &self.settings
    }

    pub fn decide(&self, request: RequestKind, path: &str, supports_attachments: bool) -> AttachmentDecision {
        if request != RequestKind::Main {
            return AttachmentDecision::SubRequest;
        }

        if !self.settings.is_enabled() {
            return AttachmentDecision::ModuleDisabled;
        }

        if self
            .exclusions
            .is_excluded(path, self.settings.page_exclusions())
        {
            return AttachmentDecision::PageExcluded;
        }

        if !supports_attachments {
            return AttachmentDecision::NoAttachments;
        }

        AttachmentDecision::Attach
    }

    /// Decides for `response` and attaches the library when allowed.
    pub fn on_response<R: AttachableResponse>(
        &self,
        request: RequestKind,
        path: &str,
        response: &mut R,
    ) -> AttachmentDecision {
        let decision = self.decide(request, path, response.attachments_mut().is_some());

        if decision.should_attach() {
            if let Some(attachments) = response.attachments_mut() {
                attachments.attach_library(Config::LIBRARY);
            }
        }

        decision
    }
}
