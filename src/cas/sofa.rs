//! Sofa data and the per-view document annotation

use super::container::Cas;
use super::errors::{CasError, CasResult};
use crate::observability::{log_event, Event};
use crate::store::{FsId, Value};

/// Mime type recorded by `set_document_text`.
pub const TEXT_MIME: &str = "text";

impl Cas {
    // ---- sofa data ----

    fn check_sofa_unset(&self, view: &str) -> CasResult<FsId> {
        let b = self.type_system().builtins();
        let sofa = self.view(view)?.sofa();
        let store = self.store();
        let taken = store.get_string(sofa, b.sofa_string)?.is_some()
            || store.get_string(sofa, b.sofa_uri)?.is_some()
            || store.get_ref(sofa, b.sofa_array)?.is_some();
        if taken {
            return Err(CasError::SofaDataAlreadySet(view.to_string()));
        }
        Ok(sofa)
    }

    fn set_sofa_mime(&mut self, sofa: FsId, mime: Option<&str>) -> CasResult<()> {
        let f = self.type_system().builtins().sofa_mime;
        self.store_mut().set_string(sofa, f, mime)?;
        Ok(())
    }

    /// Sets the view's subject to a local string.
    pub fn set_sofa_string(&mut self, view: &str, text: &str, mime: Option<&str>) -> CasResult<()> {
        let sofa = self.check_sofa_unset(view)?;
        let f = self.type_system().builtins().sofa_string;
        self.store_mut().set_string(sofa, f, Some(text))?;
        self.set_sofa_mime(sofa, mime)
    }

    /// Sets the view's subject to a remote URI.
    pub fn set_sofa_uri(&mut self, view: &str, uri: &str, mime: Option<&str>) -> CasResult<()> {
        let sofa = self.check_sofa_unset(view)?;
        let f = self.type_system().builtins().sofa_uri;
        self.store_mut().set_string(sofa, f, Some(uri))?;
        self.set_sofa_mime(sofa, mime)
    }

    /// Sets the view's subject to an array feature structure.
    pub fn set_sofa_array(&mut self, view: &str, array: FsId, mime: Option<&str>) -> CasResult<()> {
        let sofa = self.check_sofa_unset(view)?;
        let f = self.type_system().builtins().sofa_array;
        self.store_mut().set_ref(sofa, f, Some(array))?;
        self.set_sofa_mime(sofa, mime)
    }

    /// The view's local subject string.
    pub fn sofa_string(&self, view: &str) -> CasResult<Option<&str>> {
        let sofa = self.view(view)?.sofa();
        Ok(self.store().get_string(sofa, self.type_system().builtins().sofa_string)?)
    }

    pub fn sofa_uri(&self, view: &str) -> CasResult<Option<&str>> {
        let sofa = self.view(view)?.sofa();
        Ok(self.store().get_string(sofa, self.type_system().builtins().sofa_uri)?)
    }

    pub fn sofa_mime(&self, view: &str) -> CasResult<Option<&str>> {
        let sofa = self.view(view)?.sofa();
        Ok(self.store().get_string(sofa, self.type_system().builtins().sofa_mime)?)
    }

    pub fn sofa_array(&self, view: &str) -> CasResult<Option<FsId>> {
        let sofa = self.view(view)?.sofa();
        Ok(self.store().get_ref(sofa, self.type_system().builtins().sofa_array)?)
    }

    // ---- document annotation ----

    /// Sets the view's text and makes its document annotation cover it.
    ///
    /// Offsets count characters.
    pub fn set_document_text(&mut self, view: &str, text: &str) -> CasResult<FsId> {
        self.set_sofa_string(view, text, Some(TEXT_MIME))?;
        let end = i32::try_from(text.chars().count()).unwrap_or(i32::MAX);
        let end_feature = self.type_system().builtins().end;

        match self.view(view)?.document_annotation() {
            Some(existing) => {
                // Re-keying requires removal first so sorted indexes stay ordered
                let indexed = self.view(view)?.indexes().is_member(existing);
                if indexed {
                    self.remove_from_indexes(view, existing)?;
                }
                self.store_mut().set_int(existing, end_feature, end)?;
                if indexed {
                    self.add_to_indexes(view, existing)?;
                }
                self.view_mut(view)?.document_annotation = Some(existing);
                Ok(existing)
            }
            None => {
                let t = self.type_system().builtins().document_annotation;
                let fs = self.create_annotation(view, t, 0, end)?;
                self.add_to_indexes(view, fs)?;
                Ok(fs)
            }
        }
    }

    /// The view's document text, if its subject is a local string.
    pub fn document_text(&self, view: &str) -> CasResult<Option<&str>> {
        self.sofa_string(view)
    }

    /// Sets the `language` feature of the view's document annotation,
    /// creating an empty one when none exists yet.
    pub fn set_document_language(&mut self, view: &str, language: &str) -> CasResult<()> {
        let fs = match self.view(view)?.document_annotation() {
            Some(fs) => fs,
            None => {
                let t = self.type_system().builtins().document_annotation;
                let fs = self.create_annotation(view, t, 0, 0)?;
                self.add_to_indexes(view, fs)?;
                fs
            }
        };
        let f = self.type_system().builtins().language;
        self.store_mut().set(fs, f, Value::from(language))?;
        Ok(())
    }

    pub fn document_language(&self, view: &str) -> CasResult<Option<&str>> {
        match self.view(view)?.document_annotation() {
            Some(fs) => Ok(self.store().get_string(fs, self.type_system().builtins().language)?),
            None => Ok(None),
        }
    }

    /// Makes `fs` the view's document annotation, removing the previous one
    /// from the view's indexes.
    pub fn set_document_annotation(&mut self, view: &str, fs: FsId) -> CasResult<()> {
        let b = self.type_system().builtins().clone();
        let t = self.store().type_of(fs)?;
        if !self.type_system().subsumes(b.document_annotation, t) {
            return Err(crate::store::StoreError::mismatch(
                "document annotation",
                self.type_system().type_name(b.document_annotation),
                self.type_system().type_name(t),
            )
            .into());
        }

        if let Some(previous) = self.view(view)?.document_annotation() {
            if previous == fs {
                return Ok(());
            }
            self.remove_from_indexes(view, previous)?;
            log_event(
                Event::DocumentAnnotationReplaced,
                &[
                    ("view", view),
                    ("previous", previous.to_string().as_str()),
                    ("current", fs.to_string().as_str()),
                ],
            );
        }
        self.view_mut(view)?.document_annotation = None;
        self.add_to_indexes(view, fs)?;
        self.view_mut(view)?.document_annotation = Some(fs);
        Ok(())
    }
}
