//! User profile document and the staged editor around it.
//!
//! Edits are staged on a draft copy and only reach the stored document when
//! the caller writes [`ProfileEditor::staged`] and then confirms with
//! [`ProfileEditor::mark_saved`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    /// Read-only; never changed by the editor.
    pub email: String,
    pub phone: String,
    pub address: String,
    pub profile_image: Option<String>,
}

/// Editable fields as submitted by a client in one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub image_url: Option<String>,
    pub uploaded_image: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    FirstName,
    LastName,
    Phone,
    Address,
}

/// Pending image choice. Picking one kind clears the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageInput {
    #[default]
    Unchanged,
    /// Remote URL typed by the user.
    Url(String),
    /// Reference to a locally previewed upload.
    Upload(String),
}

#[derive(Debug, Clone)]
pub struct ProfileEditor {
    stored: UserProfile,
    draft: UserProfile,
    image: ImageInput,
    editing: bool,
}

impl ProfileEditor {
    #[must_use]
    pub fn new(stored: UserProfile) -> Self {
        Self {
            draft: stored.clone(),
            stored,
            image: ImageInput::Unchanged,
            editing: false,
        }
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn start_editing(&mut self) {
        self.editing = true;
    }

    /// Drops all staged changes and returns to read-only mode.
    pub fn cancel(&mut self) {
        self.draft = self.stored.clone();
        self.image = ImageInput::Unchanged;
        self.editing = false;
    }

    /// What read-only mode renders.
    #[must_use]
    pub fn stored(&self) -> &UserProfile {
        &self.stored
    }

    #[must_use]
    pub fn draft(&self) -> &UserProfile {
        &self.draft
    }

    #[must_use]
    pub fn image_input(&self) -> &ImageInput {
        &self.image
    }

    pub fn set_field(&mut self, field: ProfileField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ProfileField::FirstName => self.draft.first_name = value,
            ProfileField::LastName => self.draft.last_name = value,
            ProfileField::Phone => self.draft.phone = value,
            ProfileField::Address => self.draft.address = value,
        }
    }

    pub fn set_image_url(&mut self, url: impl Into<String>) {
        self.image = ImageInput::Url(url.into());
    }

    pub fn set_uploaded_image(&mut self, preview: impl Into<String>) {
        self.image = ImageInput::Upload(preview.into());
    }

    /// Stages every field present in `update`, in one step.
    ///
    /// When both image kinds are given the URL wins, matching the save
    /// priority.
    pub fn apply(&mut self, update: ProfileUpdate) {
        let fields = [
            (ProfileField::FirstName, update.first_name),
            (ProfileField::LastName, update.last_name),
            (ProfileField::Phone, update.phone),
            (ProfileField::Address, update.address),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                self.set_field(field, value);
            }
        }
        if let Some(preview) = update.uploaded_image.filter(|s| !s.is_empty()) {
            self.set_uploaded_image(preview);
        }
        if let Some(url) = update.image_url.filter(|s| !s.is_empty()) {
            self.set_image_url(url);
        }
    }

    /// Image reference a save would write: typed URL, else uploaded preview,
    /// else the stored image.
    #[must_use]
    pub fn resolved_image(&self) -> Option<String> {
        match &self.image {
            ImageInput::Url(url) if !url.is_empty() => Some(url.clone()),
            ImageInput::Upload(preview) if !preview.is_empty() => Some(preview.clone()),
            _ => self.draft.profile_image.clone(),
        }
    }

    /// The full document a save overwrites the stored one with.
    #[must_use]
    pub fn staged(&self) -> UserProfile {
        UserProfile {
            email: self.stored.email.clone(),
            user_id: self.stored.user_id.clone(),
            profile_image: self.resolved_image(),
            ..self.draft.clone()
        }
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.staged() != self.stored
    }

    /// Records a successful write of `saved` and leaves edit mode.
    pub fn mark_saved(&mut self, saved: UserProfile) {
        self.stored = saved.clone();
        self.draft = saved;
        self.image = ImageInput::Unchanged;
        self.editing = false;
    }
}
