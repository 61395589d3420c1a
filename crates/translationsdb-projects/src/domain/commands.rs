//! Command inputs for the Projects context.

use serde::Deserialize;

/// Input to create a project. The id is generated.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProjectInput {
    /// Display name.
    pub name: String,
}

/// Input to rename a project.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProjectInput {
    /// The project identifier.
    pub id: String,
    /// New display name.
    pub name: String,
}

/// Input to delete a project.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteProjectInput {
    /// The project identifier.
    pub id: String,
}

/// Input to add a key to a project.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateKeyInput {
    /// Owning project.
    pub project_id: String,
    /// The key identifier, chosen by the caller.
    pub id: String,
}

/// Input to remove a key from a project.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteKeyInput {
    /// Owning project.
    pub project_id: String,
    /// The key identifier.
    pub id: String,
}

/// Input to set one locale's value for a key.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTranslationInput {
    /// Owning project.
    pub project_id: String,
    /// Owning key.
    pub key_id: String,
    /// The locale code.
    pub id: String,
    /// New value.
    pub value: String,
}

/// Input to remove one locale's translation from a key.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteTranslationInput {
    /// Owning project.
    pub project_id: String,
    /// Owning key.
    pub key_id: String,
    /// The locale code.
    pub id: String,
}
