//! Recipe DTOs and the normalized in-memory record.
//!
//! # Design
//! The wire types (`Recipe`, `RecipeList`, `WriteResponse`) are deliberately
//! loose: every field the backend might omit is an `Option`. Normalization
//! into the strict in-memory shape happens in exactly one place,
//! [`LocalRecipe::from_server`], so call sites never default fields ad hoc.
//!
//! Whether a record exists on the server is carried by [`RecordKey`] instead
//! of being inferred from the numeric range of its id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recipe as the API returns it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recipe {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `GET /recipes/`. A body without `recipes` is an empty list.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeList {
    #[serde(default)]
    pub recipes: Vec<Recipe>,
}

/// Body of a create or update response.
///
/// The backend may acknowledge a write with a status message (optionally
/// carrying the new id) instead of echoing the record. A body containing
/// `message` is always treated as an acknowledgement, even when record
/// fields ride alongside it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum WriteResponse {
    Message {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        recipe_id: Option<u64>,
    },
    Record(Recipe),
}

/// User-supplied recipe fields, sent as the body of create and update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeDraft {
    pub title: String,
    #[serde(default)]
    pub ingredients: String,
    #[serde(default)]
    pub description: String,
}

impl RecipeDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_ingredients(mut self, ingredients: impl Into<String>) -> Self {
        self.ingredients = ingredients.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// True when the title still has content after trimming.
    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// Identity of an in-memory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "id", rename_all = "snake_case")]
pub enum RecordKey {
    /// Known to the server under this id. Mutations are sent to the API.
    Persisted(u64),
    /// Exists only in this client. Mutations never leave the process.
    Pending(u64),
}

impl RecordKey {
    /// Key for an id reported by the server. Zero or absent means the record
    /// was never persisted.
    pub fn from_server_id(id: Option<u64>) -> Self {
        match id {
            Some(id) if id > 0 => RecordKey::Persisted(id),
            _ => RecordKey::Pending(0),
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            RecordKey::Persisted(id) | RecordKey::Pending(id) => *id,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, RecordKey::Pending(_))
    }
}

/// A normalized recipe held by the view-model.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LocalRecipe {
    pub key: RecordKey,
    pub title: String,
    pub ingredients: String,
    pub description: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl LocalRecipe {
    pub fn from_server(recipe: Recipe) -> Self {
        Self {
            key: RecordKey::from_server_id(recipe.recipe_id),
            title: recipe.title.unwrap_or_default(),
            ingredients: recipe.ingredients.unwrap_or_default(),
            description: recipe.description.unwrap_or_default(),
            created_at: recipe.created_at,
            updated_at: recipe.updated_at,
        }
    }

    /// A record built from submitted values, with both timestamps set to the
    /// same instant.
    pub fn from_draft(key: RecordKey, draft: &RecipeDraft, at: DateTime<Utc>) -> Self {
        Self {
            key,
            title: draft.title.clone(),
            ingredients: draft.ingredients.clone(),
            description: draft.description.clone(),
            created_at: Some(at),
            updated_at: Some(at),
        }
    }

    /// Overwrite the user-editable fields. Key and timestamps are untouched.
    pub fn apply(&mut self, draft: &RecipeDraft) {
        self.title.clone_from(&draft.title);
        self.ingredients.clone_from(&draft.ingredients);
        self.description.clone_from(&draft.description);
    }

    pub fn draft(&self) -> RecipeDraft {
        RecipeDraft {
            title: self.title.clone(),
            ingredients: self.ingredients.clone(),
            description: self.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_server_defaults_missing_fields() {
        let recipe: Recipe = serde_json::from_str(r#"{"recipe_id":3}"#).unwrap();
        let local = LocalRecipe::from_server(recipe);
        assert_eq!(local.key, RecordKey::Persisted(3));
        assert_eq!(local.title, "");
        assert_eq!(local.ingredients, "");
        assert_eq!(local.description, "");
        assert!(local.created_at.is_none());
    }

    #[test]
    fn missing_or_zero_id_is_pending() {
        assert_eq!(RecordKey::from_server_id(None), RecordKey::Pending(0));
        assert_eq!(RecordKey::from_server_id(Some(0)), RecordKey::Pending(0));
        assert_eq!(RecordKey::from_server_id(Some(1500)), RecordKey::Persisted(1500));
    }

    #[test]
    fn null_fields_are_accepted() {
        let recipe: Recipe =
            serde_json::from_str(r#"{"recipe_id":1,"title":"Soup","ingredients":null}"#).unwrap();
        assert_eq!(LocalRecipe::from_server(recipe).ingredients, "");
    }

    #[test]
    fn message_body_is_an_acknowledgement() {
        let resp: WriteResponse =
            serde_json::from_str(r#"{"message":"created","recipe_id":42}"#).unwrap();
        assert_eq!(
            resp,
            WriteResponse::Message {
                message: "created".to_string(),
                recipe_id: Some(42)
            }
        );
    }

    #[test]
    fn message_wins_over_record_fields() {
        let resp: WriteResponse =
            serde_json::from_str(r#"{"message":"ok","recipe_id":5,"title":"Soup"}"#).unwrap();
        assert!(matches!(resp, WriteResponse::Message { recipe_id: Some(5), .. }));
    }

    #[test]
    fn record_body_without_message() {
        let resp: WriteResponse = serde_json::from_str(
            r#"{"recipe_id":5,"title":"Soup","updated_at":"2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        let WriteResponse::Record(recipe) = resp else {
            panic!("expected a record");
        };
        assert_eq!(recipe.recipe_id, Some(5));
        assert!(recipe.updated_at.is_some());
    }

    #[test]
    fn list_without_recipes_key_is_empty() {
        let list: RecipeList = serde_json::from_str("{}").unwrap();
        assert!(list.recipes.is_empty());
    }

    #[test]
    fn draft_title_check_trims() {
        assert!(!RecipeDraft::new("   \t").has_title());
        assert!(RecipeDraft::new(" Soup ").has_title());
    }

    #[test]
    fn record_key_serializes_tagged() {
        let json = serde_json::to_value(RecordKey::Pending(17)).unwrap();
        assert_eq!(json, serde_json::json!({"state":"pending","id":17}));
    }
}
