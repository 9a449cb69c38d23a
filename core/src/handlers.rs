//! Create/read/update/delete use cases.
//!
//! Each handler validates its input, runs the resource client's
//! build/execute/parse cycle once, and hands errors back unchanged. Update
//! and delete first fetch the target so that a missing recipe is reported as
//! [`ApiError::NotFound`] rather than as a bare 404.

use crate::client::RecipeClient;
use crate::error::{ApiError, TransportError};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{Recipe, RecipeDraft, WriteResponse};

#[derive(Debug, Clone)]
pub struct RecipeHandlers<T> {
    client: RecipeClient,
    transport: T,
}

impl<T> RecipeHandlers<T> {
    pub fn new(client: RecipeClient, transport: T) -> Self {
        Self { client, transport }
    }
}

impl<T: Transport> RecipeHandlers<T> {
    pub async fn list(&self) -> Result<Vec<Recipe>, ApiError> {
        let response = self.send(self.client.build_list_recipes()).await?;
        Ok(self.client.parse_list_recipes(response)?)
    }

    pub async fn get(&self, id: u64) -> Result<Recipe, ApiError> {
        require_id(id)?;
        let response = self.send(self.client.build_get_recipe(id)).await?;
        Ok(self.client.parse_get_recipe(response)?)
    }

    pub async fn create(&self, draft: &RecipeDraft) -> Result<WriteResponse, ApiError> {
        require_title(draft)?;
        let response = self.send(self.client.build_create_recipe(draft)?).await?;
        Ok(self.client.parse_create_recipe(response)?)
    }

    pub async fn update(&self, id: u64, draft: &RecipeDraft) -> Result<WriteResponse, ApiError> {
        require_id(id)?;
        require_title(draft)?;
        self.ensure_exists(id).await?;
        let response = self
            .send(self.client.build_update_recipe(id, draft)?)
            .await?;
        Ok(self.client.parse_update_recipe(response)?)
    }

    pub async fn delete(&self, id: u64) -> Result<bool, ApiError> {
        require_id(id)?;
        self.ensure_exists(id).await?;
        let response = self.send(self.client.build_delete_recipe(id)).await?;
        self.client.parse_delete_recipe(response)?;
        Ok(true)
    }

    async fn ensure_exists(&self, id: u64) -> Result<(), ApiError> {
        match self.get(id).await {
            Ok(_) => Ok(()),
            Err(ApiError::Transport(e)) if e.status() == Some(404) => {
                Err(ApiError::NotFound { id })
            }
            Err(e) => Err(e),
        }
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        tracing::debug!(method = %request.method, path = %request.path, "sending request");
        let response = self.transport.execute(request).await?;
        tracing::debug!(status = response.status, "received response");
        Ok(response)
    }
}

fn require_id(id: u64) -> Result<(), ApiError> {
    if id == 0 {
        return Err(ApiError::Validation("recipe id must be positive".to_string()));
    }
    Ok(())
}

fn require_title(draft: &RecipeDraft) -> Result<(), ApiError> {
    if !draft.has_title() {
        return Err(ApiError::Validation("recipe title is required".to_string()));
    }
    Ok(())
}
