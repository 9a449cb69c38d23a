//! Stateless HTTP request builder and response parser for the recipe API.
//!
//! # Design
//! `RecipeClient` holds only the resource base (`{base_url}/recipes`) and
//! carries no mutable state between calls. Each CRUD operation is split into
//! a `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. Any non-2xx status is a
//! `TransportError::Status`; deciding what a 404 means is left to the
//! operation handlers.

use serde::de::DeserializeOwned;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Recipe, RecipeDraft, RecipeList, WriteResponse};

const RESOURCE: &str = "recipes";

/// Request builder and response parser for `{base_url}/recipes`.
#[derive(Debug, Clone)]
pub struct RecipeClient {
    resource_url: String,
}

impl RecipeClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            resource_url: format!("{}/{RESOURCE}", base_url.trim_end_matches('/')),
        }
    }

    pub fn build_list_recipes(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/", self.resource_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_get_recipe(&self, id: u64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/{id}", self.resource_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_recipe(&self, input: &RecipeDraft) -> Result<HttpRequest, TransportError> {
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/", self.resource_url),
            headers: json_headers(),
            body: Some(encode(input)?),
        })
    }

    pub fn build_update_recipe(
        &self,
        id: u64,
        input: &RecipeDraft,
    ) -> Result<HttpRequest, TransportError> {
        Ok(HttpRequest {
            method: HttpMethod::Put,
            path: format!("{}/{id}", self.resource_url),
            headers: json_headers(),
            body: Some(encode(input)?),
        })
    }

    pub fn build_delete_recipe(&self, id: u64) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/{id}", self.resource_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_recipes(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Recipe>, TransportError> {
        check_status(&response)?;
        decode::<RecipeList>(&response.body).map(|list| list.recipes)
    }

    pub fn parse_get_recipe(&self, response: HttpResponse) -> Result<Recipe, TransportError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_create_recipe(
        &self,
        response: HttpResponse,
    ) -> Result<WriteResponse, TransportError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_update_recipe(
        &self,
        response: HttpResponse,
    ) -> Result<WriteResponse, TransportError> {
        check_status(&response)?;
        decode(&response.body)
    }

    /// Delete responses carry no body worth reading.
    pub fn parse_delete_recipe(&self, response: HttpResponse) -> Result<(), TransportError> {
        check_status(&response)
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn encode(input: &RecipeDraft) -> Result<String, TransportError> {
    serde_json::to_string(input).map_err(|e| TransportError::Encode(e.to_string()))
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, TransportError> {
    serde_json::from_str(body).map_err(|e| TransportError::Decode(e.to_string()))
}

fn check_status(response: &HttpResponse) -> Result<(), TransportError> {
    if response.is_success() {
        return Ok(());
    }
    Err(TransportError::Status {
        status: response.status,
        body: response.body.clone(),
    })
}
