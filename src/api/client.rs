//! HTTP client for the SO3 layout service

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use uuid::Uuid;

use super::models::*;
use super::LayoutService;

const API_PREFIX: &str = "/api/v1";

/// Client for one SO3 server.
///
/// Call [`So3Client::login`] first; the bearer token is kept on the client
/// and attached to every subsequent request.
pub struct So3Client {
    base_url: String,
    client: reqwest::Client,
    token: Option<String>,
}

impl So3Client {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client")?;

        let base_url: String = base_url.into();
        Ok(So3Client {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            token: None,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Log in and keep the returned bearer token for subsequent calls
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        let response = self
            .client
            .post(self.url("/users/login"))
            .json(&LoginRequest { username, password })
            .send()
            .await
            .context("Login request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            bail!("Login failed ({}): {}", status, response.text().await?);
        }

        let login: LoginResponse = response.json().await.context("Invalid login response")?;
        self.token = Some(login.token);
        Ok(())
    }

    /// Look up a layout page by path; `None` if it does not exist
    pub async fn get_layout_page(&self, path: &str) -> Result<Option<LayoutPage>> {
        let response = self
            .authorize(self.client.get(self.url("/layouts")).query(&[("Path", path)]))
            .send()
            .await
            .context("Layout page request failed")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            bail!("Layout page lookup failed ({}): {}", status, response.text().await?);
        }

        let page = response.json().await.context("Invalid layout page response")?;
        Ok(Some(page))
    }

    /// Create a new layout page under the given facility path
    pub async fn create_layout_page(&self, path: &str, name: &str) -> Result<LayoutPage> {
        let response = self
            .authorize(self.client.post(self.url("/layouts")))
            .json(&CreateLayoutPageRequest { path, name })
            .send()
            .await
            .context("Create layout page request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            bail!("Create layout page failed ({}): {}", status, response.text().await?);
        }

        response.json().await.context("Invalid layout page response")
    }

    /// Look up the layout page `facility_path`/`page_name`, creating it if
    /// it does not exist yet
    pub async fn ensure_layout_page(&self, facility_path: &str, page_name: &str) -> Result<LayoutPage> {
        let full_path = format!("{}/{}", facility_path, page_name);
        match self.get_layout_page(&full_path).await? {
            Some(page) => Ok(page),
            None => {
                log::info!("Layout page '{}' not found, creating it", full_path);
                self.create_layout_page(facility_path, page_name).await
            }
        }
    }

    /// Write `"X"` (or clear) the MarkedForDeletion attribute of the
    /// selected placements
    pub async fn update_marked_for_deletion(
        &self,
        layout_guid: Uuid,
        selector: PlacementsSelector,
        marked_for_deletion: bool,
    ) -> Result<()> {
        let value = if marked_for_deletion { "X" } else { "" };
        self.update_attributes(
            layout_guid,
            selector,
            Some("en-US"),
            None,
            Some(vec![AttributeValuePart::value("MarkedForDeletion", value)]),
        )
        .await
    }

    /// Query placements page by page until the service reports no more
    pub async fn get_placements(
        &self,
        layout_guid: Uuid,
        data_language: &str,
        selector_placement_guid: Option<Uuid>,
        selector_identification_prefix: Option<&str>,
        selector_type_path: Option<&str>,
    ) -> Result<Vec<Placement>> {
        let url = self.url(&format!("/layouts/{}/Placements", layout_guid));

        let mut placements = Vec::new();
        let mut page_index = 0;
        loop {
            let mut parameters: Vec<(&str, String)> =
                vec![("DataLanguage", data_language.to_string())];
            if let Some(guid) = selector_placement_guid {
                parameters.push(("PlacementGuid", guid.to_string()));
            }
            if let Some(prefix) = selector_identification_prefix {
                parameters.push(("IdentificationPrefix", prefix.to_string()));
            }
            if let Some(path) = selector_type_path {
                parameters.push(("TypePath", path.to_string()));
            }
            parameters.push(("PageIndex", page_index.to_string()));

            let response = self
                .authorize(self.client.get(&url).query(&parameters))
                .send()
                .await
                .context("Placements request failed")?;

            if !response.status().is_success() {
                let status = response.status();
                bail!("Placements query failed ({}): {}", status, response.text().await?);
            }

            let page: GetPlacementsResponse =
                response.json().await.context("Invalid placements response")?;
            placements.extend(page.placements);

            if !page.has_next {
                return Ok(placements);
            }
            page_index += 1;
        }
    }
}

#[async_trait]
impl LayoutService for So3Client {
    async fn create_placement(
        &self,
        layout_guid: Uuid,
        type_path: &str,
        location: Location,
        rotation_z: f32,
        identification: Option<&str>,
        attribute_updates: Vec<AttributeUpdates>,
    ) -> Result<Vec<PlacementHeader>> {
        let request = CreatePlacementRequest {
            placement_type: TypeReference { path: type_path },
            location,
            rotation_z,
            identification,
            attribute_updates,
        };

        let response = self
            .authorize(
                self.client
                    .post(self.url(&format!("/layouts/{}/Placements", layout_guid))),
            )
            .json(&request)
            .send()
            .await
            .context("Create placement request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            bail!("Create placement failed ({}): {}", status, response.text().await?);
        }

        let created: CreatePlacementResponse = response
            .json()
            .await
            .context("Invalid create placement response")?;
        Ok(created.placements.unwrap_or_default())
    }

    async fn update_attributes(
        &self,
        layout_guid: Uuid,
        selector: PlacementsSelector,
        data_language: Option<&str>,
        identification: Option<&str>,
        value_parts: Option<Vec<AttributeValuePart>>,
    ) -> Result<()> {
        let request = UpdateAttributesRequest {
            selector,
            data_language,
            identification,
            value_parts,
        };

        let response = self
            .authorize(
                self.client
                    .put(self.url(&format!("/layouts/{}/Placements/Attributes", layout_guid))),
            )
            .json(&request)
            .send()
            .await
            .context("Update attributes request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            bail!("Update attributes failed ({}): {}", status, response.text().await?);
        }
        Ok(())
    }
}
