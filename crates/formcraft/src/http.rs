use std::time::Duration;

use async_trait::async_trait;
use formcraft_spec::{FormId, FormSpec};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

use crate::backend::FormBackend;
use crate::error::BackendError;

/// JSON client for the organization forms route.
///
/// `base` points at the collection, e.g. `https://host/api/v1/organization/forms`:
/// `GET base` lists, `GET base/{id}` fetches one, `POST base` creates,
/// `PUT base` updates and `DELETE base` with `{"formId": id}` deletes.
#[derive(Debug, Clone)]
pub struct HttpFormBackend {
    client: Client,
    base: Url,
}

impl HttpFormBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let base = Url::parse(base_url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn item_url(&self, id: FormId) -> Result<Url, BackendError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::Rejected(format!("`{}` cannot be a base url", self.base)))?
            .pop_if_empty()
            .push(&id.to_string());
        Ok(url)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl FormBackend for HttpFormBackend {
    async fn create_form(&self, form: &FormSpec) -> Result<FormSpec, BackendError> {
        tracing::debug!(url = %self.base, "POST form");
        let response = self.client.post(self.base.clone()).json(form).send().await?;
        Self::decode(response).await
    }

    async fn update_form(&self, id: FormId, form: &FormSpec) -> Result<FormSpec, BackendError> {
        tracing::debug!(url = %self.base, form_id = id, "PUT form");
        let mut body = form.clone();
        body.id = Some(id);
        let response = self.client.put(self.base.clone()).json(&body).send().await?;
        Self::decode(response).await
    }

    async fn delete_form(&self, id: FormId) -> Result<(), BackendError> {
        tracing::debug!(url = %self.base, form_id = id, "DELETE form");
        let response = self
            .client
            .delete(self.base.clone())
            .json(&json!({ "formId": id }))
            .send()
            .await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(id));
        }
        if !status.is_success() {
            let body = response.text().await?;
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    async fn list_forms(&self) -> Result<Vec<FormSpec>, BackendError> {
        let response = self.client.get(self.base.clone()).send().await?;
        Self::decode(response).await
    }

    async fn get_form(&self, id: FormId) -> Result<FormSpec, BackendError> {
        let response = self.client.get(self.item_url(id)?).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(id));
        }
        Self::decode(response).await
    }
}
