use crate::{
    ConsoleResult, GoosedClient,
    core::domain::model::blueprint::{BlueprintDraft, BlueprintRecord, BlueprintResponse},
    core::infrastructure::resource_cache::ResourceKey,
};
use serde_json::Value;
use tracing::{debug, info, instrument};

use super::validate_resource_id;

const BLUEPRINTS_PATH: &str = "/v1/blueprints";

fn blueprint_path(id: &str) -> String {
    format!("{}/{}", BLUEPRINTS_PATH, id)
}

impl GoosedClient {
    /// Lists blueprints sorted by name, reusing the cached listing while it is fresh.
    pub async fn blueprints(&self) -> ConsoleResult<Vec<BlueprintRecord>> {
        self.blueprints
            .get_or_fetch(|| self.fetch_blueprint_list())
            .await
    }

    /// Lists blueprints, ignoring the cache.
    pub async fn refresh_blueprints(&self) -> ConsoleResult<Vec<BlueprintRecord>> {
        self.blueprints.refresh(|| self.fetch_blueprint_list()).await
    }

    /// Fetches a single blueprint.
    ///
    /// # Errors
    /// Returns `ConsoleError::Validation` for an empty or malformed id and
    /// `ConsoleError::Api` if the backend rejects the request (e.g. 404).
    #[instrument(skip(self))]
    pub async fn blueprint(&self, id: &str) -> ConsoleResult<BlueprintRecord> {
        let id = validate_resource_id(id)?;
        let response: BlueprintResponse = self.api_client.get(&blueprint_path(id)).await?;
        Ok(response.blueprint)
    }

    /// Creates a blueprint.
    ///
    /// The draft is validated first; an invalid draft never reaches the
    /// backend. On success the blueprint listing is invalidated.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use goosed_console::{BlueprintDraft, GoosedClient, ConsoleResult};
    /// # async fn example(client: GoosedClient) -> ConsoleResult<()> {
    /// let draft = BlueprintDraft::from_editor("rhel-base", "rhel", "9.4", r#"{"disk": "sda"}"#)?;
    /// let created = client.create_blueprint(&draft).await?;
    /// println!("created {}", created.id);
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_blueprint(&self, draft: &BlueprintDraft) -> ConsoleResult<BlueprintRecord> {
        let draft = draft.validate()?;
        let _guard = self.mutation_lock.lock().await;

        let response: BlueprintResponse = self.api_client.post(BLUEPRINTS_PATH, &draft).await?;
        self.invalidate(ResourceKey::Blueprints);
        info!(id = %response.blueprint.id, "blueprint created");
        Ok(response.blueprint)
    }

    /// Replaces a blueprint. Validation and invalidation as in [`GoosedClient::create_blueprint`].
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn update_blueprint(
        &self,
        id: &str,
        draft: &BlueprintDraft,
    ) -> ConsoleResult<BlueprintRecord> {
        let id = validate_resource_id(id)?;
        let draft = draft.validate()?;
        let _guard = self.mutation_lock.lock().await;

        let response: BlueprintResponse =
            self.api_client.put(&blueprint_path(id), &draft).await?;
        self.invalidate(ResourceKey::Blueprints);
        info!("blueprint updated");
        Ok(response.blueprint)
    }

    #[instrument(skip(self))]
    pub async fn delete_blueprint(&self, id: &str) -> ConsoleResult<()> {
        let id = validate_resource_id(id)?;
        let _guard = self.mutation_lock.lock().await;

        self.api_client.delete(&blueprint_path(id)).await?;
        self.invalidate(ResourceKey::Blueprints);
        info!("blueprint deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn fetch_blueprint_list(&self) -> ConsoleResult<Vec<BlueprintRecord>> {
        let body: Value = self.api_client.get(BLUEPRINTS_PATH).await?;
        let mut blueprints: Vec<BlueprintRecord> = super::decode_list(body, "blueprints");
        blueprints.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(count = blueprints.len(), "blueprints fetched");
        Ok(blueprints)
    }
}
