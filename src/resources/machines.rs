use crate::{
    ConsoleResult, GoosedClient,
    core::domain::model::{machine::MachineListItem, machine_record::MachineRecord},
    inventory::{Inventory, normalizer},
    poller::InventorySource,
};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

const MACHINES_PATH: &str = "/v1/machines";

impl GoosedClient {
    /// Lists machines, reusing the cached listing while it is fresh.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use goosed_console::{GoosedClient, ConsoleResult};
    /// # async fn example() -> ConsoleResult<()> {
    /// let client = GoosedClient::builder()
    ///     .origin("https://goosed.example.com")
    ///     .build()?;
    ///
    /// for item in client.machines().await? {
    ///     println!("{} {:?}", item.machine.id, item.status);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn machines(&self) -> ConsoleResult<Vec<MachineListItem>> {
        self.machines
            .get_or_fetch(|| self.fetch_machine_list())
            .await
    }

    /// Lists machines, ignoring the cache.
    pub async fn refresh_machines(&self) -> ConsoleResult<Vec<MachineListItem>> {
        self.machines.refresh(|| self.fetch_machine_list()).await
    }

    /// Normalized display records of [`GoosedClient::machines`].
    pub async fn machine_records(&self) -> ConsoleResult<Vec<MachineRecord>> {
        Ok(normalizer::normalize_all(&self.machines().await?))
    }

    /// Normalized inventory with counts, site options and filtering.
    pub async fn inventory(&self) -> ConsoleResult<Inventory> {
        Ok(Inventory::from_items(&self.machines().await?))
    }

    /// Inventory built from the last successful fetch, without a request.
    pub fn cached_inventory(&self) -> Option<Inventory> {
        self.machines
            .peek()
            .map(|items| Inventory::from_items(&items))
    }

    #[instrument(skip(self))]
    async fn fetch_machine_list(&self) -> ConsoleResult<Vec<MachineListItem>> {
        let body: Value = self.api_client.get(MACHINES_PATH).await?;
        let items: Vec<MachineListItem> = super::decode_list(body, "machines");
        debug!(count = items.len(), "machines fetched");
        Ok(items)
    }
}

#[async_trait]
impl InventorySource for GoosedClient {
    async fn fetch_machines(&self) -> ConsoleResult<Vec<MachineListItem>> {
        self.refresh_machines().await
    }
}
