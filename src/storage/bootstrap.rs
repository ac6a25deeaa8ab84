//! The one-time discovery/creation sequence that runs before any ledger
//! operation: find or create the root folder, then load or materialize the
//! configuration file.

use crate::api::types::{CreateFileRequest, ListFilesParams, ListFilesQuery};
use crate::api::{RemoteClient, FOLDER_MIME_TYPE, TEXT_MIME_TYPE};
use crate::config::{default_app_configuration, AppConfig};
use crate::storage::{
    LedgerStore, StorageState, CONFIG_FILE_TYPE, DIR_TYPE_KEY, FILE_TYPE_KEY, ROOT_DIR_TYPE,
};
use crate::Result;
use std::collections::BTreeMap;
use tracing::debug;

const ROOT_FOLDER_NAME: &str = "pefin";
const CONFIG_FILE_NAME: &str = "config.json";

/// Finds or creates the root folder and configuration file, producing the
/// session state every ledger operation depends on.
///
/// Nothing here takes a lock on the remote account: two clients bootstrapping
/// the same account at the same time can each create a root folder. Later
/// lookups resolve the duplication silently by always picking the most
/// recently created resource.
pub struct BootstrapResolver {
    client: Box<dyn RemoteClient + Send>,
}

impl BootstrapResolver {
    pub fn new(client: Box<dyn RemoteClient + Send>) -> Self {
        Self { client }
    }

    /// Runs the bootstrap sequence. May create zero, one, or two remote
    /// resources depending on what already exists. On success the client
    /// moves into the returned [`LedgerStore`] along with a fresh
    /// (empty-cache) [`StorageState`].
    ///
    /// A config file that exists but fails to parse is an error; a corrupt
    /// remote config must not silently fall back to the defaults.
    pub async fn initialize(mut self) -> Result<(LedgerStore, AppConfig)> {
        let root_folder_id = self.resolve_root_folder().await?;
        let config = self.resolve_config(&root_folder_id).await?;
        let store = LedgerStore::new(self.client, StorageState::new(root_folder_id));
        Ok((store, config))
    }

    async fn resolve_root_folder(&mut self) -> Result<String> {
        let listed = self
            .client
            .list_files(ListFilesParams::newest_first(
                ListFilesQuery::default()
                    .mime_type(FOLDER_MIME_TYPE)
                    .app_property(DIR_TYPE_KEY, ROOT_DIR_TYPE),
            ))
            .await?;

        if let Some(folder) = listed.files.into_iter().next() {
            debug!("using existing root folder {}", folder.id);
            return Ok(folder.id);
        }

        let created = self
            .client
            .create_file(CreateFileRequest {
                name: ROOT_FOLDER_NAME.to_string(),
                mime_type: FOLDER_MIME_TYPE.to_string(),
                parents: None,
                app_properties: Some(BTreeMap::from([(
                    DIR_TYPE_KEY.to_string(),
                    ROOT_DIR_TYPE.to_string(),
                )])),
            })
            .await?;
        debug!("created root folder {}", created.id);
        Ok(created.id)
    }

    async fn resolve_config(&mut self, root_folder_id: &str) -> Result<AppConfig> {
        let listed = self
            .client
            .list_files(ListFilesParams::newest_first(
                ListFilesQuery::default()
                    .mime_type(TEXT_MIME_TYPE)
                    .parent(root_folder_id)
                    .app_property(FILE_TYPE_KEY, CONFIG_FILE_TYPE),
            ))
            .await?;

        if let Some(file) = listed.files.into_iter().next() {
            debug!("loading configuration from {}", file.id);
            let text = self.client.download_text_file(&file.id).await?;
            return AppConfig::from_text(&text);
        }

        debug!("no remote configuration found, uploading the defaults");
        let config = default_app_configuration();
        let created = self
            .client
            .create_file(CreateFileRequest {
                name: CONFIG_FILE_NAME.to_string(),
                mime_type: TEXT_MIME_TYPE.to_string(),
                parents: Some(vec![root_folder_id.to_string()]),
                app_properties: Some(BTreeMap::from([(
                    FILE_TYPE_KEY.to_string(),
                    CONFIG_FILE_TYPE.to_string(),
                )])),
            })
            .await?;
        self.client
            .upload_file_content(&created.id, TEXT_MIME_TYPE, config.to_text()?)
            .await?;
        Ok(config)
    }
}
