//! Refresh payloads for the picker's "refresh listings" action.
//!
//! Transport-agnostic: the host decodes the request body, calls
//! [`SubfolderImageLoader::handle_refresh`] and replies with
//! [`RefreshResponse::status`] and the serialized response.

use serde::{Deserialize, Serialize};

use crate::catalog::filter_for_subfolder;

use super::node::SubfolderImageLoader;

/// Refresh request sent by the picker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    /// Opaque id of the requesting node; only used for logging.
    #[serde(default)]
    pub node_id: Option<serde_json::Value>,
    /// Currently selected subfolder, `""` or missing for the root.
    #[serde(default)]
    pub subfolder: Option<String>,
}

/// Refresh response, serialized exactly as the picker expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefreshResponse {
    Listing {
        success: bool,
        subfolders: Vec<String>,
        /// Full catalog, for client-side filtering.
        images: Vec<String>,
        /// Images of `current_subfolder`, as bare filenames.
        filtered_images: Vec<String>,
        current_subfolder: String,
    },
    Failure {
        success: bool,
        error: String,
    },
}

impl RefreshResponse {
    /// A failed refresh.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            success: false,
            error: error.into(),
        }
    }

    /// HTTP status the host should answer with.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Listing { .. } => 200,
            Self::Failure { .. } => 500,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Listing { .. })
    }
}

impl SubfolderImageLoader {
    /// Rescan the input directory, bypassing cached listings.
    #[must_use]
    pub fn refresh(&self, request: &RefreshRequest) -> RefreshResponse {
        let subfolder = request.subfolder.clone().unwrap_or_default();

        tracing::debug!(
            "Refreshing listings for node {:?}, subfolder '{subfolder}'",
            request.node_id
        );

        let index = self.index();
        let subfolders = index.list_subfolders();
        let images = index.rescan_all_images();
        let filtered_images = filter_for_subfolder(&images, &subfolder);

        RefreshResponse::Listing {
            success: true,
            subfolders,
            images,
            filtered_images,
            current_subfolder: subfolder,
        }
    }

    /// Decode a JSON request body and refresh. Malformed bodies produce a
    /// failure response rather than an error.
    #[must_use]
    pub fn handle_refresh(&self, body: &str) -> RefreshResponse {
        match serde_json::from_str::<RefreshRequest>(body) {
            Ok(request) => self.refresh(&request),
            Err(err) => {
                tracing::error!("Refresh error: {err}");
                RefreshResponse::failure(err.to_string())
            }
        }
    }
}
