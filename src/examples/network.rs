//! Node and network information.

use std::sync::Arc;

use crate::error::ExampleResult;
use crate::sdk::{AccessApi, ChainId, NodeVersionInfo};

pub struct GetNetworkParametersExample {
    api: Arc<dyn AccessApi>,
}

impl GetNetworkParametersExample {
    pub fn new(api: Arc<dyn AccessApi>) -> Self {
        Self { api }
    }

    pub async fn get_network_parameters(&self) -> ExampleResult<ChainId> {
        Ok(self.api.get_network_parameters().await?)
    }
}

pub struct GetNodeVersionInfoExample {
    api: Arc<dyn AccessApi>,
}

impl GetNodeVersionInfoExample {
    pub fn new(api: Arc<dyn AccessApi>) -> Self {
        Self { api }
    }

    pub async fn get_node_version_info(&self) -> ExampleResult<NodeVersionInfo> {
        Ok(self.api.get_node_version_info().await?)
    }
}
