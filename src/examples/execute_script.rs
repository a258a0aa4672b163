//! Run read-only Cadence scripts.

use std::sync::Arc;

use serde::Serialize;

use crate::error::{ExampleError, ExampleResult};
use crate::scripts::ScriptLoader;
use crate::sdk::{AccessApi, AccessApiExt, CadenceValue, FlowAddress, ScriptRequest, ScriptResponse, UFix64};

/// The struct returned by the complex script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub balance: UFix64,
    pub address: FlowAddress,
    pub name: String,
}

impl TryFrom<&CadenceValue> for User {
    type Error = ExampleError;

    fn try_from(value: &CadenceValue) -> Result<Self, Self::Error> {
        Ok(Self {
            balance: value.field("balance")?.as_ufix64()?,
            address: value.field("address")?.as_address()?,
            name: value.field("name")?.as_str()?.to_string(),
        })
    }
}

pub struct ExecuteScriptExample {
    api: Arc<dyn AccessApi>,
    scripts: ScriptLoader,
}

impl ExecuteScriptExample {
    pub fn new(api: Arc<dyn AccessApi>, scripts: ScriptLoader) -> Self {
        Self { api, scripts }
    }

    /// `main(a: Int)` called with 5.
    pub async fn execute_simple_script(&self) -> ExampleResult<ScriptResponse> {
        let script = self.scripts.load_script_content("cadence/execute_simple_script_example.cdc")?;
        let response = self
            .api
            .simple_script(ScriptRequest::new(script).arg(CadenceValue::int(5)))
            .await?;
        Ok(response)
    }

    /// `main(name: String)` returning a `User` struct.
    pub async fn execute_complex_script(&self) -> ExampleResult<User> {
        let script = self.scripts.load_script_content("cadence/execute_complex_script_example.cdc")?;
        let response = self
            .api
            .simple_script(ScriptRequest::new(script).arg(CadenceValue::string("my_name")))
            .await?;
        User::try_from(&response.value()?)
    }
}
