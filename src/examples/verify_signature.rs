//! Verify user signatures on chain with Cadence scripts.
//!
//! Messages are signed with a plain SHA3-256 signer and the scripts verify
//! with an empty domain separation tag.

use std::sync::Arc;

use crate::error::ExampleResult;
use crate::scripts::ScriptLoader;
use crate::sdk::crypto::{generate_key_pair, get_signer};
use crate::sdk::{
    AccessApi, AccessApiExt, CadenceValue, FlowAddress, HashAlgorithm, PrivateKey, ScriptRequest,
    SignatureAlgorithm, Signer, UFix64,
};

/// Message signed in the validate-all demo.
pub const VALIDATE_ALL_MESSAGE: &str = "ananas";

/// `alice || bob || amount` as the user signature script rebuilds it.
pub fn transfer_message(alice: FlowAddress, bob: FlowAddress, amount: UFix64) -> Vec<u8> {
    let mut message = Vec::with_capacity(24);
    message.extend_from_slice(alice.as_bytes());
    message.extend_from_slice(bob.as_bytes());
    message.extend_from_slice(&amount.to_big_endian_bytes());
    message
}

pub struct VerifySignatureExample {
    api: Arc<dyn AccessApi>,
    scripts: ScriptLoader,
}

impl VerifySignatureExample {
    pub fn new(api: Arc<dyn AccessApi>, scripts: ScriptLoader) -> Self {
        Self { api, scripts }
    }

    /// Two fresh keys of weight 0.5 each sign a transfer message; together they reach full weight.
    pub async fn user_signature(&self, alice: FlowAddress, bob: FlowAddress) -> ExampleResult<CadenceValue> {
        let alice_keys = generate_key_pair(SignatureAlgorithm::EcdsaP256);
        let bob_keys = generate_key_pair(SignatureAlgorithm::EcdsaP256);

        let amount: UFix64 = "100.00".parse()?;
        let half: UFix64 = "0.5".parse()?;
        let message = transfer_message(alice, bob, amount);
        tracing::debug!(message = %hex::encode(&message), "Signing transfer message");

        let alice_signature = get_signer(&alice_keys.private_key, HashAlgorithm::Sha3_256)?.sign(&message)?;
        let bob_signature = get_signer(&bob_keys.private_key, HashAlgorithm::Sha3_256)?.sign(&message)?;

        let script = self.scripts.load_script_content("cadence/user_signature.cdc")?;
        let request = ScriptRequest::new(script).args([
            CadenceValue::array([
                CadenceValue::string(alice_keys.public_key.to_hex()),
                CadenceValue::string(bob_keys.public_key.to_hex()),
            ]),
            CadenceValue::array([CadenceValue::ufix64(half), CadenceValue::ufix64(half)]),
            CadenceValue::array([
                CadenceValue::string(hex::encode(alice_signature)),
                CadenceValue::string(hex::encode(bob_signature)),
            ]),
            CadenceValue::address(alice),
            CadenceValue::address(bob),
            CadenceValue::ufix64(amount),
        ]);

        Ok(self.api.simple_script(request).await?.value()?)
    }

    /// Sign with the key behind account keys 0 and 1 and require both to verify.
    pub async fn validate_all(&self, alice: FlowAddress, alice_private_key: &PrivateKey) -> ExampleResult<CadenceValue> {
        let signer = get_signer(alice_private_key, HashAlgorithm::Sha3_256)?;
        let message = VALIDATE_ALL_MESSAGE.as_bytes();
        let first = signer.sign(message)?;
        let second = signer.sign(message)?;

        let script = self.scripts.load_script_content("cadence/user_signature_validate_all.cdc")?;
        let request = ScriptRequest::new(script).args([
            CadenceValue::address(alice),
            CadenceValue::array([
                CadenceValue::string(hex::encode(first)),
                CadenceValue::string(hex::encode(second)),
            ]),
            CadenceValue::array([CadenceValue::int(0), CadenceValue::int(1)]),
            CadenceValue::string(VALIDATE_ALL_MESSAGE),
        ]);

        Ok(self.api.simple_script(request).await?.value()?)
    }

    /// Any single account key verifying `message` is enough.
    pub async fn validate_any(
        &self,
        alice: FlowAddress,
        alice_private_key: &PrivateKey,
        message: &str,
    ) -> ExampleResult<bool> {
        let signature = get_signer(alice_private_key, HashAlgorithm::Sha3_256)?.sign(message.as_bytes())?;

        let script = self.scripts.load_script_content("cadence/user_signature_validate_any.cdc")?;
        let request = ScriptRequest::new(script).args([
            CadenceValue::address(alice),
            CadenceValue::string(hex::encode(signature)),
            CadenceValue::string(message),
        ]);

        Ok(self.api.simple_script(request).await?.value()?.as_bool()?)
    }
}
