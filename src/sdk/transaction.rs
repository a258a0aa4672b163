//! Transactions and their canonical (RLP) forms.
//!
//! Signatures are computed over two of the canonical forms:
//! - payload signatures sign the payload
//! - envelope signatures sign the payload plus the payload signatures
//!
//! The transaction ID is the SHA3-256 hash of the full canonical transaction.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sdk::cadence::{CadenceError, CadenceValue};
use crate::sdk::crypto::{sha3_256, CryptoError, Signer};
use crate::sdk::encoding::{
    rlp_bytes, rlp_bytes_list, rlp_list, rlp_take_bytes, rlp_take_bytes_list, rlp_take_list,
    rlp_take_u64, rlp_u64,
};
use crate::sdk::types::{FlowAddress, FlowId, ModelError};

/// Errors raised while assembling, signing or decoding a transaction.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("{0} is not a signer of this transaction")]
    UnknownSigner(FlowAddress),

    #[error("signer index {0} is out of range")]
    SignerIndexOutOfRange(u64),

    #[error("invalid canonical transaction: {0}")]
    Decode(String),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Cadence(#[from] CadenceError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl From<alloy::rlp::Error> for TransactionError {
    fn from(err: alloy::rlp::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type for transaction operations.
pub type TxResult<T> = Result<T, TransactionError>;

/// The key whose sequence number the transaction consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalKey {
    pub address: FlowAddress,
    pub key_index: u32,
    pub sequence_number: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSignature {
    pub address: FlowAddress,
    pub signer_index: u32,
    pub key_index: u32,
    #[serde(with = "crate::sdk::encoding::hex_bytes")]
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(with = "crate::sdk::encoding::hex_bytes")]
    pub script: Vec<u8>,
    /// JSON-Cadence encoded arguments.
    #[serde(with = "crate::sdk::encoding::hex_bytes_list")]
    pub arguments: Vec<Vec<u8>>,
    pub reference_block_id: FlowId,
    pub gas_limit: u64,
    pub proposal_key: ProposalKey,
    pub payer: FlowAddress,
    pub authorizers: Vec<FlowAddress>,
    pub payload_signatures: Vec<TransactionSignature>,
    pub envelope_signatures: Vec<TransactionSignature>,
}

impl Transaction {
    /// An unsigned transaction without arguments or authorizers.
    pub fn new(
        script: impl Into<Vec<u8>>,
        reference_block_id: FlowId,
        gas_limit: u64,
        proposal_key: ProposalKey,
        payer: FlowAddress,
    ) -> Self {
        Self {
            script: script.into(),
            arguments: Vec::new(),
            reference_block_id,
            gas_limit,
            proposal_key,
            payer,
            authorizers: Vec::new(),
            payload_signatures: Vec::new(),
            envelope_signatures: Vec::new(),
        }
    }

    pub fn with_argument(mut self, argument: &CadenceValue) -> TxResult<Self> {
        self.arguments.push(argument.encode()?);
        Ok(self)
    }

    pub fn with_arguments<'a>(
        mut self,
        arguments: impl IntoIterator<Item = &'a CadenceValue>,
    ) -> TxResult<Self> {
        for argument in arguments {
            self.arguments.push(argument.encode()?);
        }
        Ok(self)
    }

    pub fn with_authorizer(mut self, authorizer: FlowAddress) -> Self {
        self.authorizers.push(authorizer);
        self
    }

    /// Proposer, payer, then authorizers; each address appears once.
    pub fn signer_list(&self) -> Vec<FlowAddress> {
        let mut seen = HashSet::new();
        std::iter::once(self.proposal_key.address)
            .chain(std::iter::once(self.payer))
            .chain(self.authorizers.iter().copied())
            .filter(|a| seen.insert(*a))
            .collect()
    }

    fn signer_index(&self, address: FlowAddress) -> TxResult<u32> {
        self.signer_list()
            .iter()
            .position(|a| *a == address)
            .map(|i| i as u32)
            .ok_or(TransactionError::UnknownSigner(address))
    }

    fn payload_fields(&self) -> Vec<u8> {
        rlp_list(&[
            rlp_bytes(&self.script),
            rlp_bytes_list(self.arguments.iter().map(Vec::as_slice)),
            rlp_bytes(self.reference_block_id.as_bytes()),
            rlp_u64(self.gas_limit),
            rlp_bytes(self.proposal_key.address.as_bytes()),
            rlp_u64(u64::from(self.proposal_key.key_index)),
            rlp_u64(self.proposal_key.sequence_number),
            rlp_bytes(self.payer.as_bytes()),
            rlp_bytes_list(self.authorizers.iter().map(FlowAddress::as_bytes)),
        ])
    }

    /// Bytes signed by payload signatures.
    pub fn canonical_payload(&self) -> Vec<u8> {
        self.payload_fields()
    }

    /// Bytes signed by envelope signatures.
    pub fn canonical_authorization_envelope(&self) -> Vec<u8> {
        rlp_list(&[self.payload_fields(), encode_signatures(&self.payload_signatures)])
    }

    pub fn canonical_payment_envelope(&self) -> Vec<u8> {
        rlp_list(&[
            self.canonical_authorization_envelope(),
            encode_signatures(&self.envelope_signatures),
        ])
    }

    pub fn canonical_transaction(&self) -> Vec<u8> {
        rlp_list(&[
            self.payload_fields(),
            encode_signatures(&self.payload_signatures),
            encode_signatures(&self.envelope_signatures),
        ])
    }

    pub fn id(&self) -> FlowId {
        FlowId::new(sha3_256(&self.canonical_transaction()))
    }

    /// Sign the payload as `address` with the given key.
    pub fn add_payload_signature(
        &mut self,
        address: FlowAddress,
        key_index: u32,
        signer: &dyn Signer,
    ) -> TxResult<()> {
        let signature = signer.sign_as_transaction(&self.canonical_payload())?;
        self.add_payload_signature_bytes(address, key_index, signature)
    }

    pub fn add_payload_signature_bytes(
        &mut self,
        address: FlowAddress,
        key_index: u32,
        signature: Vec<u8>,
    ) -> TxResult<()> {
        let signer_index = self.signer_index(address)?;
        insert_sorted(
            &mut self.payload_signatures,
            TransactionSignature {
                address,
                signer_index,
                key_index,
                signature,
            },
        );
        Ok(())
    }

    /// Sign the authorization envelope as `address`. Add payload signatures first.
    pub fn add_envelope_signature(
        &mut self,
        address: FlowAddress,
        key_index: u32,
        signer: &dyn Signer,
    ) -> TxResult<()> {
        let signature = signer.sign_as_transaction(&self.canonical_authorization_envelope())?;
        self.add_envelope_signature_bytes(address, key_index, signature)
    }

    pub fn add_envelope_signature_bytes(
        &mut self,
        address: FlowAddress,
        key_index: u32,
        signature: Vec<u8>,
    ) -> TxResult<()> {
        let signer_index = self.signer_index(address)?;
        insert_sorted(
            &mut self.envelope_signatures,
            TransactionSignature {
                address,
                signer_index,
                key_index,
                signature,
            },
        );
        Ok(())
    }

    /// Rebuild a transaction, signatures included, from its canonical encoding.
    pub fn decode_canonical(bytes: &[u8]) -> TxResult<Self> {
        let mut buf = bytes;
        let mut envelope = rlp_take_list(&mut buf)?;
        if !buf.is_empty() {
            return Err(TransactionError::Decode("trailing bytes after envelope".to_string()));
        }

        let mut payload = rlp_take_list(&mut envelope)?;
        let script = rlp_take_bytes(&mut payload)?.to_vec();
        let arguments = rlp_take_bytes_list(&mut payload)?;
        let reference_block_id = FlowId::from_slice(rlp_take_bytes(&mut payload)?)?;
        let gas_limit = rlp_take_u64(&mut payload)?;
        let proposer = FlowAddress::from_slice(rlp_take_bytes(&mut payload)?)?;
        let key_index = u32::try_from(rlp_take_u64(&mut payload)?)
            .map_err(|_| TransactionError::Decode("proposal key index overflows u32".to_string()))?;
        let sequence_number = rlp_take_u64(&mut payload)?;
        let payer = FlowAddress::from_slice(rlp_take_bytes(&mut payload)?)?;
        let authorizers = rlp_take_bytes_list(&mut payload)?
            .iter()
            .map(|a| FlowAddress::from_slice(a))
            .collect::<Result<Vec<_>, _>>()?;

        let mut tx = Transaction {
            script,
            arguments,
            reference_block_id,
            gas_limit,
            proposal_key: ProposalKey {
                address: proposer,
                key_index,
                sequence_number,
            },
            payer,
            authorizers,
            payload_signatures: Vec::new(),
            envelope_signatures: Vec::new(),
        };

        let signers = tx.signer_list();
        for raw in decode_signatures(&mut envelope)? {
            let address = signer_at(&signers, raw.0)?;
            tx.add_payload_signature_bytes(address, raw.1, raw.2)?;
        }
        for raw in decode_signatures(&mut envelope)? {
            let address = signer_at(&signers, raw.0)?;
            tx.add_envelope_signature_bytes(address, raw.1, raw.2)?;
        }
        Ok(tx)
    }
}

fn insert_sorted(signatures: &mut Vec<TransactionSignature>, signature: TransactionSignature) {
    signatures.push(signature);
    signatures.sort_by_key(|s| (s.signer_index, s.key_index));
}

fn encode_signatures(signatures: &[TransactionSignature]) -> Vec<u8> {
    let items: Vec<Vec<u8>> = signatures
        .iter()
        .map(|s| {
            rlp_list(&[
                rlp_u64(u64::from(s.signer_index)),
                rlp_u64(u64::from(s.key_index)),
                rlp_bytes(&s.signature),
            ])
        })
        .collect();
    rlp_list(&items)
}

fn decode_signatures(buf: &mut &[u8]) -> TxResult<Vec<(u64, u32, Vec<u8>)>> {
    let mut list = rlp_take_list(buf)?;
    let mut out = Vec::new();
    while !list.is_empty() {
        let mut item = rlp_take_list(&mut list)?;
        let signer_index = rlp_take_u64(&mut item)?;
        let key_index = u32::try_from(rlp_take_u64(&mut item)?)
            .map_err(|_| TransactionError::Decode("key index overflows u32".to_string()))?;
        let signature = rlp_take_bytes(&mut item)?.to_vec();
        out.push((signer_index, key_index, signature));
    }
    Ok(out)
}

fn signer_at(signers: &[FlowAddress], index: u64) -> TxResult<FlowAddress> {
    usize::try_from(index)
        .ok()
        .and_then(|i| signers.get(i).copied())
        .ok_or(TransactionError::SignerIndexOutOfRange(index))
}
