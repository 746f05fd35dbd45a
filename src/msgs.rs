//! Commands accepted by the branded token handler.
//!
//! Every message carries its own structural validation. `validate_basic`
//! never looks at the registry; it only rejects what is malformed on its face,
//! so failures here are always the client's fault and nothing is mutated.

use crate::address::AccountAddress;
use crate::config::DEFAULT_MODULE_NAME;
use crate::error::TokenError;
use crate::slug;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};

/// Router key messages of this module are dispatched on
pub const ROUTER_KEY: &str = DEFAULT_MODULE_NAME;

pub const TYPE_CREATE_BRANDED_TOKEN: &str = "CreateBrandedToken";
pub const TYPE_TRANSFER_BRANDED_TOKEN_OWNERSHIP: &str = "TransferBrandedTokenOwnership";
pub const TYPE_MINT_BRANDED_TOKEN: &str = "MintBrandedToken";
pub const TYPE_BURN_BRANDED_TOKEN: &str = "BurnBrandedToken";

/// Common surface of every message
pub trait Msg {
    /// Route key of the module handling the message
    fn route(&self) -> &'static str {
        ROUTER_KEY
    }

    /// Action name, used in events
    fn msg_type(&self) -> &'static str;

    /// Stateless structural checks
    fn validate_basic(&self) -> Result<(), TokenError>;

    /// Accounts that must have signed the message
    fn signers(&self) -> Vec<AccountAddress>;

    /// Canonical bytes to sign: JSON with keys sorted
    fn sign_bytes(&self) -> Result<Vec<u8>, TokenError>;
}

fn sorted_json<T: Serialize>(value: &T) -> Result<Vec<u8>, TokenError> {
    // serde_json::Value keeps object keys in a BTreeMap, so this sorts them
    let value = serde_json::to_value(value)?;
    Ok(serde_json::to_vec(&value)?)
}

fn require_address(address: &AccountAddress, field: &str) -> Result<(), TokenError> {
    if address.is_empty() {
        return Err(TokenError::Validation(format!("{} can't be empty", field)));
    }
    Ok(())
}

fn require_name(name: &str) -> Result<(), TokenError> {
    if name.is_empty() {
        return Err(TokenError::Validation("name can't be empty".to_string()));
    }
    if slug::normalize(name).is_empty() {
        return Err(TokenError::Validation(format!(
            "name `{}` must contain at least one letter or digit",
            name
        )));
    }
    Ok(())
}

/// Register a new branded token and issue its initial supply to the creator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgCreateBrandedToken {
    pub name: String,
    #[serde(rename = "supply", with = "crate::token::decimal")]
    pub initial_supply: BigInt,
    pub creator: AccountAddress,
}

impl MsgCreateBrandedToken {
    pub fn new(
        name: impl Into<String>,
        initial_supply: impl Into<BigInt>,
        creator: AccountAddress,
    ) -> Self {
        Self {
            name: name.into(),
            initial_supply: initial_supply.into(),
            creator,
        }
    }
}

impl Msg for MsgCreateBrandedToken {
    fn msg_type(&self) -> &'static str {
        TYPE_CREATE_BRANDED_TOKEN
    }

    fn validate_basic(&self) -> Result<(), TokenError> {
        require_address(&self.creator, "creator")?;
        require_name(&self.name)?;
        if self.initial_supply.is_negative() {
            return Err(TokenError::Validation("supply can't be less than 0".to_string()));
        }
        Ok(())
    }

    fn signers(&self) -> Vec<AccountAddress> {
        vec![self.creator.clone()]
    }

    fn sign_bytes(&self) -> Result<Vec<u8>, TokenError> {
        sorted_json(&TokenMsg::Create(self.clone()))
    }
}

/// Hand a branded token over to a new owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgTransferBrandedTokenOwnership {
    pub name: String,
    pub previous_owner: AccountAddress,
    pub new_owner: AccountAddress,
}

impl MsgTransferBrandedTokenOwnership {
    pub fn new(
        name: impl Into<String>,
        previous_owner: AccountAddress,
        new_owner: AccountAddress,
    ) -> Self {
        Self {
            name: name.into(),
            previous_owner,
            new_owner,
        }
    }
}

impl Msg for MsgTransferBrandedTokenOwnership {
    fn msg_type(&self) -> &'static str {
        TYPE_TRANSFER_BRANDED_TOKEN_OWNERSHIP
    }

    fn validate_basic(&self) -> Result<(), TokenError> {
        require_address(&self.previous_owner, "previous_owner")?;
        require_address(&self.new_owner, "new_owner")?;
        require_name(&self.name)
    }

    fn signers(&self) -> Vec<AccountAddress> {
        vec![self.previous_owner.clone()]
    }

    fn sign_bytes(&self) -> Result<Vec<u8>, TokenError> {
        sorted_json(&TokenMsg::TransferOwnership(self.clone()))
    }
}

/// Issue more units of a branded token to its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgMintBrandedToken {
    pub owner: AccountAddress,
    pub name: String,
    #[serde(with = "crate::token::decimal")]
    pub amount: BigInt,
}

impl MsgMintBrandedToken {
    pub fn new(owner: AccountAddress, name: impl Into<String>, amount: impl Into<BigInt>) -> Self {
        Self {
            owner,
            name: name.into(),
            amount: amount.into(),
        }
    }
}

impl Msg for MsgMintBrandedToken {
    fn msg_type(&self) -> &'static str {
        TYPE_MINT_BRANDED_TOKEN
    }

    fn validate_basic(&self) -> Result<(), TokenError> {
        require_address(&self.owner, "owner")?;
        require_name(&self.name)?;
        require_positive(&self.amount)
    }

    fn signers(&self) -> Vec<AccountAddress> {
        vec![self.owner.clone()]
    }

    fn sign_bytes(&self) -> Result<Vec<u8>, TokenError> {
        sorted_json(&TokenMsg::Mint(self.clone()))
    }
}

/// Destroy units of a branded token held by its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgBurnBrandedToken {
    pub owner: AccountAddress,
    pub name: String,
    #[serde(with = "crate::token::decimal")]
    pub amount: BigInt,
}

impl MsgBurnBrandedToken {
    pub fn new(owner: AccountAddress, name: impl Into<String>, amount: impl Into<BigInt>) -> Self {
        Self {
            owner,
            name: name.into(),
            amount: amount.into(),
        }
    }
}

impl Msg for MsgBurnBrandedToken {
    fn msg_type(&self) -> &'static str {
        TYPE_BURN_BRANDED_TOKEN
    }

    fn validate_basic(&self) -> Result<(), TokenError> {
        require_address(&self.owner, "owner")?;
        require_name(&self.name)?;
        require_positive(&self.amount)
    }

    fn signers(&self) -> Vec<AccountAddress> {
        vec![self.owner.clone()]
    }

    fn sign_bytes(&self) -> Result<Vec<u8>, TokenError> {
        sorted_json(&TokenMsg::Burn(self.clone()))
    }
}

fn require_positive(amount: &BigInt) -> Result<(), TokenError> {
    if amount.is_zero() || amount.is_negative() {
        return Err(TokenError::Validation("amount must be greater than 0".to_string()));
    }
    Ok(())
}

/// Any message the handler understands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum TokenMsg {
    #[serde(rename = "surprise/CreateBrandedToken")]
    Create(MsgCreateBrandedToken),
    #[serde(rename = "surprise/TransferBrandedTokenOwnership")]
    TransferOwnership(MsgTransferBrandedTokenOwnership),
    #[serde(rename = "surprise/MintBrandedToken")]
    Mint(MsgMintBrandedToken),
    #[serde(rename = "surprise/BurnBrandedToken")]
    Burn(MsgBurnBrandedToken),
}

impl TokenMsg {
    fn inner(&self) -> &dyn Msg {
        match self {
            TokenMsg::Create(msg) => msg,
            TokenMsg::TransferOwnership(msg) => msg,
            TokenMsg::Mint(msg) => msg,
            TokenMsg::Burn(msg) => msg,
        }
    }

    /// Name of the token the message refers to
    pub fn name(&self) -> &str {
        match self {
            TokenMsg::Create(msg) => &msg.name,
            TokenMsg::TransferOwnership(msg) => &msg.name,
            TokenMsg::Mint(msg) => &msg.name,
            TokenMsg::Burn(msg) => &msg.name,
        }
    }
}

impl Msg for TokenMsg {
    fn route(&self) -> &'static str {
        self.inner().route()
    }

    fn msg_type(&self) -> &'static str {
        self.inner().msg_type()
    }

    fn validate_basic(&self) -> Result<(), TokenError> {
        self.inner().validate_basic()
    }

    fn signers(&self) -> Vec<AccountAddress> {
        self.inner().signers()
    }

    fn sign_bytes(&self) -> Result<Vec<u8>, TokenError> {
        sorted_json(self)
    }
}

impl From<MsgCreateBrandedToken> for TokenMsg {
    fn from(msg: MsgCreateBrandedToken) -> Self {
        TokenMsg::Create(msg)
    }
}

impl From<MsgTransferBrandedTokenOwnership> for TokenMsg {
    fn from(msg: MsgTransferBrandedTokenOwnership) -> Self {
        TokenMsg::TransferOwnership(msg)
    }
}

impl From<MsgMintBrandedToken> for TokenMsg {
    fn from(msg: MsgMintBrandedToken) -> Self {
        TokenMsg::Mint(msg)
    }
}

impl From<MsgBurnBrandedToken> for TokenMsg {
    fn from(msg: MsgBurnBrandedToken) -> Self {
        TokenMsg::Burn(msg)
    }
}
