//! Command handler for branded tokens.
//!
//! Each command goes through the same four steps: structural validation,
//! existence and ownership checks against the registry, mutation of the
//! registry and the coin ledger, and event emission. Commands are processed
//! one at a time; the `&mut Keeper` borrow enforces a single writer.
//!
//! The registry amount is authoritative and kept equal to what the coin
//! ledger has issued under the token's denomination. Every path that touches
//! both sides pairs the second step with a compensation that undoes the first
//! if the second one fails.

use crate::address::AccountAddress;
use crate::error::TokenError;
use crate::events::{
    Event, EventManager, ATTRIBUTE_KEY_ACTION, ATTRIBUTE_KEY_AMOUNT, ATTRIBUTE_KEY_MODULE,
    ATTRIBUTE_KEY_SENDER, EVENT_TYPE_MESSAGE,
};
use crate::keeper::Keeper;
use crate::ledger::{CoinLedger, Coins};
use crate::msgs::{
    Msg, MsgBurnBrandedToken, MsgCreateBrandedToken, MsgMintBrandedToken,
    MsgTransferBrandedTokenOwnership, TokenMsg,
};
use crate::slug;
use crate::storage_traits::RecordStore;
use crate::token::BrandedToken;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Outcome of a successfully applied command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerResult {
    pub events: Vec<Event>,
}

/// Run `action`; if it fails, run `compensate` to undo earlier side effects
///
/// The original error is always returned. A failing compensation is logged,
/// since at that point the two sides can no longer be reconciled locally.
pub fn try_with_compensation<C, T, E, F>(
    ctx: &mut C,
    action: impl FnOnce(&mut C) -> Result<T, E>,
    compensate: impl FnOnce(&mut C) -> Result<(), F>,
) -> Result<T, E>
where
    E: Display,
    F: Display,
{
    match action(ctx) {
        Ok(value) => Ok(value),
        Err(err) => {
            log::warn!("compensating after failure: {}", err);
            if let Err(comp_err) = compensate(ctx) {
                log::error!("compensation failed after `{}`: {}", err, comp_err);
            }
            Err(err)
        }
    }
}

/// Validate and apply a single command
pub fn handle<S, L>(keeper: &mut Keeper<S, L>, msg: TokenMsg) -> Result<HandlerResult, TokenError>
where
    S: RecordStore,
    L: CoinLedger,
{
    if let Err(err) = msg.validate_basic() {
        log::warn!(target: keeper.log_target(), "rejected {}: {}", msg.msg_type(), err);
        return Err(err);
    }

    let mut events = EventManager::new();
    let outcome = match &msg {
        TokenMsg::Create(msg) => handle_create(keeper, &mut events, msg),
        TokenMsg::TransferOwnership(msg) => handle_transfer_ownership(keeper, &mut events, msg),
        TokenMsg::Mint(msg) => handle_mint(keeper, &mut events, msg),
        TokenMsg::Burn(msg) => handle_burn(keeper, &mut events, msg),
    };

    match outcome {
        Ok(()) => {
            for event in events.events() {
                log::info!(target: keeper.log_target(), "{}", event);
            }
            Ok(HandlerResult {
                events: events.into_events(),
            })
        }
        Err(err) => {
            log::warn!(
                target: keeper.log_target(),
                "{} on `{}` failed: {}",
                msg.msg_type(),
                msg.name(),
                err
            );
            Err(err)
        }
    }
}

/// Load a token and make sure `sender` owns it
fn load_owned<S: RecordStore, L: CoinLedger>(
    keeper: &Keeper<S, L>,
    token_slug: &str,
    sender: &AccountAddress,
) -> Result<BrandedToken, TokenError> {
    let token = keeper
        .get(token_slug)?
        .ok_or_else(|| TokenError::NotFound(token_slug.to_string()))?;

    if !token.is_owned_by(sender) {
        return Err(TokenError::NotOwner {
            slug: token_slug.to_string(),
            sender: sender.to_prefixed(&keeper.config().address_prefix),
        });
    }
    Ok(token)
}

fn message_event<S: RecordStore, L: CoinLedger>(
    keeper: &Keeper<S, L>,
    msg: &dyn Msg,
    sender: &AccountAddress,
    amount: Option<&BigInt>,
) -> Event {
    let config = keeper.config();
    let event = Event::new(EVENT_TYPE_MESSAGE)
        .with_attribute(ATTRIBUTE_KEY_MODULE, config.module_name.as_str())
        .with_attribute(ATTRIBUTE_KEY_ACTION, msg.msg_type())
        .with_attribute(ATTRIBUTE_KEY_SENDER, sender.to_prefixed(&config.address_prefix));

    match amount {
        Some(amount) => event.with_attribute(ATTRIBUTE_KEY_AMOUNT, amount.to_string()),
        None => event,
    }
}

fn handle_create<S: RecordStore, L: CoinLedger>(
    keeper: &mut Keeper<S, L>,
    events: &mut EventManager,
    msg: &MsgCreateBrandedToken,
) -> Result<(), TokenError> {
    let token_slug = slug::normalize(&msg.name);

    if keeper.has(&token_slug)? {
        return Err(TokenError::AlreadyExists(token_slug));
    }

    let token = BrandedToken::new(
        msg.name.clone(),
        msg.initial_supply.clone(),
        msg.creator.clone(),
    );
    let coins = Coins::single(token.name.clone(), token.amount.clone())?;

    // Reserve the slug before touching the ledger; release it if the credit fails
    keeper.set(&token_slug, &token)?;
    if !coins.is_empty() {
        try_with_compensation(
            keeper,
            |k| {
                k.ledger_mut()
                    .add_coins(&token.owner, &coins)
                    .map_err(TokenError::from)
            },
            |k| k.delete(&token_slug),
        )?;
    }

    events.emit(message_event(keeper, msg, &msg.creator, Some(&msg.initial_supply)));
    Ok(())
}

fn handle_transfer_ownership<S: RecordStore, L: CoinLedger>(
    keeper: &mut Keeper<S, L>,
    events: &mut EventManager,
    msg: &MsgTransferBrandedTokenOwnership,
) -> Result<(), TokenError> {
    let token_slug = slug::normalize(&msg.name);
    let mut token = load_owned(keeper, &token_slug, &msg.previous_owner)?;

    token.owner = msg.new_owner.clone();
    keeper.set(&token_slug, &token)?;

    events.emit(message_event(keeper, msg, &msg.previous_owner, None));
    Ok(())
}

fn handle_mint<S: RecordStore, L: CoinLedger>(
    keeper: &mut Keeper<S, L>,
    events: &mut EventManager,
    msg: &MsgMintBrandedToken,
) -> Result<(), TokenError> {
    let token_slug = slug::normalize(&msg.name);
    let mut token = load_owned(keeper, &token_slug, &msg.owner)?;
    let coins = Coins::single(token.name.clone(), msg.amount.clone())?;

    // Ledger first: nothing has been written yet if the credit is refused
    keeper.ledger_mut().add_coins(&msg.owner, &coins)?;

    token.amount += &msg.amount;
    try_with_compensation(
        keeper,
        |k| k.set(&token_slug, &token),
        |k| k.ledger_mut().subtract_coins(&msg.owner, &coins),
    )?;

    events.emit(message_event(keeper, msg, &msg.owner, Some(&msg.amount)));
    Ok(())
}

fn handle_burn<S: RecordStore, L: CoinLedger>(
    keeper: &mut Keeper<S, L>,
    events: &mut EventManager,
    msg: &MsgBurnBrandedToken,
) -> Result<(), TokenError> {
    let token_slug = slug::normalize(&msg.name);
    let mut token = load_owned(keeper, &token_slug, &msg.owner)?;
    let coins = Coins::single(token.name.clone(), msg.amount.clone())?;

    // Ledger first: an insufficient balance aborts before the registry changes
    keeper.ledger_mut().subtract_coins(&msg.owner, &coins)?;

    token.amount -= &msg.amount;
    try_with_compensation(
        keeper,
        |k| k.set(&token_slug, &token),
        |k| k.ledger_mut().add_coins(&msg.owner, &coins),
    )?;

    events.emit(message_event(keeper, msg, &msg.owner, Some(&msg.amount)));
    Ok(())
}
