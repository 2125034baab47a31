//! JavaScript-facing façade over [`LifeGoalEngine`].
//!
//! Results cross the boundary as plain JS objects parsed from the engine's
//! JSON documents; failures reject with a message string.
use lifegoal_game::{Currency, EngineError, GameConfig, JournalZone, LifeGoalEngine, RewardSource};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::storage::{LocalStorageStore, WebStorageError};

#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("unknown currency: {0}")]
    UnknownCurrency(String),
    #[error("unknown journal zone: {0}")]
    UnknownZone(String),
    #[error("invalid config: {0}")]
    Config(String),
    #[error(transparent)]
    Storage(#[from] WebStorageError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<WebError> for JsValue {
    fn from(err: WebError) -> Self {
        Self::from_str(&err.to_string())
    }
}

/// Parse a currency name as used by the UI (`dice`, `tokens`, `hearts`, `gold`).
///
/// # Errors
///
/// Returns [`WebError::UnknownCurrency`] for anything else.
pub fn parse_currency(raw: &str) -> Result<Currency, WebError> {
    raw.trim()
        .to_ascii_lowercase()
        .parse()
        .map_err(|()| WebError::UnknownCurrency(raw.to_string()))
}

/// # Errors
///
/// Returns [`WebError::UnknownZone`] for names other than the four zones.
pub fn parse_zone(raw: &str) -> Result<JournalZone, WebError> {
    raw.trim()
        .to_ascii_lowercase()
        .parse()
        .map_err(|()| WebError::UnknownZone(raw.to_string()))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(value).map_err(WebError::from)?;
    js_sys::JSON::parse(&json)
}

#[wasm_bindgen]
pub struct LifeGoalApp {
    engine: LifeGoalEngine<LocalStorageStore>,
}

#[wasm_bindgen]
impl LifeGoalApp {
    /// Open the engine for `user_id`. `config` may be `undefined` or a
    /// partial config object.
    #[wasm_bindgen(constructor)]
    pub fn new(user_id: &str, config: JsValue) -> Result<LifeGoalApp, JsValue> {
        let config = if config.is_undefined() || config.is_null() {
            GameConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|err| WebError::Config(err.to_string()))?
        };
        let store = LocalStorageStore::new().map_err(WebError::from)?;
        Ok(Self {
            engine: LifeGoalEngine::new(store, user_id, config),
        })
    }

    #[wasm_bindgen(getter, js_name = userId)]
    pub fn user_id(&self) -> String {
        self.engine.user_id().to_string()
    }

    /// `{ dice, game_tokens, hearts, gold }`
    pub fn balance(&self) -> Result<JsValue, JsValue> {
        #[derive(Serialize)]
        struct Wallet {
            dice: u64,
            game_tokens: u64,
            hearts: u64,
            gold: u64,
        }
        let ledger = self.engine.ledger();
        to_js(&Wallet {
            dice: ledger.balance.dice,
            game_tokens: ledger.balance.game_tokens,
            hearts: ledger.balance.hearts,
            gold: ledger.gold.gold,
        })
    }

    #[wasm_bindgen(js_name = rewardLog)]
    pub fn reward_log(&self, count: usize) -> Result<JsValue, JsValue> {
        to_js(&self.engine.reward_log(count))
    }

    pub fn credit(&self, currency: &str, amount: u32, context: &str) -> Result<f64, JsValue> {
        let currency = parse_currency(currency)?;
        let total = self.engine.credit(
            RewardSource::Adjustment,
            currency,
            u64::from(amount),
            context,
        );
        Ok(balance_to_f64(total))
    }

    pub fn debit(&self, currency: &str, amount: u32, context: &str) -> Result<f64, JsValue> {
        let currency = parse_currency(currency)?;
        let removed = self.engine.debit(
            RewardSource::Adjustment,
            currency,
            u64::from(amount),
            context,
        );
        Ok(balance_to_f64(removed))
    }

    /// All-or-nothing purchase; rejects when the balance is short.
    pub fn spend(&self, currency: &str, amount: u32, context: &str) -> Result<f64, JsValue> {
        let currency = parse_currency(currency)?;
        let remaining = self
            .engine
            .spend(RewardSource::Purchase, currency, u64::from(amount), context)
            .map_err(WebError::from)?;
        Ok(balance_to_f64(remaining))
    }

    #[wasm_bindgen(js_name = luckyRollBoard)]
    pub fn lucky_roll_board(&self) -> Result<JsValue, JsValue> {
        #[derive(Serialize)]
        struct Board<'a> {
            state: &'a lifegoal_game::LuckyRollState,
            tiles: Vec<lifegoal_game::TileKind>,
        }
        let state = self.engine.lucky_roll_state();
        let tiles = state.tiles(&self.engine.config().lucky_roll);
        to_js(&Board {
            state: &state,
            tiles,
        })
    }

    #[wasm_bindgen(js_name = rollDice)]
    pub fn roll_dice(&mut self) -> Result<JsValue, JsValue> {
        let outcome = self.engine.roll_dice().map_err(WebError::from)?;
        to_js(&outcome)
    }

    #[wasm_bindgen(js_name = focusSession)]
    pub fn focus_session(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.focus_session())
    }

    #[wasm_bindgen(js_name = startFocus)]
    pub fn start_focus(&self, minutes: u32) -> Result<(), JsValue> {
        Ok(self.engine.start_focus(minutes).map_err(WebError::from)?)
    }

    #[wasm_bindgen(js_name = pauseFocus)]
    pub fn pause_focus(&self) -> Result<(), JsValue> {
        Ok(self.engine.pause_focus().map_err(WebError::from)?)
    }

    #[wasm_bindgen(js_name = resumeFocus)]
    pub fn resume_focus(&self) -> Result<(), JsValue> {
        Ok(self.engine.resume_focus().map_err(WebError::from)?)
    }

    /// Advance the running session; returns the status name.
    #[wasm_bindgen(js_name = tickFocus)]
    pub fn tick_focus(&self, secs: u32) -> Result<String, JsValue> {
        let status = self.engine.tick_focus(secs).map_err(WebError::from)?;
        Ok(status.to_string())
    }

    #[wasm_bindgen(js_name = abandonFocus)]
    pub fn abandon_focus(&self) -> Result<(), JsValue> {
        Ok(self.engine.abandon_focus().map_err(WebError::from)?)
    }

    #[wasm_bindgen(js_name = claimFocusReward)]
    pub fn claim_focus_reward(&self) -> Result<JsValue, JsValue> {
        let grants = self.engine.claim_focus_reward().map_err(WebError::from)?;
        to_js(&grants)
    }

    #[wasm_bindgen(js_name = journalPrompt)]
    pub fn journal_prompt(&mut self, zone: &str) -> Result<String, JsValue> {
        let zone = parse_zone(zone)?;
        Ok(self.engine.journal_prompt(zone).to_string())
    }

    #[wasm_bindgen(js_name = submitJournal)]
    pub fn submit_journal(
        &self,
        prompt: &str,
        response: &str,
        zone: &str,
    ) -> Result<JsValue, JsValue> {
        let zone = parse_zone(zone)?;
        let outcome = self
            .engine
            .submit_journal(prompt, response, zone)
            .map_err(WebError::from)?;
        to_js(&outcome)
    }

    #[wasm_bindgen(js_name = journalEntries)]
    pub fn journal_entries(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.journal().entries)
    }

    #[wasm_bindgen(js_name = freeSpinAvailable)]
    pub fn free_spin_available(&self) -> bool {
        self.engine.free_spin_available()
    }

    #[wasm_bindgen(js_name = wheelSegments)]
    pub fn wheel_segments(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.config().wheel.segments)
    }

    #[wasm_bindgen(js_name = spinWheel)]
    pub fn spin_wheel(&mut self) -> Result<JsValue, JsValue> {
        let outcome = self.engine.spin_wheel().map_err(WebError::from)?;
        to_js(&outcome)
    }

    pub fn campaign(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.campaign())
    }

    #[wasm_bindgen(js_name = completeCampaignNode)]
    pub fn complete_campaign_node(&self, node_id: &str) -> Result<JsValue, JsValue> {
        let completion = self
            .engine
            .complete_campaign_node(node_id)
            .map_err(WebError::from)?;
        to_js(&completion)
    }

    /// Forget everything stored for this user.
    #[wasm_bindgen(js_name = resetUser)]
    pub fn reset_user(&self) {
        self.engine.reset_user();
    }
}

#[allow(clippy::cast_precision_loss)]
fn balance_to_f64(value: u64) -> f64 {
    value as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_names_are_case_insensitive() {
        assert_eq!(parse_currency(" Dice ").unwrap(), Currency::Dice);
        assert_eq!(parse_currency("tokens").unwrap(), Currency::GameTokens);
        assert_eq!(parse_currency("COINS").unwrap(), Currency::Gold);
        assert!(matches!(
            parse_currency("rubies"),
            Err(WebError::UnknownCurrency(name)) if name == "rubies"
        ));
    }

    #[test]
    fn zones_parse_from_ui_labels() {
        assert_eq!(parse_zone("Spirit").unwrap(), JournalZone::Spirit);
        assert!(matches!(parse_zone("soul"), Err(WebError::UnknownZone(_))));
    }
}
