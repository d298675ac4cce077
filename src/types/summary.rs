//! Display-ready account summary
//!
//! Serialises to the JSON shape clients of the shop already consume:
//! `coins`, `inventory[{type, quantity}]` and
//! `coinHistory{received[{fromUser, amount}], sent[{toUser, amount}]}`.

use super::account::{AccountId, Coins};
use serde::{Deserialize, Serialize};

/// Balance, owned items and transfer history of one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    #[serde(skip_serializing)]
    pub account: AccountId,
    #[serde(skip_serializing)]
    pub identity: String,
    pub coins: Coins,
    pub inventory: Vec<InventoryItem>,
    pub coin_history: CoinHistory,
}

impl Summary {
    /// Sum of coins received over the whole history
    pub fn total_received(&self) -> Coins {
        self.coin_history.received.iter().map(|r| r.amount).sum()
    }

    /// Sum of coins sent over the whole history
    pub fn total_sent(&self) -> Coins {
        self.coin_history.sent.iter().map(|s| s.amount).sum()
    }
}

/// Count of one purchased item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    #[serde(rename = "type")]
    pub name: String,
    pub quantity: u32,
}

/// Transfer history split by direction, most recent first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinHistory {
    pub received: Vec<ReceivedCoins>,
    pub sent: Vec<SentCoins>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedCoins {
    /// Sender identity, absent when it could not be resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_user: Option<String>,
    pub amount: Coins,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentCoins {
    /// Receiver identity, absent when it could not be resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_user: Option<String>,
    pub amount: Coins,
}
