//! Ball skin catalogue
//!
//! Skins are bought with coins collected during runs. Selecting a skin that is
//! not owned buys it first (if affordable), then equips it.

use thiserror::Error;

use crate::persistence::{PersistenceError, PlayerDataAction, PlayerDataStore};
use crate::platform::KeyValueStore;

/// A purchasable ball skin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skin {
    pub id: u32,
    pub name: &'static str,
    pub price: u64,
    pub asset: &'static str,
}

pub const SKINS: [Skin; 9] = [
    Skin {
        id: 0,
        name: "flux",
        price: 0,
        asset: "assets/bouncing-ball/1x/1.png",
    },
    Skin {
        id: 1,
        name: "burse",
        price: 100,
        asset: "assets/bouncing-ball/1x/2.png",
    },
    Skin {
        id: 2,
        name: "chaos",
        price: 200,
        asset: "assets/bouncing-ball/1x/3.png",
    },
    Skin {
        id: 3,
        name: "abstract",
        price: 300,
        asset: "assets/bouncing-ball/1x/4.png",
    },
    Skin {
        id: 4,
        name: "glitch",
        price: 400,
        asset: "assets/bouncing-ball/1x/5.png",
    },
    Skin {
        id: 5,
        name: "grain",
        price: 500,
        asset: "assets/bouncing-ball/1x/6.png",
    },
    Skin {
        id: 6,
        name: "holographic",
        price: 600,
        asset: "assets/bouncing-ball/1x/7.png",
    },
    Skin {
        id: 7,
        name: "scales",
        price: 700,
        asset: "assets/bouncing-ball/1x/8.png",
    },
    Skin {
        id: 8,
        name: "surf",
        price: 800,
        asset: "assets/bouncing-ball/1x/9.png",
    },
];

pub const DEFAULT_SKIN_ID: u32 = 0;

pub fn skin(id: u32) -> Option<&'static Skin> {
    SKINS.iter().find(|s| s.id == id)
}

#[derive(Debug, Error)]
pub enum SkinError {
    #[error("unknown skin id {0}")]
    Unknown(u32),
    #[error("skin costs {price} coins but only {available} available")]
    InsufficientCoins { price: u64, available: u64 },
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// What selecting a skin did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkinSelection {
    AlreadyEquipped,
    Equipped,
    Purchased { remaining_coins: u64 },
}

/// Buy (if needed) and equip a skin, persisting the result
pub fn select_skin<S: KeyValueStore>(
    store: &mut PlayerDataStore<S>,
    id: u32,
) -> Result<SkinSelection, SkinError> {
    let skin = skin(id).ok_or(SkinError::Unknown(id))?;
    let data = store.data().clone();

    if data.equipped_skin == id {
        return Ok(SkinSelection::AlreadyEquipped);
    }

    let mut selection = SkinSelection::Equipped;
    if !data.owned_skins.contains(&id) {
        if data.coins < skin.price {
            return Err(SkinError::InsufficientCoins {
                price: skin.price,
                available: data.coins,
            });
        }

        let remaining_coins = data.coins - skin.price;
        let mut owned = data.owned_skins;
        owned.push(id);

        store.apply(PlayerDataAction::SetCoins(remaining_coins), false)?;
        store.apply(PlayerDataAction::SetOwnedSkins(owned), false)?;
        log::info!("Purchased skin {} for {} coins", skin.name, skin.price);
        selection = SkinSelection::Purchased { remaining_coins };
    }

    store.apply(PlayerDataAction::SetEquippedSkin(id), true)?;
    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStorage;

    fn store_with_coins(coins: u64) -> PlayerDataStore<MemoryStorage> {
        let mut store = PlayerDataStore::load(MemoryStorage::new());
        store
            .apply(PlayerDataAction::SetCoins(coins), false)
            .expect("set coins");
        store
    }

    #[test]
    fn test_catalogue_ids_match_positions() {
        for (i, skin) in SKINS.iter().enumerate() {
            assert_eq!(skin.id as usize, i);
        }
        assert_eq!(skin(DEFAULT_SKIN_ID).map(|s| s.price), Some(0));
    }

    #[test]
    fn test_purchase_deducts_and_equips() {
        let mut store = store_with_coins(250);
        let result = select_skin(&mut store, 2).expect("affordable");
        assert_eq!(result, SkinSelection::Purchased { remaining_coins: 50 });
        assert_eq!(store.data().equipped_skin, 2);
        assert!(store.data().owned_skins.contains(&2));
    }

    #[test]
    fn test_insufficient_coins_changes_nothing() {
        let mut store = store_with_coins(50);
        let err = select_skin(&mut store, 1).expect_err("too expensive");
        assert!(matches!(
            err,
            SkinError::InsufficientCoins {
                price: 100,
                available: 50
            }
        ));
        assert_eq!(store.data().equipped_skin, DEFAULT_SKIN_ID);
        assert_eq!(store.data().coins, 50);
    }

    #[test]
    fn test_owned_skin_equips_for_free() {
        let mut store = store_with_coins(100);
        select_skin(&mut store, 1).expect("buy");
        select_skin(&mut store, 0).expect("back to default");
        assert_eq!(select_skin(&mut store, 1).expect("owned"), SkinSelection::Equipped);
        assert_eq!(store.data().coins, 0);
        assert_eq!(
            select_skin(&mut store, 1).expect("noop"),
            SkinSelection::AlreadyEquipped
        );
    }

    #[test]
    fn test_unknown_skin() {
        let mut store = store_with_coins(0);
        assert!(matches!(select_skin(&mut store, 99), Err(SkinError::Unknown(99))));
    }
}
