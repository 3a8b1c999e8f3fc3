//! Repository traits for loading and saving learner progress.

use std::convert::Infallible;
use std::sync::{Arc, Mutex, PoisonError};

use crate::types::{CardSet, StreakState};

/// Storage for the full card set of one learner.
pub trait CardRepository {
    type Error: std::error::Error + Send + Sync + 'static;

    fn load_cards(&self) -> Result<CardSet, Self::Error>;

    /// Replace the stored card set.
    fn save_cards(&self, cards: &CardSet) -> Result<(), Self::Error>;
}

/// Storage for the learner's streak record.
pub trait StreakRepository {
    type Error: std::error::Error + Send + Sync + 'static;

    fn load_streak(&self) -> Result<Option<StreakState>, Self::Error>;
    fn save_streak(&self, streak: &StreakState) -> Result<(), Self::Error>;
}

impl<R: CardRepository + ?Sized> CardRepository for &R {
    type Error = R::Error;

    fn load_cards(&self) -> Result<CardSet, Self::Error> {
        (**self).load_cards()
    }

    fn save_cards(&self, cards: &CardSet) -> Result<(), Self::Error> {
        (**self).save_cards(cards)
    }
}

impl<R: CardRepository + ?Sized> CardRepository for Arc<R> {
    type Error = R::Error;

    fn load_cards(&self) -> Result<CardSet, Self::Error> {
        (**self).load_cards()
    }

    fn save_cards(&self, cards: &CardSet) -> Result<(), Self::Error> {
        (**self).save_cards(cards)
    }
}

impl<R: StreakRepository + ?Sized> StreakRepository for &R {
    type Error = R::Error;

    fn load_streak(&self) -> Result<Option<StreakState>, Self::Error> {
        (**self).load_streak()
    }

    fn save_streak(&self, streak: &StreakState) -> Result<(), Self::Error> {
        (**self).save_streak(streak)
    }
}

impl<R: StreakRepository + ?Sized> StreakRepository for Arc<R> {
    type Error = R::Error;

    fn load_streak(&self) -> Result<Option<StreakState>, Self::Error> {
        (**self).load_streak()
    }

    fn save_streak(&self, streak: &StreakState) -> Result<(), Self::Error> {
        (**self).save_streak(streak)
    }
}

/// In-memory repository, for tests and hosts that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    cards: Mutex<CardSet>,
    streak: Mutex<Option<StreakState>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository preloaded with a card set.
    pub fn with_cards(cards: CardSet) -> Self {
        Self {
            cards: Mutex::new(cards),
            streak: Mutex::new(None),
        }
    }
}

impl CardRepository for MemoryRepository {
    type Error = Infallible;

    fn load_cards(&self) -> Result<CardSet, Self::Error> {
        Ok(self.cards.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save_cards(&self, cards: &CardSet) -> Result<(), Self::Error> {
        *self.cards.lock().unwrap_or_else(PoisonError::into_inner) = cards.clone();
        Ok(())
    }
}

impl StreakRepository for MemoryRepository {
    type Error = Infallible;

    fn load_streak(&self) -> Result<Option<StreakState>, Self::Error> {
        Ok(self.streak.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save_streak(&self, streak: &StreakState) -> Result<(), Self::Error> {
        *self.streak.lock().unwrap_or_else(PoisonError::into_inner) = Some(streak.clone());
        Ok(())
    }
}
