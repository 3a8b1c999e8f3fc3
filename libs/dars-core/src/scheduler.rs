//! Review scheduler for one learner's card set.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::algorithm::sm2::Sm2;
use crate::algorithm::SpacedRepetitionAlgorithm;
use crate::clock::{Clock, SystemClock};
use crate::events::ProgressEvent;
use crate::repository::CardRepository;
use crate::types::{Card, CardSet, ItemSeed, Quality, ReviewRecord, Stats};

/// Owns the review state of every known item and decides what is due.
///
/// Mutations happen in memory; call [`Scheduler::save`] to write the card set
/// back through the repository. Saving may be deferred or batched since every
/// card is self-contained.
pub struct Scheduler<R, C = SystemClock> {
    repository: R,
    clock: C,
    algorithm: Box<dyn SpacedRepetitionAlgorithm>,
    cards: CardSet,
}

impl<R: CardRepository, C: Clock> Scheduler<R, C> {
    /// Load the card set from the repository.
    pub fn open(repository: R, clock: C) -> Result<Self, R::Error> {
        let cards = repository.load_cards()?;
        info!(cards = cards.len(), "loaded card set");
        Ok(Self {
            repository,
            clock,
            algorithm: Box::new(Sm2::default()),
            cards,
        })
    }

    /// Replace the scheduling algorithm.
    pub fn with_algorithm(mut self, algorithm: Box<dyn SpacedRepetitionAlgorithm>) -> Self {
        debug!(algorithm = algorithm.name(), "using scheduling algorithm");
        self.algorithm = algorithm;
        self
    }

    /// Create cards for items that have none. Existing cards are never touched.
    pub fn seed<I>(&mut self, items: I) -> Option<ProgressEvent>
    where
        I: IntoIterator<Item = ItemSeed>,
    {
        let now = self.clock.now();
        let mut added = Vec::new();

        for seed in items {
            if self.cards.contains(seed.item_id.as_str()) {
                continue;
            }
            added.push(seed.item_id.clone());
            let state = self.algorithm.initial_state(now);
            self.cards.insert(Card::from_seed(seed, state));
        }

        if added.is_empty() {
            return None;
        }
        debug!(added = added.len(), "seeded new cards");
        Some(ProgressEvent::Seeded { added })
    }

    /// Cards due now: pinned first, then oldest due first.
    pub fn get_due(&self, limit: usize) -> Vec<Card> {
        let now = self.clock.now();
        let mut due: Vec<&Card> = self.cards.iter().filter(|card| card.is_due(now)).collect();

        due.sort_by(|a, b| {
            b.is_pinned
                .cmp(&a.is_pinned)
                .then_with(|| a.state.next_review_at.cmp(&b.state.next_review_at))
                .then_with(|| a.item_id.cmp(&b.item_id))
        });

        due.into_iter().take(limit).cloned().collect()
    }

    /// Record a review. Unknown items are ignored.
    pub fn review(&mut self, item_id: &str, quality: Quality) -> Option<ProgressEvent> {
        let now = self.clock.now();
        let Some(card) = self.cards.get_mut(item_id) else {
            debug!(item_id, "review for unknown item ignored");
            return None;
        };

        let before = card.state.clone();
        let result = self.algorithm.schedule(&before, quality, now);
        card.state = result.new_state;

        debug!(
            item_id,
            quality,
            passed = result.passed,
            interval = card.state.interval,
            ease = card.state.ease_factor,
            "reviewed card"
        );

        Some(ProgressEvent::Reviewed(ReviewRecord {
            item_id: card.item_id.clone(),
            quality,
            reviewed_at: now,
            passed: result.passed,
            interval_before: before.interval,
            interval_after: card.state.interval,
            ease_before: before.ease_factor,
            ease_after: card.state.ease_factor,
        }))
    }

    pub fn stats(&self) -> Stats {
        let now = self.clock.now();
        Stats {
            due_count: self.cards.iter().filter(|card| card.is_due(now)).count(),
            total_count: self.cards.len(),
        }
    }

    /// Earliest review time that is still in the future.
    pub fn next_upcoming_review_time(&self) -> Option<DateTime<Utc>> {
        let now = self.clock.now();
        self.cards
            .iter()
            .map(|card| card.state.next_review_at)
            .filter(|at| *at > now)
            .min()
    }

    /// Star or unstar an item. Only affects due ordering.
    pub fn set_pinned(&mut self, item_id: &str, pinned: bool) -> Option<ProgressEvent> {
        let card = self.cards.get_mut(item_id)?;
        if card.is_pinned == pinned {
            return None;
        }
        card.is_pinned = pinned;
        Some(ProgressEvent::PinChanged {
            item_id: card.item_id.clone(),
            pinned,
        })
    }

    /// Mirror a remote copy of the card set, last write wins per item.
    ///
    /// The copy reviewed more recently wins; ties keep the local card. Cards
    /// only present remotely are added. Returns how many remote cards were
    /// taken.
    pub fn merge_remote(&mut self, remote: CardSet) -> usize {
        let mut taken = 0;
        for card in remote {
            let newer = match self.cards.get(card.item_id.as_str()) {
                Some(local) => card.state.last_reviewed_at > local.state.last_reviewed_at,
                None => true,
            };
            if newer {
                self.cards.insert(card);
                taken += 1;
            }
        }
        debug!(taken, "merged remote cards");
        taken
    }

    pub fn card(&self, item_id: &str) -> Option<&Card> {
        self.cards.get(item_id)
    }

    pub fn cards(&self) -> &CardSet {
        &self.cards
    }

    /// Write the full card set through the repository.
    pub fn save(&self) -> Result<(), R::Error> {
        self.repository.save_cards(&self.cards)?;
        debug!(cards = self.cards.len(), "saved card set");
        Ok(())
    }
}
